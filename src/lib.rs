pub mod analysis;
pub mod backup;
pub mod config;
pub mod errors;
pub mod external;
pub mod indexer;
pub mod io;
pub mod pattern;
pub mod response_formatter;
pub mod rewriter;
pub mod rules;
pub mod scanner;
pub mod store;
pub mod types;
pub mod upgrader;

// Re-export commonly used types
pub use config::UpgraderConfig;
pub use errors::{ErrorKind, ExternalToolError, UpgradeError};
pub use rules::types::*;
pub use store::{JsonSettingsStore, MemoryStore, ProcessedFileStore};
pub use types::*;
pub use upgrader::Upgrader;
