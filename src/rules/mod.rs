pub mod types;
pub mod defaults;
pub mod parser;

// Re-export commonly used types
pub use types::*;
pub use parser::{load_rule_set, parse_rule_set, save_rule_set};
