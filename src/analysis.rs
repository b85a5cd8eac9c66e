//! # Usage Analysis
//!
//! Read-only pass that reports which known types each script mentions,
//! so a user can see the scope of an upgrade before running it.

use crate::io::read_text;
use crate::scanner::Scanner;
use crate::types::AnalysisReport;
use std::path::Path;
use tracing::{error, info};

/// Scan `root` and record, for every known type, the files containing it.
///
/// Containment is a plain substring check; this pass never writes.
pub fn analyze(
    scanner: &Scanner,
    root: &Path,
    recursive: bool,
    known_types: &[String],
) -> AnalysisReport {
    let mut report = AnalysisReport::default();
    info!("Starting script analysis in {}", root.display());

    for item in scanner.scan(root, recursive) {
        let path = match item {
            Ok(path) => path,
            Err(e) => {
                error!("Error processing directory: {}", e);
                report.errors_occurred = true;
                report.errors.push(e.to_string());
                continue;
            }
        };

        let content = match read_text(&path) {
            Ok(content) => content,
            Err(e) => {
                error!("Error analyzing file: {}", e);
                report.errors_occurred = true;
                report.errors.push(e.to_string());
                continue;
            }
        };

        for type_name in known_types {
            if content.contains(type_name.as_str()) {
                report
                    .usage
                    .entry(type_name.clone())
                    .or_default()
                    .insert(path.clone());
            }
        }
    }

    if report.usage.is_empty() {
        info!("No Cinemachine components found in the selected directory.");
    } else {
        info!(
            "Found {} files with Cinemachine components",
            report.total_files()
        );
    }
    report
}
