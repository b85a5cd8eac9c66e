use crate::errors::UpgradeError;
use crate::types::*;
use serde_json::{Value, json};
use std::path::Path;

pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Bundle a readable summary with the full JSON form of a result.
    pub fn create_formatted_response<T>(result: &T, summary: String) -> Result<Value, serde_json::Error>
    where
        T: serde::Serialize,
    {
        let json_value = serde_json::to_value(result)?;
        Ok(json!({
            "summary": summary,
            "result": json_value,
        }))
    }

    /// Format an upgrade run with a readable summary
    pub fn format_run_report(report: &RunReport) -> String {
        let headline = if report.errors_occurred {
            "Upgrade completed with some errors. Check console for details.".to_string()
        } else {
            format!("Successfully processed {} files.", report.modified_files.len())
        };

        let mut summary = format!(
            "🔄 **Upgrade {}**\n\n{}\n\n📁 **Files scanned**: {}\n✏️ **Files modified**: {}\n🎯 **Substitutions**: {}\n",
            report.summary(),
            headline,
            report.files.len(),
            report.modified_files.len(),
            report.total_substitutions()
        );

        for file in report.files.iter().filter(|f| f.modified || f.error.is_some()) {
            summary.push_str(&format!("\n📄 `{}`\n", file.path.display()));
            if let Some(message) = &file.error_message {
                summary.push_str(&format!("   ❌ {message}\n"));
            }
            if file.backup_created {
                summary.push_str("   💾 backup created\n");
            }
            for entry in file.substitution_log.iter().take(5) {
                summary.push_str(&format!("   - {entry}\n"));
            }
            if file.substitution_log.len() > 5 {
                summary.push_str(&format!(
                    "   ... and {} more substitutions\n",
                    file.substitution_log.len() - 5
                ));
            }
        }

        for error in &report.scan_errors {
            summary.push_str(&format!("\n❌ {error}\n"));
        }

        summary
    }

    /// Format the analysis pass, one line per known type found
    pub fn format_analysis(report: &AnalysisReport) -> String {
        let headline = if report.errors_occurred {
            "Analysis completed with some errors. Check console for details."
        } else {
            "Analysis completed successfully."
        };

        if report.usage.is_empty() {
            return format!(
                "🔍 **Analysis Complete**\n\n{headline}\n\nNo Cinemachine components found in the selected directory."
            );
        }

        let mut summary = format!(
            "🔍 **Analysis Complete**\n\n{headline}\n\nFound {} files with Cinemachine components:\n",
            report.total_files()
        );
        for (type_name, files) in &report.usage {
            let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
            summary.push_str(&format!("{type_name} -> {}\n", names.join(", ")));
        }
        for error in &report.errors {
            summary.push_str(&format!("\n❌ {error}\n"));
        }
        summary
    }

    /// Format a restore or delete operation
    pub fn format_backup_report(report: &BackupReport) -> String {
        let batch = &report.batch;
        let mut summary = match (report.operation, batch.is_complete()) {
            (BackupOperation::Restore, true) => {
                "♻️ **Restore Complete**\n\nAll files have been restored and backup files have been deleted.\n"
                    .to_string()
            }
            (BackupOperation::Restore, false) => {
                "♻️ **Restore Incomplete**\n\nSome files could not be restored. Check console for details.\n"
                    .to_string()
            }
            (BackupOperation::DeleteProcessed, true) => {
                "🗑️ **Delete Complete**\n\nAll processed backup files have been deleted.\n".to_string()
            }
            (BackupOperation::DeleteProcessed, false) => {
                "🗑️ **Delete Incomplete**\n\nSome backup files could not be deleted. Check console for details.\n"
                    .to_string()
            }
            (BackupOperation::DeleteAll, true) => format!(
                "🧹 **Cleanup Complete**\n\nSuccessfully deleted {} backup files.\n",
                batch.completed.len()
            ),
            (BackupOperation::DeleteAll, false) => format!(
                "🧹 **Cleanup Complete**\n\nDeleted {} backup files.\nFailed to delete {} files. Check console for details.\n",
                batch.completed.len(),
                batch.failures.len()
            ),
        };

        if !batch.skipped.is_empty() {
            summary.push_str(&format!(
                "\n⏭️ {} tracked files had no backup\n",
                batch.skipped.len()
            ));
        }
        for failure in &batch.failures {
            summary.push_str(&format!(
                "❌ `{}`: {}\n",
                failure.path.display(),
                failure.message
            ));
        }
        summary
    }

    /// Format an operation that could not run at all
    pub fn format_failure(err: &UpgradeError) -> String {
        format!("❌ **Operation {}**\n\n{err}", OperationSummary::Failed)
    }

    pub fn format_package_update(result: &Result<(), UpgradeError>) -> String {
        match result {
            Ok(()) => "📦 **Package Update**\n\nStarted Cinemachine package update process.\n\nPlease wait for the Package Manager to complete the update. You can check the progress in the Package Manager window.".to_string(),
            Err(e) => format!(
                "📦 **Error**\n\nFailed to update Cinemachine package. Please try updating manually through the Package Manager.\n\n❌ {e}"
            ),
        }
    }

    pub fn format_component_upgrade(result: &Result<(), UpgradeError>) -> String {
        match result {
            Ok(()) => "🧩 **Complete**\n\nComponent upgrade completed.".to_string(),
            Err(e) => format!(
                "🧩 **Error**\n\nFailed to upgrade components. Check console for details.\n\n❌ {e}"
            ),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
