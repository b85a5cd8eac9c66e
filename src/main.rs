use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{self, filter::EnvFilter};

use cinemachine_upgrader::{
    JsonSettingsStore, RuleSet, UpgradeError, Upgrader, UpgraderConfig,
    external::{self, CommandTool},
    response_formatter::ResponseFormatter,
    rules::{load_rule_set, save_rule_set},
};

/// Cinemachine Upgrader - rewrites Cinemachine 2.x C# scripts to the 3.x API
#[derive(Parser, Debug)]
#[command(name = "cinemachine-upgrader")]
#[command(about = "Rule-driven upgrader for Cinemachine 2.x scripts")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Root directory holding the scripts
    #[arg(
        short = 'd',
        long = "root-dir",
        global = true,
        help = "Root directory to scan (default: current directory)",
        value_name = "PATH"
    )]
    root_directory: Option<PathBuf>,

    /// Only scan the root directory itself
    #[arg(long = "no-recursive", global = true)]
    no_recursive: bool,

    /// Overwrite files without writing `.backup` siblings
    #[arg(long = "no-backup", global = true)]
    no_backup: bool,

    /// Rule set file (YAML or JSON)
    #[arg(
        long = "rules",
        global = true,
        help = "Rule set file in YAML or JSON (default: built-in rules)",
        value_name = "PATH"
    )]
    rules_file: Option<PathBuf>,

    /// Settings file holding the processed-file list
    #[arg(
        long = "state-file",
        global = true,
        help = "Settings file for the processed-file list (default: ~/.cinemachine-upgrader/settings.json)",
        value_name = "PATH"
    )]
    state_file: Option<PathBuf>,

    /// Path globs to skip (can be specified multiple times)
    #[arg(long = "exclude", global = true, value_name = "GLOB")]
    exclude_globs: Vec<String>,

    /// Maximum number of compiled patterns to cache
    #[arg(
        long = "pattern-cache-size",
        global = true,
        default_value = "256",
        help = "Maximum number of compiled patterns to cache"
    )]
    pattern_cache_size: usize,

    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log every substitution
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report which files use which Cinemachine types, without changing anything
    Analyze,
    /// Rewrite scripts in place
    Upgrade,
    /// Restore every processed file from its backup
    Restore,
    /// Delete the backups of processed files
    DeleteBackups,
    /// Delete every backup file under the root directory
    CleanupBackups,
    /// Print whether any processed file still has a backup
    HasBackups,
    /// Write the built-in rule set to a file for editing
    InitRules {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Ask the package manager to add or update com.unity.cinemachine
    UpdatePackage {
        /// Package manager command; the package id is appended
        #[arg(long = "command", value_name = "COMMAND")]
        command: String,
    },
    /// Run the structural upgrade of scenes and prefabs
    UpgradeComponents {
        #[arg(long = "command", value_name = "COMMAND")]
        command: String,
    },
}

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::debug!("Starting with arguments: {:?}", args);

    let json = args.json;
    let rules = load_rules(&args)?;
    let (command, config) = create_config_from_args(args)?;

    let success = match execute(command, config, rules, json) {
        Ok(success) => success,
        Err(e) => match e.downcast_ref::<UpgradeError>() {
            Some(err) => {
                emit_failure(json, err)?;
                false
            }
            None => return Err(e),
        },
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run one command. Returns whether it completed without errors.
fn execute(command: Commands, config: UpgraderConfig, rules: RuleSet, json: bool) -> Result<bool> {
    let success = match command {
        Commands::InitRules { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            save_rule_set(&path, &RuleSet::with_defaults())?;
            println!("Wrote default rules to {}", path.display());
            true
        }
        Commands::UpdatePackage { command } => {
            let tool = parse_command(&command)?;
            let result = external::update_package(&tool);
            emit_external(json, ResponseFormatter::format_package_update(&result), &result)?
        }
        Commands::UpgradeComponents { command } => {
            let tool = parse_command(&command)?;
            let result = external::upgrade_components(&tool);
            emit_external(json, ResponseFormatter::format_component_upgrade(&result), &result)?
        }
        Commands::Analyze => {
            let (root, recursive) = (config.root.clone(), config.recursive);
            let report = open_upgrader(config, rules)?.analyze(&root, recursive);
            emit(json, &report, ResponseFormatter::format_analysis(&report))?;
            !report.errors_occurred
        }
        Commands::Upgrade => {
            let (root, recursive) = (config.root.clone(), config.recursive);
            let report = open_upgrader(config, rules)?.run_at(&root, recursive)?;
            emit(json, &report, ResponseFormatter::format_run_report(&report))?;
            !report.errors_occurred
        }
        Commands::Restore => {
            let report = open_upgrader(config, rules)?.restore_backups()?;
            emit(json, &report, ResponseFormatter::format_backup_report(&report))?;
            report.batch.is_complete()
        }
        Commands::DeleteBackups => {
            let report = open_upgrader(config, rules)?.delete_processed_backups()?;
            emit(json, &report, ResponseFormatter::format_backup_report(&report))?;
            report.batch.is_complete()
        }
        Commands::CleanupBackups => {
            let root = config.root.clone();
            let report = open_upgrader(config, rules)?.delete_all_backups(&root);
            emit(json, &report, ResponseFormatter::format_backup_report(&report))?;
            report.batch.is_complete()
        }
        Commands::HasBackups => {
            let has_backups = open_upgrader(config, rules)?.has_backups()?;
            if json {
                println!("{}", serde_json::json!({ "has_backups": has_backups }));
            } else {
                println!("{has_backups}");
            }
            true
        }
    };
    Ok(success)
}

fn open_upgrader(config: UpgraderConfig, rules: RuleSet) -> Result<Upgrader<JsonSettingsStore>> {
    let store = JsonSettingsStore::new(&config.state_file);
    Ok(Upgrader::new(config, rules, store)?)
}

/// Load the rule set named on the command line, or the built-in one
fn load_rules(args: &Args) -> Result<RuleSet> {
    match &args.rules_file {
        Some(path) => Ok(load_rule_set(path)?),
        None => Ok(RuleSet::with_defaults()),
    }
}

/// Create an UpgraderConfig from command line arguments
fn create_config_from_args(args: Args) -> Result<(Commands, UpgraderConfig)> {
    let root = match args.root_directory {
        Some(root) => root,
        // Default to current working directory
        None => std::env::current_dir()?,
    };

    let state_file = args
        .state_file
        .unwrap_or_else(UpgraderConfig::default_state_file);

    let config = UpgraderConfig {
        root,
        recursive: !args.no_recursive,
        backup_files: !args.no_backup,
        exclude_globs: args.exclude_globs,
        state_file,
        pattern_cache_size: args.pattern_cache_size,
        ..UpgraderConfig::default()
    };
    Ok((args.command, config))
}

fn parse_command(command: &str) -> Result<CommandTool> {
    match CommandTool::parse(command) {
        Some(tool) => Ok(tool),
        None => bail!("--command must name a program"),
    }
}

fn emit<T: Serialize>(json: bool, result: &T, summary: String) -> Result<()> {
    if json {
        let value = ResponseFormatter::create_formatted_response(result, summary)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn emit_failure(json: bool, err: &UpgradeError) -> Result<()> {
    let summary = ResponseFormatter::format_failure(err);
    if json {
        let value = serde_json::json!({
            "summary": summary,
            "error": err.kind(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn emit_external(json: bool, summary: String, result: &Result<(), UpgradeError>) -> Result<bool> {
    if json {
        let value = serde_json::json!({
            "summary": summary,
            "success": result.is_ok(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{summary}");
    }
    Ok(result.is_ok())
}
