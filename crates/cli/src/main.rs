//! Autotune CLI — the main entry point.
//!
//! Commands:
//! - `settings`  — Print synthesized assistant settings as JSON
//! - `rules`     — Print the advisory rules file
//! - `workflows` — Print the selected workflows
//! - `summary`   — Print a markdown summary of the settings
//! - `apply`     — Write rules, workflows and settings into place
//! - `config`    — Show, locate, validate or initialize configuration

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "autotune",
    about = "Autotune — adaptive settings, rules and workflows for coding assistants",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// The snapshot documents every generating command reads.
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Project/editor snapshot (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Host performance snapshot (JSON)
    #[arg(short, long)]
    pub performance: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print synthesized settings as JSON
    Settings {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Editor settings document to read user values from
        #[arg(long)]
        existing_settings: Option<PathBuf>,
    },

    /// Print the rules file
    Rules {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Current rules file; custom lines in it are kept
        #[arg(long)]
        existing_rules: Option<PathBuf>,
    },

    /// Print the selected workflows
    Workflows {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Print only the workflow names
        #[arg(long)]
        names_only: bool,
    },

    /// Print a markdown summary of the synthesized settings
    Summary {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Write rules, workflows and settings into a workspace
    Apply {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Project directory receiving the rules file and workflows
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Editor settings document (overrides config and AUTOTUNE_SETTINGS_PATH)
        #[arg(long)]
        settings_file: Option<PathBuf>,

        /// Report what would be written without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Check the configuration file
    Validate,
    /// Write a default configuration file if none exists
    Init,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Config errors are reported after logging is up.
    let config = autotune_config::AppConfig::load();
    init_tracing(cli.verbose, config.as_ref().ok().map(|c| &c.logging));

    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config_cmd::show(),
            ConfigAction::Path => commands::config_cmd::path(),
            ConfigAction::Validate => commands::config_cmd::validate(),
            ConfigAction::Init => commands::config_cmd::init(),
        };
    }

    let config = config?;
    match cli.command {
        Commands::Settings {
            snapshot,
            existing_settings,
        } => commands::settings::run(&config, &snapshot, existing_settings.as_deref())?,
        Commands::Rules {
            snapshot,
            existing_rules,
        } => commands::rules::run(&config, &snapshot, existing_rules.as_deref())?,
        Commands::Workflows {
            snapshot,
            names_only,
        } => commands::workflows::run(&config, &snapshot, names_only)?,
        Commands::Summary { snapshot } => commands::summary::run(&config, &snapshot)?,
        Commands::Apply {
            snapshot,
            workspace,
            settings_file,
            dry_run,
        } => {
            let options = commands::apply::ApplyOptions {
                workspace,
                settings_file,
                dry_run,
            };
            commands::apply::run(&config, &snapshot, &options)?
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_tracing(verbose: bool, logging: Option<&autotune_config::LoggingConfig>) {
    let level = match (verbose, logging) {
        (true, _) => "debug".to_string(),
        (false, Some(logging)) => logging.level.to_lowercase(),
        (false, None) => "info".to_string(),
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr so generated output on stdout stays clean.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.is_some_and(|l| l.json) {
        builder.json().init();
    } else {
        builder.init();
    }
}
