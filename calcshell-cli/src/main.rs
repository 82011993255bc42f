//! Calcshell CLI: interactive calculator shell.
//!
//! Starts the read-eval loop by default; subcommands inspect plugins and
//! configuration without entering the shell.

mod commands;
mod shell;

use calcshell_core::{ConfigOverrides, Environment, Settings, ShellConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Calcshell: an interactive calculator with persisted history and plugins
#[derive(Parser, Debug)]
#[command(name = "calcshell", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (relative paths in the configuration resolve here)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Directory scanned for plugin units
    #[arg(long)]
    plugins_dir: Option<PathBuf>,

    /// History file
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Directory for app.log
    #[arg(long)]
    logs_dir: Option<PathBuf>,

    /// Increase console verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors to the console
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List plugin units found in the plugins directory
    Plugins,
    /// Show the resolved configuration
    Config,
}

/// Console filter from flags, then `LOG_LEVEL`, then `warn`.
fn console_filter(cli: &Cli) -> String {
    match (cli.verbose, cli.quiet) {
        (0, true) => "error".into(),
        (1, _) => "info".into(),
        (2, _) => "debug".into(),
        (v, _) if v > 2 => "trace".into(),
        _ => std::env::var("LOG_LEVEL")
            .map(|level| level.to_lowercase())
            .unwrap_or_else(|_| "warn".into()),
    }
}

/// Install a human-readable stderr layer and a plain-text file layer.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing(cli: &Cli, config: &ShellConfig) -> anyhow::Result<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_new(console_filter(cli)).unwrap_or_else(|_| EnvFilter::new("warn")),
        );

    std::fs::create_dir_all(&config.logs_dir)?;
    let file_appender = tracing_appender::rolling::never(&config.logs_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_level = match config.environment {
        Environment::Development => "debug",
        Environment::Testing | Environment::Production => "info",
    };
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new(file_level));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let overrides = ConfigOverrides {
        plugins_dir: cli.plugins_dir.clone(),
        history_file: cli.history_file.clone(),
        logs_dir: cli.logs_dir.clone(),
    };
    let config = calcshell_core::load_config(&workspace, Some(&overrides))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let _guard = init_tracing(&cli, &config)?;
    tracing::info!("Logging configured.");

    let settings = Settings::from_env();
    tracing::info!(environment = settings.environment(), "Environment variables loaded.");
    if !settings.is_known_environment() {
        tracing::warn!(
            environment = settings.environment(),
            profile = %config.environment,
            "Unrecognised ENVIRONMENT value, running with the production profile"
        );
    }

    if let Some(command) = cli.command {
        return commands::handle_command(command, &config);
    }

    shell::run_interactive(config, settings).await
}
