//! atlas-action CLI - runs an action step against the current CI host

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use atlas_action::{
    migrate_apply, report_failure, ActionConfig, ActionError, ConfigOverrides, FixSuggestion,
    GithubHost, RunContext,
};

#[derive(Parser)]
#[command(name = "atlas-action")]
#[command(about = "CI action adapter for Atlas schema migrations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations (inputs: url, dir, config, env, tx-mode, baseline)
    MigrateApply {
        /// Path to the atlas binary
        #[arg(long)]
        atlas_bin: Option<String>,

        /// Abort the run after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Directory to run atlas in
        #[arg(long)]
        working_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr, stdout belongs to the CI host
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::MigrateApply {
            atlas_bin,
            timeout,
            working_dir,
        } => {
            let overrides = ConfigOverrides {
                atlas_bin,
                timeout_secs: timeout,
                working_dir,
            };
            run_migrate_apply(overrides).await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn run_migrate_apply(overrides: ConfigOverrides) -> Result<(), ActionError> {
    let host = GithubHost::from_env();
    let config = match ActionConfig::from_env().and_then(|c| c.with_overrides(overrides)) {
        Ok(config) => config,
        Err(e) => {
            report_failure(&host, &e);
            return Err(e);
        }
    };
    debug!(?config, "Loaded config");

    let engine = config.engine();

    let mut ctx = RunContext::new();
    if let Some(timeout) = config.timeout {
        ctx = ctx.with_timeout(timeout);
    }

    // Ctrl-C cancels the run; the engine kills atlas
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    migrate_apply(&ctx, &engine, &host).await?;
    Ok(())
}
