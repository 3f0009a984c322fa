//! Gradebook CLI - exercise submission and grading client
//!
//! A command-line front end for logging in, managing exercises and
//! submissions, reading grade statistics and notifications, and checking
//! which views a session may open.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use gradebook_core::{ClientConfig, Gradebook};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(author, version, about = "Exercise submission and grading CLI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Override the API base URL (or set GRADEBOOK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Override the session file path (or set GRADEBOOK_SESSION_PATH)
    #[arg(long, global = true)]
    session: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, register, log out and inspect the session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },

    /// Browse and manage exercises
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },

    /// Submit answers and browse submissions
    Submission {
        #[command(subcommand)]
        action: commands::submission::SubmissionAction,
    },

    /// Grade statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },

    /// Read and acknowledge notifications
    Notification {
        #[command(subcommand)]
        action: commands::notification::NotificationAction,
    },

    /// Check which views the current session may open
    Route {
        #[command(subcommand)]
        action: commands::route::RouteAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(path) = &cli.session {
        config = config.with_session_path(path);
    }

    let navigator = Arc::new(commands::TerminalNavigator::new(cli.quiet));
    let app = Gradebook::init(&config, navigator)?;

    // Create context for commands
    let ctx = commands::Context {
        app,
        config,
        format: cli.format,
        quiet: cli.quiet,
    };

    // Execute command
    match cli.command {
        Commands::Auth { action } => commands::auth::execute(&ctx, action).await,
        Commands::Exercise { action } => commands::exercise::execute(&ctx, action).await,
        Commands::Submission { action } => commands::submission::execute(&ctx, action).await,
        Commands::Stats { action } => commands::stats::execute(&ctx, action).await,
        Commands::Notification { action } => {
            commands::notification::execute(&ctx, action).await
        }
        Commands::Route { action } => commands::route::execute(&ctx, action).await,
        Commands::Config { action } => commands::config::execute(&ctx, action).await,
    }
}
