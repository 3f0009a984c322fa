//! Config commands
//!
//! Shows the resolved client configuration and where each value came from.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use gradebook_core::config::{API_URL_ENV, SESSION_PATH_ENV, TIMEOUT_ENV};
use gradebook_core::ClientConfig;

use super::Context;
use crate::output::{print_info, print_output};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the session file path
    Path,
}

/// Config row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

pub async fn execute(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print_output(&config_rows(&ctx.config), ctx.format),
        ConfigAction::Path => {
            print_info(&ctx.config.session_path.display().to_string(), false);
            Ok(())
        }
    }
}

fn config_rows(config: &ClientConfig) -> Vec<ConfigRow> {
    vec![
        ConfigRow {
            key: API_URL_ENV.to_string(),
            value: config.api_url.clone(),
            source: config.sources.api_url.to_string(),
        },
        ConfigRow {
            key: TIMEOUT_ENV.to_string(),
            value: config.timeout_secs.to_string(),
            source: config.sources.timeout_secs.to_string(),
        },
        ConfigRow {
            key: SESSION_PATH_ENV.to_string(),
            value: config.session_path.display().to_string(),
            source: config.sources.session_path.to_string(),
        },
    ]
}
