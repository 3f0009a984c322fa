//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod auth;
pub mod config;
pub mod exercise;
pub mod notification;
pub mod route;
pub mod stats;
pub mod submission;

use anyhow::{bail, Context as _, Result};
use std::path::{Path, PathBuf};

use gradebook_core::navigation::{Navigator, LOGIN_PATH};
use gradebook_core::{ClientConfig, Download, Gradebook};

use crate::output::{print_warning, OutputFormat};

/// Shared context for all commands
pub struct Context {
    pub app: Gradebook,
    pub config: ClientConfig,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// A terminal has no pages; redirects become hints
pub struct TerminalNavigator {
    quiet: bool,
}

impl TerminalNavigator {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        if path == LOGIN_PATH {
            print_warning(
                "Session expired or missing. Run `gradebook auth login` to sign in.",
                self.quiet,
            );
        } else {
            log::debug!("Redirect to {}", path);
        }
    }
}

/// Write a downloaded file to `output`, or to its own name in the current
/// directory. Existing files are kept unless `overwrite` is set.
pub fn save_download(download: &Download, output: Option<&Path>, overwrite: bool) -> Result<PathBuf> {
    let path = match output {
        Some(path) if path.is_dir() => path.join(&download.file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&download.file_name),
    };

    if path.exists() && !overwrite {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    std::fs::write(&path, &download.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
