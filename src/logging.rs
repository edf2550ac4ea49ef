//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so interactive runs log to a file; one-shot
//! runs log to stderr.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Stderr,
}

pub fn init(cfg: &Config, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_directives(cfg, target)));

    match target {
        LogTarget::File => {
            let path = cfg.log_path();
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;
        }
    }

    Ok(())
}

/// Filter used when `RUST_LOG` is unset. Script `print` output stays visible on stderr.
fn fallback_directives(cfg: &Config, target: LogTarget) -> String {
    match target {
        LogTarget::File => cfg.log_level(),
        LogTarget::Stderr => "warn,script=info".to_string(),
    }
}
