use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use fastscript::cli::Cli;
use fastscript::config::Config;
use fastscript::handlers;
use fastscript::logging::{self, LogTarget};
use fastscript::{Coordinator, RhaiEngine};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    // Load config; CLI flags win over rc file and environment
    let mut cfg = Config::load();
    if let Some(secs) = args.timeout {
        cfg.set("EVAL_TIMEOUT", secs.to_string());
    }
    if let Some(ops) = args.max_operations {
        cfg.set("MAX_OPERATIONS", ops.to_string());
    }
    if let Some(path) = &args.log_file {
        cfg.set("LOG_PATH", path.to_string_lossy());
    }

    let file_text = match &args.file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read script '{}'", path.display()))?,
        ),
        None => None,
    };

    // Resolve one-shot source: --eval, --run FILE, or piped stdin
    let one_shot = if let Some(code) = args.eval.clone() {
        Some(code)
    } else if args.run {
        file_text.clone()
    } else if !io::stdin().is_terminal() {
        match &file_text {
            Some(text) => Some(text.clone()),
            None => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                Some(buf)
            }
        }
    } else {
        None
    };

    let target = if one_shot.is_some() { LogTarget::Stderr } else { LogTarget::File };
    logging::init(&cfg, target)?;
    tracing::debug!(config = %cfg.config_path.display(), ?target, "starting");

    let engine = RhaiEngine::from_config(&cfg)?;
    let handle = Coordinator::load(&engine)?
        .with_timeout(cfg.eval_timeout_secs().map(Duration::from_secs))
        .spawn();

    match one_shot {
        Some(code) => handlers::eval::run(&handle, &code, args.json).await,
        None => {
            handlers::repl::run(handle, file_text).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
