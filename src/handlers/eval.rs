//! One-shot evaluation: run a snippet through the coordinator and print the outcome.

use std::process::ExitCode;

use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;

use crate::coordinator::CoordinatorHandle;
use crate::printer::{JsonPrinter, TextPrinter};

pub async fn run(handle: &CoordinatorHandle, code: &str, json: bool) -> Result<ExitCode> {
    let state = handle.execute(code).await?;
    let result = state
        .execution_result
        .as_ref()
        .ok_or_else(|| anyhow!("evaluation finished without a result"))?;

    if json {
        JsonPrinter.print(&state)?;
    } else {
        let color = if result.is_error() {
            std::io::stderr().is_terminal()
        } else {
            std::io::stdout().is_terminal()
        };
        TextPrinter { color }.print(result);
    }

    Ok(if result.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
