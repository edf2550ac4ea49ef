//! Interactive scratchpad with TUI interface using Ratatui.

use anyhow::Result;
use std::io;

use crate::coordinator::CoordinatorHandle;
use crate::tui::run_tui;

/// Run the editor against an already loaded coordinator
pub async fn run(handle: CoordinatorHandle, initial_text: Option<String>) -> Result<()> {
    // Check if TUI mode is available
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        eprintln!("Warning: TUI mode not available in this environment. The editor requires a proper terminal.");
        eprintln!("Use --eval or pipe a script on stdin for non-interactive runs.");
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    run_tui(handle, initial_text.unwrap_or_default()).await
}
