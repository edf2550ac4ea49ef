//! Async event handler for the TUI scratchpad.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use super::{app::App, events::TuiEvent, ui::render_ui};
use crate::coordinator::CoordinatorHandle;

/// Run the TUI editor until the user quits
pub async fn run_tui(handle: CoordinatorHandle, initial_text: String) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&initial_text);

    // Create event channels
    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &handle, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    handle: &CoordinatorHandle,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    // Spawn input handler
    let input_tx = event_tx;
    tokio::task::spawn_blocking(move || {
        while !input_tx.is_closed() {
            // Poll for terminal events
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let tui_event = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => TuiEvent::Key(key),
                Ok(Event::Paste(text)) => TuiEvent::Paste(text),
                Ok(Event::Resize(..)) => TuiEvent::Resize,
                _ => continue,
            };
            if input_tx.send(tui_event).is_err() {
                break; // Channel closed
            }
        }
    });

    loop {
        // Render UI from the latest published state
        let state = handle.state();
        terminal.draw(|frame| render_ui(frame, app, &state))?;

        // Handle events
        while let Ok(tui_event) = event_rx.try_recv() {
            let quit = match tui_event {
                TuiEvent::Key(key) => handle_key_event(app, key, handle)?,
                TuiEvent::Paste(text) => {
                    app.insert_str(&text);
                    false
                }
                TuiEvent::Resize => false,
            };
            if quit {
                return Ok(());
            }
        }

        // Keep the coordinator's copy of the text current
        if app.take_dirty() {
            handle.set_text(app.text())?;
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }
}

/// Handle keyboard events. Returns true when the user asked to quit.
fn handle_key_event(app: &mut App, key: KeyEvent, handle: &CoordinatorHandle) -> Result<bool> {
    // While help is shown, any key closes it
    if app.show_help {
        app.toggle_help();
        return Ok(false);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => {
            if app.handle_ctrl_c() {
                return Ok(true);
            }
            handle.cancel()?;
        }
        KeyCode::Char('q') if ctrl => return Ok(true),
        KeyCode::Char('e') if ctrl => execute(app, handle)?,
        KeyCode::F(5) => execute(app, handle)?,
        KeyCode::Char('l') if ctrl => app.clear(),
        KeyCode::Esc => handle.cancel()?,
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::PageUp => app.scroll_result_up(),
        KeyCode::PageDown => app.scroll_result_down(),
        KeyCode::Enter => app.newline(),
        KeyCode::Tab => app.insert_indent(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Up => app.move_cursor_up(),
        KeyCode::Down => app.move_cursor_down(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }

    Ok(false)
}

/// Send the editor contents to the coordinator
fn execute(app: &mut App, handle: &CoordinatorHandle) -> Result<()> {
    let code = app.text();
    app.reset_result_scroll();
    if app.take_dirty() {
        handle.set_text(code.clone())?;
    }
    handle.submit(code)?;
    Ok(())
}
