//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::App;
use crate::coordinator::ViewState;
use crate::execution::{ExecutionResult, StatusKind};
use crate::utils::unicode::display_width_to;

/// Width of the line-number gutter, including the trailing space
const GUTTER: u16 = 5;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App, state: &ViewState) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),         // Editor
            Constraint::Percentage(35), // Result
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_editor(frame, app, state, main_layout[0]);
    render_result(frame, app, state, main_layout[1]);
    render_status_bar(frame, state, main_layout[2]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Render the code editor with line numbers and place the cursor
fn render_editor(frame: &mut Frame, app: &App, state: &ViewState, area: Rect) {
    let available_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders
    let scroll_y = (app.cursor_row + 1).saturating_sub(available_height);

    let gutter_style = Style::default().fg(Color::DarkGray);
    let lines: Vec<Line> = app
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            Line::from(vec![
                Span::styled(format!("{:>4} ", i + 1), gutter_style),
                Span::raw(line.as_str()),
            ])
        })
        .collect();

    let title = if state.is_executing {
        "Code (running, Esc to cancel)"
    } else {
        "Code (F5 to run)"
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll_y as u16, 0));
    frame.render_widget(paragraph, area);

    if !app.show_help {
        let line = &app.lines[app.cursor_row];
        let max_x = area.right().saturating_sub(2);
        let x = (area.x + 1 + GUTTER + display_width_to(line, app.cursor_col) as u16).min(max_x);
        let y = area.y + 1 + (app.cursor_row - scroll_y) as u16;
        frame.set_cursor_position(Position::new(x, y));
    }
}

/// Render the outcome of the last evaluation
fn render_result(frame: &mut Frame, app: &App, state: &ViewState, area: Rect) {
    let (title, body, style) = match &state.execution_result {
        Some(result) => (
            format!("Result: {}", result.label()),
            result.message().to_string(),
            result_style(result),
        ),
        None if state.is_executing => (
            "Result".to_string(),
            state.status.label.clone(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
        None => ("Result".to_string(), String::new(), Style::default()),
    };

    let paragraph = Paragraph::new(body)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(style.remove_modifier(Modifier::ITALIC)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn result_style(result: &ExecutionResult) -> Style {
    match result {
        ExecutionResult::Success(_) => Style::default().fg(Color::Green),
        ExecutionResult::Warning(_) => Style::default().fg(Color::Yellow),
        ExecutionResult::Error(_) => Style::default().fg(Color::Red),
    }
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, state: &ViewState, area: Rect) {
    let label_style = match state.status.kind {
        StatusKind::Info => Style::default().fg(Color::Cyan),
        StatusKind::Ready => Style::default().fg(Color::Green),
        StatusKind::Error => Style::default().fg(Color::Red),
    }
    .add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    if state.is_executing {
        spans.push(Span::styled("● ", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(state.status.label.clone(), label_style));
    spans.push(Span::raw(" | F5 run | Esc cancel | F1 help | Ctrl+Q quit"));

    let status_paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create centered popup area
    let popup_area = centered_rect(70, 60, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Scratchpad Help"),
        Line::from(""),
        Line::from("Run:"),
        Line::from("  F5 / Ctrl+E  - Evaluate the editor contents"),
        Line::from("  Esc / Ctrl+C - Interrupt a running evaluation"),
        Line::from(""),
        Line::from("Editor:"),
        Line::from("  Enter        - New line"),
        Line::from("  Tab          - Indent"),
        Line::from("  Ctrl+L       - Clear editor"),
        Line::from("  PgUp/PgDn    - Scroll result"),
        Line::from(""),
        Line::from("  F1           - Toggle this help"),
        Line::from("  Ctrl+Q       - Quit (or Ctrl+C twice)"),
        Line::from(""),
        Line::from("Variables and functions persist between runs."),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::NOTHING_TO_EXECUTE;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App, state: &ViewState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render_ui(frame, app, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_editor_result_and_status() {
        let app = App::new("let answer = 42;");
        let state = ViewState {
            execution_result: Some(ExecutionResult::Warning(NOTHING_TO_EXECUTE.into())),
            ..ViewState::default()
        };
        let text = screen(&app, &state);
        assert!(text.contains("let answer = 42;"));
        assert!(text.contains("Result: warning"));
        assert!(text.contains(NOTHING_TO_EXECUTE));
        assert!(text.contains("Ready"));
    }

    #[test]
    fn running_state_shows_progress_label() {
        let app = App::new("loop {}");
        let mut state = ViewState {
            is_executing: true,
            ..ViewState::default()
        };
        state.status.set_info("Executing...");
        let text = screen(&app, &state);
        assert!(text.contains("Esc to cancel"));
        assert!(text.contains("Executing..."));
    }

    #[test]
    fn help_overlay_is_drawn_when_toggled() {
        let mut app = App::new("");
        app.toggle_help();
        let text = screen(&app, &ViewState::default());
        assert!(text.contains("Scratchpad Help"));
    }
}
