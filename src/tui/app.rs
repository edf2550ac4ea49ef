//! TUI application state management.

use std::time::{Duration, Instant};

use crate::utils::unicode::char_to_byte_index;

/// Spaces inserted by Tab
const INDENT: &str = "    ";

/// Application state for the TUI. Execution state lives in the coordinator.
#[derive(Debug)]
pub struct App {
    /// Editor buffer, one entry per line (never empty)
    pub lines: Vec<String>,
    /// Cursor line
    pub cursor_row: usize,
    /// Cursor position within the line (char index)
    pub cursor_col: usize,
    /// Whether to show help
    pub show_help: bool,
    /// Scroll offset of the result pane
    pub result_scroll: u16,
    /// Timestamp of last Ctrl+C press for double Ctrl+C detection
    pub last_ctrl_c_time: Option<Instant>,
    /// Editor changed since the coordinator last saw it
    dirty: bool,
}

impl App {
    pub fn new(text: &str) -> Self {
        let mut app = Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
            show_help: false,
            result_scroll: 0,
            last_ctrl_c_time: None,
            dirty: false,
        };
        app.set_text(text);
        app
    }

    /// Get the current editor text
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the buffer and put the cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.cursor_row = self.lines.len() - 1;
        self.cursor_col = self.current_len();
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Returns true once after each change to the buffer.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn current_line(&self) -> &str {
        &self.lines[self.cursor_row]
    }

    fn current_len(&self) -> usize {
        self.current_line().chars().count()
    }

    fn cursor_byte(&self) -> usize {
        char_to_byte_index(self.current_line(), self.cursor_col)
    }

    // ----- Editing -----
    pub fn insert_char(&mut self, c: char) {
        let at = self.cursor_byte();
        self.lines[self.cursor_row].insert(at, c);
        self.cursor_col += 1;
        self.dirty = true;
    }

    pub fn insert_indent(&mut self) {
        for c in INDENT.chars() {
            self.insert_char(c);
        }
    }

    /// Insert pasted text, which may span several lines
    pub fn insert_str(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for (i, part) in normalized.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            for c in part.chars() {
                self.insert_char(c);
            }
        }
    }

    pub fn newline(&mut self) {
        let at = self.cursor_byte();
        let rest = self.lines[self.cursor_row].split_off(at);
        self.cursor_row += 1;
        self.lines.insert(self.cursor_row, rest);
        self.cursor_col = 0;
        self.dirty = true;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            let at = self.cursor_byte();
            self.lines[self.cursor_row].remove(at);
            self.dirty = true;
        } else if self.cursor_row > 0 {
            // At the beginning of a line, merge with previous line
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.current_len();
            self.lines[self.cursor_row].push_str(&current);
            self.dirty = true;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor_col < self.current_len() {
            let at = self.cursor_byte();
            self.lines[self.cursor_row].remove(at);
            self.dirty = true;
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
            self.dirty = true;
        }
    }

    // ----- Cursor movement -----
    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.current_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_len() {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.cursor_col.min(self.current_len());
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = self.cursor_col.min(self.current_len());
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_len();
    }

    /// Toggle help display
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn scroll_result_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(5);
    }

    pub fn scroll_result_down(&mut self) {
        self.result_scroll = self.result_scroll.saturating_add(5);
    }

    pub fn reset_result_scroll(&mut self) {
        self.result_scroll = 0;
    }

    /// Handle Ctrl+C press and detect double press for quit
    /// Returns true if should quit (double Ctrl+C), false otherwise
    pub fn handle_ctrl_c(&mut self) -> bool {
        const DOUBLE_CTRL_C_TIMEOUT: Duration = Duration::from_millis(500);

        let now = Instant::now();

        if let Some(last_time) = self.last_ctrl_c_time {
            if now.duration_since(last_time) <= DOUBLE_CTRL_C_TIMEOUT {
                self.last_ctrl_c_time = None;
                return true;
            }
        }

        self.last_ctrl_c_time = Some(now);
        false
    }
}

fn split_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    normalized.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_app_places_cursor_at_end() {
        let app = App::new("let x = 1;\nx + 1");
        assert_eq!(app.lines.len(), 2);
        assert_eq!((app.cursor_row, app.cursor_col), (1, 5));
        assert_eq!(app.text(), "let x = 1;\nx + 1");
    }

    #[test]
    fn typing_and_newline_build_multiline_text() {
        let mut app = App::new("");
        app.take_dirty();
        for c in "let a = 1;".chars() {
            app.insert_char(c);
        }
        app.newline();
        app.insert_indent();
        app.insert_char('a');
        assert_eq!(app.text(), "let a = 1;\n    a");
        assert!(app.take_dirty());
        assert!(!app.take_dirty());
    }

    #[test]
    fn newline_splits_line_at_cursor() {
        let mut app = App::new("abcd");
        app.move_cursor_left();
        app.move_cursor_left();
        app.newline();
        assert_eq!(app.lines, vec!["ab".to_string(), "cd".to_string()]);
        assert_eq!((app.cursor_row, app.cursor_col), (1, 0));
    }

    #[test]
    fn backspace_at_line_start_merges_lines() {
        let mut app = App::new("ab\ncd");
        app.move_cursor_home();
        app.backspace();
        assert_eq!(app.text(), "abcd");
        assert_eq!((app.cursor_row, app.cursor_col), (0, 2));
    }

    #[test]
    fn delete_at_line_end_joins_next_line() {
        let mut app = App::new("ab\ncd");
        app.move_cursor_up();
        app.move_cursor_end();
        app.delete();
        assert_eq!(app.text(), "abcd");
    }

    #[test]
    fn editing_is_unicode_safe() {
        let mut app = App::new("héllo");
        app.move_cursor_home();
        app.move_cursor_right();
        app.move_cursor_right();
        app.backspace();
        assert_eq!(app.text(), "hllo");
    }

    #[test]
    fn paste_handles_crlf_line_breaks() {
        let mut app = App::new("");
        app.insert_str("let x = 1;\r\nx");
        assert_eq!(app.text(), "let x = 1;\nx");
        assert_eq!(app.cursor_row, 1);
    }

    #[test]
    fn vertical_movement_clamps_column() {
        let mut app = App::new("a\nlonger line");
        app.move_cursor_up();
        assert_eq!((app.cursor_row, app.cursor_col), (0, 1));
    }

    #[test]
    fn double_ctrl_c_quits() {
        let mut app = App::new("");
        assert!(!app.handle_ctrl_c());
        assert!(app.handle_ctrl_c());
    }

    #[test]
    fn clear_resets_buffer() {
        let mut app = App::new("1 + 1");
        app.clear();
        assert_eq!(app.text(), "");
        assert_eq!((app.cursor_row, app.cursor_col), (0, 0));
    }
}
