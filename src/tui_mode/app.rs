use calcipro::calc_engine::AngleMode;
use calcipro::history::HistoryEntry;
use calcipro::session::{Response, Session, Tab};
use tracing::debug;

use super::helpers::split_label;

pub struct App {
    pub input: String,
    pub cursor_position: usize,
    pub input_scroll: usize,
    pub session: Session,
    pub tab: Tab,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
    pub notice: Option<String>,
}

/// The text a user originally typed for a history entry.
fn typed_input(entry: &HistoryEntry) -> &str {
    split_label(&entry.input).1
}

impl App {
    pub fn new(angle_mode: AngleMode) -> Self {
        App {
            input: String::new(),
            cursor_position: 0,
            input_scroll: 0,
            session: Session::new(angle_mode),
            tab: Tab::default(),
            cursor_history: 0,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
            notice: None,
        }
    }

    pub fn adjust_input_scroll(&mut self, visible_width: usize) {
        let total_chars = self.input.chars().count();
        let cursor_pos = self.cursor_position;

        if cursor_pos < self.input_scroll {
            self.input_scroll = cursor_pos;
        }
        else if cursor_pos >= self.input_scroll + visible_width {
            self.input_scroll = cursor_pos - visible_width + 1;
        }

        if self.input_scroll > total_chars.saturating_sub(visible_width) {
            self.input_scroll = total_chars.saturating_sub(visible_width);
        }
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
        self.notice = None;
        debug!(tab = self.tab.title(), "switched tab");
    }

    pub fn toggle_angle_mode(&mut self) {
        let mode = self.session.toggle_angle_mode();
        self.notice = Some(format!("Angle mode: {}", mode.label()));
    }

    pub fn submit(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            return;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                self.should_quit = true;
                return;
            }
            "help" => {
                self.show_help = true;
                self.clear_input();
                return;
            }
            _ => {}
        }

        match self.session.submit(self.tab, &input) {
            Response::Ignored => return,
            Response::Notice(message) => {
                if self.session.history.is_empty() {
                    self.cursor_history = 0;
                    self.history_scroll = 0;
                }
                self.notice = Some(message);
            }
            Response::Recorded => {
                self.notice = None;
                self.cursor_history = self.session.history.len().saturating_sub(1);
                self.scroll_to_bottom = true;
            }
        }

        self.clear_input();
    }

    pub fn move_cursor(&mut self, direction: i32) {
        match direction {
            -1 => self.cursor_position = self.cursor_position.saturating_sub(1),
            1 => self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count()),
            _ => {}
        }
    }

    pub fn move_cursor_by_words(&mut self, direction: i32) {
        let input_chars: Vec<char> = self.input.chars().collect();
        let mut pos = self.cursor_position;

        if direction < 0 {
            while pos > 0 && input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
            while pos > 0 && !input_chars[pos - 1].is_whitespace() {
                pos -= 1;
            }
            self.cursor_position = pos;
        } else {
            let len = input_chars.len();
            while pos < len && !input_chars[pos].is_whitespace() {
                pos += 1;
            }
            while pos < len && input_chars[pos].is_whitespace() {
                pos += 1;
            }
            self.cursor_position = pos.min(len);
        }
    }

    fn recall(&mut self) {
        let entries = self.session.history.entries();
        match entries.get(self.cursor_history) {
            Some(entry) => self.input = typed_input(entry).to_string(),
            None => self.input.clear(),
        }
        self.cursor_position = self.input.chars().count();
        self.input_scroll = 0;
        self.scroll_to_bottom = false;
    }

    pub fn navigate_history(&mut self, direction: i32) {
        let len = self.session.history.len();
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < len.saturating_sub(1) {
            self.cursor_history += 1;
        }
        self.recall();
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self.cursor_history.saturating_add(step)
                .min(self.session.history.len().saturating_sub(1));
        }
        self.recall();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = App::char_index_to_byte_index(&self.input, self.cursor_position);
        self.input.insert(byte_idx, c);
        self.cursor_position += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            self.delete_at_cursor();
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let byte_idx = App::char_index_to_byte_index(&self.input, self.cursor_position);
        if let Some(c) = self.input[byte_idx..].chars().next() {
            let end = byte_idx + c.len_utf8();
            self.input.drain(byte_idx..end);
        }
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
        self.input_scroll = 0;
    }

    pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
        s.char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or_else(|| s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_line(app: &mut App, line: &str) {
        line.chars().for_each(|c| app.insert_char(c));
        app.submit();
    }

    #[test]
    fn test_submit_records_and_clears_input() {
        let mut app = App::new(AngleMode::Radian);
        type_line(&mut app, "1 + 2");
        assert_eq!(app.session.history.len(), 1);
        assert!(app.input.is_empty());
        assert!(app.scroll_to_bottom);
    }

    #[test]
    fn test_recall_strips_labels() {
        let mut app = App::new(AngleMode::Radian);
        app.next_tab();
        type_line(&mut app, "2x = 4");
        app.navigate_history(-1);
        assert_eq!(app.input, "2x = 4");
        assert_eq!(app.cursor_position, 6);
    }

    #[test]
    fn test_editing_multibyte_input() {
        let mut app = App::new(AngleMode::Radian);
        "2π".chars().for_each(|c| app.insert_char(c));
        app.move_cursor(-1);
        app.insert_char('*');
        assert_eq!(app.input, "2*π");
        app.delete_before_cursor();
        assert_eq!(app.input, "2π");
        app.delete_at_cursor();
        assert_eq!(app.input, "2");
    }

    #[test]
    fn test_commands() {
        let mut app = App::new(AngleMode::Radian);
        type_line(&mut app, "help");
        assert!(app.show_help);
        type_line(&mut app, "deg");
        assert_eq!(app.session.angle_mode, AngleMode::Degree);
        assert_eq!(app.notice.as_deref(), Some("Angle mode: DEG"));
        type_line(&mut app, "quit");
        assert!(app.should_quit);
    }

    #[test]
    fn test_word_motion() {
        let mut app = App::new(AngleMode::Radian);
        "sin(x) + 1".chars().for_each(|c| app.insert_char(c));
        app.move_cursor_by_words(-1);
        assert_eq!(app.cursor_position, 9);
        app.move_cursor_by_words(-1);
        assert_eq!(app.cursor_position, 7);
    }
}
