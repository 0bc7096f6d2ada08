//! Input field for the chat

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// Enter was pressed; the content is still in the field
    Submit,
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Cursor position in characters, not bytes
    pub cursor_position: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Chat composer for user input
#[derive(Debug, Clone)]
pub struct ChatComposer {
    state: TextAreaState,
    placeholder: String,
    waiting: bool,
}

impl ChatComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
            waiting: false,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.insert_char('\n');
                } else {
                    return ComposerResult::Submit;
                }
            }
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => {
                if self.state.cursor_position > 0 {
                    self.state.cursor_position -= 1;
                    let byte_pos = char_to_byte_index(&self.state.content, self.state.cursor_position);
                    self.state.content.remove(byte_pos);
                }
            }
            KeyCode::Delete => {
                if self.state.cursor_position < self.char_count() {
                    let byte_pos = char_to_byte_index(&self.state.content, self.state.cursor_position);
                    self.state.content.remove(byte_pos);
                }
            }
            KeyCode::Left => {
                self.state.cursor_position = self.state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                self.state.cursor_position = (self.state.cursor_position + 1).min(self.char_count());
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.char_count();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert pasted text at the cursor
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.state.content, self.state.cursor_position);
        self.state.content.insert(byte_pos, c);
        self.state.cursor_position += 1;
    }

    fn char_count(&self) -> usize {
        self.state.content.chars().count()
    }

    /// Set the field content and move the cursor to its end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.state.content = content.into();
        self.state.cursor_position = self.char_count();
    }

    /// Get current content
    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Clear content
    pub fn clear(&mut self) {
        self.state = TextAreaState::default();
    }

    /// Show the waiting indicator while a request is in flight
    pub fn set_waiting(&mut self, waiting: bool) {
        self.waiting = waiting;
    }
}

impl Widget for &ChatComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.waiting {
            "⏳ Waiting for the assistant..."
        } else {
            "✍️  Ask a question"
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(if self.waiting {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::Green)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
            return;
        }

        let mut content = self.state.content.clone();
        if !self.waiting {
            let byte_pos = char_to_byte_index(&content, self.state.cursor_position);
            content.insert(byte_pos, '▌');
        }

        for (i, line_text) in content.split('\n').enumerate() {
            if i < inner_area.height as usize {
                let line = Line::from(vec![Span::raw(line_text)]);
                buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
            }
        }
    }
}
