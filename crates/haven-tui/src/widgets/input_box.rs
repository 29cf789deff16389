//! Text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Single-line text input widget
///
/// The cursor is a byte offset into the content and always sits on a
/// char boundary.
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    cursor: usize,
    /// Horizontal scroll offset (in display width)
    scroll: usize,
    placeholder: String,
    focused: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set focus state
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Set the content, placing the cursor at the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.len();
        self.update_scroll(80); // Default width
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Take the content, leaving the box empty
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        self.scroll = 0;
        content
    }

    /// The char ending at the cursor, if the cursor is not at the start
    fn char_before_cursor(&self) -> Option<char> {
        self.content[..self.cursor].chars().next_back()
    }

    /// The char starting at the cursor, if the cursor is not at the end
    fn char_at_cursor(&self) -> Option<char> {
        self.content[self.cursor..].chars().next()
    }

    /// Display width of the text before the cursor
    fn cursor_display_width(&self) -> usize {
        self.content[..self.cursor].width()
    }

    /// Handle an input action
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        match action {
            Action::Char(c) => {
                self.insert_char(*c);
                self.update_scroll(width as usize);
                true
            }
            Action::Backspace => match self.char_before_cursor() {
                Some(c) => {
                    self.cursor -= c.len_utf8();
                    self.content.remove(self.cursor);
                    self.update_scroll(width as usize);
                    true
                }
                None => false,
            },
            Action::Delete => {
                if self.cursor < self.content.len() {
                    self.content.remove(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => match self.char_before_cursor() {
                Some(c) => {
                    self.cursor -= c.len_utf8();
                    self.update_scroll(width as usize);
                    true
                }
                None => false,
            },
            Action::Right => match self.char_at_cursor() {
                Some(c) => {
                    self.cursor += c.len_utf8();
                    self.update_scroll(width as usize);
                    true
                }
                None => false,
            },
            Action::Home | Action::LineStart => {
                self.cursor = 0;
                self.update_scroll(width as usize);
                true
            }
            Action::End => {
                self.cursor = self.content.len();
                self.update_scroll(width as usize);
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                // Trailing spaces, then the word before them
                let prefix = &self.content[..self.cursor];
                let word_end = prefix.trim_end_matches(' ').len();
                let start = self.content[..word_end]
                    .rfind(' ')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                self.content.replace_range(start..self.cursor, "");
                self.cursor = start;
                self.update_scroll(width as usize);
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    // Newlines become single spaces in a one-line input
                    if c == '\n' || c == '\r' {
                        if self.cursor > 0 && self.char_before_cursor() != Some(' ') {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                self.update_scroll(width as usize);
                true
            }
            _ => false,
        }
    }

    fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn update_scroll(&mut self, width: usize) {
        let visible_width = width.saturating_sub(4); // Account for borders/padding
        let cursor_pos = self.cursor_display_width();

        if cursor_pos < self.scroll {
            self.scroll = cursor_pos;
        } else if cursor_pos >= self.scroll + visible_width {
            self.scroll = cursor_pos - visible_width + 1;
        }
    }

    /// The slice of content visible at the current scroll, by display width
    fn visible_slice(&self, visible_width: usize) -> &str {
        let mut skipped = 0;
        let mut start = self.content.len();
        for (i, c) in self.content.char_indices() {
            if skipped >= self.scroll {
                start = i;
                break;
            }
            skipped += c.width().unwrap_or(0);
        }

        let mut shown = 0;
        let mut end = self.content.len();
        for (i, c) in self.content[start..].char_indices() {
            let w = c.width().unwrap_or(0);
            if shown + w > visible_width {
                end = start + i;
                break;
            }
            shown += w;
        }
        &self.content[start..end]
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });

        let inner = block.inner(area);
        block.render(area, buf);

        let (display_text, style) = if self.content.is_empty() {
            (self.placeholder.as_str(), theme.dim_style())
        } else {
            (self.visible_slice(inner.width as usize), theme.base_style())
        };

        let paragraph = Paragraph::new(display_text).style(style);
        paragraph.render(inner, buf);

        // Render cursor if focused
        if self.focused && inner.width > 0 {
            let cursor_x = self.cursor_display_width().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                let x = inner.x + cursor_x as u16;
                let y = inner.y;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empties_the_box() {
        let mut input = InputBox::new();
        input.set_content("show me flats in Camden");
        assert_eq!(input.take(), "show me flats in Camden");
        assert_eq!(input.content(), "");
    }

    #[test]
    fn test_backspace_respects_char_boundaries() {
        let mut input = InputBox::new();
        input.set_content("a£b");
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "a£");
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "a");
    }

    #[test]
    fn test_delete_word() {
        let mut input = InputBox::new();
        input.set_content("two bedroom flat");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "two bedroom ");
    }

    #[test]
    fn test_cursor_moves_over_multibyte_chars() {
        let mut input = InputBox::new();
        input.set_content("£5");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Char('~'), 80);
        assert_eq!(input.content(), "~£5");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("flats\r\nin Camden".to_string()), 80);
        assert_eq!(input.content(), "flats in Camden");
    }
}
