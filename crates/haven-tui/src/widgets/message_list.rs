//! Message list widget for displaying chat messages

use crate::carousel::CarouselState;
use crate::content::{format_content, ContentBlock, LISTING_DOMAINS};
use crate::theme::Theme;
use crate::widgets::render::render_blocks;
use crate::widgets::spinner;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use std::time::Instant;
use textwrap;

/// A single message in the chat
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Role: "user", "assistant", "system"
    pub role: String,
    /// Message content
    pub content: String,
    /// Whether this is an error message
    pub is_error: bool,
    /// Whether this is currently streaming
    pub is_streaming: bool,
    /// Which slide this message's carousels show
    pub carousel: CarouselState,
    /// How many leading table columns are scrolled out
    pub table_offset: usize,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            is_error: false,
            is_streaming: false,
            carousel: CarouselState::default(),
            table_offset: 0,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            is_error: false,
            is_streaming: false,
            carousel: CarouselState::default(),
            table_offset: 0,
        }
    }

    /// Create a streaming assistant message
    pub fn assistant_streaming(content: impl Into<String>) -> Self {
        Self {
            is_streaming: true,
            ..Self::assistant(content)
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            is_error: false,
            is_streaming: false,
            carousel: CarouselState::default(),
            table_offset: 0,
        }
    }

    /// Create an error message
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::system(content)
        }
    }

    /// Formatted content blocks for this message
    pub fn blocks(&self, saved_urls: &[String]) -> Vec<ContentBlock> {
        format_content(&self.content, saved_urls, &LISTING_DOMAINS)
    }

    /// Slide count of the largest carousel in this message
    pub fn carousel_len(&self, saved_urls: &[String]) -> usize {
        self.blocks(saved_urls)
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Carousel { slides } => Some(slides.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Whether this message contains a table
    pub fn has_table(&self, saved_urls: &[String]) -> bool {
        self.blocks(saved_urls)
            .iter()
            .any(|b| matches!(b, ContentBlock::Table { .. }))
    }
}

/// Widget for displaying a list of chat messages
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    saved_urls: &'a [String],
    scroll: usize,
    spinner_start: Instant,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            saved_urls: &[],
            scroll: 0,
            spinner_start: Instant::now(),
        }
    }

    /// Set the saved-listing URLs driving like toggles
    pub fn saved_urls(mut self, saved_urls: &'a [String]) -> Self {
        self.saved_urls = saved_urls;
        self
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Clock the in-bubble indicator off the same start as the status spinner
    pub fn spinner_start(mut self, start: Instant) -> Self {
        self.spinner_start = start;
        self
    }

    fn render_message(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let (role_text, role_style, prefix) = match msg.role.as_str() {
            "user" => ("You", self.theme.accent_bold(), "▶ "),
            "assistant" => (
                "Haven",
                self.theme.success_style().add_modifier(Modifier::BOLD),
                "◀ ",
            ),
            "system" => ("System", self.theme.dim_style(), "● "),
            _ => ("Unknown", self.theme.dim_style(), "  "),
        };

        let header = if msg.is_streaming {
            format!("{}{} ▌", prefix, role_text)
        } else {
            format!("{}{}", prefix, role_text)
        };

        lines.push(Line::from(Span::styled(header, role_style)));

        let content_width = width.saturating_sub(2);

        if msg.role == "assistant" && !msg.is_error {
            if msg.content.is_empty() && msg.is_streaming {
                // Animated indicator while nothing has arrived yet
                lines.push(Line::from(Span::styled(
                    format!(
                        "  {} Generating response...",
                        spinner::frame_at(self.spinner_start)
                    ),
                    self.theme.accent_style(),
                )));
            } else {
                let blocks = msg.blocks(self.saved_urls);
                let block_lines = render_blocks(
                    &blocks,
                    self.theme,
                    content_width,
                    msg.carousel,
                    msg.table_offset,
                );
                for line in block_lines {
                    // Indent the line
                    let mut indented_spans = vec![Span::raw("  ")];
                    indented_spans.extend(
                        line.spans
                            .into_iter()
                            .map(|s| Span::styled(s.content.into_owned(), s.style)),
                    );
                    lines.push(Line::from(indented_spans));
                }
            }
        } else {
            let content_style = if msg.is_error {
                self.theme.error_style()
            } else {
                self.theme.base_style()
            };

            let wrapped = textwrap::wrap(&msg.content, content_width);
            for line in wrapped {
                lines.push(Line::from(Span::styled(
                    format!("  {}", line),
                    content_style,
                )));
            }
        }

        // Empty line between messages
        lines.push(Line::from(""));

        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::NONE);

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();

        for msg in self.messages {
            all_lines.extend(self.render_message(msg, width));
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(inner.height as usize)
            .collect();

        let paragraph = Paragraph::new(visible_lines).wrap(Wrap { trim: false });
        paragraph.render(inner, buf);
    }
}

/// Calculate total height of messages
pub fn calculate_message_height(
    messages: &[ChatMessage],
    width: usize,
    saved_urls: &[String],
) -> usize {
    let mut total = 0;
    let theme = Theme::dark(); // Use default theme for calculation
    let content_width = width.saturating_sub(2);

    for msg in messages {
        // Role header
        total += 1;

        // Content lines, must match actual rendering logic
        if msg.role == "assistant" && !msg.is_error {
            if msg.content.is_empty() && msg.is_streaming {
                total += 1;
            } else {
                let blocks = msg.blocks(saved_urls);
                total += render_blocks(
                    &blocks,
                    &theme,
                    content_width,
                    msg.carousel,
                    msg.table_offset,
                )
                .len();
            }
        } else {
            let wrapped = textwrap::wrap(&msg.content, content_width);
            total += wrapped.len();
        }

        // Separator
        total += 1;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_counts_header_and_separator() {
        let messages = vec![ChatMessage::user("hi")];
        assert_eq!(calculate_message_height(&messages, 80, &[]), 3);
    }

    #[test]
    fn test_empty_streaming_message_is_one_line() {
        let messages = vec![ChatMessage::assistant_streaming("")];
        assert_eq!(calculate_message_height(&messages, 80, &[]), 3);
    }

    #[test]
    fn test_generating_indicator_uses_shared_spinner_clock() {
        use std::time::Duration;

        let theme = Theme::dark();
        let messages = vec![ChatMessage::assistant_streaming("")];
        let start = Instant::now() - Duration::from_millis(85);
        let list = MessageList::new(&messages, &theme).spinner_start(start);

        let lines = list.render_message(&messages[0], 80);
        let indicator: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(indicator.contains(spinner::frame_at(start)));
        assert!(indicator.contains("Generating response..."));
    }

    #[test]
    fn test_carousel_len_reports_slides() {
        let msg = ChatMessage::assistant(
            "<div class=\"carousel\"><img src=\"https://i.test/a.jpg\"><img src=\"https://i.test/b.jpg\"></div>",
        );
        assert_eq!(msg.carousel_len(&[]), 2);
        assert!(!msg.has_table(&[]));
    }
}
