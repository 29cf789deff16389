//! Animated spinner widget

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::{Duration, Instant};

/// Spinner animation frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Time each frame is held
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// The frame to show for an animation started at `start`
pub fn frame_at(start: Instant) -> &'static str {
    let frame_index = (start.elapsed().as_millis() / FRAME_DURATION.as_millis()) as usize;
    SPINNER_FRAMES[frame_index % SPINNER_FRAMES.len()]
}

/// Animated spinner widget
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    start_time: Instant,
}

impl<'a> Spinner<'a> {
    /// Create a new spinner
    pub fn new(label: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            theme,
            start_time: Instant::now(),
        }
    }

    /// Create with a specific start time (for consistent animation)
    pub fn with_start_time(mut self, start: Instant) -> Self {
        self.start_time = start;
        self
    }

    /// Get the current frame based on elapsed time
    fn current_frame(&self) -> &'static str {
        frame_at(self.start_time)
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }

        let frame = self.current_frame();
        let text = format!("{} {}", frame, self.label);

        let span = Span::styled(&text, self.theme.accent_style());
        buf.set_span(area.x, area.y, &span, area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_advances_with_time() {
        let theme = Theme::dark();
        let spinner = Spinner::new("working", &theme)
            .with_start_time(Instant::now() - Duration::from_millis(85));
        assert_eq!(spinner.current_frame(), SPINNER_FRAMES[1]);
    }
}
