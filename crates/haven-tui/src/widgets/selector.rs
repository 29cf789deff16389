//! Selector popup widget for choosing from a list of options

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Widget},
};

/// Maximum width for selector popups
const MAX_POPUP_WIDTH: u16 = 80;

/// An item in the selector
pub struct SelectorItem {
    /// Display label
    pub label: String,
    /// Optional description (shown only in width calculation for now)
    pub description: Option<String>,
    /// Whether this item is currently active
    pub is_current: bool,
}

impl SelectorItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            is_current: false,
        }
    }
}

/// A popup selector for choosing from a list of options
pub struct Selector<'a> {
    title: String,
    items: Vec<SelectorItem>,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> Selector<'a> {
    /// Create a new selector
    pub fn new(title: impl Into<String>, items: Vec<SelectorItem>, theme: &'a Theme) -> Self {
        let selected = items.iter().position(|item| item.is_current).unwrap_or(0);
        Self {
            title: title.into(),
            items,
            selected,
            theme,
        }
    }

    /// Set the selected index
    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected = index.min(self.items.len().saturating_sub(1));
        self
    }

    fn popup_size(&self, count: usize) -> (u16, u16) {
        let mut max_width = self.title.len() + 4;
        for item in &self.items {
            max_width = max_width.max(item.label.len() + 6);
            if let Some(d) = &item.description {
                max_width = max_width.max(d.len() + 8);
            }
        }
        let height = count as u16 + 2;
        let width = (max_width as u16).clamp(20, MAX_POPUP_WIDTH);
        (width, height.min(20))
    }

    /// Render the selector centered in the given area
    pub fn render_centered(&self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.popup_size(self.items.len());
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let popup_area = Rect::new(x, y, width.min(area.width), height.min(area.height));

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());

        let list_items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let prefix = if item.is_current { "● " } else { "  " };
                let style = if i == self.selected {
                    Style::default()
                        .bg(self.theme.accent)
                        .fg(self.theme.bg)
                        .add_modifier(Modifier::BOLD)
                } else if item.is_current {
                    self.theme.accent_style()
                } else {
                    self.theme.base_style()
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{}{}", prefix, item.label),
                    style,
                )))
            })
            .collect();

        let list = List::new(list_items)
            .block(block)
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.selected));

        ratatui::widgets::StatefulWidget::render(list, popup_area, buf, &mut state);
    }
}

/// State for the selector popup
#[derive(Default)]
pub struct SelectorState {
    /// Currently selected index
    pub selected: usize,
    /// Whether the selector is visible
    pub visible: bool,
}

impl SelectorState {
    /// Show the selector
    pub fn show(&mut self) {
        self.visible = true;
        self.selected = 0;
    }

    /// Hide the selector
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Move selection up
    pub fn up(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = item_count - 1;
        }
    }

    /// Move selection down
    pub fn down(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        if self.selected < item_count - 1 {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        let mut state = SelectorState::default();
        state.up(3);
        assert_eq!(state.selected, 2);
        state.down(3);
        assert_eq!(state.selected, 0);
    }
}
