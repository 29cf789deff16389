//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Move cursor up
    Up,
    /// Move cursor down
    Down,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Tab
    Tab,
    /// Shift+Tab
    BackTab,
    /// Escape
    Escape,
    /// Ctrl+C (interrupt)
    Interrupt,
    /// Ctrl+D (EOF)
    Eof,
    /// Ctrl+L (clear screen)
    Clear,
    /// Ctrl+U (clear line)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Ctrl+A (start of line)
    LineStart,
    /// Paste (from clipboard or bracketed paste)
    Paste(String),
    /// Quit application
    Quit,
    /// Previous carousel slide (Ctrl+Left)
    CarouselPrev,
    /// Next carousel slide (Ctrl+Right)
    CarouselNext,
    /// Scroll table columns left (Alt+Left)
    TableLeft,
    /// Scroll table columns right (Alt+Right)
    TableRight,
    /// Unknown/unhandled
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    // Handle Ctrl combinations first
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('d') => Action::Eof,
            KeyCode::Char('l') => Action::Clear,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            KeyCode::Char('a') => Action::LineStart,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Left => Action::CarouselPrev,
            KeyCode::Right => Action::CarouselNext,
            _ => Action::Unknown,
        };
    }

    // Handle Alt combinations
    if modifiers.contains(KeyModifiers::ALT) {
        return match code {
            KeyCode::Left => Action::TableLeft,
            KeyCode::Right => Action::TableRight,
            _ => Action::Unknown,
        };
    }

    // Regular keys
    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Tab => {
            if modifiers.contains(KeyModifiers::SHIFT) {
                Action::BackTab
            } else {
                Action::Tab
            }
        }
        KeyCode::BackTab => Action::BackTab,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_arrows_page_carousels() {
        let event = KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL);
        assert_eq!(key_to_action(event), Action::CarouselPrev);
        let event = KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL);
        assert_eq!(key_to_action(event), Action::CarouselNext);
    }

    #[test]
    fn test_plain_chars_pass_through() {
        let event = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(key_to_action(event), Action::Char('x'));
    }
}
