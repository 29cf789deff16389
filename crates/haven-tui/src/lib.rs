//! haven-tui: Terminal UI components
//!
//! Chat rendering for the terminal, built on ratatui and crossterm. Response
//! text is formatted through [`content`] into structural blocks that the
//! widgets render, so listing links, carousels, map pins, and tables survive
//! the trip from markdown to the screen.

pub mod carousel;
pub mod content;
pub mod input;
pub mod theme;
pub mod widgets;

pub use carousel::CarouselState;
pub use content::{format_content, ContentBlock, Inline, LinkKind, LISTING_DOMAINS};
pub use theme::Theme;
