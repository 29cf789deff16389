//! Paging state for image carousels.

/// Which slide of a carousel is visible. Paging wraps at both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarouselState {
    index: usize,
}

impl CarouselState {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current position clamped to a carousel of `len` slides
    pub fn position(&self, len: usize) -> usize {
        if len == 0 { 0 } else { self.index % len }
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.index = (self.position(len) + 1) % len;
    }

    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.index = (self.position(len) + len - 1) % len;
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps_to_first() {
        let mut state = CarouselState::default();
        state.next(3);
        state.next(3);
        assert_eq!(state.position(3), 2);
        state.next(3);
        assert_eq!(state.position(3), 0);
    }

    #[test]
    fn test_prev_from_first_wraps_to_last() {
        let mut state = CarouselState::default();
        state.prev(4);
        assert_eq!(state.position(4), 3);
    }

    #[test]
    fn test_empty_carousel_is_inert() {
        let mut state = CarouselState::default();
        state.next(0);
        state.prev(0);
        assert_eq!(state.position(0), 0);
    }

    #[test]
    fn test_position_clamps_when_slides_shrink() {
        let mut state = CarouselState::default();
        state.next(5);
        state.next(5);
        state.next(5);
        assert_eq!(state.position(5), 3);
        // Re-formatted content with fewer slides keeps a valid position.
        assert_eq!(state.position(2), 1);
    }
}
