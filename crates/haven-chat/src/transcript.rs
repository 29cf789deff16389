//! The append-only conversation transcript.

use haven_api::{Role, Turn};

/// Ordered history of committed turns.
///
/// Turns are only ever appended; the one exception is an explicit
/// [`Transcript::clear`]. In-flight response text never lives here, it is
/// buffered by the session until the stream closes.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of user turns, used for the personalized-query gate
    pub fn user_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::User).count()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut t = Transcript::new();
        t.push(Turn::user("first"));
        t.push(Turn::assistant("second"));
        assert_eq!(t.len(), 2);
        assert_eq!(t.turns()[0].content, "first");
        assert_eq!(t.last().unwrap().content, "second");
    }

    #[test]
    fn test_user_turns_counts_only_user_role() {
        let mut t = Transcript::new();
        t.push(Turn::user("q"));
        t.push(Turn::assistant("a"));
        t.push(Turn::user("q2"));
        assert_eq!(t.user_turns(), 2);
    }

    #[test]
    fn test_clear_empties() {
        let mut t = Transcript::new();
        t.push(Turn::user("q"));
        t.clear();
        assert!(t.is_empty());
    }
}
