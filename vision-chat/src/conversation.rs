/// Image context plus the question/answer turns asked against it.
///
/// `history` alternates question, answer, question, ... except when an answer
/// could not be produced, in which case the question stands alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    image_context: Option<String>,
    history: Vec<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the image context and drops every previous turn.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.image_context = Some(context.into());
        self.history.clear();
    }

    pub fn record_turn(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    pub fn image_context(&self) -> Option<&str> {
        self.image_context.as_deref()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The last `n` history entries (fewer if history is shorter).
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Forgets both the context and the history.
    pub fn clear(&mut self) {
        self.image_context = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_context_clears_history() {
        let mut state = ConversationState::new();
        state.set_context("X");
        state.record_turn("what is it?");
        state.record_turn("a dog");
        state.set_context("Y");
        assert!(state.history().is_empty());
        assert_eq!(state.image_context(), Some("Y"));
    }

    #[test]
    fn recent_is_bounded_by_history_length() {
        let mut state = ConversationState::new();
        state.set_context("ctx");
        assert!(state.recent(3).is_empty());
        for turn in ["q1", "a1", "q2", "a2"] {
            state.record_turn(turn);
        }
        assert_eq!(state.recent(3), ["a1", "q2", "a2"]);
        assert_eq!(state.recent(10).len(), 4);
    }

    #[test]
    fn clear_removes_context() {
        let mut state = ConversationState::new();
        state.set_context("ctx");
        state.record_turn("q");
        state.clear();
        assert_eq!(state, ConversationState::default());
    }
}
