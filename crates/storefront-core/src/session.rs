//! Open/closed state of the chat widget and its attention badge

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    state: SessionState,
    attention_visible: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn is_attention_visible(&self) -> bool {
        self.attention_visible
    }

    /// Closed -> Open. Also clears the attention badge. Returns false if the
    /// session was already open.
    pub fn open(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.state = SessionState::Open;
        self.attention_visible = false;
        true
    }

    /// Open -> Closed. Returns false if the session was already closed.
    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = SessionState::Closed;
        true
    }

    pub fn toggle(&mut self) -> SessionState {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
        self.state
    }

    /// The deferred attention signal fired. The badge only appears if the user
    /// hasn't opened the chat yet; returns whether it is now showing.
    pub fn attention_due(&mut self) -> bool {
        if self.is_open() || self.attention_visible {
            return false;
        }
        self.attention_visible = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let session = ChatSession::new();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.is_attention_visible());
    }

    #[test]
    fn test_toggle_inverts() {
        let mut session = ChatSession::new();
        assert_eq!(session.toggle(), SessionState::Open);
        assert_eq!(session.toggle(), SessionState::Closed);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = ChatSession::new();
        assert!(!session.close());
        assert!(!session.close());
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_attention_shown_while_closed() {
        let mut session = ChatSession::new();
        assert!(session.attention_due());
        assert!(session.is_attention_visible());
    }

    #[test]
    fn test_opening_clears_attention() {
        let mut session = ChatSession::new();
        session.attention_due();
        assert!(session.open());
        assert!(!session.is_attention_visible());
    }

    #[test]
    fn test_attention_suppressed_while_open() {
        let mut session = ChatSession::new();
        session.open();
        assert!(!session.attention_due());
        assert!(!session.is_attention_visible());
    }

    #[test]
    fn test_attention_shown_after_open_then_close() {
        let mut session = ChatSession::new();
        session.open();
        session.close();
        assert!(!session.is_attention_visible());

        assert!(session.attention_due());
        assert!(session.is_attention_visible());
        // shown once, not re-raised
        assert!(!session.attention_due());
    }
}
