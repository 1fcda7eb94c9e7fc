//! UI-agnostic conversation types
//!
//! These types are shared by every front end (the terminal UI today) and don't
//! depend on any rendering framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Assistant",
        }
    }
}

/// A displayed chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    text: String,
    sender: Sender,
    timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self::at(sender, text, Local::now())
    }

    pub fn at(sender: Sender, text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Hour:minute style timestamp using a chrono format string
    pub fn formatted_time(&self, format: &str) -> String {
        self.timestamp.format(format).to_string()
    }

    /// Text split into display lines with terminal control sequences removed.
    ///
    /// Message text is untrusted: it may come straight from the keyboard or from
    /// a config file. Line breaks only decide where a display line ends.
    pub fn display_lines(&self) -> Vec<String> {
        sanitize_for_terminal(&self.text)
            .split('\n')
            .map(str::to_string)
            .collect()
    }
}

/// Drop control characters (ESC included) so text can't drive the terminal.
/// `\r\n` and lone `\r` become `\n`, tabs become four spaces.
pub fn sanitize_for_terminal(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello there");
        assert_eq!(msg.sender(), Sender::User);
        assert_eq!(msg.text(), "Hello there");
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        let clean = sanitize_for_terminal("\u{1b}[31mred\u{1b}[0m text\u{7}");
        assert_eq!(clean, "[31mred[0m text");
        assert!(!clean.chars().any(|c| c.is_control()));
    }

    #[test]
    fn test_display_lines_split_on_any_line_break() {
        let msg = Message::assistant("one\r\ntwo\rthree\nfour");
        assert_eq!(msg.display_lines(), vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_tabs_become_spaces() {
        assert_eq!(sanitize_for_terminal("a\tb"), "a    b");
    }

    #[test]
    fn test_formatted_time() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let msg = Message::at(Sender::Assistant, "hi", ts);
        assert_eq!(msg.formatted_time("%H:%M"), "14:05");
        assert_eq!(msg.formatted_time("%I:%M %p"), "02:05 PM");
    }
}
