//! Bounded conversation history
//!
//! Holds the visible messages in chronological order and never lets the history
//! grow past `max_messages`: the oldest messages are evicted first. The typing
//! indicator lives alongside the messages but is never one of them.

use crate::state::Message;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

pub const DEFAULT_MAX_MESSAGES: usize = 40;

#[derive(Debug, Clone)]
pub struct MessageStore {
    messages: VecDeque<Message>,
    max_messages: NonZeroUsize,
    typing: bool,
}

impl MessageStore {
    pub fn new(max_messages: NonZeroUsize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages.get()),
            max_messages,
            typing: false,
        }
    }

    /// Append one message, returning how many old messages were evicted
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push_back(message);
        self.enforce_bound()
    }

    /// Append a group of messages, then enforce the bound once
    pub fn append_batch<I>(&mut self, messages: I) -> usize
    where
        I: IntoIterator<Item = Message>,
    {
        self.messages.extend(messages);
        self.enforce_bound()
    }

    fn enforce_bound(&mut self) -> usize {
        let max = self.max_messages.get();
        let excess = self.messages.len().saturating_sub(max);
        if excess > 0 {
            self.messages.drain(..excess);
            tracing::debug!(evicted = excess, max, "evicted oldest chat messages");
        }
        excess
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages.get()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.messages.iter()
    }

    pub fn latest(&self) -> Option<&Message> {
        self.messages.back()
    }

    /// Show the typing indicator. Returns false if it was already showing.
    pub fn show_typing(&mut self) -> bool {
        if self.typing {
            return false;
        }
        self.typing = true;
        true
    }

    /// Hide the typing indicator. Returns false if it wasn't showing.
    pub fn hide_typing(&mut self) -> bool {
        std::mem::replace(&mut self.typing, false)
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Sender;

    fn store(max: usize) -> MessageStore {
        MessageStore::new(NonZeroUsize::new(max).unwrap())
    }

    fn texts(store: &MessageStore) -> Vec<&str> {
        store.iter().map(|m| m.text()).collect()
    }

    #[test]
    fn test_length_tracks_min_of_appended_and_bound() {
        let mut store = store(5);
        for n in 1..=12 {
            store.append(Message::user(format!("m{}", n)));
            assert_eq!(store.len(), n.min(5));
        }
        assert_eq!(texts(&store), vec!["m8", "m9", "m10", "m11", "m12"]);
    }

    #[test]
    fn test_append_at_bound_evicts_only_oldest() {
        let mut store = store(3);
        store.append(Message::user("a"));
        store.append(Message::user("b"));
        store.append(Message::user("c"));
        let evicted = store.append(Message::user("d"));
        assert_eq!(evicted, 1);
        assert_eq!(texts(&store), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_alternating_senders_keep_last_three() {
        let mut store = store(3);
        store.append(Message::user("a"));
        store.append(Message::assistant("b"));
        store.append(Message::user("c"));
        store.append(Message::assistant("d"));

        let kept: Vec<(Sender, &str)> = store.iter().map(|m| (m.sender(), m.text())).collect();
        assert_eq!(
            kept,
            vec![
                (Sender::Assistant, "b"),
                (Sender::User, "c"),
                (Sender::Assistant, "d"),
            ]
        );
    }

    #[test]
    fn test_batch_larger_than_bound_keeps_tail() {
        let mut store = store(2);
        store.append(Message::user("old"));
        let evicted = store.append_batch(vec![
            Message::user("x"),
            Message::assistant("y"),
            Message::user("z"),
        ]);
        assert_eq!(evicted, 2);
        assert_eq!(texts(&store), vec!["y", "z"]);
    }

    #[test]
    fn test_typing_indicator_is_a_singleton() {
        let mut store = store(3);
        assert!(store.show_typing());
        assert!(!store.show_typing());
        assert!(store.is_typing());

        assert!(store.hide_typing());
        assert!(!store.hide_typing());
        assert!(store.show_typing());
        assert!(store.is_typing());
    }

    #[test]
    fn test_typing_indicator_not_counted() {
        let mut store = store(1);
        store.append(Message::user("only"));
        store.show_typing();
        assert_eq!(store.len(), 1);
        assert_eq!(store.latest().map(|m| m.text()), Some("only"));
    }
}
