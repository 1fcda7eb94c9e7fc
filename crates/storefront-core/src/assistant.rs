//! The scripted chat assistant
//!
//! `ChatAssistant` ties the message store, the responder and the session
//! together. It never touches a screen: every visible change is queued as a
//! [`ChatEffect`] for whatever front end is rendering the widget, and replies
//! are handed back as [`PendingReply`] values for the caller to deliver once the
//! simulated thinking delay has passed.

use crate::responder::{Responder, DEFAULT_FALLBACK_REPLY};
use crate::session::{ChatSession, SessionState};
use crate::state::{Message, Sender};
use crate::store::{MessageStore, DEFAULT_MAX_MESSAGES};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(900);
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// A suggested message the user can send with one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub message: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

pub fn default_quick_replies() -> Vec<QuickReply> {
    vec![
        QuickReply::new("Services", "What are your available services?"),
        QuickReply::new("Hours", "What are your opening hours?"),
        QuickReply::new("Pricing", "How does pricing work?"),
        QuickReply::new("Contact", "How can I contact you?"),
    ]
}

/// Construction options, already validated
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub max_messages: NonZeroUsize,
    pub responder: Responder,
    pub fallback_reply: String,
    pub quick_replies: Vec<QuickReply>,
    pub reply_delay: Duration,
    pub time_format: String,
    pub welcome_message: Option<String>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            max_messages: NonZeroUsize::new(DEFAULT_MAX_MESSAGES).unwrap_or(NonZeroUsize::MIN),
            responder: Responder::default(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            quick_replies: default_quick_replies(),
            reply_delay: DEFAULT_REPLY_DELAY,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            welcome_message: None,
        }
    }
}

/// Something the rendering side should reflect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEffect {
    MessageAppended {
        sender: Sender,
        text: String,
        time: String,
    },
    TypingShown,
    TypingHidden,
    ScrollToLatest,
    OpenChanged(bool),
    AttentionBadge(bool),
    FocusInput,
}

/// A reply waiting for its simulated delay to elapse. Not `Clone`: delivering
/// consumes it, so each reply is appended at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingReply {
    id: u64,
    input: String,
}

impl PendingReply {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

#[derive(Debug)]
pub struct ChatAssistant {
    store: MessageStore,
    session: ChatSession,
    responder: Responder,
    fallback_reply: String,
    quick_replies: Vec<QuickReply>,
    reply_delay: Duration,
    time_format: String,
    effects: Vec<ChatEffect>,
    next_reply_id: u64,
    destroyed: bool,
}

impl Default for ChatAssistant {
    fn default() -> Self {
        Self::new(ChatOptions::default())
    }
}

impl ChatAssistant {
    pub fn new(options: ChatOptions) -> Self {
        let mut assistant = Self {
            store: MessageStore::new(options.max_messages),
            session: ChatSession::new(),
            responder: options.responder,
            fallback_reply: options.fallback_reply,
            quick_replies: options.quick_replies,
            reply_delay: options.reply_delay,
            time_format: options.time_format,
            effects: Vec::new(),
            next_reply_id: 0,
            destroyed: false,
        };

        if let Some(welcome) = options.welcome_message {
            assistant.push_message(Message::assistant(welcome));
        }

        tracing::debug!(
            max_messages = assistant.store.max_messages(),
            rules = assistant.responder.rules().len(),
            "chat assistant initialized"
        );
        assistant
    }

    // Read access for renderers

    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.store.iter()
    }

    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_typing(&self) -> bool {
        self.store.is_typing()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_attention_visible(&self) -> bool {
        self.session.is_attention_visible()
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.quick_replies
    }

    pub fn reply_delay(&self) -> Duration {
        self.reply_delay
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Drain queued effects in the order they happened
    pub fn take_effects(&mut self) -> Vec<ChatEffect> {
        std::mem::take(&mut self.effects)
    }

    // Conversation

    /// Submit typed text. Blank input is ignored. Otherwise the message is
    /// appended, the typing indicator shown, and the reply handed back for
    /// delivery after [`reply_delay`](Self::reply_delay).
    pub fn send_user_message(&mut self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() || self.destroyed {
            return None;
        }

        self.push_message(Message::user(text));
        if self.store.show_typing() {
            self.effects.push(ChatEffect::TypingShown);
            self.effects.push(ChatEffect::ScrollToLatest);
        }

        self.next_reply_id += 1;
        Some(PendingReply {
            id: self.next_reply_id,
            input: text.to_string(),
        })
    }

    /// Send the quick reply at `index`, as if its message had been typed
    pub fn send_quick_reply(&mut self, index: usize) -> Option<PendingReply> {
        let message = self.quick_replies.get(index)?.message.clone();
        self.send_user_message(&message)
    }

    /// Append the assistant's answer for a pending reply. Delivered whether
    /// the widget is open or closed; dropped once the assistant is destroyed.
    pub fn deliver_reply(&mut self, pending: PendingReply) {
        if self.destroyed {
            tracing::debug!(id = pending.id, "dropping reply for destroyed assistant");
            return;
        }

        if self.store.hide_typing() {
            self.effects.push(ChatEffect::TypingHidden);
        }

        let reply = match self.responder.respond(&pending.input) {
            Some(matched) => {
                tracing::debug!(id = pending.id, ?matched, "responder matched");
                matched.reply().to_string()
            }
            None => {
                tracing::debug!(id = pending.id, "no response rule matched, using fallback");
                self.fallback_reply.clone()
            }
        };

        self.push_message(Message::assistant(reply));
    }

    fn push_message(&mut self, message: Message) {
        let effect = ChatEffect::MessageAppended {
            sender: message.sender(),
            text: message.text().to_string(),
            time: message.formatted_time(&self.time_format),
        };
        self.store.append(message);
        self.effects.push(effect);
        self.effects.push(ChatEffect::ScrollToLatest);
    }

    // Session

    pub fn open(&mut self) {
        let had_badge = self.session.is_attention_visible();
        if self.session.open() {
            self.session_changed(had_badge);
        }
    }

    pub fn close(&mut self) {
        if self.session.close() {
            self.session_changed(false);
        }
    }

    pub fn toggle(&mut self) {
        let had_badge = self.session.is_attention_visible();
        self.session.toggle();
        self.session_changed(had_badge);
    }

    /// Queue the effects of a state change that already happened
    fn session_changed(&mut self, had_badge: bool) {
        match self.session.state() {
            SessionState::Open => {
                tracing::info!("chat opened");
                self.effects.push(ChatEffect::OpenChanged(true));
                if had_badge {
                    self.effects.push(ChatEffect::AttentionBadge(false));
                }
                self.effects.push(ChatEffect::FocusInput);
            }
            SessionState::Closed => {
                tracing::info!("chat closed");
                self.effects.push(ChatEffect::OpenChanged(false));
            }
        }
    }

    /// The delayed attention signal fired
    pub fn attention_due(&mut self) {
        if self.session.attention_due() {
            tracing::debug!("showing chat attention badge");
            self.effects.push(ChatEffect::AttentionBadge(true));
        }
    }

    /// Stop accepting input and drop any replies still in flight
    pub fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            if self.store.hide_typing() {
                self.effects.push(ChatEffect::TypingHidden);
            }
            tracing::debug!("chat assistant destroyed");
        }
    }
}
