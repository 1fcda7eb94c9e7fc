pub mod assistant;
pub mod config;
pub mod contact;
pub mod notify;
pub mod responder;
pub mod session;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use assistant::{ChatAssistant, ChatEffect, ChatOptions, PendingReply, QuickReply};
pub use config::{BusinessProfile, Config, ConfigError};
pub use contact::{ContactField, ContactForm, FieldError};
pub use notify::{Notification, NotificationKind, Notifier};
pub use responder::{KeywordReply, Match, Responder, ResponseRule};
pub use session::{ChatSession, SessionState};
pub use state::{Message, Sender};
pub use store::MessageStore;
