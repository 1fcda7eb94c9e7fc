use crate::assistant::{default_quick_replies, ChatOptions, QuickReply, DEFAULT_TIME_FORMAT};
use crate::responder::{
    default_greeting, default_responses, default_thanks, KeywordReply, Responder, ResponseRule,
    DEFAULT_FALLBACK_REPLY,
};
use crate::store::DEFAULT_MAX_MESSAGES;
use anyhow::{anyhow, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_messages must be greater than 0")]
    ZeroMaxMessages,
    #[error("response rule #{index} has an empty trigger")]
    EmptyTrigger { index: usize },
    #[error("{set} keyword list contains an empty keyword")]
    EmptyKeyword { set: &'static str },
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
}

/// Text shown on the storefront page around the chat widget
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BusinessProfile {
    pub name: String,
    pub tagline: String,
    pub about: Vec<String>,
    pub services: Vec<String>,
    pub hours: Vec<String>,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            name: "Northwind Studio".to_string(),
            tagline: "Websites and branding for small businesses".to_string(),
            about: vec![
                "We're a small team of designers and developers helping local businesses look great online.".to_string(),
                "Every project starts with a conversation: tell us what you need and we'll take it from there.".to_string(),
            ],
            services: vec![
                "Website design and development".to_string(),
                "Branding and logo design".to_string(),
                "SEO audits".to_string(),
                "Ongoing site maintenance".to_string(),
            ],
            hours: vec![
                "Mon-Fri  9:00-18:00".to_string(),
                "Sat      10:00-14:00".to_string(),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub max_messages: usize,
    pub reply_delay_ms: u64,
    pub attention_delay_ms: u64,
    pub notification_ttl_ms: u64,
    pub time_format: String,
    pub welcome_message: Option<String>,
    pub fallback_reply: String,
    /// Tried in order, first match wins
    pub responses: Vec<ResponseRule>,
    pub greeting: KeywordReply,
    pub thanks: KeywordReply,
    pub quick_replies: Vec<QuickReply>,
    pub business: BusinessProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            reply_delay_ms: 900,
            attention_delay_ms: 5000,
            notification_ttl_ms: 4000,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            welcome_message: Some(
                "Hi! I'm the studio assistant. Ask me about our services, opening hours or pricing."
                    .to_string(),
            ),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            responses: default_responses(),
            greeting: default_greeting(),
            thanks: default_thanks(),
            quick_replies: default_quick_replies(),
            business: BusinessProfile::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("storefront-chat").join("config.json"))
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn attention_delay(&self) -> Duration {
        Duration::from_millis(self.attention_delay_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    /// Check the chat settings and turn them into assistant options
    pub fn chat_options(&self) -> Result<ChatOptions, ConfigError> {
        let max_messages =
            NonZeroUsize::new(self.max_messages).ok_or(ConfigError::ZeroMaxMessages)?;

        if let Some(index) = self.responses.iter().position(|r| r.trigger.trim().is_empty()) {
            return Err(ConfigError::EmptyTrigger { index });
        }
        for rule in &self.responses {
            if rule.trigger.chars().any(char::is_uppercase) {
                tracing::warn!(
                    trigger = %rule.trigger,
                    "trigger contains upper-case letters and can only match by keyword"
                );
            }
        }

        for (set, keywords) in [("greeting", &self.greeting), ("thanks", &self.thanks)] {
            if keywords.keywords.iter().any(|k| k.is_empty()) {
                return Err(ConfigError::EmptyKeyword { set });
            }
        }

        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidTimeFormat(self.time_format.clone()));
        }

        Ok(ChatOptions {
            max_messages,
            responder: Responder::new(
                self.responses.clone(),
                self.greeting.clone(),
                self.thanks.clone(),
            ),
            fallback_reply: self.fallback_reply.clone(),
            quick_replies: self.quick_replies.clone(),
            reply_delay: self.reply_delay(),
            time_format: self.time_format.clone(),
            welcome_message: self.welcome_message.clone(),
        })
    }
}
