//! Contact form validation
//!
//! Checks happen locally; a valid submission is acknowledged with a toast and
//! the form is cleared. Nothing is sent anywhere.

use crate::notify::Notifier;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_MESSAGE_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub const ALL: [ContactField; 3] = [ContactField::Name, ContactField::Email, ContactField::Message];

    pub fn label(&self) -> &'static str {
        match self {
            ContactField::Name => "Name",
            ContactField::Email => "Email",
            ContactField::Message => "Message",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ContactField::Name => ContactField::Email,
            ContactField::Email => ContactField::Message,
            ContactField::Message => ContactField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ContactField::Name => ContactField::Message,
            ContactField::Email => ContactField::Name,
            ContactField::Message => ContactField::Email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{} is required", .0.label())]
    Required(ContactField),
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("message must be at least {min} characters")]
    MessageTooShort { min: usize },
}

impl FieldError {
    pub fn field(&self) -> ContactField {
        match self {
            FieldError::Required(field) => *field,
            FieldError::InvalidEmail => ContactField::Email,
            FieldError::MessageTooShort { .. } => ContactField::Message,
        }
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Message => &self.message,
        }
    }

    pub fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Message => &mut self.message,
        }
    }

    /// Every problem with the form, in field order
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::Required(ContactField::Name));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::Required(ContactField::Email));
        } else if !email_pattern().is_match(email) {
            errors.push(FieldError::InvalidEmail);
        }

        let message = self.message.trim();
        if message.is_empty() {
            errors.push(FieldError::Required(ContactField::Message));
        } else if message.chars().count() < MIN_MESSAGE_CHARS {
            errors.push(FieldError::MessageTooShort {
                min: MIN_MESSAGE_CHARS,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and acknowledge. On success the form is cleared.
    pub fn submit(&mut self, notifier: &mut Notifier) -> Result<(), Vec<FieldError>> {
        match self.validate() {
            Ok(()) => {
                let name = self.name.trim().to_string();
                tracing::info!(%name, "contact form submitted");
                notifier.success(format!("Thanks {}! We'll get back to you soon.", name));
                *self = Self::default();
                Ok(())
            }
            Err(errors) => {
                if let Some(first) = errors.first() {
                    let message = first.to_string();
                    notifier.error(capitalize(&message));
                }
                Err(errors)
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
