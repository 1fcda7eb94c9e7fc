//! Canned-reply matching
//!
//! Input is lower-cased and nothing else: no accent or punctuation stripping.
//! Rules are tried in table order and the first hit wins. For each rule the
//! whole trigger phrase is tried as a substring first, then each of its
//! whitespace-separated keywords. Greeting and thanks keyword sets are only
//! consulted when no rule matched.

use serde::{Deserialize, Serialize};

/// One row of the response table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRule {
    pub trigger: String,
    pub reply: String,
}

impl ResponseRule {
    pub fn new(trigger: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            reply: reply.into(),
        }
    }
}

/// A keyword set sharing one fixed reply (greetings, thanks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordReply {
    pub keywords: Vec<String>,
    pub reply: String,
}

impl KeywordReply {
    fn matched_keyword(&self, normalized: &str) -> Option<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .find(|keyword| normalized.contains(keyword))
    }
}

/// Which rule produced a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match<'a> {
    /// The full trigger phrase appeared in the input
    Phrase { trigger: &'a str, reply: &'a str },
    /// One keyword of the trigger phrase appeared in the input
    Keyword {
        trigger: &'a str,
        keyword: &'a str,
        reply: &'a str,
    },
    Greeting { keyword: &'a str, reply: &'a str },
    Thanks { keyword: &'a str, reply: &'a str },
}

impl<'a> Match<'a> {
    pub fn reply(&self) -> &'a str {
        match *self {
            Match::Phrase { reply, .. }
            | Match::Keyword { reply, .. }
            | Match::Greeting { reply, .. }
            | Match::Thanks { reply, .. } => reply,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Responder {
    rules: Vec<ResponseRule>,
    greeting: KeywordReply,
    thanks: KeywordReply,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(default_responses(), default_greeting(), default_thanks())
    }
}

impl Responder {
    pub fn new(rules: Vec<ResponseRule>, greeting: KeywordReply, thanks: KeywordReply) -> Self {
        Self {
            rules,
            greeting,
            thanks,
        }
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    /// Find a canned reply for raw user text. `None` means nothing matched;
    /// the caller decides what to say then.
    pub fn respond(&self, input: &str) -> Option<Match<'_>> {
        let normalized = input.to_lowercase();

        for rule in &self.rules {
            if normalized.contains(rule.trigger.as_str()) {
                return Some(Match::Phrase {
                    trigger: &rule.trigger,
                    reply: &rule.reply,
                });
            }

            // Loose on purpose: any single keyword of the trigger is enough.
            if let Some(keyword) = rule
                .trigger
                .split_whitespace()
                .find(|keyword| normalized.contains(keyword))
            {
                return Some(Match::Keyword {
                    trigger: &rule.trigger,
                    keyword,
                    reply: &rule.reply,
                });
            }
        }

        if let Some(keyword) = self.greeting.matched_keyword(&normalized) {
            return Some(Match::Greeting {
                keyword,
                reply: &self.greeting.reply,
            });
        }

        if let Some(keyword) = self.thanks.matched_keyword(&normalized) {
            return Some(Match::Thanks {
                keyword,
                reply: &self.thanks.reply,
            });
        }

        None
    }
}

pub fn default_responses() -> Vec<ResponseRule> {
    vec![
        ResponseRule::new(
            "available services",
            "We offer:\n- Website design and development\n- Branding and logo design\n- SEO audits\n- Ongoing site maintenance\nWhich one would you like to know more about?",
        ),
        ResponseRule::new(
            "opening hours",
            "We're open Monday to Friday from 9:00 to 18:00, and Saturday from 10:00 to 14:00.",
        ),
        ResponseRule::new(
            "pricing quote",
            "Every project is quoted individually. Tell us a little about what you need through the contact form and we'll send a free estimate within two business days.",
        ),
        ResponseRule::new(
            "contact phone email",
            "You can reach us at hello@example.com or call +1 555 0100 during opening hours.",
        ),
        ResponseRule::new(
            "location address",
            "Our studio is at 12 Market Street. Visitors are welcome by appointment.",
        ),
    ]
}

pub fn default_greeting() -> KeywordReply {
    KeywordReply {
        keywords: ["hello", "hi", "hey", "good morning", "good afternoon", "good evening"]
            .into_iter()
            .map(String::from)
            .collect(),
        reply: "Hello! How can I help you today? You can ask about our services, opening hours or pricing.".to_string(),
    }
}

pub fn default_thanks() -> KeywordReply {
    KeywordReply {
        keywords: ["thank you", "thanks", "cheers", "appreciate"]
            .into_iter()
            .map(String::from)
            .collect(),
        reply: "You're welcome! Is there anything else I can help you with?".to_string(),
    }
}

pub const DEFAULT_FALLBACK_REPLY: &str = "I'm not sure I understood that. For anything else, email hello@example.com or call +1 555 0100 and our team will get back to you.";

#[cfg(test)]
mod tests {
    use super::*;

    fn services_reply() -> String {
        default_responses()[0].reply.clone()
    }

    #[test]
    fn test_full_trigger_phrase_matches() {
        let responder = Responder::default();
        let m = responder.respond("What are your available services?").unwrap();
        assert!(matches!(m, Match::Phrase { trigger: "available services", .. }));
        assert_eq!(m.reply(), services_reply());
    }

    #[test]
    fn test_input_is_lower_cased() {
        let responder = Responder::default();
        let m = responder.respond("AVAILABLE SERVICES please").unwrap();
        assert_eq!(m.reply(), services_reply());
    }

    #[test]
    fn test_single_keyword_is_enough() {
        let responder = Responder::default();
        let m = responder.respond("where is your address?").unwrap();
        assert_eq!(
            m,
            Match::Keyword {
                trigger: "location address",
                keyword: "address",
                reply: &default_responses()[4].reply,
            }
        );
    }

    #[test]
    fn test_first_rule_in_table_order_wins() {
        let responder = Responder::new(
            vec![
                ResponseRule::new("shop hours", "first"),
                ResponseRule::new("opening hours", "second"),
            ],
            default_greeting(),
            default_thanks(),
        );
        // "opening hours" is a full phrase match for the second rule, but the
        // keyword "hours" already hits the first one.
        assert_eq!(responder.respond("opening hours?").unwrap().reply(), "first");
    }

    #[test]
    fn test_greeting_fallthrough() {
        let responder = Responder::default();
        let m = responder.respond("hi there").unwrap();
        assert!(matches!(m, Match::Greeting { keyword: "hi", .. }));
        assert_eq!(m.reply(), default_greeting().reply);
    }

    #[test]
    fn test_thanks_after_greeting() {
        let responder = Responder::default();
        let m = responder.respond("Thank you!").unwrap();
        assert!(matches!(m, Match::Thanks { keyword: "thank you", .. }));
    }

    #[test]
    fn test_no_match() {
        let responder = Responder::default();
        assert!(responder.respond("xyz123").is_none());
    }

    #[test]
    fn test_empty_reply_is_still_a_match() {
        let responder = Responder::new(
            vec![ResponseRule::new("silence", "")],
            default_greeting(),
            default_thanks(),
        );
        let m = responder.respond("silence please");
        assert_eq!(m.map(|m| m.reply()), Some(""));
    }

    #[test]
    fn test_punctuation_and_accents_are_kept() {
        let responder = Responder::new(
            vec![ResponseRule::new("café", "coffee")],
            KeywordReply { keywords: vec![], reply: String::new() },
            KeywordReply { keywords: vec![], reply: String::new() },
        );
        assert!(responder.respond("CAFÉ?").is_some());
        assert!(responder.respond("cafe").is_none());
    }
}
