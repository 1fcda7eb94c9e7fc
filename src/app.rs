use std::time::Instant;
use ratatui::layout::Rect;
use storefront_core::notify::DEFAULT_MAX_VISIBLE;
use storefront_core::{
    ChatAssistant, ChatEffect, Config, ContactField, ContactForm, FieldError, Notifier,
    PendingReply,
};
use crate::tui::{AppEvent, EventSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Page,
    Chat,
    Contact,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: Focus,
    pub config: Config,
    pub events: EventSender,

    // Chat widget. None when it couldn't be built; the page keeps working.
    pub assistant: Option<ChatAssistant>,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input (chars)
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of message area for scroll calculations
    pub chat_width: u16,  // Width of message area for wrap calculations

    // Notifications, lent to whoever raises one
    pub notifier: Notifier,

    // Contact form state
    pub contact: ContactForm,
    pub contact_field: ContactField,
    pub contact_cursor: usize,
    pub contact_errors: Vec<FieldError>,

    // Page state
    pub page_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub launcher_area: Option<Rect>,
    pub chat_area: Option<Rect>,
    pub quick_reply_areas: Vec<Rect>,
}

impl App {
    pub fn new(config: Config, events: EventSender) -> Self {
        let mut notifier = Notifier::new(config.notification_ttl(), DEFAULT_MAX_VISIBLE);

        let assistant = match config.chat_options() {
            Ok(options) => Some(ChatAssistant::new(options)),
            Err(e) => {
                tracing::error!("chat widget disabled: {}", e);
                notifier.error(format!("Chat is unavailable: {}", e));
                None
            }
        };

        Self {
            should_quit: false,
            focus: Focus::Page,
            config,
            events,

            assistant,
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            notifier,

            contact: ContactForm::default(),
            contact_field: ContactField::Name,
            contact_cursor: 0,
            contact_errors: Vec::new(),

            page_scroll: 0,
            animation_frame: 0,

            launcher_area: None,
            chat_area: None,
            quick_reply_areas: Vec::new(),
        }
    }

    /// Schedule the delayed attention badge. Call once the event loop runs.
    pub fn start(&mut self) {
        if self.assistant.is_some() {
            self.events
                .send_after(self.config.attention_delay(), AppEvent::AttentionDue);
        }
        self.apply_chat_effects();
    }

    pub fn quit(&mut self) {
        if let Some(assistant) = self.assistant.as_mut() {
            assistant.destroy();
        }
        self.should_quit = true;
    }

    pub fn chat_is_open(&self) -> bool {
        self.assistant.as_ref().is_some_and(|a| a.is_open())
    }

    // Chat session

    pub fn toggle_chat(&mut self) {
        match self.assistant.as_mut() {
            Some(assistant) => assistant.toggle(),
            None => {
                self.notifier.info("The chat assistant is unavailable right now.");
                return;
            }
        }
        self.apply_chat_effects();
    }

    pub fn close_chat(&mut self) {
        if let Some(assistant) = self.assistant.as_mut() {
            assistant.close();
        }
        self.apply_chat_effects();
    }

    pub fn on_attention_due(&mut self) {
        if let Some(assistant) = self.assistant.as_mut() {
            assistant.attention_due();
        }
        self.apply_chat_effects();
    }

    // Conversation

    /// Send what's in the input box. Blank input stays where it is.
    pub fn submit_chat_input(&mut self) {
        let Some(assistant) = self.assistant.as_mut() else {
            return;
        };
        if let Some(pending) = assistant.send_user_message(&self.chat_input) {
            self.chat_input.clear();
            self.chat_cursor = 0;
            self.schedule_reply(pending);
        }
        self.apply_chat_effects();
    }

    pub fn send_quick_reply(&mut self, index: usize) {
        let Some(assistant) = self.assistant.as_mut() else {
            return;
        };
        if let Some(pending) = assistant.send_quick_reply(index) {
            self.schedule_reply(pending);
        }
        self.apply_chat_effects();
    }

    fn schedule_reply(&mut self, pending: PendingReply) {
        let delay = self
            .assistant
            .as_ref()
            .map(|a| a.reply_delay())
            .unwrap_or_default();
        tracing::debug!(id = pending.id(), ?delay, "reply scheduled");
        self.events.send_after(delay, AppEvent::ReplyReady(pending));
    }

    pub fn on_reply_ready(&mut self, pending: PendingReply) {
        if let Some(assistant) = self.assistant.as_mut() {
            assistant.deliver_reply(pending);
        }
        self.apply_chat_effects();
    }

    /// React to whatever the assistant queued since the last call
    fn apply_chat_effects(&mut self) {
        let Some(assistant) = self.assistant.as_mut() else {
            return;
        };

        for effect in assistant.take_effects() {
            match effect {
                ChatEffect::MessageAppended { sender, text, time } => {
                    tracing::debug!(sender = sender.label(), %time, chars = text.chars().count(), "message appended");
                }
                ChatEffect::TypingShown | ChatEffect::TypingHidden => {
                    self.animation_frame = 0;
                }
                ChatEffect::ScrollToLatest => self.scroll_chat_to_bottom(),
                ChatEffect::OpenChanged(open) => {
                    if !open && self.focus == Focus::Chat {
                        self.focus = Focus::Page;
                    }
                }
                ChatEffect::AttentionBadge(visible) => {
                    tracing::debug!(visible, "attention badge");
                }
                ChatEffect::FocusInput => self.focus = Focus::Chat,
            }
        }
    }

    /// Tick animation frame and expire toasts (called by Tick event)
    pub fn tick(&mut self, now: Instant) {
        if self.assistant.as_ref().is_some_and(|a| a.is_typing()) {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.notifier.prune_expired(now);
    }

    /// Scroll chat to bottom so the latest message (or typing indicator) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let Some(assistant) = self.assistant.as_ref() else {
            return;
        };

        // Use actual chat width for wrap calculation, default to 40 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        let mut total_lines: u16 = 0;
        for msg in assistant.messages() {
            total_lines = total_lines.saturating_add(1); // Sender line
            for line in msg.display_lines() {
                total_lines = total_lines.saturating_add(wrapped_height(&line, wrap_width));
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if assistant.is_typing() {
            total_lines = total_lines.saturating_add(2); // Sender + "typing..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            15
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let current = self.chat_scroll;
        self.scroll_chat_to_bottom();
        let bottom = self.chat_scroll;
        self.chat_scroll = current.saturating_add(lines).min(bottom);
    }

    // Contact form

    pub fn open_contact_form(&mut self) {
        self.focus = Focus::Contact;
        self.contact_field = ContactField::Name;
        self.contact_cursor = self.contact.name.chars().count();
    }

    pub fn close_contact_form(&mut self) {
        self.focus = Focus::Page;
        self.contact_errors.clear();
    }

    pub fn select_contact_field(&mut self, field: ContactField) {
        self.contact_field = field;
        self.contact_cursor = self.contact.field(field).chars().count();
    }

    pub fn submit_contact_form(&mut self) {
        match self.contact.submit(&mut self.notifier) {
            Ok(()) => {
                self.contact_errors.clear();
                self.contact_cursor = 0;
                self.contact_field = ContactField::Name;
                self.focus = Focus::Page;
            }
            Err(errors) => {
                if let Some(first) = errors.first() {
                    self.select_contact_field(first.field());
                }
                self.contact_errors = errors;
            }
        }
    }

    pub fn contact_error_for(&self, field: ContactField) -> Option<&FieldError> {
        self.contact_errors.iter().find(|e| e.field() == field)
    }

    // Page

    pub fn scroll_page_down(&mut self, lines: u16) {
        self.page_scroll = self.page_scroll.saturating_add(lines);
    }

    pub fn scroll_page_up(&mut self, lines: u16) {
        self.page_scroll = self.page_scroll.saturating_sub(lines);
    }

    pub fn attention_visible(&self) -> bool {
        self.assistant
            .as_ref()
            .is_some_and(|a| a.is_attention_visible())
    }
}

/// Rows a line takes once wrapped at `width` columns
pub fn wrapped_height(line: &str, width: usize) -> u16 {
    let width = width.max(1);
    // Use character count, not byte length, for proper UTF-8 handling
    let char_count = line.chars().count();
    if char_count == 0 {
        1 // Empty line still takes one line
    } else {
        ((char_count - 1) / width + 1) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::channel;
    use storefront_core::{SessionState, Sender};

    fn last_sender(app: &App) -> Option<Sender> {
        app.assistant
            .as_ref()
            .and_then(|a| a.messages().last())
            .map(|m| m.sender())
    }

    fn quiet_config() -> Config {
        Config {
            welcome_message: None,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_options_disable_only_the_chat() {
        let (events, _rx) = channel();
        let config = Config {
            max_messages: 0,
            ..Config::default()
        };
        let mut app = App::new(config, events);
        assert!(app.assistant.is_none());
        assert_eq!(app.notifier.visible().count(), 1);

        // the rest still works
        app.toggle_chat();
        app.open_contact_form();
        assert_eq!(app.focus, Focus::Contact);
    }

    #[tokio::test]
    async fn test_opening_chat_focuses_input() {
        let (events, _rx) = channel();
        let mut app = App::new(quiet_config(), events);
        app.toggle_chat();
        assert!(app.chat_is_open());
        assert_eq!(app.focus, Focus::Chat);

        app.close_chat();
        assert_eq!(app.focus, Focus::Page);
        assert_eq!(
            app.assistant.as_ref().map(|a| a.state()),
            Some(SessionState::Closed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_schedules_reply() {
        let (events, mut rx) = channel();
        let mut app = App::new(quiet_config(), events);
        app.chat_input = "hello".to_string();
        app.chat_cursor = 5;
        app.submit_chat_input();

        assert!(app.chat_input.is_empty());
        assert_eq!(app.chat_cursor, 0);
        assert!(app.assistant.as_ref().is_some_and(|a| a.is_typing()));

        match rx.recv().await.expect("reply event") {
            AppEvent::ReplyReady(pending) => app.on_reply_ready(pending),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(last_sender(&app), Some(Sender::Assistant));
        assert!(!app.assistant.as_ref().is_some_and(|a| a.is_typing()));
    }

    #[tokio::test]
    async fn test_blank_submit_keeps_input_and_schedules_nothing() {
        let (events, mut rx) = channel();
        let mut app = App::new(quiet_config(), events);
        app.chat_input = "   ".to_string();
        app.submit_chat_input();
        assert_eq!(app.chat_input, "   ");
        assert_eq!(app.assistant.as_ref().map(|a| a.message_count()), Some(0));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_attention_badge_cleared_by_open() {
        let (events, _rx) = channel();
        let mut app = App::new(quiet_config(), events);
        app.on_attention_due();
        assert!(app.attention_visible());
        app.toggle_chat();
        assert!(!app.attention_visible());
    }

    #[tokio::test]
    async fn test_contact_errors_focus_first_bad_field() {
        let (events, _rx) = channel();
        let mut app = App::new(quiet_config(), events);
        app.open_contact_form();
        app.contact.name = "Ada".to_string();
        app.submit_contact_form();

        assert_eq!(app.focus, Focus::Contact);
        assert_eq!(app.contact_field, ContactField::Email);
        assert!(app.contact_error_for(ContactField::Message).is_some());
        assert!(app.contact_error_for(ContactField::Name).is_none());
    }

    #[test]
    fn test_wrapped_height() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("0123456789", 10), 1);
        assert_eq!(wrapped_height("0123456789a", 10), 2);
        assert_eq!(wrapped_height("ééé", 2), 2);
    }
}
