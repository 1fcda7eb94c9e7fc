use std::time::Instant;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, Focus};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.scroll_chat_to_bottom(),
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::ReplyReady(pending) => app.on_reply_ready(pending),
        AppEvent::AttentionDue => app.on_attention_due(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.focus {
        Focus::Page => handle_page_key(app, key),
        Focus::Chat => handle_chat_key(app, key),
        Focus::Contact => handle_contact_key(app, key),
    }
}

fn handle_page_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') => app.toggle_chat(),
        KeyCode::Char('f') => app.open_contact_form(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_page_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_page_up(1),
        KeyCode::PageDown => app.scroll_page_down(10),
        KeyCode::PageUp => app.scroll_page_up(10),
        KeyCode::Char('g') => app.page_scroll = 0,
        KeyCode::Tab => {
            if app.chat_is_open() {
                app.focus = Focus::Chat;
            }
        }
        KeyCode::Esc => {
            if app.chat_is_open() {
                app.close_chat();
            }
        }
        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_chat(),
        KeyCode::Tab => app.focus = Focus::Page,
        KeyCode::Enter => app.submit_chat_input(),
        KeyCode::F(n) if n >= 1 => app.send_quick_reply(usize::from(n - 1)),
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(2) / 2),
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(2) / 2),
        _ => {
            edit_line(&mut app.chat_input, &mut app.chat_cursor, key);
        }
    }
}

fn handle_contact_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_contact_form(),
        KeyCode::Tab | KeyCode::Down => app.select_contact_field(app.contact_field.next()),
        KeyCode::BackTab | KeyCode::Up => app.select_contact_field(app.contact_field.prev()),
        KeyCode::Enter => {
            if app.contact_field == storefront_core::ContactField::Message {
                app.submit_contact_form();
            } else {
                app.select_contact_field(app.contact_field.next());
            }
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.submit_contact_form();
        }
        _ => {
            let field = app.contact_field;
            edit_line(app.contact.field_mut(field), &mut app.contact_cursor, key);
        }
    }
}

/// Single-line editing shared by the chat input and the contact fields.
/// Returns true if the key changed the text or cursor.
fn edit_line(text: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    let char_count = text.chars().count();
    *cursor = (*cursor).min(char_count);

    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
                return true;
            }
        }
        KeyCode::Delete => {
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
                return true;
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
            return true;
        }
        KeyCode::Right => {
            *cursor = (*cursor + 1).min(char_count);
            return true;
        }
        KeyCode::Home => {
            *cursor = 0;
            return true;
        }
        KeyCode::End => {
            *cursor = char_count;
            return true;
        }
        KeyCode::Char(c)
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            let byte_pos = char_to_byte_index(text, *cursor);
            text.insert(byte_pos, c);
            *cursor += 1;
            return true;
        }
        _ => {}
    }
    false
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down(3);
            } else {
                app.scroll_page_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up(3);
            } else {
                app.scroll_page_up(3);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if app.focus == Focus::Contact {
                return;
            }

            if let Some(index) = app
                .quick_reply_areas
                .iter()
                .position(|r| point_in_rect(x, y, *r))
            {
                app.send_quick_reply(index);
            } else if app.launcher_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
                app.toggle_chat();
            } else if in_chat {
                app.focus = Focus::Chat;
            } else if app.focus == Focus::Chat {
                app.focus = Focus::Page;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::channel;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use storefront_core::{Config, ContactField};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, AppEvent::Key(key(KeyCode::Char(c))));
        }
    }

    fn test_app() -> (App, tokio::sync::mpsc::UnboundedReceiver<AppEvent>) {
        let (events, rx) = channel();
        let config = Config {
            welcome_message: None,
            ..Config::default()
        };
        (App::new(config, events), rx)
    }

    #[test]
    fn test_edit_line_utf8() {
        let mut text = String::new();
        let mut cursor = 0;
        for c in "héllo".chars() {
            edit_line(&mut text, &mut cursor, key(KeyCode::Char(c)));
        }
        edit_line(&mut text, &mut cursor, key(KeyCode::Left));
        edit_line(&mut text, &mut cursor, key(KeyCode::Left));
        edit_line(&mut text, &mut cursor, key(KeyCode::Left));
        edit_line(&mut text, &mut cursor, key(KeyCode::Backspace));
        assert_eq!(text, "hllo");
        assert_eq!(cursor, 1);

        edit_line(&mut text, &mut cursor, key(KeyCode::End));
        edit_line(&mut text, &mut cursor, key(KeyCode::Delete));
        assert_eq!(text, "hllo");
    }

    #[tokio::test]
    async fn test_c_opens_chat_and_typing_goes_to_input() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('c'))));
        assert!(app.chat_is_open());

        // 'c' and 'q' are plain text now
        type_text(&mut app, "quick question");
        assert_eq!(app.chat_input, "quick question");
        assert!(!app.should_quit);

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Esc)));
        assert!(!app.chat_is_open());
        assert_eq!(app.focus, Focus::Page);
    }

    #[tokio::test]
    async fn test_function_keys_send_quick_replies() {
        let (mut app, mut rx) = test_app();
        app.toggle_chat();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::F(2))));

        let sent: Vec<String> = app
            .assistant
            .as_ref()
            .map(|a| a.messages().map(|m| m.text().to_string()).collect())
            .unwrap_or_default();
        assert_eq!(sent, vec!["What are your opening hours?".to_string()]);

        // out of range does nothing
        handle_event(&mut app, AppEvent::Key(key(KeyCode::F(12))));
        assert_eq!(app.assistant.as_ref().map(|a| a.message_count()), Some(1));

        tokio::time::pause();
        assert!(matches!(rx.recv().await, Some(AppEvent::ReplyReady(_))));
    }

    #[tokio::test]
    async fn test_contact_form_flow() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('f'))));
        assert_eq!(app.focus, Focus::Contact);

        type_text(&mut app, "Ada");
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter)));
        type_text(&mut app, "ada@example.com");
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Tab)));
        assert_eq!(app.contact_field, ContactField::Message);
        type_text(&mut app, "Please call me back about a quote.");
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter)));

        assert_eq!(app.focus, Focus::Page);
        assert!(app.contact.name.is_empty());
        assert!(app
            .notifier
            .visible()
            .any(|n| n.message.starts_with("Thanks Ada")));
    }

    #[tokio::test]
    async fn test_quit_destroys_assistant() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('q'))));
        assert!(app.should_quit);
        assert!(app.assistant.as_ref().is_some_and(|a| a.is_destroyed()));
    }

    #[tokio::test]
    async fn test_click_launcher_toggles_chat() {
        let (mut app, _rx) = test_app();
        app.launcher_area = Some(Rect::new(60, 20, 16, 3));
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 65,
            row: 21,
            modifiers: KeyModifiers::NONE,
        };
        handle_event(&mut app, AppEvent::Mouse(click));
        assert!(app.chat_is_open());
    }
}
