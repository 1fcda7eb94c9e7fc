use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use storefront_core::state::sanitize_for_terminal;
use storefront_core::{ContactField, NotificationKind, Sender};
use crate::app::{App, Focus};

const CHAT_WIDTH: u16 = 52;
const CHAT_HEIGHT: u16 = 24;
const MIN_CHAT_WIDTH: u16 = 28;
const MIN_CHAT_HEIGHT: u16 = 10;
const TOAST_WIDTH: u16 = 44;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_page(app, frame, body_area);
    render_chat_widget(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.focus == Focus::Contact {
        render_contact_form(app, frame, area);
    }

    render_notifications(app, frame, body_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let business = &app.config.business;
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", sanitize_for_terminal(&business.name)),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            sanitize_for_terminal(&business.tagline),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_page(app: &App, frame: &mut Frame, area: Rect) {
    let business = &app.config.business;
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            sanitize_for_terminal(&business.name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            sanitize_for_terminal(&business.tagline),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
    ];

    if !business.about.is_empty() {
        lines.push(Line::from(Span::styled("About us", heading)));
        for paragraph in &business.about {
            lines.push(Line::from(sanitize_for_terminal(paragraph)));
            lines.push(Line::default());
        }
    }

    if !business.services.is_empty() {
        lines.push(Line::from(Span::styled("Services", heading)));
        for service in &business.services {
            lines.push(Line::from(format!("  - {}", sanitize_for_terminal(service))));
        }
        lines.push(Line::default());
    }

    if !business.hours.is_empty() {
        lines.push(Line::from(Span::styled("Opening hours", heading)));
        for hours in &business.hours {
            lines.push(Line::from(format!("  {}", sanitize_for_terminal(hours))));
        }
        lines.push(Line::default());
    }

    lines.push(Line::from(vec![
        Span::raw("Press "),
        Span::styled("f", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" to send us a message or "),
        Span::styled("c", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" to chat with our assistant."),
    ]));

    let page = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::NONE))
        .wrap(Wrap { trim: false })
        .scroll((app.page_scroll, 0));

    let [_, content, _] = Layout::horizontal([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(area);
    frame.render_widget(page, content);
}

fn render_chat_widget(app: &mut App, frame: &mut Frame, area: Rect) {
    // Reset hit-testing areas; only what gets drawn this frame is clickable
    app.launcher_area = None;
    app.chat_area = None;
    app.quick_reply_areas.clear();

    let Some(is_open) = app.assistant.as_ref().map(|a| a.is_open()) else {
        return;
    };

    if is_open {
        let width = area.width.saturating_sub(2).min(CHAT_WIDTH);
        let height = area.height.saturating_sub(1).min(CHAT_HEIGHT);
        // Not enough room: leave the page as is rather than draw a broken panel
        if width < MIN_CHAT_WIDTH || height < MIN_CHAT_HEIGHT {
            return;
        }
        let panel = Rect::new(
            area.right().saturating_sub(width + 1),
            area.bottom().saturating_sub(height),
            width,
            height,
        );
        render_chat_panel(app, frame, panel);
    } else {
        render_launcher(app, frame, area);
    }
}

fn render_launcher(app: &mut App, frame: &mut Frame, area: Rect) {
    let badge = app.attention_visible();
    let width: u16 = if badge { 16 } else { 12 };
    let height: u16 = 3;
    if area.width < width + 1 || area.height < height {
        return;
    }

    let rect = Rect::new(
        area.right() - width - 1,
        area.bottom() - height,
        width,
        height,
    );

    let mut spans = vec![
        Span::styled(" c ", Style::default().bg(Color::DarkGray).fg(Color::White)),
        Span::styled(" Chat ", Style::default().fg(Color::Cyan).bold()),
    ];
    if badge {
        spans.push(Span::styled(
            " 1 ",
            Style::default().bg(Color::Red).fg(Color::White).bold(),
        ));
    }

    let border_color = if badge { Color::Red } else { Color::Cyan };
    let launcher = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );

    frame.render_widget(Clear, rect);
    frame.render_widget(launcher, rect);
    app.launcher_area = Some(rect);
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, panel: Rect) {
    let focused = app.focus == Focus::Chat;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(
            " {} assistant ",
            sanitize_for_terminal(&app.config.business.name)
        ))
        .title_bottom(Line::from(" Esc to close ").right_aligned());
    let inner = block.inner(panel);

    frame.render_widget(Clear, panel);
    frame.render_widget(block, panel);

    let [messages_area, quick_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(inner);

    app.chat_area = Some(panel);

    // Store message area dimensions for scroll calculations
    let size_changed = app.chat_height != messages_area.height || app.chat_width != messages_area.width;
    app.chat_height = messages_area.height;
    app.chat_width = messages_area.width;
    if size_changed {
        app.scroll_chat_to_bottom();
    }

    render_messages(app, frame, messages_area);
    render_quick_replies(app, frame, quick_area);
    render_chat_input(app, frame, input_area);
}

fn render_messages(app: &App, frame: &mut Frame, area: Rect) {
    let Some(assistant) = app.assistant.as_ref() else {
        return;
    };

    let text = if assistant.message_count() == 0 && !assistant.is_typing() {
        Text::from(Span::styled(
            "Ask us anything...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in assistant.messages() {
            lines.push(sender_line(msg.sender(), Some(msg.formatted_time(assistant.time_format()))));
            let style = match msg.sender() {
                Sender::User => Style::default().fg(Color::Cyan),
                Sender::Assistant => Style::default(),
            };
            for line in msg.display_lines() {
                lines.push(Line::from(Span::styled(line, style)));
            }
            lines.push(Line::default());
        }

        if assistant.is_typing() {
            lines.push(sender_line(Sender::Assistant, None));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let messages = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(messages, area);
}

fn sender_line(sender: Sender, time: Option<String>) -> Line<'static> {
    let color = match sender {
        Sender::User => Color::Cyan,
        Sender::Assistant => Color::Yellow,
    };
    let mut spans = vec![Span::styled(
        sender.label(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(time) = time {
        spans.push(Span::styled(
            format!("  {}", time),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn render_quick_replies(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(assistant) = app.assistant.as_ref() else {
        return;
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Magenta);

    let mut spans = Vec::new();
    let mut chip_areas = Vec::new();
    let mut x = area.x;

    for (i, quick) in assistant.quick_replies().iter().enumerate() {
        let key = format!("F{}", i + 1);
        let label = sanitize_for_terminal(&quick.label);
        let chip_width = (key.chars().count() + label.chars().count() + 3) as u16;
        if x + chip_width > area.right() {
            break;
        }
        chip_areas.push(Rect::new(x, area.y, chip_width, 1));
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
        spans.push(Span::raw(" "));
        x += chip_width;
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
    app.quick_reply_areas = chip_areas;
}

/// Visible slice of a one-line input and the cursor column inside it
fn visible_input(text: &str, cursor: usize, inner_width: usize) -> (String, u16) {
    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor >= inner_width {
        cursor - inner_width + 1
    } else {
        0
    };

    let visible: String = text.chars().skip(scroll_offset).take(inner_width).collect();
    (visible, (cursor - scroll_offset) as u16)
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Chat;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message (Enter to send) ");

    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible, cursor_x) = visible_input(&app.chat_input, app.chat_cursor, inner_width);

    let input = Paragraph::new(visible)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if focused {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_contact_form(app: &App, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(4).min(64);
    let height = area.height.saturating_sub(2).min(13);
    if width < 24 || height < 13 {
        // Too small for the whole form; fall back to the focused field only
        render_contact_field(app, frame, centered(area, width.max(10), 3), app.contact_field);
        return;
    }

    let popup = centered(area, width, height);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Contact us ");
    let inner = block.inner(popup);

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let [name_area, email_area, message_area, hint_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(inner);

    render_contact_field(app, frame, name_area, ContactField::Name);
    render_contact_field(app, frame, email_area, ContactField::Email);
    render_contact_field(app, frame, message_area, ContactField::Message);

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let hints = Line::from(vec![
        Span::styled(" Tab ", key_style),
        Span::raw(" next field "),
        Span::styled(" Enter ", key_style),
        Span::raw(" next / send "),
        Span::styled(" Esc ", key_style),
        Span::raw(" cancel "),
    ]);
    frame.render_widget(Paragraph::new(hints), hint_area);
}

fn render_contact_field(app: &App, frame: &mut Frame, area: Rect, field: ContactField) {
    let active = app.contact_field == field;
    let error = app.contact_error_for(field);

    let border_color = match (active, error.is_some()) {
        (_, true) => Color::Red,
        (true, false) => Color::Yellow,
        (false, false) => Color::DarkGray,
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", field.label()));
    if let Some(error) = error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", error),
            Style::default().fg(Color::Red),
        )));
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor = if active { app.contact_cursor } else { 0 };
    let (visible, cursor_x) = visible_input(app.contact.field(field), cursor, inner_width);

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(visible).block(block), area);

    if active {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_notifications(app: &App, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(2).min(TOAST_WIDTH);
    if width < 10 {
        return;
    }

    let mut y = area.y;
    for toast in app.notifier.visible() {
        let message = sanitize_for_terminal(&toast.message);
        let inner_width = width.saturating_sub(2).max(1) as usize;
        let text_height = crate::app::wrapped_height(&message, inner_width);
        let height = text_height + 2;
        if y + height > area.bottom() {
            break;
        }

        let (color, title) = match toast.kind {
            NotificationKind::Info => (Color::Blue, " Info "),
            NotificationKind::Success => (Color::Green, " Done "),
            NotificationKind::Error => (Color::Red, " Error "),
        };

        let rect = Rect::new(area.right().saturating_sub(width + 1), y, width, height);
        let toast_widget = Paragraph::new(message)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(title),
            );
        frame.render_widget(Clear, rect);
        frame.render_widget(toast_widget, rect);
        y += height;
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.focus {
        Focus::Page => (" PAGE ", Style::default().bg(Color::Blue).fg(Color::White)),
        Focus::Chat => (" CHAT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        Focus::Contact => (" CONTACT ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.focus {
        Focus::Page => {
            let mut hints = vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" c ", key_style),
                Span::styled(
                    if app.chat_is_open() { " close chat " } else { " chat " },
                    label_style,
                ),
            ];
            if app.chat_is_open() {
                hints.extend(vec![
                    Span::styled(" Tab ", key_style),
                    Span::styled(" focus chat ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" f ", key_style),
                Span::styled(" contact ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        Focus::Chat => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" F1-F4 ", key_style),
            Span::styled(" quick reply ", label_style),
            Span::styled(" Up/Down ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" page ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ],
        Focus::Contact => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" next ", label_style),
            Span::styled(" Ctrl+S ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ],
    };

    if app.chat_is_open() && app.chat_area.is_none() {
        hints.push(Span::styled(
            " chat hidden: terminal too small ",
            Style::default().bg(Color::Black).fg(Color::Red),
        ));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
