use std::io::{self, Stderr};
use std::time::Duration;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use storefront_core::PendingReply;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Tick interval for animations and toast expiry
pub const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
    /// The simulated thinking delay for a reply has passed
    ReplyReady(PendingReply),
    /// Time to nudge the visitor with the chat badge
    AttentionDue,
}

/// Cloneable handle for pushing events into the main loop
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    pub fn send(&self, event: AppEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Deliver `event` to the loop after `delay`. The loop stays the only
    /// place state is mutated; this task just waits.
    pub fn send_after(&self, delay: Duration, event: AppEvent) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).is_err() {
                tracing::debug!("event loop gone before delayed event fired");
            }
        })
    }
}

pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    sender: EventSender,
}

impl EventHandler {
    pub fn new() -> Self {
        let (sender, rx) = channel();

        // Spawn terminal event reader task
        let tx_events = sender.clone();
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(evt) = reader.next().await {
                let evt = match evt {
                    Ok(evt) => evt,
                    Err(e) => {
                        tracing::warn!("terminal event error: {}", e);
                        continue;
                    }
                };

                let app_event = match evt {
                    Event::Key(key) => {
                        // Only handle key press events, not release
                        if key.kind == KeyEventKind::Press {
                            Some(AppEvent::Key(key))
                        } else {
                            None
                        }
                    }
                    Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
                    Event::Resize(_, _) => Some(AppEvent::Resize),
                    _ => None,
                };

                if let Some(event) = app_event {
                    if !tx_events.send(event) {
                        break;
                    }
                }
            }
        });

        // Spawn tick timer for animations
        let tx_tick = sender.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_RATE);
            loop {
                interval.tick().await;
                if !tx_tick.send(AppEvent::Tick) {
                    break;
                }
            }
        });

        Self { rx, sender }
    }

    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;

    // Enable mouse capture
    execute!(io::stderr(), crossterm::event::EnableMouseCapture)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), crossterm::event::DisableMouseCapture)?;
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_send_after_waits_for_delay() {
        let (sender, mut rx) = channel();
        let handle = sender.send_after(Duration::from_millis(900), AppEvent::AttentionDue);

        tokio::time::sleep(Duration::from_millis(899)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        handle.await.expect("delayed task");
        assert!(matches!(rx.try_recv(), Ok(AppEvent::AttentionDue)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after_survives_closed_loop() {
        let (sender, rx) = channel();
        drop(rx);
        let handle = sender.send_after(Duration::from_millis(10), AppEvent::Tick);
        assert!(handle.await.is_ok());
    }
}
