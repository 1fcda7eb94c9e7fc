use std::path::{Path, PathBuf};
use anyhow::{bail, Result};
use clap::Parser;
use storefront_core::Config;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Browse a small business page with a built-in chat assistant")]
#[command(version)]
struct Cli {
    /// Read settings from this file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override how many chat messages are kept
    #[arg(long)]
    max_messages: Option<usize>,

    /// Write the effective settings to the config file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(&logging::default_log_dir()) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let (mut config, config_error) = match cli.config.as_deref() {
        Some(path) => split_load(Config::load_from(path)),
        None => split_load(Config::load()),
    };
    if let Some(max) = cli.max_messages {
        config.max_messages = max;
    }

    if cli.write_config {
        let path = match cli.config {
            Some(path) => path,
            None => Config::get_config_path()?,
        };
        write_config(&config, &path, config_error)?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    tracing::info!(max_messages = config.max_messages, "starting storefront");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(config, events.sender());
    if config_error {
        app.notifier.error("Could not read settings, using defaults");
    }
    app.start();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    tracing::info!("storefront stopped");
    result
}

/// Unreadable settings never stop the app; fall back to defaults.
fn split_load(loaded: Result<Config>) -> (Config, bool) {
    match loaded {
        Ok(config) => (config, false),
        Err(e) => {
            tracing::warn!("failed to load config, using defaults: {:#}", e);
            (Config::default(), true)
        }
    }
}

/// Save `config` to `path`, unless the file there failed to load: the defaults
/// we fell back to must not replace settings the user can still fix by hand.
fn write_config(config: &Config, path: &Path, load_failed: bool) -> Result<()> {
    if load_failed {
        bail!("refusing to overwrite unreadable config at {}", path.display());
    }
    config.save_to(path)
}

async fn run(terminal: &mut tui::Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ \"max_messages\": ").expect("write");

        let (config, failed) = split_load(Config::load_from(&path));
        assert!(failed);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_write_config_keeps_unreadable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let broken = r#"{ "max_messages": 12, "responses": [{"trigger": "parking", "reply": "Out back."}], "welcome_message": null,, }"#;
        std::fs::write(&path, broken).expect("write");

        let (config, failed) = split_load(Config::load_from(&path));
        let err = write_config(&config, &path, failed).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), broken);
    }

    #[test]
    fn test_write_config_saves_loaded_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");

        let (mut config, failed) = split_load(Config::load_from(&path));
        assert!(!failed);
        config.max_messages = 10;
        write_config(&config, &path, failed).expect("save");
        assert_eq!(Config::load_from(&path).expect("load").max_messages, 10);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["storefront", "--config", "shop.json", "--max-messages", "10"]);
        assert_eq!(cli.config, Some(PathBuf::from("shop.json")));
        assert_eq!(cli.max_messages, Some(10));
        assert!(!cli.write_config);
    }
}
