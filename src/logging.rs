use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE: &str = "storefront.log";

/// Directory the log file goes to: `<data_dir>/storefront-chat`, falling back
/// to the current directory.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("storefront-chat"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Send tracing output to a file. The terminal belongs to the UI, so nothing
/// is ever written to stdout/stderr. Filter comes from RUST_LOG, default info.
pub fn init_tracing(log_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = rolling::never(log_dir, LOG_FILE);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    tracing::debug!(
        path = %log_dir.join(LOG_FILE).display(),
        "Tracing initialized with file output"
    );
    Ok(())
}
