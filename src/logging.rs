//! Logger initialization and the shared per-origin failure log.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use colored::Colorize;
use log::LevelFilter;

use crate::error::SetupError;

/// Initializes the logger with the specified level.
///
/// Configures `env_logger` with custom formatting. The logger reads from the
/// `RUST_LOG` environment variable by default, but the provided `level`
/// parameter will override it. Dependency chatter from the HTTP and DNS
/// stacks is filtered down so probe diagnostics stay readable.
///
/// # Errors
///
/// Returns `SetupError::Logger` if logger initialization fails (for example
/// when a logger was already installed).
pub fn init_logger(level: LevelFilter) -> Result<(), SetupError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    // Suppress hickory UDP client stream warnings about malformed DNS messages;
    // they are expected with truncated responses and handled internally.
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("headscan", level);

    builder.format(|buf, record| {
        let level = record.level();
        let colored_level = match level {
            log::Level::Error => level.to_string().red(),
            log::Level::Warn => level.to_string().yellow(),
            log::Level::Info => level.to_string().green(),
            log::Level::Debug => level.to_string().blue(),
            log::Level::Trace => level.to_string().purple(),
        };

        writeln!(
            buf,
            "{} [{}] {}",
            record.target().cyan(),
            colored_level,
            record.args()
        )
    });

    // try_init() instead of init() so tests can initialize more than once
    builder.try_init().map_err(SetupError::from)?;

    Ok(())
}

/// Failure log shared by every probe worker.
///
/// Records resolution and HTTP failures as `<origin>: <message>` lines.
/// Each entry is written with a single buffered `write_all` call while the
/// handle is locked, so lines from concurrent workers never interleave.
#[derive(Debug, Default)]
pub struct FailureLog {
    file: Option<Mutex<File>>,
}

impl FailureLog {
    /// Creates (truncating) the failure log at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::LogFile` if the file cannot be created; an
    /// unwritable log file is a fatal setup error.
    pub fn create(path: &Path) -> Result<Self, SetupError> {
        let file = File::create(path).map_err(|source| SetupError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file: Some(Mutex::new(file)),
        })
    }

    /// A failure log that drops every entry (no `--log` flag given).
    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Appends one `<origin>: <message>` line, if logging is enabled.
    ///
    /// Write failures are reported through the application logger rather
    /// than propagated; losing a log line must not fail the probe.
    pub fn write(&self, origin: &str, message: &str) {
        let Some(file) = &self.file else {
            return;
        };

        let line = format!("{origin}: {message}\n");
        match file.lock() {
            Ok(mut file) => {
                if let Err(e) = file.write_all(line.as_bytes()) {
                    log::warn!("failed to write failure log entry for {origin}: {e}");
                }
            }
            Err(_) => {
                log::warn!("failure log mutex poisoned; dropping entry for {origin}");
            }
        }
    }
}
