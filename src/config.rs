//! Configuration types and CLI options.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Scan configuration, parsed from the command line.
///
/// Can also be constructed programmatically when using `headscan` as a
/// library:
///
/// ```no_run
/// use headscan::Config;
///
/// let config = Config {
///     header: "Cookie".to_string(),
///     workers: 4,
///     ..Default::default()
/// };
/// ```
#[derive(Parser, Debug, Clone)]
#[command(
    name = "headscan",
    about = "Probes origin web servers for the presence of an HTTP response header.\n\n\
             Reads `host,origin` pairs from stdin and writes one\n\
             `origin,host,resolves,present` line per pair to stdout."
)]
pub struct Config {
    /// HTTP response header to look for
    #[arg(long)]
    pub header: String,

    /// DNS resolver address (`ip` or `ip:port`) used instead of the system resolver
    #[arg(long, default_value = "127.0.0.1")]
    pub resolver: String,

    /// Number of concurrent probe workers
    #[arg(long, default_value_t = 10, value_parser = parse_worker_count)]
    pub workers: usize,

    /// File to write per-origin failure details to
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Output a header line containing field names before the first result
    #[arg(long)]
    pub fields: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header: String::new(),
            resolver: "127.0.0.1".to_string(),
            workers: 10,
            log: None,
            fields: false,
            log_level: LogLevel::Warn,
        }
    }
}

fn parse_worker_count(s: &str) -> Result<usize, String> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a valid worker count"))?;
    if count < 1 {
        return Err("worker count must be at least 1".to_string());
    }
    Ok(count)
}
