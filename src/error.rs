//! Error type definitions.
//!
//! Setup-time failures are fatal and abort before any probing begins.
//! Per-target failures (resolution, transport) are contained inside the
//! probe and only leave fields of the affected result unset.

use std::io;
use std::path::PathBuf;

use hickory_resolver::error::ResolveError;
use log::SetLoggerError;
use thiserror::Error;

/// Error types for startup failures.
///
/// Any of these aborts the run before a single target is probed.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    Logger(#[from] SetLoggerError),

    /// The configured target header is empty or not a valid HTTP header name.
    #[error("invalid header name {name:?}: {source}")]
    InvalidHeader {
        /// The header name as given on the command line.
        name: String,
        /// The underlying parse error.
        source: reqwest::header::InvalidHeaderName,
    },

    /// The configured resolver address is neither an IP nor an `ip:port` pair.
    #[error("invalid resolver address {0:?}")]
    InvalidResolverAddress(String),

    /// The failure log file could not be created.
    #[error("failed to create log file {}: {source}", path.display())]
    LogFile {
        /// The requested log file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Error types for DNS lookups through the configured resolver.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The lookup itself failed (NXDOMAIN, server unreachable, ...).
    #[error(transparent)]
    Lookup(#[from] ResolveError),

    /// The lookup succeeded but returned no addresses.
    #[error("no addresses found for {0}")]
    NoAddresses(String),
}
