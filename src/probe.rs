//! Single-target probing: resolvability check, HTTP GET with a Host header
//! override, and classification of the target header's presence.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;

use log::debug;
use reqwest::header::{HeaderName, ACCEPT_ENCODING, HOST};

use crate::error::SetupError;
use crate::logging::FailureLog;
use crate::resolver::{DnsOverride, ResolveHost};

/// Ternary probe outcome.
///
/// `NotRun` means the check never reached that phase; for example the HTTP
/// request is not attempted when resolution fails. Keeping it a first-class
/// state (instead of a bool with a side flag) makes the distinction
/// impossible to drop in comparisons and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    /// The check never ran.
    NotRun,
    /// The check ran and the answer was no.
    No,
    /// The check ran and the answer was yes.
    Yes,
}

impl TriState {
    /// The single-character output form: `-`, `f`, or `t`.
    pub fn as_str(self) -> &'static str {
        match self {
            TriState::NotRun => "-",
            TriState::No => "f",
            TriState::Yes => "t",
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for TriState {
    fn from(yes: bool) -> Self {
        if yes {
            TriState::Yes
        } else {
            TriState::No
        }
    }
}

/// One probe input: the Host header value to send and the origin server to
/// contact (hostname or literal IP, optionally with a port).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Host header value for the request.
    pub host: String,
    /// Origin server actually dialed.
    pub origin: String,
}

/// Outcome of probing one target.
///
/// Owned by exactly one worker while its fields are filled in, then moved to
/// the result sink and never mutated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Origin server contacted.
    pub origin: String,
    /// Host header sent.
    pub host: String,
    /// Whether the origin name resolved.
    pub resolved: TriState,
    /// Whether the target header was present in the response.
    ///
    /// Leaves `NotRun` only if the HTTP request phase was never reached.
    pub header_present: TriState,
}

impl ProbeResult {
    /// Header line naming the output fields, in `Display` order.
    pub const FIELDS: &'static str = "origin,host,resolves,present";

    fn new(target: ProbeTarget) -> Self {
        Self {
            origin: target.origin,
            host: target.host,
            resolved: TriState::NotRun,
            header_present: TriState::NotRun,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.origin, self.host, self.resolved, self.header_present
        )
    }
}

/// Probes origins for the presence of a response header.
///
/// Holds the HTTP client (with its DNS path redirected through the
/// configured resolver), the target header name, and the shared failure log.
/// Safe to share across workers behind an `Arc`.
pub struct Prober {
    client: reqwest::Client,
    resolver: Arc<dyn ResolveHost>,
    header: HeaderName,
    failure_log: FailureLog,
}

impl Prober {
    /// Builds a prober for `header`, resolving through `resolver`.
    ///
    /// `HeaderName` canonicalizes to lowercase, so the later presence check
    /// is case-insensitive per HTTP semantics. No request timeout is set;
    /// a probe waits as long as the transport does.
    ///
    /// # Errors
    ///
    /// Returns a `SetupError` if the header name is empty or invalid, or if
    /// the HTTP client cannot be built.
    pub fn new(
        resolver: Arc<dyn ResolveHost>,
        header: &str,
        failure_log: FailureLog,
    ) -> Result<Self, SetupError> {
        let header_name =
            HeaderName::from_bytes(header.as_bytes()).map_err(|source| {
                SetupError::InvalidHeader {
                    name: header.to_string(),
                    source,
                }
            })?;

        let client = reqwest::Client::builder()
            .dns_resolver(Arc::new(DnsOverride(Arc::clone(&resolver))))
            .build()?;

        Ok(Self {
            client,
            resolver,
            header: header_name,
            failure_log,
        })
    }

    /// Probes one target.
    ///
    /// Never fails: every resolution or transport error is contained in the
    /// returned result (and the failure log), so one bad target cannot take
    /// down the batch or its worker.
    pub async fn probe(&self, target: ProbeTarget) -> ProbeResult {
        let mut result = ProbeResult::new(target);

        // Pre-flight resolvability check, skipped for literal IP origins.
        let host = origin_host(&result.origin);
        if host.parse::<IpAddr>().is_err() {
            if let Err(e) = self.resolver.resolve_host(host).await {
                self.failure_log
                    .write(&result.origin, &format!("Error resolving name: {e}"));
                result.resolved = TriState::No;
                return result;
            }
        }
        result.resolved = TriState::Yes;

        let url = origin_url(&result.origin);
        debug!("GET {url} with Host: {}", result.host);

        // An origin that produces an unbuildable request or URL surfaces
        // here as a send() error and is treated like any transport failure.
        let response = self
            .client
            .get(&url)
            .header(HOST, result.host.as_str())
            .header(ACCEPT_ENCODING, "gzip,deflate")
            .send()
            .await;

        match response {
            Ok(response) => {
                let present = response
                    .headers()
                    .get(&self.header)
                    .is_some_and(|value| !value.is_empty());
                result.header_present = present.into();
                // Drain the body so the connection can be reused.
                let _ = response.bytes().await;
            }
            Err(e) => {
                self.failure_log
                    .write(&result.origin, &format!("HTTP request GET {url} failed: {e}"));
            }
        }

        result
    }
}

/// Returns the host portion of an origin, stripping an optional `:port`.
///
/// Handles bare IPs (`10.0.0.1`, `::1`), bracketed IPv6 (`[::1]:8080`), and
/// `host:port` forms. Anything else is returned unchanged.
fn origin_host(origin: &str) -> &str {
    if origin.parse::<IpAddr>().is_ok() {
        return origin;
    }
    if let Some(bracketed) = origin.strip_prefix('[') {
        if let Some((host, _)) = bracketed.split_once(']') {
            return host;
        }
    }
    match origin.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            host
        }
        _ => origin,
    }
}

/// Builds the request URL for an origin. Bare IPv6 literals need brackets to
/// form a valid authority.
fn origin_url(origin: &str) -> String {
    if origin.parse::<Ipv6Addr>().is_ok() {
        format!("http://[{origin}]/")
    } else {
        format!("http://{origin}/")
    }
}
