//! DNS resolution through an explicitly configured resolver.
//!
//! Every lookup in the scan goes through the resolver address given on the
//! command line, never the system resolution path. That covers both the
//! pre-flight resolvability check and the HTTP client's own dial-time
//! lookups, which are redirected via [`DnsOverride`]. Probing an alternate
//! DNS view with the system resolver in the dial path would not be
//! representative.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use crate::error::{ResolutionError, SetupError};

/// Port used when the resolver address is given without one.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Hostname-to-addresses resolution, safe for concurrent use by all workers.
///
/// The scan engine only depends on this trait, so tests can substitute a
/// fake resolver with fixed entries.
#[async_trait]
pub trait ResolveHost: Send + Sync {
    /// Resolves `name` to one or more IP addresses.
    async fn resolve_host(&self, name: &str) -> Result<Vec<IpAddr>, ResolutionError>;
}

/// Resolver pinned to a single configured nameserver.
pub struct ResolverAdapter {
    inner: TokioAsyncResolver,
}

impl ResolverAdapter {
    /// Creates a resolver that queries only `addr` (`ip` or `ip:port`,
    /// defaulting to port 53) over UDP.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::InvalidResolverAddress` if `addr` is not an IP
    /// address or `ip:port` pair.
    pub fn new(addr: &str) -> Result<Self, SetupError> {
        let socket = addr
            .parse::<SocketAddr>()
            .or_else(|_| {
                addr.parse::<IpAddr>()
                    .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
            })
            .map_err(|_| SetupError::InvalidResolverAddress(addr.to_string()))?;

        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(socket, Protocol::Udp));

        let mut opts = ResolverOpts::default();
        // Query names verbatim; search-domain expansion would rewrite the
        // names being checked.
        opts.ndots = 0;

        Ok(Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        })
    }
}

#[async_trait]
impl ResolveHost for ResolverAdapter {
    async fn resolve_host(&self, name: &str) -> Result<Vec<IpAddr>, ResolutionError> {
        let lookup = self.inner.lookup_ip(name).await?;
        let ips: Vec<IpAddr> = lookup.iter().collect();
        if ips.is_empty() {
            return Err(ResolutionError::NoAddresses(name.to_string()));
        }
        Ok(ips)
    }
}

/// Bridges a [`ResolveHost`] into reqwest's DNS hook.
///
/// With this installed via `ClientBuilder::dns_resolver`, the HTTP client's
/// dial step resolves hostnames through the configured resolver. Literal-IP
/// hosts never reach the hook; reqwest dials those directly, preserving the
/// URL's port.
pub struct DnsOverride(pub Arc<dyn ResolveHost>);

impl Resolve for DnsOverride {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.0);
        Box::pin(async move {
            let first = resolver
                .resolve_host(name.as_str())
                .await
                .map(|ips| ips.first().copied())?
                .ok_or_else(|| ResolutionError::NoAddresses(name.as_str().to_string()))?;
            // Dial only the first returned address; the connector fills in
            // the port from the request URL.
            let addrs: Addrs = Box::new(std::iter::once(SocketAddr::new(first, 0)));
            Ok(addrs)
        })
    }
}
