// Shared test helpers: a fake resolver with fixed entries, a canned-response
// HTTP server, and a cloneable output buffer for driving the full pipeline.

use std::collections::HashMap;
use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use headscan::{ResolutionError, ResolveHost};

/// DNS stub mapping names to fixed addresses, counting every lookup.
#[allow(dead_code)] // Used by other test files
pub struct StaticResolver {
    entries: HashMap<String, IpAddr>,
    lookups: AtomicUsize,
}

#[allow(dead_code)] // Used by other test files
impl StaticResolver {
    pub fn new(entries: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            entries: entries
                .iter()
                .map(|(name, ip)| (name.to_string(), ip.parse().expect("bad test IP")))
                .collect(),
            lookups: AtomicUsize::new(0),
        })
    }

    /// A resolver that knows no names at all.
    pub fn empty() -> Arc<Self> {
        Self::new(&[])
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResolveHost for StaticResolver {
    async fn resolve_host(&self, name: &str) -> Result<Vec<IpAddr>, ResolutionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.entries.get(name) {
            Some(ip) => Ok(vec![*ip]),
            None => Err(ResolutionError::NoAddresses(name.to_string())),
        }
    }
}

/// Spawns an HTTP/1.1 server on an ephemeral port that answers every request
/// with `200 OK` plus `extra_headers` (raw `Name: value\r\n` lines), and
/// records each request head it sees.
#[allow(dead_code)] // Used by other test files
pub async fn spawn_http_server(
    extra_headers: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_server = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let seen = Arc::clone(&seen_by_server);
            tokio::spawn(async move {
                let mut head = String::new();
                let mut buf = [0u8; 4096];
                loop {
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.push_str(&String::from_utf8_lossy(&buf[..n]));
                    if head.contains("\r\n\r\n") {
                        break;
                    }
                }
                seen.lock().unwrap().push(head);

                let body = "ok";
                let response = format!(
                    "HTTP/1.1 200 OK\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (addr, seen)
}

/// Binds and immediately drops a listener, yielding a port where connections
/// will be refused.
#[allow(dead_code)] // Used by other test files
pub async fn refused_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Reader that yields its data in one read, then fails every read after
/// that. Lets tests exercise an input stream that dies mid-batch.
#[allow(dead_code)] // Used by other test files
pub struct FailingReader {
    data: Option<Vec<u8>>,
}

#[allow(dead_code)] // Used by other test files
impl FailingReader {
    pub fn new(data: &str) -> Self {
        Self {
            data: Some(data.as_bytes().to_vec()),
        }
    }
}

impl tokio::io::AsyncRead for FailingReader {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        let this = self.get_mut();
        match this.data.take() {
            Some(bytes) => {
                buf.put_slice(&bytes);
                std::task::Poll::Ready(Ok(()))
            }
            None => std::task::Poll::Ready(Err(io::Error::other("simulated input failure"))),
        }
    }
}

/// Cloneable in-memory writer so tests can keep a handle on output that the
/// sink task owns.
#[derive(Clone, Default)]
#[allow(dead_code)] // Used by other test files
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)] // Used by other test files
impl SharedBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("non-UTF-8 output")
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut *self.0.lock().unwrap(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
