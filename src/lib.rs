//! headscan library: concurrent HTTP header probing.
//!
//! Probes a list of (host-header, origin-server) pairs over HTTP and
//! reports, per pair, whether DNS resolution succeeded and whether a
//! configured response header was present. DNS goes through an explicitly
//! configured resolver for both the pre-flight check and the HTTP client's
//! dial step, so the scan reflects the chosen DNS view rather than the
//! system's.
//!
//! # Example
//!
//! ```no_run
//! use headscan::{run_scan, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     header: "Cookie".to_string(),
//!     workers: 10,
//!     ..Default::default()
//! };
//!
//! // Reads `host,origin` lines from stdin, writes result lines to stdout.
//! let report = run_scan(config).await?;
//! println!("probed {} targets", report.targets);
//! # Ok(())
//! # }
//! ```
//!
//! This library requires a Tokio runtime.

#![warn(missing_docs)]

pub mod config;
mod error;
mod logging;
mod pool;
mod probe;
mod resolver;
mod sink;

// Re-export public API
pub use config::{Config, LogLevel};
pub use error::{ResolutionError, SetupError};
pub use logging::{init_logger, FailureLog};
pub use pool::WorkerPool;
pub use probe::{ProbeResult, ProbeTarget, Prober, TriState};
pub use resolver::{DnsOverride, ResolveHost, ResolverAdapter};
pub use run::{run_scan, run_scan_with, ScanReport};
pub use sink::drain_results;

// Internal run module (contains the batch driver)
mod run {
    use std::io::{self, Write};
    use std::sync::Arc;
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::info;
    use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
    use tokio::sync::mpsc;

    use crate::config::Config;
    use crate::logging::FailureLog;
    use crate::pool::WorkerPool;
    use crate::probe::{ProbeTarget, Prober};
    use crate::resolver::{ResolveHost, ResolverAdapter};
    use crate::sink::drain_results;

    /// Summary of a completed scan.
    #[derive(Debug, Clone)]
    pub struct ScanReport {
        /// Targets fed to the worker pool.
        pub targets: usize,
        /// Input lines rejected as malformed.
        pub bad_lines: usize,
        /// Result lines emitted (excluding the optional field-name line).
        pub emitted: usize,
        /// Elapsed time in seconds.
        pub elapsed_seconds: f64,
    }

    /// Runs a scan with the provided configuration, reading `host,origin`
    /// pairs from stdin and writing result lines to stdout.
    ///
    /// This is the main entry point for the library.
    ///
    /// # Errors
    ///
    /// Returns an error for setup failures (bad header name, bad resolver
    /// address, unwritable log file) before any probing starts, or for a
    /// stdin read failure, which is surfaced only after all in-flight
    /// targets have completed and been emitted.
    pub async fn run_scan(config: Config) -> Result<ScanReport> {
        run_scan_with(config, tokio::io::stdin(), io::stdout(), io::stdout()).await
    }

    /// [`run_scan`] over an arbitrary input stream and output writers.
    ///
    /// Result lines go to `out` (owned by the sink task); `Bad line:`
    /// reports for malformed input go to `report_out` as they are read.
    /// `run_scan` binds both to stdout. Exposed so the full pipeline can be
    /// driven in tests.
    pub async fn run_scan_with<R, W, B>(
        config: Config,
        input: R,
        out: W,
        mut report_out: B,
    ) -> Result<ScanReport>
    where
        R: AsyncRead + Unpin,
        W: Write + Send + 'static,
        B: Write,
    {
        let start = Instant::now();

        let failure_log = match &config.log {
            Some(path) => FailureLog::create(path)?,
            None => FailureLog::disabled(),
        };
        let resolver: Arc<dyn ResolveHost> = Arc::new(ResolverAdapter::new(&config.resolver)?);
        let prober = Arc::new(Prober::new(resolver, &config.header, failure_log)?);

        // The CLI already rejects zero, but a programmatic Config might not.
        let workers = config.workers.max(1);
        let (work_tx, work_rx) = mpsc::channel::<ProbeTarget>(workers);
        let (result_tx, result_rx) = mpsc::channel(workers);

        let sink = tokio::spawn(drain_results(result_rx, config.fields, out));
        let pool = WorkerPool::spawn(prober, work_rx, result_tx, workers);

        let mut targets = 0usize;
        let mut bad_lines = 0usize;
        let mut read_error = None;

        let mut lines = BufReader::new(input).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.is_empty() {
                        continue;
                    }
                    match parse_line(&line) {
                        Some(target) => {
                            targets += 1;
                            if work_tx.send(target).await.is_err() {
                                // All workers are gone; join() below reports why.
                                break;
                            }
                        }
                        None => {
                            bad_lines += 1;
                            // Echo the rejected line verbatim; a failed
                            // report must not take down the batch.
                            if let Err(e) = writeln!(report_out, "Bad line: {line}") {
                                log::warn!("failed to report bad line: {e}");
                            }
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }
        }

        // Closing the input channel lets the workers drain out and exit.
        drop(work_tx);
        pool.join().await?;

        // The workers held the only result senders, so the sink now drains
        // whatever is queued and finishes.
        let emitted = sink
            .await
            .context("result sink task failed")?
            .context("writing results")?;

        // A read failure is reported only after in-flight work completed.
        if let Some(e) = read_error {
            return Err(anyhow::Error::new(e).context("error reading input"));
        }

        let elapsed_seconds = start.elapsed().as_secs_f64();
        info!(
            "scan complete: {targets} target(s), {bad_lines} bad line(s), \
             {emitted} result(s) in {elapsed_seconds:.1}s"
        );

        Ok(ScanReport {
            targets,
            bad_lines,
            emitted,
            elapsed_seconds,
        })
    }

    /// Parses one input line of exactly two comma-separated fields.
    fn parse_line(line: &str) -> Option<ProbeTarget> {
        let mut parts = line.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(host), Some(origin), None) => Some(ProbeTarget {
                host: host.to_string(),
                origin: origin.to_string(),
            }),
            _ => None,
        }
    }

}
