//! Bounded pool of probe workers.
//!
//! Workers pull targets from a shared input channel, probe them, and push
//! results to the output channel. Both channels are bounded, so a slow sink
//! or a closed input applies backpressure instead of unbounded buffering.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::probe::{ProbeResult, ProbeTarget, Prober};

/// A fixed-size set of concurrent probe workers.
///
/// The worker count bounds the number of in-flight probes; workers block on
/// the queues rather than spawning further concurrency.
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawns `workers` tasks probing targets from `work_rx` into `result_tx`.
    ///
    /// Each worker loops until the input channel is closed and drained, or
    /// until the result channel has no receiver left. The pool takes
    /// ownership of `result_tx`; once every worker exits, all result senders
    /// are gone and the sink's channel closes.
    pub fn spawn(
        prober: Arc<Prober>,
        work_rx: Receiver<ProbeTarget>,
        result_tx: Sender<ProbeResult>,
        workers: usize,
    ) -> Self {
        let work_rx = Arc::new(Mutex::new(work_rx));
        let mut set = JoinSet::new();

        for _ in 0..workers {
            let prober = Arc::clone(&prober);
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            set.spawn(async move {
                loop {
                    // The lock is held only for the dequeue itself, so other
                    // workers keep pulling while this probe runs.
                    let target = work_rx.lock().await.recv().await;
                    let Some(target) = target else {
                        break;
                    };
                    let result = prober.probe(target).await;
                    if result_tx.send(result).await.is_err() {
                        break;
                    }
                }
            });
        }

        Self { workers: set }
    }

    /// Waits for every worker to exit.
    ///
    /// Resolves only after all dequeued targets have been fully processed
    /// and their results enqueued.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker task panicked.
    pub async fn join(mut self) -> Result<()> {
        while let Some(joined) = self.workers.join_next().await {
            joined.map_err(|e| anyhow!("probe worker task failed: {e}"))?;
        }
        Ok(())
    }
}
