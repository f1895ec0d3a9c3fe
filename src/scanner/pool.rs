//! Fixed-size worker pool with a shared work queue.
//!
//! Items are pushed into a queue up front; `workers` tasks pop from it until
//! it is empty and forward what their job yields into a results channel. The
//! channel closes once the last worker has exited, so a consumer can simply
//! drain the receiver.

use crate::scanner::traits::{PortProbeOutcome, Scanner};
use crate::types::Port;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::trace;

/// A pool of `workers` concurrent tasks draining one queue.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool. A worker count of zero is raised to one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawn the workers and return the receiving end of the results stream.
    ///
    /// `job` returns `None` to drop an item's result. Must be called from
    /// within a tokio runtime.
    pub fn run<I, T, F, Fut>(&self, items: Vec<I>, job: F) -> mpsc::Receiver<T>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let job = Arc::new(job);

        for worker in 0..self.workers {
            let queue = Arc::clone(&queue);
            let job = Arc::clone(&job);
            let tx = tx.clone();

            tokio::spawn(async move {
                let mut handled = 0usize;
                while let Some(item) = next_item(&queue) {
                    handled += 1;
                    if let Some(result) = job(item).await {
                        if tx.send(result).await.is_err() {
                            break;
                        }
                    }
                }
                trace!(worker, handled, "worker finished");
            });
        }

        // The stream ends when every worker has dropped its sender.
        drop(tx);
        rx
    }
}

/// Pop the next item. The lock is released before the caller awaits.
fn next_item<I>(queue: &Mutex<VecDeque<I>>) -> Option<I> {
    match queue.lock() {
        Ok(mut guard) => guard.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

/// Probe `ports` through `scanner` on a pool of `workers` tasks, forwarding
/// only the outcomes accepted by `keep`.
pub fn probe_ports(
    scanner: Arc<dyn Scanner>,
    ports: Vec<Port>,
    workers: usize,
    keep: fn(&PortProbeOutcome) -> bool,
) -> mpsc::Receiver<PortProbeOutcome> {
    WorkerPool::new(workers).run(ports, move |port| {
        let scanner = Arc::clone(&scanner);
        async move {
            let outcome = scanner.scan_port(port).await;
            keep(&outcome).then_some(outcome)
        }
    })
}
