//! Fire-and-forget click recording
//!
//! The resolution path hands a [`ClickDetail`] to [`ClickTracker::record`],
//! which only enqueues it. A small pool of named OS threads drains the
//! bounded queue, derives the [`ClickEvent`] and writes it to the sink.
//! Nothing that happens on the worker side is ever reported back to the
//! caller; failures are counted and logged.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use super::{ClickDetail, ClickEvent, ClickSink};
use crate::config::{ClickTrackerConfig, OverflowPolicy};
use crate::errors::{LinkforgeError, Result};

#[derive(Debug, Default)]
struct Counters {
    recorded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

pub struct ClickTracker {
    /// `None` once shut down
    sender: RwLock<Option<Sender<ClickDetail>>>,
    /// Used to evict the oldest queued event on overflow
    receiver: Receiver<ClickDetail>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    overflow: OverflowPolicy,
    counters: Arc<Counters>,
}

impl ClickTracker {
    /// Spawn the worker pool. `runtime` drives the sink's async writes.
    pub fn start(
        sink: Arc<dyn ClickSink>,
        config: &ClickTrackerConfig,
        runtime: Handle,
    ) -> Result<Self> {
        let (sender, receiver) = bounded(config.queue_capacity.max(1));
        let counters = Arc::new(Counters::default());

        let mut workers = Vec::with_capacity(config.workers);
        for index in 0..config.workers.max(1) {
            let receiver = receiver.clone();
            let sink = Arc::clone(&sink);
            let runtime = runtime.clone();
            let counters = Arc::clone(&counters);

            let handle = std::thread::Builder::new()
                .name(format!("click-tracker-{}", index))
                .spawn(move || worker_loop(receiver, sink, runtime, counters))
                .map_err(|e| {
                    LinkforgeError::validation(format!(
                        "Failed to spawn click tracker worker {}: {}",
                        index, e
                    ))
                })?;
            workers.push(handle);
        }

        info!(
            "Click tracker started: {} workers, queue {}, overflow {}",
            workers.len(),
            config.queue_capacity,
            config.overflow
        );

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            receiver,
            workers: Mutex::new(workers),
            overflow: config.overflow,
            counters,
        })
    }

    /// Enqueue a click. Never blocks on I/O and never fails.
    pub fn record(&self, detail: ClickDetail) {
        let guard = self.sender.read();
        let Some(sender) = guard.as_ref() else {
            trace!("Click tracker stopped, dropping click for '{}'", detail.code);
            self.note_dropped();
            return;
        };

        match sender.try_send(detail) {
            Ok(()) => {}
            Err(TrySendError::Full(detail)) => self.on_overflow(sender, detail),
            Err(TrySendError::Disconnected(detail)) => {
                debug!("Click tracker workers gone, dropping click for '{}'", detail.code);
                self.note_dropped();
            }
        }
    }

    fn on_overflow(&self, sender: &Sender<ClickDetail>, detail: ClickDetail) {
        match self.overflow {
            OverflowPolicy::DiscardNewest => {
                trace!("Click queue full, discarding new click for '{}'", detail.code);
                self.note_dropped();
            }
            OverflowPolicy::DiscardOldest => {
                if let Ok(oldest) = self.receiver.try_recv() {
                    trace!("Click queue full, discarding oldest click for '{}'", oldest.code);
                    self.note_dropped();
                }
                // a concurrent producer may have refilled the slot
                if sender.try_send(detail).is_err() {
                    self.note_dropped();
                }
            }
        }
    }

    fn note_dropped(&self) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Stop accepting clicks, let the workers drain the queue, then join them.
    ///
    /// Blocks the calling thread; call it from `spawn_blocking` inside a runtime.
    pub fn shutdown(&self) {
        let sender = self.sender.write().take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if worker.join().is_err() {
                warn!("Click tracker worker exited abnormally");
            }
        }

        info!(
            "Click tracker stopped: recorded={}, failed={}, dropped={}",
            self.recorded_count(),
            self.failed_count(),
            self.dropped_count()
        );
    }

    pub fn queued(&self) -> usize {
        self.receiver.len()
    }

    pub fn recorded_count(&self) -> u64 {
        self.counters.recorded.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }
}

fn worker_loop(
    receiver: Receiver<ClickDetail>,
    sink: Arc<dyn ClickSink>,
    runtime: Handle,
    counters: Arc<Counters>,
) {
    // Ends once every sender is dropped and the queue is empty
    for detail in receiver.iter() {
        let code = detail.code.clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let event = ClickEvent::from(detail);
            runtime.block_on(sink.record_click(event))
        }));

        match outcome {
            Ok(Ok(())) => {
                counters.recorded.fetch_add(1, Ordering::Relaxed);
                trace!("Click recorded for '{}'", code);
            }
            Ok(Err(e)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to record click for '{}': {}", code, e);
            }
            Err(_) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Click recording for '{}' panicked", code);
            }
        }
    }
}
