use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::reducer::{reduce_file, Reduced};
use super::ConversionSettings;
use crate::error::ReduceError;

/// Stable index of an item in the conversion queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

/// A file waiting to be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionItem {
    pub path: PathBuf,
    /// Set once, when the reduced copy has been written
    pub processed: bool,
}

impl ConversionItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            processed: false,
        }
    }
}

/// Cooperative stop flag shared between the controller and the worker
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the worker to stop before its next item
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Messages sent from the worker to the controller
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// One item finished, successfully or not
    ItemConverted {
        id: ItemId,
        path: PathBuf,
        result: Result<Reduced, ReduceError>,
    },
    /// Always the last event of a run
    Finished(BatchSummary),
}

/// Outcome of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    /// Items never attempted because the run was cancelled
    pub skipped: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn success_rate(&self) -> f64 {
        let attempted = self.converted + self.failed;
        if attempted == 0 {
            0.0
        } else {
            (self.converted as f64 / attempted as f64) * 100.0
        }
    }

    pub fn average_duration(&self) -> Duration {
        let attempted = self.converted + self.failed;
        if attempted == 0 {
            Duration::ZERO
        } else {
            self.elapsed / attempted as u32
        }
    }
}

/// An ordered snapshot of pending items plus the settings to convert them with
#[derive(Debug, Clone)]
pub struct BatchJob {
    items: Vec<(ItemId, PathBuf)>,
    settings: ConversionSettings,
}

impl BatchJob {
    /// Build a job from queue items, leaving out those already processed
    pub fn from_items<'a, I>(items: I, settings: ConversionSettings) -> Self
    where
        I: IntoIterator<Item = (ItemId, &'a ConversionItem)>,
    {
        let items = items
            .into_iter()
            .filter(|(_, item)| !item.processed)
            .map(|(id, item)| (id, item.path.clone()))
            .collect();
        Self { items, settings }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(|(_, path)| path.as_path())
    }

    /// Convert the items in order on the calling thread.
    ///
    /// The token is checked before each item, never during one. `emit`
    /// receives one `ItemConverted` per attempted item, then `Finished`.
    pub fn run<F>(&self, token: &CancellationToken, mut emit: F) -> BatchSummary
    where
        F: FnMut(BatchEvent),
    {
        self.run_with(token, &mut emit, reduce_file)
    }

    fn run_with<F, C>(&self, token: &CancellationToken, emit: &mut F, mut convert: C) -> BatchSummary
    where
        F: FnMut(BatchEvent),
        C: FnMut(&Path, &ConversionSettings) -> Result<Reduced, ReduceError>,
    {
        let start_time = Instant::now();
        let mut summary = BatchSummary {
            total: self.items.len(),
            ..BatchSummary::default()
        };

        for (id, path) in &self.items {
            if token.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let result = convert(path, &self.settings);
            match &result {
                Ok(reduced) => {
                    summary.converted += 1;
                    tracing::debug!("Converted {} -> {}", path.display(), reduced.output.display());
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("{}", e);
                }
            }

            emit(BatchEvent::ItemConverted {
                id: *id,
                path: path.clone(),
                result,
            });
        }

        summary.skipped = summary.total - summary.converted - summary.failed;
        summary.elapsed = start_time.elapsed();
        emit(BatchEvent::Finished(summary));
        summary
    }

    /// Run the job on a worker thread, streaming events over a channel
    pub fn spawn(self) -> BatchHandle {
        let (tx, rx) = channel();
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let total = self.len();

        let worker = thread::spawn(move || {
            self.run(&worker_token, |event| {
                // The controller may stop listening; the run still completes
                let _ = tx.send(event);
            })
        });

        BatchHandle {
            events: rx,
            token,
            worker,
            total,
        }
    }
}

/// Controller side of a running batch
#[derive(Debug)]
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    token: CancellationToken,
    worker: JoinHandle<BatchSummary>,
    total: usize,
}

impl BatchHandle {
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Number of items in the run
    pub fn total(&self) -> usize {
        self.total
    }

    /// Wait for the worker; `None` if it panicked
    pub fn join(self) -> Option<BatchSummary> {
        self.worker.join().ok()
    }

    /// Wait for the worker and collect the events nobody has read yet
    pub fn wait(self) -> (Vec<BatchEvent>, Option<BatchSummary>) {
        let summary = self.worker.join().ok();
        // The sender is gone once the worker has exited
        let pending = self.events.try_iter().collect();
        (pending, summary)
    }
}
