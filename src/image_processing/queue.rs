//! The conversion controller: owns the item list and folds worker events
//! back into per-item state.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::batch::{BatchEvent, BatchHandle, BatchJob, BatchSummary, ConversionItem, ItemId};
use super::{ConversionSettings, JPEG_EXTENSIONS};
use crate::error::QueueError;
use crate::utils::has_valid_extension;

/// Progress of the current (or last) run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchProgress {
    pub total: usize,
    /// Successful conversions only; failures never advance progress
    pub converted: usize,
    pub failed: usize,
}

/// Ordered list of files to convert, with stable ids
#[derive(Debug, Default)]
pub struct ConversionQueue {
    /// Removed items leave a hole so ids stay valid
    slots: Vec<Option<ConversionItem>>,
    active: bool,
    progress: BatchProgress,
}

impl ConversionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items currently in the list
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a batch has been started and has not finished yet
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn progress(&self) -> BatchProgress {
        self.progress
    }

    pub fn get(&self, id: ItemId) -> Option<&ConversionItem> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Items in list order
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &ConversionItem)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (ItemId(index), item)))
    }

    /// Unprocessed items in list order
    pub fn pending(&self) -> Vec<(ItemId, PathBuf)> {
        self.items()
            .filter(|(_, item)| !item.processed)
            .map(|(id, item)| (id, item.path.clone()))
            .collect()
    }

    /// Add a single file; `None` if the path is already listed
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> Option<ItemId> {
        let path = path.into();
        if self.items().any(|(_, item)| item.path == path) {
            return None;
        }

        self.slots.push(Some(ConversionItem::new(path)));
        Some(ItemId(self.slots.len() - 1))
    }

    /// Add a file, or every JPEG below a directory in sorted order
    ///
    /// A file given directly is added whatever its extension; directory
    /// contents are filtered on `.jpg`/`.jpeg`.
    pub fn add_path(&mut self, path: &Path) -> Vec<ItemId> {
        if path.is_file() {
            return self.add_file(path).into_iter().collect();
        }

        let extensions: Vec<String> = JPEG_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        let mut added = Vec::new();

        tracing::debug!("Scanning directory: {}", path.display());
        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                    continue;
                }
            };

            let entry_path = entry.path();
            if entry.file_type().is_file() && has_valid_extension(entry_path, &extensions) {
                added.extend(self.add_file(entry_path));
            }
        }

        tracing::debug!("Added {} images from {}", added.len(), path.display());
        added
    }

    /// Remove items by id; refused while a batch is running
    pub fn remove(&mut self, ids: &[ItemId]) -> Result<usize, QueueError> {
        if self.active {
            return Err(QueueError::BatchActive);
        }

        let mut removed = 0;
        for id in ids {
            if let Some(slot) = self.slots.get_mut(id.0) {
                if slot.take().is_some() {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    /// Snapshot the pending items into a job and mark the queue active
    pub fn prepare(&mut self, settings: ConversionSettings) -> Result<BatchJob, QueueError> {
        if self.active {
            return Err(QueueError::BatchActive);
        }

        let job = BatchJob::from_items(self.items(), settings);
        if job.is_empty() {
            return Err(QueueError::NothingToConvert);
        }

        self.active = true;
        self.progress = BatchProgress {
            total: job.len(),
            ..BatchProgress::default()
        };
        Ok(job)
    }

    /// Start converting every pending item on a worker thread
    pub fn start(&mut self, settings: ConversionSettings) -> Result<BatchHandle, QueueError> {
        Ok(self.prepare(settings)?.spawn())
    }

    /// Wait for a running batch, apply whatever events are still queued and
    /// end the batch. The queue is unlocked even if the worker panicked.
    pub fn finish(&mut self, handle: BatchHandle) -> Option<BatchSummary> {
        let (events, summary) = handle.wait();
        for event in &events {
            self.apply(event);
        }
        self.release();
        summary
    }

    /// End the batch without a `Finished` event, e.g. after dropping a
    /// prepared job that was never run.
    pub fn release(&mut self) {
        if self.active {
            tracing::debug!("Batch released before finishing");
        }
        self.active = false;
    }

    /// Apply a worker event to item state and progress
    pub fn apply(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::ItemConverted { id, result, .. } => match result {
                Ok(_) => {
                    if let Some(item) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
                        if !item.processed {
                            item.processed = true;
                            self.progress.converted += 1;
                        }
                    }
                }
                Err(_) => self.progress.failed += 1,
            },
            BatchEvent::Finished(_) => self.active = false,
        }
    }
}
