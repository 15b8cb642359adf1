//! JSON output for front-end integration
//!
//! When --json-progress flag is enabled, all progress and status information
//! is emitted as JSON lines to stdout, suppressing all other output.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::image_processing::{BatchEvent, BatchSummary, Planned};

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

const PROGRESS_INTERVAL_MS: u64 = 40;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Batch accepted and about to start
    Started { total: usize, policy: String },
    /// Non-fatal configuration problem
    Warning { message: String },
    /// Progress update
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// File processing completed
    FileCompleted {
        input_path: String,
        output_path: String,
        width: u32,
        height: u32,
    },
    /// Dry run: what would be written, nothing was converted
    Planned {
        input_path: String,
        output_path: String,
        source_width: u32,
        source_height: u32,
        width: u32,
        height: u32,
    },
    /// File processing failed
    FileFailed {
        input_path: String,
        kind: String,
        error: String,
    },
    /// Processing summary
    Summary {
        total_files: usize,
        converted: usize,
        failed: usize,
        skipped: usize,
        cancelled: bool,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn started(total: usize, policy: impl Into<String>) {
        Self::Started {
            total,
            policy: policy.into(),
        }
        .emit();
    }

    pub fn warning(message: impl Into<String>) {
        Self::Warning {
            message: message.into(),
        }
        .emit();
    }

    /// Create and emit progress message (throttled to ~25 FPS)
    ///
    /// The final progress (current == total) is always emitted.
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if should_emit_progress(now_ms, last_ms, current, total) {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }

    pub fn file_completed(input_path: &Path, output_path: &Path, (width, height): (u32, u32)) {
        Self::FileCompleted {
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            width,
            height,
        }
        .emit();
    }

    pub fn planned(planned: &Planned) {
        Self::from(planned).emit();
    }

    pub fn file_failed(input_path: &Path, kind: &str, error: impl Into<String>) {
        Self::FileFailed {
            input_path: input_path.display().to_string(),
            kind: kind.to_string(),
            error: error.into(),
        }
        .emit();
    }

    pub fn summary(summary: &BatchSummary) {
        Self::from(summary).emit();
    }

    /// Emit the message matching a worker event
    pub fn batch_event(event: &BatchEvent) {
        match event {
            BatchEvent::ItemConverted { path, result, .. } => match result {
                Ok(reduced) => Self::file_completed(path, &reduced.output, reduced.output_size),
                Err(e) => Self::file_failed(path, e.kind(), e.to_string()),
            },
            BatchEvent::Finished(summary) => Self::summary(summary),
        }
    }
}

impl From<&Planned> for JsonMessage {
    fn from(planned: &Planned) -> Self {
        Self::Planned {
            input_path: planned.source.display().to_string(),
            output_path: planned.output.display().to_string(),
            source_width: planned.source_size.0,
            source_height: planned.source_size.1,
            width: planned.output_size.0,
            height: planned.output_size.1,
        }
    }
}

impl From<&BatchSummary> for JsonMessage {
    fn from(summary: &BatchSummary) -> Self {
        Self::Summary {
            total_files: summary.total,
            converted: summary.converted,
            failed: summary.failed,
            skipped: summary.skipped,
            cancelled: summary.cancelled,
            duration_secs: summary.elapsed.as_secs_f64(),
        }
    }
}

fn should_emit_progress(now_ms: u64, last_ms: u64, current: usize, total: usize) -> bool {
    now_ms.saturating_sub(last_ms) >= PROGRESS_INTERVAL_MS || current == total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_message_tags() {
        let json = serde_json::to_string(&JsonMessage::Warning {
            message: "ratio mode activated".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"warning","message":"ratio mode activated"}"#);

        let json = serde_json::to_string(&JsonMessage::FileCompleted {
            input_path: "a.jpg".to_string(),
            output_path: "reduced/a.jpg".to_string(),
            width: 10,
            height: 5,
        })
        .unwrap();
        assert!(json.starts_with(r#"{"type":"file_completed""#));
    }

    #[test]
    fn test_summary_from_batch() {
        let summary = BatchSummary {
            total: 4,
            converted: 2,
            failed: 1,
            skipped: 1,
            cancelled: true,
            elapsed: Duration::from_millis(2500),
        };

        assert_eq!(
            JsonMessage::from(&summary),
            JsonMessage::Summary {
                total_files: 4,
                converted: 2,
                failed: 1,
                skipped: 1,
                cancelled: true,
                duration_secs: 2.5,
            }
        );
    }

    #[test]
    fn test_planned_is_distinct_from_completed() {
        let planned = Planned {
            source: PathBuf::from("a.jpg"),
            output: PathBuf::from("reduced/a.jpg"),
            source_size: (400, 300),
            output_size: (200, 150),
        };

        let json = serde_json::to_value(JsonMessage::from(&planned)).unwrap();
        assert_eq!(json["type"], "planned");
        assert_eq!(json["output_path"], "reduced/a.jpg");
        assert_eq!(json["source_width"], 400);
        assert_eq!(json["width"], 200);
        assert_eq!(json["height"], 150);
    }

    #[test]
    fn test_progress_throttling() {
        assert!(!should_emit_progress(1_010, 1_000, 1, 10));
        assert!(should_emit_progress(1_040, 1_000, 1, 10));
        // The final update always goes out
        assert!(should_emit_progress(1_001, 1_000, 10, 10));
        // Clock going backwards never underflows
        assert!(!should_emit_progress(900, 1_000, 1, 10));
    }
}
