//! Conversion report
//!
//! Collects the outcome of every item of a run and renders it as a table,
//! followed by a short summary.

use prettytable::{format, Cell, Row, Table};
use std::fmt;
use std::path::Path;

use super::batch::{BatchEvent, BatchSummary};
use crate::utils::format_duration;

/// Outcome of a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Converted {
        output_filename: String,
        source_size: (u32, u32),
        output_size: (u32, u32),
    },
    Failed {
        kind: &'static str,
        message: String,
    },
}

/// Single row of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub input_filename: String,
    pub status: EntryStatus,
}

/// Complete conversion report
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub entries: Vec<ReportEntry>,
    pub summary: Option<BatchSummary>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a worker event
    pub fn record(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::ItemConverted { path, result, .. } => {
                let status = match result {
                    Ok(reduced) => EntryStatus::Converted {
                        output_filename: reduced.output.display().to_string(),
                        source_size: reduced.source_size,
                        output_size: reduced.output_size,
                    },
                    Err(e) => EntryStatus::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                };
                self.entries.push(ReportEntry {
                    input_filename: extract_filename(path),
                    status,
                });
            }
            BatchEvent::Finished(summary) => self.summary = Some(*summary),
        }
    }

    pub fn failed_entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Failed { .. }))
    }

    /// Build the table of entries
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        table.add_row(Row::new(vec![
            Cell::new("Input"),
            Cell::new("Output"),
            Cell::new("Source"),
            Cell::new("Reduced"),
            Cell::new("Status"),
        ]));

        for entry in &self.entries {
            table.add_row(entry_row(entry));
        }

        table
    }

    /// Print the complete report to stdout
    pub fn print(&self) {
        println!("\n📋 CONVERSION REPORT ({} images)\n", self.entries.len());
        self.table().printstd();
        println!();

        if let Some(summary) = &self.summary {
            print!("{}", SummaryLines(summary));
        }
        println!();
    }
}

fn entry_row(entry: &ReportEntry) -> Row {
    match &entry.status {
        EntryStatus::Converted {
            output_filename,
            source_size,
            output_size,
        } => Row::new(vec![
            Cell::new(&truncate(&entry.input_filename, 30)),
            Cell::new(&truncate(output_filename, 40)),
            Cell::new(&format_size(*source_size)),
            Cell::new(&format_size(*output_size)),
            Cell::new("✓"),
        ]),
        EntryStatus::Failed { kind, message } => Row::new(vec![
            Cell::new(&truncate(&entry.input_filename, 30)),
            Cell::new(&truncate(message, 40)),
            Cell::new(""),
            Cell::new(""),
            Cell::new(&format!("✗ {}", kind)),
        ]),
    }
}

struct SummaryLines<'a>(&'a BatchSummary);

impl fmt::Display for SummaryLines<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "📊 Summary:")?;
        writeln!(f, "   • Total images: {}", summary.total)?;
        writeln!(
            f,
            "   • Converted: {} ({:.1}%)",
            summary.converted,
            summary.success_rate()
        )?;
        writeln!(f, "   • Failed: {}", summary.failed)?;
        if summary.cancelled {
            writeln!(f, "   • Cancelled, not attempted: {}", summary.skipped)?;
        }
        writeln!(f, "   • Time: {}", format_duration(summary.elapsed))
    }
}

fn format_size((width, height): (u32, u32)) -> String {
    format!("{}x{}", width, height)
}

/// Truncate string to fit in column
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}

/// Helper to extract filename from path
pub fn extract_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("unknown")
        .to_string()
}
