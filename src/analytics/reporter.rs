//! Analytics reporter — aggregation behind `crush stats`.
//!
//! Reads the JSONL collapse log and provides overall totals plus a per-day
//! breakdown.

use std::collections::HashMap;
use std::path::Path;

use crate::analytics::logger::{self, CollapseLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `crush stats`.
#[derive(Debug, Default)]
pub struct Stats {
    pub total_collapses: usize,
    pub total_input_chars: usize,
    pub total_output_chars: usize,
    /// Characters removed across all collapses, as a percentage of input.
    pub reduction_pct: f64,
    /// Non-empty inputs that collapsed to the empty string.
    pub fully_collapsed: usize,
    /// Inputs that had no qualifying run at all.
    pub unchanged: usize,
    pub longest_input: usize,
    pub avg_duration_us: f64,
    pub daily: Vec<DayEntry>,
}

/// Collapses recorded on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    pub date: String,
    pub collapses: usize,
    pub removed_chars: usize,
    pub reduction_pct: f64,
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute stats from the log at `path`, optionally filtered to the last
/// `days` days.
pub fn compute_stats(path: &Path, days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(path, days);
    build_stats(&entries)
}

pub fn build_stats(entries: &[CollapseLogEntry]) -> Stats {
    if entries.is_empty() {
        return Stats::default();
    }

    let total_collapses = entries.len();
    let total_input_chars: usize = entries.iter().map(|e| e.input_chars).sum();
    let total_output_chars: usize = entries.iter().map(|e| e.output_chars).sum();
    let total_duration_us: u64 = entries.iter().map(|e| e.duration_us).sum();

    Stats {
        total_collapses,
        total_input_chars,
        total_output_chars,
        reduction_pct: reduction_pct(total_input_chars, total_output_chars),
        fully_collapsed: entries.iter().filter(|e| e.fully_collapsed()).count(),
        unchanged: entries.iter().filter(|e| e.removed_chars == 0).count(),
        longest_input: entries.iter().map(|e| e.input_chars).max().unwrap_or(0),
        avg_duration_us: total_duration_us as f64 / total_collapses as f64,
        daily: compute_daily(entries),
    }
}

/// Group entries by date (the `YYYY-MM-DD` prefix of the timestamp), oldest
/// first.
fn compute_daily(entries: &[CollapseLogEntry]) -> Vec<DayEntry> {
    let mut groups: HashMap<&str, Vec<&CollapseLogEntry>> = HashMap::new();
    for entry in entries {
        let date = entry.timestamp.get(..10).unwrap_or("unknown");
        groups.entry(date).or_default().push(entry);
    }

    let mut daily: Vec<DayEntry> = groups
        .into_iter()
        .map(|(date, group)| {
            let input: usize = group.iter().map(|e| e.input_chars).sum();
            let output: usize = group.iter().map(|e| e.output_chars).sum();
            DayEntry {
                date: date.to_string(),
                collapses: group.len(),
                removed_chars: group.iter().map(|e| e.removed_chars).sum(),
                reduction_pct: reduction_pct(input, output),
            }
        })
        .collect();

    daily.sort_by(|a, b| a.date.cmp(&b.date));
    daily
}

fn reduction_pct(input: usize, output: usize) -> f64 {
    if input == 0 {
        0.0
    } else {
        (input.saturating_sub(output) as f64 / input as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
