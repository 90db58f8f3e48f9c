use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::handler::{Listener, RequestData, ResponseData};

// ---------------------------------------------------------------------------
// Collapse log entry (JSONL analytics)
// ---------------------------------------------------------------------------

/// A single entry in the analytics log (`~/.crush/collapse-log.jsonl`).
///
/// Lengths are in characters, not bytes. Used by the reporter for
/// `crush stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapseLogEntry {
    pub timestamp: String,
    pub input_chars: usize,
    pub output_chars: usize,
    pub removed_chars: usize,
    #[serde(default = "default_min_run")]
    pub min_run: usize,
    #[serde(default)]
    pub duration_us: u64,
}

fn default_min_run() -> usize {
    crate::collapse::MIN_RUN_LENGTH
}

impl CollapseLogEntry {
    pub fn from_response(response: &ResponseData) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            input_chars: response.input.chars().count(),
            output_chars: response.output.chars().count(),
            removed_chars: response.removed_chars,
            min_run: response.min_run,
            duration_us: response.duration_us,
        }
    }

    /// Whether the input was non-empty and nothing survived.
    pub fn fully_collapsed(&self) -> bool {
        self.input_chars > 0 && self.output_chars == 0
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Appends one [`CollapseLogEntry`] per handled request. Best-effort.
pub struct AnalyticsListener {
    path: PathBuf,
}

impl AnalyticsListener {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Listener for AnalyticsListener {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn after(&self, _request: &RequestData, response: &ResponseData) {
        let entry = CollapseLogEntry::from_response(response);
        let _ = append_log_entry(&self.path, &entry);
    }
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from the analytics log at `path`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries(path: &Path) -> Vec<CollapseLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<CollapseLogEntry>(&line).ok())
        .collect()
}

/// Read log entries filtered to a time window (last N days).
///
/// If `days` is `None`, returns all entries.
pub fn read_entries_since_days(path: &Path, days: Option<u32>) -> Vec<CollapseLogEntry> {
    let entries = read_all_entries(path);

    let Some(days) = days else {
        return entries;
    };

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    let cutoff_str = cutoff.to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff_str)
        .collect()
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_log_entry(path: &Path, entry: &CollapseLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("crush-analytics-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn listener_appends_one_entry_per_request() {
        let path = temp_log("append.jsonl");
        let handler = Handler::default().with_listener(Box::new(AnalyticsListener::new(path.clone())));
        handler.handle(Some("aabcccbbad")).unwrap();
        handler.handle(Some("abc")).unwrap();

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].input_chars, 10);
        assert_eq!(entries[0].output_chars, 1);
        assert_eq!(entries[0].removed_chars, 9);
        assert_eq!(entries[0].min_run, 3);
        assert_eq!(entries[1].removed_chars, 0);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_log("malformed.jsonl");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "not json\n{\"timestamp\":\"2026-01-01T00:00:00+00:00\",\"input_chars\":3,\"output_chars\":0,\"removed_chars\":3}\n",
        )
        .unwrap();

        let entries = read_all_entries(&path);
        assert_eq!(entries.len(), 1);
        // Missing optional fields fall back to defaults.
        assert_eq!(entries[0].min_run, 3);
        assert_eq!(entries[0].duration_us, 0);
        assert!(entries[0].fully_collapsed());
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let path = temp_log("missing.jsonl");
        assert!(read_all_entries(&path).is_empty());
        assert!(read_entries_since_days(&path, Some(7)).is_empty());
    }

    #[test]
    fn day_filter_drops_old_entries() {
        let path = temp_log("days.jsonl");
        let old = CollapseLogEntry {
            timestamp: "2000-01-01T00:00:00+00:00".to_string(),
            input_chars: 3,
            output_chars: 0,
            removed_chars: 3,
            min_run: 3,
            duration_us: 1,
        };
        let recent = CollapseLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            ..old.clone()
        };
        append_log_entry(&path, &old).unwrap();
        append_log_entry(&path, &recent).unwrap();

        assert_eq!(read_entries_since_days(&path, None).len(), 2);
        assert_eq!(read_entries_since_days(&path, Some(1)).len(), 1);
    }

    #[test]
    fn empty_input_is_not_fully_collapsed() {
        let entry = CollapseLogEntry {
            timestamp: String::new(),
            input_chars: 0,
            output_chars: 0,
            removed_chars: 0,
            min_run: 3,
            duration_us: 0,
        };
        assert!(!entry.fully_collapsed());
    }
}
