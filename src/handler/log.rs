//! Diagnostic log listener.
//!
//! Appends one timestamped line per event to the log file
//! (`~/.crush/crush.log` by default):
//!
//! ```text
//! 2026-10-19T08:12:44.120+00:00 INFO request "aabcccbbad"
//! 2026-10-19T08:12:44.120+00:00 DEBUG step 1: removed "ccc" at 3 -> "aabbbad"
//! 2026-10-19T08:12:44.120+00:00 INFO result "d" (removed 9 chars in 4us)
//! ```
//!
//! At `debug` level the rescan trace is written as well, capped at
//! [`MAX_TRACE_STEPS`] steps so a long cascade costs a bounded number of
//! scans. Logging is best-effort: a file that cannot be opened is skipped silently.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

use super::{Listener, RequestData, ResponseData};
use crate::collapse::rescan;
use crate::config::LogLevel;

/// Most rescan steps written per collapse at `debug` level.
pub const MAX_TRACE_STEPS: usize = 100;

/// Longest string quoted in a log line, in chars.
const MAX_LOGGED_CHARS: usize = 200;

pub struct LogListener {
    path: PathBuf,
    level: LogLevel,
}

impl LogListener {
    pub fn new(path: PathBuf, level: LogLevel) -> Self {
        Self { path, level }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    fn write(&self, level: LogLevel, messages: &[String]) {
        if !self.enabled(level) || messages.is_empty() {
            return;
        }

        if let Some(parent) = self.path.parent()
            && create_dir_all(parent).is_err()
        {
            return;
        }

        let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        else {
            return;
        };

        let timestamp = Utc::now().to_rfc3339();
        for message in messages {
            let _ = writeln!(file, "{}", format_line(&timestamp, level, message));
        }
    }
}

impl Listener for LogListener {
    fn name(&self) -> &'static str {
        "log"
    }

    fn before(&self, request: &mut RequestData) {
        self.write(
            LogLevel::Info,
            &[format!("request {:?}", summarize(&request.preprocessed))],
        );
    }

    fn after(&self, _request: &RequestData, response: &ResponseData) {
        if self.enabled(LogLevel::Debug) {
            self.write(LogLevel::Debug, &trace_lines(response));
        }

        self.write(
            LogLevel::Info,
            &[format!(
                "result {:?} (removed {} chars in {}us)",
                summarize(&response.output),
                response.removed_chars,
                response.duration_us
            )],
        );
    }
}

/// Describe the first [`MAX_TRACE_STEPS`] deletions of `response.input`.
fn trace_lines(response: &ResponseData) -> Vec<String> {
    let mut walk = rescan::Walk::new(&response.input, response.min_run);
    let mut lines = Vec::new();

    while let Some(run) = walk.next() {
        if lines.len() == MAX_TRACE_STEPS {
            lines.push(format!(
                "trace stopped after {MAX_TRACE_STEPS} steps ({} chars left to process)",
                walk.remaining().len() + run.len
            ));
            break;
        }
        let removed: String = std::iter::repeat_n(run.ch, run.len).collect();
        let result: String = walk.remaining().iter().take(MAX_LOGGED_CHARS + 1).collect();
        lines.push(format!(
            "step {}: removed {:?} at {} -> {:?}",
            lines.len() + 1,
            removed,
            run.start,
            summarize(&result)
        ));
    }

    lines
}

fn format_line(timestamp: &str, level: LogLevel, message: &str) -> String {
    format!("{timestamp} {level} {message}")
}

/// Shorten long strings so one collapse cannot flood the log.
fn summarize(text: &str) -> String {
    if text.chars().nth(MAX_LOGGED_CHARS).is_some() {
        let head: String = text.chars().take(MAX_LOGGED_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::handler::Handler;

    fn temp_log(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("crush-log-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn info_level_logs_request_and_result() {
        let path = temp_log("info.log");
        let handler =
            Handler::default().with_listener(Box::new(LogListener::new(path.clone(), LogLevel::Info)));
        handler.handle(Some("aabcccbbad")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO request \"aabcccbbad\""));
        assert!(lines[1].contains("INFO result \"d\" (removed 9 chars"));
    }

    #[test]
    fn debug_level_logs_each_step() {
        let path = temp_log("debug.log");
        let handler = Handler::default()
            .with_listener(Box::new(LogListener::new(path.clone(), LogLevel::Debug)));
        handler.handle(Some("aabcccbbad")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("DEBUG step 1: removed \"ccc\" at 3 -> \"aabbbad\""));
        assert!(content.contains("DEBUG step 2: removed \"bbb\" at 2 -> \"aaad\""));
        assert!(content.contains("DEBUG step 3: removed \"aaa\" at 0 -> \"d\""));
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn debug_trace_of_deep_cascade_is_capped() {
        // "aabb...aaa...ba": each level is removed by its own step.
        let depth = 100_000;
        let level_char = |i: usize| if i % 2 == 1 { 'b' } else { 'a' };
        let mut input = String::with_capacity(3 * depth + 3);
        for i in (1..=depth).rev() {
            input.push(level_char(i));
            input.push(level_char(i));
        }
        input.push_str("aaa");
        input.extend((1..=depth).map(level_char));

        let path = temp_log("cascade.log");
        let handler = Handler::default()
            .with_listener(Box::new(LogListener::new(path.clone(), LogLevel::Debug)));
        assert_eq!(handler.handle(Some(&input)).unwrap().output, "");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // request + capped steps + stop notice + result
        assert_eq!(lines.len(), MAX_TRACE_STEPS + 3);
        assert!(lines[MAX_TRACE_STEPS + 1].contains("DEBUG trace stopped after"));
        assert!(lines.iter().all(|line| line.len() < 1_000));
    }

    #[test]
    fn warn_level_logs_nothing_for_a_normal_collapse() {
        let path = temp_log("warn.log");
        let handler =
            Handler::default().with_listener(Box::new(LogListener::new(path.clone(), LogLevel::Warn)));
        handler.handle(Some("abc")).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn format_line_layout() {
        assert_eq!(
            format_line("2026-01-01T00:00:00+00:00", LogLevel::Info, "hello"),
            "2026-01-01T00:00:00+00:00 INFO hello"
        );
    }

    #[test]
    fn summarize_truncates_long_input() {
        let long = "ab".repeat(150);
        let short = summarize(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);
        assert_eq!(summarize("abc"), "abc");
    }
}
