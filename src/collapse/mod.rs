//! Collapser — remove runs of identical consecutive characters until stable.
//!
//! Any maximal run of [`MIN_RUN_LENGTH`] or more identical characters is
//! deleted, and deleting a run can bring two equal neighbours together into a
//! new run:
//!
//! ```text
//! aabcccbbad -> aabbbad -> aaad -> d
//! ```
//!
//! [`collapse`] reaches the fixed point in a single left-to-right pass over a
//! stack of `(char, count)` entries (see [`stack`]). The [`rescan`] module
//! keeps the literal "delete and scan again" definition around as a
//! step-by-step trace and as a test oracle.
//!
//! The expected alphabet is lowercase `a`–`z`, but nothing here depends on it:
//! characters are only ever compared for equality.

pub mod rescan;
pub mod stack;

pub use stack::collapse_runs_of;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Shortest run of identical characters that gets deleted.
pub const MIN_RUN_LENGTH: usize = 3;

/// Smallest threshold accepted by [`collapse_runs_of`]. A threshold of 1
/// would delete every character.
pub const MIN_THRESHOLD: usize = 2;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Collapse `text` to its fixed point: no run of 3 or more identical
/// consecutive characters remains.
///
/// The result is a subsequence of `text` and the call never fails, the empty
/// string included.
///
/// ```rust,ignore
/// assert_eq!(crush::collapse::collapse("aabcccbbad"), "d");
/// assert_eq!(crush::collapse::collapse("aaaa"), "");
/// ```
pub fn collapse(text: &str) -> String {
    collapse_runs_of(text, MIN_RUN_LENGTH)
}

// ---------------------------------------------------------------------------
// Run detection
// ---------------------------------------------------------------------------

/// A maximal run of identical characters inside one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub ch: char,
    /// Char (not byte) index of the first character of the run.
    pub start: usize,
    pub len: usize,
}

impl Run {
    /// Char index one past the last character of the run.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// List every maximal run of at least `min_run` identical characters, left to
/// right. Runs are disjoint by construction.
pub fn find_runs(text: &str, min_run: usize) -> Vec<Run> {
    let min_run = min_run.max(MIN_THRESHOLD);
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;

    for (i, ch) in text.chars().enumerate() {
        if let Some(run) = current.as_mut()
            && run.ch == ch
        {
            run.len += 1;
            continue;
        }

        if let Some(run) = current.take()
            && run.len >= min_run
        {
            runs.push(run);
        }
        current = Some(Run {
            ch,
            start: i,
            len: 1,
        });
    }

    if let Some(run) = current
        && run.len >= min_run
    {
        runs.push(run);
    }

    runs
}

/// Whether `text` still contains a run of at least `min_run` identical
/// characters.
pub fn has_run(text: &str, min_run: usize) -> bool {
    let min_run = min_run.max(MIN_THRESHOLD);
    let mut prev: Option<char> = None;
    let mut len = 0usize;

    for ch in text.chars() {
        if prev == Some(ch) {
            len += 1;
        } else {
            prev = Some(ch);
            len = 1;
        }
        if len >= min_run {
            return true;
        }
    }

    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
