//! Rescan reference — the literal "delete, then scan again" definition.
//!
//! These functions are quadratic on cascading inputs and exist for tracing
//! (`crush trace`) and for checking [`collapse_runs_of`](super::collapse_runs_of)
//! in tests. Both loop instead of recursing, so call depth stays constant no
//! matter how many rounds an input needs.
//!
//! Two pass structures are available:
//!
//! - [`steps`] deletes one run per scan, always the leftmost qualifying one.
//!   Its final result is exactly what the single-pass stack produces.
//! - [`rounds`] deletes every qualifying run of the current string in the same
//!   pass before scanning again. It usually agrees with [`steps`], but not
//!   always: in `abbbaaa` both `bbb` and `aaa` qualify at once and the single
//!   `a` is left behind, whereas deleting `bbb` first merges the `a`s into
//!   `aaaa`, which is removed as well.

use super::{MIN_THRESHOLD, Run, find_runs};

// ---------------------------------------------------------------------------
// Step trace
// ---------------------------------------------------------------------------

/// One deletion in a [`steps`] trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The run that was deleted, located in the string *before* this step.
    pub removed: Run,
    /// The string after the deletion.
    pub result: String,
}

/// Delete the leftmost maximal run of at least `min_run` identical characters,
/// scan again, and repeat until no run qualifies.
///
/// Returns one [`Step`] per deletion; an input with no qualifying run yields
/// an empty trace. Every step keeps a copy of the whole string, so use
/// [`Walk`] when only a prefix of the trace is wanted.
pub fn steps(text: &str, min_run: usize) -> Vec<Step> {
    let mut walk = Walk::new(text, min_run);
    let mut trace = Vec::new();

    while let Some(removed) = walk.next() {
        trace.push(Step {
            removed,
            result: walk.remaining().iter().collect(),
        });
    }

    trace
}

/// Final string of a [`steps`] trace, without recording the intermediate
/// strings.
pub fn collapse_by_steps(text: &str, min_run: usize) -> String {
    let mut walk = Walk::new(text, min_run);
    while walk.next().is_some() {}
    walk.remaining().iter().collect()
}

/// Lazy form of [`steps`]: yields each deleted [`Run`] in order and exposes
/// the string left after the latest deletion through [`Walk::remaining`].
///
/// Nothing is copied per step, so taking the first few steps of a long trace
/// costs a few linear scans instead of the whole trace.
#[derive(Debug, Clone)]
pub struct Walk {
    chars: Vec<char>,
    min_run: usize,
    /// Start of the run where the next scan begins. Runs before it are
    /// untouched by the last deletion and already known to be too short.
    scan_from: usize,
}

impl Walk {
    pub fn new(text: &str, min_run: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            min_run: min_run.max(MIN_THRESHOLD),
            scan_from: 0,
        }
    }

    /// The string as it stands after the deletions yielded so far.
    pub fn remaining(&self) -> &[char] {
        &self.chars
    }
}

impl Iterator for Walk {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let run = leftmost_run(&self.chars, self.scan_from, self.min_run)?;
        self.chars.drain(run.start..run.end());

        // The run ending just before the gap may now extend across it.
        let mut from = run.start;
        if let Some(&before) = from.checked_sub(1).and_then(|i| self.chars.get(i)) {
            while from > 0 && self.chars[from - 1] == before {
                from -= 1;
            }
        }
        self.scan_from = from;

        Some(run)
    }
}

/// First qualifying run at or after `start`, which must be a run boundary.
fn leftmost_run(chars: &[char], mut start: usize, min_run: usize) -> Option<Run> {
    while start < chars.len() {
        let ch = chars[start];
        let len = chars[start..].iter().take_while(|&&c| c == ch).count();
        if len >= min_run {
            return Some(Run { ch, start, len });
        }
        start += len;
    }
    None
}

// ---------------------------------------------------------------------------
// Round trace
// ---------------------------------------------------------------------------

/// Delete every maximal run of at least `min_run` identical characters in the
/// same pass, scan again, and repeat until no run qualifies.
///
/// Returns the string left after each pass. The last element (if any) is the
/// fixed point under this pass structure.
pub fn rounds(text: &str, min_run: usize) -> Vec<String> {
    let mut current = text.to_string();
    let mut trace = Vec::new();

    loop {
        let runs = find_runs(&current, min_run);
        if runs.is_empty() {
            return trace;
        }

        let mut next = String::with_capacity(current.len());
        let mut runs = runs.iter().peekable();
        for (i, ch) in current.chars().enumerate() {
            while runs.peek().is_some_and(|run| run.end() <= i) {
                runs.next();
            }
            let deleted = runs.peek().is_some_and(|run| run.start <= i);
            if !deleted {
                next.push(ch);
            }
        }

        trace.push(next.clone());
        current = next;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
