//! Single-pass run-length stack.
//!
//! The stack holds the collapsed form of the prefix consumed so far, one
//! entry per run. Only the top entry can still grow. Every entry below the top
//! is shorter than the threshold, because a run is checked the moment it is
//! closed by a different character (or by the end of input) and popped if it
//! qualifies. Popping can make the new top adjacent to the incoming
//! character, which then simply extends it.
//!
//! A run is popped when it is closed, not when its count first reaches the
//! threshold, so a run of four or more goes away in one piece.

use super::MIN_THRESHOLD;

// ---------------------------------------------------------------------------
// Stack entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Entry {
    ch: char,
    count: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Collapse `text`, deleting every maximal run of at least `min_run`
/// identical characters until none is left.
///
/// `min_run` values below 2 are treated as 2.
pub fn collapse_runs_of(text: &str, min_run: usize) -> String {
    let min_run = min_run.max(MIN_THRESHOLD);
    let mut stack: Vec<Entry> = Vec::new();

    for ch in text.chars() {
        if let Some(top) = stack.last_mut()
            && top.ch == ch
        {
            top.count += 1;
            continue;
        }

        // `ch` closes the top run.
        close_top(&mut stack, min_run);

        if let Some(top) = stack.last_mut()
            && top.ch == ch
        {
            top.count += 1;
        } else {
            stack.push(Entry { ch, count: 1 });
        }
    }

    close_top(&mut stack, min_run);

    let mut result = String::with_capacity(text.len());
    for entry in &stack {
        result.extend(std::iter::repeat_n(entry.ch, entry.count));
    }
    result
}

/// Pop the top entry if it is long enough to be deleted.
fn close_top(stack: &mut Vec<Entry>, min_run: usize) {
    if stack.last().is_some_and(|top| top.count >= min_run) {
        stack.pop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_run_exposed_by_deletion() {
        assert_eq!(collapse_runs_of("aabcccbbad", 3), "d");
    }

    #[test]
    fn removes_long_run_entirely() {
        assert_eq!(collapse_runs_of("aaaa", 3), "");
        assert_eq!(collapse_runs_of("baaaaaab", 3), "bb");
    }

    #[test]
    fn keeps_input_without_runs() {
        assert_eq!(collapse_runs_of("abc", 3), "abc");
        assert_eq!(collapse_runs_of("aabbaa", 3), "aabbaa");
    }

    #[test]
    fn independent_runs_at_threshold() {
        assert_eq!(collapse_runs_of("aaabbbccc", 3), "");
    }

    #[test]
    fn leading_run_does_not_cascade_further() {
        assert_eq!(collapse_runs_of("aaabccba", 3), "bccba");
    }

    #[test]
    fn merged_run_keeps_growing_before_removal() {
        // "bbb" goes, the a's join into "aaaa", which goes in one piece.
        assert_eq!(collapse_runs_of("abbbaaa", 3), "");
    }

    #[test]
    fn threshold_of_two() {
        assert_eq!(collapse_runs_of("abba", 2), "");
        assert_eq!(collapse_runs_of("abcab", 2), "abcab");
    }

    #[test]
    fn threshold_below_two_is_clamped() {
        assert_eq!(collapse_runs_of("abba", 1), "");
        assert_eq!(collapse_runs_of("abc", 0), "abc");
    }

    #[test]
    fn larger_threshold_keeps_shorter_runs() {
        assert_eq!(collapse_runs_of("aaabbbb", 4), "aaa");
    }

    #[test]
    fn non_alphabet_characters_compare_by_equality() {
        assert_eq!(collapse_runs_of("x!!!y", 3), "xy");
        assert_eq!(collapse_runs_of("a   b", 3), "ab");
        assert_eq!(collapse_runs_of("zééézz", 3), "");
    }
}
