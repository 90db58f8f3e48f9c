use crush::collapse::rescan::{self, collapse_by_steps};
use crush::collapse::{collapse, collapse_runs_of, has_run};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Every string over `alphabet` of exactly `len` characters.
fn all_strings(alphabet: &[char], len: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    for _ in 0..len {
        out = out
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |&c| {
                    let mut s = prefix.clone();
                    s.push(c);
                    s
                })
            })
            .collect();
    }
    out
}

/// Deterministic pseudo-random strings (64-bit LCG) so failures reproduce.
fn random_strings(seed: u64, count: usize, max_len: usize, alphabet: &[char]) -> Vec<String> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };

    (0..count)
        .map(|_| {
            let len = next() % (max_len + 1);
            (0..len)
                .map(|_| alphabet[next() % alphabet.len()])
                .collect::<String>()
        })
        .collect()
}

/// Whether `sub` can be obtained from `full` by deleting characters.
fn is_subsequence(sub: &str, full: &str) -> bool {
    let mut full = full.chars();
    sub.chars().all(|c| full.any(|f| f == c))
}

/// A string that collapses one level per deletion: each level wraps the
/// previous one as `cc <inner> c`, so removing the innermost run exposes the
/// next one. Built directly to keep construction linear.
fn cascade(depth: usize) -> String {
    let level_char = |i: usize| if i % 2 == 1 { 'b' } else { 'a' };
    let mut s = String::with_capacity(3 * depth + 3);
    for i in (1..=depth).rev() {
        s.push(level_char(i));
        s.push(level_char(i));
    }
    s.push_str("aaa");
    for i in 1..=depth {
        s.push(level_char(i));
    }
    s
}

// ===========================================================================
// Concrete scenarios
// ===========================================================================

#[test]
fn documented_example_collapses_to_single_char() {
    assert_eq!(collapse("aabcccbbad"), "d");
}

#[test]
fn run_longer_than_threshold_is_removed_entirely() {
    assert_eq!(collapse("aaaa"), "");
    assert_eq!(collapse("aaaaaaaaaa"), "");
    assert_eq!(collapse("xaaaaay"), "xy");
}

#[test]
fn input_without_runs_is_unchanged() {
    assert_eq!(collapse("abc"), "abc");
    assert_eq!(collapse("aabbccaabb"), "aabbccaabb");
}

#[test]
fn leading_run_removal_leaves_remainder() {
    assert_eq!(collapse("aaabccba"), "bccba");
}

#[test]
fn independent_runs_are_all_removed() {
    assert_eq!(collapse("aaabbbccc"), "");
}

#[test]
fn empty_input_gives_empty_output() {
    assert_eq!(collapse(""), "");
}

#[test]
fn exact_threshold_run_alone() {
    assert_eq!(collapse("aaa"), "");
    assert_eq!(collapse("aa"), "aa");
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn properties_hold_on_random_inputs() {
    for alphabet in [&['a', 'b'][..], &['a', 'b', 'c'][..], &['a', 'b', 'c', 'd'][..]] {
        for s in random_strings(0x5eed, 2000, 60, alphabet) {
            let out = collapse(&s);

            assert_eq!(collapse(&out), out, "not idempotent for {s:?}");
            assert!(!has_run(&out, 3), "residual run in {out:?} from {s:?}");
            assert!(is_subsequence(&out, &s), "{out:?} reorders {s:?}");
            assert!(out.len() <= s.len());
        }
    }
}

#[test]
fn collapse_is_deterministic() {
    for s in random_strings(7, 200, 40, &['a', 'b', 'c']) {
        assert_eq!(collapse(&s), collapse(&s));
    }
}

#[test]
fn properties_hold_for_other_thresholds() {
    for min_run in [2, 4, 5] {
        for s in random_strings(42, 500, 50, &['a', 'b', 'c']) {
            let out = collapse_runs_of(&s, min_run);
            assert!(!has_run(&out, min_run), "residual run in {out:?}");
            assert_eq!(collapse_runs_of(&out, min_run), out);
            assert!(is_subsequence(&out, &s));
        }
    }
}

// ===========================================================================
// Agreement with the rescan definition
// ===========================================================================

#[test]
fn stack_matches_rescan_exhaustively() {
    let alphabet = ['a', 'b', 'c'];
    for len in 0..=8 {
        for s in all_strings(&alphabet, len) {
            for min_run in 2..=4 {
                assert_eq!(
                    collapse_runs_of(&s, min_run),
                    collapse_by_steps(&s, min_run),
                    "mismatch for {s:?} with min_run {min_run}"
                );
            }
        }
    }
}

#[test]
fn stack_matches_rescan_on_longer_random_inputs() {
    for s in random_strings(99, 1000, 120, &['a', 'b']) {
        assert_eq!(collapse(&s), collapse_by_steps(&s, 3), "mismatch for {s:?}");
    }
}

#[test]
fn simultaneous_rounds_agree_on_documented_examples() {
    for s in ["aabcccbbad", "aaaa", "abc", "aaabccba", "aaabbbccc", ""] {
        let final_round = rescan::rounds(s, 3).pop().unwrap_or_else(|| s.to_string());
        assert_eq!(final_round, collapse(s), "rounds disagree for {s:?}");
    }
}

#[test]
fn simultaneous_rounds_can_diverge_from_stack() {
    // Removing "bbb" and "aaa" in the same pass strands the first 'a'; the
    // stack removes "bbb" first, after which all four a's go together.
    assert_eq!(rescan::rounds("abbbaaa", 3), vec!["a"]);
    assert_eq!(collapse("abbbaaa"), "");

    assert_eq!(rescan::rounds("abbbaaccca", 3), vec!["aaaa", ""]);
    assert_eq!(collapse("abbbaaccca"), "a");
}

// ===========================================================================
// Cascading inputs
// ===========================================================================

#[test]
fn cascade_builder_needs_one_step_per_level() {
    assert_eq!(cascade(2), "aabbaaaba");
    assert_eq!(rescan::steps(&cascade(5), 3).len(), 6);
}

#[test]
fn cascade_matches_rescan() {
    for depth in [1, 2, 3, 10, 50, 300] {
        let s = cascade(depth);
        assert_eq!(collapse(&s), collapse_by_steps(&s, 3), "depth {depth}");
        assert_eq!(collapse(&s), "");
    }
}

#[test]
fn deep_cascade_completes_without_recursion() {
    let s = cascade(100_000);
    assert_eq!(collapse(&s), "");

    let wrapped = format!("z{s}y");
    assert_eq!(collapse(&wrapped), "zy");
}
