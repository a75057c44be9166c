//! Property-based tests for the word-level diff.

use proptest::prelude::*;
use revision_core::diff::{backward_text, forward_text, tokenize};
use revision_core::{compute_diff, SegmentKind};

/// Short sentences built from a small vocabulary, so that generated pairs
/// share plenty of words and the diff has real alignment work to do.
fn sentence_strategy() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("the"),
        Just("cat"),
        Just("dog"),
        Just("sat"),
        Just("on"),
        Just("mat"),
        Just("."),
        Just(","),
        Just("  "),
        Just("\n"),
        Just("é"),
    ];
    prop::collection::vec((word, prop::bool::ANY), 0..24).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(w, spaced)| if spaced { format!("{} ", w) } else { w.to_string() })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_diff_reconstructs_both_sides(a in sentence_strategy(), b in sentence_strategy()) {
        let diff = compute_diff(&a, &b);
        prop_assert_eq!(forward_text(&diff), b);
        prop_assert_eq!(backward_text(&diff), a);
    }

    #[test]
    fn prop_diff_reconstructs_arbitrary_strings(a in any::<String>(), b in any::<String>()) {
        let diff = compute_diff(&a, &b);
        prop_assert_eq!(forward_text(&diff), b);
        prop_assert_eq!(backward_text(&diff), a);
    }

    #[test]
    fn prop_no_empty_segments(a in sentence_strategy(), b in sentence_strategy()) {
        let diff = compute_diff(&a, &b);
        prop_assert!(diff.iter().all(|s| !s.value.is_empty()));
    }

    #[test]
    fn prop_identity_is_single_unchanged_segment(a in any::<String>()) {
        let diff = compute_diff(&a, &a);
        if a.is_empty() {
            prop_assert!(diff.is_empty());
        } else {
            prop_assert_eq!(diff.len(), 1);
            prop_assert_eq!(diff[0].kind, SegmentKind::Unchanged);
            prop_assert_eq!(&diff[0].value, &a);
        }
    }

    #[test]
    fn prop_diff_is_deterministic(a in sentence_strategy(), b in sentence_strategy()) {
        prop_assert_eq!(compute_diff(&a, &b), compute_diff(&a, &b));
    }

    #[test]
    fn prop_tokens_cover_input(a in any::<String>()) {
        prop_assert_eq!(tokenize(&a).concat(), a);
    }
}
