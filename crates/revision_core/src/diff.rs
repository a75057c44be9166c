//! crates/revision_core/src/diff.rs
//!
//! Word-level diff between two texts.
//!
//! Both texts are split into word runs, whitespace runs and single punctuation
//! characters, aligned with Myers' minimal edit script (the longest common
//! subsequence of tokens, in O(ND) time), and folded into labeled segments.
//! Between two unchanged runs, removed text always precedes added text and
//! neighbouring segments of the same kind are merged, so the output for a
//! given pair of inputs is always the same.

use crate::domain::{DiffSegment, SegmentKind};
use regex::Regex;
use similar::{capture_diff_slices, Algorithm, DiffTag};
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Every character matches exactly one branch, so tokens cover the input.
    PATTERN.get_or_init(|| Regex::new(r"\w+|\s+|[^\w\s]").expect("token pattern is valid"))
}

/// Splits `text` into diff tokens. Concatenating the tokens yields `text`.
pub fn tokenize(text: &str) -> Vec<&str> {
    token_pattern().find_iter(text).map(|m| m.as_str()).collect()
}

/// Computes the word-level difference between `before` and `after`.
pub fn compute_diff(before: &str, after: &str) -> Vec<DiffSegment> {
    let old = tokenize(before);
    let new = tokenize(after);

    let mut builder = SegmentBuilder::default();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => builder.unchanged(&old[old_range]),
            DiffTag::Delete => builder.removed(&old[old_range]),
            DiffTag::Insert => builder.added(&new[new_range]),
            DiffTag::Replace => {
                builder.removed(&old[old_range]);
                builder.added(&new[new_range]);
            }
        }
    }
    builder.finish()
}

/// Concatenates the segments present in the suggested text.
pub fn forward_text(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.in_suggestion())
        .map(|s| s.value.as_str())
        .collect()
}

/// Concatenates the segments present in the original text.
pub fn backward_text(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .filter(|s| s.in_original())
        .map(|s| s.value.as_str())
        .collect()
}

/// Accumulates pending removals and additions until the next unchanged run.
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<DiffSegment>,
    removed: String,
    added: String,
}

impl SegmentBuilder {
    fn unchanged(&mut self, tokens: &[&str]) {
        self.flush_changes();
        let text = tokens.concat();
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.kind == SegmentKind::Unchanged => last.value.push_str(&text),
            _ => self.segments.push(DiffSegment::new(SegmentKind::Unchanged, text)),
        }
    }

    fn removed(&mut self, tokens: &[&str]) {
        self.removed.extend(tokens.iter().copied());
    }

    fn added(&mut self, tokens: &[&str]) {
        self.added.extend(tokens.iter().copied());
    }

    fn flush_changes(&mut self) {
        if !self.removed.is_empty() {
            let text = std::mem::take(&mut self.removed);
            self.segments.push(DiffSegment::new(SegmentKind::Removed, text));
        }
        if !self.added.is_empty() {
            let text = std::mem::take(&mut self.added);
            self.segments.push(DiffSegment::new(SegmentKind::Added, text));
        }
    }

    fn finish(mut self) -> Vec<DiffSegment> {
        self.flush_changes();
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(kind: SegmentKind, value: &str) -> DiffSegment {
        DiffSegment::new(kind, value)
    }

    #[test]
    fn tokenize_covers_every_character() {
        let text = "Hello,  world!\n\tÉtude—done.";
        let tokens = tokenize(text);
        assert_eq!(tokens.concat(), text);
        assert_eq!(&tokens[..4], &["Hello", ",", "  ", "world"]);
    }

    #[test]
    fn single_word_replacement() {
        let diff = compute_diff("The cat sat.", "The dog sat.");
        assert_eq!(
            diff,
            vec![
                seg(SegmentKind::Unchanged, "The "),
                seg(SegmentKind::Removed, "cat"),
                seg(SegmentKind::Added, "dog"),
                seg(SegmentKind::Unchanged, " sat."),
            ]
        );
    }

    #[test]
    fn identical_texts_yield_one_unchanged_segment() {
        let text = "Nothing to change here, really.";
        assert_eq!(
            compute_diff(text, text),
            vec![seg(SegmentKind::Unchanged, text)]
        );
    }

    #[test]
    fn empty_inputs() {
        assert!(compute_diff("", "").is_empty());
        assert_eq!(
            compute_diff("", "new text"),
            vec![seg(SegmentKind::Added, "new text")]
        );
        assert_eq!(
            compute_diff("old text", ""),
            vec![seg(SegmentKind::Removed, "old text")]
        );
    }

    #[test]
    fn removals_precede_additions_and_no_segment_is_empty() {
        let before = "one two three four";
        let after = "one 2 3 four five";
        let diff = compute_diff(before, after);

        assert!(diff.iter().all(|s| !s.value.is_empty()));
        for pair in diff.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "adjacent segments must differ");
            assert!(
                !(pair[0].kind == SegmentKind::Added && pair[1].kind == SegmentKind::Removed),
                "added text must not precede removed text within a change"
            );
        }
        assert_eq!(forward_text(&diff), after);
        assert_eq!(backward_text(&diff), before);
    }

    #[test]
    fn punctuation_changes_are_isolated() {
        let diff = compute_diff("Hello world.", "Hello world!");
        assert_eq!(
            diff,
            vec![
                seg(SegmentKind::Unchanged, "Hello world"),
                seg(SegmentKind::Removed, "."),
                seg(SegmentKind::Added, "!"),
            ]
        );
    }

    #[test]
    fn essay_sized_inputs_diff_quickly() {
        let words: Vec<String> = (0..3000).map(|i| format!("word{}", i % 700)).collect();
        let before = words.join(" ");
        let mut reordered = words.clone();
        reordered.rotate_left(1000);
        let after = format!("A new opening sentence. {}", reordered.join(" "));

        let started = std::time::Instant::now();
        let diff = compute_diff(&before, &after);
        let elapsed = started.elapsed();

        assert_eq!(forward_text(&diff), after);
        assert_eq!(backward_text(&diff), before);
        assert!(
            elapsed < std::time::Duration::from_secs(10),
            "diffing 3000 words took {:?}",
            elapsed
        );
    }

    #[test]
    fn repeated_calls_are_identical() {
        let before = "a b a b a b c";
        let after = "b a b c a b a";
        let first = compute_diff(before, after);
        for _ in 0..5 {
            assert_eq!(compute_diff(before, after), first);
        }
    }
}
