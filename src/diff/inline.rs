//! Character-level inline diff.

use crate::model::{InlineDiff, InlineSpan, SpanTag};
use crate::render::markup::HtmlWriter;
use similar::{Algorithm, DiffTag};
use std::ops::Range;
use std::time::Instant;

/// Compute the character-level diff of two strings.
///
/// Replaced runs produce a deleted span followed by an inserted span.
pub fn inline_diff(old: &str, new: &str) -> InlineDiff {
    inline_diff_until(old, new, None)
}

/// Compute the character-level diff of two strings, giving up on minimality
/// once `deadline` has passed.
///
/// The spans still reconstruct both strings; past the deadline the remaining
/// text is reported as deleted and inserted.
pub fn inline_diff_until(old: &str, new: &str, deadline: Option<Instant>) -> InlineDiff {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let ops =
        similar::capture_diff_slices_deadline(Algorithm::Myers, &old_chars, &new_chars, deadline);

    let mut spans = Vec::with_capacity(ops.len());
    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => push_span(&mut spans, SpanTag::Equal, &old_chars, old_range),
            DiffTag::Delete => push_span(&mut spans, SpanTag::Deleted, &old_chars, old_range),
            DiffTag::Insert => push_span(&mut spans, SpanTag::Inserted, &new_chars, new_range),
            DiffTag::Replace => {
                push_span(&mut spans, SpanTag::Deleted, &old_chars, old_range);
                push_span(&mut spans, SpanTag::Inserted, &new_chars, new_range);
            }
        }
    }

    InlineDiff { spans }
}

fn push_span(spans: &mut Vec<InlineSpan>, tag: SpanTag, chars: &[char], range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    let text: String = chars[range].iter().collect();
    match spans.last_mut() {
        Some(last) if last.tag == tag => last.text.push_str(&text),
        _ => spans.push(InlineSpan::new(tag, text)),
    }
}

/// Fraction of matching characters between two strings.
///
/// Computed as `2 * matches / (len(old) + len(new))`: 1.0 for identical
/// strings (including two empty strings), 0.0 when nothing matches.
pub fn similarity_ratio(old: &str, new: &str) -> f64 {
    similarity_ratio_until(old, new, None)
}

/// [`similarity_ratio`] with a deadline on the underlying diff.
///
/// Past the deadline the ratio may come out lower than the exact one.
pub fn similarity_ratio_until(old: &str, new: &str, deadline: Option<Instant>) -> f64 {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let total = old_chars.len() + new_chars.len();
    if total == 0 {
        return 1.0;
    }
    let ops =
        similar::capture_diff_slices_deadline(Algorithm::Myers, &old_chars, &new_chars, deadline);
    let matches: usize = ops
        .iter()
        .map(|op| match op.as_tag_tuple() {
            (DiffTag::Equal, old_range, _) => old_range.len(),
            _ => 0,
        })
        .sum();
    (2 * matches) as f64 / total as f64
}

/// Linear-time lower bound of [`similarity_ratio`].
///
/// Only the common prefix and suffix count as matches.
pub fn quick_ratio(old: &str, new: &str) -> f64 {
    let total = old.chars().count() + new.chars().count();
    if total == 0 {
        return 1.0;
    }
    let prefix = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let old_rest: Vec<char> = old.chars().skip(prefix).collect();
    let new_rest: Vec<char> = new.chars().skip(prefix).collect();
    let suffix = old_rest
        .iter()
        .rev()
        .zip(new_rest.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    (2 * (prefix + suffix)) as f64 / total as f64
}

impl InlineDiff {
    /// Similarity of the two sides, from the length of the equal spans.
    ///
    /// Same formula as [`similarity_ratio`], without diffing again.
    pub fn similarity(&self) -> f64 {
        let mut equal = 0;
        let mut total = 0;
        for span in &self.spans {
            let len = span.text.chars().count();
            match span.tag {
                SpanTag::Equal => {
                    equal += len;
                    total += 2 * len;
                }
                SpanTag::Deleted | SpanTag::Inserted => total += len,
            }
        }
        if total == 0 {
            return 1.0;
        }
        (2 * equal) as f64 / total as f64
    }

    /// Render as HTML: equal text escaped, deletions in `<del>`, insertions in `<ins>`.
    pub fn to_markup(&self) -> String {
        let mut w = HtmlWriter::new();
        w.inline_diff(self);
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_strings() {
        let diff = inline_diff("hello", "hello");
        assert_eq!(diff.spans, vec![InlineSpan::new(SpanTag::Equal, "hello")]);
        assert_eq!(diff.to_markup(), "hello");
    }

    #[test]
    fn test_insert_suffix() {
        let diff = inline_diff("Hello", "Hello world");
        assert_eq!(
            diff.spans,
            vec![
                InlineSpan::new(SpanTag::Equal, "Hello"),
                InlineSpan::new(SpanTag::Inserted, " world"),
            ]
        );
        assert_eq!(diff.to_markup(), "Hello<ins> world</ins>");
    }

    #[test]
    fn test_delete() {
        let diff = inline_diff("abc", "a");
        assert_eq!(diff.old_text(), "abc");
        assert_eq!(diff.new_text(), "a");
        assert!(diff.to_markup().contains("<del>bc</del>"));
    }

    #[test]
    fn test_replace_emits_deletion_then_insertion() {
        let diff = inline_diff("cat", "dog");
        assert_eq!(
            diff.spans,
            vec![
                InlineSpan::new(SpanTag::Deleted, "cat"),
                InlineSpan::new(SpanTag::Inserted, "dog"),
            ]
        );
        assert_eq!(diff.to_markup(), "<del>cat</del><ins>dog</ins>");
    }

    #[test]
    fn test_markup_escapes_content() {
        let diff = inline_diff("<b>a</b>", "<b>a & b</b>");
        let html = diff.to_markup();
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&amp;"));
        assert_eq!(diff.old_text(), "<b>a</b>");
        assert_eq!(diff.new_text(), "<b>a & b</b>");
    }

    #[test]
    fn test_multibyte_characters() {
        let diff = inline_diff("zażółć", "zażółw");
        assert_eq!(diff.old_text(), "zażółć");
        assert_eq!(diff.new_text(), "zażółw");
    }

    #[test]
    fn test_empty_sides() {
        assert!(inline_diff("", "").spans.is_empty());
        assert_eq!(
            inline_diff("", "new").spans,
            vec![InlineSpan::new(SpanTag::Inserted, "new")]
        );
    }

    #[test]
    fn test_similarity_ratio() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert!((similarity_ratio("Hello", "Hello world") - 0.625).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_from_spans_matches_ratio() {
        let pairs = [("Hello", "Hello world"), ("cat", "dog"), ("", ""), ("zażółć", "zażółw")];
        for (a, b) in pairs {
            let diff = inline_diff(a, b);
            assert!((diff.similarity() - similarity_ratio(a, b)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_quick_ratio_bounds_exact_ratio() {
        assert_eq!(quick_ratio("", ""), 1.0);
        assert_eq!(quick_ratio("abc", "abc"), 1.0);
        assert_eq!(quick_ratio("abc", "xyz"), 0.0);
        assert!((quick_ratio("abcd", "abxcd") - 8.0 / 9.0).abs() < 1e-9);
        // the shared middle "bcd" is invisible to prefix and suffix
        assert_eq!(quick_ratio("abcd", "xbcdx"), 0.0);
        assert!((similarity_ratio("abcd", "xbcdx") - 6.0 / 9.0).abs() < 1e-9);
        // prefix and suffix never overlap
        assert_eq!(quick_ratio("aa", "aaa"), 0.8);
    }

    #[test]
    fn test_expired_deadline_still_reconstructs() {
        let old = "the quick brown fox jumps over the lazy dog ".repeat(20);
        let new = "the quick red fox leaps over the lazy cat ".repeat(20);
        let diff = inline_diff_until(&old, &new, Some(Instant::now()));
        assert_eq!(diff.old_text(), old);
        assert_eq!(diff.new_text(), new);
        let ratio = similarity_ratio_until(&old, &new, Some(Instant::now()));
        assert!((0.0..=1.0).contains(&ratio));
    }
}
