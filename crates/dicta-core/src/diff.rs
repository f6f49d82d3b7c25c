//! Word-level text difference analysis.
//!
//! Compares a reference passage against a typed transcript at word
//! granularity and produces an ordered sequence of tagged spans for review
//! rendering: matched words, missed words (`Deleted`), and extra or incorrect
//! words (`Inserted`). Alignment is a longest-common-subsequence over
//! case-insensitively compared word tokens, so a single dropped or added word
//! does not cascade into mismatches for the rest of the text.
//!
//! The computation is stateless and restartable: identical inputs always
//! yield the identical span sequence.

use serde::{Deserialize, Serialize};

/// Classification of a contiguous run of text in a diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Present in both texts at this alignment position.
    Matched,
    /// Present in the transcript but absent from the reference (extra/incorrect).
    Inserted,
    /// Present in the reference but absent from the transcript (missed).
    Deleted,
}

/// A contiguous run of text tagged with its diff classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub text: String,
    pub kind: SpanKind,
}

impl DiffSpan {
    fn new(text: impl Into<String>, kind: SpanKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// One word plus its surrounding whitespace.
///
/// `raw` slices partition the source text exactly: the first token carries
/// any leading whitespace, every token carries the whitespace that follows
/// its word. `key` is the lowercased word used for comparison.
struct WordToken<'a> {
    raw: &'a str,
    key: String,
}

fn word_tokens(text: &str) -> Vec<WordToken<'_>> {
    // Byte ranges of the non-whitespace runs.
    let mut words: Vec<(usize, usize)> = Vec::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                words.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push((s, text.len()));
    }

    let mut tokens = Vec::with_capacity(words.len());
    for (n, &(word_start, word_end)) in words.iter().enumerate() {
        let raw_start = if n == 0 { 0 } else { word_start };
        let raw_end = if n + 1 < words.len() {
            words[n + 1].0
        } else {
            text.len()
        };
        tokens.push(WordToken {
            raw: &text[raw_start..raw_end],
            key: text[word_start..word_end].to_lowercase(),
        });
    }
    tokens
}

/// Suffix LCS table: `table[i][j]` is the length of the longest common
/// subsequence of `reference[i..]` and `typed[j..]`.
fn lcs_table(reference: &[WordToken<'_>], typed: &[WordToken<'_>]) -> Vec<Vec<usize>> {
    let n = reference.len();
    let m = typed.len();
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if reference[i].key == typed[j].key {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table
}

/// Compute the word-level diff between a reference text and a transcript.
///
/// Spans are emitted left to right following the reference's token order,
/// with inserted runs interleaved at their point of divergence; when a
/// deletion and an insertion meet at the same divergence point, the missed
/// reference words come first. Matched and deleted spans carry the
/// reference's spelling and spacing, inserted spans the transcript's.
/// Adjacent spans of the same kind are coalesced, so `diff_words(r, r)`
/// yields a single matched span covering all of `r`.
pub fn diff_words(reference: &str, typed: &str) -> Vec<DiffSpan> {
    let ref_tokens = word_tokens(reference);
    let typed_tokens = word_tokens(typed);
    let table = lcs_table(&ref_tokens, &typed_tokens);

    // Coalescing push: adjacent spans of the same kind merge.
    fn push(spans: &mut Vec<DiffSpan>, text: &str, kind: SpanKind) {
        if let Some(last) = spans.last_mut() {
            if last.kind == kind {
                last.text.push_str(text);
                return;
            }
        }
        spans.push(DiffSpan::new(text, kind));
    }

    let mut spans: Vec<DiffSpan> = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < ref_tokens.len() && j < typed_tokens.len() {
        if ref_tokens[i].key == typed_tokens[j].key {
            push(&mut spans, ref_tokens[i].raw, SpanKind::Matched);
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            push(&mut spans, ref_tokens[i].raw, SpanKind::Deleted);
            i += 1;
        } else {
            push(&mut spans, typed_tokens[j].raw, SpanKind::Inserted);
            j += 1;
        }
    }
    while i < ref_tokens.len() {
        push(&mut spans, ref_tokens[i].raw, SpanKind::Deleted);
        i += 1;
    }
    while j < typed_tokens.len() {
        push(&mut spans, typed_tokens[j].raw, SpanKind::Inserted);
        j += 1;
    }

    spans
}

/// Word-level accuracy: matched reference words as a percentage of all
/// reference words, in `[0, 100]`.
///
/// This is the authoritative scoring basis used by the submission side; it
/// tolerates insertions and deletions where the positional character metric
/// in [`crate::score`] does not. An empty reference scores 100.
pub fn word_accuracy(reference: &str, typed: &str) -> f64 {
    let ref_tokens = word_tokens(reference);
    if ref_tokens.is_empty() {
        return 100.0;
    }
    let typed_tokens = word_tokens(typed);
    let matched = lcs_table(&ref_tokens, &typed_tokens)[0][0];
    matched as f64 / ref_tokens.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(spans: &[DiffSpan]) -> Vec<SpanKind> {
        spans.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_identical_texts_single_matched_span() {
        let spans = diff_words("the quick fox", "the quick fox");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, SpanKind::Matched);
        assert_eq!(spans[0].text, "the quick fox");
    }

    #[test]
    fn test_both_empty() {
        assert!(diff_words("", "").is_empty());
    }

    #[test]
    fn test_substitution_kind_sequence() {
        let spans = diff_words("the cat sat", "the dog sat");
        assert_eq!(
            kinds(&spans),
            vec![
                SpanKind::Matched,
                SpanKind::Deleted,
                SpanKind::Inserted,
                SpanKind::Matched,
            ]
        );
        assert_eq!(spans[1].text.trim(), "cat");
        assert_eq!(spans[2].text.trim(), "dog");
    }

    #[test]
    fn test_case_insensitive_matching() {
        let spans = diff_words("THE CAT SAT", "the dog sat");
        assert_eq!(
            kinds(&spans),
            vec![
                SpanKind::Matched,
                SpanKind::Deleted,
                SpanKind::Inserted,
                SpanKind::Matched,
            ]
        );
        // Matched spans keep the reference's casing.
        assert_eq!(spans[0].text, "THE ");
    }

    #[test]
    fn test_missed_trailing_word() {
        let spans = diff_words("the quick fox", "the quick");
        assert_eq!(kinds(&spans), vec![SpanKind::Matched, SpanKind::Deleted]);
        assert_eq!(spans[1].text.trim(), "fox");
    }

    #[test]
    fn test_extra_trailing_words() {
        let spans = diff_words("the quick", "the quick brown fox");
        assert_eq!(kinds(&spans), vec![SpanKind::Matched, SpanKind::Inserted]);
        assert_eq!(spans[1].text.trim(), "brown fox");
    }

    #[test]
    fn test_empty_typed_all_deleted() {
        let spans = diff_words("some reference text", "");
        assert_eq!(kinds(&spans), vec![SpanKind::Deleted]);
        assert_eq!(spans[0].text, "some reference text");
    }

    #[test]
    fn test_empty_reference_all_inserted() {
        let spans = diff_words("", "typed anyway");
        assert_eq!(kinds(&spans), vec![SpanKind::Inserted]);
    }

    #[test]
    fn test_dropped_word_does_not_cascade() {
        let spans = diff_words("one two three four five", "one three four five");
        assert_eq!(
            kinds(&spans),
            vec![SpanKind::Matched, SpanKind::Deleted, SpanKind::Matched]
        );
        assert_eq!(spans[1].text.trim(), "two");
    }

    #[test]
    fn test_matched_and_deleted_reconstruct_reference() {
        let reference = "  the quick\tbrown fox jumps  ";
        let typed = "the brown dog jumps";
        let rebuilt: String = diff_words(reference, typed)
            .iter()
            .filter(|s| s.kind != SpanKind::Inserted)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(rebuilt, reference);
    }

    #[test]
    fn test_diff_is_deterministic() {
        let a = diff_words("a b c d", "a x c y");
        let b = diff_words("a b c d", "a x c y");
        assert_eq!(a, b);
    }

    #[test]
    fn test_word_accuracy_identical() {
        assert_eq!(word_accuracy("the cat sat", "the cat sat"), 100.0);
    }

    #[test]
    fn test_word_accuracy_case_insensitive() {
        assert_eq!(word_accuracy("The Cat Sat", "the cat sat"), 100.0);
    }

    #[test]
    fn test_word_accuracy_partial() {
        // Two of three reference words matched.
        let value = word_accuracy("the cat sat", "the dog sat");
        assert!((value - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_word_accuracy_tolerates_dropped_word() {
        // Unlike positional character accuracy, a single missed word only
        // costs that word.
        assert_eq!(word_accuracy("one two three four", "one three four"), 75.0);
    }

    #[test]
    fn test_word_accuracy_empty_reference() {
        assert_eq!(word_accuracy("", ""), 100.0);
        assert_eq!(word_accuracy("", "extra"), 100.0);
    }

    #[test]
    fn test_word_accuracy_empty_typed() {
        assert_eq!(word_accuracy("one two", ""), 0.0);
    }
}
