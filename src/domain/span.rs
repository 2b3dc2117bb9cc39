// ============================================================
// Layer 3 — Span Type and Span Builder
// ============================================================
// A span is an inclusive [start, end] pair of token indices
// denoting one contiguous unit — a word, or a predicted
// aspect/opinion phrase fragment.
//
// Spans are built by differencing an ordered boundary sequence:
// a boundary value means "a split happens immediately BEFORE
// this index", so the unit that ends at a boundary stops one
// index earlier:
//
//   boundaries: [b0, b1, b2, ...]
//   spans:      (b0, b1-1), (b1, b2-1), ...
//
// Two coinciding boundaries (which happens when sentinels meet
// at the sequence ends) collapse to a zero-length range with
// start > end; those are dropped, never emitted as empty spans.
//
// Reference: Devlin et al. (2019) BERT — sub-token span conventions

use serde::{Deserialize, Serialize};

/// Inclusive token-index range for one unit.
///
/// Invariant: `start <= end`. Spans produced by [`build_spans`]
/// always satisfy it; hand-built spans are validated where they
/// cross into the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Span {
    /// Index of the FIRST token in the unit
    pub start: usize,
    /// Index of the LAST token in the unit (inclusive)
    pub end: usize,
}

// Spans serialise as bare [start, end] pairs, matching the
// annotation format in the .jsonl datasets.
impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.start, span.end)
    }
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of tokens covered by this span.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }
}

/// Turn an ordered boundary sequence into contiguous spans.
///
/// Each adjacent boundary pair (b_j, b_{j+1}) yields the span
/// (b_j, b_{j+1} - 1). Degenerate pairs — equal boundaries, or a
/// pair that runs backwards because a predicted split landed on
/// the padding seam — produce start > end and are dropped.
///
/// Fewer than two boundaries yield zero spans; that is a valid
/// (empty) result, not an error.
pub fn build_spans(boundaries: &[usize]) -> Vec<Span> {
    let mut spans = Vec::with_capacity(boundaries.len().saturating_sub(1));

    for pair in boundaries.windows(2) {
        let start = pair[0];
        // The unit ends one index before the next boundary.
        // next == 0 would underflow; it can only arise from a
        // backwards pair, which is degenerate anyway.
        if pair[1] == 0 {
            continue;
        }
        let end = pair[1] - 1;

        if start <= end {
            spans.push(Span::new(start, end));
        }
    }

    spans
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_boundaries_become_spans() {
        let spans = build_spans(&[0, 3, 5, 6]);
        assert_eq!(spans, vec![Span::new(0, 2), Span::new(3, 4), Span::new(5, 5)]);
    }

    #[test]
    fn test_spans_are_ordered_and_disjoint() {
        let spans = build_spans(&[0, 2, 4, 7, 9]);
        for pair in spans.windows(2) {
            // Ordered by start, and the next span begins after this one ends
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_equal_boundaries_are_dropped() {
        // The duplicated 5 collapses to a (5, 4) range which must vanish
        let spans = build_spans(&[0, 3, 5, 5, 6]);
        assert_eq!(spans, vec![Span::new(0, 2), Span::new(3, 4), Span::new(5, 5)]);
    }

    #[test]
    fn test_backwards_pair_is_dropped() {
        // A mark below the left sentinel runs backwards: (1, -1) is degenerate
        let spans = build_spans(&[1, 0, 4]);
        assert_eq!(spans, vec![Span::new(0, 3)]);
    }

    #[test]
    fn test_short_sequences_yield_no_spans() {
        assert!(build_spans(&[]).is_empty());
        assert!(build_spans(&[3]).is_empty());
    }

    #[test]
    fn test_span_len_is_inclusive() {
        assert_eq!(Span::new(5, 5).len(), 1);
        assert_eq!(Span::new(2, 6).len(), 5);
    }
}
