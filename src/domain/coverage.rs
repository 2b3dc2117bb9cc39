// ============================================================
// Layer 3 — Coverage Evaluator
// ============================================================
// Measures how many reference spans the chunker recovered
// EXACTLY. Matching is set intersection on (start, end) pairs —
// a predicted span that overlaps a reference span without
// matching both ends counts for nothing. Partial-overlap
// scoring (IoU and friends) is a different metric and is out of
// scope here.
//
// The evaluator accumulates across samples:
//
//   coverage_ratio = Σ |predicted ∩ reference| / Σ |reference|
//
// The predicted-span total is reported too, as a purely
// descriptive number: a chunker that slices everything into
// single tokens can reach high coverage while emitting
// thousands of junk spans, and that shows up here.

use std::collections::HashSet;

use crate::domain::error::SpanError;
use crate::domain::span::Span;

/// Exact-match spans found / reference spans expected, with the
/// derived ratio. Produced by [`CoverageEvaluator::finish`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    /// Σ |predicted ∩ reference| over all observed samples
    pub matched: usize,
    /// Σ |reference| (set semantics — duplicates collapse)
    pub reference_total: usize,
    /// Σ |predicted| — descriptive only, no pass/fail attached
    pub predicted_total: usize,
    /// matched / reference_total, in [0, 1]
    pub ratio: f64,
}

/// Accumulates exact-match coverage over a batch or dataset.
#[derive(Debug, Clone, Default)]
pub struct CoverageEvaluator {
    matched:         usize,
    reference_total: usize,
    predicted_total: usize,
}

impl CoverageEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample's predicted and reference spans into the totals.
    pub fn observe(&mut self, predicted: &[Span], reference: &[Span]) {
        let reference_set: HashSet<Span> = reference.iter().copied().collect();

        self.matched         += intersection_count(predicted, &reference_set);
        self.reference_total += reference_set.len();
        self.predicted_total += predicted.len();
    }

    /// Derive the coverage ratio over everything observed so far.
    ///
    /// Fails with `DivisionUndefined` when no reference span was
    /// ever seen — an empty denominator is a caller mistake and
    /// must not masquerade as 0.0 coverage.
    pub fn finish(&self) -> Result<Coverage, SpanError> {
        if self.reference_total == 0 {
            return Err(SpanError::DivisionUndefined);
        }
        Ok(Coverage {
            matched:         self.matched,
            reference_total: self.reference_total,
            predicted_total: self.predicted_total,
            ratio: self.matched as f64 / self.reference_total as f64,
        })
    }
}

/// |predicted ∩ reference| under exact (start, end) equality.
/// Duplicate predictions collapse before counting.
fn intersection_count(predicted: &[Span], reference: &HashSet<Span>) -> usize {
    let predicted_set: HashSet<Span> = predicted.iter().copied().collect();
    predicted_set.intersection(reference).count()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matches_are_counted() {
        let mut evaluator = CoverageEvaluator::new();
        evaluator.observe(
            &[Span::new(0, 2), Span::new(3, 4)],
            &[Span::new(0, 2), Span::new(3, 4), Span::new(6, 7)],
        );
        let coverage = evaluator.finish().unwrap();
        assert_eq!(coverage.matched, 2);
        assert_eq!(coverage.reference_total, 3);
        assert!((coverage.ratio - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_overlap_counts_for_nothing() {
        let mut evaluator = CoverageEvaluator::new();
        // (0,3) overlaps (0,2) but the end differs — no match
        evaluator.observe(&[Span::new(0, 3)], &[Span::new(0, 2)]);
        let coverage = evaluator.finish().unwrap();
        assert_eq!(coverage.matched, 0);
        assert_eq!(coverage.ratio, 0.0);
    }

    #[test]
    fn test_accumulates_across_samples() {
        let mut evaluator = CoverageEvaluator::new();
        evaluator.observe(&[Span::new(0, 1)], &[Span::new(0, 1)]);
        evaluator.observe(&[Span::new(2, 5)], &[Span::new(2, 5), Span::new(7, 8)]);
        let coverage = evaluator.finish().unwrap();
        assert_eq!(coverage.matched, 2);
        assert_eq!(coverage.reference_total, 3);
        assert_eq!(coverage.predicted_total, 2);
    }

    #[test]
    fn test_duplicate_references_collapse() {
        let mut evaluator = CoverageEvaluator::new();
        evaluator.observe(
            &[Span::new(0, 1)],
            &[Span::new(0, 1), Span::new(0, 1)],
        );
        let coverage = evaluator.finish().unwrap();
        assert_eq!(coverage.reference_total, 1);
        assert_eq!(coverage.ratio, 1.0);
    }

    #[test]
    fn test_empty_reference_set_is_undefined() {
        let mut evaluator = CoverageEvaluator::new();
        evaluator.observe(&[Span::new(0, 1)], &[]);
        assert_eq!(evaluator.finish(), Err(SpanError::DivisionUndefined));
    }

    #[test]
    fn test_predicted_total_is_descriptive() {
        let mut evaluator = CoverageEvaluator::new();
        evaluator.observe(
            &[Span::new(0, 0), Span::new(1, 1), Span::new(2, 2)],
            &[Span::new(0, 0)],
        );
        let coverage = evaluator.finish().unwrap();
        assert_eq!(coverage.predicted_total, 3);
        assert_eq!(coverage.ratio, 1.0);
    }
}
