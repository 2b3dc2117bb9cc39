// ============================================================
// Layer 3 — Boundary Codec
// ============================================================
// Converts a boolean "a unit starts here" array into an ordered
// sequence of integer boundary positions, wrapped in sentinels
// so the first and last units close even when the array has no
// interior marks.
//
// Two sentinel shapes exist, matching the two consumers:
//
//   word_boundaries   [left, marks.., N-1, N]
//     Ground-truth word units from the sub-word mask. The extra
//     N-1 sentinel closes the trailing special token as its own
//     unit, so the word before it is never fused with it.
//
//   split_boundaries  [left, marks.., N]
//     Predicted splits. A sample with no predicted split at all
//     must decode to exactly ONE span covering the whole
//     content, so only the closing N sentinel is appended.
//
// Sentinel collisions (a mark already at N-1, or at the left
// sentinel) produce duplicated boundaries; the span builder
// drops the resulting degenerate ranges.

use crate::domain::error::SpanError;

/// Builds sentinel-wrapped boundary position arrays.
///
/// The left sentinel anchors the first unit: 0 for word units
/// (the sequence start), or the sample's offset when decoding
/// predictions over a sequence with leading reserved tokens.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryCodec {
    left_sentinel: usize,
}

impl BoundaryCodec {
    pub fn new(left_sentinel: usize) -> Self {
        Self { left_sentinel }
    }

    /// Boundaries for ground-truth word units.
    ///
    /// Collects every index in `[0, content_len)` where
    /// `unit_starts` is true, prepends the left sentinel if the
    /// first mark is not already there, then appends
    /// `content_len - 1` and `content_len`.
    ///
    /// Fails with `InvalidInput` if the array is empty or its
    /// first element is not true — callers must force the first
    /// position to be a unit start before encoding.
    pub fn word_boundaries(
        &self,
        unit_starts: &[bool],
        content_len: usize,
    ) -> Result<Vec<usize>, SpanError> {
        if unit_starts.is_empty() {
            return Err(SpanError::InvalidInput(
                "unit-start array is empty".to_string(),
            ));
        }
        if !unit_starts[0] {
            return Err(SpanError::InvalidInput(
                "first unit-start flag must be forced true".to_string(),
            ));
        }
        self.validate_content_len(unit_starts.len(), content_len)?;

        let mut boundaries = self.collect_marks(unit_starts, content_len);
        // Close the final unit, and the trailing special token
        // as a unit of its own.
        boundaries.push(content_len - 1);
        boundaries.push(content_len);
        Ok(boundaries)
    }

    /// Boundaries for a predicted split array.
    ///
    /// Same mark collection, but only the closing `content_len`
    /// sentinel is appended: an all-not-split prediction is one
    /// single span from the left sentinel to the content end.
    pub fn split_boundaries(
        &self,
        splits: &[bool],
        content_len: usize,
    ) -> Result<Vec<usize>, SpanError> {
        if splits.is_empty() {
            return Err(SpanError::InvalidInput(
                "split array is empty".to_string(),
            ));
        }
        self.validate_content_len(splits.len(), content_len)?;

        let mut boundaries = self.collect_marks(splits, content_len);
        boundaries.push(content_len);
        Ok(boundaries)
    }

    /// Indices of true marks within `[0, content_len)`, with the
    /// left sentinel prepended when not already leading.
    fn collect_marks(&self, marks: &[bool], content_len: usize) -> Vec<usize> {
        let mut positions: Vec<usize> = marks
            .iter()
            .take(content_len)
            .enumerate()
            .filter(|(_, &is_start)| is_start)
            .map(|(i, _)| i)
            .collect();

        if positions.first() != Some(&self.left_sentinel) {
            positions.insert(0, self.left_sentinel);
        }
        positions
    }

    fn validate_content_len(&self, array_len: usize, content_len: usize) -> Result<(), SpanError> {
        if content_len == 0 || content_len > array_len {
            return Err(SpanError::InvalidInput(format!(
                "content length {} outside valid range [1, {}]",
                content_len, array_len
            )));
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::span::{build_spans, Span};

    #[test]
    fn test_word_boundaries_wrap_marks_in_sentinels() {
        let codec = BoundaryCodec::new(0);
        let mask  = [true, false, false, true, false, true];
        let bounds = codec.word_boundaries(&mask, 6).unwrap();
        assert_eq!(bounds, vec![0, 3, 5, 5, 6]);
    }

    #[test]
    fn test_word_round_trip_produces_word_spans() {
        // Unit starts at {0, 3, 5} within N=6 must yield
        // spans (0,2), (3,4), (5,5) after differencing
        let codec = BoundaryCodec::new(0);
        let mask  = [true, false, false, true, false, true];
        let spans = build_spans(&codec.word_boundaries(&mask, 6).unwrap());
        assert_eq!(spans, vec![Span::new(0, 2), Span::new(3, 4), Span::new(5, 5)]);
    }

    #[test]
    fn test_empty_array_is_invalid() {
        let codec = BoundaryCodec::new(0);
        assert!(matches!(
            codec.word_boundaries(&[], 0),
            Err(SpanError::InvalidInput(_))
        ));
        assert!(matches!(
            codec.split_boundaries(&[], 0),
            Err(SpanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unforced_first_flag_is_invalid() {
        let codec = BoundaryCodec::new(0);
        let mask  = [false, true, false];
        assert!(matches!(
            codec.word_boundaries(&mask, 3),
            Err(SpanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_split_boundaries_append_single_sentinel() {
        let codec  = BoundaryCodec::new(1);
        let splits = [false, false, true, false, false];
        // Marks {2}, left sentinel 1 prepended, right sentinel 5
        assert_eq!(codec.split_boundaries(&splits, 5).unwrap(), vec![1, 2, 5]);
    }

    #[test]
    fn test_no_splits_yields_sentinels_only() {
        let codec  = BoundaryCodec::new(0);
        let splits = [false, false, false, false];
        assert_eq!(codec.split_boundaries(&splits, 4).unwrap(), vec![0, 4]);
    }

    #[test]
    fn test_marks_beyond_content_are_ignored() {
        let codec  = BoundaryCodec::new(0);
        // The mark at index 5 sits in the padding tail (N=4)
        let splits = [true, false, true, false, false, true];
        assert_eq!(codec.split_boundaries(&splits, 4).unwrap(), vec![0, 2, 4]);
    }
}
