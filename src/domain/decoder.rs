// ============================================================
// Layer 3 — Prediction Decoder
// ============================================================
// Turns a noisy per-token classification into a clean,
// non-overlapping span sequence:
//
//   1. Binarize: split score >= threshold → split
//   2. Prediction help: a word can only be split at its FIRST
//      sub-token, so continuation positions (sub-word mask
//      false) are forced to not-split no matter what the model
//      said. This is a masking invariant — without it one word
//      fragments into several spans.
//   3. Truncate to the sample's true content length.
//   4. Wrap in sentinels: the sample's offset on the left,
//      the content length on the right.
//   5. Difference adjacent boundaries into spans.
//   6. Degenerate spans (start > end) are dropped — they arise
//      when a predicted split lands exactly on the padding seam
//      and the sentinels collapse.

use crate::domain::boundary::BoundaryCodec;
use crate::domain::error::SpanError;
use crate::domain::span::{build_spans, Span};

pub const DEFAULT_SPLIT_THRESHOLD: f32 = 0.5;

/// Decodes per-token (not-split, split) scores into spans.
#[derive(Debug, Clone, Copy)]
pub struct PredictionDecoder {
    /// A token is a split when its split score reaches this value
    threshold: f32,
}

impl Default for PredictionDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_THRESHOLD)
    }
}

impl PredictionDecoder {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Decode one sample.
    ///
    /// `scores[i]` is the (not-split, split) probability pair for
    /// token `i`; `sub_words_mask[i]` is true at the first
    /// sub-token of each word. Both arrays cover the full padded
    /// sequence; only the first `content_len` positions carry
    /// signal. `offset` counts the leading reserved tokens.
    ///
    /// Fails with `InvalidInput` when the array lengths disagree,
    /// the content length falls outside them, or the offset does
    /// not precede the content end.
    pub fn decode(
        &self,
        scores:         &[[f32; 2]],
        sub_words_mask: &[bool],
        content_len:    usize,
        offset:         usize,
    ) -> Result<Vec<Span>, SpanError> {
        if scores.len() != sub_words_mask.len() {
            return Err(SpanError::InvalidInput(format!(
                "score array length {} != sub-word mask length {}",
                scores.len(),
                sub_words_mask.len()
            )));
        }
        if content_len == 0 || content_len > scores.len() {
            return Err(SpanError::InvalidInput(format!(
                "content length {} outside score array of length {}",
                content_len,
                scores.len()
            )));
        }
        if offset >= content_len {
            return Err(SpanError::InvalidInput(format!(
                "offset {} must precede content length {}",
                offset, content_len
            )));
        }

        // Binarize + prediction help, truncated to content length
        let splits: Vec<bool> = scores
            .iter()
            .zip(sub_words_mask.iter())
            .take(content_len)
            .map(|(score, &is_word_start)| is_word_start && score[1] >= self.threshold)
            .collect();

        let codec      = BoundaryCodec::new(offset);
        let boundaries = codec.split_boundaries(&splits, content_len)?;

        // build_spans drops the degenerate offset-seam pairs
        Ok(build_spans(&boundaries))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const SPLIT: [f32; 2] = [0.1, 0.9];
    const STAY:  [f32; 2] = [0.9, 0.1];

    #[test]
    fn test_all_not_split_is_one_span() {
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, STAY, STAY, STAY];
        let mask    = [true, true, true, true];
        let spans   = decoder.decode(&scores, &mask, 4, 0).unwrap();
        assert_eq!(spans, vec![Span::new(0, 3)]);
    }

    #[test]
    fn test_splits_partition_the_content() {
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, STAY, SPLIT, STAY, SPLIT, STAY];
        let mask    = [true; 6];
        let spans   = decoder.decode(&scores, &mask, 6, 0).unwrap();
        assert_eq!(
            spans,
            vec![Span::new(0, 1), Span::new(2, 3), Span::new(4, 5)]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, [0.5, 0.5], STAY];
        let mask    = [true, true, true];
        let spans   = decoder.decode(&scores, &mask, 3, 0).unwrap();
        // 0.5 >= 0.5 → split before token 1
        assert_eq!(spans, vec![Span::new(0, 0), Span::new(1, 2)]);
    }

    #[test]
    fn test_continuation_tokens_never_split() {
        let decoder = PredictionDecoder::default();
        // The model wants to split token 2, but it is a sub-word
        // continuation — the word must stay whole
        let scores = [STAY, STAY, SPLIT, STAY];
        let masked   = [true, true, false, true];
        let unmasked = [true, true, true, true];

        let spans_masked = decoder.decode(&scores, &masked, 4, 0).unwrap();
        assert_eq!(spans_masked, vec![Span::new(0, 3)]);

        // Sanity: with a word start there the split does happen
        let spans_open = decoder.decode(&scores, &unmasked, 4, 0).unwrap();
        assert_eq!(spans_open, vec![Span::new(0, 1), Span::new(2, 3)]);
    }

    #[test]
    fn test_masking_is_idempotent_over_continuations() {
        // Flipping a continuation position's mask entry to false
        // must not change the decoded spans when the position was
        // already a continuation of the word before it.
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, SPLIT, STAY, STAY, STAY];
        let base    = [true, true, false, false, true];
        let flipped = [true, true, false, false, false];
        assert_eq!(
            decoder.decode(&scores, &base, 5, 0).unwrap(),
            decoder.decode(&scores, &flipped, 5, 0).unwrap(),
        );
    }

    #[test]
    fn test_padding_tail_is_truncated() {
        let decoder = PredictionDecoder::default();
        // Splits predicted inside the padding tail are noise
        let scores = [STAY, STAY, STAY, SPLIT, SPLIT, SPLIT];
        let mask   = [true; 6];
        let spans  = decoder.decode(&scores, &mask, 3, 0).unwrap();
        assert_eq!(spans, vec![Span::new(0, 2)]);
    }

    #[test]
    fn test_offset_anchors_the_first_span() {
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, STAY, STAY, SPLIT, STAY];
        let mask    = [true; 5];
        let spans   = decoder.decode(&scores, &mask, 5, 1).unwrap();
        assert_eq!(spans, vec![Span::new(1, 2), Span::new(3, 4)]);
    }

    #[test]
    fn test_split_on_offset_seam_collapses_cleanly() {
        let decoder = PredictionDecoder::default();
        // The predicted split coincides with the offset sentinel;
        // the duplicate boundary must not create an empty span
        let scores = [STAY, SPLIT, STAY, STAY];
        let mask   = [true; 4];
        let spans  = decoder.decode(&scores, &mask, 4, 1).unwrap();
        assert_eq!(spans, vec![Span::new(1, 3)]);
    }

    #[test]
    fn test_length_mismatch_is_invalid() {
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, STAY];
        let mask    = [true, true, true];
        assert!(matches!(
            decoder.decode(&scores, &mask, 2, 0),
            Err(SpanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_content_length_beyond_arrays_is_invalid() {
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, STAY];
        let mask    = [true, true];
        assert!(matches!(
            decoder.decode(&scores, &mask, 3, 0),
            Err(SpanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_offset_at_content_end_is_invalid() {
        let decoder = PredictionDecoder::default();
        let scores  = [STAY, STAY];
        let mask    = [true, true];
        assert!(matches!(
            decoder.decode(&scores, &mask, 2, 2),
            Err(SpanError::InvalidInput(_))
        ));
    }
}
