// ============================================================
// Layer 3 — Chunk Label Codes
// ============================================================
// The chunker is a per-token binary classifier: does a new unit
// start immediately before this token? A third code marks
// positions that carry no signal at all — special tokens,
// sub-word continuations, and padding. Those positions are
// filtered out of loss and metric computation as an explicit
// step; nothing downstream relies on the numeric value itself.

/// Per-token label for the split classifier.
///
/// `NotRelevant` is the ignore index: it never reaches the loss
/// or the metrics, and the decoder never sees it (ignored
/// positions are masked to `NotSplit` before decoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCode {
    /// No unit boundary before this token
    NotSplit,
    /// A new unit starts at this token
    Split,
    /// Excluded from loss/metrics (specials, continuations, padding)
    NotRelevant,
}

impl ChunkCode {
    /// Integer label used in tensors and on disk.
    pub fn as_label(self) -> i64 {
        match self {
            ChunkCode::NotSplit    => 0,
            ChunkCode::Split       => 1,
            ChunkCode::NotRelevant => -1,
        }
    }

    /// Inverse of [`as_label`]. Unknown values map to `NotRelevant`
    /// so a corrupted label can never introduce a phantom split.
    pub fn from_label(label: i64) -> Self {
        match label {
            0 => ChunkCode::NotSplit,
            1 => ChunkCode::Split,
            _ => ChunkCode::NotRelevant,
        }
    }
}
