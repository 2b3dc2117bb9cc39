// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The span core consumes two collaborators it deliberately
// knows nothing about: where annotated sentences come from, and
// how per-token scores are computed. Both are modelled as
// traits so the application layer can swap implementations
// without touching the decoding pipeline.
//
//   - JsonlLoader implements SentenceSource
//   - Inferencer (checkpoint-backed model) implements TokenScorer
//   - Tests implement TokenScorer with canned score arrays
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::sentence::{EncodedSentence, SentenceRecord};

// ─── SentenceSource ───────────────────────────────────────────────────────────
/// Any component that can load annotated sentences.
pub trait SentenceSource {
    /// Load every available sentence record from this source.
    fn load_all(&self) -> Result<Vec<SentenceRecord>>;
}

// ─── TokenScorer ──────────────────────────────────────────────────────────────
/// Any component that can score tokens for splitting.
///
/// Returns one (not-split, split) probability pair per position
/// of the sample's padded sequence. How the scores are computed
/// — which model, which device — is invisible to the decoder.
pub trait TokenScorer {
    fn score_tokens(&self, sample: &EncodedSentence) -> Result<Vec<[f32; 2]>>;
}
