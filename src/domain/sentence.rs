// ============================================================
// Layer 3 — Sentence Domain Types
// ============================================================
// Two value types flow through the pipeline:
//
//   SentenceRecord   — one annotated sentence as loaded from
//                      disk: raw text plus reference spans over
//                      WORD indices (what the annotator sees).
//
//   EncodedSentence  — the same sentence after tokenisation:
//                      token ids, masks, labels, and reference
//                      spans rebased onto TOKEN indices
//                      (what the model sees).
//
// Both are sample-scoped, immutable value data produced fresh
// per run; nothing here persists beyond one
// decode/aggregate/evaluate call and no state is shared across
// samples.

use serde::{Deserialize, Serialize};

use crate::domain::span::Span;

/// One annotated sentence from the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Raw sentence text, whitespace-tokenised into words
    pub text: String,

    /// Reference aspect/opinion spans over word indices,
    /// inclusive on both ends
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl SentenceRecord {
    pub fn new(text: impl Into<String>, spans: Vec<Span>) -> Self {
        Self { text: text.into(), spans }
    }

    /// Number of whitespace-separated words in the sentence.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// One fully tokenised, padded training/evaluation sample.
///
/// All per-token arrays share the same padded length. Only the
/// first `content_len` positions carry signal; `offset` of those
/// are leading reserved tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedSentence {
    /// Token id sequence, `[CLS] words.. [SEP] [PAD]..`
    pub input_ids: Vec<u32>,

    /// 1 = real token, 0 = padding
    pub attention_mask: Vec<u32>,

    /// True at the first sub-token of every word; the first
    /// element is forced true. False at continuations, trailing
    /// specials, and padding.
    pub sub_words_mask: Vec<bool>,

    /// Per-token split labels (ChunkCode integer values);
    /// NotRelevant (-1) at specials, continuations, and padding
    pub chunk_labels: Vec<i64>,

    /// Count of leading reserved tokens before content words
    pub offset: usize,

    /// Encoded sequence length including specials, before padding
    pub content_len: usize,

    /// Reference spans rebased onto token indices
    pub reference_spans: Vec<Span>,
}

impl EncodedSentence {
    /// Padded sequence length (identical across the per-token arrays).
    pub fn padded_len(&self) -> usize {
        self.input_ids.len()
    }

    /// Length of the decodable span region: everything before the
    /// trailing `[SEP]`. Split decoding closes its last span here,
    /// so a predicted span can never swallow the final special
    /// token.
    pub fn span_region_len(&self) -> usize {
        self.content_len.saturating_sub(1)
    }
}
