// ============================================================
// Layer 4 — Sentence Encoder
// ============================================================
// Tokenises one annotated sentence into a model-ready sample.
//
// The sequence layout is the standard encoder format:
//
//   [CLS] word tokens ... [SEP] [PAD] ...
//    │                     │
//    └ offset = 1          └ content_len - 1
//
// Words are tokenised ONE AT A TIME so the sub-word
// continuation mask can be built exactly: the first sub-token
// of each word is a unit start (mask true), every further
// sub-token is a continuation (mask false). The first position
// of the whole sequence is forced true — the boundary codec
// requires it so the leading unit always closes.
//
// Word-index annotations are rebased onto token indices here,
// and the per-token chunk labels are derived from them:
//
//   Split        at every reference-span start, and at the
//                first word-start after each span end
//   NotSplit     at every other word start inside the content
//   NotRelevant  at specials, continuations, and padding
//
// With these labels a perfect prediction decodes back to a span
// sequence containing every reference span exactly.
//
// Reference: Devlin et al. (2019) BERT — WordPiece input format

use anyhow::{anyhow, Result};
use tokenizers::Tokenizer;

use crate::domain::chunk::ChunkCode;
use crate::domain::sentence::{EncodedSentence, SentenceRecord};
use crate::domain::span::Span;

/// Fallback special-token ids (BERT convention) for vocabularies
/// that don't name them.
const FALLBACK_PAD_ID: u32 = 0;
const FALLBACK_UNK_ID: u32 = 1;
const FALLBACK_CLS_ID: u32 = 101;
const FALLBACK_SEP_ID: u32 = 102;

pub struct SentenceEncoder<'t> {
    tokenizer:   &'t Tokenizer,
    max_seq_len: usize,
    cls_id:      u32,
    sep_id:      u32,
    pad_id:      u32,
    unk_id:      u32,
}

impl<'t> SentenceEncoder<'t> {
    pub fn new(tokenizer: &'t Tokenizer, max_seq_len: usize) -> Self {
        Self {
            cls_id: tokenizer.token_to_id("[CLS]").unwrap_or(FALLBACK_CLS_ID),
            sep_id: tokenizer.token_to_id("[SEP]").unwrap_or(FALLBACK_SEP_ID),
            pad_id: tokenizer.token_to_id("[PAD]").unwrap_or(FALLBACK_PAD_ID),
            unk_id: tokenizer.token_to_id("[UNK]").unwrap_or(FALLBACK_UNK_ID),
            tokenizer,
            max_seq_len,
        }
    }

    /// Encode one sentence record into a padded sample.
    ///
    /// Sentences longer than the sequence budget are truncated at
    /// a word boundary; annotations on truncated words are
    /// dropped with a warning.
    pub fn encode(&self, record: &SentenceRecord) -> Result<EncodedSentence> {
        let words: Vec<&str> = record.text.split_whitespace().collect();
        if words.is_empty() {
            return Err(anyhow!("cannot encode an empty sentence"));
        }

        // ── Tokenise word by word ─────────────────────────────────────────────
        // [CLS] first; its mask entry is the forced-true anchor.
        let mut input_ids      = vec![self.cls_id];
        let mut sub_words_mask = vec![true];

        // Token range of every fully-encoded word
        let mut word_starts: Vec<usize> = Vec::with_capacity(words.len());
        let mut word_ends:   Vec<usize> = Vec::with_capacity(words.len());

        // Reserve one slot for the trailing [SEP]
        let token_budget = self.max_seq_len.saturating_sub(1);

        'words: for word in &words {
            let encoding = self
                .tokenizer
                .encode(*word, false)
                .map_err(|e| anyhow!("tokenisation error on '{word}': {e}"))?;

            let mut ids = encoding.get_ids().to_vec();
            if ids.is_empty() {
                // Whole word fell outside the vocabulary
                ids.push(self.unk_id);
            }

            // A word is kept only if ALL its sub-tokens fit;
            // half a word would corrupt the continuation mask.
            if input_ids.len() + ids.len() > token_budget {
                tracing::warn!(
                    "Truncating sentence at word {}/{} (max_seq_len {})",
                    word_starts.len(),
                    words.len(),
                    self.max_seq_len
                );
                break 'words;
            }

            word_starts.push(input_ids.len());
            for (k, &id) in ids.iter().enumerate() {
                input_ids.push(id);
                sub_words_mask.push(k == 0);
            }
            word_ends.push(input_ids.len() - 1);
        }

        if word_starts.is_empty() {
            return Err(anyhow!(
                "sequence budget {} too small for the first word",
                self.max_seq_len
            ));
        }

        input_ids.push(self.sep_id);
        sub_words_mask.push(false);

        let offset      = 1usize;
        let content_len = input_ids.len();

        // ── Rebase word spans onto token indices ──────────────────────────────
        let encoded_words = word_starts.len();
        let mut reference_spans = Vec::with_capacity(record.spans.len());
        for span in &record.spans {
            if span.end >= encoded_words {
                tracing::warn!(
                    "Dropping span ({}, {}) — word truncated away",
                    span.start,
                    span.end
                );
                continue;
            }
            reference_spans.push(Span::new(word_starts[span.start], word_ends[span.end]));
        }

        // ── Chunk labels ──────────────────────────────────────────────────────
        let mut chunk_labels =
            vec![ChunkCode::NotRelevant.as_label(); self.max_seq_len];

        // Word starts inside the content default to "no boundary here"
        for t in offset..content_len - 1 {
            if sub_words_mask[t] {
                chunk_labels[t] = ChunkCode::NotSplit.as_label();
            }
        }

        // Unit starts: span starts, and the word right after a span
        for span in &reference_spans {
            chunk_labels[span.start] = ChunkCode::Split.as_label();
            let after = span.end + 1;
            if after < content_len - 1 && sub_words_mask[after] {
                chunk_labels[after] = ChunkCode::Split.as_label();
            }
        }

        // ── Pad to max_seq_len ────────────────────────────────────────────────
        let mut attention_mask = vec![1u32; content_len];
        while input_ids.len() < self.max_seq_len {
            input_ids.push(self.pad_id);
            attention_mask.push(0);
            sub_words_mask.push(false);
        }

        Ok(EncodedSentence {
            input_ids,
            attention_mask,
            sub_words_mask,
            chunk_labels,
            offset,
            content_len,
            reference_spans,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::TokenizerStore;

    /// Word-level tokenizer over a tiny fixed corpus; every word
    /// becomes exactly one token.
    fn test_tokenizer(name: &str) -> Tokenizer {
        let dir = std::env::temp_dir().join(format!("aste-chunker-encoder-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let store = TokenizerStore::new(dir.to_str().unwrap());
        let corpus = vec!["the battery life is great and the hinge is solid".to_string()];
        store.load_or_build(&corpus, 64).unwrap()
    }

    fn record(text: &str, spans: &[(usize, usize)]) -> SentenceRecord {
        SentenceRecord::new(
            text,
            spans.iter().map(|&(s, e)| Span::new(s, e)).collect(),
        )
    }

    #[test]
    fn test_layout_offset_and_content_len() {
        let tokenizer = test_tokenizer("layout");
        let encoder   = SentenceEncoder::new(&tokenizer, 16);
        let sample    = encoder.encode(&record("the battery life is great", &[])).unwrap();

        // [CLS] + 5 words + [SEP]
        assert_eq!(sample.offset, 1);
        assert_eq!(sample.content_len, 7);
        assert_eq!(sample.padded_len(), 16);
        // Forced-true anchor, word starts true, [SEP] false
        assert!(sample.sub_words_mask[0]);
        assert!(sample.sub_words_mask[1..6].iter().all(|&m| m));
        assert!(!sample.sub_words_mask[6]);
        // Attention covers exactly the content
        assert_eq!(sample.attention_mask.iter().sum::<u32>(), 7);
    }

    #[test]
    fn test_word_spans_rebase_onto_tokens() {
        let tokenizer = test_tokenizer("spans");
        let encoder   = SentenceEncoder::new(&tokenizer, 16);
        let sample    = encoder
            .encode(&record("the battery life is great", &[(1, 2), (4, 4)]))
            .unwrap();

        // Word w sits at token w+1 (behind [CLS])
        assert_eq!(
            sample.reference_spans,
            vec![Span::new(2, 3), Span::new(5, 5)]
        );
    }

    #[test]
    fn test_chunk_labels_mark_unit_starts() {
        let tokenizer = test_tokenizer("labels");
        let encoder   = SentenceEncoder::new(&tokenizer, 16);
        let sample    = encoder
            .encode(&record("the battery life is great", &[(1, 2)]))
            .unwrap();

        let split    = ChunkCode::Split.as_label();
        let stay     = ChunkCode::NotSplit.as_label();
        let ignored  = ChunkCode::NotRelevant.as_label();

        // [CLS] ignored; "the" no boundary; "battery" starts the
        // span; "is" is the first word after it; padding ignored
        assert_eq!(sample.chunk_labels[0], ignored);
        assert_eq!(sample.chunk_labels[1], stay);
        assert_eq!(sample.chunk_labels[2], split);
        assert_eq!(sample.chunk_labels[3], stay);
        assert_eq!(sample.chunk_labels[4], split);
        assert_eq!(sample.chunk_labels[5], stay);
        assert_eq!(sample.chunk_labels[6], ignored); // [SEP]
        assert!(sample.chunk_labels[7..].iter().all(|&l| l == ignored));
    }

    #[test]
    fn test_perfect_labels_decode_to_reference_spans() {
        use crate::domain::decoder::PredictionDecoder;

        let tokenizer = test_tokenizer("roundtrip");
        let encoder   = SentenceEncoder::new(&tokenizer, 16);
        let sample    = encoder
            .encode(&record("the battery life is great", &[(1, 2), (4, 4)]))
            .unwrap();

        // Treat the gold labels as a perfect prediction
        let scores: Vec<[f32; 2]> = sample
            .chunk_labels
            .iter()
            .map(|&l| if l == 1 { [0.0, 1.0] } else { [1.0, 0.0] })
            .collect();

        let decoded = PredictionDecoder::default()
            .decode(&scores, &sample.sub_words_mask, sample.span_region_len(), sample.offset)
            .unwrap();

        for reference in &sample.reference_spans {
            assert!(decoded.contains(reference), "missing {reference:?} in {decoded:?}");
        }
    }

    #[test]
    fn test_truncation_drops_spans_on_lost_words() {
        let tokenizer = test_tokenizer("truncate");
        // Budget: [CLS] + 3 words + [SEP]
        let encoder = SentenceEncoder::new(&tokenizer, 5);
        let sample  = encoder
            .encode(&record("the battery life is great", &[(1, 2), (4, 4)]))
            .unwrap();

        assert_eq!(sample.content_len, 5);
        // (1,2) survives, (4,4) was truncated away
        assert_eq!(sample.reference_spans, vec![Span::new(2, 3)]);
    }
}
