// ============================================================
// Layer 2 — Embed Use Case
// ============================================================
// Demonstrates the span-embedding path on one sentence:
//
//   1. Encode the sentence; the sub-word mask marks word units
//   2. BoundaryCodec + SpanBuilder turn the mask into word spans
//   3. The encoder's hidden states give one vector per token
//   4. The selected aggregation strategy folds each span's
//      token vectors into a single span vector
//
// This is the training-time representation path: downstream
// models consume [K × D] span embeddings instead of [L × D]
// token embeddings. Mean pooling is the default strategy; the
// GRU strategy exercises the learned summariser with fresh
// weights (training those weights belongs to the downstream
// consumer, not to the chunker).

use anyhow::{anyhow, Result};
use burn::prelude::*;

use crate::data::{encoder::SentenceEncoder, preprocessor::Preprocessor};
use crate::domain::boundary::BoundaryCodec;
use crate::domain::sentence::SentenceRecord;
use crate::domain::span::{build_spans, Span};
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::aggregator::{Aggregator, MeanAggregator, RnnAggregator, RnnAggregatorConfig};
use crate::ml::inferencer::Inferencer;

type EmbedBackend = burn::backend::Wgpu;

/// Which aggregation strategy the embed command applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorChoice {
    Mean,
    Rnn,
}

impl std::str::FromStr for AggregatorChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(AggregatorChoice::Mean),
            "rnn"  => Ok(AggregatorChoice::Rnn),
            other  => Err(anyhow!("unknown aggregator '{other}' (expected 'mean' or 'rnn')")),
        }
    }
}

pub struct EmbedUseCase {
    tokenizer:   tokenizers::Tokenizer,
    inferencer:  Inferencer,
    max_seq_len: usize,
    d_model:     usize,
}

/// One span with its embedding row, ready for display.
pub struct SpanEmbedding {
    pub span:   Span,
    pub vector: Vec<f32>,
}

impl EmbedUseCase {
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let tok_store = TokenizerStore::new(&checkpoint_dir);
        let tokenizer = tok_store.load()?;
        let ckpt      = CheckpointManager::new(&checkpoint_dir);
        let cfg       = ckpt.load_config()?;
        let inferencer = Inferencer::from_checkpoint(&ckpt)?;
        Ok(Self {
            tokenizer,
            inferencer,
            max_seq_len: cfg.max_seq_len,
            d_model:     cfg.d_model,
        })
    }

    /// Embed every word unit of one sentence.
    pub fn embed(&self, text: &str, choice: AggregatorChoice) -> Result<Vec<SpanEmbedding>> {
        let preprocessor = Preprocessor::new();
        let record  = SentenceRecord::new(preprocessor.clean(text), Vec::new());
        let encoder = SentenceEncoder::new(&self.tokenizer, self.max_seq_len);
        let sample  = encoder.encode(&record)?;

        // ── Word spans from the ground-truth sub-word mask ────────────────────
        let codec      = BoundaryCodec::new(0);
        let boundaries = codec.word_boundaries(&sample.sub_words_mask, sample.content_len)?;
        let spans      = build_spans(&boundaries);

        // ── Token embeddings, truncated to the content ────────────────────────
        let hidden = self.inferencer.embed_tokens(&sample)?;
        let embeddings = hidden.slice([0..sample.content_len, 0..self.d_model]);

        // ── Aggregate per span ────────────────────────────────────────────────
        let span_matrix = match choice {
            AggregatorChoice::Mean => {
                MeanAggregator::new().aggregate(embeddings, &spans)?
            }
            AggregatorChoice::Rnn => {
                tracing::warn!(
                    "RNN aggregator runs with fresh weights — train it downstream before relying on the output"
                );
                let device = self.inferencer.device().clone();
                let aggregator: RnnAggregator<EmbedBackend> =
                    RnnAggregatorConfig::new(self.d_model).init::<EmbedBackend>(&device);
                aggregator.aggregate(embeddings, &spans)?
            }
        };

        let [span_count, d_model] = span_matrix.dims();
        let flat: Vec<f32> = span_matrix
            .into_data()
            .to_vec()
            .map_err(|e| anyhow!("cannot read span embeddings: {e:?}"))?;

        Ok(spans
            .into_iter()
            .take(span_count)
            .enumerate()
            .map(|(j, span)| SpanEmbedding {
                span,
                vector: flat[j * d_model..(j + 1) * d_model].to_vec(),
            })
            .collect())
    }
}
