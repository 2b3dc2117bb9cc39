// ============================================================
// Layer 5 — Span Aggregators
// ============================================================
// Collapses a per-token embedding matrix [L × D] into a
// per-span matrix [K × D]: row j summarises the tokens
// span_j.start ..= span_j.end.
//
// Two strategies behind one trait:
//
//   RnnAggregator   — folds each span's token sequence through
//                     stacked GRU layers and keeps the last
//                     hidden state. Learned; its parameters are
//                     trained by whatever downstream model
//                     consumes the span embeddings.
//
//   MeanAggregator  — arithmetic mean over the span's rows.
//                     Stateless, deterministic, no parameters.
//
// A span reaching past the embedding matrix is a caller
// contract violation and is rejected with EmptySpan, never
// clamped — by the decoder invariants it should be impossible,
// which is exactly why a silent clamp would hide a real bug.

use burn::nn::gru::{Gru, GruConfig};
use burn::prelude::*;

use crate::domain::error::SpanError;
use crate::domain::span::Span;

/// Capability interface over span aggregation strategies.
pub trait Aggregator<B: Backend> {
    /// [L × D] token embeddings + K spans → [K × D] span embeddings.
    fn aggregate(
        &self,
        embeddings: Tensor<B, 2>,
        spans:      &[Span],
    ) -> Result<Tensor<B, 2>, SpanError>;
}

/// Reject spans that leave the embedding matrix.
fn check_bounds(span: &Span, rows: usize) -> Result<(), SpanError> {
    if span.start > span.end || span.end >= rows {
        return Err(SpanError::EmptySpan {
            start: span.start,
            end:   span.end,
            rows,
        });
    }
    Ok(())
}

// ─── RnnAggregator ────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct RnnAggregatorConfig {
    /// Embedding dimension D (input and hidden size of every layer)
    pub d_model: usize,
    /// Stacked GRU layers
    #[config(default = 2)]
    pub num_layers: usize,
}

impl RnnAggregatorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RnnAggregator<B> {
        let grus = (0..self.num_layers)
            .map(|_| GruConfig::new(self.d_model, self.d_model, true).init(device))
            .collect();
        RnnAggregator { grus }
    }
}

/// Learned sequential summariser: last GRU state per span.
#[derive(Module, Debug)]
pub struct RnnAggregator<B: Backend> {
    grus: Vec<Gru<B>>,
}

impl<B: Backend> Aggregator<B> for RnnAggregator<B> {
    fn aggregate(
        &self,
        embeddings: Tensor<B, 2>,
        spans:      &[Span],
    ) -> Result<Tensor<B, 2>, SpanError> {
        let [rows, d_model] = embeddings.dims();

        if spans.is_empty() {
            return Ok(Tensor::zeros([0, d_model], &embeddings.device()));
        }

        let mut span_rows = Vec::with_capacity(spans.len());
        for span in spans {
            check_bounds(span, rows)?;
            let len = span.len();

            // [len, D] → [1, len, D] for the batched GRU input
            let mut sequence = embeddings
                .clone()
                .slice([span.start..span.end + 1, 0..d_model])
                .unsqueeze::<3>();

            for gru in &self.grus {
                sequence = gru.forward(sequence, None);
            }

            // Last time step summarises the whole span
            let last = sequence
                .slice([0..1, len - 1..len, 0..d_model])
                .reshape([1, d_model]);
            span_rows.push(last);
        }

        Ok(Tensor::cat(span_rows, 0))
    }
}

// ─── MeanAggregator ───────────────────────────────────────────────────────────

/// Stateless mean pooling over each span's token rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAggregator;

impl MeanAggregator {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Aggregator<B> for MeanAggregator {
    fn aggregate(
        &self,
        embeddings: Tensor<B, 2>,
        spans:      &[Span],
    ) -> Result<Tensor<B, 2>, SpanError> {
        let [rows, d_model] = embeddings.dims();

        if spans.is_empty() {
            return Ok(Tensor::zeros([0, d_model], &embeddings.device()));
        }

        let mut span_rows = Vec::with_capacity(spans.len());
        for span in spans {
            check_bounds(span, rows)?;
            let pooled = embeddings
                .clone()
                .slice([span.start..span.end + 1, 0..d_model])
                .mean_dim(0); // [1, D]
            span_rows.push(pooled);
        }

        Ok(Tensor::cat(span_rows, 0))
    }
}
