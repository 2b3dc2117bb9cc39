// ============================================================
// Layer 3 — Domain Error Taxonomy
// ============================================================
// Every failure the span pipeline can produce is one of three
// caller contract violations. None of them is transient:
// retrying the same call with the same inputs fails the same
// way, so no retry/backoff machinery exists at this layer.
//
// Reference: Rust Book §9 (Error Handling)

use thiserror::Error;

/// Errors produced by the span decoding / aggregation / coverage core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpanError {
    /// Input arrays violate a length or ordering contract
    /// (empty sequence, mismatched lengths, unforced first flag).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A span's token range falls outside the embedding matrix.
    /// Unreachable when spans come from the decoder, but callers
    /// crossing the boundary are rejected, never clamped.
    #[error("span [{start}, {end}] is outside the embedding matrix with {rows} rows")]
    EmptySpan {
        start: usize,
        end:   usize,
        rows:  usize,
    },

    /// Coverage ratio requested over an empty reference span set.
    /// Reported as an error, never coerced to 0.0 or NaN.
    #[error("coverage ratio undefined: reference span set is empty")]
    DivisionUndefined,
}
