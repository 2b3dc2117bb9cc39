// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from annotated .jsonl files to GPU-ready tensor
// batches, in this order:
//
//   .jsonl files
//       │
//       ▼
//   JsonlLoader       → reads sentence records + word spans
//       │
//       ▼
//   Preprocessor      → normalises whitespace/control chars
//       │
//       ▼
//   SentenceEncoder   → tokenises, builds sub-word masks,
//       │               offsets, chunk labels, token spans
//       ▼
//   ChunkDataset      → implements burn's Dataset trait
//       │
//       ▼
//   ChunkBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.

/// Loads annotated sentence records from .jsonl files
pub mod loader;

/// Normalises raw sentence text (word-count preserving)
pub mod preprocessor;

/// Tokenises sentences into padded, labelled samples
pub mod encoder;

/// Implements burn's Dataset trait for encoded samples
pub mod dataset;

/// Implements burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle and train/validation split
pub mod splitter;
