// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
// training the chunker, measuring span coverage, or embedding
// the spans of a sentence.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file-format code (that's Layer 4 and 6)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// The span-coverage evaluation workflow
pub mod coverage_use_case;

// The span-embedding workflow
pub mod embed_use_case;
