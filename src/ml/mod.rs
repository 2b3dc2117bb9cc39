// ============================================================
// Layer 5 — ML / Model Layer (burn)
// ============================================================
// This layer contains ALL burn framework specific code (plus
// the batcher/dataset glue in Layer 4). The domain layer never
// sees a tensor — it receives plain score arrays and embedding
// matrices already pulled off the device.
//
// What's in this layer:
//
//   model.rs      — transformer encoder with a 2-class chunk
//                   head; exposes both the hidden states (for
//                   span aggregation) and the per-token logits
//                   (for split decoding)
//
//   loss.rs       — self-adjusting dice loss with the
//                   NotRelevant ignore filter
//
//   aggregator.rs — span aggregation strategies: stacked-GRU
//                   last-state and mean pooling behind one trait
//
//   trainer.rs    — training loop: Adam, dice loss, validation
//                   P/R/F1 with prediction help, early stopping,
//                   checkpoint-on-improvement
//
//   inferencer.rs — checkpoint-backed per-token scorer and
//                   token embedder
//
// Reference: Vaswani et al. (2017) Attention Is All You Need
//            Li et al. (2020) Dice Loss for Data-imbalanced NLP Tasks

/// Transformer encoder chunker architecture
pub mod model;

/// Dice loss with ignore-index filtering
pub mod loss;

/// Span embedding aggregation strategies
pub mod aggregator;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads a checkpoint and scores tokens
pub mod inferencer;
