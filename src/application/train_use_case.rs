// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load .jsonl sentences      (Layer 4 - data)
//   Step 2: Clean the text             (Layer 4 - data)
//   Step 3: Build / load tokenizer     (Layer 6 - infra)
//   Step 4: Encode sentences           (Layer 4 - data)
//   Step 5: Split train/validation     (Layer 4 - data)
//   Step 6: Build datasets             (Layer 4 - data)
//   Step 7: Save config                (Layer 6 - infra)
//   Step 8: Run training loop          (Layer 5 - ml)

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ChunkDataset,
    encoder::SentenceEncoder,
    loader::JsonlLoader,
    preprocessor::Preprocessor,
    splitter::split_train_val,
};
use crate::domain::sentence::SentenceRecord;
use crate::domain::traits::SentenceSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so the
// checkpoint directory can reconstruct the exact architecture
// for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    pub max_seq_len:    usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub vocab_size:     usize,
    /// Epochs without a validation F1 improvement before stopping
    pub patience:       Option<usize>,
    /// Shuffle/split seed for reproducible runs
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/sentences".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            max_seq_len:    128,
            batch_size:     16,
            epochs:         20,
            lr:             2e-4,
            d_model:        256,
            num_heads:      8,
            num_layers:     6,
            d_ff:           1024,
            dropout:        0.1,
            vocab_size:     30522,
            patience:       Some(5),
            seed:           42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load annotated sentences ──────────────────────────────────
        tracing::info!("Loading .jsonl sentences from '{}'", cfg.data_dir);
        let loader  = JsonlLoader::new(&cfg.data_dir);
        let records = loader.load_all()?;
        if records.is_empty() {
            return Err(anyhow!(
                "No training sentences found in '{}'",
                cfg.data_dir
            ));
        }
        tracing::info!("Loaded {} sentences", records.len());

        // ── Step 2: Clean text (word-count preserving) ────────────────────────
        let preprocessor = Preprocessor::new();
        let records: Vec<SentenceRecord> = records
            .into_iter()
            .map(|r| SentenceRecord::new(preprocessor.clean(&r.text), r.spans))
            .collect();

        // ── Step 3: Build / load tokenizer ────────────────────────────────────
        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.load_or_build(&texts, cfg.vocab_size)?;

        // ── Step 4: Encode sentences into labelled samples ────────────────────
        let encoder = SentenceEncoder::new(&tokenizer, cfg.max_seq_len);
        let mut samples = Vec::with_capacity(records.len());
        for record in &records {
            match encoder.encode(record) {
                Ok(sample) => samples.push(sample),
                Err(e) => tracing::warn!("Skipping sentence: {e}"),
            }
        }
        tracing::info!("Encoded {} samples", samples.len());

        // ── Step 5: Train / validation split (80/20) ──────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, 0.8, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 6: Build burn datasets ───────────────────────────────────────
        let train_dataset = ChunkDataset::new(train_samples);
        let val_dataset   = ChunkDataset::new(val_samples);

        // ── Step 7: Save config for later commands ────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        let metrics_logger = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, val_dataset, ckpt_manager, metrics_logger)?;

        Ok(())
    }
}
