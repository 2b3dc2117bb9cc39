// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using burn's DataLoader and Adam.
//
// Backend split:
//   - Training uses TrainBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on EvalBackend (Wgpu)
//   - The validation batcher must also use EvalBackend
//
// Validation applies the prediction help before metrics: a word
// can only split at its first sub-token, so continuation
// positions are forced to not-split no matter what the head
// predicted. Token-level precision/recall/F1 are computed with
// the NotRelevant positions excluded.
//
// The best validation F1 drives checkpointing and early
// stopping: the model is saved only when F1 improves, and
// training stops once `patience` epochs pass without one.
//
// Reference: Kingma & Ba (2015) Adam
//            Li et al. (2020) dice loss

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ChunkBatcher, dataset::ChunkDataset};
use crate::domain::chunk::ChunkCode;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger, TokenMetrics};
use crate::ml::loss::DiceLossConfig;
use crate::ml::model::{ChunkerModel, ChunkerModelConfig};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
type EvalBackend  = burn::backend::Wgpu;

// ─── Early stopping ───────────────────────────────────────────────────────────
// Tracks the best validation value seen so far (max direction)
// and how long ago it happened.
struct EarlyStopping {
    patience:   Option<usize>,
    best_value: f64,
    best_epoch: usize,
}

impl EarlyStopping {
    fn new(patience: Option<usize>) -> Self {
        Self {
            patience,
            best_value: f64::NEG_INFINITY,
            best_epoch: 0,
        }
    }

    /// Record this epoch's value; true when it is a new best.
    fn update(&mut self, epoch: usize, value: f64) -> bool {
        if value > self.best_value {
            self.best_value = value;
            self.best_epoch = epoch;
            return true;
        }
        false
    }

    fn should_stop(&self, epoch: usize) -> bool {
        match self.patience {
            Some(patience) => epoch - self.best_epoch > patience,
            None => false,
        }
    }
}

pub fn run_training(
    cfg:            &TrainConfig,
    train_dataset:  ChunkDataset,
    val_dataset:    ChunkDataset,
    ckpt_manager:   CheckpointManager,
    metrics_logger: MetricsLogger,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, metrics_logger, device)
}

fn train_loop(
    cfg:            &TrainConfig,
    train_dataset:  ChunkDataset,
    val_dataset:    ChunkDataset,
    ckpt_manager:   CheckpointManager,
    metrics_logger: MetricsLogger,
    device:         burn::backend::wgpu::WgpuDevice,
) -> Result<()> {

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = ChunkerModelConfig::new(
        cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
    );
    let mut model: ChunkerModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!("Model ready: {} layers, d_model={}", cfg.num_layers, cfg.d_model);

    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = ChunkBatcher::<TrainBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (no autodiff overhead) ─────────────────────────
    let val_batcher = ChunkBatcher::<EvalBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut stopper = EarlyStopping::new(cfg.patience);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.input_ids, batch.chunk_labels);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → ChunkerModel<EvalBackend>, dropout disabled
        let model_valid = model.valid();
        let dice        = DiceLossConfig::new().init();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        let mut token_metrics = TokenMetrics::new();

        for batch in val_loader.iter() {
            let output = model_valid.forward(batch.input_ids);
            let [batch_size, seq_len, _] = output.logits.dims();

            let flat_logits = output.logits.reshape([batch_size * seq_len, 2]);
            let flat_labels = batch.chunk_labels.reshape([batch_size * seq_len]);

            let batch_loss: f64 = dice
                .forward(flat_logits.clone(), flat_labels.clone())
                .into_scalar()
                .elem::<f64>();
            val_loss_sum += batch_loss;
            val_batches  += 1;

            // argmax(1) over the class axis → [tokens, 1] → flatten
            let predictions: Vec<i64> = flat_logits
                .argmax(1)
                .reshape([batch_size * seq_len])
                .into_data()
                .convert::<i64>()
                .to_vec()
                .unwrap_or_default();

            let labels: Vec<i64> = flat_labels
                .into_data()
                .convert::<i64>()
                .to_vec()
                .unwrap_or_default();

            let word_starts: Vec<i64> = batch
                .sub_words_mask
                .reshape([batch_size * seq_len])
                .into_data()
                .convert::<i64>()
                .to_vec()
                .unwrap_or_default();

            // Prediction help: continuations can never split
            let helped = predictions
                .iter()
                .zip(word_starts.iter())
                .map(|(&p, &w)| if w == 0 { ChunkCode::NotSplit.as_label() } else { p });

            token_metrics.extend(helped.zip(labels.iter().copied()));
        }

        let avg_val_loss = if val_batches > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };

        let metrics = EpochMetrics::new(
            epoch,
            avg_train_loss,
            avg_val_loss,
            token_metrics.precision(),
            token_metrics.recall(),
            token_metrics.f1(),
        );
        metrics_logger.log(&metrics)?;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | P={:.3} | R={:.3} | F1={:.3}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss,
            metrics.precision, metrics.recall, metrics.f1,
        );

        // ── Checkpoint on improvement, stop when patience runs out ────────────
        if stopper.update(epoch, metrics.f1) {
            ckpt_manager.save_model(&model, epoch)?;
            tracing::info!("Validation F1 improved — checkpoint saved for epoch {}", epoch);
        }
        if stopper.should_stop(epoch) {
            tracing::info!(
                "Early stopping at epoch {} (best epoch {}, patience {:?})",
                epoch,
                stopper.best_epoch,
                cfg.patience
            );
            break;
        }
    }

    tracing::info!(
        "Training complete. Best epoch: {} (F1={:.3})",
        stopper.best_epoch,
        stopper.best_value
    );
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_stopping_tracks_best_epoch() {
        let mut stopper = EarlyStopping::new(Some(2));
        assert!(stopper.update(1, 0.5));
        assert!(!stopper.update(2, 0.4));
        assert!(stopper.update(3, 0.6));
        assert_eq!(stopper.best_epoch, 3);
    }

    #[test]
    fn test_early_stopping_fires_after_patience() {
        let mut stopper = EarlyStopping::new(Some(2));
        stopper.update(1, 0.5);
        stopper.update(2, 0.3);
        stopper.update(3, 0.3);
        assert!(!stopper.should_stop(3));
        stopper.update(4, 0.3);
        assert!(stopper.should_stop(4));
    }

    #[test]
    fn test_no_patience_never_stops() {
        let mut stopper = EarlyStopping::new(None);
        stopper.update(1, 0.9);
        assert!(!stopper.should_stop(100));
    }
}
