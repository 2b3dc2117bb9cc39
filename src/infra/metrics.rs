// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two small pieces of bookkeeping:
//
//   TokenMetrics  — confusion counters for the token-level split
//                   classifier. Positions labelled NotRelevant
//                   are skipped BEFORE counting; the ignore
//                   filter is an explicit step, not something
//                   baked into the counters.
//
//   EpochMetrics / MetricsLogger — one CSV row per epoch so
//                   learning curves can be plotted after a run.
//
// Output file: checkpoints/metrics.csv
//
//   epoch,train_loss,val_loss,precision,recall,f1
//   1,0.412400,0.389100,0.512000,0.433000,0.469200
//   ...

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::domain::chunk::ChunkCode;

// ─── TokenMetrics ─────────────────────────────────────────────────────────────
/// Confusion counters for the binary split classifier, with the
/// split class as the positive class.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMetrics {
    true_positive:  usize,
    false_positive: usize,
    false_negative: usize,
    true_negative:  usize,
}

impl TokenMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one (prediction, label) pair. Ignored positions
    /// contribute nothing.
    pub fn update(&mut self, prediction: i64, label: i64) {
        if label == ChunkCode::NotRelevant.as_label() {
            return;
        }
        let split = ChunkCode::Split.as_label();
        match (prediction == split, label == split) {
            (true,  true)  => self.true_positive  += 1,
            (true,  false) => self.false_positive += 1,
            (false, true)  => self.false_negative += 1,
            (false, false) => self.true_negative  += 1,
        }
    }

    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (i64, i64)>) {
        for (prediction, label) in pairs {
            self.update(prediction, label);
        }
    }

    /// tp / (tp + fp); 0.0 when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// tp / (tp + fn); 0.0 when no positive labels were seen
    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    pub fn accuracy(&self) -> f64 {
        let correct = self.true_positive + self.true_negative;
        let total   = correct + self.false_positive + self.false_negative;
        ratio(correct, total)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ─── EpochMetrics ─────────────────────────────────────────────────────────────
/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    /// Average dice loss over all training batches
    pub train_loss: f64,
    /// Average dice loss on the validation set
    pub val_loss:   f64,
    /// Split-class precision on validation tokens
    pub precision:  f64,
    /// Split-class recall on validation tokens
    pub recall:     f64,
    /// Harmonic mean of the two — drives early stopping
    pub f1:         f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        train_loss: f64,
        val_loss:   f64,
        precision:  f64,
        recall:     f64,
        f1:         f64,
    ) -> Self {
        Self { epoch, train_loss, val_loss, precision, recall, f1 }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Header only for a fresh file — reruns append
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,precision,recall,f1")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.precision,
            m.recall,
            m.f1,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}, f1={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.f1,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_recall_f1() {
        let mut m = TokenMetrics::new();
        // preds:  1 1 0 0 1   labels: 1 0 1 0 1
        m.extend([(1, 1), (1, 0), (0, 1), (0, 0), (1, 1)]);
        assert!((m.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ignored_labels_are_skipped() {
        let mut m = TokenMetrics::new();
        m.extend([(1, -1), (0, -1), (1, 1)]);
        assert_eq!(m.precision(), 1.0);
        assert_eq!(m.recall(), 1.0);
        assert_eq!(m.accuracy(), 1.0);
    }

    #[test]
    fn test_empty_counters_are_zero_not_nan() {
        let m = TokenMetrics::new();
        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.recall(), 0.0);
        assert_eq!(m.f1(), 0.0);
    }
}
