// ============================================================
// Layer 5 — Dice Loss
// ============================================================
// Split tokens are rare: a 40-token review sentence may carry
// three of them. Cross-entropy lets the majority class drown
// the signal; dice loss optimises an F1-shaped objective
// directly, which is why the chunker trains on it.
//
// Per token, with p = predicted split probability and
// y ∈ {0, 1} the gold split indicator:
//
//   p̃    = (1 - p) · p          (self-adjusting weight)
//   loss = 1 - (2·p̃·y + γ) / (p̃ + y + γ)
//
// The (1 - p) factor decays the contribution of easy, already
// confident positives so training pressure stays on the hard
// boundaries. γ smooths the all-negative case.
//
// Positions labelled NotRelevant (-1) — padding, special
// tokens, sub-word continuations — are filtered out of the
// numerator, the denominator, and the mean.
//
// Reference: Li et al. (2020) Dice Loss for Data-imbalanced NLP Tasks

use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::domain::chunk::ChunkCode;

#[derive(Config, Debug)]
pub struct DiceLossConfig {
    /// Smoothing term γ added to numerator and denominator
    #[config(default = 1.0)]
    pub smooth: f64,
}

impl DiceLossConfig {
    pub fn init(&self) -> DiceLoss {
        DiceLoss { smooth: self.smooth }
    }
}

/// Self-adjusting dice loss with ignore-index filtering.
#[derive(Debug, Clone)]
pub struct DiceLoss {
    smooth: f64,
}

impl DiceLoss {
    /// logits: [tokens, 2], targets: [tokens] with ChunkCode values.
    /// Returns the mean dice loss over non-ignored positions.
    pub fn forward<B: Backend>(
        &self,
        logits:  Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> Tensor<B, 1> {
        let [tokens, _classes] = logits.dims();

        // Probability of the split class per token
        let probs = softmax(logits, 1);
        let p = probs
            .slice([0..tokens, 1..2])
            .reshape([tokens]);

        let split_label  = ChunkCode::Split.as_label() as i32;
        let ignore_label = ChunkCode::NotRelevant.as_label() as i32;

        let y     = targets.clone().equal_elem(split_label).float();
        let valid = targets.not_equal_elem(ignore_label).float();

        // Self-adjusting weight (1 - p) · p
        let p_adj = (p.ones_like() - p.clone()) * p;

        let numer = p_adj.clone() * y.clone() * 2.0 + self.smooth;
        let denom = p_adj + y + self.smooth;
        let per_token = (numer.ones_like() - numer / denom) * valid.clone();

        // Mean over the valid positions only; the clamp guards an
        // all-ignored batch without hiding a real division
        per_token.sum() / valid.sum().clamp_min(1.0)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn loss_of(logit_rows: &[[f32; 2]], labels: &[i32]) -> f32 {
        let device = Default::default();
        let flat: Vec<f32> = logit_rows.iter().flatten().copied().collect();
        let logits = Tensor::<TestBackend, 1>::from_floats(flat.as_slice(), &device)
            .reshape([logit_rows.len(), 2]);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints(labels, &device);

        DiceLossConfig::new()
            .init()
            .forward(logits, targets)
            .into_scalar()
    }

    #[test]
    fn test_confident_correct_beats_confident_wrong() {
        // Gold: split at position 1
        let labels = [0, 1, 0];
        let good   = loss_of(&[[4.0, -4.0], [-4.0, 4.0], [4.0, -4.0]], &labels);
        let bad    = loss_of(&[[-4.0, 4.0], [4.0, -4.0], [-4.0, 4.0]], &labels);
        assert!(good < bad, "good={good} bad={bad}");
    }

    #[test]
    fn test_ignored_positions_do_not_move_the_loss() {
        let labels = [0, 1, -1, -1];
        let quiet  = loss_of(
            &[[2.0, -2.0], [-2.0, 2.0], [0.0, 0.0], [0.0, 0.0]],
            &labels,
        );
        let noisy  = loss_of(
            &[[2.0, -2.0], [-2.0, 2.0], [9.0, -9.0], [-9.0, 9.0]],
            &labels,
        );
        assert!((quiet - noisy).abs() < 1e-6, "quiet={quiet} noisy={noisy}");
    }

    #[test]
    fn test_all_ignored_is_zero_not_nan() {
        let value = loss_of(&[[1.0, -1.0], [-1.0, 1.0]], &[-1, -1]);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_loss_is_bounded() {
        let labels = [1, 0];
        let value  = loss_of(&[[0.3, -0.1], [-0.5, 0.2]], &labels);
        assert!((0.0..=1.0).contains(&value));
    }
}
