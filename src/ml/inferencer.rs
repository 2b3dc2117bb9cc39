// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads the best checkpoint and scores single samples: one
// (not-split, split) probability pair per token position. The
// decoding into spans happens in the domain layer — this file
// only turns token ids into softmax scores.

use anyhow::Result;
use burn::prelude::*;

use crate::domain::sentence::EncodedSentence;
use crate::domain::traits::TokenScorer;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ChunkerModel, ChunkerModelConfig};

type InferBackend = burn::backend::Wgpu;

pub struct Inferencer {
    model:  ChunkerModel<InferBackend>,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Inferencer {
    /// Rebuild the trained model from the checkpoint directory.
    /// Dropout is zeroed — inference is deterministic.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg    = ckpt_manager.load_config()?;
        let model_cfg = ChunkerModelConfig::new(
            cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff, 0.0,
        );
        let model: ChunkerModel<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self { model, device })
    }

    /// Encoder hidden states for one sample — [seq_len, d_model].
    /// Feeds the span aggregator.
    pub fn embed_tokens(&self, sample: &EncodedSentence) -> Result<Tensor<InferBackend, 2>> {
        let output = self.model.forward(self.input_tensor(sample));
        let [_, seq_len, d_model] = output.hidden.dims();
        Ok(output.hidden.reshape([seq_len, d_model]))
    }

    pub fn device(&self) -> &burn::backend::wgpu::WgpuDevice {
        &self.device
    }

    fn input_tensor(&self, sample: &EncodedSentence) -> Tensor<InferBackend, 2, Int> {
        let flat: Vec<i32> = sample.input_ids.iter().map(|&x| x as i32).collect();
        Tensor::<InferBackend, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .unsqueeze::<2>()
    }
}

impl TokenScorer for Inferencer {
    /// Softmax over the chunk head for every position of the
    /// padded sequence, including padding — the decoder truncates
    /// to the sample's content length itself.
    fn score_tokens(&self, sample: &EncodedSentence) -> Result<Vec<[f32; 2]>> {
        let output = self.model.forward(self.input_tensor(sample));
        let [_, seq_len, classes] = output.logits.dims();

        let probs: Vec<f32> = burn::tensor::activation::softmax(output.logits, 2)
            .reshape([seq_len * classes])
            .into_data()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("cannot read score tensor: {e:?}"))?;

        Ok(probs
            .chunks_exact(2)
            .map(|pair| [pair[0], pair[1]])
            .collect())
    }
}
