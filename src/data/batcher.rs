// ============================================================
// Layer 4 — Chunk Batcher
// ============================================================
// Implements burn's Batcher trait to stack a Vec of encoded
// sentences into device tensors of shape [batch, seq].
//
// All samples are already padded to the same length by the
// encoder, so batching is flatten + reshape:
//
//   [s1_t1 .. s1_tS, s2_t1 .. sN_tS]  →  [N, S]
//
// Labels ride along as Int tensors carrying the ChunkCode
// values, including the -1 ignore index; the loss filters those
// positions out explicitly. The sub-word mask is shipped as
// 0/1 integers so the validation pass can force continuation
// positions to not-split on-device.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::domain::sentence::EncodedSentence;

// ─── ChunkBatch ───────────────────────────────────────────────────────────────
/// A batch of samples ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ChunkBatch<B: Backend> {
    /// Token ids — [batch, seq]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — [batch, seq]
    pub attention_mask: Tensor<B, 2, Int>,

    /// ChunkCode labels incl. -1 ignore index — [batch, seq]
    pub chunk_labels: Tensor<B, 2, Int>,

    /// 1 = word start, 0 = continuation/special/padding — [batch, seq]
    pub sub_words_mask: Tensor<B, 2, Int>,
}

// ─── ChunkBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors land on the right backend.
#[derive(Clone, Debug)]
pub struct ChunkBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ChunkBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn int_tensor(&self, flat: Vec<i32>, rows: usize, cols: usize) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([rows, cols])
    }
}

impl<B: Backend> Batcher<EncodedSentence, ChunkBatch<B>> for ChunkBatcher<B> {
    fn batch(&self, items: Vec<EncodedSentence>) -> ChunkBatch<B> {
        let batch_size = items.len();
        let seq_len    = items[0].padded_len();

        let ids_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
            .collect();

        let labels_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.chunk_labels.iter().map(|&x| x as i32))
            .collect();

        let sub_words_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.sub_words_mask.iter().map(|&m| m as i32))
            .collect();

        ChunkBatch {
            input_ids:      self.int_tensor(ids_flat, batch_size, seq_len),
            attention_mask: self.int_tensor(mask_flat, batch_size, seq_len),
            chunk_labels:   self.int_tensor(labels_flat, batch_size, seq_len),
            sub_words_mask: self.int_tensor(sub_words_flat, batch_size, seq_len),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::span::Span;

    type TestBackend = burn::backend::NdArray;

    fn sample(ids: Vec<u32>, labels: Vec<i64>) -> EncodedSentence {
        let len = ids.len();
        EncodedSentence {
            input_ids:       ids,
            attention_mask:  vec![1; len],
            sub_words_mask:  vec![true; len],
            chunk_labels:    labels,
            offset:          1,
            content_len:     len,
            reference_spans: vec![Span::new(1, 2)],
        }
    }

    #[test]
    fn test_batch_shapes_and_contents() {
        let device  = Default::default();
        let batcher = ChunkBatcher::<TestBackend>::new(device);

        let batch = batcher.batch(vec![
            sample(vec![101, 7, 8, 102], vec![-1, 1, 0, -1]),
            sample(vec![101, 9, 10, 102], vec![-1, 0, 1, -1]),
        ]);

        assert_eq!(batch.input_ids.dims(), [2, 4]);
        assert_eq!(batch.chunk_labels.dims(), [2, 4]);

        let labels: Vec<i64> = batch
            .chunk_labels
            .into_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(labels, vec![-1, 1, 0, -1, -1, 0, 1, -1]);
    }
}
