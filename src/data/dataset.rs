// ============================================================
// Layer 4 — Chunk Dataset
// ============================================================
// Thin burn Dataset wrapper over encoded samples so the
// DataLoader can fetch them by index.

use burn::data::dataset::Dataset;

use crate::domain::sentence::EncodedSentence;

pub struct ChunkDataset {
    samples: Vec<EncodedSentence>,
}

impl ChunkDataset {
    pub fn new(samples: Vec<EncodedSentence>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<EncodedSentence> for ChunkDataset {
    fn get(&self, index: usize) -> Option<EncodedSentence> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
