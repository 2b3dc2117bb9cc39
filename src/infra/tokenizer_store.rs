// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Manages tokenizer persistence so training and every later
// command share one vocabulary.
//
// Two paths:
//   - A tokenizer.json already exists in the checkpoint
//     directory (hand-placed pretrained WordPiece, or built by
//     a previous run) → load it. A sub-word vocabulary is what
//     makes the continuation mask non-trivial.
//   - Nothing exists → build a word-level vocabulary from the
//     training corpus and write the tokenizer JSON directly.
//     Constructing the JSON by hand sidesteps the trainer type
//     mismatch in tokenizers 0.15 (train_from_files requires
//     Trainer::Model = ModelWrapper).
//
// Reference: Sennrich et al. (2016) BPE paper

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load existing tokenizer or build a new one from texts
    pub fn load_or_build(
        &self,
        texts:      &[String],
        vocab_size: usize,
    ) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Build a word-level vocabulary from the sentence corpus and
    /// write a valid tokenizer JSON directly.
    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Count word frequencies ────────────────────────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Most frequent words first; reserve 5 slots for specials
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let max_words = vocab_size.saturating_sub(5);
        words.truncate(max_words);

        // ── Step 2: Build vocab JSON ──────────────────────────────────────────
        // Special tokens get fixed IDs matching BERT convention
        let mut vocab = serde_json::json!({
            "[PAD]":  0,
            "[UNK]":  1,
            "[CLS]":  101,
            "[SEP]":  102,
            "[MASK]": 103,
        });

        let mut next_id = 104usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0,   "content": "[PAD]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1,   "content": "[UNK]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 101, "content": "[CLS]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 102, "content": "[SEP]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 103, "content": "[MASK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_then_encode_known_words() {
        let dir = std::env::temp_dir().join("aste-chunker-tokstore-build");
        std::fs::create_dir_all(&dir).unwrap();
        let store  = TokenizerStore::new(dir.to_str().unwrap());
        let corpus = vec!["great battery life".to_string()];

        let tokenizer = store.load_or_build(&corpus, 32).unwrap();
        let encoding  = tokenizer.encode("battery", false).unwrap();
        assert_eq!(encoding.get_ids().len(), 1);
        // A known word must not map to [UNK]
        assert_ne!(encoding.get_ids()[0], 1);
    }

    #[test]
    fn test_special_tokens_resolve() {
        let dir = std::env::temp_dir().join("aste-chunker-tokstore-specials");
        std::fs::create_dir_all(&dir).unwrap();
        let store     = TokenizerStore::new(dir.to_str().unwrap());
        let tokenizer = store
            .load_or_build(&["one two three".to_string()], 32)
            .unwrap();

        assert_eq!(tokenizer.token_to_id("[CLS]"), Some(101));
        assert_eq!(tokenizer.token_to_id("[SEP]"), Some(102));
        assert_eq!(tokenizer.token_to_id("[PAD]"), Some(0));
    }
}
