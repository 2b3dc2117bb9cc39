// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Loads annotated sentences from .jsonl files in a directory.
//
// One sentence per line:
//
//   {"text": "the battery life is great", "spans": [[1,2],[4,4]]}
//
// `spans` are inclusive WORD-index pairs marking the annotated
// aspect/opinion phrases. Token-level indices only exist after
// encoding; annotations on disk stay in word space so they
// survive a tokenizer change.
//
// A malformed line or an unreadable file is skipped with a
// warning — one bad record must not abort a whole training run.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::sentence::SentenceRecord;
use crate::domain::span::Span;
use crate::domain::traits::SentenceSource;

/// Loads all .jsonl sentence files from a directory.
/// Implements the SentenceSource trait from Layer 3.
pub struct JsonlLoader {
    /// Path to the directory containing .jsonl files
    dir: String,
}

impl JsonlLoader {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SentenceSource for JsonlLoader {
    fn load_all(&self) -> Result<Vec<SentenceRecord>> {
        let dir = Path::new(&self.dir);

        if !dir.exists() {
            tracing::warn!(
                "Data directory '{}' does not exist — returning empty corpus",
                self.dir
            );
            return Ok(Vec::new());
        }

        let mut records = Vec::new();

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir))?
        {
            let entry = entry?;
            let path  = entry.path();

            if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
                match load_single_file(&path) {
                    Ok(mut file_records) => {
                        tracing::debug!(
                            "Loaded: {} ({} sentences)",
                            path.display(),
                            file_records.len()
                        );
                        records.append(&mut file_records);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping '{}': {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("Successfully loaded {} sentences", records.len());
        Ok(records)
    }
}

/// Parse one .jsonl file into sentence records.
fn load_single_file(path: &Path) -> Result<Vec<SentenceRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    let mut records = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<SentenceRecord>(line) {
            Ok(record) => {
                if let Some(record) = validate_record(record, path, line_no) {
                    records.push(record);
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed line {} of '{}': {}",
                    line_no + 1,
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(records)
}

/// Drop records whose annotations cannot be trusted: empty text,
/// or a span pointing outside the sentence's words.
fn validate_record(
    record:  SentenceRecord,
    path:    &Path,
    line_no: usize,
) -> Option<SentenceRecord> {
    let words = record.word_count();
    if words == 0 {
        tracing::warn!(
            "Skipping empty sentence at line {} of '{}'",
            line_no + 1,
            path.display()
        );
        return None;
    }

    let bad_span = |span: &Span| span.start > span.end || span.end >= words;
    if record.spans.iter().any(bad_span) {
        tracing::warn!(
            "Skipping sentence with out-of-range span at line {} of '{}' ({} words)",
            line_no + 1,
            path.display(),
            words
        );
        return None;
    }

    Some(record)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp_jsonl(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("aste-chunker-loader-{name}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("data.jsonl"), contents).unwrap();
        dir
    }

    #[test]
    fn test_loads_valid_lines() {
        let dir = write_temp_jsonl(
            "valid",
            r#"{"text": "the battery life is great", "spans": [[1, 2], [4, 4]]}
{"text": "solid hinge", "spans": [[0, 1]]}"#,
        );
        let loader  = JsonlLoader::new(dir.to_str().unwrap());
        let records = loader.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].spans, vec![Span::new(1, 2), Span::new(4, 4)]);
    }

    #[test]
    fn test_skips_malformed_and_out_of_range_lines() {
        let dir = write_temp_jsonl(
            "bad",
            r#"not json at all
{"text": "ok sentence", "spans": []}
{"text": "two words", "spans": [[0, 5]]}"#,
        );
        let loader  = JsonlLoader::new(dir.to_str().unwrap());
        let records = loader.load_all().unwrap();
        // Only the middle line survives
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "ok sentence");
    }

    #[test]
    fn test_missing_directory_is_empty_not_fatal() {
        let loader = JsonlLoader::new("/nonexistent/aste-chunker-test");
        assert!(loader.load_all().unwrap().is_empty());
    }
}
