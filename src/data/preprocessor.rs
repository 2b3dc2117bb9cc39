// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises raw sentence text before tokenisation.
//
// Review-corpus sentences arrive with the usual scraping debris:
// non-breaking spaces, zero-width characters, stray control
// bytes, doubled spaces. Word-index span annotations assume one
// plain space between words, so everything whitespace-like is
// collapsed to single spaces. The cleaning must be
// word-count-preserving — inserting or deleting a word would
// silently shift every span annotation after it.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean one sentence for tokenisation.
    ///
    /// Maps exotic whitespace and control characters to plain
    /// spaces, collapses runs of spaces, and trims the ends.
    /// Never merges or splits alphanumeric words.
    pub fn clean(&self, text: &str) -> String {
        let normalised: String = text
            .chars()
            .map(|c| match c {
                '\t' | '\n' | '\r' => ' ',
                // Non-breaking space
                '\u{00A0}' => ' ',
                // Zero-width space
                '\u{200B}' => ' ',
                // Byte order mark
                '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .collect();

        let mut out        = String::with_capacity(normalised.len());
        let mut last_space = true; // true so leading spaces vanish

        for c in normalised.chars() {
            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        out.trim_end().to_string()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("great   battery  life"), "great battery life");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  solid hinge  "), "solid hinge");
    }

    #[test]
    fn test_removes_control_and_exotic_whitespace() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("good\u{00A0}screen\x01here"), "good screen here");
    }

    #[test]
    fn test_word_count_is_preserved() {
        let p     = Preprocessor::new();
        let dirty = "\u{FEFF}the \t battery\u{200B} life  is\r\ngreat ";
        let clean = p.clean(dirty);
        assert_eq!(clean.split_whitespace().count(), 5);
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }
}
