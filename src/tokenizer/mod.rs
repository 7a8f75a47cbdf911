use std::collections::HashMap;

use crate::config::TokenizerConfig;

/// ASCII byte-class tokenizer.
///
/// A token character is an ASCII letter, or an ASCII digit when
/// `keep_digits` is set. Everything else, including every byte of a
/// multi-byte UTF-8 sequence, is a separator. A run longer than
/// `max_token_len` is truncated at the cap but keeps consuming input until
/// the next separator; tokens shorter than `min_token_len` are discarded.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    fn is_token_byte(&self, b: u8) -> bool {
        b.is_ascii_alphabetic() || (self.config.keep_digits && b.is_ascii_digit())
    }

    fn normalize(&self, b: u8) -> u8 {
        if self.config.to_lower {
            b.to_ascii_lowercase()
        } else {
            b
        }
    }

    /// Tokenize text into a vector of terms.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut cur = String::new();

        for &b in text.as_bytes() {
            if self.is_token_byte(b) {
                if cur.len() < self.config.max_token_len {
                    cur.push(self.normalize(b) as char);
                }
                // past the cap: keep consuming the run without growing
            } else {
                if !cur.is_empty() && cur.len() >= self.config.min_token_len {
                    tokens.push(std::mem::take(&mut cur));
                } else {
                    cur.clear();
                }
            }
        }

        if !cur.is_empty() && cur.len() >= self.config.min_token_len {
            tokens.push(cur);
        }

        tokens
    }

    /// Compute term frequencies for a document.
    pub fn term_frequencies(&self, text: &str) -> HashMap<String, u32> {
        let mut freq = HashMap::new();
        for token in self.tokenize(text) {
            *freq.entry(token).or_insert(0) += 1;
        }
        freq
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer(min: usize, max: usize) -> Tokenizer {
        Tokenizer::new(TokenizerConfig {
            to_lower: true,
            min_token_len: min,
            max_token_len: max,
            keep_digits: true,
        })
    }

    #[test]
    fn test_basic_tokenization() {
        let tok = Tokenizer::default();
        let tokens = tok.tokenize("Hello, World! hello");
        assert_eq!(tokens, vec!["hello", "world", "hello"]);
    }

    #[test]
    fn test_length_bounds() {
        let tok = tokenizer(2, 4);
        let tokens = tok.tokenize("a bb ccc dddd eeeee");
        assert_eq!(tokens, vec!["bb", "ccc", "dddd", "eeee"]);
    }

    #[test]
    fn test_long_run_consumes_until_separator() {
        let tok = tokenizer(2, 4);
        // One 10-char run: truncated to 4, nothing restarts mid-run.
        let tokens = tok.tokenize("abcdefghij xy");
        assert_eq!(tokens, vec!["abcd", "xy"]);
    }

    #[test]
    fn test_digits_toggle() {
        let with_digits = tokenizer(1, 64);
        assert_eq!(with_digits.tokenize("abc123 45"), vec!["abc123", "45"]);

        let no_digits = Tokenizer::new(TokenizerConfig {
            keep_digits: false,
            min_token_len: 1,
            ..TokenizerConfig::default()
        });
        assert_eq!(no_digits.tokenize("abc123def 45"), vec!["abc", "def"]);
    }

    #[test]
    fn test_non_ascii_is_separator() {
        let tok = tokenizer(1, 64);
        // Multi-byte sequences split runs; no high bytes survive.
        assert_eq!(tok.tokenize("caf\u{00e9}s na\u{00ef}ve"), vec!["caf", "s", "na", "ve"]);
    }

    #[test]
    fn test_case_folding() {
        let folding = Tokenizer::default();
        assert_eq!(folding.tokenize("MiXeD CaSe"), vec!["mixed", "case"]);

        let preserving = Tokenizer::new(TokenizerConfig {
            to_lower: false,
            ..TokenizerConfig::default()
        });
        assert_eq!(preserving.tokenize("MiXeD CaSe"), vec!["MiXeD", "CaSe"]);
    }

    #[test]
    fn test_zero_min_len_never_emits_empty_terms() {
        let tok = tokenizer(0, 64);
        let tokens = tok.tokenize("a .. b");
        assert_eq!(tokens, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_and_separator_only_input() {
        let tok = Tokenizer::default();
        assert!(tok.tokenize("").is_empty());
        assert!(tok.tokenize("  \t\n ... !!!").is_empty());
    }

    #[test]
    fn test_term_frequencies() {
        let tok = Tokenizer::default();
        let freq = tok.term_frequencies("apple apple banana");
        assert_eq!(freq.get("apple"), Some(&2));
        assert_eq!(freq.get("banana"), Some(&1));
        assert_eq!(freq.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let tok = Tokenizer::default();
        let text = "The quick brown fox jumps over the lazy dog 42 times";
        assert_eq!(tok.tokenize(text), tok.tokenize(text));
    }
}
