use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub to_lower: bool,
    pub min_token_len: usize,
    pub max_token_len: usize,
    pub keep_digits: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            to_lower: true,
            min_token_len: 2,
            max_token_len: 64,
            keep_digits: true,
        }
    }
}

/// File scanner configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Admit only regular files with a (lowercased) `.txt` extension
    pub only_txt: bool,
    /// Hard cap on admitted entries; 0 means no limit
    pub max_files: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            only_txt: true,
            max_files: 0,
        }
    }
}

/// `.env`-style configuration loader.
///
/// Reads `KEY=VALUE` lines; blank lines and `#` comments are skipped; values
/// may be wrapped in single or double quotes. Keys are upper-cased. Process
/// environment variables with the same name override file values.
#[derive(Debug, Default)]
pub struct EnvConfig {
    kv: HashMap<String, String>,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load key/value pairs from a file. Returns false if the file cannot
    /// be opened; already-loaded values are kept either way.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> bool {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return false;
        };

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let mut value = value.trim();
            if value.len() >= 2 {
                let quoted = (value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\''));
                if quoted {
                    value = &value[1..value.len() - 1];
                }
            }
            self.kv.insert(key.to_uppercase(), value.to_string());
        }

        true
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.kv.insert(key.to_uppercase(), value.into());
    }

    /// Env override -> file value -> None.
    pub fn get(&self, key: &str) -> Option<String> {
        let key = key.to_uppercase();
        if let Ok(env) = std::env::var(&key) {
            return Some(env);
        }
        self.kv.get(&key).cloned()
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Unparseable values fall back to the default silently.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|s| parse_bool_token(&s))
            .unwrap_or(default)
    }
}

/// Lenient boolean parse shared by the config loader and the API layer.
pub fn parse_bool_token(token: &str) -> Option<bool> {
    match token.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
