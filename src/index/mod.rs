//! Sharded inverted index
//!
//! Terms are partitioned over `S` shards by a stable hash; each shard holds
//! its term -> postings map behind its own reader-writer lock, so writers to
//! distinct shards never contend. A separate forward map (doc_id -> terms)
//! makes document replacement and removal exact without scanning shards.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::store::DocumentId;

pub const DEFAULT_SHARDS: usize = 64;

/// A (doc_id, term-frequency) pair in a term's posting list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocumentId,
    pub freq: u32,
}

/// A scored hit returned by [`InvertedIndex::search`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: DocumentId,
    pub score: f64,
}

/// One term and its full posting list, as captured by `snapshot`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermPostings {
    pub term: String,
    pub postings: Vec<Posting>,
}

/// Index-wide counters. The three numbers are read shard by shard and may
/// reflect slightly different instants under concurrent mutation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub postings: usize,
}

/// Stable FNV-1a 64-bit hash, deterministic across processes and Rust
/// versions (unlike `DefaultHasher`). Parts are fed sequentially with a
/// zero-byte separator between them.
#[must_use]
pub fn stable_hash(parts: &[&[u8]]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            // 0x00 separator byte: XOR with zero is identity
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        for &byte in *part {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

struct Shard {
    map: RwLock<HashMap<String, Vec<Posting>>>,
}

/// Many-writer/many-reader inverted index with atomic per-document
/// replacement.
///
/// `upsert_document` has remove-then-insert semantics: between the two
/// phases a concurrent search may observe the document absent, but once the
/// call returns no term carries a duplicate posting for that doc_id.
pub struct InvertedIndex {
    shards: Vec<Shard>,
    forward: RwLock<HashMap<DocumentId, Vec<(String, u32)>>>,
}

impl InvertedIndex {
    /// Create an index with `shards` partitions; 0 is coerced to 1.
    pub fn new(shards: usize) -> Self {
        let count = shards.max(1);
        let shards = (0..count)
            .map(|_| Shard {
                map: RwLock::new(HashMap::new()),
            })
            .collect();
        Self {
            shards,
            forward: RwLock::new(HashMap::new()),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, term: &str) -> usize {
        (stable_hash(&[term.as_bytes()]) % self.shards.len() as u64) as usize
    }

    /// Insert or replace a document. Entries with zero frequency are
    /// dropped; the rest become the document's forward entry and postings.
    pub fn upsert_document(&self, doc_id: DocumentId, term_freq: &HashMap<String, u32>) {
        self.remove_document(doc_id);

        let mut forward_terms: Vec<(String, u32)> = term_freq
            .iter()
            .filter(|(_, &freq)| freq >= 1)
            .map(|(term, &freq)| (term.clone(), freq))
            .collect();
        forward_terms.shrink_to_fit();

        {
            let mut forward = self.forward.write();
            forward.insert(doc_id, forward_terms.clone());
        }

        let mut by_shard: HashMap<usize, Vec<(String, u32)>> = HashMap::new();
        for (term, freq) in forward_terms {
            by_shard.entry(self.shard_for(&term)).or_default().push((term, freq));
        }

        for (sid, updates) in by_shard {
            let mut map = self.shards[sid].map.write();
            for (term, freq) in updates {
                map.entry(term).or_default().push(Posting { doc_id, freq });
            }
        }
    }

    /// Remove a document; idempotent, no-op for unknown ids.
    pub fn remove_document(&self, doc_id: DocumentId) {
        // Copy the forward terms and release the lock before touching any
        // shard: no thread may hold a shard lock while requesting the
        // forward lock.
        let terms: Vec<(String, u32)> = {
            let forward = self.forward.read();
            forward.get(&doc_id).cloned().unwrap_or_default()
        };

        if terms.is_empty() {
            self.forward.write().remove(&doc_id);
            return;
        }

        let mut by_shard: HashMap<usize, Vec<String>> = HashMap::new();
        for (term, _) in terms {
            by_shard.entry(self.shard_for(&term)).or_default().push(term);
        }

        for (sid, term_list) in by_shard {
            let mut map = self.shards[sid].map.write();
            for term in term_list {
                if let Some(postings) = map.get_mut(&term) {
                    postings.retain(|p| p.doc_id != doc_id);
                    if postings.is_empty() {
                        map.remove(&term);
                    }
                }
            }
        }

        self.forward.write().remove(&doc_id);
    }

    /// Score documents by summed term frequency over the query terms.
    ///
    /// Repeated query terms are not deduplicated; each occurrence adds its
    /// postings again. Results sort by score descending, doc_id ascending;
    /// `top_k == 0` means no limit.
    pub fn search(&self, query_terms: &[String], top_k: usize) -> Vec<SearchResult> {
        let mut scores: HashMap<DocumentId, f64> = HashMap::new();

        for term in query_terms {
            if term.is_empty() {
                continue;
            }
            let map = self.shards[self.shard_for(term)].map.read();
            if let Some(postings) = map.get(term) {
                for p in postings {
                    *scores.entry(p.doc_id).or_insert(0.0) += p.freq as f64;
                }
            }
        }

        let mut results: Vec<SearchResult> = scores
            .into_iter()
            .map(|(doc_id, score)| SearchResult { doc_id, score })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.doc_id.cmp(&b.doc_id))
        });

        if top_k > 0 && results.len() > top_k {
            results.truncate(top_k);
        }
        results
    }

    /// Copy out every (term, postings) pair. Order across shards is
    /// unspecified.
    pub fn snapshot(&self) -> Vec<TermPostings> {
        let mut out = Vec::new();
        for shard in &self.shards {
            let map = shard.map.read();
            for (term, postings) in map.iter() {
                out.push(TermPostings {
                    term: term.clone(),
                    postings: postings.clone(),
                });
            }
        }
        out
    }

    pub fn stats(&self) -> IndexStats {
        let documents = self.forward.read().len();

        let mut terms = 0;
        let mut postings = 0;
        for shard in &self.shards {
            let map = shard.map.read();
            terms += map.len();
            postings += map.values().map(Vec::len).sum::<usize>();
        }

        IndexStats {
            documents,
            terms,
            postings,
        }
    }

    /// Forward entry for a document, if present.
    pub fn forward_entry(&self, doc_id: DocumentId) -> Option<Vec<(String, u32)>> {
        self.forward.read().get(&doc_id).cloned()
    }
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}
