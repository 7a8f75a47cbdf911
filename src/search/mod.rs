//! Query facade: tokenize the query, search the index, resolve paths.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::index::InvertedIndex;
use crate::store::{DocumentId, DocumentStore};
use crate::tokenizer::Tokenizer;

/// A scored hit with its document path resolved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryHit {
    pub doc_id: DocumentId,
    pub score: f64,
    pub path: String,
}

/// The answer to one free-form text query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryOutput {
    pub terms: Vec<String>,
    pub t_ms: u64,
    pub hits: Vec<QueryHit>,
}

pub struct QueryService {
    index: Arc<InvertedIndex>,
    store: Arc<DocumentStore>,
    tokenizer: Tokenizer,
}

impl QueryService {
    pub fn new(index: Arc<InvertedIndex>, store: Arc<DocumentStore>, tokenizer: Tokenizer) -> Self {
        Self {
            index,
            store,
            tokenizer,
        }
    }

    /// Tokenize `q` with the index's tokenizer configuration and return the
    /// ranked hits. A doc whose path has vanished from the store resolves
    /// to an empty path rather than being dropped.
    pub fn search(&self, q: &str, top_k: usize) -> QueryOutput {
        let start = Instant::now();

        let terms = self.tokenizer.tokenize(q);
        let results = self.index.search(&terms, top_k);

        let hits = results
            .into_iter()
            .map(|r| QueryHit {
                doc_id: r.doc_id,
                score: r.score,
                path: self
                    .store
                    .path_for(r.doc_id)
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
            .collect();

        QueryOutput {
            terms,
            t_ms: start.elapsed().as_millis() as u64,
            hits,
        }
    }
}
