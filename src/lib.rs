//! # Shoal - Concurrent Full-Text Search Engine
//!
//! Shoal is a minimal full-text search engine built around a sharded
//! inverted index, an incremental multi-threaded index builder, and an
//! mtime-aware document store. The index is memory-resident and rebuilt
//! from the dataset directory on process start.
//!
//! ## Architecture
//!
//! - [`tokenizer`] - ASCII byte-class tokenization and term frequencies
//! - [`index`] - Sharded inverted index with forward map
//! - [`store`] - Path <-> doc_id identity and mtime tracking
//! - [`scan`] - Dataset directory scanner
//! - [`pool`] - Worker pool and blocking task queue
//! - [`build`] - Index builder and build orchestration
//! - [`search`] - Query facade (tokenize, search, resolve paths)
//! - [`api`] - axum HTTP surface
//! - [`metrics`] - Prometheus counters and histograms
//!
//! ## Quick Start
//!
//! ```ignore
//! use shoal::config::TokenizerConfig;
//! use shoal::index::InvertedIndex;
//! use shoal::store::DocumentStore;
//! use shoal::build::IndexBuilder;
//! use shoal::tokenizer::Tokenizer;
//! use std::sync::Arc;
//!
//! let index = Arc::new(InvertedIndex::default());
//! let store = Arc::new(DocumentStore::new());
//! let builder = IndexBuilder::new(index.clone(), store.clone(), Tokenizer::default());
//!
//! let result = builder.build_from_directory("/data/corpus", 8)?;
//! println!("indexed {} files", result.indexed_files);
//!
//! let hits = index.search(&["hello".to_string()], 20);
//! # Ok::<(), shoal::ShoalError>(())
//! ```

pub mod api;
pub mod build;
pub mod config;
pub mod error;
pub mod index;
pub mod metrics;
pub mod pool;
pub mod scan;
pub mod search;
pub mod store;
pub mod tokenizer;

pub use api::{create_router, AppState};
pub use build::{BuildCoordinator, BuildResult, IndexBuilder, StartOutcome};
pub use config::{EnvConfig, ScanConfig, TokenizerConfig};
pub use error::{Result, ShoalError};
pub use index::{IndexStats, InvertedIndex, Posting, SearchResult, TermPostings};
pub use metrics::EngineMetrics;
pub use pool::{BlockingQueue, WorkerPool};
pub use scan::{FileInfo, FileScanner};
pub use search::{QueryHit, QueryOutput, QueryService};
pub use store::{DocumentId, DocumentMeta, DocumentStore};
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
