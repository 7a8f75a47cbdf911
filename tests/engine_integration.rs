//! End-to-end engine scenarios: build a small corpus, query it, update it.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use shoal::store::DocumentStore;
use shoal::{
    IndexBuilder, InvertedIndex, QueryService, Tokenizer, TokenizerConfig,
};
use tempfile::TempDir;

struct Engine {
    index: Arc<InvertedIndex>,
    store: Arc<DocumentStore>,
    builder: IndexBuilder,
    query: QueryService,
}

fn engine() -> Engine {
    let index = Arc::new(InvertedIndex::default());
    let store = Arc::new(DocumentStore::new());
    let builder = IndexBuilder::new(
        Arc::clone(&index),
        Arc::clone(&store),
        Tokenizer::new(TokenizerConfig::default()),
    );
    let query = QueryService::new(
        Arc::clone(&index),
        Arc::clone(&store),
        Tokenizer::new(TokenizerConfig::default()),
    );
    Engine {
        index,
        store,
        builder,
        query,
    }
}

#[test]
fn three_file_scenario() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), "Hello world hello").unwrap();
    fs::write(tmp.path().join("b.txt"), "world of warcraft").unwrap();
    fs::write(tmp.path().join("c.txt"), "foo bar").unwrap();

    let eng = engine();
    // Single builder thread: ids follow the scanner's lexicographic order,
    // which the doc_id tie-break below depends on.
    eng.builder.build_from_directory(tmp.path(), 1).unwrap();

    let a = eng.store.doc_id_for(&tmp.path().join("a.txt")).unwrap();
    let b = eng.store.doc_id_for(&tmp.path().join("b.txt")).unwrap();
    assert!(a < b);

    let hello = eng.query.search("hello", 10);
    assert_eq!(hello.hits.len(), 1);
    assert_eq!(hello.hits[0].doc_id, a);
    assert_eq!(hello.hits[0].score, 2.0);

    let world = eng.query.search("world", 10);
    assert_eq!(
        world.hits.iter().map(|h| (h.doc_id, h.score)).collect::<Vec<_>>(),
        vec![(a, 1.0), (b, 1.0)]
    );

    let both = eng.query.search("hello world", 10);
    assert_eq!(
        both.hits.iter().map(|h| (h.doc_id, h.score)).collect::<Vec<_>>(),
        vec![(a, 3.0), (b, 1.0)]
    );
}

#[test]
fn incremental_update_reindexes_only_touched_files() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.txt");
    fs::write(&path, "stale words").unwrap();
    fs::write(tmp.path().join("b.txt"), "untouched").unwrap();

    let eng = engine();
    eng.builder.build_from_directory(tmp.path(), 2).unwrap();

    let unchanged = eng.builder.update_from_directory(tmp.path(), 2).unwrap();
    assert_eq!(unchanged.skipped_files, 2);
    assert_eq!(unchanged.indexed_files, 0);

    fs::write(&path, "fresh content").unwrap();
    let f = fs::File::open(&path).unwrap();
    f.set_modified(SystemTime::now() + Duration::from_secs(10)).unwrap();

    let updated = eng.builder.update_from_directory(tmp.path(), 2).unwrap();
    assert_eq!(updated.indexed_files, 1);
    assert_eq!(updated.skipped_files, 1);

    assert!(eng.query.search("stale", 10).hits.is_empty());
    assert_eq!(eng.query.search("fresh", 10).hits.len(), 1);
    assert_eq!(eng.query.search("untouched", 10).hits.len(), 1);
}

#[test]
fn every_hit_has_a_matching_forward_term() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), "alpha beta gamma").unwrap();
    fs::write(tmp.path().join("b.txt"), "beta delta").unwrap();

    let eng = engine();
    eng.builder.build_from_directory(tmp.path(), 2).unwrap();

    let out = eng.query.search("beta gamma unknownterm", 0);
    assert!(!out.hits.is_empty());
    for hit in &out.hits {
        let forward = eng.index.forward_entry(hit.doc_id).unwrap();
        assert!(
            out.terms
                .iter()
                .any(|t| forward.iter().any(|(ft, _)| ft == t)),
            "hit {} shares no term with the query",
            hit.doc_id
        );
    }
}

#[test]
fn stats_documents_reads_forward_map_not_store() {
    let eng = engine();

    // Registering a path without upserting mimics the window inside a build
    // task between get_or_create and upsert_document.
    let (_, created) = eng
        .store
        .get_or_create(std::path::Path::new("/pending.txt"), SystemTime::now());
    assert!(created);

    assert_eq!(eng.store.len(), 1);
    assert_eq!(eng.index.stats().documents, 0);
}

#[test]
fn empty_query_returns_no_hits() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.txt"), "content here").unwrap();

    let eng = engine();
    eng.builder.build_from_directory(tmp.path(), 1).unwrap();

    let out = eng.query.search("", 10);
    assert!(out.terms.is_empty());
    assert!(out.hits.is_empty());

    // Separator-only queries tokenize to nothing as well.
    let out = eng.query.search("!!! ... \u{00e9}", 10);
    assert!(out.hits.is_empty());
}
