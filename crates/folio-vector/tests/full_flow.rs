use std::fs;
use std::path::Path;
use std::sync::Arc;

use folio_core::error::Error;
use folio_core::traits::Embedder;
use folio_embed::FakeEmbedder;
use folio_vector::store::{ArtifactPaths, Artifacts};
use folio_vector::{Indexer, RetrievalContext, DEFAULT_TOP_K};
use tempfile::TempDir;

const DIM: usize = 256;

fn embedder() -> Box<dyn Embedder> { Box::new(FakeEmbedder::new(DIM)) }

fn write_content(dir: &Path) {
    fs::write(
        dir.join("faq.txt"),
        "Q: What is your name? A: I am a bot.\n\nQ: Where are you based? A: Lisbon, Portugal.\n",
    )
    .unwrap();
    fs::write(
        dir.join("about.txt"),
        "I build backend services in Rust.\n   \nI like hiking and coffee.\nContact me by email.\n",
    )
    .unwrap();
    fs::write(dir.join("ignored.md"), "# not indexed\n").unwrap();
}

/// Index a small fixture corpus; returns the tempdir guard and the artifacts dir.
fn indexed() -> (TempDir, std::path::PathBuf) {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    let out = tmp.path().join("artifacts");
    fs::create_dir(&content).unwrap();
    write_content(&content);
    let fake = FakeEmbedder::new(DIM);
    let summary = Indexer::new(&fake).with_batch_size(2).run(&content, &out).expect("index");
    assert_eq!(summary.files, 2);
    assert_eq!(summary.chunks, 5);
    assert_eq!(summary.dim, DIM);
    (tmp, out)
}

#[test]
fn indexer_writes_all_four_artifacts() {
    let (_tmp, out) = indexed();
    let paths = ArtifactPaths::in_dir(&out);
    for p in [&paths.documents, &paths.embeddings, &paths.metadata, &paths.index] {
        assert!(p.exists(), "{} missing", p.display());
    }

    let metadata: serde_json::Value = serde_json::from_slice(&fs::read(&paths.metadata).unwrap()).unwrap();
    assert_eq!(metadata.as_object().unwrap().len(), 5);
    assert_eq!(metadata["0"]["source_file"], "about.txt");
    assert_eq!(metadata["4"]["source_file"], "faq.txt");

    let documents: serde_json::Value = serde_json::from_slice(&fs::read(&paths.documents).unwrap()).unwrap();
    assert_eq!(documents[2]["text"], "Contact me by email.");
}

#[test]
fn ids_agree_across_matrix_metadata_and_index() {
    let (_tmp, out) = indexed();
    let artifacts = Artifacts::read(&out).unwrap();
    let ctx = RetrievalContext::load(&out, embedder()).unwrap();
    let fake = FakeEmbedder::new(DIM);

    for (id, doc) in artifacts.documents.iter().enumerate() {
        assert_eq!(artifacts.embeddings.row(id).unwrap(), fake.embed_text(&doc.text).as_slice());
        assert_eq!(artifacts.index.vector(id), artifacts.embeddings.row(id));
        assert!(artifacts.metadata.contains_key(&id.to_string()));

        // Searching with a chunk's own text finds that chunk first, at distance 0.
        let top = &ctx.search(&doc.text, 1).unwrap()[0];
        assert_eq!(top.index, id);
        assert_eq!(top.text, doc.text);
        assert!(top.score.abs() < 1e-6);
        assert_eq!(ctx.embedding(id), artifacts.embeddings.row(id));
    }
}

#[test]
fn results_are_sorted_and_bounded() {
    let (_tmp, out) = indexed();
    let ctx = RetrievalContext::initialize(&out, embedder());
    assert!(!ctx.is_degraded());
    assert_eq!(ctx.len(), 5);

    for k in [1, 3, DEFAULT_TOP_K, 50] {
        let results = ctx.retrieve_documents("what is your name", k);
        assert_eq!(results.len(), k.min(5));
        for pair in results.windows(2) { assert!(pair[0].score <= pair[1].score); }
    }

    let all = ctx.retrieve_documents("what is your name", 50);
    let min = all.iter().map(|r| r.score).fold(f32::INFINITY, f32::min);
    assert_eq!(all[0].score, min);
    assert_eq!(all[0].text, "Q: What is your name? A: I am a bot.");
    assert_eq!(all[0].metadata.source_file.as_deref(), Some("faq.txt"));
}

#[test]
fn zero_top_k_returns_nothing() {
    let (_tmp, out) = indexed();
    let ctx = RetrievalContext::initialize(&out, embedder());
    assert!(ctx.retrieve_documents("anything", 0).is_empty());
}

#[test]
fn empty_query_still_returns_a_well_formed_list() {
    let (_tmp, out) = indexed();
    let ctx = RetrievalContext::initialize(&out, embedder());
    let results = ctx.retrieve_documents("", 3);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.index < 5 && !r.text.is_empty()));
}

#[test]
fn missing_artifacts_degrade_to_empty_results() {
    let tmp = TempDir::new().unwrap();
    let ctx = RetrievalContext::initialize(tmp.path(), embedder());
    assert!(ctx.is_degraded());
    assert_eq!(ctx.len(), 0);
    assert!(ctx.retrieve_documents("what is your name", 5).is_empty());
    assert!(matches!(ctx.search("what is your name", 5), Err(Error::IndexUnavailable)));
    assert!(RetrievalContext::load(tmp.path(), embedder()).is_err());
}

#[test]
fn corrupt_metadata_degrades() {
    let (_tmp, out) = indexed();
    fs::write(ArtifactPaths::in_dir(&out).metadata, "{ not json").unwrap();
    let ctx = RetrievalContext::initialize(&out, embedder());
    assert!(ctx.is_degraded());
    assert!(ctx.retrieve_documents("coffee", 5).is_empty());
}

#[test]
fn inconsistent_row_counts_degrade() {
    let (_tmp, out) = indexed();
    let paths = ArtifactPaths::in_dir(&out);
    fs::write(&paths.documents, r#"[{"text":"only one"}]"#).unwrap();
    assert!(matches!(Artifacts::read(&out), Err(Error::CorruptArtifact { .. })));
    assert!(RetrievalContext::initialize(&out, embedder()).is_degraded());
}

fn overflowing_header(magic: &[u8]) -> Vec<u8> {
    let mut bytes = magic.to_vec();
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes
}

#[test]
fn oversized_matrix_header_degrades() {
    let tmp = TempDir::new().unwrap();
    let paths = ArtifactPaths::in_dir(tmp.path());
    fs::write(&paths.documents, "[]").unwrap();
    fs::write(&paths.metadata, "{}").unwrap();
    fs::write(&paths.embeddings, overflowing_header(&[])).unwrap();

    assert!(matches!(Artifacts::read(tmp.path()), Err(Error::CorruptArtifact { .. })));
    assert!(RetrievalContext::initialize(tmp.path(), embedder()).is_degraded());
}

#[test]
fn oversized_index_header_degrades() {
    let (_tmp, out) = indexed();
    let mut header = b"FL2I".to_vec();
    header.extend_from_slice(&1u32.to_le_bytes());
    fs::write(ArtifactPaths::in_dir(&out).index, overflowing_header(&header)).unwrap();

    assert!(matches!(Artifacts::read(&out), Err(Error::CorruptArtifact { .. })));
    let ctx = RetrievalContext::initialize(&out, embedder());
    assert!(ctx.is_degraded());
    assert!(ctx.retrieve_documents("coffee", 5).is_empty());
}

#[test]
fn missing_metadata_entry_defaults_to_empty_record() {
    let (_tmp, out) = indexed();
    let paths = ArtifactPaths::in_dir(&out);
    fs::write(&paths.metadata, r#"{"0":{"source_file":"about.txt"}}"#).unwrap();

    let ctx = RetrievalContext::load(&out, embedder()).unwrap();
    let results = ctx.retrieve_documents("Contact me by email.", 5);
    assert_eq!(results.len(), 5);
    let contact = results.iter().find(|r| r.index == 2).unwrap();
    assert_eq!(contact.metadata.source_file, None);
    let about = results.iter().find(|r| r.index == 0).unwrap();
    assert_eq!(about.metadata.source_file.as_deref(), Some("about.txt"));
}

#[test]
fn embedder_dimension_mismatch_fails_open() {
    let (_tmp, out) = indexed();
    let ctx = RetrievalContext::initialize(&out, Box::new(FakeEmbedder::new(DIM * 2)));
    assert!(!ctx.is_degraded());
    assert!(ctx.retrieve_documents("coffee", 5).is_empty());
    assert!(matches!(ctx.search("coffee", 5), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn reloading_the_same_artifacts_is_deterministic() {
    let (_tmp, out) = indexed();
    let a = RetrievalContext::initialize(&out, embedder());
    let b = RetrievalContext::initialize(&out, embedder());
    for q in ["where are you based", "hiking", "rust backend", ""] {
        assert_eq!(a.retrieve_documents(q, 5), b.retrieve_documents(q, 5));
    }
}

#[test]
fn empty_content_directory_builds_an_empty_index() {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    fs::create_dir(&content).unwrap();
    let out = tmp.path().join("artifacts");
    let fake = FakeEmbedder::new(DIM);
    let summary = Indexer::new(&fake).run(&content, &out).unwrap();
    assert_eq!(summary.chunks, 0);

    let ctx = RetrievalContext::load(&out, embedder()).unwrap();
    assert!(!ctx.is_degraded());
    assert!(ctx.is_empty());
    assert!(ctx.search("hello", 5).unwrap().is_empty());
}

#[test]
fn unreadable_content_aborts_indexing() {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    fs::create_dir(&content).unwrap();
    fs::write(content.join("bad.txt"), [0xffu8, 0xfe, 0xfd]).unwrap();
    let out = tmp.path().join("artifacts");
    let fake = FakeEmbedder::new(DIM);

    assert!(Indexer::new(&fake).run(&content, &out).is_err());
    assert!(!ArtifactPaths::in_dir(&out).documents.exists());
}

#[test]
fn concurrent_queries_match_sequential_ones() {
    let (_tmp, out) = indexed();
    let ctx = Arc::new(RetrievalContext::initialize(&out, embedder()));
    let queries = ["what is your name", "where are you based", "coffee", "email"];
    let expected: Vec<_> = queries.iter().map(|q| ctx.retrieve_documents(q, 3)).collect();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let ctx = Arc::clone(&ctx);
            std::thread::spawn(move || {
                let q = queries[t % queries.len()];
                (t % queries.len(), ctx.retrieve_documents(q, 3))
            })
        })
        .collect();
    for h in handles {
        let (i, got) = h.join().unwrap();
        assert_eq!(got, expected[i]);
    }
}
