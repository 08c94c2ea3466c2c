//! Domain types shared by the indexer, the retriever and the answer selector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dense, zero-based chunk identifier assigned in discovery order.
///
/// It is the join key between the documents store, the embedding matrix,
/// the metadata map and the search index.
pub type ChunkId = usize;

/// Metadata map keyed by the decimal string form of a [`ChunkId`].
pub type MetadataMap = BTreeMap<String, ChunkMeta>;

/// One retrievable unit of text: a trimmed, non-blank line of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source_file: String,
}

impl Chunk {
    pub fn meta(&self) -> ChunkMeta {
        ChunkMeta { source_file: Some(self.source_file.clone()) }
    }
}

/// Record persisted in the documents store; its position is the chunk id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub text: String,
}

/// Per-chunk provenance. An absent entry is represented by the default
/// (empty) record, which serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

/// A search index hit. `distance` is whatever the index reports;
/// lower is always better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: ChunkId,
    pub distance: f32,
}

/// A chunk returned for a query, nearest first.
///
/// `score` is the raw distance, not a similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedResult {
    pub index: ChunkId,
    pub text: String,
    pub score: f32,
    pub metadata: ChunkMeta,
}

/// Stringified chunk id used as the metadata map key.
pub fn metadata_key(id: ChunkId) -> String {
    id.to_string()
}
