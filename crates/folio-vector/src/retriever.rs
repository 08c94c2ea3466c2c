use std::path::Path;

use folio_core::error::{Error, Result};
use folio_core::traits::{Embedder, VectorIndex};
use folio_core::types::{metadata_key, ChunkId, RetrievedResult};

use crate::store::Artifacts;

pub const DEFAULT_TOP_K: usize = 5;

/// Process-wide retrieval state: the embedder plus the loaded artifacts.
///
/// Built once at startup and shared by reference; it is never mutated after
/// construction. A context without artifacts is *degraded*: every query on
/// it returns no results.
pub struct RetrievalContext {
    embedder: Box<dyn Embedder>,
    corpus: Option<Artifacts>,
}

impl RetrievalContext {
    /// Load the artifacts in `dir`, degrading instead of failing when any of
    /// them is missing or inconsistent.
    pub fn initialize(dir: &Path, embedder: Box<dyn Embedder>) -> Self {
        match Artifacts::read(dir) {
            Ok(artifacts) => {
                tracing::info!("Loaded {} chunks from {}", artifacts.len(), dir.display());
                Self::from_artifacts(artifacts, embedder)
            }
            Err(e) => {
                tracing::error!("Failed to load retrieval artifacts from {}: {}; serving without an index", dir.display(), e);
                Self::degraded(embedder)
            }
        }
    }

    /// Strict variant of [`initialize`](Self::initialize).
    pub fn load(dir: &Path, embedder: Box<dyn Embedder>) -> Result<Self> {
        Ok(Self::from_artifacts(Artifacts::read(dir)?, embedder))
    }

    pub fn from_artifacts(artifacts: Artifacts, embedder: Box<dyn Embedder>) -> Self {
        if !artifacts.is_empty() && artifacts.index.dim() != embedder.dim() {
            tracing::warn!(
                "Index dimension {} differs from embedder dimension {}; queries will return nothing",
                artifacts.index.dim(),
                embedder.dim()
            );
        }
        Self { embedder, corpus: Some(artifacts) }
    }

    pub fn degraded(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, corpus: None }
    }

    pub fn is_degraded(&self) -> bool { self.corpus.is_none() }

    /// Number of indexed chunks (0 when degraded).
    pub fn len(&self) -> usize { self.corpus.as_ref().map_or(0, Artifacts::len) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn embedder(&self) -> &dyn Embedder { self.embedder.as_ref() }

    pub fn embedding(&self, id: ChunkId) -> Option<&[f32]> {
        self.corpus.as_ref().and_then(|c| c.embeddings.row(id))
    }

    /// Nearest chunks to `query`, or the reason the search could not run.
    ///
    /// A degraded context yields [`Error::IndexUnavailable`], which callers
    /// can tell apart from an empty match list.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedResult>> {
        let corpus = self.corpus.as_ref().ok_or(Error::IndexUnavailable)?;
        if top_k == 0 || corpus.index.is_empty() { return Ok(Vec::new()); }

        let query_vec = self
            .embedder
            .embed(query)
            .map_err(|e| Error::Operation(format!("query embedding failed: {e:#}")))?;
        let neighbors = corpus.index.search(&query_vec, top_k)?;

        neighbors
            .into_iter()
            .map(|n| {
                let doc = corpus
                    .documents
                    .get(n.id)
                    .ok_or_else(|| Error::Operation(format!("index returned unknown chunk id {}", n.id)))?;
                Ok(RetrievedResult {
                    index: n.id,
                    text: doc.text.clone(),
                    score: n.distance,
                    metadata: corpus.metadata.get(&metadata_key(n.id)).cloned().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Fail-open retrieval: any failure is logged and reported as no results.
    pub fn retrieve_documents(&self, query: &str, top_k: usize) -> Vec<RetrievedResult> {
        tracing::debug!("Query: {:?} (top_k={})", query, top_k);
        match self.search(query, top_k) {
            Ok(results) => {
                tracing::debug!("Retrieved {} results", results.len());
                results
            }
            Err(Error::IndexUnavailable) => {
                tracing::warn!("Retrieval requested but no index is loaded");
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Failed to retrieve documents: {}", e);
                Vec::new()
            }
        }
    }
}
