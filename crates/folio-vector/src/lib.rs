//! Vector side of folio: the exact L2 index, the persisted artifact set, the
//! offline indexer and the online retrieval context.

pub mod flat_index;
pub mod indexer;
pub mod retriever;
pub mod store;

pub use flat_index::FlatL2Index;
pub use indexer::{IndexSummary, Indexer};
pub use retriever::{RetrievalContext, DEFAULT_TOP_K};
pub use store::{ArtifactPaths, Artifacts, EmbeddingMatrix};
