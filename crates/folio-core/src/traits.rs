use crate::types::Neighbor;

/// Text encoder. Implementations must be deterministic and safe to call from
/// several threads at once.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Nearest-neighbor index over a fixed set of vectors.
pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
    /// Up to `k` neighbors of `query`, ordered by ascending distance.
    fn search(&self, query: &[f32], k: usize) -> crate::error::Result<Vec<Neighbor>>;
}
