use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use folio_core::data_processor::DataProcessor;
use folio_core::traits::Embedder;
use folio_core::types::{metadata_key, Chunk, MetadataMap, StoredDocument};

use crate::flat_index::FlatL2Index;
use crate::store::{Artifacts, EmbeddingMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub files: usize,
    pub chunks: usize,
    pub dim: usize,
}

/// Offline batch job: content directory in, four artifacts out.
///
/// Any unreadable file, embedding error or write error aborts the run.
pub struct Indexer<'a> {
    embedder: &'a dyn Embedder,
    batch_size: usize,
    show_progress: bool,
}

impl<'a> Indexer<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder, batch_size: 64, show_progress: false }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(&self, content_dir: &Path, out_dir: &Path) -> Result<IndexSummary> {
        let processor = DataProcessor::new();
        let files = processor.count_files(content_dir)?;
        let chunks = processor
            .process_directory(content_dir)
            .with_context(|| format!("Failed to read content from {}", content_dir.display()))?;
        let artifacts = self.build(&chunks)?;
        artifacts
            .write(out_dir)
            .with_context(|| format!("Failed to write artifacts to {}", out_dir.display()))?;
        Ok(IndexSummary { files, chunks: chunks.len(), dim: self.embedder.dim() })
    }

    /// Embed `chunks` and assemble the artifact set in chunk-id order.
    pub fn build(&self, chunks: &[Chunk]) -> Result<Artifacts> {
        let dim = self.embedder.dim();
        let mut embeddings = EmbeddingMatrix::new(dim);
        let mut index = FlatL2Index::new(dim);
        let mut documents = Vec::with_capacity(chunks.len());
        let mut metadata = MetadataMap::new();

        let pb = self.progress_bar(chunks.len())?;
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).context("Embedding failed")?;
            anyhow::ensure!(vectors.len() == batch.len(), "embedder returned {} vectors for {} texts", vectors.len(), batch.len());
            for (chunk, vector) in batch.iter().zip(vectors.iter()) {
                embeddings.push_row(vector)?;
                let id = index.add(vector)?;
                anyhow::ensure!(id == chunk.id, "chunk {} would be stored under id {}", chunk.id, id);
                documents.push(StoredDocument { text: chunk.text.clone() });
                metadata.insert(metadata_key(chunk.id), chunk.meta());
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_with_message("embedded");
        tracing::info!("Embedded {} chunks (dim={})", chunks.len(), dim);
        Ok(Artifacts { documents, embeddings, metadata, index })
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar> {
        if !self.show_progress { return Ok(ProgressBar::hidden()); }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?.progress_chars("#>-"));
        Ok(pb)
    }
}
