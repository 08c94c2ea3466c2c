//! The four persisted artifacts and their on-disk formats.
//!
//! | file | contents |
//! |---|---|
//! | `documents.json` | JSON array of `{"text": ..}`, position = chunk id |
//! | `embeddings.bin` | `u32` rows, `u32` dim, then row-major `f32` values |
//! | `metadata.json` | `{"<id>": {"source_file": ..}}` |
//! | `index.bin` | serialized [`FlatL2Index`] |
//!
//! Every file is written to a temporary sibling and renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use folio_core::error::{Error, Result};
use folio_core::traits::VectorIndex;
use folio_core::types::{metadata_key, ChunkId, MetadataMap, StoredDocument};

use crate::flat_index::{payload_size, to_u32, FlatL2Index};

pub const DOCUMENTS_FILE: &str = "documents.json";
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";
pub const METADATA_FILE: &str = "metadata.json";
pub const INDEX_FILE: &str = "index.bin";

/// Header size: 4 bytes row count + 4 bytes dimension.
const MATRIX_HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub documents: PathBuf,
    pub embeddings: PathBuf,
    pub metadata: PathBuf,
    pub index: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            documents: dir.join(DOCUMENTS_FILE),
            embeddings: dir.join(EMBEDDINGS_FILE),
            metadata: dir.join(METADATA_FILE),
            index: dir.join(INDEX_FILE),
        }
    }
}

/// Row-major embedding matrix, row `i` = embedding of chunk `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn new(dim: usize) -> Self { Self { dim, data: Vec::new() } }

    pub fn push_row(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: row.len() });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn rows(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn row(&self, id: ChunkId) -> Option<&[f32]> {
        if self.dim == 0 || id >= self.rows() { return None; }
        Some(&self.data[id * self.dim..(id + 1) * self.dim])
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut bytes = Vec::with_capacity(MATRIX_HEADER_SIZE + self.data.len() * 4);
        bytes.extend_from_slice(&to_u32(self.rows(), path)?.to_le_bytes());
        bytes.extend_from_slice(&to_u32(self.dim, path)?.to_le_bytes());
        bytes.extend_from_slice(bytemuck::cast_slice(&self.data));
        write_atomic(path, &bytes)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = read_bytes(path)?;
        if bytes.len() < MATRIX_HEADER_SIZE {
            return Err(Error::corrupt(path, "truncated header"));
        }
        let rows = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let dim = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let expected = payload_size(path, MATRIX_HEADER_SIZE, rows, dim)?;
        if bytes.len() != expected {
            return Err(Error::corrupt(path, format!("expected {expected} bytes for {rows}x{dim}, found {}", bytes.len())));
        }
        let data: Vec<f32> = bytemuck::pod_collect_to_vec(&bytes[MATRIX_HEADER_SIZE..]);
        Ok(Self { dim, data })
    }
}

/// Everything the indexer produces and the retriever loads.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub documents: Vec<StoredDocument>,
    pub embeddings: EmbeddingMatrix,
    pub metadata: MetadataMap,
    pub index: FlatL2Index,
}

impl Artifacts {
    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn write(&self, dir: &Path) -> Result<ArtifactPaths> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        let paths = ArtifactPaths::in_dir(dir);
        write_json(&paths.documents, &self.documents)?;
        self.embeddings.write_to(&paths.embeddings)?;
        write_json(&paths.metadata, &self.metadata)?;
        self.index.write_to(&paths.index)?;
        tracing::info!("Wrote {} chunks to {}", self.len(), dir.display());
        Ok(paths)
    }

    /// Load and cross-check all four artifacts.
    pub fn read(dir: &Path) -> Result<Self> {
        let paths = ArtifactPaths::in_dir(dir);
        let documents: Vec<StoredDocument> = read_json(&paths.documents)?;
        let embeddings = EmbeddingMatrix::read_from(&paths.embeddings)?;
        let metadata: MetadataMap = read_json(&paths.metadata)?;
        let index = FlatL2Index::read_from(&paths.index)?;
        let artifacts = Self { documents, embeddings, metadata, index };
        artifacts.validate(&paths)?;
        Ok(artifacts)
    }

    fn validate(&self, paths: &ArtifactPaths) -> Result<()> {
        let n = self.documents.len();
        if self.embeddings.rows() != n {
            return Err(Error::corrupt(&paths.embeddings, format!("{} rows for {} documents", self.embeddings.rows(), n)));
        }
        if self.index.len() != n {
            return Err(Error::corrupt(&paths.index, format!("{} vectors for {} documents", self.index.len(), n)));
        }
        if n > 0 && self.index.dim() != self.embeddings.dim() {
            return Err(Error::DimensionMismatch { expected: self.embeddings.dim(), actual: self.index.dim() });
        }
        let missing = (0..n).filter(|id| !self.metadata.contains_key(&metadata_key(*id))).count();
        if missing > 0 {
            tracing::warn!("{} chunks have no metadata entry in {}", missing, paths.metadata.display());
        }
        Ok(())
    }
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&tmp, bytes).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| Error::json(path, e))?;
    write_atomic(path, &bytes)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = read_bytes(path)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::json(path, e))
}
