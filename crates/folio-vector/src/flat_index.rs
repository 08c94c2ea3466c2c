//! Exact nearest-neighbor index under the L2 metric.
//!
//! Distances are squared Euclidean distances, the convention of flat L2
//! indexes: ordering is identical to true Euclidean distance and no square
//! root is taken per candidate.

use std::path::Path;

use folio_core::error::{Error, Result};
use folio_core::traits::VectorIndex;
use folio_core::types::{ChunkId, Neighbor};

use crate::store::{read_bytes, write_atomic};

const MAGIC: &[u8; 4] = b"FL2I";
const VERSION: u32 = 1;
/// magic + version + dim + count
const HEADER_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self { Self { dim, data: Vec::new() } }

    /// Append a vector; its id is the number of vectors inserted before it.
    pub fn add(&mut self, vector: &[f32]) -> Result<ChunkId> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
        }
        let id = self.len();
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    pub fn vector(&self, id: ChunkId) -> Option<&[f32]> {
        if self.dim == 0 || id >= self.len() { return None; }
        Some(&self.data[id * self.dim..(id + 1) * self.dim])
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&to_u32(self.dim, path)?.to_le_bytes());
        bytes.extend_from_slice(&to_u32(self.len(), path)?.to_le_bytes());
        bytes.extend_from_slice(bytemuck::cast_slice(&self.data));
        write_atomic(path, &bytes)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = read_bytes(path)?;
        if bytes.len() < HEADER_SIZE || &bytes[0..4] != MAGIC {
            return Err(Error::corrupt(path, "not a flat L2 index"));
        }
        let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize;
        let version = word(4);
        if version != VERSION as usize {
            return Err(Error::corrupt(path, format!("unsupported index version {version}")));
        }
        let dim = word(8);
        let count = word(12);
        let expected = payload_size(path, HEADER_SIZE, count, dim)?;
        if bytes.len() != expected {
            return Err(Error::corrupt(path, format!("expected {expected} bytes for {count}x{dim}, found {}", bytes.len())));
        }
        let data: Vec<f32> = bytemuck::pod_collect_to_vec(&bytes[HEADER_SIZE..]);
        Ok(Self { dim, data })
    }
}

impl VectorIndex for FlatL2Index {
    fn dim(&self) -> usize { self.dim }

    fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if k == 0 || self.is_empty() { return Ok(Vec::new()); }

        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, row)| Neighbor { id, distance: squared_l2(query, row) })
            .collect();
        // Ties resolve to the lower id.
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        scored.truncate(k);
        Ok(scored)
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Byte length of a `rows x dim` f32 file with a `header`-byte prefix.
/// Header fields come from disk, so an overflowing size means corruption.
pub(crate) fn payload_size(path: &Path, header: usize, rows: usize, dim: usize) -> Result<usize> {
    rows.checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(header))
        .ok_or_else(|| Error::corrupt(path, format!("header claims an impossible {rows}x{dim} payload")))
}

pub(crate) fn to_u32(n: usize, path: &Path) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::Operation(format!("{} too large to store in {}", n, path.display())))
}
