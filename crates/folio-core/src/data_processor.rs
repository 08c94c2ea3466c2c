use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Splits a content directory into line chunks.
///
/// Every trimmed, non-blank line of every `.txt` file directly inside the
/// directory becomes one [`Chunk`]. Ids are assigned sequentially from 0 in
/// discovery order; line order within a file is preserved.
#[derive(Debug, Default)]
pub struct DataProcessor;

impl DataProcessor {
    pub fn new() -> Self { Self }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> {
        let files = self.list_txt_files(data_dir)?;
        if files.is_empty() {
            tracing::warn!("No .txt files found under {}", data_dir.display());
            return Ok(vec![]);
        }
        let mut all_chunks = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!("Processing file {}/{}: {}", file_index + 1, files.len(), file_path.display());
            let content = self.read_file_content(file_path)?;
            let source_file = self.source_name(file_path);
            let before = all_chunks.len();
            self.chunk_lines(&content, &source_file, &mut all_chunks);
            tracing::debug!("{} -> {} chunks", source_file, all_chunks.len() - before);
        }
        tracing::info!("Processed {} files into {} chunks", files.len(), all_chunks.len());
        Ok(all_chunks)
    }

    /// Number of `.txt` files [`process_directory`](Self::process_directory) would read.
    pub fn count_files(&self, data_dir: &Path) -> Result<usize> {
        Ok(self.list_txt_files(data_dir)?.len())
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        let bytes = fs::read(file_path).map_err(|e| Error::io(file_path, e))?;
        String::from_utf8(bytes).map_err(|e| Error::Operation(format!("{} is not valid UTF-8: {}", file_path.display(), e)))
    }

    fn source_name(&self, file_path: &Path) -> String {
        file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string())
    }

    fn chunk_lines(&self, content: &str, source_file: &str, out: &mut Vec<Chunk>) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() { continue; }
            out.push(Chunk { id: out.len(), text: line.to_string(), source_file: source_file.to_string() });
        }
    }

    fn list_txt_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::NotFound(format!("content directory {}", root.display())));
        }
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Operation(format!("cannot list {}: {}", root.display(), e)))?;
            if !entry.file_type().is_file() { continue; }
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("txt") { txt_files.push(path.to_path_buf()); }
        }
        txt_files.sort();
        Ok(txt_files)
    }
}
