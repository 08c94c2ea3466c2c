use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt artifact {path}: {reason}")]
    CorruptArtifact { path: String, reason: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Search index unavailable")]
    IndexUnavailable,

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Error::NotFound(path.display().to_string());
        }
        Error::Io { path: path.display().to_string(), source }
    }

    pub fn json(path: &std::path::Path, source: serde_json::Error) -> Self {
        Error::Json { path: path.display().to_string(), source }
    }

    pub fn corrupt(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Error::CorruptArtifact { path: path.display().to_string(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
