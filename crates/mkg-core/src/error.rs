//! Error types for the graph store and checkpoint manager.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("relation endpoints are identical after normalization: {0}")]
    SelfLoop(String),
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize graph: {0}")]
    Encode(#[from] bincode::Error),
    #[error("failed to (de)serialize checkpoint metadata: {0}")]
    Meta(#[from] serde_json::Error),
}
