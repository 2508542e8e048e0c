//! Checkpoint Manager: atomic-ish save/load of the opaque
//! serialized graph plus a JSON metadata sidecar carrying a configuration
//! fingerprint.

use crate::error::CheckpointError;
use crate::graph::GraphStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub last_chunk_id: i64,
    pub total_chunks: i64,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub timestamp: String,
    pub fingerprint: String,
}

/// Short hash over `(document_path, chunk_size, llm_model_name)`. A change
/// in any of these signals a checkpoint produced under an incompatible
/// configuration.
pub fn fingerprint(document_path: &str, chunk_size: usize, llm_model_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_path.as_bytes());
    hasher.update(chunk_size.to_le_bytes());
    hasher.update(llm_model_name.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

pub struct CheckpointManager {
    graph_path: PathBuf,
    meta_path: PathBuf,
}

impl CheckpointManager {
    pub fn new(checkpoint_dir: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let dir = checkpoint_dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| CheckpointError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            graph_path: dir.join("graph.bin"),
            meta_path: dir.join("checkpoint_meta.json"),
        })
    }

    /// Returns `(graph_or_none, last_chunk_id_or_none)`. Missing files yield
    /// `None` rather than an error.
    pub fn load(&self) -> Result<(Option<GraphStore>, Option<i64>), CheckpointError> {
        let graph = if self.graph_path.exists() {
            let bytes = std::fs::read(&self.graph_path).map_err(|source| CheckpointError::Io {
                path: self.graph_path.clone(),
                source,
            })?;
            Some(bincode::deserialize::<GraphStore>(&bytes)?)
        } else {
            None
        };

        let last_chunk_id = if self.meta_path.exists() {
            let contents =
                std::fs::read_to_string(&self.meta_path).map_err(|source| CheckpointError::Io {
                    path: self.meta_path.clone(),
                    source,
                })?;
            let meta: CheckpointMeta = serde_json::from_str(&contents)?;
            Some(meta.last_chunk_id)
        } else {
            None
        };

        if let Some(g) = &graph {
            tracing::info!(num_nodes = g.num_nodes(), num_edges = g.num_edges(), "loaded checkpoint graph");
        }

        Ok((graph, last_chunk_id))
    }

    /// Checks a loaded checkpoint's fingerprint against the configuration
    /// driving the current run. A mismatch only warrants a warning; the
    /// operator decides whether to resume anyway.
    pub fn check_fingerprint(&self, expected: &str) -> Result<(), CheckpointError> {
        if !self.meta_path.exists() {
            return Ok(());
        }
        let contents =
            std::fs::read_to_string(&self.meta_path).map_err(|source| CheckpointError::Io {
                path: self.meta_path.clone(),
                source,
            })?;
        let meta: CheckpointMeta = serde_json::from_str(&contents)?;
        if meta.fingerprint != expected {
            tracing::warn!(
                found = %meta.fingerprint,
                expected = %expected,
                "checkpoint fingerprint mismatch; resuming anyway"
            );
        }
        Ok(())
    }

    /// Writes the graph blob, then the metadata sidecar, so a torn write
    /// during the blob save never leaves a sidecar pointing at corrupt data.
    pub fn save(
        &self,
        graph: &GraphStore,
        chunk_id: i64,
        total_chunks: i64,
        fingerprint: &str,
    ) -> Result<(), CheckpointError> {
        let bytes = bincode::serialize(graph)?;
        std::fs::write(&self.graph_path, &bytes).map_err(|source| CheckpointError::Io {
            path: self.graph_path.clone(),
            source,
        })?;

        let meta = CheckpointMeta {
            last_chunk_id: chunk_id,
            total_chunks,
            num_nodes: graph.num_nodes(),
            num_edges: graph.num_edges(),
            timestamp: Utc::now().to_rfc3339(),
            fingerprint: fingerprint.to_string(),
        };
        let json = serde_json::to_string_pretty(&meta)?;
        std::fs::write(&self.meta_path, json).map_err(|source| CheckpointError::Io {
            path: self.meta_path.clone(),
            source,
        })?;

        tracing::info!(
            chunk_id,
            num_nodes = graph.num_nodes(),
            num_edges = graph.num_edges(),
            "checkpoint saved"
        );
        Ok(())
    }
}
