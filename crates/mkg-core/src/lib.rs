//! Data model, text normalization, validation, the graph store, and
//! checkpointing for the medical knowledge graph.
//!
//! ```text
//! PDF chunks -> Extractor -> (Validator, Inverse Synthesizer) -> Graph Store <- Checkpoint Manager
//! ```

pub mod checkpoint;
pub mod error;
pub mod graph;
pub mod normalize;
pub mod types;
pub mod validate;

pub use checkpoint::{fingerprint, CheckpointManager, CheckpointMeta};
pub use error::{CheckpointError, GraphError};
pub use graph::GraphStore;
pub use normalize::normalize;
pub use types::{Edge, EntityType, Node, ObservedEntity, ObservedRelation, RelationType};
pub use validate::{entity_ok, relation_ok};
