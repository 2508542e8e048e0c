//! Confidence-weighted multi-hop reasoning over the medical knowledge graph.

pub mod context;
pub mod reasoner;

pub use context::render_context;
pub use reasoner::{explore_paths, neighbors, related, Neighbor, Path, PathStep, Related, TWO_HOP_DECAY};
