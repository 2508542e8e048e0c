//! LLM-backed extraction: turns a chunk of clinical text into validated
//! entities and relations, plus the API-Key Pool and Inverse Synthesizer that
//! surround it.
//!
//! ```text
//! chunk text -> Extractor (LlmBackend) -> ObservedEntity/ObservedRelation
//! ```

pub mod backend;
pub mod error;
pub mod extraction;
pub mod inverse;
pub mod keypool;

pub use backend::{BackendError, LlmBackend, MockBackend};
pub use error::ExtractError;
pub use extraction::{Extraction, Extractor};
pub use inverse::synthesize_inverse;
pub use keypool::{ApiKeyPool, PoolError};

#[cfg(feature = "ollama")]
pub use backend::OllamaBackend;

/// Tunable knobs for a pipeline run. Defaults mirror the reference
/// implementation's constants. The confidence floor is not among them: the
/// validator and inverse synthesizer both read the single fixed constant in
/// `mkg_core::validate::CONFIDENCE_FLOOR` directly, since the floor isn't a
/// tunable.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_retries: u32,
    pub checkpoint_every: u64,
    pub cooldown_secs: u64,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            checkpoint_every: 20,
            cooldown_secs: 60,
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}
