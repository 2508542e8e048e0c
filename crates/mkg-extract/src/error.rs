//! Error type for the Extractor. Almost everything this crate can fail with
//! degrades to an empty extraction rather than aborting the pipeline;
//! `ExtractError` exists for the call sites that need to tell the
//! difference (e.g. deciding whether to retry via the key pool).

use crate::backend::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("rate limited")]
    RateLimited,
    #[error("failed to parse LLM output as JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
