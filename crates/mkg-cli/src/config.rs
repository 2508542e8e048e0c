//! Environment-driven configuration resolution: reads `PipelineConfig`
//! overrides and the API-Key Pool's credentials from the process
//! environment, clamping to sane bounds the way the reference CLI's
//! `llm_env_usize` helper does.

use anyhow::{anyhow, Result};
use mkg_extract::PipelineConfig;

fn env_usize(name: &str, default: usize, min: usize, max: usize) -> Result<usize> {
    match std::env::var(name) {
        Ok(v) => {
            let v = v.trim();
            if v.is_empty() {
                return Ok(default);
            }
            let parsed = v
                .parse::<usize>()
                .map_err(|_| anyhow!("invalid {name}={v:?} (expected integer)"))?;
            Ok(parsed.clamp(min, max))
        }
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(anyhow!("failed to read {name}: {e}")),
    }
}

/// Builds a `PipelineConfig` from defaults overridden by environment
/// variables: `MKG_CHECKPOINT_EVERY`, `MKG_MAX_RETRIES`, `MKG_COOLDOWN_SECS`,
/// `MKG_CHUNK_SIZE`, `MKG_CHUNK_OVERLAP`.
pub fn load_pipeline_config() -> Result<PipelineConfig> {
    let defaults = PipelineConfig::default();
    Ok(PipelineConfig {
        max_retries: env_usize("MKG_MAX_RETRIES", defaults.max_retries as usize, 1, 10)? as u32,
        checkpoint_every: env_usize(
            "MKG_CHECKPOINT_EVERY",
            defaults.checkpoint_every as usize,
            1,
            10_000,
        )? as u64,
        cooldown_secs: env_usize("MKG_COOLDOWN_SECS", defaults.cooldown_secs as usize, 1, 3600)?
            as u64,
        chunk_size: env_usize("MKG_CHUNK_SIZE", defaults.chunk_size, 16, 8192)?,
        chunk_overlap: env_usize("MKG_CHUNK_OVERLAP", defaults.chunk_overlap, 0, 4096)?,
    })
}

/// Reads `MKG_API_KEY_1` .. `MKG_API_KEY_9` in order, stopping at the first
/// gap. At least one key must be present.
pub fn load_api_keys() -> Result<Vec<String>> {
    let mut keys = Vec::new();
    for i in 1..=9 {
        match std::env::var(format!("MKG_API_KEY_{i}")) {
            Ok(v) if !v.trim().is_empty() => keys.push(v),
            _ => break,
        }
    }
    if keys.is_empty() {
        return Err(anyhow!(
            "no API keys found; set MKG_API_KEY_1 (and optionally _2.._9)"
        ));
    }
    Ok(keys)
}
