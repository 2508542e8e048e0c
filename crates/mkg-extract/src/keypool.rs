//! API-Key Pool: round-robin credential rotation so a rate
//! limit on one key doesn't stall the whole run.

use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no API keys configured")]
    Empty,
}

/// Rotates through a fixed set of API keys, tracking which have recently
/// rate-limited. Re-materializing the client on key change is the caller's
/// job: `current_key` returning a new value is the signal to do so.
pub struct ApiKeyPool {
    keys: Vec<String>,
    current_index: usize,
    failed: HashSet<usize>,
    cooldown: Duration,
}

impl ApiKeyPool {
    pub fn new(keys: Vec<String>, cooldown_secs: u64) -> Result<Self, PoolError> {
        if keys.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self {
            keys,
            current_index: 0,
            failed: HashSet::new(),
            cooldown: Duration::from_secs(cooldown_secs),
        })
    }

    pub fn current_key(&self) -> &str {
        &self.keys[self.current_index]
    }

    /// Marks the current key as failed and advances to the next
    /// non-failed key. Returns `true` if rotation succeeded, `false` if
    /// every key is now marked failed (caller should cool down and call
    /// `reset_failed`).
    pub fn rotate(&mut self) -> bool {
        self.failed.insert(self.current_index);
        let n = self.keys.len();
        for i in 1..=n {
            let next = (self.current_index + i) % n;
            if !self.failed.contains(&next) {
                self.current_index = next;
                tracing::info!(key_index = next, "rotated to next API key");
                return true;
            }
        }
        false
    }

    pub fn reset_failed(&mut self) {
        self.failed.clear();
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
