use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{de::DeserializeOwned, Serialize};

/// Client-side query cache owned by whoever drives the UI and handed to each
/// [`super::TreesClient`]. Entries are keyed by endpoint path and hold the last
/// decoded response body. There is no expiry: an entry lives until a mutation
/// invalidates it.
///
/// Every key also carries a generation that [`QueryCache::invalidate`] bumps.
/// A fetch records the generation before going to the network and stores its
/// result with [`QueryCache::store_if_current`], so a response that raced a
/// mutation is dropped instead of resurrecting pre-mutation data.
#[derive(Debug, Default)]
pub struct QueryCache {
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, serde_json::Value>,
    generations: HashMap<String, u64>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let value = state.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                log::warn!("Discarding cache entry {} of unexpected shape: {}", key, err);
                None
            }
        }
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T) {
        let Some(value) = encode(key, value) else {
            return;
        };
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .insert(key.to_string(), value);
    }

    /// Generation of `key` right now. Pair with [`QueryCache::store_if_current`].
    pub fn generation(&self, key: &str) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generations
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Stores `value` only if `key` has not been invalidated since
    /// `generation` was read. Returns whether the value was kept.
    pub fn store_if_current<T: Serialize>(&self, key: &str, generation: u64, value: &T) -> bool {
        let Some(value) = encode(key, value) else {
            return false;
        };
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let current = state.generations.get(key).copied().unwrap_or(0);
        if current != generation {
            log::debug!(
                "Dropping stale response for {} (generation {} != {})",
                key,
                generation,
                current
            );
            return false;
        }
        state.entries.insert(key.to_string(), value);
        true
    }

    /// Drops the entry so the next read goes back to the server, and retires
    /// any fetch of `key` still in flight. Returns whether anything was cached
    /// under `key`.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state.generations.entry(key.to_string()).or_insert(0) += 1;
        let removed = state.entries.remove(key).is_some();
        if removed {
            log::debug!("♻️ Invalidated cache entry {}", key);
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .contains_key(key)
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Option<serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Not caching {}: {}", key, err);
            None
        }
    }
}
