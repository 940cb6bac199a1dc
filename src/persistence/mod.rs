//! Key-value persistence
//!
//! High scores and settings are stored as JSON strings under fixed keys.
//! Storage is best-effort: a browser can have LocalStorage disabled, so
//! every caller falls back to in-memory defaults when a backend errors.

mod memory;

#[cfg(target_arch = "wasm32")]
mod local_storage;

pub use memory::{DisabledStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStore;

use thiserror::Error;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// No backing storage (disabled, private mode, not in a browser)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read key `{key}`")]
    Read { key: String },
    #[error("failed to write key `{key}`")]
    Write { key: String },
    /// Stored value exists but is not valid JSON for the expected type
    #[error("corrupt stored value: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A string key-value store
pub trait ScoreStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value; `Ok(None)` when the key is absent
pub fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
    S: ScoreStore + ?Sized,
{
    match store.read(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub fn write_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: serde::Serialize,
    S: ScoreStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.write(key, &json)
}
