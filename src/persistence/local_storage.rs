//! Browser LocalStorage backend

use super::{ScoreStore, StoreError};

/// `window.localStorage`, resolved on each access
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("localStorage not accessible".to_string()))
    }
}

impl ScoreStore for LocalStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?.get_item(key).map_err(|_| StoreError::Read {
            key: key.to_string(),
        })
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StoreError::Write {
                key: key.to_string(),
            })
    }
}
