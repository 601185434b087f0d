//! Browser LocalStorage backend

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DomException, Storage};

use super::{KeyValueStore, StorageError};

/// Handle to `window.localStorage`
///
/// Cheap to clone; every clone talks to the same browser storage.
#[derive(Clone)]
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open LocalStorage (fails when disabled, e.g. some private modes)
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|e| StorageError::Access(format!("{e:?}")))?
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Access(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| write_error(key, &e))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Access(format!("{e:?}")))
    }
}

fn write_error(key: &str, e: &JsValue) -> StorageError {
    let name = e.dyn_ref::<DomException>().map(DomException::name);
    StorageError::from_write_failure(key, name.as_deref(), format!("{e:?}"))
}
