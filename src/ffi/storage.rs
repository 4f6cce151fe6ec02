use super::describe;
use crate::{error::StorageError, persistence::KeyValueStore};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "localStorage"], js_name = "getItem")]
    fn get_item(key: &str) -> Result<Option<String>, JsValue>;
    #[wasm_bindgen(catch, js_namespace = ["window", "localStorage"], js_name = "setItem")]
    fn set_item(key: &str, value: &str) -> Result<(), JsValue>;
    #[wasm_bindgen(catch, js_namespace = ["window", "localStorage"], js_name = "removeItem")]
    fn remove_item(key: &str) -> Result<(), JsValue>;
}

/// [`KeyValueStore`] on the page's `window.localStorage`.
///
/// Accessing `localStorage` throws in some contexts (sandboxed iframes,
/// storage disabled by the user), these are reported as
/// [`StorageError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        get_item(key).map_err(|error| StorageError::Unavailable(describe(&error)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        set_item(key, value).map_err(|error| StorageError::Write {
            key: key.to_owned(),
            reason: describe(&error),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        remove_item(key).map_err(|error| StorageError::Unavailable(describe(&error)))
    }
}
