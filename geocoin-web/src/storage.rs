//! `localStorage` backend for the session record.
use geocoin_game::KeyValueStore;

use crate::dom;

#[derive(Debug, thiserror::Error)]
pub enum BrowserStoreError {
    #[error("localStorage unavailable: {0}")]
    Unavailable(String),
    #[error("localStorage {op} failed: {message}")]
    Call { op: &'static str, message: String },
}

impl BrowserStoreError {
    fn call(op: &'static str, err: &wasm_bindgen::JsValue) -> Self {
        Self::Call {
            op,
            message: dom::js_error_message(err),
        }
    }
}

/// Stateless handle; every call looks up `window.localStorage` afresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

impl BrowserStore {
    fn storage() -> Result<web_sys::Storage, BrowserStoreError> {
        dom::local_storage().map_err(|err| BrowserStoreError::Unavailable(dom::js_error_message(&err)))
    }
}

impl KeyValueStore for BrowserStore {
    type Error = BrowserStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| BrowserStoreError::call("getItem", &err))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|err| BrowserStoreError::call("setItem", &err))
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        Self::storage()?
            .remove_item(key)
            .map_err(|err| BrowserStoreError::call("removeItem", &err))
    }
}
