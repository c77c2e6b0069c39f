//! `chrome.storage` binding for the snippet dictionary.
//!
//! The snippet list lives under one key of one storage area (`sync` by
//! default). It is read once at startup, then every `onChanged`
//! notification for that key replaces the mirror wholesale.

use std::collections::HashMap;

use js_sys::{Array, Function, Promise, Reflect};
use smol_str::SmolStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use weaver_snippets_core::{DictionaryMirror, ExpanderConfig, Snippet, StorageChange};

use crate::js_error_message;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("chrome.storage is unavailable: {0}")]
    Unavailable(String),

    #[error("storage call failed: {0}")]
    Js(String),

    #[error("malformed snippet data: {0}")]
    Deserialize(#[from] serde_wasm_bindgen::Error),
}

impl From<JsValue> for StoreError {
    fn from(value: JsValue) -> Self {
        StoreError::Js(js_error_message(value))
    }
}

/// Handle to the snippet list in extension storage.
#[derive(Clone, Debug)]
pub struct ChromeStorage {
    area: SmolStr,
    key: SmolStr,
}

impl ChromeStorage {
    pub fn new(area: impl Into<SmolStr>, key: impl Into<SmolStr>) -> Self {
        Self {
            area: area.into(),
            key: key.into(),
        }
    }

    pub fn from_config(config: &ExpanderConfig) -> Self {
        Self::new(config.storage_area.clone(), config.storage_key.clone())
    }

    /// `globalThis.chrome.storage`
    fn storage() -> Result<JsValue, StoreError> {
        let chrome = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome"))?;
        if chrome.is_undefined() {
            return Err(StoreError::Unavailable("no `chrome` global".into()));
        }
        let storage = Reflect::get(&chrome, &JsValue::from_str("storage"))?;
        if storage.is_undefined() {
            return Err(StoreError::Unavailable("no `chrome.storage`".into()));
        }
        Ok(storage)
    }

    /// Read the current snippet list. A missing key yields an empty list.
    pub async fn load(&self) -> Result<Vec<Snippet>, StoreError> {
        let area = Reflect::get(&Self::storage()?, &JsValue::from_str(&self.area))?;
        if area.is_undefined() {
            return Err(StoreError::Unavailable(format!("no storage area `{}`", self.area)));
        }
        let get: Function = Reflect::get(&area, &JsValue::from_str("get"))?.dyn_into()?;

        let keys = Array::of1(&JsValue::from_str(&self.key));
        let promise: Promise = get.call1(&area, &keys)?.dyn_into()?;
        let items = JsFuture::from(promise).await?;

        let value = Reflect::get(&items, &JsValue::from_str(&self.key))?;
        if value.is_undefined() || value.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_wasm_bindgen::from_value(value)?)
    }

    /// Load into `mirror`, logging instead of failing.
    pub async fn load_into(&self, mirror: &DictionaryMirror) {
        match self.load().await {
            Ok(snippets) => {
                tracing::info!(count = snippets.len(), "loaded snippets");
                mirror.replace(snippets);
            }
            Err(e) => tracing::warn!("could not load snippets: {}", e),
        }
    }

    /// Replace `mirror` on every change to our key in our area.
    ///
    /// The listener lives for the rest of the page.
    pub fn subscribe(&self, mirror: DictionaryMirror) -> Result<(), StoreError> {
        let on_changed = Reflect::get(&Self::storage()?, &JsValue::from_str("onChanged"))?;
        let add_listener: Function =
            Reflect::get(&on_changed, &JsValue::from_str("addListener"))?.dyn_into()?;

        let area = self.area.clone();
        let key = self.key.clone();
        let listener = Closure::wrap(Box::new(move |changes: JsValue, area_name: JsValue| {
            let area_name = area_name.as_string().unwrap_or_default();
            let changes: HashMap<String, StorageChange> =
                match serde_wasm_bindgen::from_value(changes) {
                    Ok(changes) => changes,
                    Err(e) => {
                        tracing::warn!("ignoring malformed storage change: {}", e);
                        return;
                    }
                };
            mirror.apply_change(&area_name, &area, &key, &changes);
        }) as Box<dyn FnMut(JsValue, JsValue)>);

        add_listener.call1(&on_changed, listener.as_ref())?;
        listener.forget();
        Ok(())
    }
}
