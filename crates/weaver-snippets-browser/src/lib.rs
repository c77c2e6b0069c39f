//! Browser DOM layer for weaver snippets.
//!
//! Binds the platform traits from `weaver-snippets-core` to real DOM
//! nodes. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `flat`: `<input>` / `<textarea>` surfaces (UTF-16 caret conversion)
//! - `tree`: contenteditable surfaces walked with a `TreeWalker`
//! - `surface`: element classification and the `DomSurface` dispatcher
//! - `timer`: `setTimeout`-backed scheduler for settling delays
//! - `storage`: `chrome.storage` load and change subscription
//! - `expander`: listener wiring, discovery via `MutationObserver`, startup
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-snippets-core` for convenience, so consumers
//! only need to depend on `weaver-snippets-browser`.

// Re-export core crate
pub use weaver_snippets_core;
pub use weaver_snippets_core::*;

pub mod expander;
pub mod flat;
pub mod storage;
pub mod surface;
pub mod timer;
pub mod tree;

pub use expander::SnippetExpander;
pub use flat::DomFlatSurface;
pub use storage::{ChromeStorage, StoreError};
pub use surface::{DomCandidate, DomSurface, element_surface_kind};
pub use timer::TimeoutScheduler;
pub use tree::DomTree;

/// Best-effort readable message for a thrown JS value.
pub(crate) fn js_error_message(value: wasm_bindgen::JsValue) -> String {
    match gloo_utils::errors::JsError::try_from(value.clone()) {
        Ok(err) => err.to_string(),
        Err(_) => format!("{:?}", value),
    }
}
