//! The snippet dictionary mirror.
//!
//! An in-memory copy of the snippet list held by an external store. The
//! snapshot is only ever replaced wholesale: a change notification swaps in
//! a new `Arc<[Snippet]>`, and evaluations that already cloned the old one
//! keep reading it until they finish.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use serde::Deserialize;

use crate::types::Snippet;

/// An immutable, cheaply clonable snippet snapshot in dictionary order.
#[derive(Clone, Debug, Default)]
pub struct SnippetDictionary {
    snippets: Arc<[Snippet]>,
}

impl SnippetDictionary {
    /// An empty dictionary (nothing loaded yet).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snippets(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets: snippets.into(),
        }
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snippet> {
        self.snippets.iter()
    }
}

impl From<Vec<Snippet>> for SnippetDictionary {
    fn from(snippets: Vec<Snippet>) -> Self {
        Self::from_snippets(snippets)
    }
}

/// One key's entry in a storage change notification.
///
/// Mirrors the `{ oldValue, newValue }` shape of `chrome.storage.onChanged`.
/// Only the new value matters; a missing one means the key was removed.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default)]
    pub new_value: Option<Vec<Snippet>>,
}

/// Shared handle to the process-wide snapshot.
///
/// Created empty, populated by the initial load, then replaced by each
/// change notification. Single-threaded by construction (`Rc`).
#[derive(Clone, Debug, Default)]
pub struct DictionaryMirror {
    current: Rc<RefCell<SnippetDictionary>>,
}

impl DictionaryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot as of now. Holding it does not block updates.
    pub fn snapshot(&self) -> SnippetDictionary {
        self.current.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.current.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.borrow().is_empty()
    }

    /// Atomically swap in a new snippet list.
    pub fn replace(&self, snippets: Vec<Snippet>) {
        let dictionary = SnippetDictionary::from_snippets(snippets);
        tracing::info!(count = dictionary.len(), "snippet dictionary updated");
        *self.current.borrow_mut() = dictionary;
    }

    /// Apply a storage change notification.
    ///
    /// Ignores notifications from other storage areas and changes that
    /// don't touch `key`. Returns whether the snapshot was replaced.
    pub fn apply_change(
        &self,
        area: &str,
        expected_area: &str,
        key: &str,
        changes: &HashMap<String, StorageChange>,
    ) -> bool {
        if area != expected_area {
            tracing::trace!(area, "ignoring change from another storage area");
            return false;
        }
        let Some(change) = changes.get(key) else {
            return false;
        };
        self.replace(change.new_value.clone().unwrap_or_default());
        true
    }
}
