//! Expander configuration.
//!
//! Every field has a default, so hosts may pass a partial object (or none
//! at all) and get the stock behaviour for the rest.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Selector for nodes that may be editable surfaces.
pub const CANDIDATE_SELECTOR: &str = "input, textarea, [contenteditable]";

/// Tunables for triggering, classification and the snippet store binding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpanderConfig {
    /// Settling delay after a content-changed event.
    pub input_delay_ms: u64,
    /// Settling delay after a boundary key is released.
    pub boundary_key_delay_ms: u64,
    /// Key names (as reported by `KeyboardEvent.key`) that end a word.
    pub boundary_keys: Vec<SmolStr>,
    /// Allowed `type` values for single-line inputs. The empty string
    /// stands for an unset type.
    pub flat_input_types: Vec<SmolStr>,
    /// Selector used to discover candidate surfaces.
    pub candidate_selector: String,
    /// Storage area the snippet list lives in.
    pub storage_area: SmolStr,
    /// Key of the snippet list within the storage area.
    pub storage_key: SmolStr,
    /// Also listen at the document level (capture phase) as a fallback for
    /// surfaces discovery misses.
    pub global_listeners: bool,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            input_delay_ms: 10,
            boundary_key_delay_ms: 50,
            boundary_keys: vec![" ".into(), "Enter".into(), "Tab".into()],
            flat_input_types: vec!["".into(), "text".into(), "email".into(), "search".into()],
            candidate_selector: CANDIDATE_SELECTOR.to_string(),
            storage_area: "sync".into(),
            storage_key: "snippets".into(),
            global_listeners: true,
        }
    }
}

impl ExpanderConfig {
    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }

    pub fn boundary_key_delay(&self) -> Duration {
        Duration::from_millis(self.boundary_key_delay_ms)
    }

    /// Whether an input with this `type` attribute counts as a flat-value surface.
    pub fn allows_input_type(&self, input_type: &str) -> bool {
        let input_type = input_type.trim();
        self.flat_input_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(input_type))
    }
}
