//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;
use weaver_snippets_core::{DebugReport, Snippet};

/// A snippet as JavaScript sees it.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsSnippet {
    #[serde(default)]
    pub name: String,
    pub shortcut: String,
    pub text: String,
}

impl From<&Snippet> for JsSnippet {
    fn from(snippet: &Snippet) -> Self {
        Self {
            name: snippet.name.to_string(),
            shortcut: snippet.shortcut.to_string(),
            text: snippet.text.clone(),
        }
    }
}

/// Structured form of the debug report.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsDebugInfo {
    pub snippets: Vec<JsSnippet>,
    pub candidate_count: usize,
    pub registered_count: usize,
}

impl From<&DebugReport> for JsDebugInfo {
    fn from(report: &DebugReport) -> Self {
        Self {
            snippets: report.snippets.iter().map(JsSnippet::from).collect(),
            candidate_count: report.candidate_count,
            registered_count: report.registered_count,
        }
    }
}
