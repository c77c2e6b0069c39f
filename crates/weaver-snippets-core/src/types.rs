//! Core snippet types: snippets, matches, replacement results, tree points.
//!
//! These types are platform-agnostic and shared by every surface implementation.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::text::char_len;

/// A stored snippet: a short literal shortcut and the text it expands to.
///
/// Shortcuts are assumed unique within a dictionary; the producer of the
/// dictionary enforces that, it is not re-checked here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Display name (UI only, never consulted by matching).
    #[serde(default)]
    pub name: SmolStr,
    /// The token that triggers replacement, e.g. `;br`.
    pub shortcut: SmolStr,
    /// Replacement text.
    pub text: String,
}

impl Snippet {
    /// Create a snippet with an empty display name.
    pub fn new(shortcut: impl Into<SmolStr>, text: impl Into<String>) -> Self {
        Self {
            name: SmolStr::default(),
            shortcut: shortcut.into(),
            text: text.into(),
        }
    }

    /// Builder-style display name.
    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }
}

/// A shortcut occurrence chosen for replacement.
///
/// `start` is a char offset into the surface text (NOT a byte offset).
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct SnippetMatch<'a> {
    pub snippet: &'a Snippet,
    pub start: usize,
}

impl<'a> SnippetMatch<'a> {
    pub fn shortcut(&self) -> &'a str {
        &self.snippet.shortcut
    }

    pub fn replacement(&self) -> &'a str {
        &self.snippet.text
    }

    /// Shortcut length in chars.
    pub fn shortcut_len(&self) -> usize {
        char_len(&self.snippet.shortcut)
    }

    /// Char range covered by the shortcut.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.shortcut_len()
    }
}

/// Result of a successful replacement.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Replacement {
    /// Char offset where the replacement text begins.
    pub start: usize,
    /// Caret offset after the replacement (`start + replacement length`).
    ///
    /// For tree surfaces this is relative to the concatenated leaf text.
    pub caret: usize,
    /// False when the text was mutated but the platform refused to move
    /// the caret/selection.
    pub caret_restored: bool,
}

/// A position inside a tree-structured surface: a text leaf and a char
/// offset within that leaf's text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreePoint<L> {
    pub leaf: L,
    pub offset: usize,
}

impl<L> TreePoint<L> {
    pub fn new(leaf: L, offset: usize) -> Self {
        Self { leaf, offset }
    }
}

/// Where the host's selection is anchored in a tree-structured surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeAnchor<L> {
    /// Inside a text leaf.
    Text(TreePoint<L>),
    /// Between nodes (an element anchor such as an empty line), after the
    /// first `n` text leaves in document order.
    AfterLeaves(usize),
}
