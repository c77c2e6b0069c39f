//! The editable-surface capability and one-shot evaluation.
//!
//! Matching only needs text and caret; replacement is dispatched to the
//! flat or tree replacer depending on which wrapper the host built.

use smol_str::SmolStr;

use crate::classify::SurfaceKind;
use crate::dictionary::SnippetDictionary;
use crate::error::ReplaceError;
use crate::flat::replace_flat;
use crate::matcher::match_candidates;
use crate::platform::{FlatValuePlatform, TextTreePlatform};
use crate::text::char_len;
use crate::tree::{replace_in_tree, tree_caret, tree_text};
use crate::types::Replacement;

/// A surface the expander can read and rewrite.
pub trait EditableSurface {
    fn kind(&self) -> SurfaceKind;

    /// Current text. Hosts that can't read their content return "".
    fn text(&self) -> String;

    /// Current caret as a char offset into `text()`.
    fn caret(&self) -> usize;

    fn replace(
        &mut self,
        start: usize,
        shortcut_len: usize,
        replacement: &str,
    ) -> Result<Replacement, ReplaceError>;
}

/// Adapter for flat-value platforms.
#[derive(Clone, Debug)]
pub struct FlatSurface<P>(pub P);

impl<P: FlatValuePlatform> EditableSurface for FlatSurface<P> {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::FlatValue
    }

    fn text(&self) -> String {
        self.0.value()
    }

    /// An unknown caret resolves to the end of the buffer.
    fn caret(&self) -> usize {
        self.0
            .caret()
            .unwrap_or_else(|| char_len(&self.0.value()))
    }

    fn replace(
        &mut self,
        start: usize,
        shortcut_len: usize,
        replacement: &str,
    ) -> Result<Replacement, ReplaceError> {
        replace_flat(&mut self.0, start, shortcut_len, replacement)
    }
}

/// Adapter for tree-structured platforms.
#[derive(Clone, Debug)]
pub struct TreeSurface<P>(pub P);

impl<P: TextTreePlatform> EditableSurface for TreeSurface<P> {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::TreeStructured
    }

    fn text(&self) -> String {
        tree_text(&self.0).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read tree surface text");
            String::new()
        })
    }

    fn caret(&self) -> usize {
        tree_caret(&self.0).unwrap_or(0)
    }

    fn replace(
        &mut self,
        start: usize,
        shortcut_len: usize,
        replacement: &str,
    ) -> Result<Replacement, ReplaceError> {
        replace_in_tree(&mut self.0, start, shortcut_len, replacement)
    }
}

/// Outcome of one evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Nothing to do: no shortcut before the caret, or no snippets loaded.
    NoMatch,
    /// A shortcut was replaced.
    Replaced {
        shortcut: SmolStr,
        replacement: Replacement,
    },
    /// A shortcut matched but the surface couldn't be rewritten. The surface
    /// is unchanged.
    Skipped {
        shortcut: SmolStr,
        error: ReplaceError,
    },
}

impl Evaluation {
    pub fn is_replaced(&self) -> bool {
        matches!(self, Evaluation::Replaced { .. })
    }
}

/// Read the surface's current text and caret, and replace at most one
/// shortcut occurrence.
///
/// Candidates are tried in dictionary order. A candidate the surface can't
/// rewrite (e.g. one straddling two text leaves) leaves the surface
/// untouched and the next one is tried. `Skipped` carries the first such
/// failure when no candidate could be applied.
///
/// Side-effect free when nothing matches, so redundant calls are harmless.
pub fn evaluate<S: EditableSurface + ?Sized>(
    surface: &mut S,
    dictionary: &SnippetDictionary,
) -> Evaluation {
    if dictionary.is_empty() {
        return Evaluation::NoMatch;
    }

    let text = surface.text();
    let caret = surface.caret();
    let mut skipped = None;

    for found in match_candidates(&text, caret, dictionary.snippets()) {
        let shortcut = found.snippet.shortcut.clone();
        match surface.replace(found.start, found.shortcut_len(), found.replacement()) {
            Ok(replacement) => {
                tracing::info!(
                    shortcut = %shortcut,
                    kind = ?surface.kind(),
                    caret = replacement.caret,
                    "expanded snippet"
                );
                return Evaluation::Replaced {
                    shortcut,
                    replacement,
                };
            }
            Err(error) => {
                tracing::warn!(shortcut = %shortcut, error = %error, "snippet replacement skipped");
                skipped.get_or_insert(Evaluation::Skipped { shortcut, error });
            }
        }
    }

    skipped.unwrap_or(Evaluation::NoMatch)
}
