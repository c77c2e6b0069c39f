//! Shortcut matching.
//!
//! Snippets are tried in dictionary order. A snippet whose shortcut appears
//! anywhere in the text is a candidate; the occurrence actually used is the
//! last one that ends at or before the caret. The first snippet with such an
//! occurrence wins, so at most one match is produced per call. Occurrences
//! after the caret are never replaced.

use crate::text::{byte_to_char, char_to_byte};
use crate::types::{Snippet, SnippetMatch};

/// Find the snippet occurrence to replace.
///
/// `caret` is a char offset; values past the end clamp to the end. Returns
/// None for empty text, an empty dictionary, or when no shortcut occurs
/// before the caret. No word boundary is required around the shortcut.
pub fn find_match<'a>(
    text: &str,
    caret: usize,
    snippets: &'a [Snippet],
) -> Option<SnippetMatch<'a>> {
    match_candidates(text, caret, snippets).next()
}

/// Every snippet with an occurrence before the caret, in dictionary order.
///
/// The first item is what `find_match` returns. Callers that fail to apply
/// a candidate move on to the next one.
pub fn match_candidates<'a>(
    text: &str,
    caret: usize,
    snippets: &'a [Snippet],
) -> impl Iterator<Item = SnippetMatch<'a>> {
    let before_caret = &text[..char_to_byte(text, caret)];

    snippets.iter().filter_map(move |snippet| {
        let shortcut = snippet.shortcut.as_str();
        if shortcut.is_empty() || !text.contains(shortcut) {
            return None;
        }

        match before_caret.rfind(shortcut) {
            Some(byte_start) => {
                let start = byte_to_char(text, byte_start);
                tracing::debug!(shortcut, start, caret, "shortcut matched");
                Some(SnippetMatch { snippet, start })
            }
            None => {
                tracing::trace!(shortcut, caret, "shortcut only occurs after the caret");
                None
            }
        }
    })
}
