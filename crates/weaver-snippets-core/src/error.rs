//! Replacement failures.
//!
//! None of these are fatal: a failed replacement leaves the surface
//! untouched and the trigger pipeline carries on.

use crate::platform::PlatformError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplaceError {
    /// The match range doesn't fit in the surface's current text.
    #[error("match {start}..{end} is outside the surface text (len {len})")]
    InvalidOffset { start: usize, end: usize, len: usize },

    /// No text leaf contains the match start.
    #[error("no text leaf contains offset {offset}")]
    LeafNotFound { offset: usize },

    /// The shortcut starts in one leaf and continues into the next.
    #[error(
        "shortcut at leaf offset {node_offset} (len {shortcut_len}) straddles the end of a {leaf_len}-char leaf"
    )]
    StraddlingMatch {
        node_offset: usize,
        shortcut_len: usize,
        leaf_len: usize,
    },

    /// The host failed before any mutation happened.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}
