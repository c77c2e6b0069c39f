//! Platform abstraction traits for editable surfaces.
//!
//! These traits define the interface between the replacement logic and the
//! host that owns the surface (browser DOM, in-memory test doubles, ...).
//! The host owns the surface; the core only reads and mutates content and
//! caret through these traits.

use crate::types::{TreeAnchor, TreePoint};

/// A host call on the surface failed; carries the host's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Notifications a flat-value surface emits after a programmatic edit, so
/// bound listeners observe the mutation like a user edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeNotification {
    /// The value changed (`input` in the browser).
    ValueChanged,
    /// The change was committed (`change` in the browser).
    Committed,
}

impl ChangeNotification {
    /// DOM event name for this notification.
    pub fn event_name(self) -> &'static str {
        match self {
            ChangeNotification::ValueChanged => "input",
            ChangeNotification::Committed => "change",
        }
    }
}

/// A control backed by a single string buffer and a caret.
///
/// All offsets are chars. Implementations convert from whatever unit the
/// host uses.
pub trait FlatValuePlatform {
    /// Current buffer contents.
    fn value(&self) -> String;

    /// Caret offset, or None if the host doesn't expose one.
    fn caret(&self) -> Option<usize>;

    /// Overwrite the buffer.
    fn set_value(&mut self, value: &str);

    /// Collapse the selection to `offset`.
    fn set_caret(&mut self, offset: usize) -> Result<(), PlatformError>;

    /// Emit a change notification to the host's listeners.
    fn notify(&mut self, notification: ChangeNotification) -> Result<(), PlatformError>;
}

/// A rooted tree whose editable text lives in leaf nodes.
///
/// The surface text is the concatenation of all leaves in document order.
/// Leaf offsets are chars within that leaf's text.
pub trait TextTreePlatform {
    /// Handle to a text leaf.
    type Leaf: Clone + PartialEq;

    /// All text leaves, in document order.
    fn leaves(&self) -> Result<Vec<Self::Leaf>, PlatformError>;

    /// Text of a single leaf.
    fn leaf_text(&self, leaf: &Self::Leaf) -> String;

    /// Overwrite a single leaf's text.
    fn set_leaf_text(&mut self, leaf: &Self::Leaf, text: &str);

    /// The selection anchor, if the host has one inside this surface.
    fn selection(&self) -> Option<TreeAnchor<Self::Leaf>>;

    /// Replace the active selection with a collapsed point.
    fn set_selection(&mut self, point: TreePoint<Self::Leaf>) -> Result<(), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_message() {
        let err: PlatformError = "no selection object".into();
        assert_eq!(err.to_string(), "no selection object");
        let err = PlatformError::from(format!("offset {} past end", 4));
        assert_eq!(err, PlatformError("offset 4 past end".to_string()));
    }
}
