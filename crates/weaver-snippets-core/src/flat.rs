//! Replacement in flat-value surfaces.

use crate::error::ReplaceError;
use crate::platform::{ChangeNotification, FlatValuePlatform, PlatformError};
use crate::text::{char_len, splice};
use crate::types::Replacement;

/// Splice `replacement` over `start..start + shortcut_len`, move the caret
/// to the end of the inserted text, then emit value-changed and committed
/// notifications.
///
/// Fails without touching the surface if the range doesn't fit the current
/// buffer. A caret or notification failure after the mutation is logged and
/// reported through `Replacement::caret_restored`.
pub fn replace_flat<P: FlatValuePlatform + ?Sized>(
    platform: &mut P,
    start: usize,
    shortcut_len: usize,
    replacement: &str,
) -> Result<Replacement, ReplaceError> {
    let value = platform.value();
    let len = char_len(&value);
    let new_value =
        splice(&value, start, shortcut_len, replacement).ok_or(ReplaceError::InvalidOffset {
            start,
            end: start + shortcut_len,
            len,
        })?;

    platform.set_value(&new_value);

    let caret = start + char_len(replacement);
    let caret_restored = match platform.set_caret(caret) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(caret, error = %e, "could not reposition caret after replacement");
            false
        }
    };

    for notification in [ChangeNotification::ValueChanged, ChangeNotification::Committed] {
        if let Err(e) = platform.notify(notification) {
            tracing::warn!(
                event = notification.event_name(),
                error = %e,
                "failed to dispatch change notification"
            );
        }
    }

    tracing::debug!(start, caret, "replaced shortcut in flat-value surface");
    Ok(Replacement {
        start,
        caret,
        caret_restored,
    })
}

/// In-memory flat-value surface.
///
/// Records emitted notifications; useful for headless hosts and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatBuffer {
    value: String,
    caret: Option<usize>,
    notifications: Vec<ChangeNotification>,
}

impl FlatBuffer {
    /// Buffer with the caret at the end of `value`.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let caret = Some(char_len(&value));
        Self {
            value,
            caret,
            notifications: Vec::new(),
        }
    }

    /// Buffer with an explicit caret (None when the host reports no caret).
    pub fn with_caret(value: impl Into<String>, caret: Option<usize>) -> Self {
        Self {
            value: value.into(),
            caret,
            notifications: Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn notifications(&self) -> &[ChangeNotification] {
        &self.notifications
    }

    /// Simulate the user typing at the caret.
    pub fn type_text(&mut self, text: &str) {
        let at = self.caret.unwrap_or_else(|| char_len(&self.value));
        if let Some(value) = splice(&self.value, at.min(char_len(&self.value)), 0, text) {
            self.value = value;
            self.caret = Some(at + char_len(text));
        }
    }
}

impl FlatValuePlatform for FlatBuffer {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn caret(&self) -> Option<usize> {
        self.caret
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn set_caret(&mut self, offset: usize) -> Result<(), PlatformError> {
        if offset > char_len(&self.value) {
            return Err(format!("caret {} past end of buffer", offset).into());
        }
        self.caret = Some(offset);
        Ok(())
    }

    fn notify(&mut self, notification: ChangeNotification) -> Result<(), PlatformError> {
        self.notifications.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGN_OFF: &str = "Best regards,\nJane";

    #[test]
    fn test_replace_at_end() {
        let mut buf = FlatBuffer::new("Thanks ;br");
        let result = replace_flat(&mut buf, 7, 3, SIGN_OFF).unwrap();
        assert_eq!(buf.as_str(), "Thanks Best regards,\nJane");
        assert_eq!(result.caret, 25);
        assert_eq!(buf.caret(), Some(25));
        assert!(result.caret_restored);
    }

    #[test]
    fn test_replace_keeps_trailing_text() {
        let mut buf = FlatBuffer::with_caret(";br see you", Some(3));
        replace_flat(&mut buf, 0, 3, SIGN_OFF).unwrap();
        assert_eq!(buf.as_str(), "Best regards,\nJane see you");
        assert_eq!(buf.caret(), Some(18));
    }

    #[test]
    fn test_emits_input_then_change() {
        let mut buf = FlatBuffer::new("a;b");
        replace_flat(&mut buf, 1, 2, "B").unwrap();
        assert_eq!(
            buf.notifications(),
            &[ChangeNotification::ValueChanged, ChangeNotification::Committed]
        );
    }

    #[test]
    fn test_invalid_offset_leaves_buffer_alone() {
        let mut buf = FlatBuffer::new("short");
        let err = replace_flat(&mut buf, 4, 3, "x").unwrap_err();
        assert_eq!(
            err,
            ReplaceError::InvalidOffset {
                start: 4,
                end: 7,
                len: 5
            }
        );
        assert_eq!(buf.as_str(), "short");
        assert!(buf.notifications().is_empty());
    }

    #[test]
    fn test_type_text_advances_caret() {
        let mut buf = FlatBuffer::with_caret("ac", Some(1));
        buf.type_text("b");
        assert_eq!(buf.as_str(), "abc");
        assert_eq!(buf.caret(), Some(2));
    }
}
