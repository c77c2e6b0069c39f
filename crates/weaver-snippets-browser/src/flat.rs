//! Flat-value surfaces: `<input>` and `<textarea>`.
//!
//! The DOM reports `selectionStart` in UTF-16 code units; the core works in
//! chars, so offsets are converted against the current value on every read
//! and write.

use wasm_bindgen::JsCast;
use weaver_snippets_core::text::{char_to_utf16, utf16_to_char};
use weaver_snippets_core::{ChangeNotification, FlatValuePlatform, PlatformError};

use crate::js_error_message;

/// A DOM control holding a single string value.
#[derive(Clone, Debug)]
pub enum DomFlatSurface {
    Input(web_sys::HtmlInputElement),
    TextArea(web_sys::HtmlTextAreaElement),
}

impl DomFlatSurface {
    /// Wrap an element if it is an input or textarea.
    pub fn from_element(element: &web_sys::Element) -> Option<Self> {
        if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
            return Some(Self::Input(input.clone()));
        }
        element
            .dyn_ref::<web_sys::HtmlTextAreaElement>()
            .map(|area| Self::TextArea(area.clone()))
    }

    fn target(&self) -> &web_sys::EventTarget {
        match self {
            Self::Input(el) => el.as_ref(),
            Self::TextArea(el) => el.as_ref(),
        }
    }

    fn selection_start_utf16(&self) -> Option<u32> {
        // Inputs whose type has no selection (e.g. email) throw or return null.
        let result = match self {
            Self::Input(el) => el.selection_start(),
            Self::TextArea(el) => el.selection_start(),
        };
        result.ok().flatten()
    }
}

impl FlatValuePlatform for DomFlatSurface {
    fn value(&self) -> String {
        match self {
            Self::Input(el) => el.value(),
            Self::TextArea(el) => el.value(),
        }
    }

    fn caret(&self) -> Option<usize> {
        let utf16 = self.selection_start_utf16()?;
        Some(utf16_to_char(&self.value(), utf16 as usize))
    }

    fn set_value(&mut self, value: &str) {
        match self {
            Self::Input(el) => el.set_value(value),
            Self::TextArea(el) => el.set_value(value),
        }
    }

    fn set_caret(&mut self, offset: usize) -> Result<(), PlatformError> {
        let utf16 = char_to_utf16(&self.value(), offset) as u32;
        let result = match self {
            Self::Input(el) => el.set_selection_range(utf16, utf16),
            Self::TextArea(el) => el.set_selection_range(utf16, utf16),
        };
        result.map_err(|e| format!("set_selection_range failed: {}", js_error_message(e)).into())
    }

    fn notify(&mut self, notification: ChangeNotification) -> Result<(), PlatformError> {
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        let event = web_sys::Event::new_with_event_init_dict(notification.event_name(), &init)
            .map_err(|e| format!("creating {} event failed: {}", notification.event_name(), js_error_message(e)))?;
        self.target()
            .dispatch_event(&event)
            .map(|_| ())
            .map_err(|e| format!("dispatch_event failed: {}", js_error_message(e)).into())
    }
}
