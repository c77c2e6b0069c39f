//! Surface classification.
//!
//! Pure: looks at a description of a node and decides whether it is a
//! flat-value control, a tree-structured editable region, or neither.

use crate::config::ExpanderConfig;

/// Which replacement strategy a surface needs.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Single string buffer with a caret offset (`<input>`, `<textarea>`).
    FlatValue,
    /// Editable subtree of text leaves with a selection (contenteditable).
    TreeStructured,
    /// Anything else: checkboxes, non-editable elements, ...
    Unsupported,
}

impl SurfaceKind {
    pub fn is_supported(self) -> bool {
        !matches!(self, SurfaceKind::Unsupported)
    }
}

/// What the classifier needs to know about a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceDescriptor<'a> {
    /// Element tag name, any case.
    pub tag_name: &'a str,
    /// The `type` of an `<input>`, None when unset.
    pub input_type: Option<&'a str>,
    /// Whether the node is editable at the tree level, directly or through
    /// an editable ancestor.
    pub is_content_editable: bool,
}

impl<'a> SurfaceDescriptor<'a> {
    pub fn new(tag_name: &'a str) -> Self {
        Self {
            tag_name,
            ..Default::default()
        }
    }

    pub fn with_input_type(mut self, input_type: &'a str) -> Self {
        self.input_type = Some(input_type);
        self
    }

    pub fn content_editable(mut self, editable: bool) -> Self {
        self.is_content_editable = editable;
        self
    }

    /// Whether the node exposes a flat string buffer at all.
    fn has_value_buffer(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("input") || self.tag_name.eq_ignore_ascii_case("textarea")
    }
}

/// Classify a node.
pub fn classify(desc: &SurfaceDescriptor<'_>, config: &ExpanderConfig) -> SurfaceKind {
    if desc.tag_name.eq_ignore_ascii_case("textarea") {
        return SurfaceKind::FlatValue;
    }
    if desc.tag_name.eq_ignore_ascii_case("input") {
        return if config.allows_input_type(desc.input_type.unwrap_or("")) {
            SurfaceKind::FlatValue
        } else {
            SurfaceKind::Unsupported
        };
    }
    if desc.is_content_editable && !desc.has_value_buffer() {
        return SurfaceKind::TreeStructured;
    }
    SurfaceKind::Unsupported
}
