//! Element classification and dispatch to the right surface adapter.

use wasm_bindgen::{JsCast, JsValue};
use weaver_snippets_core::{
    EditableSurface, ExpanderConfig, FlatSurface, Registrable, ReplaceError, Replacement,
    SurfaceDescriptor, SurfaceKind, TreeSurface, classify,
};

use crate::flat::DomFlatSurface;
use crate::tree::DomTree;

/// Expando property recording that listeners are attached to an element.
const REGISTERED_MARKER: &str = "__weaverSnippetsRegistered";

/// Classify a DOM element.
pub fn element_surface_kind(element: &web_sys::Element, config: &ExpanderConfig) -> SurfaceKind {
    let tag_name = element.tag_name();
    let input_type = element
        .dyn_ref::<web_sys::HtmlInputElement>()
        .map(|input| input.type_());
    let is_content_editable = element
        .dyn_ref::<web_sys::HtmlElement>()
        .map(|el| el.is_content_editable())
        .unwrap_or(false);

    classify(
        &SurfaceDescriptor {
            tag_name: &tag_name,
            input_type: input_type.as_deref(),
            is_content_editable,
        },
        config,
    )
}

/// An editable DOM element, wrapped for evaluation.
pub enum DomSurface {
    Flat(FlatSurface<DomFlatSurface>),
    Tree(TreeSurface<DomTree>),
}

impl DomSurface {
    /// Wrap `element` according to its classification, or None if it is
    /// unsupported.
    pub fn from_element(element: &web_sys::Element, config: &ExpanderConfig) -> Option<Self> {
        match element_surface_kind(element, config) {
            SurfaceKind::FlatValue => {
                DomFlatSurface::from_element(element).map(|s| Self::Flat(FlatSurface(s)))
            }
            SurfaceKind::TreeStructured => {
                Some(Self::Tree(TreeSurface(DomTree::new(element.clone()))))
            }
            SurfaceKind::Unsupported => None,
        }
    }
}

impl EditableSurface for DomSurface {
    fn kind(&self) -> SurfaceKind {
        match self {
            Self::Flat(s) => s.kind(),
            Self::Tree(s) => s.kind(),
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Flat(s) => s.text(),
            Self::Tree(s) => s.text(),
        }
    }

    fn caret(&self) -> usize {
        match self {
            Self::Flat(s) => s.caret(),
            Self::Tree(s) => s.caret(),
        }
    }

    fn replace(
        &mut self,
        start: usize,
        shortcut_len: usize,
        replacement: &str,
    ) -> Result<Replacement, ReplaceError> {
        match self {
            Self::Flat(s) => s.replace(start, shortcut_len, replacement),
            Self::Tree(s) => s.replace(start, shortcut_len, replacement),
        }
    }
}

/// An element offered to the registry.
pub struct DomCandidate<'a> {
    pub element: &'a web_sys::Element,
    pub config: &'a ExpanderConfig,
}

impl<'a> DomCandidate<'a> {
    pub fn new(element: &'a web_sys::Element, config: &'a ExpanderConfig) -> Self {
        Self { element, config }
    }
}

impl Registrable for DomCandidate<'_> {
    fn surface_kind(&self) -> SurfaceKind {
        element_surface_kind(self.element, self.config)
    }

    fn is_registered(&self) -> bool {
        js_sys::Reflect::get(self.element, &JsValue::from_str(REGISTERED_MARKER))
            .map(|v| v.is_truthy())
            .unwrap_or(false)
    }

    fn mark_registered(&self) {
        if let Err(e) = js_sys::Reflect::set(
            self.element,
            &JsValue::from_str(REGISTERED_MARKER),
            &JsValue::TRUE,
        ) {
            tracing::warn!("could not mark element as registered: {:?}", e);
        }
    }
}
