//! Tree-structured surfaces: contenteditable regions.
//!
//! Leaves are the text nodes under the surface root, in document order.
//! Leaf offsets handed to the DOM (`Range.setStart`, `Selection.anchorOffset`)
//! are UTF-16 and converted to chars against the leaf's current text.

use weaver_snippets_core::text::{char_to_utf16, utf16_to_char};
use weaver_snippets_core::{PlatformError, TextTreePlatform, TreeAnchor, TreePoint};

use crate::js_error_message;

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

/// A contenteditable subtree.
#[derive(Clone, Debug)]
pub struct DomTree {
    root: web_sys::Node,
}

impl DomTree {
    pub fn new(root: impl Into<web_sys::Node>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &web_sys::Node {
        &self.root
    }

    fn document(&self) -> Result<web_sys::Document, PlatformError> {
        self.root
            .owner_document()
            .or_else(|| web_sys::window().and_then(|w| w.document()))
            .ok_or_else(|| "no document".into())
    }
}

impl TextTreePlatform for DomTree {
    type Leaf = web_sys::Node;

    fn leaves(&self) -> Result<Vec<web_sys::Node>, PlatformError> {
        let walker = self
            .document()?
            .create_tree_walker_with_what_to_show(&self.root, SHOW_TEXT)
            .map_err(|e| format!("create_tree_walker failed: {}", js_error_message(e)))?;

        let mut leaves = Vec::new();
        while let Ok(Some(node)) = walker.next_node() {
            leaves.push(node);
        }
        Ok(leaves)
    }

    fn leaf_text(&self, leaf: &web_sys::Node) -> String {
        leaf.text_content().unwrap_or_default()
    }

    fn set_leaf_text(&mut self, leaf: &web_sys::Node, text: &str) {
        leaf.set_text_content(Some(text));
    }

    fn selection(&self) -> Option<TreeAnchor<web_sys::Node>> {
        let selection = web_sys::window()?.get_selection().ok()??;
        let anchor = selection.anchor_node()?;
        if !self.root.contains(Some(&anchor)) {
            return None;
        }

        if anchor.node_type() == web_sys::Node::TEXT_NODE {
            let text = anchor.text_content().unwrap_or_default();
            let offset = utf16_to_char(&text, selection.anchor_offset() as usize);
            return Some(TreeAnchor::Text(TreePoint::new(anchor, offset)));
        }

        // Element anchor: the offset is a child index. Count the text leaves
        // that come before that boundary.
        let boundary = anchor.child_nodes().item(selection.anchor_offset());
        let leaves = self.leaves().ok()?;
        let before = leaves
            .iter()
            .take_while(|leaf| match &boundary {
                Some(child) => {
                    child.compare_document_position(*leaf)
                        & web_sys::Node::DOCUMENT_POSITION_PRECEDING
                        != 0
                }
                None => {
                    anchor.contains(Some(*leaf))
                        || anchor.compare_document_position(*leaf)
                            & web_sys::Node::DOCUMENT_POSITION_PRECEDING
                            != 0
                }
            })
            .count();
        Some(TreeAnchor::AfterLeaves(before))
    }

    fn set_selection(&mut self, point: TreePoint<web_sys::Node>) -> Result<(), PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = self.document()?;

        let text = point.leaf.text_content().unwrap_or_default();
        let utf16_offset = char_to_utf16(&text, point.offset) as u32;

        let range = document
            .create_range()
            .map_err(|e| format!("create_range failed: {}", js_error_message(e)))?;
        range
            .set_start(&point.leaf, utf16_offset)
            .map_err(|e| format!("set_start failed: {}", js_error_message(e)))?;
        range.collapse_with_to_start(true);

        let selection = window
            .get_selection()
            .map_err(|e| format!("get_selection failed: {}", js_error_message(e)))?
            .ok_or("no selection object")?;
        selection
            .remove_all_ranges()
            .map_err(|e| format!("remove_all_ranges failed: {}", js_error_message(e)))?;
        selection
            .add_range(&range)
            .map_err(|e| format!("add_range failed: {}", js_error_message(e)))?;

        tracing::trace!(offset = point.offset, utf16_offset, "selection collapsed after replacement");
        Ok(())
    }
}
