//! Replacement in tree-structured surfaces.
//!
//! The surface text is the concatenation of every text leaf in document
//! order. A match offset into that text is resolved to the first leaf whose
//! span contains it, and only that leaf is rewritten, so sibling nodes and
//! their formatting are left alone. A shortcut that continues past the end
//! of its leaf is not replaced.

use crate::error::ReplaceError;
use crate::platform::{PlatformError, TextTreePlatform};
use crate::text::{char_len, splice};
use crate::types::{Replacement, TreeAnchor, TreePoint};

/// Concatenated text of all leaves.
pub fn tree_text<P: TextTreePlatform + ?Sized>(platform: &P) -> Result<String, PlatformError> {
    let mut text = String::new();
    for leaf in platform.leaves()? {
        text.push_str(&platform.leaf_text(&leaf));
    }
    Ok(text)
}

/// Map the selection anchor to an offset in the concatenated text.
///
/// Falls back to the end of the text when there is no selection or the
/// anchor isn't one of this surface's leaves.
pub fn tree_caret<P: TextTreePlatform + ?Sized>(platform: &P) -> Result<usize, PlatformError> {
    let leaves = platform.leaves()?;
    let selection = platform.selection();

    let mut acc = 0;
    for (idx, leaf) in leaves.iter().enumerate() {
        if matches!(&selection, Some(TreeAnchor::AfterLeaves(n)) if *n == idx) {
            return Ok(acc);
        }
        let len = char_len(&platform.leaf_text(leaf));
        if let Some(TreeAnchor::Text(point)) = &selection {
            if point.leaf == *leaf {
                return Ok(acc + point.offset.min(len));
            }
        }
        acc += len;
    }
    Ok(acc)
}

/// A leaf located by global offset.
struct LocatedLeaf<L> {
    leaf: L,
    text: String,
    start: usize,
}

fn locate_leaf<P: TextTreePlatform + ?Sized>(
    platform: &P,
    offset: usize,
) -> Result<Option<LocatedLeaf<P::Leaf>>, PlatformError> {
    let mut acc = 0;
    for leaf in platform.leaves()? {
        let text = platform.leaf_text(&leaf);
        let len = char_len(&text);
        if offset >= acc && offset < acc + len {
            return Ok(Some(LocatedLeaf {
                leaf,
                text,
                start: acc,
            }));
        }
        acc += len;
    }
    Ok(None)
}

/// Replace `start..start + shortcut_len` (offsets into the concatenated
/// text) with `replacement` and collapse the selection after it.
///
/// Only the leaf containing `start` is rewritten. If the shortcut doesn't
/// fit entirely inside that leaf the surface is left untouched and
/// `ReplaceError::StraddlingMatch` is returned. A failure to move the
/// selection after the text was rewritten is logged and reported through
/// `Replacement::caret_restored`.
pub fn replace_in_tree<P: TextTreePlatform + ?Sized>(
    platform: &mut P,
    start: usize,
    shortcut_len: usize,
    replacement: &str,
) -> Result<Replacement, ReplaceError> {
    let Some(located) = locate_leaf(platform, start)? else {
        return Err(ReplaceError::LeafNotFound { offset: start });
    };

    let node_offset = start - located.start;
    let leaf_len = char_len(&located.text);
    let new_text = match splice(&located.text, node_offset, shortcut_len, replacement) {
        Some(text) => text,
        None => {
            tracing::warn!(
                node_offset,
                shortcut_len,
                leaf_len,
                "shortcut spans more than one text leaf, skipping"
            );
            return Err(ReplaceError::StraddlingMatch {
                node_offset,
                shortcut_len,
                leaf_len,
            });
        }
    };

    platform.set_leaf_text(&located.leaf, &new_text);

    let leaf_caret = node_offset + char_len(replacement);
    let caret_restored = match platform.set_selection(TreePoint::new(located.leaf, leaf_caret)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(leaf_caret, error = %e, "could not restore selection after replacement");
            false
        }
    };

    tracing::debug!(start, node_offset, leaf_caret, "replaced shortcut in text leaf");
    Ok(Replacement {
        start,
        caret: located.start + leaf_caret,
        caret_restored,
    })
}

/// Index of a node in a `MemoryTree`.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
enum MemoryNode {
    Element { children: Vec<NodeId> },
    Text(String),
}

/// In-memory tree-structured surface.
///
/// Node 0 is the root element. Text nodes are the leaves.
#[derive(Clone, Debug)]
pub struct MemoryTree {
    nodes: Vec<MemoryNode>,
    selection: Option<TreeAnchor<NodeId>>,
    reject_selection: bool,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self {
            nodes: vec![MemoryNode::Element {
                children: Vec::new(),
            }],
            selection: None,
            reject_selection: false,
        }
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child element under `parent`.
    pub fn append_element(&mut self, parent: NodeId) -> NodeId {
        self.push(
            parent,
            MemoryNode::Element {
                children: Vec::new(),
            },
        )
    }

    /// Append a text leaf under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, MemoryNode::Text(text.into()))
    }

    fn push(&mut self, parent: NodeId, node: MemoryNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if let Some(MemoryNode::Element { children }) = self.nodes.get_mut(parent.0) {
            children.push(id);
        }
        id
    }

    /// Place a collapsed selection, as the user's caret would be.
    pub fn select(&mut self, leaf: NodeId, offset: usize) {
        self.selection = Some(TreeAnchor::Text(TreePoint::new(leaf, offset)));
    }

    /// Place a collapsed selection before `element`'s child at
    /// `child_index` (or after its last child), as a browser does on an
    /// empty line.
    pub fn select_between(&mut self, element: NodeId, child_index: usize) {
        let mut count = 0;
        self.count_leaves_before(self.root(), (element, child_index), &mut count);
        self.selection = Some(TreeAnchor::AfterLeaves(count));
    }

    /// The selection, when it sits inside a text leaf.
    pub fn current_selection(&self) -> Option<&TreePoint<NodeId>> {
        match &self.selection {
            Some(TreeAnchor::Text(point)) => Some(point),
            _ => None,
        }
    }

    /// Make subsequent `set_selection` calls fail, like a host that throws
    /// while rebuilding a range.
    pub fn reject_selection_changes(&mut self) {
        self.reject_selection = true;
    }

    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id.0)? {
            MemoryNode::Text(text) => Some(text),
            MemoryNode::Element { .. } => None,
        }
    }

    /// Count leaves in document order up to the boundary; true once reached.
    fn count_leaves_before(&self, id: NodeId, boundary: (NodeId, usize), count: &mut usize) -> bool {
        match &self.nodes[id.0] {
            MemoryNode::Text(_) => {
                *count += 1;
                false
            }
            MemoryNode::Element { children } => {
                for (idx, child) in children.iter().enumerate() {
                    if id == boundary.0 && idx == boundary.1 {
                        return true;
                    }
                    if self.count_leaves_before(*child, boundary, count) {
                        return true;
                    }
                }
                id == boundary.0
            }
        }
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.nodes[id.0] {
            MemoryNode::Text(_) => out.push(id),
            MemoryNode::Element { children } => {
                for child in children {
                    self.collect_leaves(*child, out);
                }
            }
        }
    }
}

impl TextTreePlatform for MemoryTree {
    type Leaf = NodeId;

    fn leaves(&self) -> Result<Vec<NodeId>, PlatformError> {
        let mut out = Vec::new();
        self.collect_leaves(self.root(), &mut out);
        Ok(out)
    }

    fn leaf_text(&self, leaf: &NodeId) -> String {
        self.text_of(*leaf).unwrap_or_default().to_string()
    }

    fn set_leaf_text(&mut self, leaf: &NodeId, text: &str) {
        if let Some(MemoryNode::Text(existing)) = self.nodes.get_mut(leaf.0) {
            *existing = text.to_string();
        }
    }

    fn selection(&self) -> Option<TreeAnchor<NodeId>> {
        self.selection.clone()
    }

    fn set_selection(&mut self, point: TreePoint<NodeId>) -> Result<(), PlatformError> {
        if self.reject_selection {
            return Err("selection changes rejected".into());
        }
        if point.offset > char_len(&self.leaf_text(&point.leaf)) {
            return Err(format!("offset {} past end of leaf", point.offset).into());
        }
        self.selection = Some(TreeAnchor::Text(point));
        Ok(())
    }
}
