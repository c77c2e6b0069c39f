//! Surface registry: wires triggering onto each supported surface once.
//!
//! The "already wired" marker lives on the node itself, so revisiting a
//! node (initial scan, then a structural-change notification that reports
//! its subtree again) never attaches a second set of listeners. Removed
//! nodes need no bookkeeping.

use crate::classify::SurfaceKind;

/// A node the registry can classify and mark.
pub trait Registrable {
    fn surface_kind(&self) -> SurfaceKind;

    /// Whether listeners have already been attached.
    fn is_registered(&self) -> bool;

    /// Record that listeners are attached.
    fn mark_registered(&self);
}

/// What `register` did.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Registration {
    Attached(SurfaceKind),
    AlreadyRegistered,
    Unsupported,
}

#[derive(Clone, Debug, Default)]
pub struct SurfaceRegistry {
    attached: usize,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces this registry has wired.
    pub fn attached(&self) -> usize {
        self.attached
    }

    /// Attach listeners to `node` unless it is unsupported or already
    /// marked. `attach` runs at most once per node.
    pub fn register<N, F>(&mut self, node: &N, attach: F) -> Registration
    where
        N: Registrable + ?Sized,
        F: FnOnce(&N, SurfaceKind),
    {
        let kind = node.surface_kind();
        if !kind.is_supported() {
            return Registration::Unsupported;
        }
        if node.is_registered() {
            return Registration::AlreadyRegistered;
        }

        attach(node, kind);
        node.mark_registered();
        self.attached += 1;
        tracing::debug!(?kind, total = self.attached, "registered editable surface");
        Registration::Attached(kind)
    }

    /// Register every node in `nodes`; returns how many were newly attached.
    pub fn register_all<'n, N, I, F>(&mut self, nodes: I, mut attach: F) -> usize
    where
        N: Registrable + 'n,
        I: IntoIterator<Item = &'n N>,
        F: FnMut(&N, SurfaceKind),
    {
        let mut attached = 0;
        for node in nodes {
            if let Registration::Attached(_) = self.register(node, |n, kind| attach(n, kind)) {
                attached += 1;
            }
        }
        attached
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct FakeNode {
        kind: SurfaceKind,
        marked: Cell<bool>,
        listeners: Cell<usize>,
    }

    impl FakeNode {
        fn new(kind: SurfaceKind) -> Self {
            Self {
                kind,
                marked: Cell::new(false),
                listeners: Cell::new(0),
            }
        }
    }

    impl Registrable for FakeNode {
        fn surface_kind(&self) -> SurfaceKind {
            self.kind
        }

        fn is_registered(&self) -> bool {
            self.marked.get()
        }

        fn mark_registered(&self) {
            self.marked.set(true);
        }
    }

    fn attach(node: &FakeNode, _kind: SurfaceKind) {
        node.listeners.set(node.listeners.get() + 1);
    }

    #[test]
    fn test_register_twice_attaches_once() {
        let mut registry = SurfaceRegistry::new();
        let node = FakeNode::new(SurfaceKind::FlatValue);

        assert_eq!(
            registry.register(&node, attach),
            Registration::Attached(SurfaceKind::FlatValue)
        );
        assert_eq!(registry.register(&node, attach), Registration::AlreadyRegistered);
        assert_eq!(node.listeners.get(), 1);
        assert_eq!(registry.attached(), 1);
    }

    #[test]
    fn test_unsupported_is_not_marked() {
        let mut registry = SurfaceRegistry::new();
        let node = FakeNode::new(SurfaceKind::Unsupported);
        assert_eq!(registry.register(&node, attach), Registration::Unsupported);
        assert!(!node.is_registered());
        assert_eq!(node.listeners.get(), 0);
    }

    #[test]
    fn test_register_all_counts_new_surfaces() {
        let mut registry = SurfaceRegistry::new();
        let nodes = vec![
            FakeNode::new(SurfaceKind::FlatValue),
            FakeNode::new(SurfaceKind::TreeStructured),
            FakeNode::new(SurfaceKind::Unsupported),
        ];
        assert_eq!(registry.register_all(&nodes, attach), 2);
        // A later structural change reports the same subtree again.
        assert_eq!(registry.register_all(&nodes, attach), 0);
        assert!(nodes.iter().all(|n| n.listeners.get() <= 1));
    }
}
