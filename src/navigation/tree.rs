//! # Coordinator Tree
//!
//! Arena of coordinator nodes. Parents own their children through the
//! `children` list; the `parent` link is an id lookup, never an ownership edge.
//!
//! ```text
//! CoordinatorTree
//! ├── nodes: HashMap<CoordinatorId, Node>
//! │     Node { kind, screen, parent, children }
//! ├── next_id            // coordinator ids
//! └── next_screen        // screen tokens
//! ```
//!
//! Invariants kept by every operation:
//! - a node is listed in at most one parent's `children`
//! - `node.parent == Some(p)` iff `p.children` contains the node
//! - a finished node and its subtree are removed from the arena

use std::collections::HashMap;
use std::fmt;

use log::{debug, info};

use super::host::{NavigationEvent, ScreenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinatorId(u64);

impl fmt::Display for CoordinatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coordinator#{}", self.0)
    }
}

/// Misuse of the tree. These are programmer errors, never runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    UnknownCoordinator(CoordinatorId),
    /// The child is already resident under another parent.
    AlreadyParented {
        child: CoordinatorId,
        parent: CoordinatorId,
    },
    /// The child is the parent itself or one of its ancestors.
    WouldCycle {
        parent: CoordinatorId,
        child: CoordinatorId,
    },
    ScreenAlreadyAssigned(CoordinatorId),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::UnknownCoordinator(id) => write!(f, "unknown {id}"),
            NavigationError::AlreadyParented { child, parent } => {
                write!(f, "{child} already has parent {parent}")
            }
            NavigationError::WouldCycle { parent, child } => {
                write!(f, "adding {child} under {parent} would create a cycle")
            }
            NavigationError::ScreenAlreadyAssigned(id) => {
                write!(f, "{id} already owns a screen")
            }
        }
    }
}

impl std::error::Error for NavigationError {}

/// Outcome of a completed `finish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub coordinator: CoordinatorId,
    pub parent: CoordinatorId,
    /// The finished coordinator followed by its former descendants.
    pub disposed: Vec<CoordinatorId>,
}

#[derive(Debug)]
struct Node {
    kind: &'static str,
    screen: Option<ScreenId>,
    parent: Option<CoordinatorId>,
    children: Vec<CoordinatorId>,
}

#[derive(Debug, Default)]
pub struct CoordinatorTree {
    nodes: HashMap<CoordinatorId, Node>,
    next_id: u64,
    next_screen: u64,
}

impl CoordinatorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a detached coordinator.
    pub fn insert(&mut self, kind: &'static str) -> CoordinatorId {
        self.next_id += 1;
        let id = CoordinatorId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                kind,
                screen: None,
                parent: None,
                children: Vec::new(),
            },
        );
        debug!("Registered {} ({})", id, kind);
        id
    }

    pub fn contains(&self, id: CoordinatorId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: CoordinatorId) -> Option<&'static str> {
        self.nodes.get(&id).map(|n| n.kind)
    }

    pub fn parent(&self, id: CoordinatorId) -> Option<CoordinatorId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: CoordinatorId) -> &[CoordinatorId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn screen(&self, id: CoordinatorId) -> Option<ScreenId> {
        self.nodes.get(&id).and_then(|n| n.screen)
    }

    /// Mints the screen token for `id`. A coordinator owns at most one screen.
    pub fn assign_screen(&mut self, id: CoordinatorId) -> Result<ScreenId, NavigationError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(NavigationError::UnknownCoordinator(id))?;
        if node.screen.is_some() {
            return Err(NavigationError::ScreenAlreadyAssigned(id));
        }
        self.next_screen += 1;
        let screen = ScreenId(self.next_screen);
        node.screen = Some(screen);
        Ok(screen)
    }

    fn is_ancestor_or_self(&self, candidate: CoordinatorId, of: CoordinatorId) -> bool {
        let mut cursor = Some(of);
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Appends `child` to `parent`'s children. The tree is left untouched on error.
    pub fn add_child(
        &mut self,
        parent: CoordinatorId,
        child: CoordinatorId,
    ) -> Result<(), NavigationError> {
        if !self.contains(parent) {
            return Err(NavigationError::UnknownCoordinator(parent));
        }
        let existing = self
            .nodes
            .get(&child)
            .ok_or(NavigationError::UnknownCoordinator(child))?
            .parent;
        if let Some(existing) = existing {
            return Err(NavigationError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(NavigationError::WouldCycle { parent, child });
        }

        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Removes `child` from `parent`'s list by identity. No-op if not listed.
    /// The child stays registered, detached. Returns whether it was listed.
    pub fn remove_child(&mut self, parent: CoordinatorId, child: CoordinatorId) -> bool {
        let Some(node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        let before = node.children.len();
        node.children.retain(|c| *c != child);
        if node.children.len() == before {
            return false;
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = None;
        }
        true
    }

    /// Parent hook run by `finish`: removes the child and disposes its subtree.
    /// A `child` not listed under `parent` is left alone.
    pub fn child_did_finish(
        &mut self,
        parent: CoordinatorId,
        child: CoordinatorId,
    ) -> Vec<CoordinatorId> {
        if !self.remove_child(parent, child) {
            debug!("{} is not a child of {}, nothing to dispose", child, parent);
            return Vec::new();
        }
        self.dispose(child)
    }

    /// Removes a detached coordinator and everything below it from the arena.
    /// Resident coordinators are left alone; they leave through `finish`.
    pub fn dispose(&mut self, id: CoordinatorId) -> Vec<CoordinatorId> {
        if self.parent(id).is_some() {
            return Vec::new();
        }
        let mut disposed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                disposed.push(next);
                pending.extend(node.children.into_iter().rev());
            }
        }
        disposed
    }

    /// Ends `id`'s flow by notifying its parent. Coordinators without a
    /// parent (the root, or ones already finished) are left as they are.
    pub fn finish(&mut self, id: CoordinatorId) -> Option<Finished> {
        let parent = self.parent(id)?;
        let kind = self.kind(id).unwrap_or("?");
        let disposed = self.child_did_finish(parent, id);
        info!(
            "Finished {} ({}), disposed {} coordinator(s)",
            id,
            kind,
            disposed.len()
        );
        Some(Finished {
            coordinator: id,
            parent,
            disposed,
        })
    }

    /// Depth-first search for the coordinator owning `screen`, starting at
    /// `search_root` and visiting children in insertion order.
    pub fn locate_owner(&self, screen: ScreenId, search_root: CoordinatorId) -> Option<CoordinatorId> {
        let node = self.nodes.get(&search_root)?;
        if node.screen == Some(screen) {
            return Some(search_root);
        }
        node.children
            .iter()
            .find_map(|child| self.locate_owner(screen, *child))
    }

    /// Maps one back-stack transition onto the tree: if the previous top
    /// screen left the stack, the coordinator owning it is finished.
    pub fn reconcile(&mut self, event: &NavigationEvent, root: CoordinatorId) -> Option<Finished> {
        let disappeared = event.disappeared()?;
        match self.locate_owner(disappeared, root) {
            Some(owner) => self.finish(owner),
            None => {
                debug!("No coordinator owns {}, ignoring", disappeared);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::host::Direction;

    /// Every parent link points at a node listing it, and every listed child points back.
    fn assert_consistent(tree: &CoordinatorTree) {
        for (id, node) in &tree.nodes {
            if let Some(parent) = node.parent {
                assert!(tree.children(parent).contains(id), "{id} not listed under {parent}");
            }
            for child in &node.children {
                assert_eq!(tree.parent(*child), Some(*id));
            }
        }
    }

    fn pop_event(from: ScreenId, stack: Vec<ScreenId>) -> NavigationEvent {
        NavigationEvent {
            from: Some(from),
            to: stack.last().copied(),
            direction: Direction::Pop,
            stack,
        }
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let child = tree.insert("child");
        tree.add_child(root, child).unwrap();

        assert_eq!(tree.children(root), &[child]);
        assert_eq!(tree.parent(child), Some(root));
        assert_consistent(&tree);
    }

    #[test]
    fn test_add_child_rejects_already_parented() {
        let mut tree = CoordinatorTree::new();
        let a = tree.insert("a");
        let b = tree.insert("b");
        let child = tree.insert("child");
        tree.add_child(a, child).unwrap();

        let err = tree.add_child(b, child).unwrap_err();
        assert_eq!(err, NavigationError::AlreadyParented { child, parent: a });
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.parent(child), Some(a));
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let child = tree.insert("child");
        tree.add_child(root, child).unwrap();

        assert!(matches!(tree.add_child(child, root), Err(NavigationError::WouldCycle { .. })));
        assert!(matches!(tree.add_child(root, root), Err(NavigationError::WouldCycle { .. })));
        assert_consistent(&tree);
    }

    #[test]
    fn test_remove_child_by_identity_and_noop() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let a = tree.insert("a");
        let b = tree.insert("b");
        let stranger = tree.insert("stranger");
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();

        assert!(!tree.remove_child(root, stranger));
        assert_eq!(tree.children(root), &[a, b]);

        assert!(tree.remove_child(root, a));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.parent(a), None);
        assert_consistent(&tree);
    }

    #[test]
    fn test_child_did_finish_ignores_coordinators_not_listed() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let flow = tree.insert("flow");
        tree.add_child(root, flow).unwrap();
        let other = tree.insert("other-root");
        let leaf = tree.insert("leaf");
        tree.add_child(other, leaf).unwrap();

        // A detached tree that `root` never adopted.
        assert!(tree.child_did_finish(root, other).is_empty());
        assert!(tree.contains(other));
        assert!(tree.contains(leaf));

        // The parent itself, and a grandchild handed to the wrong parent.
        assert!(tree.child_did_finish(root, root).is_empty());
        assert!(tree.child_did_finish(root, leaf).is_empty());
        assert!(tree.contains(root));
        assert_eq!(tree.children(root), &[flow]);
        assert_eq!(tree.parent(leaf), Some(other));
        assert_eq!(tree.len(), 4);
        assert_consistent(&tree);

        assert_eq!(tree.child_did_finish(root, flow), vec![flow]);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_finish_without_parent_is_noop() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        assert!(tree.finish(root).is_none());
        assert!(tree.contains(root));
    }

    #[test]
    fn test_finish_disposes_subtree_and_is_idempotent() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let flow = tree.insert("flow");
        let nested = tree.insert("nested");
        tree.add_child(root, flow).unwrap();
        tree.add_child(flow, nested).unwrap();

        let finished = tree.finish(flow).unwrap();
        assert_eq!(finished.parent, root);
        assert_eq!(finished.disposed, vec![flow, nested]);
        assert!(tree.children(root).is_empty());
        assert!(!tree.contains(flow));
        assert!(!tree.contains(nested));

        assert!(tree.finish(flow).is_none());
        assert_consistent(&tree);
    }

    #[test]
    fn test_screen_is_assigned_once() {
        let mut tree = CoordinatorTree::new();
        let id = tree.insert("flow");
        let screen = tree.assign_screen(id).unwrap();
        assert_eq!(tree.screen(id), Some(screen));
        assert_eq!(tree.assign_screen(id), Err(NavigationError::ScreenAlreadyAssigned(id)));
        assert_eq!(tree.screen(id), Some(screen));
    }

    #[test]
    fn test_locate_owner_searches_depth_first() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let a = tree.insert("a");
        let a1 = tree.insert("a1");
        let b = tree.insert("b");
        tree.add_child(root, a).unwrap();
        tree.add_child(a, a1).unwrap();
        tree.add_child(root, b).unwrap();
        let a1_screen = tree.assign_screen(a1).unwrap();
        let b_screen = tree.assign_screen(b).unwrap();

        assert_eq!(tree.locate_owner(a1_screen, root), Some(a1));
        assert_eq!(tree.locate_owner(b_screen, root), Some(b));
        assert_eq!(tree.locate_owner(b_screen, a), None);
        assert_eq!(tree.locate_owner(ScreenId(999), root), None);
    }

    #[test]
    fn test_reconcile_finishes_owner_and_keeps_sibling_order() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let list = tree.insert("list");
        let first = tree.insert("detail");
        let second = tree.insert("detail");
        let third = tree.insert("detail");
        for child in [list, first, second, third] {
            tree.add_child(root, child).unwrap();
        }
        let list_screen = tree.assign_screen(list).unwrap();
        let second_screen = tree.assign_screen(second).unwrap();

        let finished = tree
            .reconcile(&pop_event(second_screen, vec![list_screen]), root)
            .unwrap();

        assert_eq!(finished.coordinator, second);
        assert_eq!(tree.children(root), &[list, first, third]);
        assert_consistent(&tree);
    }

    #[test]
    fn test_reconcile_ignores_push_and_unowned_screens() {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("root");
        let list = tree.insert("list");
        tree.add_child(root, list).unwrap();
        let list_screen = tree.assign_screen(list).unwrap();

        let push = NavigationEvent {
            from: Some(list_screen),
            to: Some(ScreenId(50)),
            direction: Direction::Push,
            stack: vec![list_screen, ScreenId(50)],
        };
        assert!(tree.reconcile(&push, root).is_none());

        let sheet = pop_event(ScreenId(50), vec![list_screen]);
        assert!(tree.reconcile(&sheet, root).is_none());

        assert_eq!(tree.children(root), &[list]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_random_operation_sequences_stay_consistent() {
        // Deterministic pseudo-random walk over add/remove/finish.
        let mut tree = CoordinatorTree::new();
        let mut ids = vec![tree.insert("root")];
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let pick = |n: usize, s: u64| (s as usize) % n.max(1);
            match seed % 4 {
                0 => ids.push(tree.insert("node")),
                1 => {
                    let parent = ids[pick(ids.len(), seed >> 8)];
                    let child = ids[pick(ids.len(), seed >> 24)];
                    let _ = tree.add_child(parent, child);
                }
                2 => {
                    let parent = ids[pick(ids.len(), seed >> 8)];
                    let child = ids[pick(ids.len(), seed >> 24)];
                    tree.remove_child(parent, child);
                }
                _ => {
                    let id = ids[pick(ids.len(), seed >> 8)];
                    if let Some(finished) = tree.finish(id) {
                        for gone in &finished.disposed {
                            assert!(!tree.contains(*gone));
                        }
                    }
                }
            }
            ids.retain(|id| tree.contains(*id));
            if ids.is_empty() {
                ids.push(tree.insert("root"));
            }
            assert_consistent(&tree);
        }
    }
}
