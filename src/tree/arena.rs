//! Tree operations: insert, remove, walk, hit-test, paint order.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use crate::geometry::{Offset, Region};

use super::node::{WidgetId, WidgetState};

/// Empty slice constant for returning when a widget has no children.
const EMPTY_CHILDREN: &[WidgetId] = &[];

/// The owning widget tree, backed by a slotmap arena.
///
/// All widgets live in a single `SlotMap`. Parent/child relationships are
/// stored in secondary maps so that removal is O(subtree size) and lookup is
/// O(1). A widget appears in exactly one parent's ordered child sequence or
/// is a root; parent links are non-owning `WidgetId` back-references.
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, WidgetState>,
    children: SecondaryMap<WidgetId, Vec<WidgetId>>,
    parent: SecondaryMap<WidgetId, WidgetId>,
    root: Option<WidgetId>,
}

impl WidgetTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a root-level widget (no parent).
    ///
    /// If no root has been set yet, this widget becomes the root.
    pub fn insert(&mut self, state: WidgetState) -> WidgetId {
        let id = self.nodes.insert(state);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a widget as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: WidgetId, state: WidgetState) -> WidgetId {
        debug_assert!(self.nodes.contains_key(parent), "parent widget does not exist");
        let id = self.nodes.insert(state);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(id);
        id
    }

    /// Remove a widget and all its descendants.
    ///
    /// Detaches the widget from its parent's ordered child sequence, then
    /// removes the whole subtree. Returns the `WidgetState` of the removed
    /// widget, or `None` if it didn't exist.
    pub fn remove(&mut self, id: WidgetId) -> Option<WidgetState> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        // Detach from parent's children list.
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        // Clear root if we're removing it.
        if self.root == Some(id) {
            self.root = None;
        }

        // Collect the subtree (BFS) and remove every widget once.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_state = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                for &child in &kids {
                    to_remove.push_back(child);
                }
            }
            self.parent.remove(current);
            let state = self.nodes.remove(current);
            if current == id {
                removed_root_state = state;
            }
        }

        removed_root_state
    }

    /// Remove every child subtree of `id` in one operation.
    ///
    /// Each direct child is visited for removal exactly once. Returns the
    /// number of direct children removed.
    pub fn clear_children(&mut self, id: WidgetId) -> usize {
        let kids: Vec<WidgetId> = self.children(id).to_vec();
        for &child in &kids {
            self.remove(child);
        }
        kids.len()
    }

    /// Get the parent of a widget, if it has one.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    /// Get the ordered children of a widget. Returns an empty slice if the
    /// widget has no children or does not exist.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor widget ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a widget's state.
    pub fn get(&self, id: WidgetId) -> Option<&WidgetState> {
        self.nodes.get(id)
    }

    /// Mutable access to a widget's state.
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetState> {
        self.nodes.get_mut(id)
    }

    /// The current root widget, if set.
    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Number of widgets in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a widget with the given id.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Set the enabled flag on `id` and its whole subtree.
    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) {
        for widget in self.walk_depth_first(id) {
            if let Some(state) = self.nodes.get_mut(widget) {
                state.enabled = enabled;
            }
        }
    }

    /// Set the focused flag on `id` and its whole subtree.
    pub fn set_focused(&mut self, id: WidgetId, focused: bool) {
        for widget in self.walk_depth_first(id) {
            if let Some(state) = self.nodes.get_mut(widget) {
                state.focused = focused;
            }
        }
    }

    /// Resolve a widget's parent-relative bounds to root coordinates.
    pub fn absolute_region(&self, id: WidgetId) -> Option<Region> {
        let state = self.nodes.get(id)?;
        let mut region = state.bounds;
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            let parent_state = self.nodes.get(p)?;
            region = region.translate(parent_state.bounds.offset());
            current = p;
        }
        Some(region)
    }

    /// The chain of visible widgets under `point`, ordered root → topmost.
    ///
    /// The host dispatches pointer events along this chain and stops at the
    /// first widget that consumes the event. Invisible widgets (and their
    /// subtrees) are skipped; an empty vec means the point hit nothing.
    pub fn hit_path(&self, point: Offset) -> Vec<WidgetId> {
        let mut path = Vec::new();
        let Some(root) = self.root else {
            return path;
        };

        let mut current = root;
        let mut origin = Offset::ZERO;
        loop {
            let Some(state) = self.nodes.get(current) else {
                break;
            };
            if !state.visible {
                break;
            }
            let absolute = state.bounds.translate(origin);
            if !absolute.contains(point.x, point.y) {
                break;
            }
            path.push(current);

            // Descend into the topmost (last in paint order) visible child
            // containing the point.
            let child_origin = absolute.offset();
            let mut next = None;
            for &child in self.children(current) {
                if let Some(child_state) = self.nodes.get(child) {
                    let child_abs = child_state.bounds.translate(child_origin);
                    if child_state.visible && child_abs.contains(point.x, point.y) {
                        next = Some(child);
                    }
                }
            }
            match next {
                Some(child) => {
                    current = child;
                    origin = child_origin;
                }
                None => break,
            }
        }
        path
    }

    /// The visible widgets with their absolute regions, back to front.
    ///
    /// Parents precede children and siblings appear in child order, so the
    /// host can rasterize the list in sequence. This is a read-only pass:
    /// the draw cycle must not mutate layout state, which taking `&self`
    /// enforces at compile time.
    pub fn paint_order(&self) -> Vec<(WidgetId, Region)> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };

        let mut stack = vec![(root, Offset::ZERO)];
        while let Some((id, origin)) = stack.pop() {
            let Some(state) = self.nodes.get(id) else {
                continue;
            };
            if !state.visible {
                continue;
            }
            let absolute = state.bounds.translate(origin);
            out.push((id, absolute));
            let child_origin = absolute.offset();
            for &child in self.children(id).iter().rev() {
                stack.push((child, child_origin));
            }
        }
        out
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (WidgetTree, WidgetId, WidgetId, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.insert(WidgetState::new().with_bounds(Region::new(0, 0, 100, 100)));
        let a = tree.insert_child(root, WidgetState::new().with_bounds(Region::new(10, 10, 40, 40)));
        let b = tree.insert_child(root, WidgetState::new().with_bounds(Region::new(60, 10, 30, 30)));
        let c = tree.insert_child(a, WidgetState::new().with_bounds(Region::new(5, 5, 10, 10)));
        let d = tree.insert_child(a, WidgetState::new().with_bounds(Region::new(5, 20, 10, 10)));
        (tree, root, a, b, c, d)
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    #[test]
    fn insert_sets_root() {
        let mut tree = WidgetTree::new();
        let id = tree.insert(WidgetState::new());
        assert_eq!(tree.root(), Some(id));
    }

    #[test]
    fn insert_second_does_not_change_root() {
        let mut tree = WidgetTree::new();
        let first = tree.insert(WidgetState::new());
        let _second = tree.insert(WidgetState::new());
        assert_eq!(tree.root(), Some(first));
    }

    #[test]
    fn insert_child_parent_relationship() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn children_ordered() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.children(a), &[c, d]);
        assert!(tree.children(c).is_empty());
    }

    #[test]
    fn ancestors() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.ancestors(c), vec![a, root]);
        assert_eq!(tree.ancestors(a), vec![root]);
        assert!(tree.ancestors(root).is_empty());
    }

    #[test]
    fn len_and_is_empty() {
        let (tree, ..) = build_tree();
        assert_eq!(tree.len(), 5);
        assert!(!tree.is_empty());

        let empty = WidgetTree::new();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    #[test]
    fn remove_leaf() {
        let (mut tree, _root, a, _b, c, d) = build_tree();
        assert!(tree.remove(c).is_some());
        assert!(!tree.contains(c));
        assert_eq!(tree.children(a), &[d]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn remove_subtree() {
        let (mut tree, root, a, b, c, d) = build_tree();
        tree.remove(a);
        assert!(!tree.contains(a));
        assert!(!tree.contains(c));
        assert!(!tree.contains(d));
        assert!(tree.contains(root));
        assert!(tree.contains(b));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn remove_root() {
        let (mut tree, root, ..) = build_tree();
        tree.remove(root);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn remove_nonexistent() {
        let mut tree = WidgetTree::new();
        let id = tree.insert(WidgetState::new());
        tree.remove(id);
        assert!(tree.remove(id).is_none());
    }

    #[test]
    fn clear_children_removes_each_once() {
        let (mut tree, root, a, b, c, d) = build_tree();
        let removed = tree.clear_children(root);
        assert_eq!(removed, 2);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(!tree.contains(c));
        assert!(!tree.contains(d));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn clear_children_empty_is_noop() {
        let (mut tree, _root, _a, b, ..) = build_tree();
        assert_eq!(tree.clear_children(b), 0);
        assert!(tree.contains(b));
    }

    // -----------------------------------------------------------------------
    // Walks & flags
    // -----------------------------------------------------------------------

    #[test]
    fn walk_depth_first() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn set_enabled_propagates_to_subtree() {
        let (mut tree, _root, a, b, c, d) = build_tree();
        tree.set_enabled(a, false);
        assert!(!tree.get(a).unwrap().enabled);
        assert!(!tree.get(c).unwrap().enabled);
        assert!(!tree.get(d).unwrap().enabled);
        assert!(tree.get(b).unwrap().enabled);
    }

    #[test]
    fn set_focused_propagates_to_subtree() {
        let (mut tree, _root, a, _b, c, d) = build_tree();
        tree.set_focused(a, true);
        assert!(tree.get(a).unwrap().focused);
        assert!(tree.get(c).unwrap().focused);
        assert!(tree.get(d).unwrap().focused);
        tree.set_focused(a, false);
        assert!(!tree.get(c).unwrap().focused);
    }

    // -----------------------------------------------------------------------
    // Absolute coordinates
    // -----------------------------------------------------------------------

    #[test]
    fn absolute_region_root() {
        let (tree, root, ..) = build_tree();
        assert_eq!(tree.absolute_region(root), Some(Region::new(0, 0, 100, 100)));
    }

    #[test]
    fn absolute_region_nested() {
        let (tree, _root, _a, _b, c, _d) = build_tree();
        // c at (5,5) inside a at (10,10) inside root at (0,0).
        assert_eq!(tree.absolute_region(c), Some(Region::new(15, 15, 10, 10)));
    }

    #[test]
    fn absolute_region_missing() {
        let (mut tree, _root, _a, b, ..) = build_tree();
        tree.remove(b);
        assert_eq!(tree.absolute_region(b), None);
    }

    // -----------------------------------------------------------------------
    // Hit testing
    // -----------------------------------------------------------------------

    #[test]
    fn hit_path_leaf() {
        let (tree, root, a, _b, c, _d) = build_tree();
        // (16, 16) is inside c (absolute 15..25).
        assert_eq!(tree.hit_path(Offset::new(16, 16)), vec![root, a, c]);
    }

    #[test]
    fn hit_path_container_only() {
        let (tree, root, a, ..) = build_tree();
        // (12, 45) is inside a but outside both its children.
        assert_eq!(tree.hit_path(Offset::new(12, 45)), vec![root, a]);
    }

    #[test]
    fn hit_path_miss() {
        let (tree, ..) = build_tree();
        assert!(tree.hit_path(Offset::new(200, 200)).is_empty());
    }

    #[test]
    fn hit_path_skips_invisible() {
        let (mut tree, root, a, _b, _c, _d) = build_tree();
        tree.get_mut(a).unwrap().visible = false;
        // Point inside a, but a is invisible: the path stops at root.
        assert_eq!(tree.hit_path(Offset::new(16, 16)), vec![root]);
    }

    #[test]
    fn hit_path_prefers_topmost_sibling() {
        let mut tree = WidgetTree::new();
        let root = tree.insert(WidgetState::new().with_bounds(Region::new(0, 0, 50, 50)));
        let under = tree.insert_child(root, WidgetState::new().with_bounds(Region::new(0, 0, 50, 50)));
        let over = tree.insert_child(root, WidgetState::new().with_bounds(Region::new(0, 0, 50, 50)));
        let path = tree.hit_path(Offset::new(10, 10));
        assert_eq!(path, vec![root, over]);
        assert!(!path.contains(&under));
    }

    // -----------------------------------------------------------------------
    // Paint order
    // -----------------------------------------------------------------------

    #[test]
    fn paint_order_parents_before_children() {
        let (tree, root, a, b, c, d) = build_tree();
        let order: Vec<WidgetId> = tree.paint_order().iter().map(|&(id, _)| id).collect();
        assert_eq!(order, vec![root, a, c, d, b]);
    }

    #[test]
    fn paint_order_absolute_regions() {
        let (tree, _root, _a, _b, c, _d) = build_tree();
        let regions = tree.paint_order();
        let (_, region) = regions.iter().find(|&&(id, _)| id == c).unwrap();
        assert_eq!(*region, Region::new(15, 15, 10, 10));
    }

    #[test]
    fn paint_order_skips_invisible_subtree() {
        let (mut tree, root, a, b, ..) = build_tree();
        tree.get_mut(a).unwrap().visible = false;
        let order: Vec<WidgetId> = tree.paint_order().iter().map(|&(id, _)| id).collect();
        assert_eq!(order, vec![root, b]);
    }

    #[test]
    fn paint_order_empty_tree() {
        let tree = WidgetTree::new();
        assert!(tree.paint_order().is_empty());
    }

    #[test]
    fn default_impl() {
        let tree = WidgetTree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }
}
