//! Arena storage for an ordered forest of nodes.
//!
//! Nodes live in a map keyed by [`NodeId`]; the top-level list and each
//! container's child list hold ids. Moving a node between lists rewrites
//! two id lists and one parent link, never another node's id.

use std::collections::BTreeMap;
use std::ops::Deref;

use crate::error::TreeError;
use crate::node::{FourierTerm, IdGenerator, Node, NodeId, NodeKind};
use crate::params::ParamValue;

/// An ordered forest of nodes of one tool.
///
/// The top-level list plays the role of the fixed `ROOT` node's children.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTree<K> {
    nodes: BTreeMap<NodeId, Node<K>>,
    roots: Vec<NodeId>,
    ids: IdGenerator,
}

impl<K: NodeKind> Default for NodeTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: NodeKind> NodeTree<K> {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Total number of nodes at every depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(&id)
    }

    pub fn view(&self, id: NodeId) -> Option<NodeView<'_, K>> {
        self.nodes.get(&id).map(|node| NodeView { tree: self, node })
    }

    /// Top-level nodes, in order.
    pub fn roots(&self) -> Nodes<'_, K> {
        Nodes {
            tree: self,
            ids: self.roots.iter(),
        }
    }

    /// Keep ids issued by `other` from being issued again here.
    ///
    /// Restoring an older snapshot would otherwise rewind the id counter.
    pub fn reserve_ids_of(&mut self, other: &NodeTree<K>) {
        self.ids.absorb(&other.ids);
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every node at every depth, in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<K>> {
        self.nodes.values()
    }

    /// The id list of `parent`, or the top-level list for `None`.
    pub fn list(&self, parent: Option<NodeId>) -> Result<&[NodeId], TreeError> {
        match parent {
            None => Ok(&self.roots),
            Some(id) => {
                let node = self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))?;
                if node.kind.is_container() {
                    Ok(&node.children)
                } else {
                    Err(TreeError::NotAContainer(id))
                }
            }
        }
    }

    fn list_mut(&mut self, parent: Option<NodeId>) -> Result<&mut Vec<NodeId>, TreeError> {
        match parent {
            None => Ok(&mut self.roots),
            Some(id) => {
                let node = self.nodes.get_mut(&id).ok_or(TreeError::NodeNotFound(id))?;
                if node.kind.is_container() {
                    Ok(&mut node.children)
                } else {
                    Err(TreeError::NotAContainer(id))
                }
            }
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<K>, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::NodeNotFound(id))
    }

    /// Append a new top-level node with default parameters.
    pub fn push(&mut self, kind: K) -> NodeId {
        let id = self.ids.next_id();
        self.nodes.insert(id, Node::new(id, kind));
        self.roots.push(id);
        id
    }

    /// Insert a new node at `index` of `parent`'s list.
    pub fn insert(&mut self, parent: Option<NodeId>, index: usize, kind: K) -> Result<NodeId, TreeError> {
        let len = self.list(parent)?.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let id = self.ids.next_id();
        let mut node = Node::new(id, kind);
        node.parent = parent;
        self.nodes.insert(id, node);
        self.list_mut(parent)?.insert(index, id);
        Ok(id)
    }

    /// Append a new node to the end of `parent`'s list.
    pub fn append(&mut self, parent: Option<NodeId>, kind: K) -> Result<NodeId, TreeError> {
        let len = self.list(parent)?.len();
        self.insert(parent, len, kind)
    }

    /// Append an already built node, keeping its id when it is free.
    ///
    /// Used when loading saved trees. An id of `0` or one already in use is
    /// replaced with a fresh one. The node's own child list is reset; adopt
    /// children afterwards with this node's returned id as parent.
    pub fn adopt(&mut self, parent: Option<NodeId>, mut node: Node<K>) -> Result<NodeId, TreeError> {
        self.list(parent)?;
        if node.id.0 == 0 || self.nodes.contains_key(&node.id) {
            node.id = self.ids.next_id();
        } else {
            self.ids.observe(node.id);
        }
        let id = node.id;
        node.parent = parent;
        node.children.clear();
        self.nodes.insert(id, node);
        self.list_mut(parent)?.push(id);
        Ok(id)
    }

    /// Remove a node and, for containers, all of its descendants.
    pub fn remove(&mut self, id: NodeId) -> Result<Node<K>, TreeError> {
        let parent = self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))?.parent;
        self.list_mut(parent)?.retain(|child| *child != id);

        let mut pending = vec![id];
        let mut removed = None;
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children.iter().copied());
                if next == id {
                    removed = Some(node);
                }
            }
        }
        removed.ok_or(TreeError::NodeNotFound(id))
    }

    /// Move a node to `index` of `parent`'s list.
    ///
    /// `index` counts positions in the destination list after the node has
    /// been taken out of its current list.
    pub fn move_node(&mut self, id: NodeId, parent: Option<NodeId>, index: usize) -> Result<(), TreeError> {
        let old_parent = self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))?.parent;
        if let Some(target) = parent {
            if self.is_within(target, id) {
                return Err(TreeError::MoveIntoSelf(id));
            }
        }
        self.list(parent)?;

        let old_list = self.list_mut(old_parent)?;
        let old_index = old_list
            .iter()
            .position(|child| *child == id)
            .ok_or(TreeError::NodeNotFound(id))?;
        old_list.remove(old_index);

        let len = self.list(parent)?.len();
        if index > len {
            // Put it back where it was.
            self.list_mut(old_parent)?.insert(old_index, id);
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        self.list_mut(parent)?.insert(index, id);
        self.node_mut(id)?.parent = parent;
        Ok(())
    }

    /// Whether `id` is `ancestor` or lies below it.
    fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.nodes.get(&next).and_then(|node| node.parent);
        }
        false
    }

    /// Deep-copy a node with fresh ids and insert the copy right after it.
    pub fn duplicate(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        let parent = self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))?.parent;
        let index = self
            .list(parent)?
            .iter()
            .position(|child| *child == id)
            .ok_or(TreeError::NodeNotFound(id))?;
        let copy = self.copy_subtree(id, parent)?;
        self.list_mut(parent)?.insert(index + 1, copy);
        Ok(copy)
    }

    fn copy_subtree(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<NodeId, TreeError> {
        let source = self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))?.clone();
        let new_id = self.ids.next_id();
        let mut copy = source.clone();
        copy.id = new_id;
        copy.parent = parent;
        copy.children = Vec::with_capacity(source.children.len());
        self.nodes.insert(new_id, copy);

        for child in &source.children {
            let child_copy = self.copy_subtree(*child, Some(new_id))?;
            self.node_mut(new_id)?.children.push(child_copy);
        }
        Ok(new_id)
    }

    pub fn set_param(&mut self, id: NodeId, key: &str, value: &ParamValue) -> Result<(), TreeError> {
        self.node_mut(id)?.kind.set_param(key, value)?;
        Ok(())
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.collapsed = collapsed;
        Ok(())
    }

    fn terms_mut(&mut self, id: NodeId) -> Result<&mut Vec<FourierTerm>, TreeError> {
        let node = self.node_mut(id)?;
        if node.kind.has_terms() {
            Ok(&mut node.terms)
        } else {
            Err(TreeError::NoTerms(id))
        }
    }

    /// Append a Fourier term, returning its index.
    pub fn add_term(&mut self, id: NodeId, term: FourierTerm) -> Result<usize, TreeError> {
        let terms = self.terms_mut(id)?;
        terms.push(term);
        Ok(terms.len() - 1)
    }

    pub fn set_term(&mut self, id: NodeId, index: usize, term: FourierTerm) -> Result<(), TreeError> {
        let terms = self.terms_mut(id)?;
        let len = terms.len();
        let slot = terms.get_mut(index).ok_or(TreeError::IndexOutOfRange { index, len })?;
        *slot = term;
        Ok(())
    }

    pub fn remove_term(&mut self, id: NodeId, index: usize) -> Result<FourierTerm, TreeError> {
        let terms = self.terms_mut(id)?;
        if index >= terms.len() {
            return Err(TreeError::IndexOutOfRange { index, len: terms.len() });
        }
        Ok(terms.remove(index))
    }

    pub fn move_term(&mut self, id: NodeId, from: usize, to: usize) -> Result<(), TreeError> {
        let terms = self.terms_mut(id)?;
        let len = terms.len();
        if from >= len || to >= len {
            return Err(TreeError::IndexOutOfRange { index: from.max(to), len });
        }
        let term = terms.remove(from);
        terms.insert(to, term);
        Ok(())
    }
}

/// Borrowed view of a node together with its tree, for walking children.
pub struct NodeView<'a, K> {
    tree: &'a NodeTree<K>,
    node: &'a Node<K>,
}

impl<K> Clone for NodeView<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeView<'_, K> {}

impl<'a, K> NodeView<'a, K> {
    pub fn node(&self) -> &'a Node<K> {
        self.node
    }

    pub fn tree(&self) -> &'a NodeTree<K> {
        self.tree
    }

    /// Child nodes, in order.
    pub fn children(&self) -> Nodes<'a, K> {
        Nodes {
            tree: self.tree,
            ids: self.node.children.iter(),
        }
    }
}

impl<K> Deref for NodeView<'_, K> {
    type Target = Node<K>;

    fn deref(&self) -> &Self::Target {
        self.node
    }
}

/// Iterator over an ordered node list.
pub struct Nodes<'a, K> {
    tree: &'a NodeTree<K>,
    ids: std::slice::Iter<'a, NodeId>,
}

impl<K> Clone for Nodes<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            ids: self.ids.clone(),
        }
    }
}

impl<'a, K> Iterator for Nodes<'a, K> {
    type Item = NodeView<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            if let Some(node) = self.tree.nodes.get(id) {
                return Some(NodeView { tree: self.tree, node });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AddPoint, Geometry};
    use glam::DVec3;

    fn point(x: f64) -> Geometry {
        Geometry::AddPoint(AddPoint {
            point: DVec3::new(x, 0.0, 0.0),
        })
    }

    fn builder() -> Geometry {
        Geometry::from_name("with_builder").unwrap()
    }

    #[test]
    fn test_insert_and_order() {
        let mut tree = NodeTree::new();
        let a = tree.push(point(1.0));
        let c = tree.push(point(3.0));
        let b = tree.insert(None, 1, point(2.0)).unwrap();
        assert_eq!(tree.root_ids(), &[a, b, c]);
        assert_eq!(
            tree.insert(None, 9, point(0.0)),
            Err(TreeError::IndexOutOfRange { index: 9, len: 3 })
        );
    }

    #[test]
    fn test_children_only_in_containers() {
        let mut tree = NodeTree::new();
        let leaf = tree.push(point(1.0));
        assert_eq!(tree.append(Some(leaf), point(2.0)), Err(TreeError::NotAContainer(leaf)));

        let group = tree.push(builder());
        let child = tree.append(Some(group), point(2.0)).unwrap();
        assert_eq!(tree.get(child).unwrap().parent(), Some(group));
        let view = tree.view(group).unwrap();
        assert_eq!(view.children().count(), 1);
    }

    #[test]
    fn test_remove_discards_descendants() {
        let mut tree = NodeTree::new();
        let group = tree.push(builder());
        let inner = tree.append(Some(group), builder()).unwrap();
        let leaf = tree.append(Some(inner), point(1.0)).unwrap();
        let keep = tree.push(point(2.0));

        tree.remove(group).unwrap();
        assert!(!tree.contains(inner));
        assert!(!tree.contains(leaf));
        assert_eq!(tree.root_ids(), &[keep]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_move_keeps_ids() {
        let mut tree = NodeTree::new();
        let a = tree.push(point(1.0));
        let group = tree.push(builder());
        let b = tree.push(point(2.0));

        tree.move_node(a, Some(group), 0).unwrap();
        assert_eq!(tree.root_ids(), &[group, b]);
        assert_eq!(tree.get(group).unwrap().children, vec![a]);
        assert_eq!(tree.get(a).unwrap().id, a);
        assert_eq!(tree.get(a).unwrap().parent(), Some(group));

        tree.move_node(a, None, 2).unwrap();
        assert_eq!(tree.root_ids(), &[group, b, a]);
    }

    #[test]
    fn test_move_into_own_subtree_rejected() {
        let mut tree = NodeTree::new();
        let outer = tree.push(builder());
        let inner = tree.append(Some(outer), builder()).unwrap();
        assert_eq!(tree.move_node(outer, Some(inner), 0), Err(TreeError::MoveIntoSelf(outer)));
        assert_eq!(tree.move_node(outer, Some(outer), 0), Err(TreeError::MoveIntoSelf(outer)));
        assert_eq!(tree.root_ids(), &[outer]);
    }

    #[test]
    fn test_failed_move_restores_position() {
        let mut tree = NodeTree::new();
        let a = tree.push(point(1.0));
        let b = tree.push(point(2.0));
        assert!(tree.move_node(a, None, 5).is_err());
        assert_eq!(tree.root_ids(), &[a, b]);
    }

    #[test]
    fn test_duplicate_assigns_fresh_ids() {
        let mut tree = NodeTree::new();
        let group = tree.push(builder());
        let child = tree.append(Some(group), point(1.0)).unwrap();
        let after = tree.push(point(9.0));

        let copy = tree.duplicate(group).unwrap();
        assert_eq!(tree.root_ids(), &[group, copy, after]);
        let copied_children = &tree.get(copy).unwrap().children;
        assert_eq!(copied_children.len(), 1);
        assert_ne!(copied_children[0], child);
        assert_eq!(tree.get(copied_children[0]).unwrap().kind, point(1.0));
        assert_eq!(tree.get(group).unwrap().children, vec![child]);
    }

    #[test]
    fn test_ids_never_reused() {
        let mut tree = NodeTree::new();
        let a = tree.push(point(1.0));
        tree.remove(a).unwrap();
        let b = tree.push(point(1.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_terms_only_on_fourier() {
        let mut tree = NodeTree::new();
        let leaf = tree.push(point(1.0));
        assert_eq!(tree.add_term(leaf, FourierTerm::default()), Err(TreeError::NoTerms(leaf)));

        let series = tree.push(Geometry::from_name("add_fourier_series").unwrap());
        assert_eq!(tree.get(series).unwrap().terms.len(), 1);
        let second = FourierTerm { r: 0.5, w: 3.0, start_angle: 90.0 };
        assert_eq!(tree.add_term(series, second), Ok(1));
        tree.move_term(series, 1, 0).unwrap();
        assert_eq!(tree.get(series).unwrap().terms[0], second);
        assert_eq!(tree.remove_term(series, 0), Ok(second));
        assert!(tree.remove_term(series, 3).is_err());
    }

    #[test]
    fn test_set_param_rejects_unknown_key() {
        let mut tree = NodeTree::new();
        let a = tree.push(point(1.0));
        assert!(tree.set_param(a, "radius", &ParamValue::Number(1.0)).is_err());
        tree.set_param(a, "point", &ParamValue::Vec3([4.0, 5.0, 6.0])).unwrap();
        assert_eq!(tree.get(a).unwrap().kind, Geometry::AddPoint(AddPoint { point: DVec3::new(4.0, 5.0, 6.0) }));
    }
}
