use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::{Arena, Index};
use tracing::instrument;
use uuid::Uuid;

use crate::config::Settings;
use crate::domain::aggregate::{Aggregate, Key, Variant};
use crate::domain::error::{AggregateError, AggregateResult};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable address of a node: owning tree plus arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u64,
    index: Index,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.index.into_raw_parts();
        write!(f, "#{}:{}.{}", self.tree, slot, generation)
    }
}

/// Tree node in the arena-based aggregate hierarchy.
#[derive(Debug)]
pub struct TreeNode<A: Aggregate> {
    pub(crate) kind: A::Kind,
    pub(crate) name: String,
    pub(crate) key: Option<Key>,
    pub(crate) uuid: Option<Uuid>,
    pub(crate) seed: i64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// None while a lifecycle hook has the payload checked out
    pub(crate) aggregate: Option<A>,
}

impl<A: Aggregate> TreeNode<A> {
    fn new(aggregate: &A, parent: Option<NodeId>) -> Self {
        Self {
            kind: aggregate.kind(),
            name: aggregate.display_name(),
            key: None,
            uuid: None,
            seed: 0,
            parent,
            children: Vec::new(),
            aggregate: None,
        }
    }

    pub fn kind(&self) -> A::Kind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn aggregate(&self) -> Option<&A> {
        self.aggregate.as_ref()
    }

    pub(crate) fn matches(&self, kind: A::Kind) -> bool {
        self.kind == kind
    }

    pub(crate) fn matches_key(&self, kind: A::Kind, key: &Key) -> bool {
        self.kind == kind && self.key.as_ref() == Some(key)
    }
}

/// Arena-based tree of aggregates.
///
/// Owns every node; parent and children links are `NodeId`s into the arena,
/// so there is no reference cycle. Nodes are never removed once attached
/// successfully.
#[derive(Debug)]
pub struct AggregateTree<A: Aggregate> {
    pub(crate) tree: u64,
    pub(crate) arena: Arena<TreeNode<A>>,
    pub(crate) root: NodeId,
    pub(crate) settings: Settings,
    /// Set once the lifecycle driver has started
    pub(crate) sealed: bool,
}

impl<A: Aggregate> AggregateTree<A> {
    /// Allocates the tree with an unseeded root slot.
    pub(crate) fn with_root(settings: Settings, root: &A) -> Self {
        let tree = NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed);
        let mut arena = Arena::new();
        let index = arena.insert(TreeNode::new(root, None));
        Self {
            tree,
            arena,
            root: NodeId { tree, index },
            settings,
            sealed: false,
        }
    }

    #[instrument(level = "trace", skip(self, aggregate))]
    pub(crate) fn insert_node(&mut self, aggregate: &A, parent: NodeId) -> AggregateResult<NodeId> {
        self.node(parent)?;
        let index = self.arena.insert(TreeNode::new(aggregate, Some(parent)));
        let id = NodeId {
            tree: self.tree,
            index,
        };
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Undoes `insert_node` for a node that never finished attaching,
    /// together with any subtree already attached beneath it.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove_node(&mut self, id: NodeId) {
        let subtree: Vec<NodeId> = self
            .iter_from(id)
            .map(|nodes| nodes.map(|(node, _)| node).collect())
            .unwrap_or_default();
        let parent = self.node(id).ok().and_then(|n| n.parent);
        for node in subtree {
            self.arena.remove(node.index);
        }
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p.index)) {
            parent.children.retain(|&c| c != id);
        }
    }

    pub fn node(&self, id: NodeId) -> AggregateResult<&TreeNode<A>> {
        if id.tree != self.tree {
            return Err(AggregateError::ForeignNode(id.to_string()));
        }
        self.arena
            .get(id.index)
            .ok_or_else(|| AggregateError::UnknownNode(id.to_string()))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> AggregateResult<&mut TreeNode<A>> {
        if id.tree != self.tree {
            return Err(AggregateError::ForeignNode(id.to_string()));
        }
        self.arena
            .get_mut(id.index)
            .ok_or_else(|| AggregateError::UnknownNode(id.to_string()))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn parent(&self, id: NodeId) -> AggregateResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> AggregateResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn aggregate(&self, id: NodeId) -> AggregateResult<&A> {
        self.node(id)?
            .aggregate
            .as_ref()
            .ok_or_else(|| AggregateError::Busy(self.describe(id)))
    }

    pub fn aggregate_mut(&mut self, id: NodeId) -> AggregateResult<&mut A> {
        if self.node(id)?.aggregate.is_none() {
            return Err(AggregateError::Busy(self.describe(id)));
        }
        self.node_mut(id)?
            .aggregate
            .as_mut()
            .ok_or_else(|| AggregateError::Busy(id.to_string()))
    }

    /// Concrete fixture held by `id`.
    pub fn get<T: Variant<A>>(&self, id: NodeId) -> AggregateResult<&T> {
        T::view(self.aggregate(id)?).ok_or_else(|| self.kind_mismatch::<T>(id))
    }

    pub fn get_mut<T: Variant<A>>(&mut self, id: NodeId) -> AggregateResult<&mut T> {
        if T::view(self.aggregate(id)?).is_none() {
            return Err(self.kind_mismatch::<T>(id));
        }
        T::view_mut(self.aggregate_mut(id)?).ok_or_else(|| AggregateError::Busy(id.to_string()))
    }

    fn kind_mismatch<T>(&self, id: NodeId) -> AggregateError {
        AggregateError::KindMismatch {
            path: self.describe(id),
            expected: std::any::type_name::<T>().to_string(),
            actual: self
                .node(id)
                .map(|n| n.kind.to_string())
                .unwrap_or_default(),
        }
    }

    /// Path of `id` for error messages, falling back to the raw id.
    pub(crate) fn describe(&self, id: NodeId) -> String {
        self.path(id).unwrap_or_else(|_| id.to_string())
    }

    /// Pre-order traversal from the root, children in insertion order.
    pub fn iter(&self) -> TreeIterator<'_, A> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn iter_from(&self, id: NodeId) -> AggregateResult<TreeIterator<'_, A>> {
        self.node(id)?;
        Ok(TreeIterator::new(self, id))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Ok(node) = self.node(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }
}

pub struct TreeIterator<'a, A: Aggregate> {
    tree: &'a AggregateTree<A>,
    stack: Vec<NodeId>,
}

impl<'a, A: Aggregate> TreeIterator<'a, A> {
    fn new(tree: &'a AggregateTree<A>, start: NodeId) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a, A: Aggregate> Iterator for TreeIterator<'a, A> {
    type Item = (NodeId, &'a TreeNode<A>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.tree.node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}
