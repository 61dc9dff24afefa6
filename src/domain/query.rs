//! Typed lookups over the aggregate tree.
//!
//! Every lookup that expects exactly one node fails with a not-found error
//! instead of returning an empty value.

use tracing::instrument;

use crate::domain::aggregate::{Aggregate, Key};
use crate::domain::arena::{AggregateTree, NodeId};
use crate::domain::error::{AggregateError, AggregateResult};

impl<A: Aggregate> AggregateTree<A> {
    /// The `index`-th direct child of `kind`, in insertion order.
    pub fn child_at(&self, parent: NodeId, kind: A::Kind, index: usize) -> AggregateResult<NodeId> {
        let matching = self.all_children(parent, kind)?;
        matching
            .get(index)
            .copied()
            .ok_or_else(|| AggregateError::ChildIndexOutOfRange {
                parent: self.describe(parent),
                kind: kind.to_string(),
                index,
                count: matching.len(),
            })
    }

    /// First direct child matching both `kind` and `key`.
    pub fn child_by_key(&self, parent: NodeId, kind: A::Kind, key: &Key) -> AggregateResult<NodeId> {
        for &child in self.children(parent)? {
            if self.node(child)?.matches_key(kind, key) {
                return Ok(child);
            }
        }
        Err(AggregateError::ChildNotFound {
            parent: self.describe(parent),
            kind: kind.to_string(),
            key: key.to_string(),
        })
    }

    /// Direct children of `kind`, in insertion order.
    pub fn all_children(&self, parent: NodeId, kind: A::Kind) -> AggregateResult<Vec<NodeId>> {
        let mut matching = Vec::new();
        for &child in self.children(parent)? {
            if self.node(child)?.matches(kind) {
                matching.push(child);
            }
        }
        Ok(matching)
    }

    pub fn child_count(&self, parent: NodeId, kind: A::Kind) -> AggregateResult<usize> {
        Ok(self.all_children(parent, kind)?.len())
    }

    /// Descendants of `kind` at any depth below `id`.
    #[instrument(level = "trace", skip(self))]
    pub fn descendant_count(&self, id: NodeId, kind: A::Kind) -> AggregateResult<usize> {
        let mut count = self.child_count(id, kind)?;
        for &child in self.children(id)? {
            count += self.descendant_count(child, kind)?;
        }
        Ok(count)
    }

    /// Descendants of `kind` at any depth below `id`, in pre-order.
    pub fn descendants(&self, id: NodeId, kind: A::Kind) -> AggregateResult<Vec<NodeId>> {
        Ok(self
            .iter_from(id)?
            .skip(1)
            .filter(|(_, node)| node.matches(kind))
            .map(|(descendant, _)| descendant)
            .collect())
    }

    /// Descendant matching `kind` and `key`.
    ///
    /// Direct children are checked first; only then is each child's subtree
    /// searched, in insertion order. The first hit wins.
    #[instrument(level = "debug", skip(self))]
    pub fn descendant_by_key(&self, id: NodeId, kind: A::Kind, key: &Key) -> AggregateResult<NodeId> {
        self.find_descendant(id, kind, key)?
            .ok_or_else(|| AggregateError::DescendantNotFound {
                origin: self.describe(id),
                kind: kind.to_string(),
                key: key.to_string(),
            })
    }

    fn find_descendant(&self, id: NodeId, kind: A::Kind, key: &Key) -> AggregateResult<Option<NodeId>> {
        let children = self.children(id)?;
        for &child in children {
            if self.node(child)?.matches_key(kind, key) {
                return Ok(Some(child));
            }
        }
        for &child in children {
            if let Some(found) = self.find_descendant(child, kind, key)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Nearest ancestor whose kind is exactly `kind`.
    #[instrument(level = "debug", skip(self))]
    pub fn ancestor_of(&self, id: NodeId, kind: A::Kind) -> AggregateResult<NodeId> {
        let mut current = self.node(id)?.parent;
        while let Some(ancestor) = current {
            let node = self.node(ancestor)?;
            if node.matches(kind) {
                return Ok(ancestor);
            }
            current = node.parent;
        }
        Err(AggregateError::AncestorNotFound {
            origin: self.describe(id),
            kind: kind.to_string(),
        })
    }
}
