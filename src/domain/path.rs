//! Structural addresses of nodes.
//!
//! The root renders as `/Name`; every other node appends `/Name(i)` to its
//! parent's path, where `i` counts the same-kind siblings attached before it.
//! Keys and uuids never take part, so the path depends on shape alone.

use tracing::instrument;

use crate::domain::aggregate::Aggregate;
use crate::domain::arena::{AggregateTree, NodeId};
use crate::domain::error::AggregateResult;

impl<A: Aggregate> AggregateTree<A> {
    /// Number of same-kind siblings preceding `id` in its parent's children.
    pub fn child_index(&self, id: NodeId) -> AggregateResult<usize> {
        let node = self.node(id)?;
        let Some(parent) = node.parent else {
            return Ok(0);
        };
        let mut index = 0;
        for &sibling in &self.node(parent)?.children {
            if sibling == id {
                break;
            }
            if self.node(sibling)?.matches(node.kind) {
                index += 1;
            }
        }
        Ok(index)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn path(&self, id: NodeId) -> AggregateResult<String> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let node = self.node(cur)?;
            if node.parent.is_some() {
                segments.push(format!("/{}({})", node.name, self.child_index(cur)?));
            } else {
                segments.push(format!("/{}", node.name));
            }
            current = node.parent;
        }
        Ok(segments.into_iter().rev().collect())
    }
}
