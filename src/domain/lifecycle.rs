//! Two-pass lifecycle driver.
//!
//! `create(First)` and `create(Second)` each walk the whole tree in pre-order
//! and call `on_create` on every node. Nothing is remembered between passes
//! except that the tree is sealed against further attachment.

use tracing::{info, instrument, trace};
use uuid::Uuid;

use crate::domain::aggregate::{Aggregate, Key, Pass, Variant};
use crate::domain::arena::{AggregateTree, NodeId, TreeNode};
use crate::domain::error::{AggregateError, AggregateResult};
use crate::domain::seed;

/// Read-only view handed to lifecycle hooks.
///
/// The hook's own payload is its `&mut self`; the tree holds no payload for
/// that node while the hook runs, so reading it through the tree yields
/// [`AggregateError::Busy`].
#[derive(Debug)]
pub struct NodeContext<'a, A: Aggregate> {
    tree: &'a AggregateTree<A>,
    id: NodeId,
    node: &'a TreeNode<A>,
}

impl<'a, A: Aggregate> NodeContext<'a, A> {
    pub(crate) fn new(tree: &'a AggregateTree<A>, id: NodeId) -> AggregateResult<Self> {
        let node = tree.node(id)?;
        Ok(Self { tree, id, node })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a AggregateTree<A> {
        self.tree
    }

    pub fn kind(&self) -> A::Kind {
        self.node.kind
    }

    pub fn seed(&self) -> i64 {
        self.node.seed
    }

    pub fn key(&self) -> Option<&'a Key> {
        self.node.key.as_ref()
    }

    pub fn uuid(&self) -> Option<Uuid> {
        self.node.uuid
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    pub fn children(&self) -> &'a [NodeId] {
        &self.node.children
    }

    pub fn path(&self) -> AggregateResult<String> {
        self.tree.path(self.id)
    }

    pub fn next_bounded_int(&self, local_seed: i64, bound: u32) -> AggregateResult<u32> {
        seed::next_bounded_int(self.node.seed, local_seed, bound)
    }

    pub fn seeded_uuid(&self, local_seed: i64) -> Uuid {
        seed::seeded_uuid(self.node.seed, local_seed)
    }

    /// Concrete fixture held by another node.
    pub fn get<T: Variant<A>>(&self, id: NodeId) -> AggregateResult<&'a T> {
        self.tree.get(id)
    }

    pub fn ancestor_of(&self, kind: A::Kind) -> AggregateResult<NodeId> {
        self.tree.ancestor_of(self.id, kind)
    }

    pub fn child_at(&self, kind: A::Kind, index: usize) -> AggregateResult<NodeId> {
        self.tree.child_at(self.id, kind, index)
    }

    pub fn child_by_key(&self, kind: A::Kind, key: &Key) -> AggregateResult<NodeId> {
        self.tree.child_by_key(self.id, kind, key)
    }

    pub fn descendant_by_key(&self, kind: A::Kind, key: &Key) -> AggregateResult<NodeId> {
        self.tree.descendant_by_key(self.id, kind, key)
    }
}

impl<A: Aggregate> AggregateTree<A> {
    /// Run one pass over the whole tree.
    pub fn create(&mut self, pass: Pass) -> AggregateResult<()> {
        self.create_from(self.root, pass)
    }

    /// Run both passes over the whole tree, First then Second.
    pub fn create_all(&mut self) -> AggregateResult<()> {
        self.create(Pass::First)?;
        self.create(Pass::Second)
    }

    /// Run one pass over the subtree rooted at `start`, in pre-order.
    ///
    /// The tree dump is logged only when a First pass starts at the root.
    #[instrument(level = "debug", skip(self))]
    pub fn create_from(&mut self, start: NodeId, pass: Pass) -> AggregateResult<()> {
        let order: Vec<NodeId> = self.iter_from(start)?.map(|(id, _)| id).collect();
        self.sealed = true;

        if pass == Pass::First && start == self.root && self.settings.dump_tree {
            info!("Aggregate tree:\n{}", self.render_with(self.settings.render_style));
        }

        for id in order {
            self.create_node(id, pass)?;
        }
        Ok(())
    }

    fn create_node(&mut self, id: NodeId, pass: Pass) -> AggregateResult<()> {
        let checked_out = self.node_mut(id)?.aggregate.take();
        let mut aggregate = match checked_out {
            Some(aggregate) => aggregate,
            None => return Err(AggregateError::Busy(self.describe(id))),
        };
        trace!(node = %id, ?pass, "on_create");

        let result = NodeContext::new(self, id).and_then(|ctx| aggregate.on_create(pass, &ctx));
        self.node_mut(id)?.aggregate = Some(aggregate);
        result
    }
}
