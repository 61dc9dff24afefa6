//! Tree builder: attaches aggregates, seeds them and runs their configuration.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::Settings;
use crate::domain::aggregate::{Aggregate, Key, Variant};
use crate::domain::arena::{AggregateTree, NodeId};
use crate::domain::error::{AggregateError, AggregateResult};
use crate::domain::lifecycle::NodeContext;
use crate::domain::seed;

impl<A: Aggregate> AggregateTree<A> {
    /// Build a tree around `root` with default settings.
    ///
    /// Config files and `AGGTREE_*` variables are not consulted here; pass
    /// the result of [`Settings::load`] to [`AggregateTree::build_with`] to
    /// honour them.
    pub fn build<F>(root: A, configure: F) -> AggregateResult<Self>
    where
        F: FnOnce(&mut AggregateBuilder<'_, A>) -> AggregateResult<()>,
    {
        Self::build_with(Settings::default(), root, configure)
    }

    /// Build a tree around `root`.
    ///
    /// The root is seeded from its own path and constructed like any other
    /// node, then `configure` runs against it.
    #[instrument(level = "debug", skip_all)]
    pub fn build_with<F>(settings: Settings, mut root: A, configure: F) -> AggregateResult<Self>
    where
        F: FnOnce(&mut AggregateBuilder<'_, A>) -> AggregateResult<()>,
    {
        let mut tree = Self::with_root(settings, &root);
        let id = tree.root;
        tree.construct(id, &mut root)?;
        let node = tree.node_mut(id)?;
        node.aggregate = Some(root);
        let seed = node.seed;

        let mut builder = AggregateBuilder { tree: &mut tree, id, seed };
        configure(&mut builder)?;
        Ok(tree)
    }

    /// Attach `aggregate` under `parent`.
    ///
    /// In order: link it into the parent's children, derive its seed from its
    /// path, run its `on_construct` hook, then run `configure` against it.
    /// If the hook or `configure` fails, the node and everything attached
    /// beneath it are unlinked again.
    #[instrument(level = "debug", skip(self, aggregate, configure))]
    pub fn attach<F>(&mut self, parent: NodeId, mut aggregate: A, configure: F) -> AggregateResult<NodeId>
    where
        F: FnOnce(&mut AggregateBuilder<'_, A>) -> AggregateResult<()>,
    {
        if self.sealed {
            return Err(AggregateError::Sealed {
                parent: self.describe(parent),
                name: aggregate.display_name(),
            });
        }
        let id = self.insert_node(&aggregate, parent)?;
        if let Err(e) = self.construct(id, &mut aggregate) {
            self.remove_node(id);
            return Err(e);
        }
        let node = self.node_mut(id)?;
        node.aggregate = Some(aggregate);
        let seed = node.seed;

        let mut builder = AggregateBuilder { tree: self, id, seed };
        if let Err(e) = configure(&mut builder) {
            self.remove_node(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Seed the freshly linked node and run its construction hook.
    fn construct(&mut self, id: NodeId, aggregate: &mut A) -> AggregateResult<()> {
        let path = self.path(id)?;
        let seed = seed::seed_for_path(&path);
        self.node_mut(id)?.seed = seed;
        debug!(%path, seed, "attached");

        let ctx = NodeContext::new(self, id)?;
        aggregate.on_construct(&ctx)
    }
}

/// Handle passed to configuration closures.
///
/// Sets the key and uuid of one freshly attached node, reaches its payload and
/// attaches further children beneath it.
#[derive(Debug)]
pub struct AggregateBuilder<'t, A: Aggregate> {
    tree: &'t mut AggregateTree<A>,
    id: NodeId,
    seed: i64,
}

impl<'t, A: Aggregate> AggregateBuilder<'t, A> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &AggregateTree<A> {
        &*self.tree
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn path(&self) -> AggregateResult<String> {
        self.tree.path(self.id)
    }

    pub fn key(&mut self, key: impl Into<Key>) -> AggregateResult<&mut Self> {
        self.tree.node_mut(self.id)?.key = Some(key.into());
        Ok(self)
    }

    pub fn uuid(&mut self, uuid: Uuid) -> AggregateResult<&mut Self> {
        self.tree.node_mut(self.id)?.uuid = Some(uuid);
        Ok(self)
    }

    /// Assign a uuid derived from the node's seed.
    pub fn seeded_uuid(&mut self, local_seed: i64) -> AggregateResult<&mut Self> {
        self.uuid(seed::seeded_uuid(self.seed, local_seed))
    }

    pub fn next_bounded_int(&self, local_seed: i64, bound: u32) -> AggregateResult<u32> {
        seed::next_bounded_int(self.seed, local_seed, bound)
    }

    pub fn aggregate(&self) -> AggregateResult<&A> {
        self.tree.aggregate(self.id)
    }

    pub fn aggregate_mut(&mut self) -> AggregateResult<&mut A> {
        self.tree.aggregate_mut(self.id)
    }

    pub fn get<T: Variant<A>>(&self) -> AggregateResult<&T> {
        self.tree.get(self.id)
    }

    pub fn get_mut<T: Variant<A>>(&mut self) -> AggregateResult<&mut T> {
        self.tree.get_mut(self.id)
    }

    /// Attach a child beneath this node.
    pub fn attach<F>(&mut self, aggregate: A, configure: F) -> AggregateResult<NodeId>
    where
        F: FnOnce(&mut AggregateBuilder<'_, A>) -> AggregateResult<()>,
    {
        self.tree.attach(self.id, aggregate, configure)
    }
}
