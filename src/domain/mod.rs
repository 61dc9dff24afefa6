//! Domain layer: the aggregate tree engine
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod aggregate;
pub mod arena;
pub mod builder;
pub mod error;
pub mod lifecycle;
pub mod path;
pub mod query;
pub mod render;
pub mod seed;

pub use aggregate::{Aggregate, AggregateKind, Attributes, Key, Pass, Variant};
pub use arena::{AggregateTree, NodeId, TreeIterator, TreeNode};
pub use builder::AggregateBuilder;
pub use error::{AggregateError, AggregateResult};
pub use lifecycle::NodeContext;
pub use render::TreeNodeConvert;
