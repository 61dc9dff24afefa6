//! aggtree: hierarchical test fixtures.
//!
//! A test declares a tree of aggregates. Each node is seeded from its
//! structural path, constructed once at attach time, created in two pre-order
//! passes, and afterwards queried by kind, key, ancestry or descent.

pub mod config;
pub mod domain;
pub mod util;

pub use config::{RenderStyle, Settings, SettingsError};
pub use domain::{
    Aggregate, AggregateBuilder, AggregateError, AggregateKind, AggregateResult, AggregateTree,
    Attributes, Key, NodeContext, NodeId, Pass, TreeNode, Variant,
};
