//! Aggregate contract: what a fixture node must provide to live in the tree.

use std::fmt;
use std::hash::Hash;

use itertools::Itertools;

use crate::domain::error::AggregateResult;
use crate::domain::lifecycle::NodeContext;

/// Variant tag carried by every aggregate.
///
/// Usually a fieldless enum listing the fixture variants of a test suite.
/// All type-filtered queries compare tags by equality.
pub trait AggregateKind: Copy + Eq + Hash + fmt::Debug + fmt::Display + 'static {}

impl<T> AggregateKind for T where T: Copy + Eq + Hash + fmt::Debug + fmt::Display + 'static {}

/// Creation pass of the lifecycle driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {
    /// Variant-local setup
    First,
    /// Cross-references that need the whole tree attached
    Second,
}

/// Caller-assigned identifier, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Diagnostic snapshot of an aggregate's readable fields, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name=value`.
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.0.push((name.into(), value.to_string()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.0.iter().map(|(n, v)| format!("{}={}", n, v)).join(", ")
        )
    }
}

/// A fixture node.
///
/// Implemented once per test suite, typically on an enum whose variants are the
/// concrete fixtures. The hooks run synchronously:
/// - `on_construct` once, right after attachment and seeding, before the
///   caller's configuration closure
/// - `on_create` once per pass, in pre-order, when the lifecycle driver runs
pub trait Aggregate: fmt::Debug + Sized {
    type Kind: AggregateKind;

    fn kind(&self) -> Self::Kind;

    /// Label used in paths and diagnostics. Fixed per variant.
    fn display_name(&self) -> String {
        self.kind().to_string()
    }

    fn on_construct(&mut self, _ctx: &NodeContext<'_, Self>) -> AggregateResult<()> {
        Ok(())
    }

    fn on_create(&mut self, _pass: Pass, _ctx: &NodeContext<'_, Self>) -> AggregateResult<()> {
        Ok(())
    }

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }
}

/// Typed view of one concrete fixture inside an aggregate enum.
pub trait Variant<A: Aggregate>: Sized {
    fn view(aggregate: &A) -> Option<&Self>;

    fn view_mut(aggregate: &mut A) -> Option<&mut Self>;
}
