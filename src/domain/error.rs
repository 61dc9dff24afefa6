//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Errors raised by the aggregate tree.
///
/// Lookups fail loudly: a missing child, key or ancestor is a fixture-authoring
/// bug and surfaces as one of the not-found variants below.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("child {kind}[{index}] not found under {parent}: only {count} present")]
    ChildIndexOutOfRange {
        parent: String,
        kind: String,
        index: usize,
        count: usize,
    },

    #[error("child {kind} with key={key} not found under {parent}")]
    ChildNotFound {
        parent: String,
        kind: String,
        key: String,
    },

    #[error("descendant {kind} with key={key} not found under {origin}")]
    DescendantNotFound {
        origin: String,
        kind: String,
        key: String,
    },

    #[error("ancestor {kind} not found above {origin}")]
    AncestorNotFound { origin: String, kind: String },

    #[error("node {0} belongs to another tree")]
    ForeignNode(String),

    #[error("node {0} does not exist")]
    UnknownNode(String),

    #[error("tree is sealed: cannot attach {name} under {parent} once creation has started")]
    Sealed { parent: String, name: String },

    #[error("aggregate at {0} is checked out by a running lifecycle hook")]
    Busy(String),

    #[error("aggregate at {path} is a {actual}, not a {expected}")]
    KindMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("random bound must be positive")]
    InvalidBound,

    #[error("{0}")]
    Fixture(String),
}

impl AggregateError {
    /// Error raised from fixture hook code.
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture(message.into())
    }

    /// A lookup could not locate its target.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ChildIndexOutOfRange { .. }
                | Self::ChildNotFound { .. }
                | Self::DescendantNotFound { .. }
                | Self::AncestorNotFound { .. }
        )
    }

    /// The tree was used in a way that would break its structure.
    pub fn is_structural_misuse(&self) -> bool {
        matches!(
            self,
            Self::ForeignNode(_)
                | Self::UnknownNode(_)
                | Self::Sealed { .. }
                | Self::Busy(_)
                | Self::KindMismatch { .. }
        )
    }
}

/// Result type for aggregate tree operations.
pub type AggregateResult<T> = Result<T, AggregateError>;
