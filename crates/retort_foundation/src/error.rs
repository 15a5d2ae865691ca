//! Error types for the Retort system.
//!
//! Uses `thiserror` for ergonomic error definition. Compilation errors are
//! surfaced at rule-registration time; runtime errors are either tolerated
//! no-ops (handled locally, never constructed) or fail-fast invariant
//! violations that halt propagation rather than corrupt node memory.

use std::fmt;

use thiserror::Error;

use crate::fact::FactId;

/// Result alias used throughout Retort.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Retort operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an unbound-variable compilation error.
    #[must_use]
    pub fn unbound_variable(rule: impl Into<String>, variable: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundVariable {
            rule: rule.into(),
            variable: variable.into(),
        })
    }

    /// Creates an unsupported-condition compilation error.
    #[must_use]
    pub fn unsupported_condition(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedCondition {
            rule: rule.into(),
            detail: detail.into(),
        })
    }

    /// Creates a duplicate-rule registration error.
    #[must_use]
    pub fn duplicate_rule(rule: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateRule { rule: rule.into() })
    }

    /// Creates a context-merge conflict error (invariant violation).
    #[must_use]
    pub fn context_conflict(variable: impl Into<String>) -> Self {
        Self::new(ErrorKind::ContextConflict {
            variable: variable.into(),
        })
    }

    /// Creates an unknown-fact error.
    #[must_use]
    pub fn unknown_fact(id: FactId) -> Self {
        Self::new(ErrorKind::UnknownFact(id))
    }

    /// Creates a runtime limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: RuntimeLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an internal error (should not happen).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A rule's boolean test references a variable no earlier pattern binds.
    #[error("rule {rule}: test references unbound variable {variable}")]
    UnboundVariable {
        /// The rule being compiled.
        rule: String,
        /// The variable that was not bound.
        variable: String,
    },

    /// A rule uses a construct the compiler cannot wire.
    #[error("rule {rule}: unsupported condition: {detail}")]
    UnsupportedCondition {
        /// The rule being compiled.
        rule: String,
        /// Description of the offending construct.
        detail: String,
    },

    /// A rule name was registered twice.
    #[error("rule {rule}: already registered")]
    DuplicateRule {
        /// The rule name.
        rule: String,
    },

    /// Two binding contexts the compiler guaranteed consistent disagreed
    /// at a join. Indicates a compiler defect, not bad input data.
    #[error("context merge conflict on variable {variable}")]
    ContextConflict {
        /// The variable with conflicting bindings.
        variable: String,
    },

    /// A fact id was not found in the fact list.
    #[error("unknown fact: {0:?}")]
    UnknownFact(FactId),

    /// Runtime limit exceeded (kill switch triggered).
    #[error("limit exceeded: {0}")]
    LimitExceeded(RuntimeLimit),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Runtime limits (kill switches) that can be exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeLimit {
    /// Maximum rule firings per run exceeded.
    MaxFirings {
        /// The configured limit.
        limit: u32,
    },
}

impl fmt::Display for RuntimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxFirings { limit } => {
                write!(f, "max firings ({limit}) exceeded")
            }
        }
    }
}
