//! Domain-level errors and build diagnostics (no external dependencies)

use std::fmt;

use thiserror::Error;

use crate::domain::path::Path;

/// Domain errors are fatal to the single call that raised them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no node at path: {path}")]
    ElementNotFound { path: Path },

    #[error("no node with id: {0}")]
    IdNotFound(String),

    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("cannot move {id}: {reason}")]
    InvalidMove { id: String, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Recoverable conditions found while building a forest. The build still
/// completes; these are reported alongside the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Parent chain loops back on itself; `id` was demoted to top-level.
    Cycle { id: String, parent: String },
    /// `parent` names no known record; `id` was demoted to top-level.
    DanglingParent { id: String, parent: String },
    /// A later record reused `id` and was dropped.
    DuplicateIdentifier { id: String },
}

impl Diagnostic {
    pub fn id(&self) -> &str {
        match self {
            Diagnostic::Cycle { id, .. }
            | Diagnostic::DanglingParent { id, .. }
            | Diagnostic::DuplicateIdentifier { id } => id,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Cycle { id, parent } => {
                write!(f, "cyclic parent chain: {} -> {}, moved to top level", id, parent)
            }
            Diagnostic::DanglingParent { id, parent } => {
                write!(f, "unknown parent {} for {}, moved to top level", parent, id)
            }
            Diagnostic::DuplicateIdentifier { id } => {
                write!(f, "duplicate identifier {}, later record dropped", id)
            }
        }
    }
}
