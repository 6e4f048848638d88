//! Domain layer: the menu engine
//!
//! Pure transformations between flat menu records and the nested forest,
//! plus path-addressed edits. No I/O, no config loading.

pub mod builder;
pub mod editor;
pub mod entities;
pub mod error;
pub mod flatten;
pub mod ident;
pub mod locate;
pub mod path;

pub use builder::{build_forest, BuildOutput, DuplicatePolicy, TreeBuilder};
pub use editor::{insert, move_node, remove, replace, replace_whole, NodePatch};
pub use entities::{FlatNode, Forest, LinkTarget, TreeNode};
pub use error::{Diagnostic, DomainError, DomainResult};
pub use flatten::{flatten, TreeFlattener, DEFAULT_ORDER_STEP, MAX_ORDER_STEP};
pub use locate::{locate, locate_or_err};
pub use path::{Path, PathStep};

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
///
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
