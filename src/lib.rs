//! navtree: navigation menu synchronization engine
//!
//! Converts between the flat, weighted record list a menu is stored as and
//! the nested ordered forest it is edited as, and applies path-addressed
//! edits that keep both in step.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    build_forest, flatten, locate, BuildOutput, Diagnostic, DomainError, FlatNode, Forest,
    LinkTarget, NodePatch, Path, PathStep, TreeNode,
};
