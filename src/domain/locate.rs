//! Path locator: finds the address of a node by id.

use std::collections::{HashSet, VecDeque};

use tracing::{instrument, trace};

use crate::domain::entities::{Forest, TreeNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::path::Path;

/// Breadth-first search for the first node whose id is `target`.
///
/// Nodes are tracked by address so a node reachable twice is expanded once.
#[instrument(level = "debug", skip(forest))]
pub fn locate(forest: &Forest, target: &str) -> Option<Path> {
    let mut visited: HashSet<*const TreeNode> = HashSet::new();
    let mut queue: VecDeque<(&TreeNode, Path)> = forest
        .roots()
        .iter()
        .enumerate()
        .map(|(i, node)| (node, Path::root(i)))
        .collect();

    while let Some((node, path)) = queue.pop_front() {
        if !visited.insert(node as *const TreeNode) {
            continue;
        }
        if node.id == target {
            trace!("located {} at {}", target, path);
            return Some(path);
        }
        for (i, child) in node.children.iter().enumerate() {
            queue.push_back((child, path.child(i)));
        }
    }
    None
}

/// Like [`locate`], failing with [`DomainError::IdNotFound`].
pub fn locate_or_err(forest: &Forest, target: &str) -> DomainResult<Path> {
    locate(forest, target).ok_or_else(|| DomainError::IdNotFound(target.to_string()))
}
