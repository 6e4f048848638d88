//! Domain entities: flat menu records and the nested editing tree

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use termtree::Tree;

use crate::domain::path::{Path, PathStep};

/// Persisted menu record: one entry of the flat adjacency list.
///
/// Field names on the wire follow the exchange format:
/// `identifier`, `name`, `weight`, `parent`, `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNode {
    #[serde(rename = "identifier")]
    pub id: String,
    #[serde(rename = "name")]
    pub label: String,
    /// Ascending ordering key among siblings
    #[serde(rename = "weight")]
    pub order_key: i64,
    /// Absent for top-level records
    #[serde(rename = "parent", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Present only on external-link records
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

impl FlatNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, order_key: i64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            order_key,
            parent_id: None,
            external_url: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }
}

/// What a menu entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkTarget {
    /// Identifier of externally managed content
    Content(String),
    /// Literal external URL
    External(String),
}

impl LinkTarget {
    pub fn is_external(&self) -> bool {
        matches!(self, LinkTarget::External(_))
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Content(id) => write!(f, "content:{}", id),
            LinkTarget::External(url) => write!(f, "{}", url),
        }
    }
}

/// Editing-form node. Children are exclusively owned and their order is the
/// display and serialization order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: String,
    pub label: String,
    pub link: LinkTarget,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Node linking to internal content; its id is the content id.
    pub fn content(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            link: LinkTarget::Content(id.clone()),
            id,
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn external(
        id: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            link: LinkTarget::External(url.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Number of nodes in this subtree, including self.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Ids of this node and all its descendants, pre-order.
    pub fn subtree_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.subtree_size());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.id.clone());
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        ids
    }

    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(self.to_string()).with_leaves(leaves)
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] -> {}", self.label, self.id, self.link)
    }
}

/// Ordered sequence of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub roots: Vec<TreeNode>,
}

impl Forest {
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(TreeNode::subtree_size).sum()
    }

    pub fn depth(&self) -> usize {
        self.roots.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Pre-order iterator over every node in the forest.
    pub fn iter(&self) -> ForestIter<'_> {
        ForestIter::new(self)
    }

    /// All ids in pre-order.
    pub fn ids(&self) -> Vec<String> {
        self.iter().map(|n| n.id.clone()).collect()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.iter().any(|n| n.id == id)
    }

    /// First id that occurs more than once, if any.
    pub fn first_duplicate_id(&self) -> Option<String> {
        let mut seen = HashSet::new();
        self.iter()
            .find(|n| !seen.insert(n.id.as_str()))
            .map(|n| n.id.clone())
    }

    /// Follow `path` from the roots.
    pub fn resolve(&self, path: &Path) -> Option<&TreeNode> {
        let mut group = &self.roots;
        let mut current = None;
        for step in path.steps() {
            match step {
                PathStep::Index(i) => {
                    let node = group.get(*i)?;
                    current = Some(node);
                }
                PathStep::Children => {
                    group = &current?.children;
                }
            }
        }
        current
    }

    pub fn resolve_mut(&mut self, path: &Path) -> Option<&mut TreeNode> {
        let mut indices = path.indices();
        let first = indices.next()?;
        let mut node = self.roots.get_mut(first)?;
        for i in indices {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Sibling group addressed by `parent`: the node's children, or the roots
    /// when `parent` is `None`.
    pub fn group_mut(&mut self, parent: Option<&Path>) -> Option<&mut Vec<TreeNode>> {
        match parent {
            None => Some(&mut self.roots),
            Some(path) => self.resolve_mut(path).map(|n| &mut n.children),
        }
    }

    /// Render as a `termtree` for terminal display.
    pub fn to_tree_string(&self, title: &str) -> Tree<String> {
        let leaves: Vec<_> = self.roots.iter().map(|n| n.to_tree_string()).collect();
        Tree::new(title.to_string()).with_leaves(leaves)
    }
}

impl Drop for Forest {
    // Unnest before dropping so deep chains don't recurse once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.roots);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl From<Vec<TreeNode>> for Forest {
    fn from(roots: Vec<TreeNode>) -> Self {
        Self::new(roots)
    }
}

pub struct ForestIter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> ForestIter<'a> {
    fn new(forest: &'a Forest) -> Self {
        Self {
            stack: forest.roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for ForestIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
