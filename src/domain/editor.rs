//! Tree editor: path-addressed mutations.
//!
//! Every operation takes the current forest by reference and returns a new
//! snapshot. On error the input is untouched and no snapshot is produced.

use tracing::{debug, instrument};

use crate::domain::entities::{Forest, LinkTarget, TreeNode};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::locate::locate_or_err;
use crate::domain::path::Path;

/// Fields to merge onto an existing node. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub link: Option<LinkTarget>,
}

impl NodePatch {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn link(mut self, link: LinkTarget) -> Self {
        self.link = Some(link);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.link.is_none()
    }
}

fn not_found(path: &Path) -> DomainError {
    DomainError::ElementNotFound { path: path.clone() }
}

/// Append `node` (children dropped) as the last child of `parent`, or as the
/// last root when `parent` is `None`.
#[instrument(level = "debug", skip(forest, node), fields(id = %node.id))]
pub fn insert(forest: &Forest, mut node: TreeNode, parent: Option<&Path>) -> DomainResult<Forest> {
    if forest.contains_id(&node.id) {
        return Err(DomainError::DuplicateIdentifier(node.id));
    }
    node.children.clear();

    let mut next = forest.clone();
    let group = match parent {
        None => &mut next.roots,
        Some(path) => next.group_mut(Some(path)).ok_or_else(|| not_found(path))?,
    };
    group.push(node);
    Ok(next)
}

/// Merge `patch` onto the node at `path`; its children are kept.
///
/// A content link also becomes the node's id, since internal entries are
/// identified by the content they reference.
#[instrument(level = "debug", skip(forest))]
pub fn replace(forest: &Forest, path: &Path, patch: NodePatch) -> DomainResult<Forest> {
    let current = forest.resolve(path).ok_or_else(|| not_found(path))?;
    if let Some(LinkTarget::Content(content_id)) = &patch.link {
        if *content_id != current.id && forest.contains_id(content_id) {
            return Err(DomainError::DuplicateIdentifier(content_id.clone()));
        }
    }

    let mut next = forest.clone();
    let node = next.resolve_mut(path).ok_or_else(|| not_found(path))?;
    if let Some(label) = patch.label {
        node.label = label;
    }
    if let Some(link) = patch.link {
        if let LinkTarget::Content(content_id) = &link {
            node.id = content_id.clone();
        }
        node.link = link;
    }
    Ok(next)
}

/// Remove the node at `path` together with its whole subtree.
#[instrument(level = "debug", skip(forest))]
pub fn remove(forest: &Forest, path: &Path) -> DomainResult<Forest> {
    let mut next = forest.clone();
    let group = next
        .group_mut(path.parent().as_ref())
        .ok_or_else(|| not_found(path))?;
    let index = path.last_index();
    if index >= group.len() {
        return Err(not_found(path));
    }
    let removed = group.remove(index);
    debug!("removed {} ({} nodes)", removed.id, removed.subtree_size());
    Ok(next)
}

/// Swap in a complete new arrangement. Only id uniqueness is checked.
#[instrument(level = "debug", skip_all, fields(from = current.node_count(), to = replacement.node_count()))]
pub fn replace_whole(current: &Forest, replacement: Forest) -> DomainResult<Forest> {
    if let Some(id) = replacement.first_duplicate_id() {
        return Err(DomainError::DuplicateIdentifier(id));
    }
    Ok(replacement)
}

/// Move the subtree at `from` under `to_parent` (roots when `None`) at
/// `position`, clamped to the group length; `None` appends.
#[instrument(level = "debug", skip(forest))]
pub fn move_node(
    forest: &Forest,
    from: &Path,
    to_parent: Option<&Path>,
    position: Option<usize>,
) -> DomainResult<Forest> {
    let moved = forest.resolve(from).ok_or_else(|| not_found(from))?.clone();

    let parent_id = match to_parent {
        None => None,
        Some(path) => {
            if path.starts_with(from) {
                return Err(DomainError::InvalidMove {
                    id: moved.id,
                    reason: "target is inside the moved subtree".to_string(),
                });
            }
            Some(forest.resolve(path).ok_or_else(|| not_found(path))?.id.clone())
        }
    };

    // Indices may shift once the subtree is gone, so re-address the parent by id.
    let mut next = remove(forest, from)?;
    let parent_path = parent_id
        .map(|id| locate_or_err(&next, &id))
        .transpose()?;
    let group = next
        .group_mut(parent_path.as_ref())
        .ok_or_else(|| not_found(from))?;
    let at = position.unwrap_or(group.len()).min(group.len());
    group.insert(at, moved);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Forest {
        Forest::new(vec![
            TreeNode::content("a", "A").with_children(vec![
                TreeNode::content("a1", "A1"),
                TreeNode::content("a2", "A2"),
            ]),
            TreeNode::content("b", "B"),
        ])
    }

    #[test]
    fn given_parent_path_when_inserting_then_appends_child() {
        let forest = sample();
        let next = insert(&forest, TreeNode::content("a3", "A3"), Some(&Path::root(0))).unwrap();
        assert_eq!(next.ids(), vec!["a", "a1", "a2", "a3", "b"]);
        assert_eq!(forest.ids(), vec!["a", "a1", "a2", "b"], "input untouched");
    }

    #[test]
    fn given_node_with_children_when_inserting_then_children_dropped() {
        let node = TreeNode::content("c", "C").with_children(vec![TreeNode::content("c1", "C1")]);
        let next = insert(&sample(), node, None).unwrap();
        assert!(next.roots()[2].children.is_empty());
    }

    #[test]
    fn given_content_link_when_replacing_then_id_follows_content() {
        let next = replace(
            &sample(),
            &Path::root(1),
            NodePatch::default().link(LinkTarget::Content("b2".to_string())),
        )
        .unwrap();
        assert_eq!(next.roots()[1].id, "b2");
        assert_eq!(next.roots()[1].label, "B");
    }

    #[test]
    fn given_content_link_to_existing_id_when_replacing_then_duplicate_error() {
        let result = replace(
            &sample(),
            &Path::root(1),
            NodePatch::default().link(LinkTarget::Content("a1".to_string())),
        );
        assert_eq!(result, Err(DomainError::DuplicateIdentifier("a1".to_string())));
    }

    #[test]
    fn given_move_into_own_subtree_when_moving_then_invalid_move() {
        let result = move_node(&sample(), &Path::root(0), Some(&Path::root(0).child(1)), None);
        assert!(matches!(result, Err(DomainError::InvalidMove { .. })));
    }

    #[test]
    fn given_earlier_sibling_target_when_moving_then_parent_is_readdressed() {
        // moving root 0 under root 1: root 1 becomes root 0 after removal
        let next = move_node(&sample(), &Path::root(0), Some(&Path::root(1)), None).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next.ids(), vec!["b", "a", "a1", "a2"]);
    }
}
