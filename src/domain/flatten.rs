//! Tree flattener: serializes a forest back into flat menu records.

use tracing::instrument;

use crate::domain::entities::{FlatNode, Forest, LinkTarget, TreeNode};

/// Gap between consecutive sibling order keys.
pub const DEFAULT_ORDER_STEP: i64 = 10;

/// Largest accepted step. Keeps `(index + 1) * step` far from `i64::MAX`
/// for any sibling group that fits in memory.
pub const MAX_ORDER_STEP: i64 = 1_000_000;

/// Flatten with [`DEFAULT_ORDER_STEP`].
pub fn flatten(forest: &Forest) -> Vec<FlatNode> {
    TreeFlattener::default().flatten(forest)
}

/// Depth-first serializer that renumbers every sibling group.
#[derive(Debug, Clone, Copy)]
pub struct TreeFlattener {
    step: i64,
}

impl Default for TreeFlattener {
    fn default() -> Self {
        Self::with_step(DEFAULT_ORDER_STEP)
    }
}

impl TreeFlattener {
    /// Step is clamped to `1..=MAX_ORDER_STEP`.
    pub fn with_step(step: i64) -> Self {
        Self {
            step: step.clamp(1, MAX_ORDER_STEP),
        }
    }

    /// Records in pre-order: every node precedes its children. The n-th
    /// member of a sibling group gets `order_key = n * step` (1-based).
    #[instrument(level = "debug", skip(forest), fields(roots = forest.len()))]
    pub fn flatten(&self, forest: &Forest) -> Vec<FlatNode> {
        let mut out = Vec::with_capacity(forest.node_count());
        let mut stack: Vec<(&TreeNode, usize, Option<&str>)> = forest
            .roots()
            .iter()
            .enumerate()
            .rev()
            .map(|(i, node)| (node, i, None))
            .collect();

        while let Some((node, index, parent)) = stack.pop() {
            out.push(self.record(node, index, parent));
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push((child, i, Some(node.id.as_str())));
            }
        }
        out
    }

    fn record(&self, node: &TreeNode, index: usize, parent: Option<&str>) -> FlatNode {
        let external_url = match &node.link {
            LinkTarget::External(url) => Some(url.clone()),
            LinkTarget::Content(_) => None,
        };
        FlatNode {
            id: node.id.clone(),
            label: node.label.clone(),
            order_key: (index as i64 + 1).saturating_mul(self.step),
            parent_id: parent.map(str::to_string),
            external_url,
        }
    }
}
