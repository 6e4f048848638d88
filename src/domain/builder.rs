//! Tree builder: turns flat menu records into a forest.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::entities::{FlatNode, Forest, LinkTarget, TreeNode};
use crate::domain::error::{Diagnostic, DomainError, DomainResult};

/// What to do when two records share an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first record in input order, report the rest.
    #[default]
    FirstWins,
    /// Fail the build.
    Reject,
}

/// Result of a build: the forest plus everything that had to be repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub forest: Forest,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutput {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Build a forest with the default duplicate policy.
pub fn build_forest(nodes: &[FlatNode]) -> DomainResult<BuildOutput> {
    TreeBuilder::new().build(nodes)
}

/// Constructs a forest from flat records.
///
/// Records are addressed by their position in the de-duplicated input, so
/// "input order" and "index" are the same thing throughout.
pub struct TreeBuilder {
    policy: DuplicatePolicy,
    /// Kept children per record, already in display order
    relationship_cache: Vec<Vec<usize>>,
    visited: Vec<bool>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            policy: DuplicatePolicy::default(),
            relationship_cache: Vec::new(),
            visited: Vec::new(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the forest for `nodes`.
    ///
    /// Siblings are ordered by `order_key`; equal keys keep input order.
    /// Dangling parents and parent cycles are demoted to top level and
    /// reported in [`BuildOutput::diagnostics`]. Duplicate identifiers follow
    /// the configured [`DuplicatePolicy`].
    #[instrument(level = "debug", skip(self, nodes), fields(records = nodes.len()))]
    pub fn build(&mut self, nodes: &[FlatNode]) -> DomainResult<BuildOutput> {
        let mut diagnostics = Vec::new();

        let records = self.dedupe(nodes, &mut diagnostics)?;
        let index_of: HashMap<&str, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.as_str(), i))
            .collect();

        let parent_of: Vec<Option<usize>> = records
            .iter()
            .map(|r| match &r.parent_id {
                None => None,
                Some(parent) => match index_of.get(parent.as_str()) {
                    Some(&p) => Some(p),
                    None => {
                        report(
                            &mut diagnostics,
                            Diagnostic::DanglingParent {
                                id: r.id.clone(),
                                parent: parent.clone(),
                            },
                        );
                        None
                    }
                },
            })
            .collect();

        // Reset state for a fresh build
        let n = records.len();
        self.relationship_cache = vec![Vec::new(); n];
        self.visited = vec![false; n];

        let mut groups = (0..n)
            .filter_map(|i| parent_of[i].map(|p| (p, i)))
            .into_group_map();
        for group in groups.values_mut() {
            // stable: equal keys keep input order
            group.sort_by_key(|&i| records[i].order_key);
        }

        let mut top: Vec<usize> = (0..n).filter(|&i| parent_of[i].is_none()).collect();
        top.sort_by_key(|&i| records[i].order_key);
        for &root in &top {
            self.attach(root, &groups);
        }

        let mut demoted = Vec::new();
        while let Some(start) = self.visited.iter().position(|placed| !placed) {
            let member = self.cycle_member(start, &parent_of);
            let parent = parent_of[member]
                .map(|p| records[p].id.clone())
                .unwrap_or_default();
            report(
                &mut diagnostics,
                Diagnostic::Cycle {
                    id: records[member].id.clone(),
                    parent,
                },
            );
            self.attach(member, &groups);
            demoted.push(member);
        }
        demoted.sort_by_key(|&i| records[i].order_key);

        let roots = top
            .iter()
            .chain(demoted.iter())
            .map(|&i| self.materialize(i, &records))
            .collect();
        let forest = Forest::new(roots);
        debug!(
            "built {} roots, {} nodes, {} diagnostics",
            forest.len(),
            forest.node_count(),
            diagnostics.len()
        );

        Ok(BuildOutput {
            forest,
            diagnostics,
        })
    }

    fn dedupe<'a>(
        &self,
        nodes: &'a [FlatNode],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> DomainResult<Vec<&'a FlatNode>> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(nodes.len());
        for node in nodes {
            if seen.insert(node.id.as_str()) {
                records.push(node);
                continue;
            }
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(DomainError::DuplicateIdentifier(node.id.clone()))
                }
                DuplicatePolicy::FirstWins => report(
                    diagnostics,
                    Diagnostic::DuplicateIdentifier {
                        id: node.id.clone(),
                    },
                ),
            }
        }
        Ok(records)
    }

    /// Place `root` and everything reachable below it, depth-first.
    #[instrument(level = "trace", skip(self, groups))]
    fn attach(&mut self, root: usize, groups: &HashMap<usize, Vec<usize>>) {
        self.visited[root] = true;
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            let Some(children) = groups.get(&current) else {
                continue;
            };
            for &child in children {
                // already placed: the edge closes a cycle
                if self.visited[child] {
                    continue;
                }
                self.visited[child] = true;
                self.relationship_cache[current].push(child);
                stack.push(child);
            }
        }
    }

    /// Walk up the parent chain from an unplaced record until it repeats and
    /// return the cycle member that comes first in input order.
    #[instrument(level = "trace", skip(self, parent_of))]
    fn cycle_member(&self, start: usize, parent_of: &[Option<usize>]) -> usize {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = start;

        while seen.insert(current) {
            chain.push(current);
            match parent_of[current] {
                Some(parent) if !self.visited[parent] => current = parent,
                _ => return current,
            }
        }

        let entry = chain.iter().position(|&i| i == current).unwrap_or(0);
        chain[entry..].iter().copied().min().unwrap_or(current)
    }

    /// Assemble the subtree below `root` bottom-up, without recursion.
    fn materialize(&self, root: usize, records: &[&FlatNode]) -> TreeNode {
        // pre-order; reversed, every child comes before its parent
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.relationship_cache[idx].iter().copied());
        }

        let mut built: HashMap<usize, TreeNode> = HashMap::with_capacity(order.len());
        for &idx in order.iter().rev() {
            let children = self.relationship_cache[idx]
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(idx, tree_node(records[idx], children));
        }
        built
            .remove(&root)
            .unwrap_or_else(|| tree_node(records[root], Vec::new()))
    }
}

fn tree_node(record: &FlatNode, children: Vec<TreeNode>) -> TreeNode {
    let link = match &record.external_url {
        Some(url) => LinkTarget::External(url.clone()),
        None => LinkTarget::Content(record.id.clone()),
    };
    TreeNode {
        id: record.id.clone(),
        label: record.label.clone(),
        link,
        children,
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!("{}", diagnostic);
    diagnostics.push(diagnostic);
}
