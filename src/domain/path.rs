//! Addresses into a forest.
//!
//! A path alternates sibling-index steps with descend-into-children markers:
//! `[Index(0), Children, Index(2)]` is the third child of the first root.

use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Position within the current sibling group
    Index(usize),
    /// Descend into the children of the node just selected
    Children,
}

/// Route from the forest roots to one node. Never empty; always starts and
/// ends with an `Index` step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    /// Path to the root at `index`.
    pub fn root(index: usize) -> Self {
        Self {
            steps: vec![PathStep::Index(index)],
        }
    }

    /// Path to the child at `index` of the node this path addresses.
    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Children);
        steps.push(PathStep::Index(index));
        Self { steps }
    }

    /// Build from sibling indices, outermost first.
    pub fn from_indices(indices: &[usize]) -> DomainResult<Self> {
        let (first, rest) = indices
            .split_first()
            .ok_or_else(|| DomainError::InvalidPath("empty path".to_string()))?;
        Ok(rest
            .iter()
            .fold(Self::root(*first), |path, &i| path.child(i)))
    }

    /// Validate a raw step sequence.
    pub fn from_steps(steps: Vec<PathStep>) -> DomainResult<Self> {
        if steps.is_empty() {
            return Err(DomainError::InvalidPath("empty path".to_string()));
        }
        for (pos, step) in steps.iter().enumerate() {
            let expect_index = pos % 2 == 0;
            match (expect_index, step) {
                (true, PathStep::Index(_)) | (false, PathStep::Children) => {}
                _ => {
                    return Err(DomainError::InvalidPath(format!(
                        "unexpected {:?} at step {}",
                        step, pos
                    )))
                }
            }
        }
        if steps.len() % 2 == 0 {
            return Err(DomainError::InvalidPath(
                "path must end with an index step".to_string(),
            ));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Sibling indices, outermost first.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps.iter().filter_map(|s| match s {
            PathStep::Index(i) => Some(*i),
            PathStep::Children => None,
        })
    }

    /// Nesting level; 1 for a root.
    pub fn depth(&self) -> usize {
        self.steps.len() / 2 + 1
    }

    pub fn last_index(&self) -> usize {
        match self.steps.last() {
            Some(PathStep::Index(i)) => *i,
            // unreachable by construction
            _ => 0,
        }
    }

    /// Path of the owning node, `None` for a root.
    pub fn parent(&self) -> Option<Self> {
        if self.steps.len() < 3 {
            return None;
        }
        Some(Self {
            steps: self.steps[..self.steps.len() - 2].to_vec(),
        })
    }

    /// True if `self` addresses `other` or one of its descendants.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.steps.starts_with(&other.steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.indices().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join(" > "))
    }
}
