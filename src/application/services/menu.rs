//! Menu orchestrator service
//!
//! Holds the current (forest, flat) pair, turns UI events into tree edits,
//! and publishes every accepted edit to the menu store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    self, ident, locate_or_err, Diagnostic, DuplicatePolicy, FlatNode, Forest, LinkTarget,
    NodePatch, TreeBuilder, TreeFlattener, TreeNode,
};
use crate::infrastructure::traits::MenuStore;

/// Forest and its flat projection, always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuSnapshot {
    pub forest: Forest,
    pub flat: Vec<FlatNode>,
}

/// Discrete user actions arriving from the editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// Form submit for a new entry; `parent` is an entry id
    Add {
        label: String,
        link: LinkTarget,
        parent: Option<String>,
    },
    /// Form submit for an existing entry
    Edit { id: String, patch: NodePatch },
    /// Delete an entry and everything below it
    Remove { id: String },
    /// Drag end: place `id` under `parent` at `position`
    Move {
        id: String,
        parent: Option<String>,
        position: Option<usize>,
    },
    /// Drag end with a fully computed arrangement
    Rearrange(Forest),
    /// New flat collection from the outside
    Reload(Vec<FlatNode>),
}

/// Service sequencing builder, editor and flattener calls.
pub struct MenuService {
    store: Arc<dyn MenuStore>,
    flattener: TreeFlattener,
    policy: DuplicatePolicy,
    external_prefix: String,
    snapshot: MenuSnapshot,
    diagnostics: Vec<Diagnostic>,
}

impl MenuService {
    /// Create a service with an empty menu.
    pub fn new(store: Arc<dyn MenuStore>, settings: &Settings) -> Self {
        Self {
            store,
            flattener: TreeFlattener::with_step(settings.order_step),
            policy: settings.duplicate_policy,
            external_prefix: settings.external_id_prefix.clone(),
            snapshot: MenuSnapshot::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.snapshot.forest
    }

    pub fn flat(&self) -> &[FlatNode] {
        &self.snapshot.flat
    }

    pub fn snapshot(&self) -> &MenuSnapshot {
        &self.snapshot
    }

    /// Conditions repaired during the last rebuild.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Read the store and rebuild from it.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self) -> ApplicationResult<&[Diagnostic]> {
        let flat = self.store.load().with_context("load menu")?;
        self.receive_flat(flat)
    }

    /// Rebuild the forest from an externally supplied flat collection.
    ///
    /// Repairs (dangling parents, cycles, first-wins duplicates) are kept in
    /// [`Self::diagnostics`]; a rejected build leaves the current snapshot.
    /// Nothing is published.
    #[instrument(level = "debug", skip(self, flat), fields(records = flat.len()))]
    pub fn receive_flat(&mut self, flat: Vec<FlatNode>) -> ApplicationResult<&[Diagnostic]> {
        let output = TreeBuilder::new()
            .with_duplicate_policy(self.policy)
            .build(&flat)?;
        let flat = self.flattener.flatten(&output.forest);
        self.snapshot = MenuSnapshot {
            forest: output.forest,
            flat,
        };
        self.diagnostics = output.diagnostics;
        info!(
            "menu loaded: {} entries, {} repaired",
            self.snapshot.flat.len(),
            self.diagnostics.len()
        );
        Ok(&self.diagnostics)
    }

    /// Apply one UI event.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, event: MenuEvent) -> ApplicationResult<()> {
        match event {
            MenuEvent::Add {
                label,
                link,
                parent,
            } => self.add_node(label, link, parent.as_deref()).map(|_| ()),
            MenuEvent::Edit { id, patch } => self.edit_node(&id, patch),
            MenuEvent::Remove { id } => self.remove_node(&id),
            MenuEvent::Move {
                id,
                parent,
                position,
            } => self.move_node(&id, parent.as_deref(), position),
            MenuEvent::Rearrange(forest) => self.rearrange(forest),
            MenuEvent::Reload(flat) => self.receive_flat(flat).map(|_| ()),
        }
    }

    /// Append a new entry under `parent` (an entry id) or at top level.
    /// Returns the id assigned to the entry; external ids never collide with
    /// an existing entry.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        link: LinkTarget,
        parent: Option<&str>,
    ) -> ApplicationResult<String> {
        let mut created_at = Utc::now();
        let mut id = ident::id_for_link(&self.external_prefix, &link, created_at);
        // same URL twice within one millisecond: move the suffix forward
        while link.is_external() && self.forest().contains_id(&id) {
            created_at += Duration::milliseconds(1);
            id = ident::id_for_link(&self.external_prefix, &link, created_at);
        }
        let node = TreeNode {
            id: id.clone(),
            label: label.into(),
            link,
            children: Vec::new(),
        };
        let forest = self.forest();
        let parent_path = parent.map(|p| locate_or_err(forest, p)).transpose()?;
        let next = domain::insert(forest, node, parent_path.as_ref())?;
        self.commit(next)?;
        Ok(id)
    }

    pub fn edit_node(&mut self, id: &str, patch: NodePatch) -> ApplicationResult<()> {
        let path = locate_or_err(self.forest(), id)?;
        let next = domain::replace(self.forest(), &path, patch)?;
        self.commit(next)
    }

    pub fn remove_node(&mut self, id: &str) -> ApplicationResult<()> {
        let path = locate_or_err(self.forest(), id)?;
        let next = domain::remove(self.forest(), &path)?;
        self.commit(next)
    }

    /// Move an entry (with its subtree) to another parent or level.
    pub fn move_node(
        &mut self,
        id: &str,
        parent: Option<&str>,
        position: Option<usize>,
    ) -> ApplicationResult<()> {
        let forest = self.forest();
        let from = locate_or_err(forest, id)?;
        let to = parent.map(|p| locate_or_err(forest, p)).transpose()?;
        let arrangement = domain::move_node(forest, &from, to.as_ref(), position)?;
        self.rearrange(arrangement)
    }

    pub fn rearrange(&mut self, arrangement: Forest) -> ApplicationResult<()> {
        let next = domain::replace_whole(self.forest(), arrangement)?;
        self.commit(next)
    }

    /// Flatten, publish, then swap in the new snapshot. A failed publish
    /// keeps the previous snapshot.
    fn commit(&mut self, forest: Forest) -> ApplicationResult<()> {
        let flat = self.flattener.flatten(&forest);
        self.store.publish(&flat).with_context("publish menu")?;
        debug!("published {} entries", flat.len());
        self.snapshot = MenuSnapshot { forest, flat };
        Ok(())
    }
}
