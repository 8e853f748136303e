//! Editing session.
//!
//! A [`Session`] owns one tool's project and its undo history, and keeps
//! the emitted program and the preview current. Every edit goes through
//! [`Session::edit`]: the tree is snapshotted first, the edit runs, and on
//! success the program and preview are rebuilt. A failed edit records
//! nothing and leaves the tree as it was.

use std::path::Path;

use pointsbuilder::kotlin::emit_tree;
use pointsbuilder::node::{FourierTerm, NodeId};
use pointsbuilder::params::ParamValue;
use pointsbuilder::tree::NodeTree;
use pointsbuilder::TreeError;

use crate::history::{History, HistoryConfig, HistoryError};
use crate::project::{ProjectError, ProjectFile, ToolKind};

pub struct Session<K: ToolKind> {
    project: ProjectFile<K>,
    history: History<NodeTree<K>>,
    program: String,
    preview: K::Preview,
}

impl<K: ToolKind> Default for Session<K> {
    fn default() -> Self {
        Self::new(ProjectFile::default(), HistoryConfig::default())
    }
}

impl<K: ToolKind> Session<K> {
    pub fn new(project: ProjectFile<K>, history: HistoryConfig) -> Self {
        let mut session = Self {
            project,
            history: History::new(history),
            program: String::new(),
            preview: K::Preview::default(),
        };
        session.refresh();
        session
    }

    pub fn tree(&self) -> &NodeTree<K> {
        &self.project.tree
    }

    pub fn project(&self) -> &ProjectFile<K> {
        &self.project
    }

    /// Document-level settings; changing them is not an undoable edit.
    pub fn project_mut(&mut self) -> &mut ProjectFile<K> {
        &mut self.project
    }

    /// The current emitted program.
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn preview(&self) -> &K::Preview {
        &self.preview
    }

    pub fn history(&self) -> &History<NodeTree<K>> {
        &self.history
    }

    fn refresh(&mut self) {
        self.program = emit_tree(&self.project.tree);
        self.preview = K::preview(&self.project.tree);
    }

    /// Run one undoable edit.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut NodeTree<K>) -> Result<T, TreeError>) -> Result<T, TreeError> {
        let before = self.project.tree.clone();
        let result = f(&mut self.project.tree)?;
        self.history.record(before);
        self.refresh();
        Ok(result)
    }

    pub fn add(&mut self, parent: Option<NodeId>, kind: K) -> Result<NodeId, TreeError> {
        self.edit(|tree| tree.append(parent, kind))
    }

    pub fn insert(&mut self, parent: Option<NodeId>, index: usize, kind: K) -> Result<NodeId, TreeError> {
        self.edit(|tree| tree.insert(parent, index, kind))
    }

    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.edit(|tree| tree.remove(id).map(|_| ()))
    }

    pub fn move_node(&mut self, id: NodeId, parent: Option<NodeId>, index: usize) -> Result<(), TreeError> {
        self.edit(|tree| tree.move_node(id, parent, index))
    }

    pub fn duplicate(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        self.edit(|tree| tree.duplicate(id))
    }

    pub fn set_param(&mut self, id: NodeId, key: &str, value: impl Into<ParamValue>) -> Result<(), TreeError> {
        let value = value.into();
        self.edit(|tree| tree.set_param(id, key, &value))
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<(), TreeError> {
        self.edit(|tree| tree.set_enabled(id, enabled))
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> Result<(), TreeError> {
        self.edit(|tree| tree.set_collapsed(id, collapsed))
    }

    pub fn add_term(&mut self, id: NodeId, term: FourierTerm) -> Result<usize, TreeError> {
        self.edit(|tree| tree.add_term(id, term))
    }

    pub fn set_term(&mut self, id: NodeId, index: usize, term: FourierTerm) -> Result<(), TreeError> {
        self.edit(|tree| tree.set_term(id, index, term))
    }

    pub fn remove_term(&mut self, id: NodeId, index: usize) -> Result<FourierTerm, TreeError> {
        self.edit(|tree| tree.remove_term(id, index))
    }

    pub fn move_term(&mut self, id: NodeId, from: usize, to: usize) -> Result<(), TreeError> {
        self.edit(|tree| tree.move_term(id, from, to))
    }

    /// Restore the tree as it was before the last edit.
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let previous = self.history.undo(&self.project.tree)?;
        self.restore(previous);
        log::info!("undo ({} step(s) left)", self.history.undo_len());
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let next = self.history.redo(&self.project.tree)?;
        self.restore(next);
        log::info!("redo ({} step(s) left)", self.history.redo_len());
        Ok(())
    }

    fn restore(&mut self, mut tree: NodeTree<K>) {
        tree.reserve_ids_of(&self.project.tree);
        self.project.tree = tree;
        self.refresh();
    }

    /// Replace the project with one parsed from JSON.
    ///
    /// On error the current project and history are untouched.
    pub fn load_json(&mut self, json: &str) -> Result<(), ProjectError> {
        let project = ProjectFile::from_json(json)?;
        self.replace(project);
        Ok(())
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let project = ProjectFile::load(path)?;
        self.replace(project);
        log::info!("loaded {} ({} nodes)", path.display(), self.project.tree.len());
        Ok(())
    }

    fn replace(&mut self, project: ProjectFile<K>) {
        self.project = project;
        self.history.clear();
        self.refresh();
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        self.project.save(path)?;
        log::info!("saved {}", path.display());
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        self.project.to_json()
    }
}
