//! Project files.
//!
//! A project is a JSON document holding one tool's node tree under a fixed
//! `ROOT` node:
//!
//! ```json
//! {
//!   "tool": "points_builder",
//!   "root": {
//!     "id": "root",
//!     "kind": "ROOT",
//!     "children": [
//!       { "id": "1", "kind": "add_line", "enabled": true, "params": { "count": 30 } }
//!     ]
//!   }
//! }
//! ```
//!
//! Loading is lenient. Each node is rebuilt from its kind's defaults, then
//! only recognized parameters of a compatible type are overlaid. Nodes of
//! an unknown kind are dropped with their descendants, and duplicate or
//! unparseable ids are replaced. Only a missing root or a root whose
//! `children` is not a list fails the whole load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

use pointsbuilder::command::Command;
use pointsbuilder::eval::{evaluate, Evaluation};
use pointsbuilder::geometry::Geometry;
use pointsbuilder::node::{FourierTerm, Node, NodeId, NodeKind};
use pointsbuilder::params::ParamValue;
use pointsbuilder::simulation::SimulationConfig;
use pointsbuilder::tree::NodeTree;
use pointsbuilder::{DVec3, TreeError};

const ROOT_ID: &str = "root";
const ROOT_KIND: &str = "ROOT";

/// Keys the loader interprets; everything else is carried in `extra`.
const NODE_KEYS: &[&str] = &["id", "kind", "params", "enabled", "collapsed", "children", "terms"];

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project has no root node")]
    MissingRoot,
    #[error("root children must be a list")]
    InvalidChildren,
    #[error("project is for the {found} tool, expected {expected}")]
    WrongTool { expected: Tool, found: String },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Which authoring tool a project belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    PointsBuilder,
    ParticleEmitter,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::PointsBuilder => "points_builder",
            Tool::ParticleEmitter => "particle_emitter",
        }
    }

    /// Guess the tool of a project document.
    ///
    /// Uses the `tool` key when present, otherwise the first top-level node
    /// whose kind either tool recognizes. An empty project counts as a
    /// geometry project.
    pub fn detect(document: &Value) -> Tool {
        if let Some(tool) = document.get("tool").and_then(|v| serde_json::from_value(v.clone()).ok()) {
            return tool;
        }
        let children = document
            .get("root")
            .and_then(|root| root.get("children"))
            .and_then(Value::as_array);
        for child in children.into_iter().flatten() {
            match child.get("kind").and_then(Value::as_str) {
                Some(kind) if Command::from_name(kind).is_some() => return Tool::ParticleEmitter,
                Some(kind) if Geometry::from_name(kind).is_some() => return Tool::PointsBuilder,
                _ => {}
            }
        }
        Tool::PointsBuilder
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node kind that belongs to one of the tools.
pub trait ToolKind: NodeKind {
    const TOOL: Tool;

    /// What the editor shows next to the program after each edit.
    type Preview: Clone + std::fmt::Debug + Default;

    fn preview(tree: &NodeTree<Self>) -> Self::Preview;
}

impl ToolKind for Geometry {
    const TOOL: Tool = Tool::PointsBuilder;

    type Preview = Evaluation;

    fn preview(tree: &NodeTree<Self>) -> Evaluation {
        evaluate(tree.roots(), DVec3::Y)
    }
}

impl ToolKind for Command {
    const TOOL: Tool = Tool::ParticleEmitter;

    /// Commands have no static preview; the simulation is the preview.
    type Preview = ();

    fn preview(_tree: &NodeTree<Self>) {}
}

/// A loaded project: the tree plus document-level settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectFile<K> {
    pub tree: NodeTree<K>,
    /// Emitter settings, used by the particle tool.
    pub emitter: Option<SimulationConfig>,
    /// Unrecognized top-level keys, written back unchanged.
    pub extra: Map<String, Value>,
}

impl<K: ToolKind> Default for ProjectFile<K> {
    fn default() -> Self {
        Self::new(NodeTree::new())
    }
}

impl<K: ToolKind> ProjectFile<K> {
    pub fn new(tree: NodeTree<K>) -> Self {
        Self {
            tree,
            emitter: None,
            extra: Map::new(),
        }
    }

    /// Parse and normalize a project document.
    pub fn from_json(text: &str) -> Result<Self, ProjectError> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self, ProjectError> {
        let Value::Object(mut fields) = document else {
            return Err(ProjectError::MissingRoot);
        };
        if let Some(tool) = fields.remove("tool") {
            if serde_json::from_value::<Tool>(tool.clone()).ok() != Some(K::TOOL) {
                let found = tool.as_str().map(str::to_string).unwrap_or_else(|| tool.to_string());
                return Err(ProjectError::WrongTool {
                    expected: K::TOOL,
                    found,
                });
            }
        }
        let root = fields.remove("root").ok_or(ProjectError::MissingRoot)?;
        let children = match root.get("children") {
            Some(Value::Array(children)) => children,
            Some(_) => return Err(ProjectError::InvalidChildren),
            None if root.is_object() => return Err(ProjectError::InvalidChildren),
            None => return Err(ProjectError::MissingRoot),
        };

        let mut tree = NodeTree::new();
        let mut dropped = 0;
        for child in children {
            dropped += load_node(&mut tree, None, child)?;
        }
        if dropped > 0 {
            log::warn!("dropped {} node(s) while loading project", dropped);
        }

        let emitter = match fields.remove("emitter") {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value(value) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("ignoring invalid emitter settings: {}", e);
                    None
                }
            },
        };

        Ok(Self {
            tree,
            emitter,
            extra: fields,
        })
    }

    /// The project as a JSON value.
    pub fn to_value(&self) -> Value {
        let mut document = self.extra.clone();
        document.insert("tool".into(), Value::String(K::TOOL.as_str().into()));

        let mut root = Map::new();
        root.insert("id".into(), Value::String(ROOT_ID.into()));
        root.insert("kind".into(), Value::String(ROOT_KIND.into()));
        root.insert("children".into(), Value::Array(self.tree.roots().map(|n| save_node(&self.tree, n.id)).collect()));
        document.insert("root".into(), Value::Object(root));

        if let Some(emitter) = &self.emitter {
            if let Ok(value) = serde_json::to_value(emitter) {
                document.insert("emitter".into(), value);
            }
        }
        Value::Object(document)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    /// Save the project to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a project from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Rebuild one saved node (and its subtree) into `tree` under `parent`.
///
/// Returns how many nodes were dropped.
fn load_node<K: NodeKind>(tree: &mut NodeTree<K>, parent: Option<NodeId>, value: &Value) -> Result<usize, ProjectError> {
    let Some(fields) = value.as_object() else {
        log::warn!("dropping node that is not an object");
        return Ok(1);
    };
    let kind_name = fields.get("kind").and_then(Value::as_str).unwrap_or_default();
    let Some(mut kind) = K::from_name(kind_name) else {
        log::warn!("dropping node of unknown kind {:?}", kind_name);
        return Ok(1 + count_descendants(value));
    };

    match fields.get("params") {
        None => {}
        Some(Value::Object(params)) => {
            for (key, raw) in params {
                let accepted = serde_json::from_value::<ParamValue>(raw.clone())
                    .ok()
                    .map(|param| kind.set_param(key, &param));
                if !matches!(accepted, Some(Ok(()))) {
                    log::warn!("{}: ignoring parameter {} = {}", kind_name, key, raw);
                }
            }
        }
        Some(other) => log::warn!("{}: ignoring params {}", kind_name, other),
    }

    let id = fields
        .get("id")
        .and_then(|id| match id {
            Value::String(text) => text.parse().ok(),
            Value::Number(n) => n.as_u64().map(NodeId),
            _ => None,
        })
        .unwrap_or(NodeId(0));

    let mut node = Node::new(id, kind);
    node.enabled = fields.get("enabled").and_then(Value::as_bool).unwrap_or(true);
    node.collapsed = fields.get("collapsed").and_then(Value::as_bool).unwrap_or(false);
    if node.kind.has_terms() {
        if let Some(terms) = fields.get("terms").and_then(Value::as_array) {
            node.terms = terms
                .iter()
                .filter_map(|term| match serde_json::from_value::<FourierTerm>(term.clone()) {
                    Ok(term) => Some(term),
                    Err(e) => {
                        log::warn!("{}: ignoring term {}: {}", kind_name, term, e);
                        None
                    }
                })
                .collect();
        }
    }
    node.extra = fields
        .iter()
        .filter(|(key, _)| !NODE_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let is_container = node.kind.is_container();
    let id = tree.adopt(parent, node)?;

    let mut dropped = 0;
    match fields.get("children") {
        Some(Value::Array(children)) if is_container => {
            for child in children {
                dropped += load_node(tree, Some(id), child)?;
            }
        }
        Some(Value::Array(children)) if !children.is_empty() => {
            log::warn!("{}: dropping children of a non-container node", kind_name);
            dropped += children.len();
        }
        Some(Value::Array(_)) | Some(Value::Null) | None => {}
        Some(other) => log::warn!("{}: ignoring children {}", kind_name, other),
    }
    Ok(dropped)
}

fn count_descendants(value: &Value) -> usize {
    value
        .get("children")
        .and_then(Value::as_array)
        .map(|children| children.iter().map(|c| 1 + count_descendants(c)).sum())
        .unwrap_or(0)
}

fn save_node<K: NodeKind>(tree: &NodeTree<K>, id: NodeId) -> Value {
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };
    let mut fields: Map<String, Value> = node.extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    fields.insert("id".into(), Value::String(node.id.to_string()));
    fields.insert("kind".into(), Value::String(node.kind.name().into()));
    fields.insert("enabled".into(), Value::Bool(node.enabled));
    fields.insert("collapsed".into(), Value::Bool(node.collapsed));

    let params: Map<String, Value> = node
        .kind
        .params()
        .into_iter()
        .filter_map(|(key, value)| serde_json::to_value(value).ok().map(|v| (key, v)))
        .collect();
    fields.insert("params".into(), Value::Object(params));

    if node.kind.has_terms() {
        let terms = node.terms.iter().filter_map(|t| serde_json::to_value(t).ok()).collect();
        fields.insert("terms".into(), Value::Array(terms));
    }
    if node.kind.is_container() {
        let children = node.children.iter().map(|child| save_node(tree, *child)).collect();
        fields.insert("children".into(), Value::Array(children));
    }
    Value::Object(fields)
}
