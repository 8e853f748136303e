//! Nodes: one operation instance in an authoring tree.
//!
//! A [`Node`] pairs a stable [`NodeId`] with a kind value `K`. The kind
//! carries its own typed parameters, so a node's parameter shape always
//! matches its kind. Both tools implement [`NodeKind`]: the geometry tool
//! with [`Geometry`](crate::geometry::Geometry) and the particle emitter with
//! [`Command`](crate::command::Command).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParamError;
use crate::kotlin::KotlinWriter;
use crate::params::{ParamField, ParamMap, ParamValue};
use crate::tree::NodeView;

/// Stable node identifier.
///
/// Assigned once by an [`IdGenerator`] and never reused. Serialized as a
/// decimal string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(NodeId)
    }
}

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Monotonic id source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }

    /// Make sure future ids are greater than `id`.
    pub fn observe(&mut self, id: NodeId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    /// Advance past every id `other` may have issued.
    pub fn absorb(&mut self, other: &IdGenerator) {
        self.next = self.next.max(other.next);
    }
}

/// One sinusoid of a Fourier series: `r * (cos, sin)(w * t + start_angle)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FourierTerm {
    pub r: f64,
    pub w: f64,
    /// Degrees.
    pub start_angle: f64,
}

impl Default for FourierTerm {
    fn default() -> Self {
        Self {
            r: 1.0,
            w: 1.0,
            start_angle: 0.0,
        }
    }
}

/// A node kind: which operation a node performs.
///
/// Implemented by a closed enum per tool, one variant per kind, each
/// carrying its parameter struct. The variant is fixed at creation; only
/// its parameters change afterwards.
pub trait NodeKind: Clone + fmt::Debug + PartialEq + Sized {
    /// State threaded through [`NodeKind::apply`].
    type Context<'a>;

    /// Constructor call that starts an emitted program.
    const PROGRAM: &'static str;

    /// Every kind name, in catalog order.
    const CATALOG: &'static [&'static str];

    /// Kind name as stored in project files.
    fn name(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Kind with default parameters, or `None` for an unknown name.
    fn from_name(name: &str) -> Option<Self>;

    /// Whether nodes of this kind own an ordered child list.
    fn is_container(&self) -> bool {
        false
    }

    /// Whether nodes of this kind own an ordered list of Fourier terms.
    fn has_terms(&self) -> bool {
        false
    }

    /// Declared parameters of this kind.
    fn fields(&self) -> &'static [ParamField];

    fn param(&self, key: &str) -> Option<ParamValue>;

    fn set_param(&mut self, key: &str, value: &ParamValue) -> Result<(), ParamError>;

    /// Snapshot of every declared parameter.
    fn params(&self) -> ParamMap {
        self.fields()
            .iter()
            .filter_map(|field| self.param(field.key).map(|v| (field.key.to_string(), v)))
            .collect()
    }

    /// Apply one enabled node to the running context.
    fn apply(node: NodeView<'_, Self>, ctx: &mut Self::Context<'_>);

    /// Write the chained call (or calls) reproducing [`NodeKind::apply`].
    fn kotlin(node: NodeView<'_, Self>, out: &mut KotlinWriter);
}

/// A node as stored in a [`NodeTree`](crate::tree::NodeTree).
#[derive(Clone, Debug, PartialEq)]
pub struct Node<K> {
    pub id: NodeId,
    pub kind: K,
    pub enabled: bool,
    /// UI-only; never read by evaluation or emission.
    pub collapsed: bool,
    /// Child ids, in order. Empty for non-container kinds.
    pub children: Vec<NodeId>,
    /// Fourier terms, in order. Empty for kinds without terms.
    pub terms: Vec<FourierTerm>,
    /// Unrecognized fields carried through load and save untouched.
    pub extra: BTreeMap<String, serde_json::Value>,
    pub(crate) parent: Option<NodeId>,
}

impl<K: NodeKind> Node<K> {
    /// Fresh node with the kind's defaults applied.
    pub fn new(id: NodeId, kind: K) -> Self {
        let terms = if kind.has_terms() {
            vec![FourierTerm::default()]
        } else {
            Vec::new()
        };
        Self {
            id,
            kind,
            enabled: true,
            collapsed: false,
            children: Vec::new(),
            terms,
            extra: BTreeMap::new(),
            parent: None,
        }
    }

    /// Parent container, `None` for top-level nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator_is_monotonic() {
        let mut ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(b > a);
        ids.observe(NodeId(100));
        assert_eq!(ids.next_id(), NodeId(101));
        ids.observe(NodeId(5));
        assert_eq!(ids.next_id(), NodeId(102));
    }

    #[test]
    fn test_default_generator_never_yields_zero() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_id(), NodeId(1));
    }

    #[test]
    fn test_node_id_serializes_as_string() {
        let json = serde_json::to_string(&NodeId(42)).unwrap();
        assert_eq!(json, "\"42\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NodeId(42));
        assert!(serde_json::from_str::<NodeId>("\"abc\"").is_err());
    }
}
