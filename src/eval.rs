//! Node-list evaluation.
//!
//! [`apply_all`] is the generic walk shared by both tools: enabled nodes are
//! applied left to right, so node `i` sees the state left by nodes `0..i`.
//! [`evaluate`] runs it for the geometry tool from an empty point list.

use glam::DVec3;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::geometry::{BuilderState, Geometry};
use crate::math::Bounds;
use crate::node::{NodeId, NodeKind};
use crate::tree::Nodes;

/// Apply every enabled node of a list to `ctx`, in order.
pub fn apply_all<K: NodeKind>(nodes: Nodes<'_, K>, ctx: &mut K::Context<'_>) {
    for node in nodes {
        if node.enabled {
            K::apply(node, ctx);
        }
    }
}

/// Result of evaluating a geometry node list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    pub points: Vec<DVec3>,
    /// Axis after the last node.
    pub axis: DVec3,
    /// Index range of `points` produced by each node, for highlighting.
    ///
    /// Only nodes that appended points appear. Descendants of `add_with`
    /// point into its first copy.
    pub segments: BTreeMap<NodeId, Range<usize>>,
}

impl Evaluation {
    /// Axis-aligned bounds of the points, for camera framing.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    /// Points a node contributed, empty if it contributed none.
    pub fn points_of(&self, id: NodeId) -> &[DVec3] {
        self.segments
            .get(&id)
            .and_then(|range| self.points.get(range.clone()))
            .unwrap_or(&[])
    }

    pub(crate) fn into_state(self) -> BuilderState {
        BuilderState {
            points: self.points,
            axis: self.axis,
            segments: self.segments,
        }
    }
}

/// Evaluate a geometry node list from an empty point list.
///
/// Stateless: the same list always yields the same result, except for
/// nodes that draw unseeded random numbers.
pub fn evaluate(nodes: Nodes<'_, Geometry>, initial_axis: DVec3) -> Evaluation {
    let mut state = BuilderState::new(initial_axis);
    apply_all(nodes, &mut state);
    log::debug!(
        "evaluated {} points across {} node segments",
        state.points.len(),
        state.segments.len()
    );
    Evaluation {
        points: state.points,
        axis: state.axis,
        segments: state.segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AddLine, AddPoint, Axis, Scale, WithBuilder};
    use crate::tree::NodeTree;

    fn worked_example() -> NodeTree<Geometry> {
        let mut tree = NodeTree::new();
        tree.push(Geometry::Axis(Axis { axis: DVec3::Y }));
        tree.push(Geometry::AddLine(AddLine {
            start: DVec3::ZERO,
            end: DVec3::new(3.0, 0.0, 3.0),
            count: 30,
        }));
        tree.push(Geometry::Scale(Scale { factor: 2.0 }));
        tree
    }

    #[test]
    fn test_worked_example_points() {
        let tree = worked_example();
        let result = evaluate(tree.roots(), DVec3::Y);
        assert_eq!(result.points.len(), 31);
        for (i, p) in result.points.iter().enumerate() {
            let expected = DVec3::new(6.0, 0.0, 6.0) * (i as f64 / 30.0);
            assert!((*p - expected).length() < 1e-9);
        }
        let line = tree.root_ids()[1];
        assert_eq!(result.segments[&line], 0..31);
        assert_eq!(result.segments.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let tree = worked_example();
        assert_eq!(evaluate(tree.roots(), DVec3::Y), evaluate(tree.roots(), DVec3::Y));
    }

    #[test]
    fn test_disabled_nodes_are_skipped() {
        let mut tree = worked_example();
        let scale = tree.root_ids()[2];
        tree.set_enabled(scale, false).unwrap();
        let result = evaluate(tree.roots(), DVec3::Y);
        assert!((result.points[30] - DVec3::new(3.0, 0.0, 3.0)).length() < 1e-9);
    }

    #[test]
    fn test_with_builder_merges_children_in_order() {
        let mut tree = NodeTree::new();
        tree.push(Geometry::AddPoint(AddPoint { point: DVec3::Z }));
        let group = tree.push(Geometry::WithBuilder(WithBuilder));
        let mut children = Vec::new();
        for x in [1.0, 2.0, 3.0] {
            let id = tree
                .append(Some(group), Geometry::AddPoint(AddPoint { point: DVec3::new(x, 0.0, 0.0) }))
                .unwrap();
            children.push(id);
        }

        let result = evaluate(tree.roots(), DVec3::Y);
        assert_eq!(result.points.len(), 4);
        assert_eq!(&result.points[1..], &[DVec3::X, DVec3::new(2.0, 0.0, 0.0), DVec3::new(3.0, 0.0, 0.0)]);
        assert_eq!(result.segments[&group], 1..4);
        assert_eq!(result.segments[&children[2]], 3..4);
        assert_eq!(result.points_of(children[1]), &[DVec3::new(2.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_empty_container_yields_nothing() {
        let mut tree = NodeTree::new();
        let group = tree.push(Geometry::WithBuilder(WithBuilder));
        let result = evaluate(tree.roots(), DVec3::Y);
        assert!(result.points.is_empty());
        assert!(!result.segments.contains_key(&group));
        assert!(result.bounds().is_none());
    }
}
