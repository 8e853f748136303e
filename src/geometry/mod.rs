//! The geometry tool's node kinds.
//!
//! Every kind threads a [`BuilderState`]: the running point list and the
//! current axis. Generators append points, modifiers rewrite the existing
//! ones, and the two container kinds evaluate their children as a separate
//! builder and merge the result.
//!
//! The numeric definitions live in [`shapes`]; this module only adapts them
//! to node parameters and to the chained calls of the emitted program.
//! Angles are evaluated at the precision the program spells them with, see
//! [`emitted_degrees`](crate::kotlin::emitted_degrees).

pub mod params;
pub mod shapes;

pub use params::*;

use glam::DVec3;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::ParamError;
use crate::eval;
use crate::kotlin::{
    components, emitted_degrees, format_angle, format_double, format_int, relative_location, KotlinWriter,
};
use crate::node::{FourierTerm, NodeId, NodeKind};
use crate::params::{ParamField, ParamValue};
use crate::random::RandomSource;
use crate::tree::NodeView;

/// Running state of a geometry evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct BuilderState {
    pub points: Vec<DVec3>,
    pub axis: DVec3,
    /// Index range each point-producing node contributed.
    pub segments: BTreeMap<NodeId, Range<usize>>,
}

impl BuilderState {
    pub fn new(axis: DVec3) -> Self {
        Self {
            points: Vec::new(),
            axis,
            segments: BTreeMap::new(),
        }
    }

    /// Append another builder's points, shifting its segments to match.
    fn merge(&mut self, child: BuilderState) {
        let offset = self.points.len();
        self.points.extend(child.points);
        self.shift_in(child.segments, offset);
    }

    fn shift_in(&mut self, segments: BTreeMap<NodeId, Range<usize>>, offset: usize) {
        for (id, range) in segments {
            self.segments.insert(id, range.start + offset..range.end + offset);
        }
    }
}

node_kinds! {
    /// A geometry node kind with its parameters.
    pub enum Geometry {
        Axis(Axis) => ("axis", "Axis", "Set the current axis used by later rotations"),
        Scale(Scale) => ("scale", "Scale", "Multiply every point by a factor"),
        RotateAsAxis(RotateAsAxis) => ("rotate_as_axis", "Rotate", "Rotate every point about the current or a custom axis"),
        RotateTo(RotateTo) => ("rotate_to", "Rotate To", "Rotate every point so the current axis points at a target"),
        AddPoint(AddPoint) => ("add_point", "Point", "Append a single point"),
        AddLine(AddLine) => ("add_line", "Line", "Append evenly spaced points between two ends"),
        AddCircle(AddCircle) => ("add_circle", "Circle", "Append points around a circle on the XZ plane"),
        AddDiscreteCircleXz(AddDiscreteCircleXz) => ("add_discrete_circle_xz", "Discrete Circle", "Append a circle with random radial jitter"),
        AddArc(AddArc) => ("add_arc", "Arc", "Append points along an arc on the XZ plane"),
        AddBall(AddBall) => ("add_ball", "Ball", "Append evenly distributed points on a sphere"),
        AddBezierCurve(AddBezierCurve) => ("add_bezier_curve", "Bezier Curve", "Append samples of a cubic Bezier curve"),
        AddPolygonInCircle(AddPolygonInCircle) => ("add_polygon_in_circle", "Polygon", "Append the edges of a regular polygon"),
        AddRoundShape(AddRoundShape) => ("add_round_shape", "Round Shape", "Append a filled disk of concentric rings"),
        AddSpiral(AddSpiral) => ("add_spiral", "Spiral", "Append a helix rising along Y"),
        AddCube(AddCube) => ("add_cube", "Cube", "Append points along the edges of a cube"),
        AddRect(AddRect) => ("add_rect", "Rectangle", "Append a grid on the XZ plane"),
        AddLightningPoints(AddLightningPoints) => ("add_lightning_points", "Lightning", "Append a jagged line"),
        AddLightningNodesAttenuation(AddLightningNodesAttenuation) => ("add_lightning_nodes_attenuation", "Lightning Nodes", "Append a bolt whose jitter decays along its length"),
        AddFourierSeries(AddFourierSeries) => ("add_fourier_series", "Fourier Series", "Append a curve summed from sinusoid terms"),
        ApplyNoiseOffset(ApplyNoiseOffset) => ("apply_noise_offset", "Noise Offset", "Jitter every point independently per component"),
        PointsOnEachOffset(PointsOnEachOffset) => ("points_on_each_offset", "Offset", "Translate every point"),
        ApplyRandomOffset(ApplyRandomOffset) => ("apply_random_offset", "Random Offset", "Push every point along a random direction"),
        ApplySpiralOffset(ApplySpiralOffset) => ("apply_spiral_offset", "Spiral Offset", "Offset points around the current axis by a growing angle"),
        WithBuilder(WithBuilder) => ("with_builder", "Builder", "Evaluate the children as a separate builder and append the result"),
        AddWith(AddWith) => ("add_with", "Repeat", "Append rotated copies of the children's points"),
    }
}

impl Geometry {
    /// Whether this kind draws from the thread RNG, so two evaluations of
    /// the same node differ.
    pub fn is_unseeded_random(&self) -> bool {
        let seed = match self {
            Geometry::AddDiscreteCircleXz(p) => p.seed(),
            Geometry::AddLightningPoints(p) => p.seed(),
            Geometry::AddLightningNodesAttenuation(p) => p.seed(),
            Geometry::ApplyNoiseOffset(p) => p.seed(),
            Geometry::ApplyRandomOffset(p) => p.seed(),
            _ => return false,
        };
        seed.is_none()
    }
}

impl NodeKind for Geometry {
    type Context<'a> = BuilderState;

    const PROGRAM: &'static str = "PointsBuilder()";
    const CATALOG: &'static [&'static str] = Self::NAMES;

    fn name(&self) -> &'static str {
        self.kind_name()
    }

    fn title(&self) -> &'static str {
        self.kind_title()
    }

    fn description(&self) -> &'static str {
        self.kind_description()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::kind_from_name(name)
    }

    fn is_container(&self) -> bool {
        matches!(self, Geometry::WithBuilder(_) | Geometry::AddWith(_))
    }

    fn has_terms(&self) -> bool {
        matches!(self, Geometry::AddFourierSeries(_))
    }

    fn fields(&self) -> &'static [ParamField] {
        self.kind_fields()
    }

    fn param(&self, key: &str) -> Option<ParamValue> {
        self.kind_param(key)
    }

    fn set_param(&mut self, key: &str, value: &ParamValue) -> Result<(), ParamError> {
        self.kind_set_param(key, value)
    }

    fn apply(node: NodeView<'_, Self>, state: &mut BuilderState) {
        let start = state.points.len();
        apply_kind(node, state);
        let end = state.points.len();
        if end > start {
            state.segments.insert(node.id, start..end);
        }
    }

    fn kotlin(node: NodeView<'_, Self>, out: &mut KotlinWriter) {
        write_kind(node, out);
    }
}

fn apply_kind(node: NodeView<'_, Geometry>, state: &mut BuilderState) {
    let points = &mut state.points;
    match &node.kind {
        Geometry::Axis(p) => state.axis = p.axis,
        Geometry::Scale(p) => shapes::scale(points, p.factor),
        Geometry::RotateAsAxis(p) => {
            let axis = if p.use_custom_axis { p.custom_axis } else { state.axis };
            shapes::rotate_as_axis(points, axis, emitted_degrees(p.angle));
        }
        Geometry::RotateTo(p) => {
            if let Some(axis) = shapes::rotate_to(points, state.axis, p.target) {
                state.axis = axis;
            }
        }
        Geometry::AddPoint(p) => points.push(p.point),
        Geometry::AddLine(p) => points.extend(shapes::line(p.start, p.end, p.count)),
        Geometry::AddCircle(p) => points.extend(shapes::circle(p.radius, p.count)),
        Geometry::AddDiscreteCircleXz(p) => {
            let mut rng = RandomSource::new(p.seed());
            points.extend(shapes::discrete_circle(p.radius, p.count, p.discrete, &mut rng));
        }
        Geometry::AddArc(p) => points.extend(shapes::arc(
            p.radius,
            emitted_degrees(p.start_angle),
            emitted_degrees(p.end_angle),
            p.count,
        )),
        Geometry::AddBall(p) => points.extend(shapes::ball(p.radius, p.count)),
        Geometry::AddBezierCurve(p) => {
            points.extend(shapes::bezier(p.start, p.control1, p.control2, p.end, p.count))
        }
        Geometry::AddPolygonInCircle(p) => {
            points.extend(shapes::polygon_in_circle(p.sides, p.edge_count, p.radius))
        }
        Geometry::AddRoundShape(p) => points.extend(shapes::round_shape(
            p.radius,
            p.step,
            p.min_circle_count,
            p.max_circle_count,
        )),
        Geometry::AddSpiral(p) => points.extend(shapes::spiral(
            p.start_radius,
            p.end_radius,
            p.height,
            p.count,
            p.turns,
        )),
        Geometry::AddCube(p) => points.extend(shapes::cube(p.size, p.edge_count)),
        Geometry::AddRect(p) => points.extend(shapes::rect(p.width, p.depth, p.count_x, p.count_z)),
        Geometry::AddLightningPoints(p) => {
            let mut rng = RandomSource::new(p.seed());
            points.extend(shapes::lightning_points(p.start, p.end, p.count, p.offset_range, &mut rng));
        }
        Geometry::AddLightningNodesAttenuation(p) => {
            let mut rng = RandomSource::new(p.seed());
            points.extend(shapes::lightning_nodes_attenuation(
                p.start,
                p.end,
                p.node_count,
                p.max_offset,
                p.attenuation,
                p.line_count,
                &mut rng,
            ));
        }
        Geometry::AddFourierSeries(p) => {
            let terms: Vec<FourierTerm> = node
                .terms
                .iter()
                .map(|t| FourierTerm { start_angle: emitted_degrees(t.start_angle), ..*t })
                .collect();
            points.extend(shapes::fourier_series(&terms, p.count, p.scale));
        }
        Geometry::ApplyNoiseOffset(p) => {
            let mut rng = RandomSource::new(p.seed());
            shapes::noise_offset(points, p.noise, &mut rng);
        }
        Geometry::PointsOnEachOffset(p) => shapes::offset(points, p.offset),
        Geometry::ApplyRandomOffset(p) => {
            let mut rng = RandomSource::new(p.seed());
            shapes::random_offset(points, p.min_length, p.max_length, &mut rng);
        }
        Geometry::ApplySpiralOffset(p) => {
            shapes::spiral_offset(points, state.axis, p.radius, emitted_degrees(p.angle_step))
        }
        Geometry::WithBuilder(_) => {
            let child = eval::evaluate(node.children(), DVec3::Y);
            state.merge(child.into_state());
        }
        Geometry::AddWith(p) => {
            let child = eval::evaluate(node.children(), DVec3::Y);
            let offset = state.points.len();
            let copies = shapes::repeat_rotated(
                &child.points,
                state.axis,
                p.repeat,
                emitted_degrees(p.start_angle),
            );
            let copied = p.repeat > 0 && copies.len() >= child.points.len();
            state.points.extend(copies);
            if copied {
                state.shift_in(child.segments, offset);
            }
        }
    }
}

/// `, SeededRandom(seed)` when seeded, nothing otherwise.
fn seeded_arg(seed: Option<i64>) -> String {
    match seed {
        Some(seed) => format!(", SeededRandom({})", seed),
        None => String::new(),
    }
}

fn write_kind(node: NodeView<'_, Geometry>, out: &mut KotlinWriter) {
    let call = match &node.kind {
        Geometry::Axis(p) => format!(".axis({})", relative_location(p.axis)),
        Geometry::Scale(p) => format!(".scale({})", format_double(p.factor)),
        Geometry::RotateAsAxis(p) => {
            if p.use_custom_axis {
                format!(".rotateAsAxis({}, {})", format_angle(p.angle), relative_location(p.custom_axis))
            } else {
                format!(".rotateAsAxis({})", format_angle(p.angle))
            }
        }
        Geometry::RotateTo(p) => format!(".rotateTo({})", relative_location(p.target)),
        Geometry::AddPoint(p) => format!(".addPoint({})", relative_location(p.point)),
        Geometry::AddLine(p) => format!(
            ".addLine({}, {}, {})",
            relative_location(p.start),
            relative_location(p.end),
            format_int(p.count.max(1) as i64)
        ),
        Geometry::AddCircle(p) => format!(".addCircle({}, {})", format_double(p.radius), format_int(p.count as i64)),
        Geometry::AddDiscreteCircleXz(p) => format!(
            ".addDiscreteCircleXZ({}, {}, {}{})",
            format_double(p.radius),
            format_int(p.count as i64),
            format_double(p.discrete),
            seeded_arg(p.seed())
        ),
        Geometry::AddArc(p) => format!(
            ".addArc({}, {}, {}, {})",
            format_double(p.radius),
            format_angle(p.start_angle),
            format_angle(p.end_angle),
            format_int(p.count.max(1) as i64)
        ),
        Geometry::AddBall(p) => format!(".addBall({}, {})", format_double(p.radius), format_int(p.count as i64)),
        Geometry::AddBezierCurve(p) => format!(
            ".addBezierCurve({}, {}, {}, {}, {})",
            relative_location(p.start),
            relative_location(p.control1),
            relative_location(p.control2),
            relative_location(p.end),
            format_int(p.count.max(1) as i64)
        ),
        Geometry::AddPolygonInCircle(p) => format!(
            ".addPolygonInCircle({}, {}, {})",
            format_int(p.sides as i64),
            format_int(p.edge_count as i64),
            format_double(p.radius)
        ),
        Geometry::AddRoundShape(p) => format!(
            ".addRoundShape({}, {}, {}, {})",
            format_double(p.radius),
            format_double(p.step),
            format_int(p.min_circle_count as i64),
            format_int(p.max_circle_count as i64)
        ),
        Geometry::AddSpiral(p) => format!(
            ".addSpiral({}, {}, {}, {}, {})",
            format_double(p.start_radius),
            format_double(p.end_radius),
            format_double(p.height),
            format_int(p.count as i64),
            format_double(p.turns)
        ),
        Geometry::AddCube(p) => format!(".addCube({}, {})", format_double(p.size), format_int(p.edge_count as i64)),
        Geometry::AddRect(p) => format!(
            ".addRect({}, {}, {}, {})",
            format_double(p.width),
            format_double(p.depth),
            format_int(p.count_x as i64),
            format_int(p.count_z as i64)
        ),
        Geometry::AddLightningPoints(p) => format!(
            ".addLightningPoints({}, {}, {}, {}{})",
            relative_location(p.start),
            relative_location(p.end),
            format_int(p.count.max(1) as i64),
            format_double(p.offset_range),
            seeded_arg(p.seed())
        ),
        Geometry::AddLightningNodesAttenuation(p) => format!(
            ".addLightningNodesAttenuation({}, {}, {}, {}, {}, {}{})",
            relative_location(p.start),
            relative_location(p.end),
            format_int(p.node_count.max(1) as i64),
            format_double(p.max_offset),
            format_double(p.attenuation),
            format_int(p.line_count.max(1) as i64),
            seeded_arg(p.seed())
        ),
        Geometry::AddFourierSeries(p) => {
            let terms: Vec<String> = node
                .terms
                .iter()
                .map(|t| {
                    format!(
                        ".term({}, {}, {})",
                        format_double(t.r),
                        format_double(t.w),
                        format_angle(t.start_angle)
                    )
                })
                .collect();
            let series = out.declare("fourier", "FourierSeries()", &terms);
            format!(
                ".addFourierSeries({}, {}, {})",
                series,
                format_int(p.count as i64),
                format_double(p.scale)
            )
        }
        Geometry::ApplyNoiseOffset(p) => {
            format!(".applyNoiseOffset({}{})", components(p.noise), seeded_arg(p.seed()))
        }
        Geometry::PointsOnEachOffset(p) => format!(".pointsOnEachOffset({})", components(p.offset)),
        Geometry::ApplyRandomOffset(p) => format!(
            ".applyRandomOffset({}, {}{})",
            format_double(p.min_length),
            format_double(p.max_length),
            seeded_arg(p.seed())
        ),
        Geometry::ApplySpiralOffset(p) => format!(
            ".applySpiralOffset({}, {})",
            format_double(p.radius),
            format_angle(p.angle_step)
        ),
        Geometry::WithBuilder(_) => {
            out.call(".addBuilder(");
            out.nested(node.children());
            ")".to_string()
        }
        Geometry::AddWith(p) => {
            out.call(format!(
                ".addWith({}, {},",
                format_int(p.repeat as i64),
                format_angle(p.start_angle)
            ));
            out.nested(node.children());
            ")".to_string()
        }
    };
    out.call(call);
}
