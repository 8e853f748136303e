//! Parameter structs for the geometry kinds.
//!
//! Each struct's `Default` is the kind's default parameter set. Angles are
//! stored in degrees.

use glam::DVec3;

use crate::NodeParams;

/// Seeded kinds use their seed only when `seed_enabled` is set.
///
/// The program passes the seed as an `Int`, so wider values wrap to 32 bits
/// here and evaluation, emission and replay all see the same number.
fn seed_of(enabled: bool, seed: i64) -> Option<i64> {
    enabled.then_some(i64::from(seed as i32))
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct Axis {
    pub axis: DVec3,
}

impl Default for Axis {
    fn default() -> Self {
        Self { axis: DVec3::Y }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct Scale {
    pub factor: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct RotateAsAxis {
    pub angle: f64,
    pub use_custom_axis: bool,
    pub custom_axis: DVec3,
}

impl Default for RotateAsAxis {
    fn default() -> Self {
        Self {
            angle: 90.0,
            use_custom_axis: false,
            custom_axis: DVec3::Y,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct RotateTo {
    pub target: DVec3,
}

impl Default for RotateTo {
    fn default() -> Self {
        Self { target: DVec3::X }
    }
}

#[derive(NodeParams, Clone, Debug, Default, PartialEq)]
pub struct AddPoint {
    pub point: DVec3,
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddLine {
    pub start: DVec3,
    pub end: DVec3,
    pub count: i32,
}

impl Default for AddLine {
    fn default() -> Self {
        Self {
            start: DVec3::ZERO,
            end: DVec3::new(3.0, 0.0, 3.0),
            count: 30,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddCircle {
    pub radius: f64,
    pub count: i32,
}

impl Default for AddCircle {
    fn default() -> Self {
        Self { radius: 2.0, count: 60 }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddDiscreteCircleXz {
    pub radius: f64,
    pub count: i32,
    pub discrete: f64,
    pub seed_enabled: bool,
    pub seed: i64,
}

impl AddDiscreteCircleXz {
    pub fn seed(&self) -> Option<i64> {
        seed_of(self.seed_enabled, self.seed)
    }
}

impl Default for AddDiscreteCircleXz {
    fn default() -> Self {
        Self {
            radius: 2.0,
            count: 60,
            discrete: 0.2,
            seed_enabled: false,
            seed: 1,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddArc {
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub count: i32,
}

impl Default for AddArc {
    fn default() -> Self {
        Self {
            radius: 2.0,
            start_angle: 0.0,
            end_angle: 180.0,
            count: 30,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddBall {
    pub radius: f64,
    pub count: i32,
}

impl Default for AddBall {
    fn default() -> Self {
        Self { radius: 2.0, count: 200 }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddBezierCurve {
    pub start: DVec3,
    pub control1: DVec3,
    pub control2: DVec3,
    pub end: DVec3,
    pub count: i32,
}

impl Default for AddBezierCurve {
    fn default() -> Self {
        Self {
            start: DVec3::ZERO,
            control1: DVec3::new(1.0, 2.0, 0.0),
            control2: DVec3::new(2.0, -2.0, 0.0),
            end: DVec3::new(3.0, 0.0, 0.0),
            count: 40,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddPolygonInCircle {
    pub sides: i32,
    pub edge_count: i32,
    pub radius: f64,
}

impl Default for AddPolygonInCircle {
    fn default() -> Self {
        Self {
            sides: 5,
            edge_count: 10,
            radius: 2.0,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddRoundShape {
    pub radius: f64,
    pub step: f64,
    pub min_circle_count: i32,
    pub max_circle_count: i32,
}

impl Default for AddRoundShape {
    fn default() -> Self {
        Self {
            radius: 2.0,
            step: 0.25,
            min_circle_count: 8,
            max_circle_count: 48,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddSpiral {
    pub start_radius: f64,
    pub end_radius: f64,
    pub height: f64,
    pub count: i32,
    pub turns: f64,
}

impl Default for AddSpiral {
    fn default() -> Self {
        Self {
            start_radius: 0.5,
            end_radius: 2.0,
            height: 3.0,
            count: 120,
            turns: 3.0,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddCube {
    pub size: f64,
    pub edge_count: i32,
}

impl Default for AddCube {
    fn default() -> Self {
        Self {
            size: 2.0,
            edge_count: 10,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddRect {
    pub width: f64,
    pub depth: f64,
    pub count_x: i32,
    pub count_z: i32,
}

impl Default for AddRect {
    fn default() -> Self {
        Self {
            width: 4.0,
            depth: 2.0,
            count_x: 9,
            count_z: 5,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddLightningPoints {
    pub start: DVec3,
    pub end: DVec3,
    pub count: i32,
    pub offset_range: f64,
    pub seed_enabled: bool,
    pub seed: i64,
}

impl AddLightningPoints {
    pub fn seed(&self) -> Option<i64> {
        seed_of(self.seed_enabled, self.seed)
    }
}

impl Default for AddLightningPoints {
    fn default() -> Self {
        Self {
            start: DVec3::ZERO,
            end: DVec3::new(0.0, 5.0, 0.0),
            count: 20,
            offset_range: 0.3,
            seed_enabled: false,
            seed: 1,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddLightningNodesAttenuation {
    pub start: DVec3,
    pub end: DVec3,
    pub node_count: i32,
    pub max_offset: f64,
    pub attenuation: f64,
    pub line_count: i32,
    pub seed_enabled: bool,
    pub seed: i64,
}

impl AddLightningNodesAttenuation {
    pub fn seed(&self) -> Option<i64> {
        seed_of(self.seed_enabled, self.seed)
    }
}

impl Default for AddLightningNodesAttenuation {
    fn default() -> Self {
        Self {
            start: DVec3::ZERO,
            end: DVec3::new(0.0, 6.0, 0.0),
            node_count: 8,
            max_offset: 1.0,
            attenuation: 0.8,
            line_count: 6,
            seed_enabled: false,
            seed: 1,
        }
    }
}

/// The series' terms live on the node, not in the parameters.
#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddFourierSeries {
    pub count: i32,
    pub scale: f64,
}

impl Default for AddFourierSeries {
    fn default() -> Self {
        Self {
            count: 360,
            scale: 1.0,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ApplyNoiseOffset {
    pub noise: DVec3,
    pub seed_enabled: bool,
    pub seed: i64,
}

impl ApplyNoiseOffset {
    pub fn seed(&self) -> Option<i64> {
        seed_of(self.seed_enabled, self.seed)
    }
}

impl Default for ApplyNoiseOffset {
    fn default() -> Self {
        Self {
            noise: DVec3::splat(0.1),
            seed_enabled: false,
            seed: 1,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct PointsOnEachOffset {
    pub offset: DVec3,
}

impl Default for PointsOnEachOffset {
    fn default() -> Self {
        Self { offset: DVec3::Y }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ApplyRandomOffset {
    pub min_length: f64,
    pub max_length: f64,
    pub seed_enabled: bool,
    pub seed: i64,
}

impl ApplyRandomOffset {
    pub fn seed(&self) -> Option<i64> {
        seed_of(self.seed_enabled, self.seed)
    }
}

impl Default for ApplyRandomOffset {
    fn default() -> Self {
        Self {
            min_length: 0.05,
            max_length: 0.2,
            seed_enabled: false,
            seed: 1,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ApplySpiralOffset {
    pub radius: f64,
    pub angle_step: f64,
}

impl Default for ApplySpiralOffset {
    fn default() -> Self {
        Self {
            radius: 0.2,
            angle_step: 10.0,
        }
    }
}

/// No parameters; the children are the whole configuration.
#[derive(NodeParams, Clone, Debug, Default, PartialEq)]
pub struct WithBuilder;

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct AddWith {
    pub repeat: i32,
    pub start_angle: f64,
}

impl Default for AddWith {
    fn default() -> Self {
        Self {
            repeat: 4,
            start_angle: 0.0,
        }
    }
}
