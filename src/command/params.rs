//! Parameter structs for the particle commands.

use glam::DVec3;

use crate::{NodeParams, ParamEnum};

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleNoise {
    pub strength: f64,
    pub frequency: f64,
    /// How fast the noise field scrolls over time.
    pub speed: f64,
    pub affect_y: bool,
    /// Speed cap after the push; `0` disables the cap.
    pub clamp_speed: f64,
    /// Fade the push out as the particle ages.
    pub use_life_curve: bool,
}

impl Default for ParticleNoise {
    fn default() -> Self {
        Self {
            strength: 0.03,
            frequency: 0.5,
            speed: 0.2,
            affect_y: true,
            clamp_speed: 0.0,
            use_life_curve: false,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleDrag {
    /// Fraction of velocity removed per tick.
    pub damping: f64,
    /// Constant speed removed per tick after damping.
    pub linear: f64,
}

impl Default for ParticleDrag {
    fn default() -> Self {
        Self {
            damping: 0.05,
            linear: 0.0,
        }
    }
}

/// Shape of the analytic flow field.
#[derive(ParamEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowPattern {
    #[default]
    Waves,
    Swirl,
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleFlowField {
    pub amplitude: f64,
    pub frequency: f64,
    pub time_scale: f64,
    pub phase_offset: f64,
    pub pattern: FlowPattern,
}

impl Default for ParticleFlowField {
    fn default() -> Self {
        Self {
            amplitude: 0.02,
            frequency: 0.5,
            time_scale: 1.0,
            phase_offset: 0.0,
            pattern: FlowPattern::Waves,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleAttraction {
    pub target: DVec3,
    pub strength: f64,
    pub range: f64,
    pub falloff_power: f64,
    /// Closer than this, the pull is skipped.
    pub min_distance: f64,
}

impl Default for ParticleAttraction {
    fn default() -> Self {
        Self {
            target: DVec3::ZERO,
            strength: 0.02,
            range: 4.0,
            falloff_power: 2.0,
            min_distance: 0.1,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleOrbit {
    pub center: DVec3,
    pub axis: DVec3,
    /// Preferred distance from the axis.
    pub radius: f64,
    /// Spring strength pulling toward `radius`.
    pub strength: f64,
    pub tangential_speed: f64,
    pub range: f64,
    pub falloff_power: f64,
}

impl Default for ParticleOrbit {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            axis: DVec3::Y,
            radius: 2.0,
            strength: 0.02,
            tangential_speed: 0.1,
            range: 6.0,
            falloff_power: 2.0,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleVortex {
    pub center: DVec3,
    pub axis: DVec3,
    pub swirl_strength: f64,
    pub radial_pull: f64,
    pub axial_lift: f64,
    pub range: f64,
    pub falloff_power: f64,
}

impl Default for ParticleVortex {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            axis: DVec3::Y,
            swirl_strength: 0.1,
            radial_pull: 0.02,
            axial_lift: 0.01,
            range: 6.0,
            falloff_power: 2.0,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleRotationForce {
    pub center: DVec3,
    pub axis: DVec3,
    /// Angular speed in radians per tick.
    pub angular_strength: f64,
    pub range: f64,
    pub falloff_power: f64,
}

impl Default for ParticleRotationForce {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            axis: DVec3::Y,
            angular_strength: 0.05,
            range: 6.0,
            falloff_power: 2.0,
        }
    }
}

#[derive(NodeParams, Clone, Debug, PartialEq)]
pub struct ParticleGravity {
    /// Downward acceleration per tick.
    pub strength: f64,
    pub damping: f64,
}

impl Default for ParticleGravity {
    fn default() -> Self {
        Self {
            strength: 0.02,
            damping: 0.0,
        }
    }
}
