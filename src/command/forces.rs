//! Velocity forces.
//!
//! Each command mutates one particle's velocity for one tick. Forces
//! anchored on an axis skip the particle when the axis is degenerate or the
//! particle sits on the axis; none of them writes `NaN` into a velocity.
//!
//! Tangential directions follow the right-hand rule: `axis × radial`, so a
//! positive strength about +Y turns counter-clockwise seen from above.

use glam::DVec3;

use super::params::*;
use crate::math::{unit, EPSILON};
use crate::noise;
use crate::particle::Particle;

/// Inverse-power distance falloff: `1 / (1 + (distance / range)^power)`.
///
/// Equals 1 at distance 0 and decreases with distance for positive powers.
/// A non-positive `range` disables falloff.
pub fn falloff(distance: f64, range: f64, power: f64) -> f64 {
    if range <= 0.0 || distance <= 0.0 {
        return 1.0;
    }
    1.0 / (1.0 + (distance / range).powf(power))
}

/// Decomposition of a particle's offset from an axis through `center`.
struct AxisFrame {
    axis: DVec3,
    /// Unit direction from the axis to the particle.
    radial: DVec3,
    /// `axis × radial`.
    tangent: DVec3,
    distance: f64,
}

impl AxisFrame {
    fn new(position: DVec3, center: DVec3, axis: DVec3) -> Option<Self> {
        let axis = unit(axis)?;
        let offset = position - center;
        let projected = offset - axis * axis.dot(offset);
        let distance = projected.length();
        if distance < EPSILON {
            return None;
        }
        let radial = projected / distance;
        Some(Self {
            axis,
            radial,
            tangent: axis.cross(radial),
            distance,
        })
    }
}

/// Cap `velocity` at `max_speed`.
fn clamp_speed(velocity: DVec3, max_speed: f64) -> DVec3 {
    let speed = velocity.length();
    if speed > max_speed && speed > EPSILON {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}

impl ParticleNoise {
    pub fn apply(&self, particle: &mut Particle, time: f64) {
        let sample = particle.position * self.frequency + DVec3::splat(time * self.speed);
        let mut push = noise::value3_vec(sample, particle.random_seed);
        if !self.affect_y {
            push.y = 0.0;
        }
        let mut strength = self.strength;
        if self.use_life_curve {
            strength *= particle.life_remaining();
        }
        particle.velocity += push * strength;
        if self.clamp_speed > 0.0 {
            particle.velocity = clamp_speed(particle.velocity, self.clamp_speed);
        }
    }
}

impl ParticleDrag {
    pub fn apply(&self, particle: &mut Particle) {
        let keep = (1.0 - self.damping).clamp(0.0, 1.0);
        let mut velocity = particle.velocity * keep;
        if self.linear > 0.0 {
            let speed = velocity.length();
            velocity = if speed > self.linear {
                velocity * ((speed - self.linear) / speed)
            } else {
                DVec3::ZERO
            };
        }
        particle.velocity = velocity;
    }
}

impl ParticleFlowField {
    /// Field value at `position` and `time`, before amplitude.
    pub fn field(&self, position: DVec3, time: f64) -> DVec3 {
        let p = position * self.frequency;
        let t = time * self.time_scale + self.phase_offset;
        match self.pattern {
            FlowPattern::Waves => DVec3::new((p.y + t).sin(), (p.z + t).sin(), (p.x + t).sin()),
            FlowPattern::Swirl => {
                let angle = p.z.atan2(p.x);
                DVec3::new(-angle.sin(), 0.5 * (p.y + t).sin(), angle.cos())
            }
        }
    }

    pub fn apply(&self, particle: &mut Particle, time: f64) {
        particle.velocity += self.field(particle.position, time) * self.amplitude;
    }
}

impl ParticleAttraction {
    pub fn apply(&self, particle: &mut Particle) {
        let offset = self.target - particle.position;
        let distance = offset.length();
        if distance < self.min_distance.max(EPSILON) {
            return;
        }
        let pull = self.strength * falloff(distance, self.range, self.falloff_power);
        particle.velocity += offset / distance * pull;
    }
}

impl ParticleOrbit {
    pub fn apply(&self, particle: &mut Particle) {
        let Some(frame) = AxisFrame::new(particle.position, self.center, self.axis) else {
            return;
        };
        let weight = falloff(frame.distance, self.range, self.falloff_power);
        let spring = frame.radial * ((self.radius - frame.distance) * self.strength);
        let swirl = frame.tangent * self.tangential_speed;
        particle.velocity += (spring + swirl) * weight;
    }
}

impl ParticleVortex {
    pub fn apply(&self, particle: &mut Particle) {
        let Some(frame) = AxisFrame::new(particle.position, self.center, self.axis) else {
            return;
        };
        let weight = falloff(frame.distance, self.range, self.falloff_power);
        let force = frame.tangent * self.swirl_strength - frame.radial * self.radial_pull
            + frame.axis * self.axial_lift;
        particle.velocity += force * weight;
    }
}

impl ParticleRotationForce {
    pub fn apply(&self, particle: &mut Particle) {
        let Some(frame) = AxisFrame::new(particle.position, self.center, self.axis) else {
            return;
        };
        let weight = falloff(frame.distance, self.range, self.falloff_power);
        particle.velocity += frame.tangent * (self.angular_strength * frame.distance * weight);
    }
}

impl ParticleGravity {
    pub fn apply(&self, particle: &mut Particle) {
        particle.velocity.y -= self.strength;
        particle.velocity *= (1.0 - self.damping).clamp(0.0, 1.0);
    }
}
