//! Live particle state for the emitter tool.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;

/// One simulated particle.
///
/// Velocity is in units per tick. `age` and `max_life` count ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: DVec3,
    pub previous_position: DVec3,
    pub velocity: DVec3,
    pub age: u32,
    pub max_life: u32,
    pub size: f64,
    /// Per-particle seed decorrelating noise between particles.
    pub random_seed: u32,
}

impl Particle {
    pub fn new(position: DVec3, velocity: DVec3, max_life: u32, size: f64, random_seed: u32) -> Self {
        Self {
            position,
            previous_position: position,
            velocity,
            age: 0,
            max_life,
            size,
            random_seed,
        }
    }

    /// Remaining life in `[0, 1]`: 1 when spawned, 0 at the end of life.
    pub fn life_remaining(&self) -> f64 {
        if self.max_life == 0 {
            return 0.0;
        }
        (1.0 - self.age as f64 / self.max_life as f64).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.max_life
    }

    /// Position between the last two ticks, `alpha` in `[0, 1]`.
    pub fn interpolated(&self, alpha: f64) -> DVec3 {
        self.previous_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }
}

/// Per-instance data handed to a renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    pub position: [f32; 3],
    pub size: f32,
    /// Remaining life, for fading.
    pub life: f32,
    pub _pad: [f32; 3],
}

impl RenderVertex {
    pub fn from_particle(particle: &Particle, alpha: f64) -> Self {
        let p = particle.interpolated(alpha).as_vec3();
        Self {
            position: p.to_array(),
            size: particle.size as f32,
            life: particle.life_remaining() as f32,
            _pad: [0.0; 3],
        }
    }
}
