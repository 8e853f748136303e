//! Emitter shapes and initial velocities for spawning particles.
//!
//! Samplers are pure functions of their own parameters and the RNG handed
//! in; the simulation owns the RNG so a seeded run is reproducible.

use glam::DVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Region new particles appear in, centered on the origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmitterShape {
    Point,
    /// Axis-aligned box of full extents `size`.
    ///
    /// `density` bends each coordinate by a power curve: above 1 pulls
    /// samples toward the center, below 1 pushes them toward the faces.
    /// `surface_only` pins one random axis to a face.
    Box {
        size: DVec3,
        density: f64,
        surface_only: bool,
    },
    Sphere {
        radius: f64,
    },
    SphereSurface {
        radius: f64,
    },
    /// Circle on the XZ plane with radial jitter up to `thickness`.
    Ring {
        radius: f64,
        thickness: f64,
    },
}

impl Default for EmitterShape {
    fn default() -> Self {
        EmitterShape::Sphere { radius: 0.5 }
    }
}

impl EmitterShape {
    pub fn name(&self) -> &'static str {
        match self {
            EmitterShape::Point => "Point",
            EmitterShape::Box { .. } => "Box",
            EmitterShape::Sphere { .. } => "Sphere",
            EmitterShape::SphereSurface { .. } => "Sphere Surface",
            EmitterShape::Ring { .. } => "Ring",
        }
    }

    /// Draw one spawn position.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> DVec3 {
        match self {
            EmitterShape::Point => DVec3::ZERO,
            EmitterShape::Box {
                size,
                density,
                surface_only,
            } => {
                let mut unit = DVec3::new(
                    biased(rng, *density),
                    biased(rng, *density),
                    biased(rng, *density),
                );
                if *surface_only {
                    let face = if rng.gen::<bool>() { 1.0 } else { -1.0 };
                    match rng.gen_range(0..3) {
                        0 => unit.x = face,
                        1 => unit.y = face,
                        _ => unit.z = face,
                    }
                }
                unit * *size * 0.5
            }
            EmitterShape::Sphere { radius } => random_in_sphere(rng) * *radius,
            EmitterShape::SphereSurface { radius } => random_direction(rng) * *radius,
            EmitterShape::Ring { radius, thickness } => {
                let angle = rng.gen_range(0.0..TAU);
                let r = radius + symmetric(rng, *thickness);
                DVec3::new(r * angle.cos(), 0.0, r * angle.sin())
            }
        }
    }
}

/// Initial velocity of a freshly spawned particle, in units per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitialVelocity {
    Zero,
    Fixed { velocity: DVec3 },
    RandomDirection { speed: f64 },
    /// Away from the emitter center.
    Outward { speed: f64 },
}

impl Default for InitialVelocity {
    fn default() -> Self {
        InitialVelocity::Zero
    }
}

impl InitialVelocity {
    /// Draw a velocity for a particle spawned at `local` (relative to the
    /// emitter center).
    pub fn sample<R: Rng>(&self, rng: &mut R, local: DVec3) -> DVec3 {
        match self {
            InitialVelocity::Zero => DVec3::ZERO,
            InitialVelocity::Fixed { velocity } => *velocity,
            InitialVelocity::RandomDirection { speed } => random_direction(rng) * *speed,
            InitialVelocity::Outward { speed } => {
                let direction = crate::math::unit(local).unwrap_or_else(|| random_direction(rng));
                direction * *speed
            }
        }
    }
}

/// Uniform in `[-1, 1]`, bent toward 0 or the ends by `density`.
fn biased<R: Rng>(rng: &mut R, density: f64) -> f64 {
    let u: f64 = rng.gen_range(-1.0..=1.0);
    let power = if density > 0.0 { density } else { 1.0 };
    u.signum() * u.abs().powf(power)
}

fn symmetric<R: Rng>(rng: &mut R, extent: f64) -> f64 {
    if extent > 0.0 {
        rng.gen_range(-extent..=extent)
    } else {
        0.0
    }
}

/// Uniform point inside the unit sphere.
fn random_in_sphere<R: Rng>(rng: &mut R) -> DVec3 {
    loop {
        let v = DVec3::new(
            rng.gen::<f64>() * 2.0 - 1.0,
            rng.gen::<f64>() * 2.0 - 1.0,
            rng.gen::<f64>() * 2.0 - 1.0,
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

/// Uniform direction on the unit sphere.
fn random_direction<R: Rng>(rng: &mut R) -> DVec3 {
    loop {
        let v = DVec3::new(
            rng.gen::<f64>() * 2.0 - 1.0,
            rng.gen::<f64>() * 2.0 - 1.0,
            rng.gen::<f64>() * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 0.001 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(11)
    }

    #[test]
    fn test_point() {
        assert_eq!(EmitterShape::Point.sample(&mut rng()), DVec3::ZERO);
    }

    #[test]
    fn test_shape_names() {
        assert_eq!(EmitterShape::Point.name(), "Point");
        assert_eq!(EmitterShape::default().name(), "Sphere");
        assert_eq!(EmitterShape::SphereSurface { radius: 1.0 }.name(), "Sphere Surface");
        assert_eq!(EmitterShape::Ring { radius: 1.0, thickness: 0.1 }.name(), "Ring");
    }

    #[test]
    fn test_sphere_volume_and_surface() {
        let mut rng = rng();
        for _ in 0..200 {
            assert!(EmitterShape::Sphere { radius: 2.0 }.sample(&mut rng).length() <= 2.0 + 1e-12);
            let s = EmitterShape::SphereSurface { radius: 2.0 }.sample(&mut rng);
            assert!((s.length() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_box_surface_only_touches_a_face() {
        let shape = EmitterShape::Box {
            size: DVec3::new(2.0, 4.0, 6.0),
            density: 1.0,
            surface_only: true,
        };
        let mut rng = rng();
        for _ in 0..200 {
            let p = shape.sample(&mut rng);
            let on_face = p.x.abs() == 1.0 || p.y.abs() == 2.0 || p.z.abs() == 3.0;
            assert!(on_face, "{p:?} is not on a face");
        }
    }

    #[test]
    fn test_box_density_pulls_to_center() {
        let mean_distance = |density: f64| {
            let shape = EmitterShape::Box {
                size: DVec3::splat(2.0),
                density,
                surface_only: false,
            };
            let mut rng = rng();
            (0..2000).map(|_| shape.sample(&mut rng).length()).sum::<f64>() / 2000.0
        };
        assert!(mean_distance(3.0) < mean_distance(1.0));
        assert!(mean_distance(0.3) > mean_distance(1.0));
    }

    #[test]
    fn test_ring_within_thickness() {
        let shape = EmitterShape::Ring {
            radius: 3.0,
            thickness: 0.5,
        };
        let mut rng = rng();
        for _ in 0..200 {
            let p = shape.sample(&mut rng);
            assert_eq!(p.y, 0.0);
            assert!((p.length() - 3.0).abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_outward_velocity() {
        let v = InitialVelocity::Outward { speed: 2.0 }.sample(&mut rng(), DVec3::new(0.0, 0.0, 5.0));
        assert_eq!(v, DVec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_shape_json() {
        let shape: EmitterShape = serde_json::from_str(r#"{"type": "ring", "radius": 1.0, "thickness": 0.1}"#).unwrap();
        assert_eq!(shape, EmitterShape::Ring { radius: 1.0, thickness: 0.1 });
    }
}
