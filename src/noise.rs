//! Hashed-lattice value noise.
//!
//! Drives [`ParticleNoiseCommand`](crate::command::ParticleNoise). Each
//! integer lattice point hashes to a value in `[-1, 1]`; samples between
//! lattice points are blended with a quintic fade.

use glam::DVec3;

/// Integer hash with good avalanche behavior.
#[inline]
fn hash(mut x: u32) -> u32 {
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

#[inline]
fn hash3(x: i32, y: i32, z: i32, seed: u32) -> u32 {
    hash((x as u32).wrapping_add(hash((y as u32).wrapping_add(hash((z as u32).wrapping_add(seed))))))
}

#[inline]
fn lattice(x: i32, y: i32, z: i32, seed: u32) -> f64 {
    hash3(x, y, z, seed) as f64 / u32::MAX as f64 * 2.0 - 1.0
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Lattice coordinate of a floored component. The lattice repeats every
/// 2^32 cells.
#[inline]
fn cell(v: f64) -> i32 {
    v as i64 as i32
}

/// 3D value noise in `[-1, 1]`. Non-finite positions sample `0.0`.
pub fn value3(p: DVec3, seed: u32) -> f64 {
    if !p.is_finite() {
        return 0.0;
    }
    let base = p.floor();
    let (xi, yi, zi) = (cell(base.x), cell(base.y), cell(base.z));
    let (xj, yj, zj) = (xi.wrapping_add(1), yi.wrapping_add(1), zi.wrapping_add(1));
    let f = p - base;
    let (u, v, w) = (fade(f.x), fade(f.y), fade(f.z));

    let c000 = lattice(xi, yi, zi, seed);
    let c100 = lattice(xj, yi, zi, seed);
    let c010 = lattice(xi, yj, zi, seed);
    let c110 = lattice(xj, yj, zi, seed);
    let c001 = lattice(xi, yi, zj, seed);
    let c101 = lattice(xj, yi, zj, seed);
    let c011 = lattice(xi, yj, zj, seed);
    let c111 = lattice(xj, yj, zj, seed);

    lerp(
        lerp(lerp(c000, c100, u), lerp(c010, c110, u), v),
        lerp(lerp(c001, c101, u), lerp(c011, c111, u), v),
        w,
    )
}

/// Three decorrelated noise channels, one per output axis.
pub fn value3_vec(p: DVec3, seed: u32) -> DVec3 {
    DVec3::new(
        value3(p, seed),
        value3(p + DVec3::new(31.416, 47.853, 12.679), seed.wrapping_add(1)),
        value3(p + DVec3::new(-19.19, 7.77, 63.21), seed.wrapping_add(2)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        for i in 0..200 {
            let p = DVec3::new(i as f64 * 0.37, i as f64 * -0.11, i as f64 * 0.73);
            let n = value3(p, 9);
            assert!((-1.0..=1.0).contains(&n), "noise out of range: {n}");
        }
    }

    #[test]
    fn test_matches_lattice_at_integer_points() {
        let p = DVec3::new(2.0, -3.0, 5.0);
        assert_eq!(value3(p, 1), lattice(2, -3, 5, 1));
    }

    #[test]
    fn test_continuous() {
        let a = value3(DVec3::new(0.5, 0.5, 0.5), 4);
        let b = value3(DVec3::new(0.5 + 1e-6, 0.5, 0.5), 4);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn test_far_positions_stay_in_range() {
        for p in [
            DVec3::splat(1e10),
            DVec3::new(2147483647.5, -2147483648.5, 4294967295.25),
            DVec3::splat(f64::MAX),
            DVec3::splat(-1e300),
        ] {
            let n = value3(p, 3);
            assert!((-1.0..=1.0).contains(&n), "noise out of range at {p}: {n}");
        }
        assert_eq!(value3(DVec3::new(f64::NAN, 0.0, 0.0), 3), 0.0);
        assert_eq!(value3(DVec3::splat(f64::INFINITY), 3), 0.0);
    }
}
