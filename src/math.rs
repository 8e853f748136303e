//! Vector helpers shared by geometry kinds and particle commands.
//!
//! Everything works in `f64` ([`DVec3`]) so evaluated points carry the same
//! precision as the `Double` coordinates of the emitted program.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Lengths below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Unit vector along `v`, or `None` when `v` is (nearly) zero.
#[inline]
pub fn unit(v: DVec3) -> Option<DVec3> {
    let len = v.length();
    if len < EPSILON || !len.is_finite() {
        None
    } else {
        Some(v / len)
    }
}

/// Rodrigues rotation of `point` about the unit vector `axis`.
#[inline]
pub fn rotate_about(point: DVec3, axis: DVec3, radians: f64) -> DVec3 {
    let (sin, cos) = radians.sin_cos();
    point * cos + axis.cross(point) * sin + axis * axis.dot(point) * (1.0 - cos)
}

/// Shortest-arc rotation carrying direction `from` onto direction `to`.
///
/// Returns `None` if either direction is degenerate. Opposite directions
/// rotate half a turn about an axis perpendicular to `from`.
pub fn rotation_between(from: DVec3, to: DVec3) -> Option<DQuat> {
    let from = unit(from)?;
    let to = unit(to)?;
    Some(DQuat::from_rotation_arc(from, to))
}

/// Two unit vectors spanning the plane perpendicular to `axis`.
///
/// The first vector is the projection of world X (or world Z when the axis
/// is close to X), so a `(0, 1, 0)` axis yields the XZ plane.
pub fn perpendicular_basis(axis: DVec3) -> Option<(DVec3, DVec3)> {
    let axis = unit(axis)?;
    let reference = if axis.x.abs() > 0.9 { DVec3::Z } else { DVec3::X };
    let u = unit(reference - axis * axis.dot(reference))?;
    let v = axis.cross(u);
    Some((u, v))
}

/// Axis-aligned bounds of a point set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    /// Bounds of `points`, or `None` if there are none.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self { min: *first, max: *first };
        for p in rest {
            bounds.min = bounds.min.min(*p);
            bounds.max = bounds.max.max(*p);
        }
        Some(bounds)
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Radius of the bounding sphere around [`Bounds::center`].
    ///
    /// Used to frame a preview camera.
    pub fn radius(&self) -> f64 {
        self.size().length() * 0.5
    }

    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_rotate_about_y() {
        let p = rotate_about(DVec3::X, DVec3::Y, PI / 2.0);
        // Right-handed: X rotates toward -Z about +Y.
        assert!(approx(p, DVec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_rotation_between_degenerate() {
        assert!(rotation_between(DVec3::ZERO, DVec3::Y).is_none());
        let q = rotation_between(DVec3::Y, DVec3::X).unwrap();
        assert!(approx(q * DVec3::Y, DVec3::X));
    }

    #[test]
    fn test_rotation_between_opposite() {
        let q = rotation_between(DVec3::Y, -DVec3::Y).unwrap();
        assert!(approx(q * DVec3::Y, -DVec3::Y));
    }

    #[test]
    fn test_perpendicular_basis_for_y_is_xz() {
        let (u, v) = perpendicular_basis(DVec3::Y).unwrap();
        assert!(approx(u, DVec3::X));
        assert!(approx(v, DVec3::new(0.0, 0.0, -1.0)));
        assert!(perpendicular_basis(DVec3::ZERO).is_none());
    }

    #[test]
    fn test_bounds() {
        assert!(Bounds::from_points(&[]).is_none());
        let b = Bounds::from_points(&[DVec3::new(-1.0, 0.0, 2.0), DVec3::new(3.0, 4.0, -2.0)]).unwrap();
        assert_eq!(b.min, DVec3::new(-1.0, 0.0, -2.0));
        assert_eq!(b.max, DVec3::new(3.0, 4.0, 2.0));
        assert_eq!(b.center(), DVec3::new(1.0, 2.0, 0.0));
        assert!(b.contains(DVec3::new(0.0, 1.0, 0.0)));
        assert!(!b.contains(DVec3::new(0.0, 5.0, 0.0)));
    }
}
