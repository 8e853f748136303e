//! Geometry formulas.
//!
//! Each kind's numeric definition lives here exactly once. Node evaluation
//! calls these functions, and so does the reference runtime that replays
//! emitted Kotlin, so both read the same formula.
//!
//! Generators return new points and never look at existing ones; modifiers
//! rewrite a point slice in place. Counts below the documented minimum are
//! clamped, and degenerate axes leave the points untouched.
//!
//! Single counts are also clamped to [`MAX_POINTS`]. A generator whose
//! output size is a product of counts (grid, polygon, bolt, repeated copies)
//! produces nothing when that product would exceed [`MAX_POINTS`].

use glam::DVec3;
use std::f64::consts::{PI, TAU};

use crate::math::{perpendicular_basis, rotate_about, rotation_between, unit};
use crate::node::FourierTerm;
use crate::random::RandomSource;

/// Upper bound on the points a single generator produces.
pub const MAX_POINTS: usize = 1 << 20;

/// `count` clamped to `min..=MAX_POINTS`.
#[inline]
fn clamp_count(count: i32, min: i32) -> i32 {
    count.clamp(min, MAX_POINTS as i32)
}

/// Whether the product of `factors` stays within [`MAX_POINTS`].
fn within_budget(factors: &[usize]) -> bool {
    factors
        .iter()
        .try_fold(1usize, |total, &factor| total.checked_mul(factor))
        .is_some_and(|total| total <= MAX_POINTS)
}

/// Point on the XZ circle of `radius` at `angle` radians.
#[inline]
fn on_circle(radius: f64, angle: f64) -> DVec3 {
    DVec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// `count + 1` evenly spaced points from `start` to `end`.
pub fn line(start: DVec3, end: DVec3, count: i32) -> Vec<DVec3> {
    let n = clamp_count(count, 1);
    (0..=n)
        .map(|i| start.lerp(end, i as f64 / n as f64))
        .collect()
}

/// `count` points evenly around the XZ circle, starting on +X.
pub fn circle(radius: f64, count: i32) -> Vec<DVec3> {
    let n = clamp_count(count, 0);
    (0..n)
        .map(|i| on_circle(radius, TAU * i as f64 / n as f64))
        .collect()
}

/// XZ circle whose radius is jittered per point by up to `discrete`.
pub fn discrete_circle(radius: f64, count: i32, discrete: f64, rng: &mut RandomSource) -> Vec<DVec3> {
    let n = clamp_count(count, 0);
    (0..n)
        .map(|i| {
            let r = radius + rng.symmetric(discrete);
            on_circle(r, TAU * i as f64 / n as f64)
        })
        .collect()
}

/// `count + 1` points on the XZ arc between two angles in degrees.
pub fn arc(radius: f64, start_angle: f64, end_angle: f64, count: i32) -> Vec<DVec3> {
    let n = clamp_count(count, 1);
    let (a, b) = (start_angle.to_radians(), end_angle.to_radians());
    (0..=n)
        .map(|i| on_circle(radius, a + (b - a) * i as f64 / n as f64))
        .collect()
}

/// Fibonacci-sphere points on the surface of a ball.
pub fn ball(radius: f64, count: i32) -> Vec<DVec3> {
    let n = clamp_count(count, 0);
    let golden = PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden * i as f64;
            DVec3::new(ring * theta.cos(), y, ring * theta.sin()) * radius
        })
        .collect()
}

/// `count + 1` samples along a cubic Bezier curve.
pub fn bezier(start: DVec3, control1: DVec3, control2: DVec3, end: DVec3, count: i32) -> Vec<DVec3> {
    let n = clamp_count(count, 1);
    (0..=n)
        .map(|i| {
            let t = i as f64 / n as f64;
            let u = 1.0 - t;
            start * (u * u * u) + control1 * (3.0 * u * u * t) + control2 * (3.0 * u * t * t) + end * (t * t * t)
        })
        .collect()
}

/// Regular polygon inscribed in the XZ circle, `edge_count` points per edge.
///
/// Each edge contributes its start vertex and the interior points before the
/// next vertex. Fewer than three sides yields nothing.
pub fn polygon_in_circle(sides: i32, edge_count: i32, radius: f64) -> Vec<DVec3> {
    if sides < 3 {
        return Vec::new();
    }
    let (sides, per_edge) = (clamp_count(sides, 3), clamp_count(edge_count, 1));
    if !within_budget(&[sides as usize, per_edge as usize]) {
        return Vec::new();
    }
    let vertex = |k: i32| on_circle(radius, TAU * k as f64 / sides as f64);
    let mut points = Vec::with_capacity(sides as usize * per_edge as usize);
    for k in 0..sides {
        let (a, b) = (vertex(k), vertex(k + 1));
        for j in 0..per_edge {
            points.push(a.lerp(b, j as f64 / per_edge as f64));
        }
    }
    points
}

/// Filled XZ disk: the center plus concentric rings `step` apart.
///
/// Ring point counts grow linearly with the ring radius from
/// `min_count` to `max_count`. A disk needing more than [`MAX_POINTS`]
/// points in total produces nothing.
pub fn round_shape(radius: f64, step: f64, min_count: i32, max_count: i32) -> Vec<DVec3> {
    let mut points = vec![DVec3::ZERO];
    if step <= 0.0 || radius <= 0.0 {
        return points;
    }
    let rings = (radius / step + 1e-9).floor() as i32;
    let (low, high) = (f64::from(min_count), f64::from(max_count));
    for k in 1..=rings {
        let r = step * k as f64;
        let t = r / radius;
        let count = (low + (high - low) * t).round().clamp(1.0, MAX_POINTS as f64) as usize;
        if points.len() + count > MAX_POINTS {
            return Vec::new();
        }
        points.extend(circle(r, count as i32));
    }
    points
}

/// Helix along +Y whose radius varies linearly from start to end.
pub fn spiral(start_radius: f64, end_radius: f64, height: f64, count: i32, turns: f64) -> Vec<DVec3> {
    let n = clamp_count(count, 0);
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            let radius = start_radius + (end_radius - start_radius) * t;
            on_circle(radius, TAU * turns * t) + DVec3::new(0.0, height * t, 0.0)
        })
        .collect()
}

/// The 8 corners of a centered cube plus `edge_count - 1` interior points
/// on each of its 12 edges.
pub fn cube(size: f64, edge_count: i32) -> Vec<DVec3> {
    let per_edge = clamp_count(edge_count, 1);
    if !within_budget(&[12, per_edge as usize]) {
        return Vec::new();
    }
    let h = size * 0.5;
    let corner = |i: usize| {
        DVec3::new(
            if i & 1 == 0 { -h } else { h },
            if i & 2 == 0 { -h } else { h },
            if i & 4 == 0 { -h } else { h },
        )
    };
    let mut points: Vec<DVec3> = (0..8).map(corner).collect();
    for a in 0..8usize {
        for bit in [1usize, 2, 4] {
            if a & bit != 0 {
                continue;
            }
            let (from, to) = (corner(a), corner(a | bit));
            for j in 1..per_edge {
                points.push(from.lerp(to, j as f64 / per_edge as f64));
            }
        }
    }
    points
}

/// Centered XZ grid of `count_x` by `count_z` points.
pub fn rect(width: f64, depth: f64, count_x: i32, count_z: i32) -> Vec<DVec3> {
    let axis = |extent: f64, count: i32, i: i32| {
        if count > 1 {
            -extent * 0.5 + extent * i as f64 / (count - 1) as f64
        } else {
            0.0
        }
    };
    let (nx, nz) = (clamp_count(count_x, 0), clamp_count(count_z, 0));
    if !within_budget(&[nx as usize, nz as usize]) {
        return Vec::new();
    }
    let mut points = Vec::with_capacity(nx as usize * nz as usize);
    for iz in 0..nz {
        for ix in 0..nx {
            points.push(DVec3::new(axis(width, nx, ix), 0.0, axis(depth, nz, iz)));
        }
    }
    points
}

fn jitter(rng: &mut RandomSource, extent: f64) -> DVec3 {
    let x = rng.symmetric(extent);
    let y = rng.symmetric(extent);
    let z = rng.symmetric(extent);
    DVec3::new(x, y, z)
}

/// Jagged line: `count + 1` points with every interior point jittered.
pub fn lightning_points(start: DVec3, end: DVec3, count: i32, offset_range: f64, rng: &mut RandomSource) -> Vec<DVec3> {
    let n = clamp_count(count, 1);
    (0..=n)
        .map(|i| {
            let base = start.lerp(end, i as f64 / n as f64);
            if i == 0 || i == n {
                base
            } else {
                base + jitter(rng, offset_range)
            }
        })
        .collect()
}

/// Lightning bolt of `node_count + 1` nodes joined by straight runs.
///
/// Interior node `k` is jittered by up to `max_offset * attenuation^k`.
/// Each run contributes `line_count` points; the final node closes the bolt.
pub fn lightning_nodes_attenuation(
    start: DVec3,
    end: DVec3,
    node_count: i32,
    max_offset: f64,
    attenuation: f64,
    line_count: i32,
    rng: &mut RandomSource,
) -> Vec<DVec3> {
    let n = clamp_count(node_count, 1);
    let per_run = clamp_count(line_count, 1);
    if !within_budget(&[n as usize, per_run as usize]) {
        return Vec::new();
    }
    let mut nodes = Vec::with_capacity(n as usize + 1);
    let mut extent = max_offset;
    for k in 0..=n {
        let base = start.lerp(end, k as f64 / n as f64);
        if k == 0 || k == n {
            nodes.push(base);
        } else {
            nodes.push(base + jitter(rng, extent));
        }
        if k > 0 {
            extent *= attenuation;
        }
    }

    let mut points = Vec::with_capacity(n as usize * per_run as usize + 1);
    for pair in nodes.windows(2) {
        for j in 0..per_run {
            points.push(pair[0].lerp(pair[1], j as f64 / per_run as f64));
        }
    }
    points.push(end);
    points
}

/// `count` samples of a summed sinusoid series on the XZ plane.
///
/// Sample `i` sits at `t = 2π·i/count` and equals
/// `scale · Σ r·(cos, sin)(w·t + startAngle)`.
pub fn fourier_series(terms: &[FourierTerm], count: i32, scale: f64) -> Vec<DVec3> {
    let n = clamp_count(count, 0);
    if terms.is_empty() {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let t = TAU * i as f64 / n as f64;
            let sum: DVec3 = terms
                .iter()
                .map(|term| on_circle(term.r, term.w * t + term.start_angle.to_radians()))
                .sum();
            sum * scale
        })
        .collect()
}

pub fn scale(points: &mut [DVec3], factor: f64) {
    for p in points {
        *p *= factor;
    }
}

/// Rotate every point about `axis` by `degrees`. Degenerate axes skip.
pub fn rotate_as_axis(points: &mut [DVec3], axis: DVec3, degrees: f64) {
    let Some(axis) = unit(axis) else {
        return;
    };
    let radians = degrees.to_radians();
    for p in points {
        *p = rotate_about(*p, axis, radians);
    }
}

/// Rotate every point by the shortest arc carrying `axis` onto `target`.
///
/// Returns the new current axis, or `None` (points untouched) when either
/// direction is degenerate.
pub fn rotate_to(points: &mut [DVec3], axis: DVec3, target: DVec3) -> Option<DVec3> {
    let rotation = rotation_between(axis, target)?;
    for p in points {
        *p = rotation * *p;
    }
    Some(target)
}

/// Add independent uniform jitter to each component of every point.
pub fn noise_offset(points: &mut [DVec3], noise: DVec3, rng: &mut RandomSource) {
    for p in points {
        let x = rng.symmetric(noise.x);
        let y = rng.symmetric(noise.y);
        let z = rng.symmetric(noise.z);
        *p += DVec3::new(x, y, z);
    }
}

pub fn offset(points: &mut [DVec3], by: DVec3) {
    for p in points {
        *p += by;
    }
}

/// Move every point along a random direction by a random length.
pub fn random_offset(points: &mut [DVec3], min_length: f64, max_length: f64, rng: &mut RandomSource) {
    for p in points {
        let direction = rng.direction();
        let length = rng.range(min_length, max_length);
        *p += direction * length;
    }
}

/// Offset point `i` by a circle of `radius` at angle `i * angle_step`
/// degrees, in the plane perpendicular to `axis`.
pub fn spiral_offset(points: &mut [DVec3], axis: DVec3, radius: f64, angle_step: f64) {
    let Some((u, v)) = perpendicular_basis(axis) else {
        return;
    };
    let step = angle_step.to_radians();
    for (i, p) in points.iter_mut().enumerate() {
        let (sin, cos) = (step * i as f64).sin_cos();
        *p += (u * cos + v * sin) * radius;
    }
}

/// `repeat` copies of `points`, copy `i` rotated about `axis` by
/// `start_angle + i * 360 / repeat` degrees.
///
/// With a degenerate axis the copies are appended unrotated. More than
/// [`MAX_POINTS`] points in total produces nothing.
pub fn repeat_rotated(points: &[DVec3], axis: DVec3, repeat: i32, start_angle: f64) -> Vec<DVec3> {
    let n = clamp_count(repeat, 0);
    if !within_budget(&[points.len(), n as usize]) {
        return Vec::new();
    }
    let axis = unit(axis);
    let mut out = Vec::with_capacity(points.len() * n as usize);
    for i in 0..n {
        let radians = (start_angle + 360.0 * i as f64 / n as f64).to_radians();
        match axis {
            Some(axis) => out.extend(points.iter().map(|p| rotate_about(*p, axis, radians))),
            None => out.extend_from_slice(points),
        }
    }
    out
}
