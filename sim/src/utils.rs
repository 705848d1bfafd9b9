use crate::{
    DIST_EPS,
    collision::types::{Vec3, down, up},
};

/// Removes the component of `v` along `normal`.
///
/// `normal` must be unit length.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(&normal)
}

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns `0` if either vector is degenerate.
#[inline]
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = a.norm() * b.norm();
    if denom <= DIST_EPS {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Angle of a surface normal against world-down (flat ground = 180).
#[inline]
pub fn angle_to_down_deg(normal: Vec3) -> f32 {
    angle_deg(normal, down())
}

/// Angle of a surface normal against world-up (flat ground = 0).
#[inline]
pub fn angle_to_up_deg(normal: Vec3) -> f32 {
    angle_deg(normal, up())
}

/// Normalizes `v`, or returns `None` when it is too short to have a direction.
#[inline]
pub fn try_direction(v: Vec3) -> Option<Vec3> {
    v.try_normalize(DIST_EPS)
}

/// XZ part of `v`, with Y zeroed.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Where `value` sits between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns `0` when `a == b`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    let span = b - a;
    if span.abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / span).clamp(0.0, 1.0)
}

/// A usable step length: finite and positive. NaN and infinity are rejected.
#[inline]
pub fn is_step(dt: f32) -> bool {
    dt.is_finite() && dt > 0.0
}
