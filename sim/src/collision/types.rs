/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the ray query service (physics engine side)
- ground sensing and the grounding state
- obstacle classification and the collision sensor
- locomotion and scoring, which only read the results
*/

use nalgebra as na;

use crate::bitmask_flags::BitmaskFlags;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;

/// World up. Everything in this crate is Y-up.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// World down.
#[inline]
pub fn down() -> Vec3 {
    -Vec3::y()
}

crate::define_bitmask_flags!(
    /// Collision layers. A collider belongs to exactly one layer; queries and
    /// classifiers use a [`LayerMask`] to select several.
    #[derive(serde::Deserialize, serde::Serialize)]
    Layer, u32, {
        Default,
        Ground,
        Obstacle,
        Player,
        Trigger,
    }
);

/// Set of [`Layer`]s.
pub type LayerMask = BitmaskFlags<u32>;

/// A single ray query result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World-space impact point.
    pub point: Vec3,
    /// World-space surface normal at the impact point.
    pub normal: Vec3,
    /// Distance from the ray origin to `point` (meters).
    pub distance: f32,
}

/// Ray query service provided by the physics engine.
///
/// `direction` does not need to be normalized by the caller; implementations
/// must return `None` for a degenerate direction rather than fail.
pub trait RayQuery {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask)
    -> Option<RayHit>;
}

/// A missing ray service never hits, which reads as "airborne".
impl<R: RayQuery> RayQuery for Option<R> {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.as_ref()?.cast(origin, direction, max_distance, mask)
    }
}

impl<R: RayQuery + ?Sized> RayQuery for &R {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        (**self).cast(origin, direction, max_distance, mask)
    }
}

/// A contact reported by the physics engine for the controlled body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Engine-side identifier of the other collider.
    pub other_id: u64,
    /// Layer of the other collider.
    pub layer: Layer,
    /// Whether the other collider is a trigger/sensor volume.
    pub is_trigger: bool,
}
