//! Body handle: the slice of the physics engine's rigid body the core is allowed to touch.

use crate::collision::types::Vec3;

/// How a vector passed to [`BodyHandle::add_force`] is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceMode {
    /// Newtons; the engine divides by mass.
    Force,
    /// m/s^2; independent of mass.
    Acceleration,
}

/// Access to the controlled body owned by the physics engine.
///
/// Forces are consumed by the engine's next integration step; the core never
/// integrates anything itself.
pub trait BodyHandle {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn add_force(&mut self, force: Vec3, mode: ForceMode);
    /// Only used by position-mode ground snapping.
    fn set_position(&mut self, position: Vec3);
    /// Engines without damping control can ignore this.
    fn set_linear_damping(&mut self, _damping: f32) {}
}

/// Shape of the controlled body as far as the probes care.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Full collider height (meters). The body position is its center.
    pub height: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            height: crate::constants::BODY_HEIGHT,
        }
    }
}

impl BodyConfig {
    #[inline]
    pub fn half_height(&self) -> f32 {
        (self.height * 0.5).max(0.0)
    }
}
