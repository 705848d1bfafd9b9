//! Analytic stand-ins for the physics engine, for tests.
//!
//! Enabled under `cfg(test)` and by the `test-support` feature.

use crate::{
    body::{BodyHandle, ForceMode},
    collision::types::{Layer, LayerMask, RayHit, RayQuery, Vec3, up},
};

/// Infinite plane `normal · x = normal · point` on one layer.
#[derive(Clone, Copy, Debug)]
pub struct PlaneGround {
    pub point: Vec3,
    pub normal: Vec3,
    pub layer: Layer,
}

impl RayQuery for PlaneGround {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        if !mask.has(self.layer) {
            return None;
        }
        let dir = direction.try_normalize(crate::DIST_EPS)?;
        let facing = dir.dot(&self.normal);
        if facing >= 0.0 {
            return None;
        }
        let t = (self.point - origin).dot(&self.normal) / facing;
        if !(0.0..=max_distance).contains(&t) {
            return None;
        }
        Some(RayHit {
            point: origin + dir * t,
            normal: self.normal,
            distance: t,
        })
    }
}

/// Horizontal ground at a fixed height.
#[derive(Clone, Copy, Debug)]
pub struct FlatGround(pub PlaneGround);

impl FlatGround {
    pub fn at(height: f32) -> Self {
        Self(PlaneGround {
            point: Vec3::new(0.0, height, 0.0),
            normal: up(),
            layer: Layer::Ground,
        })
    }
}

impl RayQuery for FlatGround {
    fn cast(&self, o: Vec3, d: Vec3, max: f32, mask: LayerMask) -> Option<RayHit> {
        self.0.cast(o, d, max, mask)
    }
}

/// Slope through the origin descending toward +Z at a fixed angle.
#[derive(Clone, Copy, Debug)]
pub struct SlopedGround {
    pub plane: PlaneGround,
    pub angle_deg: f32,
}

impl SlopedGround {
    pub fn new(angle_deg: f32) -> Self {
        let a = angle_deg.to_radians();
        Self {
            plane: PlaneGround {
                point: Vec3::zeros(),
                normal: Vec3::new(0.0, a.cos(), a.sin()),
                layer: Layer::Ground,
            },
            angle_deg,
        }
    }

    /// Surface height at a given Z.
    pub fn height_at(&self, z: f32) -> f32 {
        -self.angle_deg.to_radians().tan() * z
    }

    /// Unit vector pointing straight downhill along the surface.
    pub fn downhill(&self) -> Vec3 {
        let a = self.angle_deg.to_radians();
        Vec3::new(0.0, -a.sin(), a.cos())
    }
}

impl RayQuery for SlopedGround {
    fn cast(&self, o: Vec3, d: Vec3, max: f32, mask: LayerMask) -> Option<RayHit> {
        self.plane.cast(o, d, max, mask)
    }
}

/// Point-mass body that records what the core asked of it and integrates on demand.
#[derive(Clone, Debug)]
pub struct KinematicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub damping: f32,
    /// Accumulated acceleration since the last `integrate`.
    pub pending_accel: Vec3,
    pub position_writes: usize,
}

impl KinematicBody {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            mass: 1.0,
            damping: 0.0,
            pending_accel: Vec3::zeros(),
            position_writes: 0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Semi-implicit Euler with linear damping, then clear pending forces.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.pending_accel * dt;
        self.velocity *= 1.0 / (1.0 + dt * self.damping.max(0.0));
        self.position += self.velocity * dt;
        self.pending_accel = Vec3::zeros();
    }

    /// Keep the body's base on or above `plane`, like a contact solver would: lift it
    /// vertically out of the ground and drop any velocity into the surface.
    pub fn resolve_contact(&mut self, plane: &PlaneGround, half_height: f32) {
        let n = plane.normal;
        if n.y <= crate::DIST_EPS {
            return;
        }
        let base = self.position - up() * half_height;
        let depth = (base - plane.point).dot(&n);
        if depth >= 0.0 {
            return;
        }
        self.position.y -= depth / n.y;
        let into = self.velocity.dot(&n);
        if into < 0.0 {
            self.velocity -= n * into;
        }
    }
}

impl BodyHandle for KinematicBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn add_force(&mut self, force: Vec3, mode: ForceMode) {
        match mode {
            ForceMode::Acceleration => self.pending_accel += force,
            ForceMode::Force => self.pending_accel += force / self.mass.max(crate::DIST_EPS),
        }
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.position_writes += 1;
    }

    fn set_linear_damping(&mut self, damping: f32) {
        self.damping = damping;
    }
}
