//! Rapier adapters: a static terrain world answering ray queries, and a rigid-body
//! handle for the controlled skier.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-focused: the terrain is immutable after construction.
//! - Layer-aware: each collider carries its piece id and [`Layer`] in `user_data`, so ray
//!   queries honor a [`LayerMask`] without a separate lookup table.

// Re-export Rapier so downstream crates can build bodies without depending on it directly.
pub use rapier3d;

use rapier3d::na::{DMatrix, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::{
    DIST_EPS,
    bitmask_flags::FlagBitmask,
    body::{BodyHandle, ForceMode},
    collision::types::{Contact, Layer, LayerMask, RayHit, RayQuery, Vec3},
};

/// One immutable piece of terrain.
///
/// Conventions
/// - Units are meters.
/// - For planes, the normal is pose-derived: `normal = rotation * +Y`.
#[derive(Clone, Debug)]
pub struct TerrainPieceDef {
    /// Stable unique identifier; also reported as [`Contact::other_id`].
    pub id: u32,
    pub translation: Vector<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub shape: TerrainShapeDef,
    pub layer: Layer,
    /// Trigger volumes report contacts but are never hit by ray queries.
    pub is_trigger: bool,
}

impl TerrainPieceDef {
    pub fn new(id: u32, shape: TerrainShapeDef, layer: Layer) -> Self {
        Self {
            id,
            translation: Vector::zeros(),
            rotation: UnitQuaternion::identity(),
            shape,
            layer,
            is_trigger: false,
        }
    }

    pub fn at(mut self, translation: Vector<f32>) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotated(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

/// Supported terrain shapes.
#[derive(Clone, Debug)]
pub enum TerrainShapeDef {
    /// Infinite half-space; the normal is derived from the pose.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    Ball { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Grid of heights over the XZ plane, `scale` being the full extents of the field.
    Heightfield {
        heights: DMatrix<f32>,
        scale: Vector<f32>,
    },
}

/// In-memory Rapier scene holding the static terrain.
pub struct TerrainWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl TerrainWorld {
    /// Build the scene. The input is sorted by `id` before insertion; invalid (NaN) values
    /// must be filtered by the caller.
    pub fn build(mut defs: Vec<TerrainPieceDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs.iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());
            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Collision detection only (no dynamics): fills the broad-phase BVH and contact graph.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        log::debug!("terrain world built with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Borrowed `QueryPipeline` view over the terrain.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Contact description for a terrain collider, e.g. from a collision event.
    pub fn contact(&self, handle: ColliderHandle) -> Option<Contact> {
        self.colliders.get(handle).map(contact_from_collider)
    }
}

impl RayQuery for TerrainWorld {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize(DIST_EPS)?;
        if max_distance.is_nan() || max_distance < 0.0 || mask.is_empty() {
            return None;
        }

        let in_mask = |_handle: ColliderHandle, collider: &Collider| {
            layer_of(collider).is_some_and(|layer| mask.has(layer))
        };
        let filter = QueryFilter::default().exclude_sensors().predicate(&in_mask);
        let pipeline = self.query_pipeline(filter);

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );
        let (_handle, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;
        let point = ray.point_at(hit.time_of_impact);

        Some(RayHit {
            point: Vec3::new(point.x, point.y, point.z),
            normal: Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
            distance: hit.time_of_impact,
        })
    }
}

/// Build the contact a collision with `collider` represents.
pub fn contact_from_collider(collider: &Collider) -> Contact {
    let (id, layer) = unpack_user_data(collider.user_data);
    Contact {
        other_id: u64::from(id),
        layer: layer.unwrap_or(Layer::Default),
        is_trigger: collider.is_sensor(),
    }
}

fn layer_of(collider: &Collider) -> Option<Layer> {
    unpack_user_data(collider.user_data).1
}

/// Low 8 bits: layer bit index. Bits 32..64: piece id.
fn pack_user_data(id: u32, layer: Layer) -> u128 {
    (u128::from(id) << 32) | u128::from(layer.bit_index())
}

fn unpack_user_data(data: u128) -> (u32, Option<Layer>) {
    let id = ((data >> 32) & u128::from(u32::MAX)) as u32;
    let layer = Layer::from_bit_index((data & 0xff) as u8);
    (id, layer)
}

/// Build a Rapier collider from a [`TerrainPieceDef`].
///
/// The pose lives on the parent rigid body, so colliders use an identity local transform
/// (planes only shift along their local +Y).
pub fn collider_from_def(def: &TerrainPieceDef) -> Collider {
    let builder = match &def.shape {
        TerrainShapeDef::Plane {
            offset_along_normal,
        } => {
            // World plane `n . x = dist` with n = R * +Y. The collider is attached to a parent
            // already carrying the pose, so only the offset along the local +Y remains.
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(Vector::y_axis())))
                .translation(Vector::y() * *offset_along_normal)
        }

        TerrainShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        TerrainShapeDef::Ball { radius } => ColliderBuilder::ball(*radius),

        TerrainShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        TerrainShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),

        TerrainShapeDef::Heightfield { heights, scale } => {
            ColliderBuilder::heightfield(heights.clone(), *scale)
        }
    };

    builder
        .sensor(def.is_trigger)
        .user_data(pack_user_data(def.id, def.layer))
        .build()
}

/// [`BodyHandle`] over a Rapier rigid body.
///
/// Rapier keeps user forces across steps, so construction clears them: wrap the body once
/// per physics step, before the locomotion step runs.
pub struct RapierBody<'a> {
    body: &'a mut RigidBody,
}

impl<'a> RapierBody<'a> {
    pub fn new(body: &'a mut RigidBody) -> Self {
        body.reset_forces(true);
        Self { body }
    }
}

impl BodyHandle for RapierBody<'_> {
    fn position(&self) -> Vec3 {
        let t = self.body.translation();
        Vec3::new(t.x, t.y, t.z)
    }

    fn velocity(&self) -> Vec3 {
        let v = self.body.linvel();
        Vec3::new(v.x, v.y, v.z)
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.body
            .set_linvel(Vector::new(velocity.x, velocity.y, velocity.z), true);
    }

    fn add_force(&mut self, force: Vec3, mode: ForceMode) {
        let force = match mode {
            ForceMode::Force => force,
            ForceMode::Acceleration => force * self.body.mass(),
        };
        self.body.add_force(Vector::new(force.x, force.y, force.z), true);
    }

    fn set_position(&mut self, position: Vec3) {
        self.body
            .set_translation(Vector::new(position.x, position.y, position.z), true);
    }

    fn set_linear_damping(&mut self, damping: f32) {
        self.body.set_linear_damping(damping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_packs_id_and_layer() {
        let data = pack_user_data(42, Layer::Obstacle);
        assert_eq!(unpack_user_data(data), (42, Some(Layer::Obstacle)));
        assert_eq!(unpack_user_data(pack_user_data(u32::MAX, Layer::Default)).0, u32::MAX);
    }

    #[test]
    fn colliders_carry_layer_and_trigger_flag() {
        let def = TerrainPieceDef::new(
            9,
            TerrainShapeDef::Ball { radius: 1.0 },
            Layer::Trigger,
        )
        .trigger();
        let collider = collider_from_def(&def);

        assert_eq!(
            contact_from_collider(&collider),
            Contact {
                other_id: 9,
                layer: Layer::Trigger,
                is_trigger: true,
            }
        );
    }
}
