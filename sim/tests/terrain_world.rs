//! Ray queries and body handles against a real Rapier scene.

use approx::assert_abs_diff_eq;
use ski_sim::rapier_world::rapier3d::na::{DMatrix, UnitQuaternion};
use ski_sim::rapier_world::rapier3d::prelude::{RigidBodyBuilder, RigidBodySet, Vector};
use ski_sim::{
    BodyConfig, BodyHandle, ForceMode, Grounding, GroundingConfig, Layer, LayerMask,
    MovementIntent, OrientationBasis, RapierBody, RayQuery, SessionConfig, SkierSession,
    TerrainPieceDef, TerrainShapeDef, TerrainWorld, Vec3, collision::down, collision::up,
};

fn ground_mask() -> LayerMask {
    LayerMask::from_tags(&[Layer::Ground])
}

fn course() -> TerrainWorld {
    TerrainWorld::build(vec![
        TerrainPieceDef::new(
            1,
            TerrainShapeDef::Plane {
                offset_along_normal: 0.0,
            },
            Layer::Ground,
        ),
        TerrainPieceDef::new(
            2,
            TerrainShapeDef::Cuboid {
                half_extents: Vector::new(0.5, 0.5, 0.5),
            },
            Layer::Obstacle,
        )
        .at(Vector::new(0.0, 0.5, 5.0)),
        TerrainPieceDef::new(
            3,
            TerrainShapeDef::Cuboid {
                half_extents: Vector::new(1.0, 1.0, 1.0),
            },
            Layer::Ground,
        )
        .at(Vector::new(0.0, 1.0, 10.0))
        .trigger(),
    ])
}

#[test]
fn ray_hits_the_ground_plane() {
    let world = course();
    let hit = world
        .cast(Vec3::new(0.0, 2.0, 0.0), down(), 5.0, ground_mask())
        .expect("ground below");

    assert_abs_diff_eq!(hit.distance, 2.0, epsilon = 1e-4);
    assert_abs_diff_eq!(hit.point.y, 0.0, epsilon = 1e-4);
    assert_abs_diff_eq!(hit.normal.dot(&up()), 1.0, epsilon = 1e-4);
}

#[test]
fn ray_respects_max_distance_and_degenerate_direction() {
    let world = course();
    assert!(world.cast(Vec3::new(0.0, 2.0, 0.0), down(), 1.0, ground_mask()).is_none());
    assert!(world.cast(Vec3::new(0.0, 2.0, 0.0), Vec3::zeros(), 5.0, ground_mask()).is_none());
    assert!(world.cast(Vec3::new(0.0, 2.0, 0.0), down(), 5.0, LayerMask::default()).is_none());
}

#[test]
fn layer_mask_selects_what_the_ray_sees() {
    let world = course();
    let above_rock = Vec3::new(0.0, 2.0, 5.0);

    let ground_only = world.cast(above_rock, down(), 5.0, ground_mask()).expect("ground");
    assert_abs_diff_eq!(ground_only.distance, 2.0, epsilon = 1e-4);

    let with_rock = world
        .cast(above_rock, down(), 5.0, LayerMask::from_tags(&[Layer::Ground, Layer::Obstacle]))
        .expect("rock");
    assert_abs_diff_eq!(with_rock.distance, 1.0, epsilon = 1e-4);
}

#[test]
fn trigger_volumes_are_transparent_to_rays() {
    let world = course();
    let hit = world
        .cast(Vec3::new(0.0, 5.0, 10.0), down(), 10.0, ground_mask())
        .expect("ground under trigger");
    assert_abs_diff_eq!(hit.distance, 5.0, epsilon = 1e-4);
}

#[test]
fn colliders_report_their_piece_as_contact() {
    let world = course();
    let mut contacts: Vec<_> = world
        .colliders
        .iter()
        .filter_map(|(handle, _)| world.contact(handle))
        .collect();
    contacts.sort_by_key(|c| c.other_id);

    assert_eq!(contacts.len(), 3);
    assert_eq!(contacts[1].layer, Layer::Obstacle);
    assert!(!contacts[1].is_trigger);
    assert!(contacts[2].is_trigger);
}

#[test]
fn tilted_plane_grounds_with_matching_steepness() {
    let tilt = UnitQuaternion::from_axis_angle(&Vector::x_axis(), 30f32.to_radians());
    let world = TerrainWorld::build(vec![
        TerrainPieceDef::new(
            1,
            TerrainShapeDef::Plane {
                offset_along_normal: 0.0,
            },
            Layer::Ground,
        )
        .rotated(tilt),
    ]);

    let mut grounding = Grounding::new(&GroundingConfig::default(), &BodyConfig::default());
    let state = *grounding.refresh(&world, Vec3::new(0.0, 1.0, 0.0));

    assert!(state.is_grounded);
    assert_abs_diff_eq!(state.steepness_deg(), 30.0, epsilon = 0.05);
    assert_abs_diff_eq!(state.surface_normal.norm(), 1.0, epsilon = 1e-4);
}

#[test]
fn heightfield_terrain_is_hit() {
    let world = TerrainWorld::build(vec![TerrainPieceDef::new(
        1,
        TerrainShapeDef::Heightfield {
            heights: DMatrix::zeros(5, 5),
            scale: Vector::new(20.0, 1.0, 20.0),
        },
        Layer::Ground,
    )]);

    let hit = world
        .cast(Vec3::new(1.0, 3.0, -2.0), down(), 10.0, ground_mask())
        .expect("heightfield below");
    assert_abs_diff_eq!(hit.distance, 3.0, epsilon = 1e-3);
}

#[test]
fn rapier_body_handle_reads_and_writes_the_rigid_body() {
    let mut bodies = RigidBodySet::new();
    let handle = bodies.insert(
        RigidBodyBuilder::dynamic()
            .translation(Vector::new(1.0, 2.0, 3.0))
            .build(),
    );
    let rb = bodies.get_mut(handle).expect("inserted");

    let mut body = RapierBody::new(rb);
    assert_eq!(body.position(), Vec3::new(1.0, 2.0, 3.0));

    body.set_velocity(Vec3::new(0.0, 0.0, 4.0));
    assert_eq!(body.velocity(), Vec3::new(0.0, 0.0, 4.0));

    body.set_position(Vec3::new(0.0, 5.0, 0.0));
    assert_eq!(body.position(), Vec3::new(0.0, 5.0, 0.0));

    body.add_force(Vec3::new(0.0, -3.0, 0.0), ForceMode::Force);
    body.set_linear_damping(0.5);

    let rb = bodies.get_mut(handle).expect("inserted");
    assert_eq!(rb.user_force(), Vector::new(0.0, -3.0, 0.0));
    assert_eq!(rb.linear_damping(), 0.5);

    // Wrapping again starts from a clean force accumulator.
    let _ = RapierBody::new(rb);
    let rb = bodies.get(handle).expect("inserted");
    assert_eq!(rb.user_force(), Vector::zeros());
}

#[test]
fn session_steps_a_rapier_body_over_rapier_terrain() {
    let world = course();
    let mut bodies = RigidBodySet::new();
    let handle = bodies.insert(
        RigidBodyBuilder::dynamic()
            .translation(Vector::new(0.0, 1.0, -5.0))
            .build(),
    );

    let mut session = SkierSession::new(SessionConfig::default());
    let rb = bodies.get_mut(handle).expect("inserted");
    let mut body = RapierBody::new(rb);
    session.physics_step(
        1.0 / 60.0,
        &world,
        &mut body,
        MovementIntent::new(0.0, 1.0),
        OrientationBasis::default(),
    );

    assert!(session.grounding().is_grounded);
    assert_abs_diff_eq!(session.grounding().steepness_deg(), 0.0, epsilon = 1e-3);
    let rb = bodies.get(handle).expect("inserted");
    assert_eq!(rb.linear_damping(), SessionConfig::default().ski.ground_drag);
}
