//! End-to-end runs of a skier session against analytic terrain and a kinematic body.

use ski_sim::collision::RayQuery;
use ski_sim::testing::{FlatGround, KinematicBody, PlaneGround, SlopedGround};
use ski_sim::{
    Contact, FrameInput, FrameReport, Layer, MovementIntent, MovementMode, OrientationBasis,
    SessionConfig, SkierSession, Vec3,
};

const DT: f32 = 0.02;
const HALF_HEIGHT: f32 = 1.0;

struct Rig<R> {
    session: SkierSession,
    body: KinematicBody,
    ground: R,
    plane: PlaneGround,
}

impl<R: RayQuery> Rig<R> {
    fn new(ground: R, plane: PlaneGround, start: Vec3) -> Self {
        ski_sim::init_logging(false);
        Self {
            session: SkierSession::new(SessionConfig::default()),
            body: KinematicBody::at(start),
            ground,
            plane,
        }
    }

    /// One physics tick followed by one frame.
    fn tick(&mut self, intent: MovementIntent) -> FrameReport {
        self.session.physics_step(
            DT,
            &self.ground,
            &mut self.body,
            intent,
            OrientationBasis::default(),
        );
        self.body.integrate(DT);
        self.body.resolve_contact(&self.plane, HALF_HEIGHT);
        self.session.frame_step(
            DT,
            FrameInput {
                position: self.body.position,
                velocity: self.body.velocity,
                ..FrameInput::default()
            },
        )
    }

    fn run(&mut self, seconds: f32, intent: MovementIntent) -> Vec<FrameReport> {
        let steps = (seconds / DT).round() as usize;
        (0..steps).map(|_| self.tick(intent)).collect()
    }
}

fn slope_rig(angle_deg: f32) -> Rig<SlopedGround> {
    let ground = SlopedGround::new(angle_deg);
    let start = Vec3::new(0.0, ground.height_at(0.0) + HALF_HEIGHT, 0.0);
    Rig::new(ground, ground.plane, start)
}

fn flat_rig() -> Rig<FlatGround> {
    let ground = FlatGround::at(0.0);
    Rig::new(ground, ground.0, Vec3::new(0.0, HALF_HEIGHT, 0.0))
}

fn tree(id: u64) -> Contact {
    Contact {
        other_id: id,
        layer: Layer::Obstacle,
        is_trigger: false,
    }
}

#[test]
fn skiing_downhill_builds_speed_combo_and_chain() {
    let mut rig = slope_rig(20.0);
    let reports = rig.run(8.0, MovementIntent::new(0.0, 1.0));

    let top_speed = reports.iter().map(|r| r.speed).fold(0.0, f32::max);
    assert!(top_speed > 8.0, "top speed {top_speed}");
    assert!(rig.session.grounding().is_grounded);
    assert!(rig.body.position.z > 20.0);

    let score = rig.session.score();
    assert!(score.chain_score > 0.0);
    assert!(score.combo > 1.0 && score.combo <= 10.0);
}

#[test]
fn slope_alone_carries_the_skier_downhill() {
    let mut rig = slope_rig(25.0);
    rig.run(3.0, MovementIntent::default());

    assert!(rig.body.velocity.z > 1.0, "velocity {:?}", rig.body.velocity);
    assert!(rig.session.grounding().is_grounded);
}

#[test]
fn hitting_a_tree_breaks_the_chain_until_cooldown_passes() {
    let mut rig = slope_rig(20.0);
    rig.run(4.0, MovementIntent::new(0.0, 1.0));
    assert!(rig.session.score().chain_score > 0.0);
    let total = rig.session.score().total_score;

    assert!(rig.session.report_contact(tree(7)));
    let report = rig.tick(MovementIntent::new(0.0, 1.0));
    assert!(report.score.chain_broken);
    assert_eq!(rig.session.score().chain_score, 0.0);
    assert_eq!(rig.session.score().combo, 1.0);
    assert!(rig.session.score().recently_collided);

    rig.run(1.0, MovementIntent::new(0.0, 1.0));
    assert!(rig.session.score().chain_score > 0.0);
    assert_eq!(rig.session.score().total_score, total);
}

#[test]
fn jumps_are_timed_and_the_best_is_kept() {
    let mut rig = flat_rig();
    rig.run(0.5, MovementIntent::default());
    assert!(rig.session.grounding().is_grounded);

    rig.body.velocity.y = 7.0;
    let first = rig
        .run(4.0, MovementIntent::default())
        .iter()
        .find_map(|r| r.landed)
        .expect("first jump lands");
    assert!((0.8..2.0).contains(&first), "first flight {first}");

    let air = *rig.session.air_time();
    assert_eq!(air.last_air_time, first);
    assert_eq!(air.best_air_time, first);
    assert_eq!(air.current_air_time, 0.0);

    rig.run(0.5, MovementIntent::default());
    rig.body.velocity.y = 4.0;
    let second = rig
        .run(4.0, MovementIntent::default())
        .iter()
        .find_map(|r| r.landed)
        .expect("second jump lands");

    assert!(second < first);
    let air = *rig.session.air_time();
    assert_eq!(air.last_air_time, second);
    assert_eq!(air.best_air_time, first);
}

#[test]
fn standing_still_wipes_everything_after_the_idle_window() {
    let mut session = SkierSession::new(SessionConfig::default());
    session.add_trick_score("grab", 150.0);
    session.bank_chain();
    assert_eq!(session.score().total_score, 150.0);

    let still = FrameInput {
        position: Vec3::new(3.0, 1.0, -2.0),
        ..FrameInput::default()
    };
    for _ in 0..79 {
        assert!(!session.frame_step(0.125, still).score.idle_wiped);
    }
    assert_eq!(session.score().total_score, 150.0);

    assert!(session.frame_step(0.125, still).score.idle_wiped);
    assert_eq!(session.score().total_score, 0.0);
    assert_eq!(session.score().chain_score, 0.0);
}

#[test]
fn walking_moves_at_walking_speed_and_stays_on_the_ground() {
    let mut rig = flat_rig();
    rig.session.set_mode(MovementMode::Walking);

    rig.run(1.0, MovementIntent::new(0.0, 1.0));

    assert!(rig.session.grounding().is_grounded);
    assert!(rig.body.velocity.z > 4.0 && rig.body.velocity.z <= 6.0);
    assert!((rig.body.position.y - HALF_HEIGHT).abs() < 0.05);
    assert_eq!(rig.session.snapshot().push_boost, 0.0);
}

#[test]
fn pushing_off_raises_speed_on_flat_ground() {
    let mut plain = flat_rig();
    plain.run(3.0, MovementIntent::new(0.0, 1.0));

    let mut pushed = flat_rig();
    pushed.run(2.5, MovementIntent::new(0.0, 1.0));
    pushed.session.push();
    pushed.run(0.5, MovementIntent::new(0.0, 1.0));

    assert!(pushed.body.velocity.z > plain.body.velocity.z + 1.0);
    assert!(pushed.session.snapshot().push_boost > 0.0);
}
