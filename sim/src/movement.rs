use serde::{Deserialize, Serialize};

use crate::{
    body::{BodyConfig, BodyHandle, ForceMode},
    collision::{
        GroundingState,
        types::{LayerMask, RayQuery, Vec2, Vec3, down, up},
    },
    constants::{
        AIR_GRAVITY, DOWNHILL_MIN_DEG, INTENT_THRESHOLD, MAX_SLOPE_DEG, PUSH_DURATION, PUSH_EXTRA,
        SKI_GROUND_DRAG, SKI_SPEED, SLOPE_ACCELERATION, SLOPE_RESISTANCE_FORCE, SNAP_GAP_FORCE,
        SNAP_GAP_TOLERANCE, SNAP_LIFT, SNAP_MAX_DISTANCE, SNAP_MAX_RISE_SPEED, SNAP_MIN_FALL_SPEED,
        SNAP_SETTLE_GAP, STICK_BASE, STICK_PER_SPEED, VELOCITY_GAIN, WALK_AIR_CONTROL,
        WALK_GROUND_DRAG, WALK_SPEED,
    },
    utils::{angle_to_up_deg, horizontal, is_step, project_on_plane, try_direction},
};

/// Two-axis movement intent for one physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementIntent {
    /// Right is positive.
    pub strafe: f32,
    /// Forward is positive.
    pub forward: f32,
}

impl MovementIntent {
    pub fn new(strafe: f32, forward: f32) -> Self {
        Self { strafe, forward }
    }
}

impl From<Vec2> for MovementIntent {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Forward/right basis the intent is expressed in (camera- or body-relative).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for OrientationBasis {
    fn default() -> Self {
        Self::from_yaw(0.0)
    }
}

impl OrientationBasis {
    /// Basis rotated `yaw` radians about +Y; yaw 0 faces +Z with +X to the right.
    pub fn from_yaw(yaw: f32) -> Self {
        let (s, c) = yaw.sin_cos();
        Self {
            forward: Vec3::new(s, 0.0, c),
            right: Vec3::new(c, 0.0, -s),
        }
    }

    #[inline]
    pub fn direction(&self, intent: MovementIntent) -> Vec3 {
        self.forward * intent.forward + self.right * intent.strafe
    }
}

/// How intent becomes motion.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocomotionModel {
    /// Acceleration toward a target velocity on the slope plane (skis).
    SlopeProjected,
    /// Horizontal velocity set straight to the target, vertical kept (walking).
    DirectVelocity,
    /// Horizontal velocity eased toward the target by `rate * dt` per step.
    Lerp { rate: f32 },
}

/// Short speed boost from pushing off.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PushConfig {
    /// Seconds for the boost to fall from 1 to 0. Zero disables pushing.
    pub duration: f32,
    /// Top-speed fraction added at full boost.
    pub extra: f32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            duration: PUSH_DURATION,
            extra: PUSH_EXTRA,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapMode {
    /// Pull down with a force proportional to the gap.
    Force,
    /// Move the body onto the ground directly.
    Position,
}

/// Ground-snapping correction, only ever applied while grounded.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GroundSnapConfig {
    pub enabled: bool,
    pub mode: SnapMode,
    /// Probe start height above the body's base (meters).
    pub lift: f32,
    pub max_distance: f32,
    /// Seconds of horizontal velocity the probe is shifted ahead by.
    pub lookahead: f32,
    pub gap_tolerance: f32,
    /// Newtons per meter of gap (force mode).
    pub gap_force: f32,
    /// Gap under which falling is clamped (force mode).
    pub settle_gap: f32,
    /// Slowest vertical velocity allowed while settling (force mode).
    pub min_fall_speed: f32,
    /// Skip snapping when rising faster than this.
    pub max_rise_speed: f32,
}

impl Default for GroundSnapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: SnapMode::Force,
            lift: SNAP_LIFT,
            max_distance: SNAP_MAX_DISTANCE,
            lookahead: 0.0,
            gap_tolerance: SNAP_GAP_TOLERANCE,
            gap_force: SNAP_GAP_FORCE,
            settle_gap: SNAP_SETTLE_GAP,
            min_fall_speed: SNAP_MIN_FALL_SPEED,
            max_rise_speed: SNAP_MAX_RISE_SPEED,
        }
    }
}

/// Locomotion tuning for one movement mode.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub model: LocomotionModel,
    /// Top speed driven by intent (m/s).
    pub speed: f32,
    /// Linear damping while grounded; zero in the air.
    pub ground_drag: f32,
    /// Velocity error to acceleration gain (slope-projected model).
    pub velocity_gain: f32,
    pub intent_threshold: f32,
    /// Extra downward acceleration while airborne.
    pub air_gravity: f32,
    /// Share of ground control kept in the air, `0..=1`.
    pub air_control: f32,
    pub slope_acceleration: f32,
    pub downhill_min_deg: f32,
    pub stick_base: f32,
    pub stick_per_speed: f32,
    /// Steepness above which walking uphill is resisted (non-projected models).
    pub max_slope_deg: f32,
    pub slope_resistance_force: f32,
    pub push: PushConfig,
    pub snap: GroundSnapConfig,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self::ski()
    }
}

impl LocomotionConfig {
    /// Skis: gravity does the work, input steers on the slope, nothing in the air.
    pub fn ski() -> Self {
        Self {
            model: LocomotionModel::SlopeProjected,
            speed: SKI_SPEED,
            ground_drag: SKI_GROUND_DRAG,
            velocity_gain: VELOCITY_GAIN,
            intent_threshold: INTENT_THRESHOLD,
            air_gravity: AIR_GRAVITY,
            air_control: 0.0,
            slope_acceleration: SLOPE_ACCELERATION,
            downhill_min_deg: DOWNHILL_MIN_DEG,
            stick_base: STICK_BASE,
            stick_per_speed: STICK_PER_SPEED,
            max_slope_deg: MAX_SLOPE_DEG,
            slope_resistance_force: 0.0,
            push: PushConfig::default(),
            snap: GroundSnapConfig::default(),
        }
    }

    /// On foot: direct velocity, engine gravity, force snapping to terrain.
    pub fn walk() -> Self {
        Self {
            model: LocomotionModel::DirectVelocity,
            speed: WALK_SPEED,
            ground_drag: WALK_GROUND_DRAG,
            air_gravity: 0.0,
            air_control: WALK_AIR_CONTROL,
            slope_acceleration: 0.0,
            stick_base: 0.0,
            stick_per_speed: 0.0,
            slope_resistance_force: SLOPE_RESISTANCE_FORCE,
            push: PushConfig {
                duration: 0.0,
                ..PushConfig::default()
            },
            snap: GroundSnapConfig {
                enabled: true,
                ..GroundSnapConfig::default()
            },
            ..Self::ski()
        }
    }
}

/// What a ground snap did this step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SnapCorrection {
    /// Height of the body's base above the probed ground (negative = sunk in).
    pub gap: f32,
    pub force: Option<Vec3>,
    pub position: Option<Vec3>,
    pub velocity: Option<Vec3>,
}

/// Everything one locomotion step applied to the body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocomotionOutput {
    /// Acceleration from intent (slope-projected model).
    pub movement_accel: Vec3,
    pub slope_accel: Vec3,
    pub stick_accel: Vec3,
    pub gravity_accel: Vec3,
    /// Force resisting uphill walking on too-steep terrain.
    pub resistance_force: Vec3,
    /// Velocity written by the direct/lerp models.
    pub velocity_write: Option<Vec3>,
    pub snap: Option<SnapCorrection>,
    pub damping: f32,
}

/// Slope locomotion for one body.
#[derive(Clone, Debug)]
pub struct Locomotion {
    config: LocomotionConfig,
    half_height: f32,
    ground_mask: LayerMask,
    push_boost: f32,
}

impl Locomotion {
    pub fn new(config: LocomotionConfig, body: &BodyConfig, ground_mask: LayerMask) -> Self {
        Self {
            config,
            half_height: body.half_height(),
            ground_mask,
            push_boost: 0.0,
        }
    }

    #[inline]
    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Swap tuning (e.g. skis on/off). Any running push is dropped.
    pub fn set_config(&mut self, config: LocomotionConfig) {
        self.config = config;
        self.push_boost = 0.0;
    }

    /// Current push boost in `[0, 1]`.
    #[inline]
    pub fn push_boost(&self) -> f32 {
        self.push_boost
    }

    /// Start a push boost at full strength.
    pub fn push(&mut self) {
        if self.config.push.duration > 0.0 {
            self.push_boost = 1.0;
            log::debug!("push");
        }
    }

    /// Intent-driven top speed including the push boost.
    #[inline]
    pub fn top_speed(&self) -> f32 {
        self.config.speed.max(0.0) * (1.0 + self.config.push.extra.max(0.0) * self.push_boost)
    }

    /// Run one physics step. `grounding` must already be refreshed for this step.
    pub fn step(
        &mut self,
        dt: f32,
        grounding: &GroundingState,
        intent: MovementIntent,
        basis: OrientationBasis,
        body: &mut impl BodyHandle,
        ray: &impl RayQuery,
    ) -> LocomotionOutput {
        let mut out = LocomotionOutput::default();
        if !is_step(dt) {
            return out;
        }

        let grounded = grounding.is_grounded;
        out.damping = if grounded {
            self.config.ground_drag.max(0.0)
        } else {
            0.0
        };
        body.set_linear_damping(out.damping);

        let raw = basis.direction(intent);
        let has_intent = raw.norm() > self.config.intent_threshold;

        if has_intent {
            match self.config.model {
                LocomotionModel::SlopeProjected => {
                    out.movement_accel = self.projected_accel(grounding, raw, body.velocity());
                    apply_accel(body, out.movement_accel);
                }
                LocomotionModel::DirectVelocity => {
                    out.velocity_write = self.blend_velocity(grounded, raw, body.velocity(), 1.0);
                }
                LocomotionModel::Lerp { rate } => {
                    let t = (rate.max(0.0) * dt).min(1.0);
                    out.velocity_write = self.blend_velocity(grounded, raw, body.velocity(), t);
                }
            }
            if let Some(v) = out.velocity_write {
                body.set_velocity(v);
            }
            if self.config.model != LocomotionModel::SlopeProjected {
                out.resistance_force = self.slope_resistance(grounding, raw);
                if out.resistance_force != Vec3::zeros() {
                    body.add_force(out.resistance_force, ForceMode::Force);
                }
            }
        }

        if grounded {
            out.slope_accel = self.downhill_accel(grounding);
            apply_accel(body, out.slope_accel);

            let horizontal_speed = horizontal(body.velocity()).norm();
            let stick = self.config.stick_base + horizontal_speed * self.config.stick_per_speed;
            if stick > 0.0 {
                out.stick_accel = down() * stick;
                apply_accel(body, out.stick_accel);
            }

            if self.config.snap.enabled {
                out.snap = self.ground_snap(body, ray);
            }
        } else if self.config.air_gravity > 0.0 {
            out.gravity_accel = down() * self.config.air_gravity;
            apply_accel(body, out.gravity_accel);
        }

        self.push_boost = if self.config.push.duration > 0.0 {
            (self.push_boost - dt / self.config.push.duration).max(0.0)
        } else {
            0.0
        };

        out
    }

    /// Acceleration steering the body toward `speed` along the slope plane.
    ///
    /// The result never has a component along the surface normal.
    fn projected_accel(&self, grounding: &GroundingState, raw: Vec3, velocity: Vec3) -> Vec3 {
        if !grounding.is_grounded {
            return self.air_accel(raw, velocity);
        }
        let n = grounding.surface_normal;
        let Some(dir) = try_direction(project_on_plane(raw, n)) else {
            return Vec3::zeros();
        };

        let target = dir * self.top_speed();
        let mut change = target - velocity;
        change.y = 0.0;
        project_on_plane(change, n) * self.config.velocity_gain
    }

    /// Reduced-authority horizontal steering in the air.
    fn air_accel(&self, raw: Vec3, velocity: Vec3) -> Vec3 {
        let authority = self.config.air_control.clamp(0.0, 1.0);
        if authority <= 0.0 {
            return Vec3::zeros();
        }
        let Some(dir) = try_direction(horizontal(raw)) else {
            return Vec3::zeros();
        };
        (dir * self.top_speed() - horizontal(velocity)) * self.config.velocity_gain * authority
    }

    /// Horizontal velocity moved toward the target by `t` (scaled by air control when airborne).
    fn blend_velocity(&self, grounded: bool, raw: Vec3, velocity: Vec3, t: f32) -> Option<Vec3> {
        let dir = try_direction(horizontal(raw))?;
        let t = if grounded {
            t
        } else {
            t * self.config.air_control.clamp(0.0, 1.0)
        };
        if t <= 0.0 {
            return None;
        }

        let current = horizontal(velocity);
        let blended = current + (dir * self.top_speed() - current) * t;
        Some(Vec3::new(blended.x, velocity.y, blended.z))
    }

    fn downhill_accel(&self, grounding: &GroundingState) -> Vec3 {
        if self.config.slope_acceleration <= 0.0
            || grounding.steepness_deg() <= self.config.downhill_min_deg
        {
            return Vec3::zeros();
        }
        project_on_plane(down(), grounding.surface_normal) * self.config.slope_acceleration
    }

    /// Counter force when pushing up terrain steeper than `max_slope_deg`.
    ///
    /// Reads the raw probe hit so it still works when the slope is too steep to ground on.
    fn slope_resistance(&self, grounding: &GroundingState, raw: Vec3) -> Vec3 {
        let max = self.config.max_slope_deg.clamp(0.0, 89.0);
        if self.config.slope_resistance_force <= 0.0 {
            return Vec3::zeros();
        }
        let Some(hit) = grounding.ground_hit else {
            return Vec3::zeros();
        };
        let steepness = angle_to_up_deg(hit.normal);
        if steepness <= max {
            return Vec3::zeros();
        }

        let (Some(dir), Some(uphill)) = (
            try_direction(horizontal(raw)),
            try_direction(project_on_plane(up(), hit.normal)),
        ) else {
            return Vec3::zeros();
        };
        if dir.dot(&uphill) <= 0.0 {
            return Vec3::zeros();
        }

        let factor = ((steepness - max) / (90.0 - max)).clamp(0.0, 1.0);
        -dir * factor * self.config.slope_resistance_force
    }

    /// Keep the body on the terrain across small bumps and dips.
    fn ground_snap(
        &self,
        body: &mut impl BodyHandle,
        ray: &impl RayQuery,
    ) -> Option<SnapCorrection> {
        let snap = &self.config.snap;
        let position = body.position();
        let mut velocity = body.velocity();
        if velocity.y > snap.max_rise_speed {
            return None;
        }

        let base = position + down() * self.half_height;
        let origin = base + up() * snap.lift + horizontal(velocity) * snap.lookahead.max(0.0);
        let hit = ray.cast(origin, down(), snap.max_distance, self.ground_mask)?;
        let gap = base.y - hit.point.y;

        let mut correction = SnapCorrection {
            gap,
            ..SnapCorrection::default()
        };

        match snap.mode {
            SnapMode::Force => {
                if gap > snap.gap_tolerance {
                    let force = down() * gap * snap.gap_force;
                    body.add_force(force, ForceMode::Force);
                    correction.force = Some(force);
                }
                if gap < snap.settle_gap && velocity.y < snap.min_fall_speed {
                    velocity.y = snap.min_fall_speed;
                    body.set_velocity(velocity);
                    correction.velocity = Some(velocity);
                }
            }
            SnapMode::Position => {
                if gap.abs() > snap.gap_tolerance {
                    let target = Vec3::new(position.x, hit.point.y + self.half_height, position.z);
                    body.set_position(target);
                    correction.position = Some(target);
                }
                if velocity.y < 0.0 {
                    velocity.y = 0.0;
                    body.set_velocity(velocity);
                    correction.velocity = Some(velocity);
                }
            }
        }

        log::trace!("ground snap: gap {:.3}", gap);
        Some(correction)
    }
}

#[inline]
fn apply_accel(body: &mut impl BodyHandle, accel: Vec3) {
    if accel != Vec3::zeros() {
        body.add_force(accel, ForceMode::Acceleration);
    }
}
