//! One controlled skier: grounding, locomotion, scoring, air time and tricks wired together.
//!
//! The session is driven by two clocks:
//! - [`SkierSession::physics_step`] once per fixed physics tick (grounding, then locomotion);
//! - [`SkierSession::frame_step`] once per rendered frame (tricks, scoring, air time).
//!
//! Obstacle contacts reported between frames are buffered in the collision sensor and drained
//! into the next frame's score update.

use serde::{Deserialize, Serialize};

use crate::{
    air_time::{AirTimeState, AirTimeTracker},
    body::BodyHandle,
    collision::{
        CollisionSensor, Contact, Grounding, GroundingState, LayerClassifier, LayerMask,
        ObstacleClassifier, RayQuery, Vec3,
    },
    config::SessionConfig,
    movement::{Locomotion, LocomotionConfig, LocomotionOutput, MovementIntent, OrientationBasis},
    scoring::{
        ScoreOutcome, ScoreState, ScoreSystem, ScoreTick, SpeedSampler, SpeedSource, TrickEvent,
    },
    trick::{TrickDetector, TrickInput},
    utils::is_step,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    #[default]
    Skiing,
    Walking,
}

/// Per-frame input.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub position: Vec3,
    /// Only read when scoring uses [`SpeedSource::Velocity`].
    pub velocity: Vec3,
    pub tricks: TrickInput,
}

/// What happened during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub speed: f32,
    pub tricks: Vec<TrickEvent>,
    pub score: ScoreOutcome,
    /// Length of the flight that ended this frame.
    pub landed: Option<f32>,
}

/// Read-only view of everything a HUD would show.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub mode: MovementMode,
    pub grounding: GroundingState,
    pub score: ScoreState,
    pub air_time: AirTimeState,
    pub push_boost: f32,
    pub current_trick: Option<String>,
}

pub struct SkierSession<C: ObstacleClassifier = LayerClassifier> {
    ski: LocomotionConfig,
    walk: LocomotionConfig,
    speed_source: SpeedSource,
    mode: MovementMode,
    grounding: Grounding,
    locomotion: Locomotion,
    scoring: ScoreSystem,
    speed: SpeedSampler,
    air_time: AirTimeTracker,
    tricks: TrickDetector,
    sensor: Option<CollisionSensor<C>>,
}

impl SkierSession {
    /// Session on skis, with obstacles classified by `config.obstacle_layers`.
    pub fn new(config: SessionConfig) -> Self {
        let sensor = CollisionSensor::new(LayerClassifier::new(&config.obstacle_layers));
        Self::with_sensor(config, Some(sensor))
    }
}

impl<C: ObstacleClassifier> SkierSession<C> {
    /// Without a sensor, contacts are ignored and the chain never breaks on its own.
    pub fn with_sensor(config: SessionConfig, sensor: Option<CollisionSensor<C>>) -> Self {
        let ground_mask = LayerMask::from_tags(&config.grounding.ground_layers);
        Self {
            ski: config.ski,
            walk: config.walk,
            speed_source: config.scoring.speed_source,
            mode: MovementMode::Skiing,
            grounding: Grounding::new(&config.grounding, &config.body),
            locomotion: Locomotion::new(config.ski, &config.body, ground_mask),
            speed: SpeedSampler::new(config.scoring.position_delta_epsilon),
            scoring: ScoreSystem::new(config.scoring),
            air_time: AirTimeTracker::new(),
            tricks: TrickDetector::new(config.tricks),
            sensor,
        }
    }

    #[inline]
    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: MovementMode) {
        if mode == self.mode {
            return;
        }
        let config = match mode {
            MovementMode::Skiing => self.ski,
            MovementMode::Walking => self.walk,
        };
        self.locomotion.set_config(config);
        self.mode = mode;
        log::debug!("movement mode: {mode:?}");
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(match self.mode {
            MovementMode::Skiing => MovementMode::Walking,
            MovementMode::Walking => MovementMode::Skiing,
        });
    }

    pub fn push(&mut self) {
        self.locomotion.push();
    }

    /// Feed a contact from the physics engine. Returns true if it was queued as an obstacle hit.
    pub fn report_contact(&mut self, contact: Contact) -> bool {
        self.sensor
            .as_mut()
            .is_some_and(|sensor| sensor.on_contact(contact))
    }

    /// Fixed-rate step: refresh grounding under the body, then run locomotion on it.
    pub fn physics_step(
        &mut self,
        dt: f32,
        ray: &impl RayQuery,
        body: &mut impl BodyHandle,
        intent: MovementIntent,
        basis: OrientationBasis,
    ) -> LocomotionOutput {
        if !is_step(dt) {
            return LocomotionOutput::default();
        }
        let grounding = *self.grounding.refresh(ray, body.position());
        self.locomotion.step(dt, &grounding, intent, basis, body, ray)
    }

    /// Variable-rate step: detect tricks, score the frame and track air time.
    pub fn frame_step(&mut self, dt: f32, input: FrameInput) -> FrameReport {
        if !is_step(dt) {
            return FrameReport::default();
        }

        let speed = match self.speed_source {
            SpeedSource::PositionDelta => self.speed.sample(input.position, dt),
            SpeedSource::Velocity => input.velocity.norm(),
        };
        let grounded = self.grounding.state().is_grounded;

        let tricks = self.tricks.update(dt, input.tricks, !grounded);
        let hits = self
            .sensor
            .as_mut()
            .map(CollisionSensor::drain)
            .unwrap_or_default();

        let tick = ScoreTick::new(dt, speed)
            .with_hits(&hits)
            .with_tricks(&tricks);
        let score = self.scoring.update(&tick);
        let landed = self.air_time.update(dt, grounded);

        FrameReport {
            speed,
            tricks,
            score,
            landed,
        }
    }

    pub fn add_trick_score(&mut self, name: &str, base_points: f32) {
        self.scoring.add_trick_score(name, base_points);
    }

    pub fn break_chain(&mut self) {
        self.scoring.break_chain();
    }

    pub fn bank_chain(&mut self) -> f32 {
        self.scoring.bank_chain()
    }

    /// Start over: scores, air time, speed history and queued hits. Movement mode is kept.
    pub fn restart(&mut self) {
        self.scoring.reset();
        self.air_time.reset();
        self.speed.reset();
        if let Some(sensor) = self.sensor.as_mut() {
            sensor.drain();
        }
        log::debug!("session restarted");
    }

    #[inline]
    pub fn grounding(&self) -> &GroundingState {
        self.grounding.state()
    }

    #[inline]
    pub fn score(&self) -> &ScoreState {
        self.scoring.state()
    }

    #[inline]
    pub fn air_time(&self) -> &AirTimeState {
        self.air_time.state()
    }

    #[inline]
    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            grounding: *self.grounding.state(),
            score: *self.scoring.state(),
            air_time: *self.air_time.state(),
            push_boost: self.locomotion.push_boost(),
            current_trick: self.tricks.current_trick().map(str::to_owned),
        }
    }
}
