//! Combo scoring: speed builds a chain, tricks add to it, obstacles break it,
//! and a quiet spell banks it into the total.

use serde::{Deserialize, Serialize};

use crate::{
    collision::{ObstacleHit, Vec3},
    constants::{
        BANK_DELAY, COLLIDED_COOLDOWN, COMBO_BUILD_PER_SECOND, COMBO_DECAY_PER_SECOND, COMBO_MAX,
        HIGH_SPEED, IDLE_RESET_SECONDS, IDLE_SPEED_THRESHOLD, MIN_SPEED_DT, MIN_SPEED_TO_SCORE,
        POINTS_PER_SECOND_AT_HIGH_SPEED, POINTS_PER_SECOND_AT_MIN_SPEED, POSITION_DELTA_SPEED_EPS,
        TIMER_EPS,
    },
    utils::{inverse_lerp, is_step, lerp},
};

/// Where the scoring speed comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedSource {
    /// Distance moved between frames over dt. Works however the body is moved.
    #[default]
    PositionDelta,
    /// Magnitude of the body's velocity.
    Velocity,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub reset_when_idle: bool,
    pub idle_reset_seconds: f32,
    pub idle_speed_threshold: f32,
    pub min_speed_to_score: f32,
    pub points_per_second_at_min_speed: f32,
    pub points_per_second_at_high_speed: f32,
    pub high_speed: f32,
    pub combo_max: f32,
    pub combo_build_per_second: f32,
    pub combo_decay_per_second: f32,
    /// Seconds without scoring before the chain is banked.
    pub bank_delay: f32,
    pub collided_cooldown: f32,
    pub speed_source: SpeedSource,
    /// Position-delta speeds below this read as 0.
    pub position_delta_epsilon: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            reset_when_idle: true,
            idle_reset_seconds: IDLE_RESET_SECONDS,
            idle_speed_threshold: IDLE_SPEED_THRESHOLD,
            min_speed_to_score: MIN_SPEED_TO_SCORE,
            points_per_second_at_min_speed: POINTS_PER_SECOND_AT_MIN_SPEED,
            points_per_second_at_high_speed: POINTS_PER_SECOND_AT_HIGH_SPEED,
            high_speed: HIGH_SPEED,
            combo_max: COMBO_MAX,
            combo_build_per_second: COMBO_BUILD_PER_SECOND,
            combo_decay_per_second: COMBO_DECAY_PER_SECOND,
            bank_delay: BANK_DELAY,
            collided_cooldown: COLLIDED_COOLDOWN,
            speed_source: SpeedSource::PositionDelta,
            position_delta_epsilon: POSITION_DELTA_SPEED_EPS,
        }
    }
}

/// Snapshot of the scoring state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreState {
    /// Current unbanked run.
    pub chain_score: f32,
    /// Sum of banked chains.
    pub total_score: f32,
    pub combo: f32,
    pub bank_timer: f32,
    pub idle_timer: f32,
    pub collision_cooldown: f32,
    pub recently_collided: bool,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            chain_score: 0.0,
            total_score: 0.0,
            combo: 1.0,
            bank_timer: 0.0,
            idle_timer: 0.0,
            collision_cooldown: 0.0,
            recently_collided: false,
        }
    }
}

/// A trick landed this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TrickEvent {
    pub name: String,
    pub base_points: f32,
}

impl TrickEvent {
    pub fn new(name: impl Into<String>, base_points: f32) -> Self {
        Self {
            name: name.into(),
            base_points,
        }
    }
}

/// Everything the scoring engine needs for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreTick<'a> {
    pub dt: f32,
    pub speed: f32,
    pub obstacle_hits: &'a [ObstacleHit],
    pub tricks: &'a [TrickEvent],
}

impl<'a> ScoreTick<'a> {
    pub fn new(dt: f32, speed: f32) -> Self {
        Self {
            dt,
            speed,
            ..Self::default()
        }
    }

    pub fn with_hits(mut self, hits: &'a [ObstacleHit]) -> Self {
        self.obstacle_hits = hits;
        self
    }

    pub fn with_tricks(mut self, tricks: &'a [TrickEvent]) -> Self {
        self.tricks = tricks;
        self
    }
}

/// Transitions that happened during one update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreOutcome {
    /// Chain value moved into the total, if a bank happened.
    pub banked: Option<f32>,
    pub chain_broken: bool,
    pub idle_wiped: bool,
}

/// Speed from successive positions.
#[derive(Clone, Copy, Debug)]
pub struct SpeedSampler {
    last: Option<Vec3>,
    epsilon: f32,
}

impl SpeedSampler {
    pub fn new(epsilon: f32) -> Self {
        Self {
            last: None,
            epsilon: epsilon.max(0.0),
        }
    }

    /// Speed since the previous sample. The first sample only primes the sampler and reads 0.
    pub fn sample(&mut self, position: Vec3, dt: f32) -> f32 {
        let Some(last) = self.last.replace(position) else {
            return 0.0;
        };
        let speed = (position - last).norm() / dt.max(MIN_SPEED_DT);
        if speed < self.epsilon { 0.0 } else { speed }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// One body's scoring state machine.
#[derive(Clone, Debug)]
pub struct ScoreSystem {
    config: ScoreConfig,
    state: ScoreState,
}

impl ScoreSystem {
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            state: ScoreState::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Advance one frame. A non-positive or non-finite `dt` leaves the state untouched.
    pub fn update(&mut self, tick: &ScoreTick) -> ScoreOutcome {
        let mut outcome = ScoreOutcome::default();
        let dt = tick.dt;
        if !is_step(dt) {
            return outcome;
        }
        let speed = if tick.speed.is_finite() {
            tick.speed.max(0.0)
        } else {
            0.0
        };

        // Hits are ignored through the whole tick on which the cooldown runs out.
        let gated = self.state.recently_collided;
        if self.state.recently_collided {
            self.state.collision_cooldown = (self.state.collision_cooldown - dt).max(0.0);
            if self.state.collision_cooldown <= TIMER_EPS {
                self.state.collision_cooldown = 0.0;
                self.state.recently_collided = false;
            }
        }

        if self.config.reset_when_idle {
            if speed <= self.config.idle_speed_threshold && tick.tricks.is_empty() {
                self.state.idle_timer += dt;
                if self.state.idle_timer + TIMER_EPS >= self.config.idle_reset_seconds {
                    log::info!(
                        "idle for {:.1}s, wiping score (total {:.0})",
                        self.state.idle_timer,
                        self.state.total_score
                    );
                    self.reset();
                    outcome.idle_wiped = true;
                }
            } else {
                self.state.idle_timer = 0.0;
            }
        }

        let combo_max = self.combo_max();
        if !self.state.recently_collided && speed >= self.config.min_speed_to_score {
            let speed01 =
                inverse_lerp(self.config.min_speed_to_score, self.config.high_speed, speed);
            let pps = lerp(
                self.config.points_per_second_at_min_speed,
                self.config.points_per_second_at_high_speed,
                speed01,
            );

            self.state.combo =
                (self.state.combo + self.config.combo_build_per_second * dt).min(combo_max);
            self.state.chain_score += pps.max(0.0) * dt * self.state.combo;
            self.state.bank_timer = self.config.bank_delay;
        } else {
            self.state.combo =
                (self.state.combo - self.config.combo_decay_per_second * dt).max(1.0);
            if self.state.chain_score > 0.0 {
                self.state.bank_timer -= dt;
                if self.state.bank_timer <= TIMER_EPS {
                    outcome.banked = Some(self.bank_chain());
                }
            }
        }

        for trick in tick.tricks {
            self.add_trick_score(&trick.name, trick.base_points);
        }

        for hit in tick.obstacle_hits {
            if gated || self.state.recently_collided {
                continue;
            }
            log::debug!("obstacle {} broke the chain", hit.other_id);
            self.break_chain();
            outcome.chain_broken = true;
        }

        outcome
    }

    /// Add a trick's points, scaled by the current combo. Negative points count as 0.
    pub fn add_trick_score(&mut self, name: &str, base_points: f32) {
        let points = base_points.max(0.0) * self.state.combo;
        self.state.chain_score += points;
        self.state.bank_timer = self.config.bank_delay;
        self.state.idle_timer = 0.0;
        log::trace!("trick {name}: +{points:.0} (x{:.2})", self.state.combo);
    }

    /// Drop the chain and start the collision cooldown.
    pub fn break_chain(&mut self) {
        if self.state.chain_score > 0.0 {
            log::debug!("chain broken, lost {:.0}", self.state.chain_score);
        }
        self.state.chain_score = 0.0;
        self.state.combo = 1.0;
        self.state.bank_timer = 0.0;
        self.state.recently_collided = true;
        self.state.collision_cooldown = self.config.collided_cooldown.max(0.0);
    }

    /// Move the chain into the total. Returns the banked amount.
    pub fn bank_chain(&mut self) -> f32 {
        let banked = self.state.chain_score;
        self.state.total_score += banked;
        self.state.chain_score = 0.0;
        self.state.combo = 1.0;
        self.state.bank_timer = 0.0;
        log::debug!("banked {banked:.0}, total {:.0}", self.state.total_score);
        banked
    }

    /// Everything back to the initial values, collision gate included.
    pub fn reset(&mut self) {
        self.state = ScoreState::default();
    }

    #[inline]
    fn combo_max(&self) -> f32 {
        self.config.combo_max.max(1.0)
    }
}
