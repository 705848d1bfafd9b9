use serde::{Deserialize, Serialize};

use super::types::{Layer, LayerMask, RayHit, RayQuery, Vec3, down, up};
use crate::{
    body::BodyConfig,
    constants::{GROUND_PROBE_MARGIN, MAX_GROUND_DISTANCE, MAX_SLOPE_DEG, NO_GROUND_SLOPE_DEG},
    utils::{angle_to_down_deg, angle_to_up_deg},
};

/// Ground probe tuning.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// Probe start height above the body's base (meters).
    pub probe_margin: f32,
    /// Probe length from its start (meters).
    pub max_ground_distance: f32,
    /// Steepest standable slope, measured from flat (degrees).
    pub max_slope_deg: f32,
    /// When false, any hit grounds the body regardless of steepness.
    pub gate_on_slope: bool,
    /// Layers the probe can hit.
    pub ground_layers: Vec<Layer>,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            probe_margin: GROUND_PROBE_MARGIN,
            max_ground_distance: MAX_GROUND_DISTANCE,
            max_slope_deg: MAX_SLOPE_DEG,
            gate_on_slope: true,
            ground_layers: vec![Layer::Ground],
        }
    }
}

/// Result of the latest ground probe, shared read-only with locomotion, scoring and air time.
///
/// `slope_angle_deg` is measured between `surface_normal` and world-down, so both flat
/// ground and "nothing below" read as 180. Use [`GroundingState::steepness_deg`] for any
/// steep/flat comparison.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundingState {
    pub is_grounded: bool,
    /// Unit surface normal; world-up when not grounded.
    pub surface_normal: Vec3,
    pub slope_angle_deg: f32,
    /// Distance of the latest probe hit, `f32::INFINITY` when nothing was hit.
    pub last_sample_distance: f32,
    /// Raw probe hit, kept even when the slope was too steep to stand on.
    pub ground_hit: Option<RayHit>,
}

impl Default for GroundingState {
    fn default() -> Self {
        Self::airborne(None)
    }
}

impl GroundingState {
    fn airborne(hit: Option<RayHit>) -> Self {
        Self {
            is_grounded: false,
            surface_normal: up(),
            slope_angle_deg: NO_GROUND_SLOPE_DEG,
            last_sample_distance: hit.map_or(f32::INFINITY, |h| h.distance),
            ground_hit: hit,
        }
    }

    /// Angle of the surface against world-up: 0 on flat ground, 90 on a wall.
    #[inline]
    pub fn steepness_deg(&self) -> f32 {
        (NO_GROUND_SLOPE_DEG - self.slope_angle_deg).clamp(0.0, NO_GROUND_SLOPE_DEG)
    }
}

/// Casts the single downward ray used for grounding.
#[derive(Clone, Copy, Debug)]
pub struct GroundSensor {
    half_height: f32,
    probe_margin: f32,
    max_distance: f32,
    mask: LayerMask,
}

impl GroundSensor {
    pub fn new(config: &GroundingConfig, body: &BodyConfig) -> Self {
        Self {
            half_height: body.half_height(),
            probe_margin: config.probe_margin.max(0.0),
            max_distance: config.max_ground_distance.max(0.0),
            mask: LayerMask::from_tags(&config.ground_layers),
        }
    }

    /// Probe start: the body's base raised by the margin.
    #[inline]
    pub fn probe_origin(&self, position: Vec3) -> Vec3 {
        position + down() * (self.half_height - self.probe_margin)
    }

    pub fn probe(&self, ray: &impl RayQuery, position: Vec3) -> Option<RayHit> {
        if self.max_distance <= 0.0 {
            return None;
        }
        ray.cast(
            self.probe_origin(position),
            down(),
            self.max_distance,
            self.mask,
        )
    }
}

/// Grounding subsystem: owns the [`GroundingState`] of one body.
#[derive(Clone, Debug)]
pub struct Grounding {
    sensor: GroundSensor,
    max_slope_deg: f32,
    gate_on_slope: bool,
    state: GroundingState,
}

impl Grounding {
    pub fn new(config: &GroundingConfig, body: &BodyConfig) -> Self {
        Self {
            sensor: GroundSensor::new(config, body),
            max_slope_deg: config.max_slope_deg.clamp(0.0, 90.0),
            gate_on_slope: config.gate_on_slope,
            state: GroundingState::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> &GroundingState {
        &self.state
    }

    #[inline]
    pub fn sensor(&self) -> &GroundSensor {
        &self.sensor
    }

    /// Re-probe under `position` and replace the state. Must run once per physics tick,
    /// before locomotion reads the state.
    pub fn refresh(&mut self, ray: &impl RayQuery, position: Vec3) -> &GroundingState {
        let next = self.classify(self.sensor.probe(ray, position));

        if next.is_grounded != self.state.is_grounded {
            log::debug!(
                "grounding: {} (steepness {:.1} deg, distance {:.3})",
                if next.is_grounded { "landed" } else { "airborne" },
                next.steepness_deg(),
                next.last_sample_distance
            );
        }

        self.state = next;
        &self.state
    }

    /// Turn a raw probe result into a grounding state.
    pub fn classify(&self, hit: Option<RayHit>) -> GroundingState {
        let Some(hit) = hit else {
            return GroundingState::airborne(None);
        };

        // Degenerate normals (e.g. a ray starting inside a solid) read as flat ground.
        let normal = hit.normal.try_normalize(crate::DIST_EPS).unwrap_or_else(up);
        let hit = RayHit { normal, ..hit };

        let walkable = !self.gate_on_slope || angle_to_up_deg(normal) <= self.max_slope_deg;
        if !walkable {
            return GroundingState::airborne(Some(hit));
        }

        GroundingState {
            is_grounded: true,
            surface_normal: normal,
            slope_angle_deg: angle_to_down_deg(normal),
            last_sample_distance: hit.distance,
            ground_hit: Some(hit),
        }
    }
}
