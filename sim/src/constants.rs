//! Default tuning values.
//!
//! These are the values the config sections fall back to when a field is missing.
//! Distances are in meters, time in seconds, angles in degrees.

/// Air-control multiplier for planar movement while airborne.
///
/// Convention:
/// - 1.0 = full ground control in air
/// - 0.0 = no air control (skis: input does nothing off the ground)
///
/// Only the walking mode uses a non-zero value by default.
pub const WALK_AIR_CONTROL: f32 = 0.4;

/// Full height of the controlled body's collider (meters).
pub const BODY_HEIGHT: f32 = 2.0;

/// How far above the body's base the ground probe starts (meters).
///
/// Lets the probe find ground slightly below the current position.
pub const GROUND_PROBE_MARGIN: f32 = 0.3;

/// Max downward length of the ground probe, measured from its start (meters).
pub const MAX_GROUND_DISTANCE: f32 = 0.5;

/// Steepest slope still considered standable (degrees from flat).
pub const MAX_SLOPE_DEG: f32 = 45.0;

/// Sentinel slope angle against world-down used when nothing is under the body.
pub const NO_GROUND_SLOPE_DEG: f32 = 180.0;

/// Ski top speed driven by input (m/s).
pub const SKI_SPEED: f32 = 12.0;

/// Linear damping applied while grounded on skis.
pub const SKI_GROUND_DRAG: f32 = 0.5;

/// Downhill acceleration scale along the slope plane (m/s^2 per unit of projected gravity).
pub const SLOPE_ACCELERATION: f32 = 8.0;

/// Gain converting a velocity error into an acceleration (1/s).
pub const VELOCITY_GAIN: f32 = 10.0;

/// Downward acceleration applied while airborne (m/s^2).
pub const AIR_GRAVITY: f32 = 10.0;

/// Base stick-down acceleration while grounded (m/s^2).
pub const STICK_BASE: f32 = 10.0;

/// Extra stick-down acceleration per m/s of horizontal speed (1/s).
pub const STICK_PER_SPEED: f32 = 2.0;

/// Input magnitude under which intent is treated as zero.
pub const INTENT_THRESHOLD: f32 = 0.1;

/// Slope steepness under which no downhill acceleration is applied (degrees).
pub const DOWNHILL_MIN_DEG: f32 = 1.0;

/// Seconds a push boost takes to decay from 1 to 0.
pub const PUSH_DURATION: f32 = 1.0;

/// Extra top-speed fraction granted at full push boost.
pub const PUSH_EXTRA: f32 = 0.5;

/// Walking top speed (m/s).
pub const WALK_SPEED: f32 = 6.0;

/// Linear damping applied while grounded on foot.
pub const WALK_GROUND_DRAG: f32 = 5.0;

/// Counter force scale when walking into a too-steep slope (newtons).
pub const SLOPE_RESISTANCE_FORCE: f32 = 8.0;

/// How far above the body's base the snap probe starts (meters).
pub const SNAP_LIFT: f32 = 1.0;

/// Max length of the snap probe (meters).
pub const SNAP_MAX_DISTANCE: f32 = 3.0;

/// Gap under which the body is considered resting on the ground (meters).
pub const SNAP_GAP_TOLERANCE: f32 = 0.01;

/// Downward force per meter of gap in force snapping (N/m).
pub const SNAP_GAP_FORCE: f32 = 100.0;

/// Gap under which falling velocity is clamped (meters).
pub const SNAP_SETTLE_GAP: f32 = 0.1;

/// Slowest allowed vertical velocity when settling onto the ground (m/s, negative = down).
pub const SNAP_MIN_FALL_SPEED: f32 = -1.0;

/// Upward speed above which snapping is skipped (m/s).
pub const SNAP_MAX_RISE_SPEED: f32 = 0.5;

/// Practical small value for vector-length guards.
pub const DIST_EPS: f32 = 1.0e-6;

/// Slack used when comparing accumulated timers against their limits (seconds).
///
/// Summing many variable frame deltas in `f32` drifts by a few ulps.
pub const TIMER_EPS: f32 = 1.0e-4;

/// Smallest dt used when turning a position delta into a speed (seconds).
pub const MIN_SPEED_DT: f32 = 1.0e-4;

/// Position-delta speeds below this are treated as standing still (m/s).
pub const POSITION_DELTA_SPEED_EPS: f32 = 0.15;

/// Seconds of idling before all scores are wiped.
pub const IDLE_RESET_SECONDS: f32 = 10.0;

/// Speed at or below which the body counts as idle (m/s).
pub const IDLE_SPEED_THRESHOLD: f32 = 0.25;

/// Slowest speed that earns points (m/s).
pub const MIN_SPEED_TO_SCORE: f32 = 6.0;

/// Points per second at `MIN_SPEED_TO_SCORE`.
pub const POINTS_PER_SECOND_AT_MIN_SPEED: f32 = 20.0;

/// Points per second at `HIGH_SPEED` and above.
pub const POINTS_PER_SECOND_AT_HIGH_SPEED: f32 = 80.0;

/// Speed at which the points rate saturates (m/s).
pub const HIGH_SPEED: f32 = 25.0;

/// Upper bound of the combo multiplier.
pub const COMBO_MAX: f32 = 10.0;

/// Combo gained per second of clean scoring.
pub const COMBO_BUILD_PER_SECOND: f32 = 0.20;

/// Combo lost per second while not scoring.
pub const COMBO_DECAY_PER_SECOND: f32 = 0.35;

/// Seconds without scoring before a chain is banked.
pub const BANK_DELAY: f32 = 2.0;

/// Seconds an obstacle hit suppresses scoring and further breaks.
pub const COLLIDED_COOLDOWN: f32 = 0.2;

/// Seconds a detected trick name stays on display.
pub const TRICK_DISPLAY_SECONDS: f32 = 1.0;
