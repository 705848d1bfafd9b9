pub mod air_time;
pub mod bitmask_flags;
pub mod body;
pub mod collision;
pub mod config;
pub mod constants;
pub mod logging;
pub mod movement;
pub mod rapier_world;
pub mod scoring;
pub mod session;
pub mod trick;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use air_time::{AirTimeState, AirTimeTracker};
pub use body::{BodyConfig, BodyHandle, ForceMode};
pub use collision::{
    CollisionSensor, Contact, Grounding, GroundingConfig, GroundingState, Layer, LayerMask,
    ObstacleHit, RayHit, RayQuery, Vec2, Vec3,
};
pub use config::{ConfigError, SessionConfig};
pub use constants::{DIST_EPS, TIMER_EPS};
pub use logging::init as init_logging;
pub use movement::{
    GroundSnapConfig, Locomotion, LocomotionConfig, LocomotionModel, LocomotionOutput,
    MovementIntent, OrientationBasis, PushConfig, SnapMode,
};
pub use rapier_world::{RapierBody, TerrainPieceDef, TerrainShapeDef, TerrainWorld};
pub use scoring::{ScoreConfig, ScoreState, ScoreSystem, ScoreTick, SpeedSource, TrickEvent};
pub use session::{FrameInput, FrameReport, MovementMode, SessionSnapshot, SkierSession};
pub use trick::{TrickButton, TrickConfig, TrickDetector, TrickInput};
