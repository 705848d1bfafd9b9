/*!
Collision root module.

Everything the core learns about the world comes through here: downward ray
probes for grounding and discrete contacts for obstacle hits. The physics
engine itself stays outside; it is reached only through [`RayQuery`] and the
contacts it reports.

- types:    shared data types (Vec3, Layer, RayHit, Contact) and the ray query trait
- ground:   ground sensor and the per-tick grounding state
- obstacle: obstacle classification and the collision sensor queue
*/

pub mod ground;
pub mod obstacle;
pub mod types;

// Re-export commonly used types and functions.
pub use ground::{GroundSensor, Grounding, GroundingConfig, GroundingState};
pub use obstacle::{CollisionSensor, LayerClassifier, ObstacleClassifier, ObstacleHit};
pub use types::{Contact, Layer, LayerMask, RayHit, RayQuery, Vec2, Vec3, down, up};
