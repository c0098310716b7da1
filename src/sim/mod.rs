//! Gameplay simulation module
//!
//! Everything that decides what happens to blades lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body id)
//! - The physics engine is reached only through `PhysicsWorld`

pub mod body;
pub mod boundary;
pub mod noise;
pub mod physics;
pub mod rapier_world;
pub mod spawn;
pub mod state;
pub mod stick;
pub mod terrain;
pub mod tick;

#[cfg(test)]
pub(crate) mod test_world;

pub use body::{BladeSpawn, BodyId, BodyKind, BodyView};
pub use boundary::BoundaryMonitor;
pub use self::noise::{NoiseSource, SimplexNoise};
pub use physics::{CollisionStart, PhysicsError, PhysicsWorld};
pub use rapier_world::RapierWorld;
pub use spawn::SpawnController;
pub use state::{GameEvent, GamePhase, LifeLoss, SessionState};
pub use stick::{Contact, StickClassifier, is_vertical};
pub use terrain::{Polygon, TerrainError, TerrainGenerator};
pub use tick::{TickRules, tick};
