//! Simulation module
//!
//! All gameplay logic lives here, free of rendering and platform code:
//! - Motion is per tick; real time only drives the landing delay
//! - Randomness comes from a caller-supplied RNG
//! - Spawning is scheduled outside the tick

pub mod collision;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use session::{Autopilot, RunSummary, Session};
pub use spawn::{Cadence, SpawnTimer};
pub use state::{
    AnimFrame, Character, GameEvent, GamePhase, GameState, Obstacle, ObstacleKind, Playfield,
};
pub use tick::tick;
