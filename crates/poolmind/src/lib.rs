pub mod api;
pub mod core;
pub mod game;

// Re-export key types at crate root for convenience
pub use api::config::{ConfigError, GameConfig, PoolConfig, TableConfig, TrackerConfig};
pub use api::event::{Event, EventKind, EventLog, MAX_EVENTS};
pub use api::types::{BallGroup, BallId, BallState, ColorClass, Detection, Player};
pub use core::table::{Pocket, TableGeometry, POCKET_TOLERANCE};
pub use core::tracker::{CentroidTracker, TrackedObject, Tracks};
pub use game::engine::{GameEngine, HISTORY_LEN};
pub use game::rules::{EightBallRules, GameState, RulesSummary, ShotOutcome};
pub use game::state::{GameSnapshot, Score};
