//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time only enters through `tick` and `on_second_elapsed`
//! - Stable iteration order (platforms sorted by ID)
//! - No rendering, audio or input dependencies

pub mod collision;
pub mod grid;
pub mod level;
pub mod motion;
pub mod movement;
pub mod occupancy;
pub mod state;
pub mod tick;

pub use collision::{CollisionOutcome, Hitbox};
pub use grid::Band;
pub use level::{LevelLayout, RandomSource, build_level};
pub use movement::{Landing, MoveOutcome, MoveRejection, validate_move};
pub use state::{
    Banner, DeathCause, Direction, GameEvent, GamePhase, GameState, Npc, Platform, PlatformId,
    PlatformKind, Player, Snapshot, Vehicle, VehicleKind,
};
pub use tick::{
    MoveResult, on_level_complete, on_player_death, on_second_elapsed, request_move,
    start_new_game, tick,
};
