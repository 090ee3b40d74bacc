//! Turtle Crossing - a lane-crossing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, movement rules, collisions, run state)
//! - `settings`: Host timing knobs loaded from JSON

pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Playfield width in cells
    pub const GRID_WIDTH: i32 = 16;
    /// Playfield height in cells
    pub const GRID_HEIGHT: i32 = 12;

    /// Entity speeds are expressed in cells per tick at this rate
    pub const TICKS_PER_SECOND: f32 = 60.0;
    /// Largest step a single `tick` will simulate (seconds)
    pub const MAX_STEP_SECS: f32 = 0.05;

    /// Vehicles wrap once they are this far past an edge
    pub const VEHICLE_WRAP_MARGIN: f32 = 2.0;
    /// Platforms wrap once they are this far past an edge
    pub const PLATFORM_WRAP_MARGIN: f32 = 3.0;

    /// Player spawn cell
    pub const SPAWN_X: f32 = 7.0;
    pub const SPAWN_Y: i32 = 11;

    /// Number of home slots in the top row
    pub const HOME_SLOTS: usize = 5;

    /// Run defaults
    pub const STARTING_LIVES: u32 = 3;
    pub const LEVEL_TIME_SECS: u32 = 90;

    /// Scoring
    pub const FORWARD_HOP_POINTS: u64 = 10;
    pub const HOME_BASE_POINTS: u64 = 50;
    pub const HOME_POINTS_PER_SECOND: u64 = 10;
    pub const LEVEL_BONUS_POINTS: u64 = 1000;

    /// Minimum gap between accepted moves
    pub const MOVE_COOLDOWN_MS: u64 = 80;
    /// Transient display durations (seconds)
    pub const LEVEL_MESSAGE_SECS: f32 = 2.0;
    pub const DEATH_FLASH_SECS: f32 = 0.5;
}
