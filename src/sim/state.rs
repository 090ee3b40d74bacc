//! Game state and core simulation types
//!
//! Everything the host reads each frame lives here. Mutation goes through the
//! transition functions in `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::movement::MoveRejection;
use crate::Settings;
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated yet
    NotStarted,
    /// Active gameplay
    Running,
    /// Out of lives
    GameOver,
}

/// Facing / movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Identifier of a platform within the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Hands out platform ids. Ids are never reused within a run, so a stale id
/// held across a level rebuild can't resolve to a new platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl EntityIds {
    pub fn next_platform(&mut self) -> PlatformId {
        let id = PlatformId(self.next);
        self.next += 1;
        id
    }
}

/// The player-controlled turtle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Column; fractional while riding
    pub x: f32,
    /// Row
    pub y: i32,
    pub facing: Direction,
    /// Platform currently ridden (water rows only)
    pub riding: Option<PlatformId>,
    /// Slot within a lily-pad group
    pub slot: u8,
    /// Offset from a ridden log's left edge
    pub ride_offset: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: SPAWN_X,
            y: SPAWN_Y,
            facing: Direction::Up,
            riding: None,
            slot: 0,
            ride_offset: 0.0,
        }
    }
}

impl Player {
    /// Put the player back on the start row, facing up, riding nothing
    pub fn reset_to_spawn(&mut self) {
        *self = Self::default();
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y as f32)
    }

    /// Attach to a platform at the player's current column
    pub fn board(&mut self, platform: &Platform, slot: u8) {
        self.riding = Some(platform.id);
        self.slot = slot;
        self.ride_offset = self.x - platform.x;
    }

    pub fn dismount(&mut self) {
        self.riding = None;
        self.slot = 0;
        self.ride_offset = 0.0;
    }
}

/// Vehicle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Car,
    Bus,
    Truck,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Car, VehicleKind::Bus, VehicleKind::Truck];

    /// Hitbox size relative to a one-cell box
    pub fn hitbox_scale(&self) -> f32 {
        match self {
            VehicleKind::Car => 1.1,
            VehicleKind::Bus | VehicleKind::Truck => 1.76,
        }
    }
}

/// A road vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub x: f32,
    pub y: i32,
    pub kind: VehicleKind,
    /// +1 rightward, -1 leftward
    pub direction: i32,
    /// Cells per tick, signed by direction
    pub speed: f32,
    pub width: f32,
}

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Log,
    LilyPads { group_size: u8 },
}

/// Logs at least this wide allow sideways steps
pub const DOUBLE_LOG_WIDTH: f32 = 4.0;

/// A river platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub x: f32,
    pub y: i32,
    pub kind: PlatformKind,
    /// +1 rightward, -1 leftward
    pub direction: i32,
    /// Cells per tick, signed by direction
    pub speed: f32,
    pub width: f32,
}

impl Platform {
    /// Left cell of a lily-pad group. Slot arithmetic is relative to this.
    #[inline]
    pub fn left_cell(&self) -> f32 {
        self.x.floor()
    }

    pub fn group_size(&self) -> Option<u8> {
        match self.kind {
            PlatformKind::LilyPads { group_size } => Some(group_size),
            PlatformKind::Log => None,
        }
    }

    pub fn is_double_log(&self) -> bool {
        self.kind == PlatformKind::Log && self.width >= DOUBLE_LOG_WIDTH
    }

    /// Whether a column falls on the platform's continuous extent
    pub fn spans(&self, x: f32) -> bool {
        x >= self.x && x < self.x + self.width
    }
}

/// An NPC turtle sitting on a lily-pad slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub platform: PlatformId,
    pub slot: u8,
    /// Derived each tick from the platform
    pub x: f32,
    pub y: i32,
}

/// Why the player lost a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    StruckByVehicle,
    Drowned,
    CarriedOffScreen,
    TimeUp,
    /// A move the validator rejected
    Misstep(MoveRejection),
}

impl std::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeathCause::StruckByVehicle => f.write_str("struck by vehicle"),
            DeathCause::Drowned => f.write_str("drowned"),
            DeathCause::CarriedOffScreen => f.write_str("carried off-screen"),
            DeathCause::TimeUp => f.write_str("time up"),
            DeathCause::Misstep(reason) => write!(f, "misstep: {reason}"),
        }
    }
}

/// Events for audio/visual collaborators, drained by the host each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    VehicleStrike,
    /// Fell in the river, including rejected moves over water
    Drowned,
    CarriedOffScreen,
    TimeUp,
    HomeReached { slot: usize, points: u64 },
    LevelComplete { level: u32 },
    GameOver { score: u64, level: u32 },
}

/// A transient on-screen message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    /// Simulation clock time at which the banner disappears
    pub expires_at: f64,
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub(crate) seed: u64,
    /// Content RNG (lane layouts, NPC placement)
    pub(crate) rng: Pcg32,
    pub(crate) settings: Settings,
    pub(crate) phase: GamePhase,
    pub(crate) score: u64,
    pub(crate) lives: u32,
    pub(crate) level: u32,
    /// Countdown in whole seconds
    pub(crate) timer: u32,
    pub(crate) homes: [bool; HOME_SLOTS],
    pub(crate) player: Player,
    pub(crate) vehicles: Vec<Vehicle>,
    /// Sorted by id
    pub(crate) platforms: Vec<Platform>,
    pub(crate) npcs: Vec<Npc>,
    pub(crate) message: Option<Banner>,
    pub(crate) death_flash_until: Option<f64>,
    pub(crate) last_death: Option<DeathCause>,
    /// Seconds of host time seen by `tick`
    pub(crate) clock: f64,
    /// Clock time of the last accepted move
    pub(crate) last_move_at: Option<f64>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) ids: EntityIds,
}

impl GameState {
    /// Create a new run with the given seed and default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            phase: GamePhase::NotStarted,
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            timer: LEVEL_TIME_SECS,
            homes: [false; HOME_SLOTS],
            player: Player::default(),
            vehicles: Vec::new(),
            platforms: Vec::new(),
            npcs: Vec::new(),
            message: None,
            death_flash_until: None,
            last_death: None,
            clock: 0.0,
            last_move_at: None,
            events: Vec::new(),
            ids: EntityIds::default(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn homes(&self) -> &[bool; HOME_SLOTS] {
        &self.homes
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn last_death(&self) -> Option<DeathCause> {
        self.last_death
    }

    /// Active message text, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|b| b.text.as_str())
    }

    pub fn death_flash_active(&self) -> bool {
        self.death_flash_until.is_some()
    }

    /// Look up a platform by id
    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        find_platform(&self.platforms, id)
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Read-only copy of everything a renderer or HUD needs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            level: self.level,
            timer: self.timer,
            homes: self.homes,
            player: self.player.clone(),
            vehicles: self.vehicles.clone(),
            platforms: self.platforms.clone(),
            npcs: self.npcs.clone(),
            message: self.message.clone(),
            death_flash_until: self.death_flash_until,
            last_death: self.last_death,
        }
    }
}

/// Find a platform by id in an id-sorted slice
pub fn find_platform(platforms: &[Platform], id: PlatformId) -> Option<&Platform> {
    platforms
        .binary_search_by_key(&id, |p| p.id)
        .ok()
        .map(|i| &platforms[i])
}

/// Serializable view of the run for external collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub timer: u32,
    pub homes: [bool; HOME_SLOTS],
    pub player: Player,
    pub vehicles: Vec<Vehicle>,
    pub platforms: Vec<Platform>,
    pub npcs: Vec<Npc>,
    pub message: Option<Banner>,
    pub death_flash_until: Option<f64>,
    pub last_death: Option<DeathCause>,
}
