//! Level layout generation
//!
//! Builds the road and river lanes for a level. Every random decision is
//! drawn from a [`RandomSource`], so a seeded run (or a scripted sequence in
//! tests) always produces the same layout.

use rand::Rng;
use rand_pcg::Pcg32;

use super::grid::{ROAD_ROWS, WATER_ROWS};
use super::state::{
    EntityIds, Npc, Platform, PlatformKind, Vehicle, VehicleKind, DOUBLE_LOG_WIDTH,
};
use crate::consts::GRID_WIDTH;

/// Uniform draws in `[0, 1)`
pub trait RandomSource {
    fn unit(&mut self) -> f32;

    /// Uniform index in `0..n`
    fn index(&mut self, n: usize) -> usize {
        ((self.unit() * n as f32) as usize).min(n.saturating_sub(1))
    }
}

impl RandomSource for Pcg32 {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Per-level lane speed multipliers, cycled by `(level - 1) % 4`
pub const SPEED_PATTERNS: [[f32; 4]; 4] = [
    [0.8, 1.6, 1.0, 1.4],
    [1.4, 1.0, 1.6, 0.8],
    [1.0, 0.8, 1.4, 1.6],
    [1.6, 1.4, 0.8, 1.0],
];

/// Road lane directions, top to bottom
pub const ROAD_DIRECTIONS: [i32; 4] = [-1, 1, -1, 1];

pub const VEHICLES_PER_LANE: usize = 3;

/// Base vehicle speed in cells per tick
pub fn vehicle_base_speed(level: u32) -> f32 {
    0.025 + level.saturating_sub(1) as f32 * 0.005
}

/// Platform speed magnitude in cells per tick
pub fn platform_speed(level: u32) -> f32 {
    0.02 + level.saturating_sub(1) as f32 * 0.004
}

/// Speed multipliers for the four road lanes at `level`
pub fn speed_pattern(level: u32) -> [f32; 4] {
    SPEED_PATTERNS[(level.saturating_sub(1) as usize) % SPEED_PATTERNS.len()]
}

/// Three vehicles per road lane, spread across the lane
pub fn build_vehicles(level: u32, rng: &mut impl RandomSource) -> Vec<Vehicle> {
    let base = vehicle_base_speed(level);
    let pattern = speed_pattern(level);
    let mut vehicles = Vec::with_capacity(ROAD_ROWS.len() * VEHICLES_PER_LANE);

    for (lane, &row) in ROAD_ROWS.iter().enumerate() {
        let direction = ROAD_DIRECTIONS[lane];
        let speed = base * pattern[lane] * direction as f32;

        for i in 0..VEHICLES_PER_LANE {
            let kind = VehicleKind::ALL[rng.index(VehicleKind::ALL.len())];
            let spread = (i * 5) as f32 + rng.unit() * 2.0;
            let x = if direction > 0 {
                spread
            } else {
                (GRID_WIDTH - 1) as f32 - spread
            };
            vehicles.push(Vehicle {
                x,
                y: row,
                kind,
                direction,
                speed,
                width: 1.0,
            });
        }
    }

    vehicles
}

/// Pick a platform shape: single log 40%, double log 20%, pair of pads 30%,
/// trio of pads 10%
fn choose_platform_kind(roll: f32) -> (PlatformKind, f32) {
    if roll < 0.4 {
        (PlatformKind::Log, 2.0)
    } else if roll < 0.6 {
        (PlatformKind::Log, DOUBLE_LOG_WIDTH)
    } else if roll < 0.9 {
        (PlatformKind::LilyPads { group_size: 2 }, 2.0)
    } else {
        (PlatformKind::LilyPads { group_size: 3 }, 3.0)
    }
}

/// Fill each river lane edge to edge with logs and lily-pad groups.
///
/// Rightward lanes are filled from the left edge, leftward lanes from the
/// right edge, with a 2-4 cell gap between platforms.
pub fn build_platforms(
    level: u32,
    rng: &mut impl RandomSource,
    ids: &mut EntityIds,
) -> Vec<Platform> {
    let magnitude = platform_speed(level);
    let width = GRID_WIDTH as f32;
    let mut platforms = Vec::new();

    for (lane, &row) in WATER_ROWS.iter().enumerate() {
        let direction = if lane % 2 == 0 { 1 } else { -1 };
        let speed = magnitude * direction as f32;
        let mut cursor = if direction > 0 { 0.0 } else { width };

        while (direction > 0 && cursor < width) || (direction < 0 && cursor > 0.0) {
            let (kind, platform_width) = choose_platform_kind(rng.unit());
            let x = if direction > 0 {
                cursor
            } else {
                cursor - platform_width
            };
            platforms.push(Platform {
                id: ids.next_platform(),
                x,
                y: row,
                kind,
                direction,
                speed,
                width: platform_width,
            });

            let gap = 2.0 + rng.unit() * 2.0;
            if direction > 0 {
                cursor += platform_width + gap;
            } else {
                cursor = x - gap;
            }
        }
    }

    platforms
}

/// Seat NPC turtles on lily pads.
///
/// Pairs: 40% one turtle on a random pad. Trios: 15% turtles on both ends,
/// otherwise 30% one turtle on a random pad, otherwise empty.
pub fn spawn_npcs(platforms: &[Platform], rng: &mut impl RandomSource) -> Vec<Npc> {
    let mut npcs = Vec::new();
    let mut seat = |platform: &Platform, slot: u8| {
        npcs.push(Npc {
            platform: platform.id,
            slot,
            x: platform.x + slot as f32,
            y: platform.y,
        });
    };

    for platform in platforms {
        match platform.group_size() {
            Some(2) => {
                if rng.unit() < 0.4 {
                    seat(platform, rng.index(2) as u8);
                }
            }
            Some(3) => {
                let roll = rng.unit();
                if roll < 0.15 {
                    seat(platform, 0);
                    seat(platform, 2);
                } else if roll < 0.45 {
                    seat(platform, rng.index(3) as u8);
                }
            }
            _ => {}
        }
    }

    npcs
}

/// Everything a level needs, built in one go
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub vehicles: Vec<Vehicle>,
    pub platforms: Vec<Platform>,
    pub npcs: Vec<Npc>,
}

pub fn build_level(level: u32, rng: &mut impl RandomSource, ids: &mut EntityIds) -> LevelLayout {
    let vehicles = build_vehicles(level, rng);
    let platforms = build_platforms(level, rng, ids);
    let npcs = spawn_npcs(&platforms, rng);
    LevelLayout {
        vehicles,
        platforms,
        npcs,
    }
}
