//! Player move validation
//!
//! Decides whether a requested cell is a legal landing spot and where the
//! player ends up. Rejections over water are fatal; the caller turns them
//! into a death.
//!
//! Lily-pad slot arithmetic is always relative to `floor(platform.x)`, the
//! group's left cell. Moving the floor changes where the group edge (and so
//! the death boundary) sits.

use serde::{Deserialize, Serialize};

use super::grid::is_water_row;
use super::occupancy::is_occupied;
use super::state::{Npc, Platform, PlatformId, PlatformKind, Player, find_platform};

/// Why a move was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveRejection {
    /// Stepped off the end of the lily-pad group being ridden
    BeyondGroupBoundary,
    /// Target lily pad holds an NPC turtle
    Occupied,
    /// Stepped off the end of a double log
    BeyondLogBoundary,
    /// Single logs only allow turning in place
    SidewaysOnSingleLog,
    /// Nothing to land on in the target water cell
    NoPlatform,
}

impl MoveRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveRejection::BeyondGroupBoundary => "beyond group boundary",
            MoveRejection::Occupied => "occupied",
            MoveRejection::BeyondLogBoundary => "beyond log boundary",
            MoveRejection::SidewaysOnSingleLog => "cannot move sideways on single log",
            MoveRejection::NoPlatform => "no platform at position",
        }
    }
}

impl std::fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an accepted move puts the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub x: f32,
    pub y: i32,
    /// Lily-pad slot, 0 elsewhere
    pub slot: u8,
    /// Platform to ride, `None` on land
    pub platform: Option<PlatformId>,
}

/// Result of validating a move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Valid(Landing),
    Invalid(MoveRejection),
}

impl MoveOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, MoveOutcome::Valid(_))
    }

    pub fn rejection(&self) -> Option<MoveRejection> {
        match self {
            MoveOutcome::Invalid(reason) => Some(*reason),
            MoveOutcome::Valid(_) => None,
        }
    }
}

/// Validate a move of `player` to `(new_x, new_y)`
pub fn validate_move(
    platforms: &[Platform],
    npcs: &[Npc],
    player: &Player,
    new_x: f32,
    new_y: i32,
) -> MoveOutcome {
    if !is_water_row(new_y) {
        return MoveOutcome::Valid(Landing {
            x: new_x,
            y: new_y,
            slot: 0,
            platform: None,
        });
    }

    // Sideways while riding: the ridden platform decides
    if new_y == player.y {
        if let Some(current) = player.riding.and_then(|id| find_platform(platforms, id)) {
            return step_along(current, npcs, new_x, new_y);
        }
    }

    find_landing(platforms, npcs, new_x, new_y)
}

/// Lateral move on the platform already being ridden
fn step_along(current: &Platform, npcs: &[Npc], new_x: f32, new_y: i32) -> MoveOutcome {
    match current.kind {
        PlatformKind::LilyPads { group_size } => {
            let left = current.left_cell();
            let slot = (new_x - left).floor();
            if slot < 0.0 || slot >= group_size as f32 {
                return MoveOutcome::Invalid(MoveRejection::BeyondGroupBoundary);
            }
            let slot = slot as u8;
            if is_occupied(npcs, current.id, slot) {
                return MoveOutcome::Invalid(MoveRejection::Occupied);
            }
            MoveOutcome::Valid(Landing {
                x: left + slot as f32,
                y: new_y,
                slot,
                platform: Some(current.id),
            })
        }
        PlatformKind::Log if current.is_double_log() => {
            if current.spans(new_x) {
                MoveOutcome::Valid(Landing {
                    x: new_x,
                    y: new_y,
                    slot: 0,
                    platform: Some(current.id),
                })
            } else {
                MoveOutcome::Invalid(MoveRejection::BeyondLogBoundary)
            }
        }
        PlatformKind::Log => MoveOutcome::Invalid(MoveRejection::SidewaysOnSingleLog),
    }
}

/// Entering a water row: something must be there to land on
fn find_landing(platforms: &[Platform], npcs: &[Npc], new_x: f32, new_y: i32) -> MoveOutcome {
    let Some(platform) = platforms.iter().find(|p| p.y == new_y && p.spans(new_x)) else {
        return MoveOutcome::Invalid(MoveRejection::NoPlatform);
    };

    match platform.kind {
        PlatformKind::LilyPads { group_size } => {
            let left = platform.left_cell();
            let slot = (new_x - left)
                .floor()
                .clamp(0.0, group_size.saturating_sub(1) as f32) as u8;
            if is_occupied(npcs, platform.id, slot) {
                return MoveOutcome::Invalid(MoveRejection::Occupied);
            }
            MoveOutcome::Valid(Landing {
                x: left + slot as f32,
                y: new_y,
                slot,
                platform: Some(platform.id),
            })
        }
        // Logs put the player on their middle cell
        PlatformKind::Log => MoveOutcome::Valid(Landing {
            x: platform.x + platform.width / 2.0 - 0.5,
            y: new_y,
            slot: 0,
            platform: Some(platform.id),
        }),
    }
}
