//! Per-tick hazard detection
//!
//! Order matters: the rider is carried (and checked for leaving the screen)
//! before the drowning check, and both run before home-slot arrival.

use glam::Vec2;

use super::grid::{self, HOME_ROW, is_road_row, is_water_row};
use super::state::{DeathCause, Platform, PlatformKind, Player, Vehicle, find_platform};
use crate::consts::HOME_SLOTS;

/// Result of evaluating the player against the current entity positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Nothing happened
    Clear,
    /// The player dies
    Fatal(DeathCause),
    /// The player reached an empty home slot
    HomeReached { slot: usize },
}

/// Axis-aligned box in cell units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Hitbox {
    /// The exact 1x1 box of a grid cell
    pub fn cell(x: f32, y: i32) -> Self {
        let min = Vec2::new(x, y as f32);
        Self {
            min,
            max: min + Vec2::ONE,
        }
    }

    /// Vehicle box, widened by its kind's scale and kept centred
    pub fn vehicle(vehicle: &Vehicle) -> Self {
        let inflate = (vehicle.kind.hitbox_scale() - 1.0) / 2.0;
        let y = vehicle.y as f32;
        Self {
            min: Vec2::new(vehicle.x - inflate, y),
            max: Vec2::new(vehicle.x + vehicle.width + inflate, y + 1.0),
        }
    }

    /// Strict overlap; touching edges don't count
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }
}

/// Move a riding player along with their platform.
///
/// Returns a death if the platform carried them off the screen. A rider
/// whose platform no longer exists is dismounted, leaving the drowning check
/// to fire.
pub fn carry_rider(player: &mut Player, platforms: &[Platform]) -> Option<DeathCause> {
    if !is_water_row(player.y) {
        return None;
    }
    let id = player.riding?;
    let Some(platform) = find_platform(platforms, id) else {
        player.dismount();
        return None;
    };

    player.x = match platform.kind {
        PlatformKind::LilyPads { .. } => platform.x + player.slot as f32,
        // Keeps the offset from the last sideways step instead of
        // re-centring on the log every tick
        PlatformKind::Log => platform.x + player.ride_offset,
    };

    if grid::column_on_screen(player.x) {
        None
    } else {
        Some(DeathCause::CarriedOffScreen)
    }
}

/// Check the player against vehicles, water and home slots
pub fn evaluate(
    player: &Player,
    vehicles: &[Vehicle],
    homes: &[bool; HOME_SLOTS],
) -> CollisionOutcome {
    if is_road_row(player.y) {
        let body = Hitbox::cell(player.x, player.y);
        let struck = vehicles
            .iter()
            .filter(|v| v.y == player.y)
            .any(|v| Hitbox::vehicle(v).overlaps(&body));
        if struck {
            return CollisionOutcome::Fatal(DeathCause::StruckByVehicle);
        }
    }

    if is_water_row(player.y) && player.riding.is_none() {
        return CollisionOutcome::Fatal(DeathCause::Drowned);
    }

    if player.y == HOME_ROW {
        if let Some(slot) = grid::home_slot_at(player.x) {
            if !homes[slot] {
                return CollisionOutcome::HomeReached { slot };
            }
        }
    }

    CollisionOutcome::Clear
}

/// Keep the player inside the grid. Columns are only clamped off the water,
/// where leaving the screen is a death instead.
pub fn clamp_player(player: &mut Player) {
    player.y = grid::clamp_row(player.y);
    if !is_water_row(player.y) {
        player.x = grid::clamp_column(player.x);
    }
}
