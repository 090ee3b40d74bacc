//! Playfield grid geometry
//!
//! Row bands are fixed for the lifetime of the game:
//! - rows 0, 1, 6, 11: grass (home strip, median, start)
//! - rows 2..=5: water, crossed on platforms
//! - rows 7..=10: road, crossed between vehicles

use serde::{Deserialize, Serialize};

use crate::consts::{GRID_HEIGHT, GRID_WIDTH, HOME_SLOTS};

/// Top row, split into home slots
pub const HOME_ROW: i32 = 0;

/// Water rows, top to bottom
pub const WATER_ROWS: [i32; 4] = [2, 3, 4, 5];

/// Road rows, top to bottom
pub const ROAD_ROWS: [i32; 4] = [7, 8, 9, 10];

/// Terrain band of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Grass,
    Water,
    Road,
}

/// Classify a row. Rows outside the grid count as grass.
pub fn band(row: i32) -> Band {
    match row {
        2..=5 => Band::Water,
        7..=10 => Band::Road,
        _ => Band::Grass,
    }
}

#[inline]
pub fn is_water_row(row: i32) -> bool {
    band(row) == Band::Water
}

#[inline]
pub fn is_road_row(row: i32) -> bool {
    band(row) == Band::Road
}

/// Clamp a row index into the grid
#[inline]
pub fn clamp_row(row: i32) -> i32 {
    row.clamp(0, GRID_HEIGHT - 1)
}

/// Clamp a column into the grid
#[inline]
pub fn clamp_column(x: f32) -> f32 {
    x.clamp(0.0, (GRID_WIDTH - 1) as f32)
}

/// Whether a column lies on screen
#[inline]
pub fn column_on_screen(x: f32) -> bool {
    x >= 0.0 && x < GRID_WIDTH as f32
}

/// Width of one home slot in cells
#[inline]
pub fn home_slot_width() -> f32 {
    GRID_WIDTH as f32 / HOME_SLOTS as f32
}

/// Home slot under a column, if the column is on the grid
pub fn home_slot_at(x: f32) -> Option<usize> {
    let slot = (x / home_slot_width()).floor();
    if slot >= 0.0 && (slot as usize) < HOME_SLOTS {
        Some(slot as usize)
    } else {
        None
    }
}
