//! Lane motion for vehicles and platforms
//!
//! Speeds are stored in cells per 60 Hz tick, so each step scales by
//! `elapsed * 60` to stay frame-rate independent.

use super::state::{Platform, Vehicle};
use crate::consts::*;

/// Move a lane entity and wrap it around the screen edge it left through
#[inline]
pub fn drift(x: f32, speed: f32, direction: i32, elapsed: f32, margin: f32) -> f32 {
    let x = x + speed * elapsed * TICKS_PER_SECOND;
    let width = GRID_WIDTH as f32;
    if direction > 0 && x > width + margin {
        -margin
    } else if direction < 0 && x < -margin {
        width + margin
    } else {
        x
    }
}

impl Vehicle {
    pub fn advance(&mut self, elapsed: f32) {
        self.x = drift(self.x, self.speed, self.direction, elapsed, VEHICLE_WRAP_MARGIN);
    }
}

impl Platform {
    pub fn advance(&mut self, elapsed: f32) {
        self.x = drift(self.x, self.speed, self.direction, elapsed, PLATFORM_WRAP_MARGIN);
    }
}

/// Advance every vehicle and platform by `elapsed` seconds
pub fn advance(vehicles: &mut [Vehicle], platforms: &mut [Platform], elapsed: f32) {
    for vehicle in vehicles.iter_mut() {
        vehicle.advance(elapsed);
    }
    for platform in platforms.iter_mut() {
        platform.advance(elapsed);
    }
}
