//! Turtle Crossing headless runner
//!
//! Plays one game with a simple autopilot at a fixed 60 Hz step, logs the
//! game events and prints the final snapshot as JSON.
//!
//! Usage: `turtle-crossing [seed] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use turtle_crossing::Settings;
#[cfg(not(target_arch = "wasm32"))]
use turtle_crossing::consts::*;
#[cfg(not(target_arch = "wasm32"))]
use turtle_crossing::sim::{
    Direction, GameEvent, GamePhase, GameState, Hitbox, MoveResult, grid, movement,
    on_second_elapsed, request_move, start_new_game, tick,
};

/// Give up after this much simulated time
#[cfg(not(target_arch = "wasm32"))]
const MAX_RUN_SECS: u32 = 600;

/// Ticks the autopilot waits between decisions
#[cfg(not(target_arch = "wasm32"))]
const DECISION_TICKS: u32 = 8;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Turtle Crossing (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("Ignoring bad seed argument: {e}");
            default_seed()
        }
        None => default_seed(),
    };
    let settings_path = args.next().map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref());

    let mut state = GameState::with_settings(seed, settings);
    start_new_game(&mut state);
    log::info!("Game initialized with seed: {}", seed);

    let dt = 1.0 / TICKS_PER_SECOND;
    let ticks_per_second = TICKS_PER_SECOND as u32;

    for frame in 0..MAX_RUN_SECS * ticks_per_second {
        if frame % DECISION_TICKS == 0 {
            if let Some(direction) = autopilot(&state) {
                if let MoveResult::Died(reason) = request_move(&mut state, direction) {
                    log::debug!("Autopilot misstep: {reason}");
                }
            }
        }

        tick(&mut state, dt);
        if frame % ticks_per_second == ticks_per_second - 1 {
            on_second_elapsed(&mut state);
        }

        for event in state.drain_events() {
            log_event(&event);
        }
        if state.phase() == GamePhase::GameOver {
            break;
        }
    }

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on the web; there is no headless runner
}

#[cfg(not(target_arch = "wasm32"))]
fn default_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Hop forward when the next row looks survivable, otherwise wait
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &GameState) -> Option<Direction> {
    let player = state.player();
    let target_y = player.y - 1;
    if target_y < 0 {
        return None;
    }

    if grid::is_water_row(target_y) {
        let outcome = movement::validate_move(
            state.platforms(),
            state.npcs(),
            player,
            player.x,
            target_y,
        );
        return outcome.is_valid().then_some(Direction::Up);
    }

    if grid::is_road_row(target_y) {
        // Leave a cell of clearance on either side for the next few ticks
        let danger = Hitbox::cell(player.x, target_y);
        let danger = Hitbox {
            min: danger.min - glam::Vec2::X,
            max: danger.max + glam::Vec2::X,
        };
        let blocked = state
            .vehicles()
            .iter()
            .filter(|v| v.y == target_y)
            .any(|v| Hitbox::vehicle(v).overlaps(&danger));
        return (!blocked).then_some(Direction::Up);
    }

    Some(Direction::Up)
}

#[cfg(not(target_arch = "wasm32"))]
fn log_event(event: &GameEvent) {
    match event {
        GameEvent::HomeReached { slot, points } => {
            log::info!("Home {slot} reached (+{points})")
        }
        GameEvent::LevelComplete { level } => log::info!("Level {level}! +1 Life!"),
        GameEvent::GameOver { score, level } => {
            log::info!("Game over: score {score}, level {level}")
        }
        other => log::info!("{other:?}"),
    }
}
