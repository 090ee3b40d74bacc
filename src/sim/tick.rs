//! Run state transitions
//!
//! The host drives the simulation through four entry points:
//! [`start_new_game`], [`tick`] once per frame, [`on_second_elapsed`] once
//! per wall-clock second, and [`request_move`] whenever input arrives.

use super::collision::{self, CollisionOutcome};
use super::level;
use super::motion;
use super::movement::{self, Landing, MoveOutcome, MoveRejection};
use super::occupancy;
use super::state::{
    Banner, DeathCause, Direction, GameEvent, GamePhase, GameState, find_platform,
};
use crate::consts::*;

/// What became of a move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Not running, or still inside the move cooldown
    Ignored,
    /// Blocked by the grid edge; only the facing changed
    Turned,
    /// The player moved
    Moved,
    /// The move was fatal
    Died(MoveRejection),
}

/// Reset the run and enter `Running` on a freshly built level 1
pub fn start_new_game(state: &mut GameState) {
    state.score = 0;
    state.lives = STARTING_LIVES;
    state.level = 1;
    state.timer = LEVEL_TIME_SECS;
    state.homes = [false; HOME_SLOTS];
    state.message = None;
    state.death_flash_until = None;
    state.last_death = None;
    state.last_move_at = None;
    state.phase = GamePhase::Running;
    init_level(state);

    log::info!("New game started (seed {})", state.seed);
}

/// Rebuild every lane and put the player back at spawn
fn init_level(state: &mut GameState) {
    let layout = level::build_level(state.level, &mut state.rng, &mut state.ids);
    state.vehicles = layout.vehicles;
    state.platforms = layout.platforms;
    state.npcs = layout.npcs;
    state.player.reset_to_spawn();

    log::debug!(
        "Level {} built: {} vehicles, {} platforms, {} turtles",
        state.level,
        state.vehicles.len(),
        state.platforms.len(),
        state.npcs.len()
    );
}

/// Advance the simulation by `elapsed` seconds of host time
pub fn tick(state: &mut GameState, elapsed: f32) {
    let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
    state.clock += elapsed as f64;
    expire_transients(state);

    if state.phase != GamePhase::Running {
        return;
    }

    // Long stalls (background tab, debugger) must not teleport entities
    let step = elapsed.min(state.settings.max_step_secs);
    motion::advance(&mut state.vehicles, &mut state.platforms, step);
    occupancy::refresh_positions(&mut state.npcs, &state.platforms);

    if let Some(cause) = collision::carry_rider(&mut state.player, &state.platforms) {
        on_player_death(state, cause);
        return;
    }

    match collision::evaluate(&state.player, &state.vehicles, &state.homes) {
        CollisionOutcome::Clear => {}
        CollisionOutcome::Fatal(cause) => {
            on_player_death(state, cause);
            return;
        }
        CollisionOutcome::HomeReached { slot } => on_home_reached(state, slot),
    }

    collision::clamp_player(&mut state.player);
}

fn expire_transients(state: &mut GameState) {
    let now = state.clock;
    if state.message.as_ref().is_some_and(|b| now >= b.expires_at) {
        state.message = None;
    }
    if state.death_flash_until.is_some_and(|until| now >= until) {
        state.death_flash_until = None;
    }
}

/// Count the level timer down by one second
pub fn on_second_elapsed(state: &mut GameState) {
    if state.phase != GamePhase::Running {
        return;
    }

    state.timer = state.timer.saturating_sub(1);
    // The timer isn't refilled, so every further second at zero costs a life
    if state.timer == 0 {
        on_player_death(state, DeathCause::TimeUp);
    }
}

/// Lose a life. The timer keeps its value.
pub fn on_player_death(state: &mut GameState, cause: DeathCause) {
    if state.phase != GamePhase::Running {
        return;
    }

    let event = match cause {
        DeathCause::StruckByVehicle => GameEvent::VehicleStrike,
        DeathCause::Drowned | DeathCause::Misstep(_) => GameEvent::Drowned,
        DeathCause::CarriedOffScreen => GameEvent::CarriedOffScreen,
        DeathCause::TimeUp => GameEvent::TimeUp,
    };
    state.emit(event);

    state.last_death = Some(cause);
    state.death_flash_until = Some(state.clock + state.settings.death_flash_secs as f64);
    state.lives = state.lives.saturating_sub(1);
    state.player.reset_to_spawn();

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.emit(GameEvent::GameOver {
            score: state.score,
            level: state.level,
        });
        log::info!("Game over: score {}, level {}", state.score, state.level);
    } else {
        log::debug!("Player died ({cause}), {} lives left", state.lives);
    }
}

fn on_home_reached(state: &mut GameState, slot: usize) {
    let points = HOME_BASE_POINTS + state.timer as u64 * HOME_POINTS_PER_SECOND;
    state.homes[slot] = true;
    state.score += points;
    state.player.reset_to_spawn();
    state.emit(GameEvent::HomeReached { slot, points });
    log::debug!("Home {slot} reached for {points} points");

    if state.homes.iter().all(|&filled| filled) {
        on_level_complete(state);
    }
}

/// Advance to the next level with a bonus life and a fresh timer
pub fn on_level_complete(state: &mut GameState) {
    state.level += 1;
    state.score += LEVEL_BONUS_POINTS;
    state.lives += 1;
    state.timer = LEVEL_TIME_SECS;
    state.homes = [false; HOME_SLOTS];
    init_level(state);

    state.message = Some(Banner {
        text: format!("Level {}! +1 Life!", state.level),
        expires_at: state.clock + state.settings.level_message_secs as f64,
    });
    state.emit(GameEvent::LevelComplete { level: state.level });
    log::info!("Level complete, now on level {}", state.level);
}

/// Handle a movement key / swipe
pub fn request_move(state: &mut GameState, direction: Direction) -> MoveResult {
    if state.phase != GamePhase::Running {
        return MoveResult::Ignored;
    }
    if let Some(last) = state.last_move_at {
        if state.clock - last < state.settings.move_cooldown_secs() {
            return MoveResult::Ignored;
        }
    }

    let (x, y) = (state.player.x, state.player.y);
    let (new_x, new_y) = match direction {
        Direction::Up => (x, (y - 1).max(0)),
        Direction::Down => (x, (y + 1).min(GRID_HEIGHT - 1)),
        Direction::Left => ((x - 1.0).max(0.0), y),
        Direction::Right => ((x + 1.0).min((GRID_WIDTH - 1) as f32), y),
    };
    state.player.facing = direction;

    if new_x == x && new_y == y {
        return MoveResult::Turned;
    }

    match movement::validate_move(&state.platforms, &state.npcs, &state.player, new_x, new_y) {
        MoveOutcome::Valid(landing) => {
            apply_landing(state, landing);
            state.last_move_at = Some(state.clock);
            log::debug!(
                "Moved {} to ({:.2}, {})",
                direction.as_str(),
                state.player.x,
                state.player.y
            );
            MoveResult::Moved
        }
        MoveOutcome::Invalid(reason) => {
            on_player_death(state, DeathCause::Misstep(reason));
            MoveResult::Died(reason)
        }
    }
}

fn apply_landing(state: &mut GameState, landing: Landing) {
    let old_y = state.player.y;
    let player = &mut state.player;
    player.x = landing.x;
    player.y = landing.y;
    player.slot = landing.slot;

    match landing.platform.and_then(|id| find_platform(&state.platforms, id)) {
        Some(platform) => player.board(platform, landing.slot),
        // Staying in the row (clamped sideways step) keeps the ride
        None if landing.y != old_y => player.dismount(),
        None => {}
    }

    if landing.y < old_y {
        state.score += FORWARD_HOP_POINTS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Npc, Platform, PlatformId, PlatformKind, Vehicle, VehicleKind};

    const DT: f32 = 1.0 / 60.0;

    /// A running game with empty lanes
    fn running() -> GameState {
        let mut state = GameState::new(12345);
        start_new_game(&mut state);
        state.vehicles.clear();
        state.platforms.clear();
        state.npcs.clear();
        state.drain_events();
        state
    }

    fn still_platform(id: u32, x: f32, y: i32, kind: PlatformKind, width: f32) -> Platform {
        Platform {
            id: PlatformId(id),
            x,
            y,
            kind,
            direction: 1,
            speed: 0.0,
            width,
        }
    }

    /// Step past the move cooldown
    fn wait(state: &mut GameState) {
        for _ in 0..6 {
            tick(state, DT);
        }
    }

    #[test]
    fn test_start_new_game_is_idempotent() {
        let mut state = GameState::new(1);
        start_new_game(&mut state);
        state.score = 4321;
        state.lives = 1;
        state.level = 5;
        state.timer = 12;
        state.homes[1] = true;

        start_new_game(&mut state);
        start_new_game(&mut state);
        assert_eq!(state.phase(), GamePhase::Running);
        assert_eq!(state.score(), 0);
        assert_eq!(state.lives(), 3);
        assert_eq!(state.level(), 1);
        assert_eq!(state.timer(), 90);
        assert_eq!(state.homes(), &[false; HOME_SLOTS]);
        assert_eq!(state.player().x, SPAWN_X);
        assert_eq!(state.player().y, SPAWN_Y);
        assert_eq!(state.vehicles().len(), 12);
        assert!(!state.platforms().is_empty());
    }

    #[test]
    fn test_not_started_ignores_input() {
        let mut state = GameState::new(1);
        assert_eq!(request_move(&mut state, Direction::Up), MoveResult::Ignored);
        tick(&mut state, DT);
        on_second_elapsed(&mut state);
        assert_eq!(state.timer(), LEVEL_TIME_SECS);
        assert_eq!(state.player().y, SPAWN_Y);
    }

    #[test]
    fn test_hop_up_across_road_onto_single_logs() {
        let mut state = running();
        state.platforms = vec![
            still_platform(1, 6.5, 5, PlatformKind::Log, 2.0),
            still_platform(2, 6.0, 4, PlatformKind::Log, 2.0),
        ];

        for _ in 0..7 {
            assert_eq!(request_move(&mut state, Direction::Up), MoveResult::Moved);
            wait(&mut state);
        }

        let player = state.player();
        assert_eq!(player.y, 4);
        assert_eq!(player.riding, Some(PlatformId(2)));
        assert!((player.x - 6.5).abs() < 1e-6);
        assert_eq!(state.score(), 7 * FORWARD_HOP_POINTS);
        assert_eq!(state.lives(), 3);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_hop_into_open_water_drowns() {
        let mut state = running();
        state.platforms = vec![still_platform(1, 6.5, 5, PlatformKind::Log, 2.0)];
        for _ in 0..6 {
            request_move(&mut state, Direction::Up);
            wait(&mut state);
        }
        assert_eq!(state.player().y, 5);

        let result = request_move(&mut state, Direction::Up);
        assert_eq!(result, MoveResult::Died(MoveRejection::NoPlatform));
        assert_eq!(state.drain_events(), vec![GameEvent::Drowned]);
        assert_eq!(state.lives(), 2);
        assert_eq!(state.player().y, SPAWN_Y);
    }

    #[test]
    fn test_water_row_without_ride_drowns_on_tick() {
        let mut state = running();
        state.player.y = 3;
        tick(&mut state, DT);
        assert_eq!(state.drain_events(), vec![GameEvent::Drowned]);
        assert_eq!(state.last_death(), Some(DeathCause::Drowned));
    }

    #[test]
    fn test_step_onto_occupied_pad_dies() {
        let mut state = running();
        state.platforms = vec![still_platform(
            1,
            4.0,
            3,
            PlatformKind::LilyPads { group_size: 2 },
            2.0,
        )];
        state.npcs = vec![Npc {
            platform: PlatformId(1),
            slot: 1,
            x: 5.0,
            y: 3,
        }];
        state.player.x = 4.0;
        state.player.y = 3;
        state.player.riding = Some(PlatformId(1));
        state.player.slot = 0;

        let result = request_move(&mut state, Direction::Right);
        assert_eq!(result, MoveResult::Died(MoveRejection::Occupied));
        assert_eq!(state.lives(), 2);
        assert_eq!(
            state.last_death(),
            Some(DeathCause::Misstep(MoveRejection::Occupied))
        );
    }

    #[test]
    fn test_sideways_on_single_log_dies() {
        let mut state = running();
        state.platforms = vec![still_platform(1, 6.0, 2, PlatformKind::Log, 2.0)];
        state.player.x = 6.5;
        state.player.y = 2;
        state.player.riding = Some(PlatformId(1));
        state.player.ride_offset = 0.5;

        let result = request_move(&mut state, Direction::Left);
        assert_eq!(result, MoveResult::Died(MoveRejection::SidewaysOnSingleLog));
    }

    #[test]
    fn test_double_log_step_is_carried() {
        let mut state = running();
        let mut log = still_platform(1, 4.0, 3, PlatformKind::Log, 4.0);
        log.speed = 0.03;
        state.platforms = vec![log];
        state.player.x = 5.5;
        state.player.y = 3;
        state.player.riding = Some(PlatformId(1));
        state.player.ride_offset = 1.5;

        assert_eq!(request_move(&mut state, Direction::Right), MoveResult::Moved);
        assert!((state.player().ride_offset - 2.5).abs() < 1e-6);

        tick(&mut state, DT);
        let platform_x = state.platforms()[0].x;
        assert!((state.player().x - (platform_x + 2.5)).abs() < 1e-5);
    }

    #[test]
    fn test_lily_pad_rider_follows_group() {
        let mut state = running();
        let mut pads = still_platform(1, 8.0, 4, PlatformKind::LilyPads { group_size: 3 }, 3.0);
        pads.direction = -1;
        pads.speed = -0.02;
        state.platforms = vec![pads];
        state.player.x = 9.0;
        state.player.y = 4;
        state.player.riding = Some(PlatformId(1));
        state.player.slot = 1;

        for _ in 0..30 {
            tick(&mut state, DT);
        }
        let platform_x = state.platforms()[0].x;
        assert!((platform_x - 7.4).abs() < 1e-4);
        assert!((state.player().x - (platform_x + 1.0)).abs() < 1e-6);
        assert_eq!(state.lives(), 3);
    }

    #[test]
    fn test_carried_off_screen_before_drowning() {
        let mut state = running();
        let mut log = still_platform(1, -0.45, 2, PlatformKind::Log, 2.0);
        log.direction = -1;
        log.speed = -0.05;
        state.platforms = vec![log];
        state.player.x = -0.05;
        state.player.y = 2;
        state.player.riding = Some(PlatformId(1));
        state.player.ride_offset = 0.4;

        tick(&mut state, DT);
        assert_eq!(state.drain_events(), vec![GameEvent::CarriedOffScreen]);
        assert_eq!(state.last_death(), Some(DeathCause::CarriedOffScreen));
    }

    fn rider_on_rightward_log(ride_offset: f32) -> GameState {
        let mut state = running();
        let mut log = still_platform(1, 14.0, 4, PlatformKind::Log, 4.0);
        log.speed = 0.25;
        state.platforms = vec![log];
        state.player.x = 14.0 + ride_offset;
        state.player.y = 4;
        state.player.riding = Some(PlatformId(1));
        state.player.ride_offset = ride_offset;
        state
    }

    #[test]
    fn test_carried_past_right_edge() {
        // 0.25 cells/tick * 60 * 1/32 s = 0.46875 cells, landing the rider on 16.0
        let mut state = rider_on_rightward_log(1.53125);
        tick(&mut state, 0.03125);
        assert_eq!(state.drain_events(), vec![GameEvent::CarriedOffScreen]);
        assert_eq!(state.last_death(), Some(DeathCause::CarriedOffScreen));
        assert_eq!(state.lives(), 2);

        let mut state = rider_on_rightward_log(1.52125);
        tick(&mut state, 0.03125);
        assert!(state.drain_events().is_empty());
        assert!(state.player().x < 16.0);
        assert_eq!(state.player().riding, Some(PlatformId(1)));
        assert_eq!(state.lives(), 3);
    }

    #[test]
    fn test_vehicle_strike() {
        let mut state = running();
        state.vehicles = vec![Vehicle {
            x: 7.5,
            y: 9,
            kind: VehicleKind::Bus,
            direction: 1,
            speed: 0.0,
            width: 1.0,
        }];
        state.player.y = 9;
        tick(&mut state, DT);
        assert_eq!(state.drain_events(), vec![GameEvent::VehicleStrike]);
        assert_eq!(state.player().y, SPAWN_Y);
        assert!(state.death_flash_active());

        for _ in 0..11 {
            tick(&mut state, 0.05);
        }
        assert!(!state.death_flash_active());
    }

    #[test]
    fn test_last_life_ends_game_and_freezes_timer() {
        let mut state = running();
        state.lives = 1;
        state.timer = 40;
        on_player_death(&mut state, DeathCause::StruckByVehicle);

        assert_eq!(state.lives(), 0);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::VehicleStrike,
                GameEvent::GameOver { score: 0, level: 1 }
            ]
        );

        for _ in 0..5 {
            on_second_elapsed(&mut state);
            tick(&mut state, DT);
        }
        assert_eq!(state.timer(), 40);
        assert_eq!(request_move(&mut state, Direction::Up), MoveResult::Ignored);
    }

    #[test]
    fn test_death_preserves_timer() {
        let mut state = running();
        state.timer = 57;
        on_player_death(&mut state, DeathCause::Drowned);
        assert_eq!(state.timer(), 57);
        assert_eq!(state.lives(), 2);
    }

    #[test]
    fn test_timer_runs_out() {
        let mut state = running();
        state.timer = 2;
        on_second_elapsed(&mut state);
        assert_eq!(state.timer(), 1);
        on_second_elapsed(&mut state);
        assert_eq!(state.lives(), 2);
        assert_eq!(state.last_death(), Some(DeathCause::TimeUp));
        assert_eq!(state.timer(), 0);
        assert_eq!(state.drain_events(), vec![GameEvent::TimeUp]);

        // Still out of time: the next second costs another life
        on_second_elapsed(&mut state);
        assert_eq!(state.lives(), 1);
        assert_eq!(state.timer(), 0);
        on_second_elapsed(&mut state);
        assert_eq!(state.lives(), 0);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::TimeUp,
                GameEvent::TimeUp,
                GameEvent::GameOver { score: 0, level: 1 }
            ]
        );
    }

    #[test]
    fn test_home_arrival_scores_and_respawns() {
        let mut state = running();
        state.timer = 30;
        state.player.x = 7.0;
        state.player.y = 0;
        tick(&mut state, DT);

        assert_eq!(state.homes(), &[false, false, true, false, false]);
        assert_eq!(state.score(), 50 + 30 * 10);
        assert_eq!(state.player().y, SPAWN_Y);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::HomeReached { slot: 2, points: 350 }]
        );
    }

    #[test]
    fn test_filled_home_stays_filled() {
        let mut state = running();
        state.player.x = 1.0;
        state.player.y = 0;
        tick(&mut state, DT);
        assert!(state.homes()[0]);

        on_player_death(&mut state, DeathCause::Drowned);
        on_second_elapsed(&mut state);
        for _ in 0..20 {
            tick(&mut state, DT);
        }
        assert!(state.homes()[0]);

        // Re-entering a filled home does nothing
        state.player.x = 2.0;
        state.player.y = 0;
        let score = state.score();
        tick(&mut state, DT);
        assert_eq!(state.score(), score);
        assert_eq!(state.player().y, 0);
        assert!(state.homes()[0]);
    }

    #[test]
    fn test_filling_last_home_completes_level_once() {
        let mut state = running();
        state.homes = [true, true, true, true, false];
        state.timer = 20;
        state.score = 100;
        state.player.x = 14.0;
        state.player.y = 0;
        tick(&mut state, DT);

        assert_eq!(state.level(), 2);
        assert_eq!(state.lives(), 4);
        assert_eq!(state.timer(), LEVEL_TIME_SECS);
        assert_eq!(state.homes(), &[false; HOME_SLOTS]);
        assert_eq!(state.score(), 100 + 250 + LEVEL_BONUS_POINTS);
        assert_eq!(state.message(), Some("Level 2! +1 Life!"));
        assert_eq!(state.vehicles().len(), 12);

        let completions = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::LevelComplete { .. }))
            .count();
        assert_eq!(completions, 1);

        // Banner expires after two seconds
        for _ in 0..41 {
            tick(&mut state, 0.05);
        }
        assert_eq!(state.message(), None);
    }

    #[test]
    fn test_restart_cancels_level_banner() {
        let mut state = running();
        on_level_complete(&mut state);
        assert!(state.message().is_some());
        start_new_game(&mut state);
        assert_eq!(state.message(), None);
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn test_move_cooldown() {
        let mut state = running();
        assert_eq!(request_move(&mut state, Direction::Up), MoveResult::Moved);
        assert_eq!(request_move(&mut state, Direction::Up), MoveResult::Ignored);
        tick(&mut state, 0.05);
        assert_eq!(request_move(&mut state, Direction::Up), MoveResult::Ignored);
        tick(&mut state, 0.05);
        assert_eq!(request_move(&mut state, Direction::Up), MoveResult::Moved);
        assert_eq!(state.player().y, 9);
    }

    #[test]
    fn test_blocked_move_only_turns() {
        let mut state = running();
        assert_eq!(request_move(&mut state, Direction::Down), MoveResult::Turned);
        assert_eq!(state.player().facing, Direction::Down);
        // Turning doesn't start the cooldown
        assert_eq!(request_move(&mut state, Direction::Left), MoveResult::Moved);
        assert_eq!(state.player().x, SPAWN_X - 1.0);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_tick_clamps_large_steps() {
        let mut state = running();
        state.vehicles = vec![Vehicle {
            x: 2.0,
            y: 8,
            kind: VehicleKind::Car,
            direction: 1,
            speed: 0.05,
            width: 1.0,
        }];
        tick(&mut state, 5.0);
        // 0.05 cells/tick * 60 * 0.05 s
        assert!((state.vehicles()[0].x - 2.15).abs() < 1e-5);
        assert!((state.clock() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_elapsed_is_ignored() {
        let mut state = running();
        state.vehicles = vec![Vehicle {
            x: 2.0,
            y: 8,
            kind: VehicleKind::Car,
            direction: 1,
            speed: 0.05,
            width: 1.0,
        }];
        tick(&mut state, -1.0);
        tick(&mut state, f32::NAN);
        assert_eq!(state.vehicles()[0].x, 2.0);
        assert_eq!(state.clock(), 0.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = GameState::new(777);
        let mut b = GameState::new(777);
        start_new_game(&mut a);
        start_new_game(&mut b);
        for i in 0..300 {
            if i % 20 == 0 {
                request_move(&mut a, Direction::Up);
                request_move(&mut b, Direction::Up);
            }
            tick(&mut a, DT);
            tick(&mut b, DT);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
