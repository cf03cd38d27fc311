//! Per-frame simulation tick
//!
//! Motion is per tick (one tick per display refresh). Elapsed real time is
//! only used for the landing delay.

use super::state::{AnimFrame, Character, GameEvent, GamePhase, GameState, Obstacle};
use crate::tuning::Tuning;

/// Advance the game by one frame.
///
/// Returns `true` while the loop should keep running; the driver requests the
/// next frame only then.
pub fn tick(state: &mut GameState, dt_ms: f32) -> bool {
    if !state.is_playing() {
        return false;
    }

    integrate(&mut state.character, &state.tuning, state.playfield.ground_level);
    update_animation(&mut state.character, &state.tuning, dt_ms);

    advance_obstacles(&mut state.cars);
    advance_obstacles(&mut state.stoves);

    let player = state.character.bounds();

    if state.cars.iter().any(|car| car.bounds().overlaps(&player)) {
        state.phase = GamePhase::GameOver;
        state.push_event(GameEvent::GameOver { score: state.score });
        log::info!("Game over with score {}", state.score);
        return false;
    }

    let before = state.stoves.len();
    state.stoves.retain(|stove| !stove.bounds().overlaps(&player));
    for _ in state.stoves.len()..before {
        state.score += 1;
        state.push_event(GameEvent::PointScored { score: state.score });
    }

    true
}

/// Gravity, vertical motion and the ground clamp
fn integrate(ch: &mut Character, tuning: &Tuning, ground_level: f32) {
    if ch.fast_fall {
        ch.dy += tuning.gravity * tuning.fast_fall_multiplier;
    } else {
        ch.dy += tuning.gravity;
    }
    ch.pos.y += ch.dy;

    let floor = ground_level - ch.size.y;
    if ch.pos.y > floor {
        ch.pos.y = floor;
        ch.dy = 0.0;
        if ch.is_jumping {
            ch.is_landing = true;
            // Re-arm the landing delay from this touchdown
            ch.landing_ms_left = None;
        }
        ch.is_jumping = false;
        ch.fast_fall = false;
    }
}

/// Pick the animation frame and run the landing delay
fn update_animation(ch: &mut Character, tuning: &Tuning, dt_ms: f32) {
    if let Some(left) = ch.landing_ms_left {
        let left = left - dt_ms;
        if left <= 0.0 {
            ch.is_landing = false;
            ch.landing_ms_left = None;
        } else {
            ch.landing_ms_left = Some(left);
        }
    }

    ch.frame = if ch.is_jumping {
        AnimFrame::MidAir
    } else if ch.is_landing {
        if ch.landing_ms_left.is_none() {
            ch.landing_ms_left = Some(tuning.landing_delay_ms);
        }
        AnimFrame::Landing
    } else if ch.is_idle {
        AnimFrame::Idle
    } else if ch.frame_counter % tuning.walk_cycle_frames < tuning.walk_first_half {
        AnimFrame::Walk1
    } else {
        AnimFrame::Walk2
    };
    ch.frame_counter += 1;
}

/// Scroll left and drop whatever has fully left the screen
fn advance_obstacles(obstacles: &mut Vec<Obstacle>) {
    for obstacle in obstacles.iter_mut() {
        obstacle.pos.x -= obstacle.speed;
    }
    obstacles.retain(|o| !o.is_offscreen());
}

impl GameState {
    /// Jump control. Only one jump per ground contact.
    ///
    /// Returns true if a jump started.
    pub fn jump(&mut self) -> bool {
        if !self.is_playing() || self.character.is_jumping {
            return false;
        }
        self.character.dy = self.tuning.jump_velocity;
        self.character.is_jumping = true;
        self.push_event(GameEvent::Jumped);
        true
    }

    /// Fast-fall control. Only meaningful while airborne.
    pub fn fast_fall(&mut self) -> bool {
        if !self.is_playing() || !self.character.is_jumping {
            return false;
        }
        self.character.fast_fall = true;
        true
    }

    /// Start over: empty field, zero score, character on the ground
    pub fn reset(&mut self) {
        self.cars.clear();
        self.stoves.clear();
        self.score = 0;
        self.phase = GamePhase::Playing;
        self.character.land_at_rest(&self.playfield);
        self.character.is_idle = false;
        self.push_event(GameEvent::Restarted);
        log::info!("Game restarted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::state::ObstacleKind;
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = FRAME_MS as f32;

    fn playing() -> GameState {
        let mut state = GameState::new(1000.0, 500.0, Tuning::default());
        state.start();
        state.drain_events();
        state
    }

    fn obstacle_at(state: &GameState, kind: ObstacleKind, pos: Vec2) -> Obstacle {
        let mut o = state.make_obstacle(kind, 3.0);
        o.pos = pos;
        o
    }

    fn floor(state: &GameState) -> f32 {
        state.playfield.ground_level - state.character.size.y
    }

    #[test]
    fn test_tick_skipped_before_start() {
        let mut state = GameState::new(1000.0, 500.0, Tuning::default());
        let before = state.character.clone();
        assert!(!tick(&mut state, DT));
        assert_eq!(state.character.frame_counter, before.frame_counter);
        assert_eq!(state.character.pos, before.pos);
    }

    #[test]
    fn test_jump_and_land() {
        let mut state = playing();
        assert_eq!(state.character.dy, 0.0);

        assert!(state.jump());
        assert_eq!(state.character.dy, -15.0);
        assert!(state.character.is_jumping);
        assert_eq!(state.drain_events(), vec![GameEvent::Jumped]);

        let mut ticks = 0;
        while state.character.is_jumping {
            assert!(tick(&mut state, DT));
            ticks += 1;
            assert!(ticks < 100, "never landed");
        }
        // Airtime is about 2 * 15 / 0.4 ticks
        assert!((70..=80).contains(&ticks), "landed after {ticks} ticks");
        assert_eq!(state.character.pos.y, floor(&state));
        assert_eq!(state.character.dy, 0.0);
        assert!(state.character.is_landing);
    }

    #[test]
    fn test_jump_while_airborne_is_noop() {
        let mut state = playing();
        state.jump();
        tick(&mut state, DT);
        tick(&mut state, DT);
        state.drain_events();

        let dy = state.character.dy;
        assert!(!state.jump());
        assert_eq!(state.character.dy, dy);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_fast_fall_only_airborne_and_shortens_fall() {
        let mut state = playing();
        assert!(!state.fast_fall());
        assert!(!state.character.fast_fall);

        let mut normal = state.clone();
        state.jump();
        normal.jump();
        assert!(state.fast_fall());

        let airtime = |s: &mut GameState| {
            let mut n = 0;
            while s.character.is_jumping {
                tick(s, DT);
                n += 1;
            }
            n
        };
        let fast = airtime(&mut state);
        let slow = airtime(&mut normal);
        assert!(fast < slow);
        // Cleared on landing
        assert!(!state.character.fast_fall);
    }

    #[test]
    fn test_animation_frames() {
        let mut state = playing();

        // Walk cadence: five frames of each
        let mut frames = Vec::new();
        for _ in 0..10 {
            tick(&mut state, DT);
            frames.push(state.character.frame);
        }
        assert!(frames[..5].iter().all(|f| *f == AnimFrame::Walk1));
        assert!(frames[5..].iter().all(|f| *f == AnimFrame::Walk2));

        state.jump();
        tick(&mut state, DT);
        assert_eq!(state.character.frame, AnimFrame::MidAir);
    }

    #[test]
    fn test_landing_frame_uses_real_time() {
        let mut state = playing();
        state.jump();
        while state.character.is_jumping {
            tick(&mut state, 40.0);
        }
        assert_eq!(state.character.frame, AnimFrame::Landing);

        // 40 ms frames: 60 ms left, then 20 ms left
        tick(&mut state, 40.0);
        assert_eq!(state.character.frame, AnimFrame::Landing);
        tick(&mut state, 40.0);
        assert_eq!(state.character.frame, AnimFrame::Landing);
        tick(&mut state, 40.0);
        assert!(!state.character.is_landing);
        assert!(matches!(
            state.character.frame,
            AnimFrame::Walk1 | AnimFrame::Walk2
        ));
    }

    #[test]
    fn test_landing_delay_independent_of_tick_rate() {
        let mut state = playing();
        state.jump();
        while state.character.is_jumping {
            tick(&mut state, 5.0);
        }
        // At 5 ms per frame the landing pose lasts 20 frames
        let mut landing_frames = 1;
        while state.character.is_landing {
            tick(&mut state, 5.0);
            if state.character.frame == AnimFrame::Landing {
                landing_frames += 1;
            }
        }
        assert_eq!(landing_frames, 20);
    }

    #[test]
    fn test_offscreen_obstacle_pruned() {
        let mut state = playing();
        let mut stove = obstacle_at(&state, ObstacleKind::Stove, Vec2::ZERO);
        stove.pos.x = -stove.size.x + 1.0;
        state.stoves.push(stove);
        let mut car = obstacle_at(&state, ObstacleKind::Car, Vec2::ZERO);
        car.pos.x = -car.size.x + 2.0;
        state.cars.push(car);

        tick(&mut state, DT);
        assert!(state.stoves.is_empty());
        assert!(state.cars.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_car_collision_ends_game() {
        let mut state = playing();
        let car = obstacle_at(&state, ObstacleKind::Car, state.character.pos);
        state.cars.push(car);
        // A stove overlapping at the same time must not score
        let stove = obstacle_at(&state, ObstacleKind::Stove, state.character.pos);
        state.stoves.push(stove);

        assert!(!tick(&mut state, DT));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.score, 0);
        assert_eq!(state.drain_events(), vec![GameEvent::GameOver { score: 0 }]);

        // Terminal until reset
        assert!(!tick(&mut state, DT));
        assert!(!state.jump());
    }

    #[test]
    fn test_stove_at_origin_scores() {
        let mut state = playing();
        let y = state.character.pos.y;
        let hit = obstacle_at(&state, ObstacleKind::Stove, Vec2::new(0.0, y));
        let miss = obstacle_at(&state, ObstacleKind::Stove, Vec2::new(900.0, 0.0));
        state.stoves.extend([hit, miss]);

        assert!(tick(&mut state, DT));
        assert_eq!(state.score, 1);
        assert_eq!(state.stoves.len(), 1);
        assert_eq!(state.stoves[0].pos.x, 897.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.drain_events(), vec![GameEvent::PointScored { score: 1 }]);
    }

    #[test]
    fn test_two_stoves_score_two() {
        let mut state = playing();
        let pos = state.character.pos;
        let first = obstacle_at(&state, ObstacleKind::Stove, pos);
        let second = obstacle_at(&state, ObstacleKind::Stove, pos + Vec2::new(10.0, 0.0));
        state.stoves.extend([first, second]);

        tick(&mut state, DT);
        assert_eq!(state.score, 2);
        assert!(state.stoves.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut state = playing();
        state.score = 7;
        state.jump();
        tick(&mut state, DT);
        let car = obstacle_at(&state, ObstacleKind::Car, Vec2::new(600.0, 0.0));
        let stove = obstacle_at(&state, ObstacleKind::Stove, Vec2::new(600.0, 0.0));
        state.cars.push(car);
        state.stoves.push(stove);
        state.phase = GamePhase::GameOver;
        state.drain_events();

        state.reset();
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.cars.is_empty());
        assert!(state.stoves.is_empty());
        assert_eq!(state.character.pos.y, floor(&state));
        assert!(!state.character.is_jumping);
        assert_eq!(state.drain_events(), vec![GameEvent::Restarted]);
        assert!(tick(&mut state, DT));
    }

    proptest! {
        #[test]
        fn prop_character_never_below_ground(actions in proptest::collection::vec(0u8..4, 1..400)) {
            let mut state = playing();
            for action in actions {
                match action {
                    0 => { state.jump(); }
                    1 => { state.fast_fall(); }
                    _ => {}
                }
                tick(&mut state, DT);
                prop_assert!(state.character.pos.y <= floor(&state));
            }
        }

        #[test]
        fn prop_no_offscreen_obstacles_after_tick(
            xs in proptest::collection::vec((-400.0f32..1000.0, 0.5f32..10.0), 0..20)
        ) {
            let mut state = playing();
            for (i, (x, speed)) in xs.into_iter().enumerate() {
                let kind = if i % 2 == 0 { ObstacleKind::Car } else { ObstacleKind::Stove };
                let mut o = state.make_obstacle(kind, speed);
                o.pos.x = x;
                match kind {
                    ObstacleKind::Car => state.cars.push(o),
                    ObstacleKind::Stove => state.stoves.push(o),
                }
            }
            tick(&mut state, DT);
            prop_assert!(state.cars.iter().all(|o| o.pos.x + o.size.x >= 0.0));
            prop_assert!(state.stoves.iter().all(|o| o.pos.x + o.size.x >= 0.0));
        }
    }
}
