//! Headless driver
//!
//! Runs the simulation without a browser: emulated spawn timers, one tick per
//! frame and an optional autopilot. Same seed and frame times give the same run.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spawn::SpawnTimer;
use super::state::{GameEvent, GamePhase, GameState, ObstacleKind};
use super::tick::tick;
use crate::tuning::Tuning;

/// Plays the game: jumps over approaching cars, fast-falls once they pass
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Jump when a car is this many of its own ticks away
    pub lead_ticks: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self { lead_ticks: 4.0 }
    }
}

impl Autopilot {
    pub fn steer(&self, state: &mut GameState) {
        let ch = state.character.bounds();

        // Nearest car that has not fully passed the character
        let next_car = state
            .cars
            .iter()
            .filter(|car| car.bounds().right() > ch.left())
            .min_by(|a, b| {
                a.pos
                    .x
                    .partial_cmp(&b.pos.x)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if !state.character.is_jumping {
            if let Some(car) = next_car {
                let gap = car.bounds().left() - ch.right();
                if (0.0..=car.speed * self.lead_ticks).contains(&gap) {
                    state.jump();
                }
            }
        } else if state.character.dy > 0.0
            && next_car.is_none_or(|car| car.bounds().left() > ch.right())
        {
            // Falling with nothing underneath
            state.fast_fall();
        }
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub score: u32,
    pub jumps: u32,
    pub cars_spawned: u32,
    pub stoves_spawned: u32,
    pub phase: GamePhase,
}

/// A game plus everything needed to drive it without a browser
pub struct Session {
    pub state: GameState,
    seed: u64,
    rng: Pcg32,
    timers: [SpawnTimer; 2],
    autopilot: Option<Autopilot>,
    ticks: u64,
    jumps: u32,
    cars_spawned: u32,
    stoves_spawned: u32,
}

impl Session {
    pub fn new(width: f32, height: f32, tuning: Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let timers = [
            SpawnTimer::new(ObstacleKind::Car, &tuning, &mut rng),
            SpawnTimer::new(ObstacleKind::Stove, &tuning, &mut rng),
        ];
        Self {
            state: GameState::new(width, height, tuning),
            seed,
            rng,
            timers,
            autopilot: None,
            ticks: 0,
            jumps: 0,
            cars_spawned: 0,
            stoves_spawned: 0,
        }
    }

    pub fn with_autopilot(mut self, autopilot: Autopilot) -> Self {
        self.autopilot = Some(autopilot);
        self
    }

    /// One frame: due spawns, autopilot, tick. Returns whether the loop continues.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        for timer in &mut self.timers {
            let fires = timer.advance(dt_ms, &mut self.rng);
            for _ in 0..fires {
                if self.state.spawn(timer.kind, &mut self.rng) {
                    match timer.kind {
                        ObstacleKind::Car => self.cars_spawned += 1,
                        ObstacleKind::Stove => self.stoves_spawned += 1,
                    }
                }
            }
        }

        if let Some(autopilot) = &self.autopilot {
            autopilot.steer(&mut self.state);
        }

        if self.state.is_playing() {
            self.ticks += 1;
        }
        let running = tick(&mut self.state, dt_ms as f32);

        for event in self.state.drain_events() {
            match event {
                GameEvent::Jumped => self.jumps += 1,
                GameEvent::PointScored { score } => log::debug!("Stove collected ({score})"),
                other => log::debug!("{:?}", other),
            }
        }
        running
    }

    /// Start the game and play until game over or `max_ticks` frames
    pub fn run(&mut self, max_ticks: u64, dt_ms: f64) -> RunSummary {
        self.state.start();
        for _ in 0..max_ticks {
            if !self.advance(dt_ms) {
                break;
            }
        }
        self.summary()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            ticks: self.ticks,
            score: self.state.score,
            jumps: self.jumps,
            cars_spawned: self.cars_spawned,
            stoves_spawned: self.stoves_spawned,
            phase: self.state.phase,
        }
    }
}
