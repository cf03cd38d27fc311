//! Obstacle spawn cadences
//!
//! Spawning runs on its own schedule, outside the per-frame tick. In the browser
//! each kind gets a real timer; headless drivers use [`SpawnTimer`] to emulate
//! one from frame times.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::ObstacleKind;
use crate::tuning::Tuning;

/// Shortest allowed delay between two spawns of one kind (ms)
pub const MIN_CADENCE_MS: f64 = 1.0;

/// How long to wait between two spawns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cadence {
    /// Repeating interval (ms)
    Fixed(f64),
    /// Fresh delay drawn uniformly from `[min_ms, max_ms)` after every spawn
    Uniform { min_ms: f64, max_ms: f64 },
}

impl Cadence {
    /// Delay until the next spawn (ms)
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Cadence::Fixed(ms) => ms,
            Cadence::Uniform { min_ms, max_ms } => {
                if max_ms > min_ms {
                    rng.random_range(min_ms..max_ms)
                } else {
                    min_ms
                }
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            Cadence::Fixed(ms) => ms >= MIN_CADENCE_MS,
            Cadence::Uniform { min_ms, max_ms } => min_ms >= MIN_CADENCE_MS && max_ms >= min_ms,
        }
    }
}

/// Cadence for an obstacle kind under the given tuning
pub fn cadence_for(kind: ObstacleKind, tuning: &Tuning) -> Cadence {
    match kind {
        ObstacleKind::Car => tuning.car_cadence,
        ObstacleKind::Stove => tuning.stove_cadence,
    }
}

/// Delay before the first spawn of a kind.
///
/// The first car comes right away; stoves wait a full interval.
pub fn first_delay<R: Rng + ?Sized>(kind: ObstacleKind, tuning: &Tuning, rng: &mut R) -> f64 {
    match kind {
        ObstacleKind::Car => 0.0,
        ObstacleKind::Stove => cadence_for(kind, tuning).next_delay(rng),
    }
}

/// A repeating spawn timer driven by elapsed time
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    pub kind: ObstacleKind,
    cadence: Cadence,
    remaining_ms: f64,
}

impl SpawnTimer {
    pub fn new<R: Rng + ?Sized>(kind: ObstacleKind, tuning: &Tuning, rng: &mut R) -> Self {
        Self {
            kind,
            cadence: cadence_for(kind, tuning),
            remaining_ms: first_delay(kind, tuning, rng),
        }
    }

    /// Time left until the next fire (ms)
    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    /// Advance by `dt_ms` and return how many times the timer fired.
    ///
    /// Every interval is at least [`MIN_CADENCE_MS`], so a stall of `dt_ms`
    /// fires at most `dt_ms / MIN_CADENCE_MS + 1` times.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt_ms: f64, rng: &mut R) -> u32 {
        self.remaining_ms -= dt_ms;
        let mut fires: u32 = 0;
        while self.remaining_ms <= 0.0 {
            fires = fires.saturating_add(1);
            self.remaining_ms += self.cadence.next_delay(rng).max(MIN_CADENCE_MS);
        }
        fires
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_uniform_delay_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let cadence = Cadence::Uniform {
            min_ms: 2000.0,
            max_ms: 5000.0,
        };
        for _ in 0..500 {
            let d = cadence.next_delay(&mut rng);
            assert!((2000.0..5000.0).contains(&d));
        }
    }

    #[test]
    fn test_degenerate_uniform() {
        let mut rng = Pcg32::seed_from_u64(7);
        let cadence = Cadence::Uniform {
            min_ms: 300.0,
            max_ms: 300.0,
        };
        assert_eq!(cadence.next_delay(&mut rng), 300.0);
    }

    #[test]
    fn test_car_fires_immediately() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut timer = SpawnTimer::new(ObstacleKind::Car, &Tuning::default(), &mut rng);
        assert_eq!(timer.advance(16.0, &mut rng), 1);
        assert!(timer.remaining_ms() > 1900.0);
    }

    #[test]
    fn test_stove_interval() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut timer = SpawnTimer::new(ObstacleKind::Stove, &Tuning::default(), &mut rng);
        assert_eq!(timer.advance(3999.0, &mut rng), 0);
        assert_eq!(timer.advance(1.0, &mut rng), 1);
        // A long stall catches up on every missed interval
        assert_eq!(timer.advance(8000.0, &mut rng), 2);
    }

    #[test]
    fn test_tiny_cadence_is_floored() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut timer = SpawnTimer {
            kind: ObstacleKind::Stove,
            cadence: Cadence::Fixed(1e-20),
            remaining_ms: 0.0,
        };
        // One fire due now, then one per floored millisecond
        assert_eq!(timer.advance(16.0, &mut rng), 17);
        assert!(timer.remaining_ms() > 0.0);
    }

    #[test]
    fn test_sub_millisecond_cadence_invalid() {
        assert!(!Cadence::Fixed(0.5).is_valid());
        assert!(!Cadence::Fixed(1e-20).is_valid());
        assert!(
            !Cadence::Uniform {
                min_ms: 1e-9,
                max_ms: 10.0
            }
            .is_valid()
        );
        assert!(Cadence::Fixed(MIN_CADENCE_MS).is_valid());
    }
}
