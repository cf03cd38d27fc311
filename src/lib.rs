//! Bigodinho - a side-scrolling jump-and-dodge arcade game
//!
//! Core modules:
//! - `sim`: Simulation loop (physics, animation, obstacles, collisions)
//! - `tuning`: Data-driven ruleset
//! - `renderer`: Draw lists and the Canvas 2D backend
//! - `platform`: Keyboard/touch mapping
//! - `settings`: Persisted player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Canonical ruleset constants (defaults for [`Tuning`])
pub mod consts {
    /// Downward acceleration (pixels/tick²)
    pub const GRAVITY: f32 = 0.4;
    /// Gravity multiplier while fast-falling
    pub const FAST_FALL_MULTIPLIER: f32 = 5.0;
    /// Launch velocity of a jump (negative = upward, pixels/tick)
    pub const JUMP_VELOCITY: f32 = -15.0;

    /// Canvas size as a fraction of the viewport
    pub const CANVAS_WIDTH_FRACTION: f32 = 0.8;
    pub const CANVAS_HEIGHT_FRACTION: f32 = 0.7;
    /// Ground line as a fraction of canvas height
    pub const GROUND_FRACTION: f32 = 0.8;

    /// Character geometry (fractions of canvas width/height)
    pub const CHARACTER_X_FRACTION: f32 = 0.1;
    pub const CHARACTER_WIDTH_FRACTION: f32 = 0.07;
    pub const CHARACTER_HEIGHT_FRACTION: f32 = 0.1;

    /// Walk animation: frames per full cycle, and how many of them show Walk1
    pub const WALK_CYCLE_FRAMES: u64 = 10;
    pub const WALK_FIRST_HALF: u64 = 5;
    /// Real time the landing frame stays up (ms)
    pub const LANDING_DELAY_MS: f32 = 100.0;

    /// Police car geometry and motion
    pub const CAR_WIDTH_FRACTION: f32 = 0.30;
    pub const CAR_HEIGHT_FRACTION: f32 = 0.08;
    /// Distance from ground to the car's top edge (fraction of canvas height)
    pub const CAR_LIFT_FRACTION: f32 = 0.085;
    pub const CAR_MIN_SPEED: f32 = 5.0;
    pub const CAR_MAX_SPEED: f32 = 7.0;
    pub const CAR_MIN_DELAY_MS: f64 = 2000.0;
    pub const CAR_MAX_DELAY_MS: f64 = 5000.0;

    /// Stove geometry and motion
    pub const STOVE_WIDTH_FRACTION: f32 = 0.18;
    pub const STOVE_HEIGHT_FRACTION: f32 = 0.1;
    /// Distance from ground to the stove's top edge (fraction of canvas height)
    pub const STOVE_LIFT_FRACTION: f32 = 0.45;
    pub const STOVE_SPEED: f32 = 3.0;
    pub const STOVE_INTERVAL_MS: f64 = 4000.0;

    /// Nominal frame time used by headless drivers (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
}
