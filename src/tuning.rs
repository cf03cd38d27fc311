//! Data-driven game balance
//!
//! Every number the simulation uses lives in [`Tuning`]. Defaults come from
//! [`crate::consts`]; a JSON document may override any subset of fields.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::spawn::Cadence;

/// Errors from loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning field `{0}` is out of range")]
    Invalid(&'static str),
}

/// Size and placement of one obstacle kind, relative to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleShape {
    pub width_fraction: f32,
    pub height_fraction: f32,
    /// Top edge sits this far above the ground (fraction of canvas height)
    pub lift_fraction: f32,
}

impl ObstacleShape {
    pub const CAR: Self = Self {
        width_fraction: CAR_WIDTH_FRACTION,
        height_fraction: CAR_HEIGHT_FRACTION,
        lift_fraction: CAR_LIFT_FRACTION,
    };

    pub const STOVE: Self = Self {
        width_fraction: STOVE_WIDTH_FRACTION,
        height_fraction: STOVE_HEIGHT_FRACTION,
        lift_fraction: STOVE_LIFT_FRACTION,
    };

    fn patched(self, patch: ShapePatch) -> Self {
        Self {
            width_fraction: patch.width_fraction.unwrap_or(self.width_fraction),
            height_fraction: patch.height_fraction.unwrap_or(self.height_fraction),
            lift_fraction: patch.lift_fraction.unwrap_or(self.lift_fraction),
        }
    }
}

/// Partial shape from a tuning document
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ShapePatch {
    width_fraction: Option<f32>,
    height_fraction: Option<f32>,
    lift_fraction: Option<f32>,
}

fn car_shape<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObstacleShape, D::Error> {
    ShapePatch::deserialize(deserializer).map(|patch| ObstacleShape::CAR.patched(patch))
}

fn stove_shape<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObstacleShape, D::Error> {
    ShapePatch::deserialize(deserializer).map(|patch| ObstacleShape::STOVE.patched(patch))
}

/// The ruleset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f32,
    pub fast_fall_multiplier: f32,
    pub jump_velocity: f32,
    pub ground_fraction: f32,
    pub character_x_fraction: f32,
    pub character_width_fraction: f32,
    pub character_height_fraction: f32,
    pub walk_cycle_frames: u64,
    pub walk_first_half: u64,
    pub landing_delay_ms: f32,

    #[serde(deserialize_with = "car_shape")]
    pub car: ObstacleShape,
    /// Car speed is drawn uniformly from `[car_min_speed, car_max_speed)`
    pub car_min_speed: f32,
    pub car_max_speed: f32,
    pub car_cadence: Cadence,

    #[serde(deserialize_with = "stove_shape")]
    pub stove: ObstacleShape,
    pub stove_speed: f32,
    pub stove_cadence: Cadence,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            fast_fall_multiplier: FAST_FALL_MULTIPLIER,
            jump_velocity: JUMP_VELOCITY,
            ground_fraction: GROUND_FRACTION,
            character_x_fraction: CHARACTER_X_FRACTION,
            character_width_fraction: CHARACTER_WIDTH_FRACTION,
            character_height_fraction: CHARACTER_HEIGHT_FRACTION,
            walk_cycle_frames: WALK_CYCLE_FRAMES,
            walk_first_half: WALK_FIRST_HALF,
            landing_delay_ms: LANDING_DELAY_MS,

            car: ObstacleShape::CAR,
            car_min_speed: CAR_MIN_SPEED,
            car_max_speed: CAR_MAX_SPEED,
            car_cadence: Cadence::Uniform {
                min_ms: CAR_MIN_DELAY_MS,
                max_ms: CAR_MAX_DELAY_MS,
            },

            stove: ObstacleShape::STOVE,
            stove_speed: STOVE_SPEED,
            stove_cadence: Cadence::Fixed(STOVE_INTERVAL_MS),
        }
    }
}

fn fraction_ok(f: f32) -> bool {
    f > 0.0 && f <= 1.0
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing fields keep their
    /// defaults, including single fields of `car` and `stove`.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse a tuning document, falling back to defaults on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning overrides: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.gravity > 0.0) {
            return Err(TuningError::Invalid("gravity"));
        }
        if !(self.fast_fall_multiplier >= 1.0) {
            return Err(TuningError::Invalid("fast_fall_multiplier"));
        }
        if !(self.jump_velocity < 0.0) {
            return Err(TuningError::Invalid("jump_velocity"));
        }
        if !fraction_ok(self.ground_fraction) {
            return Err(TuningError::Invalid("ground_fraction"));
        }
        if !(0.0..1.0).contains(&self.character_x_fraction) {
            return Err(TuningError::Invalid("character_x_fraction"));
        }
        if !fraction_ok(self.character_width_fraction) {
            return Err(TuningError::Invalid("character_width_fraction"));
        }
        if !fraction_ok(self.character_height_fraction) {
            return Err(TuningError::Invalid("character_height_fraction"));
        }
        if self.walk_cycle_frames == 0 || self.walk_first_half > self.walk_cycle_frames {
            return Err(TuningError::Invalid("walk_cycle_frames"));
        }
        if !(self.landing_delay_ms >= 0.0) {
            return Err(TuningError::Invalid("landing_delay_ms"));
        }
        for (name, shape) in [("car", &self.car), ("stove", &self.stove)] {
            if !fraction_ok(shape.width_fraction)
                || !fraction_ok(shape.height_fraction)
                || !(0.0..=1.0).contains(&shape.lift_fraction)
            {
                return Err(TuningError::Invalid(name));
            }
        }
        if !(self.car_min_speed > 0.0) || self.car_max_speed < self.car_min_speed {
            return Err(TuningError::Invalid("car_speed"));
        }
        if !(self.stove_speed > 0.0) {
            return Err(TuningError::Invalid("stove_speed"));
        }
        if !self.car_cadence.is_valid() {
            return Err(TuningError::Invalid("car_cadence"));
        }
        if !self.stove_cadence.is_valid() {
            return Err(TuningError::Invalid("stove_cadence"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.6, "stove_speed": 4.0 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.6);
        assert_eq!(tuning.stove_speed, 4.0);
        assert_eq!(tuning.jump_velocity, JUMP_VELOCITY);
        assert_eq!(tuning.stove_cadence, Cadence::Fixed(STOVE_INTERVAL_MS));
    }

    #[test]
    fn test_partial_shape_override() {
        let tuning =
            Tuning::from_json(r#"{ "gravity": 0.6, "car": { "width_fraction": 0.2 } }"#).unwrap();
        assert_eq!(tuning.gravity, 0.6);
        assert_eq!(tuning.car.width_fraction, 0.2);
        assert_eq!(tuning.car.height_fraction, CAR_HEIGHT_FRACTION);
        assert_eq!(tuning.car.lift_fraction, CAR_LIFT_FRACTION);
        assert_eq!(tuning.stove, ObstacleShape::STOVE);
    }

    #[test]
    fn test_rejects_sub_millisecond_cadence() {
        assert!(matches!(
            Tuning::from_json(r#"{ "stove_cadence": { "Fixed": 1e-20 } }"#),
            Err(TuningError::Invalid("stove_cadence"))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "car_cadence": { "Uniform": { "min_ms": 0.5, "max_ms": 10.0 } } }"#),
            Err(TuningError::Invalid("car_cadence"))
        ));
    }

    #[test]
    fn test_cadence_override() {
        let tuning =
            Tuning::from_json(r#"{ "car_cadence": { "Fixed": 1500.0 } }"#).unwrap();
        assert_eq!(tuning.car_cadence, Cadence::Fixed(1500.0));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            Tuning::from_json("{ gravity: "),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            Tuning::from_json(r#"{ "jump_velocity": 3.0 }"#),
            Err(TuningError::Invalid("jump_velocity"))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "car_min_speed": 8.0, "car_max_speed": 6.0 }"#),
            Err(TuningError::Invalid("car_speed"))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "stove_cadence": { "Uniform": { "min_ms": 500.0, "max_ms": 100.0 } } }"#),
            Err(TuningError::Invalid("stove_cadence"))
        ));
    }

    #[test]
    fn test_fallback_to_default() {
        assert_eq!(Tuning::from_json_or_default("not json"), Tuning::default());
    }
}
