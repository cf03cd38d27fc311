//! Platform input mapping
//!
//! Keyboard and touch events map straight onto the game's control functions.
//! There is no input queue: a control takes effect the moment it arrives.

use crate::sim::GameState;

/// A player control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Jump,
    FastFall,
    /// Front-end only; leaves the game untouched
    ToggleMute,
}

/// Map a `KeyboardEvent.code` to a control
pub fn key_control(code: &str) -> Option<Control> {
    match code {
        "Space" | "ArrowUp" => Some(Control::Jump),
        "ArrowDown" => Some(Control::FastFall),
        "KeyM" => Some(Control::ToggleMute),
        _ => None,
    }
}

/// A tap jumps from the ground and fast-falls in the air
pub fn tap_control(state: &GameState) -> Control {
    if state.character.is_jumping {
        Control::FastFall
    } else {
        Control::Jump
    }
}

/// Invoke the control. Returns whether it had any effect.
pub fn apply_control(state: &mut GameState, control: Control) -> bool {
    match control {
        Control::Jump => state.jump(),
        Control::FastFall => state.fast_fall(),
        Control::ToggleMute => false,
    }
}
