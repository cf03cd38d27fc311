//! Rendering module
//!
//! `sprites` turns game state into a draw list; `canvas` executes it on a
//! Canvas 2D context in the browser.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod sprites;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use sprites::{DrawCommand, Sprite, draw_list};
