//! Canvas 2D backend

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::sprites::{Sprite, draw_list};
use crate::sim::GameState;

/// Draws the game onto a `<canvas>`
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<Sprite, HtmlImageElement>,
}

impl CanvasRenderer {
    /// Grab the 2D context and start loading every sprite.
    ///
    /// Images load in the background; one that has not arrived yet draws nothing.
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;

        let mut images = HashMap::with_capacity(Sprite::ALL.len());
        for sprite in Sprite::ALL {
            match HtmlImageElement::new() {
                Ok(img) => {
                    img.set_src(sprite.asset_path());
                    images.insert(sprite, img);
                }
                Err(_) => log::warn!("Could not create image for {:?}", sprite),
            }
        }

        Some(Self {
            canvas,
            ctx,
            images,
        })
    }

    pub fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }

    /// Clear and draw the current frame
    pub fn render(&self, state: &GameState) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);

        for cmd in draw_list(state) {
            let Some(img) = self.images.get(&cmd.sprite) else {
                continue;
            };
            let r = cmd.rect;
            let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                img,
                r.pos.x as f64,
                r.pos.y as f64,
                r.size.x as f64,
                r.size.y as f64,
            );
        }
    }
}
