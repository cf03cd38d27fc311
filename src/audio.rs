//! Audio: page `<audio>` elements with a Web Audio fallback
//!
//! Sounds come from the page's audio elements. When an element is missing the
//! effect is synthesized instead, so the game never goes silent.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{AudioContext, Document, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Character leaves the ground
    Jump,
    /// Stove collected
    Point,
    /// Hit a car
    GameOver,
}

impl SoundEffect {
    const ALL: [SoundEffect; 3] = [SoundEffect::Jump, SoundEffect::Point, SoundEffect::GameOver];

    fn element_id(&self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump-sound",
            SoundEffect::Point => "point-sound",
            SoundEffect::GameOver => "game-over-sound",
        }
    }
}

const MUSIC_ELEMENT_ID: &str = "background-music";

fn audio_element(document: &Document, id: &str) -> Option<HtmlAudioElement> {
    document
        .get_element_by_id(id)?
        .dyn_into::<HtmlAudioElement>()
        .ok()
}

/// Audio manager for the game
pub struct AudioManager {
    effects: HashMap<SoundEffect, HtmlAudioElement>,
    music: Option<HtmlAudioElement>,
    /// Only used for effects without an element
    ctx: Option<AudioContext>,
    sfx_volume: f32,
    music_volume: f32,
}

impl AudioManager {
    pub fn new(document: &Document, settings: &Settings) -> Self {
        let mut effects = HashMap::new();
        for effect in SoundEffect::ALL {
            match audio_element(document, effect.element_id()) {
                Some(el) => {
                    effects.insert(effect, el);
                }
                None => log::warn!("No #{} element - using synthesized sound", effect.element_id()),
            }
        }

        let music = audio_element(document, MUSIC_ELEMENT_ID);
        if let Some(music) = &music {
            music.set_loop(true);
        }

        let ctx = if effects.len() < SoundEffect::ALL.len() {
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - fallback sounds disabled");
            }
            ctx
        } else {
            None
        };

        let mut manager = Self {
            effects,
            music,
            ctx,
            sfx_volume: 0.0,
            music_volume: 0.0,
        };
        manager.apply_settings(settings);
        manager
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.music_volume = settings.effective_music_volume();
        if let Some(music) = &self.music {
            music.set_volume(self.music_volume as f64);
        }
    }

    /// Play a sound effect from the start
    pub fn play(&self, effect: SoundEffect) {
        if self.sfx_volume <= 0.0 {
            return;
        }

        if let Some(el) = self.effects.get(&effect) {
            el.set_volume(self.sfx_volume as f64);
            el.set_current_time(0.0);
            // Rejected when autoplay is blocked; nothing to do about it
            let _ = el.play();
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let vol = self.sfx_volume;
        match effect {
            SoundEffect::Jump => self.play_jump(ctx, vol),
            SoundEffect::Point => self.play_point(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        }
    }

    /// Start or resume the background loop
    pub fn resume_music(&self) {
        if let Some(music) = &self.music {
            let _ = music.play();
        }
    }

    /// Restart the background loop from the top
    pub fn restart_music(&self) {
        if let Some(music) = &self.music {
            music.set_current_time(0.0);
            let _ = music.play();
        }
    }

    pub fn pause_music(&self) {
        if let Some(music) = &self.music {
            let _ = music.pause();
        }
    }

    // === Fallback generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Jump - whoosh up
    fn play_jump(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(600.0, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.25).ok();
    }

    /// Point - happy ding
    fn play_point(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Game over - sad descending
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let delay = i as f64 * 0.2;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}
