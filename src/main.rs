//! Bigodinho entry point
//!
//! Web: wires the DOM, audio and timers around the simulation loop.
//! Native: plays a headless game with the autopilot and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, KeyboardEvent, TouchEvent};

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use bigodinho::audio::{AudioManager, SoundEffect};
    use bigodinho::consts::FRAME_MS;
    use bigodinho::platform::{Control, apply_control, key_control, tap_control};
    use bigodinho::renderer::CanvasRenderer;
    use bigodinho::sim::spawn::{cadence_for, first_delay};
    use bigodinho::sim::{GameEvent, GameState, ObstacleKind, Playfield, tick};
    use bigodinho::{Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: CanvasRenderer,
        audio: AudioManager,
        settings: Settings,
        rng: Pcg32,
        /// A frame callback is pending
        running: bool,
        last_time: f64,
    }

    impl Game {
        /// React to everything the simulation reported since last time
        fn handle_events(&mut self) {
            for event in self.state.drain_events() {
                match event {
                    GameEvent::Started => self.audio.resume_music(),
                    GameEvent::Jumped => self.audio.play(SoundEffect::Jump),
                    GameEvent::PointScored { score } => {
                        self.audio.play(SoundEffect::Point);
                        set_text("score", &score.to_string());
                    }
                    GameEvent::GameOver { score } => {
                        self.audio.pause_music();
                        self.audio.play(SoundEffect::GameOver);
                        set_text("score", &score.to_string());
                        set_visible("game-over", true);
                    }
                    GameEvent::Restarted => {
                        self.audio.restart_music();
                        set_text("score", "0");
                        set_visible("game-over", false);
                    }
                }
            }
        }

        fn resize_to_viewport(&mut self) {
            let (w, h) = viewport_canvas_size();
            self.renderer.resize(w, h);
            self.state.resize(w, h);
            self.renderer.render(&self.state);
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.settings.save();
            self.audio.apply_settings(&self.settings);
            if self.settings.muted {
                self.audio.pause_music();
            } else if self.state.is_playing() {
                self.audio.resume_music();
            }
            log::info!("Muted: {}", self.settings.muted);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        let Some(el) = document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let display = if visible { "block" } else { "none" };
        let _ = el.style().set_property("display", display);
    }

    /// Canvas size derived from the current window size
    fn viewport_canvas_size() -> (f32, f32) {
        let window = web_sys::window();
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let (vw, vh) = window
            .map(|w| (dim(w.inner_width()), dim(w.inner_height())))
            .unwrap_or((0.0, 0.0));
        Playfield::canvas_size_for_viewport(vw as f32, vh as f32)
    }

    /// Tuning from an optional `<script type="application/json" id="tuning">`
    fn load_tuning(document: &Document) -> Tuning {
        match document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
        {
            Some(json) => Tuning::from_json_or_default(&json),
            None => Tuning::default(),
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Bigodinho starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = viewport_canvas_size();
        let Some(renderer) = CanvasRenderer::new(canvas.clone()) else {
            log::error!("Canvas 2D context unavailable");
            return;
        };
        renderer.resize(width, height);

        let tuning = load_tuning(&document);
        let settings = Settings::load();
        let audio = AudioManager::new(&document, &settings);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game {
            state: GameState::new(width, height, tuning),
            renderer,
            audio,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            running: false,
            last_time: 0.0,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_window_handlers(game.clone());

        for kind in [ObstacleKind::Car, ObstacleKind::Stove] {
            let delay = {
                let mut g = game.borrow_mut();
                let Game { state, rng, .. } = &mut *g;
                first_delay(kind, &state.tuning, rng)
            };
            schedule_spawn(game.clone(), kind, delay);
        }

        // First frame shows the idle character behind the start gate
        game.borrow().renderer.render(&game.borrow().state);

        // Without a start button there is no gate
        if document.get_element_by_id("start-button").is_none() {
            start_game(&game);
        }

        log::info!("Bigodinho running!");
    }

    fn start_game(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.state.start();
            g.handle_events();
        }
        set_visible("start-screen", false);
        ensure_running(game);
    }

    fn restart_game(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.state.reset();
            g.handle_events();
        }
        ensure_running(game);
    }

    /// Resume the frame loop if it stopped
    fn ensure_running(game: &Rc<RefCell<Game>>) {
        let resume = {
            let mut g = game.borrow_mut();
            let resume = !g.running;
            if resume {
                g.running = true;
                g.last_time = 0.0;
            }
            resume
        };
        if resume {
            request_animation_frame(game.clone());
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_going = {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                FRAME_MS
            };
            g.last_time = time;

            let keep_going = tick(&mut g.state, dt as f32);
            g.renderer.render(&g.state);
            g.handle_events();
            g.running = keep_going;
            keep_going
        };

        if keep_going {
            request_animation_frame(game);
        }
    }

    /// Self-rescheduling spawn timer. Keeps firing forever; spawns are no-ops
    /// unless the game is being played.
    fn schedule_spawn(game: Rc<RefCell<Game>>, kind: ObstacleKind, delay_ms: f64) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let next = game.clone();
        let closure = Closure::once(move || {
            let delay = {
                let mut g = game.borrow_mut();
                let Game { state, rng, .. } = &mut *g;
                state.spawn(kind, rng);
                cadence_for(kind, &state.tuning).next_delay(rng)
            };
            schedule_spawn(next, kind, delay);
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms as i32,
        );
        closure.forget();
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match key_control(&event.code()) {
                    Some(Control::ToggleMute) => g.toggle_mute(),
                    Some(control) => {
                        // Keep space/arrows from scrolling the page
                        event.prevent_default();
                        apply_control(&mut g.state, control);
                        g.handle_events();
                    }
                    None => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: jump from the ground, fast-fall in the air
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let control = tap_control(&g.state);
                apply_control(&mut g.state, control);
                g.handle_events();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("start-button") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                start_game(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                restart_game(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No #restart-button - the game cannot be restarted");
        }
    }

    fn setup_window_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Resize: recompute canvas and playfield
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize_to_viewport();
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let g = game.borrow();
                if g.settings.mute_on_blur {
                    g.audio.pause_music();
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus regained
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let g = game.borrow();
                if g.settings.mute_on_blur && !g.settings.muted && g.state.is_playing() {
                    g.audio.resume_music();
                }
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bigodinho::Tuning;
    use bigodinho::consts::FRAME_MS;
    use bigodinho::sim::{Autopilot, Session};

    env_logger::init();
    log::info!("Bigodinho (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 to play in the browser");

    let mut args = std::env::args().skip(1);

    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    log::info!("Game initialized with seed: {}", seed);

    // Canvas of a 1280x720 viewport, two minutes at 60 Hz
    let mut session =
        Session::new(1024.0, 504.0, tuning, seed).with_autopilot(Autopilot::default());
    let summary = session.run(120 * 60, FRAME_MS);

    match serde_json::to_string(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize run summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
