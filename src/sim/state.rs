//! Game state and core simulation types
//!
//! Everything the simulation loop reads or writes lives in [`GameState`].
//! Coordinates are canvas pixels with y growing downward.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting behind the start gate
    Ready,
    /// Active gameplay
    Playing,
    /// Hit a car; terminal until reset
    GameOver,
}

/// Character animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimFrame {
    #[default]
    Idle,
    Walk1,
    Walk2,
    MidAir,
    Landing,
}

/// Something the driver should react to (sound, DOM, loop control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Jumped,
    PointScored { score: u32 },
    GameOver { score: u32 },
    Restarted,
}

/// Canvas dimensions and the derived ground line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    /// y of the floor
    pub ground_level: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32, tuning: &Tuning) -> Self {
        Self {
            width,
            height,
            ground_level: height * tuning.ground_fraction,
        }
    }

    /// Canvas size for a viewport size
    pub fn canvas_size_for_viewport(viewport_w: f32, viewport_h: f32) -> (f32, f32) {
        use crate::consts::{CANVAS_HEIGHT_FRACTION, CANVAS_WIDTH_FRACTION};
        (
            viewport_w * CANVAS_WIDTH_FRACTION,
            viewport_h * CANVAS_HEIGHT_FRACTION,
        )
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (pixels/tick, positive = down)
    pub dy: f32,
    pub is_jumping: bool,
    pub is_landing: bool,
    pub is_idle: bool,
    /// Steepened gravity for the rest of the current fall
    pub fast_fall: bool,
    pub frame: AnimFrame,
    /// Ticks since the character was created (never reset)
    pub frame_counter: u64,
    /// Real time left before the landing flag clears (ms)
    #[serde(default)]
    pub landing_ms_left: Option<f32>,
}

impl Character {
    pub fn new(playfield: &Playfield, tuning: &Tuning) -> Self {
        let size = Vec2::new(
            playfield.width * tuning.character_width_fraction,
            playfield.height * tuning.character_height_fraction,
        );
        Self {
            pos: Vec2::new(
                playfield.width * tuning.character_x_fraction,
                playfield.ground_level - size.y,
            ),
            size,
            dy: 0.0,
            is_jumping: false,
            is_landing: false,
            is_idle: true,
            fast_fall: false,
            frame: AnimFrame::Idle,
            frame_counter: 0,
            landing_ms_left: None,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Lowest allowed y (top edge) for this character
    #[inline]
    pub fn ground_y(&self, playfield: &Playfield) -> f32 {
        playfield.ground_level - self.size.y
    }

    /// Put the character back on the ground at rest
    pub fn land_at_rest(&mut self, playfield: &Playfield) {
        self.pos.y = self.ground_y(playfield);
        self.dy = 0.0;
        self.is_jumping = false;
        self.is_landing = false;
        self.fast_fall = false;
        self.landing_ms_left = None;
    }
}

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Police car: lethal on contact
    Car,
    /// Stove: collected for a point
    Stove,
}

/// A scrolling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Leftward speed (pixels/tick)
    pub speed: f32,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Fully scrolled past the left edge
    #[inline]
    pub fn is_offscreen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub playfield: Playfield,
    pub phase: GamePhase,
    pub score: u32,
    pub character: Character,
    pub cars: Vec<Obstacle>,
    pub stoves: Vec<Obstacle>,
    /// Outbox for the driver, drained with [`GameState::drain_events`]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a game behind the start gate on a canvas of the given size
    pub fn new(width: f32, height: f32, tuning: Tuning) -> Self {
        let playfield = Playfield::new(width, height, &tuning);
        let character = Character::new(&playfield, &tuning);
        Self {
            tuning,
            playfield,
            phase: GamePhase::Ready,
            score: 0,
            character,
            cars: Vec::new(),
            stoves: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Leave the start gate
    pub fn start(&mut self) {
        if self.phase == GamePhase::Ready {
            self.phase = GamePhase::Playing;
            self.character.is_idle = false;
            self.events.push(GameEvent::Started);
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Build an obstacle of `kind` at the right edge of the canvas
    pub fn make_obstacle(&self, kind: ObstacleKind, speed: f32) -> Obstacle {
        let shape = match kind {
            ObstacleKind::Car => self.tuning.car,
            ObstacleKind::Stove => self.tuning.stove,
        };
        let pf = &self.playfield;
        Obstacle {
            kind,
            pos: Vec2::new(pf.width, pf.ground_level - pf.height * shape.lift_fraction),
            size: Vec2::new(pf.width * shape.width_fraction, pf.height * shape.height_fraction),
            speed,
        }
    }

    /// Spawn timer callback. Inert unless the game is being played.
    ///
    /// Returns true if an obstacle was added.
    pub fn spawn<R: Rng + ?Sized>(&mut self, kind: ObstacleKind, rng: &mut R) -> bool {
        if !self.is_playing() {
            return false;
        }
        let speed = match kind {
            ObstacleKind::Car => {
                let (min, max) = (self.tuning.car_min_speed, self.tuning.car_max_speed);
                if max > min { rng.random_range(min..max) } else { min }
            }
            ObstacleKind::Stove => self.tuning.stove_speed,
        };
        let obstacle = self.make_obstacle(kind, speed);
        match kind {
            ObstacleKind::Car => self.cars.push(obstacle),
            ObstacleKind::Stove => self.stoves.push(obstacle),
        }
        true
    }

    /// Canvas was resized: recompute the playfield and rescale entities
    pub fn resize(&mut self, width: f32, height: f32) {
        let old = self.playfield;
        let new = Playfield::new(width, height, &self.tuning);
        let sx = if old.width > 0.0 { new.width / old.width } else { 1.0 };
        let sy = if old.height > 0.0 { new.height / old.height } else { 1.0 };
        self.playfield = new;

        let t = &self.tuning;
        let ch = &mut self.character;
        let was_grounded = !ch.is_jumping;
        ch.size = Vec2::new(width * t.character_width_fraction, height * t.character_height_fraction);
        ch.pos.x = width * t.character_x_fraction;
        if was_grounded {
            ch.pos.y = new.ground_level - ch.size.y;
        } else {
            ch.pos.y = (ch.pos.y * sy).min(new.ground_level - ch.size.y);
        }

        for obstacle in self.cars.iter_mut().chain(self.stoves.iter_mut()) {
            let shape = match obstacle.kind {
                ObstacleKind::Car => t.car,
                ObstacleKind::Stove => t.stove,
            };
            obstacle.size = Vec2::new(width * shape.width_fraction, height * shape.height_fraction);
            obstacle.pos.x *= sx;
            obstacle.pos.y = new.ground_level - height * shape.lift_fraction;
        }
    }
}
