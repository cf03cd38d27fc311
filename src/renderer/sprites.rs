//! Sprite selection and draw lists

use crate::sim::{AnimFrame, Aabb, GameState, ObstacleKind};

/// Every image the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    CharIdle,
    CharWalk1,
    CharWalk2,
    CharMidAir,
    CharLanding,
    PoliceCar,
    Stove,
}

impl Sprite {
    pub const ALL: [Sprite; 7] = [
        Sprite::CharIdle,
        Sprite::CharWalk1,
        Sprite::CharWalk2,
        Sprite::CharMidAir,
        Sprite::CharLanding,
        Sprite::PoliceCar,
        Sprite::Stove,
    ];

    /// Image path relative to the page
    pub fn asset_path(&self) -> &'static str {
        match self {
            Sprite::CharIdle => "char_idle.png",
            Sprite::CharWalk1 => "char_walk1.png",
            Sprite::CharWalk2 => "char_walk2.png",
            Sprite::CharMidAir => "char_mid_air.png",
            Sprite::CharLanding => "char_landing.png",
            Sprite::PoliceCar => "police.png",
            Sprite::Stove => "stove.png",
        }
    }

    pub fn for_frame(frame: AnimFrame) -> Self {
        match frame {
            AnimFrame::Idle => Sprite::CharIdle,
            AnimFrame::Walk1 => Sprite::CharWalk1,
            AnimFrame::Walk2 => Sprite::CharWalk2,
            AnimFrame::MidAir => Sprite::CharMidAir,
            AnimFrame::Landing => Sprite::CharLanding,
        }
    }

    pub fn for_obstacle(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::Car => Sprite::PoliceCar,
            ObstacleKind::Stove => Sprite::Stove,
        }
    }
}

/// Draw `sprite` stretched over `rect`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub sprite: Sprite,
    pub rect: Aabb,
}

/// Everything to draw this frame, back to front: character, cars, stoves
pub fn draw_list(state: &GameState) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(1 + state.cars.len() + state.stoves.len());
    commands.push(DrawCommand {
        sprite: Sprite::for_frame(state.character.frame),
        rect: state.character.bounds(),
    });
    for obstacle in state.cars.iter().chain(state.stoves.iter()) {
        commands.push(DrawCommand {
            sprite: Sprite::for_obstacle(obstacle.kind),
            rect: obstacle.bounds(),
        });
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_asset_paths_unique() {
        let mut paths: Vec<_> = Sprite::ALL.iter().map(|s| s.asset_path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Sprite::ALL.len());
    }

    #[test]
    fn test_draw_order() {
        let mut state = GameState::new(1000.0, 500.0, Tuning::default());
        state.start();
        let mut rng = Pcg32::seed_from_u64(11);
        state.spawn(ObstacleKind::Stove, &mut rng);
        state.spawn(ObstacleKind::Car, &mut rng);
        tick(&mut state, 16.0);

        let list = draw_list(&state);
        let sprites: Vec<_> = list.iter().map(|c| c.sprite).collect();
        assert_eq!(
            sprites,
            vec![Sprite::CharWalk1, Sprite::PoliceCar, Sprite::Stove]
        );
        assert_eq!(list[0].rect, state.character.bounds());
    }

    #[test]
    fn test_idle_before_start() {
        let state = GameState::new(1000.0, 500.0, Tuning::default());
        let list = draw_list(&state);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].sprite, Sprite::CharIdle);
    }
}
