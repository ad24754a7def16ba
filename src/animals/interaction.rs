//! Petting: left-clicking a nearby idle animal gives it a heart.

use bevy::prelude::*;

use super::Animal;
use crate::config::GameConfig;
use crate::input::{FrameInput, InputEvent, PointerButton};
use crate::player::Player;
use crate::shared::*;
use crate::world::sprites::SpriteFrames;
use crate::world::CameraOffset;

/// Whether `animal` accepts love from a player whose sprite is centred at
/// `player_center`.
pub fn accepts_love(animal: &Animal, player_center: Vec2, range: f32) -> bool {
    animal.is_idling()
        && !animal.love_timer.is_active()
        && animal.interaction_rect.center().distance(player_center) <= range
}

pub fn love_clicked_animal(
    input: Res<FrameInput>,
    offset: Res<CameraOffset>,
    cfg: Res<GameConfig>,
    players: Query<&Player>,
    mut animals: Query<(Entity, &mut Animal, &mut SpriteFrames)>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    let range = cfg.animals.love_range * cfg.tile_size();
    for ev in &input.events {
        let InputEvent::PointerDown { button: PointerButton::Primary, pos } = *ev else {
            continue;
        };
        let on_map = pos + offset.0;
        let chosen = animals
            .iter()
            .filter(|(_, a, _)| a.interaction_rect.contains_point(on_map))
            .filter(|(_, a, _)| accepts_love(a, player.rect.center(), range))
            .max_by(|(_, a, _), (_, b, _)| {
                a.rect
                    .center()
                    .y
                    .partial_cmp(&b.rect.center().y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(entity, _, _)| entity);
        let Some(entity) = chosen else {
            continue;
        };
        if let Ok((_, mut animal, mut frames)) = animals.get_mut(entity) {
            animal.love();
            frames.frame = 0;
            info!("[Animals] {} now has {} hearts", animal.nickname, animal.love_hearts);
        }
    }
}
