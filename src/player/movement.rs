use bevy::prelude::*;

use super::{Player, PlayerSprites};
use crate::config::GameConfig;
use crate::shared::*;
use crate::world::collision::{clamp_to_map, resolve_axis, Axis};
use crate::world::sprites::SpriteFrames;
use crate::world::HouseFloor;

/// Moves one axis, then pushes back out of solids and the map border.
/// `pos` follows the hitbox centre whenever the hitbox is corrected.
fn step_axis(player: &mut Player, axis: Axis, dt: f32, solids: &[Rect], map_size: Vec2) {
    let motion = match axis {
        Axis::X => player.direction.x,
        Axis::Y => player.direction.y,
    };
    let moved = match axis {
        Axis::X => {
            player.pos.x += motion * player.speed * dt;
            player.hitbox.with_center(Vec2::new(player.pos.x.round(), player.hitbox.center().y))
        }
        Axis::Y => {
            player.pos.y += motion * player.speed * dt;
            player.hitbox.with_center(Vec2::new(player.hitbox.center().x, player.pos.y.round()))
        }
    };

    let resolved = resolve_axis(moved, axis, motion, solids);
    let clamped = clamp_to_map(resolved, axis, map_size);
    player.hitbox = clamped;
    if clamped != moved {
        match axis {
            Axis::X => player.pos.x = clamped.center().x,
            Axis::Y => player.pos.y = clamped.center().y,
        }
    }
    player.rect = player.rect.with_center(player.hitbox.center());
}

/// Horizontal first, then vertical, so the player slides along walls.
pub fn step(player: &mut Player, dt: f32, solids: &[Rect], map_size: Vec2) {
    player.direction = player.direction.normalize_or_zero();
    step_axis(player, Axis::X, dt, solids, map_size);
    step_axis(player, Axis::Y, dt, solids, map_size);
}

/// Inside when at least three of the hitbox's edge midpoints are on floor.
pub fn is_inside_house(hitbox: Rect, floor: &[Rect]) -> bool {
    [hitbox.mid_bottom(), hitbox.mid_top(), hitbox.mid_left(), hitbox.mid_right()]
        .into_iter()
        .filter(|p| floor.iter().any(|tile| tile.contains_point(*p)))
        .count()
        >= 3
}

// ─── Systems ──────────────────────────────────────────────────────────────────

pub fn update_status(sprites: Res<PlayerSprites>, mut players: Query<(&mut Player, &mut SpriteFrames)>) {
    for (mut player, mut frames) in &mut players {
        player.action = player.current_action();
        let seq = sprites.frames.get(player.facing, player.action);
        if frames.seq != seq {
            frames.seq = seq;
        }
    }
}

pub fn move_player(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    solids: Query<&CollisionSurface>,
    mut players: Query<(&mut Player, &mut Footprint)>,
) {
    let hitboxes: Vec<Rect> = solids.iter().map(|s| s.hitbox).collect();
    for (mut player, mut footprint) in &mut players {
        step(&mut player, time.delta_secs(), &hitboxes, cfg.map_size());
        footprint.0 = player.rect;
    }
}

pub fn update_house_status(floor: Res<HouseFloor>, mut players: Query<&mut Player>) {
    for mut player in &mut players {
        let inside = is_inside_house(player.hitbox, &floor.0);
        if inside != player.inside_house {
            player.inside_house = inside;
            debug!("[Player] Inside house: {inside}");
        }
    }
}
