//! Return-key interactions with the world: boats and the bed.

use bevy::prelude::*;

use super::Player;
use crate::calendar::DayCycle;
use crate::config::GameConfig;
use crate::input::{FrameInput, GameKey};
use crate::shared::*;
use crate::ui::arbiter::UiArbiter;
use crate::ui::transitions::TransitionDirector;
use crate::world::{Bed, Boat};

/// The other boat's landing point if the player stands close to a boat and
/// faces it. Only the first boat in range is considered.
pub fn boat_destination(player: &Player, boats: &[(Facing, Rect)], range: f32) -> Option<(Facing, Vec2)> {
    if !player.is_idling() {
        return None;
    }
    let center = player.rect.center();
    let (index, &(orientation, rect)) = boats
        .iter()
        .enumerate()
        .find(|(_, (_, rect))| rect.center().distance(center) < range)?;
    if !player.is_facing_rect(rect) {
        return None;
    }
    let (_, other) = boats.iter().enumerate().find(|(i, _)| *i != index)?.1;
    Some((orientation, other.mid_top()))
}

/// Sleeping needs night, stillness, the house, the bed within range and
/// the player facing it.
pub fn can_sleep(player: &Player, bed: Rect, night: bool, range: f32) -> bool {
    night
        && player.is_idling()
        && player.inside_house
        && bed.center().distance(player.rect.center()) < range
        && player.is_facing_rect(bed)
}

pub fn ride_boat(
    input: Res<FrameInput>,
    cfg: Res<GameConfig>,
    mut director: ResMut<TransitionDirector>,
    mut arbiter: ResMut<UiArbiter>,
    players: Query<&Player>,
    boats: Query<(&Boat, &Footprint)>,
) {
    if !input.key_pressed(GameKey::Return) || director.is_active() {
        return;
    }
    let Ok(player) = players.get_single() else {
        return;
    };
    let boats: Vec<(Facing, Rect)> = boats.iter().map(|(b, f)| (b.orientation, f.0)).collect();
    let range = cfg.player.boat_range * cfg.tile_size();
    if let Some((orientation, to)) = boat_destination(player, &boats, range) {
        info!("[Player] Taking the {} boat", orientation.asset_key());
        director.start_boat(orientation, SceneChange::Teleport { to }, &mut arbiter);
    }
}

pub fn go_to_sleep(
    input: Res<FrameInput>,
    cfg: Res<GameConfig>,
    day: Res<DayCycle>,
    mut director: ResMut<TransitionDirector>,
    mut arbiter: ResMut<UiArbiter>,
    players: Query<&Player>,
    beds: Query<&Footprint, With<Bed>>,
) {
    if !input.key_pressed(GameKey::Return) || director.is_active() {
        return;
    }
    let (Ok(player), Ok(bed)) = (players.get_single(), beds.get_single()) else {
        return;
    };
    let range = cfg.player.bed_range * cfg.tile_size();
    if can_sleep(player, bed.0, day.is_night_time(&cfg), range) {
        info!("[Player] Going to sleep on day {}", day.day());
        director.start_sleep(&mut arbiter);
    }
}

/// Moves the player while the screen is covered by a boat transition.
pub fn apply_teleport(
    mut scene_events: EventReader<SceneChangeEvent>,
    mut players: Query<(&mut Player, &mut Footprint)>,
) {
    for SceneChangeEvent(change) in scene_events.read() {
        let SceneChange::Teleport { to } = *change else {
            continue;
        };
        for (mut player, mut footprint) in &mut players {
            player.teleport(to);
            footprint.0 = player.rect;
            info!("[Player] Arrived at ({}, {})", to.x, to.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(center: Vec2, facing: Facing) -> Player {
        let mut p = Player::new(center, Vec2::splat(100.0), &GameConfig::default());
        p.facing = facing;
        p
    }

    #[test]
    fn test_boat_in_range_and_faced() {
        let near = Rect::from_top_left(Vec2::new(150.0, 60.0), Vec2::new(80.0, 80.0));
        let far = Rect::from_top_left(Vec2::new(2000.0, 60.0), Vec2::new(80.0, 80.0));
        let boats = [(Facing::Right, near), (Facing::Left, far)];
        let p = player_at(Vec2::new(100.0, 100.0), Facing::Right);
        assert_eq!(
            boat_destination(&p, &boats, 128.0),
            Some((Facing::Right, far.mid_top()))
        );
        let turned = player_at(Vec2::new(100.0, 100.0), Facing::Left);
        assert_eq!(boat_destination(&turned, &boats, 128.0), None);
    }

    #[test]
    fn test_moving_player_cannot_board() {
        let near = Rect::from_top_left(Vec2::new(150.0, 60.0), Vec2::new(80.0, 80.0));
        let boats = [(Facing::Right, near), (Facing::Left, near)];
        let mut p = player_at(Vec2::new(100.0, 100.0), Facing::Right);
        p.direction = Vec2::X;
        assert_eq!(boat_destination(&p, &boats, 128.0), None);
    }

    #[test]
    fn test_sleep_conditions() {
        let bed = Rect::from_top_left(Vec2::new(60.0, 130.0), Vec2::new(80.0, 40.0));
        let mut p = player_at(Vec2::new(100.0, 100.0), Facing::Down);
        p.inside_house = true;
        assert!(can_sleep(&p, bed, true, 64.0));
        assert!(!can_sleep(&p, bed, false, 64.0));
        p.inside_house = false;
        assert!(!can_sleep(&p, bed, true, 64.0));
        p.inside_house = true;
        p.facing = Facing::Up;
        assert!(!can_sleep(&p, bed, true, 64.0));
    }
}
