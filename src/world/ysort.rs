use bevy::prelude::*;

use crate::config::GameConfig;
use crate::player::Player;
use crate::shared::*;

/// Gap in z between consecutive entries of the draw order.
pub const Z_STEP: f32 = 0.01;

/// Top-left corner of the visible window in map space.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraOffset(pub Vec2);

/// Centres the window on the player, clamped to the map edges.
pub fn camera_offset_for(target: Vec2, window: Vec2, map_size: Vec2) -> Vec2 {
    let max = (map_size - window).max(Vec2::ZERO);
    (target - window / 2.0).clamp(Vec2::ZERO, max)
}

pub fn follow_player(
    cfg: Res<GameConfig>,
    mut offset: ResMut<CameraOffset>,
    players: Query<&Player>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    let window = Vec2::new(cfg.display.window_width, cfg.display.window_height);
    offset.0 = camera_offset_for(player.rect.center(), window, cfg.map_size());
}

/// Orders everything drawable by layer, then centre y, then centre x, and
/// writes the result into `Transform`. Roofs vanish while the player is
/// inside the house.
pub fn sync_draw_order(
    cfg: Res<GameConfig>,
    players: Query<&Player>,
    mut drawables: Query<(Entity, &DrawLayer, &Footprint, &mut Transform, &mut Visibility)>,
) {
    let inside = players.iter().any(|p| p.inside_house);

    let mut order: Vec<(f32, f32, f32, Entity)> = drawables
        .iter()
        .map(|(entity, layer, footprint, _, _)| {
            let center = footprint.0.center();
            (cfg.z_layers.of(*layer), center.y, center.x, entity)
        })
        .collect();
    order.sort_by(|a, b| {
        (a.0, a.1, a.2)
            .partial_cmp(&(b.0, b.1, b.2))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for (rank, (_, _, _, entity)) in order.into_iter().enumerate() {
        let Ok((_, layer, footprint, mut transform, mut visibility)) = drawables.get_mut(entity)
        else {
            continue;
        };
        let at = map_to_world(footprint.0.center().round());
        transform.translation = at.extend(rank as f32 * Z_STEP);
        let wanted = if *layer == DrawLayer::HouseRoof && inside {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        visibility.set_if_neq(wanted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_clamps_to_map() {
        let window = Vec2::new(1280.0, 720.0);
        let map = Vec2::splat(3200.0);
        assert_eq!(camera_offset_for(Vec2::new(100.0, 100.0), window, map), Vec2::ZERO);
        assert_eq!(
            camera_offset_for(Vec2::new(1600.0, 1600.0), window, map),
            Vec2::new(960.0, 1240.0)
        );
        assert_eq!(
            camera_offset_for(Vec2::new(3190.0, 3190.0), window, map),
            Vec2::new(1920.0, 2480.0)
        );
    }

    #[test]
    fn test_small_map_pins_camera() {
        let offset = camera_offset_for(Vec2::splat(50.0), Vec2::splat(200.0), Vec2::splat(100.0));
        assert_eq!(offset, Vec2::ZERO);
    }
}
