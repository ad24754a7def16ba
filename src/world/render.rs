//! Presentation side of the world: image handles, sprites and the camera.

use bevy::prelude::*;

use super::lighting::{spawn_overlays, update_sky_overlay, update_thunder_overlay};
use super::sprites::{SpriteCatalog, SpriteFrames, SpriteLibrary};
use super::ysort::CameraOffset;
use crate::config::GameConfig;
use crate::frame::FrameSet;
use crate::shared::*;

pub struct WorldRenderPlugin;

impl Plugin for WorldRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (load_sprite_library, setup_camera, spawn_overlays))
            .add_systems(
                Update,
                (
                    attach_sprites,
                    sync_sprite_frames,
                    sync_camera,
                    update_thunder_overlay,
                    update_sky_overlay,
                )
                    .chain()
                    .in_set(FrameSet::WorldRender),
            );
    }
}

fn load_sprite_library(
    mut commands: Commands,
    catalog: Res<SpriteCatalog>,
    asset_server: Res<AssetServer>,
) {
    let library = SpriteLibrary::load(&catalog, &asset_server);
    info!("[World] Loading {} sprite sequences", library.frames.len());
    commands.insert_resource(library);
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Gives every newly spawned drawable its sprite, sized to its footprint.
pub fn attach_sprites(
    mut commands: Commands,
    library: Res<SpriteLibrary>,
    added: Query<(Entity, &SpriteFrames, &Footprint), Added<SpriteFrames>>,
) {
    for (entity, frames, footprint) in &added {
        let Some(image) = library.handle(frames) else {
            continue;
        };
        commands.entity(entity).insert(Sprite {
            image,
            custom_size: Some(footprint.0.size()),
            ..default()
        });
    }
}

pub fn sync_sprite_frames(
    library: Res<SpriteLibrary>,
    mut query: Query<(&SpriteFrames, &Footprint, &mut Sprite), Changed<SpriteFrames>>,
) {
    for (frames, footprint, mut sprite) in &mut query {
        if let Some(image) = library.handle(frames) {
            sprite.image = image;
        }
        sprite.custom_size = Some(footprint.0.size());
    }
}

fn sync_camera(
    offset: Res<CameraOffset>,
    cfg: Res<GameConfig>,
    mut cameras: Query<&mut Transform, With<Camera2d>>,
) {
    let half_window = Vec2::new(cfg.display.window_width, cfg.display.window_height) / 2.0;
    let at = map_to_world(offset.0 + half_window);
    for mut transform in &mut cameras {
        transform.translation.x = at.x;
        transform.translation.y = at.y;
    }
}
