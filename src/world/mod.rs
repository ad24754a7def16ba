//! World domain plugin for Cup Nooble.
//!
//! Responsible for:
//! - Loading map data and the sprite manifest, and turning them into a layout
//! - Spawning scenery, collision blocks, boats and the bed
//! - Frame animation and timed despawn of effects
//! - Weather particles and their floor decals
//! - Camera offset and draw order (including roof culling)
//!
//! Rendering (image handles, camera, overlays) lives in `WorldRenderPlugin`
//! so the simulation runs without a window.

use bevy::prelude::*;

use crate::calendar::roll_day_on_sleep;
use crate::config::GameConfig;
use crate::frame::FrameSet;
use crate::shared::*;

pub mod animation;
pub mod collision;
pub mod layout;
pub mod lighting;
pub mod map;
pub mod render;
pub mod sprites;
pub mod weather_fx;
pub mod ysort;

pub use layout::{DisallowedFloor, HouseFloor, WorldLayout};
pub use render::WorldRenderPlugin;
pub use sprites::{SeqId, SpriteCatalog, SpriteFrames};
pub use ysort::CameraOffset;

use animation::{animate_looping, animate_one_shots, expire_lifetimes, FrameCursor, LoopingAnimation};
use weather_fx::{refresh_weather_particles, seed_weather_particles, update_falling_particles};

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

/// Expects `GameConfig`, `SpriteCatalog`, `WorldLayout` and
/// `weather_fx::WeatherParticles` to be inserted before the app runs.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraOffset>()
            .add_systems(Startup, spawn_world)
            .add_systems(
                Update,
                (
                    animate_looping,
                    animate_one_shots,
                    expire_lifetimes,
                    update_falling_particles,
                    refresh_weather_particles,
                )
                    .in_set(FrameSet::Actors),
            )
            .add_systems(
                Update,
                seed_weather_particles
                    .after(roll_day_on_sleep)
                    .in_set(FrameSet::Transitions),
            )
            .add_systems(
                Update,
                (ysort::follow_player, ysort::sync_draw_order)
                    .chain()
                    .in_set(FrameSet::WorldRender),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// A boat the player can ride to the one across the water.
#[derive(Component, Debug, Clone, Copy)]
pub struct Boat {
    pub orientation: Facing,
}

/// The player's bed.
#[derive(Component, Debug, Clone, Copy)]
pub struct Bed;

/// Loop speed of the boats.
pub const BOAT_ANIMATION_SPEED: f32 = 2.0;

// ═══════════════════════════════════════════════════════════════════════
// SPAWNING
// ═══════════════════════════════════════════════════════════════════════

fn spawn_world(mut commands: Commands, layout: Res<WorldLayout>, cfg: Res<GameConfig>) {
    for piece in &layout.scenery {
        let mut entity = commands.spawn((
            Scenery,
            SpriteFrames::new(piece.seq),
            Footprint(piece.rect),
            piece.layer,
            Transform::default(),
            Visibility::default(),
        ));
        if let Some(speed) = piece.animation_speed {
            entity.insert(LoopingAnimation(FrameCursor::new(speed)));
        }
        if let Some(hitbox) = piece.hitbox {
            entity.insert(CollisionSurface { hitbox });
        }
    }

    for &hitbox in &layout.colliders {
        commands.spawn(CollisionSurface { hitbox });
    }

    for boat in &layout.boats {
        commands.spawn((
            Boat { orientation: boat.orientation },
            SpriteFrames::new(boat.seq),
            LoopingAnimation(FrameCursor::new(BOAT_ANIMATION_SPEED)),
            Footprint(boat.rect),
            DrawLayer::Main,
            Transform::default(),
            Visibility::default(),
        ));
    }

    if let Some(bed) = &layout.bed {
        commands.spawn((
            Bed,
            SpriteFrames::new(bed.seq),
            Footprint(bed.rect),
            CollisionSurface { hitbox: bed.hitbox },
            DrawLayer::Main,
            Transform::default(),
            Visibility::default(),
        ));
    }

    commands.insert_resource(HouseFloor(layout.house_floor.clone()));
    commands.insert_resource(layout.disallowed_floor.clone());

    info!(
        "[World] Spawned {} scenery pieces, {} colliders, {} boats on a {}x{} map ({} px tiles)",
        layout.scenery.len(),
        layout.colliders.len(),
        layout.boats.len(),
        layout.map_size.x,
        layout.map_size.y,
        cfg.tile_size()
    );
}
