//! Sky luminance and thunder flash overlays.
//!
//! The sky darkens the world by multiplying every pixel with a gray level.
//! Multiplying by gray `g` is the same as covering the screen with black at
//! alpha `1 - g/255`, so the sky is a full-screen UI node. The thunder flash
//! sits beneath it so that it is darkened at night like everything else.

use bevy::prelude::*;

use crate::calendar::DayCycle;
use crate::config::GameConfig;

/// Full-screen black overlay for the sky luminance.
#[derive(Component, Debug)]
pub struct SkyOverlay;

/// Full-screen white overlay shown on thunder frames.
#[derive(Component, Debug)]
pub struct ThunderOverlay;

pub const THUNDER_OVERLAY_Z: i32 = 100;
pub const SKY_OVERLAY_Z: i32 = 110;

/// Alpha of the black overlay equivalent to multiplying by `luminance`.
pub fn sky_alpha(luminance: f32) -> f32 {
    (1.0 - luminance / 255.0).clamp(0.0, 1.0)
}

fn full_screen() -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(0.0),
        top: Val::Px(0.0),
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        ..default()
    }
}

pub fn spawn_overlays(mut commands: Commands) {
    commands.spawn((
        ThunderOverlay,
        full_screen(),
        BackgroundColor(Color::WHITE),
        GlobalZIndex(THUNDER_OVERLAY_Z),
        Visibility::Hidden,
    ));
    commands.spawn((
        SkyOverlay,
        full_screen(),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        GlobalZIndex(SKY_OVERLAY_Z),
    ));
}

pub fn update_sky_overlay(
    day: Res<DayCycle>,
    cfg: Res<GameConfig>,
    mut query: Query<&mut BackgroundColor, With<SkyOverlay>>,
) {
    let alpha = sky_alpha(day.luminance(&cfg));
    for mut bg in &mut query {
        bg.0 = Color::srgba(0.0, 0.0, 0.0, alpha);
    }
}

/// While the flash window is open, each frame whitens with a fixed chance.
pub fn update_thunder_overlay(
    day: Res<DayCycle>,
    cfg: Res<GameConfig>,
    mut query: Query<&mut Visibility, With<ThunderOverlay>>,
) {
    let mut rng = rand::thread_rng();
    let flash = day.thunder.should_flash(&cfg.thunder, &mut rng);
    for mut visibility in &mut query {
        *visibility = if flash { Visibility::Inherited } else { Visibility::Hidden };
    }
}
