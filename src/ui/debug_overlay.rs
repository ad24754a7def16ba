use bevy::prelude::*;

use super::arbiter::UiArbiter;
use super::transitions::TransitionDirector;
use crate::calendar::DayCycle;
use crate::config::GameConfig;
use crate::input::{FrameInput, GameKey};
use crate::player::Player;

#[derive(Resource, Debug, Default)]
pub struct DebugOverlayState {
    pub visible: bool,
}

/// Marker for the debug overlay root node.
#[derive(Component)]
pub struct DebugOverlayRoot;

/// Marker for the debug text.
#[derive(Component)]
pub struct DebugOverlayText;

/// Toggle debug overlay with F3.
pub fn toggle_debug_overlay(input: Res<FrameInput>, mut state: ResMut<DebugOverlayState>) {
    if input.key_pressed(GameKey::DebugToggle) {
        state.visible = !state.visible;
    }
}

pub fn spawn_debug_overlay(mut commands: Commands) {
    commands
        .spawn((
            DebugOverlayRoot,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(8.0),
                top: Val::Px(8.0),
                padding: UiRect::all(Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            GlobalZIndex(1100),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                DebugOverlayText,
                Text::new("Debug"),
                TextFont { font_size: 14.0, ..default() },
                TextColor(Color::srgb(0.0, 1.0, 0.0)),
            ));
        });
}

pub fn update_debug_overlay(
    state: Res<DebugOverlayState>,
    cfg: Res<GameConfig>,
    day: Res<DayCycle>,
    arbiter: Res<UiArbiter>,
    director: Res<TransitionDirector>,
    players: Query<&Player>,
    mut overlay: Query<&mut Visibility, With<DebugOverlayRoot>>,
    mut text: Query<&mut Text, With<DebugOverlayText>>,
) {
    let Ok(mut vis) = overlay.get_single_mut() else { return };
    if !state.visible {
        *vis = Visibility::Hidden;
        return;
    }
    *vis = Visibility::Inherited;

    let Ok(mut text) = text.get_single_mut() else { return };

    let mut lines = vec![
        format!("Day: {} ({})", day.day(), day.day_of_week()),
        format!("Time: {:.1} / {}", day.current_time(), cfg.day.length),
        format!("Division: {}", day.time_division(&cfg)),
        format!("Luminance: {:.1}", day.luminance(&cfg)),
        format!("Weather: {}", day.weather()),
        format!("Temperature: {}", day.temperature()),
        format!("Active UI: {}", arbiter.active_name().unwrap_or("none")),
        format!("Transition: {}", director.is_active()),
        format!("Cutscene: {}", director.cutscene_playing()),
    ];

    if let Ok(player) = players.get_single() {
        lines.push(format!("Player: {:?} facing {:?}", player.current_action(), player.facing));
        lines.push(format!("Tool: {:?}", player.active_tool));
        lines.push(format!("Inside house: {}", player.inside_house));
    }

    **text = lines.join("\n");
}
