//! Frame driver: the fixed order of one tick, and the gates between phases.
//!
//! ```text
//! Events -> Input -> Clock -> Actors -> Transitions -> WorldRender -> UiRender -> Overlay
//! ```
//!
//! UI dispatch is gated on "no transition, no tool swing". World event
//! handlers additionally require that no UI is active. Both render phases are
//! skipped while a cutscene covers the screen.

use bevy::app::PluginGroupBuilder;
use bevy::prelude::*;

use crate::input::FrameInput;
use crate::player::Player;
use crate::ui::arbiter::UiArbiter;
use crate::ui::transitions::TransitionDirector;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Events,
    Input,
    Clock,
    Actors,
    Transitions,
    WorldRender,
    UiRender,
    Overlay,
}

pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameInput>()
            .configure_sets(
                Update,
                (
                    FrameSet::Events,
                    FrameSet::Input,
                    FrameSet::Clock,
                    FrameSet::Actors,
                    FrameSet::Transitions,
                    FrameSet::WorldRender,
                    FrameSet::UiRender,
                    FrameSet::Overlay,
                )
                    .chain(),
            )
            .configure_sets(
                Update,
                (FrameSet::WorldRender, FrameSet::UiRender).run_if(no_cutscene_playing),
            )
            .add_systems(Last, clear_frame_events);
    }
}

/// Discrete events last exactly one tick, whoever wrote them.
fn clear_frame_events(mut input: ResMut<FrameInput>) {
    input.events.clear();
}

// ─── Run conditions ───────────────────────────────────────────────────────────

fn player_swinging(players: &Query<&Player>) -> bool {
    players.iter().any(Player::is_using_tool)
}

/// UIs may take events and input.
pub fn ui_may_dispatch(director: Res<TransitionDirector>, players: Query<&Player>) -> bool {
    !director.is_active() && !player_swinging(&players)
}

/// World interactions (sleep, boats, petting) may take events.
pub fn world_may_dispatch(
    arbiter: Res<UiArbiter>,
    director: Res<TransitionDirector>,
    players: Query<&Player>,
) -> bool {
    !arbiter.is_active() && !director.is_active() && !player_swinging(&players)
}

pub fn no_cutscene_playing(director: Res<TransitionDirector>) -> bool {
    !director.cutscene_playing()
}

// ─── Plugin groups ────────────────────────────────────────────────────────────

/// Everything that simulates the game. Needs no window, renderer or assets,
/// only `GameConfig`, the `SpriteCatalog` and a `WorldLayout`.
pub struct SimulationPlugins;

impl PluginGroup for SimulationPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(FramePlugin)
            .add(crate::calendar::CalendarPlugin)
            .add(crate::world::WorldPlugin)
            .add(crate::player::PlayerPlugin)
            .add(crate::animals::AnimalPlugin)
            .add(crate::trees::TreePlugin)
            .add(crate::ui::UiPlugin)
    }
}

/// Input reading, sprites, camera, overlays and panels.
pub struct PresentationPlugins;

impl PluginGroup for PresentationPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(crate::input::FrameInputPlugin)
            .add(crate::world::WorldRenderPlugin)
            .add(crate::ui::UiRenderPlugin)
    }
}
