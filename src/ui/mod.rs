//! UI domain: the panels, the arbiter between them and screen transitions.
//!
//! Responsible for:
//! - Routing this tick's input to the panels through `UiArbiter`
//! - Running the sleep and boat transitions and sending `SceneChangeEvent`
//! - Drawing the panels, the fade and cutscene overlays and the F3 overlay
//!
//! `UiArbiter` and `TransitionDirector` are built from the sprite catalog
//! and inserted before the app runs.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::animals::Animal;
use crate::calendar::{roll_day_on_sleep, DayCycle};
use crate::config::GameConfig;
use crate::error::StartupError;
use crate::frame::{ui_may_dispatch, FrameSet};
use crate::input::FrameInput;
use crate::player::interaction::{apply_teleport, ride_boat};
use crate::player::skills::Skills;
use crate::player::tools::player_input;
use crate::shared::*;
use crate::world::sprites::{SpriteCatalog, SpriteFrames, SpriteLibrary};
use crate::world::CameraOffset;

pub mod animal_panel;
pub mod arbiter;
pub mod day_display;
pub mod debug_overlay;
pub mod present;
pub mod skills_panel;
pub mod transitions;

use animal_panel::{AnimalPanel, AnimalView};
use arbiter::{UiArbiter, UiComponent, UiContext};
use day_display::DayDisplay;
use skills_panel::SkillsPanel;
use transitions::TransitionDirector;

/// The panels in dispatch and draw order.
pub fn standard_panels(
    catalog: &SpriteCatalog,
    cfg: &GameConfig,
) -> Result<Vec<Box<dyn UiComponent>>, StartupError> {
    Ok(vec![
        Box::new(DayDisplay::new(catalog, cfg)?),
        Box::new(AnimalPanel::new(catalog)?),
        Box::new(SkillsPanel::new(catalog, cfg)?),
    ])
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGINS
// ═══════════════════════════════════════════════════════════════════════

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SceneChangeEvent>()
            .add_systems(
                Update,
                dispatch_ui_events
                    .before(ride_boat)
                    .before(crate::animals::interaction::love_clicked_animal)
                    .in_set(FrameSet::Events)
                    .run_if(ui_may_dispatch),
            )
            .add_systems(
                Update,
                poll_ui_input
                    .before(player_input)
                    .in_set(FrameSet::Input)
                    .run_if(ui_may_dispatch),
            )
            .add_systems(
                Update,
                transitions::update_transitions
                    .before(roll_day_on_sleep)
                    .before(apply_teleport)
                    .in_set(FrameSet::Transitions),
            );
    }
}

pub struct UiRenderPlugin;

impl Plugin for UiRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<present::UiDrawList>()
            .init_resource::<debug_overlay::DebugOverlayState>()
            .add_systems(
                Startup,
                (spawn_transition_overlays, debug_overlay::spawn_debug_overlay),
            )
            .add_systems(
                Update,
                (present::collect_ui_draws, present::present_ui_draws)
                    .chain()
                    .in_set(FrameSet::UiRender),
            )
            .add_systems(
                Update,
                (
                    update_transition_overlays,
                    debug_overlay::toggle_debug_overlay,
                    debug_overlay::update_debug_overlay,
                )
                    .chain()
                    .in_set(FrameSet::Overlay),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DISPATCH
// ═══════════════════════════════════════════════════════════════════════

/// Everything a panel reads, gathered once per system run.
#[derive(SystemParam)]
pub struct UiSnapshot<'w, 's> {
    input: Res<'w, FrameInput>,
    offset: Res<'w, CameraOffset>,
    day: Res<'w, DayCycle>,
    cfg: Res<'w, GameConfig>,
    animals: Query<'w, 's, (Entity, &'static Animal)>,
    skills: Query<'w, 's, &'static Skills>,
}

impl UiSnapshot<'_, '_> {
    pub fn animal_views(&self) -> Vec<AnimalView> {
        self.animals.iter().map(|(e, a)| AnimalView::of(e, a)).collect()
    }

    pub fn context<'a>(&'a self, animals: &'a [AnimalView]) -> UiContext<'a> {
        UiContext {
            input: &self.input,
            camera_offset: self.offset.0,
            animals,
            skills: self.skills.get_single().ok(),
            day: &self.day,
            cfg: &self.cfg,
        }
    }
}

pub fn dispatch_ui_events(snapshot: UiSnapshot, mut arbiter: ResMut<UiArbiter>) {
    let animals = snapshot.animal_views();
    let ctx = snapshot.context(&animals);
    for event in &ctx.input.events {
        arbiter.dispatch_event(event, &ctx);
    }
}

pub fn poll_ui_input(snapshot: UiSnapshot, mut arbiter: ResMut<UiArbiter>) {
    let animals = snapshot.animal_views();
    let ctx = snapshot.context(&animals);
    arbiter.poll_input(&ctx);
}

// ═══════════════════════════════════════════════════════════════════════
// TRANSITION OVERLAYS
// ═══════════════════════════════════════════════════════════════════════

const CUTSCENE_Z: i32 = 900;
const FADE_Z: i32 = 1000;

#[derive(Component)]
pub struct FadeOverlay;

#[derive(Component)]
pub struct CutsceneOverlay;

fn full_screen() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        position_type: PositionType::Absolute,
        ..default()
    }
}

fn spawn_transition_overlays(mut commands: Commands) {
    commands.spawn((
        CutsceneOverlay,
        ImageNode::default(),
        full_screen(),
        GlobalZIndex(CUTSCENE_Z),
        Visibility::Hidden,
    ));
    commands.spawn((
        FadeOverlay,
        full_screen(),
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        GlobalZIndex(FADE_Z),
    ));
}

/// Fade darkness, the cutscene frame and the mouse cursor, which is hidden
/// while a cutscene plays.
fn update_transition_overlays(
    director: Res<TransitionDirector>,
    library: Res<SpriteLibrary>,
    mut fades: Query<&mut BackgroundColor, With<FadeOverlay>>,
    mut cutscenes: Query<(&mut ImageNode, &mut Visibility), With<CutsceneOverlay>>,
    mut windows: Query<&mut Window>,
) {
    let alpha = 1.0 - director.fade() / 255.0;
    for mut bg in &mut fades {
        *bg = BackgroundColor(Color::srgba(0.0, 0.0, 0.0, alpha));
    }

    let playing = director.boat.cutscene().filter(|c| c.is_active());
    for (mut node, mut vis) in &mut cutscenes {
        let frame = playing
            .map(|c| SpriteFrames { seq: c.seq, frame: c.frame() })
            .and_then(|frames| library.handle(&frames));
        match frame {
            Some(image) => {
                node.image = image;
                *vis = Visibility::Inherited;
            }
            None => *vis = Visibility::Hidden,
        }
    }

    for mut window in &mut windows {
        let visible = playing.is_none();
        if window.cursor_options.visible != visible {
            window.cursor_options.visible = visible;
        }
    }
}
