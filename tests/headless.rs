//! Headless integration tests for Cup Nooble.
//!
//! These tests run the simulation plugins on the shipped map and sprite
//! manifest without a window or GPU. Input is injected by writing
//! `FrameInput`, time advances in fixed quarter-second steps.
//!
//! Run with: `cargo test --test headless`

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cupnooble::animals::{Animal, WalkArea};
use cupnooble::bootstrap::GameResources;
use cupnooble::calendar::{DayCycle, Weather, WeatherCategory, WeatherType};
use cupnooble::config::GameConfig;
use cupnooble::frame::SimulationPlugins;
use cupnooble::input::{FrameInput, GameKey, PointerButton};
use cupnooble::player::skills::Skills;
use cupnooble::player::Player;
use cupnooble::shared::*;
use cupnooble::trees::{Tree, TreeStatus};
use cupnooble::ui::arbiter::UiArbiter;
use cupnooble::ui::transitions::TransitionDirector;
use cupnooble::world::layout::AnimalSpec;
use cupnooble::world::sprites::{SeqId, SpriteFrames};
use cupnooble::world::{Bed, Boat};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

const STEP: Duration = Duration::from_millis(250);

#[derive(Resource, Default)]
struct Counted {
    nights: usize,
    days_rolled: usize,
}

fn count_events(
    mut nights: EventReader<NightFellEvent>,
    mut rolled: EventReader<DayRolledEvent>,
    mut counted: ResMut<Counted>,
) {
    counted.nights += nights.read().count();
    counted.days_rolled += rolled.read().count();
}

/// Loads the shipped data, adds the simulation and runs Startup.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));
    GameResources::load(Path::new("assets"))
        .expect("shipped data loads")
        .insert_into(&mut app);
    app.add_plugins(SimulationPlugins);
    app.init_resource::<Counted>().add_systems(Last, count_events);
    app.update();
    app
}

fn run(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn input(app: &mut App) -> Mut<'_, FrameInput> {
    app.world_mut().resource_mut::<FrameInput>()
}

fn player(app: &mut App) -> Player {
    let world = app.world_mut();
    world.query::<&Player>().single(world).clone()
}

fn set_weather(app: &mut App, temperature: i32, weather: Weather) {
    let cfg = GameConfig::default();
    let day = DayCycle::with_state(&cfg, temperature, weather, &mut StdRng::seed_from_u64(3));
    app.insert_resource(day);
}

fn calm_day(app: &mut App) {
    let sunny = Weather::new(WeatherCategory::Normal, WeatherType::Sunny).unwrap();
    set_weather(app, 4, sunny);
}

// ─────────────────────────────────────────────────────────────────────────────
// World
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_shipped_world_spawns() {
    let mut app = build_test_app();
    let world = app.world_mut();

    assert_eq!(world.query::<&Player>().iter(world).count(), 1);
    assert_eq!(world.query::<&Boat>().iter(world).count(), 2);
    assert_eq!(world.query::<&Bed>().iter(world).count(), 1);
    assert_eq!(world.query::<&Tree>().iter(world).count(), 8);
    assert_eq!(world.query::<&Animal>().iter(world).count(), 5);

    let skills = world.query::<&Skills>().single(world).clone();
    assert_eq!(skills, Skills::default());
}

// ─────────────────────────────────────────────────────────────────────────────
// Day clock
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_night_falls_once_and_clock_stops_at_day_length() {
    let mut app = build_test_app();
    calm_day(&mut app);

    // 50 seconds of play against a 20 second day.
    run(&mut app, 200);

    let cfg = GameConfig::default();
    let day = app.world().resource::<DayCycle>();
    assert_eq!(app.world().resource::<Counted>().nights, 1);
    assert_eq!(day.current_time(), cfg.day.length);
    assert!(day.is_night_time(&cfg));
    assert_eq!(day.weather().category(), WeatherCategory::Night);
    assert_eq!(day.temperature(), 2);
    assert_eq!(day.day(), 0);
}

#[test]
fn test_cold_heavy_rain_turns_to_snow_at_night() {
    let mut app = build_test_app();
    let heavy = Weather::new(WeatherCategory::Normal, WeatherType::HeavyRain).unwrap();
    set_weather(&mut app, 1, heavy);

    run(&mut app, 100);

    let day = app.world().resource::<DayCycle>();
    assert_eq!(day.temperature(), 0);
    assert_eq!(
        day.weather(),
        Weather::new(WeatherCategory::Night, WeatherType::Snowy).unwrap()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Trees and skills
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_axe_blows_fell_a_tree_and_level_woodcutting() {
    let mut app = build_test_app();
    calm_day(&mut app);

    let (entity, target, actor) = {
        let world = app.world_mut();
        let (entity, tree) = world.query::<(Entity, &Tree)>().iter(world).next().unwrap();
        let actor = tree.rect.center() + Vec2::new(200.0, 0.0);
        (entity, tree.interaction_rect.center(), actor)
    };
    let blow = ToolActionEvent { tool: ToolKind::Axe, target, actor_center: actor };

    for _ in 0..5 {
        app.world_mut().send_event(blow);
        app.update();
    }

    let tree = app.world().get::<Tree>(entity).unwrap();
    assert_eq!(tree.status, TreeStatus::Stump);
    let stump_target = tree.interaction_rect.center();
    let world = app.world_mut();
    let skills = world.query::<&Skills>().single(world).clone();
    assert_eq!(skills.woodcutting.xp, 250);
    assert_eq!(skills.woodcutting.level, 3);
    assert_eq!(skills.woodcutting.next_level_xp, 400);
    assert_eq!(skills.farming.level, 1);

    // The stump takes two more, aimed at its lower interaction area.
    let stump_blow = ToolActionEvent { target: stump_target, ..blow };
    for _ in 0..2 {
        app.world_mut().send_event(stump_blow);
        app.update();
    }
    assert!(app.world().get::<Tree>(entity).is_none());
}

#[test]
fn test_other_tools_leave_trees_alone() {
    let mut app = build_test_app();
    calm_day(&mut app);

    let (entity, target) = {
        let world = app.world_mut();
        let (entity, tree) = world.query::<(Entity, &Tree)>().iter(world).next().unwrap();
        (entity, tree.interaction_rect.center())
    };
    for _ in 0..6 {
        app.world_mut().send_event(ToolActionEvent {
            tool: ToolKind::Hoe,
            target,
            actor_center: target,
        });
        app.update();
    }
    let tree = app.world().get::<Tree>(entity).unwrap();
    assert_eq!(tree.status, TreeStatus::Tree);
    assert_eq!(tree.health, GameConfig::default().trees.tree_health);
}

// ─────────────────────────────────────────────────────────────────────────────
// UI arbiter
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_skills_button_claims_ui_and_escape_releases_it() {
    let mut app = build_test_app();
    calm_day(&mut app);

    input(&mut app).click(PointerButton::Primary, Vec2::new(30.0, 690.0));
    app.update();
    assert_eq!(app.world().resource::<UiArbiter>().active_name(), Some("Skills panel"));

    // The open panel keeps the player from swinging.
    input(&mut app).hold(GameKey::Axe);
    run(&mut app, 3);
    input(&mut app).release(GameKey::Axe);
    assert!(!player(&mut app).is_using_tool());
    assert_eq!(app.world().resource::<UiArbiter>().active_name(), Some("Skills panel"));

    input(&mut app).press(GameKey::Escape);
    app.update();
    input(&mut app).release(GameKey::Escape);
    assert!(!app.world().resource::<UiArbiter>().is_active());
}

#[test]
fn test_clicking_elsewhere_opens_nothing() {
    let mut app = build_test_app();
    calm_day(&mut app);

    input(&mut app).click(PointerButton::Primary, Vec2::new(640.0, 360.0));
    app.update();
    assert!(!app.world().resource::<UiArbiter>().is_active());
}

#[test]
fn test_swinging_a_tool_closes_the_skills_panel_first() {
    let mut app = build_test_app();
    calm_day(&mut app);

    input(&mut app).hold(GameKey::Hoe);
    app.update();
    input(&mut app).release(GameKey::Hoe);
    assert!(player(&mut app).is_using_tool());

    // Clicks during the swing are ignored.
    input(&mut app).click(PointerButton::Primary, Vec2::new(30.0, 690.0));
    app.update();
    assert!(!app.world().resource::<UiArbiter>().is_active());
}

// ─────────────────────────────────────────────────────────────────────────────
// Transitions
// ─────────────────────────────────────────────────────────────────────────────

fn run_transition(app: &mut App) {
    for _ in 0..200 {
        app.update();
        if !app.world().resource::<TransitionDirector>().is_active() {
            return;
        }
    }
    panic!("transition never finished");
}

#[test]
fn test_sleep_transition_rolls_exactly_one_day() {
    let mut app = build_test_app();
    calm_day(&mut app);

    app.world_mut().resource_scope(|world, mut director: Mut<TransitionDirector>| {
        let mut arbiter = world.resource_mut::<UiArbiter>();
        director.start_sleep(&mut arbiter);
    });
    assert!(app.world().resource::<TransitionDirector>().is_active());
    run_transition(&mut app);

    let day = app.world().resource::<DayCycle>();
    assert_eq!(day.day(), 1);
    assert_eq!(day.day_of_week(), "tue");
    assert!(day.current_time() < GameConfig::default().day.length);
    assert_eq!(app.world().resource::<Counted>().days_rolled, 1);
    assert_eq!(app.world().resource::<TransitionDirector>().fade(), 255.0);
}

#[test]
fn test_boat_ride_lands_player_at_the_other_boat() {
    let mut app = build_test_app();
    calm_day(&mut app);

    let (west, east) = {
        let world = app.world_mut();
        let mut boats: Vec<(Facing, Rect)> = world
            .query::<(&Boat, &Footprint)>()
            .iter(world)
            .map(|(b, f)| (b.orientation, f.0))
            .collect();
        boats.sort_by(|a, b| a.1.min.x.total_cmp(&b.1.min.x));
        (boats[0].1, boats[1].1)
    };

    {
        let world = app.world_mut();
        let mut query = world.query::<(&mut Player, &mut Footprint)>();
        let (mut player, mut footprint) = query.single_mut(world);
        player.teleport(west.mid_top());
        player.facing = Facing::Down;
        footprint.0 = player.rect;
    }

    input(&mut app).press(GameKey::Return);
    app.update();
    input(&mut app).release(GameKey::Return);
    assert!(app.world().resource::<TransitionDirector>().is_active());

    run_transition(&mut app);
    let landed = player(&mut app).hitbox.mid_bottom();
    assert!(landed.distance(east.mid_top()) < 1e-3, "landed at {landed}");
    assert_eq!(app.world().resource::<DayCycle>().day(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Animals
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_animal_in_a_one_tile_pen_never_walks() {
    let mut app = build_test_app();
    calm_day(&mut app);

    let center = Vec2::new(3000.0, 3000.0);
    let spec = AnimalSpec {
        species: Species::Chicken,
        color: "brown".into(),
        nickname: "Solo".into(),
        center,
    };
    let animal = Animal::new(&spec, Vec2::splat(64.0), &GameConfig::default(), &mut StdRng::seed_from_u64(9));
    let rect = animal.rect;
    let id = app
        .world_mut()
        .spawn((
            animal,
            WalkArea(vec![Rect::from_center_size(center, Vec2::splat(32.0))]),
            SpriteFrames::new(SeqId(0)),
            Footprint(rect),
        ))
        .id();

    // Long enough for many animation cycles and therefore many Run rolls.
    run(&mut app, 400);

    let animal = app.world().get::<Animal>(id).unwrap();
    assert!(animal.target.is_none());
    assert!(!animal.is_running());
    assert_eq!(animal.pos, center);
}
