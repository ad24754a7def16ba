//! Animals domain: chickens and cows wandering their pens.
//!
//! Responsible for:
//! - Spawning the animals listed in each pen
//! - Per-species status machines, advanced when an animation cycle ends
//! - Walking to destinations picked inside the pen's walk area
//! - Love: hearts and a cooldown, given by clicking a nearby animal

use std::collections::HashMap;

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::error::StartupError;
use crate::frame::{world_may_dispatch, FrameSet};
use crate::player::interaction::go_to_sleep;
use crate::shared::*;
use crate::timers::GameTimer;
use crate::world::animation::FrameCursor;
use crate::world::layout::AnimalSpec;
use crate::world::sprites::{FrameTable, SpriteCatalog, SpriteFrames};
use crate::world::WorldLayout;

pub mod behavior;
pub mod interaction;

pub use behavior::AnimalStatus;

pub struct AnimalPlugin;

impl Plugin for AnimalPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_animals)
            .add_systems(
                Update,
                interaction::love_clicked_animal
                    .after(go_to_sleep)
                    .in_set(FrameSet::Events)
                    .run_if(world_may_dispatch),
            )
            .add_systems(Update, update_animals.in_set(FrameSet::Actors));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Component, Debug, Clone)]
pub struct Animal {
    pub species: Species,
    pub color: String,
    pub nickname: String,
    /// Unrounded centre.
    pub pos: Vec2,
    pub rect: Rect,
    /// Where clicks and hovers land: the lower part of the sprite.
    pub interaction_rect: Rect,
    /// Only ever left or right.
    pub facing: Facing,
    pub status: AnimalStatus,
    pub cursor: FrameCursor,
    pub speed: f32,
    pub target: Option<Vec2>,
    pub direction: Vec2,
    pub love_hearts: u32,
    pub love_timer: GameTimer,
}

/// Shrunken tiles the animal may walk to.
#[derive(Component, Debug, Clone)]
pub struct WalkArea(pub Vec<Rect>);

impl Animal {
    pub fn new(spec: &AnimalSpec, size: Vec2, cfg: &GameConfig, rng: &mut impl Rng) -> Self {
        let rect = Rect::from_center_size(spec.center, size);
        let (lo, hi) = cfg.animals.animation_speed;
        let speed = match spec.species {
            Species::Chicken => cfg.animals.chicken_speed,
            Species::Cow => cfg.animals.cow_speed,
        };
        let mut animal = Self {
            species: spec.species,
            color: spec.color.clone(),
            nickname: spec.nickname.clone(),
            pos: rect.center(),
            rect,
            interaction_rect: rect,
            facing: *[Facing::Left, Facing::Right].choose(rng).unwrap_or(&Facing::Right),
            status: AnimalStatus::Idle,
            cursor: FrameCursor::new(rng.gen_range(lo..=hi.max(lo))),
            speed,
            target: None,
            direction: Vec2::ZERO,
            love_hearts: 0,
            love_timer: GameTimer::new(cfg.animals.love_cooldown),
        };
        animal.interaction_rect = Self::interaction_for(rect);
        animal
    }

    fn interaction_for(rect: Rect) -> Rect {
        rect.inflated(0.0, -rect.height() * 0.4).with_mid_bottom(rect.mid_bottom())
    }

    pub fn is_idling(&self) -> bool {
        self.status == AnimalStatus::Idle
    }

    pub fn is_running(&self) -> bool {
        self.status == AnimalStatus::Run
    }

    pub fn love(&mut self) {
        self.status = AnimalStatus::Love;
        self.cursor.reset();
        self.love_hearts += 1;
        self.love_timer.activate();
    }

    fn place(&mut self, center: Vec2) {
        self.rect = self.rect.with_center(center);
        self.interaction_rect = self.interaction_rect.with_mid_bottom(self.rect.mid_bottom());
    }

    /// Starts running to `target`, facing the way it lies.
    pub fn run_to(&mut self, target: Vec2) {
        self.facing = if target.x < self.pos.x { Facing::Left } else { Facing::Right };
        self.direction = (target - self.pos).normalize_or_zero();
        self.target = Some(target);
        self.status = AnimalStatus::Run;
    }

    /// Moves toward the target. Arrives when within `tile_size / 20` or when
    /// the step would carry it past the target, snapping onto it and going
    /// idle. Returns `true` on arrival.
    pub fn step(&mut self, dt: f32, tile_size: f32) -> bool {
        let Some(target) = self.target.filter(|_| self.is_running()) else {
            return false;
        };
        self.pos += self.direction * self.speed * dt;
        self.place(self.pos.round());

        let overshot = (target - self.pos).dot(self.direction) < 0.0;
        if self.pos.distance(target) < tile_size / 20.0 || overshot {
            self.pos = target;
            self.place(target);
            self.target = None;
            self.direction = Vec2::ZERO;
            self.cursor.reset();
            self.status = AnimalStatus::Idle;
            return true;
        }
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sprites
// ─────────────────────────────────────────────────────────────────────────────

/// Frame tables per species and colour.
#[derive(Resource, Debug, Clone, Default)]
pub struct AnimalSprites {
    tables: HashMap<(Species, String), FrameTable<AnimalStatus>>,
}

impl AnimalSprites {
    /// Resolves a table for every species and colour placed on the map.
    pub fn resolve(catalog: &SpriteCatalog, layout: &WorldLayout) -> Result<Self, StartupError> {
        let mut tables = HashMap::new();
        for spec in layout.pens.iter().flat_map(|p| &p.animals) {
            let key = (spec.species, spec.color.clone());
            if tables.contains_key(&key) {
                continue;
            }
            let prefix = format!("{}/{}", spec.species.asset_key(), spec.color);
            let table = FrameTable::build(
                catalog,
                &prefix,
                &[Facing::Left, Facing::Right],
                AnimalStatus::of(spec.species),
                AnimalStatus::asset_key,
            )?;
            tables.insert(key, table);
        }
        Ok(Self { tables })
    }

    pub fn table(&self, species: Species, color: &str) -> Option<&FrameTable<AnimalStatus>> {
        self.tables.get(&(species, color.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

fn spawn_animals(
    mut commands: Commands,
    layout: Res<WorldLayout>,
    sprites: Res<AnimalSprites>,
    catalog: Res<SpriteCatalog>,
    cfg: Res<GameConfig>,
) {
    let mut rng = rand::thread_rng();
    for pen in &layout.pens {
        for spec in &pen.animals {
            let Some(table) = sprites.table(spec.species, &spec.color) else {
                warn!("[Animals] No frames for {} {}", spec.color, spec.species.asset_key());
                continue;
            };
            let idle = table.get(Facing::Right, AnimalStatus::Idle);
            let animal = Animal::new(spec, catalog.size_of(idle), &cfg, &mut rng);
            let seq = table.get(animal.facing, animal.status);
            commands.spawn((
                Footprint(animal.rect),
                animal,
                WalkArea(pen.walk_area.clone()),
                SpriteFrames::new(seq),
                DrawLayer::Main,
                Transform::default(),
                Visibility::default(),
            ));
        }
        info!("[Animals] Pen {} holds {} animals", pen.id, pen.animals.len());
    }
}

/// Love cooldown, then movement, then animation. A finished cycle rolls
/// the next status; rolling `Run` picks a destination.
pub fn update_animals(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    sprites: Res<AnimalSprites>,
    catalog: Res<SpriteCatalog>,
    solids: Query<&CollisionSurface>,
    mut animals: Query<(&mut Animal, &WalkArea, &mut SpriteFrames, &mut Footprint)>,
) {
    let dt = time.delta_secs();
    let tile = cfg.tile_size();
    let hitboxes: Vec<Rect> = solids.iter().map(|s| s.hitbox).collect();
    let mut rng = rand::thread_rng();

    for (mut animal, walk_area, mut frames, mut footprint) in &mut animals {
        animal.love_timer.tick(time.delta());
        animal.step(dt, tile);

        let Some(table) = sprites.table(animal.species, &animal.color) else {
            continue;
        };
        let len = catalog.len_of(table.get(animal.facing, animal.status));
        if animal.cursor.advance(dt, len) {
            let next = behavior::next_status(animal.species, animal.status, rng.gen_range(0..10));
            if next == AnimalStatus::Run && !animal.is_running() {
                let center = animal.interaction_rect.center();
                let picked = behavior::pick_walk_target(
                    animal.pos,
                    center,
                    &walk_area.0,
                    &hitboxes,
                    tile,
                    &cfg.animals,
                    &mut rng,
                );
                match picked {
                    Some(target) => animal.run_to(target),
                    None => {
                        debug!("[Animals] {} found nowhere to walk", animal.nickname);
                        animal.status = AnimalStatus::Idle;
                    }
                }
            } else {
                animal.status = next;
            }
        }

        let seq = table.get(animal.facing, animal.status);
        if frames.seq != seq {
            frames.seq = seq;
        }
        frames.frame = animal.cursor.frame(catalog.len_of(seq));
        footprint.0 = animal.rect;
    }
}
