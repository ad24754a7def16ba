//! Weather particle effects: falling particles and the decals they leave.
//!
//! Falling particles drift across the whole map and, when their lifetime
//! runs out, leave a floor decal where they died: a puddle for the rain
//! family, a snow pile for snow, a grass pile otherwise. Decals never land on
//! water, paths or the house floor.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use super::animation::{FrameCursor, Lifetime, LoopingAnimation, OneShotAnimation};
use super::layout::DisallowedFloor;
use super::sprites::{SeqId, SpriteCatalog, SpriteFrames};
use crate::calendar::DayCycle;
use crate::config::{GameConfig, ParticleKind, WeatherParticleConfig};
use crate::error::StartupError;
use crate::shared::*;
use crate::timers::GameTimer;

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS & RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// A particle drifting across the map.
#[derive(Component, Debug, Clone)]
pub struct FallingParticle {
    /// Map-space centre, unrounded.
    pub pos: Vec2,
    /// Unit direction.
    pub direction: Vec2,
    pub speed: f32,
    /// Decides which decal it leaves; fixed at spawn.
    pub kind: ParticleKind,
    pub death: GameTimer,
}

/// A decal resting on the ground.
#[derive(Component, Debug, Clone, Copy)]
pub struct FloorParticle;

/// Sequence ids of every particle image.
#[derive(Debug, Clone)]
pub struct ParticleSeqs {
    falling: Vec<(ParticleKind, SeqId)>,
    puddle: SeqId,
}

impl ParticleSeqs {
    pub fn resolve(catalog: &SpriteCatalog) -> Result<Self, StartupError> {
        let falling = ParticleKind::ALL
            .iter()
            .map(|&kind| {
                catalog
                    .id(&format!("particles/weather/{}", kind.asset_key()))
                    .map(|seq| (kind, seq))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            falling,
            puddle: catalog.id("particles/weather/puddle")?,
        })
    }

    pub fn falling(&self, kind: ParticleKind) -> SeqId {
        self.falling
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, seq)| *seq)
            .unwrap_or(self.puddle)
    }
}

#[derive(Resource, Debug, Clone)]
pub struct WeatherParticles {
    pub seqs: ParticleSeqs,
    pub refresh: GameTimer,
}

impl WeatherParticles {
    pub fn new(catalog: &SpriteCatalog, cfg: &WeatherParticleConfig) -> Result<Self, StartupError> {
        Ok(Self {
            seqs: ParticleSeqs::resolve(catalog)?,
            refresh: GameTimer::repeating(cfg.refresh_period).autostart(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RULES
// ═══════════════════════════════════════════════════════════════════════

/// How many falling particles one refresh adds. Large shortfalls fill in
/// gradually.
pub fn top_up_count(current: usize, target: usize, cfg: &WeatherParticleConfig) -> usize {
    let shortfall = target.saturating_sub(current);
    if shortfall > cfg.damping_threshold {
        shortfall / cfg.damping_divisor.max(1)
    } else {
        shortfall
    }
}

/// What a dying particle of `kind` leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decal {
    Puddle,
    SnowPile,
    GrassPile,
}

pub fn decal_for(kind: ParticleKind) -> Decal {
    match kind {
        ParticleKind::Rain | ParticleKind::Thunder | ParticleKind::HeavyRain => Decal::Puddle,
        ParticleKind::Snowy => Decal::SnowPile,
        ParticleKind::Grass => Decal::GrassPile,
    }
}

fn random_map_point(map_size: Vec2, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(0..map_size.x.max(1.0) as u32) as f32,
        rng.gen_range(0..map_size.y.max(1.0) as u32) as f32,
    )
}

fn int_in(range: (f32, f32), rng: &mut impl Rng) -> f32 {
    let (lo, hi) = (range.0.round() as i32, range.1.round() as i32);
    rng.gen_range(lo..=hi.max(lo)) as f32
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWNING
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_falling_particle(
    commands: &mut Commands,
    kind: ParticleKind,
    random_frame: bool,
    particles: &WeatherParticles,
    catalog: &SpriteCatalog,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) {
    let profile = cfg.particles.profile(kind);
    let seq = particles.seqs.falling(kind);
    let len = catalog.len_of(seq);
    let size = catalog.size_of(seq);
    let pos = random_map_point(cfg.map_size(), rng);
    let cursor = if random_frame {
        FrameCursor::random_start(profile.animation_speed, len, rng)
    } else {
        FrameCursor::new(profile.animation_speed)
    };
    let lifetime = rng.gen_range(profile.lifetime.0..=profile.lifetime.1.max(profile.lifetime.0));

    commands.spawn((
        FallingParticle {
            pos,
            direction: Vec2::new(profile.direction.0, profile.direction.1).normalize_or_zero(),
            speed: int_in(profile.speed, rng),
            kind,
            death: GameTimer::new(lifetime).autostart(),
        },
        SpriteFrames { seq, frame: cursor.frame(len) },
        LoopingAnimation(cursor),
        Footprint(Rect::from_center_size(pos.round(), size)),
        DrawLayer::FallingParticles,
        Transform::default(),
        Visibility::default(),
    ));
}

/// Places a decal where a particle died. `from` is the dying particle's
/// image and rect; `None` means seeding at a random spot.
#[allow(clippy::too_many_arguments)]
pub fn spawn_decal(
    commands: &mut Commands,
    decal: Decal,
    from: Option<(SpriteFrames, Rect)>,
    particles: &WeatherParticles,
    catalog: &SpriteCatalog,
    floor: &DisallowedFloor,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) {
    match decal {
        Decal::Puddle => {
            let seq = particles.seqs.puddle;
            let size = catalog.size_of(seq);
            let (rect, anim) = match from {
                Some((_, rect)) => (
                    Rect::from_top_left(rect.min, size),
                    OneShotAnimation::once(cfg.particles.puddle_animation_speed),
                ),
                None => {
                    let len = catalog.len_of(seq);
                    let rect = Rect::from_top_left(random_map_point(cfg.map_size(), rng), size);
                    let anim = OneShotAnimation {
                        cursor: FrameCursor::random_start(cfg.particles.puddle_animation_speed, len, rng),
                        cycles_left: 2,
                    };
                    (rect, anim)
                }
            };
            if !floor.permits(rect) {
                return;
            }
            commands.spawn((
                FloorParticle,
                SpriteFrames { seq, frame: anim.cursor.frame(catalog.len_of(seq)) },
                anim,
                Footprint(rect),
                DrawLayer::FloorParticles,
                Transform::default(),
                Visibility::default(),
            ));
        }
        Decal::SnowPile | Decal::GrassPile => {
            let (frames, rect) = match from {
                Some(found) => found,
                None => {
                    let kind = if decal == Decal::SnowPile {
                        ParticleKind::Snowy
                    } else {
                        ParticleKind::Grass
                    };
                    let seq = particles.seqs.falling(kind);
                    let rect = Rect::from_top_left(
                        random_map_point(cfg.map_size(), rng),
                        catalog.size_of(seq),
                    );
                    (random_frame(seq, catalog, rng), rect)
                }
            };
            if !floor.permits(rect) {
                return;
            }
            commands.spawn((
                FloorParticle,
                frames,
                Lifetime::seconds(cfg.particles.floor_lifetime),
                Footprint(rect),
                DrawLayer::FloorParticles,
                Transform::default(),
                Visibility::default(),
            ));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Clears every particle and seeds a fresh screenful for today's weather.
/// Runs at startup and whenever a new day begins.
pub fn seed_weather_particles(
    mut commands: Commands,
    mut rolled: EventReader<DayRolledEvent>,
    mut seeded: Local<bool>,
    day: Res<DayCycle>,
    particles: Res<WeatherParticles>,
    catalog: Res<SpriteCatalog>,
    floor: Res<DisallowedFloor>,
    cfg: Res<GameConfig>,
    existing: Query<Entity, Or<(With<FallingParticle>, With<FloorParticle>)>>,
) {
    let new_day = rolled.read().count() > 0;
    if *seeded && !new_day {
        return;
    }
    *seeded = true;

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let kind = day.weather().kind().particle_kind();
    let amount = cfg.particles.profile(kind).amount;
    let mut rng = rand::thread_rng();
    for _ in 0..amount {
        spawn_falling_particle(&mut commands, kind, true, &particles, &catalog, &cfg, &mut rng);
        spawn_decal(&mut commands, decal_for(kind), None, &particles, &catalog, &floor, &cfg, &mut rng);
    }
    info!("[World] Seeded {amount} {} particles", kind.asset_key());
}

/// Moves falling particles; expired ones turn into decals.
pub fn update_falling_particles(
    mut commands: Commands,
    time: Res<Time>,
    particles: Res<WeatherParticles>,
    catalog: Res<SpriteCatalog>,
    floor: Res<DisallowedFloor>,
    cfg: Res<GameConfig>,
    mut query: Query<(Entity, &mut FallingParticle, &SpriteFrames, &mut Footprint)>,
) {
    let mut rng = rand::thread_rng();
    for (entity, mut particle, frames, mut footprint) in &mut query {
        if particle.death.tick(time.delta()) {
            let from = Some((*frames, footprint.0));
            let decal = decal_for(particle.kind);
            spawn_decal(&mut commands, decal, from, &particles, &catalog, &floor, &cfg, &mut rng);
            commands.entity(entity).despawn();
            continue;
        }
        let step = particle.direction * particle.speed * time.delta_secs();
        particle.pos += step;
        footprint.0 = footprint.0.with_center(particle.pos.round());
    }
}

/// Tops up the falling particles on a fixed period.
pub fn refresh_weather_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: ResMut<WeatherParticles>,
    day: Res<DayCycle>,
    catalog: Res<SpriteCatalog>,
    cfg: Res<GameConfig>,
    falling: Query<(), With<FallingParticle>>,
) {
    if !particles.refresh.tick(time.delta()) {
        return;
    }
    let kind = day.weather().kind().particle_kind();
    let target = cfg.particles.profile(kind).amount;
    let count = top_up_count(falling.iter().count(), target, &cfg.particles);
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        spawn_falling_particle(&mut commands, kind, false, &particles, &catalog, &cfg, &mut rng);
    }
}

/// A random frame of a sequence, for callers that need a variety.
pub fn random_frame(seq: SeqId, catalog: &SpriteCatalog, rng: &mut impl Rng) -> SpriteFrames {
    let frames: Vec<usize> = (0..catalog.len_of(seq)).collect();
    SpriteFrames { seq, frame: frames.choose(rng).copied().unwrap_or(0) }
}
