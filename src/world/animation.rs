//! Frame cursors and the generic animation lifecycles built on them.

use bevy::prelude::*;
use rand::Rng;

use super::sprites::{SpriteCatalog, SpriteFrames};
use crate::timers::GameTimer;

/// Fractional position within a frame sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCursor {
    pub index: f32,
    pub speed: f32,
}

impl FrameCursor {
    pub fn new(speed: f32) -> Self {
        Self { index: 0.0, speed }
    }

    /// Starts on a uniformly random frame.
    pub fn random_start(speed: f32, len: usize, rng: &mut impl Rng) -> Self {
        Self {
            index: rng.gen_range(0..len.max(1)) as f32,
            speed,
        }
    }

    /// Moves forward; on reaching `len` wraps to zero and returns `true`.
    pub fn advance(&mut self, dt: f32, len: usize) -> bool {
        self.index += self.speed * dt;
        if self.index >= len as f32 {
            self.index = 0.0;
            return true;
        }
        false
    }

    pub fn frame(&self, len: usize) -> usize {
        (self.index as usize).min(len.saturating_sub(1))
    }

    pub fn reset(&mut self) {
        self.index = 0.0;
    }
}

/// Scenery that loops forever (water, boats).
#[derive(Component, Debug, Clone)]
pub struct LoopingAnimation(pub FrameCursor);

/// Plays its sequence a fixed number of times, then despawns.
#[derive(Component, Debug, Clone)]
pub struct OneShotAnimation {
    pub cursor: FrameCursor,
    pub cycles_left: u32,
}

impl OneShotAnimation {
    pub fn once(speed: f32) -> Self {
        Self {
            cursor: FrameCursor::new(speed),
            cycles_left: 1,
        }
    }
}

/// Despawns the entity when the timer fires.
#[derive(Component, Debug, Clone)]
pub struct Lifetime(pub GameTimer);

impl Lifetime {
    pub fn seconds(seconds: f32) -> Self {
        Self(GameTimer::new(seconds).autostart())
    }
}

// ─── Systems ──────────────────────────────────────────────────────────────────

pub fn animate_looping(
    time: Res<Time>,
    catalog: Res<SpriteCatalog>,
    mut query: Query<(&mut LoopingAnimation, &mut SpriteFrames)>,
) {
    let dt = time.delta_secs();
    for (mut anim, mut frames) in &mut query {
        let len = catalog.len_of(frames.seq);
        anim.0.advance(dt, len);
        frames.frame = anim.0.frame(len);
    }
}

pub fn animate_one_shots(
    mut commands: Commands,
    time: Res<Time>,
    catalog: Res<SpriteCatalog>,
    mut query: Query<(Entity, &mut OneShotAnimation, &mut SpriteFrames)>,
) {
    let dt = time.delta_secs();
    for (entity, mut anim, mut frames) in &mut query {
        let len = catalog.len_of(frames.seq);
        if anim.cursor.advance(dt, len) {
            anim.cycles_left = anim.cycles_left.saturating_sub(1);
            if anim.cycles_left == 0 {
                commands.entity(entity).despawn();
                continue;
            }
        }
        frames.frame = anim.cursor.frame(len);
    }
}

pub fn expire_lifetimes(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Lifetime)>,
) {
    for (entity, mut lifetime) in &mut query {
        if lifetime.0.tick(time.delta()) {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cursor_wraps_exactly_at_length() {
        let mut cursor = FrameCursor::new(4.0);
        assert!(!cursor.advance(0.5, 3));
        assert_eq!(cursor.frame(3), 2);
        assert!(cursor.advance(0.25, 3));
        assert_eq!(cursor.frame(3), 0);
    }

    #[test]
    fn test_random_start_is_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let cursor = FrameCursor::random_start(1.0, 4, &mut rng);
            assert!(cursor.frame(4) < 4);
        }
    }
}
