//! Collision queries against the solid hitboxes of the world.

use bevy::prelude::*;

use crate::shared::RectExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Steps along the segment `start -> end`, both shifted by `offset`, every
/// `step` pixels. Returns `true` as soon as a sample point lies in a hitbox.
pub fn collide_line(start: Vec2, end: Vec2, offset: Vec2, hitboxes: &[Rect], step: f32) -> bool {
    let mut current = start + offset;
    let end = end + offset;
    let delta = end - current;
    let length = delta.length();
    if length == 0.0 || step <= 0.0 {
        return hitboxes.iter().any(|h| h.contains_point(current));
    }

    let dir = delta / length;
    let samples = (length / step).ceil() as usize + 1;
    for _ in 0..samples {
        current += dir * step;
        if hitboxes.iter().any(|h| h.contains_point(current)) {
            return true;
        }
        if current.distance(end) < step {
            return false;
        }
    }
    false
}

/// Pushes `hitbox` out of every overlapping solid along `axis`, back to the
/// side it was moving from. A zero `motion` leaves overlaps alone.
pub fn resolve_axis(hitbox: Rect, axis: Axis, motion: f32, solids: &[Rect]) -> Rect {
    let mut hitbox = hitbox;
    for solid in solids {
        if !solid.overlaps(&hitbox) {
            continue;
        }
        let shift = match axis {
            Axis::X if motion > 0.0 => Vec2::new(solid.min.x - hitbox.max.x, 0.0),
            Axis::X if motion < 0.0 => Vec2::new(solid.max.x - hitbox.min.x, 0.0),
            Axis::Y if motion > 0.0 => Vec2::new(0.0, solid.min.y - hitbox.max.y),
            Axis::Y if motion < 0.0 => Vec2::new(0.0, solid.max.y - hitbox.min.y),
            _ => Vec2::ZERO,
        };
        hitbox = hitbox.translated(shift);
    }
    hitbox
}

/// Keeps `hitbox` inside `[0, map_size]` along `axis`.
pub fn clamp_to_map(hitbox: Rect, axis: Axis, map_size: Vec2) -> Rect {
    let (lo, hi, limit) = match axis {
        Axis::X => (hitbox.min.x, hitbox.max.x, map_size.x),
        Axis::Y => (hitbox.min.y, hitbox.max.y, map_size.y),
    };
    let shift = if lo < 0.0 {
        -lo
    } else if hi > limit {
        limit - hi
    } else {
        0.0
    };
    match axis {
        Axis::X => hitbox.translated(Vec2::new(shift, 0.0)),
        Axis::Y => hitbox.translated(Vec2::new(0.0, shift)),
    }
}
