//! Shared components, resources, events and geometry for Cup Nooble.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain's internals directly, except
//! through the public items re-exported by that domain's `mod.rs`.
//!
//! All gameplay geometry lives in *map space*: pixels, origin at the top-left
//! corner of the map, y growing downwards. Conversion to Bevy's y-up world
//! space happens only in the render-sync systems.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// FACING
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];

    /// Folder-name fragment used by the sprite manifest.
    pub fn asset_key(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Facing::Up => Facing::Down,
            Facing::Down => Facing::Up,
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TOOLS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Axe,
    WateringCan,
    Hoe,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Axe, ToolKind::WateringCan, ToolKind::Hoe];

    pub fn asset_key(self) -> &'static str {
        match self {
            ToolKind::Axe => "axe",
            ToolKind::WateringCan => "water",
            ToolKind::Hoe => "hoe",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SKILLS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Woodcutting,
    Farming,
}

impl Skill {
    pub const ALL: [Skill; 2] = [Skill::Woodcutting, Skill::Farming];

    pub fn label(self) -> &'static str {
        match self {
            Skill::Woodcutting => "Woodcutting",
            Skill::Farming => "Farming",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ANIMALS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Chicken,
    Cow,
}

impl Species {
    /// Parses the object name used on the map ("Chicken", "Cow").
    pub fn from_map_name(name: &str) -> Option<Self> {
        match name {
            "Chicken" => Some(Species::Chicken),
            "Cow" => Some(Species::Cow),
            _ => None,
        }
    }

    pub fn asset_key(self) -> &'static str {
        match self {
            Species::Chicken => "chicken",
            Species::Cow => "cow",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DRAWING
// ═══════════════════════════════════════════════════════════════════════

/// Coarse depth layer. Within a layer, entities are ordered by the centre
/// of their [`Footprint`] (y first, then x).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawLayer {
    Water,
    Ground,
    FloorParticles,
    Main,
    HouseRoof,
    FallingParticles,
}

/// Full sprite rectangle of a drawable entity, in map space.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Footprint(pub Rect);

/// Static (or owner-managed) solid shape actors cannot walk through.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CollisionSurface {
    pub hitbox: Rect,
}

/// Marks entities that exist only to be seen, never to be simulated.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Scenery;

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Deferred effect carried by a screen transition, applied while the screen
/// is fully covered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneChange {
    /// Sleep through the night: roll the day and refresh the world.
    Sleep,
    /// Move the player so its hitbox mid-bottom lands on `to`.
    Teleport { to: Vec2 },
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SceneChangeEvent(pub SceneChange);

/// Sent once the day counter has advanced and the weather has been re-rolled.
#[derive(Event, Debug, Clone, Copy)]
pub struct DayRolledEvent {
    pub day: u32,
}

/// Sent when the day clock enters its final (night) division.
#[derive(Event, Debug, Clone, Copy)]
pub struct NightFellEvent {
    pub day: u32,
}

/// Fired exactly once per tool activation, on the tool's trigger frame.
#[derive(Event, Debug, Clone, Copy)]
pub struct ToolActionEvent {
    pub tool: ToolKind,
    /// Map-space point the tool acts on.
    pub target: Vec2,
    /// Centre of the acting player's sprite rectangle.
    pub actor_center: Vec2,
}

/// Experience earned by the player.
#[derive(Event, Debug, Clone, Copy)]
pub struct SkillXpEvent {
    pub skill: Skill,
    pub amount: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// GEOMETRY
// ═══════════════════════════════════════════════════════════════════════

/// Map-space rectangle helpers mirroring the tile engine conventions:
/// overlap tests are strict (touching edges do not collide) and point tests
/// are half-open on the right and bottom edges.
pub trait RectExt {
    fn from_top_left(top_left: Vec2, size: Vec2) -> Rect;
    /// Grow (or shrink, with negative values) by `dw`/`dh` in total, keeping the centre.
    fn inflated(&self, dw: f32, dh: f32) -> Rect;
    fn translated(&self, by: Vec2) -> Rect;
    fn overlaps(&self, other: &Rect) -> bool;
    fn contains_point(&self, p: Vec2) -> bool;
    fn mid_bottom(&self) -> Vec2;
    fn mid_top(&self) -> Vec2;
    fn mid_left(&self) -> Vec2;
    fn mid_right(&self) -> Vec2;
    fn with_center(&self, center: Vec2) -> Rect;
    fn with_mid_bottom(&self, mid_bottom: Vec2) -> Rect;
}

impl RectExt for Rect {
    fn from_top_left(top_left: Vec2, size: Vec2) -> Rect {
        Rect::from_corners(top_left, top_left + size)
    }

    fn inflated(&self, dw: f32, dh: f32) -> Rect {
        let size = (self.size() + Vec2::new(dw, dh)).max(Vec2::ZERO);
        Rect::from_center_size(self.center(), size)
    }

    fn translated(&self, by: Vec2) -> Rect {
        Rect::from_corners(self.min + by, self.max + by)
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    fn mid_bottom(&self) -> Vec2 {
        Vec2::new(self.center().x, self.max.y)
    }

    fn mid_top(&self) -> Vec2 {
        Vec2::new(self.center().x, self.min.y)
    }

    fn mid_left(&self) -> Vec2 {
        Vec2::new(self.min.x, self.center().y)
    }

    fn mid_right(&self) -> Vec2 {
        Vec2::new(self.max.x, self.center().y)
    }

    fn with_center(&self, center: Vec2) -> Rect {
        Rect::from_center_size(center, self.size())
    }

    fn with_mid_bottom(&self, mid_bottom: Vec2) -> Rect {
        let size = self.size();
        Rect::from_corners(
            Vec2::new(mid_bottom.x - size.x / 2.0, mid_bottom.y - size.y),
            Vec2::new(mid_bottom.x + size.x / 2.0, mid_bottom.y),
        )
    }
}

/// Map-space (y-down) point to Bevy world space (y-up).
pub fn map_to_world(p: Vec2) -> Vec2 {
    Vec2::new(p.x, -p.y)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflated_keeps_center() {
        let r = Rect::from_top_left(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0));
        let shrunk = r.inflated(-40.0, -20.0);
        assert_eq!(shrunk.center(), r.center());
        assert_eq!(shrunk.size(), Vec2::new(60.0, 30.0));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::from_top_left(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::from_top_left(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b));
        let c = Rect::from_top_left(Vec2::new(9.0, 9.0), Vec2::splat(10.0));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn contains_point_is_half_open() {
        let r = Rect::from_top_left(Vec2::ZERO, Vec2::splat(10.0));
        assert!(r.contains_point(Vec2::ZERO));
        assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
        assert!(!r.contains_point(Vec2::new(5.0, 10.0)));
    }

    #[test]
    fn mid_bottom_anchor_round_trips() {
        let r = Rect::from_top_left(Vec2::new(3.0, 4.0), Vec2::new(20.0, 30.0));
        let moved = r.with_mid_bottom(Vec2::new(100.0, 100.0));
        assert_eq!(moved.mid_bottom(), Vec2::new(100.0, 100.0));
        assert_eq!(moved.size(), r.size());
    }
}
