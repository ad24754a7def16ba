//! Animal status machine and destination picking.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::AnimalConfig;
use crate::shared::*;
use crate::world::collision::collide_line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimalStatus {
    Idle,
    Run,
    Love,
    Peck,
    JumpDown,
    JumpUp,
    Sleep,
    Graze,
    Rest,
}

impl AnimalStatus {
    pub const CHICKEN: [AnimalStatus; 7] = [
        AnimalStatus::Idle,
        AnimalStatus::Run,
        AnimalStatus::Love,
        AnimalStatus::Peck,
        AnimalStatus::JumpDown,
        AnimalStatus::Sleep,
        AnimalStatus::JumpUp,
    ];

    pub const COW: [AnimalStatus; 6] = [
        AnimalStatus::Idle,
        AnimalStatus::Run,
        AnimalStatus::Love,
        AnimalStatus::Graze,
        AnimalStatus::Sleep,
        AnimalStatus::Rest,
    ];

    pub fn of(species: Species) -> &'static [AnimalStatus] {
        match species {
            Species::Chicken => &Self::CHICKEN,
            Species::Cow => &Self::COW,
        }
    }

    pub fn asset_key(self) -> &'static str {
        match self {
            AnimalStatus::Idle => "idle",
            AnimalStatus::Run => "run",
            AnimalStatus::Love => "love",
            AnimalStatus::Peck => "peck",
            AnimalStatus::JumpDown => "jump_down",
            AnimalStatus::JumpUp => "jump_up",
            AnimalStatus::Sleep => "sleep",
            AnimalStatus::Graze => "graze",
            AnimalStatus::Rest => "rest",
        }
    }

    /// Shown in the animal menu. Love reads as idling.
    pub fn label(self) -> &'static str {
        match self {
            AnimalStatus::Idle | AnimalStatus::Love => "idling",
            AnimalStatus::Run => "running",
            AnimalStatus::Peck => "pecking",
            AnimalStatus::JumpDown => "jumping down",
            AnimalStatus::JumpUp => "jumping up",
            AnimalStatus::Sleep => "sleeping",
            AnimalStatus::Graze => "grazing",
            AnimalStatus::Rest => "resting",
        }
    }
}

/// Status after an animation cycle completes, given a roll in `0..10`.
/// Returning `Run` means a destination must be picked.
pub fn next_status(species: Species, status: AnimalStatus, roll: u32) -> AnimalStatus {
    use AnimalStatus::*;
    match (species, status) {
        (_, Love) => Idle,
        (_, Run) => Run,
        (Species::Chicken, Idle) => match roll {
            0..=1 => Peck,
            2 => Run,
            _ => Idle,
        },
        (Species::Chicken, Peck) => match roll {
            0..=2 => Idle,
            3..=4 => JumpDown,
            _ => Peck,
        },
        (Species::Chicken, JumpDown) => Sleep,
        (Species::Chicken, Sleep) => match roll {
            0..=1 => JumpUp,
            _ => Sleep,
        },
        (Species::Chicken, JumpUp) => Idle,
        (Species::Cow, Idle) => match roll {
            0..=1 => Graze,
            2 => Run,
            3..=4 => Rest,
            _ => Idle,
        },
        (Species::Cow, Graze) => match roll {
            0..=3 => Idle,
            4..=6 => Sleep,
            _ => Graze,
        },
        (Species::Cow, Sleep) => match roll {
            0..=6 => Sleep,
            _ => Idle,
        },
        (Species::Cow, Rest) => match roll {
            0..=6 => Rest,
            _ => Idle,
        },
        // Statuses the species never enters.
        (_, other) => other,
    }
}

/// Samples random points in the walk area until one is far enough away and
/// reachable in a straight line. Gives up after the configured number of
/// attempts.
pub fn pick_walk_target(
    pos: Vec2,
    interaction_center: Vec2,
    walk_area: &[Rect],
    solids: &[Rect],
    tile_size: f32,
    cfg: &AnimalConfig,
    rng: &mut impl Rng,
) -> Option<Vec2> {
    let min_distance = cfg.min_walk_distance * tile_size;
    let offset = interaction_center - pos;
    for _ in 0..cfg.destination_attempts {
        let tile = walk_area.choose(rng)?;
        let candidate = Vec2::new(
            rng.gen_range(tile.min.x as i32..=tile.max.x as i32) as f32,
            rng.gen_range(tile.min.y as i32..=tile.max.y as i32) as f32,
        );
        if candidate.distance(pos) < min_distance {
            continue;
        }
        if collide_line(pos, candidate, offset, solids, tile_size / 10.0) {
            continue;
        }
        return Some(candidate);
    }
    None
}
