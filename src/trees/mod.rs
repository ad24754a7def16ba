//! Trees domain: choppable trees that fall into stumps and regrow overnight.

use bevy::prelude::*;

use crate::calendar::roll_day_on_sleep;
use crate::config::{GameConfig, TreeConfig};
use crate::error::StartupError;
use crate::frame::FrameSet;
use crate::player::skills::apply_skill_xp;
use crate::player::tools::animate_player;
use crate::shared::*;
use crate::world::animation::OneShotAnimation;
use crate::world::sprites::{SeqId, SpriteCatalog, SpriteFrames};
use crate::world::WorldLayout;

pub struct TreePlugin;

impl Plugin for TreePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_trees)
            .add_systems(
                Update,
                chop_trees
                    .after(animate_player)
                    .before(apply_skill_xp)
                    .in_set(FrameSet::Actors),
            )
            .add_systems(
                Update,
                refresh_trees
                    .after(roll_day_on_sleep)
                    .in_set(FrameSet::Transitions),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStatus {
    Tree,
    Stump,
}

/// What one chop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChopOutcome {
    Damaged,
    /// The tree became a stump and falls toward `fall`.
    Felled { fall: Facing },
    /// The stump is gone for good.
    Removed,
}

#[derive(Component, Debug, Clone)]
pub struct Tree {
    pub status: TreeStatus,
    pub health: u32,
    pub rect: Rect,
    pub hitbox: Rect,
    /// Where an axe blow counts as a hit.
    pub interaction_rect: Rect,
}

impl Tree {
    pub fn new(top_left: Vec2, size: Vec2, cfg: &TreeConfig) -> Self {
        let rect = Rect::from_top_left(top_left, size);
        let mut tree = Self {
            status: TreeStatus::Tree,
            health: cfg.tree_health,
            rect,
            hitbox: rect,
            interaction_rect: rect,
        };
        tree.refresh_shapes();
        tree
    }

    /// Recomputes the hitbox and interaction rect for the current status.
    /// A stump's hitbox shrinks inside the tree's so nothing gets stuck.
    fn refresh_shapes(&mut self) {
        let (w, h) = (self.rect.width(), self.rect.height());
        match self.status {
            TreeStatus::Tree => {
                self.hitbox = self.rect.inflated(-w * 0.4, -h * 0.4);
                self.interaction_rect = self
                    .rect
                    .inflated(-w * 0.4, -h * 0.1)
                    .with_mid_bottom(self.rect.mid_bottom());
            }
            TreeStatus::Stump => {
                let (hw, hh) = (self.hitbox.width(), self.hitbox.height());
                self.hitbox = self
                    .hitbox
                    .inflated(-hw * 0.4, -hh * 0.6)
                    .with_mid_bottom(self.hitbox.mid_bottom());
                self.interaction_rect = self
                    .rect
                    .inflated(-w * 0.6, -h * 0.6)
                    .with_mid_bottom(self.rect.mid_bottom());
            }
        }
    }

    pub fn is_hit(&self, target: Vec2) -> bool {
        self.interaction_rect.contains_point(target)
    }

    /// `from` is the side the blow comes from; a felled tree falls away from it.
    pub fn chop(&mut self, from: Facing, cfg: &TreeConfig) -> ChopOutcome {
        self.health = self.health.saturating_sub(1);
        if self.health > 0 {
            return ChopOutcome::Damaged;
        }
        match self.status {
            TreeStatus::Tree => {
                self.status = TreeStatus::Stump;
                self.refresh_shapes();
                self.health = cfg.stump_health;
                ChopOutcome::Felled { fall: from.opposite() }
            }
            TreeStatus::Stump => ChopOutcome::Removed,
        }
    }

    /// Morning: trees heal and stumps grow back.
    pub fn refresh_new_day(&mut self, cfg: &TreeConfig) {
        if self.status == TreeStatus::Stump {
            self.status = TreeStatus::Tree;
            self.refresh_shapes();
        }
        self.health = cfg.tree_health;
    }
}

/// Trees first, then stumps; among those, the one drawn in front.
pub fn pick_chop_target<'a, T>(hits: impl IntoIterator<Item = (T, &'a Tree)>) -> Option<T> {
    hits.into_iter()
        .max_by(|(_, a), (_, b)| {
            let rank = |t: &Tree| (t.status == TreeStatus::Tree, t.rect.center().y);
            rank(a).partial_cmp(&rank(b)).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(id, _)| id)
}

// ═══════════════════════════════════════════════════════════════════════
// SPRITES & SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone)]
pub struct TreeSprites {
    pub tree: SeqId,
    pub stump: SeqId,
    pub falling_left: SeqId,
    pub falling_right: SeqId,
}

impl TreeSprites {
    pub fn resolve(catalog: &SpriteCatalog) -> Result<Self, StartupError> {
        Ok(Self {
            tree: catalog.id("trees/normal_tree/tree")?,
            stump: catalog.id("trees/normal_tree/stump")?,
            falling_left: catalog.id("trees/normal_tree/falling/left")?,
            falling_right: catalog.id("trees/normal_tree/falling/right")?,
        })
    }

    pub fn for_status(&self, status: TreeStatus) -> SeqId {
        match status {
            TreeStatus::Tree => self.tree,
            TreeStatus::Stump => self.stump,
        }
    }
}

fn spawn_trees(
    mut commands: Commands,
    layout: Res<WorldLayout>,
    sprites: Res<TreeSprites>,
    catalog: Res<SpriteCatalog>,
    cfg: Res<GameConfig>,
) {
    let size = catalog.size_of(sprites.tree);
    for &top_left in &layout.trees {
        let tree = Tree::new(top_left, size, &cfg.trees);
        commands.spawn((
            SpriteFrames::new(sprites.tree),
            Footprint(tree.rect),
            CollisionSurface { hitbox: tree.hitbox },
            tree,
            DrawLayer::Main,
            Transform::default(),
            Visibility::default(),
        ));
    }
    info!("[Trees] Planted {} trees", layout.trees.len());
}

pub fn chop_trees(
    mut commands: Commands,
    mut tool_events: EventReader<ToolActionEvent>,
    mut xp_writer: EventWriter<SkillXpEvent>,
    sprites: Res<TreeSprites>,
    catalog: Res<SpriteCatalog>,
    cfg: Res<GameConfig>,
    mut trees: Query<(Entity, &mut Tree, &mut SpriteFrames, &mut CollisionSurface)>,
) {
    for ev in tool_events.read() {
        if ev.tool != ToolKind::Axe {
            continue;
        }
        let target = pick_chop_target(
            trees
                .iter()
                .filter(|(_, tree, _, _)| tree.is_hit(ev.target))
                .map(|(entity, tree, _, _)| (entity, tree)),
        );
        let Some(entity) = target else {
            continue;
        };
        let Ok((_, mut tree, mut frames, mut surface)) = trees.get_mut(entity) else {
            continue;
        };

        let from = if ev.actor_center.x >= tree.rect.center().x {
            Facing::Right
        } else {
            Facing::Left
        };
        let xp = match tree.status {
            TreeStatus::Tree => cfg.trees.tree_chop_xp,
            TreeStatus::Stump => cfg.trees.stump_chop_xp,
        };
        xp_writer.send(SkillXpEvent { skill: Skill::Woodcutting, amount: xp });

        match tree.chop(from, &cfg.trees) {
            ChopOutcome::Damaged => debug!("[Trees] Chop, {} health left", tree.health),
            ChopOutcome::Felled { fall } => {
                *frames = SpriteFrames::new(sprites.stump);
                surface.hitbox = tree.hitbox;
                let seq = match fall {
                    Facing::Left => sprites.falling_left,
                    _ => sprites.falling_right,
                };
                let effect = Rect::from_center_size(Vec2::ZERO, catalog.size_of(seq))
                    .with_mid_bottom(tree.rect.mid_bottom());
                commands.spawn((
                    SpriteFrames::new(seq),
                    OneShotAnimation::once(cfg.trees.falling_animation_speed),
                    Footprint(effect),
                    DrawLayer::Main,
                    Transform::default(),
                    Visibility::default(),
                ));
                info!("[Trees] Tree felled, falling {}", fall.asset_key());
            }
            ChopOutcome::Removed => {
                commands.entity(entity).despawn();
                info!("[Trees] Stump removed");
            }
        }
    }
}

pub fn refresh_trees(
    mut rolled: EventReader<DayRolledEvent>,
    sprites: Res<TreeSprites>,
    cfg: Res<GameConfig>,
    mut trees: Query<(&mut Tree, &mut SpriteFrames, &mut CollisionSurface)>,
) {
    if rolled.read().count() == 0 {
        return;
    }
    for (mut tree, mut frames, mut surface) in &mut trees {
        tree.refresh_new_day(&cfg.trees);
        let seq = sprites.for_status(tree.status);
        if frames.seq != seq {
            *frames = SpriteFrames::new(seq);
        }
        surface.hitbox = tree.hitbox;
    }
}
