//! Player domain: the farmer walking around the map.
//!
//! Responsible for:
//! - Reading movement and tool keys
//! - Moving with per-axis collision and map clamping
//! - Tracking whether the player stands inside the house
//! - Tool animations, firing `ToolActionEvent` once per swing
//! - Skills and experience
//! - Sleeping in the bed and riding the boats

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::error::StartupError;
use crate::frame::{world_may_dispatch, FrameSet};
use crate::shared::*;
use crate::world::animation::FrameCursor;
use crate::world::sprites::{FrameTable, SeqId, SpriteCatalog, SpriteFrames};
use crate::world::WorldLayout;

pub mod interaction;
pub mod movement;
pub mod skills;
pub mod tools;

pub use skills::{SkillProgress, Skills};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ToolActionEvent>()
            .add_event::<SkillXpEvent>()
            .add_systems(Startup, spawn_player)
            .add_systems(
                Update,
                (interaction::ride_boat, interaction::go_to_sleep)
                    .chain()
                    .in_set(FrameSet::Events)
                    .run_if(world_may_dispatch),
            )
            .add_systems(Update, tools::player_input.in_set(FrameSet::Input))
            .add_systems(
                Update,
                (
                    movement::update_status,
                    movement::move_player,
                    movement::update_house_status,
                    tools::animate_player,
                    skills::apply_skill_xp,
                )
                    .chain()
                    .in_set(FrameSet::Actors),
            )
            .add_systems(Update, interaction::apply_teleport.in_set(FrameSet::Transitions));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Components
// ═══════════════════════════════════════════════════════════════════════════

/// What the player's body is doing; selects the frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Idle,
    Run,
    Tool(ToolKind),
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 5] = [
        PlayerAction::Idle,
        PlayerAction::Run,
        PlayerAction::Tool(ToolKind::Axe),
        PlayerAction::Tool(ToolKind::WateringCan),
        PlayerAction::Tool(ToolKind::Hoe),
    ];

    pub fn asset_key(self) -> &'static str {
        match self {
            PlayerAction::Idle => "idle",
            PlayerAction::Run => "run",
            PlayerAction::Tool(tool) => tool.asset_key(),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Player {
    /// Unrounded centre.
    pub pos: Vec2,
    /// Full sprite rect.
    pub rect: Rect,
    pub hitbox: Rect,
    /// Unit (or zero) walking direction.
    pub direction: Vec2,
    pub facing: Facing,
    pub speed: f32,
    pub action: PlayerAction,
    pub active_tool: Option<ToolKind>,
    /// Set once the current swing has fired its tool action.
    pub has_performed_action: bool,
    pub inside_house: bool,
    pub cursor: FrameCursor,
}

impl Player {
    pub fn new(center: Vec2, size: Vec2, cfg: &GameConfig) -> Self {
        let rect = Rect::from_center_size(center, size);
        Self {
            pos: center,
            rect,
            hitbox: rect.inflated(-size.x * 0.8, -size.y * 0.7),
            direction: Vec2::ZERO,
            facing: Facing::Down,
            speed: cfg.player.speed,
            action: PlayerAction::Idle,
            active_tool: None,
            has_performed_action: false,
            inside_house: false,
            cursor: FrameCursor::new(cfg.player.animation_speed),
        }
    }

    pub fn is_using_tool(&self) -> bool {
        self.active_tool.is_some()
    }

    pub fn is_idling(&self) -> bool {
        self.direction == Vec2::ZERO
    }

    /// Where the active tool lands.
    pub fn tool_target(&self, tool: ToolKind, cfg: &GameConfig) -> Vec2 {
        self.pos + cfg.tools.profile(tool).offset(self.facing)
    }

    /// Places the hitbox's bottom-middle on `at`, centring the sprite on it.
    pub fn teleport(&mut self, at: Vec2) {
        self.hitbox = self.hitbox.with_mid_bottom(at);
        self.rect = self.rect.with_center(self.hitbox.center());
        self.pos = self.rect.center();
    }

    /// True if `rect` lies in the direction the player faces, within the
    /// band spanned by its edges.
    pub fn is_facing_rect(&self, rect: Rect) -> bool {
        let Vec2 { x, y } = self.pos;
        let in_columns = rect.min.x <= x && x <= rect.max.x;
        let in_rows = rect.min.y <= y && y <= rect.max.y;
        match self.facing {
            Facing::Down => in_columns && y <= rect.min.y,
            Facing::Right => in_rows && x <= rect.min.x,
            Facing::Up => in_columns && y >= rect.max.y,
            Facing::Left => in_rows && x >= rect.max.x,
        }
    }

    pub fn current_action(&self) -> PlayerAction {
        match self.active_tool {
            Some(tool) => PlayerAction::Tool(tool),
            None if self.is_idling() => PlayerAction::Idle,
            None => PlayerAction::Run,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Sprites
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone)]
pub struct PlayerSprites {
    pub frames: FrameTable<PlayerAction>,
    /// Watering splash per facing; none when facing up.
    pub splashes: Vec<(Facing, SeqId)>,
    pub size: Vec2,
}

impl PlayerSprites {
    pub fn resolve(catalog: &SpriteCatalog) -> Result<Self, StartupError> {
        let frames = FrameTable::build(
            catalog,
            "player",
            &Facing::ALL,
            &PlayerAction::ALL,
            PlayerAction::asset_key,
        )?;
        let splashes = [Facing::Down, Facing::Left, Facing::Right]
            .into_iter()
            .map(|f| {
                catalog
                    .id(&format!("particles/player/watering/{}", f.asset_key()))
                    .map(|seq| (f, seq))
            })
            .collect::<Result<_, _>>()?;
        let size = catalog.size_of(frames.get(Facing::Down, PlayerAction::Idle));
        Ok(Self { frames, splashes, size })
    }

    pub fn splash(&self, facing: Facing) -> Option<SeqId> {
        self.splashes.iter().find(|(f, _)| *f == facing).map(|(_, seq)| *seq)
    }
}

fn spawn_player(
    mut commands: Commands,
    layout: Res<WorldLayout>,
    sprites: Res<PlayerSprites>,
    cfg: Res<GameConfig>,
) {
    let player = Player::new(layout.player_start, sprites.size, &cfg);
    let seq = sprites.frames.get(player.facing, player.action);
    info!("[Player] Spawned at ({}, {})", player.pos.x, player.pos.y);
    commands.spawn((
        Footprint(player.rect),
        player,
        Skills::default(),
        SpriteFrames::new(seq),
        DrawLayer::Main,
        Transform::default(),
        Visibility::default(),
    ));
}
