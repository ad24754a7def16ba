use bevy::prelude::*;

use super::{Player, PlayerSprites};
use crate::config::GameConfig;
use crate::input::{FrameInput, GameKey};
use crate::shared::*;
use crate::ui::arbiter::UiArbiter;
use crate::ui::transitions::TransitionDirector;
use crate::world::animation::OneShotAnimation;
use crate::world::sprites::{SpriteCatalog, SpriteFrames};

const TOOL_KEYS: [(GameKey, ToolKind); 3] = [
    (GameKey::Axe, ToolKind::Axe),
    (GameKey::Water, ToolKind::WateringCan),
    (GameKey::Hoe, ToolKind::Hoe),
];

/// Direction and facing from the held arrow keys. Horizontal is read first,
/// so vertical wins the facing on diagonals.
pub fn read_direction(input: &FrameInput, player: &mut Player) {
    player.direction.x = if input.is_held(GameKey::Right) {
        player.facing = Facing::Right;
        1.0
    } else if input.is_held(GameKey::Left) {
        player.facing = Facing::Left;
        -1.0
    } else {
        0.0
    };
    player.direction.y = if input.is_held(GameKey::Up) {
        player.facing = Facing::Up;
        -1.0
    } else if input.is_held(GameKey::Down) {
        player.facing = Facing::Down;
        1.0
    } else {
        0.0
    };
}

/// Starts a swing: the player stops and the animation restarts.
pub fn start_tool(player: &mut Player, tool: ToolKind) {
    player.active_tool = Some(tool);
    player.direction = Vec2::ZERO;
    player.cursor.reset();
    player.has_performed_action = false;
}

pub fn player_input(
    mut commands: Commands,
    input: Res<FrameInput>,
    director: Res<TransitionDirector>,
    mut arbiter: ResMut<UiArbiter>,
    sprites: Res<PlayerSprites>,
    catalog: Res<SpriteCatalog>,
    cfg: Res<GameConfig>,
    mut players: Query<&mut Player>,
) {
    for mut player in &mut players {
        if director.is_active() || arbiter.is_active() {
            player.direction = Vec2::ZERO;
            continue;
        }
        if player.is_using_tool() {
            continue;
        }

        read_direction(&input, &mut player);

        let Some(tool) = TOOL_KEYS
            .iter()
            .find(|(key, _)| input.is_held(*key))
            .map(|(_, tool)| *tool)
        else {
            continue;
        };
        start_tool(&mut player, tool);
        arbiter.disable_all();
        debug!("[Player] Swinging {:?} facing {:?}", tool, player.facing);

        if tool == ToolKind::WateringCan {
            if let Some(seq) = sprites.splash(player.facing) {
                let at = player.tool_target(tool, &cfg);
                commands.spawn((
                    SpriteFrames::new(seq),
                    OneShotAnimation::once(cfg.tools.splash_animation_speed),
                    Footprint(Rect::from_center_size(at, catalog.size_of(seq))),
                    DrawLayer::Main,
                    Transform::default(),
                    Visibility::default(),
                ));
            }
        }
    }
}

/// Result of advancing the player's animation by one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationStep {
    /// Tool whose action fires this frame.
    pub fired: Option<ToolKind>,
    /// The swing finished and the tool was put away.
    pub finished: bool,
}

/// Advances the frame cursor. The tool action fires once per swing, on the
/// first step that reaches or passes the trigger frame.
pub fn advance_animation(player: &mut Player, dt: f32, len: usize, cfg: &GameConfig) -> AnimationStep {
    let mut step = AnimationStep::default();
    player.cursor.index += player.cursor.speed * dt;

    if let Some(tool) = player.active_tool {
        let trigger = cfg.tools.profile(tool).trigger_frame;
        if player.cursor.index >= trigger as f32 && !player.has_performed_action {
            player.has_performed_action = true;
            step.fired = Some(tool);
        }
    }

    if player.cursor.index >= len as f32 {
        player.cursor.reset();
        if player.is_using_tool() {
            player.active_tool = None;
            player.has_performed_action = false;
            player.action = player.current_action();
            step.finished = true;
        }
    }
    step
}

pub fn animate_player(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    sprites: Res<PlayerSprites>,
    catalog: Res<SpriteCatalog>,
    mut tool_events: EventWriter<ToolActionEvent>,
    mut players: Query<(&mut Player, &mut SpriteFrames, &mut Footprint)>,
) {
    for (mut player, mut frames, mut footprint) in &mut players {
        let len = catalog.len_of(frames.seq);
        let step = advance_animation(&mut player, time.delta_secs(), len, &cfg);
        if let Some(tool) = step.fired {
            let target = player.tool_target(tool, &cfg);
            tool_events.send(ToolActionEvent { tool, target, actor_center: player.rect.center() });
        }
        if step.finished {
            frames.seq = sprites.frames.get(player.facing, player.action);
        }
        frames.frame = player.cursor.frame(catalog.len_of(frames.seq));
        footprint.0 = player.rect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swinging(tool: ToolKind) -> Player {
        let mut p = Player::new(Vec2::splat(500.0), Vec2::splat(100.0), &GameConfig::default());
        start_tool(&mut p, tool);
        p
    }

    #[test]
    fn test_tool_fires_once_per_swing() {
        let cfg = GameConfig::default();
        let mut p = swinging(ToolKind::Axe);
        let mut fired = 0;
        let mut finished = false;
        // 8 frames at speed 7, stepped finely.
        for _ in 0..200 {
            let step = advance_animation(&mut p, 0.01, 8, &cfg);
            fired += step.fired.is_some() as u32;
            if step.finished {
                finished = true;
                break;
            }
        }
        assert_eq!(fired, 1);
        assert!(finished);
        assert!(!p.is_using_tool());
    }

    #[test]
    fn test_water_fires_on_the_trigger_frame() {
        let cfg = GameConfig::default();
        let mut p = swinging(ToolKind::WateringCan);
        // 0 to 3.5 lands on the trigger (3).
        let step = advance_animation(&mut p, 0.5, 8, &cfg);
        assert_eq!(step.fired, Some(ToolKind::WateringCan));
    }

    #[test]
    fn test_stepping_over_the_trigger_still_fires_once() {
        let cfg = GameConfig::default();
        // 0 to 7 jumps over the hoe's trigger (5) in one step.
        let mut p = swinging(ToolKind::Hoe);
        let step = advance_animation(&mut p, 1.0, 8, &cfg);
        assert_eq!(step.fired, Some(ToolKind::Hoe));
        assert!(!step.finished);
        let step = advance_animation(&mut p, 1.0, 8, &cfg);
        assert_eq!(step.fired, None);
        assert!(step.finished);

        // Coarse steps of 2.1 frames: 2.1, 4.2, 6.3, then the end.
        let mut p = swinging(ToolKind::Axe);
        let mut fired = Vec::new();
        for _ in 0..10 {
            let step = advance_animation(&mut p, 0.3, 8, &cfg);
            fired.extend(step.fired);
            if step.finished {
                break;
            }
        }
        assert_eq!(fired, vec![ToolKind::Axe]);
        assert!(!p.is_using_tool());
    }

    #[test]
    fn test_swing_ending_in_one_step_fires_before_putting_the_tool_away() {
        let cfg = GameConfig::default();
        let mut p = swinging(ToolKind::Axe);
        let step = advance_animation(&mut p, 2.0, 8, &cfg);
        assert_eq!(step, AnimationStep { fired: Some(ToolKind::Axe), finished: true });
        assert!(!p.has_performed_action);
    }

    #[test]
    fn test_input_sets_facing_vertical_last() {
        let mut input = FrameInput::default();
        input.hold(GameKey::Left);
        input.hold(GameKey::Up);
        let mut p = Player::new(Vec2::ZERO, Vec2::splat(100.0), &GameConfig::default());
        read_direction(&input, &mut p);
        assert_eq!(p.direction, Vec2::new(-1.0, -1.0));
        assert_eq!(p.facing, Facing::Up);
    }
}
