//! Turns the panels' draw lists into `bevy_ui` nodes.
//!
//! Panels describe what they want drawn each frame as a flat list in window
//! pixels. The list is rebuilt from scratch and the previous frame's nodes
//! are replaced.

use bevy::prelude::*;

use super::arbiter::{UiArbiter, UiContext};
use super::UiSnapshot;
use crate::world::sprites::{SeqId, SpriteFrames, SpriteLibrary};

/// Panels sit above the sky and thunder overlays.
pub const PANEL_Z: i32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum UiDraw {
    Image {
        seq: SeqId,
        frame: usize,
        top_left: Vec2,
        size: Vec2,
    },
    Text {
        text: String,
        top_left: Vec2,
        /// Centre the text within this width, if given.
        width: Option<f32>,
        font_size: f32,
        color: Color,
    },
}

#[derive(Resource, Debug, Clone, Default)]
pub struct UiDrawList(pub Vec<UiDraw>);

impl UiDrawList {
    pub fn image(&mut self, seq: SeqId, top_left: Vec2, size: Vec2) {
        self.0.push(UiDraw::Image { seq, frame: 0, top_left, size });
    }

    pub fn text(&mut self, text: impl Into<String>, top_left: Vec2, font_size: f32, color: Color) {
        self.0.push(UiDraw::Text { text: text.into(), top_left, width: None, font_size, color });
    }

    pub fn centered_text(
        &mut self,
        text: impl Into<String>,
        top_left: Vec2,
        width: f32,
        font_size: f32,
        color: Color,
    ) {
        self.0.push(UiDraw::Text {
            text: text.into(),
            top_left,
            width: Some(width),
            font_size,
            color,
        });
    }
}

/// Marks nodes spawned from last frame's draw list.
#[derive(Component)]
pub struct UiDrawn;

pub fn collect_ui_draws(
    snapshot: UiSnapshot,
    arbiter: Res<UiArbiter>,
    mut list: ResMut<UiDrawList>,
) {
    let animals = snapshot.animal_views();
    let ctx: UiContext = snapshot.context(&animals);
    list.0.clear();
    arbiter.render(&ctx, &mut list);
}

pub fn present_ui_draws(
    mut commands: Commands,
    list: Res<UiDrawList>,
    library: Res<SpriteLibrary>,
    drawn: Query<Entity, With<UiDrawn>>,
) {
    for entity in &drawn {
        commands.entity(entity).despawn_recursive();
    }

    for (i, draw) in list.0.iter().enumerate() {
        let z = GlobalZIndex(PANEL_Z + i as i32);
        match draw {
            UiDraw::Image { seq, frame, top_left, size } => {
                let Some(handle) = library.handle(&SpriteFrames { seq: *seq, frame: *frame }) else {
                    continue;
                };
                commands.spawn((
                    UiDrawn,
                    ImageNode::new(handle),
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(top_left.x),
                        top: Val::Px(top_left.y),
                        width: Val::Px(size.x),
                        height: Val::Px(size.y),
                        ..default()
                    },
                    z,
                ));
            }
            UiDraw::Text { text, top_left, width, font_size, color } => {
                commands.spawn((
                    UiDrawn,
                    Text::new(text.clone()),
                    TextFont { font_size: *font_size, ..default() },
                    TextColor(*color),
                    TextLayout::new_with_justify(JustifyText::Center),
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(top_left.x),
                        top: Val::Px(top_left.y),
                        width: width.map_or(Val::Auto, Val::Px),
                        ..default()
                    },
                    z,
                ));
            }
        }
    }
}
