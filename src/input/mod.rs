//! The single point where hardware input becomes game input.
//!
//! `FrameInput` is rebuilt every tick in `PreUpdate`. Simulation systems only
//! ever read `FrameInput`, so headless tests drive the game by writing it.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    Up,
    Down,
    Left,
    Right,
    LeftShift,
    Return,
    Escape,
    Axe,
    Water,
    Hoe,
    DebugToggle,
}

const KEY_MAP: [(KeyCode, GameKey); 11] = [
    (KeyCode::ArrowUp, GameKey::Up),
    (KeyCode::ArrowDown, GameKey::Down),
    (KeyCode::ArrowLeft, GameKey::Left),
    (KeyCode::ArrowRight, GameKey::Right),
    (KeyCode::ShiftLeft, GameKey::LeftShift),
    (KeyCode::Enter, GameKey::Return),
    (KeyCode::Escape, GameKey::Escape),
    (KeyCode::KeyC, GameKey::Axe),
    (KeyCode::KeyW, GameKey::Water),
    (KeyCode::KeyH, GameKey::Hoe),
    (KeyCode::F3, GameKey::DebugToggle),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// A discrete input event. Pointer positions are in window pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(GameKey),
    PointerDown { button: PointerButton, pos: Vec2 },
}

#[derive(Resource, Debug, Clone, Default)]
pub struct FrameInput {
    pub events: Vec<InputEvent>,
    pub held: Vec<GameKey>,
    /// Cursor position in window pixels, if the cursor is over the window.
    pub pointer: Option<Vec2>,
}

impl FrameInput {
    pub fn is_held(&self, key: GameKey) -> bool {
        self.held.contains(&key)
    }

    pub fn key_pressed(&self, key: GameKey) -> bool {
        self.events.contains(&InputEvent::KeyDown(key))
    }

    pub fn hold(&mut self, key: GameKey) {
        if !self.is_held(key) {
            self.held.push(key);
        }
    }

    pub fn release(&mut self, key: GameKey) {
        self.held.retain(|k| *k != key);
    }

    /// Queues a key-down event and marks the key held, as a real press would.
    pub fn press(&mut self, key: GameKey) {
        self.events.push(InputEvent::KeyDown(key));
        self.hold(key);
    }

    pub fn click(&mut self, button: PointerButton, pos: Vec2) {
        self.events.push(InputEvent::PointerDown { button, pos });
        self.pointer = Some(pos);
    }
}

/// Reads Bevy's keyboard, mouse and cursor state into [`FrameInput`].
pub struct FrameInputPlugin;

impl Plugin for FrameInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameInput>()
            .add_systems(PreUpdate, read_frame_input);
    }
}

fn read_frame_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut input: ResMut<FrameInput>,
) {
    input.events.clear();
    input.held.clear();
    input.pointer = windows.get_single().ok().and_then(|w| w.cursor_position());

    for (code, key) in KEY_MAP {
        if keys.just_pressed(code) {
            input.events.push(InputEvent::KeyDown(key));
        }
        if keys.pressed(code) {
            input.held.push(key);
        }
    }

    if let Some(pos) = input.pointer {
        for (mouse_button, button) in [
            (MouseButton::Left, PointerButton::Primary),
            (MouseButton::Right, PointerButton::Secondary),
        ] {
            if mouse.just_pressed(mouse_button) {
                input.events.push(InputEvent::PointerDown { button, pos });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_marks_key_held_and_pressed() {
        let mut input = FrameInput::default();
        input.press(GameKey::Return);
        assert!(input.key_pressed(GameKey::Return));
        assert!(input.is_held(GameKey::Return));
        input.release(GameKey::Return);
        assert!(!input.is_held(GameKey::Return));
    }

    #[test]
    fn test_click_moves_pointer() {
        let mut input = FrameInput::default();
        input.click(PointerButton::Secondary, Vec2::new(12.0, 34.0));
        assert_eq!(input.pointer, Some(Vec2::new(12.0, 34.0)));
        assert_eq!(input.events.len(), 1);
    }
}
