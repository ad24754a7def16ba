//! Bottom-left skills button; clicking it toggles the skills sheet.

use bevy::prelude::*;

use super::arbiter::{UiComponent, UiContext};
use super::present::UiDrawList;
use crate::config::GameConfig;
use crate::error::StartupError;
use crate::input::{GameKey, InputEvent, PointerButton};
use crate::shared::*;
use crate::world::sprites::{SeqId, SpriteCatalog};

const BUTTON_MARGIN: f32 = 10.0;
const SHEET_GAP: f32 = 5.0;
const FONT_SIZE: f32 = 16.0;
const TEXT_COLOR: Color = Color::srgb(241.0 / 255.0, 243.0 / 255.0, 229.0 / 255.0);
/// Where each skill's line sits on the sheet, in `Skill::ALL` order.
const LINE_OFFSETS: [Vec2; 2] = [Vec2::new(54.0, 105.0), Vec2::new(54.0, 180.0)];

pub struct SkillsPanel {
    open_button: SeqId,
    closed_button: SeqId,
    sheet: SeqId,
    button_rect: Rect,
    sheet_rect: Rect,
    open: bool,
}

impl SkillsPanel {
    pub fn new(catalog: &SpriteCatalog, cfg: &GameConfig) -> Result<Self, StartupError> {
        let open_button = catalog.id("ui/skills/buttons/open")?;
        let sheet = catalog.id("ui/skills/interface")?;

        let button_size = catalog.size_of(open_button);
        let bottom_left = Vec2::new(BUTTON_MARGIN, cfg.display.window_height - BUTTON_MARGIN);
        let button_rect =
            Rect::from_top_left(bottom_left - Vec2::new(0.0, button_size.y), button_size);

        let sheet_size = catalog.size_of(sheet);
        let sheet_bottom_left = button_rect.min - Vec2::new(0.0, SHEET_GAP);
        let sheet_rect =
            Rect::from_top_left(sheet_bottom_left - Vec2::new(0.0, sheet_size.y), sheet_size);

        Ok(Self {
            open_button,
            closed_button: catalog.id("ui/skills/buttons/closed")?,
            sheet,
            button_rect,
            sheet_rect,
            open: false,
        })
    }

    pub fn button_rect(&self) -> Rect {
        self.button_rect
    }

    fn clicked_button(&self, event: &InputEvent) -> bool {
        matches!(
            *event,
            InputEvent::PointerDown { button: PointerButton::Primary, pos }
                if self.button_rect.contains_point(pos)
        )
    }
}

impl UiComponent for SkillsPanel {
    fn name(&self) -> &'static str {
        "Skills panel"
    }

    fn is_active(&self) -> bool {
        self.open
    }

    fn disable(&mut self) {
        self.open = false;
    }

    fn handle_event(&mut self, event: &InputEvent, _ctx: &UiContext) {
        if !self.open {
            self.open = self.clicked_button(event);
        } else if *event == InputEvent::KeyDown(GameKey::Escape) || self.clicked_button(event) {
            self.disable();
        }
    }

    fn render(&self, ctx: &UiContext, out: &mut UiDrawList) {
        if !self.open {
            out.image(self.closed_button, self.button_rect.min, self.button_rect.size());
            return;
        }
        out.image(self.open_button, self.button_rect.min, self.button_rect.size());
        out.image(self.sheet, self.sheet_rect.min, self.sheet_rect.size());
        let Some(skills) = ctx.skills else {
            return;
        };
        for (skill, offset) in Skill::ALL.into_iter().zip(LINE_OFFSETS) {
            let progress = skills.get(skill);
            out.text(
                format!("Level: {}  Exp: {}", progress.level, progress.xp),
                self.sheet_rect.min + offset,
                FONT_SIZE,
                TEXT_COLOR,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> SkillsPanel {
        let mut catalog = SpriteCatalog::default();
        catalog.insert("ui/skills/buttons/open", 1, Vec2::new(40.0, 30.0));
        catalog.insert("ui/skills/buttons/closed", 1, Vec2::new(40.0, 30.0));
        catalog.insert("ui/skills/interface", 1, Vec2::new(300.0, 250.0));
        SkillsPanel::new(&catalog, &GameConfig::default()).unwrap()
    }

    #[test]
    fn test_button_anchored_bottom_left() {
        let p = panel();
        assert_eq!(p.button_rect.min, Vec2::new(10.0, 680.0));
        assert_eq!(p.sheet_rect.max.y, 675.0);
        assert_eq!(p.sheet_rect.min.x, 10.0);
    }

    #[test]
    fn test_click_toggles_and_escape_closes() {
        let mut p = panel();
        let cfg = GameConfig::default();
        let day = crate::calendar::DayCycle::new(&cfg, &mut rand::thread_rng());
        let input = crate::input::FrameInput::default();
        let ctx = UiContext {
            input: &input,
            camera_offset: Vec2::ZERO,
            animals: &[],
            skills: None,
            day: &day,
            cfg: &cfg,
        };
        let on_button = InputEvent::PointerDown {
            button: PointerButton::Primary,
            pos: p.button_rect.center(),
        };
        let elsewhere = InputEvent::PointerDown { button: PointerButton::Primary, pos: Vec2::ZERO };

        p.handle_event(&elsewhere, &ctx);
        assert!(!p.is_active());
        p.handle_event(&on_button, &ctx);
        assert!(p.is_active());
        p.handle_event(&on_button, &ctx);
        assert!(!p.is_active());
        p.handle_event(&on_button, &ctx);
        p.handle_event(&InputEvent::KeyDown(GameKey::Escape), &ctx);
        assert!(!p.is_active());
    }
}
