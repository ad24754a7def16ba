//! Animal hover box and info menu.
//!
//! Holding left shift highlights the animal under the pointer (soft state).
//! Right-clicking the highlighted animal opens its menu, which is what makes
//! the panel active. Escape closes the menu and drops the highlight.

use bevy::prelude::*;

use super::arbiter::{UiComponent, UiContext};
use super::present::UiDrawList;
use crate::animals::Animal;
use crate::error::StartupError;
use crate::input::{GameKey, InputEvent, PointerButton};
use crate::shared::*;
use crate::world::sprites::{SeqId, SpriteCatalog};

const TEXT_COLOR: Color = Color::BLACK;
const FONT_SIZE: f32 = 16.0;
const NAME_TOP: f32 = 35.0;
const STATUS_GAP: f32 = 10.0;
const HEART_ORIGIN: Vec2 = Vec2::new(23.0, 8.0);
const HEART_STEP: f32 = 17.0;

/// Snapshot of one animal, taken each tick for the UI.
#[derive(Debug, Clone)]
pub struct AnimalView {
    pub entity: Entity,
    pub interaction_rect: Rect,
    /// Vertical draw coordinate; larger is nearer the viewer.
    pub depth: f32,
    pub nickname: String,
    pub status: &'static str,
    pub hearts: u32,
}

impl AnimalView {
    pub fn of(entity: Entity, animal: &Animal) -> Self {
        Self {
            entity,
            interaction_rect: animal.interaction_rect,
            depth: animal.rect.center().y,
            nickname: animal.nickname.clone(),
            status: animal.status.label(),
            hearts: animal.love_hearts,
        }
    }
}

/// The nearest-to-viewer animal whose interaction rect holds `point`.
pub fn topmost_at(animals: &[AnimalView], point: Vec2) -> Option<Entity> {
    animals
        .iter()
        .filter(|a| a.interaction_rect.contains_point(point))
        .max_by(|a, b| a.depth.total_cmp(&b.depth))
        .map(|a| a.entity)
}

#[derive(Debug, Clone, Copy)]
struct Sheet {
    menu: SeqId,
    menu_size: Vec2,
    full_heart: SeqId,
    empty_heart: SeqId,
    heart_size: Vec2,
    /// Top-left, top-right, bottom-left, bottom-right.
    corners: [(SeqId, Vec2); 4],
}

pub struct AnimalPanel {
    sheet: Sheet,
    hovering_on: Option<Entity>,
    menu_shown_for: Option<Entity>,
}

impl AnimalPanel {
    pub fn new(catalog: &SpriteCatalog) -> Result<Self, StartupError> {
        let corner = |name: &str| -> Result<(SeqId, Vec2), StartupError> {
            let id = catalog.id(&format!("ui/animals/hover_{name}"))?;
            Ok((id, catalog.size_of(id)))
        };
        let menu = catalog.id("ui/animals/animal_menu")?;
        let full_heart = catalog.id("ui/animals/full_heart")?;
        let sheet = Sheet {
            menu,
            menu_size: catalog.size_of(menu),
            full_heart,
            empty_heart: catalog.id("ui/animals/empty_heart")?,
            heart_size: catalog.size_of(full_heart),
            corners: [corner("tl")?, corner("tr")?, corner("bl")?, corner("br")?],
        };
        Ok(Self { sheet, hovering_on: None, menu_shown_for: None })
    }

    pub fn hovering_on(&self) -> Option<Entity> {
        self.hovering_on
    }

    pub fn menu_shown_for(&self) -> Option<Entity> {
        self.menu_shown_for
    }

    fn draw_hover(&self, rect: Rect, offset: Vec2, out: &mut UiDrawList) {
        let [tl, tr, bl, br] = self.sheet.corners;
        let rect = rect.translated(-offset);
        out.image(tl.0, rect.min, tl.1);
        out.image(tr.0, Vec2::new(rect.max.x - tr.1.x, rect.min.y), tr.1);
        out.image(bl.0, Vec2::new(rect.min.x, rect.max.y - bl.1.y), bl.1);
        out.image(br.0, rect.max - br.1, br.1);
    }

    fn draw_menu(&self, view: &AnimalView, offset: Vec2, max_hearts: u32, out: &mut UiDrawList) {
        let s = &self.sheet;
        let anchor = view.interaction_rect.mid_top() - offset;
        let top_left = Vec2::new(anchor.x - s.menu_size.x / 2.0, anchor.y - s.menu_size.y);
        out.image(s.menu, top_left, s.menu_size);

        let name_at = top_left + Vec2::new(0.0, NAME_TOP);
        out.centered_text(view.nickname.clone(), name_at, s.menu_size.x, FONT_SIZE, TEXT_COLOR);
        let status_at = name_at + Vec2::new(0.0, FONT_SIZE + STATUS_GAP);
        out.centered_text(
            format!("Status: {}", view.status),
            status_at,
            s.menu_size.x,
            FONT_SIZE,
            TEXT_COLOR,
        );

        let full = view.hearts.min(max_hearts);
        for i in 0..max_hearts {
            let seq = if i < full { s.full_heart } else { s.empty_heart };
            let at = top_left + HEART_ORIGIN + Vec2::new(HEART_STEP * i as f32, 0.0);
            out.image(seq, at, s.heart_size);
        }
    }
}

impl UiComponent for AnimalPanel {
    fn name(&self) -> &'static str {
        "Animal panel"
    }

    fn is_active(&self) -> bool {
        self.menu_shown_for.is_some()
    }

    fn disable(&mut self) {
        self.hovering_on = None;
        self.menu_shown_for = None;
    }

    fn handle_event(&mut self, event: &InputEvent, _ctx: &UiContext) {
        match (self.is_active(), event) {
            (false, InputEvent::PointerDown { button: PointerButton::Secondary, .. }) => {
                self.menu_shown_for = self.hovering_on;
            }
            (true, InputEvent::KeyDown(GameKey::Escape)) => self.disable(),
            _ => {}
        }
    }

    fn handle_input(&mut self, ctx: &UiContext) {
        // The highlight stays on the menu's animal while the menu is open.
        if self.is_active() {
            return;
        }
        self.hovering_on = match ctx.input.pointer {
            Some(pos) if ctx.input.is_held(GameKey::LeftShift) => {
                topmost_at(ctx.animals, pos + ctx.camera_offset)
            }
            _ => None,
        };
    }

    fn render(&self, ctx: &UiContext, out: &mut UiDrawList) {
        let find = |entity: Option<Entity>| {
            entity.and_then(|e| ctx.animals.iter().find(|a| a.entity == e))
        };
        if let Some(view) = find(self.hovering_on) {
            self.draw_hover(view.interaction_rect, ctx.camera_offset, out);
        }
        if let Some(view) = find(self.menu_shown_for) {
            self.draw_menu(view, ctx.camera_offset, ctx.cfg.animals.max_hearts_shown, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::present::UiDraw;

    fn view(index: u32, rect: Rect, hearts: u32) -> AnimalView {
        AnimalView {
            entity: Entity::from_raw(index),
            interaction_rect: rect,
            depth: rect.center().y,
            nickname: format!("animal {index}"),
            status: "idling",
            hearts,
        }
    }

    #[test]
    fn test_topmost_prefers_largest_depth() {
        let back = view(1, Rect::from_top_left(Vec2::new(0.0, 0.0), Vec2::splat(100.0)), 0);
        let front = view(2, Rect::from_top_left(Vec2::new(20.0, 30.0), Vec2::splat(100.0)), 0);
        let animals = [back, front];
        assert_eq!(topmost_at(&animals, Vec2::new(50.0, 50.0)), Some(Entity::from_raw(2)));
        assert_eq!(topmost_at(&animals, Vec2::new(5.0, 5.0)), Some(Entity::from_raw(1)));
        assert_eq!(topmost_at(&animals, Vec2::new(500.0, 5.0)), None);
    }

    #[test]
    fn test_menu_hearts_capped() {
        let mut catalog = SpriteCatalog::default();
        for key in [
            "ui/animals/animal_menu",
            "ui/animals/full_heart",
            "ui/animals/empty_heart",
            "ui/animals/hover_tl",
            "ui/animals/hover_tr",
            "ui/animals/hover_bl",
            "ui/animals/hover_br",
        ] {
            catalog.insert(key, 1, Vec2::splat(16.0));
        }
        let panel = AnimalPanel::new(&catalog).unwrap();
        let full = catalog.id("ui/animals/full_heart").unwrap();
        let loved = view(1, Rect::from_top_left(Vec2::splat(200.0), Vec2::splat(50.0)), 9);
        let mut out = UiDrawList::default();
        panel.draw_menu(&loved, Vec2::ZERO, 5, &mut out);
        let hearts = out
            .0
            .iter()
            .filter(|d| matches!(d, UiDraw::Image { seq, .. } if *seq == full))
            .count();
        assert_eq!(hearts, 5);
    }
}
