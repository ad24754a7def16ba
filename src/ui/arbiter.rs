//! Decides which UI owns input.
//!
//! At most one component is hard-active at a time. Every event and input
//! poll goes to the active component only, or to all of them when none is
//! active. A component that flips from inactive to active claims the
//! arbiter and wipes every other component's soft state; flipping back
//! releases it.

use bevy::prelude::*;

use super::present::UiDrawList;
use crate::calendar::DayCycle;
use crate::config::GameConfig;
use crate::input::{FrameInput, InputEvent};
use crate::player::skills::Skills;

use super::animal_panel::AnimalView;

/// What a UI component may look at while handling input or drawing.
pub struct UiContext<'a> {
    pub input: &'a FrameInput,
    /// Map-space position of the window's top-left corner.
    pub camera_offset: Vec2,
    pub animals: &'a [AnimalView],
    pub skills: Option<&'a Skills>,
    pub day: &'a DayCycle,
    pub cfg: &'a GameConfig,
}

pub trait UiComponent: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Hard state: whether this component currently owns input.
    fn is_active(&self) -> bool;

    /// Clears both hard and soft state.
    fn disable(&mut self);

    fn handle_event(&mut self, _event: &InputEvent, _ctx: &UiContext) {}

    /// Continuous input, polled once per tick.
    fn handle_input(&mut self, _ctx: &UiContext) {}

    fn render(&self, ctx: &UiContext, out: &mut UiDrawList);
}

#[derive(Resource, Default)]
pub struct UiArbiter {
    components: Vec<Box<dyn UiComponent>>,
    active: Option<usize>,
}

impl UiArbiter {
    pub fn new(components: Vec<Box<dyn UiComponent>>) -> Self {
        Self { components, active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_name(&self) -> Option<&'static str> {
        self.active.map(|i| self.components[i].name())
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn UiComponent> {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Clears every component and forgets the active one. Used when a
    /// transition or a tool swing starts.
    pub fn disable_all(&mut self) {
        self.active = None;
        for component in &mut self.components {
            component.disable();
        }
    }

    pub fn dispatch_event(&mut self, event: &InputEvent, ctx: &UiContext) {
        self.run(|component| component.handle_event(event, ctx));
    }

    pub fn poll_input(&mut self, ctx: &UiContext) {
        self.run(|component| component.handle_input(ctx));
    }

    pub fn render(&self, ctx: &UiContext, out: &mut UiDrawList) {
        for component in &self.components {
            component.render(ctx, out);
        }
    }

    fn run(&mut self, mut handler: impl FnMut(&mut dyn UiComponent)) {
        for index in 0..self.components.len() {
            if self.active.is_some_and(|active| active != index) {
                continue;
            }
            let before = self.components[index].is_active();
            handler(self.components[index].as_mut());
            let after = self.components[index].is_active();

            match (before, after) {
                (false, true) => self.claim(index),
                (true, false) => self.release(index),
                _ => {}
            }
        }
    }

    fn claim(&mut self, index: usize) {
        debug_assert!(
            self.active.is_none(),
            "{} activated while {:?} is active",
            self.components[index].name(),
            self.active_name()
        );
        self.active = Some(index);
        for (i, other) in self.components.iter_mut().enumerate() {
            if i != index {
                other.disable();
            }
        }
        info!("[Ui] {} opened", self.components[index].name());
    }

    fn release(&mut self, index: usize) {
        debug_assert_eq!(self.active, Some(index), "released a UI that was not active");
        self.active = None;
        info!("[Ui] {} closed", self.components[index].name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{GameKey, PointerButton};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    /// What the test can still see of a boxed [`Toggle`].
    #[derive(Clone, Default)]
    struct Watch {
        highlighted: Arc<AtomicBool>,
        events: Arc<AtomicU32>,
    }

    impl Watch {
        fn highlighted(&self) -> bool {
            self.highlighted.load(Ordering::Relaxed)
        }

        fn events(&self) -> u32 {
            self.events.load(Ordering::Relaxed)
        }
    }

    /// Opens on its own key, closes on Escape. Soft state is "highlighted",
    /// set by any pointer event.
    struct Toggle {
        name: &'static str,
        key: GameKey,
        open: bool,
        watch: Watch,
    }

    impl Toggle {
        fn boxed(name: &'static str, key: GameKey) -> Box<dyn UiComponent> {
            Self::watched(name, key).0
        }

        fn watched(name: &'static str, key: GameKey) -> (Box<dyn UiComponent>, Watch) {
            let watch = Watch::default();
            let toggle = Self { name, key, open: false, watch: watch.clone() };
            (Box::new(toggle), watch)
        }
    }

    impl UiComponent for Toggle {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_active(&self) -> bool {
            self.open
        }

        fn disable(&mut self) {
            self.open = false;
            self.watch.highlighted.store(false, Ordering::Relaxed);
        }

        fn handle_event(&mut self, event: &InputEvent, _ctx: &UiContext) {
            self.watch.events.fetch_add(1, Ordering::Relaxed);
            match *event {
                InputEvent::KeyDown(k) if k == self.key => self.open = true,
                InputEvent::KeyDown(GameKey::Escape) => self.open = false,
                InputEvent::PointerDown { .. } => self.watch.highlighted.store(true, Ordering::Relaxed),
                _ => {}
            }
        }

        fn render(&self, _ctx: &UiContext, _out: &mut UiDrawList) {}
    }

    fn with_context(f: impl FnOnce(&UiContext)) {
        let cfg = GameConfig::default();
        let day = DayCycle::new(&cfg, &mut StdRng::seed_from_u64(0));
        let input = FrameInput::default();
        let ctx = UiContext {
            input: &input,
            camera_offset: Vec2::ZERO,
            animals: &[],
            skills: None,
            day: &day,
            cfg: &cfg,
        };
        f(&ctx);
    }

    #[test]
    fn test_only_one_component_becomes_active() {
        with_context(|ctx| {
            let mut arbiter = UiArbiter::new(vec![
                Toggle::boxed("a", GameKey::Axe),
                Toggle::boxed("b", GameKey::Hoe),
            ]);
            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Axe), ctx);
            assert_eq!(arbiter.active_name(), Some("a"));

            // The inactive component never sees the event.
            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Hoe), ctx);
            assert_eq!(arbiter.active_name(), Some("a"));

            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Escape), ctx);
            assert!(!arbiter.is_active());

            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Hoe), ctx);
            assert_eq!(arbiter.active_name(), Some("b"));
        });
    }

    #[test]
    fn test_claim_clears_other_soft_state() {
        with_context(|ctx| {
            let (a, a_watch) = Toggle::watched("a", GameKey::Axe);
            let (b, b_watch) = Toggle::watched("b", GameKey::Hoe);
            let mut arbiter = UiArbiter::new(vec![a, b]);
            let click = InputEvent::PointerDown { button: PointerButton::Primary, pos: Vec2::ZERO };

            arbiter.dispatch_event(&click, ctx);
            assert!(a_watch.highlighted());
            assert!(b_watch.highlighted());

            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Hoe), ctx);
            assert_eq!(arbiter.active_name(), Some("b"));
            assert!(!a_watch.highlighted());
            assert!(b_watch.highlighted());
        });
    }

    #[test]
    fn test_release_hands_events_back_to_everyone() {
        with_context(|ctx| {
            let (a, a_watch) = Toggle::watched("a", GameKey::Axe);
            let (b, b_watch) = Toggle::watched("b", GameKey::Hoe);
            let mut arbiter = UiArbiter::new(vec![a, b]);
            let click = InputEvent::PointerDown { button: PointerButton::Primary, pos: Vec2::ZERO };

            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Axe), ctx);
            assert_eq!(arbiter.active_name(), Some("a"));

            // While "a" is open only "a" hears events.
            let seen = b_watch.events();
            arbiter.dispatch_event(&click, ctx);
            assert_eq!(b_watch.events(), seen);
            assert!(a_watch.highlighted());
            assert!(!b_watch.highlighted());

            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Escape), ctx);
            assert!(!arbiter.is_active());

            let seen = b_watch.events();
            arbiter.dispatch_event(&click, ctx);
            assert_eq!(b_watch.events(), seen + 1);
            assert!(b_watch.highlighted());
        });
    }

    #[test]
    fn test_disable_all_releases() {
        with_context(|ctx| {
            let mut arbiter = UiArbiter::new(vec![Toggle::boxed("a", GameKey::Axe)]);
            arbiter.dispatch_event(&InputEvent::KeyDown(GameKey::Axe), ctx);
            arbiter.disable_all();
            assert!(!arbiter.is_active());
            assert!(arbiter.components().all(|c| !c.is_active()));
            // Disabling with nothing active is a no-op.
            arbiter.disable_all();
            assert!(!arbiter.is_active());
        });
    }
}
