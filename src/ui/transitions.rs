//! Screen transitions: fade to black, apply a scene change, fade back.
//!
//! The fade value runs from 255 (clear) down to 0 (black) and back. The
//! deferred [`SceneChange`] is only handed out while the screen is fully
//! covered. The cutscene variant plays a full-screen animation between the
//! two fades and applies its change on a second trip to black, once the
//! cutscene is nearly over.

use bevy::prelude::*;

use super::arbiter::UiArbiter;
use crate::config::GameConfig;
use crate::error::StartupError;
use crate::shared::*;
use crate::world::sprites::{SeqId, SpriteCatalog};

const FADE_MAX: f32 = 255.0;

// ─────────────────────────────────────────────────────────────────────────────
// Plain fade
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Transition {
    pub color: f32,
    speed: f32,
    active: bool,
    pending: Option<SceneChange>,
}

impl Transition {
    pub fn new(cfg: &GameConfig) -> Self {
        Self {
            color: FADE_MAX,
            speed: -cfg.transitions.fade_speed,
            active: false,
            pending: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self, change: SceneChange) {
        self.active = true;
        self.pending = Some(change);
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.pending = None;
    }

    /// Returns the scene change on the tick the screen goes fully black.
    pub fn update(&mut self, dt: f32) -> Option<SceneChange> {
        if !self.active {
            return None;
        }
        self.color += self.speed * dt;
        if self.color < 0.0 {
            self.color = 0.0;
            self.speed = -self.speed;
            return self.pending;
        }
        if self.color > FADE_MAX {
            self.color = FADE_MAX;
            self.speed = -self.speed;
            self.deactivate();
        }
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cutscenes
// ─────────────────────────────────────────────────────────────────────────────

/// Full-screen animation that holds on its last frame.
#[derive(Debug, Clone)]
pub struct Cutscene {
    pub seq: SeqId,
    len: usize,
    index: f32,
    speed: f32,
    end_tolerance: f32,
    active: bool,
}

impl Cutscene {
    pub fn new(seq: SeqId, len: usize, cfg: &GameConfig) -> Self {
        Self {
            seq,
            len: len.max(1),
            index: 0.0,
            speed: cfg.transitions.boat_cutscene_speed,
            end_tolerance: cfg.transitions.cutscene_end_tolerance,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame(&self) -> usize {
        self.index as usize
    }

    /// Close enough to the end that the fade out may start.
    pub fn reached_end(&self) -> bool {
        self.index >= self.len as f32 * self.end_tolerance
    }

    fn play(&mut self) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
        self.index = 0.0;
    }

    fn update(&mut self, dt: f32) {
        if self.active {
            self.index = (self.index + self.speed * dt).min((self.len - 1) as f32);
        }
    }
}

#[derive(Debug, Clone)]
pub struct CutsceneTransition {
    pub color: f32,
    speed: f32,
    active: bool,
    pending: Option<SceneChange>,
    left: Cutscene,
    right: Cutscene,
    /// Which cutscene this activation plays.
    current: Option<Facing>,
}

impl CutsceneTransition {
    pub fn new(left: Cutscene, right: Cutscene, cfg: &GameConfig) -> Self {
        Self {
            color: FADE_MAX,
            speed: -cfg.transitions.fade_speed,
            active: false,
            pending: None,
            left,
            right,
            current: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self, change: SceneChange, key: Facing) {
        self.active = true;
        self.pending = Some(change);
        self.current = Some(key);
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.pending = None;
        self.current = None;
    }

    pub fn cutscene(&self) -> Option<&Cutscene> {
        match self.current? {
            Facing::Left => Some(&self.left),
            _ => Some(&self.right),
        }
    }

    fn cutscene_mut(&mut self) -> Option<&mut Cutscene> {
        match self.current? {
            Facing::Left => Some(&mut self.left),
            _ => Some(&mut self.right),
        }
    }

    pub fn cutscene_playing(&self) -> bool {
        self.cutscene().is_some_and(Cutscene::is_active)
    }

    /// The cutscene is running with nothing faded over it.
    pub fn playing_unfaded(&self) -> bool {
        self.cutscene()
            .is_some_and(|c| c.is_active() && !c.reached_end() && self.color >= FADE_MAX)
    }

    pub fn update(&mut self, dt: f32) -> Option<SceneChange> {
        if !self.active {
            return None;
        }
        if let Some(cutscene) = self.cutscene_mut() {
            cutscene.update(dt);
        }
        if self.playing_unfaded() {
            return None;
        }

        self.color += self.speed * dt;
        if self.color < 0.0 {
            self.color = 0.0;
            self.speed = -self.speed;
            let pending = self.pending;
            let cutscene = self.cutscene_mut()?;
            if !cutscene.is_active() {
                cutscene.play();
                return None;
            }
            cutscene.stop();
            return pending;
        }
        if self.color > FADE_MAX {
            self.color = FADE_MAX;
            self.speed = -self.speed;
            if !self.cutscene_playing() {
                self.deactivate();
            }
        }
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Director
// ─────────────────────────────────────────────────────────────────────────────

/// Owns every transition the game can run.
#[derive(Resource, Debug, Clone)]
pub struct TransitionDirector {
    pub sleep: Transition,
    pub boat: CutsceneTransition,
}

impl TransitionDirector {
    pub fn new(catalog: &SpriteCatalog, cfg: &GameConfig) -> Result<Self, StartupError> {
        let cutscene = |key: &str| -> Result<Cutscene, StartupError> {
            let seq = catalog.id(key)?;
            Ok(Cutscene::new(seq, catalog.len_of(seq), cfg))
        };
        let boat = CutsceneTransition::new(
            cutscene("cutscene/boat/left")?,
            cutscene("cutscene/boat/right")?,
            cfg,
        );
        Ok(Self { sleep: Transition::new(cfg), boat })
    }

    pub fn is_active(&self) -> bool {
        self.sleep.is_active() || self.boat.is_active()
    }

    pub fn cutscene_playing(&self) -> bool {
        self.boat.cutscene_playing()
    }

    pub fn start_sleep(&mut self, arbiter: &mut UiArbiter) {
        arbiter.disable_all();
        self.sleep.activate(SceneChange::Sleep);
        info!("[Transition] Sleep fade started");
    }

    pub fn start_boat(&mut self, orientation: Facing, change: SceneChange, arbiter: &mut UiArbiter) {
        arbiter.disable_all();
        self.boat.activate(change, orientation);
        info!("[Transition] Boat cutscene {} started", orientation.asset_key());
    }

    /// Fade value of whichever transition is running; 255 when none is.
    pub fn fade(&self) -> f32 {
        if self.sleep.is_active() {
            self.sleep.color
        } else if self.boat.is_active() && !self.boat.playing_unfaded() {
            self.boat.color
        } else {
            FADE_MAX
        }
    }
}

pub fn update_transitions(
    time: Res<Time>,
    mut director: ResMut<TransitionDirector>,
    mut scene_writer: EventWriter<SceneChangeEvent>,
) {
    let dt = time.delta_secs();
    let changes = [director.sleep.update(dt), director.boat.update(dt)];
    for change in changes.into_iter().flatten() {
        info!("[Transition] Screen covered, applying {:?}", change);
        scene_writer.send(SceneChangeEvent(change));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn boat_transition(frames: usize) -> CutsceneTransition {
        let cfg = GameConfig::default();
        CutsceneTransition::new(
            Cutscene::new(SeqId(0), frames, &cfg),
            Cutscene::new(SeqId(1), frames, &cfg),
            &cfg,
        )
    }

    #[test]
    fn test_plain_round_trip_fires_once_at_black() {
        let mut t = Transition::new(&GameConfig::default());
        t.activate(SceneChange::Sleep);
        let mut fired = Vec::new();
        for _ in 0..600 {
            if let Some(change) = t.update(DT) {
                fired.push((change, t.color));
            }
            if !t.is_active() {
                break;
            }
        }
        assert_eq!(fired, vec![(SceneChange::Sleep, 0.0)]);
        assert!(!t.is_active());
        assert_eq!(t.color, 255.0);

        // A second run behaves the same.
        t.activate(SceneChange::Sleep);
        let count = (0..600).filter_map(|_| t.update(DT)).count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_cutscene_plays_between_fades() {
        let mut t = boat_transition(50);
        let to = SceneChange::Teleport { to: Vec2::new(10.0, 20.0) };
        t.activate(to, Facing::Right);

        let mut fired = 0;
        let mut played = false;
        for _ in 0..2000 {
            if t.update(DT).is_some() {
                fired += 1;
                // The change is applied after the cutscene, on a black screen.
                assert_eq!(t.color, 0.0);
                assert!(played);
                assert!(!t.cutscene_playing());
            }
            played |= t.cutscene_playing();
            if !t.is_active() {
                break;
            }
        }
        assert!(played);
        assert_eq!(fired, 1);
        assert!(!t.is_active());
        assert_eq!(t.color, 255.0);
    }

    #[test]
    fn test_cutscene_holds_fade_until_near_end() {
        let mut t = boat_transition(100);
        t.activate(SceneChange::Sleep, Facing::Left);
        // Reach black, start the cutscene, fade back in.
        while !t.playing_unfaded() {
            t.update(DT);
        }
        assert_eq!(t.color, 255.0);
        let c = t.cutscene().unwrap();
        assert!(c.is_active());
        assert!(!c.reached_end());
        assert_eq!(c.seq, SeqId(0));
    }

    #[test]
    fn test_cutscene_frame_clamps_to_last() {
        let cfg = GameConfig::default();
        let mut c = Cutscene::new(SeqId(0), 10, &cfg);
        c.play();
        c.update(100.0);
        assert_eq!(c.frame(), 9);
        assert!(c.reached_end());
        c.stop();
        assert_eq!(c.frame(), 0);
    }
}
