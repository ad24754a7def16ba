//! Countdown timers driven by the frame delta.
//!
//! A thin layer over Bevy's [`Timer`] that adds an explicit active flag:
//! an inactive timer ignores ticks, and a one-shot timer deactivates itself
//! when it fires. Callbacks are replaced by the `bool` returned from
//! [`GameTimer::tick`].

use std::time::Duration;

use bevy::prelude::*;

#[derive(Debug, Clone)]
pub struct GameTimer {
    timer: Timer,
    active: bool,
    repeat: bool,
}

impl GameTimer {
    pub fn new(seconds: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds, TimerMode::Once),
            active: false,
            repeat: false,
        }
    }

    /// A timer that restarts itself every time it fires.
    pub fn repeating(seconds: f32) -> Self {
        Self {
            repeat: true,
            ..Self::new(seconds)
        }
    }

    pub fn autostart(mut self) -> Self {
        self.activate();
        self
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.timer.reset();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.timer.reset();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Takes effect from the next activation (or immediately for the current
    /// countdown, measured from its start).
    pub fn set_duration(&mut self, seconds: f32) {
        self.timer.set_duration(Duration::from_secs_f32(seconds));
    }

    pub fn duration(&self) -> f32 {
        self.timer.duration().as_secs_f32()
    }

    /// Advances the countdown. Returns `true` on the tick the timer fires.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.timer.tick(delta);
        if !self.timer.finished() {
            return false;
        }
        if self.repeat {
            self.timer.reset();
        } else {
            self.active = false;
        }
        true
    }
}
