//! The day clock: time of day, temperature, weather and thunder.
//!
//! `DayCycle` is the only owner of this state. Everything here is a pure
//! function of the current state plus an injected random source, so the
//! clock can be stepped with any sequence of deltas in tests.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use super::weather::{day_start_weather, night_weather, Weather, WeatherType};
use crate::config::{GameConfig, ThunderConfig};
use crate::timers::GameTimer;

pub const DAYS_OF_WEEK: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

// ═══════════════════════════════════════════════════════════════════════
// THUNDER
// ═══════════════════════════════════════════════════════════════════════

/// Flash window plus a repeating activation timer whose period is re-rolled
/// on every fire.
#[derive(Debug, Clone)]
pub struct ThunderState {
    flash: GameTimer,
    activation: GameTimer,
}

impl ThunderState {
    pub fn new(cfg: &ThunderConfig, rng: &mut impl Rng) -> Self {
        Self {
            flash: GameTimer::new(cfg.flash_duration),
            activation: GameTimer::repeating(Self::roll_period(cfg, rng)).autostart(),
        }
    }

    fn roll_period(cfg: &ThunderConfig, rng: &mut impl Rng) -> f32 {
        rng.gen_range(cfg.min_period..=cfg.max_period)
    }

    /// Returns `true` when a new flash window opened this tick.
    pub fn tick(
        &mut self,
        delta: Duration,
        weather: WeatherType,
        cfg: &ThunderConfig,
        rng: &mut impl Rng,
    ) -> bool {
        self.flash.tick(delta);
        if !self.activation.tick(delta) {
            return false;
        }
        self.activation.set_duration(Self::roll_period(cfg, rng));
        if weather == WeatherType::Thunder {
            self.flash.activate();
            return true;
        }
        false
    }

    pub fn deactivate(&mut self) {
        self.flash.deactivate();
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_active()
    }

    /// Per-frame roll for whitening the screen while a flash window is open.
    pub fn should_flash(&self, cfg: &ThunderConfig, rng: &mut impl Rng) -> bool {
        self.is_flashing() && rng.gen_range(0..10) < cfg.intensity
    }

    pub fn activation_period(&self) -> f32 {
        self.activation.duration()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DAY CYCLE
// ═══════════════════════════════════════════════════════════════════════

/// Everything the day display needs, compared to decide when to redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub temperature: i32,
    pub weather: Weather,
    pub day_of_week: &'static str,
    pub division: usize,
}

#[derive(Resource, Debug, Clone)]
pub struct DayCycle {
    day: u32,
    current_time: f32,
    temperature: i32,
    weather: Weather,
    pub thunder: ThunderState,
}

impl FromWorld for DayCycle {
    fn from_world(world: &mut World) -> Self {
        let cfg = world.get_resource::<GameConfig>().cloned().unwrap_or_default();
        Self::new(&cfg, &mut rand::thread_rng())
    }
}

impl DayCycle {
    /// Day zero at dawn, with a freshly rolled temperature and weather.
    pub fn new(cfg: &GameConfig, rng: &mut impl Rng) -> Self {
        let temperature = Self::roll_temperature(cfg, rng);
        Self {
            day: 0,
            current_time: 0.0,
            temperature,
            weather: day_start_weather(temperature, &cfg.day, rng),
            thunder: ThunderState::new(&cfg.thunder, rng),
        }
    }

    /// A clock in a known state. Rejects nothing: `weather` is already a valid pair.
    pub fn with_state(cfg: &GameConfig, temperature: i32, weather: Weather, rng: &mut impl Rng) -> Self {
        Self {
            day: 0,
            current_time: 0.0,
            temperature,
            weather,
            thunder: ThunderState::new(&cfg.thunder, rng),
        }
    }

    fn roll_temperature(cfg: &GameConfig, rng: &mut impl Rng) -> i32 {
        rng.gen_range(cfg.day.min_temperature..=cfg.day.max_temperature)
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn day_of_week(&self) -> &'static str {
        DAYS_OF_WEEK[self.day as usize % DAYS_OF_WEEK.len()]
    }

    /// Index of the first day division whose threshold is at or past the
    /// current fraction of the day.
    pub fn time_division(&self, cfg: &GameConfig) -> usize {
        time_division(self.current_time, cfg)
    }

    pub fn is_night_time(&self, cfg: &GameConfig) -> bool {
        self.time_division(cfg) == cfg.day.intervals - 1
    }

    pub fn luminance(&self, cfg: &GameConfig) -> f32 {
        luminance(self.current_time, cfg)
    }

    /// Moves the clock forward by `dt` real seconds. Returns `true` if this
    /// step entered the night division, in which case the night transition
    /// has already been applied.
    pub fn advance(&mut self, dt: f32, cfg: &GameConfig, rng: &mut impl Rng) -> bool {
        let before = self.time_division(cfg);
        self.current_time = (self.current_time + dt * cfg.day.speed).min(cfg.day.length);
        let after = self.time_division(cfg);

        let night = cfg.day.intervals - 1;
        if before == night - 1 && after == night {
            self.night_transition(cfg, rng);
            return true;
        }
        false
    }

    /// Cools the evening down and swaps in night weather.
    pub fn night_transition(&mut self, cfg: &GameConfig, rng: &mut impl Rng) {
        self.thunder.deactivate();
        self.temperature =
            (self.temperature - cfg.day.night_temperature_drop).max(cfg.day.min_temperature);
        self.weather = night_weather(self.weather, self.temperature, &cfg.day, rng);
    }

    /// Starts the next day. Weather particles are cleared by their own
    /// domain on the resulting `DayRolledEvent`.
    pub fn roll_day(&mut self, cfg: &GameConfig, rng: &mut impl Rng) {
        self.day += 1;
        self.current_time = 0.0;
        self.thunder.deactivate();
        self.temperature = Self::roll_temperature(cfg, rng);
        self.weather = day_start_weather(self.temperature, &cfg.day, rng);
    }

    pub fn summary(&self, cfg: &GameConfig) -> DaySummary {
        DaySummary {
            temperature: self.temperature,
            weather: self.weather,
            day_of_week: self.day_of_week(),
            division: self.time_division(cfg),
        }
    }
}

pub fn time_division(current_time: f32, cfg: &GameConfig) -> usize {
    let fraction = current_time / cfg.day.length;
    let n = cfg.day.intervals;
    (0..n)
        .find(|&i| fraction <= (i + 1) as f32 / n as f32)
        .unwrap_or(n - 1)
}

/// Sky brightness in `[min, max]` luminance, a pure sine of the time of day.
pub fn luminance(current_time: f32, cfg: &GameConfig) -> f32 {
    let (max, min) = (cfg.day.max_luminance, cfg.day.min_luminance);
    ((max - min) / 2.0 * (current_time * cfg.luminance_coefficient()).sin() + (max + min) / 2.0)
        .floor()
}
