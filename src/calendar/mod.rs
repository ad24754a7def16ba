//! Calendar domain: the day clock that drives everything else.
//!
//! Responsible for:
//! - Advancing the time of day every frame and applying the night transition
//! - Ticking the thunder timers
//! - Rolling the next day when a sleep transition completes
//! - Sending `NightFellEvent` and `DayRolledEvent`

pub mod day;
pub mod weather;

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::frame::FrameSet;
use crate::shared::*;

pub use day::{DayCycle, DaySummary, ThunderState};
pub use weather::{Weather, WeatherCategory, WeatherType};

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DayCycle>()
            .add_event::<NightFellEvent>()
            .add_event::<DayRolledEvent>()
            .add_systems(Update, tick_day_clock.in_set(FrameSet::Clock))
            .add_systems(Update, roll_day_on_sleep.in_set(FrameSet::Transitions));
    }
}

// ─── Clock ────────────────────────────────────────────────────────────────────

/// Thunder timers first, then the clock itself.
pub fn tick_day_clock(
    time: Res<Time>,
    cfg: Res<GameConfig>,
    mut day: ResMut<DayCycle>,
    mut night_writer: EventWriter<NightFellEvent>,
) {
    let mut rng = rand::thread_rng();
    let kind = day.weather().kind();
    if day.thunder.tick(time.delta(), kind, &cfg.thunder, &mut rng) {
        debug!("[Calendar] Thunder flash window opened");
    }

    if day.advance(time.delta_secs(), &cfg, &mut rng) {
        info!(
            "[Calendar] Night falls on day {}: {} at {} degrees",
            day.day(),
            day.weather(),
            day.temperature()
        );
        night_writer.send(NightFellEvent { day: day.day() });
    }
}

// ─── Day rollover ─────────────────────────────────────────────────────────────

/// Applies the deferred effect of the sleep transition.
pub fn roll_day_on_sleep(
    mut scene_events: EventReader<SceneChangeEvent>,
    cfg: Res<GameConfig>,
    mut day: ResMut<DayCycle>,
    mut rolled_writer: EventWriter<DayRolledEvent>,
) {
    for SceneChangeEvent(change) in scene_events.read() {
        if *change != SceneChange::Sleep {
            continue;
        }
        day.roll_day(&cfg, &mut rand::thread_rng());
        info!(
            "[Calendar] Day {} ({}) begins: {} at {} degrees",
            day.day(),
            day.day_of_week(),
            day.weather(),
            day.temperature()
        );
        rolled_writer.send(DayRolledEvent { day: day.day() });
    }
}
