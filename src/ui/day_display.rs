//! Top-left widget: weather, thermometer, weekday and time-of-day arrow.
//! Never active and ignores input.

use std::collections::HashMap;

use bevy::prelude::*;

use super::arbiter::{UiComponent, UiContext};
use super::present::UiDrawList;
use crate::calendar::{DaySummary, Weather};
use crate::calendar::day::DAYS_OF_WEEK;
use crate::config::GameConfig;
use crate::error::StartupError;
use crate::world::sprites::{SeqId, SpriteCatalog};

const OFFSET: Vec2 = Vec2::new(5.0, 5.0);
const THERMOMETER_AT: Vec2 = Vec2::new(-6.0, 49.0);
const WEATHER_AT: Vec2 = Vec2::new(8.0, 8.0);
const WEEKDAY_CENTER: Vec2 = Vec2::new(42.0, 61.0);
const ARROW_LEFT: f32 = 54.0;
/// Vertical centre of the arrow per division.
const ARROW_HEIGHTS: [f32; 5] = [20.0, 21.0, 24.0, 27.0, 27.0];

#[derive(Debug, Clone, Copy)]
struct Piece {
    seq: SeqId,
    size: Vec2,
}

impl Piece {
    fn resolve(catalog: &SpriteCatalog, key: &str) -> Result<Self, StartupError> {
        let seq = catalog.id(key)?;
        Ok(Self { seq, size: catalog.size_of(seq) })
    }
}

pub struct DayDisplay {
    base: Piece,
    thermometer_base: Piece,
    thermometer: HashMap<i32, Piece>,
    weather: HashMap<Weather, Piece>,
    weekdays: HashMap<&'static str, Piece>,
    arrows: Vec<Piece>,
}

impl DayDisplay {
    pub fn new(catalog: &SpriteCatalog, cfg: &GameConfig) -> Result<Self, StartupError> {
        let thermometer = (cfg.day.min_temperature..=cfg.day.max_temperature)
            .map(|t| Ok((t, Piece::resolve(catalog, &format!("ui/days/thermometer/{t}"))?)))
            .collect::<Result<_, StartupError>>()?;
        let weather = Weather::all()
            .map(|w| {
                let key = format!(
                    "ui/days/weather/{}/{}",
                    w.category().asset_key(),
                    w.kind().asset_key()
                );
                Ok((w, Piece::resolve(catalog, &key)?))
            })
            .collect::<Result<_, StartupError>>()?;
        let weekdays = DAYS_OF_WEEK
            .iter()
            .map(|d| Ok((*d, Piece::resolve(catalog, &format!("ui/days/days_of_week/{d}"))?)))
            .collect::<Result<_, StartupError>>()?;
        let arrows = (0..cfg.day.intervals)
            .map(|i| Piece::resolve(catalog, &format!("ui/days/arrows/{i}")))
            .collect::<Result<_, StartupError>>()?;

        Ok(Self {
            base: Piece::resolve(catalog, "ui/days/base")?,
            thermometer_base: Piece::resolve(catalog, "ui/days/thermometer/base")?,
            thermometer,
            weather,
            weekdays,
            arrows,
        })
    }

    fn draw(&self, summary: &DaySummary, out: &mut UiDrawList) {
        let mut put = |piece: Option<&Piece>, top_left: Vec2| {
            if let Some(p) = piece {
                out.image(p.seq, OFFSET + top_left, p.size);
            }
        };

        put(Some(&self.thermometer_base), THERMOMETER_AT);
        put(self.thermometer.get(&summary.temperature), THERMOMETER_AT);
        put(Some(&self.base), Vec2::ZERO);
        put(self.weather.get(&summary.weather), WEATHER_AT);

        let weekday = self.weekdays.get(summary.day_of_week);
        if let Some(p) = weekday {
            put(Some(p), WEEKDAY_CENTER - p.size / 2.0);
        }

        let arrow = self.arrows.get(summary.division);
        if let Some(p) = arrow {
            let y = ARROW_HEIGHTS[summary.division.min(ARROW_HEIGHTS.len() - 1)];
            put(Some(p), Vec2::new(ARROW_LEFT, y - p.size.y / 2.0));
        }
    }
}

impl UiComponent for DayDisplay {
    fn name(&self) -> &'static str {
        "Day display"
    }

    fn is_active(&self) -> bool {
        false
    }

    fn disable(&mut self) {}

    fn render(&self, ctx: &UiContext, out: &mut UiDrawList) {
        self.draw(&ctx.day.summary(ctx.cfg), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{WeatherCategory, WeatherType};
    use crate::world::sprites::SpriteManifest;
    use std::path::Path;

    fn shipped_catalog() -> SpriteCatalog {
        let manifest = SpriteManifest::load(Path::new("assets/data/sprites.ron")).unwrap();
        SpriteCatalog::from_manifest(&manifest)
    }

    #[test]
    fn test_resolves_every_weather_pair() {
        let catalog = shipped_catalog();
        let display = DayDisplay::new(&catalog, &GameConfig::default()).unwrap();
        assert_eq!(display.weather.len(), Weather::all().count());
        assert_eq!(display.arrows.len(), 5);
    }

    #[test]
    fn test_draws_weekday_and_arrow() {
        let catalog = shipped_catalog();
        let display = DayDisplay::new(&catalog, &GameConfig::default()).unwrap();
        let summary = DaySummary {
            temperature: 3,
            weather: Weather::new(WeatherCategory::Normal, WeatherType::Rain).unwrap(),
            day_of_week: "wed",
            division: 4,
        };
        let mut out = UiDrawList::default();
        display.draw(&summary, &mut out);
        // Thermometer base and level, frame, weather, weekday, arrow.
        assert_eq!(out.0.len(), 6);
    }
}
