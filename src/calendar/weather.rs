//! Weather categories, types and the random tables that move between them.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{DayConfig, ParticleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCategory {
    Hot,
    Normal,
    Night,
}

impl WeatherCategory {
    pub const ALL: [WeatherCategory; 3] =
        [WeatherCategory::Hot, WeatherCategory::Normal, WeatherCategory::Night];

    pub fn asset_key(self) -> &'static str {
        match self {
            WeatherCategory::Hot => "hot",
            WeatherCategory::Normal => "normal",
            WeatherCategory::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherType {
    Sunny,
    SunnyCloudy,
    Cloudy,
    Clear,
    Rain,
    HeavyRain,
    Thunder,
    Snowy,
}

impl WeatherType {
    pub const ALL: [WeatherType; 8] = [
        WeatherType::Sunny,
        WeatherType::SunnyCloudy,
        WeatherType::Cloudy,
        WeatherType::Clear,
        WeatherType::Rain,
        WeatherType::HeavyRain,
        WeatherType::Thunder,
        WeatherType::Snowy,
    ];

    /// Types that turn to snow when it is cold enough.
    pub fn is_rain_family(self) -> bool {
        matches!(self, WeatherType::Rain | WeatherType::HeavyRain)
    }

    pub fn asset_key(self) -> &'static str {
        match self {
            WeatherType::Sunny => "sunny",
            WeatherType::SunnyCloudy => "sunny_cloudy",
            WeatherType::Cloudy => "cloudy",
            WeatherType::Clear => "clear",
            WeatherType::Rain => "rain",
            WeatherType::HeavyRain => "heavy_rain",
            WeatherType::Thunder => "thunder",
            WeatherType::Snowy => "snowy",
        }
    }

    /// Falling-particle profile used while this weather is active.
    pub fn particle_kind(self) -> ParticleKind {
        match self {
            WeatherType::Rain => ParticleKind::Rain,
            WeatherType::HeavyRain => ParticleKind::HeavyRain,
            WeatherType::Thunder => ParticleKind::Thunder,
            WeatherType::Snowy => ParticleKind::Snowy,
            _ => ParticleKind::Grass,
        }
    }
}

/// A weather type paired with the category it belongs to.
///
/// Only constructible through [`Weather::new`], which rejects pairs the
/// tables can never produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weather {
    category: WeatherCategory,
    kind: WeatherType,
}

impl Weather {
    pub fn new(category: WeatherCategory, kind: WeatherType) -> Option<Self> {
        use WeatherType::*;
        let valid = match category {
            WeatherCategory::Hot => matches!(kind, Cloudy | Rain | Sunny),
            WeatherCategory::Normal => {
                matches!(kind, Cloudy | HeavyRain | Rain | SunnyCloudy | Sunny | Snowy)
            }
            WeatherCategory::Night => matches!(kind, Clear | Cloudy | Rain | Thunder | Snowy),
        };
        valid.then_some(Self { category, kind })
    }

    pub fn category(&self) -> WeatherCategory {
        self.category
    }

    pub fn kind(&self) -> WeatherType {
        self.kind
    }

    /// Every valid category and type pair.
    pub fn all() -> impl Iterator<Item = Weather> {
        WeatherCategory::ALL.into_iter().flat_map(|category| {
            WeatherType::ALL.into_iter().filter_map(move |kind| Weather::new(category, kind))
        })
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category.asset_key(), self.kind.asset_key())
    }
}

fn snow_override(kind: WeatherType, temperature: i32, snow_temperature: i32) -> WeatherType {
    if kind.is_rain_family() && temperature <= snow_temperature {
        WeatherType::Snowy
    } else {
        kind
    }
}

fn pick(rng: &mut impl Rng, options: &[WeatherType]) -> WeatherType {
    options.choose(rng).copied().unwrap_or(WeatherType::Cloudy)
}

/// Morning weather for a freshly rolled temperature.
pub fn day_start_weather(temperature: i32, cfg: &DayConfig, rng: &mut impl Rng) -> Weather {
    use WeatherType::*;
    if temperature >= cfg.hot_temperature {
        let kind = pick(rng, &[Cloudy, Rain, Sunny]);
        Weather { category: WeatherCategory::Hot, kind }
    } else {
        let kind = pick(rng, &[Cloudy, HeavyRain, Rain, SunnyCloudy, Sunny]);
        Weather {
            category: WeatherCategory::Normal,
            kind: snow_override(kind, temperature, cfg.snow_temperature),
        }
    }
}

/// Evening weather. `temperature` is the already-lowered night temperature.
pub fn night_weather(
    current: Weather,
    temperature: i32,
    cfg: &DayConfig,
    rng: &mut impl Rng,
) -> Weather {
    use WeatherType::*;
    let snow = cfg.snow_temperature;
    let kind = match (current.category, current.kind) {
        (WeatherCategory::Night, _) => return current,
        (WeatherCategory::Hot, Cloudy) => pick(rng, &[Clear, Cloudy, Rain]),
        (WeatherCategory::Hot, Rain) => pick(rng, &[Cloudy, Rain, Thunder]),
        (WeatherCategory::Hot, _) => pick(rng, &[Clear, Cloudy]),
        (WeatherCategory::Normal, Cloudy) => pick(rng, &[Clear, Cloudy, Rain]),
        (WeatherCategory::Normal, HeavyRain) => {
            if temperature <= snow {
                Snowy
            } else {
                pick(rng, &[Rain, Thunder])
            }
        }
        (WeatherCategory::Normal, Rain) => pick(rng, &[Cloudy, Rain]),
        (WeatherCategory::Normal, Snowy) => pick(rng, &[Cloudy, Snowy]),
        (WeatherCategory::Normal, _) => pick(rng, &[Clear, Cloudy]),
    };
    Weather {
        category: WeatherCategory::Night,
        kind: snow_override(kind, temperature, snow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day_cfg() -> DayConfig {
        GameConfig::default().day
    }

    #[test]
    fn test_invalid_pairs_are_rejected() {
        assert!(Weather::new(WeatherCategory::Hot, WeatherType::Snowy).is_none());
        assert!(Weather::new(WeatherCategory::Night, WeatherType::Sunny).is_none());
        assert!(Weather::new(WeatherCategory::Normal, WeatherType::SunnyCloudy).is_some());
    }

    #[test]
    fn test_hot_category_from_temperature() {
        let cfg = day_cfg();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(day_start_weather(7, &cfg, &mut rng).category(), WeatherCategory::Hot);
            assert_eq!(day_start_weather(6, &cfg, &mut rng).category(), WeatherCategory::Normal);
        }
    }

    #[test]
    fn test_cold_mornings_never_rain() {
        let cfg = day_cfg();
        let mut rng = StdRng::seed_from_u64(7);
        let mut saw_snow = false;
        for temperature in 0..=cfg.snow_temperature {
            for _ in 0..200 {
                let kind = day_start_weather(temperature, &cfg, &mut rng).kind();
                assert!(!kind.is_rain_family(), "rain at {temperature}");
                saw_snow |= kind == WeatherType::Snowy;
            }
        }
        assert!(saw_snow);
    }

    #[test]
    fn test_cold_nights_never_rain() {
        let cfg = day_cfg();
        let mut rng = StdRng::seed_from_u64(11);
        let sources = [
            WeatherType::Cloudy,
            WeatherType::Rain,
            WeatherType::HeavyRain,
            WeatherType::Snowy,
            WeatherType::Sunny,
        ];
        for source in sources {
            let weather = Weather::new(WeatherCategory::Normal, source).unwrap();
            for _ in 0..200 {
                let night = night_weather(weather, 1, &cfg, &mut rng);
                assert_eq!(night.category(), WeatherCategory::Night);
                assert!(!night.kind().is_rain_family());
            }
        }
    }

    #[test]
    fn test_heavy_rain_turns_to_snow_when_cold() {
        let cfg = day_cfg();
        let mut rng = StdRng::seed_from_u64(3);
        let heavy = Weather::new(WeatherCategory::Normal, WeatherType::HeavyRain).unwrap();
        assert_eq!(night_weather(heavy, 0, &cfg, &mut rng).kind(), WeatherType::Snowy);
        for _ in 0..100 {
            let kind = night_weather(heavy, 2, &cfg, &mut rng).kind();
            assert!(matches!(kind, WeatherType::Rain | WeatherType::Thunder));
        }
    }

    #[test]
    fn test_night_results_are_valid_pairs() {
        let cfg = day_cfg();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let temperature = rng.gen_range(0..=8);
            let morning = day_start_weather(temperature, &cfg, &mut rng);
            let night = night_weather(morning, (temperature - 2).max(0), &cfg, &mut rng);
            assert!(Weather::new(night.category(), night.kind()).is_some());
        }
    }

    #[test]
    fn test_particle_kind_falls_back_to_grass() {
        assert_eq!(WeatherType::Clear.particle_kind(), ParticleKind::Grass);
        assert_eq!(WeatherType::Thunder.particle_kind(), ParticleKind::Thunder);
    }
}
