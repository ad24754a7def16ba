//! Game configuration: every tunable constant, built once at startup.
//!
//! `GameConfig::default()` holds the reference values. An optional
//! `assets/config.ron` replaces them wholesale; it is validated before the
//! `App` is built and inserted as an immutable resource.

use std::f32::consts::PI;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::{DrawLayer, Facing, ToolKind};
use crate::error::{read_ron, StartupError};

// ═══════════════════════════════════════════════════════════════════════
// SECTIONS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub window_width: f32,
    pub window_height: f32,
    pub zoom: f32,
    /// Source tile edge in pixels, before zoom.
    pub base_tile: f32,
    pub tiles_wide: u32,
    pub tiles_high: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayConfig {
    pub length: f32,
    /// Day-clock units gained per real second.
    pub speed: f32,
    pub intervals: usize,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub snow_temperature: i32,
    pub hot_temperature: i32,
    pub night_temperature_drop: i32,
    pub max_luminance: f32,
    pub min_luminance: f32,
}

/// Which falling-particle profile the current weather uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Rain,
    Snowy,
    Thunder,
    HeavyRain,
    /// Blowing grass, for every weather without its own profile.
    Grass,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 5] = [
        ParticleKind::Rain,
        ParticleKind::Snowy,
        ParticleKind::Thunder,
        ParticleKind::HeavyRain,
        ParticleKind::Grass,
    ];

    pub fn asset_key(self) -> &'static str {
        match self {
            ParticleKind::Rain => "rain",
            ParticleKind::Snowy => "snowy",
            ParticleKind::Thunder => "thunder",
            ParticleKind::HeavyRain => "heavy_rain",
            ParticleKind::Grass => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleProfile {
    /// Lifetime range in seconds.
    pub lifetime: (f32, f32),
    pub amount: usize,
    pub speed: (f32, f32),
    pub animation_speed: f32,
    pub direction: (f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherParticleConfig {
    pub refresh_period: f32,
    /// Shortfalls above this are only partly filled per refresh.
    pub damping_threshold: usize,
    pub damping_divisor: usize,
    pub floor_lifetime: f32,
    pub puddle_animation_speed: f32,
    pub rain: ParticleProfile,
    pub snowy: ParticleProfile,
    pub thunder: ParticleProfile,
    pub heavy_rain: ParticleProfile,
    pub grass: ParticleProfile,
}

impl WeatherParticleConfig {
    pub fn profile(&self, kind: ParticleKind) -> &ParticleProfile {
        match kind {
            ParticleKind::Rain => &self.rain,
            ParticleKind::Snowy => &self.snowy,
            ParticleKind::Thunder => &self.thunder,
            ParticleKind::HeavyRain => &self.heavy_rain,
            ParticleKind::Grass => &self.grass,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThunderConfig {
    pub flash_duration: f32,
    pub min_period: f32,
    pub max_period: f32,
    /// Chance out of 10 that an active flash window whitens a given frame.
    pub intensity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub tree_health: u32,
    pub stump_health: u32,
    pub tree_chop_xp: u32,
    pub stump_chop_xp: u32,
    pub falling_animation_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolProfile {
    /// Animation frame on which the tool acts.
    pub trigger_frame: usize,
    pub up: (f32, f32),
    pub down: (f32, f32),
    pub left: (f32, f32),
    pub right: (f32, f32),
}

impl ToolProfile {
    pub fn offset(&self, facing: Facing) -> Vec2 {
        let (x, y) = match facing {
            Facing::Up => self.up,
            Facing::Down => self.down,
            Facing::Left => self.left,
            Facing::Right => self.right,
        };
        Vec2::new(x, y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub axe: ToolProfile,
    pub watering_can: ToolProfile,
    pub hoe: ToolProfile,
    pub splash_animation_speed: f32,
}

impl ToolConfig {
    pub fn profile(&self, tool: ToolKind) -> &ToolProfile {
        match tool {
            ToolKind::Axe => &self.axe,
            ToolKind::WateringCan => &self.watering_can,
            ToolKind::Hoe => &self.hoe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalConfig {
    pub chicken_speed: f32,
    pub cow_speed: f32,
    /// Each animal rolls its own animation speed from this range.
    pub animation_speed: (f32, f32),
    /// In tiles.
    pub min_walk_distance: f32,
    pub destination_attempts: u32,
    pub love_cooldown: f32,
    /// In tiles.
    pub love_range: f32,
    pub max_hearts_shown: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub speed: f32,
    pub animation_speed: f32,
    /// In tiles.
    pub bed_range: f32,
    /// In tiles.
    pub boat_range: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub fade_speed: f32,
    /// Fraction of a cutscene after which the fade back in may start.
    pub cutscene_end_tolerance: f32,
    pub boat_cutscene_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZLayers {
    pub water: f32,
    pub ground: f32,
    pub floor_particles: f32,
    pub main: f32,
    pub house_roof: f32,
    pub falling_particles: f32,
}

impl ZLayers {
    pub fn of(&self, layer: DrawLayer) -> f32 {
        match layer {
            DrawLayer::Water => self.water,
            DrawLayer::Ground => self.ground,
            DrawLayer::FloorParticles => self.floor_particles,
            DrawLayer::Main => self.main,
            DrawLayer::HouseRoof => self.house_roof,
            DrawLayer::FallingParticles => self.falling_particles,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ROOT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub day: DayConfig,
    pub particles: WeatherParticleConfig,
    pub thunder: ThunderConfig,
    pub trees: TreeConfig,
    pub tools: ToolConfig,
    pub animals: AnimalConfig,
    pub player: PlayerConfig,
    pub transitions: TransitionConfig,
    pub z_layers: ZLayers,
}

impl Default for GameConfig {
    fn default() -> Self {
        let falling = |lifetime, amount, speed| ParticleProfile {
            lifetime,
            amount,
            speed,
            animation_speed: 4.0,
            direction: (-1.0, 1.0),
        };

        Self {
            display: DisplayConfig {
                window_width: 1280.0,
                window_height: 720.0,
                zoom: 4.0,
                base_tile: 16.0,
                tiles_wide: 50,
                tiles_high: 50,
            },
            day: DayConfig {
                length: 100.0,
                speed: 5.0,
                intervals: 5,
                min_temperature: 0,
                max_temperature: 8,
                snow_temperature: 1,
                hot_temperature: 7,
                night_temperature_drop: 2,
                max_luminance: 255.0,
                min_luminance: 175.0,
            },
            particles: WeatherParticleConfig {
                refresh_period: 0.15,
                damping_threshold: 100,
                damping_divisor: 4,
                floor_lifetime: 10.0,
                puddle_animation_speed: 2.5,
                rain: falling((4.0, 8.0), 400, (110.0, 140.0)),
                snowy: falling((3.0, 7.0), 400, (90.0, 120.0)),
                thunder: falling((4.0, 8.0), 1000, (110.0, 140.0)),
                heavy_rain: falling((4.0, 8.0), 1600, (140.0, 180.0)),
                grass: ParticleProfile {
                    lifetime: (4.0, 6.0),
                    amount: 100,
                    speed: (60.0, 80.0),
                    animation_speed: 3.0,
                    direction: (1.0, 0.2),
                },
            },
            thunder: ThunderConfig {
                flash_duration: 0.2,
                min_period: 0.5,
                max_period: 2.0,
                intensity: 3,
            },
            trees: TreeConfig {
                tree_health: 5,
                stump_health: 2,
                tree_chop_xp: 50,
                stump_chop_xp: 25,
                falling_animation_speed: 9.0,
            },
            tools: ToolConfig {
                axe: ToolProfile {
                    trigger_frame: 5,
                    up: (10.0, -40.0),
                    down: (-10.0, 60.0),
                    left: (-45.0, 40.0),
                    right: (45.0, 40.0),
                },
                watering_can: ToolProfile {
                    trigger_frame: 3,
                    up: (10.0, -40.0),
                    down: (-10.0, 60.0),
                    left: (-80.0, 40.0),
                    right: (80.0, 40.0),
                },
                hoe: ToolProfile {
                    trigger_frame: 5,
                    up: (10.0, -40.0),
                    down: (-10.0, 50.0),
                    left: (-50.0, 40.0),
                    right: (50.0, 40.0),
                },
                splash_animation_speed: 7.0,
            },
            animals: AnimalConfig {
                chicken_speed: 100.0,
                cow_speed: 75.0,
                animation_speed: (40.0 / 15.0, 50.0 / 15.0),
                min_walk_distance: 3.0,
                destination_attempts: 200,
                love_cooldown: 5.0,
                love_range: 1.0,
                max_hearts_shown: 5,
            },
            player: PlayerConfig {
                speed: 250.0,
                animation_speed: 7.0,
                bed_range: 1.0,
                boat_range: 2.0,
            },
            transitions: TransitionConfig {
                fade_speed: 300.0,
                cutscene_end_tolerance: 0.9,
                boat_cutscene_speed: 25.0,
            },
            z_layers: ZLayers {
                water: 0.0,
                ground: 1.0,
                floor_particles: 2.0,
                main: 3.0,
                house_roof: 4.0,
                falling_particles: 5.0,
            },
        }
    }
}

impl GameConfig {
    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, StartupError> {
        let config = if path.exists() {
            read_ron(path)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StartupError> {
        let day = &self.day;
        if day.hot_temperature < day.snow_temperature + 3 {
            return Err(StartupError::InvalidConfig(format!(
                "hot temperature {} must be at least snow temperature {} + 3",
                day.hot_temperature, day.snow_temperature
            )));
        }
        if self.thunder.flash_duration * 2.0 >= self.thunder.min_period {
            return Err(StartupError::InvalidConfig(format!(
                "thunder flash {}s must be under half the minimum period {}s",
                self.thunder.flash_duration, self.thunder.min_period
            )));
        }
        if day.intervals < 2 || day.length <= 0.0 {
            return Err(StartupError::InvalidConfig(
                "day needs a positive length and at least two intervals".into(),
            ));
        }
        if day.min_temperature > day.max_temperature {
            return Err(StartupError::InvalidConfig("empty temperature range".into()));
        }
        if self.thunder.min_period > self.thunder.max_period {
            return Err(StartupError::InvalidConfig("empty thunder period range".into()));
        }
        if self.particles.damping_divisor == 0 {
            return Err(StartupError::InvalidConfig("particle damping divisor is zero".into()));
        }
        Ok(())
    }

    pub fn tile_size(&self) -> f32 {
        self.display.base_tile * self.display.zoom
    }

    pub fn map_size(&self) -> Vec2 {
        Vec2::new(
            self.display.tiles_wide as f32,
            self.display.tiles_high as f32,
        ) * self.tile_size()
    }

    /// Ascending fractional thresholds `[1/n, 2/n, ..., 1]` of the day.
    pub fn day_divisions(&self) -> Vec<f32> {
        let n = self.day.intervals;
        (1..=n).map(|i| i as f32 / n as f32).collect()
    }

    pub fn luminance_coefficient(&self) -> f32 {
        3.0 * PI / (2.0 * self.day.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.tile_size(), 64.0);
        assert_eq!(cfg.map_size(), Vec2::splat(3200.0));
    }

    #[test]
    fn test_day_divisions_end_at_one() {
        let cfg = GameConfig::default();
        let divisions = cfg.day_divisions();
        assert_eq!(divisions.len(), 5);
        assert!((divisions[0] - 0.2).abs() < 1e-6);
        assert_eq!(*divisions.last().unwrap(), 1.0);
    }

    #[test]
    fn test_rejects_close_hot_and_snow_temperatures() {
        let mut cfg = GameConfig::default();
        cfg.day.hot_temperature = cfg.day.snow_temperature + 2;
        assert!(matches!(cfg.validate(), Err(StartupError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_long_thunder_flash() {
        let mut cfg = GameConfig::default();
        cfg.thunder.flash_duration = 0.3;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_ron() {
        let cfg = GameConfig::default();
        let text = ron::to_string(&cfg).unwrap();
        let back: GameConfig = ron::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_tool_offsets_by_facing() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.tools.profile(ToolKind::WateringCan).offset(Facing::Left), Vec2::new(-80.0, 40.0));
        assert_eq!(cfg.tools.profile(ToolKind::Hoe).offset(Facing::Down), Vec2::new(-10.0, 50.0));
    }
}
