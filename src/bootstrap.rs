//! Startup: reads the data files and resolves every sprite table up front,
//! so a missing file or sequence stops the game before a window opens.

use std::path::Path;

use bevy::prelude::*;

use crate::animals::AnimalSprites;
use crate::config::GameConfig;
use crate::error::StartupError;
use crate::player::PlayerSprites;
use crate::trees::TreeSprites;
use crate::ui::arbiter::UiArbiter;
use crate::ui::standard_panels;
use crate::ui::transitions::TransitionDirector;
use crate::world::layout::build_world;
use crate::world::map::MapData;
use crate::world::sprites::{SpriteCatalog, SpriteManifest};
use crate::world::weather_fx::WeatherParticles;
use crate::world::WorldLayout;

pub const CONFIG_FILE: &str = "config.ron";
pub const MAP_FILE: &str = "data/map.ron";
pub const SPRITES_FILE: &str = "data/sprites.ron";

/// Everything the simulation plugins expect to find in the `App`.
pub struct GameResources {
    pub cfg: GameConfig,
    pub catalog: SpriteCatalog,
    pub layout: WorldLayout,
    pub particles: WeatherParticles,
    pub player_sprites: PlayerSprites,
    pub tree_sprites: TreeSprites,
    pub animal_sprites: AnimalSprites,
    pub arbiter: UiArbiter,
    pub director: TransitionDirector,
}

impl GameResources {
    /// Loads the config, sprite manifest and map from `assets`.
    pub fn load(assets: &Path) -> Result<Self, StartupError> {
        let cfg = GameConfig::load_or_default(&assets.join(CONFIG_FILE))?;
        let manifest = SpriteManifest::load(&assets.join(SPRITES_FILE))?;
        let catalog = SpriteCatalog::from_manifest(&manifest);
        let map = MapData::load(&assets.join(MAP_FILE))?;
        let layout = build_world(&map, &catalog, &cfg)?;
        Self::resolve(cfg, catalog, layout)
    }

    pub fn resolve(
        cfg: GameConfig,
        catalog: SpriteCatalog,
        layout: WorldLayout,
    ) -> Result<Self, StartupError> {
        Ok(Self {
            particles: WeatherParticles::new(&catalog, &cfg.particles)?,
            player_sprites: PlayerSprites::resolve(&catalog)?,
            tree_sprites: TreeSprites::resolve(&catalog)?,
            animal_sprites: AnimalSprites::resolve(&catalog, &layout)?,
            arbiter: UiArbiter::new(standard_panels(&catalog, &cfg)?),
            director: TransitionDirector::new(&catalog, &cfg)?,
            cfg,
            catalog,
            layout,
        })
    }

    pub fn insert_into(self, app: &mut App) {
        info!(
            "[World] {} scenery pieces, {} colliders, {} trees, {} boats, {} pens",
            self.layout.scenery.len(),
            self.layout.colliders.len(),
            self.layout.trees.len(),
            self.layout.boats.len(),
            self.layout.pens.len()
        );
        app.insert_resource(self.cfg)
            .insert_resource(self.catalog)
            .insert_resource(self.layout)
            .insert_resource(self.particles)
            .insert_resource(self.player_sprites)
            .insert_resource(self.tree_sprites)
            .insert_resource(self.animal_sprites)
            .insert_resource(self.arbiter)
            .insert_resource(self.director);
    }
}
