//! Map data as authored: named layers of tiles or free-placed objects.
//!
//! Positions are in source pixels and tile coordinates. Scaling to map space
//! happens in the layout builder, never here.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{read_ron, StartupError};

/// A tile, or a rectangle of identical tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub x: u32,
    pub y: u32,
    #[serde(default = "one")]
    pub w: u32,
    #[serde(default = "one")]
    pub h: u32,
    /// Sprite key drawn on every covered tile. Collision and marker layers have none.
    #[serde(default)]
    pub image: Option<String>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerContent {
    Tiles(Vec<TilePlacement>),
    Objects(Vec<MapObject>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayer {
    pub name: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    pub content: LayerContent,
}

impl MapLayer {
    /// Every covered tile as `(x, y, image)`, with rectangle fills expanded.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32, Option<&str>)> + '_ {
        let placements: &[TilePlacement] = match &self.content {
            LayerContent::Tiles(tiles) => tiles,
            LayerContent::Objects(_) => &[],
        };
        placements.iter().flat_map(|p| {
            (p.y..p.y + p.h)
                .flat_map(move |y| (p.x..p.x + p.w).map(move |x| (x, y, p.image.as_deref())))
        })
    }

    pub fn objects(&self) -> &[MapObject] {
        match &self.content {
            LayerContent::Objects(objects) => objects,
            LayerContent::Tiles(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    /// Pre-rendered ground image covering the whole map.
    pub background: String,
    pub layers: Vec<MapLayer>,
}

impl MapData {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        read_ron(path)
    }

    pub fn layer(&self, name: &str) -> Result<&MapLayer, StartupError> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| StartupError::MissingLayer(name.to_string()))
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_expands_to_every_tile() {
        let layer = MapLayer {
            name: "Water".into(),
            properties: HashMap::new(),
            content: LayerContent::Tiles(vec![TilePlacement { x: 2, y: 3, w: 3, h: 2, image: None }]),
        };
        let tiles: Vec<_> = layer.tiles().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(tiles.len(), 6);
        assert!(tiles.contains(&(4, 4)));
        assert!(layer.objects().is_empty());
    }

    #[test]
    fn test_missing_layer_is_an_error() {
        let map = MapData { width: 1, height: 1, background: "map".into(), layers: vec![] };
        assert!(matches!(map.layer("Grass"), Err(StartupError::MissingLayer(_))));
    }

    #[test]
    fn test_shipped_map_parses() {
        let map = MapData::load(Path::new("assets/data/map.ron")).expect("map.ron");
        assert_eq!((map.width, map.height), (50, 50));
        assert!(map.layer("Player").is_ok());
    }
}
