//! Turns map data into a world layout in map space.
//!
//! This is a pure function of the map, the sprite catalog and the config.
//! Nothing is spawned here; the world plugin spawns from the result.

use std::collections::HashSet;

use bevy::prelude::*;

use super::map::MapData;
use super::sprites::{SeqId, SpriteCatalog};
use crate::config::GameConfig;
use crate::error::StartupError;
use crate::shared::*;

const COLLISION_LAYERS: [&str; 4] = ["Collisions 1", "Collisions 2", "Collisions 3", "Collisions 4"];
const SOLID_TILE_LAYERS: [&str; 5] = [
    "Bushes",
    "Water Trays",
    "Fence",
    "House Walls",
    "House Furniture Top",
];
const LANDABLE_LAYERS: [&str; 2] = ["Grass", "Bridge"];

// ═══════════════════════════════════════════════════════════════════════
// LAYOUT TYPES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct SceneryPiece {
    pub seq: SeqId,
    pub rect: Rect,
    pub layer: DrawLayer,
    /// Looping animation speed, for animated scenery.
    pub animation_speed: Option<f32>,
    pub hitbox: Option<Rect>,
}

#[derive(Debug, Clone)]
pub struct BoatSpec {
    pub seq: SeqId,
    pub rect: Rect,
    /// Left or right; selects the boat cutscene.
    pub orientation: Facing,
}

#[derive(Debug, Clone)]
pub struct BedSpec {
    pub seq: SeqId,
    pub rect: Rect,
    pub hitbox: Rect,
}

#[derive(Debug, Clone)]
pub struct AnimalSpec {
    pub species: Species,
    pub color: String,
    pub nickname: String,
    pub center: Vec2,
}

#[derive(Debug, Clone)]
pub struct PenSpec {
    pub id: u32,
    /// Shrunken tile rects the pen's animals may walk to.
    pub walk_area: Vec<Rect>,
    pub animals: Vec<AnimalSpec>,
}

/// Tiles weather decals may not land on: water, paths, house floor.
#[derive(Resource, Debug, Clone, Default)]
pub struct DisallowedFloor {
    tile_size: f32,
    tiles: HashSet<IVec2>,
}

impl DisallowedFloor {
    pub fn new(tile_size: f32, tiles: HashSet<IVec2>) -> Self {
        Self { tile_size, tiles }
    }

    /// `true` if `rect` overlaps no disallowed tile.
    pub fn permits(&self, rect: Rect) -> bool {
        if rect.width() <= 0.0 || rect.height() <= 0.0 || self.tile_size <= 0.0 {
            return true;
        }
        let t = self.tile_size;
        let (x0, x1) = ((rect.min.x / t).floor() as i32, (rect.max.x / t).ceil() as i32);
        let (y0, y1) = ((rect.min.y / t).floor() as i32, (rect.max.y / t).ceil() as i32);
        !(y0..y1).any(|y| (x0..x1).any(|x| self.tiles.contains(&IVec2::new(x, y))))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// House floor tile rects, for the inside-house predicate.
#[derive(Resource, Debug, Clone, Default)]
pub struct HouseFloor(pub Vec<Rect>);

#[derive(Resource, Debug, Clone)]
pub struct WorldLayout {
    pub map_size: Vec2,
    pub scenery: Vec<SceneryPiece>,
    /// Invisible collision blocks.
    pub colliders: Vec<Rect>,
    pub house_floor: Vec<Rect>,
    pub disallowed_floor: DisallowedFloor,
    /// Top-left corners of the trees.
    pub trees: Vec<Vec2>,
    pub boats: Vec<BoatSpec>,
    pub bed: Option<BedSpec>,
    pub pens: Vec<PenSpec>,
    pub player_start: Vec2,
}

impl WorldLayout {
    /// A bare grass field with no features, for tests.
    pub fn empty(cfg: &GameConfig) -> Self {
        Self {
            map_size: cfg.map_size(),
            scenery: Vec::new(),
            colliders: Vec::new(),
            house_floor: Vec::new(),
            disallowed_floor: DisallowedFloor::new(cfg.tile_size(), HashSet::new()),
            trees: Vec::new(),
            boats: Vec::new(),
            bed: None,
            pens: Vec::new(),
            player_start: cfg.map_size() / 2.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HITBOX SHAPES
// ═══════════════════════════════════════════════════════════════════════

/// Generic solid: 25% narrower, 40% shorter.
pub fn generic_hitbox(rect: Rect) -> Rect {
    rect.inflated(-rect.width() * 0.25, -rect.height() * 0.4)
}

/// Generic solid hitbox, centred on the image's opaque area when it has one.
pub fn solid_hitbox(rect: Rect, bounds: Option<Rect>) -> Rect {
    let hitbox = generic_hitbox(rect);
    match bounds {
        Some(bounds) => hitbox.with_center(bounds.translated(rect.min).center()),
        None => hitbox,
    }
}

pub fn bed_hitbox(rect: Rect) -> Rect {
    rect.inflated(-rect.width() * 0.1, -rect.height() * 0.4)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shift {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Shift {
    fn set(&mut self, direction: &str) -> Result<(), StartupError> {
        match direction {
            "left" => self.left = true,
            "right" => self.right = true,
            "up" => self.up = true,
            "down" => self.down = true,
            other => {
                return Err(StartupError::InvalidMap(format!("unknown collision shift '{other}'")))
            }
        }
        Ok(())
    }
}

/// Collision block hitbox, nudged to match the tile art's fake perspective.
pub fn collision_block_hitbox(tile: Rect, shift: Shift) -> Rect {
    let (w, h) = (tile.width(), tile.height());
    let mut hitbox = tile.inflated(-w * 0.4, -h * 0.4);
    if shift.right {
        hitbox = hitbox.translated(Vec2::new(w * 0.2, 0.0));
    } else if shift.left {
        hitbox = hitbox.translated(Vec2::new(-w * 0.2, 0.0));
    }
    if shift.up {
        hitbox = hitbox.translated(Vec2::new(0.0, -h * 0.3));
    } else if shift.down {
        hitbox = hitbox.translated(Vec2::new(0.0, h * 0.1));
    }
    hitbox
}

// ═══════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════

fn parse_pen_layer(name: &str, suffix: &str) -> Option<u32> {
    name.strip_prefix("Pen ")?.strip_suffix(suffix)?.parse().ok()
}

pub fn build_world(
    map: &MapData,
    catalog: &SpriteCatalog,
    cfg: &GameConfig,
) -> Result<WorldLayout, StartupError> {
    let tile = cfg.tile_size();
    let zoom = cfg.display.zoom;
    let tile_rect = |x: u32, y: u32| {
        Rect::from_top_left(Vec2::new(x as f32, y as f32) * tile, Vec2::splat(tile))
    };
    let image_rect = |key: &str, top_left: Vec2| -> Result<(SeqId, Rect), StartupError> {
        let seq = catalog.id(key)?;
        Ok((seq, Rect::from_top_left(top_left, catalog.size_of(seq))))
    };

    let mut layout = WorldLayout::empty(cfg);
    layout.map_size = Vec2::new(map.width as f32, map.height as f32) * tile;

    // Ground
    let background = catalog.id(&map.background)?;
    layout.scenery.push(SceneryPiece {
        seq: background,
        rect: Rect::from_top_left(Vec2::ZERO, layout.map_size),
        layer: DrawLayer::Ground,
        animation_speed: None,
        hitbox: None,
    });

    let water = catalog.id("water")?;
    for (x, y, _) in map.layer("Water")?.tiles() {
        layout.scenery.push(SceneryPiece {
            seq: water,
            rect: tile_rect(x, y),
            layer: DrawLayer::Water,
            animation_speed: Some(5.0),
            hitbox: None,
        });
    }

    for name in SOLID_TILE_LAYERS {
        for (x, y, image) in map.layer(name)?.tiles() {
            let key = image.ok_or_else(|| {
                StartupError::InvalidMap(format!("tile ({x}, {y}) in '{name}' has no image"))
            })?;
            let (seq, rect) = image_rect(key, tile_rect(x, y).min)?;
            layout.scenery.push(SceneryPiece {
                seq,
                rect,
                layer: DrawLayer::Main,
                animation_speed: None,
                hitbox: Some(solid_hitbox(rect, catalog.bounds_of(seq))),
            });
        }
    }

    for (x, y, image) in map.layer("House Roof")?.tiles() {
        let Some(key) = image else { continue };
        let (seq, rect) = image_rect(key, tile_rect(x, y).min)?;
        layout.scenery.push(SceneryPiece {
            seq,
            rect,
            layer: DrawLayer::HouseRoof,
            animation_speed: None,
            hitbox: None,
        });
    }

    for obj in map.layer("Decoration Top")?.objects() {
        let Some(key) = obj.image.as_deref() else { continue };
        let (seq, rect) = image_rect(key, Vec2::new(obj.x, obj.y) * zoom)?;
        layout.scenery.push(SceneryPiece {
            seq,
            rect,
            layer: DrawLayer::Main,
            animation_speed: None,
            hitbox: Some(generic_hitbox(rect)),
        });
    }

    for obj in map.layer("House Furniture Interaction")?.objects() {
        if obj.name != "Bed" {
            continue;
        }
        let key = obj.image.as_deref().unwrap_or("objects/bed");
        let (seq, rect) = image_rect(key, Vec2::new(obj.x, obj.y) * zoom)?;
        layout.bed = Some(BedSpec { seq, rect, hitbox: bed_hitbox(rect) });
    }

    for obj in map.layer("Boats")?.objects() {
        let orientation = match obj.properties.get("orientation").map(String::as_str) {
            Some("left") => Facing::Left,
            Some("right") => Facing::Right,
            other => {
                return Err(StartupError::InvalidMap(format!(
                    "boat '{}' has orientation {other:?}",
                    obj.name
                )))
            }
        };
        let key = format!("objects/boat/{}", orientation.asset_key());
        let (seq, rect) = image_rect(&key, Vec2::new(obj.x, obj.y) * zoom)?;
        layout.boats.push(BoatSpec { seq, rect, orientation });
    }

    layout.trees = map
        .layer("Normal Trees")?
        .objects()
        .iter()
        .map(|obj| Vec2::new(obj.x, obj.y) * zoom)
        .collect();

    // Collision blocks. Shifts from several layers stack on one tile.
    let mut shifts: std::collections::BTreeMap<(u32, u32), Shift> = Default::default();
    for name in COLLISION_LAYERS {
        let layer = map.layer(name)?;
        let direction = layer.properties.get("shift").ok_or_else(|| {
            StartupError::InvalidMap(format!("layer '{name}' has no shift property"))
        })?;
        for (x, y, _) in layer.tiles() {
            shifts.entry((y, x)).or_default().set(direction)?;
        }
    }
    layout.colliders = shifts
        .into_iter()
        .map(|((y, x), shift)| collision_block_hitbox(tile_rect(x, y), shift))
        .collect();

    let house_tiles: HashSet<(u32, u32)> =
        map.layer("House Tiles")?.tiles().map(|(x, y, _)| (x, y)).collect();
    layout.house_floor = house_tiles.iter().map(|&(x, y)| tile_rect(x, y)).collect();
    layout.house_floor.sort_by(|a, b| {
        (a.min.y, a.min.x).partial_cmp(&(b.min.y, b.min.x)).unwrap_or(std::cmp::Ordering::Equal)
    });

    // Pens: each "Pen N Walk Area" pairs with "Pen N NPCs".
    let mut pen_ids: Vec<u32> =
        map.layer_names().filter_map(|n| parse_pen_layer(n, " Walk Area")).collect();
    pen_ids.sort_unstable();
    for id in pen_ids {
        let walk_area: Vec<Rect> = map
            .layer(&format!("Pen {id} Walk Area"))?
            .tiles()
            .map(|(x, y, _)| tile_rect(x, y).inflated(-tile * 0.5, -tile * 0.5))
            .collect();
        let mut animals = Vec::new();
        for obj in map.layer(&format!("Pen {id} NPCs"))?.objects() {
            let species = Species::from_map_name(&obj.name).ok_or_else(|| {
                StartupError::InvalidMap(format!("pen {id} has unknown animal '{}'", obj.name))
            })?;
            let prop = |key: &str| {
                obj.properties.get(key).cloned().ok_or_else(|| {
                    StartupError::InvalidMap(format!("{} in pen {id} has no {key}", obj.name))
                })
            };
            animals.push(AnimalSpec {
                species,
                color: prop("color")?,
                nickname: prop("nickname")?,
                center: Vec2::new(obj.x, obj.y) * zoom,
            });
        }
        if walk_area.is_empty() && !animals.is_empty() {
            return Err(StartupError::InvalidMap(format!("pen {id} has animals but no walk area")));
        }
        layout.pens.push(PenSpec { id, walk_area, animals });
    }

    layout.player_start = map
        .layer("Player")?
        .objects()
        .iter()
        .find(|o| o.name == "Start")
        .map(|o| Vec2::new(o.x, o.y) * zoom)
        .ok_or_else(|| StartupError::InvalidMap("no player start".into()))?;

    // Everything that is neither grass nor bridge, plus the house floor.
    let mut landable: HashSet<(u32, u32)> = HashSet::new();
    for name in LANDABLE_LAYERS {
        landable.extend(map.layer(name)?.tiles().map(|(x, y, _)| (x, y)));
    }
    let disallowed: HashSet<IVec2> = (0..map.height)
        .flat_map(|y| (0..map.width).map(move |x| (x, y)))
        .filter(|xy| !landable.contains(xy) || house_tiles.contains(xy))
        .map(|(x, y)| IVec2::new(x as i32, y as i32))
        .collect();
    layout.disallowed_floor = DisallowedFloor::new(tile, disallowed);

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::map::{LayerContent, MapLayer, MapObject, TilePlacement};
    use crate::world::sprites::SpriteManifest;
    use std::collections::HashMap;
    use std::path::Path;

    fn tiles(name: &str, placements: Vec<TilePlacement>) -> MapLayer {
        MapLayer {
            name: name.into(),
            properties: HashMap::new(),
            content: LayerContent::Tiles(placements),
        }
    }

    fn objects(name: &str, objects: Vec<MapObject>) -> MapLayer {
        MapLayer {
            name: name.into(),
            properties: HashMap::new(),
            content: LayerContent::Objects(objects),
        }
    }

    fn at(x: u32, y: u32, w: u32, h: u32) -> TilePlacement {
        TilePlacement { x, y, w, h, image: None }
    }

    fn object(name: &str, x: f32, y: f32, props: &[(&str, &str)]) -> MapObject {
        MapObject {
            name: name.into(),
            x,
            y,
            image: None,
            properties: props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    fn small_map() -> MapData {
        let mut layers = vec![
            tiles("Water", vec![at(0, 0, 10, 1)]),
            tiles("Grass", vec![at(0, 1, 10, 9)]),
            tiles("Bridge", vec![]),
            tiles("House Tiles", vec![at(6, 6, 2, 2)]),
            tiles("House Roof", vec![]),
            objects("Decoration Top", vec![]),
            objects("House Furniture Interaction", vec![]),
            objects("Boats", vec![]),
            objects("Normal Trees", vec![object("Tree", 16.0, 32.0, &[])]),
            tiles("Pen 1 Walk Area", vec![at(2, 2, 2, 2)]),
            objects(
                "Pen 1 NPCs",
                vec![object("Cow", 40.0, 40.0, &[("color", "brown"), ("nickname", "Daisy")])],
            ),
            objects("Player", vec![object("Start", 80.0, 80.0, &[])]),
        ];
        for name in SOLID_TILE_LAYERS {
            layers.push(tiles(name, vec![]));
        }
        for (i, name) in COLLISION_LAYERS.iter().enumerate() {
            let mut layer = tiles(name, if i < 2 { vec![at(9, 9, 1, 1)] } else { vec![] });
            let shift = ["right", "up", "left", "down"][i];
            layer.properties.insert("shift".into(), shift.into());
            layers.push(layer);
        }
        MapData { width: 10, height: 10, background: "map".into(), layers }
    }

    fn small_catalog() -> SpriteCatalog {
        let mut catalog = SpriteCatalog::default();
        catalog.insert("map", 1, Vec2::splat(640.0));
        catalog.insert("water", 4, Vec2::splat(64.0));
        catalog
    }

    #[test]
    fn test_small_map_layout() {
        let cfg = GameConfig::default();
        let layout = build_world(&small_map(), &small_catalog(), &cfg).unwrap();
        assert_eq!(layout.map_size, Vec2::splat(640.0));
        assert_eq!(layout.trees, vec![Vec2::new(64.0, 128.0)]);
        assert_eq!(layout.player_start, Vec2::splat(320.0));
        assert_eq!(layout.house_floor.len(), 4);
        assert_eq!(layout.pens.len(), 1);
        assert_eq!(layout.pens[0].animals[0].nickname, "Daisy");
        assert_eq!(layout.pens[0].animals[0].species, Species::Cow);
    }

    #[test]
    fn test_walk_area_tiles_shrink_by_half() {
        let layout = build_world(&small_map(), &small_catalog(), &GameConfig::default()).unwrap();
        let first = layout.pens[0].walk_area[0];
        assert_eq!(first.size(), Vec2::splat(32.0));
        assert_eq!(first.min, Vec2::new(144.0, 144.0));
    }

    #[test]
    fn test_collision_shifts_stack() {
        let layout = build_world(&small_map(), &small_catalog(), &GameConfig::default()).unwrap();
        assert_eq!(layout.colliders.len(), 1);
        let tile = Rect::from_top_left(Vec2::splat(576.0), Vec2::splat(64.0));
        let expected = collision_block_hitbox(tile, Shift { right: true, up: true, ..default() });
        assert_eq!(layout.colliders[0], expected);
        assert!((expected.min.x - 601.6).abs() < 1e-3);
        assert!((expected.min.y - 569.6).abs() < 1e-3);
        assert!((expected.width() - 38.4).abs() < 1e-3);
    }

    #[test]
    fn test_disallowed_floor_covers_water_and_house() {
        let layout = build_world(&small_map(), &small_catalog(), &GameConfig::default()).unwrap();
        let floor = &layout.disallowed_floor;
        // Row 0 is water; the 2x2 house floor sits on grass.
        assert_eq!(floor.len(), 10 + 4);
        let on_water = Rect::from_top_left(Vec2::new(100.0, 10.0), Vec2::splat(20.0));
        let on_grass = Rect::from_top_left(Vec2::new(100.0, 100.0), Vec2::splat(20.0));
        let in_house = Rect::from_top_left(Vec2::new(400.0, 400.0), Vec2::splat(20.0));
        assert!(!floor.permits(on_water));
        assert!(floor.permits(on_grass));
        assert!(!floor.permits(in_house));
    }

    #[test]
    fn test_decal_touching_a_bad_tile_edge_is_allowed() {
        let layout = build_world(&small_map(), &small_catalog(), &GameConfig::default()).unwrap();
        // Top edge exactly on the water's bottom edge.
        let touching = Rect::from_top_left(Vec2::new(100.0, 64.0), Vec2::splat(20.0));
        assert!(layout.disallowed_floor.permits(touching));
    }

    #[test]
    fn test_solid_hitbox_follows_opaque_bounds() {
        let tile = Rect::from_top_left(Vec2::new(128.0, 64.0), Vec2::splat(64.0));
        assert_eq!(solid_hitbox(tile, None), generic_hitbox(tile));

        // Wall art fills the bottom 48 pixels of its tile.
        let bounds = Rect::from_top_left(Vec2::new(0.0, 16.0), Vec2::new(64.0, 48.0));
        let hitbox = solid_hitbox(tile, Some(bounds));
        assert_eq!(hitbox.size(), generic_hitbox(tile).size());
        assert_eq!(hitbox.center(), Vec2::new(160.0, 104.0));
    }

    #[test]
    fn test_wall_tiles_use_catalog_bounds() {
        let mut map = small_map();
        let walls = map.layers.iter_mut().find(|l| l.name == "House Walls").unwrap();
        let mut wall = at(3, 3, 1, 1);
        wall.image = Some("tiles/house_wall".into());
        *walls = tiles("House Walls", vec![wall]);
        let mut catalog = small_catalog();
        let id = catalog.insert("tiles/house_wall", 1, Vec2::splat(64.0));
        catalog.set_bounds(id, Rect::from_top_left(Vec2::new(0.0, 16.0), Vec2::new(64.0, 48.0)));

        let layout = build_world(&map, &catalog, &GameConfig::default()).unwrap();
        let piece = layout.scenery.iter().find(|p| p.seq == id).unwrap();
        assert_eq!(piece.hitbox.unwrap().center(), Vec2::new(224.0, 232.0));
    }

    #[test]
    fn test_missing_layer_fails() {
        let mut map = small_map();
        map.layers.retain(|l| l.name != "Grass");
        let err = build_world(&map, &small_catalog(), &GameConfig::default()).unwrap_err();
        assert!(matches!(err, StartupError::MissingLayer(name) if name == "Grass"));
    }

    #[test]
    fn test_shipped_map_builds() {
        let cfg = GameConfig::default();
        let map = MapData::load(Path::new("assets/data/map.ron")).unwrap();
        let manifest = SpriteManifest::load(Path::new("assets/data/sprites.ron")).unwrap();
        let layout = build_world(&map, &SpriteCatalog::from_manifest(&manifest), &cfg).unwrap();
        assert_eq!(layout.boats.len(), 2);
        assert!(layout.bed.is_some());
        assert!(!layout.pens.is_empty());
        assert!(!layout.trees.is_empty());
    }
}
