//! Sprite manifest and frame tables.
//!
//! The manifest lists every frame sequence the game draws: its key, frame
//! count and size in map pixels. Simulation code only needs this metadata
//! (`SpriteCatalog`); image handles live in `SpriteLibrary`, which exists only
//! when the game is rendered.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{read_ron, StartupError};
use crate::shared::Facing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSpec {
    pub frames: usize,
    pub size: (f32, f32),
    /// Opaque part of the image as `(top_left, size)`, relative to its corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<((f32, f32), (f32, f32))>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteManifest {
    pub sequences: BTreeMap<String, SequenceSpec>,
}

impl SpriteManifest {
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let manifest: Self = read_ron(path)?;
        if let Some((key, _)) = manifest.sequences.iter().find(|(_, s)| s.frames == 0) {
            return Err(StartupError::MissingSprite(format!("{key} (zero frames)")));
        }
        Ok(manifest)
    }
}

/// Index of a sequence in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeqId(pub usize);

#[derive(Debug, Clone)]
pub struct SequenceInfo {
    pub key: String,
    pub frames: usize,
    pub size: Vec2,
    /// Opaque area relative to the image's top-left corner.
    pub bounds: Option<Rect>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct SpriteCatalog {
    sequences: Vec<SequenceInfo>,
    index: HashMap<String, SeqId>,
}

impl SpriteCatalog {
    pub fn from_manifest(manifest: &SpriteManifest) -> Self {
        let mut catalog = Self::default();
        for (key, spec) in &manifest.sequences {
            let id = catalog.insert(key, spec.frames, Vec2::new(spec.size.0, spec.size.1));
            if let Some(((x, y), (w, h))) = spec.bounds {
                catalog.set_bounds(id, Rect::from_corners(Vec2::new(x, y), Vec2::new(x + w, y + h)));
            }
        }
        catalog
    }

    /// Adds (or replaces) a sequence. Used by tests to build small catalogs.
    pub fn insert(&mut self, key: &str, frames: usize, size: Vec2) -> SeqId {
        let info = SequenceInfo { key: key.to_string(), frames: frames.max(1), size, bounds: None };
        if let Some(&id) = self.index.get(key) {
            self.sequences[id.0] = info;
            return id;
        }
        let id = SeqId(self.sequences.len());
        self.sequences.push(info);
        self.index.insert(key.to_string(), id);
        id
    }

    pub fn id(&self, key: &str) -> Result<SeqId, StartupError> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| StartupError::MissingSprite(key.to_string()))
    }

    pub fn lookup(&self, key: &str) -> Option<SeqId> {
        self.index.get(key).copied()
    }

    pub fn info(&self, id: SeqId) -> &SequenceInfo {
        &self.sequences[id.0]
    }

    pub fn len_of(&self, id: SeqId) -> usize {
        self.sequences[id.0].frames
    }

    pub fn size_of(&self, id: SeqId) -> Vec2 {
        self.sequences[id.0].size
    }

    pub fn set_bounds(&mut self, id: SeqId, bounds: Rect) {
        self.sequences[id.0].bounds = Some(bounds);
    }

    pub fn bounds_of(&self, id: SeqId) -> Option<Rect> {
        self.sequences[id.0].bounds
    }

    /// Keys under `prefix/`, in manifest order. Used for variant pickers.
    pub fn keys_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sequences
            .iter()
            .map(|s| s.key.as_str())
            .filter(move |k| k.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/')))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SeqId, &SequenceInfo)> {
        self.sequences.iter().enumerate().map(|(i, s)| (SeqId(i), s))
    }
}

/// Frame sequences keyed by `(facing, status)`, resolved once at spawn.
#[derive(Debug, Clone)]
pub struct FrameTable<S> {
    table: HashMap<(Facing, S), SeqId>,
}

impl<S: Copy + Eq + Hash> FrameTable<S> {
    /// Looks up `"{prefix}/{facing}_{status}"` for every combination.
    pub fn build(
        catalog: &SpriteCatalog,
        prefix: &str,
        facings: &[Facing],
        statuses: &[S],
        status_key: impl Fn(S) -> &'static str,
    ) -> Result<Self, StartupError> {
        let mut table = HashMap::new();
        for &facing in facings {
            for &status in statuses {
                let key = format!("{prefix}/{}_{}", facing.asset_key(), status_key(status));
                table.insert((facing, status), catalog.id(&key)?);
            }
        }
        Ok(Self { table })
    }

    /// Falls back to any entry for the status if the facing has none.
    pub fn get(&self, facing: Facing, status: S) -> SeqId {
        self.table
            .get(&(facing, status))
            .or_else(|| self.table.iter().find(|((_, s), _)| *s == status).map(|(_, id)| id))
            .or_else(|| self.table.values().next())
            .copied()
            .unwrap_or(SeqId(0))
    }
}

/// What an entity currently shows: a sequence and a frame within it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpriteFrames {
    pub seq: SeqId,
    pub frame: usize,
}

impl SpriteFrames {
    pub fn new(seq: SeqId) -> Self {
        Self { seq, frame: 0 }
    }
}

/// Loaded image handles, parallel to the catalog.
#[derive(Resource, Debug, Default)]
pub struct SpriteLibrary {
    pub frames: Vec<Vec<Handle<Image>>>,
}

impl SpriteLibrary {
    pub fn load(catalog: &SpriteCatalog, asset_server: &AssetServer) -> Self {
        let frames = catalog
            .iter()
            .map(|(_, info)| {
                (0..info.frames)
                    .map(|i| asset_server.load(format!("graphics/{}/{i}.png", info.key)))
                    .collect()
            })
            .collect();
        Self { frames }
    }

    pub fn handle(&self, frames: &SpriteFrames) -> Option<Handle<Image>> {
        self.frames
            .get(frames.seq.0)
            .and_then(|seq| seq.get(frames.frame).or_else(|| seq.last()))
            .cloned()
    }

    pub fn first(&self, id: SeqId) -> Option<Handle<Image>> {
        self.frames.get(id.0).and_then(|seq| seq.first()).cloned()
    }
}
