//! Startup failures. Nothing after startup returns an error.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StartupError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    InvalidConfig(String),
    /// A layer the world builder requires is absent from the map.
    MissingLayer(String),
    /// A frame sequence or image key is absent from the sprite manifest.
    MissingSprite(String),
    InvalidMap(String),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Io { path, .. } => write!(f, "cannot read {}", path.display()),
            StartupError::Parse { path, .. } => write!(f, "cannot parse {}", path.display()),
            StartupError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            StartupError::MissingLayer(name) => write!(f, "map has no layer named '{name}'"),
            StartupError::MissingSprite(key) => {
                write!(f, "sprite manifest has no entry for '{key}'")
            }
            StartupError::InvalidMap(msg) => write!(f, "invalid map: {msg}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Io { source, .. } => Some(source),
            StartupError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reads and deserializes a RON file.
pub fn read_ron<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, StartupError> {
    let text = std::fs::read_to_string(path).map_err(|source| StartupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&text).map_err(|source| StartupError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
