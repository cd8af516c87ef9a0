//! Scenario loading: finds data files, parses them and checks them against
//! each other before an engine is built.
//!
//! Every data file may be RON, TOML or JSON; the format follows the file
//! extension. A directory holds at most one file per base name.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use seelines_core::config::{ConfigError, SimConfig};
use seelines_core::logistics::{Logistics, LogisticsPreset, PresetError};
use seelines_core::map::{GridMap, MapError};
use seelines_core::geometry::Tile;
use seelines_core::rng::SimRng;

use crate::schema::{MapData, SpawnData};
use crate::Scenario;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The tuning config holds values the engine cannot run with.
    #[error("invalid config in {file}: {source}")]
    Config {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// The map rows do not form a valid grid.
    #[error("invalid map in {file}: {source}")]
    Map {
        file: PathBuf,
        #[source]
        source: MapError,
    },

    /// The logistics preset does not resolve against the map.
    #[error("invalid logistics preset in {file}: {source}")]
    Preset {
        file: PathBuf,
        #[source]
        source: PresetError,
    },

    /// A spawn point is off the map or on land.
    #[error("spawn {index} at ({x}, {y}) in {file} is not on open water")]
    InvalidSpawn {
        file: PathBuf,
        index: usize,
        x: f64,
        y: f64,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &'static str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let mut table: toml::Table =
                toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table.remove(toml_key).ok_or_else(|| {
                parse_error(path, format!("missing key '{toml_key}' in TOML file"))
            })?;
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Scenario loading
// ===========================================================================

/// Load a scenario directory.
///
/// `map` and `logistics` are required. `config` falls back to
/// [`SimConfig::default`] and `spawns` to an empty list. The preset is
/// resolved against the map and every spawn must sit on open water.
pub fn load_scenario(dir: &Path) -> Result<Scenario, DataLoadError> {
    let map_path = require_data_file(dir, "map")?;
    let map_data: MapData = deserialize_file(&map_path)?;
    let map = GridMap::from_rows(&map_data.rows).map_err(|source| DataLoadError::Map {
        file: map_path.clone(),
        source,
    })?;

    let config = match find_data_file(dir, "config")? {
        Some(path) => {
            let config: SimConfig = deserialize_file(&path)?;
            config
                .validate()
                .map_err(|source| DataLoadError::Config { file: path, source })?;
            config
        }
        None => {
            debug!(target: "seelines::data", dir = %dir.display(), "config.defaulted");
            SimConfig::default()
        }
    };

    let logistics_path = require_data_file(dir, "logistics")?;
    let preset: LogisticsPreset = deserialize_file(&logistics_path)?;
    Logistics::from_preset(
        &preset,
        &map,
        &config.logistics,
        &mut SimRng::new(config.seed),
    )
    .map_err(|source| DataLoadError::Preset {
        file: logistics_path,
        source,
    })?;

    let spawns: Vec<SpawnData> = match find_data_file(dir, "spawns")? {
        Some(path) => {
            let spawns = deserialize_list(&path, "spawns")?;
            check_spawns(&map, &spawns, &path)?;
            spawns
        }
        None => Vec::new(),
    };

    let name = if map_data.name.is_empty() {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        map_data.name
    };
    info!(
        target: "seelines::data",
        scenario = %name,
        width = map.width(),
        height = map.height(),
        islands = preset.islands.len(),
        convoys = preset.convoys.len(),
        spawns = spawns.len(),
        "scenario.loaded"
    );

    Ok(Scenario {
        name,
        map,
        preset,
        config,
        spawns,
    })
}

fn check_spawns(map: &GridMap, spawns: &[SpawnData], file: &Path) -> Result<(), DataLoadError> {
    for (index, spawn) in spawns.iter().enumerate() {
        let position = spawn.position;
        if !position.is_finite() || !map.is_walkable(Tile::from_world(position)) {
            return Err(DataLoadError::InvalidSpawn {
                file: file.to_path_buf(),
                index,
                x: position.x,
                y: position.y,
            });
        }
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
