//! Serde data file structs for scenario content.
//!
//! The logistics file deserializes straight into
//! [`seelines_core::logistics::LogisticsPreset`] and the config file into
//! [`seelines_core::config::SimConfig`]; only the map and the spawn list have
//! an on-disk shape of their own.

use serde::Deserialize;

use seelines_core::catalog::HullType;
use seelines_core::geometry::Vec2;
use seelines_core::unit::Faction;

// ===========================================================================
// Map
// ===========================================================================

/// A map file: one string per row, `.` for water and `#` for land.
#[derive(Debug, Clone, Deserialize)]
pub struct MapData {
    /// Display name. Empty means "use the directory name".
    #[serde(default)]
    pub name: String,
    pub rows: Vec<String>,
}

// ===========================================================================
// Spawns
// ===========================================================================

/// A unit placed when the scenario starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnData {
    pub hull: HullType,
    pub owner: Faction,
    pub position: Vec2,
}

/// TOML wrapper: `[[spawns]]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlSpawns {
    pub spawns: Vec<SpawnData>,
}
