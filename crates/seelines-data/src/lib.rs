//! Scenario data for the Seelines engine.
//!
//! A scenario directory holds `map`, `logistics`, and optionally `config`
//! and `spawns`, each as `.ron`, `.toml` or `.json`. [`load_scenario`]
//! parses and cross-checks them; [`Scenario::build_engine`] turns the
//! result into a running [`Engine`].

pub mod loader;
pub mod schema;

use std::path::{Path, PathBuf};

use seelines_core::config::SimConfig;
use seelines_core::engine::Engine;
use seelines_core::host::Host;
use seelines_core::logistics::LogisticsPreset;
use seelines_core::map::GridMap;

pub use loader::{load_scenario, DataLoadError};
pub use schema::SpawnData;

/// A parsed and validated scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub map: GridMap,
    pub preset: LogisticsPreset,
    pub config: SimConfig,
    pub spawns: Vec<SpawnData>,
}

impl Scenario {
    /// Build an engine and place the opening units.
    pub fn build_engine(&self) -> Result<Engine, DataLoadError> {
        let mut engine = Engine::new(self.map.clone(), &self.preset, self.config.clone())
            .map_err(|source| DataLoadError::Preset {
                file: PathBuf::from(&self.name),
                source,
            })?;
        for spawn in &self.spawns {
            engine.spawn_unit(spawn.hull, spawn.owner, spawn.position);
        }
        Ok(engine)
    }

    /// Build an authoritative host around [`Self::build_engine`].
    pub fn build_host(&self) -> Result<Host, DataLoadError> {
        self.build_engine().map(Host::new)
    }
}

/// Directory of the bundled default skirmish.
pub fn skirmish_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("skirmish")
}

/// Load the bundled default skirmish.
pub fn load_skirmish() -> Result<Scenario, DataLoadError> {
    load_scenario(&skirmish_dir())
}
