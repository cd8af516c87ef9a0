//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::config::{LogisticsTuning, SimConfig};
use crate::economy::Treasury;
use crate::engine::Engine;
use crate::geometry::Vec2;
use crate::host::SKIRMISH_SPAWNS;
use crate::id::UnitId;
use crate::logistics::{ConvoySpec, IslandSpec, Logistics, LogisticsPreset};
use crate::map::{GridMap, TerrainKind};
use crate::order::Order;
use crate::rng::SimRng;
use crate::unit::{Faction, Owner};
use crate::world::World;

// ===========================================================================
// Maps
// ===========================================================================

/// 8x8 open water with a land wall at `x = 4`, `y` in `2..=5`.
pub fn strip_map() -> GridMap {
    GridMap::from_fn(8, 8, |x, y| {
        if x == 4 && (2..=5).contains(&y) {
            TerrainKind::Land
        } else {
            TerrainKind::Water
        }
    })
}

// ===========================================================================
// Logistics
// ===========================================================================

/// Two player islands on the strip map joined by one convoy lane, and a
/// computer outpost with no lanes.
pub fn small_preset() -> LogisticsPreset {
    let island = |key: &str, owner: Owner, x: f64, y: f64| IslandSpec {
        key: key.to_string(),
        name: key.to_uppercase(),
        owner,
        position: Vec2::new(x, y),
        base_demand: 4.0,
        base_capacity: 30.0,
        initial_pressure: 50.0,
        storage: 20.0,
        buildings: Vec::new(),
    };
    LogisticsPreset {
        islands: vec![
            island("west", Owner::Player, 1.0, 6.0),
            island("east", Owner::Player, 7.0, 6.0),
            island("north", Owner::Computer, 6.0, 1.0),
        ],
        convoys: vec![ConvoySpec {
            key: "west-east".into(),
            owner: Faction::Player,
            origin: "west".into(),
            destination: "east".into(),
            lane: vec![Vec2::new(1.0, 6.5), Vec2::new(7.0, 6.5)],
            throughput: 3.0,
            speed: 1.0,
            resilience: 0.5,
        }],
        storms: Vec::new(),
    }
}

pub fn small_world() -> World {
    let map = strip_map();
    let mut rng = SimRng::new(7);
    match Logistics::from_preset(&small_preset(), &map, &LogisticsTuning::default(), &mut rng) {
        Ok(logistics) => World::new(map, logistics, Treasury::new(900.0)),
        Err(err) => panic!("small preset must load: {err}"),
    }
}

pub fn skirmish_world() -> World {
    skirmish_engine().world
}

// ===========================================================================
// Engines
// ===========================================================================

pub fn skirmish_engine() -> Engine {
    match Engine::skirmish(SimConfig::default()) {
        Ok(engine) => engine,
        Err(err) => panic!("skirmish preset must load: {err}"),
    }
}

/// Engine on the strip map with the small preset and no units.
pub fn strip_engine() -> Engine {
    match Engine::new(strip_map(), &small_preset(), SimConfig::default()) {
        Ok(engine) => engine,
        Err(err) => panic!("small preset must load: {err}"),
    }
}

/// The skirmish with both opening fleets, each sloop sent on a patrol.
pub fn skirmish_engine_with_units() -> Engine {
    let mut engine = skirmish_engine();
    for (hull, owner, position) in SKIRMISH_SPAWNS {
        engine.spawn_unit(hull, owner, position);
    }
    engine.enqueue_order(&[UnitId(1)], &Order::patrol_to("p-blue", 10.0, 14.0), false);
    engine.enqueue_order(&[UnitId(4)], &Order::patrol_to("p-red", 12.0, 4.5), false);
    engine.enqueue_order(&[UnitId(3)], &Order::escort("e-blue", UnitId(1)), false);
    engine
}
