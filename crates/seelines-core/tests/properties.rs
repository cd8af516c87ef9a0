//! Property-based tests for the Seelines core engine.
//!
//! Random maps, timesteps and requests; structural invariants must hold.

use seelines_core::catalog::{BuildingType, HullType};
use seelines_core::config::SimConfig;
use seelines_core::engine::Engine;
use seelines_core::geometry::{Tile, Vec2};
use seelines_core::map::{GridMap, TerrainKind};
use seelines_core::order::{Order, OrderPlan, PatrolDirection};
use seelines_core::pathfinding::find_path;
use seelines_core::production::ProductionError;
use seelines_core::test_utils::*;
use seelines_core::unit::Faction;

use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

const SIZE: u32 = 10;

/// A 10x10 map with roughly a quarter of the tiles turned to land.
fn arb_map() -> impl Strategy<Value = GridMap> {
    proptest::collection::vec(prop::bool::weighted(0.25), (SIZE * SIZE) as usize).prop_map(|land| {
        GridMap::from_fn(SIZE, SIZE, |x, y| {
            if land[(y as u32 * SIZE + x as u32) as usize] {
                TerrainKind::Land
            } else {
                TerrainKind::Water
            }
        })
    })
}

fn arb_tile() -> impl Strategy<Value = Tile> {
    (0..SIZE as i32, 0..SIZE as i32).prop_map(|(x, y)| Tile::new(x, y))
}

/// Any water tile of the strip map.
fn arb_strip_water() -> impl Strategy<Value = Tile> {
    (0..8i32, 0..8i32)
        .prop_filter("water", |&(x, y)| !(x == 4 && (2..=5).contains(&y)))
        .prop_map(|(x, y)| Tile::new(x, y))
}

/// Timesteps from tiny to absurd.
fn arb_dt() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => 0.0f64..2.0,
        2 => 2.0f64..500.0,
        1 => Just(1e9),
        1 => Just(1e15),
    ]
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Found paths start at `start`, end at `goal`, stay on water and never
    /// cut a land corner.
    #[test]
    fn paths_are_valid(map in arb_map(), start in arb_tile(), goal in arb_tile()) {
        let result = find_path(&map, start, goal);
        if !map.is_walkable(goal) {
            prop_assert!(result.is_none());
            return Ok(());
        }
        let Some(path) = result else {
            return Ok(());
        };
        prop_assert_eq!(path.first().copied(), Some(start));
        prop_assert_eq!(path.last().copied(), Some(goal));
        for step in path.windows(2) {
            let (a, b) = (step[0], step[1]);
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            prop_assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
            prop_assert!(map.is_walkable(b));
            if dx != 0 && dy != 0 {
                prop_assert!(map.is_walkable(Tile::new(b.x, a.y)));
                prop_assert!(map.is_walkable(Tile::new(a.x, b.y)));
            }
        }
    }

    /// Pressure, supply and power reserve stay clamped and convoy progress
    /// stays on the lane, whatever the timestep.
    #[test]
    fn logistics_stay_in_range(dts in proptest::collection::vec(arb_dt(), 1..24)) {
        let mut engine = skirmish_engine_with_units();
        for dt in dts {
            engine.step(dt);
            for island in engine.logistics().islands() {
                prop_assert!((5.0..=100.0).contains(&island.pressure), "pressure {}", island.pressure);
                prop_assert!(island.supply >= 0.0 && island.supply <= island.supply_capacity);
                prop_assert!(island.power_reserve >= 0.0);
                prop_assert!(island.power_reserve <= island.supply_capacity * 0.6 + 1e-9);
            }
            for convoy in engine.logistics().convoys() {
                prop_assert!(convoy.progress >= 0.0 && convoy.progress < convoy.length);
                prop_assert!((0.2..=1.0).contains(&convoy.weather_penalty));
            }
            for faction in Faction::ALL {
                prop_assert!(engine.credits(faction) >= 0.0);
            }
        }
    }

    /// A patrol between two water tiles never leaves the queue and keeps
    /// flipping direction.
    #[test]
    fn patrol_never_ends(target in arb_strip_water()) {
        let mut engine = strip_engine();
        let id = engine.spawn_unit(HullType::Sloop, Faction::Player, Vec2::new(1.0, 1.0));
        engine.enqueue_order(&[id], &Order::patrol_to("p", f64::from(target.x), f64::from(target.y)), false);

        let mut flips = 0;
        let mut last = PatrolDirection::Forward;
        for _ in 0..1500 {
            engine.step(1.0);
            let unit = engine.unit(id).unwrap();
            prop_assert_eq!(unit.orders.len(), 1);
            if let Some(OrderPlan::Patrol(state)) = &unit.orders[0].order.metadata {
                if state.direction != last {
                    flips += 1;
                    last = state.direction;
                }
            }
        }
        prop_assert!(flips >= 2, "only {} flips", flips);
    }

    /// Rejected requests leave credits and the queue alone; accepted ones
    /// deduct exactly once.
    #[test]
    fn production_charges_exactly_once(credits in 0.0f64..1500.0, building in 0usize..BuildingType::ALL.len()) {
        let config = SimConfig { starting_credits: credits, ..SimConfig::default() };
        let mut engine = Engine::skirmish(config).unwrap();
        let island = engine.logistics().island_by_key("blue-forward").unwrap().id;
        let before = engine.world.treasury.credits(Faction::Player);

        match engine.queue_building(island, BuildingType::ALL[building], Faction::Player) {
            Ok(id) => {
                let cost = engine.world.production.get(id).unwrap().cost;
                prop_assert_eq!(engine.world.treasury.credits(Faction::Player), before - cost);
                prop_assert_eq!(engine.world.production.len(), 1);
            }
            Err(err) => {
                if let ProductionError::InsufficientCredits { required, .. } = err {
                    prop_assert!(required > credits - 1e-6);
                }
                prop_assert_eq!(engine.world.treasury.credits(Faction::Player), before);
                prop_assert!(engine.world.production.is_empty());
            }
        }
    }
}
