//! Headless runner: loads a scenario, plays it through a host and an
//! observer, prints a strategic overview and verifies determinism.
//!
//! Run with: `cargo run --package seelines-data --example headless_runner [scenario_dir]`
//!
//! Set `RUST_LOG=seelines=debug` to watch orders, convoys and production.

use std::path::PathBuf;

use seelines_core::event::EventKind;
use seelines_core::host::Observer;
use seelines_core::id::UnitId;
use seelines_core::order::Order;
use seelines_core::protocol::{encode_binary, encode_json, ClientMessage, CommandEntry};
use seelines_core::unit::Faction;
use seelines_data::{load_scenario, skirmish_dir};

const TICKS: u64 = 600;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(skirmish_dir);
    let scenario = load_scenario(&dir).unwrap_or_else(|e| {
        panic!("failed to load scenario at {}: {e}", dir.display());
    });
    println!(
        "=== {} === {}x{} sea, {} islands, {} lanes, {} units\n",
        scenario.name,
        scenario.map.width(),
        scenario.map.height(),
        scenario.preset.islands.len(),
        scenario.preset.convoys.len(),
        scenario.spawns.len()
    );

    // Run 1: through the host, with an observer mirroring snapshots.
    let mut host = scenario.build_host().expect("failed to build host");
    let mut observer = Observer::new();
    observer.apply(&host.welcome(1));

    host.receive(ClientMessage::Command {
        payload: vec![CommandEntry {
            unit_ids: vec![UnitId(1)],
            order: Order::patrol_to("runner-patrol", 10.0, 14.0),
            append: false,
        }],
    });

    let mut frame_json = 0;
    let mut frame_binary = 0;
    for _ in 0..TICKS {
        let message = host.tick();
        frame_json = encode_json(&message).map(|s| s.len()).unwrap_or(0);
        frame_binary = encode_binary(&message).len();
        observer.apply(&message);
    }

    let overview = host.engine().overview(Faction::Player);
    println!(
        "After {TICKS} ticks: credits={:.1}, supply {}/{:.0}",
        overview.credits, overview.supply_used, overview.supply_capacity
    );
    for island in &overview.islands {
        println!(
            "  [{:>18}] pressure={:5.1} supply={:5.1}/{:5.1} critical={}",
            island.name, island.pressure, island.supply, island.supply_capacity, island.critical
        );
    }
    println!(
        "  deliveries={} interceptions={} hulls launched={}",
        host.engine().total_events(EventKind::ConvoyDelivered),
        host.engine().total_events(EventKind::ConvoyIntercepted),
        host.engine().total_events(EventKind::UnitConstructed)
    );
    for convoy in &overview.convoys {
        println!(
            "  lane {:<18} progress={:.2} disrupted={} weather={:.2}",
            convoy.key, convoy.progress, convoy.disrupted, convoy.weather_penalty
        );
    }
    println!(
        "Observer at tick {:?} sees {} units; last frame {frame_json} B json, {frame_binary} B binary",
        observer.tick(),
        observer.units().count()
    );

    // Run 2: same scenario driven directly, for the determinism check.
    let mut engine = scenario.build_engine().expect("failed to build engine");
    engine.enqueue_order(
        &[UnitId(1)],
        &Order::patrol_to("runner-patrol", 10.0, 14.0),
        false,
    );
    // The host applied the order during its first tick.
    for _ in 0..TICKS {
        engine.step(1.0);
    }

    let hash1 = host.engine().state_hash();
    let hash2 = engine.state_hash();
    if hash1 == hash2 {
        println!("Determinism: PASS (state hash {hash1:#018x})");
    } else {
        println!("Determinism: FAIL! host={hash1:#018x} != direct={hash2:#018x}");
        std::process::exit(1);
    }
}
