//! Longer skirmish runs on the bundled scenario: convoy interdiction, a
//! production chain from shipyard to hull, and lockstep determinism.

use seelines_core::catalog::{BuildingType, HullType};
use seelines_core::command_queue::Command;
use seelines_core::engine::Engine;
use seelines_core::event::{EventKind, GameEvent};
use seelines_core::id::{ConvoyId, UnitId};
use seelines_core::order::Order;
use seelines_core::production::ProductionError;
use seelines_core::unit::Faction;
use seelines_data::load_skirmish;

fn engine() -> Engine {
    load_skirmish().unwrap().build_engine().unwrap()
}

fn lane(engine: &Engine, key: &str) -> ConvoyId {
    engine.logistics().convoy_by_key(key).unwrap().id
}

/// Deliveries and interceptions on one lane over `ticks` unit steps.
fn lane_tally(engine: &mut Engine, convoy: ConvoyId, ticks: usize) -> (usize, usize) {
    let (mut delivered, mut intercepted) = (0, 0);
    for _ in 0..ticks {
        for event in engine.step(1.0).events {
            match event {
                GameEvent::ConvoyDelivered { convoy: id, .. } if id == convoy => delivered += 1,
                GameEvent::ConvoyIntercepted { convoy: id, .. } if id == convoy => {
                    intercepted += 1
                }
                _ => {}
            }
        }
    }
    (delivered, intercepted)
}

// ===========================================================================
// Interdiction
// ===========================================================================

#[test]
fn raider_on_the_supply_lane_starves_deliveries() {
    let mut raided = engine();
    let mut control = engine();
    let convoy = lane(&raided, "blue-supply-main");

    // Red sloop (unit 4) sails from the north-east onto the blue lane.
    raided.enqueue_order(&[UnitId(4)], &Order::move_to("raid", 6.0, 13.0), false);

    let mut disrupted_at = None;
    for tick in 0..400 {
        let report = raided.step(1.0);
        control.step(1.0);
        if report.events.contains(&GameEvent::ConvoyDisrupted {
            convoy,
            owner: Faction::Player,
        }) {
            disrupted_at.get_or_insert(tick);
        }
    }
    assert!(disrupted_at.is_some(), "raider never reached the lane");
    assert!(raided.unit(UnitId(4)).unwrap().is_idle());
    assert!(raided.logistics().convoy(convoy).unwrap().disrupted);

    let (raided_delivered, raided_intercepted) = lane_tally(&mut raided, convoy, 600);
    let (control_delivered, control_intercepted) = lane_tally(&mut control, convoy, 600);
    assert_eq!(raided_delivered, 0);
    assert!(raided_intercepted > 0);
    assert_eq!(control_intercepted, 0);
    assert!(control_delivered > raided_intercepted);
    assert!(raided.credits(Faction::Player) < control.credits(Faction::Player));
}

#[test]
fn escorted_raider_still_disrupts() {
    let mut engine = engine();
    let convoy = lane(&engine, "blue-supply-main");
    engine.enqueue_order(&[UnitId(4)], &Order::move_to("raid", 6.0, 13.0), false);
    engine.enqueue_order(&[UnitId(5)], &Order::escort("cover", UnitId(4)), false);

    for _ in 0..400 {
        engine.step(1.0);
    }
    let raider = engine.unit(UnitId(4)).unwrap().position;
    let cover = engine.unit(UnitId(5)).unwrap();
    assert!(cover.position.distance(raider) < 1.0);
    assert!(engine.logistics().convoy(convoy).unwrap().disrupted);
}

// ===========================================================================
// Production chain
// ===========================================================================

#[test]
fn forward_shipyard_then_sloop() {
    let mut engine = engine();
    let forward = engine.logistics().island_by_key("blue-forward").unwrap().id;

    assert_eq!(
        engine.queue_ship(forward, HullType::Sloop, Faction::Player),
        Err(ProductionError::NoShipyard)
    );

    engine.submit(Command::QueueBuilding {
        island: forward,
        building: BuildingType::Shipyard,
        owner: Faction::Player,
    });
    let report = engine.step(30.0);
    assert!(report.rejected.is_empty());
    assert_eq!(engine.overview(Faction::Player).building_queue.len(), 1);

    let mut built = false;
    for _ in 0..30 {
        built |= engine
            .step(30.0)
            .events
            .iter()
            .any(|e| e.kind() == EventKind::BuildingCompleted);
    }
    assert!(built);
    assert_eq!(engine.logistics().island(forward).unwrap().shipyard_tier(), 1);

    let before = engine.units().count();
    engine.submit(Command::QueueShip {
        island: forward,
        hull: HullType::Sloop,
        owner: Faction::Player,
    });
    let mut spawned = None;
    for _ in 0..12 {
        for event in engine.step(30.0).events {
            if let GameEvent::UnitConstructed { unit, island, .. } = event {
                assert_eq!(island, forward);
                spawned = Some(unit);
            }
        }
    }
    let unit = engine.unit(spawned.expect("no sloop was launched")).unwrap();
    assert_eq!(unit.owner, Faction::Player);
    assert_eq!(engine.units().count(), before + 1);
    let island = engine.logistics().island(forward).unwrap().position;
    let distance = unit.position.distance(island);
    assert!((0.6..=1.4).contains(&distance), "{distance}");
}

#[test]
fn foreign_island_requests_are_rejected_in_the_report() {
    let mut control = engine();
    let mut engine = engine();
    let red = engine.logistics().island_by_key("red-forward").unwrap().id;

    engine.submit(Command::QueueBuilding {
        island: red,
        building: BuildingType::Warehouse,
        owner: Faction::Player,
    });
    engine.submit(Command::QueueShip {
        island: red,
        hull: HullType::Sloop,
        owner: Faction::Player,
    });
    let report = engine.step(1.0);
    assert_eq!(report.rejected.len(), 2);
    assert!(
        report
            .rejected
            .iter()
            .all(|r| r.error == ProductionError::NotOwner)
    );
    assert!(engine.world.production.is_empty());

    // Same step with no requests: only passive income moved the balance.
    control.step(1.0);
    assert_eq!(engine.credits(Faction::Player), control.credits(Faction::Player));
    assert_eq!(engine.state_hash(), control.state_hash());
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn lockstep_engines_agree() {
    let mut a = engine();
    let mut b = engine();
    let forward = a.logistics().island_by_key("blue-forward").unwrap().id;

    let script = |tick: usize| -> Vec<Command> {
        match tick {
            0 => vec![Command::EnqueueOrder {
                unit_ids: vec![UnitId(1), UnitId(2)],
                order: Order::patrol_to("p", 10.0, 14.0),
                append: false,
            }],
            5 => vec![Command::EnqueueOrder {
                unit_ids: vec![UnitId(4)],
                order: Order::move_to("raid", 6.0, 13.0),
                append: false,
            }],
            9 => vec![Command::QueueBuilding {
                island: forward,
                building: BuildingType::Shipyard,
                owner: Faction::Player,
            }],
            _ => Vec::new(),
        }
    };

    for tick in 0..500 {
        a.submit_batch(script(tick));
        b.submit_batch(script(tick));
        let (ra, rb) = (a.step(1.0), b.step(1.0));
        assert_eq!(ra.events, rb.events, "tick {tick}");
        if tick % 50 == 0 {
            assert_eq!(a.state_hash(), b.state_hash(), "tick {tick}");
        }
    }
    assert_eq!(a.state_hash(), b.state_hash());
    assert_eq!(a.snapshot(), b.snapshot());
}
