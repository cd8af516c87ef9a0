//! Authoritative host and read-only observers.
//!
//! The host is the only writer. Client messages are queued as commands and
//! applied at the start of the host's next tick; every tick publishes a
//! full snapshot. Observers mirror the unit list from those snapshots and
//! never touch simulation state.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::catalog::HullType;
use crate::command_queue::Command;
use crate::config::SimConfig;
use crate::engine::Engine;
use crate::fixed::Ticks;
use crate::geometry::Vec2;
use crate::id::UnitId;
use crate::logistics::PresetError;
use crate::protocol::{ClientMessage, ServerMessage, UnitSnapshot};
use crate::sim::TickReport;
use crate::unit::Faction;

/// Opening fleets of the default skirmish.
pub const SKIRMISH_SPAWNS: [(HullType, Faction, Vec2); 5] = [
    (HullType::Sloop, Faction::Player, Vec2 { x: 3.5, y: 12.5 }),
    (HullType::Corvette, Faction::Player, Vec2 { x: 5.0, y: 13.5 }),
    (HullType::Transport, Faction::Player, Vec2 { x: 4.2, y: 15.0 }),
    (HullType::Sloop, Faction::Computer, Vec2 { x: 14.0, y: 4.5 }),
    (HullType::Corvette, Faction::Computer, Vec2 { x: 16.0, y: 4.0 }),
];

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Host {
    engine: Engine,
    /// Host ticks advance the simulation by this many ticks.
    dt: f64,
    last_report: TickReport,
}

impl Host {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            dt: 1.0,
            last_report: TickReport::default(),
        }
    }

    /// The default skirmish with both opening fleets spawned.
    pub fn skirmish(config: SimConfig) -> Result<Self, PresetError> {
        let mut engine = Engine::skirmish(config)?;
        for (hull, owner, position) in SKIRMISH_SPAWNS {
            engine.spawn_unit(hull, owner, position);
        }
        Ok(Self::new(engine))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Report of the most recent tick.
    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Greeting for a newly connected client.
    pub fn welcome(&self, client_id: u32) -> ServerMessage {
        debug!(target: "seelines::host", client = client_id, tick = self.engine.tick(), "host.welcome");
        ServerMessage::Welcome {
            client_id,
            snapshot: self.engine.snapshot(),
        }
    }

    /// Queue every entry of `message` for the next tick.
    pub fn receive(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::Command { payload } => {
                debug!(target: "seelines::host", entries = payload.len(), "host.received");
                self.engine
                    .submit_batch(payload.into_iter().map(|entry| Command::EnqueueOrder {
                        unit_ids: entry.unit_ids,
                        order: entry.order,
                        append: entry.append,
                    }));
            }
        }
    }

    /// Apply queued commands, advance one tick and publish a snapshot.
    pub fn tick(&mut self) -> ServerMessage {
        let pending = self.engine.pending_commands();
        self.last_report = self.engine.step(self.dt);
        let snapshot = self.engine.snapshot();
        debug!(
            target: "seelines::host",
            tick = snapshot.tick,
            commands = pending,
            units = snapshot.units.len(),
            events = self.last_report.events.len(),
            "host.tick"
        );
        ServerMessage::Snapshot { snapshot }
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// A read-only unit mirror. Each accepted snapshot replaces the whole
/// projection; snapshots older than the last applied one are ignored.
#[derive(Debug, Clone, Default)]
pub struct Observer {
    client_id: Option<u32>,
    tick: Option<Ticks>,
    units: BTreeMap<UnitId, UnitSnapshot>,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a server message. Returns `false` when the snapshot was stale.
    pub fn apply(&mut self, message: &ServerMessage) -> bool {
        if let ServerMessage::Welcome { client_id, .. } = message {
            self.client_id = Some(*client_id);
        }
        let snapshot = message.snapshot();
        if self.tick.is_some_and(|tick| snapshot.tick < tick) {
            trace!(target: "seelines::host", tick = snapshot.tick, "observer.stale");
            return false;
        }
        self.tick = Some(snapshot.tick);
        self.units = snapshot
            .units
            .iter()
            .map(|unit| (unit.id, unit.clone()))
            .collect();
        true
    }

    pub fn client_id(&self) -> Option<u32> {
        self.client_id
    }

    pub fn tick(&self) -> Option<Ticks> {
        self.tick
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.units.get(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.units.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use crate::protocol::{CommandEntry, SnapshotMessage};

    fn host() -> Host {
        Host::skirmish(SimConfig::default()).unwrap()
    }

    #[test]
    fn skirmish_spawns_both_fleets() {
        let host = host();
        let engine = host.engine();
        assert_eq!(engine.units().filter(|u| u.owner == Faction::Player).count(), 3);
        assert_eq!(engine.units().filter(|u| u.owner == Faction::Computer).count(), 2);
    }

    #[test]
    fn received_orders_apply_on_next_tick() {
        let mut host = host();
        host.receive(ClientMessage::Command {
            payload: vec![CommandEntry {
                unit_ids: vec![UnitId(1), UnitId(2)],
                order: Order::move_to("regroup", 6.0, 14.0),
                append: false,
            }],
        });
        assert!(host.engine().unit(UnitId(1)).unwrap().is_idle());

        let message = host.tick();
        let snapshot = message.snapshot();
        assert_eq!(snapshot.tick, 1);
        for id in [UnitId(1), UnitId(2)] {
            let unit = snapshot.units.iter().find(|u| u.id == id).unwrap();
            assert_eq!(unit.orders.len(), 1);
            assert_eq!(unit.orders[0].id.0, "regroup");
            assert!(unit.orders[0].metadata.is_some());
        }
    }

    #[test]
    fn observer_replaces_and_rejects_stale() {
        let mut host = host();
        let mut observer = Observer::new();
        assert!(observer.apply(&host.welcome(7)));
        assert_eq!(observer.client_id(), Some(7));
        assert_eq!(observer.units().count(), 5);

        let first = host.tick();
        host.engine_mut().despawn_unit(UnitId(5));
        let second = host.tick();

        assert!(observer.apply(&second));
        assert_eq!(observer.units().count(), 4);
        assert!(!observer.apply(&first));
        assert_eq!(observer.tick(), Some(2));
        assert!(observer.unit(UnitId(5)).is_none());
    }

    #[test]
    fn observer_accepts_same_tick_resend() {
        let mut observer = Observer::new();
        let message = ServerMessage::Snapshot {
            snapshot: SnapshotMessage {
                tick: 3,
                units: Vec::new(),
            },
        };
        assert!(observer.apply(&message));
        assert!(observer.apply(&message));
    }
}
