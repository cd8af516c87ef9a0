//! Game events and the per-tick event log.
//!
//! Events are emitted by the logistics and production phases and handed
//! out once, in the [`TickReport`](crate::sim::TickReport) of the step that
//! produced them. Nothing is retained across steps.
//!
//! # Subscribers
//!
//! Passive listeners (HUD, audio) can register per [`EventKind`]; they see
//! every event of that kind during the post-tick phase, before the report is
//! returned. Kinds can also be suppressed, in which case they are neither
//! delivered nor reported.

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingType, HullType};
use crate::id::{ConvoyId, IslandId, UnitId};
use crate::unit::{Faction, Owner};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// A hostile came within interception range of the lane.
    ConvoyDisrupted { convoy: ConvoyId, owner: Faction },
    /// The lane is clear again.
    ConvoyRestored { convoy: ConvoyId, owner: Faction },
    /// A full lap completed without interference.
    ConvoyDelivered { convoy: ConvoyId, owner: Faction },
    /// A lap completed while disrupted; the destination lost pressure.
    ConvoyIntercepted { convoy: ConvoyId, owner: Faction },
    IslandCritical {
        island: IslandId,
        owner: Owner,
        pressure: f64,
    },
    BuildingCompleted {
        owner: Faction,
        island: IslandId,
        building: BuildingType,
        tier: u8,
    },
    UnitConstructed {
        owner: Faction,
        island: IslandId,
        hull: HullType,
        unit: UnitId,
    },
}

/// Discriminant tag for event types, used for suppression and listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConvoyDisrupted,
    ConvoyRestored,
    ConvoyDelivered,
    ConvoyIntercepted,
    IslandCritical,
    BuildingCompleted,
    UnitConstructed,
}

const EVENT_KIND_COUNT: usize = 7;

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ConvoyDisrupted { .. } => EventKind::ConvoyDisrupted,
            GameEvent::ConvoyRestored { .. } => EventKind::ConvoyRestored,
            GameEvent::ConvoyDelivered { .. } => EventKind::ConvoyDelivered,
            GameEvent::ConvoyIntercepted { .. } => EventKind::ConvoyIntercepted,
            GameEvent::IslandCritical { .. } => EventKind::IslandCritical,
            GameEvent::BuildingCompleted { .. } => EventKind::BuildingCompleted,
            GameEvent::UnitConstructed { .. } => EventKind::UnitConstructed,
        }
    }

    /// The faction this event is addressed to. Critical alerts on neutral
    /// islands concern nobody.
    pub fn faction(&self) -> Option<Faction> {
        match *self {
            GameEvent::ConvoyDisrupted { owner, .. }
            | GameEvent::ConvoyRestored { owner, .. }
            | GameEvent::ConvoyDelivered { owner, .. }
            | GameEvent::ConvoyIntercepted { owner, .. }
            | GameEvent::BuildingCompleted { owner, .. }
            | GameEvent::UnitConstructed { owner, .. } => Some(owner),
            GameEvent::IslandCritical { owner, .. } => owner.faction(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&GameEvent)>;

/// Collects the events of the step in progress.
pub struct EventLog {
    pending: Vec<GameEvent>,
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: [Vec<PassiveListener>; EVENT_KIND_COUNT],
    total_emitted: [u64; EVENT_KIND_COUNT],
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("pending", &self.pending)
            .field("suppressed", &self.suppressed)
            .field("total_emitted", &self.total_emitted)
            .finish_non_exhaustive()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Default::default(),
            total_emitted: [0; EVENT_KIND_COUNT],
        }
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.pending.retain(|event| event.kind() != kind);
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event for the current step. No-op for suppressed kinds.
    pub fn emit(&mut self, event: GameEvent) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        self.total_emitted[idx] += 1;
        self.pending.push(event);
    }

    /// Register a passive listener. Listeners run in registration order.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.listeners[kind.index()].push(listener);
    }

    /// Deliver pending events to listeners and hand them back, oldest
    /// first. The log is empty afterwards.
    pub fn flush(&mut self) -> Vec<GameEvent> {
        let events = std::mem::take(&mut self.pending);
        for event in &events {
            for listener in &mut self.listeners[event.kind().index()] {
                listener(event);
            }
        }
        events
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Events ever emitted for a kind (suppressed emissions excluded).
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.total_emitted[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn delivered(convoy: u32) -> GameEvent {
        GameEvent::ConvoyDelivered {
            convoy: ConvoyId(convoy),
            owner: Faction::Player,
        }
    }

    #[test]
    fn flush_returns_events_in_order_and_clears() {
        let mut log = EventLog::new();
        log.emit(delivered(1));
        log.emit(delivered(2));
        assert_eq!(log.pending_count(), 2);

        let events = log.flush();
        assert_eq!(events, vec![delivered(1), delivered(2)]);
        assert_eq!(log.pending_count(), 0);
        assert!(log.flush().is_empty());
    }

    #[test]
    fn suppressed_kinds_are_dropped() {
        let mut log = EventLog::new();
        log.suppress(EventKind::ConvoyDelivered);
        log.emit(delivered(1));
        log.emit(GameEvent::ConvoyRestored {
            convoy: ConvoyId(1),
            owner: Faction::Player,
        });
        assert_eq!(log.flush().len(), 1);
        assert_eq!(log.total_emitted(EventKind::ConvoyDelivered), 0);

        log.unsuppress(EventKind::ConvoyDelivered);
        log.emit(delivered(1));
        assert_eq!(log.flush().len(), 1);
    }

    #[test]
    fn passive_listener_sees_only_its_kind() {
        let mut log = EventLog::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        log.on_passive(
            EventKind::ConvoyDelivered,
            Box::new(move |event| sink.borrow_mut().push(event.clone())),
        );
        log.emit(delivered(3));
        log.emit(GameEvent::ConvoyDisrupted {
            convoy: ConvoyId(3),
            owner: Faction::Player,
        });
        log.flush();
        assert_eq!(*seen.borrow(), vec![delivered(3)]);
    }

    #[test]
    fn faction_routing() {
        let critical_neutral = GameEvent::IslandCritical {
            island: IslandId(2),
            owner: Owner::Neutral,
            pressure: 12.0,
        };
        assert_eq!(critical_neutral.faction(), None);
        assert_eq!(delivered(0).faction(), Some(Faction::Player));
    }

    #[test]
    fn json_uses_type_tag() {
        let event = GameEvent::UnitConstructed {
            owner: Faction::Computer,
            island: IslandId(3),
            hull: HullType::Sloop,
            unit: UnitId(12),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "unitConstructed");
        assert_eq!(json["hull"], "sloop");
        assert_eq!(json["unit"], 12);
    }
}
