//! Input command queue for externally-submitted world mutations.
//!
//! Commands come from the player UI, the computer opponent or the network
//! host and are applied at the start of the next step, so every mutation
//! lands on a tick boundary.

use crate::catalog::{BuildingType, HullType};
use crate::fixed::Ticks;
use crate::geometry::Vec2;
use crate::id::{IslandId, UnitId};
use crate::order::Order;
use crate::unit::Faction;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single command that can be submitted to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Give every listed unit a copy of `order`.
    EnqueueOrder {
        unit_ids: Vec<UnitId>,
        order: Order,
        append: bool,
    },
    SpawnUnit {
        hull: HullType,
        owner: Faction,
        position: Vec2,
    },
    DespawnUnit { unit: UnitId },
    /// Build or upgrade a structure.
    QueueBuilding {
        island: IslandId,
        building: BuildingType,
        owner: Faction,
    },
    QueueShip {
        island: IslandId,
        hull: HullType,
        owner: Faction,
    },
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting for the next tick boundary, with optional bounded
/// history for replay and debugging.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    history: Vec<(Ticks, Command)>,
    /// 0 = no history.
    max_history: usize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Take every pending command in submission order, recording them in
    /// history under `tick`.
    pub fn drain(&mut self, tick: Ticks) -> Vec<Command> {
        let commands = std::mem::take(&mut self.pending);

        if self.max_history > 0 {
            self.history
                .extend(commands.iter().map(|command| (tick, command.clone())));
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }

        commands
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(Ticks, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn() -> Command {
        Command::SpawnUnit {
            hull: HullType::Sloop,
            owner: Faction::Player,
            position: Vec2::new(1.5, 1.5),
        }
    }

    fn despawn(id: u32) -> Command {
        Command::DespawnUnit { unit: UnitId(id) }
    }

    fn order() -> Command {
        Command::EnqueueOrder {
            unit_ids: vec![UnitId(1)],
            order: Order::move_to("m", 3.0, 3.0),
            append: false,
        }
    }

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut queue = CommandQueue::new();
        queue.push(spawn());
        queue.push_batch([order(), despawn(1)]);
        assert_eq!(queue.pending_count(), 3);

        let drained = queue.drain(0);
        assert!(matches!(drained[0], Command::SpawnUnit { .. }));
        assert!(matches!(drained[1], Command::EnqueueOrder { .. }));
        assert!(matches!(drained[2], Command::DespawnUnit { .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn no_history_by_default() {
        let mut queue = CommandQueue::new();
        queue.push(spawn());
        queue.drain(10);
        assert!(queue.history().is_empty());
    }

    #[test]
    fn history_is_tagged_and_trimmed() {
        let mut queue = CommandQueue::with_max_history(3);
        queue.push_batch([despawn(1), despawn(2), despawn(3)]);
        queue.drain(1);
        queue.push_batch([despawn(4), despawn(5)]);
        queue.drain(2);

        let history = queue.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], (1, despawn(3)));
        assert_eq!(history[2], (2, despawn(5)));

        queue.clear_history();
        assert!(queue.history().is_empty());
    }
}
