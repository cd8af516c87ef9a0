//! Simulation state, state hashing and the per-step report.

use serde::{Deserialize, Serialize};

use crate::command_queue::Command;
use crate::event::GameEvent;
use crate::executor::OrderResolution;
use crate::fixed::{Fixed64, Ticks};
use crate::production::ProductionError;
use crate::unit::Faction;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimState {
    /// Incremented by 1 for each simulation step.
    pub tick: Ticks,
    /// Total simulated time, in ticks.
    pub elapsed: f64,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// A command the pre-tick phase could not apply.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedCommand {
    pub command: Command,
    pub error: ProductionError,
}

/// Everything one step produced. Events are handed out here exactly once.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// The tick this report covers (the value before bookkeeping).
    pub tick: Ticks,
    pub events: Vec<GameEvent>,
    pub rejected: Vec<RejectedCommand>,
    /// Orders that finished or were dropped this step.
    pub orders: Vec<OrderResolution>,
}

impl TickReport {
    /// Events addressed to `faction`, in emission order.
    pub fn events_for(&self, faction: Faction) -> impl Iterator<Item = &GameEvent> {
        self.events
            .iter()
            .filter(move |event| event.faction() == Some(faction))
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for desync detection.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Hashes the exact bit pattern, so `0.0` and `-0.0` differ.
    pub fn write_f64(&mut self, v: f64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write(s.as_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
