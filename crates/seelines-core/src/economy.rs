//! Per-faction credit ledger.
//!
//! Balances are fixed-point so spending and refunds are exact. Income is
//! applied with saturating arithmetic and floored at zero afterwards;
//! spending is checked up front and never takes a balance below zero.

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, f64_to_fixed64, fixed64_to_f64};
use crate::unit::Faction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    player: Fixed64,
    computer: Fixed64,
}

impl Treasury {
    pub fn new(starting_credits: f64) -> Self {
        let start = f64_to_fixed64(starting_credits).max(Fixed64::ZERO);
        Self {
            player: start,
            computer: start,
        }
    }

    fn slot(&mut self, faction: Faction) -> &mut Fixed64 {
        match faction {
            Faction::Player => &mut self.player,
            Faction::Computer => &mut self.computer,
        }
    }

    pub fn credits(&self, faction: Faction) -> Fixed64 {
        match faction {
            Faction::Player => self.player,
            Faction::Computer => self.computer,
        }
    }

    pub fn credits_f64(&self, faction: Faction) -> f64 {
        fixed64_to_f64(self.credits(faction))
    }

    /// Apply a signed float delta (income, upkeep). The balance is clamped
    /// at zero afterwards.
    pub fn apply(&mut self, faction: Faction, delta: f64) {
        let slot = self.slot(faction);
        *slot = slot.saturating_add(f64_to_fixed64(delta)).max(Fixed64::ZERO);
    }

    pub fn can_afford(&self, faction: Faction, cost: Fixed64) -> bool {
        self.credits(faction) >= cost
    }

    /// Deduct `cost` if the faction can afford it.
    pub fn spend(&mut self, faction: Faction, cost: Fixed64) -> bool {
        let slot = self.slot(faction);
        if *slot < cost {
            return false;
        }
        *slot -= cost;
        true
    }
}
