//! The entity store: map, units, logistics, treasury and production queue.
//!
//! Units live in a `BTreeMap` keyed by id so every pass over them runs in
//! ascending id order. Ids are assigned monotonically and never reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::HullType;
use crate::economy::Treasury;
use crate::fixed::Ticks;
use crate::geometry::Vec2;
use crate::id::UnitId;
use crate::logistics::Logistics;
use crate::map::GridMap;
use crate::order::Order;
use crate::production::ProductionQueue;
use crate::unit::{Faction, Unit};

/// How a selection request combines with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    #[default]
    Replace,
    Add,
    Toggle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub map: GridMap,
    pub units: BTreeMap<UnitId, Unit>,
    next_unit_id: u32,
    pub logistics: Logistics,
    pub treasury: Treasury,
    pub production: ProductionQueue,
}

impl World {
    pub fn new(map: GridMap, logistics: Logistics, treasury: Treasury) -> Self {
        Self {
            map,
            units: BTreeMap::new(),
            next_unit_id: 1,
            logistics,
            treasury,
            production: ProductionQueue::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Units
    // -----------------------------------------------------------------------

    pub fn spawn(&mut self, hull: HullType, owner: Faction, position: Vec2) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, hull, owner, position));
        id
    }

    /// Remove a unit. Escort orders pointing at it lapse on their next step.
    pub fn despawn(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Give each listed unit its own copy of `order`. Unknown ids are
    /// skipped. Returns how many units took the order.
    pub fn enqueue_order(&mut self, unit_ids: &[UnitId], order: &Order, append: bool, now: Ticks) -> usize {
        let mut accepted = 0;
        for id in unit_ids {
            let Some(unit) = self.units.get_mut(id) else {
                debug!(target: "seelines::orders", unit = %id, order = %order.id, "order.unknown_unit");
                continue;
            };
            unit.enqueue(order, append, now);
            accepted += 1;
            debug!(
                target: "seelines::orders",
                unit = %id,
                order = %order.id,
                kind = ?order.order_type,
                append,
                "order.enqueued"
            );
        }
        accepted
    }

    pub fn units_by_type(&self, faction: Faction, hull: HullType) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|unit| unit.owner == faction && unit.hull == hull)
            .map(|unit| unit.id)
            .collect()
    }

    pub fn distance_between(&self, a: UnitId, b: UnitId) -> Option<f64> {
        let a = self.units.get(&a)?;
        let b = self.units.get(&b)?;
        Some(a.position.distance(b.position))
    }

    /// Supply taken up by `faction`'s fielded units.
    pub fn supply_used(&self, faction: Faction) -> u32 {
        self.units
            .values()
            .filter(|unit| unit.owner == faction)
            .map(|unit| unit.def().supply_cost)
            .sum()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select_units(&mut self, ids: &[UnitId], mode: SelectionMode) {
        if mode == SelectionMode::Replace {
            self.clear_selection();
        }
        for id in ids {
            if let Some(unit) = self.units.get_mut(id) {
                unit.selected = match mode {
                    SelectionMode::Replace | SelectionMode::Add => true,
                    SelectionMode::Toggle => !unit.selected,
                };
            }
        }
    }

    pub fn clear_selection(&mut self) {
        for unit in self.units.values_mut() {
            unit.selected = false;
        }
    }

    pub fn selected_units(&self) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|unit| unit.selected)
            .map(|unit| unit.id)
            .collect()
    }
}
