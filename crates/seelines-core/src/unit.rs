use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::{HullDef, HullType};
use crate::fixed::Ticks;
use crate::geometry::Vec2;
use crate::id::UnitId;
use crate::order::{Order, OrderType, QueuedOrder};

/// One of the two playing sides.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub enum Faction {
    Player,
    Computer,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::Player, Faction::Computer];

    pub fn opponent(self) -> Faction {
        match self {
            Faction::Player => Faction::Computer,
            Faction::Computer => Faction::Player,
        }
    }
}

/// Island ownership. Islands may also be neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Owner {
    Player,
    Computer,
    Neutral,
}

impl Owner {
    pub fn faction(self) -> Option<Faction> {
        match self {
            Owner::Player => Some(Faction::Player),
            Owner::Computer => Some(Faction::Computer),
            Owner::Neutral => None,
        }
    }
}

impl From<Faction> for Owner {
    fn from(faction: Faction) -> Self {
        match faction {
            Faction::Player => Owner::Player,
            Faction::Computer => Owner::Computer,
        }
    }
}

/// A mobile hull on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub hull: HullType,
    pub owner: Faction,
    pub position: Vec2,
    pub velocity: Vec2,
    pub hitpoints: u32,
    /// Head is the active order; the rest are appended follow-ups.
    pub orders: VecDeque<QueuedOrder>,
    /// Unit being escorted. Resolved by id every step; may dangle.
    pub escort_target: Option<UnitId>,
    pub selected: bool,
}

impl Unit {
    pub fn new(id: UnitId, hull: HullType, owner: Faction, position: Vec2) -> Self {
        Self {
            id,
            hull,
            owner,
            position,
            velocity: Vec2::ZERO,
            hitpoints: hull.def().hitpoints,
            orders: VecDeque::new(),
            escort_target: None,
            selected: false,
        }
    }

    pub fn def(&self) -> &'static HullDef {
        self.hull.def()
    }

    pub fn is_idle(&self) -> bool {
        self.orders.is_empty()
    }

    /// Put a copy of `order` in this unit's queue.
    ///
    /// Without `append` the queue is replaced and the escort reference is
    /// reset to the new order's target (or cleared). With `append` the
    /// order goes to the back, and an escort order still takes over the
    /// escort reference immediately.
    pub fn enqueue(&mut self, order: &Order, append: bool, created_at: Ticks) {
        let escort = match (order.order_type, order.target.unit()) {
            (OrderType::Escort, Some(target)) => Some(target),
            _ => None,
        };
        let queued = QueuedOrder {
            order: order.clone(),
            created_at,
        };

        if append {
            if order.order_type == OrderType::Escort {
                self.escort_target = escort;
            }
            self.orders.push_back(queued);
        } else {
            self.escort_target = escort;
            self.orders.clear();
            self.orders.push_back(queued);
        }
    }

    pub fn active_order(&self) -> Option<&QueuedOrder> {
        self.orders.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderPlan, Route};

    fn sloop() -> Unit {
        Unit::new(UnitId(1), HullType::Sloop, Faction::Player, Vec2::new(1.0, 1.0))
    }

    #[test]
    fn new_unit_takes_catalog_hitpoints() {
        let unit = Unit::new(UnitId(2), HullType::Cruiser, Faction::Computer, Vec2::ZERO);
        assert_eq!(unit.hitpoints, 420);
        assert!(unit.is_idle());
    }

    #[test]
    fn replace_clears_queue_and_escort() {
        let mut unit = sloop();
        unit.enqueue(&Order::escort("e", UnitId(5)), false, 0);
        assert_eq!(unit.escort_target, Some(UnitId(5)));

        unit.enqueue(&Order::move_to("a", 1.0, 1.0), true, 1);
        assert_eq!(unit.orders.len(), 2);

        unit.enqueue(&Order::move_to("b", 2.0, 2.0), false, 2);
        assert_eq!(unit.orders.len(), 1);
        assert_eq!(unit.escort_target, None);
        assert_eq!(unit.active_order().unwrap().order.id.0, "b");
        assert_eq!(unit.active_order().unwrap().created_at, 2);
    }

    #[test]
    fn appended_escort_takes_reference_immediately() {
        let mut unit = sloop();
        unit.enqueue(&Order::move_to("a", 1.0, 1.0), false, 0);
        unit.enqueue(&Order::escort("e", UnitId(7)), true, 0);
        assert_eq!(unit.escort_target, Some(UnitId(7)));
        assert_eq!(unit.active_order().unwrap().order.id.0, "a");
    }

    #[test]
    fn appended_move_keeps_escort_reference() {
        let mut unit = sloop();
        unit.enqueue(&Order::escort("e", UnitId(7)), false, 0);
        unit.enqueue(&Order::move_to("a", 1.0, 1.0), true, 0);
        assert_eq!(unit.escort_target, Some(UnitId(7)));
    }

    #[test]
    fn enqueued_plan_is_a_private_copy() {
        let mut a = sloop();
        let mut b = Unit::new(UnitId(2), HullType::Sloop, Faction::Player, Vec2::ZERO);
        let mut order = Order::move_to("m", 3.0, 3.0);
        order.metadata = Some(OrderPlan::Move(Route::default()));
        a.enqueue(&order, false, 0);
        b.enqueue(&order, false, 0);

        if let Some(OrderPlan::Move(route)) = &mut a.orders[0].order.metadata {
            route.index = 4;
        }
        assert_eq!(b.orders[0].order.metadata, Some(OrderPlan::Move(Route::default())));
        assert_eq!(order.metadata, Some(OrderPlan::Move(Route::default())));
    }
}
