//! Orders and their executor-owned plans.
//!
//! An [`Order`] is what a commanding collaborator sends: an id, a type and a
//! target. Once in a unit's queue the executor attaches an [`OrderPlan`]
//! holding the resolved path and progress. Plans are plain values; every
//! unit that receives an order gets its own copy.

use serde::{Deserialize, Serialize};

use crate::fixed::Ticks;
use crate::geometry::{Tile, Vec2};
use crate::id::{OrderId, UnitId};
use crate::map::GridMap;
use crate::pathfinding::{find_path, path_to_waypoints};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    Move,
    Patrol,
    Escort,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderTarget {
    Point {
        x: f64,
        y: f64,
    },
    Unit {
        #[serde(rename = "unitId")]
        unit_id: UnitId,
    },
}

impl OrderTarget {
    pub fn point(&self) -> Option<Vec2> {
        match *self {
            OrderTarget::Point { x, y } => Some(Vec2::new(x, y)),
            OrderTarget::Unit { .. } => None,
        }
    }

    pub fn unit(&self) -> Option<UnitId> {
        match *self {
            OrderTarget::Unit { unit_id } => Some(unit_id),
            OrderTarget::Point { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// A resolved tile path and the waypoint queue derived from it.
#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
#[serde(default, rename_all = "camelCase")]
pub struct Route {
    pub path: Vec<Tile>,
    pub queue: Vec<Vec2>,
    /// Index of the waypoint currently being steered toward.
    pub index: u32,
}

impl Route {
    pub fn from_path(path: Vec<Tile>) -> Self {
        let queue = path_to_waypoints(&path);
        Self {
            path,
            queue,
            index: 0,
        }
    }

    pub fn current_waypoint(&self) -> Option<Vec2> {
        let last = self.queue.len().checked_sub(1)?;
        self.queue.get((self.index as usize).min(last)).copied()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(rename_all = "camelCase")]
pub enum PatrolDirection {
    #[default]
    Forward,
    Return,
}

impl PatrolDirection {
    pub fn flipped(self) -> Self {
        match self {
            PatrolDirection::Forward => PatrolDirection::Return,
            PatrolDirection::Return => PatrolDirection::Forward,
        }
    }
}

/// Patrol progress: the leg being sailed plus both cached legs.
#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
#[serde(default, rename_all = "camelCase")]
pub struct PatrolState {
    /// The active leg. `route.path` always holds the forward tile path.
    pub route: Route,
    pub origin: Option<Tile>,
    pub forward_queue: Vec<Vec2>,
    pub return_path: Vec<Tile>,
    pub return_queue: Vec<Vec2>,
    pub direction: PatrolDirection,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
#[serde(default, rename_all = "camelCase")]
pub struct EscortState {
    /// Formation point computed on the last step.
    pub station: Option<Vec2>,
}

/// Executor state attached to an order, one variant per order type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum OrderPlan {
    Move(Route),
    Patrol(PatrolState),
    Escort(EscortState),
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub target: OrderTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<OrderPlan>,
}

impl Order {
    /// A move order with no pre-resolved plan; the executor plans it on
    /// first use.
    pub fn move_to(id: impl Into<OrderId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            order_type: OrderType::Move,
            target: OrderTarget::Point { x, y },
            metadata: None,
        }
    }

    /// A patrol order from wherever the unit stands to `(x, y)` and back.
    pub fn patrol_to(id: impl Into<OrderId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            order_type: OrderType::Patrol,
            target: OrderTarget::Point { x, y },
            metadata: None,
        }
    }

    pub fn escort(id: impl Into<OrderId>, unit: UnitId) -> Self {
        Self {
            id: id.into(),
            order_type: OrderType::Escort,
            target: OrderTarget::Unit { unit_id: unit },
            metadata: None,
        }
    }
}

/// An order sitting in a unit's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOrder {
    pub order: Order,
    /// Tick the order entered the queue.
    pub created_at: Ticks,
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

fn target_tile(map: &GridMap, target: Vec2) -> Tile {
    map.clamp_tile(Tile::from_world(target))
}

/// Build a move order from `start` to the tile nearest `target`, with its
/// route already resolved. Returns `None` when no path exists.
pub fn compose_move(
    id: impl Into<OrderId>,
    map: &GridMap,
    start: Vec2,
    target: Vec2,
) -> Option<Order> {
    let tile = target_tile(map, target);
    let path = find_path(map, Tile::from_world(start), tile)?;
    Some(Order {
        id: id.into(),
        order_type: OrderType::Move,
        target: OrderTarget::Point {
            x: f64::from(tile.x),
            y: f64::from(tile.y),
        },
        metadata: Some(OrderPlan::Move(Route::from_path(path))),
    })
}

/// Build a patrol order between `origin` and the tile nearest
/// `destination`. The return leg falls back to the reversed forward path.
pub fn compose_patrol(
    id: impl Into<OrderId>,
    map: &GridMap,
    origin: Vec2,
    destination: Vec2,
) -> Option<Order> {
    let origin = Tile::from_world(origin);
    let tile = target_tile(map, destination);
    let forward = find_path(map, origin, tile)?;
    let return_path = find_path(map, tile, origin).unwrap_or_else(|| {
        let mut reversed = forward.clone();
        reversed.reverse();
        reversed
    });
    let route = Route::from_path(forward);
    Some(Order {
        id: id.into(),
        order_type: OrderType::Patrol,
        target: OrderTarget::Point {
            x: f64::from(tile.x),
            y: f64::from(tile.y),
        },
        metadata: Some(OrderPlan::Patrol(PatrolState {
            forward_queue: route.queue.clone(),
            route,
            origin: Some(origin),
            return_queue: path_to_waypoints(&return_path),
            return_path,
            direction: PatrolDirection::Forward,
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::strip_map;

    #[test]
    fn order_json_matches_wire_shape() {
        let order = Order::move_to("o-1", 3.0, 4.0);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "o-1",
                "type": "move",
                "target": {"kind": "point", "x": 3.0, "y": 4.0}
            })
        );

        let escort = Order::escort("o-2", UnitId(9));
        let json = serde_json::to_value(&escort).unwrap();
        assert_eq!(json["type"], "escort");
        assert_eq!(json["target"], serde_json::json!({"kind": "unit", "unitId": 9}));
    }

    #[test]
    fn plan_serializes_with_state_tag() {
        let plan = OrderPlan::Patrol(PatrolState::default());
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["state"], "patrol");
        assert_eq!(json["direction"], "forward");
        assert!(json.get("forwardQueue").is_some());
        let back: OrderPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn route_current_waypoint_clamps_index() {
        let mut route = Route::from_path(vec![Tile::new(0, 0), Tile::new(1, 0), Tile::new(2, 0)]);
        assert_eq!(route.current_waypoint(), Some(Vec2::new(1.5, 0.5)));
        route.index = 10;
        assert_eq!(route.current_waypoint(), Some(Vec2::new(2.5, 0.5)));
        assert_eq!(Route::default().current_waypoint(), None);
    }

    #[test]
    fn compose_move_resolves_route() {
        let map = strip_map();
        let order = compose_move("m", &map, Vec2::new(2.0, 2.0), Vec2::new(6.0, 6.0)).unwrap();
        assert_eq!(order.target, OrderTarget::Point { x: 6.0, y: 6.0 });
        let Some(OrderPlan::Move(route)) = &order.metadata else {
            panic!("expected a move plan");
        };
        assert_eq!(route.path.first(), Some(&Tile::new(2, 2)));
        assert_eq!(route.queue.last(), Some(&Vec2::new(6.5, 6.5)));
    }

    #[test]
    fn compose_move_into_land_is_none() {
        let map = strip_map();
        assert!(compose_move("m", &map, Vec2::new(2.0, 2.0), Vec2::new(4.0, 3.0)).is_none());
    }

    #[test]
    fn compose_move_clamps_target_into_map() {
        let map = strip_map();
        let order = compose_move("m", &map, Vec2::new(1.0, 1.0), Vec2::new(40.0, -3.0)).unwrap();
        assert_eq!(order.target, OrderTarget::Point { x: 7.0, y: 0.0 });
    }

    #[test]
    fn compose_patrol_caches_both_legs() {
        let map = strip_map();
        let order =
            compose_patrol("p", &map, Vec2::new(1.0, 3.0), Vec2::new(6.0, 3.0)).unwrap();
        let Some(OrderPlan::Patrol(state)) = &order.metadata else {
            panic!("expected a patrol plan");
        };
        assert_eq!(state.origin, Some(Tile::new(1, 3)));
        assert_eq!(state.direction, PatrolDirection::Forward);
        assert_eq!(state.forward_queue, state.route.queue);
        assert_eq!(state.return_path.first(), Some(&Tile::new(6, 3)));
        assert_eq!(state.return_path.last(), Some(&Tile::new(1, 3)));
        assert_eq!(state.return_queue.last(), Some(&Vec2::new(1.5, 3.5)));
    }
}
