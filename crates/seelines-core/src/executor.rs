//! Per-unit order state machine.
//!
//! Each step a unit either coasts to a stop (no orders) or works its head
//! order:
//!
//! - **Move** follows one waypoint queue and completes at the last waypoint.
//! - **Patrol** alternates between the cached forward and return queues and
//!   only ends if one of them is empty.
//! - **Escort** steers toward a station trailing the escorted unit and is
//!   dropped once that unit no longer exists.
//!
//! Motion is acceleration-limited: velocity approaches the desired
//! velocity by at most `acceleration / tick_rate * dt` per axis, then
//! position integrates `velocity * dt`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::HullDef;
use crate::config::MovementTuning;
use crate::geometry::{Tile, Vec2, approach};
use crate::id::{OrderId, UnitId};
use crate::map::GridMap;
use crate::order::{EscortState, Order, OrderPlan, OrderType, PatrolDirection, PatrolState, Route};
use crate::pathfinding::{find_path, path_to_waypoints};
use crate::unit::Unit;

/// Read-only inputs shared by every unit in a step.
#[derive(Debug, Clone, Copy)]
pub struct ExecContext<'a> {
    pub map: &'a GridMap,
    pub tuning: &'a MovementTuning,
    pub tick_rate: f64,
}

/// Why a unit's head order left its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The order reached its end state.
    Completed,
    /// The escorted unit is gone (or was never set).
    EscortLost,
    /// The target kind does not fit the order type.
    InvalidTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderResolution {
    pub unit: UnitId,
    pub order: OrderId,
    pub outcome: OrderOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Underway,
    Finished,
}

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// Mutable motion state of one unit, split off so the order queue can be
/// borrowed at the same time.
struct Body<'a> {
    def: &'static HullDef,
    position: &'a mut Vec2,
    velocity: &'a mut Vec2,
}

impl Body<'_> {
    fn snap_to(&mut self, target: Vec2) {
        *self.position = target;
        *self.velocity = Vec2::ZERO;
    }

    /// Steer toward `target`. Returns `true` on arrival, in which case the
    /// body sits exactly on `target` with zero velocity.
    fn move_towards(&mut self, target: Vec2, ctx: &ExecContext<'_>, dt: f64) -> bool {
        let speed_per_tick = self.def.max_speed / ctx.tick_rate;
        let threshold = ctx
            .tuning
            .arrival_floor
            .max(speed_per_tick * dt * ctx.tuning.arrival_scale);

        let offset = target - *self.position;
        let distance = offset.length();
        if distance < threshold {
            self.snap_to(target);
            return true;
        }

        let desired = offset * (speed_per_tick / distance);
        let max_delta = self.def.acceleration / ctx.tick_rate * dt;
        *self.velocity = Vec2::new(
            approach(self.velocity.x, desired.x, max_delta),
            approach(self.velocity.y, desired.y, max_delta),
        );
        *self.position += *self.velocity * dt;

        if self.position.distance(target) <= threshold {
            self.snap_to(target);
            return true;
        }
        false
    }

    /// Brake toward zero with no order to follow.
    fn coast(&mut self, ctx: &ExecContext<'_>, dt: f64) {
        let decel = self.def.acceleration / ctx.tick_rate * dt * ctx.tuning.idle_deceleration;
        let vx = approach(self.velocity.x, 0.0, decel);
        let vy = approach(self.velocity.y, 0.0, decel);
        let eps = ctx.tuning.idle_epsilon;
        if vx.abs() > eps || vy.abs() > eps {
            *self.velocity = Vec2::new(vx, vy);
            *self.position += *self.velocity * dt;
        } else {
            *self.velocity = Vec2::ZERO;
        }
    }

    /// Steer along the route's waypoint queue.
    fn follow(&mut self, route: &mut Route, ctx: &ExecContext<'_>, dt: f64) -> Leg {
        let Some(last) = route.queue.len().checked_sub(1) else {
            return Leg::Finished;
        };
        let index = (route.index as usize).min(last);
        if !self.move_towards(route.queue[index], ctx, dt) {
            return Leg::Underway;
        }
        if index >= last {
            route.index = 0;
            Leg::Finished
        } else {
            route.index = index as u32 + 1;
            Leg::Underway
        }
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

fn plan_path(map: &GridMap, order: &OrderId, start: Tile, dest: Tile) -> Vec<Tile> {
    find_path(map, start, dest).unwrap_or_else(|| {
        debug!(
            target: "seelines::orders",
            order = %order,
            start = ?start,
            dest = ?dest,
            "order.unreachable"
        );
        Vec::new()
    })
}

/// Make sure `order` carries a plan for its type and return it.
///
/// Existing paths and queues are reused; only the empty parts are derived,
/// searching from `start`. For a patrol the origin defaults to `start` and
/// the return leg falls back to the reversed forward path. Returns `None`
/// when a move or patrol order does not target a point.
pub fn ensure_plan<'a>(
    order: &'a mut Order,
    start: Tile,
    map: &GridMap,
) -> Option<&'a mut OrderPlan> {
    let previous = order.metadata.take();
    let plan = match order.order_type {
        OrderType::Escort => OrderPlan::Escort(match previous {
            Some(OrderPlan::Escort(state)) => state,
            _ => EscortState::default(),
        }),
        OrderType::Move => {
            let dest = Tile::from_world(order.target.point()?);
            let mut route = match previous {
                Some(OrderPlan::Move(route)) => route,
                _ => Route::default(),
            };
            if route.path.is_empty() {
                route.path = plan_path(map, &order.id, start, dest);
            }
            if route.queue.is_empty() {
                route.queue = path_to_waypoints(&route.path);
            }
            OrderPlan::Move(route)
        }
        OrderType::Patrol => {
            let dest = Tile::from_world(order.target.point()?);
            let mut state = match previous {
                Some(OrderPlan::Patrol(state)) => state,
                _ => PatrolState::default(),
            };
            if state.route.path.is_empty() {
                state.route.path = plan_path(map, &order.id, start, dest);
            }
            if state.route.queue.is_empty() {
                state.route.queue = path_to_waypoints(&state.route.path);
                state.forward_queue = state.route.queue.clone();
                let origin = *state.origin.get_or_insert(start);
                if state.return_path.is_empty() {
                    state.return_path = find_path(map, dest, origin).unwrap_or_else(|| {
                        let mut reversed = state.route.path.clone();
                        reversed.reverse();
                        reversed
                    });
                }
                if state.return_queue.is_empty() {
                    state.return_queue = path_to_waypoints(&state.return_path);
                }
            }
            OrderPlan::Patrol(state)
        }
    };
    Some(order.metadata.insert(plan))
}

// ---------------------------------------------------------------------------
// Order steps
// ---------------------------------------------------------------------------

fn patrol_step(
    state: &mut PatrolState,
    body: &mut Body<'_>,
    ctx: &ExecContext<'_>,
    dt: f64,
) -> Option<OrderOutcome> {
    if body.follow(&mut state.route, ctx, dt) == Leg::Underway {
        return None;
    }
    let next = match state.direction {
        PatrolDirection::Forward => &state.return_queue,
        PatrolDirection::Return => &state.forward_queue,
    };
    if next.is_empty() {
        return Some(OrderOutcome::Completed);
    }
    state.route.queue = next.clone();
    state.route.index = 0;
    state.direction = state.direction.flipped();
    None
}

fn escort_step(
    state: &mut EscortState,
    anchor: Option<Vec2>,
    body: &mut Body<'_>,
    ctx: &ExecContext<'_>,
    dt: f64,
) -> Option<OrderOutcome> {
    let Some(anchor) = anchor else {
        return Some(OrderOutcome::EscortLost);
    };
    let trail = Vec2::from_angle(ctx.tuning.escort_bearing) * ctx.tuning.escort_distance;
    let station = anchor - trail;
    state.station = Some(station);
    body.move_towards(station, ctx, dt);
    None
}

/// Advance one unit by `dt`. `anchor` is the current position of the unit's
/// escort target, if it still exists.
pub fn advance_unit(
    unit: &mut Unit,
    anchor: Option<Vec2>,
    ctx: &ExecContext<'_>,
    dt: f64,
) -> Option<OrderResolution> {
    let start = Tile::from_world(unit.position);
    let id = unit.id;
    let Unit {
        hull,
        position,
        velocity,
        orders,
        ..
    } = unit;
    let mut body = Body {
        def: hull.def(),
        position,
        velocity,
    };

    let Some(head) = orders.front_mut() else {
        body.coast(ctx, dt);
        return None;
    };

    let outcome = match ensure_plan(&mut head.order, start, ctx.map) {
        Some(OrderPlan::Move(route)) => match body.follow(route, ctx, dt) {
            Leg::Underway => None,
            Leg::Finished => Some(OrderOutcome::Completed),
        },
        Some(OrderPlan::Patrol(state)) => patrol_step(state, &mut body, ctx, dt),
        Some(OrderPlan::Escort(state)) => escort_step(state, anchor, &mut body, ctx, dt),
        None => Some(OrderOutcome::InvalidTarget),
    }?;

    let order = orders.pop_front()?.order.id;
    debug!(
        target: "seelines::orders",
        unit = %id,
        order = %order,
        outcome = ?outcome,
        "order.resolved"
    );
    Some(OrderResolution {
        unit: id,
        order,
        outcome,
    })
}

/// Advance every unit in id order. Escort anchors are read just before
/// each unit moves, so an escort sees its target's already-updated
/// position when the target has a lower id.
pub fn advance_units(
    units: &mut BTreeMap<UnitId, Unit>,
    ctx: &ExecContext<'_>,
    dt: f64,
) -> Vec<OrderResolution> {
    let ids: Vec<UnitId> = units.keys().copied().collect();
    let mut resolved = Vec::new();
    for id in ids {
        let anchor = units
            .get(&id)
            .and_then(|unit| unit.escort_target)
            .and_then(|target| units.get(&target))
            .map(|target| target.position);
        let Some(unit) = units.get_mut(&id) else {
            continue;
        };
        resolved.extend(advance_unit(unit, anchor, ctx, dt));
    }
    resolved
}
