//! Structure and hull production.
//!
//! A request is validated against the island, the faction's credits and,
//! for hulls, the shipyard and the faction's supply headroom. Validation is
//! pure: [`quote_building`] and [`quote_ship`] only price the request and
//! return the [`Project`] that would be queued. The engine deducts the cost
//! and inserts the project once a quote succeeds.
//!
//! Projects count down in real seconds and complete in submission order.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use thiserror::Error;

use crate::catalog::{BuildingType, HullType};
use crate::config::ProductionTuning;
use crate::economy::Treasury;
use crate::fixed::{Fixed64, fixed64_to_f64};
use crate::id::{IslandId, ProjectId};
use crate::logistics::Logistics;
use crate::unit::Faction;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a production request was turned down. Rejections never change state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProductionError {
    #[error("Island not available")]
    UnknownIsland,
    #[error("Island is not under your control")]
    NotOwner,
    #[error("Structure cannot be constructed")]
    NotConstructible,
    #[error("Structure already at max tier")]
    MaxTier,
    #[error("Construction already in progress")]
    AlreadyQueued,
    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: f64, available: f64 },
    #[error("Requires an operational shipyard")]
    NoShipyard,
    #[error("Requires Shipyard Tier {required}")]
    ShipyardTierTooLow { required: u8, available: u8 },
    #[error("Insufficient supply capacity")]
    InsufficientSupply { required: f64, available: f64 },
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProjectKind {
    Building { building: BuildingType, tier: u8 },
    Ship { hull: HullType },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub island: IslandId,
    pub owner: Faction,
    pub kind: ProjectKind,
    /// Seconds left.
    pub remaining: f64,
    /// Seconds at submission.
    pub total: f64,
    pub cost: Fixed64,
}

impl Project {
    /// Completion fraction in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.total).clamp(0.0, 1.0)
    }
}

/// Active projects of both factions, kept in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionQueue {
    projects: SlotMap<ProjectId, Project>,
    order: Vec<ProjectId>,
}

impl ProductionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, project: Project) -> ProjectId {
        let id = self.projects.insert(project);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Projects in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (ProjectId, &Project)> {
        self.order
            .iter()
            .filter_map(|&id| self.projects.get(id).map(|project| (id, project)))
    }

    /// Whether `building` is already being built on `island`.
    pub fn is_queued(&self, island: IslandId, building: BuildingType) -> bool {
        self.projects.values().any(|project| {
            project.island == island
                && matches!(project.kind, ProjectKind::Building { building: b, .. } if b == building)
        })
    }

    /// Supply cost of the hulls `faction` has in production.
    pub fn queued_supply(&self, faction: Faction) -> u32 {
        self.projects
            .values()
            .filter(|project| project.owner == faction)
            .map(|project| match project.kind {
                ProjectKind::Ship { hull } => hull.def().supply_cost,
                ProjectKind::Building { .. } => 0,
            })
            .sum()
    }

    /// Count every project down by `seconds` and remove the finished ones,
    /// returned in submission order.
    pub fn advance(&mut self, seconds: f64) -> Vec<(ProjectId, Project)> {
        if seconds.is_nan() || seconds <= 0.0 {
            return Vec::new();
        }
        for project in self.projects.values_mut() {
            project.remaining = (project.remaining - seconds).max(0.0);
        }
        let (done, pending): (Vec<ProjectId>, Vec<ProjectId>) = self
            .order
            .iter()
            .copied()
            .partition(|&id| self.projects.get(id).is_none_or(|p| p.remaining <= 0.0));
        self.order = pending;
        done.into_iter()
            .filter_map(|id| self.projects.remove(id).map(|project| (id, project)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

fn check_credits(treasury: &Treasury, faction: Faction, cost: Fixed64) -> Result<(), ProductionError> {
    if treasury.can_afford(faction, cost) {
        Ok(())
    } else {
        Err(ProductionError::InsufficientCredits {
            required: fixed64_to_f64(cost),
            available: treasury.credits_f64(faction),
        })
    }
}

/// Price a structure build or upgrade on `island` for `owner`.
///
/// A new structure is built at tier 1 at catalog cost. An upgrade targets
/// the next tier and scales cost and time by that tier.
pub fn quote_building(
    logistics: &Logistics,
    queue: &ProductionQueue,
    treasury: &Treasury,
    tuning: &ProductionTuning,
    island: IslandId,
    building: BuildingType,
    owner: Faction,
) -> Result<Project, ProductionError> {
    let state = logistics.island(island).ok_or(ProductionError::UnknownIsland)?;
    if state.owner.faction() != Some(owner) {
        return Err(ProductionError::NotOwner);
    }
    let def = building.def();
    if !def.is_constructible() {
        return Err(ProductionError::NotConstructible);
    }
    let current = state.building(building).map(|b| b.tier);
    let current_tier = current.unwrap_or(0);
    if current_tier >= def.max_tier {
        return Err(ProductionError::MaxTier);
    }
    if queue.is_queued(island, building) {
        return Err(ProductionError::AlreadyQueued);
    }

    let tier = if current_tier == 0 {
        1
    } else {
        (current_tier + 1).min(def.max_tier)
    };
    let multiplier = if current.is_some() { u32::from(tier) } else { 1 };
    let cost = Fixed64::from_num(def.build_cost.saturating_mul(multiplier));
    check_credits(treasury, owner, cost)?;

    let time = (def.build_time * f64::from(multiplier)).max(tuning.min_building_time);
    Ok(Project {
        island,
        owner,
        kind: ProjectKind::Building { building, tier },
        remaining: time,
        total: time,
        cost,
    })
}

/// Price a hull on `island` for `owner`. `supply_used` is the supply the
/// faction's fielded units already take up.
#[allow(clippy::too_many_arguments)]
pub fn quote_ship(
    logistics: &Logistics,
    queue: &ProductionQueue,
    treasury: &Treasury,
    tuning: &ProductionTuning,
    island: IslandId,
    hull: HullType,
    owner: Faction,
    supply_used: u32,
) -> Result<Project, ProductionError> {
    let state = logistics.island(island).ok_or(ProductionError::UnknownIsland)?;
    if state.owner.faction() != Some(owner) {
        return Err(ProductionError::NotOwner);
    }
    let def = hull.def();
    let yard = state.shipyard_tier();
    if yard == 0 {
        return Err(ProductionError::NoShipyard);
    }
    if def.production_tier > yard {
        return Err(ProductionError::ShipyardTierTooLow {
            required: def.production_tier,
            available: yard,
        });
    }
    let cost = Fixed64::from_num(def.build_cost);
    check_credits(treasury, owner, cost)?;

    let required =
        f64::from(supply_used) + f64::from(queue.queued_supply(owner)) + f64::from(def.supply_cost);
    let available = logistics.supply_capacity(owner);
    if required > available {
        return Err(ProductionError::InsufficientSupply {
            required,
            available,
        });
    }

    let time = def.build_time.max(tuning.min_ship_time);
    Ok(Project {
        island,
        owner,
        kind: ProjectKind::Ship { hull },
        remaining: time,
        total: time,
        cost,
    })
}
