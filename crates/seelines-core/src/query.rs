//! Read-only views for the HUD, the renderer and the computer opponent.
//!
//! All types are owned copies; nothing here borrows from the world.

use serde::Serialize;

use crate::catalog::{BuildingType, HullType};
use crate::geometry::{Vec2, sample_polyline};
use crate::id::{ConvoyId, IslandId, ProjectId, StormId};
use crate::logistics::Logistics;
use crate::production::ProjectKind;
use crate::unit::{Faction, Owner};
use crate::world::World;

// ---------------------------------------------------------------------------
// Strategic overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandSummary {
    pub id: IslandId,
    pub key: String,
    pub name: String,
    pub pressure: f64,
    pub target_pressure: f64,
    pub supply: f64,
    pub supply_capacity: f64,
    pub demand: f64,
    pub power_reserve: f64,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvoySummary {
    pub id: ConvoyId,
    pub key: String,
    pub origin: IslandId,
    pub destination: IslandId,
    /// Fraction of the lane covered, in `[0, 1)`.
    pub progress: f64,
    pub disrupted: bool,
    pub weather_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingProjectSummary {
    #[serde(skip)]
    pub id: ProjectId,
    pub island: IslandId,
    pub building: BuildingType,
    pub tier: u8,
    pub progress: f64,
    /// Seconds left.
    pub eta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipProjectSummary {
    #[serde(skip)]
    pub id: ProjectId,
    pub island: IslandId,
    pub hull: HullType,
    pub progress: f64,
    pub eta: f64,
}

/// One faction's economic picture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicOverview {
    pub faction: Faction,
    pub credits: f64,
    pub supply_capacity: f64,
    pub supply_used: u32,
    pub supply_queued: u32,
    /// Owned islands, lowest pressure first.
    pub islands: Vec<IslandSummary>,
    pub convoys: Vec<ConvoySummary>,
    pub building_queue: Vec<BuildingProjectSummary>,
    pub ship_queue: Vec<ShipProjectSummary>,
}

pub fn strategic_overview(world: &World, faction: Faction) -> StrategicOverview {
    let logistics = &world.logistics;

    let mut islands: Vec<IslandSummary> = logistics
        .islands()
        .iter()
        .filter(|island| island.owner.faction() == Some(faction))
        .map(|island| IslandSummary {
            id: island.id,
            key: island.key.clone(),
            name: island.name.clone(),
            pressure: island.pressure,
            target_pressure: island.target_pressure,
            supply: island.supply,
            supply_capacity: island.supply_capacity,
            demand: island.demand,
            power_reserve: island.power_reserve,
            critical: island.critical,
        })
        .collect();
    islands.sort_by(|a, b| a.pressure.total_cmp(&b.pressure));

    let convoys = logistics
        .convoys()
        .iter()
        .filter(|convoy| convoy.owner == faction)
        .map(|convoy| ConvoySummary {
            id: convoy.id,
            key: convoy.key.clone(),
            origin: convoy.origin,
            destination: convoy.destination,
            progress: if convoy.length > 0.0 {
                convoy.progress / convoy.length
            } else {
                0.0
            },
            disrupted: convoy.disrupted,
            weather_penalty: convoy.weather_penalty,
        })
        .collect();

    let mut building_queue = Vec::new();
    let mut ship_queue = Vec::new();
    for (id, project) in world.production.iter() {
        if project.owner != faction {
            continue;
        }
        match project.kind {
            ProjectKind::Building { building, tier } => {
                building_queue.push(BuildingProjectSummary {
                    id,
                    island: project.island,
                    building,
                    tier,
                    progress: project.progress(),
                    eta: project.remaining,
                })
            }
            ProjectKind::Ship { hull } => ship_queue.push(ShipProjectSummary {
                id,
                island: project.island,
                hull,
                progress: project.progress(),
                eta: project.remaining,
            }),
        }
    }

    StrategicOverview {
        faction,
        credits: world.treasury.credits_f64(faction),
        supply_capacity: logistics.supply_capacity(faction),
        supply_used: world.supply_used(faction),
        supply_queued: world.production.queued_supply(faction),
        islands,
        convoys,
        building_queue,
        ship_queue,
    }
}

// ---------------------------------------------------------------------------
// Renderable logistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvoyMarker {
    pub id: ConvoyId,
    pub owner: Faction,
    pub lane: Vec<Vec2>,
    /// Current point along the lane.
    pub position: Vec2,
    pub disrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormMarker {
    pub id: StormId,
    pub center: Vec2,
    pub radius: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandMarker {
    pub id: IslandId,
    pub owner: Owner,
    pub position: Vec2,
    pub pressure: f64,
    pub critical: bool,
}

/// What the map layer draws: lanes with convoy positions, storm circles and
/// island markers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderableLogistics {
    pub convoys: Vec<ConvoyMarker>,
    pub storms: Vec<StormMarker>,
    pub islands: Vec<IslandMarker>,
}

pub fn renderable_logistics(logistics: &Logistics) -> RenderableLogistics {
    RenderableLogistics {
        convoys: logistics
            .convoys()
            .iter()
            .map(|convoy| ConvoyMarker {
                id: convoy.id,
                owner: convoy.owner,
                lane: convoy.lane.clone(),
                position: sample_polyline(&convoy.lane, convoy.progress, convoy.length),
                disrupted: convoy.disrupted,
            })
            .collect(),
        storms: logistics
            .storms()
            .iter()
            .map(|storm| StormMarker {
                id: storm.id,
                center: storm.center,
                radius: storm.radius,
                intensity: storm.intensity,
            })
            .collect(),
        islands: logistics
            .islands()
            .iter()
            .map(|island| IslandMarker {
                id: island.id,
                owner: island.owner,
                position: island.position,
                pressure: island.pressure,
                critical: island.critical,
            })
            .collect(),
    }
}
