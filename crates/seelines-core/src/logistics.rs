//! Territorial logistics: islands, supply convoys and storms.
//!
//! Each step runs three passes in order:
//!
//! 1. **Storms** drift and reverse course when their timer runs out.
//! 2. **Convoys** check their lanes for hostiles and storms, advance along
//!    the lane, and settle one delivery per completed lap.
//! 3. **Islands** fold their structures into capacity, demand and bonuses,
//!    take convoy inflow, and ease pressure toward its target.
//!
//! Islands are addressed by [`IslandId`], which is the island's position in
//! the preset. Presets refer to islands by string key; keys are resolved
//! once when the preset is loaded.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::BuildingType;
use crate::config::LogisticsTuning;
use crate::economy::Treasury;
use crate::event::{EventLog, GameEvent};
use crate::geometry::{Vec2, clamp, distance_to_polyline, polyline_length};
use crate::id::{ConvoyId, IslandId, StormId, UnitId};
use crate::map::GridMap;
use crate::rng::SimRng;
use crate::unit::{Faction, Owner, Unit};

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// A structure standing on an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingState {
    #[serde(rename = "type")]
    pub building: BuildingType,
    pub tier: u8,
}

impl BuildingState {
    pub fn new(building: BuildingType, tier: u8) -> Self {
        Self { building, tier }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandSpec {
    pub key: String,
    pub name: String,
    pub owner: Owner,
    pub position: Vec2,
    pub base_demand: f64,
    pub base_capacity: f64,
    pub initial_pressure: f64,
    pub storage: f64,
    #[serde(default)]
    pub buildings: Vec<BuildingState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvoySpec {
    pub key: String,
    pub owner: Faction,
    /// Island key.
    pub origin: String,
    /// Island key.
    pub destination: String,
    pub lane: Vec<Vec2>,
    pub throughput: f64,
    pub speed: f64,
    pub resilience: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StormSpec {
    pub key: String,
    pub center: Vec2,
    pub radius: f64,
    pub intensity: f64,
    pub velocity: Vec2,
    /// Ticks between course reversals.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogisticsPreset {
    pub islands: Vec<IslandSpec>,
    #[serde(default)]
    pub convoys: Vec<ConvoySpec>,
    #[serde(default)]
    pub storms: Vec<StormSpec>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresetError {
    #[error("duplicate island key {0:?}")]
    DuplicateIsland(String),
    #[error("convoy {convoy:?} references unknown island {island:?}")]
    UnknownIsland { convoy: String, island: String },
    #[error("convoy {0:?} has an empty lane")]
    EmptyLane(String),
    #[error("island {island:?} at ({x}, {y}) lies outside the {width}x{height} map")]
    IslandOutsideMap {
        island: String,
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },
    #[error("island {island:?} has {building:?} at tier {tier}, allowed 1..={max}")]
    InvalidTier {
        island: String,
        building: BuildingType,
        tier: u8,
        max: u8,
    },
}

fn lane(points: &[(f64, f64)]) -> Vec<Vec2> {
    points.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

fn buildings(entries: &[(BuildingType, u8)]) -> Vec<BuildingState> {
    entries
        .iter()
        .map(|&(building, tier)| BuildingState::new(building, tier))
        .collect()
}

impl LogisticsPreset {
    /// The default skirmish: two headquarters, two forward posts, a neutral
    /// trading atoll, four lanes and two storms.
    pub fn skirmish() -> Self {
        use BuildingType::*;

        let islands = vec![
            IslandSpec {
                key: "blue-hq".into(),
                name: "Blue Anchorage".into(),
                owner: Owner::Player,
                position: Vec2::new(4.0, 14.5),
                base_demand: 12.0,
                base_capacity: 38.0,
                initial_pressure: 68.0,
                storage: 60.0,
                buildings: buildings(&[(HqHarbor, 1), (Warehouse, 2), (PowerWind, 1), (Shipyard, 1)]),
            },
            IslandSpec {
                key: "blue-forward".into(),
                name: "Seaglass Outpost".into(),
                owner: Owner::Player,
                position: Vec2::new(9.5, 9.5),
                base_demand: 9.0,
                base_capacity: 24.0,
                initial_pressure: 52.0,
                storage: 36.0,
                buildings: buildings(&[(Warehouse, 1), (CoastalBattery, 1), (PowerSolar, 1)]),
            },
            IslandSpec {
                key: "trade-atoll".into(),
                name: "Trader's Cay".into(),
                owner: Owner::Neutral,
                position: Vec2::new(12.0, 4.0),
                base_demand: 7.0,
                base_capacity: 18.0,
                initial_pressure: 40.0,
                storage: 28.0,
                buildings: buildings(&[(TradePost, 1), (PowerSolar, 1)]),
            },
            IslandSpec {
                key: "red-hq".into(),
                name: "Crimson Pier".into(),
                owner: Owner::Computer,
                position: Vec2::new(20.0, 5.0),
                base_demand: 13.0,
                base_capacity: 38.0,
                initial_pressure: 65.0,
                storage: 60.0,
                buildings: buildings(&[(HqHarbor, 1), (Warehouse, 2), (PowerWave, 1), (Shipyard, 1)]),
            },
            IslandSpec {
                key: "red-forward".into(),
                name: "Stormgate Battery".into(),
                owner: Owner::Computer,
                position: Vec2::new(16.5, 10.5),
                base_demand: 10.0,
                base_capacity: 26.0,
                initial_pressure: 50.0,
                storage: 40.0,
                buildings: buildings(&[(CoastalBattery, 1), (Radar, 1), (PowerWind, 1)]),
            },
        ];

        let convoys = vec![
            ConvoySpec {
                key: "blue-supply-main".into(),
                owner: Faction::Player,
                origin: "blue-hq".into(),
                destination: "blue-forward".into(),
                lane: lane(&[(4.0, 14.0), (6.0, 13.0), (7.5, 12.0), (8.6, 10.5), (9.4, 9.6)]),
                throughput: 4.5,
                speed: 1.4,
                resilience: 0.65,
            },
            ConvoySpec {
                key: "blue-trade".into(),
                owner: Faction::Player,
                origin: "blue-forward".into(),
                destination: "trade-atoll".into(),
                lane: lane(&[(9.4, 9.6), (10.5, 8.1), (11.5, 6.5), (12.0, 4.5)]),
                throughput: 2.2,
                speed: 1.2,
                resilience: 0.45,
            },
            ConvoySpec {
                key: "red-supply-main".into(),
                owner: Faction::Computer,
                origin: "red-hq".into(),
                destination: "red-forward".into(),
                lane: lane(&[(20.0, 5.0), (18.7, 6.8), (17.4, 8.6), (16.6, 9.9)]),
                throughput: 4.2,
                speed: 1.35,
                resilience: 0.65,
            },
            ConvoySpec {
                key: "red-trade".into(),
                owner: Faction::Computer,
                origin: "red-forward".into(),
                destination: "trade-atoll".into(),
                lane: lane(&[(16.6, 9.9), (15.2, 8.5), (13.8, 6.8), (12.0, 4.5)]),
                throughput: 2.1,
                speed: 1.15,
                resilience: 0.45,
            },
        ];

        let storms = vec![
            StormSpec {
                key: "squall-east".into(),
                center: Vec2::new(14.0, 7.0),
                radius: 2.8,
                intensity: 0.55,
                velocity: Vec2::new(-0.12, 0.04),
                duration: 32.0,
            },
            StormSpec {
                key: "gale-west".into(),
                center: Vec2::new(6.0, 11.0),
                radius: 2.2,
                intensity: 0.48,
                velocity: Vec2::new(0.09, -0.06),
                duration: 28.0,
            },
        ];

        Self {
            islands,
            convoys,
            storms,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Island {
    pub id: IslandId,
    pub key: String,
    pub name: String,
    pub owner: Owner,
    pub position: Vec2,
    pub base_demand: f64,
    pub base_capacity: f64,
    pub storage: f64,
    pub buildings: Vec<BuildingState>,
    /// Always within `[pressure_min, pressure_max]`.
    pub pressure: f64,
    pub target_pressure: f64,
    /// Target minus current pressure before the last easing step.
    pub last_pressure_delta: f64,
    /// Always within `[0, supply_capacity]`.
    pub supply: f64,
    pub supply_capacity: f64,
    pub demand: f64,
    pub power_reserve: f64,
    /// Latched while the island is in the critical band.
    pub critical: bool,
}

impl Island {
    pub fn building(&self, building: BuildingType) -> Option<&BuildingState> {
        self.buildings.iter().find(|b| b.building == building)
    }

    /// Highest shipyard tier on the island, 0 without a shipyard.
    pub fn shipyard_tier(&self) -> u8 {
        self.buildings
            .iter()
            .filter(|b| b.building == BuildingType::Shipyard)
            .map(|b| b.tier)
            .max()
            .unwrap_or(0)
    }

    /// Set `building` to `tier`, adding it if absent.
    pub fn set_building_tier(&mut self, building: BuildingType, tier: u8) {
        match self.buildings.iter_mut().find(|b| b.building == building) {
            Some(existing) => existing.tier = tier,
            None => self.buildings.push(BuildingState::new(building, tier)),
        }
    }

    fn effects(&self) -> BuildingEffects {
        self.buildings
            .iter()
            .fold(BuildingEffects::default(), |mut acc, state| {
                let def = state.building.def();
                let mult = def.tier_multiplier(state.tier);
                acc.demand += def.supply_demand * mult;
                acc.capacity += def.supply_capacity * mult;
                acc.pressure += def.pressure_bonus * mult;
                acc.power += def.power_output * mult;
                acc.income += def.credit_yield * mult;
                acc
            })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BuildingEffects {
    demand: f64,
    capacity: f64,
    pressure: f64,
    power: f64,
    income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Convoy {
    pub id: ConvoyId,
    pub key: String,
    pub owner: Faction,
    pub origin: IslandId,
    pub destination: IslandId,
    pub lane: Vec<Vec2>,
    pub length: f64,
    pub throughput: f64,
    pub speed: f64,
    pub resilience: f64,
    /// Distance along the lane, in `[0, length)`.
    pub progress: f64,
    pub disrupted: bool,
    /// Multiplicative storm slowdown, in `[weather_floor, 1]`.
    pub weather_penalty: f64,
    /// Completed laps never settled because a single step exceeded
    /// `max_laps_per_step`.
    #[serde(default)]
    pub laps_skipped: u64,
}

impl Convoy {
    /// Supply this convoy feeds its destination per tick.
    pub fn inflow(&self, tuning: &LogisticsTuning) -> f64 {
        let throughput = if self.disrupted {
            self.throughput * tuning.disrupted_inflow_factor
        } else {
            self.throughput
        };
        throughput * self.weather_penalty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storm {
    pub id: StormId,
    pub key: String,
    pub center: Vec2,
    pub radius: f64,
    pub intensity: f64,
    pub velocity: Vec2,
    pub duration: f64,
    pub remaining: f64,
}

// ---------------------------------------------------------------------------
// Logistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logistics {
    islands: Vec<Island>,
    convoys: Vec<Convoy>,
    storms: Vec<Storm>,
}

impl Logistics {
    /// Instantiate a preset on `map`. Convoys start at a random phase along
    /// their lane.
    pub fn from_preset(
        preset: &LogisticsPreset,
        map: &GridMap,
        tuning: &LogisticsTuning,
        rng: &mut SimRng,
    ) -> Result<Self, PresetError> {
        let mut keys: HashMap<&str, IslandId> = HashMap::new();
        let mut islands = Vec::with_capacity(preset.islands.len());

        for (index, entry) in preset.islands.iter().enumerate() {
            let id = IslandId(index as u32);
            if keys.insert(entry.key.as_str(), id).is_some() {
                return Err(PresetError::DuplicateIsland(entry.key.clone()));
            }
            let (width, height) = (f64::from(map.width()), f64::from(map.height()));
            let inside = (0.0..=width).contains(&entry.position.x)
                && (0.0..=height).contains(&entry.position.y);
            if !inside {
                return Err(PresetError::IslandOutsideMap {
                    island: entry.key.clone(),
                    x: entry.position.x,
                    y: entry.position.y,
                    width: map.width(),
                    height: map.height(),
                });
            }
            for state in &entry.buildings {
                let max = state.building.def().max_tier;
                if state.tier == 0 || state.tier > max {
                    return Err(PresetError::InvalidTier {
                        island: entry.key.clone(),
                        building: state.building,
                        tier: state.tier,
                        max,
                    });
                }
            }

            let mut island = Island {
                id,
                key: entry.key.clone(),
                name: entry.name.clone(),
                owner: entry.owner,
                position: entry.position,
                base_demand: entry.base_demand,
                base_capacity: entry.base_capacity,
                storage: entry.storage,
                buildings: entry.buildings.clone(),
                pressure: clamp(entry.initial_pressure, tuning.pressure_min, tuning.pressure_max),
                target_pressure: entry.initial_pressure,
                last_pressure_delta: 0.0,
                supply: entry.storage * tuning.initial_supply,
                supply_capacity: entry.base_capacity,
                demand: entry.base_demand,
                power_reserve: entry.base_capacity * tuning.initial_power_reserve,
                critical: false,
            };
            let effects = island.effects();
            island.supply_capacity = (island.base_capacity + effects.capacity).max(0.0);
            island.demand = island.base_demand + effects.demand;
            island.supply = clamp(island.supply, 0.0, island.supply_capacity);
            islands.push(island);
        }

        let resolve = |convoy: &ConvoySpec, key: &str| {
            keys.get(key).copied().ok_or_else(|| PresetError::UnknownIsland {
                convoy: convoy.key.clone(),
                island: key.to_string(),
            })
        };

        let mut convoys = Vec::with_capacity(preset.convoys.len());
        for (index, entry) in preset.convoys.iter().enumerate() {
            if entry.lane.is_empty() {
                return Err(PresetError::EmptyLane(entry.key.clone()));
            }
            let origin = resolve(entry, &entry.origin)?;
            let destination = resolve(entry, &entry.destination)?;
            let length = polyline_length(&entry.lane);
            let mut progress = rng.next_f64() * length;
            if progress >= length {
                progress = 0.0;
            }
            convoys.push(Convoy {
                id: ConvoyId(index as u32),
                key: entry.key.clone(),
                owner: entry.owner,
                origin,
                destination,
                lane: entry.lane.clone(),
                length,
                throughput: entry.throughput,
                speed: entry.speed,
                resilience: entry.resilience,
                progress,
                disrupted: false,
                weather_penalty: 1.0,
                laps_skipped: 0,
            });
        }

        let storms = preset
            .storms
            .iter()
            .enumerate()
            .map(|(index, entry)| Storm {
                id: StormId(index as u32),
                key: entry.key.clone(),
                center: entry.center,
                radius: entry.radius,
                intensity: entry.intensity,
                velocity: entry.velocity,
                duration: entry.duration,
                remaining: entry.duration,
            })
            .collect();

        Ok(Self {
            islands,
            convoys,
            storms,
        })
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn convoys(&self) -> &[Convoy] {
        &self.convoys
    }

    pub fn storms(&self) -> &[Storm] {
        &self.storms
    }

    pub fn island(&self, id: IslandId) -> Option<&Island> {
        self.islands.get(id.0 as usize)
    }

    pub fn island_mut(&mut self, id: IslandId) -> Option<&mut Island> {
        self.islands.get_mut(id.0 as usize)
    }

    pub fn island_by_key(&self, key: &str) -> Option<&Island> {
        self.islands.iter().find(|island| island.key == key)
    }

    pub fn convoy(&self, id: ConvoyId) -> Option<&Convoy> {
        self.convoys.get(id.0 as usize)
    }

    pub fn convoy_by_key(&self, key: &str) -> Option<&Convoy> {
        self.convoys.iter().find(|convoy| convoy.key == key)
    }

    /// First island owned by `faction`, in preset order.
    pub fn first_island(&self, faction: Faction) -> Option<IslandId> {
        self.islands
            .iter()
            .find(|island| island.owner.faction() == Some(faction))
            .map(|island| island.id)
    }

    /// Summed supply capacity of every island `faction` owns.
    pub fn supply_capacity(&self, faction: Faction) -> f64 {
        self.islands
            .iter()
            .filter(|island| island.owner.faction() == Some(faction))
            .map(|island| island.supply_capacity)
            .sum()
    }

    /// Run storms, convoys and islands for one step.
    pub fn advance(
        &mut self,
        map: &GridMap,
        units: &BTreeMap<UnitId, Unit>,
        tuning: &LogisticsTuning,
        treasury: &mut Treasury,
        events: &mut EventLog,
        dt: f64,
    ) {
        self.update_storms(map, tuning, dt);
        self.update_convoys(units, tuning, treasury, events, dt);
        self.update_islands(tuning, treasury, events, dt);
    }

    pub fn update_storms(&mut self, map: &GridMap, tuning: &LogisticsTuning, dt: f64) {
        let margin = tuning.storm_margin;
        let max_x = f64::from(map.width()) - margin;
        let max_y = f64::from(map.height()) - margin;
        for storm in &mut self.storms {
            storm.center += storm.velocity * dt;
            storm.remaining -= dt;
            if storm.remaining <= 0.0 {
                storm.velocity = -storm.velocity;
                storm.remaining = storm.duration;
            }
            storm.center = Vec2::new(
                clamp(storm.center.x, margin, max_x),
                clamp(storm.center.y, margin, max_y),
            );
        }
    }

    fn weather_penalty(storms: &[Storm], lane: &[Vec2], tuning: &LogisticsTuning) -> f64 {
        let mut penalty = 1.0;
        for storm in storms {
            if storm.radius <= 0.0 {
                continue;
            }
            let distance = distance_to_polyline(lane, storm.center);
            if distance > storm.radius {
                continue;
            }
            let normalized = clamp(1.0 - distance / storm.radius, 0.0, 1.0);
            penalty *= clamp(
                1.0 - storm.intensity * normalized * tuning.storm_attenuation,
                tuning.weather_floor,
                1.0,
            );
        }
        clamp(penalty, tuning.weather_floor, 1.0)
    }

    pub fn update_convoys(
        &mut self,
        units: &BTreeMap<UnitId, Unit>,
        tuning: &LogisticsTuning,
        treasury: &mut Treasury,
        events: &mut EventLog,
        dt: f64,
    ) {
        let Logistics {
            islands,
            convoys,
            storms,
        } = self;

        for convoy in convoys.iter_mut() {
            let was_disrupted = convoy.disrupted;
            convoy.disrupted = units.values().any(|unit| {
                unit.owner != convoy.owner
                    && distance_to_polyline(&convoy.lane, unit.position)
                        < tuning.interception_radius
            });
            convoy.weather_penalty = Self::weather_penalty(storms, &convoy.lane, tuning);

            let slowdown = if convoy.disrupted {
                tuning.disrupted_speed_factor
            } else {
                1.0
            };
            let advance = convoy.speed * dt * convoy.weather_penalty * slowdown;
            let traversed = convoy.progress + advance.max(0.0);

            let laps = if convoy.length > 0.0 {
                convoy.progress = traversed.rem_euclid(convoy.length);
                if convoy.progress >= convoy.length {
                    convoy.progress = 0.0;
                }
                (traversed / convoy.length).floor()
            } else {
                convoy.progress = 0.0;
                0.0
            };

            match (was_disrupted, convoy.disrupted) {
                (false, true) => {
                    info!(
                        target: "seelines::logistics",
                        convoy = %convoy.key,
                        owner = ?convoy.owner,
                        "convoy.disrupted"
                    );
                    events.emit(GameEvent::ConvoyDisrupted {
                        convoy: convoy.id,
                        owner: convoy.owner,
                    });
                }
                (true, false) => {
                    info!(
                        target: "seelines::logistics",
                        convoy = %convoy.key,
                        owner = ?convoy.owner,
                        "convoy.restored"
                    );
                    events.emit(GameEvent::ConvoyRestored {
                        convoy: convoy.id,
                        owner: convoy.owner,
                    });
                }
                _ => {}
            }

            let cap = u64::from(tuning.max_laps_per_step);
            let completed = if laps.is_finite() { laps as u64 } else { u64::MAX };
            let settled = completed.min(cap);
            if completed > settled {
                let skipped = completed - settled;
                convoy.laps_skipped = convoy.laps_skipped.saturating_add(skipped);
                warn!(
                    target: "seelines::logistics",
                    convoy = %convoy.key,
                    completed,
                    settled,
                    skipped,
                    "convoy.laps_truncated"
                );
            }
            for _ in 0..settled {
                if convoy.disrupted {
                    Self::intercepted_delivery(islands, convoy, tuning, events);
                } else {
                    Self::delivery(islands, convoy, tuning, treasury, events);
                }
            }
        }
    }

    fn delivery(
        islands: &mut [Island],
        convoy: &Convoy,
        tuning: &LogisticsTuning,
        treasury: &mut Treasury,
        events: &mut EventLog,
    ) {
        let origin = convoy.origin.0 as usize;
        let destination = convoy.destination.0 as usize;
        if origin >= islands.len() || destination >= islands.len() {
            return;
        }

        let dest = &mut islands[destination];
        dest.supply = clamp(
            dest.supply + convoy.throughput * tuning.delivery_supply,
            0.0,
            dest.supply_capacity,
        );
        dest.pressure = clamp(
            dest.pressure + convoy.throughput * tuning.delivery_pressure,
            tuning.pressure_min,
            tuning.pressure_max,
        );

        let source = &mut islands[origin];
        source.supply = clamp(
            source.supply - convoy.throughput * tuning.delivery_origin_drain,
            0.0,
            source.supply_capacity,
        );

        treasury.apply(convoy.owner, convoy.throughput * tuning.delivery_credits);
        debug!(target: "seelines::logistics", convoy = %convoy.key, "convoy.delivered");
        events.emit(GameEvent::ConvoyDelivered {
            convoy: convoy.id,
            owner: convoy.owner,
        });
    }

    fn intercepted_delivery(
        islands: &mut [Island],
        convoy: &Convoy,
        tuning: &LogisticsTuning,
        events: &mut EventLog,
    ) {
        let Some(dest) = islands.get_mut(convoy.destination.0 as usize) else {
            return;
        };
        dest.pressure = clamp(
            dest.pressure - convoy.throughput * tuning.disrupted_pressure_damage,
            tuning.pressure_min,
            tuning.pressure_max,
        );
        debug!(target: "seelines::logistics", convoy = %convoy.key, "convoy.intercepted");
        events.emit(GameEvent::ConvoyIntercepted {
            convoy: convoy.id,
            owner: convoy.owner,
        });
    }

    pub fn update_islands(
        &mut self,
        tuning: &LogisticsTuning,
        treasury: &mut Treasury,
        events: &mut EventLog,
        dt: f64,
    ) {
        let Logistics {
            islands, convoys, ..
        } = self;

        for island in islands.iter_mut() {
            let effects = island.effects();

            let capacity = (island.base_capacity + effects.capacity).max(0.0);
            island.supply_capacity = capacity;
            island.supply = clamp(island.supply, 0.0, capacity);

            island.demand = island.base_demand + effects.demand;
            island.power_reserve = clamp(
                island.power_reserve + effects.power * dt,
                0.0,
                capacity * tuning.power_reserve_cap,
            );

            let inflow: f64 = convoys
                .iter()
                .filter(|convoy| convoy.destination == island.id)
                .map(|convoy| convoy.inflow(tuning))
                .sum();

            let draw = island.demand * tuning.demand_draw;
            island.supply = clamp(island.supply + (inflow - draw) * dt, 0.0, capacity);

            let from_supply = island.supply / island.demand.max(1.0) * tuning.supply_pressure_scale;
            let from_bonuses = inflow * tuning.convoy_pressure_scale + effects.pressure;
            let desired = clamp(
                from_supply + from_bonuses,
                tuning.pressure_min,
                tuning.pressure_max,
            );
            let delta = desired - island.pressure;
            let easing = (tuning.pressure_easing * dt).min(1.0);
            island.pressure = clamp(
                island.pressure + delta * easing,
                tuning.pressure_min,
                tuning.pressure_max,
            );
            island.last_pressure_delta = delta;
            island.target_pressure = desired;

            if island.pressure < tuning.critical_threshold {
                if !island.critical {
                    island.critical = true;
                    info!(
                        target: "seelines::logistics",
                        island = %island.key,
                        pressure = island.pressure,
                        "island.critical"
                    );
                    events.emit(GameEvent::IslandCritical {
                        island: island.id,
                        owner: island.owner,
                        pressure: island.pressure,
                    });
                }
            } else if island.pressure > tuning.recovery_threshold {
                island.critical = false;
            }

            if let Some(faction) = island.owner.faction() {
                let income = effects.income * dt + inflow * tuning.convoy_credit_rate * dt;
                treasury.apply(faction, income);
            }
        }
    }
}
