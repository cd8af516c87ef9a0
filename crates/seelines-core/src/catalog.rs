//! Fixed hull and structure catalogs.
//!
//! Definitions are compile-time constants; lookups hand out `&'static`
//! references so nothing in the simulation clones catalog rows.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Hulls
// ---------------------------------------------------------------------------

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
pub enum HullType {
    Sloop,
    Corvette,
    Transport,
    Frigate,
    Submarine,
    ArtilleryBarge,
    Destroyer,
    Cruiser,
    EscortCarrier,
    MarineDetachment,
    DecoyFloat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HullRole {
    Scout,
    Escort,
    Transport,
    Line,
    Siege,
    Capital,
    Support,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullDef {
    pub hull: HullType,
    pub display_name: &'static str,
    pub role: HullRole,
    /// Tiles per second.
    pub max_speed: f64,
    pub vision_range: f64,
    pub hitpoints: u32,
    /// Tiles per second squared.
    pub acceleration: f64,
    pub supply_cost: u32,
    /// Seconds.
    pub build_time: f64,
    pub build_cost: u32,
    /// Minimum shipyard tier able to produce this hull.
    pub production_tier: u8,
}

impl HullType {
    pub const ALL: [HullType; 11] = [
        HullType::Sloop,
        HullType::Corvette,
        HullType::Transport,
        HullType::Frigate,
        HullType::Submarine,
        HullType::ArtilleryBarge,
        HullType::Destroyer,
        HullType::Cruiser,
        HullType::EscortCarrier,
        HullType::MarineDetachment,
        HullType::DecoyFloat,
    ];

    pub fn def(self) -> &'static HullDef {
        match self {
            HullType::Sloop => &SLOOP,
            HullType::Corvette => &CORVETTE,
            HullType::Transport => &TRANSPORT,
            HullType::Frigate => &FRIGATE,
            HullType::Submarine => &SUBMARINE,
            HullType::ArtilleryBarge => &ARTILLERY_BARGE,
            HullType::Destroyer => &DESTROYER,
            HullType::Cruiser => &CRUISER,
            HullType::EscortCarrier => &ESCORT_CARRIER,
            HullType::MarineDetachment => &MARINE_DETACHMENT,
            HullType::DecoyFloat => &DECOY_FLOAT,
        }
    }
}

macro_rules! hull {
    ($name:ident, $hull:ident, $display:literal, $role:ident, speed: $speed:literal,
     vision: $vision:literal, hp: $hp:literal, accel: $accel:literal, supply: $supply:literal,
     time: $time:literal, cost: $cost:literal, tier: $tier:literal) => {
        const $name: HullDef = HullDef {
            hull: HullType::$hull,
            display_name: $display,
            role: HullRole::$role,
            max_speed: $speed,
            vision_range: $vision,
            hitpoints: $hp,
            acceleration: $accel,
            supply_cost: $supply,
            build_time: $time,
            build_cost: $cost,
            production_tier: $tier,
        };
    };
}

hull!(SLOOP, Sloop, "Sloop", Scout, speed: 4.5, vision: 7.0, hp: 60, accel: 18.0, supply: 2, time: 10.0, cost: 120, tier: 1);
hull!(CORVETTE, Corvette, "Corvette", Escort, speed: 3.5, vision: 6.0, hp: 120, accel: 12.0, supply: 3, time: 14.0, cost: 220, tier: 1);
hull!(TRANSPORT, Transport, "Transport", Transport, speed: 2.75, vision: 5.0, hp: 80, accel: 10.0, supply: 2, time: 12.0, cost: 180, tier: 1);
hull!(FRIGATE, Frigate, "Frigate", Line, speed: 3.1, vision: 6.5, hp: 180, accel: 11.0, supply: 4, time: 18.0, cost: 320, tier: 2);
hull!(SUBMARINE, Submarine, "Submarine", Special, speed: 2.4, vision: 5.5, hp: 140, accel: 8.0, supply: 4, time: 20.0, cost: 360, tier: 2);
hull!(ARTILLERY_BARGE, ArtilleryBarge, "Artillery Barge", Siege, speed: 1.8, vision: 5.0, hp: 170, accel: 6.0, supply: 5, time: 22.0, cost: 410, tier: 2);
hull!(DESTROYER, Destroyer, "Destroyer", Line, speed: 3.4, vision: 6.8, hp: 260, accel: 10.0, supply: 5, time: 24.0, cost: 480, tier: 3);
hull!(CRUISER, Cruiser, "Cruiser", Capital, speed: 2.9, vision: 7.4, hp: 420, accel: 7.0, supply: 6, time: 28.0, cost: 620, tier: 3);
hull!(ESCORT_CARRIER, EscortCarrier, "Escort Carrier", Support, speed: 2.6, vision: 7.8, hp: 360, accel: 6.0, supply: 7, time: 32.0, cost: 700, tier: 3);
hull!(MARINE_DETACHMENT, MarineDetachment, "Marine Detachment", Special, speed: 2.1, vision: 4.5, hp: 65, accel: 8.0, supply: 1, time: 10.0, cost: 140, tier: 2);
hull!(DECOY_FLOAT, DecoyFloat, "Decoy Float", Special, speed: 3.2, vision: 0.0, hp: 20, accel: 14.0, supply: 1, time: 6.0, cost: 80, tier: 1);

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

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
)]
#[serde(rename_all = "camelCase")]
pub enum BuildingType {
    HqHarbor,
    Warehouse,
    PowerWind,
    PowerSolar,
    PowerWave,
    Shipyard,
    Drydock,
    TradePost,
    CoastalBattery,
    Radar,
    AirDock,
    MineDepot,
    CommsJammer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingCategory {
    Core,
    Logistics,
    Defense,
    Technology,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingDef {
    pub building: BuildingType,
    pub display_name: &'static str,
    pub category: BuildingCategory,
    /// Tier the listed effects are quoted at. Zero for pre-placed structures.
    pub base_tier: u8,
    pub supply_demand: f64,
    pub supply_capacity: f64,
    pub pressure_bonus: f64,
    /// Per tick; negative values draw from the island's reserve.
    pub power_output: f64,
    pub build_cost: u32,
    /// Seconds. Zero means the structure cannot be constructed.
    pub build_time: f64,
    /// Credits per tick.
    pub credit_yield: f64,
    pub max_tier: u8,
}

impl BuildingDef {
    pub fn is_constructible(&self) -> bool {
        self.build_time > 0.0
    }

    /// Effect multiplier for a structure standing at `tier`.
    pub fn tier_multiplier(&self, tier: u8) -> f64 {
        f64::from(tier) / f64::from(self.base_tier.max(1))
    }
}

impl BuildingType {
    pub const ALL: [BuildingType; 13] = [
        BuildingType::HqHarbor,
        BuildingType::Warehouse,
        BuildingType::PowerWind,
        BuildingType::PowerSolar,
        BuildingType::PowerWave,
        BuildingType::Shipyard,
        BuildingType::Drydock,
        BuildingType::TradePost,
        BuildingType::CoastalBattery,
        BuildingType::Radar,
        BuildingType::AirDock,
        BuildingType::MineDepot,
        BuildingType::CommsJammer,
    ];

    pub fn def(self) -> &'static BuildingDef {
        match self {
            BuildingType::HqHarbor => &HQ_HARBOR,
            BuildingType::Warehouse => &WAREHOUSE,
            BuildingType::PowerWind => &POWER_WIND,
            BuildingType::PowerSolar => &POWER_SOLAR,
            BuildingType::PowerWave => &POWER_WAVE,
            BuildingType::Shipyard => &SHIPYARD,
            BuildingType::Drydock => &DRYDOCK,
            BuildingType::TradePost => &TRADE_POST,
            BuildingType::CoastalBattery => &COASTAL_BATTERY,
            BuildingType::Radar => &RADAR,
            BuildingType::AirDock => &AIR_DOCK,
            BuildingType::MineDepot => &MINE_DEPOT,
            BuildingType::CommsJammer => &COMMS_JAMMER,
        }
    }
}

macro_rules! building {
    ($name:ident, $ty:ident, $display:literal, $cat:ident, base: $base:literal,
     demand: $demand:literal, capacity: $cap:literal, pressure: $pressure:literal,
     power: $power:literal, cost: $cost:literal, time: $time:literal,
     credits: $credits:literal, max: $max:literal) => {
        const $name: BuildingDef = BuildingDef {
            building: BuildingType::$ty,
            display_name: $display,
            category: BuildingCategory::$cat,
            base_tier: $base,
            supply_demand: $demand,
            supply_capacity: $cap,
            pressure_bonus: $pressure,
            power_output: $power,
            build_cost: $cost,
            build_time: $time,
            credit_yield: $credits,
            max_tier: $max,
        };
    };
}

building!(HQ_HARBOR, HqHarbor, "HQ Harbor", Core, base: 0, demand: 6.0, capacity: 28.0, pressure: 8.0, power: 4.0, cost: 0, time: 0.0, credits: 2.0, max: 1);
building!(WAREHOUSE, Warehouse, "Warehouse", Logistics, base: 1, demand: 2.0, capacity: 18.0, pressure: 12.0, power: 0.0, cost: 220, time: 20.0, credits: 0.0, max: 3);
building!(POWER_WIND, PowerWind, "Wind Turbine", Core, base: 1, demand: 1.0, capacity: 4.0, pressure: 3.0, power: 12.0, cost: 160, time: 16.0, credits: 0.0, max: 2);
building!(POWER_SOLAR, PowerSolar, "Solar Array", Core, base: 1, demand: 1.0, capacity: 3.0, pressure: 2.0, power: 10.0, cost: 150, time: 14.0, credits: 0.0, max: 2);
building!(POWER_WAVE, PowerWave, "Wave Generator", Core, base: 1, demand: 2.0, capacity: 6.0, pressure: 4.0, power: 16.0, cost: 260, time: 24.0, credits: 0.0, max: 2);
building!(SHIPYARD, Shipyard, "Shipyard", Logistics, base: 1, demand: 5.0, capacity: 15.0, pressure: 10.0, power: -4.0, cost: 320, time: 28.0, credits: 0.0, max: 3);
building!(DRYDOCK, Drydock, "Drydock", Logistics, base: 1, demand: 3.0, capacity: 8.0, pressure: 6.0, power: -2.0, cost: 210, time: 18.0, credits: 0.0, max: 2);
building!(TRADE_POST, TradePost, "Trade Post", Logistics, base: 1, demand: 2.0, capacity: 4.0, pressure: 8.0, power: 1.0, cost: 280, time: 26.0, credits: 6.0, max: 2);
building!(COASTAL_BATTERY, CoastalBattery, "Coastal Battery", Defense, base: 1, demand: 4.0, capacity: 2.0, pressure: 5.0, power: -3.0, cost: 240, time: 24.0, credits: 0.0, max: 2);
building!(RADAR, Radar, "Radar Station", Technology, base: 1, demand: 2.0, capacity: 3.0, pressure: 7.0, power: -1.0, cost: 220, time: 18.0, credits: 0.0, max: 2);
building!(AIR_DOCK, AirDock, "Air Dock", Technology, base: 2, demand: 4.0, capacity: 6.0, pressure: 11.0, power: -4.0, cost: 360, time: 30.0, credits: 0.0, max: 2);
building!(MINE_DEPOT, MineDepot, "Mine Depot", Defense, base: 2, demand: 3.0, capacity: 2.0, pressure: 6.0, power: -2.0, cost: 300, time: 28.0, credits: 0.0, max: 2);
building!(COMMS_JAMMER, CommsJammer, "Comms Jammer", Technology, base: 2, demand: 3.0, capacity: 2.0, pressure: 9.0, power: -3.0, cost: 320, time: 28.0, credits: 0.0, max: 2);
