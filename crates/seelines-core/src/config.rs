//! Tunable simulation constants.
//!
//! Every block implements `Default` with the skirmish values and is
//! `#[serde(default)]`, so a config file only needs to name the fields it
//! overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tick_rate must be a positive number, got {0}")]
    InvalidTickRate(f64),
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Nominal ticks per second. Hull speeds are quoted per second and
    /// divided by this to get per-tick motion.
    pub tick_rate: f64,
    /// Seed for the simulation RNG (convoy phase, ship spawn offsets).
    pub seed: u64,
    /// Credits each faction starts with.
    pub starting_credits: f64,
    pub movement: MovementTuning,
    pub logistics: LogisticsTuning,
    pub production: ProductionTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            seed: 0x5EE1_14E5,
            starting_credits: 900.0,
            movement: MovementTuning::default(),
            logistics: LogisticsTuning::default(),
            production: ProductionTuning::default(),
        }
    }
}

impl SimConfig {
    /// Reject settings the engine cannot run with. Every per-tick rate is
    /// divided by `tick_rate`, so it must be finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(ConfigError::InvalidTickRate(self.tick_rate));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Smallest arrival radius, in tiles.
    pub arrival_floor: f64,
    /// Arrival radius as a multiple of one step's travel distance.
    pub arrival_scale: f64,
    /// Idle braking as a fraction of the hull's acceleration.
    pub idle_deceleration: f64,
    /// Below this speed on both axes an idle unit is considered stopped.
    pub idle_epsilon: f64,
    /// Escort station distance behind the escorted unit.
    pub escort_distance: f64,
    /// Escort station bearing, radians. The station sits opposite this bearing.
    pub escort_bearing: f64,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            arrival_floor: 0.08,
            arrival_scale: 1.25,
            idle_deceleration: 0.75,
            idle_epsilon: 1e-4,
            escort_distance: 0.6,
            escort_bearing: std::f64::consts::FRAC_PI_4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsTuning {
    /// A hostile closer than this to a lane disrupts the convoy.
    pub interception_radius: f64,
    pub disrupted_speed_factor: f64,
    /// Share of throughput a disrupted convoy still feeds its destination.
    pub disrupted_inflow_factor: f64,
    /// Supply consumed per tick as a fraction of demand.
    pub demand_draw: f64,
    pub supply_pressure_scale: f64,
    pub convoy_pressure_scale: f64,
    /// First-order easing rate of pressure toward its target, per tick.
    pub pressure_easing: f64,
    pub pressure_min: f64,
    pub pressure_max: f64,
    pub critical_threshold: f64,
    pub recovery_threshold: f64,
    pub delivery_supply: f64,
    pub delivery_pressure: f64,
    pub delivery_origin_drain: f64,
    pub delivery_credits: f64,
    pub disrupted_pressure_damage: f64,
    /// Credits per tick per unit of convoy inflow.
    pub convoy_credit_rate: f64,
    pub storm_attenuation: f64,
    pub weather_floor: f64,
    /// Storm centres stay this far inside the map edges.
    pub storm_margin: f64,
    /// Power reserve ceiling as a fraction of supply capacity.
    pub power_reserve_cap: f64,
    /// Initial supply as a fraction of island storage.
    pub initial_supply: f64,
    /// Initial power reserve as a fraction of base capacity.
    pub initial_power_reserve: f64,
    /// Deliveries settled per convoy per step. Extra laps are dropped.
    pub max_laps_per_step: u32,
}

impl Default for LogisticsTuning {
    fn default() -> Self {
        Self {
            interception_radius: 1.4,
            disrupted_speed_factor: 0.4,
            disrupted_inflow_factor: 0.2,
            demand_draw: 0.05,
            supply_pressure_scale: 70.0,
            convoy_pressure_scale: 5.0,
            pressure_easing: 0.12,
            pressure_min: 5.0,
            pressure_max: 100.0,
            critical_threshold: 20.0,
            recovery_threshold: 24.0,
            delivery_supply: 2.4,
            delivery_pressure: 2.2,
            delivery_origin_drain: 1.2,
            delivery_credits: 6.0,
            disrupted_pressure_damage: 2.6,
            convoy_credit_rate: 0.6,
            storm_attenuation: 0.5,
            weather_floor: 0.2,
            storm_margin: 1.5,
            power_reserve_cap: 0.6,
            initial_supply: 0.6,
            initial_power_reserve: 0.4,
            max_laps_per_step: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionTuning {
    /// Floor on structure build time, seconds.
    pub min_building_time: f64,
    /// Floor on hull build time, seconds.
    pub min_ship_time: f64,
    pub spawn_distance_min: f64,
    pub spawn_distance_spread: f64,
}

impl Default for ProductionTuning {
    fn default() -> Self {
        Self {
            min_building_time: 6.0,
            min_ship_time: 4.0,
            spawn_distance_min: 0.6,
            spawn_distance_spread: 0.8,
        }
    }
}
