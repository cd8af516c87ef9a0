//! Seelines Core -- the simulation engine for a two-faction naval skirmish.
//!
//! The crate owns a fixed tile map, a store of units steered by queued
//! orders, and a territorial logistics layer of islands, supply convoys and
//! drifting storms. Every mutation happens inside [`engine::Engine::step`];
//! there is one writer and ticks are strictly ordered.
//!
//! # Six-Phase Tick Pipeline
//!
//! 1. **Pre-tick** -- Apply queued commands (orders, spawns, production requests).
//! 2. **Orders** -- Each unit works its head order: move, patrol or escort.
//! 3. **Logistics** -- Storms drift, convoys advance and deliver, islands settle.
//! 4. **Production** -- Structure and hull projects count down and complete.
//! 5. **Post-tick** -- Events go to passive listeners and into the tick report.
//! 6. **Bookkeeping** -- Increment the tick counter.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Pipeline orchestrator and query surface.
//! - [`map::GridMap`] and [`pathfinding::find_path`] -- 8-connected A* over water tiles.
//! - [`order::Order`] and [`executor`] -- Orders with typed per-order plans
//!   and the state machine that executes them.
//! - [`logistics::Logistics`] -- Islands, convoys and storms.
//! - [`production`] -- Validated, cost-gated build queues.
//! - [`protocol`] and [`host`] -- Wire contract, authoritative host and observers.

pub mod catalog;
pub mod command_queue;
pub mod config;
pub mod economy;
pub mod engine;
pub mod event;
pub mod executor;
pub mod fixed;
pub mod geometry;
pub mod host;
pub mod id;
pub mod logistics;
pub mod map;
pub mod order;
pub mod pathfinding;
pub mod production;
pub mod protocol;
pub mod query;
pub mod rng;
pub mod sim;
pub mod unit;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
