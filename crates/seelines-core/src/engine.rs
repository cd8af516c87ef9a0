//! The simulation engine: owns the world and runs the six-phase pipeline.
//!
//! # Six-Phase Pipeline
//!
//! Each [`Engine::step`] runs:
//! 1. **Pre-tick** -- apply queued commands (orders, spawns, production requests)
//! 2. **Orders** -- advance every unit's head order in id order
//! 3. **Logistics** -- storms, then convoys, then islands
//! 4. **Production** -- count projects down in real seconds; apply completions
//! 5. **Post-tick** -- deliver events to passive listeners and move them into the report
//! 6. **Bookkeeping** -- advance the tick counter
//!
//! `dt` is measured in ticks. Non-finite or negative values are treated
//! as zero.

use std::f64::consts::TAU;

use tracing::{debug, info};

use crate::catalog::{BuildingType, HullType};
use crate::command_queue::{Command, CommandQueue};
use crate::config::SimConfig;
use crate::event::{EventKind, EventLog, GameEvent, PassiveListener};
use crate::executor::{ExecContext, advance_units};
use crate::fixed::{Ticks, fixed64_to_f64};
use crate::geometry::Vec2;
use crate::id::{IslandId, ProjectId, UnitId};
use crate::logistics::{Logistics, LogisticsPreset, PresetError};
use crate::map::GridMap;
use crate::order::Order;
use crate::production::{Project, ProjectKind, ProductionError, quote_building, quote_ship};
use crate::protocol::SnapshotMessage;
use crate::query::{RenderableLogistics, StrategicOverview, renderable_logistics, strategic_overview};
use crate::rng::SimRng;
use crate::sim::{RejectedCommand, SimState, StateHash, TickReport};
use crate::economy::Treasury;
use crate::unit::{Faction, Unit};
use crate::world::World;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Engine {
    pub world: World,
    pub config: SimConfig,
    pub sim_state: SimState,
    commands: CommandQueue,
    events: EventLog,
    rng: SimRng,
}

impl Engine {
    /// Build an engine for `map` with the islands, convoys and storms of
    /// `preset`. Each faction starts with `config.starting_credits`.
    pub fn new(map: GridMap, preset: &LogisticsPreset, config: SimConfig) -> Result<Self, PresetError> {
        let mut rng = SimRng::new(config.seed);
        let logistics = Logistics::from_preset(preset, &map, &config.logistics, &mut rng)?;
        let treasury = Treasury::new(config.starting_credits);
        Ok(Self {
            world: World::new(map, logistics, treasury),
            config,
            sim_state: SimState::new(),
            commands: CommandQueue::new(),
            events: EventLog::new(),
            rng,
        })
    }

    /// The default 24x18 skirmish with no units.
    pub fn skirmish(config: SimConfig) -> Result<Self, PresetError> {
        Self::new(GridMap::skirmish(), &LogisticsPreset::skirmish(), config)
    }

    /// Keep up to `max_history` applied commands for replay and debugging.
    pub fn with_command_history(mut self, max_history: usize) -> Self {
        self.commands = CommandQueue::with_max_history(max_history);
        self
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command for the next step's pre-tick phase.
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn submit_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.push_batch(commands);
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.pending_count()
    }

    pub fn command_history(&self) -> &[(Ticks, Command)] {
        self.commands.history()
    }

    // -----------------------------------------------------------------------
    // Direct mutation
    // -----------------------------------------------------------------------

    pub fn spawn_unit(&mut self, hull: HullType, owner: Faction, position: Vec2) -> UnitId {
        self.world.spawn(hull, owner, position)
    }

    pub fn despawn_unit(&mut self, unit: UnitId) -> Option<Unit> {
        self.world.despawn(unit)
    }

    /// Give each listed unit a copy of `order` right away. Returns how many
    /// units took it.
    pub fn enqueue_order(&mut self, unit_ids: &[UnitId], order: &Order, append: bool) -> usize {
        self.world
            .enqueue_order(unit_ids, order, append, self.sim_state.tick)
    }

    /// Validate and queue a structure build or upgrade, deducting its cost.
    pub fn queue_building(
        &mut self,
        island: IslandId,
        building: BuildingType,
        owner: Faction,
    ) -> Result<ProjectId, ProductionError> {
        let quote = quote_building(
            &self.world.logistics,
            &self.world.production,
            &self.world.treasury,
            &self.config.production,
            island,
            building,
            owner,
        );
        self.accept(quote)
    }

    /// Validate and queue a hull, deducting its cost.
    pub fn queue_ship(
        &mut self,
        island: IslandId,
        hull: HullType,
        owner: Faction,
    ) -> Result<ProjectId, ProductionError> {
        let quote = quote_ship(
            &self.world.logistics,
            &self.world.production,
            &self.world.treasury,
            &self.config.production,
            island,
            hull,
            owner,
            self.world.supply_used(owner),
        );
        self.accept(quote)
    }

    fn accept(&mut self, quote: Result<Project, ProductionError>) -> Result<ProjectId, ProductionError> {
        let project = match quote {
            Ok(project) => project,
            Err(error) => {
                debug!(target: "seelines::production", error = %error, "production.rejected");
                return Err(error);
            }
        };
        if !self.world.treasury.spend(project.owner, project.cost) {
            let error = ProductionError::InsufficientCredits {
                required: fixed64_to_f64(project.cost),
                available: self.world.treasury.credits_f64(project.owner),
            };
            debug!(target: "seelines::production", error = %error, "production.rejected");
            return Err(error);
        }
        info!(
            target: "seelines::production",
            island = project.island.0,
            owner = ?project.owner,
            kind = ?project.kind,
            cost = fixed64_to_f64(project.cost),
            seconds = project.total,
            "production.accepted"
        );
        Ok(self.world.production.insert(project))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.events.suppress(kind);
    }

    pub fn unsuppress_event(&mut self, kind: EventKind) {
        self.events.unsuppress(kind);
    }

    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.events.on_passive(kind, listener);
    }

    pub fn total_events(&self, kind: EventKind) -> u64 {
        self.events.total_emitted(kind)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.world.unit(id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.world.units()
    }

    pub fn logistics(&self) -> &Logistics {
        &self.world.logistics
    }

    pub fn credits(&self, faction: Faction) -> f64 {
        self.world.treasury.credits_f64(faction)
    }

    pub fn overview(&self, faction: Faction) -> StrategicOverview {
        strategic_overview(&self.world, faction)
    }

    pub fn renderable(&self) -> RenderableLogistics {
        renderable_logistics(&self.world.logistics)
    }

    pub fn snapshot(&self) -> SnapshotMessage {
        SnapshotMessage::capture(self.sim_state.tick, self.world.units())
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Run one pass of the pipeline covering `dt` ticks.
    pub fn step(&mut self, dt: f64) -> TickReport {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut report = TickReport {
            tick: self.sim_state.tick,
            ..TickReport::default()
        };

        self.phase_pre_tick(&mut report);
        self.phase_orders(dt, &mut report);
        self.phase_logistics(dt);
        self.phase_production(dt);
        self.phase_post_tick(&mut report);
        self.phase_bookkeeping(dt);

        report
    }

    // -----------------------------------------------------------------------
    // Phase 1: Pre-tick
    // -----------------------------------------------------------------------

    fn phase_pre_tick(&mut self, report: &mut TickReport) {
        let commands = self.commands.drain(self.sim_state.tick);
        for command in commands {
            let result = match &command {
                Command::EnqueueOrder {
                    unit_ids,
                    order,
                    append,
                } => {
                    self.enqueue_order(unit_ids, order, *append);
                    Ok(())
                }
                Command::SpawnUnit {
                    hull,
                    owner,
                    position,
                } => {
                    self.world.spawn(*hull, *owner, *position);
                    Ok(())
                }
                Command::DespawnUnit { unit } => {
                    self.world.despawn(*unit);
                    Ok(())
                }
                Command::QueueBuilding {
                    island,
                    building,
                    owner,
                } => self.queue_building(*island, *building, *owner).map(|_| ()),
                Command::QueueShip {
                    island,
                    hull,
                    owner,
                } => self.queue_ship(*island, *hull, *owner).map(|_| ()),
            };
            if let Err(error) = result {
                report.rejected.push(RejectedCommand { command, error });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Phase 2: Orders
    // -----------------------------------------------------------------------

    fn phase_orders(&mut self, dt: f64, report: &mut TickReport) {
        let ctx = ExecContext {
            map: &self.world.map,
            tuning: &self.config.movement,
            tick_rate: self.config.tick_rate,
        };
        report.orders = advance_units(&mut self.world.units, &ctx, dt);
    }

    // -----------------------------------------------------------------------
    // Phase 3: Logistics
    // -----------------------------------------------------------------------

    fn phase_logistics(&mut self, dt: f64) {
        let World {
            map,
            units,
            logistics,
            treasury,
            ..
        } = &mut self.world;
        logistics.advance(map, units, &self.config.logistics, treasury, &mut self.events, dt);
    }

    // -----------------------------------------------------------------------
    // Phase 4: Production
    // -----------------------------------------------------------------------

    fn phase_production(&mut self, dt: f64) {
        if self.config.tick_rate <= 0.0 {
            return;
        }
        let seconds = dt / self.config.tick_rate;
        for (_, project) in self.world.production.advance(seconds) {
            match project.kind {
                ProjectKind::Building { building, tier } => {
                    self.complete_building(&project, building, tier)
                }
                ProjectKind::Ship { hull } => self.complete_ship(&project, hull),
            }
        }
    }

    fn complete_building(&mut self, project: &Project, building: BuildingType, tier: u8) {
        let Some(island) = self.world.logistics.island_mut(project.island) else {
            return;
        };
        island.set_building_tier(building, tier);
        info!(
            target: "seelines::production",
            island = %island.key,
            building = ?building,
            tier,
            "production.completed"
        );
        if island.owner.faction() == Some(project.owner) {
            self.events.emit(GameEvent::BuildingCompleted {
                owner: project.owner,
                island: project.island,
                building,
                tier,
            });
        }
    }

    fn complete_ship(&mut self, project: &Project, hull: HullType) {
        let Some(anchor) = self.world.logistics.island(project.island).map(|i| i.position) else {
            return;
        };
        let tuning = &self.config.production;
        let bearing = self.rng.range_f64(0.0, TAU);
        let distance = self.rng.range_f64(
            tuning.spawn_distance_min,
            tuning.spawn_distance_min + tuning.spawn_distance_spread,
        );
        let position = anchor + Vec2::from_angle(bearing) * distance;
        let unit = self.world.spawn(hull, project.owner, position);
        info!(
            target: "seelines::production",
            unit = %unit,
            hull = ?hull,
            owner = ?project.owner,
            "production.completed"
        );
        self.events.emit(GameEvent::UnitConstructed {
            owner: project.owner,
            island: project.island,
            hull,
            unit,
        });
    }

    // -----------------------------------------------------------------------
    // Phase 5: Post-tick
    // -----------------------------------------------------------------------

    fn phase_post_tick(&mut self, report: &mut TickReport) {
        report.events = self.events.flush();
    }

    // -----------------------------------------------------------------------
    // Phase 6: Bookkeeping
    // -----------------------------------------------------------------------

    fn phase_bookkeeping(&mut self, dt: f64) {
        self.sim_state.tick += 1;
        self.sim_state.elapsed += dt;
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// FNV-1a over everything that evolves: units, islands, convoys, storms,
    /// credits, projects and the RNG.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.sim_state.tick);

        for unit in self.world.units() {
            h.write_u32(unit.id.0);
            h.write_u32(unit.hull as u32);
            h.write_u32(unit.owner as u32);
            h.write_f64(unit.position.x);
            h.write_f64(unit.position.y);
            h.write_f64(unit.velocity.x);
            h.write_f64(unit.velocity.y);
            h.write_u32(unit.hitpoints);
            h.write_u64(unit.orders.len() as u64);
            for queued in &unit.orders {
                h.write_str(&queued.order.id.0);
            }
        }

        let logistics = &self.world.logistics;
        for island in logistics.islands() {
            h.write_u32(island.id.0);
            h.write_f64(island.pressure);
            h.write_f64(island.supply);
            h.write_f64(island.power_reserve);
            h.write_u32(u32::from(island.critical));
            for building in &island.buildings {
                h.write_u32(building.building as u32);
                h.write_u32(u32::from(building.tier));
            }
        }
        for convoy in logistics.convoys() {
            h.write_f64(convoy.progress);
            h.write_u32(u32::from(convoy.disrupted));
        }
        for storm in logistics.storms() {
            h.write_f64(storm.center.x);
            h.write_f64(storm.center.y);
            h.write_f64(storm.remaining);
        }

        for faction in Faction::ALL {
            h.write_fixed64(self.world.treasury.credits(faction));
        }
        for (_, project) in self.world.production.iter() {
            h.write_u32(project.island.0);
            h.write_f64(project.remaining);
        }
        h.write_u64(self.rng.state());

        h.finish()
    }
}
