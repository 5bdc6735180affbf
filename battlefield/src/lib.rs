#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state for castle sieges.
//!
//! The [`World`] exclusively owns the castle [`Bridge`] for the lifetime of a
//! battle, together with every unit and corpse on the board. Mutations flow
//! through [`apply`]; everything else reads through [`query`].

mod bridge;
pub mod config;

pub use bridge::Bridge;
pub use config::{BattleConfig, BridgeConfig, ConfigError};

use siege_bridge_core::{
    Allegiance, BridgeActionError, BridgePosition, CellIndex, Command, DeploymentError, Event,
    MoveError, MovementKind, OccupancyView, UnitId, UnitSnapshot, BOARD_SIZE, WELCOME_BANNER,
};
use tracing::{debug, warn};

/// Represents the authoritative battlefield state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    bridge: Bridge,
    units: Vec<Unit>,
    occupancy: OccupancyGrid,
    next_unit_id: UnitId,
}

impl World {
    /// Creates an empty battlefield with the bridge configured by `config`.
    #[must_use]
    pub fn new(config: &BattleConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            bridge: Bridge::new(config.bridge.initial_position, config.bridge.rules()),
            units: Vec::new(),
            occupancy: OccupancyGrid::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    fn unit(&self, unit_id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == unit_id)
    }

    fn unit_mut(&mut self, unit_id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id == unit_id)
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().saturating_add(1));
        id
    }

    fn deploy(
        &mut self,
        cell: CellIndex,
        allegiance: Allegiance,
        movement: MovementKind,
    ) -> Result<UnitId, DeploymentError> {
        if !cell.is_on_board() {
            return Err(DeploymentError::OutOfBounds);
        }
        if self.occupancy.living_at(cell).is_some() {
            return Err(DeploymentError::Occupied);
        }
        if self.walled_off(movement, cell) {
            return Err(DeploymentError::MoatLine);
        }
        let candidate = UnitSnapshot {
            id: self.next_unit_id,
            cell,
            allegiance,
            movement,
            alive: true,
        };
        if self.bridge.blocks_cell(&candidate, cell) {
            return Err(DeploymentError::BridgeRaised);
        }

        let id = self.allocate_unit_id();
        self.occupancy.occupy(id, cell);
        self.units.push(Unit {
            id,
            cell,
            allegiance,
            movement,
            alive: true,
        });
        Ok(id)
    }

    fn move_unit(
        &mut self,
        unit_id: UnitId,
        destination: CellIndex,
        out_events: &mut Vec<Event>,
    ) -> Result<CellIndex, MoveError> {
        let snapshot = self
            .unit(unit_id)
            .map(Unit::snapshot)
            .ok_or(MoveError::UnknownUnit)?;
        if !snapshot.alive {
            return Err(MoveError::DeadUnit);
        }
        if !destination.is_on_board() {
            return Err(MoveError::OutOfBounds);
        }
        if self
            .occupancy
            .living_at(destination)
            .is_some_and(|occupant| occupant != unit_id)
        {
            return Err(MoveError::Occupied);
        }
        if self.walled_off(snapshot.movement, destination) {
            return Err(MoveError::MoatLine);
        }

        if self.bridge.needs_lowering(&snapshot, destination) {
            if snapshot.allegiance != Allegiance::Defender {
                return Err(MoveError::BridgeRaised);
            }
            self.bridge.lower();
            debug!(unit = unit_id.get(), "bridge lowered for crossing");
            out_events.push(Event::BridgeLowered);
        }

        let from = snapshot.cell;
        self.occupancy.vacate(from);
        self.occupancy.occupy(unit_id, destination);
        if let Some(unit) = self.unit_mut(unit_id) {
            unit.cell = destination;
        }
        Ok(from)
    }

    /// Open moat and wall are closed to everything the bridge rules do not
    /// let bypass.
    fn walled_off(&self, movement: MovementKind, cell: CellIndex) -> bool {
        cell.is_moat_line() && !self.bridge.rules().bypasses(movement)
    }

    fn kill(&mut self, unit_id: UnitId) -> Option<CellIndex> {
        let unit = self.units.iter_mut().find(|unit| unit.id == unit_id)?;
        if !unit.alive {
            return None;
        }
        unit.alive = false;
        let cell = unit.cell;
        self.occupancy.vacate(cell);
        self.occupancy.bury(cell);
        Some(cell)
    }

    fn raise_bridge(&mut self) -> Result<(), BridgeActionError> {
        if !self.bridge.is_valid() {
            return Err(BridgeActionError::Destroyed);
        }
        if !self.bridge.is_down() {
            return Err(BridgeActionError::AlreadyRaised);
        }
        if !self.bridge.can_walk_across(&self.occupancy.view()) {
            return Err(BridgeActionError::Occupied);
        }
        self.bridge.raise();
        Ok(())
    }

    fn lower_bridge(&mut self) -> Result<(), BridgeActionError> {
        if !self.bridge.is_valid() {
            return Err(BridgeActionError::Destroyed);
        }
        if self.bridge.is_down() {
            return Err(BridgeActionError::AlreadyDown);
        }
        self.bridge.lower();
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&BattleConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::DeployUnit {
            cell,
            allegiance,
            movement,
        } => match world.deploy(cell, allegiance, movement) {
            Ok(unit) => {
                debug!(unit = unit.get(), cell = cell.get(), ?allegiance, "unit deployed");
                out_events.push(Event::UnitDeployed { unit, cell });
            }
            Err(reason) => out_events.push(Event::DeploymentRejected { cell, reason }),
        },
        Command::MoveUnit { unit, destination } => {
            match world.move_unit(unit, destination, out_events) {
                Ok(from) => {
                    debug!(
                        unit = unit.get(),
                        from = from.get(),
                        to = destination.get(),
                        "unit moved"
                    );
                    out_events.push(Event::UnitMoved {
                        unit,
                        from,
                        to: destination,
                    });
                }
                Err(reason) => {
                    debug!(unit = unit.get(), to = destination.get(), ?reason, "move rejected");
                    out_events.push(Event::MoveRejected {
                        unit,
                        destination,
                        reason,
                    });
                }
            }
        }
        Command::KillUnit { unit } => {
            if let Some(cell) = world.kill(unit) {
                out_events.push(Event::UnitDied { unit, cell });
            }
        }
        Command::RaiseBridge => match world.raise_bridge() {
            Ok(()) => {
                debug!("bridge raised");
                out_events.push(Event::BridgeRaised);
            }
            Err(reason) => {
                warn!(?reason, "bridge raise rejected");
                out_events.push(Event::BridgeActionRejected {
                    requested: BridgePosition::Raised,
                    reason,
                });
            }
        },
        Command::LowerBridge => match world.lower_bridge() {
            Ok(()) => {
                debug!("bridge lowered");
                out_events.push(Event::BridgeLowered);
            }
            Err(reason) => {
                warn!(?reason, "bridge lower rejected");
                out_events.push(Event::BridgeActionRejected {
                    requested: BridgePosition::Lowered,
                    reason,
                });
            }
        },
        Command::DestroyBridge => {
            if world.bridge.is_valid() {
                world.bridge.destroy();
                debug!("bridge destroyed");
                out_events.push(Event::BridgeDestroyed);
            }
        }
        Command::EndTurn { unit } => {
            if world.unit(unit).is_some() {
                out_events.push(Event::TurnEnded { unit });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Bridge, World};
    use siege_bridge_core::{BridgeStatus, CellIndex, OccupancyView, UnitId, UnitSnapshot, UnitView};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the castle bridge.
    #[must_use]
    pub fn bridge(world: &World) -> &Bridge {
        &world.bridge
    }

    /// Current state of the castle bridge.
    #[must_use]
    pub fn bridge_status(world: &World) -> BridgeStatus {
        world.bridge.status()
    }

    /// Exposes a read-only view of living units and corpses per cell.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.occupancy.view()
    }

    /// Captures the state of a single unit, living or dead.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world.unit(unit).map(super::Unit::snapshot)
    }

    /// Captures a read-only view of every unit in the battle.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(super::Unit::snapshot).collect())
    }

    /// Reports whether `unit` could step onto `cell` right now.
    ///
    /// The cell must be on the board and free of living units. Open moat and
    /// wall and a deck the bridge closes to this unit are impassable.
    #[must_use]
    pub fn is_cell_passable(world: &World, unit: &UnitSnapshot, cell: CellIndex) -> bool {
        world.occupancy.view().is_free(cell)
            && !world.walled_off(unit.movement, cell)
            && !world.bridge.blocks_cell(unit, cell)
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    cell: CellIndex,
    allegiance: Allegiance,
    movement: MovementKind,
    alive: bool,
}

impl Unit {
    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            cell: self.cell,
            allegiance: self.allegiance,
            movement: self.movement,
            alive: self.alive,
        }
    }
}

/// Dense per-cell record of living units and corpse counts.
#[derive(Clone, Debug)]
struct OccupancyGrid {
    living: Vec<Option<UnitId>>,
    corpses: Vec<u32>,
}

impl OccupancyGrid {
    fn new() -> Self {
        let capacity = usize::try_from(BOARD_SIZE).unwrap_or(0);
        Self {
            living: vec![None; capacity],
            corpses: vec![0; capacity],
        }
    }

    fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.living, &self.corpses)
    }

    fn living_at(&self, cell: CellIndex) -> Option<UnitId> {
        self.view().occupant(cell)
    }

    fn occupy(&mut self, unit_id: UnitId, cell: CellIndex) {
        if let Some(slot) = index(cell).and_then(|index| self.living.get_mut(index)) {
            *slot = Some(unit_id);
        }
    }

    fn vacate(&mut self, cell: CellIndex) {
        if let Some(slot) = index(cell).and_then(|index| self.living.get_mut(index)) {
            *slot = None;
        }
    }

    fn bury(&mut self, cell: CellIndex) {
        if let Some(count) = index(cell).and_then(|index| self.corpses.get_mut(index)) {
            *count = count.saturating_add(1);
        }
    }
}

fn index(cell: CellIndex) -> Option<usize> {
    if cell.is_on_board() {
        usize::try_from(cell.get()).ok()
    } else {
        None
    }
}
