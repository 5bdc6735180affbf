#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the siege bridge engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative battlefield, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the battlefield executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values for systems
//! to react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The board layout and the castle bridge footprint live here as compile-time
//! constants so every crate agrees on which cells the bridge spans.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Siege bridge battlefield ready.";

/// Number of cell columns on the battle board.
pub const BOARD_WIDTH: u32 = 11;

/// Number of cell rows on the battle board.
pub const BOARD_HEIGHT: u32 = 9;

/// Total number of cells on the battle board.
pub const BOARD_SIZE: u32 = BOARD_WIDTH * BOARD_HEIGHT;

/// Moat cell directly north of the bridge.
pub const CELL_ABOVE_BRIDGE: CellIndex = CellIndex::new(39);
/// Approach cell on the attacker's side of the moat.
pub const CELL_BEFORE_MOAT: CellIndex = CellIndex::new(48);
/// Moat cell covered by the bridge deck.
pub const CELL_MOAT: CellIndex = CellIndex::new(49);
/// Castle gates cell at the inner end of the bridge.
pub const CELL_GATES: CellIndex = CellIndex::new(50);
/// First cell inside the castle behind the gates.
pub const CELL_AFTER_GATES: CellIndex = CellIndex::new(51);
/// Moat cell directly south of the bridge.
pub const CELL_BELOW_BRIDGE: CellIndex = CellIndex::new(61);

/// Every cell spanned by the bridge structure, including approaches.
///
/// Occupancy of any of these cells keeps the bridge from being raised.
pub const BRIDGE_FOOTPRINT: [CellIndex; 6] = [
    CELL_ABOVE_BRIDGE,
    CELL_BEFORE_MOAT,
    CELL_MOAT,
    CELL_GATES,
    CELL_AFTER_GATES,
    CELL_BELOW_BRIDGE,
];

/// Cells a crossing unit stands on while it is on the bridge deck.
pub const BRIDGE_SPAN: [CellIndex; 2] = [CELL_MOAT, CELL_GATES];

/// Commands that express all permissible battlefield mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places a new living unit on the board.
    DeployUnit {
        /// Cell the unit should occupy.
        cell: CellIndex,
        /// Side the unit fights for.
        allegiance: Allegiance,
        /// How the unit travels across the board.
        movement: MovementKind,
    },
    /// Requests that a living unit relocate to the destination cell.
    MoveUnit {
        /// Identifier of the unit attempting to move.
        unit: UnitId,
        /// Cell the unit wants to reach.
        destination: CellIndex,
    },
    /// Kills a living unit, leaving its corpse on the current cell.
    KillUnit {
        /// Identifier of the unit that died.
        unit: UnitId,
    },
    /// Requests that the intact bridge be raised.
    RaiseBridge,
    /// Requests that the intact bridge be lowered.
    LowerBridge,
    /// Applies siege damage that permanently destroys the bridge.
    DestroyBridge,
    /// Marks the end of a unit's action for the current turn.
    EndTurn {
        /// Identifier of the unit whose action finished.
        unit: UnitId,
    },
}

/// Events broadcast by the battlefield after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a unit entered the battle.
    UnitDeployed {
        /// Identifier allocated to the unit.
        unit: UnitId,
        /// Cell the unit occupies.
        cell: CellIndex,
    },
    /// Reports that a deployment request was rejected.
    DeploymentRejected {
        /// Cell provided in the request.
        cell: CellIndex,
        /// Specific reason the deployment failed.
        reason: DeploymentError,
    },
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellIndex,
        /// Cell the unit occupies after moving.
        to: CellIndex,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Identifier of the unit that attempted to move.
        unit: UnitId,
        /// Destination provided in the request.
        destination: CellIndex,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Confirms that a unit died and left a corpse behind.
    UnitDied {
        /// Identifier of the unit that died.
        unit: UnitId,
        /// Cell holding the corpse.
        cell: CellIndex,
    },
    /// Announces that the bridge went up.
    BridgeRaised,
    /// Announces that the bridge went down.
    BridgeLowered,
    /// Announces that the bridge was destroyed.
    BridgeDestroyed,
    /// Reports that a raise or lower request was rejected.
    BridgeActionRejected {
        /// Position that was requested.
        requested: BridgePosition,
        /// Specific reason the action failed.
        reason: BridgeActionError,
    },
    /// Announces that a unit finished acting for this turn.
    TurnEnded {
        /// Identifier of the unit whose action finished.
        unit: UnitId,
    },
}

/// Zero-based index of a board cell laid out row by row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Creates a new cell index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Creates the index addressing the provided column and row, if on the board.
    #[must_use]
    pub const fn from_coords(column: u32, row: u32) -> Option<Self> {
        if column < BOARD_WIDTH && row < BOARD_HEIGHT {
            Some(Self(row * BOARD_WIDTH + column))
        } else {
            None
        }
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.0 % BOARD_WIDTH
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.0 / BOARD_WIDTH
    }

    /// Reports whether the index addresses a cell on the board.
    #[must_use]
    pub const fn is_on_board(&self) -> bool {
        self.0 < BOARD_SIZE
    }

    /// Side of the moat line the cell belongs to.
    ///
    /// Cells on the moat and wall columns belong to neither side.
    #[must_use]
    pub const fn side(&self) -> Option<BoardSide> {
        if !self.is_on_board() {
            return None;
        }

        let column = self.column();
        if column < CELL_MOAT.column() {
            Some(BoardSide::Outside)
        } else if column > CELL_GATES.column() {
            Some(BoardSide::Inside)
        } else {
            None
        }
    }

    /// Reports whether the cell belongs to the bridge footprint.
    #[must_use]
    pub fn is_bridge_footprint(&self) -> bool {
        BRIDGE_FOOTPRINT.contains(self)
    }

    /// Reports whether the cell lies on the bridge deck.
    #[must_use]
    pub fn is_bridge_span(&self) -> bool {
        BRIDGE_SPAN.contains(self)
    }

    /// Reports whether the cell is open moat or castle wall.
    ///
    /// These are the cells on the moat line that the bridge deck does not
    /// cover. Ground troops can only get across the line over the deck.
    #[must_use]
    pub fn is_moat_line(&self) -> bool {
        self.is_on_board() && self.side().is_none() && !self.is_bridge_span()
    }
}

/// Halves of the board separated by the moat and castle wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoardSide {
    /// Open field in front of the moat where the attacker deploys.
    Outside,
    /// Castle courtyard behind the gates.
    Inside,
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Side a unit fights for during a siege.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Allegiance {
    /// Besieging army.
    Attacker,
    /// Castle garrison; the only side able to operate the bridge.
    Defender,
}

/// How a unit travels across the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Walks cell to cell and is subject to terrain and the bridge.
    Ground,
    /// Flies over obstacles.
    Flying,
    /// Appears directly at the destination.
    Teleporting,
}

/// Immutable representation of a single unit used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Cell currently occupied by the unit or its corpse.
    pub cell: CellIndex,
    /// Side the unit fights for.
    pub allegiance: Allegiance,
    /// How the unit travels.
    pub movement: MovementKind,
    /// Whether the unit is still alive.
    pub alive: bool,
}

/// Read-only snapshot describing all units on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Movement kinds that ignore the bridge entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassabilityRules {
    bypass: Vec<MovementKind>,
}

impl PassabilityRules {
    /// Creates rules letting the provided movement kinds ignore the bridge.
    #[must_use]
    pub fn new(mut bypass: Vec<MovementKind>) -> Self {
        bypass.sort_by_key(|kind| *kind as u8);
        bypass.dedup();
        Self { bypass }
    }

    /// Reports whether units moving this way ignore bridge state.
    #[must_use]
    pub fn bypasses(&self, movement: MovementKind) -> bool {
        self.bypass.contains(&movement)
    }

    /// Movement kinds that ignore the bridge, in declaration order.
    #[must_use]
    pub fn bypass(&self) -> &[MovementKind] {
        &self.bypass
    }
}

impl Default for PassabilityRules {
    fn default() -> Self {
        Self::new(vec![MovementKind::Flying])
    }
}

/// Capability answering whether a unit, living or dead, is on a cell.
///
/// Implemented by [`OccupancyView`] and by any `Fn(CellIndex) -> bool`
/// closure so bridge rules can be evaluated without a battlefield.
pub trait CellOccupancy {
    /// Returns `true` when the cell holds a living unit or a corpse.
    fn is_occupied(&self, cell: CellIndex) -> bool;
}

impl<F> CellOccupancy for F
where
    F: Fn(CellIndex) -> bool,
{
    fn is_occupied(&self, cell: CellIndex) -> bool {
        self(cell)
    }
}

/// Read-only view into the dense occupancy grid and graveyard.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    living: &'a [Option<UnitId>],
    corpses: &'a [u32],
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slices.
    ///
    /// Both slices are indexed by [`CellIndex::get`].
    #[must_use]
    pub fn new(living: &'a [Option<UnitId>], corpses: &'a [u32]) -> Self {
        Self { living, corpses }
    }

    /// Returns the living unit standing on the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellIndex) -> Option<UnitId> {
        self.living.get(slot(cell)?).copied().flatten()
    }

    /// Number of corpses lying on the provided cell.
    #[must_use]
    pub fn corpse_count(&self, cell: CellIndex) -> u32 {
        slot(cell)
            .and_then(|index| self.corpses.get(index).copied())
            .unwrap_or(0)
    }

    /// Reports whether a living unit could step onto the cell.
    ///
    /// Corpses do not block living units.
    #[must_use]
    pub fn is_free(&self, cell: CellIndex) -> bool {
        cell.is_on_board() && self.occupant(cell).is_none()
    }
}

impl CellOccupancy for OccupancyView<'_> {
    fn is_occupied(&self, cell: CellIndex) -> bool {
        self.occupant(cell).is_some() || self.corpse_count(cell) > 0
    }
}

fn slot(cell: CellIndex) -> Option<usize> {
    if cell.is_on_board() {
        usize::try_from(cell.get()).ok()
    } else {
        None
    }
}

/// Requested or configured bridge position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgePosition {
    /// Bridge is up and blocks crossing.
    Raised,
    /// Bridge is down and can be walked on.
    Lowered,
}

/// Observable bridge state used by renderers and systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeStatus {
    /// Intact and lowered.
    Down,
    /// Intact and raised.
    Raised,
    /// Permanently destroyed; lies flat.
    Destroyed,
}

/// Reasons a deployment request may be rejected by the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeploymentError {
    /// The requested cell lies outside the board.
    OutOfBounds,
    /// A living unit already stands on the requested cell.
    Occupied,
    /// The cell is open moat or wall the unit cannot stand on.
    MoatLine,
    /// The cell is on the raised bridge deck and the unit cannot lower it.
    BridgeRaised,
}

/// Reasons a move request may be rejected by the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveError {
    /// No unit with the provided identifier exists.
    UnknownUnit,
    /// The unit is dead.
    DeadUnit,
    /// The destination lies outside the board.
    OutOfBounds,
    /// A living unit already stands on the destination.
    Occupied,
    /// The destination is open moat or wall the unit cannot stand on.
    MoatLine,
    /// The raised bridge blocks the move and the unit cannot lower it.
    BridgeRaised,
}

/// Reasons a raise or lower request may be rejected by the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeActionError {
    /// The bridge was destroyed and can no longer move.
    Destroyed,
    /// The bridge is already up.
    AlreadyRaised,
    /// The bridge is already down.
    AlreadyDown,
    /// A unit or corpse lies on the bridge footprint.
    Occupied,
}
