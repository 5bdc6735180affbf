//! Castle drawbridge state and the passability rules built on it.

use siege_bridge_core::{
    Allegiance, BridgePosition, BridgeStatus, CellIndex, CellOccupancy, PassabilityRules,
    UnitSnapshot, BRIDGE_FOOTPRINT,
};

/// Drawbridge spanning the moat in front of the castle gates.
///
/// A destroyed bridge always lies flat: `destroyed` implies `!raised` at every
/// observation point. Destruction is permanent for the rest of the battle.
#[derive(Debug)]
pub struct Bridge {
    destroyed: bool,
    raised: bool,
    rules: PassabilityRules,
}

impl Bridge {
    /// Creates an intact bridge in the provided position.
    #[must_use]
    pub fn new(position: BridgePosition, rules: PassabilityRules) -> Self {
        Self {
            destroyed: false,
            raised: position == BridgePosition::Raised,
            rules,
        }
    }

    /// Raises the bridge.
    ///
    /// Callers must check [`Bridge::is_valid`] first. Raising a destroyed
    /// bridge panics in debug builds and is ignored otherwise.
    pub fn raise(&mut self) {
        debug_assert!(!self.destroyed, "cannot raise a destroyed bridge");
        if self.destroyed {
            return;
        }
        self.raised = true;
    }

    /// Lowers the bridge.
    ///
    /// Same precondition as [`Bridge::raise`].
    pub fn lower(&mut self) {
        debug_assert!(!self.destroyed, "cannot lower a destroyed bridge");
        self.raised = false;
    }

    /// Destroys the bridge, leaving it flat for the rest of the battle.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.raised = false;
    }

    /// Reports whether the bridge is still intact.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !self.destroyed
    }

    /// Reports whether the bridge has been destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Reports whether the bridge is down. Destroyed bridges are always down.
    #[must_use]
    pub fn is_down(&self) -> bool {
        debug_assert!(
            !self.destroyed || !self.raised,
            "destroyed bridge observed in the raised position"
        );
        !self.raised
    }

    /// Current state machine state.
    #[must_use]
    pub fn status(&self) -> BridgeStatus {
        if self.destroyed {
            BridgeStatus::Destroyed
        } else if self.is_down() {
            BridgeStatus::Down
        } else {
            BridgeStatus::Raised
        }
    }

    /// Movement kinds that ignore this bridge.
    #[must_use]
    pub const fn rules(&self) -> &PassabilityRules {
        &self.rules
    }

    /// Reports whether any footprint cell holds a unit, living or dead.
    ///
    /// Evaluated against `occupancy` on every call; units move every turn.
    #[must_use]
    pub fn is_occupied<O>(occupancy: &O) -> bool
    where
        O: CellOccupancy + ?Sized,
    {
        BRIDGE_FOOTPRINT
            .iter()
            .any(|cell| occupancy.is_occupied(*cell))
    }

    /// Reports whether the bridge is intact, down and clear of troops.
    ///
    /// This is also the condition for raising the bridge again.
    #[must_use]
    pub fn can_walk_across<O>(&self, occupancy: &O) -> bool
    where
        O: CellOccupancy + ?Sized,
    {
        self.is_valid() && self.is_down() && !Self::is_occupied(occupancy)
    }

    /// Reports whether moving `unit` to `destination` requires lowering first.
    ///
    /// True for units that do not bypass the bridge when it is intact and
    /// raised and the move either ends on the bridge deck or changes sides of
    /// the moat.
    #[must_use]
    pub fn needs_lowering(&self, unit: &UnitSnapshot, destination: CellIndex) -> bool {
        if !self.is_valid() || self.is_down() || self.rules.bypasses(unit.movement) {
            return false;
        }

        if destination.is_bridge_span() {
            return true;
        }

        matches!(
            (unit.cell.side(), destination.side()),
            (Some(from), Some(to)) if from != to
        )
    }

    /// Reports whether `unit` can currently traverse the bridge deck.
    ///
    /// Defenders may cross a raised intact bridge because they lower it on
    /// demand.
    #[must_use]
    pub fn is_passable(&self, unit: &UnitSnapshot) -> bool {
        self.rules.bypasses(unit.movement)
            || self.is_down()
            || (self.is_valid() && unit.allegiance == Allegiance::Defender)
    }

    /// Reports whether the bridge makes `cell` impassable for `unit`.
    #[must_use]
    pub fn blocks_cell(&self, unit: &UnitSnapshot, cell: CellIndex) -> bool {
        cell.is_bridge_span() && !self.is_passable(unit)
    }
}
