#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that puts the castle bridge back up once a turn is over.

use siege_bridge_battlefield::Bridge;
use siege_bridge_core::{CellOccupancy, Command, Event};
use tracing::trace;

/// Emits [`Command::RaiseBridge`] when a turn ends with a clear lowered bridge.
#[derive(Debug, Default, Clone)]
pub struct BridgeControl {
    raise_requests: u64,
}

impl BridgeControl {
    /// Creates a new bridge control system.
    #[must_use]
    pub const fn new() -> Self {
        Self { raise_requests: 0 }
    }

    /// Consumes battlefield events and the current bridge state to emit commands.
    ///
    /// At most one raise request is emitted per event batch.
    pub fn handle<O>(
        &mut self,
        events: &[Event],
        bridge: &Bridge,
        occupancy: &O,
        out: &mut Vec<Command>,
    ) where
        O: CellOccupancy + ?Sized,
    {
        let turn_ended = events
            .iter()
            .any(|event| matches!(event, Event::TurnEnded { .. }));
        if !turn_ended {
            return;
        }

        if bridge.can_walk_across(occupancy) {
            self.raise_requests = self.raise_requests.saturating_add(1);
            trace!(requests = self.raise_requests, "requesting bridge raise");
            out.push(Command::RaiseBridge);
        }
    }

    /// Number of raise requests emitted since creation.
    #[must_use]
    pub const fn raise_requests(&self) -> u64 {
        self.raise_requests
    }
}
