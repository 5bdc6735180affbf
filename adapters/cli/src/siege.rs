//! Scripted siege replayed by the command-line adapter.

use siege_bridge_battlefield::{self as battlefield, query, World};
use siege_bridge_core::{
    Allegiance, CellIndex, Command, Event, MovementKind, UnitId, CELL_AFTER_GATES,
    CELL_BEFORE_MOAT, CELL_MOAT,
};
use siege_bridge_system_bridge_control::BridgeControl;

const RAIDER_START: CellIndex = CellIndex::new(46);
const WYVERN_START: CellIndex = CellIndex::new(24);
const SORTIE_TARGET: CellIndex = CellIndex::new(37);
const COURTYARD: CellIndex = CellIndex::new(52);

/// Runs the scripted siege against `world` and returns one log line per event.
pub(crate) fn replay(world: &mut World) -> Vec<String> {
    let mut control = BridgeControl::new();
    let mut log = Vec::new();

    let Some(raider) = deploy(
        world,
        &mut log,
        RAIDER_START,
        Allegiance::Attacker,
        MovementKind::Ground,
    ) else {
        return log;
    };
    let Some(wyvern) = deploy(
        world,
        &mut log,
        WYVERN_START,
        Allegiance::Attacker,
        MovementKind::Flying,
    ) else {
        return log;
    };
    let Some(guard) = deploy(
        world,
        &mut log,
        CELL_AFTER_GATES,
        Allegiance::Defender,
        MovementKind::Ground,
    ) else {
        return log;
    };

    let turns = [
        (raider, move_to(raider, CELL_BEFORE_MOAT)),
        (raider, move_to(raider, CELL_MOAT)),
        (guard, move_to(guard, SORTIE_TARGET)),
        (wyvern, move_to(wyvern, COURTYARD)),
        (raider, move_to(raider, CELL_MOAT)),
        (guard, Command::KillUnit { unit: raider }),
    ];

    for (number, (unit, command)) in turns.into_iter().enumerate() {
        let mut events = execute(world, command);
        events.extend(execute(world, Command::EndTurn { unit }));

        let mut commands = Vec::new();
        control.handle(
            &events,
            query::bridge(world),
            &query::occupancy_view(world),
            &mut commands,
        );
        for command in commands {
            events.extend(execute(world, command));
        }

        record(&mut log, &format!("turn {}", number + 1), &events);
    }

    let events = execute(world, Command::DestroyBridge);
    record(&mut log, "catapult", &events);
    log
}

fn deploy(
    world: &mut World,
    log: &mut Vec<String>,
    cell: CellIndex,
    allegiance: Allegiance,
    movement: MovementKind,
) -> Option<UnitId> {
    let events = execute(
        world,
        Command::DeployUnit {
            cell,
            allegiance,
            movement,
        },
    );
    record(log, "setup", &events);
    events.iter().find_map(|event| match event {
        Event::UnitDeployed { unit, .. } => Some(*unit),
        _ => None,
    })
}

fn move_to(unit: UnitId, destination: CellIndex) -> Command {
    Command::MoveUnit { unit, destination }
}

fn execute(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    battlefield::apply(world, command, &mut events);
    events
}

fn record(log: &mut Vec<String>, label: &str, events: &[Event]) {
    log.extend(events.iter().map(|event| format!("[{label}] {event:?}")));
}

#[cfg(test)]
mod tests {
    use super::*;
    use siege_bridge_battlefield::BattleConfig;
    use siege_bridge_core::{BridgePosition, BridgeStatus};

    #[test]
    fn replay_ends_with_destroyed_bridge() {
        let mut world = World::default();
        let log = replay(&mut world);

        assert_eq!(query::bridge_status(&world), BridgeStatus::Destroyed);
        assert_eq!(
            log.last().map(String::as_str),
            Some("[catapult] BridgeDestroyed")
        );
    }

    #[test]
    fn raider_is_turned_back_until_the_guard_sorties() {
        let mut world = World::default();
        let log = replay(&mut world);

        let rejected = log
            .iter()
            .position(|line| {
                line.starts_with("[turn 2] MoveRejected") && line.contains("reason: BridgeRaised")
            })
            .expect("raider should be blocked by the raised bridge");
        let lowered = log
            .iter()
            .position(|line| line == "[turn 3] BridgeLowered")
            .expect("guard should lower the bridge");
        let crossed = log
            .iter()
            .position(|line| line.starts_with("[turn 5] UnitMoved"))
            .expect("raider should step onto the lowered bridge");

        assert!(rejected < lowered && lowered < crossed);
    }

    #[test]
    fn replay_is_deterministic() {
        let mut first = World::default();
        let mut second = World::default();
        assert_eq!(replay(&mut first), replay(&mut second));
    }

    #[test]
    fn lowered_start_skips_the_sortie_lowering() {
        let mut config = BattleConfig::default();
        config.bridge.initial_position = BridgePosition::Lowered;
        let mut world = World::new(&config);
        let log = replay(&mut world);

        assert!(!log.iter().any(|line| line == "[turn 3] BridgeLowered"));
        assert_eq!(query::bridge_status(&world), BridgeStatus::Destroyed);
    }
}
