use siege_bridge_battlefield::{self as battlefield, query, BattleConfig, World};
use siege_bridge_core::{
    Allegiance, BridgePosition, BridgeStatus, CellIndex, Command, Event, MovementKind, UnitId,
    CELL_AFTER_GATES, CELL_BEFORE_MOAT, CELL_GATES,
};
use siege_bridge_system_bridge_control::BridgeControl;

fn world_with_bridge(position: BridgePosition) -> World {
    let mut config = BattleConfig::default();
    config.bridge.initial_position = position;
    World::new(&config)
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    battlefield::apply(world, command, &mut events);
    events
}

fn deploy(world: &mut World, cell: CellIndex, allegiance: Allegiance) -> UnitId {
    let events = run(
        world,
        Command::DeployUnit {
            cell,
            allegiance,
            movement: MovementKind::Ground,
        },
    );
    match events.as_slice() {
        [Event::UnitDeployed { unit, .. }] => *unit,
        other => panic!("unexpected deployment events: {other:?}"),
    }
}

fn pump(world: &World, control: &mut BridgeControl, events: &[Event]) -> Vec<Command> {
    let mut commands = Vec::new();
    control.handle(
        events,
        query::bridge(world),
        &query::occupancy_view(world),
        &mut commands,
    );
    commands
}

#[test]
fn raises_clear_lowered_bridge_when_turn_ends() {
    let mut world = world_with_bridge(BridgePosition::Lowered);
    let unit = deploy(&mut world, CellIndex::new(0), Allegiance::Attacker);
    let mut control = BridgeControl::default();

    let events = run(&mut world, Command::EndTurn { unit });
    let commands = pump(&world, &mut control, &events);

    assert_eq!(commands, vec![Command::RaiseBridge]);
    assert_eq!(control.raise_requests(), 1);
}

#[test]
fn ignores_batches_without_turn_end() {
    let world = world_with_bridge(BridgePosition::Lowered);
    let mut control = BridgeControl::new();

    let commands = pump(&world, &mut control, &[Event::BridgeLowered]);

    assert!(commands.is_empty(), "only turn ends trigger the bridge");
}

#[test]
fn leaves_occupied_bridge_down() {
    let mut world = world_with_bridge(BridgePosition::Lowered);
    let unit = deploy(&mut world, CELL_GATES, Allegiance::Defender);
    let mut control = BridgeControl::default();

    let events = run(&mut world, Command::EndTurn { unit });
    assert!(pump(&world, &mut control, &events).is_empty());

    let _ = run(&mut world, Command::KillUnit { unit });
    let events = run(&mut world, Command::EndTurn { unit });
    assert!(
        pump(&world, &mut control, &events).is_empty(),
        "a corpse on the gates still keeps the bridge down",
    );
}

#[test]
fn does_nothing_for_raised_or_destroyed_bridge() {
    let mut raised = world_with_bridge(BridgePosition::Raised);
    let unit = deploy(&mut raised, CellIndex::new(0), Allegiance::Attacker);
    let mut control = BridgeControl::default();
    let events = run(&mut raised, Command::EndTurn { unit });
    assert!(pump(&raised, &mut control, &events).is_empty());

    let mut destroyed = world_with_bridge(BridgePosition::Lowered);
    let unit = deploy(&mut destroyed, CellIndex::new(0), Allegiance::Attacker);
    let _ = run(&mut destroyed, Command::DestroyBridge);
    let events = run(&mut destroyed, Command::EndTurn { unit });
    assert!(pump(&destroyed, &mut control, &events).is_empty());
    assert_eq!(control.raise_requests(), 0);
}

#[test]
fn defender_sortie_lowers_then_bridge_goes_back_up() {
    let mut world = world_with_bridge(BridgePosition::Raised);
    let defender = deploy(&mut world, CELL_AFTER_GATES, Allegiance::Defender);
    let mut control = BridgeControl::default();

    let mut log = run(
        &mut world,
        Command::MoveUnit {
            unit: defender,
            destination: CellIndex::new(44),
        },
    );
    log.extend(run(&mut world, Command::EndTurn { unit: defender }));

    for command in pump(&world, &mut control, &log) {
        log.extend(run(&mut world, command));
    }

    assert_eq!(
        log,
        vec![
            Event::BridgeLowered,
            Event::UnitMoved {
                unit: defender,
                from: CELL_AFTER_GATES,
                to: CellIndex::new(44),
            },
            Event::TurnEnded { unit: defender },
            Event::BridgeRaised,
        ],
    );
    assert_eq!(query::bridge_status(&world), BridgeStatus::Raised);
}

#[test]
fn unit_left_on_approach_blocks_raising() {
    let mut world = world_with_bridge(BridgePosition::Raised);
    let defender = deploy(&mut world, CELL_AFTER_GATES, Allegiance::Defender);
    let mut control = BridgeControl::default();

    let _ = run(
        &mut world,
        Command::MoveUnit {
            unit: defender,
            destination: CELL_BEFORE_MOAT,
        },
    );
    let events = run(&mut world, Command::EndTurn { unit: defender });

    assert!(pump(&world, &mut control, &events).is_empty());
    assert_eq!(query::bridge_status(&world), BridgeStatus::Down);
}
