use std::time::Duration;

use nova_siege_core::{
    Command, Cue, EnemyKind, Event, HitSource, MovementPattern, SoundCue, SpawnScaling, Vec2,
};
use nova_siege_system_levels::{world_of, CatalogError, LevelCatalog, LevelManager, MAX_LEVEL};
use nova_siege_world::{self as world, query, World};

fn apply(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn every_level_in_range_resolves_and_replays() {
    let first = LevelCatalog::new(2024);
    let second = LevelCatalog::new(2024);
    for number in 1..=MAX_LEVEL {
        let level = first.level(number);
        assert_eq!(level.number, number);
        assert_eq!(level.world, world_of(number));
        assert!(!level.waves.is_empty() || level.boss.is_some());
        assert_eq!(level, second.level(number));
    }
}

#[test]
fn procedural_levels_ignore_request_order() {
    let catalog = LevelCatalog::new(77);
    let forward: Vec<_> = (9..=MAX_LEVEL).map(|number| catalog.level(number)).collect();
    let backward: Vec<_> = (9..=MAX_LEVEL)
        .rev()
        .map(|number| catalog.level(number))
        .collect();
    assert!(forward.iter().eq(backward.iter().rev()));
}

#[test]
fn level_packs_override_and_validate() {
    let pack = r#"
        [[levels]]
        number = 1
        name = "Custom Opening"
        theme = "rift"
        speed_multiplier = 1.2

        [[levels.waves]]
        delay = 0.5
        formation = "v"
        spawns = [
            { kind = "fighter", relative_x = 0.25 },
            { kind = "fighter", relative_x = 0.75, pattern = "zigzag" },
        ]
    "#;
    let catalog = LevelCatalog::new(3).with_pack(pack).expect("valid pack");
    let level = catalog.level(1);
    assert_eq!(level.name, "Custom Opening");
    assert_eq!(level.world, 1);
    assert_eq!(level.waves.len(), 1);
    assert_eq!(level.waves[0].spawns[1].resolved_pattern(), MovementPattern::Zigzag);
    assert_eq!(level.waves[0].spawns[0].resolved_pattern(), MovementPattern::Sine);
    assert_eq!(catalog.level(2), LevelCatalog::new(3).level(2));

    let outside = r#"
        [[levels]]
        number = 1
        name = "Off Screen"
        [[levels.waves]]
        spawns = [{ kind = "scout", relative_x = 1.5 }]
    "#;
    assert!(matches!(
        LevelCatalog::new(3).with_pack(outside),
        Err(CatalogError::InvalidLevel { number: 1, .. })
    ));
    assert!(matches!(
        LevelCatalog::new(3).with_pack("levels = 7"),
        Err(CatalogError::Parse(_))
    ));
}

#[test]
fn completion_records_a_report_from_world_events() {
    let mut world = World::new();
    let mut manager = LevelManager::new(LevelCatalog::new(1));
    let _ = manager.start_level(3);

    let mut events = apply(
        &mut world,
        vec![
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            Command::SpawnEnemy {
                kind: EnemyKind::Scout,
                position: Vec2::new(100.0, 50.0),
                pattern: MovementPattern::Straight,
                scaling: SpawnScaling::IDENTITY,
            },
        ],
    );
    let id = query::enemies(&world)[0].id;
    events.extend(apply(
        &mut world,
        vec![
            Command::DestroyEnemy { enemy: id },
            Command::HitPlayer {
                damage: 1,
                phased: false,
                source: HitSource::Contact,
            },
            Command::CompleteLevel { level: 3 },
        ],
    ));

    let mut out = Vec::new();
    manager.handle(&events, &mut out);

    let report = &manager.reports()[0];
    assert_eq!(report.level, 3);
    assert_eq!(report.world, 1);
    assert_eq!(report.stats.enemies_killed, 1);
    assert_eq!(report.stats.damage_taken, 1);
    assert!((report.stats.elapsed - 0.25).abs() < 1e-4);
    assert_eq!(
        out,
        vec![Command::RaiseCue {
            cue: Cue::Sound {
                sound: SoundCue::LevelClear
            }
        }]
    );
}

#[test]
fn crossing_a_world_boundary_requests_a_transition() {
    let mut world = World::new();
    let mut manager = LevelManager::new(LevelCatalog::new(1));
    let _ = manager.start_level(5);

    let events = apply(&mut world, vec![Command::CompleteLevel { level: 5 }]);
    let mut out = Vec::new();
    manager.handle(&events, &mut out);

    assert!(out.contains(&Command::TransitionWorld { from: 1, to: 2 }));
    assert!(out.contains(&Command::RaiseCue {
        cue: Cue::Sound {
            sound: SoundCue::WorldTransition
        }
    }));
    let transitioned = apply(&mut world, out);
    assert!(transitioned.contains(&Event::WorldTransitioned { from: 1, to: 2 }));

    let next = manager.advance().expect("level six exists");
    assert_eq!(next.number, 6);
    assert_eq!(manager.current_world(), 2);
}
