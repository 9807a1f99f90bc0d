use std::time::Duration;

use nova_siege_core::{
    Command, Cue, EnemyKind, Event, LevelDefinition, SoundCue, StandardDifficulty, Tuning,
    WaveDefinition, WaveSpawn,
};
use nova_siege_system_waves::{WaveManager, WavePhase};
use nova_siege_world::{self as world, query, World};

const DT: f32 = 1.0 / 60.0;

struct Harness {
    world: World,
    manager: WaveManager,
    tuning: Tuning,
}

impl Harness {
    fn new(level: LevelDefinition) -> Self {
        let tuning = Tuning::default();
        let mut manager = WaveManager::new();
        manager.begin_level(level, &tuning);
        Self {
            world: World::new(),
            manager,
            tuning,
        }
    }

    /// Runs one frame, applying `extra` between the tick and the wave manager.
    fn step(&mut self, extra: Vec<Command>) -> Vec<Command> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: Duration::from_secs_f32(DT),
            },
            &mut events,
        );
        for command in extra {
            world::apply(&mut self.world, command, &mut events);
        }

        let mut commands = Vec::new();
        self.manager.handle(
            &events,
            query::active_enemy_count(&self.world),
            query::bounds(&self.world),
            &StandardDifficulty,
            &self.tuning,
            &mut commands,
        );
        let mut ignored = Vec::new();
        for command in commands.clone() {
            world::apply(&mut self.world, command, &mut ignored);
        }
        commands
    }

    fn run_until<F>(&mut self, limit: usize, mut predicate: F) -> Vec<Command>
    where
        F: FnMut(&[Command]) -> bool,
    {
        for _ in 0..limit {
            let commands = self.step(Vec::new());
            if predicate(&commands) {
                return commands;
            }
        }
        panic!("condition not reached within {limit} frames");
    }

    fn destroy_all(&mut self) -> Vec<Command> {
        let kills = query::enemies(&self.world)
            .iter()
            .map(|enemy| Command::DestroyEnemy { enemy: enemy.id })
            .collect();
        self.step(kills)
    }
}

fn spawns(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, Command::SpawnEnemy { .. }))
        .count()
}

fn boss_spawn(commands: &[Command]) -> Option<EnemyKind> {
    commands.iter().find_map(|command| match command {
        Command::SpawnBoss { kind, .. } => Some(*kind),
        _ => None,
    })
}

fn level(miniboss: Option<EnemyKind>, boss: Option<EnemyKind>) -> LevelDefinition {
    LevelDefinition {
        number: 4,
        name: "Gate".to_owned(),
        world: 1,
        theme: "nebula".to_owned(),
        waves: vec![
            WaveDefinition::new(vec![
                WaveSpawn::new(EnemyKind::Scout, 0.3),
                WaveSpawn::new(EnemyKind::Scout, 0.7),
            ])
            .with_delay(0.5),
            WaveDefinition::new(vec![WaveSpawn::new(EnemyKind::Fighter, 0.5)]).with_delay(1.0),
        ],
        boss,
        miniboss,
        speed_multiplier: 1.0,
        procedural: false,
    }
}

#[test]
fn waves_wait_for_their_delay_and_for_the_field_to_clear() {
    let mut harness = Harness::new(level(None, None));

    let mut frames = 0;
    let first = harness.run_until(120, |commands| {
        frames += 1;
        spawns(commands) > 0
    });
    assert_eq!(spawns(&first), 2);
    assert!(frames as f32 * DT >= 0.5 - DT);
    assert!(first.contains(&Command::AnnounceWave {
        level: 4,
        wave: 0,
        total: 2
    }));
    assert!(first.contains(&Command::RaiseCue {
        cue: Cue::Sound {
            sound: SoundCue::WaveStart
        }
    }));

    for _ in 0..(10.0 / DT) as usize {
        let commands = harness.step(Vec::new());
        assert_eq!(spawns(&commands), 0);
    }
    assert_eq!(harness.manager.waves_spawned(), 1);

    let _ = harness.destroy_all();
    let second = harness.run_until(120, |commands| spawns(commands) > 0);
    assert_eq!(spawns(&second), 1);
    assert_eq!(harness.manager.waves_spawned(), 2);
}

#[test]
fn cleared_waves_hand_off_to_miniboss_then_boss() {
    let mut harness = Harness::new(level(Some(EnemyKind::Warden), Some(EnemyKind::Dreadnought)));

    let _ = harness.run_until(120, |commands| spawns(commands) > 0);
    let _ = harness.destroy_all();
    let _ = harness.run_until(120, |commands| spawns(commands) > 0);

    let cleared = harness.destroy_all();
    assert!(cleared.contains(&Command::RaiseCue {
        cue: Cue::BossWarning {
            kind: EnemyKind::Warden
        }
    }));
    assert_eq!(harness.manager.phase(), WavePhase::AwaitingMiniboss);
    assert!(harness.manager.miniboss_notified());

    let arrival = harness.run_until(300, |commands| boss_spawn(commands).is_some());
    assert_eq!(boss_spawn(&arrival), Some(EnemyKind::Warden));
    assert_eq!(harness.manager.phase(), WavePhase::MinibossActive);

    let defeated = harness.destroy_all();
    assert_eq!(harness.manager.phase(), WavePhase::AwaitingBoss);
    assert!(defeated.contains(&Command::RaiseCue {
        cue: Cue::BossWarning {
            kind: EnemyKind::Dreadnought
        }
    }));

    let arrival = harness.run_until(300, |commands| boss_spawn(commands).is_some());
    assert_eq!(boss_spawn(&arrival), Some(EnemyKind::Dreadnought));
    assert_eq!(harness.manager.phase(), WavePhase::BossActive);

    let finale = harness.destroy_all();
    assert!(finale.contains(&Command::CompleteLevel { level: 4 }));
    assert_eq!(harness.manager.phase(), WavePhase::LevelComplete);

    for _ in 0..120 {
        assert!(harness.step(Vec::new()).is_empty());
    }
}

#[test]
fn miniboss_without_boss_completes_the_level() {
    let mut harness = Harness::new(level(Some(EnemyKind::Harbinger), None));
    let _ = harness.run_until(120, |commands| spawns(commands) > 0);
    let _ = harness.destroy_all();
    let _ = harness.run_until(120, |commands| spawns(commands) > 0);
    let _ = harness.destroy_all();
    let _ = harness.run_until(300, |commands| boss_spawn(commands).is_some());

    let finale = harness.destroy_all();
    assert_eq!(finale, vec![Command::CompleteLevel { level: 4 }]);
    assert_eq!(harness.manager.phase(), WavePhase::LevelComplete);
}

#[test]
fn boss_only_levels_skip_the_miniboss() {
    let mut harness = Harness::new(level(None, Some(EnemyKind::Hydra)));
    let _ = harness.run_until(120, |commands| spawns(commands) > 0);
    let _ = harness.destroy_all();
    let _ = harness.run_until(120, |commands| spawns(commands) > 0);

    let cleared = harness.destroy_all();
    assert_eq!(harness.manager.phase(), WavePhase::AwaitingBoss);
    assert!(cleared.contains(&Command::RaiseCue {
        cue: Cue::Sound {
            sound: SoundCue::BossAlarm
        }
    }));

    let arrival = harness.run_until(300, |commands| boss_spawn(commands).is_some());
    assert_eq!(boss_spawn(&arrival), Some(EnemyKind::Hydra));
    let boss_events = {
        let mut events = Vec::new();
        let id = query::enemies(&harness.world)[0].id;
        world::apply(
            &mut harness.world,
            Command::DestroyEnemy { enemy: id },
            &mut events,
        );
        events
    };
    assert!(boss_events
        .iter()
        .any(|event| matches!(event, Event::BossDefeated { kind: EnemyKind::Hydra, .. })));
}
