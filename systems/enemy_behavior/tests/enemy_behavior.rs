use std::time::Duration;

use nova_siege_core::{
    BehaviorContext, Command, Cue, EnemyId, EnemyKind, Event, ExplosionSize, MovementPattern,
    PowerUpKind, SoundCue, SpawnScaling, Tuning, Vec2,
};
use nova_siege_system_enemy_behavior::{EnemyBehavior, Rewards};
use nova_siege_world::{self as world, query, World};
use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DT: f32 = 1.0 / 60.0;

fn spawn(world: &mut World, kind: EnemyKind, position: Vec2) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            kind,
            position,
            pattern: MovementPattern::Straight,
            scaling: SpawnScaling::IDENTITY,
        },
        &mut events,
    );
}

fn frame<R: rand::Rng>(
    world: &mut World,
    behavior: &mut EnemyBehavior,
    tuning: &Tuning,
    rng: &mut R,
) -> (Vec<Command>, Vec<Event>) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_secs_f32(DT),
        },
        &mut events,
    );
    let player = query::player(world);
    let bounds = query::bounds(world);
    let ctx = BehaviorContext {
        player: Some(player),
        bounds,
        level: 1,
        tuning,
    };
    let mut commands = Vec::new();
    behavior.handle(DT, world::enemies_mut(world), &ctx, rng, &mut commands);
    for command in commands.clone() {
        world::apply(world, command, &mut events);
    }
    (commands, events)
}

fn bullets(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, Command::SpawnBullet { .. }))
        .count()
}

#[test]
fn attack_waits_for_initial_delay_then_fires() {
    let tuning = Tuning::default();
    let mut world = World::new();
    let mut behavior = EnemyBehavior::new();
    let mut rng = StepRng::new(0, 0);
    spawn(&mut world, EnemyKind::Scout, Vec2::new(400.0, 40.0));

    let delay = EnemyKind::Scout.stats().attack_delay;
    let mut fired_early = 0;
    let mut fired_total = 0;
    for index in 0..(5.0 / DT) as usize {
        let (commands, _) = frame(&mut world, &mut behavior, &tuning, &mut rng);
        let shots = bullets(&commands);
        if (index as f32 + 1.0) * DT < delay {
            fired_early += shots;
        }
        fired_total += shots;
    }

    assert_eq!(fired_early, 0);
    assert!(fired_total >= 1);
}

#[test]
fn failed_fire_rolls_hold_fire() {
    let tuning = Tuning::default();
    let mut world = World::new();
    let mut behavior = EnemyBehavior::new();
    let mut rng = StepRng::new(u64::MAX, 0);
    spawn(&mut world, EnemyKind::Fighter, Vec2::new(400.0, 40.0));

    let mut fired = 0;
    for _ in 0..(4.0 / DT) as usize {
        let (commands, _) = frame(&mut world, &mut behavior, &tuning, &mut rng);
        fired += bullets(&commands);
    }
    assert_eq!(fired, 0);
}

#[test]
fn enemies_leaving_the_bottom_are_despawned_without_reward() {
    let tuning = Tuning::default();
    let mut world = World::new();
    let mut behavior = EnemyBehavior::new();
    let mut rng = StepRng::new(u64::MAX, 0);
    spawn(&mut world, EnemyKind::Scout, Vec2::new(400.0, 630.0));

    let (commands, events) = frame(&mut world, &mut behavior, &tuning, &mut rng);

    assert!(commands.contains(&Command::DespawnEnemy {
        enemy: EnemyId::new(0)
    }));
    assert!(events.contains(&Event::EnemyEscaped {
        enemy: EnemyId::new(0),
        kind: EnemyKind::Scout
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyDestroyed { .. })));
    assert_eq!(query::active_enemy_count(&world), 0);
}

#[test]
fn identical_seeds_drive_identical_behavior() {
    let run = |seed: u64| {
        let tuning = Tuning::default();
        let mut world = World::new();
        let mut behavior = EnemyBehavior::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for (index, kind) in [EnemyKind::Fighter, EnemyKind::Bomber, EnemyKind::Swarm]
            .into_iter()
            .enumerate()
        {
            spawn(&mut world, kind, Vec2::new(200.0 + index as f32 * 150.0, 30.0));
        }
        let mut log = Vec::new();
        for _ in 0..300 {
            let (commands, _) = frame(&mut world, &mut behavior, &tuning, &mut rng);
            log.extend(commands);
        }
        log
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn regular_kill_awards_score_and_medium_explosion() {
    let tuning = Tuning::default();
    let mut rewards = Rewards::new();
    let mut rng = StepRng::new(u64::MAX, 0);
    let events = vec![Event::EnemyDestroyed {
        enemy: EnemyId::new(3),
        kind: EnemyKind::Fighter,
        position: Vec2::new(10.0, 20.0),
        score_value: 150,
        drop_chance: 0.08,
    }];
    let mut out = Vec::new();

    rewards.handle(&events, 1, &tuning, &mut rng, &mut out);

    assert_eq!(
        out,
        vec![
            Command::AddScore { points: 150 },
            Command::SpawnExplosion {
                position: Vec2::new(10.0, 20.0),
                size: ExplosionSize::Medium,
            },
        ]
    );
}

#[test]
fn boss_kill_drops_large_explosion_cues_and_power_up() {
    let tuning = Tuning::default();
    let mut rewards = Rewards::new();
    let mut rng = StepRng::new(0, 0);
    let position = Vec2::new(400.0, 130.0);
    let events = vec![
        Event::EnemyDestroyed {
            enemy: EnemyId::new(1),
            kind: EnemyKind::Dreadnought,
            position,
            score_value: 10_000,
            drop_chance: 1.0,
        },
        Event::BossDefeated {
            enemy: EnemyId::new(1),
            kind: EnemyKind::Dreadnought,
        },
    ];
    let mut out = Vec::new();

    rewards.handle(&events, 5, &tuning, &mut rng, &mut out);

    assert!(out.contains(&Command::SpawnExplosion {
        position,
        size: ExplosionSize::Large,
    }));
    assert!(out.contains(&Command::SpawnPowerUp {
        position,
        kind: PowerUpKind::Weapon,
    }));
    assert!(out.contains(&Command::RaiseCue {
        cue: Cue::Sound {
            sound: SoundCue::BossDefeated
        }
    }));
    assert!(out
        .iter()
        .any(|command| matches!(command, Command::RaiseCue { cue: Cue::CameraShake { .. } })));
}
