//! Hand-authored opening levels.

use nova_siege_core::{
    EnemyKind, Formation, LevelDefinition, MovementPattern, WaveDefinition, WaveSpawn,
};

use EnemyKind::{
    Bomber, Dreadnought, Fighter, Fortress, Gunship, Harbinger, Hydra, Interceptor, Phantom,
    Scout, Sentinel, Swarm, Void, Warden,
};

/// Number of hand-authored levels.
pub(crate) const AUTHORED_LEVELS: u32 = 8;

/// Boss guarding the last level of each world, cycling after the fourth world.
pub(crate) const WORLD_BOSSES: [EnemyKind; 4] = [Dreadnought, Hydra, Fortress, Void];

/// Spreads `kinds` across evenly spaced lanes.
pub(crate) fn spread(kinds: &[EnemyKind]) -> Vec<WaveSpawn> {
    let lanes = kinds.len() as f32 + 1.0;
    kinds
        .iter()
        .enumerate()
        .map(|(slot, kind)| WaveSpawn::new(*kind, (slot as f32 + 1.0) / lanes))
        .collect()
}

fn wave(kinds: &[EnemyKind], delay: f32) -> WaveDefinition {
    WaveDefinition::new(spread(kinds)).with_delay(delay)
}

fn patterned(kinds: &[EnemyKind], pattern: MovementPattern, delay: f32) -> WaveDefinition {
    let spawns = spread(kinds)
        .into_iter()
        .map(|spawn| spawn.with_pattern(pattern))
        .collect();
    WaveDefinition::new(spawns).with_delay(delay)
}

fn level(number: u32, name: &str, theme: &str, waves: Vec<WaveDefinition>) -> LevelDefinition {
    LevelDefinition {
        number,
        name: name.to_owned(),
        world: 0,
        theme: theme.to_owned(),
        waves,
        boss: None,
        miniboss: None,
        speed_multiplier: 1.0,
        procedural: false,
    }
}

/// Authored definition of `number`, if one exists.
pub(crate) fn authored(number: u32) -> Option<LevelDefinition> {
    let definition = match number {
        1 => level(
            1,
            "First Contact",
            "outpost",
            vec![
                wave(&[Scout, Scout, Scout], 1.0),
                wave(&[Scout, Scout, Scout, Scout], 2.0).with_formation(Formation::V),
                patterned(&[Scout, Scout, Scout], MovementPattern::Sine, 2.0),
                wave(&[Fighter, Scout, Scout, Fighter], 2.0),
            ],
        ),
        2 => level(
            2,
            "Picket Line",
            "outpost",
            vec![
                wave(&[Fighter, Fighter, Fighter], 1.0),
                patterned(&[Scout, Scout, Scout, Scout, Scout], MovementPattern::Zigzag, 2.0),
                wave(&[Swarm, Swarm, Swarm, Swarm, Swarm, Swarm], 2.0)
                    .with_formation(Formation::Arc),
                wave(&[Fighter, Scout, Fighter, Scout, Fighter], 2.0)
                    .with_formation(Formation::V),
            ],
        ),
        3 => LevelDefinition {
            miniboss: Some(Warden),
            ..level(
                3,
                "Warden's Reach",
                "outpost",
                vec![
                    wave(&[Interceptor, Scout, Scout, Interceptor], 1.0),
                    wave(&[Fighter, Fighter, Fighter, Fighter], 2.0)
                        .with_formation(Formation::Diamond),
                    wave(&[Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm], 2.0),
                    wave(&[Bomber, Fighter, Bomber], 2.5),
                ],
            )
        },
        4 => level(
            4,
            "Dive Alley",
            "outpost",
            vec![
                wave(&[Interceptor, Interceptor, Interceptor], 1.0),
                wave(&[Bomber, Scout, Scout, Bomber], 2.0),
                patterned(&[Fighter, Fighter, Fighter, Fighter], MovementPattern::Zigzag, 2.0),
                wave(&[Interceptor, Swarm, Swarm, Swarm, Swarm, Interceptor], 2.0)
                    .with_formation(Formation::V),
                wave(&[Bomber, Bomber, Bomber], 2.5).with_formation(Formation::Column),
            ],
        ),
        5 => LevelDefinition {
            miniboss: Some(Warden),
            boss: Some(Dreadnought),
            ..level(
                5,
                "Dreadnought Gate",
                "outpost",
                vec![
                    wave(&[Fighter, Fighter, Fighter, Fighter, Fighter], 1.0)
                        .with_formation(Formation::V),
                    wave(&[Bomber, Interceptor, Interceptor, Bomber], 2.0),
                    wave(&[Gunship, Fighter, Gunship], 2.0),
                    wave(&[Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm], 2.0)
                        .with_formation(Formation::Arc),
                ],
            )
        },
        6 => LevelDefinition {
            speed_multiplier: 1.05,
            ..level(
                6,
                "Ghost Nebula",
                "nebula",
                vec![
                    wave(&[Phantom, Phantom, Phantom], 1.0),
                    wave(&[Fighter, Phantom, Fighter, Phantom, Fighter], 2.0),
                    wave(&[Gunship, Gunship], 2.0),
                    wave(&[Swarm, Phantom, Swarm, Swarm, Phantom, Swarm], 2.0)
                        .with_formation(Formation::Diamond),
                    wave(&[Interceptor, Interceptor, Interceptor, Interceptor], 2.0),
                ],
            )
        },
        7 => LevelDefinition {
            speed_multiplier: 1.05,
            ..level(
                7,
                "Sentinel Array",
                "nebula",
                vec![
                    wave(&[Sentinel, Sentinel], 1.0),
                    wave(&[Bomber, Fighter, Fighter, Bomber], 2.0).with_formation(Formation::V),
                    wave(&[Sentinel, Phantom, Sentinel], 2.0),
                    wave(&[Gunship, Interceptor, Interceptor, Gunship], 2.0),
                    wave(&[Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm], 2.0)
                        .with_formation(Formation::Column),
                ],
            )
        },
        8 => LevelDefinition {
            miniboss: Some(Harbinger),
            speed_multiplier: 1.1,
            ..level(
                8,
                "Harbinger's Wake",
                "nebula",
                vec![
                    wave(&[Phantom, Fighter, Phantom, Fighter], 1.0),
                    wave(&[Sentinel, Gunship, Sentinel], 2.0),
                    wave(&[Interceptor, Bomber, Interceptor, Bomber, Interceptor], 2.0)
                        .with_formation(Formation::Arc),
                    wave(&[Gunship, Phantom, Gunship, Phantom], 2.0),
                    wave(&[Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm, Swarm], 2.5)
                        .with_formation(Formation::Diamond),
                ],
            )
        },
        _ => return None,
    };
    Some(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_authored_level_has_waves_and_matching_numbers() {
        for number in 1..=AUTHORED_LEVELS {
            let definition = authored(number).expect("authored level");
            assert_eq!(definition.number, number);
            assert!(!definition.waves.is_empty());
            assert!(definition.waves.iter().all(|wave| !wave.spawns.is_empty()));
            assert!(!definition.procedural);
        }
        assert!(authored(AUTHORED_LEVELS + 1).is_none());
        assert!(authored(0).is_none());
    }

    #[test]
    fn spread_lanes_stay_inside_the_playfield() {
        let spawns = spread(&[Scout, Scout, Scout]);
        let lanes: Vec<f32> = spawns.iter().map(|spawn| spawn.relative_x).collect();
        assert_eq!(lanes, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn first_world_ends_with_its_boss() {
        let finale = authored(5).expect("authored level");
        assert_eq!(finale.boss, Some(WORLD_BOSSES[0]));
        assert_eq!(finale.miniboss, Some(Warden));
    }
}
