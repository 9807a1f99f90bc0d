//! Procedural levels past the authored campaign.
//!
//! Every level draws from a fixed enemy pool keyed by difficulty tier. The RNG
//! stream for a level is seeded from SHA-256 over the catalog seed and the level
//! number, so a level looks the same no matter which levels were generated
//! before it.

use nova_siege_core::{EnemyKind, Formation, LevelDefinition, MovementPattern, WaveDefinition};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::authored::{spread, AUTHORED_LEVELS, WORLD_BOSSES};
use crate::{world_of, LEVELS_PER_WORLD};

use EnemyKind::{
    Bomber, Fighter, Gunship, Harbinger, Interceptor, Phantom, Scout, Sentinel, Swarm, Warden,
};

const SEED_LABEL: &str = "nova-siege-level";
const MAX_TIER: u32 = 4;
const MAX_WAVE_SIZE: usize = 10;
const PATTERN_OVERRIDE_CHANCE: f64 = 0.3;
const SPEED_STEP: f32 = 0.02;
const MAX_SPEED: f32 = 1.5;
const FORMATIONS: [Formation; 5] = [
    Formation::Line,
    Formation::V,
    Formation::Diamond,
    Formation::Column,
    Formation::Arc,
];
const THEMES: [&str; 4] = ["outpost", "nebula", "foundry", "rift"];

/// Enemy pool unlocked at `tier`. Higher tiers keep every lower-tier kind.
#[must_use]
pub fn tier_pool(tier: u32) -> &'static [EnemyKind] {
    const POOL: [EnemyKind; 8] = [
        Scout,
        Fighter,
        Swarm,
        Interceptor,
        Bomber,
        Gunship,
        Phantom,
        Sentinel,
    ];
    match tier.clamp(1, MAX_TIER) {
        1 => &POOL[..3],
        2 => &POOL[..5],
        3 => &POOL[..7],
        _ => &POOL,
    }
}

/// Difficulty tier of `number`: one per world, capped at the last pool.
#[must_use]
pub fn tier_of(number: u32) -> u32 {
    world_of(number).min(MAX_TIER)
}

/// Deterministically generates level `number` from `catalog_seed`.
#[must_use]
pub fn generate(catalog_seed: u64, number: u32) -> LevelDefinition {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_level_seed(catalog_seed, number));
    let tier = tier_of(number);
    let world = world_of(number);
    let pool = tier_pool(tier);

    let wave_count = 4 + tier as usize + rng.gen_range(0..=1);
    let waves = (0..wave_count)
        .map(|index| {
            let size = (3 + tier as usize + index / 2).min(MAX_WAVE_SIZE);
            let kinds: Vec<EnemyKind> = (0..size)
                .map(|_| pool[rng.gen_range(0..pool.len())])
                .collect();
            let mut spawns = spread(&kinds);
            if rng.gen_bool(PATTERN_OVERRIDE_CHANCE) {
                let pattern = if rng.gen_bool(0.5) {
                    MovementPattern::Sine
                } else {
                    MovementPattern::Zigzag
                };
                for spawn in &mut spawns {
                    if spawn.kind.default_pattern() == MovementPattern::Straight {
                        *spawn = spawn.with_pattern(pattern);
                    }
                }
            }
            let delay = if index == 0 {
                1.0
            } else {
                rng.gen_range(1.5..=2.5)
            };
            let formation = FORMATIONS[rng.gen_range(0..FORMATIONS.len())];
            WaveDefinition::new(spawns)
                .with_delay(delay)
                .with_formation(formation)
        })
        .collect();

    let position_in_world = number.saturating_sub(1) % LEVELS_PER_WORLD + 1;
    let (miniboss, boss) = match position_in_world {
        3 => (Some(miniboss_for(world)), None),
        5 => (
            Some(miniboss_for(world)),
            Some(WORLD_BOSSES[((world - 1) as usize) % WORLD_BOSSES.len()]),
        ),
        _ => (None, None),
    };

    LevelDefinition {
        number,
        name: format!("Sector {number}"),
        world,
        theme: THEMES[((world - 1) as usize) % THEMES.len()].to_owned(),
        waves,
        boss,
        miniboss,
        speed_multiplier: speed_for(number),
        procedural: true,
    }
}

/// Speed multiplier ramping past the authored campaign.
#[must_use]
pub fn speed_for(number: u32) -> f32 {
    let past_campaign = number.saturating_sub(AUTHORED_LEVELS) as f32;
    (1.0 + past_campaign * SPEED_STEP).min(MAX_SPEED)
}

fn miniboss_for(world: u32) -> EnemyKind {
    if world % 2 == 1 {
        Warden
    } else {
        Harbinger
    }
}

fn derive_level_seed(catalog_seed: u64, number: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(catalog_seed.to_le_bytes());
    hasher.update(SEED_LABEL.as_bytes());
    hasher.update(number.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_replays_for_the_same_seed() {
        assert_eq!(generate(42, 17), generate(42, 17));
        assert_ne!(generate(42, 17), generate(43, 17));
    }

    #[test]
    fn level_seeds_do_not_depend_on_generation_order() {
        let later_first = (generate(9, 20), generate(9, 12));
        assert_eq!(later_first.1, generate(9, 12));
        assert_ne!(derive_level_seed(9, 12), derive_level_seed(9, 13));
    }

    #[test]
    fn generated_levels_only_use_their_tier_pool() {
        for number in 9..=30 {
            let level = generate(7, number);
            let pool = tier_pool(tier_of(number));
            assert!(level.procedural);
            assert_eq!(level.world, world_of(number));
            for wave in &level.waves {
                assert!(!wave.spawns.is_empty());
                assert!(wave.spawns.len() <= MAX_WAVE_SIZE);
                assert!(wave.spawns.iter().all(|spawn| pool.contains(&spawn.kind)));
                assert!(wave
                    .spawns
                    .iter()
                    .all(|spawn| (0.0..=1.0).contains(&spawn.relative_x)));
            }
        }
    }

    #[test]
    fn world_finales_carry_the_world_boss() {
        assert_eq!(generate(1, 10).boss, Some(EnemyKind::Hydra));
        assert_eq!(generate(1, 15).boss, Some(EnemyKind::Fortress));
        assert_eq!(generate(1, 20).boss, Some(EnemyKind::Void));
        assert_eq!(generate(1, 25).boss, Some(EnemyKind::Dreadnought));
        assert_eq!(generate(1, 13).boss, None);
        assert!(generate(1, 13).miniboss.is_some());
        assert_eq!(generate(1, 11).miniboss, None);
    }

    #[test]
    fn pools_grow_with_tier() {
        for tier in 1..MAX_TIER {
            let lower = tier_pool(tier);
            let higher = tier_pool(tier + 1);
            assert!(higher.len() > lower.len());
            assert!(lower.iter().all(|kind| higher.contains(kind)));
        }
        assert!(tier_pool(0) == tier_pool(1));
        assert!(tier_pool(99) == tier_pool(MAX_TIER));
    }

    #[test]
    fn speed_ramps_after_the_campaign_and_caps() {
        assert_eq!(speed_for(AUTHORED_LEVELS), 1.0);
        assert!(speed_for(12) > speed_for(11));
        assert_eq!(speed_for(500), MAX_SPEED);
    }
}
