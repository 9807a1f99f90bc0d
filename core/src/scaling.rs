//! Level and difficulty scaling baked into enemies at spawn time, plus the
//! provider traits through which external difficulty and perk state enter the
//! engine.

use serde::{Deserialize, Serialize};

/// Health and speed multiplier applied to regular enemies at `level`.
///
/// Grows by 8% per level through level 10 and by 15% per level afterwards.
#[must_use]
pub fn enemy_level_multiplier(level: u32) -> f32 {
    let level = level.max(1) as f32;
    if level <= 10.0 {
        1.0 + (level - 1.0) * 0.08
    } else {
        1.72 + (level - 10.0) * 0.15
    }
}

/// Health multiplier applied to bosses and minibosses at `level`.
///
/// Grows faster than [`enemy_level_multiplier`] so it never falls below it.
#[must_use]
pub fn boss_level_multiplier(level: u32) -> f32 {
    let level = level.max(1) as f32;
    if level <= 10.0 {
        1.0 + (level - 1.0) * 0.12
    } else {
        2.08 + (level - 10.0) * 0.2
    }
}

/// Score multiplier applied to every kill at `level`.
#[must_use]
pub fn score_level_multiplier(level: u32) -> f32 {
    let level = level.max(1) as f32;
    if level <= 10.0 {
        1.0 + (level - 1.0) * 0.1
    } else {
        1.9 + (level - 10.0) * 0.15
    }
}

/// Difficulty-setting multipliers supplied by the surrounding game.
pub trait DifficultyProfile {
    /// Multiplier applied to enemy hit points.
    fn health_multiplier(&self) -> f32 {
        1.0
    }

    /// Multiplier applied to enemy movement speed.
    fn speed_multiplier(&self) -> f32 {
        1.0
    }

    /// Multiplier applied to enemy fire rate. Values above one shorten cooldowns.
    fn fire_rate_multiplier(&self) -> f32 {
        1.0
    }

    /// Multiplier applied to enemy bullet speed.
    fn bullet_speed_multiplier(&self) -> f32 {
        1.0
    }
}

/// Difficulty profile with every multiplier at one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StandardDifficulty;

impl DifficultyProfile for StandardDifficulty {}

/// Player perk state consumed by collision resolution.
pub trait PerkModifiers {
    /// Multiplier applied to every player projectile.
    fn damage_multiplier(&self) -> f32 {
        1.0
    }

    /// Probability in `[0, 1]` that a hit is critical.
    fn crit_chance(&self) -> f32 {
        0.0
    }

    /// Multiplier applied on a critical hit.
    fn crit_multiplier(&self) -> f32 {
        2.0
    }

    /// Extra enemies each player projectile passes through.
    fn pierce_count(&self) -> u32 {
        0
    }

    /// Splash radius around each impact, zero disables splash.
    fn splash_radius(&self) -> f32 {
        0.0
    }

    /// Fraction of the hit dealt as splash at distance zero.
    fn splash_fraction(&self) -> f32 {
        0.5
    }

    /// Probability in `[0, 1]` that an incoming hit on the player is phased out.
    fn phase_chance(&self) -> f32 {
        0.0
    }
}

/// Perk state with no perks bought.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoPerks;

impl PerkModifiers for NoPerks {}

/// Multipliers baked into an enemy by the factory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnScaling {
    /// Level the enemy spawned on.
    pub level: u32,
    /// Applied to max health.
    pub health_multiplier: f32,
    /// Applied to movement speed.
    pub speed_multiplier: f32,
    /// Applied to the score award.
    pub score_multiplier: f32,
    /// Divides the fire cooldown.
    pub fire_rate_multiplier: f32,
    /// Applied to bullet speed.
    pub bullet_speed_multiplier: f32,
}

impl SpawnScaling {
    /// Scaling that leaves base stats untouched.
    pub const IDENTITY: SpawnScaling = SpawnScaling {
        level: 1,
        health_multiplier: 1.0,
        speed_multiplier: 1.0,
        score_multiplier: 1.0,
        fire_rate_multiplier: 1.0,
        bullet_speed_multiplier: 1.0,
    };

    /// Combines level curves, the difficulty profile and the level's speed
    /// multiplier into one scaling record.
    #[must_use]
    pub fn for_level(
        level: u32,
        boss_class: bool,
        difficulty: &dyn DifficultyProfile,
        level_speed: f32,
    ) -> Self {
        let level_health = if boss_class {
            boss_level_multiplier(level)
        } else {
            enemy_level_multiplier(level)
        };
        // Bosses keep their authored pace; only hit points follow the level curve.
        let level_pace = if boss_class {
            1.0
        } else {
            enemy_level_multiplier(level).sqrt()
        };

        Self {
            level: level.max(1),
            health_multiplier: level_health * difficulty.health_multiplier(),
            speed_multiplier: level_pace * level_speed.max(0.1) * difficulty.speed_multiplier(),
            score_multiplier: score_level_multiplier(level),
            fire_rate_multiplier: difficulty.fire_rate_multiplier().max(0.1),
            bullet_speed_multiplier: difficulty.bullet_speed_multiplier(),
        }
    }
}

impl Default for SpawnScaling {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnemyId, EnemyInstance, EnemyKind, Tuning, Vec2};

    struct Hard;

    impl DifficultyProfile for Hard {
        fn health_multiplier(&self) -> f32 {
            1.5
        }

        fn fire_rate_multiplier(&self) -> f32 {
            1.25
        }
    }

    #[test]
    fn level_curves_are_monotonic_and_bosses_scale_harder() {
        let mut previous = (0.0, 0.0, 0.0);
        for level in 1..=30 {
            let enemy = enemy_level_multiplier(level);
            let boss = boss_level_multiplier(level);
            let score = score_level_multiplier(level);
            assert!(enemy > previous.0, "enemy curve flat at level {level}");
            assert!(boss > previous.1, "boss curve flat at level {level}");
            assert!(score > previous.2, "score curve flat at level {level}");
            assert!(boss >= enemy, "boss below regular at level {level}");
            previous = (enemy, boss, score);
        }
    }

    #[test]
    fn spawned_health_and_score_never_drop_as_levels_rise() {
        let tuning = Tuning::default();
        for kind in EnemyKind::ALL {
            let boss_class = kind.is_boss_class();
            let mut previous = (0.0, 0);
            for level in 1..=30 {
                let scaling = SpawnScaling::for_level(level, boss_class, &StandardDifficulty, 1.0);
                let enemy = if boss_class {
                    EnemyInstance::spawn_boss(
                        EnemyId::new(0),
                        kind,
                        Vec2::new(400.0, -100.0),
                        Vec2::new(400.0, 130.0),
                        &scaling,
                        &tuning,
                    )
                } else {
                    EnemyInstance::spawn(
                        EnemyId::new(0),
                        kind,
                        Vec2::ZERO,
                        kind.default_pattern(),
                        &scaling,
                        &tuning,
                    )
                };
                assert!(
                    enemy.max_health >= previous.0,
                    "{kind:?} health dropped at level {level}"
                );
                assert!(
                    enemy.score_value >= previous.1,
                    "{kind:?} score dropped at level {level}"
                );
                previous = (enemy.max_health, enemy.score_value);

                if boss_class {
                    let regular = SpawnScaling::for_level(level, false, &StandardDifficulty, 1.0);
                    let as_boss = EnemyInstance::spawn(
                        EnemyId::new(0),
                        kind,
                        Vec2::ZERO,
                        kind.default_pattern(),
                        &scaling,
                        &tuning,
                    );
                    let as_regular = EnemyInstance::spawn(
                        EnemyId::new(0),
                        kind,
                        Vec2::ZERO,
                        kind.default_pattern(),
                        &regular,
                        &tuning,
                    );
                    assert!(as_boss.max_health >= as_regular.max_health);
                }
            }
        }
    }

    #[test]
    fn curves_are_continuous_at_the_knee() {
        assert!((enemy_level_multiplier(10) - 1.72).abs() < 1e-5);
        assert!((enemy_level_multiplier(11) - 1.87).abs() < 1e-5);
        assert!((boss_level_multiplier(10) - 2.08).abs() < 1e-5);
        assert!((score_level_multiplier(10) - 1.9).abs() < 1e-5);
    }

    #[test]
    fn level_zero_is_treated_as_level_one() {
        assert_eq!(enemy_level_multiplier(0), 1.0);
        assert_eq!(SpawnScaling::for_level(0, false, &StandardDifficulty, 1.0).level, 1);
    }

    #[test]
    fn difficulty_profile_multiplies_level_curve() {
        let scaling = SpawnScaling::for_level(5, false, &Hard, 1.0);
        let expected = enemy_level_multiplier(5) * 1.5;
        assert!((scaling.health_multiplier - expected).abs() < 1e-5);
        assert!((scaling.fire_rate_multiplier - 1.25).abs() < 1e-6);
    }

    #[test]
    fn boss_scaling_uses_boss_curve() {
        let boss = SpawnScaling::for_level(12, true, &StandardDifficulty, 1.0);
        let regular = SpawnScaling::for_level(12, false, &StandardDifficulty, 1.0);
        assert!(boss.health_multiplier > regular.health_multiplier);
    }
}
