//! Static enemy roster: kinds, base stat tables, movement pattern ids, and boss
//! part layouts.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::enemy::{DefeatRule, PartRole};
use crate::Vec2;

/// Every enemy type the factory can build, bosses included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EnemyKind {
    /// Basic straight-shooting grunt.
    Scout,
    /// Aims its shots at the player.
    Fighter,
    /// Fast, fragile diver.
    Interceptor,
    /// Slow, durable, fires spreads.
    Bomber,
    /// Durable gun platform that fires rings.
    Gunship,
    /// Cloaks periodically and cannot be hit while cloaked.
    Phantom,
    /// Carries a shield that absorbs a fixed number of hits.
    Sentinel,
    /// Small jittering swarm member.
    Swarm,
    /// Turreted miniboss.
    Warden,
    /// Armed miniboss with swinging arms.
    Harbinger,
    /// Multi-part boss of the first world.
    Dreadnought,
    /// Three-headed regenerating boss.
    Hydra,
    /// Shield-cycling turret fortress.
    Fortress,
    /// Teleporting boss that leaves gravity wells.
    Void,
}

impl EnemyKind {
    /// Every kind in declaration order.
    pub const ALL: [EnemyKind; 14] = [
        Self::Scout,
        Self::Fighter,
        Self::Interceptor,
        Self::Bomber,
        Self::Gunship,
        Self::Phantom,
        Self::Sentinel,
        Self::Swarm,
        Self::Warden,
        Self::Harbinger,
        Self::Dreadnought,
        Self::Hydra,
        Self::Fortress,
        Self::Void,
    ];

    /// Kind used when an unknown identifier is encountered.
    pub const FALLBACK: EnemyKind = EnemyKind::Scout;

    /// Stable lowercase identifier used in level files.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Scout => "scout",
            Self::Fighter => "fighter",
            Self::Interceptor => "interceptor",
            Self::Bomber => "bomber",
            Self::Gunship => "gunship",
            Self::Phantom => "phantom",
            Self::Sentinel => "sentinel",
            Self::Swarm => "swarm",
            Self::Warden => "warden",
            Self::Harbinger => "harbinger",
            Self::Dreadnought => "dreadnought",
            Self::Hydra => "hydra",
            Self::Fortress => "fortress",
            Self::Void => "void",
        }
    }

    /// Looks up a kind by identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(id))
    }

    /// Looks up a kind by identifier, falling back to [`EnemyKind::FALLBACK`].
    #[must_use]
    pub fn from_id_or_fallback(id: &str) -> Self {
        Self::from_id(id).unwrap_or_else(|| {
            warn!(id, fallback = Self::FALLBACK.id(), "unknown enemy kind");
            Self::FALLBACK
        })
    }

    /// Reports whether the kind is a full level boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(
            self,
            Self::Dreadnought | Self::Hydra | Self::Fortress | Self::Void
        )
    }

    /// Reports whether the kind is a miniboss.
    #[must_use]
    pub const fn is_miniboss(self) -> bool {
        matches!(self, Self::Warden | Self::Harbinger)
    }

    /// Reports whether the kind runs the boss behavior (boss or miniboss).
    #[must_use]
    pub const fn is_boss_class(self) -> bool {
        self.is_boss() || self.is_miniboss()
    }

    /// Base stat table entry for the kind, before level and difficulty scaling.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Scout => EnemyStats {
                health: 1.0,
                speed: 90.0,
                score: 100,
                radius: 16.0,
                attack_delay: 1.5,
                fire_cooldown: 2.4,
                bullet_speed: 220.0,
                fire: FirePattern::Straight,
                drop_chance: 0.05,
                elite: false,
            },
            Self::Fighter => EnemyStats {
                health: 2.0,
                speed: 110.0,
                score: 150,
                radius: 18.0,
                attack_delay: 1.2,
                fire_cooldown: 2.0,
                bullet_speed: 240.0,
                fire: FirePattern::Aimed,
                drop_chance: 0.08,
                elite: false,
            },
            Self::Interceptor => EnemyStats {
                health: 1.0,
                speed: 170.0,
                score: 200,
                radius: 14.0,
                attack_delay: 0.8,
                fire_cooldown: 2.8,
                bullet_speed: 280.0,
                fire: FirePattern::Straight,
                drop_chance: 0.06,
                elite: false,
            },
            Self::Bomber => EnemyStats {
                health: 5.0,
                speed: 60.0,
                score: 300,
                radius: 24.0,
                attack_delay: 2.0,
                fire_cooldown: 3.0,
                bullet_speed: 180.0,
                fire: FirePattern::Spread {
                    count: 3,
                    arc: 0.6,
                },
                drop_chance: 0.15,
                elite: true,
            },
            Self::Gunship => EnemyStats {
                health: 4.0,
                speed: 70.0,
                score: 350,
                radius: 22.0,
                attack_delay: 2.0,
                fire_cooldown: 3.5,
                bullet_speed: 160.0,
                fire: FirePattern::Burst { count: 8 },
                drop_chance: 0.12,
                elite: true,
            },
            Self::Phantom => EnemyStats {
                health: 3.0,
                speed: 100.0,
                score: 400,
                radius: 18.0,
                attack_delay: 1.5,
                fire_cooldown: 2.2,
                bullet_speed: 250.0,
                fire: FirePattern::Aimed,
                drop_chance: 0.12,
                elite: true,
            },
            Self::Sentinel => EnemyStats {
                health: 4.0,
                speed: 50.0,
                score: 450,
                radius: 22.0,
                attack_delay: 1.8,
                fire_cooldown: 2.6,
                bullet_speed: 200.0,
                fire: FirePattern::Spread {
                    count: 5,
                    arc: 0.9,
                },
                drop_chance: 0.18,
                elite: true,
            },
            Self::Swarm => EnemyStats {
                health: 1.0,
                speed: 130.0,
                score: 80,
                radius: 12.0,
                attack_delay: 2.5,
                fire_cooldown: 3.2,
                bullet_speed: 220.0,
                fire: FirePattern::Straight,
                drop_chance: 0.03,
                elite: false,
            },
            Self::Warden => EnemyStats {
                health: 60.0,
                speed: 80.0,
                score: 2_500,
                radius: 48.0,
                attack_delay: 0.5,
                fire_cooldown: 1.6,
                bullet_speed: 230.0,
                fire: FirePattern::Emitters,
                drop_chance: 1.0,
                elite: true,
            },
            Self::Harbinger => EnemyStats {
                health: 80.0,
                speed: 90.0,
                score: 3_000,
                radius: 52.0,
                attack_delay: 0.5,
                fire_cooldown: 1.5,
                bullet_speed: 240.0,
                fire: FirePattern::Emitters,
                drop_chance: 1.0,
                elite: true,
            },
            Self::Dreadnought => EnemyStats {
                health: 150.0,
                speed: 70.0,
                score: 10_000,
                radius: 72.0,
                attack_delay: 0.5,
                fire_cooldown: 1.4,
                bullet_speed: 240.0,
                fire: FirePattern::Emitters,
                drop_chance: 1.0,
                elite: true,
            },
            Self::Hydra => EnemyStats {
                health: 180.0,
                speed: 75.0,
                score: 12_000,
                radius: 76.0,
                attack_delay: 0.5,
                fire_cooldown: 1.3,
                bullet_speed: 250.0,
                fire: FirePattern::Emitters,
                drop_chance: 1.0,
                elite: true,
            },
            Self::Fortress => EnemyStats {
                health: 220.0,
                speed: 50.0,
                score: 14_000,
                radius: 84.0,
                attack_delay: 0.5,
                fire_cooldown: 0.9,
                bullet_speed: 210.0,
                fire: FirePattern::Emitters,
                drop_chance: 1.0,
                elite: true,
            },
            Self::Void => EnemyStats {
                health: 200.0,
                speed: 90.0,
                score: 16_000,
                radius: 64.0,
                attack_delay: 0.5,
                fire_cooldown: 1.8,
                bullet_speed: 260.0,
                fire: FirePattern::Emitters,
                drop_chance: 1.0,
                elite: true,
            },
        }
    }

    /// Movement pattern used when a level does not name one.
    #[must_use]
    pub const fn default_pattern(self) -> MovementPattern {
        match self {
            Self::Scout | Self::Bomber | Self::Gunship => MovementPattern::Straight,
            Self::Fighter => MovementPattern::Sine,
            Self::Interceptor => MovementPattern::Dive,
            Self::Phantom => MovementPattern::Phantom,
            Self::Sentinel => MovementPattern::Sentinel,
            Self::Swarm => MovementPattern::Swarm,
            Self::Warden | Self::Harbinger | Self::Dreadnought => MovementPattern::Boss,
            Self::Hydra => MovementPattern::BossHydra,
            Self::Fortress => MovementPattern::BossFortress,
            Self::Void => MovementPattern::BossVoid,
        }
    }

    /// Rule deciding when a boss-class kind is defeated.
    #[must_use]
    pub const fn defeat_rule(self) -> DefeatRule {
        match self {
            Self::Harbinger | Self::Hydra | Self::Void => DefeatRule::AggregateHealth,
            _ => DefeatRule::CoreParts,
        }
    }

    /// Part layout for boss-class kinds. Regular kinds have no parts.
    #[must_use]
    pub fn part_layout(self) -> Vec<PartLayout> {
        match self {
            Self::Warden => vec![
                PartLayout::fixed(PartRole::Core, Vec2::ZERO, 30.0, 0.6),
                PartLayout::fixed(PartRole::Turret, Vec2::new(-48.0, 10.0), 16.0, 0.2)
                    .with_emitter(1.8),
                PartLayout::fixed(PartRole::Turret, Vec2::new(48.0, 10.0), 16.0, 0.2)
                    .with_emitter(1.8),
            ],
            Self::Harbinger => vec![
                PartLayout::fixed(PartRole::Core, Vec2::ZERO, 32.0, 0.5),
                PartLayout::fixed(PartRole::Arm, Vec2::new(-56.0, 0.0), 18.0, 0.25)
                    .with_bob(10.0, 2.0, 0.0)
                    .with_emitter(2.2),
                PartLayout::fixed(PartRole::Arm, Vec2::new(56.0, 0.0), 18.0, 0.25)
                    .with_bob(10.0, 2.0, std::f32::consts::PI)
                    .with_emitter(2.2),
            ],
            Self::Dreadnought => vec![
                PartLayout::fixed(PartRole::Core, Vec2::ZERO, 40.0, 0.45),
                PartLayout::fixed(PartRole::Turret, Vec2::new(-70.0, 20.0), 18.0, 0.1)
                    .with_emitter(1.6),
                PartLayout::fixed(PartRole::Turret, Vec2::new(70.0, 20.0), 18.0, 0.1)
                    .with_emitter(1.6),
                PartLayout::fixed(PartRole::Arm, Vec2::new(-100.0, -10.0), 20.0, 0.1)
                    .with_bob(8.0, 1.5, 0.0)
                    .with_emitter(2.4),
                PartLayout::fixed(PartRole::Arm, Vec2::new(100.0, -10.0), 20.0, 0.1)
                    .with_bob(8.0, 1.5, std::f32::consts::PI)
                    .with_emitter(2.4),
                PartLayout::fixed(PartRole::Weakpoint, Vec2::new(0.0, 44.0), 12.0, 0.15),
            ],
            Self::Hydra => vec![
                PartLayout::fixed(PartRole::Core, Vec2::ZERO, 44.0, 0.4),
                PartLayout::fixed(PartRole::Turret, Vec2::new(-60.0, 30.0), 20.0, 0.2)
                    .with_bob(12.0, 1.8, 0.0)
                    .with_emitter(1.9),
                PartLayout::fixed(PartRole::Turret, Vec2::new(0.0, 50.0), 20.0, 0.2)
                    .with_bob(12.0, 1.8, 2.1)
                    .with_emitter(1.9),
                PartLayout::fixed(PartRole::Turret, Vec2::new(60.0, 30.0), 20.0, 0.2)
                    .with_bob(12.0, 1.8, 4.2)
                    .with_emitter(1.9),
            ],
            Self::Fortress => vec![
                PartLayout::fixed(PartRole::Core, Vec2::ZERO, 42.0, 0.5),
                PartLayout::orbiting(PartRole::Turret, 80.0, 0.6, 0.0, 16.0, 0.1)
                    .with_emitter(2.0),
                PartLayout::orbiting(PartRole::Turret, 80.0, 0.6, std::f32::consts::FRAC_PI_2, 16.0, 0.1)
                    .with_emitter(2.0),
                PartLayout::orbiting(PartRole::Turret, 80.0, 0.6, std::f32::consts::PI, 16.0, 0.1)
                    .with_emitter(2.0),
                PartLayout::orbiting(
                    PartRole::Turret,
                    80.0,
                    0.6,
                    std::f32::consts::PI * 1.5,
                    16.0,
                    0.1,
                )
                .with_emitter(2.0),
                PartLayout::fixed(PartRole::Shield, Vec2::new(0.0, 56.0), 26.0, 0.2),
            ],
            Self::Void => vec![
                PartLayout::fixed(PartRole::Core, Vec2::ZERO, 40.0, 0.7),
                PartLayout::orbiting(PartRole::Weakpoint, 58.0, 1.4, 0.0, 10.0, 0.15),
            ],
            _ => Vec::new(),
        }
    }
}

impl From<String> for EnemyKind {
    fn from(id: String) -> Self {
        Self::from_id_or_fallback(&id)
    }
}

/// Named per-frame position update rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum MovementPattern {
    /// Constant downward velocity.
    Straight,
    /// Downward drift with a sinusoidal lateral offset.
    Sine,
    /// Downward drift with a lateral velocity that flips sign periodically.
    Zigzag,
    /// Holds briefly, then dives toward the player.
    Dive,
    /// Slow weaving drift used by phantoms.
    Phantom,
    /// Descends to a hover line, then patrols sideways.
    Sentinel,
    /// Fast tight sine used by swarms.
    Swarm,
    /// Generic boss sweep.
    Boss,
    /// Hydra figure-eight sweep.
    BossHydra,
    /// Slow fortress drift.
    BossFortress,
    /// Wide erratic void sweep.
    BossVoid,
}

impl MovementPattern {
    /// Every pattern in declaration order.
    pub const ALL: [MovementPattern; 11] = [
        Self::Straight,
        Self::Sine,
        Self::Zigzag,
        Self::Dive,
        Self::Phantom,
        Self::Sentinel,
        Self::Swarm,
        Self::Boss,
        Self::BossHydra,
        Self::BossFortress,
        Self::BossVoid,
    ];

    /// Stable lowercase identifier used in level files.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Sine => "sine",
            Self::Zigzag => "zigzag",
            Self::Dive => "dive",
            Self::Phantom => "phantom",
            Self::Sentinel => "sentinel",
            Self::Swarm => "swarm",
            Self::Boss => "boss",
            Self::BossHydra => "boss_hydra",
            Self::BossFortress => "boss_fortress",
            Self::BossVoid => "boss_void",
        }
    }

    /// Looks up a pattern by identifier, falling back to [`MovementPattern::Straight`].
    #[must_use]
    pub fn from_id_or_fallback(id: &str) -> Self {
        let trimmed = id.trim();
        Self::ALL
            .into_iter()
            .find(|pattern| pattern.id().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| {
                warn!(id, "unknown movement pattern, using straight");
                Self::Straight
            })
    }
}

impl From<String> for MovementPattern {
    fn from(id: String) -> Self {
        Self::from_id_or_fallback(&id)
    }
}

/// How a kind fires once its cooldown expires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FirePattern {
    /// Single shot straight down.
    Straight,
    /// Single shot toward the player's centre.
    Aimed,
    /// Fan of bullets centred on straight down.
    Spread {
        /// Number of bullets in the fan.
        count: u32,
        /// Total fan width in radians.
        arc: f32,
    },
    /// Ring of bullets at even angles.
    Burst {
        /// Number of bullets in the ring.
        count: u32,
    },
    /// Independent per-part emitters driven by the boss behavior.
    Emitters,
}

/// Base stats for one kind before scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Base hit points.
    pub health: f32,
    /// Base movement speed in world units per second.
    pub speed: f32,
    /// Base score award.
    pub score: u64,
    /// Collision radius.
    pub radius: f32,
    /// Seconds after spawning before the first shot is allowed.
    pub attack_delay: f32,
    /// Seconds between fire attempts.
    pub fire_cooldown: f32,
    /// Bullet speed in world units per second.
    pub bullet_speed: f32,
    /// Firing pattern.
    pub fire: FirePattern,
    /// Probability of dropping a power-up on death.
    pub drop_chance: f32,
    /// Elites roll against the higher fire probability curve.
    pub elite: bool,
}

/// Template for one boss part before health scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartLayout {
    /// Role of the part.
    pub role: PartRole,
    /// Offset from the boss centre.
    pub offset: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Share of the boss's scaled health assigned to the part.
    pub health_share: f32,
    /// Orbit radius around the offset point.
    pub orbit_radius: f32,
    /// Orbit speed in radians per second.
    pub orbit_speed: f32,
    /// Vertical bob amplitude.
    pub bob_amplitude: f32,
    /// Bob speed in radians per second.
    pub bob_speed: f32,
    /// Phase shared by orbit and bob.
    pub phase: f32,
    /// Seconds between emitter shots, zero when the part never fires.
    pub emitter_cooldown: f32,
}

impl PartLayout {
    const fn fixed(role: PartRole, offset: Vec2, radius: f32, health_share: f32) -> Self {
        Self {
            role,
            offset,
            radius,
            health_share,
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            bob_amplitude: 0.0,
            bob_speed: 0.0,
            phase: 0.0,
            emitter_cooldown: 0.0,
        }
    }

    const fn orbiting(
        role: PartRole,
        orbit_radius: f32,
        orbit_speed: f32,
        phase: f32,
        radius: f32,
        health_share: f32,
    ) -> Self {
        Self {
            role,
            offset: Vec2::ZERO,
            radius,
            health_share,
            orbit_radius,
            orbit_speed,
            bob_amplitude: 0.0,
            bob_speed: 0.0,
            phase,
            emitter_cooldown: 0.0,
        }
    }

    const fn with_bob(mut self, amplitude: f32, speed: f32, phase: f32) -> Self {
        self.bob_amplitude = amplitude;
        self.bob_speed = speed;
        self.phase = phase;
        self
    }

    const fn with_emitter(mut self, cooldown: f32) -> Self {
        self.emitter_cooldown = cooldown;
        self
    }
}
