//! Mutable enemy state and the damage contract shared by every system.
//!
//! [`EnemyInstance`] covers regular enemies and boss-class enemies alike. Boss
//! classes additionally carry a [`BossFrame`] with their parts and intro state.
//! All rejections and reductions (cloak, shield, intro invulnerability,
//! teleport reduction) run inside [`EnemyInstance::take_part_damage`] before any
//! health changes, so callers only ever observe the final [`DamageOutcome`].

use crate::roster::{EnemyKind, FirePattern, MovementPattern};
use crate::scaling::SpawnScaling;
use crate::tuning::Tuning;
use crate::{EnemyId, Vec2};
use serde::{Deserialize, Serialize};

/// Live enemy owned by the world.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyInstance {
    /// Identifier assigned by the world.
    pub id: EnemyId,
    /// Kind tag selecting stats and strategies.
    pub kind: EnemyKind,
    /// Centre of the enemy.
    pub position: Vec2,
    /// Velocity applied during the last update.
    pub velocity: Vec2,
    /// Lane origin that oscillating patterns swing around.
    pub anchor: Vec2,
    /// Current hit points, never negative.
    pub health: f32,
    /// Hit points at spawn after scaling.
    pub max_health: f32,
    /// Movement speed after scaling.
    pub speed: f32,
    /// Score awarded on death after scaling.
    pub score_value: u64,
    /// Collision radius.
    pub radius: f32,
    /// Movement rule.
    pub pattern: MovementPattern,
    /// Seconds the movement pattern has been running.
    pub pattern_timer: f32,
    /// Seconds left before the enemy may attack.
    pub attack_delay: f32,
    /// Seconds left before the next fire attempt.
    pub shoot_cooldown: f32,
    /// Seconds between fire attempts after scaling.
    pub fire_cooldown: f32,
    /// Bullet speed after scaling.
    pub bullet_speed: f32,
    /// Firing pattern.
    pub fire: FirePattern,
    /// Whether the enemy rolls against the elite fire curve.
    pub elite: bool,
    /// Probability of dropping a power-up on death.
    pub drop_chance: f32,
    /// Level the enemy spawned on.
    pub level: u32,
    /// False once the enemy has been destroyed or despawned.
    pub active: bool,
    /// Heading locked in once a dive commits.
    pub dive_heading: Option<Vec2>,
    /// Type-specific mechanic state.
    pub special: SpecialState,
    /// Parts and intro state for boss-class enemies.
    pub boss: Option<BossFrame>,
}

impl EnemyInstance {
    /// Builds a regular enemy with scaling baked into its stats.
    #[must_use]
    pub fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        position: Vec2,
        pattern: MovementPattern,
        scaling: &SpawnScaling,
        tuning: &Tuning,
    ) -> Self {
        let stats = kind.stats();
        let max_health = (stats.health * scaling.health_multiplier).max(1.0);
        let fire_cooldown = stats.fire_cooldown / scaling.fire_rate_multiplier.max(0.1);

        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            anchor: position,
            health: max_health,
            max_health,
            speed: stats.speed * scaling.speed_multiplier,
            score_value: (stats.score as f32 * scaling.score_multiplier).round() as u64,
            radius: stats.radius,
            pattern,
            pattern_timer: 0.0,
            attack_delay: stats.attack_delay,
            shoot_cooldown: fire_cooldown,
            fire_cooldown,
            bullet_speed: stats.bullet_speed * scaling.bullet_speed_multiplier,
            fire: stats.fire,
            elite: stats.elite,
            drop_chance: stats.drop_chance,
            level: scaling.level,
            active: true,
            dive_heading: None,
            special: SpecialState::for_kind(kind, position, tuning),
            boss: None,
        }
    }

    /// Builds a boss or miniboss that enters at `entry` and flies to `battle_position`.
    #[must_use]
    pub fn spawn_boss(
        id: EnemyId,
        kind: EnemyKind,
        entry: Vec2,
        battle_position: Vec2,
        scaling: &SpawnScaling,
        tuning: &Tuning,
    ) -> Self {
        let mut enemy = Self::spawn(id, kind, entry, kind.default_pattern(), scaling, tuning);
        let total = enemy.max_health;
        let parts: Vec<Part> = kind
            .part_layout()
            .into_iter()
            .map(|layout| {
                let health = (total * layout.health_share).max(1.0);
                Part {
                    role: layout.role,
                    offset: layout.offset,
                    radius: layout.radius,
                    health,
                    max_health: health,
                    destroyed: false,
                    orbit_radius: layout.orbit_radius,
                    orbit_speed: layout.orbit_speed,
                    bob_amplitude: layout.bob_amplitude,
                    bob_speed: layout.bob_speed,
                    phase: layout.phase,
                    emitter_cooldown: layout.emitter_cooldown / scaling.fire_rate_multiplier.max(0.1),
                    emitter_timer: layout.emitter_cooldown,
                }
            })
            .collect();

        let defeat_rule = kind.defeat_rule();
        if defeat_rule == DefeatRule::CoreParts {
            if let Some(core) = parts.iter().find(|part| part.role == PartRole::Core) {
                enemy.max_health = core.max_health;
                enemy.health = core.health;
            }
        }

        enemy.anchor = battle_position;
        enemy.boss = Some(BossFrame {
            intro: IntroPhase::Warning,
            intro_timer: tuning.boss.warning_secs,
            entry_position: entry,
            battle_position,
            parts,
            defeat_rule,
            clock: 0.0,
            weakpoint_multiplier: tuning.boss.weakpoint_multiplier,
        });
        enemy
    }

    /// Applies damage to the enemy's body, or to its core for boss-class enemies.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        self.take_part_damage(None, amount)
    }

    /// Applies damage, routing it to `part` for boss-class enemies.
    ///
    /// Death is reported exactly once; every later call is blocked with
    /// [`BlockReason::Destroyed`].
    pub fn take_part_damage(&mut self, part: Option<usize>, amount: f32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Blocked(BlockReason::Destroyed);
        }
        if let Some(frame) = &self.boss {
            if frame.intro != IntroPhase::Deployed {
                return DamageOutcome::Blocked(BlockReason::Invulnerable);
            }
        }

        let mut amount = amount.max(0.0);
        match &mut self.special {
            SpecialState::Cloak {
                opacity, threshold, ..
            } if *opacity < *threshold => {
                return DamageOutcome::Blocked(BlockReason::Cloaked);
            }
            SpecialState::Shield { hits_remaining } if *hits_remaining > 0 => {
                *hits_remaining -= 1;
                return DamageOutcome::Absorbed {
                    shield_remaining: *hits_remaining,
                };
            }
            SpecialState::ShieldPhase { shielded: true, .. } => {
                return DamageOutcome::Blocked(BlockReason::Shielded);
            }
            SpecialState::Teleport {
                phase,
                damage_factor,
                ..
            } if *phase != TeleportPhase::Idle => {
                amount *= *damage_factor;
            }
            _ => {}
        }

        match self.boss.as_mut() {
            Some(frame) if !frame.parts.is_empty() => {
                let outcome = frame.apply_part_damage(part, amount, &mut self.health);
                if outcome.killed() {
                    self.health = 0.0;
                    let _ = self.destroy();
                }
                outcome
            }
            _ => {
                self.health = (self.health - amount).max(0.0);
                if self.health <= 0.0 {
                    let _ = self.destroy();
                    DamageOutcome::Killed {
                        part_destroyed: None,
                    }
                } else {
                    DamageOutcome::Damaged {
                        remaining: self.health,
                        part_destroyed: None,
                    }
                }
            }
        }
    }

    /// Health clamped for display.
    #[must_use]
    pub fn display_health(&self) -> f32 {
        self.health.max(0.0)
    }

    /// Reports whether the enemy is still in play.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.active && self.health > 0.0
    }

    /// Marks the enemy destroyed. Returns `true` only on the first call.
    pub fn destroy(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.health = 0.0;
        true
    }

    /// Current opacity for cloaking and teleporting kinds, one otherwise.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        match &self.special {
            SpecialState::Cloak { opacity, .. } | SpecialState::Teleport { opacity, .. } => {
                *opacity
            }
            _ => 1.0,
        }
    }

    /// Reports whether the enemy has finished its intro, always true for regular enemies.
    #[must_use]
    pub fn is_deployed(&self) -> bool {
        self.boss
            .as_ref()
            .map_or(true, |frame| frame.intro == IntroPhase::Deployed)
    }
}

/// Why a hit was rejected outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// The enemy is cloaked below the visibility threshold.
    Cloaked,
    /// A phase shield blocks every hit.
    Shielded,
    /// A boss is still in its intro.
    Invulnerable,
    /// The enemy is already dead.
    Destroyed,
    /// The targeted part was already destroyed.
    PartDestroyed,
}

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// The hit was rejected.
    Blocked(BlockReason),
    /// A shield counter absorbed the hit.
    Absorbed {
        /// Shield hits left.
        shield_remaining: u32,
    },
    /// Health dropped but the enemy lives.
    Damaged {
        /// Health left.
        remaining: f32,
        /// Part destroyed by this hit, if any.
        part_destroyed: Option<usize>,
    },
    /// The hit killed the enemy.
    Killed {
        /// Part destroyed by this hit, if any.
        part_destroyed: Option<usize>,
    },
}

impl DamageOutcome {
    /// Reports whether the hit killed the enemy.
    #[must_use]
    pub const fn killed(&self) -> bool {
        matches!(self, Self::Killed { .. })
    }

    /// Part destroyed by the hit, if any.
    #[must_use]
    pub const fn part_destroyed(&self) -> Option<usize> {
        match self {
            Self::Damaged { part_destroyed, .. } | Self::Killed { part_destroyed } => {
                *part_destroyed
            }
            _ => None,
        }
    }
}

/// Typed special-mechanic state chosen at spawn time.
#[derive(Clone, Debug, PartialEq)]
pub enum SpecialState {
    /// No special mechanic.
    None,
    /// Phantom cloak cycle.
    Cloak {
        /// Current opacity in `[0, 1]`.
        opacity: f32,
        /// Cycle phase in radians.
        phase: f32,
        /// Damage is rejected below this opacity.
        threshold: f32,
    },
    /// Sentinel hit-absorbing shield.
    Shield {
        /// Hits left before the shield is gone for good.
        hits_remaining: u32,
    },
    /// Swarm lateral jitter.
    Jitter {
        /// Current lateral offset from the lane.
        offset: f32,
        /// Current jitter direction, `1` or `-1`.
        direction: f32,
        /// Seconds until the next direction flip.
        timer: f32,
    },
    /// Hydra regeneration and enrage.
    Regenerate {
        /// Seconds until the next regeneration pulse.
        timer: f32,
        /// Whether every head has switched to rapid aimed fire.
        enraged: bool,
    },
    /// Fortress shield cycle and rotating turret.
    ShieldPhase {
        /// Whether the shield currently blocks every hit.
        shielded: bool,
        /// Seconds left in the current phase.
        timer: f32,
        /// Turret angle driving the radial volley.
        turret_angle: f32,
        /// Seconds until the next radial volley.
        volley_timer: f32,
    },
    /// Void teleport cycle and gravity wells.
    Teleport {
        /// Current teleport phase.
        phase: TeleportPhase,
        /// Seconds left in the current phase.
        timer: f32,
        /// Current opacity.
        opacity: f32,
        /// Active gravity wells.
        wells: Vec<GravityWell>,
        /// Where the next fade-in happens.
        destination: Vec2,
        /// Damage multiplier while fading.
        damage_factor: f32,
        /// Seconds until the next homing missile salvo.
        missile_timer: f32,
    },
}

impl SpecialState {
    /// Initial special state for `kind`.
    #[must_use]
    pub fn for_kind(kind: EnemyKind, position: Vec2, tuning: &Tuning) -> Self {
        match kind {
            EnemyKind::Phantom => Self::Cloak {
                opacity: 1.0,
                phase: 0.0,
                threshold: tuning.specials.phantom_visibility_threshold,
            },
            EnemyKind::Sentinel => Self::Shield {
                hits_remaining: tuning.specials.sentinel_shield_hits,
            },
            EnemyKind::Swarm => Self::Jitter {
                offset: 0.0,
                direction: 1.0,
                timer: tuning.specials.swarm_flip_interval,
            },
            EnemyKind::Hydra => Self::Regenerate {
                timer: tuning.boss.hydra_regen_interval,
                enraged: false,
            },
            EnemyKind::Fortress => Self::ShieldPhase {
                shielded: true,
                timer: tuning.boss.fortress_shield_secs,
                turret_angle: 0.0,
                volley_timer: tuning.boss.fortress_volley_cooldown,
            },
            EnemyKind::Void => Self::Teleport {
                phase: TeleportPhase::Idle,
                timer: tuning.boss.void_teleport_interval,
                opacity: 1.0,
                wells: Vec::new(),
                destination: position,
                damage_factor: tuning.boss.void_teleport_damage_factor,
                missile_timer: tuning.boss.void_missile_cooldown,
            },
            _ => Self::None,
        }
    }
}

/// Void teleport cycle phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeleportPhase {
    /// Fully visible and taking full damage.
    Idle,
    /// Fading out before the jump.
    FadingOut,
    /// Fading in at the destination.
    FadingIn,
}

/// Time-limited well pulling the player toward it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityWell {
    /// Centre of the well.
    pub position: Vec2,
    /// Seconds left before the well collapses.
    pub remaining: f32,
}

/// Boss intro phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntroPhase {
    /// Alert shown, boss off screen and invulnerable.
    Warning,
    /// Flying to the battle position, still invulnerable.
    Transition,
    /// Fighting.
    Deployed,
}

/// When a boss counts as defeated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefeatRule {
    /// Every core part destroyed.
    CoreParts,
    /// Aggregate health at zero, or the core destroyed.
    AggregateHealth,
}

/// Role of a boss part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartRole {
    /// Destroying it ends the fight.
    Core,
    /// Fires from its own emitter.
    Turret,
    /// Soaks hits in front of the core.
    Shield,
    /// Animated limb, may fire.
    Arm,
    /// Forwards amplified damage to the core.
    Weakpoint,
}

/// Independently targetable boss part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    /// Role of the part.
    pub role: PartRole,
    /// Offset from the boss centre.
    pub offset: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Current hit points.
    pub health: f32,
    /// Hit points at spawn.
    pub max_health: f32,
    /// Whether the part has been destroyed.
    pub destroyed: bool,
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
    /// Seconds until the emitter fires next.
    pub emitter_timer: f32,
}

impl Part {
    /// World position of the part given the boss centre and the boss clock.
    #[must_use]
    pub fn world_position(&self, anchor: Vec2, clock: f32) -> Vec2 {
        let mut position = anchor + self.offset;
        if self.orbit_radius > 0.0 {
            let angle = self.phase + clock * self.orbit_speed;
            position += Vec2::new(angle.cos(), angle.sin()) * self.orbit_radius;
        }
        if self.bob_amplitude > 0.0 {
            position.y += (self.phase + clock * self.bob_speed).sin() * self.bob_amplitude;
        }
        position
    }

    /// Reports whether the part fires on its own.
    #[must_use]
    pub fn has_emitter(&self) -> bool {
        self.emitter_cooldown > 0.0
    }
}

/// Boss-only state layered on top of an [`EnemyInstance`].
#[derive(Clone, Debug, PartialEq)]
pub struct BossFrame {
    /// Current intro phase.
    pub intro: IntroPhase,
    /// Seconds left in the current intro phase.
    pub intro_timer: f32,
    /// Where the boss entered.
    pub entry_position: Vec2,
    /// Where the boss fights from.
    pub battle_position: Vec2,
    /// Ordered parts.
    pub parts: Vec<Part>,
    /// Defeat rule.
    pub defeat_rule: DefeatRule,
    /// Seconds since the boss deployed, drives part animation.
    pub clock: f32,
    /// Damage multiplier weakpoints forward to the core.
    pub weakpoint_multiplier: f32,
}

impl BossFrame {
    /// Index of the first core part.
    #[must_use]
    pub fn core_index(&self) -> Option<usize> {
        self.parts.iter().position(|part| part.role == PartRole::Core)
    }

    /// Reports whether every core part is destroyed.
    #[must_use]
    pub fn cores_destroyed(&self) -> bool {
        self.parts
            .iter()
            .filter(|part| part.role == PartRole::Core)
            .all(|part| part.destroyed)
    }

    fn apply_part_damage(
        &mut self,
        part: Option<usize>,
        amount: f32,
        pool: &mut f32,
    ) -> DamageOutcome {
        let Some(index) = part
            .filter(|index| *index < self.parts.len())
            .or_else(|| self.core_index())
        else {
            return DamageOutcome::Blocked(BlockReason::Invulnerable);
        };
        if self.parts[index].destroyed {
            return DamageOutcome::Blocked(BlockReason::PartDestroyed);
        }

        let mut part_destroyed = None;
        if damage_part(&mut self.parts[index], amount) {
            part_destroyed = Some(index);
        }
        let mut pool_damage = amount;

        if self.parts[index].role == PartRole::Weakpoint {
            let forwarded = amount * self.weakpoint_multiplier;
            // The reported part stays the weakpoint; a core kill surfaces as Killed.
            if let Some(core) = self.core_index() {
                let _ = damage_part(&mut self.parts[core], forwarded);
            }
            pool_damage += forwarded;
        }

        match self.defeat_rule {
            DefeatRule::CoreParts => {
                if let Some(core) = self.core_index() {
                    *pool = self.parts[core].health;
                }
            }
            DefeatRule::AggregateHealth => {
                *pool = (*pool - pool_damage).max(0.0);
            }
        }

        let defeated = self.cores_destroyed()
            || (self.defeat_rule == DefeatRule::AggregateHealth && *pool <= 0.0);
        if defeated {
            DamageOutcome::Killed { part_destroyed }
        } else {
            DamageOutcome::Damaged {
                remaining: *pool,
                part_destroyed,
            }
        }
    }
}

fn damage_part(part: &mut Part, amount: f32) -> bool {
    part.health = (part.health - amount).max(0.0);
    if part.health <= 0.0 && !part.destroyed {
        part.destroyed = true;
        return true;
    }
    false
}
