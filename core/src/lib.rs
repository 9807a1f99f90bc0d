#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Nova Siege gameplay engine.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and the pure gameplay systems. Systems inspect
//! read-only views and respond with [`Command`] values describing the spawn
//! requests and mutations they want. The world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values that the next systems in
//! the frame, and any external collaborators (audio, camera, score display),
//! react to.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod enemy;
pub mod level;
pub mod roster;
pub mod scaling;
pub mod tuning;

pub use enemy::{
    BlockReason, BossFrame, DamageOutcome, DefeatRule, EnemyInstance, GravityWell, IntroPhase,
    Part, PartRole, SpecialState, TeleportPhase,
};
pub use glam::Vec2;
pub use level::{Formation, LevelDefinition, WaveDefinition, WaveSpawn};
pub use roster::{EnemyKind, EnemyStats, FirePattern, MovementPattern};
pub use scaling::{
    boss_level_multiplier, enemy_level_multiplier, score_level_multiplier, DifficultyProfile,
    NoPerks, PerkModifiers, SpawnScaling, StandardDifficulty,
};
pub use tuning::{
    BossTuning, CombatTuning, ConfigError, DropTuning, FireTuning, FrameTuning, MovementTuning,
    SpecialTuning, Tuning, WaveTuning,
};

/// Commands that express every permissible world mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the playfield that bounds movement, spawning and culling.
    ConfigurePlayfield {
        /// New playfield dimensions in world units.
        bounds: Bounds,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a regular enemy be created by the enemy factory.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// Spawn position with formation offsets already applied.
        position: Vec2,
        /// Movement rule assigned to the enemy.
        pattern: MovementPattern,
        /// Level and difficulty multipliers baked into the enemy's stats.
        scaling: SpawnScaling,
    },
    /// Requests that a boss or miniboss enter the playfield.
    SpawnBoss {
        /// Boss or miniboss kind to create.
        kind: EnemyKind,
        /// Level and difficulty multipliers baked into the boss's stats.
        scaling: SpawnScaling,
    },
    /// Requests a new projectile.
    SpawnBullet {
        /// Starting position of the projectile.
        position: Vec2,
        /// Velocity in world units per second.
        velocity: Vec2,
        /// Side that fired the projectile.
        owner: Owner,
        /// Damage carried by the projectile.
        damage: f32,
        /// Extra enemies the projectile may pass through.
        pierce: u32,
    },
    /// Requests an enemy homing missile that steers toward the player.
    SpawnHomingMissile {
        /// Launch position.
        position: Vec2,
        /// Initial heading in radians, measured from the positive x axis.
        angle: f32,
    },
    /// Requests an explosion effect.
    SpawnExplosion {
        /// Centre of the explosion.
        position: Vec2,
        /// Visual scale of the explosion.
        size: ExplosionSize,
    },
    /// Requests a collectible power-up.
    SpawnPowerUp {
        /// Drop position.
        position: Vec2,
        /// Power-up granted on collection.
        kind: PowerUpKind,
    },
    /// Applies damage to an enemy, optionally targeting one of its parts.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Index of the struck part for multi-part bosses.
        part: Option<usize>,
        /// Damage amount before type-specific reductions.
        amount: f32,
        /// Whether the damage came from a critical roll.
        critical: bool,
    },
    /// Destroys an enemy regardless of its defenses.
    DestroyEnemy {
        /// Enemy to destroy.
        enemy: EnemyId,
    },
    /// Removes an enemy that left the playfield without awarding anything.
    DespawnEnemy {
        /// Enemy that escaped.
        enemy: EnemyId,
    },
    /// Records that a projectile struck an enemy, consuming pierce budget.
    RegisterProjectileHit {
        /// Projectile that connected.
        projectile: ProjectileId,
        /// Enemy that was struck.
        enemy: EnemyId,
    },
    /// Deactivates a projectile.
    ExpendProjectile {
        /// Projectile to remove.
        projectile: ProjectileId,
    },
    /// Applies a hit against the player.
    HitPlayer {
        /// Lives removed when the hit lands.
        damage: u32,
        /// Whether a phase roll nullified the hit before it landed.
        phased: bool,
        /// What struck the player.
        source: HitSource,
    },
    /// Nudges the player by an accumulated offset, such as gravity well pull.
    DisplacePlayer {
        /// Offset in world units.
        offset: Vec2,
    },
    /// Moves the player to an absolute position, as requested by input adapters.
    MovePlayer {
        /// Desired top-left corner of the player.
        position: Vec2,
    },
    /// Collects a power-up on behalf of the player.
    CollectPowerUp {
        /// Power-up being collected.
        power_up: PowerUpId,
    },
    /// Adds points to the running score.
    AddScore {
        /// Points to award.
        points: u64,
    },
    /// Raises a fire-and-forget presentation cue.
    RaiseCue {
        /// Cue forwarded to external collaborators.
        cue: Cue,
    },
    /// Announces that a wave has started spawning.
    AnnounceWave {
        /// Level the wave belongs to.
        level: u32,
        /// Zero-based wave index.
        wave: usize,
        /// Number of waves in the level.
        total: usize,
    },
    /// Marks the level as complete.
    CompleteLevel {
        /// Level that finished.
        level: u32,
    },
    /// Moves play into a new world.
    TransitionWorld {
        /// World being left.
        from: u32,
        /// World being entered.
        to: u32,
    },
    /// Clears every per-level entity between frames.
    ResetLevelState,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a regular enemy entered play.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy spawned.
        kind: EnemyKind,
    },
    /// Confirms that a boss or miniboss entered play.
    BossSpawned {
        /// Identifier assigned to the boss.
        enemy: EnemyId,
        /// Kind of boss spawned.
        kind: EnemyKind,
    },
    /// Reports damage dealt to an enemy.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Part that took the damage, if any.
        part: Option<usize>,
        /// Damage requested before reductions.
        amount: f32,
        /// Whether the damage was a critical hit.
        critical: bool,
        /// Health remaining after the hit, never negative.
        remaining: f32,
    },
    /// Reports damage rejected by an enemy's defenses.
    DamageBlocked {
        /// Enemy that rejected the hit.
        enemy: EnemyId,
        /// Why the hit was rejected.
        reason: BlockReason,
    },
    /// Reports a hit absorbed by an enemy's shield counter.
    ShieldAbsorbed {
        /// Enemy whose shield absorbed the hit.
        enemy: EnemyId,
        /// Shield hits left after this one.
        remaining: u32,
    },
    /// Reports that a boss part was destroyed.
    PartDestroyed {
        /// Boss owning the part.
        enemy: EnemyId,
        /// Index of the destroyed part.
        part: usize,
        /// Role of the destroyed part.
        role: PartRole,
    },
    /// Reports a kill. Fires exactly once per enemy.
    EnemyDestroyed {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Position at the time of death.
        position: Vec2,
        /// Scaled score value of the enemy.
        score_value: u64,
        /// Probability that the kill drops a power-up.
        drop_chance: f32,
    },
    /// Reports that a boss or miniboss was defeated.
    BossDefeated {
        /// Boss that died.
        enemy: EnemyId,
        /// Kind of the boss.
        kind: EnemyKind,
    },
    /// Reports that an enemy left the playfield.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
    },
    /// Confirms that a projectile was created.
    ProjectileSpawned {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Side that fired it.
        owner: Owner,
        /// Whether the projectile homes in on the player.
        homing: bool,
    },
    /// Confirms that an explosion was requested.
    ExplosionSpawned {
        /// Centre of the explosion.
        position: Vec2,
        /// Visual scale.
        size: ExplosionSize,
    },
    /// Confirms that a power-up was dropped.
    PowerUpSpawned {
        /// Identifier assigned to the power-up.
        power_up: PowerUpId,
        /// Power-up granted on collection.
        kind: PowerUpKind,
    },
    /// Reports that the player collected a power-up.
    PowerUpCollected {
        /// Power-up that was collected.
        kind: PowerUpKind,
    },
    /// Reports points added to the score.
    ScoreAwarded {
        /// Points added.
        points: u64,
        /// Score after the award.
        total: u64,
    },
    /// Reports that the player lost lives.
    PlayerDamaged {
        /// Lives removed.
        amount: u32,
        /// Lives left.
        lives_remaining: u32,
        /// What struck the player.
        source: HitSource,
    },
    /// Reports a hit on the player that dealt no damage.
    PlayerHitNullified {
        /// Why the hit dealt no damage.
        cause: NullifyCause,
    },
    /// Reports that the player ran out of lives.
    PlayerDestroyed,
    /// Forwards a presentation cue.
    CueRaised {
        /// Cue for external collaborators.
        cue: Cue,
    },
    /// Reports that a wave started spawning.
    WaveAnnounced {
        /// Level the wave belongs to.
        level: u32,
        /// Zero-based wave index.
        wave: usize,
        /// Number of waves in the level.
        total: usize,
    },
    /// Reports that a level finished.
    LevelCompleted {
        /// Level that finished.
        level: u32,
    },
    /// Reports a world transition. External perk state resets on this event.
    WorldTransitioned {
        /// World being left.
        from: u32,
        /// World being entered.
        to: u32,
    },
    /// Reports that every per-level entity was cleared.
    LevelStateReset,
}

/// Side that owns a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Fired by the player.
    Player,
    /// Fired by an enemy.
    Enemy,
}

/// Visual scale of an explosion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosionSize {
    /// Bullet impacts and small debris.
    Small,
    /// Regular enemy deaths.
    Medium,
    /// Boss deaths.
    Large,
}

/// Collectible power-up kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Weapon upgrade handled by the external weapon system.
    Weapon,
    /// Grants the player a shield charge.
    Shield,
    /// Movement speed boost handled externally.
    Speed,
    /// Fire-rate boost handled externally.
    RapidFire,
    /// Screen-clearing bomb handled externally.
    Bomb,
    /// Grants an extra life.
    Life,
}

impl PowerUpKind {
    /// Every power-up kind in drop-table order.
    pub const ALL: [PowerUpKind; 6] = [
        Self::Weapon,
        Self::Shield,
        Self::Speed,
        Self::RapidFire,
        Self::Bomb,
        Self::Life,
    ];
}

/// Cause of a zero-damage hit on the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullifyCause {
    /// A phase perk roll nullified the hit before it landed.
    Phased,
    /// The hit landed but a shield charge absorbed it.
    ShieldAbsorbed,
}

/// What struck the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitSource {
    /// An enemy projectile.
    Projectile,
    /// Body contact with an enemy.
    Contact,
}

/// Fire-and-forget presentation cues consumed outside the core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cue {
    /// Shakes the camera.
    CameraShake {
        /// Shake strength in world units.
        intensity: f32,
        /// Shake length in seconds.
        duration: f32,
    },
    /// Plays a sound.
    Sound {
        /// Sound to play.
        sound: SoundCue,
    },
    /// Shows the incoming boss alert.
    BossWarning {
        /// Boss about to enter.
        kind: EnemyKind,
    },
}

/// Sounds requested by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A wave began spawning.
    WaveStart,
    /// A miniboss is about to enter.
    MinibossAlarm,
    /// A boss is about to enter.
    BossAlarm,
    /// A boss or miniboss died.
    BossDefeated,
    /// The level finished.
    LevelClear,
    /// Play moved to a new world.
    WorldTransition,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a power-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PowerUpId(u32);

impl PowerUpId {
    /// Creates a new power-up identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Rectangular playfield anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    width: f32,
    height: f32,
}

impl Bounds {
    /// Creates a playfield of the given dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width of the playfield.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the playfield.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre of the playfield.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Reports whether the point lies inside the playfield grown by `margin`.
    #[must_use]
    pub fn contains(&self, point: Vec2, margin: f32) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }

    /// Clamps a horizontal coordinate so a circle of `radius` stays on screen.
    #[must_use]
    pub fn clamp_x(&self, x: f32, radius: f32) -> f32 {
        if self.width <= radius * 2.0 {
            return self.width * 0.5;
        }
        x.clamp(radius, self.width - radius)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Immutable representation of the player used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Top-left corner of the player's box.
    pub position: Vec2,
    /// Width and height of the player's box.
    pub size: Vec2,
    /// Whether the player is alive and on the playfield.
    pub active: bool,
    /// Lives left.
    pub lives: u32,
    /// Seconds of invulnerability left.
    pub invulnerable_for: f32,
    /// Shield charges left.
    pub shield_charges: u32,
}

impl PlayerSnapshot {
    /// Centre of the player's box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Collision radius derived from the player's box.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size.x.min(self.size.y) * 0.4
    }

    /// Reports whether the player can currently be hit.
    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        self.active && self.invulnerable_for <= 0.0
    }
}

/// Immutable representation of a projectile used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Current position.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Side that fired it.
    pub owner: Owner,
    /// Damage carried.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
    /// Extra enemies the projectile may pass through.
    pub pierce_remaining: u32,
    /// Whether the projectile homes in on the player.
    pub homing: bool,
    /// Enemy struck most recently, skipped while the projectile passes through it.
    pub last_hit: Option<EnemyId>,
}

/// Immutable representation of a power-up used by systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerUpSnapshot {
    /// Identifier of the power-up.
    pub id: PowerUpId,
    /// Current position.
    pub position: Vec2,
    /// Power-up granted on collection.
    pub kind: PowerUpKind,
    /// Collection radius.
    pub radius: f32,
}

/// Read-only context handed to behavior systems each frame.
#[derive(Clone, Copy, Debug)]
pub struct BehaviorContext<'a> {
    /// Player, when present and active.
    pub player: Option<PlayerSnapshot>,
    /// Playfield dimensions.
    pub bounds: Bounds,
    /// Current level number.
    pub level: u32,
    /// Balance parameters.
    pub tuning: &'a Tuning,
}

impl BehaviorContext<'_> {
    /// Centre of the player if it can be aimed at.
    #[must_use]
    pub fn aim_point(&self) -> Option<Vec2> {
        self.player
            .filter(|player| player.active)
            .map(|player| player.center())
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, EnemyId, NullifyCause, Owner, PowerUpKind, Vec2};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn enemy_id_round_trips_through_bincode() {
        assert_round_trip(&EnemyId::new(42));
    }

    #[test]
    fn small_enums_round_trip_through_bincode() {
        assert_round_trip(&Owner::Enemy);
        assert_round_trip(&NullifyCause::ShieldAbsorbed);
        assert_round_trip(&PowerUpKind::RapidFire);
    }

    #[test]
    fn bounds_contains_respects_margin() {
        let bounds = Bounds::new(100.0, 50.0);
        assert!(bounds.contains(Vec2::new(-5.0, 10.0), 10.0));
        assert!(!bounds.contains(Vec2::new(-15.0, 10.0), 10.0));
        assert!(bounds.contains(Vec2::new(100.0, 50.0), 0.0));
    }

    #[test]
    fn clamp_x_keeps_radius_on_screen() {
        let bounds = Bounds::new(100.0, 50.0);
        assert_eq!(bounds.clamp_x(-20.0, 10.0), 10.0);
        assert_eq!(bounds.clamp_x(150.0, 10.0), 90.0);
        assert_eq!(bounds.clamp_x(40.0, 10.0), 40.0);
        assert_eq!(Bounds::new(10.0, 10.0).clamp_x(3.0, 10.0), 5.0);
    }
}
