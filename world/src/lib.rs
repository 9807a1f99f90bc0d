#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Nova Siege.
//!
//! The world owns the player, every live enemy, projectiles and power-ups, the
//! running score and hit telemetry. Systems never mutate it directly except
//! through [`apply`], with one exception: behavior systems advance enemy
//! movement and timers in place through [`enemies_mut`], since that state is
//! private to each enemy.

use nova_siege_core::{
    Bounds, Command, DamageOutcome, EnemyId, EnemyInstance, Event, HitSource, NullifyCause, Owner,
    PowerUpId, PowerUpKind, ProjectileId, Tuning, Vec2,
};
use tracing::{debug, info};

const PLAYER_BOTTOM_MARGIN: f32 = 20.0;

/// Counters describing how hits against the player resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitTelemetry {
    /// Lives removed by hits that landed.
    pub damage_taken: u32,
    /// Hits nullified by a phase roll.
    pub phased: u32,
    /// Hits absorbed by a shield charge.
    pub shield_absorbed: u32,
}

/// Represents the authoritative Nova Siege world state.
#[derive(Debug)]
pub struct World {
    bounds: Bounds,
    tuning: Tuning,
    player: Player,
    enemies: Vec<EnemyInstance>,
    projectiles: Vec<Projectile>,
    power_ups: Vec<PowerUp>,
    score: u64,
    telemetry: HitTelemetry,
    next_enemy: u32,
    next_projectile: u32,
    next_power_up: u32,
    tick_index: u64,
}

impl World {
    /// Creates a world with default tuning and playfield.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    /// Creates a world using the provided balance parameters.
    #[must_use]
    pub fn with_tuning(tuning: Tuning) -> Self {
        let bounds = Bounds::default();
        let player = Player::spawn(&bounds, &tuning);
        Self {
            bounds,
            tuning,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            score: 0,
            telemetry: HitTelemetry::default(),
            next_enemy: 0,
            next_projectile: 0,
            next_power_up: 0,
            tick_index: 0,
        }
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy = self.next_enemy.wrapping_add(1);
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        id
    }

    fn allocate_power_up_id(&mut self) -> PowerUpId {
        let id = PowerUpId::new(self.next_power_up);
        self.next_power_up = self.next_power_up.wrapping_add(1);
        id
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|candidate| candidate.id == enemy)
    }

    fn push_projectile(&mut self, projectile: Projectile, out_events: &mut Vec<Event>) {
        out_events.push(Event::ProjectileSpawned {
            projectile: projectile.id,
            owner: projectile.owner,
            homing: projectile.homing.is_some(),
        });
        self.projectiles.push(projectile);
    }

    fn remove_destroyed(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let enemy = self.enemies.remove(index);
        info!(
            enemy = enemy.id.get(),
            kind = enemy.kind.id(),
            score = enemy.score_value,
            "enemy destroyed"
        );
        out_events.push(Event::EnemyDestroyed {
            enemy: enemy.id,
            kind: enemy.kind,
            position: enemy.position,
            score_value: enemy.score_value,
            drop_chance: enemy.drop_chance,
        });
        if enemy.kind.is_boss_class() {
            out_events.push(Event::BossDefeated {
                enemy: enemy.id,
                kind: enemy.kind,
            });
        }
    }

    fn advance_projectiles(&mut self, seconds: f32) {
        let target = self.player.active.then(|| self.player.center());
        let turn_rate = self.tuning.combat.missile_turn_rate;
        for projectile in &mut self.projectiles {
            if let Some(homing) = projectile.homing.as_mut() {
                homing.lifetime -= seconds;
                if let Some(target) = target {
                    projectile.velocity =
                        steer(projectile.velocity, target - projectile.position, turn_rate * seconds);
                }
            }
            projectile.position += projectile.velocity * seconds;
        }

        let bounds = self.bounds;
        let margin = self.tuning.combat.cull_margin;
        self.projectiles.retain(|projectile| {
            bounds.contains(projectile.position, margin)
                && projectile
                    .homing
                    .map_or(true, |homing| homing.lifetime > 0.0)
        });
    }

    fn advance_power_ups(&mut self, seconds: f32) {
        let fall = self.tuning.combat.power_up_speed * seconds;
        for power_up in &mut self.power_ups {
            power_up.position.y += fall;
        }
        let floor = self.bounds.height() + self.tuning.combat.power_up_radius;
        self.power_ups.retain(|power_up| power_up.position.y <= floor);
    }

    fn hit_player(
        &mut self,
        damage: u32,
        phased: bool,
        source: HitSource,
        out_events: &mut Vec<Event>,
    ) {
        if !self.player.active || self.player.invulnerable_for > 0.0 {
            return;
        }
        if phased {
            self.telemetry.phased = self.telemetry.phased.saturating_add(1);
            out_events.push(Event::PlayerHitNullified {
                cause: NullifyCause::Phased,
            });
            return;
        }

        self.player.invulnerable_for = self.tuning.combat.invulnerability_secs;
        if self.player.shield_charges > 0 {
            self.player.shield_charges -= 1;
            self.telemetry.shield_absorbed = self.telemetry.shield_absorbed.saturating_add(1);
            out_events.push(Event::PlayerHitNullified {
                cause: NullifyCause::ShieldAbsorbed,
            });
            return;
        }

        let amount = damage.min(self.player.lives);
        self.player.lives -= amount;
        self.telemetry.damage_taken = self.telemetry.damage_taken.saturating_add(amount);
        out_events.push(Event::PlayerDamaged {
            amount,
            lives_remaining: self.player.lives,
            source,
        });
        if self.player.lives == 0 {
            self.player.active = false;
            info!("player destroyed");
            out_events.push(Event::PlayerDestroyed);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePlayfield { bounds } => {
            world.bounds = bounds;
            world.player.position = world.player.clamped(world.player.position, &bounds);
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            let seconds = dt.as_secs_f32();
            world.player.invulnerable_for = (world.player.invulnerable_for - seconds).max(0.0);
            world.advance_projectiles(seconds);
            world.advance_power_ups(seconds);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy {
            kind,
            position,
            pattern,
            scaling,
        } => {
            let id = world.allocate_enemy_id();
            let enemy = EnemyInstance::spawn(id, kind, position, pattern, &scaling, &world.tuning);
            debug!(enemy = id.get(), kind = kind.id(), x = position.x, "enemy spawned");
            world.enemies.push(enemy);
            out_events.push(Event::EnemySpawned { enemy: id, kind });
        }
        Command::SpawnBoss { kind, scaling } => {
            let id = world.allocate_enemy_id();
            let radius = kind.stats().radius;
            let centre_x = world.bounds.width() * 0.5;
            let entry = Vec2::new(centre_x, -radius * 2.0);
            let battle = Vec2::new(
                centre_x,
                world.bounds.height() * world.tuning.boss.battle_line,
            );
            let boss = EnemyInstance::spawn_boss(id, kind, entry, battle, &scaling, &world.tuning);
            info!(
                enemy = id.get(),
                kind = kind.id(),
                health = boss.max_health,
                "boss spawned"
            );
            world.enemies.push(boss);
            out_events.push(Event::BossSpawned { enemy: id, kind });
        }
        Command::SpawnBullet {
            position,
            velocity,
            owner,
            damage,
            pierce,
        } => {
            let id = world.allocate_projectile_id();
            let projectile = Projectile {
                id,
                position,
                velocity,
                owner,
                damage,
                radius: world.tuning.combat.bullet_radius,
                pierce_remaining: pierce,
                last_hit: None,
                homing: None,
            };
            world.push_projectile(projectile, out_events);
        }
        Command::SpawnHomingMissile { position, angle } => {
            let id = world.allocate_projectile_id();
            let combat = &world.tuning.combat;
            let projectile = Projectile {
                id,
                position,
                velocity: Vec2::from_angle(angle) * combat.missile_speed,
                owner: Owner::Enemy,
                damage: combat.boss_contact_damage as f32,
                radius: combat.bullet_radius * 1.5,
                pierce_remaining: 0,
                last_hit: None,
                homing: Some(Homing {
                    lifetime: combat.missile_lifetime,
                }),
            };
            world.push_projectile(projectile, out_events);
        }
        Command::SpawnExplosion { position, size } => {
            out_events.push(Event::ExplosionSpawned { position, size });
        }
        Command::SpawnPowerUp { position, kind } => {
            let id = world.allocate_power_up_id();
            world.power_ups.push(PowerUp {
                id,
                position,
                kind,
                radius: world.tuning.combat.power_up_radius,
            });
            out_events.push(Event::PowerUpSpawned { power_up: id, kind });
        }
        Command::DamageEnemy {
            enemy,
            part,
            amount,
            critical,
        } => {
            let Some(index) = world.enemy_index(enemy) else {
                return;
            };
            let target = &mut world.enemies[index];
            let outcome = target.take_part_damage(part, amount);
            let role_of = |part: usize, target: &EnemyInstance| {
                target
                    .boss
                    .as_ref()
                    .and_then(|frame| frame.parts.get(part))
                    .map(|part| part.role)
            };
            match outcome {
                DamageOutcome::Blocked(reason) => {
                    out_events.push(Event::DamageBlocked { enemy, reason });
                }
                DamageOutcome::Absorbed { shield_remaining } => {
                    out_events.push(Event::ShieldAbsorbed {
                        enemy,
                        remaining: shield_remaining,
                    });
                }
                DamageOutcome::Damaged {
                    remaining,
                    part_destroyed,
                } => {
                    out_events.push(Event::EnemyDamaged {
                        enemy,
                        part,
                        amount,
                        critical,
                        remaining,
                    });
                    if let Some(destroyed) = part_destroyed {
                        if let Some(role) = role_of(destroyed, &*target) {
                            out_events.push(Event::PartDestroyed {
                                enemy,
                                part: destroyed,
                                role,
                            });
                        }
                    }
                }
                DamageOutcome::Killed { part_destroyed } => {
                    out_events.push(Event::EnemyDamaged {
                        enemy,
                        part,
                        amount,
                        critical,
                        remaining: 0.0,
                    });
                    if let Some(destroyed) = part_destroyed {
                        if let Some(role) = role_of(destroyed, &*target) {
                            out_events.push(Event::PartDestroyed {
                                enemy,
                                part: destroyed,
                                role,
                            });
                        }
                    }
                    world.remove_destroyed(index, out_events);
                }
            }
        }
        Command::DestroyEnemy { enemy } => {
            let Some(index) = world.enemy_index(enemy) else {
                return;
            };
            if world.enemies[index].destroy() {
                world.remove_destroyed(index, out_events);
            }
        }
        Command::DespawnEnemy { enemy } => {
            let Some(index) = world.enemy_index(enemy) else {
                return;
            };
            let escaped = world.enemies.remove(index);
            debug!(enemy = enemy.get(), kind = escaped.kind.id(), "enemy escaped");
            out_events.push(Event::EnemyEscaped {
                enemy,
                kind: escaped.kind,
            });
        }
        Command::RegisterProjectileHit { projectile, enemy } => {
            let Some(index) = world
                .projectiles
                .iter()
                .position(|candidate| candidate.id == projectile)
            else {
                return;
            };
            let entry = &mut world.projectiles[index];
            if entry.pierce_remaining == 0 {
                let _ = world.projectiles.remove(index);
            } else {
                entry.pierce_remaining -= 1;
                entry.last_hit = Some(enemy);
            }
        }
        Command::ExpendProjectile { projectile } => {
            world.projectiles.retain(|candidate| candidate.id != projectile);
        }
        Command::HitPlayer {
            damage,
            phased,
            source,
        } => world.hit_player(damage, phased, source, out_events),
        Command::DisplacePlayer { offset } => {
            if world.player.active {
                let bounds = world.bounds;
                world.player.position = world.player.clamped(world.player.position + offset, &bounds);
            }
        }
        Command::MovePlayer { position } => {
            if world.player.active {
                let bounds = world.bounds;
                world.player.position = world.player.clamped(position, &bounds);
            }
        }
        Command::CollectPowerUp { power_up } => {
            let Some(index) = world
                .power_ups
                .iter()
                .position(|candidate| candidate.id == power_up)
            else {
                return;
            };
            let collected = world.power_ups.remove(index);
            let combat = &world.tuning.combat;
            match collected.kind {
                PowerUpKind::Shield => {
                    world.player.shield_charges = world
                        .player
                        .shield_charges
                        .saturating_add(combat.shield_charges_per_pickup);
                }
                PowerUpKind::Life => {
                    world.player.lives = (world.player.lives + 1).min(combat.max_lives);
                }
                PowerUpKind::Weapon
                | PowerUpKind::Speed
                | PowerUpKind::RapidFire
                | PowerUpKind::Bomb => {}
            }
            out_events.push(Event::PowerUpCollected {
                kind: collected.kind,
            });
        }
        Command::AddScore { points } => {
            world.score = world.score.saturating_add(points);
            out_events.push(Event::ScoreAwarded {
                points,
                total: world.score,
            });
        }
        Command::RaiseCue { cue } => out_events.push(Event::CueRaised { cue }),
        Command::AnnounceWave { level, wave, total } => {
            info!(level, wave = wave + 1, total, "wave incoming");
            out_events.push(Event::WaveAnnounced { level, wave, total });
        }
        Command::CompleteLevel { level } => {
            info!(level, score = world.score, "level complete");
            out_events.push(Event::LevelCompleted { level });
        }
        Command::TransitionWorld { from, to } => {
            info!(from, to, "entering new world");
            out_events.push(Event::WorldTransitioned { from, to });
        }
        Command::ResetLevelState => {
            world.enemies.clear();
            world.projectiles.clear();
            world.power_ups.clear();
            world.player.invulnerable_for = 0.0;
            out_events.push(Event::LevelStateReset);
        }
    }
}

/// Grants behavior systems in-place access to enemy movement and timer state.
pub fn enemies_mut(world: &mut World) -> &mut [EnemyInstance] {
    &mut world.enemies
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{HitTelemetry, World};
    use nova_siege_core::{
        Bounds, EnemyId, EnemyInstance, PlayerSnapshot, PowerUpSnapshot, ProjectileSnapshot,
        Tuning,
    };

    /// Playfield dimensions.
    #[must_use]
    pub fn bounds(world: &World) -> Bounds {
        world.bounds
    }

    /// Balance parameters the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &[EnemyInstance] {
        &world.enemies
    }

    /// Looks up a live enemy.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<&EnemyInstance> {
        world.enemies.iter().find(|enemy| enemy.id == id)
    }

    /// Number of enemies still in play.
    #[must_use]
    pub fn active_enemy_count(world: &World) -> usize {
        world.enemies.iter().filter(|enemy| enemy.active).count()
    }

    /// Captures every live projectile in spawn order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                velocity: projectile.velocity,
                owner: projectile.owner,
                damage: projectile.damage,
                radius: projectile.radius,
                pierce_remaining: projectile.pierce_remaining,
                homing: projectile.homing.is_some(),
                last_hit: projectile.last_hit,
            })
            .collect()
    }

    /// Captures every uncollected power-up in drop order.
    #[must_use]
    pub fn power_ups(world: &World) -> Vec<PowerUpSnapshot> {
        world
            .power_ups
            .iter()
            .map(|power_up| PowerUpSnapshot {
                id: power_up.id,
                position: power_up.position,
                kind: power_up.kind,
                radius: power_up.radius,
            })
            .collect()
    }

    /// Running score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Hit counters for the player.
    #[must_use]
    pub fn telemetry(world: &World) -> HitTelemetry {
        world.telemetry
    }

    /// Number of ticks processed since creation.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Debug)]
struct Player {
    position: Vec2,
    size: Vec2,
    lives: u32,
    invulnerable_for: f32,
    shield_charges: u32,
    active: bool,
}

impl Player {
    fn spawn(bounds: &Bounds, tuning: &Tuning) -> Self {
        let edge = tuning.combat.player_size;
        let size = Vec2::splat(edge);
        Self {
            position: Vec2::new(
                (bounds.width() - edge) * 0.5,
                bounds.height() - edge - PLAYER_BOTTOM_MARGIN,
            ),
            size,
            lives: tuning.combat.starting_lives,
            invulnerable_for: 0.0,
            shield_charges: 0,
            active: true,
        }
    }

    fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    fn clamped(&self, position: Vec2, bounds: &Bounds) -> Vec2 {
        let max = Vec2::new(bounds.width(), bounds.height()) - self.size;
        position.clamp(Vec2::ZERO, max.max(Vec2::ZERO))
    }

    fn snapshot(&self) -> nova_siege_core::PlayerSnapshot {
        nova_siege_core::PlayerSnapshot {
            position: self.position,
            size: self.size,
            active: self.active,
            lives: self.lives,
            invulnerable_for: self.invulnerable_for,
            shield_charges: self.shield_charges,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Homing {
    lifetime: f32,
}

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    position: Vec2,
    velocity: Vec2,
    owner: Owner,
    damage: f32,
    radius: f32,
    pierce_remaining: u32,
    last_hit: Option<EnemyId>,
    homing: Option<Homing>,
}

#[derive(Clone, Debug)]
struct PowerUp {
    id: PowerUpId,
    position: Vec2,
    kind: PowerUpKind,
    radius: f32,
}

/// Rotates `velocity` toward `desired` by at most `max_turn` radians, keeping its speed.
fn steer(velocity: Vec2, desired: Vec2, max_turn: f32) -> Vec2 {
    let speed = velocity.length();
    if speed <= f32::EPSILON || desired.length_squared() <= f32::EPSILON {
        return velocity;
    }
    let current = velocity.y.atan2(velocity.x);
    let wanted = desired.y.atan2(desired.x);
    let mut delta = wanted - current;
    while delta > std::f32::consts::PI {
        delta -= std::f32::consts::TAU;
    }
    while delta < -std::f32::consts::PI {
        delta += std::f32::consts::TAU;
    }
    let turned = current + delta.clamp(-max_turn, max_turn);
    Vec2::from_angle(turned) * speed
}
