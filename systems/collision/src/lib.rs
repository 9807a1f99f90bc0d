#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves overlaps between projectiles, enemies, power-ups
//! and the player into damage and collection commands.
//!
//! The resolver only reads snapshots. Every consequence leaves as a
//! [`Command`]: the world applies the damage, reports kills as events and
//! expends projectiles whose pierce budget ran out.

use nova_siege_core::{
    Command, EnemyId, EnemyInstance, HitSource, Owner, PerkModifiers, PlayerSnapshot,
    PowerUpSnapshot, ProjectileSnapshot, Tuning, Vec2,
};
use nova_siege_system_boss_behavior::resolve_part_hit;
use rand::Rng;
use tracing::trace;

/// Everything the resolver inspects in one frame.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// Enemies in spawn order.
    pub enemies: &'a [EnemyInstance],
    /// Live projectiles from both sides.
    pub projectiles: &'a [ProjectileSnapshot],
    /// Power-ups waiting to be collected.
    pub power_ups: &'a [PowerUpSnapshot],
    /// The player, when present.
    pub player: Option<PlayerSnapshot>,
}

/// Splash damage dealt at `distance` from an impact with the given `radius`.
///
/// Falls off linearly as `full * (1 - distance / radius)` and is zero at or
/// beyond the radius.
#[must_use]
pub fn splash_damage(full: f32, distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    full * (1.0 - distance / radius)
}

/// Collision resolver.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    scratch: Vec<Command>,
}

impl CollisionResolver {
    /// Creates a new collision resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every overlap in `scene` and queues the resulting commands.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        scene: Scene<'_>,
        perks: &dyn PerkModifiers,
        tuning: &Tuning,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for projectile in scene
            .projectiles
            .iter()
            .filter(|projectile| projectile.owner == Owner::Player)
        {
            self.player_projectile(projectile, scene.enemies, perks, rng);
        }

        if let Some(player) = scene.player.filter(|player| player.active) {
            if player.is_vulnerable() {
                self.player_hits(player, scene, perks, tuning, rng);
            }
            for power_up in scene.power_ups {
                if overlaps(player.center(), player.radius(), power_up.position, power_up.radius) {
                    self.scratch.push(Command::CollectPowerUp {
                        power_up: power_up.id,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn player_projectile<R: Rng + ?Sized>(
        &mut self,
        projectile: &ProjectileSnapshot,
        enemies: &[EnemyInstance],
        perks: &dyn PerkModifiers,
        rng: &mut R,
    ) {
        let mut budget = projectile.pierce_remaining;

        for enemy in enemies
            .iter()
            .filter(|enemy| enemy.is_alive() && Some(enemy.id) != projectile.last_hit)
        {
            let part = if enemy.boss.is_some() {
                match resolve_part_hit(enemy, projectile.position, projectile.radius) {
                    Some(part) => Some(part),
                    None => continue,
                }
            } else if overlaps(
                enemy.position,
                enemy.radius,
                projectile.position,
                projectile.radius,
            ) {
                None
            } else {
                continue;
            };

            let critical = roll(rng, perks.crit_chance());
            let mut amount = projectile.damage * perks.damage_multiplier();
            if critical {
                amount *= perks.crit_multiplier();
            }
            trace!(
                projectile = projectile.id.get(),
                enemy = enemy.id.get(),
                ?part,
                amount,
                critical,
                "player projectile hit"
            );
            self.scratch.push(Command::DamageEnemy {
                enemy: enemy.id,
                part,
                amount,
                critical,
            });
            self.scratch.push(Command::RegisterProjectileHit {
                projectile: projectile.id,
                enemy: enemy.id,
            });
            self.splash(enemy.id, projectile.position, amount, enemies, perks);

            if budget == 0 {
                break;
            }
            budget -= 1;
        }
    }

    fn splash(
        &mut self,
        primary: EnemyId,
        impact: Vec2,
        amount: f32,
        enemies: &[EnemyInstance],
        perks: &dyn PerkModifiers,
    ) {
        let radius = perks.splash_radius();
        if radius <= 0.0 {
            return;
        }
        let full = amount * perks.splash_fraction();
        for enemy in enemies
            .iter()
            .filter(|enemy| enemy.is_alive() && enemy.id != primary)
        {
            let splash = splash_damage(full, enemy.position.distance(impact), radius);
            if splash > 0.0 {
                self.scratch.push(Command::DamageEnemy {
                    enemy: enemy.id,
                    part: None,
                    amount: splash,
                    critical: false,
                });
            }
        }
    }

    fn player_hits<R: Rng + ?Sized>(
        &mut self,
        player: PlayerSnapshot,
        scene: Scene<'_>,
        perks: &dyn PerkModifiers,
        tuning: &Tuning,
        rng: &mut R,
    ) {
        let centre = player.center();
        let radius = player.radius();

        let bullet = scene.projectiles.iter().find(|projectile| {
            projectile.owner == Owner::Enemy
                && overlaps(centre, radius, projectile.position, projectile.radius)
        });
        if let Some(projectile) = bullet {
            self.scratch.push(Command::ExpendProjectile {
                projectile: projectile.id,
            });
            self.scratch.push(Command::HitPlayer {
                damage: lives_for(projectile.damage),
                phased: roll(rng, perks.phase_chance()),
                source: HitSource::Projectile,
            });
            return;
        }

        let body = scene.enemies.iter().find(|enemy| {
            enemy.is_alive()
                && enemy.is_deployed()
                && overlaps(centre, radius, enemy.position, enemy.radius)
        });
        if let Some(enemy) = body {
            let boss_class = enemy.kind.is_boss_class();
            self.scratch.push(Command::HitPlayer {
                damage: if boss_class {
                    tuning.combat.boss_contact_damage
                } else {
                    tuning.combat.contact_damage
                },
                phased: roll(rng, perks.phase_chance()),
                source: HitSource::Contact,
            });
            if !boss_class {
                self.scratch.push(Command::DestroyEnemy { enemy: enemy.id });
            }
        }
    }
}

fn overlaps(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance_squared(b) <= (a_radius + b_radius).powi(2)
}

fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    chance > 0.0 && rng.gen::<f32>() < chance
}

fn lives_for(damage: f32) -> u32 {
    damage.ceil().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splash_falls_off_linearly() {
        assert_eq!(splash_damage(10.0, 0.0, 50.0), 10.0);
        assert!((splash_damage(10.0, 25.0, 50.0) - 5.0).abs() < 1e-6);
        assert!((splash_damage(10.0, 40.0, 50.0) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn splash_vanishes_at_and_beyond_radius() {
        assert_eq!(splash_damage(10.0, 50.0, 50.0), 0.0);
        assert_eq!(splash_damage(10.0, 80.0, 50.0), 0.0);
        assert_eq!(splash_damage(10.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn fractional_bullet_damage_rounds_up_to_a_life() {
        assert_eq!(lives_for(0.25), 1);
        assert_eq!(lives_for(1.0), 1);
        assert_eq!(lives_for(2.5), 3);
    }

    #[test]
    fn zero_chance_never_consumes_randomness() {
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        assert!(!roll(&mut rng, 0.0));
        assert_eq!(rng.gen::<u64>(), 0);
    }
}
