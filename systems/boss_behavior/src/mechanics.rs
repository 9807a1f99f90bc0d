use std::f32::consts::TAU;

use nova_siege_core::{
    BehaviorContext, BossTuning, Bounds, Command, EnemyInstance, GravityWell, SpecialState,
    TeleportPhase, Vec2,
};
use nova_siege_system_enemy_behavior::attack;
use rand::Rng;
use tracing::{debug, info};

const FORTRESS_VOLLEY_SIZE: u32 = 4;
const VOID_MISSILE_SPREAD: f32 = 0.4;
const VOID_DESTINATION_DEPTH: f32 = 0.45;

/// Pull exerted by a gravity well at `well` on a player centred at `player`.
///
/// The force falls off as `strength / distance`, is capped at `max_pull` and
/// vanishes outside `range`. The result is a velocity in world units per second.
#[must_use]
pub fn well_pull(well: Vec2, player: Vec2, tuning: &BossTuning) -> Vec2 {
    let delta = well - player;
    let distance = delta.length();
    if distance <= 1.0 || distance > tuning.void_well_range {
        return Vec2::ZERO;
    }
    let force = (tuning.void_well_strength / distance).min(tuning.void_well_max_pull);
    delta / distance * force
}

/// Hydra: pulses health back toward a capped fraction and enrages when low.
pub(crate) fn regenerate(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let tuning = &ctx.tuning.boss;
    let max_health = enemy.max_health;
    let SpecialState::Regenerate { timer, enraged } = &mut enemy.special else {
        return;
    };

    *timer -= dt;
    if *timer <= 0.0 {
        *timer = tuning.hydra_regen_interval;
        let cap = max_health * tuning.hydra_regen_cap;
        if enemy.health > 0.0 && enemy.health < cap {
            enemy.health = (enemy.health + max_health * tuning.hydra_regen_fraction).min(cap);
        }
    }

    if !*enraged && enemy.health < max_health * tuning.hydra_enrage_fraction {
        *enraged = true;
        info!(enemy = enemy.id.get(), health = enemy.health, "hydra enraged");
    }
}

/// Fortress: alternates shielded and vulnerable phases while the turret ring
/// rotates and fires radial volleys.
pub(crate) fn shield_cycle(
    enemy: &mut EnemyInstance,
    dt: f32,
    ctx: &BehaviorContext<'_>,
    out: &mut Vec<Command>,
) {
    let tuning = &ctx.tuning.boss;
    let damage = ctx.tuning.combat.boss_contact_damage as f32;
    let SpecialState::ShieldPhase {
        shielded,
        timer,
        turret_angle,
        volley_timer,
    } = &mut enemy.special
    else {
        return;
    };

    *timer -= dt;
    if *timer <= 0.0 {
        *shielded = !*shielded;
        *timer = if *shielded {
            tuning.fortress_shield_secs
        } else {
            tuning.fortress_vulnerable_secs
        };
        debug!(enemy = enemy.id.get(), shielded = *shielded, "fortress shield toggled");
    }

    *turret_angle = (*turret_angle + tuning.fortress_turret_speed * dt).rem_euclid(TAU);
    *volley_timer -= dt;
    if *volley_timer <= 0.0 {
        *volley_timer = tuning.fortress_volley_cooldown;
        attack::ring(
            enemy.position,
            *turret_angle,
            FORTRESS_VOLLEY_SIZE,
            enemy.bullet_speed,
            damage,
            out,
        );
    }
}

/// Void: fades out, jumps to a random point leaving a gravity well behind,
/// fades back in and launches homing missiles between jumps.
///
/// Returns this frame's pull displacement from the boss's wells.
pub(crate) fn teleport<R: Rng + ?Sized>(
    enemy: &mut EnemyInstance,
    dt: f32,
    ctx: &BehaviorContext<'_>,
    rng: &mut R,
    out: &mut Vec<Command>,
) -> Vec2 {
    let tuning = &ctx.tuning.boss;
    let fade = tuning.void_fade_secs.max(f32::EPSILON);
    let aim = ctx.aim_point();
    let SpecialState::Teleport {
        phase,
        timer,
        opacity,
        wells,
        destination,
        missile_timer,
        ..
    } = &mut enemy.special
    else {
        return Vec2::ZERO;
    };

    for well in wells.iter_mut() {
        well.remaining -= dt;
    }
    wells.retain(|well| well.remaining > 0.0);

    *timer -= dt;
    match *phase {
        TeleportPhase::Idle => {
            *missile_timer -= dt;
            if *missile_timer <= 0.0 {
                *missile_timer = tuning.void_missile_cooldown;
                let heading = attack::aimed_direction(enemy.position, aim);
                let angle = heading.y.atan2(heading.x);
                for spread in [-VOID_MISSILE_SPREAD, VOID_MISSILE_SPREAD] {
                    out.push(Command::SpawnHomingMissile {
                        position: enemy.position,
                        angle: angle + spread,
                    });
                }
            }
            if *timer <= 0.0 {
                *phase = TeleportPhase::FadingOut;
                *timer = fade;
                *destination = random_destination(rng, ctx.bounds, enemy.radius);
            }
        }
        TeleportPhase::FadingOut => {
            *opacity = (*timer / fade).clamp(0.0, 1.0);
            if *timer <= 0.0 {
                wells.push(GravityWell {
                    position: enemy.position,
                    remaining: tuning.void_well_duration,
                });
                debug!(
                    enemy = enemy.id.get(),
                    from = ?enemy.position,
                    to = ?destination,
                    "void teleported"
                );
                enemy.position = *destination;
                enemy.anchor = *destination;
                enemy.pattern_timer = 0.0;
                *phase = TeleportPhase::FadingIn;
                *timer = fade;
                *opacity = 0.0;
            }
        }
        TeleportPhase::FadingIn => {
            *opacity = (1.0 - *timer / fade).clamp(0.0, 1.0);
            if *timer <= 0.0 {
                *phase = TeleportPhase::Idle;
                *timer = tuning.void_teleport_interval;
                *opacity = 1.0;
            }
        }
    }

    let Some(player) = aim else {
        return Vec2::ZERO;
    };
    wells
        .iter()
        .map(|well| well_pull(well.position, player, tuning))
        .sum::<Vec2>()
        * dt
}

fn random_destination<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds, radius: f32) -> Vec2 {
    let max_x = (bounds.width() - radius).max(radius);
    let max_y = (bounds.height() * VOID_DESTINATION_DEPTH).max(radius);
    Vec2::new(rng.gen_range(radius..=max_x), rng.gen_range(radius..=max_y))
}
