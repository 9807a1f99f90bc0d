//! Attack scheduling and bullet pattern builders shared with the boss behavior.

use std::f32::consts::{FRAC_PI_2, TAU};

use nova_siege_core::{BehaviorContext, Command, EnemyInstance, FirePattern, Owner, Vec2};
use rand::Rng;

/// Builds a single enemy bullet travelling along `direction`.
#[must_use]
pub fn bullet(origin: Vec2, direction: Vec2, speed: f32, damage: f32) -> Command {
    Command::SpawnBullet {
        position: origin,
        velocity: direction.normalize_or_zero() * speed,
        owner: Owner::Enemy,
        damage,
        pierce: 0,
    }
}

/// Unit vector from `origin` toward `aim`, straight down when there is nothing to aim at.
#[must_use]
pub fn aimed_direction(origin: Vec2, aim: Option<Vec2>) -> Vec2 {
    aim.map(|target| (target - origin).normalize_or_zero())
        .filter(|direction| *direction != Vec2::ZERO)
        .unwrap_or(Vec2::Y)
}

/// Fan of `count` bullets spanning `arc` radians around `centre_angle`.
pub fn fan(
    origin: Vec2,
    centre_angle: f32,
    count: u32,
    arc: f32,
    speed: f32,
    damage: f32,
    out: &mut Vec<Command>,
) {
    if count == 0 {
        return;
    }
    if count == 1 {
        out.push(bullet(origin, Vec2::from_angle(centre_angle), speed, damage));
        return;
    }
    let step = arc / (count - 1) as f32;
    let start = centre_angle - arc * 0.5;
    for index in 0..count {
        let angle = start + step * index as f32;
        out.push(bullet(origin, Vec2::from_angle(angle), speed, damage));
    }
}

/// Ring of `count` bullets at even angles starting from `start_angle`.
pub fn ring(
    origin: Vec2,
    start_angle: f32,
    count: u32,
    speed: f32,
    damage: f32,
    out: &mut Vec<Command>,
) {
    if count == 0 {
        return;
    }
    let step = TAU / count as f32;
    for index in 0..count {
        let angle = start_angle + step * index as f32;
        out.push(bullet(origin, Vec2::from_angle(angle), speed, damage));
    }
}

/// Emits the bullets for one firing of `pattern`.
pub fn volley(
    pattern: FirePattern,
    origin: Vec2,
    aim: Option<Vec2>,
    speed: f32,
    damage: f32,
    out: &mut Vec<Command>,
) {
    match pattern {
        FirePattern::Straight => out.push(bullet(origin, Vec2::Y, speed, damage)),
        FirePattern::Aimed => out.push(bullet(
            origin,
            aimed_direction(origin, aim),
            speed,
            damage,
        )),
        FirePattern::Spread { count, arc } => {
            fan(origin, FRAC_PI_2, count, arc, speed, damage, out);
        }
        FirePattern::Burst { count } => ring(origin, FRAC_PI_2, count, speed, damage, out),
        FirePattern::Emitters => {}
    }
}

/// Advances the attack timers of a regular enemy and fires when a roll succeeds.
pub(crate) fn update<R: Rng + ?Sized>(
    enemy: &mut EnemyInstance,
    dt: f32,
    ctx: &BehaviorContext<'_>,
    rng: &mut R,
    can_fire: bool,
    out: &mut Vec<Command>,
) {
    if enemy.attack_delay > 0.0 {
        enemy.attack_delay = (enemy.attack_delay - dt).max(0.0);
        return;
    }

    enemy.shoot_cooldown -= dt;
    if enemy.shoot_cooldown > 0.0 {
        return;
    }
    enemy.shoot_cooldown = enemy.fire_cooldown;

    if !can_fire || enemy.position.y < 0.0 {
        return;
    }
    let chance = ctx.tuning.fire.chance(enemy.level, enemy.elite);
    if rng.gen::<f32>() >= chance {
        return;
    }

    let muzzle = enemy.position + Vec2::new(0.0, enemy.radius);
    volley(
        enemy.fire,
        muzzle,
        ctx.aim_point(),
        enemy.bullet_speed,
        ctx.tuning.combat.enemy_bullet_damage,
        out,
    );
}
