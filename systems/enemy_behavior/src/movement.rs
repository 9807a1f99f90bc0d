//! Movement functions for regular enemies, selected by [`MovementPattern`].
//!
//! Each function advances position and velocity in place. Leaving the
//! playfield is detected by the caller.

use nova_siege_core::{BehaviorContext, EnemyInstance, MovementPattern, SpecialState, Vec2};

pub(crate) type MovementFn = fn(&mut EnemyInstance, f32, &BehaviorContext<'_>);

pub(crate) fn movement_for(pattern: MovementPattern) -> MovementFn {
    match pattern {
        MovementPattern::Straight => straight,
        MovementPattern::Sine
        | MovementPattern::Boss
        | MovementPattern::BossHydra
        | MovementPattern::BossFortress
        | MovementPattern::BossVoid => sine,
        MovementPattern::Zigzag => zigzag,
        MovementPattern::Dive => dive,
        MovementPattern::Phantom => phantom,
        MovementPattern::Sentinel => sentinel,
        MovementPattern::Swarm => swarm,
    }
}

fn settle(enemy: &mut EnemyInstance, target: Vec2, dt: f32, ctx: &BehaviorContext<'_>) {
    let clamped = Vec2::new(ctx.bounds.clamp_x(target.x, enemy.radius), target.y);
    if dt > 0.0 {
        enemy.velocity = (clamped - enemy.position) / dt;
    }
    enemy.position = clamped;
}

fn straight(enemy: &mut EnemyInstance, dt: f32, _ctx: &BehaviorContext<'_>) {
    enemy.velocity = Vec2::new(0.0, enemy.speed);
    enemy.position += enemy.velocity * dt;
}

fn sine(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let tuning = &ctx.tuning.movement;
    let lateral = (enemy.pattern_timer * tuning.sine_frequency).sin() * tuning.sine_amplitude;
    let target = Vec2::new(
        enemy.anchor.x + lateral,
        enemy.position.y + enemy.speed * dt,
    );
    settle(enemy, target, dt, ctx);
}

fn zigzag(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let tuning = &ctx.tuning.movement;
    let sign = if ((enemy.pattern_timer * tuning.zigzag_frequency).floor() as i64) % 2 == 0 {
        1.0
    } else {
        -1.0
    };
    let lateral = sign * enemy.speed * tuning.zigzag_lateral;
    let target = enemy.position + Vec2::new(lateral, enemy.speed) * dt;
    settle(enemy, target, dt, ctx);
}

fn dive(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let tuning = &ctx.tuning.movement;
    if enemy.pattern_timer < tuning.dive_hold {
        enemy.velocity = Vec2::new(0.0, enemy.speed * 0.3);
        enemy.position += enemy.velocity * dt;
        return;
    }

    let position = enemy.position;
    let heading = *enemy.dive_heading.get_or_insert_with(|| {
        ctx.aim_point()
            .map(|aim| (aim - position).normalize_or_zero())
            .filter(|heading| *heading != Vec2::ZERO)
            .unwrap_or(Vec2::Y)
    });
    enemy.velocity = heading * enemy.speed * tuning.dive_boost;
    enemy.position += enemy.velocity * dt;
}

fn phantom(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let amplitude = ctx.tuning.movement.sine_amplitude;
    let t = enemy.pattern_timer;
    let lateral = (t * 1.3).sin() * amplitude + (t * 0.7).cos() * amplitude * 0.5 - amplitude * 0.5;
    let target = Vec2::new(
        enemy.anchor.x + lateral,
        enemy.position.y + enemy.speed * 0.6 * dt,
    );
    settle(enemy, target, dt, ctx);
}

fn sentinel(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let hover = ctx.bounds.height() * ctx.tuning.movement.sentinel_hover_line;
    if enemy.position.y < hover {
        let y = (enemy.position.y + enemy.speed * dt).min(hover);
        let target = Vec2::new(enemy.position.x, y);
        settle(enemy, target, dt, ctx);
        return;
    }

    let mut lateral = if enemy.velocity.x < 0.0 {
        -enemy.speed
    } else {
        enemy.speed
    };
    let x = enemy.position.x + lateral * dt;
    let clamped = ctx.bounds.clamp_x(x, enemy.radius);
    if clamped != x {
        lateral = -lateral;
    }
    enemy.position = Vec2::new(clamped, hover);
    enemy.velocity = Vec2::new(lateral, 0.0);
}

fn swarm(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let amplitude = ctx.tuning.movement.sine_amplitude * 0.4;
    let jitter = match enemy.special {
        SpecialState::Jitter { offset, .. } => offset,
        _ => 0.0,
    };
    let lateral = (enemy.pattern_timer * 4.0).sin() * amplitude + jitter;
    let target = Vec2::new(
        enemy.anchor.x + lateral,
        enemy.position.y + enemy.speed * dt,
    );
    settle(enemy, target, dt, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_siege_core::{
        Bounds, EnemyId, EnemyKind, PlayerSnapshot, SpawnScaling, Tuning,
    };

    fn enemy(kind: EnemyKind, pattern: MovementPattern) -> EnemyInstance {
        EnemyInstance::spawn(
            EnemyId::new(0),
            kind,
            Vec2::new(400.0, 50.0),
            pattern,
            &SpawnScaling::IDENTITY,
            &Tuning::default(),
        )
    }

    fn context(tuning: &Tuning, player: Option<PlayerSnapshot>) -> BehaviorContext<'_> {
        BehaviorContext {
            player,
            bounds: Bounds::default(),
            level: 1,
            tuning,
        }
    }

    fn run(enemy: &mut EnemyInstance, ctx: &BehaviorContext<'_>, frames: usize, dt: f32) {
        let movement = movement_for(enemy.pattern);
        for _ in 0..frames {
            enemy.pattern_timer += dt;
            movement(enemy, dt, ctx);
        }
    }

    #[test]
    fn sine_stays_within_amplitude_of_its_lane() {
        let tuning = Tuning::default();
        let ctx = context(&tuning, None);
        let mut fighter = enemy(EnemyKind::Fighter, MovementPattern::Sine);
        for _ in 0..200 {
            run(&mut fighter, &ctx, 1, 0.016);
            let offset = (fighter.position.x - fighter.anchor.x).abs();
            assert!(offset <= tuning.movement.sine_amplitude + 1e-3);
        }
        assert!(fighter.position.y > 50.0);
    }

    #[test]
    fn zigzag_flips_lateral_direction() {
        let tuning = Tuning::default();
        let ctx = context(&tuning, None);
        let mut scout = enemy(EnemyKind::Scout, MovementPattern::Zigzag);
        run(&mut scout, &ctx, 10, 0.016);
        let early = scout.velocity.x;
        let half_period = 1.0 / tuning.movement.zigzag_frequency;
        run(&mut scout, &ctx, (half_period / 0.016) as usize + 2, 0.016);
        assert!(early > 0.0);
        assert!(scout.velocity.x < 0.0);
    }

    #[test]
    fn dive_locks_heading_toward_player_after_hold() {
        let tuning = Tuning::default();
        let player = PlayerSnapshot {
            position: Vec2::new(84.0, 484.0),
            size: Vec2::splat(32.0),
            active: true,
            lives: 3,
            invulnerable_for: 0.0,
            shield_charges: 0,
        };
        let ctx = context(&tuning, Some(player));
        let mut interceptor = enemy(EnemyKind::Interceptor, MovementPattern::Dive);
        run(&mut interceptor, &ctx, 10, 0.016);
        assert!(interceptor.dive_heading.is_none());
        assert_eq!(interceptor.velocity.x, 0.0);

        run(&mut interceptor, &ctx, 50, 0.016);
        let heading = interceptor.dive_heading.expect("dive committed");
        assert!(heading.x < 0.0 && heading.y > 0.0);

        let moved_player = context(&tuning, None);
        run(&mut interceptor, &moved_player, 5, 0.016);
        assert_eq!(interceptor.dive_heading, Some(heading));
    }

    #[test]
    fn dive_without_player_goes_straight_down() {
        let tuning = Tuning::default();
        let ctx = context(&tuning, None);
        let mut interceptor = enemy(EnemyKind::Interceptor, MovementPattern::Dive);
        run(&mut interceptor, &ctx, 60, 0.016);
        assert_eq!(interceptor.dive_heading, Some(Vec2::Y));
    }

    #[test]
    fn sentinel_hovers_and_patrols_inside_the_playfield() {
        let tuning = Tuning::default();
        let ctx = context(&tuning, None);
        let mut sentinel = enemy(EnemyKind::Sentinel, MovementPattern::Sentinel);
        run(&mut sentinel, &ctx, 2_000, 0.016);
        let hover = Bounds::default().height() * tuning.movement.sentinel_hover_line;
        assert_eq!(sentinel.position.y, hover);
        assert!(sentinel.position.x >= sentinel.radius);
        assert!(sentinel.position.x <= 800.0 - sentinel.radius);
    }
}
