#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives bosses and minibosses.
//!
//! A boss walks through its intro (`Warning`, `Transition`, `Deployed`) before
//! it sweeps, fires from its part emitters and runs its kind-specific mechanic.
//! Gravity wells left by the Void do not move the player directly: their pull
//! is summed over every boss and returned to the caller, which applies it once.

use nova_siege_core::{
    BehaviorContext, Command, Cue, EnemyInstance, EnemyKind, FirePattern, IntroPhase, MovementPattern,
    PartRole, SpecialState, TeleportPhase, Vec2,
};
use nova_siege_system_enemy_behavior::attack;
use rand::Rng;
use tracing::{debug, info};

mod mechanics;

pub use mechanics::well_pull;

/// Boss behavior system.
#[derive(Debug, Default)]
pub struct BossBehavior {
    scratch: Vec<Command>,
}

impl BossBehavior {
    /// Creates a new boss behavior system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every boss-class enemy and returns the accumulated gravity pull
    /// to apply to the player this frame.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        enemies: &mut [EnemyInstance],
        ctx: &BehaviorContext<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) -> Vec2 {
        self.scratch.clear();
        let mut pull = Vec2::ZERO;

        for enemy in enemies
            .iter_mut()
            .filter(|enemy| enemy.active && enemy.boss.is_some())
        {
            if !advance_intro(enemy, dt, ctx, &mut self.scratch) {
                continue;
            }

            enemy.pattern_timer += dt;
            if let Some(frame) = enemy.boss.as_mut() {
                frame.clock += dt;
            }

            match enemy.kind {
                EnemyKind::Hydra => mechanics::regenerate(enemy, dt, ctx),
                EnemyKind::Fortress => mechanics::shield_cycle(enemy, dt, ctx, &mut self.scratch),
                EnemyKind::Void => {
                    pull += mechanics::teleport(enemy, dt, ctx, rng, &mut self.scratch);
                }
                _ => {}
            }

            if !is_teleporting(enemy) {
                sweep(enemy, dt, ctx);
            }
            fire_emitters(enemy, dt, ctx, &mut self.scratch);
        }

        if !self.scratch.is_empty() {
            out.reserve(self.scratch.len());
            out.append(&mut self.scratch);
        }
        pull
    }
}

/// Resolves a projectile impact to the nearest intersecting, intact part.
///
/// Part positions include orbit and bob offsets at the boss's current clock.
/// Returns `None` for regular enemies and for impacts that miss every part.
#[must_use]
pub fn resolve_part_hit(enemy: &EnemyInstance, impact: Vec2, hit_radius: f32) -> Option<usize> {
    let frame = enemy.boss.as_ref()?;
    frame
        .parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !part.destroyed)
        .filter_map(|(index, part)| {
            let distance = part
                .world_position(enemy.position, frame.clock)
                .distance(impact);
            (distance <= part.radius + hit_radius).then_some((index, distance))
        })
        .min_by(|left, right| left.1.total_cmp(&right.1))
        .map(|(index, _)| index)
}

/// Runs the intro state machine. Returns `true` once the boss is deployed.
fn advance_intro(
    enemy: &mut EnemyInstance,
    dt: f32,
    ctx: &BehaviorContext<'_>,
    out: &mut Vec<Command>,
) -> bool {
    let tuning = &ctx.tuning.boss;
    let Some(frame) = enemy.boss.as_mut() else {
        return false;
    };

    match frame.intro {
        IntroPhase::Deployed => return true,
        IntroPhase::Warning => {
            frame.intro_timer -= dt;
            if frame.intro_timer <= 0.0 {
                frame.intro = IntroPhase::Transition;
                frame.intro_timer = tuning.transition_secs;
                debug!(enemy = enemy.id.get(), kind = enemy.kind.id(), "boss entering");
                out.push(Command::RaiseCue {
                    cue: Cue::CameraShake {
                        intensity: tuning.intro_shake,
                        duration: tuning.transition_secs,
                    },
                });
            }
        }
        IntroPhase::Transition => {
            frame.intro_timer -= dt;
            let total = tuning.transition_secs.max(f32::EPSILON);
            let progress = (1.0 - frame.intro_timer / total).clamp(0.0, 1.0);
            let eased = progress * progress * (3.0 - 2.0 * progress);
            enemy.position = frame.entry_position.lerp(frame.battle_position, eased);
            if frame.intro_timer <= 0.0 {
                frame.intro = IntroPhase::Deployed;
                enemy.position = frame.battle_position;
                enemy.anchor = frame.battle_position;
                enemy.pattern_timer = 0.0;
                info!(enemy = enemy.id.get(), kind = enemy.kind.id(), "boss deployed");
            }
        }
    }
    false
}

fn is_teleporting(enemy: &EnemyInstance) -> bool {
    matches!(
        enemy.special,
        SpecialState::Teleport { phase, .. } if phase != TeleportPhase::Idle
    )
}

fn sweep(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let frequency = ctx.tuning.movement.boss_sweep_frequency;
    let t = enemy.pattern_timer * frequency;
    let range = (ctx.bounds.width() * 0.5 - enemy.radius).max(0.0);
    let offset = match enemy.pattern {
        MovementPattern::BossHydra => Vec2::new(t.sin() * range * 0.6, (t * 2.0).sin() * 30.0),
        MovementPattern::BossFortress => Vec2::new((t * 0.5).sin() * range * 0.3, 0.0),
        MovementPattern::BossVoid => Vec2::new(
            (t * 1.3).sin() * range * 0.5 + ((t * 0.7).cos() - 1.0) * range * 0.15,
            (t.cos() - 1.0) * 40.0,
        ),
        _ => Vec2::new(t.sin() * range * 0.7, (t * 2.0).sin() * 20.0),
    };
    let target = enemy.anchor + offset;
    let clamped = Vec2::new(ctx.bounds.clamp_x(target.x, enemy.radius), target.y);
    if dt > 0.0 {
        enemy.velocity = (clamped - enemy.position) / dt;
    }
    enemy.position = clamped;
}

fn fire_emitters(
    enemy: &mut EnemyInstance,
    dt: f32,
    ctx: &BehaviorContext<'_>,
    out: &mut Vec<Command>,
) {
    let enraged = matches!(enemy.special, SpecialState::Regenerate { enraged: true, .. });
    let calm_hydra = matches!(enemy.special, SpecialState::Regenerate { enraged: false, .. });
    let enraged_cooldown = ctx.tuning.boss.hydra_enraged_cooldown;
    let damage = ctx.tuning.combat.boss_contact_damage as f32;
    let aim = ctx.aim_point();
    let speed = enemy.bullet_speed;
    let centre = enemy.position;
    let Some(frame) = enemy.boss.as_mut() else {
        return;
    };
    let clock = frame.clock;

    for part in frame
        .parts
        .iter_mut()
        .filter(|part| !part.destroyed && part.has_emitter())
    {
        part.emitter_timer -= dt;
        if part.emitter_timer > 0.0 {
            continue;
        }
        part.emitter_timer = if enraged {
            enraged_cooldown.min(part.emitter_cooldown)
        } else {
            part.emitter_cooldown
        };

        let origin = part.world_position(centre, clock);
        match part.role {
            PartRole::Arm => {
                let heading = attack::aimed_direction(origin, aim);
                attack::fan(
                    origin,
                    heading.y.atan2(heading.x),
                    3,
                    0.5,
                    speed,
                    damage,
                    out,
                );
            }
            _ if calm_hydra => attack::volley(
                FirePattern::Spread {
                    count: 3,
                    arc: 0.4,
                },
                origin,
                aim,
                speed,
                damage,
                out,
            ),
            _ => attack::volley(FirePattern::Aimed, origin, aim, speed, damage, out),
        }
    }
}
