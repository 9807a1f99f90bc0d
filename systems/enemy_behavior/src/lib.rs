#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives regular enemies: movement patterns, attack
//! scheduling and the per-kind special mechanics (cloak, shield, jitter).
//!
//! Each enemy is dispatched through a [`Strategy`] selected from its kind and
//! movement pattern the first frame it is advanced and cached by id until it
//! leaves play. Behavior state lives on the enemy itself and is advanced in
//! place; everything that affects other entities leaves as a [`Command`].
//! Boss-class enemies are skipped here and handled by the boss behavior.

use std::collections::BTreeMap;

use nova_siege_core::{
    BehaviorContext, Command, EnemyId, EnemyInstance, EnemyKind, MovementPattern, SpecialState,
};
use rand::Rng;
use tracing::{debug, trace};

pub mod attack;
mod movement;
mod rewards;

pub use rewards::{explosion_size, Rewards};

type SpecialFn = fn(&mut EnemyInstance, f32, &BehaviorContext<'_>);
type FireGate = fn(&EnemyInstance) -> bool;

/// Per-kind dispatch table entry.
#[derive(Clone, Copy)]
pub struct Strategy {
    movement: movement::MovementFn,
    special: SpecialFn,
    can_fire: FireGate,
}

impl Strategy {
    /// Looks up the strategy for an enemy of `kind` following `pattern`.
    #[must_use]
    pub fn for_enemy(kind: EnemyKind, pattern: MovementPattern) -> Self {
        let (special, can_fire): (SpecialFn, FireGate) = match kind {
            EnemyKind::Phantom => (cloak, visible),
            EnemyKind::Swarm => (jitter, always),
            _ => (inert, always),
        };
        Self {
            movement: movement::movement_for(pattern),
            special,
            can_fire,
        }
    }

    /// Advances one enemy by `dt` seconds.
    pub fn update<R: Rng + ?Sized>(
        &self,
        enemy: &mut EnemyInstance,
        dt: f32,
        ctx: &BehaviorContext<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        enemy.pattern_timer += dt;
        (self.special)(enemy, dt, ctx);
        (self.movement)(enemy, dt, ctx);
        let can_fire = (self.can_fire)(enemy);
        attack::update(enemy, dt, ctx, rng, can_fire, out);
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").finish_non_exhaustive()
    }
}

/// Enemy behavior system for regular enemies.
#[derive(Debug, Default)]
pub struct EnemyBehavior {
    strategies: BTreeMap<EnemyId, Strategy>,
    scratch: Vec<Command>,
}

impl EnemyBehavior {
    /// Creates a new enemy behavior system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every cached strategy.
    pub fn reset(&mut self) {
        self.strategies.clear();
    }

    /// Advances every active regular enemy in order and queues the resulting
    /// spawn and despawn requests.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        enemies: &mut [EnemyInstance],
        ctx: &BehaviorContext<'_>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();
        self.strategies
            .retain(|id, _| enemies.iter().any(|enemy| enemy.id == *id && enemy.active));

        for enemy in enemies
            .iter_mut()
            .filter(|enemy| enemy.active && !enemy.kind.is_boss_class())
        {
            let strategy = *self.strategies.entry(enemy.id).or_insert_with(|| {
                debug!(
                    enemy = enemy.id.get(),
                    kind = enemy.kind.id(),
                    pattern = ?enemy.pattern,
                    "strategy selected"
                );
                Strategy::for_enemy(enemy.kind, enemy.pattern)
            });
            strategy.update(enemy, dt, ctx, rng, &mut self.scratch);

            if escaped(enemy, ctx) {
                trace!(enemy = enemy.id.get(), "enemy left the playfield");
                self.scratch.push(Command::DespawnEnemy { enemy: enemy.id });
            }
        }

        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn escaped(enemy: &EnemyInstance, ctx: &BehaviorContext<'_>) -> bool {
    let margin = enemy.radius + ctx.tuning.combat.cull_margin;
    let bounds = ctx.bounds;
    enemy.position.y - enemy.radius > bounds.height()
        || enemy.position.x < -margin
        || enemy.position.x > bounds.width() + margin
}

fn inert(_enemy: &mut EnemyInstance, _dt: f32, _ctx: &BehaviorContext<'_>) {}

fn cloak(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let speed = ctx.tuning.specials.phantom_cloak_speed;
    if let SpecialState::Cloak { opacity, phase, .. } = &mut enemy.special {
        *phase += speed * dt;
        *opacity = 0.55 + 0.45 * phase.cos();
    }
}

fn jitter(enemy: &mut EnemyInstance, dt: f32, ctx: &BehaviorContext<'_>) {
    let tuning = &ctx.tuning.specials;
    if let SpecialState::Jitter {
        offset,
        direction,
        timer,
    } = &mut enemy.special
    {
        *timer -= dt;
        if *timer <= 0.0 {
            *direction = -*direction;
            *timer = tuning.swarm_flip_interval;
        }
        *offset = (*offset + *direction * tuning.swarm_jitter_speed * dt)
            .clamp(-tuning.swarm_jitter_range, tuning.swarm_jitter_range);
    }
}

fn always(_enemy: &EnemyInstance) -> bool {
    true
}

fn visible(enemy: &EnemyInstance) -> bool {
    match enemy.special {
        SpecialState::Cloak {
            opacity, threshold, ..
        } => opacity >= threshold,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_siege_core::{Bounds, EnemyId, SpawnScaling, Tuning, Vec2};
    use rand::rngs::mock::StepRng;

    fn spawn(kind: EnemyKind, position: Vec2) -> EnemyInstance {
        EnemyInstance::spawn(
            EnemyId::new(0),
            kind,
            position,
            kind.default_pattern(),
            &SpawnScaling::IDENTITY,
            &Tuning::default(),
        )
    }

    #[test]
    fn phantom_cloak_cycles_and_crosses_threshold() {
        let tuning = Tuning::default();
        let ctx = BehaviorContext {
            player: None,
            bounds: Bounds::default(),
            level: 1,
            tuning: &tuning,
        };
        let mut phantom = spawn(EnemyKind::Phantom, Vec2::new(400.0, 100.0));
        let mut min_opacity = 1.0_f32;
        let mut rng = StepRng::new(u64::MAX, 0);
        let strategy = Strategy::for_enemy(phantom.kind, phantom.pattern);
        let mut out = Vec::new();
        for _ in 0..400 {
            strategy.update(&mut phantom, 0.016, &ctx, &mut rng, &mut out);
            min_opacity = min_opacity.min(phantom.opacity());
        }
        assert!(min_opacity < tuning.specials.phantom_visibility_threshold);
        assert!(min_opacity >= 0.1 - 1e-4);
    }

    #[test]
    fn strategies_are_chosen_once_and_dropped_with_their_enemy() {
        let tuning = Tuning::default();
        let ctx = BehaviorContext {
            player: None,
            bounds: Bounds::default(),
            level: 1,
            tuning: &tuning,
        };
        let mut enemies = vec![spawn(EnemyKind::Scout, Vec2::new(200.0, 50.0))];
        enemies[0].pattern = MovementPattern::Straight;
        let mut behavior = EnemyBehavior::new();
        let mut rng = StepRng::new(u64::MAX, 0);
        let mut out = Vec::new();

        behavior.handle(0.1, &mut enemies, &ctx, &mut rng, &mut out);
        assert_eq!(behavior.strategies.len(), 1);

        // A pattern change after spawn does not swap the cached movement.
        let start_x = enemies[0].position.x;
        enemies[0].pattern = MovementPattern::Zigzag;
        for _ in 0..20 {
            behavior.handle(0.1, &mut enemies, &ctx, &mut rng, &mut out);
        }
        assert_eq!(enemies[0].position.x, start_x);

        enemies[0].active = false;
        behavior.handle(0.1, &mut enemies, &ctx, &mut rng, &mut out);
        assert!(behavior.strategies.is_empty());
    }

    #[test]
    fn cloaked_phantoms_hold_fire() {
        let mut phantom = spawn(EnemyKind::Phantom, Vec2::new(400.0, 100.0));
        if let SpecialState::Cloak { opacity, .. } = &mut phantom.special {
            *opacity = 0.05;
        }
        assert!(!visible(&phantom));
        assert!(always(&phantom));
    }

    #[test]
    fn swarm_jitter_stays_in_range_and_flips() {
        let tuning = Tuning::default();
        let ctx = BehaviorContext {
            player: None,
            bounds: Bounds::default(),
            level: 1,
            tuning: &tuning,
        };
        let mut swarm = spawn(EnemyKind::Swarm, Vec2::new(400.0, 0.0));
        let mut seen_negative = false;
        for _ in 0..120 {
            jitter(&mut swarm, 0.016, &ctx);
            if let SpecialState::Jitter {
                offset, direction, ..
            } = swarm.special
            {
                assert!(offset.abs() <= tuning.specials.swarm_jitter_range);
                seen_negative |= direction < 0.0;
            }
        }
        assert!(seen_negative);
    }
}
