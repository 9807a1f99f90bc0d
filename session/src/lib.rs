#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame pipeline for the Nova Siege gameplay engine.
//!
//! A [`Session`] owns the world, every gameplay system and the seeded RNG. Each
//! call to [`Session::step`] runs one frame in a fixed order: queued input,
//! clock tick, enemy and boss behavior (gravity pull applied once afterwards),
//! collision, death rewards, wave orchestration and level bookkeeping. Commands
//! produced by each stage are applied before the next stage looks at the world.

use std::time::Duration;

use nova_siege_core::{
    BehaviorContext, Bounds, Command, DifficultyProfile, Event, NoPerks, Owner, PerkModifiers,
    StandardDifficulty, Tuning, Vec2,
};
use nova_siege_system_boss_behavior::BossBehavior;
use nova_siege_system_collision::{CollisionResolver, Scene};
use nova_siege_system_enemy_behavior::{EnemyBehavior, Rewards};
use nova_siege_system_levels::{LevelCatalog, LevelManager, LevelReport};
use nova_siege_system_waves::{WaveManager, WavePhase};
use nova_siege_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Parameters fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Seed for every random roll made during play.
    pub seed: u64,
    /// Level played first and after a reset.
    pub start_level: u32,
    /// Playfield dimensions.
    pub bounds: Bounds,
    /// Balance parameters.
    pub tuning: Tuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            start_level: 1,
            bounds: Bounds::default(),
            tuning: Tuning::default(),
        }
    }
}

/// Coarse state of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionState {
    /// A level is running.
    Playing,
    /// A level finished and the next one starts when the countdown expires.
    Intermission {
        /// Seconds until the next level.
        remaining: f32,
    },
    /// The player ran out of lives.
    GameOver,
    /// The final level was cleared.
    Victory,
}

impl SessionState {
    /// Reports whether further steps can change anything.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

/// One play-through: the world plus every system that drives it.
pub struct Session {
    config: SessionConfig,
    world: World,
    rng: ChaCha8Rng,
    difficulty: Box<dyn DifficultyProfile>,
    perks: Box<dyn PerkModifiers>,
    enemy_behavior: EnemyBehavior,
    boss_behavior: BossBehavior,
    collision: CollisionResolver,
    rewards: Rewards,
    waves: WaveManager,
    levels: LevelManager,
    state: SessionState,
    pending: Vec<Command>,
    commands: Vec<Command>,
}

impl Session {
    /// Creates a session on the configured start level with standard
    /// difficulty and no perks.
    #[must_use]
    pub fn new(config: SessionConfig, catalog: LevelCatalog) -> Self {
        let mut session = Self {
            world: World::with_tuning(config.tuning.clone()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            difficulty: Box::new(StandardDifficulty),
            perks: Box::new(NoPerks),
            enemy_behavior: EnemyBehavior::new(),
            boss_behavior: BossBehavior::new(),
            collision: CollisionResolver::new(),
            rewards: Rewards::new(),
            waves: WaveManager::new(),
            levels: LevelManager::new(catalog),
            state: SessionState::Playing,
            pending: Vec::new(),
            commands: Vec::new(),
            config,
        };
        session.begin();
        session
    }

    /// Replaces the difficulty and perk providers.
    #[must_use]
    pub fn with_providers(
        mut self,
        difficulty: Box<dyn DifficultyProfile>,
        perks: Box<dyn PerkModifiers>,
    ) -> Self {
        self.difficulty = difficulty;
        self.perks = perks;
        self
    }

    /// Returns to the start level with a fresh world and a reseeded RNG.
    pub fn reset(&mut self) {
        info!(seed = self.config.seed, "session reset");
        self.world = World::with_tuning(self.config.tuning.clone());
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.enemy_behavior.reset();
        self.waves.reset();
        self.levels.reset();
        self.pending.clear();
        self.commands.clear();
        self.begin();
    }

    fn begin(&mut self) {
        let mut ignored = Vec::new();
        world::apply(
            &mut self.world,
            Command::ConfigurePlayfield {
                bounds: self.config.bounds,
            },
            &mut ignored,
        );
        let level = self.levels.start_level(self.config.start_level);
        self.waves.begin_level(level, &self.config.tuning);
        self.state = SessionState::Playing;
    }

    /// Queues a command to run at the start of the next step.
    pub fn submit(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Queues a player move to the given top-left position.
    pub fn move_player(&mut self, position: Vec2) {
        self.submit(Command::MovePlayer { position });
    }

    /// Queues a player bullet fired upward from the nose of the ship.
    pub fn fire(&mut self) {
        let player = query::player(&self.world);
        if !player.active {
            return;
        }
        let combat = &self.config.tuning.combat;
        let command = Command::SpawnBullet {
            position: Vec2::new(player.center().x, player.position.y),
            velocity: Vec2::new(0.0, -combat.player_bullet_speed),
            owner: Owner::Player,
            damage: combat.player_bullet_damage,
            pierce: self.perks.pierce_count(),
        };
        self.submit(command);
    }

    /// Runs one frame and appends every event it produced to `out`.
    ///
    /// `dt` is clamped to the configured maximum. Finished sessions ignore steps.
    pub fn step(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.state.is_finished() {
            return;
        }
        let dt = Duration::try_from_secs_f32(self.config.tuning.frame.max_dt)
            .map_or(dt, |max| dt.min(max));
        let seconds = dt.as_secs_f32();
        let mut frame = Vec::new();

        execute(&mut self.world, &mut self.pending, &mut frame);
        world::apply(&mut self.world, Command::Tick { dt }, &mut frame);

        if let SessionState::Intermission { remaining } = &mut self.state {
            *remaining -= seconds;
            if *remaining <= 0.0 {
                self.next_level(&mut frame);
            }
        }

        let level = self.levels.current_level();
        let ctx = BehaviorContext {
            player: Some(query::player(&self.world)),
            bounds: query::bounds(&self.world),
            level,
            tuning: &self.config.tuning,
        };
        self.enemy_behavior.handle(
            seconds,
            world::enemies_mut(&mut self.world),
            &ctx,
            &mut self.rng,
            &mut self.commands,
        );
        let pull = self.boss_behavior.handle(
            seconds,
            world::enemies_mut(&mut self.world),
            &ctx,
            &mut self.rng,
            &mut self.commands,
        );
        if pull != Vec2::ZERO {
            self.commands.push(Command::DisplacePlayer { offset: pull });
        }
        execute(&mut self.world, &mut self.commands, &mut frame);

        {
            let projectiles = query::projectiles(&self.world);
            let power_ups = query::power_ups(&self.world);
            let scene = Scene {
                enemies: query::enemies(&self.world),
                projectiles: &projectiles,
                power_ups: &power_ups,
                player: Some(query::player(&self.world)),
            };
            self.collision.handle(
                scene,
                self.perks.as_ref(),
                &self.config.tuning,
                &mut self.rng,
                &mut self.commands,
            );
        }
        execute(&mut self.world, &mut self.commands, &mut frame);

        self.rewards.handle(
            &frame,
            level,
            &self.config.tuning,
            &mut self.rng,
            &mut self.commands,
        );
        execute(&mut self.world, &mut self.commands, &mut frame);

        self.waves.handle(
            &frame,
            query::active_enemy_count(&self.world),
            query::bounds(&self.world),
            self.difficulty.as_ref(),
            &self.config.tuning,
            &mut self.commands,
        );
        execute(&mut self.world, &mut self.commands, &mut frame);

        self.levels.handle(&frame, &mut self.commands);
        execute(&mut self.world, &mut self.commands, &mut frame);

        self.settle(&frame);
        out.append(&mut frame);
    }

    fn next_level(&mut self, frame: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::ResetLevelState, frame);
        match self.levels.advance() {
            Some(level) => {
                self.waves.begin_level(level, &self.config.tuning);
                self.state = SessionState::Playing;
            }
            None => self.state = SessionState::Victory,
        }
    }

    fn settle(&mut self, frame: &[Event]) {
        if frame.iter().any(|event| matches!(event, Event::PlayerDestroyed)) {
            info!(
                level = self.levels.current_level(),
                score = query::score(&self.world),
                "game over"
            );
            self.state = SessionState::GameOver;
            return;
        }
        let completed = frame
            .iter()
            .any(|event| matches!(event, Event::LevelCompleted { .. }));
        if !completed || self.state != SessionState::Playing {
            return;
        }
        if self.levels.has_next() {
            let remaining = self.config.tuning.waves.intermission;
            debug!(remaining, "intermission");
            self.state = SessionState::Intermission { remaining };
        } else {
            info!(score = query::score(&self.world), "campaign cleared");
            self.state = SessionState::Victory;
        }
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Coarse session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Level being played.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.levels.current_level()
    }

    /// World of the level being played.
    #[must_use]
    pub fn world_number(&self) -> u32 {
        self.levels.current_world()
    }

    /// Phase of the wave orchestration.
    #[must_use]
    pub fn wave_phase(&self) -> WavePhase {
        self.waves.phase()
    }

    /// Reports of every level cleared so far.
    #[must_use]
    pub fn reports(&self) -> &[LevelReport] {
        self.levels.reports()
    }

    /// Running score.
    #[must_use]
    pub fn score(&self) -> u64 {
        query::score(&self.world)
    }

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

fn execute(world: &mut World, commands: &mut Vec<Command>, frame: &mut Vec<Event>) {
    for command in commands.drain(..) {
        world::apply(world, command, frame);
    }
}
