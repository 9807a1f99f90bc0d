#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave sequencing for one level.
//!
//! The manager walks the level's waves in order, never spawning a new wave while
//! an earlier enemy is still active, then hands off to the miniboss and the boss
//! before reporting the level complete. Time advances only through
//! [`Event::TimeAdvanced`] and kills are observed through [`Event::BossDefeated`],
//! so the manager never touches the world directly.

use nova_siege_core::{
    Bounds, Command, Cue, DifficultyProfile, EnemyKind, Event, LevelDefinition, SoundCue,
    SpawnScaling, Tuning, Vec2, WaveDefinition, WaveSpawn,
};
use tracing::{debug, info, warn};

/// Vertical gap between the playfield top and a freshly spawned enemy's edge.
pub const SPAWN_MARGIN: f32 = 10.0;

/// Orchestration phase of the current level. Exactly one holds at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// No level is running.
    Idle,
    /// Regular waves are being spawned and cleared.
    SpawningWaves,
    /// Waves are exhausted; the miniboss enters after a short warning.
    AwaitingMiniboss,
    /// The miniboss is on the field.
    MinibossActive,
    /// The boss enters after a short warning.
    AwaitingBoss,
    /// The boss is on the field.
    BossActive,
    /// Every wave and boss of the level has been cleared.
    LevelComplete,
}

/// Wave manager state machine.
#[derive(Debug)]
pub struct WaveManager {
    level: Option<LevelDefinition>,
    phase: WavePhase,
    current_wave: usize,
    wave_delay: f32,
    wave_cleared: bool,
    pending_boss: Option<EnemyKind>,
    miniboss_notified: bool,
    phase_timer: f32,
    scratch: Vec<Command>,
}

impl Default for WaveManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveManager {
    /// Creates an idle wave manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: None,
            phase: WavePhase::Idle,
            current_wave: 0,
            wave_delay: 0.0,
            wave_cleared: true,
            pending_boss: None,
            miniboss_notified: false,
            phase_timer: 0.0,
            scratch: Vec::new(),
        }
    }

    /// Starts sequencing `level` from its first wave.
    pub fn begin_level(&mut self, level: LevelDefinition, tuning: &Tuning) {
        info!(
            level = level.number,
            name = %level.name,
            waves = level.waves.len(),
            miniboss = ?level.miniboss,
            boss = ?level.boss,
            "wave plan loaded"
        );
        self.phase = WavePhase::SpawningWaves;
        self.current_wave = 0;
        self.wave_cleared = true;
        self.wave_delay = next_delay(&level.waves, 0, tuning);
        self.pending_boss = level.boss;
        self.miniboss_notified = false;
        self.phase_timer = 0.0;
        self.level = Some(level);
    }

    /// Drops the running level and returns to [`WavePhase::Idle`].
    pub fn reset(&mut self) {
        *self = Self {
            scratch: std::mem::take(&mut self.scratch),
            ..Self::new()
        };
    }

    /// Current orchestration phase.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Number of waves spawned so far in the running level.
    #[must_use]
    pub fn waves_spawned(&self) -> usize {
        self.current_wave
    }

    /// Level being sequenced, if any.
    #[must_use]
    pub fn level(&self) -> Option<&LevelDefinition> {
        self.level.as_ref()
    }

    /// Whether the miniboss of the running level has been announced.
    #[must_use]
    pub fn miniboss_notified(&self) -> bool {
        self.miniboss_notified
    }

    /// Advances the state machine by the time reported in `events` and queues
    /// the resulting spawns, announcements and cues.
    pub fn handle(
        &mut self,
        events: &[Event],
        active_enemies: usize,
        bounds: Bounds,
        difficulty: &dyn DifficultyProfile,
        tuning: &Tuning,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();
        let Some(level) = self.level.take() else {
            return;
        };

        let dt: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();

        for event in events {
            if let Event::BossDefeated { kind, .. } = event {
                self.boss_defeated(*kind, &level, tuning);
            }
        }

        match self.phase {
            WavePhase::SpawningWaves => {
                self.advance_waves(&level, dt, active_enemies, bounds, difficulty, tuning);
            }
            WavePhase::AwaitingMiniboss => {
                self.phase_timer -= dt;
                if self.phase_timer <= 0.0 && active_enemies == 0 {
                    if let Some(kind) = level.miniboss {
                        self.spawn_boss(kind, &level, difficulty);
                        self.phase = WavePhase::MinibossActive;
                    } else {
                        self.after_miniboss(&level, tuning);
                    }
                }
            }
            WavePhase::AwaitingBoss => {
                self.phase_timer -= dt;
                if self.phase_timer <= 0.0 && active_enemies == 0 {
                    if let Some(kind) = self.pending_boss.take() {
                        self.spawn_boss(kind, &level, difficulty);
                        self.phase = WavePhase::BossActive;
                    } else {
                        self.complete(&level);
                    }
                }
            }
            WavePhase::Idle
            | WavePhase::MinibossActive
            | WavePhase::BossActive
            | WavePhase::LevelComplete => {}
        }

        self.level = Some(level);
        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn advance_waves(
        &mut self,
        level: &LevelDefinition,
        dt: f32,
        active_enemies: usize,
        bounds: Bounds,
        difficulty: &dyn DifficultyProfile,
        tuning: &Tuning,
    ) {
        if !self.wave_cleared {
            if active_enemies > 0 {
                return;
            }
            self.wave_cleared = true;
            self.wave_delay = next_delay(&level.waves, self.current_wave, tuning);
            debug!(
                level = level.number,
                cleared = self.current_wave,
                delay = self.wave_delay,
                "wave cleared"
            );
        }

        if self.current_wave >= level.waves.len() {
            if active_enemies == 0 {
                self.waves_exhausted(level, tuning);
            }
            return;
        }

        self.wave_delay -= dt;
        if self.wave_delay > 0.0 || active_enemies > 0 {
            return;
        }

        let index = self.current_wave;
        self.spawn_wave(level, index, bounds, difficulty);
        self.current_wave += 1;
        self.wave_cleared = false;
    }

    fn spawn_wave(
        &mut self,
        level: &LevelDefinition,
        index: usize,
        bounds: Bounds,
        difficulty: &dyn DifficultyProfile,
    ) {
        let wave = &level.waves[index];
        let count = wave.spawns.len();
        for (slot, spawn) in wave.spawns.iter().enumerate() {
            let scaling = SpawnScaling::for_level(
                level.number,
                spawn.kind.is_boss_class(),
                difficulty,
                level.speed_multiplier,
            );
            self.scratch.push(Command::SpawnEnemy {
                kind: spawn.kind,
                position: spawn_position(spawn, wave, slot, count, bounds),
                pattern: spawn.resolved_pattern(),
                scaling,
            });
        }
        info!(
            level = level.number,
            wave = index + 1,
            total = level.waves.len(),
            enemies = count,
            "wave spawned"
        );
        self.scratch.push(Command::AnnounceWave {
            level: level.number,
            wave: index,
            total: level.waves.len(),
        });
        self.scratch.push(sound(SoundCue::WaveStart));
    }

    fn waves_exhausted(&mut self, level: &LevelDefinition, tuning: &Tuning) {
        if let Some(kind) = level.miniboss {
            self.phase = WavePhase::AwaitingMiniboss;
            self.phase_timer = tuning.waves.miniboss_delay;
            self.miniboss_notified = true;
            self.warn_of(kind, SoundCue::MinibossAlarm);
            info!(level = level.number, miniboss = kind.id(), "miniboss incoming");
        } else {
            self.after_miniboss(level, tuning);
        }
    }

    fn after_miniboss(&mut self, level: &LevelDefinition, tuning: &Tuning) {
        match self.pending_boss {
            Some(kind) => {
                self.phase = WavePhase::AwaitingBoss;
                self.phase_timer = tuning.waves.boss_delay;
                self.warn_of(kind, SoundCue::BossAlarm);
                info!(level = level.number, boss = kind.id(), "boss incoming");
            }
            None => self.complete(level),
        }
    }

    fn boss_defeated(&mut self, kind: EnemyKind, level: &LevelDefinition, tuning: &Tuning) {
        match self.phase {
            WavePhase::MinibossActive => {
                info!(level = level.number, miniboss = kind.id(), "miniboss defeated");
                match self.pending_boss {
                    Some(boss) => {
                        self.phase = WavePhase::AwaitingBoss;
                        self.phase_timer = tuning.waves.handoff_delay;
                        self.warn_of(boss, SoundCue::BossAlarm);
                    }
                    None => self.complete(level),
                }
            }
            WavePhase::BossActive => {
                info!(level = level.number, boss = kind.id(), "boss defeated");
                self.complete(level);
            }
            phase => warn!(?phase, kind = kind.id(), "boss defeat outside a boss phase"),
        }
    }

    fn spawn_boss(
        &mut self,
        kind: EnemyKind,
        level: &LevelDefinition,
        difficulty: &dyn DifficultyProfile,
    ) {
        let scaling =
            SpawnScaling::for_level(level.number, true, difficulty, level.speed_multiplier);
        self.scratch.push(Command::SpawnBoss { kind, scaling });
    }

    fn warn_of(&mut self, kind: EnemyKind, alarm: SoundCue) {
        self.scratch.push(Command::RaiseCue {
            cue: Cue::BossWarning { kind },
        });
        self.scratch.push(sound(alarm));
    }

    fn complete(&mut self, level: &LevelDefinition) {
        self.phase = WavePhase::LevelComplete;
        self.pending_boss = None;
        self.scratch.push(Command::CompleteLevel {
            level: level.number,
        });
    }
}

/// Spawn position of the `slot`-th member of a wave: the lane from the
/// relative x, shifted by the formation offset, just above the playfield.
#[must_use]
pub fn spawn_position(
    spawn: &WaveSpawn,
    wave: &WaveDefinition,
    slot: usize,
    count: usize,
    bounds: Bounds,
) -> Vec2 {
    let radius = spawn.kind.stats().radius;
    let offset = wave
        .formation
        .map_or(Vec2::ZERO, |formation| formation.offset(slot, count));
    let x = bounds.clamp_x(spawn.relative_x * bounds.width() + offset.x, radius);
    Vec2::new(x, -radius - SPAWN_MARGIN + offset.y)
}

fn next_delay(waves: &[WaveDefinition], index: usize, tuning: &Tuning) -> f32 {
    waves
        .get(index)
        .map_or(tuning.waves.fallback_delay, |wave| wave.delay)
}

fn sound(sound: SoundCue) -> Command {
    Command::RaiseCue {
        cue: Cue::Sound { sound },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_siege_core::{Formation, StandardDifficulty};
    use std::time::Duration;

    fn tick(seconds: f32) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_secs_f32(seconds),
        }]
    }

    fn level(waves: Vec<WaveDefinition>) -> LevelDefinition {
        LevelDefinition {
            number: 1,
            name: "Test".to_owned(),
            world: 1,
            theme: String::new(),
            waves,
            boss: None,
            miniboss: None,
            speed_multiplier: 1.0,
            procedural: false,
        }
    }

    #[test]
    fn formation_offsets_shift_members_above_the_lane() {
        let spawn = WaveSpawn::new(EnemyKind::Scout, 0.5);
        let wave = WaveDefinition::new(vec![spawn; 3]).with_formation(Formation::Column);
        let bounds = Bounds::default();
        let first = spawn_position(&spawn, &wave, 0, 3, bounds);
        let last = spawn_position(&spawn, &wave, 2, 3, bounds);
        assert_eq!(first.x, 400.0);
        assert_eq!(first.y, -16.0 - SPAWN_MARGIN);
        assert!(last.y < first.y);
    }

    #[test]
    fn v_formation_fans_wingmen_around_the_lane() {
        let spawn = WaveSpawn::new(EnemyKind::Fighter, 0.5);
        let wave = WaveDefinition::new(vec![spawn; 5]).with_formation(Formation::V);
        let bounds = Bounds::default();
        let xs: Vec<f32> = (0..5)
            .map(|slot| spawn_position(&spawn, &wave, slot, 5, bounds).x)
            .collect();
        assert_eq!(xs[2], 400.0);
        assert!(xs.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(xs[0] + xs[4], 800.0);
    }

    #[test]
    fn spawn_lanes_are_clamped_inside_the_playfield() {
        let spawn = WaveSpawn::new(EnemyKind::Bomber, 1.0);
        let wave = WaveDefinition::new(vec![spawn]);
        let position = spawn_position(&spawn, &wave, 0, 1, Bounds::default());
        assert_eq!(position.x, 800.0 - EnemyKind::Bomber.stats().radius);
    }

    #[test]
    fn level_without_bosses_completes_after_its_waves() {
        let tuning = Tuning::default();
        let mut manager = WaveManager::new();
        manager.begin_level(
            level(vec![
                WaveDefinition::new(vec![WaveSpawn::new(EnemyKind::Scout, 0.5)]).with_delay(0.0)
            ]),
            &tuning,
        );
        let mut out = Vec::new();

        manager.handle(&tick(0.016), 0, Bounds::default(), &StandardDifficulty, &tuning, &mut out);
        assert!(out
            .iter()
            .any(|command| matches!(command, Command::SpawnEnemy { .. })));

        out.clear();
        manager.handle(&tick(0.016), 1, Bounds::default(), &StandardDifficulty, &tuning, &mut out);
        assert!(out.is_empty());

        manager.handle(&tick(0.016), 0, Bounds::default(), &StandardDifficulty, &tuning, &mut out);
        assert_eq!(out, vec![Command::CompleteLevel { level: 1 }]);
        assert_eq!(manager.phase(), WavePhase::LevelComplete);
    }

    #[test]
    fn reset_returns_to_idle() {
        let tuning = Tuning::default();
        let mut manager = WaveManager::new();
        manager.begin_level(level(Vec::new()), &tuning);
        manager.reset();
        assert_eq!(manager.phase(), WavePhase::Idle);
        assert!(manager.level().is_none());

        let mut out = Vec::new();
        manager.handle(&tick(1.0), 0, Bounds::default(), &StandardDifficulty, &tuning, &mut out);
        assert!(out.is_empty());
    }
}
