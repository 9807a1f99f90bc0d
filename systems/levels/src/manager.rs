use nova_siege_core::{Command, Cue, Event, LevelDefinition, SoundCue};
use tracing::{debug, info};

use crate::{world_of, LevelCatalog};

/// Statistics gathered while a level is played.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LevelStats {
    /// Enemies destroyed, bosses included.
    pub enemies_killed: u32,
    /// Lives the player lost.
    pub damage_taken: u32,
    /// Seconds of simulated play.
    pub elapsed: f32,
}

/// Summary recorded when a level completes.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelReport {
    /// Level that completed.
    pub level: u32,
    /// World the level belongs to.
    pub world: u32,
    /// Statistics at completion.
    pub stats: LevelStats,
}

/// Tracks level and world progression and collects per-level statistics.
#[derive(Debug)]
pub struct LevelManager {
    catalog: LevelCatalog,
    current_level: u32,
    current_world: u32,
    stats: LevelStats,
    reports: Vec<LevelReport>,
    scratch: Vec<Command>,
}

impl LevelManager {
    /// Creates a manager serving levels from `catalog`. No level is active until
    /// [`LevelManager::start_level`] is called.
    #[must_use]
    pub fn new(catalog: LevelCatalog) -> Self {
        Self {
            catalog,
            current_level: 0,
            current_world: 0,
            stats: LevelStats::default(),
            reports: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Makes `number` the current level and resets its statistics.
    ///
    /// Out-of-range numbers are clamped by the catalog; the returned definition
    /// carries the level actually served.
    pub fn start_level(&mut self, number: u32) -> LevelDefinition {
        let level = self.catalog.level(number);
        self.current_level = level.number;
        self.current_world = level.world;
        self.stats = LevelStats::default();
        info!(
            level = level.number,
            world = level.world,
            name = %level.name,
            procedural = level.procedural,
            "level started"
        );
        level
    }

    /// Starts the level after the current one, if any.
    pub fn advance(&mut self) -> Option<LevelDefinition> {
        if !self.has_next() {
            return None;
        }
        Some(self.start_level(self.current_level + 1))
    }

    /// Reports whether a level follows the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_level < self.catalog.max_level()
    }

    /// Level being played, zero before the first start.
    #[must_use]
    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// World of the level being played, zero before the first start.
    #[must_use]
    pub fn current_world(&self) -> u32 {
        self.current_world
    }

    /// Statistics of the level being played.
    #[must_use]
    pub fn stats(&self) -> LevelStats {
        self.stats
    }

    /// Reports of every completed level, oldest first.
    #[must_use]
    pub fn reports(&self) -> &[LevelReport] {
        &self.reports
    }

    /// Catalog levels are served from.
    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Forgets every report and the current level.
    pub fn reset(&mut self) {
        self.current_level = 0;
        self.current_world = 0;
        self.stats = LevelStats::default();
        self.reports.clear();
        self.scratch.clear();
    }

    /// Folds world events into the level statistics and reacts to completion.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        self.scratch.clear();

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.stats.elapsed += dt.as_secs_f32(),
                Event::EnemyDestroyed { .. } => {
                    self.stats.enemies_killed = self.stats.enemies_killed.saturating_add(1);
                }
                Event::PlayerDamaged { amount, .. } => {
                    self.stats.damage_taken = self.stats.damage_taken.saturating_add(*amount);
                }
                Event::LevelCompleted { level } if *level == self.current_level => {
                    self.complete();
                }
                Event::LevelCompleted { level } => {
                    debug!(level, current = self.current_level, "ignoring stale completion");
                }
                _ => {}
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn complete(&mut self) {
        let report = LevelReport {
            level: self.current_level,
            world: self.current_world,
            stats: self.stats,
        };
        info!(
            level = report.level,
            kills = report.stats.enemies_killed,
            damage_taken = report.stats.damage_taken,
            seconds = report.stats.elapsed,
            "level report recorded"
        );
        self.reports.push(report);
        self.scratch.push(Command::RaiseCue {
            cue: Cue::Sound {
                sound: SoundCue::LevelClear,
            },
        });

        if !self.has_next() {
            info!(level = self.current_level, "final level cleared");
            return;
        }
        let next_world = world_of(self.current_level + 1);
        if next_world != self.current_world {
            self.scratch.push(Command::TransitionWorld {
                from: self.current_world,
                to: next_world,
            });
            self.scratch.push(Command::RaiseCue {
                cue: Cue::Sound {
                    sound: SoundCue::WorldTransition,
                },
            });
        }
    }
}
