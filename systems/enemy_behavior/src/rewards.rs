//! Death side effects: score, explosions, boss-defeat cues and level-gated
//! power-up drops.

use nova_siege_core::{
    Command, Cue, EnemyKind, Event, ExplosionSize, SoundCue, Tuning,
};
use rand::Rng;
use tracing::debug;

const BOSS_SHAKE_SECS: f32 = 0.8;

/// Explosion size used for an enemy's death: large for boss classes, medium otherwise.
#[must_use]
pub const fn explosion_size(kind: EnemyKind) -> ExplosionSize {
    if kind.is_boss_class() {
        ExplosionSize::Large
    } else {
        ExplosionSize::Medium
    }
}

/// Converts kill notifications into score, explosions and power-up drops.
#[derive(Debug, Default)]
pub struct Rewards {
    scratch: Vec<Command>,
}

impl Rewards {
    /// Creates a new rewards system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the death side effects for every kill in `events`.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        events: &[Event],
        level: u32,
        tuning: &Tuning,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for event in events {
            match *event {
                Event::EnemyDestroyed {
                    kind,
                    position,
                    score_value,
                    drop_chance,
                    ..
                } => {
                    if score_value > 0 {
                        self.scratch.push(Command::AddScore {
                            points: score_value,
                        });
                    }
                    self.scratch.push(Command::SpawnExplosion {
                        position,
                        size: explosion_size(kind),
                    });

                    if drop_chance <= 0.0 || rng.gen::<f32>() >= drop_chance {
                        continue;
                    }
                    let total = tuning.drops.total_weight(level);
                    if total == 0 {
                        continue;
                    }
                    let roll = rng.gen_range(0..total);
                    if let Some(power_up) = tuning.drops.pick(level, roll) {
                        debug!(kind = kind.id(), ?power_up, "power-up dropped");
                        self.scratch.push(Command::SpawnPowerUp {
                            position,
                            kind: power_up,
                        });
                    }
                }
                Event::BossDefeated { .. } => {
                    self.scratch.push(Command::RaiseCue {
                        cue: Cue::CameraShake {
                            intensity: tuning.waves.boss_defeat_shake,
                            duration: BOSS_SHAKE_SECS,
                        },
                    });
                    self.scratch.push(Command::RaiseCue {
                        cue: Cue::Sound {
                            sound: SoundCue::BossDefeated,
                        },
                    });
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
}
