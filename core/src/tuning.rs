//! Balance parameters for every gameplay system, loadable from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PowerUpKind;

/// Errors raised while loading a tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document was not valid TOML or did not match the tuning layout.
    #[error("failed to parse tuning document: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but lies outside its accepted range.
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

/// Aggregated balance knobs. Missing TOML sections and fields take defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Frame clamp.
    pub frame: FrameTuning,
    /// Wave and phase delays.
    pub waves: WaveTuning,
    /// Movement pattern constants.
    pub movement: MovementTuning,
    /// Boss intro timings and per-boss mechanics.
    pub boss: BossTuning,
    /// Player, projectile and power-up parameters.
    pub combat: CombatTuning,
    /// Fire probability curves.
    pub fire: FireTuning,
    /// Power-up drop table.
    pub drops: DropTuning,
    /// Phantom, Sentinel and Swarm mechanics.
    pub specials: SpecialTuning,
}

impl Tuning {
    /// Parses and validates a TOML tuning document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.max_dt <= 0.0 {
            return Err(invalid("frame.max_dt", "must be positive"));
        }
        for (field, value) in [
            ("fire.regular_cap", self.fire.regular_cap),
            ("fire.elite_cap", self.fire.elite_cap),
            ("specials.phantom_visibility_threshold", self.specials.phantom_visibility_threshold),
            ("boss.hydra_enrage_fraction", self.boss.hydra_enrage_fraction),
            ("boss.hydra_regen_cap", self.boss.hydra_regen_cap),
            ("boss.void_teleport_damage_factor", self.boss.void_teleport_damage_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must lie within [0, 1]"));
            }
        }
        if self.drops.weights(u32::MAX).iter().all(|(_, weight)| *weight == 0) {
            return Err(invalid("drops", "at least one drop weight must be non-zero"));
        }
        if self.combat.max_lives == 0 || self.combat.starting_lives > self.combat.max_lives {
            return Err(invalid(
                "combat.starting_lives",
                "must be at most combat.max_lives, which must be non-zero",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

/// Frame stepping parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTuning {
    /// Longest delta time in seconds a single step simulates; longer frames are clamped.
    pub max_dt: f32,
}

impl Default for FrameTuning {
    fn default() -> Self {
        Self { max_dt: 0.05 }
    }
}

/// Delays governing the wave phase machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Delay before the first wave and after the declared waves run out.
    pub fallback_delay: f32,
    /// Delay between the last wave clearing and the miniboss spawn.
    pub miniboss_delay: f32,
    /// Delay between the field emptying and the boss spawn.
    pub boss_delay: f32,
    /// Delay between the miniboss dying and the boss spawn.
    pub handoff_delay: f32,
    /// Seconds between a level completing and the next one starting.
    pub intermission: f32,
    /// Camera shake intensity when a boss-class enemy dies.
    pub boss_defeat_shake: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            fallback_delay: 2.0,
            miniboss_delay: 2.0,
            boss_delay: 3.0,
            handoff_delay: 3.0,
            intermission: 3.0,
            boss_defeat_shake: 12.0,
        }
    }
}

/// Movement pattern constants shared by regular enemies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Sine pattern angular frequency.
    pub sine_frequency: f32,
    /// Sine pattern lateral amplitude in world units.
    pub sine_amplitude: f32,
    /// Zigzag direction flips per second.
    pub zigzag_frequency: f32,
    /// Zigzag lateral speed as a fraction of forward speed.
    pub zigzag_lateral: f32,
    /// Seconds a diver hovers before committing.
    pub dive_hold: f32,
    /// Speed multiplier applied once a dive commits.
    pub dive_boost: f32,
    /// Fraction of the playfield height where sentinels stop descending.
    pub sentinel_hover_line: f32,
    /// Angular frequency of the generic boss sweep.
    pub boss_sweep_frequency: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            sine_frequency: 2.0,
            sine_amplitude: 60.0,
            zigzag_frequency: 1.5,
            zigzag_lateral: 0.9,
            dive_hold: 0.8,
            dive_boost: 2.2,
            sentinel_hover_line: 0.3,
            boss_sweep_frequency: 0.6,
        }
    }
}

/// Boss intro timings and boss-specific mechanics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Seconds the warning phase lasts.
    pub warning_secs: f32,
    /// Seconds the fly-in transition lasts.
    pub transition_secs: f32,
    /// Battle line as a fraction of the playfield height.
    pub battle_line: f32,
    /// Damage multiplier a weakpoint forwards to the core.
    pub weakpoint_multiplier: f32,
    /// Camera shake intensity while a boss enters.
    pub intro_shake: f32,
    /// Seconds between Hydra regeneration pulses.
    pub hydra_regen_interval: f32,
    /// Fraction of max health restored per pulse.
    pub hydra_regen_fraction: f32,
    /// Regeneration never lifts health above this fraction of max.
    pub hydra_regen_cap: f32,
    /// Hydra enrages below this fraction of max health.
    pub hydra_enrage_fraction: f32,
    /// Emitter cooldown once enraged.
    pub hydra_enraged_cooldown: f32,
    /// Seconds the Fortress spends shielded.
    pub fortress_shield_secs: f32,
    /// Seconds the Fortress spends vulnerable.
    pub fortress_vulnerable_secs: f32,
    /// Fortress turret rotation in radians per second.
    pub fortress_turret_speed: f32,
    /// Seconds between Fortress radial volleys.
    pub fortress_volley_cooldown: f32,
    /// Seconds between Void teleports.
    pub void_teleport_interval: f32,
    /// Seconds each fade lasts.
    pub void_fade_secs: f32,
    /// Damage multiplier while the Void is fading.
    pub void_teleport_damage_factor: f32,
    /// Gravity well strength; pull is strength divided by distance.
    pub void_well_strength: f32,
    /// Gravity wells ignore the player beyond this range.
    pub void_well_range: f32,
    /// Seconds a gravity well lasts.
    pub void_well_duration: f32,
    /// Largest pull a single well applies per second.
    pub void_well_max_pull: f32,
    /// Seconds between Void homing missile salvos.
    pub void_missile_cooldown: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            warning_secs: 2.0,
            transition_secs: 2.5,
            battle_line: 0.22,
            weakpoint_multiplier: 2.0,
            intro_shake: 6.0,
            hydra_regen_interval: 3.0,
            hydra_regen_fraction: 0.02,
            hydra_regen_cap: 0.6,
            hydra_enrage_fraction: 0.35,
            hydra_enraged_cooldown: 0.6,
            fortress_shield_secs: 4.0,
            fortress_vulnerable_secs: 6.0,
            fortress_turret_speed: 1.2,
            fortress_volley_cooldown: 0.8,
            void_teleport_interval: 5.0,
            void_fade_secs: 0.6,
            void_teleport_damage_factor: 0.25,
            void_well_strength: 9_000.0,
            void_well_range: 220.0,
            void_well_duration: 6.0,
            void_well_max_pull: 160.0,
            void_missile_cooldown: 4.0,
        }
    }
}

/// Player, projectile and power-up parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Seconds of invulnerability after the player is hit.
    pub invulnerability_secs: f32,
    /// Lives removed when a regular enemy rams the player.
    pub contact_damage: u32,
    /// Lives removed by boss-class contact, boss bullets and homing missiles.
    pub boss_contact_damage: u32,
    /// Lives the player starts with.
    pub starting_lives: u32,
    /// Lives the player can hold.
    pub max_lives: u32,
    /// Player box edge length.
    pub player_size: f32,
    /// Collision radius of bullets.
    pub bullet_radius: f32,
    /// Speed of player bullets.
    pub player_bullet_speed: f32,
    /// Base damage of player bullets before perk multipliers.
    pub player_bullet_damage: f32,
    /// Damage carried by regular enemy bullets, rounded up to whole lives when it hits the player.
    pub enemy_bullet_damage: f32,
    /// Homing missile speed.
    pub missile_speed: f32,
    /// Homing missile turn rate in radians per second.
    pub missile_turn_rate: f32,
    /// Seconds before a homing missile burns out.
    pub missile_lifetime: f32,
    /// Power-up fall speed.
    pub power_up_speed: f32,
    /// Power-up collection radius.
    pub power_up_radius: f32,
    /// Shield charges granted per shield pickup.
    pub shield_charges_per_pickup: u32,
    /// Margin outside the playfield before projectiles are culled.
    pub cull_margin: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            invulnerability_secs: 1.5,
            contact_damage: 1,
            boss_contact_damage: 2,
            starting_lives: 3,
            max_lives: 5,
            player_size: 32.0,
            bullet_radius: 4.0,
            player_bullet_speed: 480.0,
            player_bullet_damage: 1.0,
            enemy_bullet_damage: 1.0,
            missile_speed: 180.0,
            missile_turn_rate: 2.5,
            missile_lifetime: 4.0,
            power_up_speed: 60.0,
            power_up_radius: 12.0,
            shield_charges_per_pickup: 1,
            cull_margin: 64.0,
        }
    }
}

/// Level-dependent fire probability curves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireTuning {
    /// Fire probability for regular enemies at level one.
    pub regular_base: f32,
    /// Added per level for regular enemies.
    pub regular_per_level: f32,
    /// Ceiling for regular enemies.
    pub regular_cap: f32,
    /// Fire probability for elites at level one.
    pub elite_base: f32,
    /// Added per level for elites.
    pub elite_per_level: f32,
    /// Ceiling for elites.
    pub elite_cap: f32,
}

impl FireTuning {
    /// Probability that a cooled-down enemy fires at `level`.
    #[must_use]
    pub fn chance(&self, level: u32, elite: bool) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        let (base, per_level, cap) = if elite {
            (self.elite_base, self.elite_per_level, self.elite_cap)
        } else {
            (self.regular_base, self.regular_per_level, self.regular_cap)
        };
        (base + steps * per_level).clamp(0.0, cap)
    }
}

impl Default for FireTuning {
    fn default() -> Self {
        Self {
            regular_base: 0.25,
            regular_per_level: 0.03,
            regular_cap: 0.55,
            elite_base: 0.45,
            elite_per_level: 0.04,
            elite_cap: 0.90,
        }
    }
}

/// Weighted power-up drop table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropTuning {
    /// Weight of weapon upgrades.
    pub weapon: u32,
    /// Weight of shields.
    pub shield: u32,
    /// Weight of speed boosts.
    pub speed: u32,
    /// Weight of rapid fire.
    pub rapid_fire: u32,
    /// Weight of bombs once unlocked.
    pub bomb: u32,
    /// Weight of extra lives once unlocked.
    pub life: u32,
    /// First level on which bombs drop.
    pub bomb_unlock_level: u32,
    /// First level on which extra lives drop.
    pub life_unlock_level: u32,
}

impl DropTuning {
    /// Drop weights in effect at `level`, locked kinds weighted zero.
    #[must_use]
    pub fn weights(&self, level: u32) -> [(PowerUpKind, u32); 6] {
        let unlocked = |weight: u32, unlock: u32| if level >= unlock { weight } else { 0 };
        [
            (PowerUpKind::Weapon, self.weapon),
            (PowerUpKind::Shield, self.shield),
            (PowerUpKind::Speed, self.speed),
            (PowerUpKind::RapidFire, self.rapid_fire),
            (PowerUpKind::Bomb, unlocked(self.bomb, self.bomb_unlock_level)),
            (PowerUpKind::Life, unlocked(self.life, self.life_unlock_level)),
        ]
    }

    /// Picks a kind given a roll in `[0, total weight)`. Returns `None` when
    /// every weight is zero.
    #[must_use]
    pub fn pick(&self, level: u32, roll: u32) -> Option<PowerUpKind> {
        let weights = self.weights(level);
        let total: u32 = weights.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return None;
        }
        let mut remaining = roll % total;
        for (kind, weight) in weights {
            if remaining < weight {
                return Some(kind);
            }
            remaining -= weight;
        }
        None
    }

    /// Sum of the weights in effect at `level`.
    #[must_use]
    pub fn total_weight(&self, level: u32) -> u32 {
        self.weights(level).iter().map(|(_, weight)| weight).sum()
    }
}

impl Default for DropTuning {
    fn default() -> Self {
        Self {
            weapon: 30,
            shield: 20,
            speed: 20,
            rapid_fire: 15,
            bomb: 10,
            life: 5,
            bomb_unlock_level: 3,
            life_unlock_level: 5,
        }
    }
}

/// Constants for the regular special mechanics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTuning {
    /// Phantom cloak cycle speed in radians per second.
    pub phantom_cloak_speed: f32,
    /// Phantoms reject damage while opacity is below this value.
    pub phantom_visibility_threshold: f32,
    /// Hits a Sentinel shield absorbs before depleting.
    pub sentinel_shield_hits: u32,
    /// Swarm jitter speed in world units per second.
    pub swarm_jitter_speed: f32,
    /// Largest lateral offset a swarm member drifts from its lane.
    pub swarm_jitter_range: f32,
    /// Seconds between swarm jitter direction flips.
    pub swarm_flip_interval: f32,
}

impl Default for SpecialTuning {
    fn default() -> Self {
        Self {
            phantom_cloak_speed: 1.2,
            phantom_visibility_threshold: 0.3,
            sentinel_shield_hits: 3,
            swarm_jitter_speed: 40.0,
            swarm_jitter_range: 12.0,
            swarm_flip_interval: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let tuning = Tuning::from_toml_str("").expect("empty document parses");
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn partial_document_overrides_named_fields_only() {
        let tuning = Tuning::from_toml_str(
            r#"
            [fire]
            regular_cap = 0.4

            [drops]
            life_unlock_level = 2
            "#,
        )
        .expect("partial document parses");
        assert_eq!(tuning.fire.regular_cap, 0.4);
        assert_eq!(tuning.fire.elite_cap, 0.90);
        assert_eq!(tuning.drops.life_unlock_level, 2);
        assert_eq!(tuning.drops.weapon, 30);
    }

    #[test]
    fn out_of_range_caps_are_rejected() {
        let error = Tuning::from_toml_str("[fire]\nelite_cap = 1.5\n").unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "fire.elite_cap",
                ..
            }
        ));
    }

    #[test]
    fn malformed_documents_surface_parse_errors() {
        let error = Tuning::from_toml_str("[frame\nmax_dt = ").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn fire_chance_is_monotonic_and_capped() {
        let fire = FireTuning::default();
        let mut previous = 0.0;
        for level in 1..=30 {
            let regular = fire.chance(level, false);
            let elite = fire.chance(level, true);
            assert!(regular >= previous);
            assert!(regular <= 0.55);
            assert!(elite <= 0.90);
            assert!(elite >= regular);
            previous = regular;
        }
        assert_eq!(fire.chance(30, false), 0.55);
        assert_eq!(fire.chance(30, true), 0.90);
    }

    #[test]
    fn bombs_and_lives_unlock_by_level() {
        let drops = DropTuning::default();
        let early = drops.weights(1);
        assert_eq!(early[4], (PowerUpKind::Bomb, 0));
        assert_eq!(early[5], (PowerUpKind::Life, 0));
        assert_eq!(drops.total_weight(1), 85);
        assert_eq!(drops.total_weight(3), 95);
        assert_eq!(drops.total_weight(5), 100);
    }

    #[test]
    fn pick_walks_the_cumulative_table() {
        let drops = DropTuning::default();
        assert_eq!(drops.pick(5, 0), Some(PowerUpKind::Weapon));
        assert_eq!(drops.pick(5, 29), Some(PowerUpKind::Weapon));
        assert_eq!(drops.pick(5, 30), Some(PowerUpKind::Shield));
        assert_eq!(drops.pick(5, 99), Some(PowerUpKind::Life));
        assert_ne!(drops.pick(1, 84), Some(PowerUpKind::Life));
    }
}
