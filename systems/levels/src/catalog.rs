use std::collections::BTreeMap;

use nova_siege_core::LevelDefinition;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::authored::authored;
use crate::{procedural, world_of, MAX_LEVEL};

/// Errors raised while loading a level pack.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document was not valid TOML or did not match the pack layout.
    #[error("failed to parse level pack: {0}")]
    Parse(#[from] toml::de::Error),
    /// A level parsed but cannot be played.
    #[error("invalid level {number}: {reason}")]
    InvalidLevel {
        /// Number of the offending level.
        number: u32,
        /// Human readable explanation.
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct LevelPack {
    #[serde(default)]
    levels: Vec<LevelDefinition>,
}

/// Source of level definitions for every level in `1..=MAX_LEVEL`.
#[derive(Clone, Debug)]
pub struct LevelCatalog {
    seed: u64,
    overrides: BTreeMap<u32, LevelDefinition>,
}

impl LevelCatalog {
    /// Creates a catalog serving authored and procedural levels generated from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            overrides: BTreeMap::new(),
        }
    }

    /// Layers a TOML level pack over the catalog.
    ///
    /// The pack is a `[[levels]]` array of level definitions; each entry
    /// replaces whatever the catalog would otherwise serve for its number.
    pub fn with_pack(mut self, source: &str) -> Result<Self, CatalogError> {
        let pack: LevelPack = toml::from_str(source)?;
        for mut level in pack.levels {
            validate(&level)?;
            if level.world == 0 {
                level.world = world_of(level.number);
            }
            debug!(level = level.number, name = %level.name, "level override loaded");
            if self.overrides.insert(level.number, level).is_some() {
                warn!("level pack redefines a level, keeping the last entry");
            }
        }
        info!(overrides = self.overrides.len(), "level pack applied");
        Ok(self)
    }

    /// Seed feeding the procedural generator.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Highest level served.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        MAX_LEVEL
    }

    /// Definition of `number`, clamped to the supported range.
    #[must_use]
    pub fn level(&self, number: u32) -> LevelDefinition {
        let clamped = number.clamp(1, MAX_LEVEL);
        if clamped != number {
            warn!(requested = number, served = clamped, "level out of range, clamping");
        }
        let mut level = self
            .overrides
            .get(&clamped)
            .cloned()
            .or_else(|| authored(clamped))
            .unwrap_or_else(|| procedural::generate(self.seed, clamped));
        if level.world == 0 {
            level.world = world_of(clamped);
        }
        level
    }
}

fn validate(level: &LevelDefinition) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidLevel {
        number: level.number,
        reason: reason.to_owned(),
    };
    if !(1..=MAX_LEVEL).contains(&level.number) {
        return Err(invalid("number lies outside the supported range"));
    }
    if level.waves.is_empty() && level.boss.is_none() && level.miniboss.is_none() {
        return Err(invalid("needs at least one wave or a boss"));
    }
    if level.speed_multiplier <= 0.0 {
        return Err(invalid("speed_multiplier must be positive"));
    }
    if level.boss.is_some_and(|kind| !kind.is_boss()) {
        return Err(invalid("boss must be a boss kind"));
    }
    if level.miniboss.is_some_and(|kind| !kind.is_miniboss()) {
        return Err(invalid("miniboss must be a miniboss kind"));
    }
    for wave in &level.waves {
        if wave.delay < 0.0 {
            return Err(invalid("wave delay must not be negative"));
        }
        for spawn in &wave.spawns {
            if !(0.0..=1.0).contains(&spawn.relative_x) {
                return Err(invalid("relative_x must lie within [0, 1]"));
            }
            if spawn.kind.is_boss_class() {
                return Err(invalid("waves cannot spawn boss-class enemies"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_siege_core::EnemyKind;

    #[test]
    fn lookups_fall_through_overrides_authored_then_procedural() {
        let catalog = LevelCatalog::new(5);
        assert!(!catalog.level(1).procedural);
        assert!(catalog.level(9).procedural);
        assert_eq!(catalog.level(9), procedural::generate(5, 9));
        assert_eq!(catalog.level(1).world, 1);
    }

    #[test]
    fn out_of_range_requests_clamp() {
        let catalog = LevelCatalog::new(5);
        assert_eq!(catalog.level(0).number, 1);
        assert_eq!(catalog.level(MAX_LEVEL + 7).number, MAX_LEVEL);
    }

    #[test]
    fn boss_slots_must_hold_matching_kinds() {
        let pack = r#"
            [[levels]]
            number = 2
            name = "Mixup"
            miniboss = "dreadnought"
            waves = []
        "#;
        let error = LevelCatalog::new(0).with_pack(pack).unwrap_err();
        assert!(matches!(error, CatalogError::InvalidLevel { number: 2, .. }));
    }

    #[test]
    fn boss_only_override_is_accepted() {
        let pack = r#"
            [[levels]]
            number = 4
            name = "Duel"
            boss = "hydra"
            waves = []
        "#;
        let catalog = LevelCatalog::new(0).with_pack(pack).expect("valid pack");
        let level = catalog.level(4);
        assert_eq!(level.boss, Some(EnemyKind::Hydra));
        assert_eq!(level.world, 1);
    }
}
