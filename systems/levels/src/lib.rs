#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level and world progression for Nova Siege.
//!
//! [`LevelCatalog`] answers "what does level N look like" for every level in
//! the supported range: TOML pack overrides first, then the hand-authored
//! campaign, then the deterministic procedural generator. [`LevelManager`]
//! tracks the level being played, collects its statistics from world events
//! and raises the world transition when play crosses a world boundary.

mod authored;
mod catalog;
mod manager;
mod procedural;

pub use catalog::{CatalogError, LevelCatalog};
pub use manager::{LevelManager, LevelReport, LevelStats};
pub use procedural::{generate, speed_for, tier_of, tier_pool};

/// Highest level the catalog serves. Requests past it are clamped.
pub const MAX_LEVEL: u32 = 30;

/// Number of consecutive levels that make up one world.
pub const LEVELS_PER_WORLD: u32 = 5;

/// One-based world containing `level`.
#[must_use]
pub const fn world_of(level: u32) -> u32 {
    level.saturating_sub(1) / LEVELS_PER_WORLD + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worlds_span_five_levels() {
        assert_eq!(world_of(1), 1);
        assert_eq!(world_of(5), 1);
        assert_eq!(world_of(6), 2);
        assert_eq!(world_of(MAX_LEVEL), 6);
        assert_eq!(world_of(0), 1);
    }
}
