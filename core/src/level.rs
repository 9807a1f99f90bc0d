//! Immutable level and wave definitions.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::roster::{EnemyKind, MovementPattern};
use crate::Vec2;

/// One enemy placement within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpawn {
    /// Kind of enemy to spawn.
    pub kind: EnemyKind,
    /// Horizontal spawn position as a fraction of the playfield width.
    pub relative_x: f32,
    /// Movement rule, defaulting to the kind's own pattern.
    #[serde(default)]
    pub pattern: Option<MovementPattern>,
}

impl WaveSpawn {
    /// Creates a spawn that uses the kind's default movement pattern.
    #[must_use]
    pub const fn new(kind: EnemyKind, relative_x: f32) -> Self {
        Self {
            kind,
            relative_x,
            pattern: None,
        }
    }

    /// Overrides the movement pattern.
    #[must_use]
    pub const fn with_pattern(mut self, pattern: MovementPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Movement pattern the spawned enemy will follow.
    #[must_use]
    pub fn resolved_pattern(&self) -> MovementPattern {
        self.pattern.unwrap_or_else(|| self.kind.default_pattern())
    }
}

/// Geometry applied to a wave's spawn positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Formation {
    /// Everyone on the spawn line.
    Line,
    /// Centre leads, wings trail upward.
    V,
    /// Diamond rows around the centre.
    Diamond,
    /// Single file stacked above the spawn line.
    Column,
    /// Shallow arc with the middle raised.
    Arc,
}

impl Formation {
    const SPACING: f32 = 40.0;

    /// Offset for member `index` of a wave of `count` members.
    ///
    /// Offsets only push members upward (negative y) so nobody spawns inside
    /// the playfield. V, diamond and arc also spread members sideways around
    /// the lane, mirrored about the centre member.
    #[must_use]
    pub fn offset(self, index: usize, count: usize) -> Vec2 {
        if count == 0 {
            return Vec2::ZERO;
        }
        let centre = (count as f32 - 1.0) * 0.5;
        let from_centre = index as f32 - centre;
        match self {
            Self::Line => Vec2::ZERO,
            Self::V => Vec2::new(
                from_centre * Self::SPACING * 0.5,
                -from_centre.abs() * Self::SPACING,
            ),
            Self::Diamond => {
                let depth = centre - from_centre.abs();
                let lane = if index % 2 == 0 { 0.5 } else { 1.0 };
                Vec2::new(from_centre * Self::SPACING * 0.4, -depth * lane * Self::SPACING)
            }
            Self::Column => Vec2::new(0.0, -(index as f32) * Self::SPACING),
            Self::Arc => {
                let half = centre.max(1.0);
                let t = from_centre / half;
                Vec2::new(t * Self::SPACING, -(1.0 - t * t) * Self::SPACING)
            }
        }
    }

    /// Looks up a formation by identifier, falling back to [`Formation::Line`].
    #[must_use]
    pub fn from_id_or_fallback(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "line" => Self::Line,
            "v" => Self::V,
            "diamond" => Self::Diamond,
            "column" => Self::Column,
            "arc" => Self::Arc,
            other => {
                warn!(id = other, "unknown formation, using line");
                Self::Line
            }
        }
    }
}

impl From<String> for Formation {
    fn from(id: String) -> Self {
        Self::from_id_or_fallback(&id)
    }
}

/// One wave of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Ordered enemy placements.
    pub spawns: Vec<WaveSpawn>,
    /// Seconds to wait after the previous wave clears.
    #[serde(default = "WaveDefinition::default_delay")]
    pub delay: f32,
    /// Optional formation geometry.
    #[serde(default)]
    pub formation: Option<Formation>,
}

impl WaveDefinition {
    fn default_delay() -> f32 {
        2.0
    }

    /// Creates a wave with the default delay and no formation.
    #[must_use]
    pub fn new(spawns: Vec<WaveSpawn>) -> Self {
        Self {
            spawns,
            delay: Self::default_delay(),
            formation: None,
        }
    }

    /// Sets the pre-spawn delay.
    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the formation.
    #[must_use]
    pub fn with_formation(mut self, formation: Formation) -> Self {
        self.formation = Some(formation);
        self
    }
}

/// Immutable description of one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// One-based level number.
    pub number: u32,
    /// Display name.
    pub name: String,
    /// One-based world the level belongs to. Zero means "derive from the number".
    #[serde(default)]
    pub world: u32,
    /// Display theme tag.
    #[serde(default)]
    pub theme: String,
    /// Ordered waves.
    pub waves: Vec<WaveDefinition>,
    /// Boss that ends the level, if any.
    #[serde(default)]
    pub boss: Option<EnemyKind>,
    /// Miniboss fought before the boss, if any.
    #[serde(default)]
    pub miniboss: Option<EnemyKind>,
    /// Multiplier applied to regular enemy speed.
    #[serde(default = "LevelDefinition::default_speed")]
    pub speed_multiplier: f32,
    /// Whether the level came from the procedural generator.
    #[serde(default)]
    pub procedural: bool,
}

impl LevelDefinition {
    fn default_speed() -> f32 {
        1.0
    }

    /// Number of regular enemies across every wave.
    #[must_use]
    pub fn total_enemies(&self) -> usize {
        self.waves.iter().map(|wave| wave.spawns.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_formation_has_no_offsets() {
        for index in 0..5 {
            assert_eq!(Formation::Line.offset(index, 5), Vec2::ZERO);
        }
    }

    #[test]
    fn formations_never_push_members_downward() {
        let formations = [
            Formation::Line,
            Formation::V,
            Formation::Diamond,
            Formation::Column,
            Formation::Arc,
        ];
        for formation in formations {
            for count in 1..8 {
                for index in 0..count {
                    let offset = formation.offset(index, count);
                    assert!(offset.y <= 0.0, "{formation:?} {index}/{count}");
                }
            }
        }
    }

    #[test]
    fn shaped_formations_spread_members_symmetrically() {
        for formation in [Formation::V, Formation::Diamond, Formation::Arc] {
            let left = formation.offset(0, 5);
            let right = formation.offset(4, 5);
            assert!(left.x < 0.0, "{formation:?}");
            assert_eq!(left.x, -right.x);
            assert_eq!(formation.offset(2, 5).x, 0.0);
        }
        for formation in [Formation::Line, Formation::Column] {
            for index in 0..5 {
                assert_eq!(formation.offset(index, 5).x, 0.0);
            }
        }
        assert_ne!(Formation::V.offset(0, 5), Formation::Diamond.offset(0, 5));
    }

    #[test]
    fn v_formation_leads_with_the_centre() {
        let centre = Formation::V.offset(2, 5);
        let wing = Formation::V.offset(0, 5);
        assert_eq!(centre, Vec2::ZERO);
        assert!(wing.y < centre.y);
    }

    #[test]
    fn total_enemies_counts_every_wave() {
        let level = LevelDefinition {
            number: 1,
            name: String::from("test"),
            world: 1,
            theme: String::new(),
            waves: vec![
                WaveDefinition::new(vec![WaveSpawn::new(EnemyKind::Scout, 0.5); 3]),
                WaveDefinition::new(vec![WaveSpawn::new(EnemyKind::Fighter, 0.2); 2]),
            ],
            boss: None,
            miniboss: None,
            speed_multiplier: 1.0,
            procedural: false,
        };
        assert_eq!(level.total_enemies(), 5);
    }
}
