//! Generation settings.

use delve_core::MIN_SIDE;

/// Settings for one dungeon level.
///
/// Values outside their documented ranges are clamped by
/// [`sanitized`](Self::sanitized) before generation starts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GenConfig {
    /// Grid height, at least [`MIN_SIDE`].
    pub rows: i32,
    /// Grid width, at least [`MIN_SIDE`].
    pub cols: i32,
    /// Chance for a cell to start as a wall, in `[0, 1]`.
    pub alive_chance: f64,
    /// A wall with fewer wall neighbours than this becomes floor.
    pub death_limit: u8,
    /// A floor with more wall neighbours than this becomes wall.
    pub birth_limit: u8,
    /// Cellular automata iterations.
    pub simulations: u32,
    /// Required fraction of open tiles, in `[0, 0.5]`.
    pub min_open_fraction: f64,
    /// Keep unreachable caves and link them with teleporters instead of
    /// pruning them.
    pub allow_disconnected: bool,
    /// Remove walls enclosed by walls or void on all four sides.
    pub edge_smoothing: bool,
    /// Full regenerations tried before the open-tile threshold is relaxed.
    pub max_attempts: u32,
    pub liquid: LiquidConfig,
    pub grass: GrassConfig,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            rows: 40,
            cols: 60,
            alive_chance: 0.4,
            death_limit: 3,
            birth_limit: 4,
            simulations: 5,
            min_open_fraction: 0.3,
            allow_disconnected: false,
            edge_smoothing: false,
            max_attempts: 10,
            liquid: LiquidConfig::default(),
            grass: GrassConfig::default(),
        }
    }
}

impl GenConfig {
    /// A copy with every field clamped into its valid range.
    pub fn sanitized(&self) -> Self {
        Self {
            rows: self.rows.max(MIN_SIDE),
            cols: self.cols.max(MIN_SIDE),
            alive_chance: clamp_unit(self.alive_chance, 0.0, 1.0),
            death_limit: self.death_limit.min(8),
            birth_limit: self.birth_limit.min(8),
            simulations: self.simulations,
            min_open_fraction: clamp_unit(self.min_open_fraction, 0.0, 0.5),
            allow_disconnected: self.allow_disconnected,
            edge_smoothing: self.edge_smoothing,
            max_attempts: self.max_attempts.max(1),
            liquid: self.liquid.sanitized(),
            grass: self.grass.sanitized(),
        }
    }
}

/// Settings for carving water out of enclosed void pockets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LiquidConfig {
    pub enabled: bool,
    /// Share of a pool's breakable walls that always break.
    pub ensure_fraction: f64,
    /// Chance for each remaining breakable wall to break.
    pub extra_break_chance: f64,
    /// Chance for each breach to spread one step into the floor. `None`
    /// disables spreading.
    pub expand_chance: Option<f64>,
}

impl Default for LiquidConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ensure_fraction: 0.25,
            extra_break_chance: 0.10,
            expand_chance: Some(0.75),
        }
    }
}

impl LiquidConfig {
    pub fn sanitized(&self) -> Self {
        Self {
            enabled: self.enabled,
            ensure_fraction: clamp_unit(self.ensure_fraction, 0.0, 1.0),
            extra_break_chance: clamp_unit(self.extra_break_chance, 0.0, 1.0),
            expand_chance: self.expand_chance.map(|c| clamp_unit(c, 0.0, 1.0)),
        }
    }
}

/// Settings for decorative grass near water.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrassConfig {
    pub enabled: bool,
    /// Cardinal distance from the shore within which roots may appear.
    pub range: i32,
    /// Chance for each candidate tile to become a root.
    pub root_chance: f64,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            range: 3,
            root_chance: 0.01,
        }
    }
}

impl GrassConfig {
    pub fn sanitized(&self) -> Self {
        Self {
            enabled: self.enabled,
            range: self.range.max(0),
            root_chance: clamp_unit(self.root_chance, 0.0, 1.0),
        }
    }
}

// NaN maps to the lower bound.
fn clamp_unit(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}
