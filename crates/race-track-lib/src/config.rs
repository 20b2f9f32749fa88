//! Generation rules and generator options
//!
//! [`GenerationConfig`] holds the track rules for one `generate` call and is passed
//! by reference to every composer and segment generator. [`GeneratorOptions`] holds
//! the knobs of the retry loop itself, which are not part of a preset.

use crate::{GenerationError, Result, presets};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of values in a preset parameter tuple
pub const PARAMETER_COUNT: usize = 10;

/// Positional parameter tuple, as stored in presets
pub type ParameterValues = [f64; PARAMETER_COUNT];

/// Default upper bound on generation attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 500;

/// Default recursion ceiling of the goal-seeking search
pub const DEFAULT_MAX_DEPTH: u32 = 20;

/// Which composer assembles the raw path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrackMode {
    /// Turns, straights and hairpins stitched together by goal seeking
    #[default]
    CircleAndLine,
    /// Closed loop of cubic Bezier segments through fixed waypoints
    Bezier,
}

impl TrackMode {
    /// Decode a numeric mode code; unknown codes fall back to the default mode
    pub fn from_code(code: f64) -> Self {
        match code.round() as i64 {
            1 => TrackMode::Bezier,
            _ => TrackMode::CircleAndLine,
        }
    }

    /// Numeric code used in parameter tuples
    pub fn code(self) -> f64 {
        match self {
            TrackMode::CircleAndLine => 0.0,
            TrackMode::Bezier => 1.0,
        }
    }

    /// Human readable name of the mode
    pub fn name(self) -> &'static str {
        match self {
            TrackMode::CircleAndLine => "Circle&Line",
            TrackMode::Bezier => "Bezier",
        }
    }
}

impl fmt::Display for TrackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrackMode {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Circle&Line" => Ok(TrackMode::CircleAndLine),
            "Bezier" => Ok(TrackMode::Bezier),
            other => Err(GenerationError::InvalidConfig(format!(
                "unknown track mode: {other}"
            ))),
        }
    }
}

/// Geometric rules a generated track has to follow
///
/// All lengths are in track units (meters for the contest presets).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationConfig {
    /// Shortest straight, also the length of the straight leaving the start point
    pub min_straight: f64,
    /// Longest straight
    pub max_straight: f64,
    /// Smallest constant turn radius
    pub min_turn_radius: f64,
    /// Largest constant turn radius
    pub max_turn_radius: f64,
    /// Smallest hairpin radius
    pub min_hairpin_radius: f64,
    /// Largest hairpin radius
    pub max_hairpin_radius: f64,
    /// Fewest switchback pairs in a hairpin (derived: 1 if hairpins are enabled)
    pub min_hairpin_pairs: u32,
    /// Most switchback pairs in a hairpin, 0 disables hairpins
    pub max_hairpin_pairs: u32,
    /// Longest allowed total track length
    pub max_track_length: f64,
    /// Accept tracks that break the straight or total length rules
    pub lax_generation: bool,
    /// Composer used to build the path
    pub mode: TrackMode,
}

/// Same rules as the default "Small Straights" preset
impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_straight: 5.0,
            max_straight: 40.0,
            min_turn_radius: 10.0,
            max_turn_radius: 25.0,
            min_hairpin_radius: 4.5,
            max_hairpin_radius: 10.0,
            min_hairpin_pairs: 1,
            max_hairpin_pairs: 3,
            max_track_length: 700.0,
            lax_generation: true,
            mode: TrackMode::CircleAndLine,
        }
    }
}

impl GenerationConfig {
    /// Decode a positional parameter tuple
    ///
    /// Layout: min straight, max straight, min turn radius, max turn radius,
    /// min hairpin radius, max hairpin radius, max hairpin pairs, max track length,
    /// lax generation (1 = on), mode code.
    pub fn from_values(values: &ParameterValues) -> Result<Self> {
        let max_hairpin_pairs = if values[6].is_finite() && values[6] > 0.0 {
            values[6].round() as u32
        } else {
            0
        };
        let config = Self {
            min_straight: values[0],
            max_straight: values[1],
            min_turn_radius: values[2],
            max_turn_radius: values[3],
            min_hairpin_radius: values[4],
            max_hairpin_radius: values[5],
            min_hairpin_pairs: if max_hairpin_pairs > 0 { 1 } else { 0 },
            max_hairpin_pairs,
            max_track_length: values[7],
            lax_generation: values[8] == 1.0,
            mode: TrackMode::from_code(values[9]),
        };
        config.validate()?;
        Ok(config)
    }

    /// Decode a preset by name, falling back like [`presets::get_preset`]
    pub fn from_preset(name: &str) -> Result<Self> {
        Self::from_values(&presets::get_preset(name))
    }

    /// Encode back into the positional tuple layout
    pub fn to_values(&self) -> ParameterValues {
        [
            self.min_straight,
            self.max_straight,
            self.min_turn_radius,
            self.max_turn_radius,
            self.min_hairpin_radius,
            self.max_hairpin_radius,
            self.max_hairpin_pairs as f64,
            self.max_track_length,
            if self.lax_generation { 1.0 } else { 0.0 },
            self.mode.code(),
        ]
    }

    /// Check that every length is positive and every range is ordered
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("straight", self.min_straight, self.max_straight),
            ("turn radius", self.min_turn_radius, self.max_turn_radius),
            (
                "hairpin radius",
                self.min_hairpin_radius,
                self.max_hairpin_radius,
            ),
        ];
        for (name, min, max) in ranges {
            if !(min.is_finite() && max.is_finite()) || min <= 0.0 {
                return Err(GenerationError::InvalidConfig(format!(
                    "{name} bounds must be finite and positive, got [{min}, {max}]"
                )));
            }
            if min > max {
                return Err(GenerationError::InvalidConfig(format!(
                    "{name} minimum {min} exceeds maximum {max}"
                )));
            }
        }
        if !self.max_track_length.is_finite() || self.max_track_length <= 0.0 {
            return Err(GenerationError::InvalidConfig(format!(
                "max track length must be finite and positive, got {}",
                self.max_track_length
            )));
        }
        if self.min_hairpin_pairs > self.max_hairpin_pairs {
            return Err(GenerationError::InvalidConfig(format!(
                "hairpin pairs minimum {} exceeds maximum {}",
                self.min_hairpin_pairs, self.max_hairpin_pairs
            )));
        }
        Ok(())
    }

    /// Whether the composer may place hairpins at all
    #[inline]
    pub fn hairpins_enabled(&self) -> bool {
        self.max_hairpin_pairs > 0
    }
}

/// Options of the retry loop, independent of the track rules
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorOptions {
    /// Reject self-overlapping candidates (and abort early while composing)
    pub check_intersections: bool,
    /// Attempts before [`GenerationError::AttemptsExhausted`] is returned
    pub max_attempts: u32,
    /// Recursion ceiling of the goal-seeking search
    pub max_depth: u32,
    /// Seed for reproducible generation; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            check_intersections: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
        }
    }
}
