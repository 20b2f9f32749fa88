//! Race Track Library - Procedural Generation of Closed Race-Track Centerlines
//!
//! This library generates closed 2D paths that look like autocross / trackdrive
//! courses. A path is stitched together from elementary segments (straights, constant
//! radius turns, hairpins or cubic Bezier curves), validated against self-overlap and
//! finally shifted into the positive quadrant with an image-friendly bounding box.
//!
//! # Architecture
//!
//! - **[`GenerationConfig`]**: Track rules decoded from a preset or parameter tuple
//! - **[`segment`]**: Straight, constant turn, goal-facing turn and hairpin generators
//! - **[`Composer`]**: Assembles segments into a candidate path
//!   ([`CircleAndLineComposer`], [`BezierComposer`])
//! - **[`validate`]**: Grid quantization, self-overlap test and normalization
//! - **[`TrackGenerator`]**: Retry loop turning candidates into a [`Track`]
//!
//! # Example
//!
//! ```no_run
//! let track = race_track_lib::generate(&race_track_lib::get_preset("Small Straights"))?;
//! println!("{} points in a {}x{} box", track.points().len(), track.width(), track.height());
//! # Ok::<(), race_track_lib::GenerationError>(())
//! ```

mod bezier;
mod circle_line;
mod composer;
mod config;
mod generator;
pub mod presets;
pub mod segment;
mod track;
pub mod utils;
pub mod validate;

// Public API exports
pub use bezier::{BezierComposer, BezierCurve, BezierSegment, bezier_quartic};
pub use circle_line::CircleAndLineComposer;
pub use composer::{CandidatePath, Composer, GOAL_OFFSETS, goal_points};
pub use config::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DEPTH, GenerationConfig, GeneratorOptions, PARAMETER_COUNT,
    ParameterValues, TrackMode,
};
pub use generator::TrackGenerator;
pub use presets::{Preset, get_default_preset, get_preset, get_preset_names, get_presets};
pub use track::Track;

/// Error types of track generation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Constraint violation: {reason}")]
    ConstraintViolation { reason: String },

    #[error("Candidate path overlaps itself")]
    SelfOverlap,

    #[error("Goal seeking exceeded the recursion limit of {depth}")]
    RecursionLimit { depth: u32 },

    #[error("No valid track after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

impl GenerationError {
    /// Whether the failure only rejects one candidate, so a new attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::ConstraintViolation { .. }
                | GenerationError::SelfOverlap
                | GenerationError::RecursionLimit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Generate one track from a positional parameter tuple with default options
///
/// Equivalent to `TrackGenerator::from_values(values)?.generate()`.
pub fn generate(values: &ParameterValues) -> Result<Track> {
    TrackGenerator::from_values(values)?.generate()
}
