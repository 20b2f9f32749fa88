//! Shared pieces of the path composers
//!
//! A composer turns a [`GenerationConfig`] and a random source into a raw candidate
//! path starting (and ideally ending) at the origin. Composers never normalize; the
//! generator validates and shifts the candidate afterwards.

use crate::segment::PathFragment;
use crate::{GenerationConfig, Result};
use geo::Point;
use rand::Rng;

/// Waypoints visited by every composer, as fractions of the maximum track length
/// relative to the origin
pub const GOAL_OFFSETS: [(f64, f64); 3] = [(0.08, 0.0), (0.12, 0.08), (-0.03, 0.12)];

/// Waypoints of a track of at most `max_track_length` starting at `origin`
pub fn goal_points(origin: Point<f64>, max_track_length: f64) -> [Point<f64>; 3] {
    GOAL_OFFSETS.map(|(x, y)| origin + Point::new(x, y) * max_track_length)
}

/// Raw, unnormalized path produced by a composer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePath {
    /// Points in drawing order
    pub points: Vec<Point<f64>>,
    /// Accumulated length of every appended fragment
    pub length: f64,
}

impl CandidatePath {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment generator's output
    pub fn push(&mut self, fragment: PathFragment) {
        self.points.extend(fragment.points);
        self.length += fragment.length_delta;
    }

    /// Append already sampled points that add `length` to the path
    pub fn extend_points<I>(&mut self, points: I, length: f64)
    where
        I: IntoIterator<Item = Point<f64>>,
    {
        self.points.extend(points);
        self.length += length;
    }

    /// Last point drawn so far
    #[inline]
    pub fn last_point(&self) -> Option<Point<f64>> {
        self.points.last().copied()
    }

    /// Check if nothing was drawn yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Strategy that assembles a candidate path
pub trait Composer {
    /// Build one candidate starting at `origin`
    ///
    /// Errors reject only this candidate, see
    /// [`GenerationError::is_retryable`](crate::GenerationError::is_retryable).
    fn compose<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        origin: Point<f64>,
        rng: &mut R,
    ) -> Result<CandidatePath>;
}
