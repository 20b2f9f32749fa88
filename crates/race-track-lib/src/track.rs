//! Generated track storage
//!
//! A `Track` is the validated, normalized result of one successful generation.

use crate::utils;
use geo::{Coord, Point, Rect};

/// Closed race-track centerline in the positive quadrant
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    /// Centerline points in driving order; the last point lands near the first
    points: Vec<Point<f64>>,
    /// Width of the image-friendly bounding box
    width: u32,
    /// Height of the image-friendly bounding box
    height: u32,
    /// Length accumulated while composing
    length: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Create a track from normalized points and their bounding box size
    pub(crate) fn new(points: Vec<Point<f64>>, width: u32, height: u32, length: f64) -> Self {
        Self {
            points,
            width,
            height,
            length,
        }
    }

    /// Centerline points
    #[inline]
    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    /// Width of the bounding box
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the bounding box
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Length of the segments the track was composed of
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Sum of the distances between consecutive points
    ///
    /// Differs slightly from [`Track::length`] because arcs are measured along their
    /// chords here.
    pub fn path_length(&self) -> f64 {
        utils::polyline_length(&self.points)
    }

    /// Gap left between the last point and the start
    pub fn closure_gap(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(&first), Some(&last)) => utils::distance(first, last),
            _ => 0.0,
        }
    }

    /// Bounding box from the origin to `(width, height)`
    pub fn bounding_box(&self) -> Rect<f64> {
        Rect::new(
            Coord { x: 0.0, y: 0.0 },
            Coord {
                x: self.width as f64,
                y: self.height as f64,
            },
        )
    }

    /// Split into `(points, width, height)`
    pub fn into_parts(self) -> (Vec<Point<f64>>, u32, u32) {
        (self.points, self.width, self.height)
    }
}
