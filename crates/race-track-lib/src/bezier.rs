//! Cubic Bezier composer
//!
//! Builds a closed loop of four cubic curves through the origin and the shared goal
//! points. Each curve leaves along the tangent the previous one arrived with, so the
//! loop is smooth everywhere, including the closing join at the origin.

use crate::composer::{CandidatePath, Composer, goal_points};
use crate::utils::{direction, polyline_length};
use crate::{GenerationConfig, Result};
use geo::Point;
use rand::Rng;
use std::f64::consts::TAU;

/// Samples taken along each curve (the curve yields one more point than this)
pub const BEZIER_STEPS: usize = 100;

/// Range of the distance between an end point and its neighbouring control point
pub const CONTROL_DISTANCE_RANGE: (f64, f64) = (10.0, 100.0);

/// Bezier curve of arbitrary degree
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve {
    control_points: Vec<Point<f64>>,
}

impl BezierCurve {
    /// Create a curve from its control points, first and last being the end points
    pub fn new(control_points: Vec<Point<f64>>) -> Self {
        Self { control_points }
    }

    /// Control points of the curve
    #[inline]
    pub fn control_points(&self) -> &[Point<f64>] {
        &self.control_points
    }

    /// Point at parameter `t` in `[0, 1]`, in Bernstein form
    pub fn eval(&self, t: f64) -> Point<f64> {
        let Some(degree) = self.control_points.len().checked_sub(1) else {
            return Point::new(0.0, 0.0);
        };
        self.control_points
            .iter()
            .enumerate()
            .fold(Point::new(0.0, 0.0), |acc, (i, &p)| {
                let weight = binomial(degree, i)
                    * (1.0 - t).powi((degree - i) as i32)
                    * t.powi(i as i32);
                acc + p * weight
            })
    }

    /// Evaluate at `steps + 1` evenly spaced parameters, both ends included
    pub fn sample(&self, steps: usize) -> Vec<Point<f64>> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.eval(i as f64 / steps as f64))
            .collect()
    }
}

/// Binomial coefficient `n choose k`
fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// A cubic curve together with the tangent angles it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct BezierSegment {
    pub curve: BezierCurve,
    /// Heading at the first end point
    pub in_tangent: f64,
    /// Heading at the second end point
    pub out_tangent: f64,
}

/// Cubic curve from `p0` to `p3`
///
/// The inner control points sit along the given tangents at random distances within
/// [`CONTROL_DISTANCE_RANGE`]; missing tangents are drawn uniformly.
pub fn bezier_quartic<R: Rng + ?Sized>(
    rng: &mut R,
    p0: Point<f64>,
    p3: Point<f64>,
    in_tangent: Option<f64>,
    out_tangent: Option<f64>,
) -> BezierSegment {
    let in_tangent = in_tangent.unwrap_or_else(|| rng.gen_range(0.0..TAU));
    let out_tangent = out_tangent.unwrap_or_else(|| rng.gen_range(0.0..TAU));
    let (low, high) = CONTROL_DISTANCE_RANGE;
    let p1 = p0 + direction(in_tangent) * rng.gen_range(low..=high);
    let p2 = p3 - direction(out_tangent) * rng.gen_range(low..=high);

    BezierSegment {
        curve: BezierCurve::new(vec![p0, p1, p2, p3]),
        in_tangent,
        out_tangent,
    }
}

/// Composer producing a smooth closed loop of cubic curves
///
/// No radius or straight rules apply in this mode; the overlap check of the
/// generator is the only acceptance test.
#[derive(Debug, Clone, Copy, Default)]
pub struct BezierComposer;

impl Composer for BezierComposer {
    fn compose<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        origin: Point<f64>,
        rng: &mut R,
    ) -> Result<CandidatePath> {
        #[cfg(feature = "profiling")]
        profiling::scope!("bezier::compose");
        let goals = goal_points(origin, config.max_track_length);
        let mut path = CandidatePath::new();

        let first = bezier_quartic(rng, origin, goals[0], None, None);
        let closing_tangent = first.in_tangent;
        let mut previous = first;
        let mut segments = Vec::with_capacity(goals.len() + 1);

        for pair in goals.windows(2) {
            let next = bezier_quartic(rng, pair[0], pair[1], Some(previous.out_tangent), None);
            segments.push(std::mem::replace(&mut previous, next));
        }
        let closing = bezier_quartic(
            rng,
            goals[goals.len() - 1],
            origin,
            Some(previous.out_tangent),
            Some(closing_tangent),
        );
        segments.push(previous);
        segments.push(closing);

        for segment in segments {
            let points = segment.curve.sample(BEZIER_STEPS);
            let length = polyline_length(&points);
            path.extend_points(points, length);
        }
        Ok(path)
    }
}
