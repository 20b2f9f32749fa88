//! Geometry primitives shared by every segment generator and composer

use geo::Point;
use std::f64::consts::{PI, TAU};

/// Lengths below this are treated as zero when normalizing or comparing points
pub const EPSILON: f64 = 1e-9;

/// Sampling density of straights, in points per unit of length
pub const STRAIGHT_SAMPLES_PER_UNIT: f64 = 10.0;

/// Sampling density of arcs, in steps per full revolution
pub const ARC_SAMPLES_PER_REVOLUTION: f64 = 100.0;

/// Length of a vector
#[inline(always)]
pub fn magnitude(v: Point<f64>) -> f64 {
    v.x().hypot(v.y())
}

/// Unit vector with the same direction as `v`, or the zero vector if `v` has no length
#[inline(always)]
pub fn normalize(v: Point<f64>) -> Point<f64> {
    let len = magnitude(v);
    if len > EPSILON {
        v / len
    } else {
        Point::new(0.0, 0.0)
    }
}

/// Euclidean distance between two points
#[inline(always)]
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    magnitude(b - a)
}

/// Cap an angle into `[0, 2π)`
#[inline(always)]
pub fn cap_angle(angle: f64) -> f64 {
    let capped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if capped >= TAU { 0.0 } else { capped }
}

/// Cap an angle into `[-π, π)`
#[inline(always)]
pub fn cap_angle_odd(angle: f64) -> f64 {
    cap_angle(angle + PI) - PI
}

/// Unit vector pointing along `angle`
#[inline(always)]
pub fn direction(angle: f64) -> Point<f64> {
    Point::new(angle.cos(), angle.sin())
}

/// Unit normal on the left-hand side of a heading
#[inline(always)]
pub fn left_normal(angle: f64) -> Point<f64> {
    Point::new(-angle.sin(), angle.cos())
}

/// Angle of a vector, measured counter-clockwise from the x axis
#[inline(always)]
pub fn angle_of(v: Point<f64>) -> f64 {
    v.y().atan2(v.x())
}

/// z component of the 3D cross product; positive when `b` lies to the left of `a`
#[inline(always)]
pub fn cross(a: Point<f64>, b: Point<f64>) -> f64 {
    a.x() * b.y() - a.y() * b.x()
}

/// Heading at the end of a polyline
///
/// Uses the last two distinct points, so trailing duplicates left over from
/// fragment joins do not collapse the heading to zero.
/// Returns `None` if the polyline has fewer than two distinct points.
pub fn tangent_angle(points: &[Point<f64>]) -> Option<f64> {
    let (&last, rest) = points.split_last()?;
    rest.iter()
        .rev()
        .find(|p| magnitude(last - **p) > EPSILON)
        .map(|&prev| angle_of(last - prev))
}

/// Sum of the distances between consecutive points
pub fn polyline_length(points: &[Point<f64>]) -> f64 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_angle_range() {
        assert!((cap_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-12);
        assert!((cap_angle(5.0 * PI) - PI).abs() < 1e-12);
        assert_eq!(cap_angle(0.0), 0.0);
        for i in -50..50 {
            let a = cap_angle(i as f64 * 0.7);
            assert!((0.0..TAU).contains(&a));
        }
    }

    #[test]
    fn test_cap_angle_odd_range() {
        assert!((cap_angle_odd(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((cap_angle_odd(PI / 4.0) - PI / 4.0).abs() < 1e-12);
        for i in -50..50 {
            let a = cap_angle_odd(i as f64 * 0.7);
            assert!((-PI..PI).contains(&a));
        }
    }

    #[test]
    fn test_normalize() {
        let n = normalize(Point::new(3.0, 4.0));
        assert!((magnitude(n) - 1.0).abs() < 1e-12);
        assert!((n.x() - 0.6).abs() < 1e-12);
        assert_eq!(normalize(Point::new(0.0, 0.0)), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_tangent_angle_uses_last_distinct_points() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
        ];
        let angle = tangent_angle(&points).unwrap();
        assert!((angle - PI / 4.0).abs() < 1e-12);

        assert!(tangent_angle(&[Point::new(2.0, 2.0)]).is_none());
        assert!(tangent_angle(&[]).is_none());
    }

    #[test]
    fn test_left_normal_is_perpendicular() {
        for i in 0..16 {
            let angle = i as f64 * 0.4;
            let n = left_normal(angle);
            assert!(n.dot(direction(angle)).abs() < 1e-12);
            assert!(cross(direction(angle), n) > 0.0);
        }
    }

    #[test]
    fn test_polyline_length() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ];
        assert!((polyline_length(&points) - 11.0).abs() < 1e-12);
    }
}
