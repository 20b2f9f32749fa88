//! Segment generators producing elementary point runs from a start pose
//!
//! Every generator returns a [`PathFragment`]. Fragments start at the pose they were
//! given, so concatenating them repeats each join point once; the validator drops
//! those duplicates during compaction.

use crate::GenerationConfig;
use crate::utils::{
    self, ARC_SAMPLES_PER_REVOLUTION, EPSILON, STRAIGHT_SAMPLES_PER_UNIT, angle_of, cap_angle,
    direction, left_normal,
};
use geo::Point;
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Largest lateral distance allowed between a switchback's tangent intersection and
/// its arc center before the hairpin lobes start to touch
pub const HAIRPIN_MAX_INTERSECTION: f64 = 50.0;

/// Default wobbliness range of hairpin switchbacks
pub const HAIRPIN_WOBBLINESS_RANGE: (f64, f64) = (0.45, 0.55);

/// Default sweep range of a constant turn with no explicit percentage
pub const RANDOM_TURN_PERCENT_RANGE: (f64, f64) = (0.1, 0.2);

/// Number of times the goal-facing turn shrinks its radius before solving for it directly
const MAX_RADIUS_CAPS: usize = 8;

/// A position plus the heading of travel, in radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub point: Point<f64>,
    pub heading: f64,
}

impl Pose {
    /// Create a new pose
    pub fn new(point: Point<f64>, heading: f64) -> Self {
        Self { point, heading }
    }
}

/// Output of a segment generator
#[derive(Clone, Debug, PartialEq)]
pub struct PathFragment {
    /// Sampled points, starting at the start pose
    pub points: Vec<Point<f64>>,
    /// Last point of the fragment
    pub end_point: Point<f64>,
    /// Length the fragment adds to the track
    pub length_delta: f64,
    /// Outward normal (arc center to exit point) of the last arc, if the fragment ends in one
    pub exit_normal: Option<Point<f64>>,
    /// Heading of travel at `end_point`
    pub exit_heading: f64,
}

impl PathFragment {
    /// Create a fragment from its sampled points
    ///
    /// `points` must not be empty; generators always emit at least the start point.
    pub fn new(points: Vec<Point<f64>>, length_delta: f64, exit_heading: f64) -> Self {
        let end_point = points.last().copied().unwrap_or_else(|| Point::new(0.0, 0.0));
        Self {
            points,
            end_point,
            length_delta,
            exit_normal: None,
            exit_heading,
        }
    }

    /// Attach the exit normal of a trailing arc
    pub fn with_exit_normal(mut self, normal: Point<f64>) -> Self {
        self.exit_normal = Some(normal);
        self
    }

    /// Single-point fragment that leaves the pose unchanged
    pub fn stationary(start: Point<f64>, heading: f64) -> Self {
        Self::new(vec![start], 0.0, heading)
    }

    /// Pose at the end of the fragment
    #[inline]
    pub fn exit_pose(&self) -> Pose {
        Pose::new(self.end_point, self.exit_heading)
    }

    /// Number of sampled points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the fragment contains any points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Point on a circle at the given angle
#[inline(always)]
pub fn arc_point(center: Point<f64>, radius: f64, angle: f64) -> Point<f64> {
    center + direction(angle) * radius
}

/// `turn_against_normal` value that puts the next turn's center on the side `toward` points to
///
/// Feeding a previous arc's outward normal makes the next turn bend the other way;
/// feeding its negation continues the same bend.
#[inline]
pub fn turn_side_toward(toward: Point<f64>, heading: f64) -> bool {
    toward.dot(left_normal(heading)) < 0.0
}

/// Straight line from `start` along `angle`
///
/// Sampled at [`STRAIGHT_SAMPLES_PER_UNIT`] so point density matches the arcs for the
/// overlap test. A zero length yields the start point alone.
pub fn straight(start: Point<f64>, length: f64, angle: f64) -> PathFragment {
    let length = length.max(0.0);
    let steps = (length * STRAIGHT_SAMPLES_PER_UNIT).ceil() as usize;
    if steps == 0 {
        return PathFragment::stationary(start, angle);
    }

    let step = direction(angle) * (length / steps as f64);
    let points = (0..=steps).map(|i| start + step * i as f64).collect();
    PathFragment::new(points, length, angle)
}

/// Circular arc of fixed radius covering `circle_percent` of a full revolution
///
/// The center sits on the left of `intangent`, or on the right when
/// `turn_against_normal` is set, and the arc is walked in the direction that keeps it
/// tangent to the incoming heading. The returned normal points from the center to the
/// exit point, so chained turns can pick their side without ambiguity.
pub fn constant_turn(
    start: Point<f64>,
    radius: f64,
    intangent: f64,
    circle_percent: f64,
    turn_against_normal: bool,
) -> PathFragment {
    let side = if turn_against_normal { -1.0 } else { 1.0 };
    let center = start + left_normal(intangent) * (side * radius);
    let start_angle = angle_of(start - center);
    let sweep = circle_percent * TAU;
    let steps = ((circle_percent.abs() * ARC_SAMPLES_PER_REVOLUTION).ceil() as usize).max(1);

    let points: Vec<Point<f64>> = (0..=steps)
        .map(|k| {
            let t = k as f64 / steps as f64;
            arc_point(center, radius, start_angle + side * sweep * t)
        })
        .collect();

    let exit_normal = points.last().map_or(Point::new(0.0, 0.0), |&exit| exit - center);
    let length = circle_percent * TAU * radius;
    let exit_heading = cap_angle(intangent + side * sweep);
    PathFragment::new(points, length, exit_heading).with_exit_normal(exit_normal)
}

/// Constant turn with a random side and a random sweep of 10-20% of a revolution
pub fn constant_turn_random<R: Rng + ?Sized>(
    start: Point<f64>,
    radius: f64,
    intangent: f64,
    rng: &mut R,
) -> PathFragment {
    let (low, high) = RANDOM_TURN_PERCENT_RANGE;
    let circle_percent = rng.gen_range(low..high);
    let turn_against_normal = rng.gen_bool(0.5);
    constant_turn(start, radius, intangent, circle_percent, turn_against_normal)
}

/// Constant turn that stops once the heading points straight at `goal`
///
/// `normal_hint` picks the side of the turning circle (flipped by
/// `turn_against_normal`). If the goal lies inside that circle no tangent can reach it,
/// so the radius is capped to the distance between goal and center and the circle is
/// rebuilt; when repeated capping does not settle, the radius that puts the goal
/// exactly on the circle is used.
///
/// The departure angle is measured around the circle center and wrapped into one
/// revolution in the direction of travel, which covers every relative placement of
/// start and goal without looping the wrong way round.
pub fn constant_turn_until_facing_point(
    start: Point<f64>,
    radius: f64,
    intangent: f64,
    goal: Point<f64>,
    normal_hint: Point<f64>,
    turn_against_normal: bool,
) -> PathFragment {
    let left = left_normal(intangent);
    let center_on_left = (normal_hint.dot(left) >= 0.0) != turn_against_normal;
    let side = if center_on_left { left } else { -left };

    let (radius, center, goal_distance) = feasible_circle(start, radius, side, goal);
    if radius <= EPSILON || goal_distance <= EPSILON {
        return PathFragment::stationary(start, intangent);
    }

    let start_angle = angle_of(start - center);
    let goal_angle = angle_of(goal - center);
    let tangent_offset = (radius / goal_distance).clamp(-1.0, 1.0).acos();
    let sweep = if center_on_left {
        cap_angle(goal_angle - tangent_offset - start_angle)
    } else {
        cap_angle(start_angle - goal_angle - tangent_offset)
    };
    // Already facing the goal: wrapping must not turn a zero sweep into a full loop
    let sweep = if TAU - sweep < 1e-7 { 0.0 } else { sweep };

    constant_turn(start, radius, intangent, sweep / TAU, !center_on_left)
}

/// Shrink the turning circle until `goal` lies on or outside it
///
/// Returns `(radius, center, distance from center to goal)`.
fn feasible_circle(
    start: Point<f64>,
    radius: f64,
    side: Point<f64>,
    goal: Point<f64>,
) -> (f64, Point<f64>, f64) {
    let mut radius = radius;
    for _ in 0..MAX_RADIUS_CAPS {
        let center = start + side * radius;
        let goal_distance = utils::distance(center, goal);
        if radius <= goal_distance + EPSILON {
            return (radius, center, goal_distance);
        }
        radius = goal_distance;
    }

    // |goal - start - r * side| = r  <=>  r = |goal - start|^2 / (2 (goal - start) . side)
    let offset = goal - start;
    let along = offset.dot(side);
    if along > EPSILON {
        radius = offset.dot(offset) / (2.0 * along);
    }
    let center = start + side * radius;
    (radius, center, utils::distance(center, goal).max(radius))
}

/// Largest wobbliness that keeps two facing switchback lobes apart
///
/// Switchback arcs meet their neighbours' tangents at `radius * tan(π (1 - w))`
/// from the arc center; past [`HAIRPIN_MAX_INTERSECTION`] the wobbliness is pulled back
/// so that distance sits exactly on the limit.
pub fn cap_wobbliness(radius: f64, wobbliness: f64) -> f64 {
    let intersection = radius * (PI * (1.0 - wobbliness)).tan();
    if intersection > HAIRPIN_MAX_INTERSECTION {
        1.0 - HAIRPIN_MAX_INTERSECTION.atan2(radius) / PI
    } else {
        wobbliness
    }
}

/// Even number of switchbacks for a hairpin
///
/// An explicit odd request is rounded up; without a request `2 * k` is drawn with `k`
/// in the configured pair range.
pub fn switchback_count<R: Rng + ?Sized>(
    requested: Option<u32>,
    config: &GenerationConfig,
    rng: &mut R,
) -> u32 {
    match requested {
        Some(count) => count + count % 2,
        None => 2 * rng.gen_range(config.min_hairpin_pairs..=config.max_hairpin_pairs),
    }
}

/// Optional knobs of [`hairpin_turn`]; `None` fields are drawn at random
#[derive(Debug, Clone, PartialEq)]
pub struct HairpinOptions {
    /// Number of switchbacks (rounded up to even)
    pub switchback_count: Option<u32>,
    /// Direction of the first switchback
    pub turn_left: Option<bool>,
    /// Fraction of a revolution swept by each switchback arc
    pub wobbliness: Option<f64>,
    /// Length of the straight after each arc
    pub straight_size: Option<f64>,
    /// Radius of the switchback arcs, defaults to the hairpin radius
    pub circle_size: Option<f64>,
    /// Use one radius for every arc instead of drawing one per arc
    pub uniform_circles: bool,
}

impl Default for HairpinOptions {
    fn default() -> Self {
        Self {
            switchback_count: None,
            turn_left: None,
            wobbliness: None,
            straight_size: None,
            circle_size: None,
            uniform_circles: true,
        }
    }
}

/// Series of alternating (arc, straight) switchbacks
///
/// The switchback count is always even, so the hairpin leaves with the heading it
/// entered with.
pub fn hairpin_turn<R: Rng + ?Sized>(
    start: Point<f64>,
    radius: f64,
    intangent: f64,
    options: &HairpinOptions,
    config: &GenerationConfig,
    rng: &mut R,
) -> PathFragment {
    let count = switchback_count(options.switchback_count, config, rng);
    if count == 0 {
        return PathFragment::stationary(start, intangent);
    }

    let turn_left = options.turn_left.unwrap_or_else(|| rng.gen_bool(0.5));
    let wobbliness = options.wobbliness.unwrap_or_else(|| {
        let (low, high) = HAIRPIN_WOBBLINESS_RANGE;
        rng.gen_range(low..=high)
    });
    let straight_size = options
        .straight_size
        .unwrap_or_else(|| rng.gen_range(config.min_straight..=config.max_straight));
    let circle_size = options.circle_size.unwrap_or(radius);

    let widest_arc = if options.uniform_circles {
        circle_size
    } else {
        config.max_hairpin_radius
    };
    let wobbliness = cap_wobbliness(radius.max(widest_arc), wobbliness);

    let mut points = Vec::new();
    let mut length = 0.0;
    let mut pose = Pose::new(start, intangent);
    let mut turn_against_normal = !turn_left;
    let mut last_normal = None;

    for _ in 0..count {
        let arc_radius = if options.uniform_circles {
            circle_size
        } else {
            rng.gen_range(config.min_hairpin_radius..=config.max_hairpin_radius)
        };

        let arc = constant_turn(
            pose.point,
            arc_radius,
            pose.heading,
            wobbliness,
            turn_against_normal,
        );
        pose = arc.exit_pose();
        length += arc.length_delta;
        last_normal = arc.exit_normal;
        points.extend(arc.points);

        let run = straight(pose.point, straight_size, pose.heading);
        pose = run.exit_pose();
        length += run.length_delta;
        points.extend(run.points);

        // Next lobe bends away from the one just drawn
        turn_against_normal = match last_normal {
            Some(normal) => turn_side_toward(normal, pose.heading),
            None => !turn_against_normal,
        };
    }

    let fragment = PathFragment::new(points, length, pose.heading);
    match last_normal {
        Some(normal) => fragment.with_exit_normal(normal),
        None => fragment,
    }
}
