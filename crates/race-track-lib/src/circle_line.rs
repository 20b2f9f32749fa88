//! Circle & line composer
//!
//! Stitches straights, constant turns and hairpins into a loop by steering toward a
//! fixed sequence of waypoints and then closing back onto the start:
//!
//! 1. Short straight leaving the origin at a random angle
//! 2. Goal seeking through the three shared waypoints
//! 3. Return approach to a point slightly behind and beside the origin
//! 4. Two closing turns lining the heading up with the start
//! 5. Final straight running over the origin
//!
//! Goal seeking is a bounded recursion: every step turns toward the goal, drives a
//! straight and, when still too far, inserts some wiggle (two small turns or a
//! hairpin) before trying again.

use crate::composer::{CandidatePath, Composer, goal_points};
use crate::segment::{
    HairpinOptions, PathFragment, Pose, constant_turn, constant_turn_until_facing_point,
    hairpin_turn, straight, turn_side_toward,
};
use crate::utils::{angle_of, cap_angle_odd, cross, direction, left_normal, magnitude, normalize};
use crate::{GenerationConfig, GenerationError, GeneratorOptions, Result, validate};
use geo::Point;
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Slack around each intermediate waypoint within which it counts as reached
pub const WAYPOINT_FUZZ_RADIUS: f64 = 20.0;

/// Probability of wiggling with two small turns instead of a hairpin
pub const SMALL_TURNS_PROBABILITY: f64 = 0.9;

/// Largest fraction of a revolution swept by a wiggle turn
pub const SMALL_TURN_MAX_PERCENT: f64 = 0.25;

/// Upper bound of the random start angle
pub const START_ANGLE_MAX: f64 = PI / 8.0;

/// Goals closer than this multiple of the longest straight get a half-length straight
pub const SHORT_STRAIGHT_FACTOR: f64 = 1.2;

/// Overshoot of the final straight so the loop closes over the start
pub const FINAL_STRAIGHT_OVERSHOOT: f64 = 1.1;

/// Composer built from straights, constant turns and hairpins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleAndLineComposer {
    /// Abort as soon as the partial path overlaps itself
    check_intersections: bool,
    /// Recursion ceiling of each goal-seeking search
    max_depth: u32,
    /// Allow more than one hairpin on the way to a single waypoint
    allow_multiple_hairpins: bool,
}

impl Default for CircleAndLineComposer {
    fn default() -> Self {
        Self::from_options(&GeneratorOptions::default())
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl CircleAndLineComposer {
    /// Create a composer
    pub fn new(check_intersections: bool, max_depth: u32) -> Self {
        Self {
            check_intersections,
            max_depth,
            allow_multiple_hairpins: false,
        }
    }

    /// Create a composer matching the generator options
    pub fn from_options(options: &GeneratorOptions) -> Self {
        Self::new(options.check_intersections, options.max_depth)
    }

    /// Allow several hairpins per waypoint
    pub fn with_multiple_hairpins(mut self, allow: bool) -> Self {
        self.allow_multiple_hairpins = allow;
        self
    }

    /// Append a fragment and return the pose it leaves the path in
    fn append(path: &mut CandidatePath, fragment: PathFragment) -> Pose {
        let pose = fragment.exit_pose();
        path.push(fragment);
        pose
    }

    /// Steer from `pose` until `goal` is reached within `fuzz_radius`
    #[allow(clippy::too_many_arguments)]
    fn seek_goal<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        path: &mut CandidatePath,
        pose: Pose,
        goal: Point<f64>,
        depth: u32,
        hairpined: bool,
        fuzz_radius: f64,
        rng: &mut R,
    ) -> Result<Pose> {
        // Turn toward the side of the heading the goal lies on
        let bearing = angle_of(goal - pose.point);
        let toward_goal = if cap_angle_odd(bearing - pose.heading) >= 0.0 {
            left_normal(pose.heading)
        } else {
            -left_normal(pose.heading)
        };
        let radius = rng.gen_range(config.min_turn_radius..=config.max_turn_radius);
        let turn = constant_turn_until_facing_point(
            pose.point,
            radius,
            pose.heading,
            goal,
            toward_goal,
            false,
        );
        let mut normal = turn.exit_normal.unwrap_or_else(|| Point::new(0.0, 0.0));
        let mut pose = Self::append(path, turn);

        let remaining = goal - pose.point;
        let squared_distance = remaining.dot(remaining);
        let max_straight = config.max_straight;
        if squared_distance <= max_straight.powi(2) + fuzz_radius.powi(2) {
            let run = straight(
                pose.point,
                squared_distance.sqrt().min(max_straight),
                pose.heading,
            );
            return Ok(Self::append(path, run));
        }

        let run_length = if squared_distance <= (max_straight * SHORT_STRAIGHT_FACTOR).powi(2) {
            max_straight / 2.0
        } else {
            max_straight
        };
        pose = Self::append(path, straight(pose.point, run_length, pose.heading));

        let small_turns = rng.gen_bool(SMALL_TURNS_PROBABILITY);
        let use_hairpin = !small_turns
            && (self.allow_multiple_hairpins || !hairpined)
            && config.hairpins_enabled();
        if use_hairpin {
            let hairpin_radius =
                rng.gen_range(config.min_hairpin_radius..=config.max_hairpin_radius);
            let hairpin = hairpin_turn(
                pose.point,
                hairpin_radius,
                pose.heading,
                &HairpinOptions::default(),
                config,
                rng,
            );
            pose = Self::append(path, hairpin);
        } else {
            for _ in 0..2 {
                // Keep bending the way the previous arc did
                let against = turn_side_toward(-normal, pose.heading);
                let turn = constant_turn(
                    pose.point,
                    rng.gen_range(config.min_turn_radius..=config.max_turn_radius),
                    pose.heading,
                    rng.gen_range(0.0..SMALL_TURN_MAX_PERCENT),
                    against,
                );
                normal = turn.exit_normal.unwrap_or(normal);
                pose = Self::append(path, turn);
            }
        }

        if depth <= 1 {
            tracing::trace!("Goal seeking toward {goal:?} hit the recursion limit");
            return Err(GenerationError::RecursionLimit {
                depth: self.max_depth,
            });
        }
        self.seek_goal(
            config,
            path,
            pose,
            goal,
            depth - 1,
            hairpined || use_hairpin,
            fuzz_radius,
            rng,
        )
    }

    /// Abort early once the partial path crosses itself
    fn check_partial(&self, path: &CandidatePath) -> Result<()> {
        if self.check_intersections {
            let cells = validate::compactify(validate::quantize(&path.points));
            if validate::has_overlap(&cells) {
                return Err(GenerationError::SelfOverlap);
            }
        }
        Ok(())
    }

    /// Two arcs that line the heading up with the start and bring the path back
    /// onto the start line
    fn close_loop<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        path: &mut CandidatePath,
        pose: Pose,
        origin: Point<f64>,
        start_angle: f64,
        rng: &mut R,
    ) -> Result<Pose> {
        // Turn until heading opposite to the start direction
        let target = -direction(start_angle);
        let heading = direction(pose.heading);
        let outer_angle = (-heading.dot(target)).clamp(-1.0, 1.0).acos();
        let sweep = PI - outer_angle;
        let against = cross(heading, target) < 0.0;
        let radius = rng.gen_range(config.min_turn_radius..=config.max_turn_radius);
        let first = constant_turn(pose.point, radius, pose.heading, sweep / TAU, against);
        let exit_normal = normalize(first.exit_normal.unwrap_or_else(|| Point::new(0.0, 0.0)));
        let pose = Self::append(path, first);

        // Half circle whose diameter spans the lateral offset to the start line
        let gap = origin - pose.point;
        let radius = gap.dot(exit_normal).abs() / 2.0;
        let against = cross(direction(pose.heading), gap) < 0.0;
        let second = constant_turn(pose.point, radius, pose.heading, 0.5, against);
        Ok(Self::append(path, second))
    }
}

impl Composer for CircleAndLineComposer {
    fn compose<R: Rng + ?Sized>(
        &self,
        config: &GenerationConfig,
        origin: Point<f64>,
        rng: &mut R,
    ) -> Result<CandidatePath> {
        #[cfg(feature = "profiling")]
        profiling::scope!("circle_line::compose");
        let mut path = CandidatePath::new();

        let start_angle = rng.gen_range(0.0..START_ANGLE_MAX);
        let mut pose = Self::append(
            &mut path,
            straight(origin, config.min_straight, start_angle),
        );

        for goal in goal_points(origin, config.max_track_length) {
            pose = self.seek_goal(
                config,
                &mut path,
                pose,
                goal,
                self.max_depth,
                false,
                WAYPOINT_FUZZ_RADIUS,
                rng,
            )?;
            self.check_partial(&path)?;
        }

        let approach =
            origin + Point::new(-0.5 * config.max_straight, 1.5 * config.max_turn_radius);
        pose = self.seek_goal(
            config,
            &mut path,
            pose,
            approach,
            self.max_depth,
            false,
            0.0,
            rng,
        )?;

        pose = self.close_loop(config, &mut path, pose, origin, start_angle, rng)?;

        let remaining = origin - pose.point;
        if remaining.dot(direction(pose.heading)) <= 0.0 {
            return Err(GenerationError::ConstraintViolation {
                reason: "closing straight would lead away from the start".to_string(),
            });
        }
        let final_straight = magnitude(remaining) * FINAL_STRAIGHT_OVERSHOOT;
        Self::append(&mut path, straight(pose.point, final_straight, pose.heading));

        if !config.lax_generation {
            if final_straight + config.min_straight > config.max_straight {
                return Err(GenerationError::ConstraintViolation {
                    reason: format!(
                        "start/finish straight of {:.1} exceeds the maximum of {}",
                        final_straight + config.min_straight,
                        config.max_straight
                    ),
                });
            }
            if path.length > config.max_track_length {
                return Err(GenerationError::ConstraintViolation {
                    reason: format!(
                        "track length {:.1} exceeds the maximum of {}",
                        path.length, config.max_track_length
                    ),
                });
            }
        }

        Ok(path)
    }
}
