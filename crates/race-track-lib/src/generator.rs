//! TrackGenerator - Retry loop turning candidate paths into validated tracks
//!
//! Each attempt runs the composer selected by the configured [`TrackMode`], rejects
//! candidates that break a rule or overlap themselves and normalizes the first one
//! that survives.

use crate::composer::{CandidatePath, Composer};
use crate::{
    BezierComposer, CircleAndLineComposer, GenerationConfig, GenerationError, GeneratorOptions,
    ParameterValues, Result, Track, TrackMode, validate,
};

use geo::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Generates tracks for one set of rules
#[derive(Debug, Clone, PartialEq)]
pub struct TrackGenerator {
    /// Track rules
    config: GenerationConfig,
    /// Retry loop settings
    options: GeneratorOptions,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackGenerator {
    /// Create a generator with default options
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_options(config, GeneratorOptions::default())
    }

    /// Create a generator with explicit options
    pub fn with_options(config: GenerationConfig, options: GeneratorOptions) -> Self {
        Self { config, options }
    }

    /// Create a generator from a positional parameter tuple
    pub fn from_values(values: &ParameterValues) -> Result<Self> {
        Ok(Self::new(GenerationConfig::from_values(values)?))
    }

    /// Track rules of this generator
    #[inline]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Retry loop settings of this generator
    #[inline]
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate a track, seeded from the options or from OS entropy
    pub fn generate(&self) -> Result<Track> {
        match self.options.seed {
            Some(seed) => self.generate_seeded(seed),
            None => self.generate_with_rng(&mut StdRng::from_entropy()),
        }
    }

    /// Generate a track reproducibly from a seed
    pub fn generate_seeded(&self, seed: u64) -> Result<Track> {
        self.generate_with_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// Generate one track per seed in parallel
    ///
    /// Results keep the order of `seeds`.
    pub fn generate_parallel(&self, seeds: &[u64]) -> Vec<Result<Track>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("generator::generate_parallel");

        seeds
            .par_iter()
            .map(|&seed| self.generate_seeded(seed))
            .collect()
    }

    /// Generate a track drawing every random choice from `rng`
    ///
    /// Rejected candidates are retried up to `max_attempts` times; only invalid
    /// configurations and exhausted attempts are reported as errors.
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Track> {
        #[cfg(feature = "profiling")]
        profiling::scope!("generator::generate");
        self.config.validate()?;

        let origin = Point::new(0.0, 0.0);
        for attempt in 1..=self.options.max_attempts {
            let candidate = match self.compose(origin, rng) {
                Ok(candidate) => candidate,
                Err(e) if e.is_retryable() => {
                    tracing::debug!("Attempt {attempt} rejected: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let (points, width, height) = validate::normalize_to_positive(&candidate.points);
            if self.options.check_intersections {
                let cells = validate::compactify(validate::quantize(&points));
                if validate::has_overlap(&cells) {
                    tracing::debug!("Attempt {attempt} rejected: candidate overlaps itself");
                    continue;
                }
            }

            tracing::info!(
                "Generated {} track after {attempt} attempt(s): {} points, length {:.1}, {width}x{height}",
                self.config.mode,
                points.len(),
                candidate.length,
            );
            return Ok(Track::new(points, width, height, candidate.length));
        }

        tracing::warn!(
            "Giving up on {} track after {} attempts",
            self.config.mode,
            self.options.max_attempts
        );
        Err(GenerationError::AttemptsExhausted {
            attempts: self.options.max_attempts,
        })
    }

    /// Run the composer of the configured mode once
    fn compose<R: Rng + ?Sized>(&self, origin: Point<f64>, rng: &mut R) -> Result<CandidatePath> {
        match self.config.mode {
            TrackMode::CircleAndLine => CircleAndLineComposer::from_options(&self.options)
                .compose(&self.config, origin, rng),
            TrackMode::Bezier => BezierComposer.compose(&self.config, origin, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get_preset;
    use crate::validate::OVERLAP_TAIL_EXCLUSION;
    use std::collections::HashSet;

    fn assert_valid_track(track: &Track) {
        assert!(track.width() >= 10);
        assert!(track.height() >= 10);
        for p in track.points() {
            assert!(p.x() >= 0.0 && p.x() <= track.width() as f64);
            assert!(p.y() >= 0.0 && p.y() <= track.height() as f64);
        }

        let cells = validate::compactify(validate::quantize(track.points()));
        let kept = &cells[..cells.len().saturating_sub(OVERLAP_TAIL_EXCLUSION)];
        let unique: HashSet<_> = kept.iter().collect();
        assert_eq!(unique.len(), kept.len(), "track revisits a grid cell");
        assert!(!validate::has_overlap(&cells));
    }

    #[test]
    fn test_small_straights_track() {
        let generator = TrackGenerator::from_values(&get_preset("Small Straights")).unwrap();
        let track = generator.generate_seeded(42).unwrap();
        assert_valid_track(&track);
        assert!(track.points().len() > 100);
        assert!(track.path_length() > 0.0);
        assert!(track.closure_gap() < generator.config().max_straight);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = TrackGenerator::new(GenerationConfig::default());
        let first = generator.generate_seeded(7).unwrap();
        let second = generator.generate_seeded(7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_from_options() {
        let options = GeneratorOptions {
            seed: Some(7),
            ..GeneratorOptions::default()
        };
        let seeded = TrackGenerator::with_options(GenerationConfig::default(), options);
        let plain = TrackGenerator::new(GenerationConfig::default());
        assert_eq!(seeded.generate().unwrap(), plain.generate_seeded(7).unwrap());
    }

    #[test]
    fn test_contest_rules_respect_length() {
        let generator = TrackGenerator::from_values(&get_preset("Contest Rules")).unwrap();
        let track = generator.generate_seeded(3).unwrap();
        assert_valid_track(&track);
        assert!(track.length() <= generator.config().max_track_length);
    }

    #[test]
    fn test_bezier_track() {
        let generator = TrackGenerator::from_values(&get_preset("Bezier")).unwrap();
        let track = generator.generate_seeded(5).unwrap();
        assert_valid_track(&track);
        assert!(track.closure_gap() < 1e-6);
    }

    #[test]
    fn test_generation_without_overlap_check() {
        let options = GeneratorOptions {
            check_intersections: false,
            ..GeneratorOptions::default()
        };
        let config = GenerationConfig::from_preset("Computer Friendly").unwrap();
        let track = TrackGenerator::with_options(config, options)
            .generate_seeded(1)
            .unwrap();
        assert!(!track.points().is_empty());
    }

    #[test]
    fn test_attempts_exhausted() {
        let options = GeneratorOptions {
            max_attempts: 0,
            ..GeneratorOptions::default()
        };
        let generator = TrackGenerator::with_options(GenerationConfig::default(), options);
        assert_eq!(
            generator.generate_seeded(1),
            Err(GenerationError::AttemptsExhausted { attempts: 0 })
        );
    }

    #[test]
    fn test_invalid_config_is_not_retried() {
        let config = GenerationConfig {
            min_straight: -1.0,
            ..GenerationConfig::default()
        };
        let result = TrackGenerator::new(config).generate_seeded(1);
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let generator = TrackGenerator::new(GenerationConfig::default());
        let seeds = [1, 2, 3];
        let parallel = generator.generate_parallel(&seeds);
        assert_eq!(parallel.len(), seeds.len());
        for (result, &seed) in parallel.iter().zip(&seeds) {
            assert_eq!(result, &generator.generate_seeded(seed));
        }
    }
}
