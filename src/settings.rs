use crate::cli::{get_env, parse_args};
use crate::run::CliError;
use clap::Parser;
use race_track_lib::presets::DEFAULT_PRESET;
use race_track_lib::{
    DEFAULT_MAX_ATTEMPTS, GeneratorOptions, PARAMETER_COUNT, ParameterValues, get_preset,
};

/// Environment variable read when `--seed` is not given
pub const SEED_ENV: &str = "TRACKGEN_SEED";

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Race Track Generator - Procedurally generates closed race-track centerlines from rule presets
pub struct Settings {
    /// Rule preset to generate with (unknown names fall back to "Contest Rules")
    #[clap(short, long, default_value = DEFAULT_PRESET)]
    pub preset: String,

    /// Explicit rule values overriding the preset: min/max straight, min/max turn radius,
    /// min/max hairpin radius, max hairpin pairs, max track length, lax (1/0), mode (0/1)
    #[clap(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub values: Option<Vec<f64>>,

    /// Print the preset registry as JSON and exit
    #[clap(long)]
    pub list_presets: bool,

    /// Seed for reproducible output (falls back to the TRACKGEN_SEED environment variable)
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Number of tracks to generate in parallel
    #[clap(short, long, default_value = "1")]
    pub count: usize,

    /// Reject tracks that overlap themselves
    #[clap(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub check_intersections: bool,

    /// Attempts per track before giving up
    #[clap(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Pretty-print the JSON output
    #[clap(long)]
    pub pretty: bool,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Rule values to generate with: `--values` if given, else the preset
    pub fn parameter_values(&self) -> Result<ParameterValues, CliError> {
        match &self.values {
            Some(values) => values.as_slice().try_into().map_err(|_| {
                CliError::InvalidValues(format!(
                    "expected {PARAMETER_COUNT} comma-separated values, got {}",
                    values.len()
                ))
            }),
            None => Ok(get_preset(&self.preset)),
        }
    }

    /// Seed from the command line or the environment
    pub fn seed(&self) -> Option<u64> {
        self.seed.or_else(|| get_env(SEED_ENV))
    }

    /// Retry loop options
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            check_intersections: self.check_intersections,
            max_attempts: self.max_attempts,
            seed: self.seed(),
            ..GeneratorOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::try_parse_from(["race-track-generator"]).unwrap();
        assert_eq!(settings.preset, DEFAULT_PRESET);
        assert_eq!(settings.count, 1);
        assert!(settings.check_intersections);
        assert_eq!(settings.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(
            settings.parameter_values().unwrap(),
            get_preset(DEFAULT_PRESET)
        );
    }

    #[test]
    fn test_explicit_values() {
        let settings = Settings::try_parse_from([
            "race-track-generator",
            "--values",
            "10,80,5,15,4.5,10,3,500,1,1",
            "--check-intersections",
            "false",
        ])
        .unwrap();
        assert_eq!(
            settings.parameter_values().unwrap(),
            [10.0, 80.0, 5.0, 15.0, 4.5, 10.0, 3.0, 500.0, 1.0, 1.0]
        );
        assert!(!settings.generator_options().check_intersections);
    }

    #[test]
    fn test_wrong_value_count() {
        let settings =
            Settings::try_parse_from(["race-track-generator", "--values", "1,2,3"]).unwrap();
        assert!(matches!(
            settings.parameter_values(),
            Err(CliError::InvalidValues(_))
        ));
    }

    #[test]
    fn test_seed_flag_wins() {
        let settings =
            Settings::try_parse_from(["race-track-generator", "--seed", "12"]).unwrap();
        assert_eq!(settings.seed(), Some(12));
        assert_eq!(settings.generator_options().seed, Some(12));
    }
}
