use crate::settings::Settings;
use race_track_lib::{
    GenerationConfig, GenerationError, Track, TrackGenerator, TrackMode, get_presets,
};
use rand::Rng;
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;

/// Errors surfaced by the command line tool
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid values: {0}")]
    InvalidValues(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One generated track as written to stdout
#[derive(Debug, Serialize)]
struct TrackReport {
    /// Seed that reproduces this track
    seed: u64,
    mode: TrackMode,
    #[serde(flatten)]
    track: Track,
}

/// Install the stderr log subscriber
///
/// Defaults to `info` (`debug` in debug builds) when `RUST_LOG` is not set.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default_filter = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let (filter, defaulted) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, false),
        Err(_) => (EnvFilter::new(default_filter), true),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    if defaulted {
        tracing::info!("RUST_LOG set to default: {default_filter}");
    }
}

/// Log name and version of the tool
pub fn log_version_info() {
    tracing::info!(
        "{} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}

/// Write `value` as JSON followed by a newline
fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

/// Generate the requested tracks and print them
fn run(settings: &Settings) -> Result<(), CliError> {
    if settings.list_presets {
        return write_json(&get_presets(), settings.pretty);
    }

    let config = GenerationConfig::from_values(&settings.parameter_values()?)?;
    let options = settings.generator_options();
    let base_seed = options
        .seed
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..u64::MAX / 2));
    let mode = config.mode;
    let generator = TrackGenerator::with_options(config, options);

    if settings.count <= 1 {
        let track = generator.generate_seeded(base_seed)?;
        let report = TrackReport {
            seed: base_seed,
            mode,
            track,
        };
        return write_json(&report, settings.pretty);
    }

    let seeds: Vec<u64> = (0..settings.count as u64).map(|i| base_seed.wrapping_add(i)).collect();
    tracing::info!(
        "Generating {} tracks in parallel from seed {base_seed}",
        seeds.len()
    );
    let mut reports = Vec::with_capacity(seeds.len());
    let mut failure = None;
    for (seed, result) in seeds.iter().zip(generator.generate_parallel(&seeds)) {
        match result {
            Ok(track) => reports.push(TrackReport {
                seed: *seed,
                mode,
                track,
            }),
            Err(e) => {
                tracing::error!("Track for seed {seed} failed: {e}");
                failure = Some(e);
            }
        }
    }
    write_json(&reports, settings.pretty)?;
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Native entry point
pub fn native_main() -> ExitCode {
    setup_logging();
    log_version_info();

    let settings = Settings::from_cli();
    #[cfg(feature = "profiling")]
    profiling::scope!("main");

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
