//! Named rule presets
//!
//! The registry is a fixed list compiled into the library. Values use the positional
//! layout decoded by [`GenerationConfig::from_values`](crate::GenerationConfig::from_values).

use crate::config::ParameterValues;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Preset used when a requested name does not exist
pub const FALLBACK_PRESET: &str = "Contest Rules";

/// Preset suggested to users by default
pub const DEFAULT_PRESET: &str = "Small Straights";

/// A named parameter bundle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Preset {
    pub name: &'static str,
    pub values: ParameterValues,
}

static PRESETS: [Preset; 4] = [
    // Autocross rules: straights <= 80, constant turns <= 25 radius,
    // hairpins >= 4.5 outside radius, track length <= 1500
    Preset {
        name: "Contest Rules",
        values: [10.0, 80.0, 10.0, 25.0, 4.5, 10.0, 3.0, 1500.0, 0.0, 0.0],
    },
    Preset {
        name: "Small Straights",
        values: [5.0, 40.0, 10.0, 25.0, 4.5, 10.0, 3.0, 700.0, 1.0, 0.0],
    },
    Preset {
        name: "Computer Friendly",
        values: [10.0, 80.0, 5.0, 15.0, 4.5, 10.0, 3.0, 500.0, 1.0, 0.0],
    },
    Preset {
        name: "Bezier",
        values: [10.0, 80.0, 5.0, 15.0, 4.5, 10.0, 3.0, 500.0, 1.0, 1.0],
    },
];

/// All presets, in display order
#[inline]
pub fn get_presets() -> &'static [Preset] {
    &PRESETS
}

/// Names of all presets, in display order
pub fn get_preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|preset| preset.name).collect()
}

/// Name of the preset offered by default
#[inline]
pub fn get_default_preset() -> &'static str {
    DEFAULT_PRESET
}

/// Look up a preset without falling back
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name == name)
}

/// Values of the named preset
///
/// Unknown names log a warning and return the values of [`FALLBACK_PRESET`].
pub fn get_preset(name: &str) -> ParameterValues {
    match find_preset(name) {
        Some(preset) => preset.values,
        None => {
            tracing::warn!("No such preset: {name}, defaulting to {FALLBACK_PRESET}");
            PRESETS[0].values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenerationConfig;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Log sink shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_preset_names_in_order() {
        assert_eq!(
            get_preset_names(),
            vec!["Contest Rules", "Small Straights", "Computer Friendly", "Bezier"]
        );
    }

    #[test]
    fn test_get_known_preset() {
        assert_eq!(
            get_preset("Small Straights"),
            [5.0, 40.0, 10.0, 25.0, 4.5, 10.0, 3.0, 700.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_unknown_preset_falls_back_to_contest_rules() {
        assert_eq!(PRESETS[0].name, FALLBACK_PRESET);
        assert_eq!(
            get_preset("Nonexistent"),
            [10.0, 80.0, 10.0, 25.0, 4.5, 10.0, 3.0, 1500.0, 0.0, 0.0]
        );
        assert!(find_preset("Nonexistent").is_none());
    }

    #[test]
    fn test_unknown_preset_logs_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();

        let values = tracing::subscriber::with_default(subscriber, || get_preset("Nonexistent"));
        assert_eq!(values, get_preset(FALLBACK_PRESET));

        let output = logs.contents();
        assert!(output.contains("WARN"), "{output}");
        assert!(
            output.contains("No such preset: Nonexistent, defaulting to Contest Rules"),
            "{output}"
        );

        // Known names stay quiet
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || get_preset("Bezier"));
        assert!(logs.contents().is_empty());
    }

    #[test]
    fn test_all_presets_decode() {
        for preset in get_presets() {
            let config = GenerationConfig::from_values(&preset.values);
            assert!(config.is_ok(), "preset {} failed to decode", preset.name);
        }
    }

    #[test]
    fn test_default_preset_exists() {
        assert!(find_preset(get_default_preset()).is_some());
        assert_eq!(
            GenerationConfig::default(),
            GenerationConfig::from_preset(DEFAULT_PRESET).unwrap()
        );
    }
}
