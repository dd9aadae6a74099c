pub mod analyzer;
pub mod cadence;
pub mod config;
pub mod degree;
pub mod interval;
pub mod key;
pub mod melody;
pub mod pitch;
pub mod progression;
pub mod tables;
pub mod transition;

/// Application name for XDG paths
pub const APP_NAME: &str = "chordscope";

/// Key assumed when neither the CLI nor the config names one.
pub const DEFAULT_KEY: &str = "C";

/// Default minimum candidate score (0-100) for reported interpretations.
pub const DEFAULT_THRESHOLD: i32 = 40;

/// Octave assumed for note tokens written without one.
pub const DEFAULT_OCTAVE: i32 = 4;
