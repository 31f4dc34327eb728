pub mod arrange;
pub mod config;
pub mod decoder;
pub mod difficulty;
pub mod fretboard;
pub mod graph;
pub mod midi;
pub mod pathfinder;
pub mod render;
pub mod theory;

/// Standard 6-string guitar tuning, thin to thick.
pub const STANDARD_TUNING: &[&str] = &["E4", "B3", "G3", "D3", "A2", "E2"];

/// Standard ukulele tuning, thin to thick.
pub const UKULELE_TUNING: &[&str] = &["A4", "E4", "C4", "G4"];

/// Application name for XDG paths
pub const APP_NAME: &str = "fretwise";
