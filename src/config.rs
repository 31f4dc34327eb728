use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Open-string note names, thin to thick (empty = standard guitar).
    pub tuning: Vec<String>,
    /// Number of frets on the instrument.
    pub nfrets: usize,
    /// Diatonic mode name restricting playable frets (None = chromatic).
    pub diatonic_mode: Option<String>,
    /// Instrument scale length in millimeters, for physical fret spacing.
    pub scale_length: f64,
    /// Chords with more notes than this skip the full permutation search.
    pub max_permuted_notes: usize,
    /// Number of parallel workers. 0 = auto-detect (cores / 2, min 1).
    pub workers: usize,
    /// Tab line wrap width in characters.
    pub wrap_width: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tuning: Vec::new(),
            nfrets: 20,
            diatonic_mode: None,
            scale_length: 650.0,
            max_permuted_notes: 6,
            workers: 0,
            wrap_width: crate::render::DEFAULT_WRAP_WIDTH,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/fretwise/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1).
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
