// Configuration loading and parsing (tendencies.toml).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::estimator::wagon::ZONE_COUNT;
use crate::estimator::{PitchPreference, GENERIC_ZONE_WEIGHTS, LENGTHS, LINES};

/// Config file name under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "tendencies.toml";

/// Environment variable overriding `pipeline.seed`.
pub const SEED_ENV: &str = "TENDENCIES_SEED";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one subdirectory of match CSVs per format.
    pub raw_dir: PathBuf,
    /// Directory the profile and index artifacts are written to.
    pub processed_dir: PathBuf,
    pub formats: Vec<String>,
    pub seed: Option<u64>,
    pub parallel: bool,
    pub thresholds: Thresholds,
    pub estimator: EstimatorConfig,
}

impl Config {
    /// Config with default thresholds and estimator settings over the given
    /// directories. Handy for tests and embedding.
    pub fn new(raw_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
            formats: crate::phase::KNOWN_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            seed: None,
            parallel: false,
            thresholds: Thresholds::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// tendencies.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    paths: PathsSection,
    pipeline: PipelineSection,
    #[serde(default)]
    thresholds: Thresholds,
    #[serde(default)]
    estimator: EstimatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct PathsSection {
    raw_dir: String,
    processed_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PipelineSection {
    formats: Vec<String>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    parallel: bool,
}

/// Minimum volume for a profile to be written.
#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_min_balls_faced")]
    pub min_balls_faced: u32,
    #[serde(default = "default_min_overs")]
    pub min_overs: f64,
}

fn default_min_balls_faced() -> u32 {
    50
}

fn default_min_overs() -> f64 {
    5.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_balls_faced: default_min_balls_faced(),
            min_overs: default_min_overs(),
        }
    }
}

/// Weights and biases for the synthetic distributions.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default = "default_zone_weights")]
    pub zone_weights: Vec<f64>,
    #[serde(default = "default_preferred_length")]
    pub preferred_length: String,
    #[serde(default = "default_preferred_line")]
    pub preferred_line: String,
    /// Per-player overrides keyed by player name.
    #[serde(default)]
    pub players: BTreeMap<String, PlayerOverride>,
}

/// Fixed per-player estimator inputs, replacing the generic ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerOverride {
    pub zone_weights: Option<Vec<f64>>,
    pub preferred_length: Option<String>,
    pub preferred_line: Option<String>,
}

fn default_zone_weights() -> Vec<f64> {
    GENERIC_ZONE_WEIGHTS.to_vec()
}

fn default_preferred_length() -> String {
    "good".into()
}

fn default_preferred_line() -> String {
    "off_stump".into()
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            zone_weights: default_zone_weights(),
            preferred_length: default_preferred_length(),
            preferred_line: default_preferred_line(),
            players: BTreeMap::new(),
        }
    }
}

impl EstimatorConfig {
    /// Zone weights for a batter: the player's fixed vector if configured,
    /// otherwise the generic one. Validation guarantees nine entries.
    pub fn zone_weights_for(&self, name: &str) -> [f64; ZONE_COUNT] {
        let source = self
            .players
            .get(name)
            .and_then(|p| p.zone_weights.as_deref())
            .unwrap_or(&self.zone_weights);
        let mut weights = GENERIC_ZONE_WEIGHTS;
        if source.len() == ZONE_COUNT {
            weights.copy_from_slice(source);
        }
        weights
    }

    /// Pitch preference for a bowler, falling back to the configured default.
    pub fn preference_for(&self, name: &str) -> PitchPreference {
        let player = self.players.get(name);
        PitchPreference {
            length: Some(
                player
                    .and_then(|p| p.preferred_length.clone())
                    .unwrap_or_else(|| self.preferred_length.clone()),
            ),
            line: Some(
                player
                    .and_then(|p| p.preferred_line.clone())
                    .unwrap_or_else(|| self.preferred_line.clone()),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/tendencies.toml` relative to `base_dir`.
///
/// Relative data paths are resolved against `base_dir`. Does not copy
/// defaults; prefer `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let seed = match std::env::var(SEED_ENV) {
        Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::ValidationError {
                field: SEED_ENV.into(),
                message: format!("must be an unsigned integer, got {raw:?}"),
            }
        })?),
        Err(_) => file.pipeline.seed,
    };

    let config = Config {
        raw_dir: resolve(base_dir, &file.paths.raw_dir),
        processed_dir: resolve(base_dir, &file.paths.processed_dir),
        formats: file.pipeline.formats,
        seed,
        parallel: file.pipeline.parallel,
        thresholds: file.thresholds,
        estimator: file.estimator,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/tendencies.toml` from `defaults/` on first run.
///
/// Returns the path written, or `None` when a config already exists. An
/// existing file is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let content = std::fs::read(&source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "no config at {} and cannot read {}: {e}",
            target.display(),
            source.display()
        ),
    })?;

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", dir.display()),
        })?;
    }

    // create_new keeps a concurrently written config intact.
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Load config relative to `base_dir`, copying defaults first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    if let Some(path) = ensure_config_file(base_dir)? {
        tracing::info!("copied default config to {}", path.display());
    }
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn resolve(base_dir: &Path, raw: &str) -> PathBuf {
    let p = Path::new(raw);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_weights(field: &str, weights: &[f64]) -> Result<(), ConfigError> {
    if weights.len() != ZONE_COUNT {
        return Err(invalid(
            field,
            format!("expected {ZONE_COUNT} weights, got {}", weights.len()),
        ));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(invalid(field, "weights must be finite and non-negative"));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(invalid(field, "weights must not all be zero"));
    }
    Ok(())
}

fn validate_label(field: &str, value: &str, known: &[&str]) -> Result<(), ConfigError> {
    if !known.contains(&value) {
        return Err(invalid(
            field,
            format!("unknown value {value:?}, expected one of {known:?}"),
        ));
    }
    Ok(())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.formats.is_empty() {
        return Err(invalid("pipeline.formats", "must list at least one format"));
    }
    if let Some(blank) = config.formats.iter().find(|f| f.trim().is_empty()) {
        return Err(invalid(
            "pipeline.formats",
            format!("format keys must be non-empty, got {blank:?}"),
        ));
    }

    let min_overs = config.thresholds.min_overs;
    if !min_overs.is_finite() || min_overs < 0.0 {
        return Err(invalid(
            "thresholds.min_overs",
            format!("must be a non-negative number, got {min_overs}"),
        ));
    }

    let est = &config.estimator;
    validate_weights("estimator.zone_weights", &est.zone_weights)?;
    validate_label("estimator.preferred_length", &est.preferred_length, &LENGTHS)?;
    validate_label("estimator.preferred_line", &est.preferred_line, &LINES)?;

    for (name, player) in &est.players {
        if let Some(weights) = &player.zone_weights {
            validate_weights(&format!("estimator.players.{name}.zone_weights"), weights)?;
        }
        if let Some(length) = &player.preferred_length {
            validate_label(
                &format!("estimator.players.{name}.preferred_length"),
                length,
                &LENGTHS,
            )?;
        }
        if let Some(line) = &player.preferred_line {
            validate_label(&format!("estimator.players.{name}.preferred_line"), line, &LINES)?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
