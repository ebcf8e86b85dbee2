// Configuration loading and parsing (config/cupps.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::Position;

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
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    pub eligibility: EligibilityConfig,
    pub thresholds: ThresholdConfig,
    pub scoring: ScoringOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DatabaseSection::default().path,
            eligibility: EligibilityConfig::default(),
            thresholds: ThresholdConfig::default(),
            scoring: ScoringOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// cupps.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole cupps.toml file. Every section is
/// optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    database: DatabaseSection,
    eligibility: EligibilityConfig,
    thresholds: ThresholdConfig,
    scoring: ScoringOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DatabaseSection {
    path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: "cupps.db".into(),
        }
    }
}

/// Which players are in scope for a batch run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// Players drafted in or after this year, or whose first professional
    /// season is in or after this year, are scored.
    pub min_year: u16,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self { min_year: 2013 }
    }
}

/// Involvement thresholds used by the season aggregator.
///
/// The valid-season thresholds (`>=`) and the sample gates (`>`) are kept
/// apart on purpose; they are not the same cut.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub valid_season_rb: u32,
    pub valid_season_wr: u32,
    pub valid_season_te: u32,
    /// A season's run grade enters the sample when rush attempts exceed this.
    pub rush_sample_gate: u32,
    /// A season's receiving metrics enter the samples when receptions exceed this.
    pub reception_sample_gate: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            valid_season_rb: 20,
            valid_season_wr: 5,
            valid_season_te: 5,
            rush_sample_gate: 20,
            reception_sample_gate: 10,
        }
    }
}

impl ThresholdConfig {
    /// Minimum touches (rush attempts for RB, receptions for WR/TE) for a
    /// season to count toward `valid_seasons`.
    pub fn valid_season_touches(&self, position: Position) -> u32 {
        match position {
            Position::RunningBack => self.valid_season_rb,
            Position::WideReceiver => self.valid_season_wr,
            Position::TightEnd => self.valid_season_te,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Clamp the size score into [0, 100] before it is reported.
    pub clamp_size_score: bool,
    /// Fill missing height/weight with league-typical defaults before the
    /// size score is computed. When off, missing measurables zero the size score.
    pub impute_measurables: bool,
    /// Derive a season's age from the player's birth date when the stored
    /// season age is missing.
    pub derive_age_from_birth_date: bool,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            clamp_size_score: false,
            impute_measurables: false,
            derive_age_from_birth_date: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from `config/cupps.toml` under `base_dir`.
///
/// A missing file is not an error: the built-in defaults are used.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("cupps.toml");
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config_file(&path)
}

/// Load configuration from an explicit file path. The file must exist.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    let file: ConfigFile = toml::from_str(text)?;
    Ok(Config {
        db_path: file.database.path,
        eligibility: file.eligibility,
        thresholds: file.thresholds,
        scoring: file.scoring,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.eligibility.min_year == 0 {
        return Err(ConfigError::ValidationError {
            field: "eligibility.min_year".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir_name: &str, body: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(dir_name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("cupps.toml"), body).unwrap();
        tmp
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = std::env::temp_dir().join("cupps_config_test_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let config = load_config_from(&tmp).expect("defaults should load");
        assert_eq!(config, Config::default());
        assert_eq!(config.db_path, "cupps.db");
        assert_eq!(config.eligibility.min_year, 2013);
        assert_eq!(config.thresholds.valid_season_rb, 20);
        assert_eq!(config.thresholds.reception_sample_gate, 10);
        assert!(!config.scoring.clamp_size_score);
        assert!(!config.scoring.impute_measurables);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let tmp = write_config(
            "cupps_config_test_partial",
            r#"
[database]
path = "scores.db"

[thresholds]
valid_season_wr = 8

[scoring]
clamp_size_score = true
"#,
        );

        let config = load_config_from(&tmp).expect("should load partial config");
        assert_eq!(config.db_path, "scores.db");
        assert_eq!(config.thresholds.valid_season_wr, 8);
        assert_eq!(config.thresholds.valid_season_te, 5);
        assert_eq!(config.thresholds.rush_sample_gate, 20);
        assert!(config.scoring.clamp_size_score);
        assert!(config.scoring.derive_age_from_birth_date);
        assert_eq!(config.eligibility.min_year, 2013);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_min_year() {
        let tmp = write_config(
            "cupps_config_test_min_year",
            "[eligibility]\nmin_year = 0\n",
        );

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "eligibility.min_year");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_malformed_toml() {
        let tmp = write_config("cupps_config_test_malformed", "[database\npath = ");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("cupps_config_test_nope/cupps.toml");
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn valid_season_touches_by_position() {
        let t = ThresholdConfig::default();
        assert_eq!(t.valid_season_touches(Position::RunningBack), 20);
        assert_eq!(t.valid_season_touches(Position::WideReceiver), 5);
        assert_eq!(t.valid_season_touches(Position::TightEnd), 5);
    }
}
