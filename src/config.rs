use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Application-level constants
pub const APP_NAME: &str = "Culturas";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Antibiotics that get a selectable control by default.
/// Display names as they appear in rendered results.
pub const DEFAULT_ANTIBIOTICS: &[&str] = &[
    "Amicacina",
    "Amoxicilina/ácido Clavulânico",
    "Ampicilina",
    "Ampicilina/sulbactam",
    "Aztreonam",
    "Cefalotina",
    "Cefepima",
    "Cefoxitina",
    "Ceftazidima",
    "Ceftazidima/avibactam",
    "Ceftriaxona",
    "Cefuroxima",
    "Ciprofloxacina",
    "Clindamicina",
    "Colistina",
    "Daptomicina",
    "Eritromicina",
    "Ertapenem",
    "Fosfomicina",
    "Gentamicina",
    "Imipenem",
    "Levofloxacina",
    "Linezolida",
    "Meropenem",
    "Nitrofurantoína",
    "Oxacilina",
    "Penicilina",
    "Piperacilina/tazobactam",
    "Rifampicina",
    "Sulfametoxazol/trimetoprim",
    "Teicoplanina",
    "Tigeciclina",
    "Vancomicina",
];

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "culturas=info,culturas_lib=info"
}

/// Get the application data directory (~/.culturas/)
pub fn app_data_dir() -> Result<PathBuf, AppError> {
    let home = dirs::home_dir().ok_or(AppError::NoHomeDir)?;
    Ok(home.join(".culturas"))
}

/// Get the default config file path
pub fn default_config_path() -> Result<PathBuf, AppError> {
    Ok(app_data_dir()?.join("config.json"))
}

/// User configuration for the antibiotic controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Antibiotics with a selectable control. Others are never filtered.
    pub known_antibiotics: Vec<String>,
    /// Known antibiotics switched off at startup.
    pub inactive_antibiotics: Vec<String>,
    /// Overrides `default_log_filter()` when RUST_LOG is unset.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            known_antibiotics: DEFAULT_ANTIBIOTICS.iter().map(|s| s.to_string()).collect(),
            inactive_antibiotics: Vec::new(),
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Load config from file, or fall back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| AppError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(default_log_filter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir().unwrap();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with(".culturas"));
    }

    #[test]
    fn app_name_is_culturas() {
        assert_eq!(APP_NAME, "Culturas");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.known_antibiotics.iter().any(|a| a == "Meropenem"));
    }

    #[test]
    fn full_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            known_antibiotics: vec!["Amicacina".into()],
            inactive_antibiotics: vec!["Amicacina".into()],
            log_filter: Some("culturas_lib=debug".into()),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
        assert_eq!(config.log_filter(), "culturas_lib=debug");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"inactive_antibiotics": ["Colistina"]}"#).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.inactive_antibiotics, ["Colistina"]);
        assert_eq!(config.known_antibiotics.len(), DEFAULT_ANTIBIOTICS.len());
        assert_eq!(config.log_filter(), default_log_filter());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(AppError::Config { .. })));
    }
}
