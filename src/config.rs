use crate::aggregate::AggregationPolicy;
use crate::resolver::tables::RuleTables;
use crate::schema::RootCategory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("top_k must be at least 1")]
    ZeroTopK,
}

/// Everything the engine needs, loaded once at process start. All of it is
/// data: the whole table set is substitutable without recompiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub policy: AggregationPolicy,
    pub top_k: usize,
    pub min_probability: f64,
    pub display_threshold: f64,
    pub target: RootCategory,
    pub tables: RuleTables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: AggregationPolicy::SumAll,
            top_k: 5,
            min_probability: 0.0,
            display_threshold: 0.25,
            target: RootCategory::Recyclable,
            tables: RuleTables::default(),
        }
    }
}

impl EngineConfig {
    /// Load the process configuration: built-in defaults, then the user
    /// config file if present, then environment overrides. A malformed file
    /// falls back to defaults here, once — per-request paths never
    /// re-validate configuration.
    pub fn load() -> Self {
        let mut config = Self::config_file_path()
            .and_then(|path| Self::from_file(&path).ok())
            .unwrap_or_default();
        config.apply_env_overrides();
        config.finalize();
        config
    }

    /// Like `load`, but the explicitly named file must parse.
    pub fn load_strict(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        if config.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        config.apply_env_overrides();
        config.finalize();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("binsense");
            path.push("config.toml");
            path
        })
    }

    fn finalize(&mut self) {
        if self.top_k == 0 {
            self.top_k = Self::default().top_k;
        }
        self.tables.normalize();
    }

    /// Environment beats file. A value that fails to parse warns and keeps
    /// the previous layer instead of failing the process.
    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("BINSENSE_POLICY") {
            match raw.parse::<AggregationPolicy>() {
                Ok(policy) => self.policy = policy,
                Err(e) => eprintln!("warning: BINSENSE_POLICY: {e}"),
            }
        }
        if let Ok(raw) = std::env::var("BINSENSE_TOP_K") {
            match raw.trim().parse::<usize>() {
                Ok(k) if k >= 1 => self.top_k = k,
                _ => eprintln!("warning: BINSENSE_TOP_K must be a positive integer, got {raw:?}"),
            }
        }
        if let Ok(raw) = std::env::var("BINSENSE_MIN_PROBABILITY") {
            match raw.trim().parse::<f64>() {
                Ok(v) if v >= 0.0 => self.min_probability = v,
                _ => eprintln!(
                    "warning: BINSENSE_MIN_PROBABILITY must be a non-negative number, got {raw:?}"
                ),
            }
        }
        if let Ok(raw) = std::env::var("BINSENSE_DISPLAY_THRESHOLD") {
            match raw.trim().parse::<f64>() {
                Ok(v) => self.display_threshold = v,
                Err(_) => eprintln!(
                    "warning: BINSENSE_DISPLAY_THRESHOLD must be a number, got {raw:?}"
                ),
            }
        }
        if let Ok(raw) = std::env::var("BINSENSE_RECYCLABLE_KEYWORDS") {
            let tokens: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            if tokens.is_empty() {
                eprintln!("warning: BINSENSE_RECYCLABLE_KEYWORDS is empty, keeping defaults");
            } else {
                self.tables.keywords.recyclable = tokens;
            }
        }
    }
}
