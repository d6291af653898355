//! Configuration structures for txcat.
//!
//! Loaded from a TOML file; every section and field is optional and falls
//! back to the defaults below.
//!
//! ```toml
//! [model]
//! path = "models/txcat_model.json"
//! backend = "auto"          # auto | fallback | statistical
//!
//! [statistical]
//! max_features = 20000
//! ngram_min = 1
//! ngram_max = 2
//! loss = "logistic"         # logistic | hinge
//! epochs = 200
//! learning_rate = 0.5
//! l2 = 0.0001
//! seed = 42
//!
//! [training]
//! train_split = 0.8
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{BackendPreference, LinearLoss};

/// Default location of the model artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/txcat_model.json";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Artifact location and backend choice
    pub model: ModelConfig,
    /// Hyperparameters of the statistical backend
    pub statistical: StatisticalConfig,
    /// Evaluation split settings
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Where `train` writes and serving reads the artifact
    pub path: PathBuf,
    /// Backend for new training
    pub backend: BackendPreference,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            backend: BackendPreference::Auto,
        }
    }
}

/// Statistical backend hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticalConfig {
    /// Vocabulary cap of the TF-IDF vectorizer
    pub max_features: usize,
    /// Smallest n-gram size
    pub ngram_min: usize,
    /// Largest n-gram size
    pub ngram_max: usize,
    /// Linear classifier objective
    pub loss: LinearLoss,
    /// SGD passes over the training set
    pub epochs: usize,
    /// Initial SGD step size
    pub learning_rate: f64,
    /// L2 penalty
    pub l2: f64,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for StatisticalConfig {
    fn default() -> Self {
        StatisticalConfig {
            max_features: 20_000,
            ngram_min: 1,
            ngram_max: 2,
            loss: LinearLoss::Logistic,
            epochs: 200,
            learning_rate: 0.5,
            l2: 1e-4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows used for training in `evaluate` (e.g. 0.8)
    pub train_split: f64,
    /// Seed for the train/test shuffle
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            train_split: 0.8,
            seed: 42,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load `path` if given, otherwise `default_path` if it exists, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>, default_path: impl AsRef<Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None if default_path.as_ref().exists() => Self::load(default_path),
            None => Ok(Config::default()),
        }
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
