//! Transaction category classifier.
//!
//! The model layer is a pluggable text classifier with two interchangeable
//! backends behind the [`ClassifierBackend`] trait:
//!
//! - **Fallback** ([`fallback::FallbackClassifier`]): token document
//!   frequencies plus label priors. Always compiled, no numeric dependencies.
//! - **Statistical** (`statistical::StatisticalClassifier`, feature
//!   `statistical`): TF-IDF over 1–2 grams feeding a linear classifier.
//!
//! [`facade::ModelFacade`] is the entry point used for training and serving.
//! It picks a backend from the build's [`Capabilities`], and persists through
//! the self-describing [`envelope::ModelEnvelope`] so that an artifact always
//! states which backend can read it.
//!
//! ## Usage
//!
//! ```no_run
//! use txcat::model::{facade::ModelFacade, BackendPreference, Capabilities};
//! use txcat::config::StatisticalConfig;
//!
//! let caps = Capabilities::detect();
//! let mut model = ModelFacade::new(&caps, BackendPreference::Auto, &StatisticalConfig::default())?;
//! model.fit(&["coffee shop", "grocery store"], &["dining", "groceries"])?;
//! model.save("models/txcat_model.json")?;
//!
//! let loaded = ModelFacade::load("models/txcat_model.json", &caps)?;
//! assert_eq!(loaded.predict(&["corner coffee"]), vec!["dining"]);
//! # Ok::<(), txcat::error::Error>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`fallback`] - Frequency-based classifier
//! - `tfidf` - TF-IDF vectorizer (feature `statistical`)
//! - `linear` - SGD-trained linear classifier (feature `statistical`)
//! - `statistical` - Vectorizer + classifier + label encoder (feature `statistical`)
//! - [`envelope`] - Persistence format
//! - [`facade`] - Backend selection and uniform surface

pub mod envelope;
pub mod facade;
pub mod fallback;
#[cfg(feature = "statistical")]
pub mod linear;
#[cfg(feature = "statistical")]
pub mod statistical;
#[cfg(feature = "statistical")]
pub mod tfidf;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub use envelope::ModelEnvelope;
pub use facade::ModelFacade;
pub use fallback::FallbackClassifier;

/// Which concrete algorithm a model uses. Also the envelope discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Fallback,
    Statistical,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Fallback => write!(f, "fallback"),
            BackendKind::Statistical => write!(f, "statistical"),
        }
    }
}

/// Training objective of the statistical backend's linear classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinearLoss {
    /// Multinomial logistic regression; has probability estimates.
    #[default]
    Logistic,
    /// One-vs-rest linear SVM; no probability estimates.
    Hinge,
}

/// Backend requested for new training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Statistical when available, otherwise fallback.
    #[default]
    Auto,
    Fallback,
    Statistical,
}

impl std::str::FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "fallback" => Ok(BackendPreference::Fallback),
            "statistical" => Ok(BackendPreference::Statistical),
            other => Err(format!(
                "unknown backend '{other}' (expected auto, fallback or statistical)"
            )),
        }
    }
}

/// Backends this process can construct and load.
///
/// [`Capabilities::detect`] reports what was compiled in. Tests and operators
/// can inject a narrower set, e.g. [`Capabilities::fallback_only`], to behave
/// like a build without the numeric stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub statistical: bool,
}

impl Capabilities {
    /// Capabilities of the current build.
    pub fn detect() -> Self {
        Capabilities {
            statistical: cfg!(feature = "statistical"),
        }
    }

    /// Only the fallback backend, regardless of compiled features.
    pub fn fallback_only() -> Self {
        Capabilities { statistical: false }
    }

    /// Whether `kind` can be built and loaded.
    pub fn supports(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Fallback => true,
            BackendKind::Statistical => self.statistical && cfg!(feature = "statistical"),
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// Contract shared by every classifier backend.
///
/// `fit` is exclusive (`&mut self`); after it returns, the prediction methods
/// only read, so a trained backend can be shared across threads.
pub trait ClassifierBackend: Send + Sync + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// Train from parallel texts and labels, replacing any prior state.
    fn fit(&mut self, texts: &[&str], labels: &[&str]) -> Result<()>;

    /// One label per text; `""` where the backend has no opinion.
    fn predict(&self, texts: &[&str]) -> Vec<String>;

    /// Per-text scores aligned with [`ClassifierBackend::labels`], or `None`
    /// when the algorithm has no probability estimate.
    fn predict_proba(&self, texts: &[&str]) -> Option<Vec<Vec<f64>>>;

    /// Known labels, in the column order used by `predict_proba`.
    fn labels(&self) -> &[String];

    /// Snapshot of the learned state for persistence.
    fn to_envelope(&self) -> ModelEnvelope;

    fn is_trained(&self) -> bool {
        !self.labels().is_empty()
    }
}
