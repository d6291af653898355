//! Serving API for transaction categorization.
//!
//! [`Categorizer`] is the handle a request layer (HTTP or otherwise) owns and
//! passes to its handlers. It is created once at startup and never fails to
//! construct: if the model cannot be loaded it serves the "no model loaded"
//! state, where every prediction batch comes back empty.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use txcat::api::{Categorizer, CategorizerConfig};
//!
//! let categorizer = Arc::new(Categorizer::startup(
//!     CategorizerConfig::new().with_model_path("models/txcat_model.json"),
//! ));
//!
//! let labels = categorizer.predict(&["STARBUCKS #1234", "SHELL OIL 5521"]);
//! if labels.is_empty() {
//!     eprintln!("no model loaded; run `txcat train` first");
//! }
//! ```
//!
//! Predictions only read the model, so one `Arc<Categorizer>` can be shared
//! across request handlers without locking.

use std::path::PathBuf;

use crate::config::DEFAULT_MODEL_PATH;
use crate::error::Result;
use crate::model::{BackendKind, Capabilities, ModelFacade};

/// Where to find the model and which backends may load it.
#[derive(Debug, Clone)]
pub struct CategorizerConfig {
    pub model_path: PathBuf,
    pub capabilities: Capabilities,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            capabilities: Capabilities::detect(),
        }
    }
}

impl CategorizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// A label with the score the backend gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorization {
    /// Predicted label; empty when the model has no opinion
    pub label: String,
    /// Score of `label` from `predict_proba`, when the backend provides one
    pub score: Option<f64>,
}

/// Owned serving handle around an optional loaded model.
#[derive(Debug, Default)]
pub struct Categorizer {
    model: Option<ModelFacade>,
}

impl Categorizer {
    /// Load the model named by `config`, or start without one.
    ///
    /// Load failures are logged, not returned.
    pub fn startup(config: CategorizerConfig) -> Self {
        match Self::try_startup(&config) {
            Ok(categorizer) => categorizer,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %config.model_path.display(),
                    "starting without a model; run training first"
                );
                Self::unloaded()
            }
        }
    }

    /// Like [`Categorizer::startup`] but surfaces the load error.
    pub fn try_startup(config: &CategorizerConfig) -> Result<Self> {
        let model = ModelFacade::load(&config.model_path, &config.capabilities)?;
        Ok(Self::from_model(model))
    }

    pub fn from_model(model: ModelFacade) -> Self {
        Categorizer { model: Some(model) }
    }

    pub fn unloaded() -> Self {
        Categorizer { model: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.model.as_ref().map(ModelFacade::backend_kind)
    }

    pub fn model(&self) -> Option<&ModelFacade> {
        self.model.as_ref()
    }

    /// One label per text in input order, or an empty `Vec` when no model
    /// is loaded.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        match &self.model {
            Some(model) => model.predict(texts),
            None => Vec::new(),
        }
    }

    /// Labels with their scores; empty when no model is loaded.
    pub fn predict_with_scores<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Categorization> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        let labels = model.predict(texts);
        let proba = model.predict_proba(texts);

        labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let score = proba.as_ref().and_then(|rows| {
                    let column = model.labels().iter().position(|l| *l == label)?;
                    rows.get(i)?.get(column).copied()
                });
                Categorization { label, score }
            })
            .collect()
    }
}
