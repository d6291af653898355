//! Single entry point for training and serving.
//!
//! [`ModelFacade`] owns one backend and exposes the same
//! `fit`/`predict`/`predict_proba`/`save`/`load` surface whichever backend
//! that is, so callers never branch on backend kind.

use std::path::Path;

use super::envelope::ModelEnvelope;
use super::fallback::FallbackClassifier;
#[cfg(feature = "statistical")]
use super::statistical::StatisticalClassifier;
use super::{BackendKind, BackendPreference, Capabilities, ClassifierBackend};
use crate::config::StatisticalConfig;
use crate::error::{Error, Result};

/// A classifier with its backend chosen at construction or load time.
#[derive(Debug)]
pub struct ModelFacade {
    backend: Box<dyn ClassifierBackend>,
}

fn as_strs<S: AsRef<str>>(items: &[S]) -> Vec<&str> {
    items.iter().map(|s| s.as_ref()).collect()
}

impl ModelFacade {
    /// Create an untrained model.
    ///
    /// `Auto` picks the statistical backend when `capabilities` allow it and
    /// the fallback otherwise. Asking for `Statistical` explicitly where it is
    /// unavailable is an error rather than a silent downgrade.
    pub fn new(
        capabilities: &Capabilities,
        preference: BackendPreference,
        settings: &StatisticalConfig,
    ) -> Result<Self> {
        let kind = Self::resolve_backend(capabilities, preference)?;
        Ok(ModelFacade {
            backend: empty_backend(kind, settings)?,
        })
    }

    /// The backend `new` would build for `preference`.
    pub fn resolve_backend(
        capabilities: &Capabilities,
        preference: BackendPreference,
    ) -> Result<BackendKind> {
        match preference {
            BackendPreference::Fallback => Ok(BackendKind::Fallback),
            BackendPreference::Auto if capabilities.supports(BackendKind::Statistical) => {
                Ok(BackendKind::Statistical)
            }
            BackendPreference::Auto => Ok(BackendKind::Fallback),
            BackendPreference::Statistical if capabilities.supports(BackendKind::Statistical) => {
                Ok(BackendKind::Statistical)
            }
            BackendPreference::Statistical => Err(Error::BackendUnavailable {
                backend: BackendKind::Statistical,
                path: None,
            }),
        }
    }

    /// An untrained fallback model.
    pub fn fallback() -> Self {
        ModelFacade {
            backend: Box::new(FallbackClassifier::new()),
        }
    }

    pub fn from_backend(backend: Box<dyn ClassifierBackend>) -> Self {
        ModelFacade { backend }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Known labels, in `predict_proba` column order.
    pub fn labels(&self) -> &[String] {
        self.backend.labels()
    }

    pub fn is_trained(&self) -> bool {
        self.backend.is_trained()
    }

    /// Train on parallel texts and labels, replacing any previous state.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTrainingInput`] if the lengths differ; the model is
    /// left untouched.
    pub fn fit<S: AsRef<str>, L: AsRef<str>>(&mut self, texts: &[S], labels: &[L]) -> Result<()> {
        if texts.len() != labels.len() {
            return Err(Error::length_mismatch(texts.len(), labels.len()));
        }
        self.backend.fit(&as_strs(texts), &as_strs(labels))?;
        tracing::info!(
            backend = %self.backend_kind(),
            documents = texts.len(),
            labels = self.labels().len(),
            "model trained"
        );
        Ok(())
    }

    /// One label per input text, in order; `""` where the model has no opinion.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }
        self.backend.predict(&as_strs(texts))
    }

    /// Per-text scores aligned with [`ModelFacade::labels`]; `None` when the
    /// backend has no probability estimate.
    pub fn predict_proba<S: AsRef<str>>(&self, texts: &[S]) -> Option<Vec<Vec<f64>>> {
        self.backend.predict_proba(&as_strs(texts))
    }

    /// Persist the model as a self-describing envelope at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.backend.to_envelope().write(path)?;
        tracing::info!(backend = %self.backend_kind(), path = %path.display(), "model saved");
        Ok(())
    }

    /// Load the model saved at `path`, rebuilding the backend it names.
    ///
    /// # Errors
    ///
    /// [`Error::ModelNotFound`], [`Error::ModelLoad`], or
    /// [`Error::BackendUnavailable`] when `capabilities` cannot load the
    /// artifact's backend.
    pub fn load(path: impl AsRef<Path>, capabilities: &Capabilities) -> Result<Self> {
        let path = path.as_ref();
        let envelope = ModelEnvelope::read(path, capabilities)?;
        let facade = ModelFacade {
            backend: envelope.into_backend(),
        };
        tracing::info!(
            backend = %facade.backend_kind(),
            labels = facade.labels().len(),
            path = %path.display(),
            "model loaded"
        );
        Ok(facade)
    }
}

#[cfg(feature = "statistical")]
fn empty_backend(kind: BackendKind, settings: &StatisticalConfig) -> Result<Box<dyn ClassifierBackend>> {
    let backend: Box<dyn ClassifierBackend> = match kind {
        BackendKind::Fallback => Box::new(FallbackClassifier::new()),
        BackendKind::Statistical => Box::new(StatisticalClassifier::new(settings)),
    };
    Ok(backend)
}

#[cfg(not(feature = "statistical"))]
fn empty_backend(kind: BackendKind, _settings: &StatisticalConfig) -> Result<Box<dyn ClassifierBackend>> {
    let backend: Box<dyn ClassifierBackend> = match kind {
        BackendKind::Fallback => Box::new(FallbackClassifier::new()),
        BackendKind::Statistical => {
            return Err(Error::BackendUnavailable {
                backend: BackendKind::Statistical,
                path: None,
            })
        }
    };
    Ok(backend)
}
