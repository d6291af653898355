//! Versioned, self-describing model artifact.
//!
//! Every artifact is one JSON document:
//!
//! ```json
//! { "format_version": 1, "backend": "fallback", "payload": { ... } }
//! ```
//!
//! `backend` is mandatory and decides how `payload` is decoded. A fallback
//! payload is plain structured data, so any build can read it. A statistical
//! payload is only decoded when the statistical backend is available; if it is
//! not, loading fails with [`Error::BackendUnavailable`] rather than handing
//! the state to a backend that cannot interpret it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::fallback::FallbackClassifier;
#[cfg(feature = "statistical")]
use super::statistical::StatisticalClassifier;
use super::{BackendKind, Capabilities, ClassifierBackend};
use crate::error::{Error, Result};

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

/// A trained model's state, tagged with its backend.
#[derive(Debug, Clone)]
pub enum ModelEnvelope {
    Fallback(FallbackClassifier),
    #[cfg(feature = "statistical")]
    Statistical(Box<StatisticalClassifier>),
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T: Serialize> {
    format_version: u32,
    backend: BackendKind,
    payload: &'a T,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    format_version: u32,
    backend: BackendKind,
    payload: serde_json::Value,
}

impl ModelEnvelope {
    pub fn kind(&self) -> BackendKind {
        match self {
            ModelEnvelope::Fallback(_) => BackendKind::Fallback,
            #[cfg(feature = "statistical")]
            ModelEnvelope::Statistical(_) => BackendKind::Statistical,
        }
    }

    pub fn into_backend(self) -> Box<dyn ClassifierBackend> {
        match self {
            ModelEnvelope::Fallback(model) => Box::new(model),
            #[cfg(feature = "statistical")]
            ModelEnvelope::Statistical(model) => model,
        }
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            ModelEnvelope::Fallback(model) => serde_json::to_string_pretty(&EnvelopeOut {
                format_version: FORMAT_VERSION,
                backend: BackendKind::Fallback,
                payload: model,
            })?,
            #[cfg(feature = "statistical")]
            ModelEnvelope::Statistical(model) => serde_json::to_string_pretty(&EnvelopeOut {
                format_version: FORMAT_VERSION,
                backend: BackendKind::Statistical,
                payload: model.as_ref(),
            })?,
        };
        Ok(json)
    }

    /// Write the artifact to `path`, creating parent directories.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read and decode the artifact at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::ModelNotFound`] if nothing exists at `path`
    /// - [`Error::ModelLoad`] if the file is not a valid envelope
    /// - [`Error::BackendUnavailable`] if `capabilities` cannot load its backend
    pub fn read(path: impl AsRef<Path>, capabilities: &Capabilities) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ModelNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| Error::model_load(path, e))?;
        Self::decode(path, &text, capabilities)
    }

    fn decode(path: &Path, text: &str, capabilities: &Capabilities) -> Result<Self> {
        let raw: EnvelopeIn = serde_json::from_str(text).map_err(|e| Error::model_load(path, e))?;
        if raw.format_version != FORMAT_VERSION {
            return Err(Error::model_load(
                path,
                format!(
                    "unsupported format_version {} (this build reads {FORMAT_VERSION})",
                    raw.format_version
                ),
            ));
        }

        match raw.backend {
            BackendKind::Fallback => {
                let model: FallbackClassifier = serde_json::from_value(raw.payload)
                    .map_err(|e| Error::model_load(path, e))?;
                model
                    .validate()
                    .map_err(|reason| Error::model_load(path, reason))?;
                Ok(ModelEnvelope::Fallback(model))
            }
            BackendKind::Statistical => decode_statistical(path, raw.payload, capabilities),
        }
    }
}

fn statistical_unavailable(path: &Path) -> Error {
    Error::BackendUnavailable {
        backend: BackendKind::Statistical,
        path: Some(path.to_path_buf()),
    }
}

#[cfg(feature = "statistical")]
fn decode_statistical(
    path: &Path,
    payload: serde_json::Value,
    capabilities: &Capabilities,
) -> Result<ModelEnvelope> {
    if !capabilities.supports(BackendKind::Statistical) {
        return Err(statistical_unavailable(path));
    }
    let model: StatisticalClassifier =
        serde_json::from_value(payload).map_err(|e| Error::model_load(path, e))?;
    model
        .validate()
        .map_err(|reason| Error::model_load(path, reason))?;
    Ok(ModelEnvelope::Statistical(Box::new(model)))
}

#[cfg(not(feature = "statistical"))]
fn decode_statistical(
    path: &Path,
    _payload: serde_json::Value,
    _capabilities: &Capabilities,
) -> Result<ModelEnvelope> {
    Err(statistical_unavailable(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fallback_model() -> FallbackClassifier {
        let mut model = FallbackClassifier::new();
        model
            .fit(
                &["coffee shop", "coffee shop", "grocery store"],
                &["dining", "dining", "groceries"],
            )
            .unwrap();
        model
    }

    #[test]
    fn test_fallback_roundtrip_without_statistical_capability() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let model = fallback_model();
        model.to_envelope().write(&path).unwrap();

        let loaded = ModelEnvelope::read(&path, &Capabilities::fallback_only()).unwrap();
        assert_eq!(loaded.kind(), BackendKind::Fallback);
        let backend = loaded.into_backend();
        let queries = ["coffee", "xyzzy unseen", "grocery", "", "store shop"];
        assert_eq!(backend.predict(&queries), model.predict(&queries));
        assert_eq!(backend.labels(), model.labels());
    }

    #[test]
    fn test_artifact_is_self_describing() {
        let json = fallback_model().to_envelope().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format_version"], 1);
        assert_eq!(value["backend"], "fallback");
        assert_eq!(value["payload"]["labels"][0], "dining");
        assert_eq!(value["payload"]["total_documents"], 3);
    }

    #[test]
    fn test_statistical_envelope_needs_capability() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stat.json");
        fs::write(
            &path,
            r#"{"format_version":1,"backend":"statistical","payload":{"weights":[]}}"#,
        )
        .unwrap();

        let err = ModelEnvelope::read(&path, &Capabilities::fallback_only()).unwrap_err();
        match err {
            Error::BackendUnavailable { backend, path: Some(p) } => {
                assert_eq!(backend, BackendKind::Statistical);
                assert_eq!(p, path);
            }
            other => panic!("expected BackendUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = ModelEnvelope::read(dir.path().join("absent.json"), &Capabilities::detect())
            .unwrap_err();
        assert!(matches!(err, Error::ModelNotFound { .. }));
    }

    #[test]
    fn test_unreadable_artifacts() {
        let dir = tempdir().unwrap();
        let cases = [
            ("garbage.json", "\u{0}\u{1} not json"),
            ("no_tag.json", r#"{"format_version":1,"payload":{}}"#),
            ("unknown_tag.json", r#"{"format_version":1,"backend":"xgboost","payload":{}}"#),
            ("future.json", r#"{"format_version":7,"backend":"fallback","payload":{}}"#),
            ("bad_payload.json", r#"{"format_version":1,"backend":"fallback","payload":[1,2]}"#),
            (
                "bad_counts.json",
                r#"{"format_version":1,"backend":"fallback","payload":{"labels":["a"],
                   "label_stats":{"a":{"document_count":1,"token_doc_frequency":{}}},
                   "total_documents":4}}"#,
            ),
        ];
        for (name, content) in cases {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            let err = ModelEnvelope::read(&path, &Capabilities::detect()).unwrap_err();
            match err {
                Error::ModelLoad { path: p, .. } => assert_eq!(p, path, "{name}"),
                other => panic!("{name}: expected ModelLoad, got {other:?}"),
            }
        }
    }

    #[cfg(feature = "statistical")]
    #[test]
    fn test_malformed_statistical_payloads() {
        use serde_json::json;

        fn payload(
            vocabulary: serde_json::Value,
            idf: Vec<f64>,
            rows: usize,
            cols: usize,
            classes: &[&str],
            intercepts: usize,
        ) -> serde_json::Value {
            json!({
                "format_version": 1,
                "backend": "statistical",
                "payload": {
                    "vectorizer": {
                        "vocabulary": vocabulary,
                        "idf": idf,
                        "max_features": 100,
                        "ngram_range": [1, 2]
                    },
                    "classifier": {
                        "loss": "logistic",
                        "weights": {"v": 1, "dim": [rows, cols], "data": vec![0.0; rows * cols]},
                        "intercepts": {"v": 1, "dim": [intercepts], "data": vec![0.0; intercepts]}
                    },
                    "encoder": {"classes": classes}
                }
            })
        }

        let dir = tempdir().unwrap();
        let cases = [
            ("rows_vs_intercepts", payload(json!({"coffee": 0}), vec![1.0], 1, 1, &["a", "b"], 2)),
            ("classes_vs_model", payload(json!({"coffee": 0}), vec![1.0], 2, 1, &["a", "b", "c"], 2)),
            ("features_vs_vectorizer", payload(json!({"coffee": 0}), vec![1.0], 2, 3, &["a", "b"], 2)),
            ("vocabulary_vs_idf", payload(json!({"coffee": 0}), vec![1.0, 1.0], 2, 2, &["a", "b"], 2)),
            ("index_out_of_range", payload(json!({"coffee": 5}), vec![1.0], 2, 1, &["a", "b"], 2)),
            ("unsorted_classes", payload(json!({"coffee": 0}), vec![1.0], 2, 1, &["b", "a"], 2)),
        ];
        for (name, artifact) in cases {
            let path = dir.path().join(format!("{name}.json"));
            fs::write(&path, artifact.to_string()).unwrap();
            let err = ModelEnvelope::read(&path, &Capabilities::detect()).unwrap_err();
            match err {
                Error::ModelLoad { path: p, .. } => assert_eq!(p, path, "{name}"),
                other => panic!("{name}: expected ModelLoad, got {other:?}"),
            }
        }

        let valid = dir.path().join("valid.json");
        let artifact = payload(json!({"coffee": 0}), vec![1.0], 2, 1, &["a", "b"], 2);
        fs::write(&valid, artifact.to_string()).unwrap();
        let backend = ModelEnvelope::read(&valid, &Capabilities::detect()).unwrap().into_backend();
        assert_eq!(backend.predict(&["coffee"]), vec!["a"]);
    }

    #[cfg(feature = "statistical")]
    #[test]
    fn test_statistical_roundtrip() {
        use crate::config::StatisticalConfig;

        let dir = tempdir().unwrap();
        let path = dir.path().join("stat.json");
        let mut model = StatisticalClassifier::new(&StatisticalConfig {
            epochs: 30,
            ..StatisticalConfig::default()
        });
        model
            .fit(
                &["peets coffee", "blue bottle coffee", "safeway market", "whole foods market"],
                &["dining", "dining", "groceries", "groceries"],
            )
            .unwrap();
        model.to_envelope().write(&path).unwrap();

        let loaded = ModelEnvelope::read(&path, &Capabilities::detect()).unwrap();
        assert_eq!(loaded.kind(), BackendKind::Statistical);
        let backend = loaded.into_backend();
        let queries = ["coffee", "market", "unknown words"];
        assert_eq!(backend.predict(&queries), model.predict(&queries));

        let err = ModelEnvelope::read(&path, &Capabilities::fallback_only()).unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable { .. }));
    }
}
