//! Training pipeline: labeled data in, saved artifact out.

use std::path::Path;

use crate::config::Config;
use crate::data::{self, TrainingSet};
use crate::error::Result;
use crate::model::{Capabilities, ModelFacade};

/// Train a model on parallel texts and labels using `config`.
///
/// The backend follows `config.model.backend`, resolved against
/// `capabilities`.
pub fn train<S: AsRef<str>, L: AsRef<str>>(
    texts: &[S],
    labels: &[L],
    config: &Config,
    capabilities: &Capabilities,
) -> Result<ModelFacade> {
    let mut model = ModelFacade::new(capabilities, config.model.backend, &config.statistical)?;
    model.fit(texts, labels)?;
    Ok(model)
}

/// Train and write the artifact to `path`.
pub fn train_and_save<S: AsRef<str>, L: AsRef<str>>(
    texts: &[S],
    labels: &[L],
    path: impl AsRef<Path>,
    config: &Config,
    capabilities: &Capabilities,
) -> Result<ModelFacade> {
    let model = train(texts, labels, config, capabilities)?;
    model.save(path)?;
    Ok(model)
}

/// Train on a labeled CSV and save to `path`.
pub fn train_from_csv(
    csv_path: impl AsRef<Path>,
    path: impl AsRef<Path>,
    config: &Config,
    capabilities: &Capabilities,
) -> Result<ModelFacade> {
    let TrainingSet { texts, labels } = data::load_transactions(csv_path)?;
    train_and_save(&texts, &labels, path, config, capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BackendKind, BackendPreference};
    use tempfile::tempdir;

    #[test]
    fn test_train_from_csv_with_fallback() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("labeled.csv");
        std::fs::write(
            &csv,
            "merchant,description,category_name\n\
             Starbucks,coffee,dining\n\
             Blue Bottle,coffee,dining\n\
             Safeway,weekly groceries,groceries\n",
        )
        .unwrap();
        let out = dir.path().join("models").join("model.json");

        let mut config = Config::default();
        config.model.backend = BackendPreference::Fallback;
        let model = train_from_csv(&csv, &out, &config, &Capabilities::detect()).unwrap();
        assert_eq!(model.backend_kind(), BackendKind::Fallback);
        assert!(out.exists());

        let loaded = ModelFacade::load(&out, &Capabilities::fallback_only()).unwrap();
        assert_eq!(loaded.predict(&["starbucks"]), vec!["dining"]);
        assert_eq!(loaded.predict(&["safeway"]), vec!["groceries"]);
    }

    #[test]
    fn test_train_rejects_mismatched_input() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("model.json");
        let result = train_and_save(
            &["a", "b"],
            &["x"],
            &out,
            &Config::default(),
            &Capabilities::fallback_only(),
        );
        assert!(result.is_err());
        assert!(!out.exists());
    }
}
