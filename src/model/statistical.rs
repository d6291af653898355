//! Statistical backend: TF-IDF vectorizer + linear classifier + label encoder.

use serde::{Deserialize, Serialize};

use super::envelope::ModelEnvelope;
use super::linear::{LinearClassifier, LinearLoss, SgdSettings};
use super::tfidf::TfidfVectorizer;
use super::{BackendKind, ClassifierBackend};
use crate::config::StatisticalConfig;
use crate::error::{Error, Result};

/// Maps raw labels to train-time class indices and back.
///
/// Classes are stored sorted, so index order is alphabetical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the class table and encode `labels` in one pass.
    pub fn fit_transform(labels: &[&str]) -> (Self, Vec<usize>) {
        let mut classes: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        classes.sort();
        classes.dedup();
        let encoder = LabelEncoder { classes };
        let encoded = labels
            .iter()
            .map(|l| encoder.index_of(l).unwrap_or_default())
            .collect();
        (encoder, encoded)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// TF-IDF over normalized 1–2 grams feeding an SGD-trained linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalClassifier {
    vectorizer: TfidfVectorizer,
    classifier: LinearClassifier,
    encoder: LabelEncoder,
    /// Kept with the model so a reloaded model refits the same way.
    #[serde(default)]
    sgd: SgdSettings,
}

impl StatisticalClassifier {
    pub fn new(config: &StatisticalConfig) -> Self {
        StatisticalClassifier {
            vectorizer: TfidfVectorizer::new(
                config.max_features,
                (config.ngram_min, config.ngram_max),
            ),
            classifier: LinearClassifier::new(config.loss, 0, 0),
            encoder: LabelEncoder::default(),
            sgd: SgdSettings {
                epochs: config.epochs,
                learning_rate: config.learning_rate,
                l2: config.l2,
                seed: config.seed,
            },
        }
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn loss(&self) -> LinearLoss {
        self.classifier.loss()
    }

    pub fn sgd_settings(&self) -> &SgdSettings {
        &self.sgd
    }

    /// Check that the decoded parts agree on their dimensions.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let n_features = self.vectorizer.n_features();
        if self.vectorizer.vocabulary.len() != n_features {
            return Err(format!(
                "vocabulary has {} terms but there are {n_features} idf weights",
                self.vectorizer.vocabulary.len()
            ));
        }
        if let Some((term, &idx)) = self.vectorizer.vocabulary.iter().find(|(_, &i)| i >= n_features) {
            return Err(format!("vocabulary term '{term}' has index {idx} beyond {n_features} features"));
        }
        if self.classifier.n_features() != n_features {
            return Err(format!(
                "classifier expects {} features but the vectorizer produces {n_features}",
                self.classifier.n_features()
            ));
        }
        if !self.classifier.is_consistent() {
            return Err("classifier weight rows do not match its intercepts".to_string());
        }
        if self.classifier.n_classes() != self.encoder.classes().len() {
            return Err(format!(
                "classifier has {} classes but the label encoder has {}",
                self.classifier.n_classes(),
                self.encoder.classes().len()
            ));
        }
        if self.encoder.classes().windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("label encoder classes are not sorted and unique".to_string());
        }
        Ok(())
    }
}

impl ClassifierBackend for StatisticalClassifier {
    fn kind(&self) -> BackendKind {
        BackendKind::Statistical
    }

    fn fit(&mut self, texts: &[&str], labels: &[&str]) -> Result<()> {
        if texts.len() != labels.len() {
            return Err(Error::length_mismatch(texts.len(), labels.len()));
        }

        let (encoder, targets) = LabelEncoder::fit_transform(labels);
        let mut vectorizer =
            TfidfVectorizer::new(self.vectorizer.max_features, self.vectorizer.ngram_range);
        vectorizer.fit(texts);

        let rows = vectorizer.transform_batch(texts);
        let mut classifier = LinearClassifier::new(
            self.classifier.loss(),
            encoder.classes().len(),
            vectorizer.n_features(),
        );
        classifier.fit(&rows, &targets, &self.sgd);

        self.vectorizer = vectorizer;
        self.classifier = classifier;
        self.encoder = encoder;
        Ok(())
    }

    fn predict(&self, texts: &[&str]) -> Vec<String> {
        if !self.is_trained() {
            return vec![String::new(); texts.len()];
        }
        texts
            .iter()
            .map(|text| {
                let row = self.vectorizer.transform(text);
                let idx = self.classifier.predict(&row);
                self.encoder.label_of(idx).unwrap_or_default().to_string()
            })
            .collect()
    }

    fn predict_proba(&self, texts: &[&str]) -> Option<Vec<Vec<f64>>> {
        if self.classifier.loss() == LinearLoss::Hinge {
            return None;
        }
        if !self.is_trained() {
            return Some(vec![Vec::new(); texts.len()]);
        }
        texts
            .iter()
            .map(|text| self.classifier.predict_proba(&self.vectorizer.transform(text)))
            .collect()
    }

    fn labels(&self) -> &[String] {
        self.encoder.classes()
    }

    fn to_envelope(&self) -> ModelEnvelope {
        ModelEnvelope::Statistical(Box::new(self.clone()))
    }
}
