//! Model evaluation and results reporting.

use std::collections::BTreeMap;
use std::fmt;

use crate::data::TrainingSet;
use crate::model::ModelFacade;

/// Support and hits for one label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelReport {
    pub support: usize,
    pub correct: usize,
}

/// Accuracy of a model on a labeled set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// Predictions with no opinion (empty label)
    pub unscored: usize,
    pub per_label: BTreeMap<String, LabelReport>,
}

/// Fraction of predictions equal to their label; 0.0 for empty input.
pub fn accuracy(predictions: &[String], labels: &[String]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();
    correct as f64 / labels.len() as f64
}

/// Predict every text of `test` and compare with its label.
pub fn evaluate(model: &ModelFacade, test: &TrainingSet) -> EvaluationReport {
    let predictions = model.predict(&test.texts);

    let mut report = EvaluationReport {
        total: test.len(),
        accuracy: accuracy(&predictions, &test.labels),
        ..EvaluationReport::default()
    };
    for (pred, label) in predictions.iter().zip(&test.labels) {
        let entry = report.per_label.entry(label.clone()).or_default();
        entry.support += 1;
        if pred == label {
            entry.correct += 1;
            report.correct += 1;
        }
        if pred.is_empty() {
            report.unscored += 1;
        }
    }
    report
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Accuracy: {:.2}% ({}/{})",
            self.accuracy * 100.0,
            self.correct,
            self.total
        )?;
        if self.unscored > 0 {
            writeln!(f, "Unscored: {}", self.unscored)?;
        }
        writeln!(f, "\nPer label:")?;
        for (label, stats) in &self.per_label {
            let acc = stats.correct as f64 / stats.support.max(1) as f64;
            writeln!(
                f,
                "  {:<24} {:>6.2}%  ({}/{})",
                label,
                acc * 100.0,
                stats.correct,
                stats.support
            )?;
        }
        Ok(())
    }
}
