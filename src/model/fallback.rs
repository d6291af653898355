//! Frequency-based fallback classifier.
//!
//! Scores each label as its document prior plus, for every query token, the
//! number of training documents of that label containing the token. Needs no
//! numeric library, so any build can train it and read its artifacts.
//!
//! The score is not length-normalized: longer queries collect
//! larger raw scores. `predict_proba` divides by the score sum (or by 1.0 when
//! the sum is zero), so its rows are rankings rather than calibrated
//! probabilities.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::envelope::ModelEnvelope;
use super::{BackendKind, ClassifierBackend};
use crate::error::{Error, Result};
use crate::normalize;

/// Per-label training statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelStatistics {
    /// Training documents carrying this label.
    pub document_count: u64,
    /// Token -> training documents of this label containing the token.
    pub token_doc_frequency: BTreeMap<String, u64>,
}

/// Token-overlap + label-prior classifier.
///
/// The classifier owns all statistics; they are only written by `fit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackClassifier {
    /// Labels in first-seen training order; ties resolve to the earliest.
    labels: Vec<String>,
    label_stats: BTreeMap<String, LabelStatistics>,
    total_documents: u64,
}

impl FallbackClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_documents(&self) -> u64 {
        self.total_documents
    }

    pub fn statistics(&self, label: &str) -> Option<&LabelStatistics> {
        self.label_stats.get(label)
    }

    fn observe(&mut self, text: &str, label: &str) {
        if !self.label_stats.contains_key(label) {
            self.labels.push(label.to_string());
        }
        let stats = self.label_stats.entry(label.to_string()).or_default();
        stats.document_count += 1;
        for token in normalize::unique_tokens(text) {
            *stats.token_doc_frequency.entry(token).or_insert(0) += 1;
        }
        self.total_documents += 1;
    }

    /// `document_count / max(1, total_documents)`; 0.0 for unknown labels.
    pub fn prior(&self, label: &str) -> f64 {
        let count = self
            .label_stats
            .get(label)
            .map(|s| s.document_count)
            .unwrap_or(0);
        count as f64 / self.total_documents.max(1) as f64
    }

    /// Prior plus the label's document frequency of each query token.
    ///
    /// Every occurrence of a token in `tokens` contributes.
    pub fn score(&self, tokens: &[String], label: &str) -> f64 {
        let mut score = self.prior(label);
        if let Some(stats) = self.label_stats.get(label) {
            for token in tokens {
                score += stats.token_doc_frequency.get(token).copied().unwrap_or(0) as f64;
            }
        }
        score
    }

    /// Raw scores for every label, or `None` when the text is unscorable.
    fn label_scores(&self, text: &str) -> Option<Vec<f64>> {
        let tokens = normalize::tokens(text);
        if tokens.is_empty() || self.labels.is_empty() {
            return None;
        }
        Some(self.labels.iter().map(|l| self.score(&tokens, l)).collect())
    }

    /// Check the invariants of a decoded payload.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for label in &self.labels {
            if !seen.insert(label.as_str()) {
                return Err(format!("label '{label}' listed twice"));
            }
            if !self.label_stats.contains_key(label) {
                return Err(format!("label '{label}' has no statistics"));
            }
        }
        if let Some(orphan) = self.label_stats.keys().find(|k| !seen.contains(k.as_str())) {
            return Err(format!("statistics for unknown label '{orphan}'"));
        }

        let sum: u64 = self.label_stats.values().map(|s| s.document_count).sum();
        if sum != self.total_documents {
            return Err(format!(
                "total_documents is {} but label document counts sum to {sum}",
                self.total_documents
            ));
        }
        for (label, stats) in &self.label_stats {
            if let Some((token, freq)) = stats
                .token_doc_frequency
                .iter()
                .find(|(_, &f)| f > stats.document_count)
            {
                return Err(format!(
                    "token '{token}' appears in {freq} documents of '{label}', which only has {}",
                    stats.document_count
                ));
            }
        }
        Ok(())
    }
}

impl ClassifierBackend for FallbackClassifier {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn fit(&mut self, texts: &[&str], labels: &[&str]) -> Result<()> {
        if texts.len() != labels.len() {
            return Err(Error::length_mismatch(texts.len(), labels.len()));
        }
        let mut fresh = FallbackClassifier::new();
        for (text, label) in texts.iter().zip(labels) {
            fresh.observe(text, label);
        }
        *self = fresh;
        Ok(())
    }

    fn predict(&self, texts: &[&str]) -> Vec<String> {
        texts
            .iter()
            .map(|text| {
                let Some(scores) = self.label_scores(text) else {
                    return String::new();
                };
                let mut best = 0;
                for (i, &score) in scores.iter().enumerate().skip(1) {
                    if score > scores[best] {
                        best = i;
                    }
                }
                self.labels[best].clone()
            })
            .collect()
    }

    fn predict_proba(&self, texts: &[&str]) -> Option<Vec<Vec<f64>>> {
        let rows = texts
            .iter()
            .map(|text| match self.label_scores(text) {
                Some(scores) => {
                    let sum: f64 = scores.iter().sum();
                    let denom = if sum == 0.0 { 1.0 } else { sum };
                    scores.iter().map(|s| s / denom).collect()
                }
                None => Vec::new(),
            })
            .collect();
        Some(rows)
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn to_envelope(&self) -> ModelEnvelope {
        ModelEnvelope::Fallback(self.clone())
    }
}
