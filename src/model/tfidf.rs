//! TF-IDF (Term Frequency-Inverse Document Frequency) vectorizer.
//!
//! Converts transaction text into sparse, L2-normalized feature rows for the
//! statistical backend. Text is passed through [`normalize`](crate::normalize)
//! before n-gram extraction.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::normalize;

/// A sparse feature row: `(feature index, value)` pairs sorted by index.
pub type SparseRow = Vec<(usize, f64)>;

/// TF-IDF vectorizer for converting text to numerical features.
///
/// This implementation:
/// - Extracts word n-grams in `ngram_range` (bigrams joined with a space)
/// - Keeps the `max_features` most frequent terms (ties alphabetical)
/// - Uses smoothed IDF, `ln((1 + n) / (1 + df)) + 1`
/// - L2-normalizes each row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term to feature index mapping
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency for each feature
    pub idf: Vec<f64>,
    /// Maximum number of features to keep
    pub max_features: usize,
    /// Inclusive n-gram size range
    pub ngram_range: (usize, usize),
}

impl TfidfVectorizer {
    /// Create a new TF-IDF vectorizer.
    ///
    /// # Arguments
    ///
    /// * `max_features` - Maximum number of terms to keep
    /// * `ngram_range` - Smallest and largest n-gram size; clamped to at least 1
    pub fn new(max_features: usize, ngram_range: (usize, usize)) -> Self {
        let min_n = ngram_range.0.max(1);
        TfidfVectorizer {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            max_features,
            ngram_range: (min_n, ngram_range.1.max(min_n)),
        }
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    fn terms(&self, document: &str) -> Vec<String> {
        let words = normalize::tokens(document);
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > words.len() {
                break;
            }
            for window in words.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Fit the vectorizer on a collection of documents.
    ///
    /// This builds the vocabulary and calculates IDF values, replacing any
    /// previous fit.
    pub fn fit(&mut self, documents: &[&str]) {
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.terms(doc);
            let unique: BTreeSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        // Select top max_features by corpus frequency
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        // Feature indices follow alphabetical term order
        let mut selected: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort();

        let n_docs = documents.len() as f64;
        self.vocabulary.clear();
        self.idf = Vec::with_capacity(selected.len());
        for (idx, term) in selected.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0) as f64;
            self.idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            self.vocabulary.insert(term, idx);
        }
    }

    /// Transform a document into a sparse TF-IDF row.
    ///
    /// Out-of-vocabulary terms are ignored; a document with no known terms
    /// yields an empty row.
    pub fn transform(&self, document: &str) -> SparseRow {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.terms(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        row.sort_by_key(|&(idx, _)| idx);

        let norm = row.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut row {
                *v /= norm;
            }
        }
        row
    }

    pub fn transform_batch(&self, documents: &[&str]) -> Vec<SparseRow> {
        documents.iter().map(|d| self.transform(d)).collect()
    }
}
