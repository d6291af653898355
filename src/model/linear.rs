//! Linear classifier trained with stochastic gradient descent.
//!
//! Operates on sparse TF-IDF rows. The logistic loss trains a multinomial
//! (softmax) model with probability estimates; the hinge loss trains
//! one-vs-rest linear SVMs, which have none.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::tfidf::SparseRow;
pub use super::LinearLoss;

/// SGD hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgdSettings {
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty, applied as weight decay once per epoch
    pub l2: f64,
    /// Seed for the per-epoch sample shuffle
    pub seed: u64,
}

impl Default for SgdSettings {
    fn default() -> Self {
        SgdSettings {
            epochs: 200,
            learning_rate: 0.5,
            l2: 1e-4,
            seed: 42,
        }
    }
}

/// Weight matrix (`classes x features`) and per-class intercepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    loss: LinearLoss,
    weights: Array2<f64>,
    intercepts: Array1<f64>,
}

impl LinearClassifier {
    pub fn new(loss: LinearLoss, n_classes: usize, n_features: usize) -> Self {
        LinearClassifier {
            loss,
            weights: Array2::zeros((n_classes, n_features)),
            intercepts: Array1::zeros(n_classes),
        }
    }

    pub fn loss(&self) -> LinearLoss {
        self.loss
    }

    pub fn n_classes(&self) -> usize {
        self.intercepts.len()
    }

    pub fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    /// Whether there is exactly one weight row per intercept.
    pub fn is_consistent(&self) -> bool {
        self.weights.nrows() == self.intercepts.len()
    }

    /// Train on sparse rows with class indices in `0..n_classes`.
    pub fn fit(&mut self, rows: &[SparseRow], targets: &[usize], settings: &SgdSettings) {
        let n_classes = self.n_classes();
        if rows.is_empty() || n_classes == 0 {
            return;
        }

        let mut rng = StdRng::seed_from_u64(settings.seed);
        let mut order: Vec<usize> = (0..rows.len()).collect();

        for epoch in 0..settings.epochs {
            order.shuffle(&mut rng);
            let eta = settings.learning_rate / (1.0 + epoch as f64 * 0.01);
            let mut total_loss = 0.0;

            for &i in &order {
                let row = &rows[i];
                let target = targets[i];
                let scores = self.decision_function(row);

                match self.loss {
                    LinearLoss::Logistic => {
                        let probs = softmax(scores.as_slice().unwrap_or(&[]));
                        total_loss -= probs[target].max(1e-15).ln();
                        for (k, &p) in probs.iter().enumerate() {
                            let grad = p - if k == target { 1.0 } else { 0.0 };
                            self.step(k, row, -eta * grad);
                        }
                    }
                    LinearLoss::Hinge => {
                        for k in 0..n_classes {
                            let y = if k == target { 1.0 } else { -1.0 };
                            let margin = y * scores[k];
                            if margin < 1.0 {
                                total_loss += 1.0 - margin;
                                self.step(k, row, eta * y);
                            }
                        }
                    }
                }
            }

            if settings.l2 > 0.0 {
                let decay = (1.0 - eta * settings.l2).max(0.0);
                self.weights.mapv_inplace(|w| w * decay);
            }

            tracing::debug!(
                epoch = epoch + 1,
                loss = total_loss / rows.len() as f64,
                "sgd epoch complete"
            );
        }
    }

    fn step(&mut self, class: usize, row: &SparseRow, scale: f64) {
        for &(j, v) in row {
            self.weights[[class, j]] += scale * v;
        }
        self.intercepts[class] += scale;
    }

    /// Per-class decision scores `W x + b`.
    pub fn decision_function(&self, row: &SparseRow) -> Array1<f64> {
        let mut scores = self.intercepts.clone();
        for (k, score) in scores.iter_mut().enumerate() {
            for &(j, v) in row {
                *score += self.weights[[k, j]] * v;
            }
        }
        scores
    }

    /// Index of the highest score; the lowest index wins ties.
    pub fn predict(&self, row: &SparseRow) -> usize {
        let scores = self.decision_function(row);
        let mut best = 0;
        for (k, &s) in scores.iter().enumerate().skip(1) {
            if s > scores[best] {
                best = k;
            }
        }
        best
    }

    /// Class probabilities, or `None` for losses without a probability model.
    pub fn predict_proba(&self, row: &SparseRow) -> Option<Vec<f64>> {
        match self.loss {
            LinearLoss::Logistic => Some(softmax(
                self.decision_function(row).as_slice().unwrap_or(&[]),
            )),
            LinearLoss::Hinge => None,
        }
    }
}

fn softmax(x: &[f64]) -> Vec<f64> {
    let max = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = x.iter().map(|&v| (v - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.iter().map(|&v| v / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> (Vec<SparseRow>, Vec<usize>) {
        let rows = vec![
            vec![(0, 1.0)],
            vec![(0, 0.8), (2, 0.6)],
            vec![(1, 1.0)],
            vec![(1, 0.6), (2, 0.8)],
        ];
        (rows, vec![0, 0, 1, 1])
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn test_logistic_separates_toy_data() {
        let (rows, targets) = toy();
        let mut clf = LinearClassifier::new(LinearLoss::Logistic, 2, 3);
        clf.fit(&rows, &targets, &SgdSettings::default());
        assert_eq!(clf.predict(&vec![(0, 1.0)]), 0);
        assert_eq!(clf.predict(&vec![(1, 1.0)]), 1);

        let proba = clf.predict_proba(&vec![(0, 1.0)]).unwrap();
        assert_eq!(proba.len(), 2);
        assert!(proba[0] > 0.5);
    }

    #[test]
    fn test_hinge_has_no_probabilities() {
        let (rows, targets) = toy();
        let mut clf = LinearClassifier::new(LinearLoss::Hinge, 2, 3);
        clf.fit(&rows, &targets, &SgdSettings::default());
        assert_eq!(clf.predict(&vec![(1, 1.0)]), 1);
        assert!(clf.predict_proba(&vec![(1, 1.0)]).is_none());
    }

    #[test]
    fn test_seeded_training_is_deterministic() {
        let (rows, targets) = toy();
        let settings = SgdSettings {
            epochs: 20,
            ..SgdSettings::default()
        };
        let mut a = LinearClassifier::new(LinearLoss::Logistic, 2, 3);
        let mut b = LinearClassifier::new(LinearLoss::Logistic, 2, 3);
        a.fit(&rows, &targets, &settings);
        b.fit(&rows, &targets, &settings);
        assert_eq!(a, b);
    }

    #[test]
    fn test_untrained_ties_resolve_to_first_class() {
        let clf = LinearClassifier::new(LinearLoss::Logistic, 3, 4);
        assert_eq!(clf.predict(&vec![]), 0);
    }
}
