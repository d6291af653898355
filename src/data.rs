//! Labeled transaction data loading.
//!
//! Training CSVs carry a header row. The classifier text is `merchant` and
//! `description` joined by a space (either column may be absent). The label
//! comes from `category_name` when present, otherwise `category_id`.

use csv::ReaderBuilder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Parallel training texts and labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub texts: Vec<String>,
    pub labels: Vec<String>,
}

impl TrainingSet {
    pub fn push(&mut self, text: impl Into<String>, label: impl Into<String>) {
        self.texts.push(text.into());
        self.labels.push(label.into());
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Load labeled transactions from a CSV file.
///
/// # Example
/// ```no_run
/// use txcat::data::load_transactions;
///
/// let set = load_transactions("data/labeled.csv")?;
/// println!("Loaded {} transactions", set.len());
/// # Ok::<(), txcat::error::Error>(())
/// ```
pub fn load_transactions(path: impl AsRef<Path>) -> Result<TrainingSet> {
    let file = File::open(path)?;
    read_transactions(file)
}

/// Read labeled transactions from any CSV source.
///
/// Rows with an empty label are skipped.
pub fn read_transactions<R: Read>(source: R) -> Result<TrainingSet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let merchant = column("merchant");
    let description = column("description");
    let label_col = column("category_name")
        .or_else(|| column("category_id"))
        .ok_or_else(|| Error::Data("CSV must have a category_name or category_id column".into()))?;

    let mut set = TrainingSet::default();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let label = field(Some(label_col)).trim();
        if label.is_empty() {
            skipped += 1;
            continue;
        }
        let text = format!("{} {}", field(merchant), field(description));
        set.push(text.trim(), label);
    }

    if skipped > 0 {
        tracing::warn!(skipped, "skipped rows without a category");
    }
    tracing::debug!(rows = set.len(), "loaded labeled transactions");
    Ok(set)
}

/// Shuffle with `seed` and split into train and test sets.
///
/// # Arguments
/// * `set` - The dataset to split
/// * `train_ratio` - Ratio of training data (0.0 to 1.0)
/// * `seed` - Shuffle seed, so splits are reproducible
pub fn split(set: &TrainingSet, train_ratio: f64, seed: u64) -> (TrainingSet, TrainingSet) {
    let mut indices: Vec<usize> = (0..set.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_size = (set.len() as f64 * train_ratio.clamp(0.0, 1.0)) as usize;
    let mut train = TrainingSet::default();
    let mut test = TrainingSet::default();
    for (n, &i) in indices.iter().enumerate() {
        let target = if n < train_size { &mut train } else { &mut test };
        target.push(set.texts[i].clone(), set.labels[i].clone());
    }
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_category_name() {
        let csv = "merchant,description,category_id,category_name\n\
                   Starbucks,Latte,7,dining\n\
                   Safeway,,3,groceries\n";
        let set = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(set.texts, vec!["Starbucks Latte", "Safeway"]);
        assert_eq!(set.labels, vec!["dining", "groceries"]);
    }

    #[test]
    fn test_falls_back_to_category_id() {
        let csv = "description,category_id\nMonthly rent,12\n";
        let set = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(set.texts, vec!["Monthly rent"]);
        assert_eq!(set.labels, vec!["12"]);
    }

    #[test]
    fn test_missing_label_column() {
        let csv = "merchant,description\nShell,Fuel\n";
        let err = read_transactions(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn test_skips_unlabeled_rows() {
        let csv = "merchant,category_name\nShell,fuel\nMystery,\nChevron,fuel\n";
        let set = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.texts, vec!["Shell", "Chevron"]);
    }

    #[test]
    fn test_split_is_seeded() {
        let mut set = TrainingSet::default();
        for i in 0..10 {
            set.push(format!("text {i}"), if i % 2 == 0 { "even" } else { "odd" });
        }
        let (train, test) = split(&set, 0.8, 7);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let (train_again, _) = split(&set, 0.8, 7);
        assert_eq!(train, train_again);

        for (text, label) in train.texts.iter().zip(&train.labels) {
            let i = set.texts.iter().position(|t| t == text).unwrap();
            assert_eq!(&set.labels[i], label);
        }
    }
}
