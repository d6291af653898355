//! Command-line interface for txcat.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

use crate::api::{Categorizer, CategorizerConfig};
use crate::config::Config;
use crate::data;
use crate::evaluate::evaluate;
use crate::model::{BackendPreference, Capabilities};
use crate::train;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "txcat.toml";

#[derive(Debug, Parser)]
#[command(name = "txcat", version, about = "Categorize transaction descriptions")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train a model from a labeled CSV and save it
    Train {
        /// CSV with merchant, description and category_name/category_id columns
        #[arg(long)]
        csv: PathBuf,
        /// Output path (default: model.path from the config)
        #[arg(long)]
        model_out: Option<PathBuf>,
        /// auto, fallback or statistical
        #[arg(long)]
        backend: Option<BackendPreference>,
    },
    /// Predict categories for one or more texts
    Predict {
        /// Model artifact (default: model.path from the config)
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Train on a split of a labeled CSV and report held-out accuracy
    Evaluate {
        #[arg(long)]
        csv: PathBuf,
        /// Fraction of rows used for training
        #[arg(long)]
        train_split: Option<f64>,
    },
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load_or_default(cli.config.as_deref(), DEFAULT_CONFIG_FILE)?;
    let capabilities = Capabilities::detect();

    match cli.command {
        Command::Train {
            csv,
            model_out,
            backend,
        } => {
            if let Some(backend) = backend {
                config.model.backend = backend;
            }
            let out = model_out.unwrap_or_else(|| config.model.path.clone());
            let model = train::train_from_csv(&csv, &out, &config, &capabilities)?;
            println!(
                "Saved {} model ({} labels) to {}",
                model.backend_kind(),
                model.labels().len(),
                out.display()
            );
        }
        Command::Predict { model, texts } => {
            let path = model.unwrap_or_else(|| config.model.path.clone());
            let categorizer = Categorizer::try_startup(
                &CategorizerConfig::new()
                    .with_model_path(path)
                    .with_capabilities(capabilities),
            )?;
            for label in categorizer.predict(&texts) {
                println!("{}", if label.is_empty() { "<none>" } else { label.as_str() });
            }
        }
        Command::Evaluate { csv, train_split } => {
            let set = data::load_transactions(&csv)?;
            let ratio = train_split.unwrap_or(config.training.train_split);
            let (train_set, test_set) = data::split(&set, ratio, config.training.seed);
            println!("Train size: {}", train_set.len());
            println!("Test size: {}\n", test_set.len());

            let model = train::train(&train_set.texts, &train_set.labels, &config, &capabilities)?;
            println!("Backend: {}\n", model.backend_kind());
            print!("{}", evaluate(&model, &test_set));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from([
            "txcat", "train", "--csv", "data.csv", "--backend", "fallback",
        ])
        .unwrap();
        match cli.command {
            Command::Train { csv, backend, .. } => {
                assert_eq!(csv, PathBuf::from("data.csv"));
                assert_eq!(backend, Some(BackendPreference::Fallback));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_predict_requires_text() {
        assert!(Cli::try_parse_from(["txcat", "predict"]).is_err());
    }
}
