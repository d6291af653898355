//! # txcat - Transaction Categorizer
//!
//! Classifies free-text transaction descriptions (merchant + memo) into
//! category labels, with a model format that stays readable across builds.
//!
//! ## Features
//!
//! - **Two backends, one contract**: a TF-IDF + linear classifier pipeline
//!   and a dependency-free token-frequency fallback, both behind
//!   [`model::ClassifierBackend`]
//! - **Self-describing artifacts**: one versioned JSON envelope that names
//!   its backend; fallback models load in any build
//! - **Predictable failures**: missing, unreadable and incompatible artifacts
//!   are distinct [`error::Error`] variants
//! - **Degrading serving handle**: [`api::Categorizer`] serves an empty result
//!   instead of failing when no model could be loaded
//!
//! ## Quick Start
//!
//! ```no_run
//! use txcat::config::Config;
//! use txcat::model::{Capabilities, ModelFacade};
//! use txcat::train::train_and_save;
//!
//! let texts = ["STARBUCKS #1234", "BLUE BOTTLE COFFEE", "SAFEWAY 0042"];
//! let labels = ["dining", "dining", "groceries"];
//!
//! let caps = Capabilities::detect();
//! train_and_save(&texts, &labels, "models/txcat_model.json", &Config::default(), &caps)?;
//!
//! let model = ModelFacade::load("models/txcat_model.json", &caps)?;
//! println!("{:?}", model.predict(&["starbucks reserve"]));
//! # Ok::<(), txcat::error::Error>(())
//! ```
//!
//! ## Cargo Features
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `cli` | `txcat` binary (train / predict / evaluate) | ✓ |
//! | `statistical` | TF-IDF + linear backend (pulls in `ndarray`) | ✓ |
//!
//! Without `statistical`, new models use the fallback backend and artifacts
//! saved by the statistical backend fail to load with
//! [`error::Error::BackendUnavailable`].
//!
//! ## Command Line
//!
//! ```bash
//! txcat train --csv data/labeled.csv --model-out models/txcat_model.json
//! txcat predict "STARBUCKS #1234" "SHELL OIL 5521"
//! txcat evaluate --csv data/labeled.csv --train-split 0.8
//! ```
//!
//! Set `RUST_LOG=debug` for per-epoch training logs.

// Public API modules
pub mod api;
pub mod config;
pub mod error;

// Core modules
pub mod data;
pub mod evaluate;
pub mod model;
pub mod normalize;
pub mod train;

#[cfg(feature = "cli")]
pub mod cli;

pub use api::Categorizer;
pub use error::{Error, Result};
pub use model::{BackendKind, Capabilities, ModelFacade};
pub use normalize::normalize;
