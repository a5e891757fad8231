//! Markov-chain gibberish detection library.
//!
//! This crate decides whether a string is plausible text for a configured
//! alphabet or random / structurally anomalous characters, including:
//! - Character-level n-gram transition models with additive smoothing
//! - Threshold calibration against good and bad example corpora
//! - A composite classifier pairing a language model with a junk-pattern model
//! - Versioned binary model persistence and TOML configuration
//!
//! Training is a one-shot batch step. Trained detectors are immutable and
//! can be shared across threads for scoring.

/// Alphabets, transition models, training, detectors and classifiers.
pub mod model;

/// TOML configuration of detectors and composite classifiers.
pub mod config;

/// Error types.
pub mod error;

/// I/O utilities (corpus and alphabet loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{ConfigError, Error, ModelError, TrainingError};
pub use model::alphabet::{Alphabet, CaseFolding};
pub use model::composite::{CompositeClassifier, Verdict};
pub use model::detector::{Detector, ScoredString};
pub use model::strategy::ScoringStrategy;
pub use model::trainer::{ThresholdPolicy, Trainer};
pub use model::transition::TransitionModel;
