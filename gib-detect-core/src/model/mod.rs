//! Markov-chain gibberish detection.
//!
//! - Symbol tables with a reserved unknown bucket (`Alphabet`)
//! - Smoothed n-gram transition matrices (`TransitionModel`)
//! - Threshold calibration from good/bad corpora (`Trainer`)
//! - Scoring and classification (`Detector`)
//! - Positive/negative detector combination (`CompositeClassifier`)

/// Ordered symbol set mapping characters to matrix indices.
pub mod alphabet;

/// Scoring strategy (n-gram order, smoothing constant).
pub mod strategy;

/// Raw transition counts and parallel corpus counting.
///
/// Counts are merged the same way regardless of how the corpus was split.
pub mod counts;

/// Smoothed log-probability matrix and length-normalized scoring.
pub mod transition;

/// Builds detectors from labelled corpora and calibrates their threshold.
pub mod trainer;

/// Trained, immutable detector with threshold, weight and binary persistence.
pub mod detector;

/// Weighted combination of a positive and a negative detector.
pub mod composite;

/// Builds detectors and classifiers from files and configuration,
/// with an on-disk model cache.
pub mod factory;
