//! Error types for alphabet configuration, training and model persistence.
//!
//! Scoring never fails: unknown characters fall into the alphabet's reserved
//! bucket, so none of these errors can be produced by `get_probability`,
//! `is_gibberish` or `classify`.

use thiserror::Error;

/// Invalid configuration. Must be fixed by the caller before training.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
	/// The alphabet has no symbols
	#[error("alphabet is empty")]
	EmptyAlphabet,

	/// The same symbol appears twice in the alphabet
	#[error("alphabet contains duplicate symbol {0:?}")]
	DuplicateSymbol(char),

	/// Smoothing constant is zero, negative or not finite
	#[error("smoothing constant must be finite and > 0, got {0}")]
	InvalidSmoothing(f64),

	/// N-gram order below 2
	#[error("n-gram order must be >= 2, got {0}")]
	InvalidOrder(usize),

	/// Transition matrix would exceed the cell cap
	#[error("order {order} over {symbols} symbols needs more than {max} matrix cells")]
	ModelTooLarge { order: usize, symbols: usize, max: usize },

	/// Weight is not a finite number
	#[error("weight must be finite, got {0}")]
	InvalidWeight(f64),

	/// Threshold is not a finite number
	#[error("threshold must be finite, got {0}")]
	InvalidThreshold(f64),

	/// Two transition tables with different order or alphabet size were merged
	#[error("cannot merge transition counts of shape {left:?} with {right:?}")]
	ShapeMismatch { left: (usize, usize), right: (usize, usize) },

	/// Negative divisor is zero or not finite
	#[error("negative divisor must be finite and non-zero, got {0}")]
	InvalidDivisor(f64),
}

/// Training failed. No partial model is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
	#[error("good corpus is empty")]
	EmptyGoodCorpus,

	#[error("bad corpus is empty")]
	EmptyBadCorpus,

	#[error("training corpus is empty")]
	EmptyTrainingCorpus,

	#[error("invalid training configuration: {0}")]
	Config(#[from] ConfigError),
}

/// Loading or saving a trained model failed.
#[derive(Debug, Error)]
pub enum ModelError {
	#[error("model I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("model encoding error: {0}")]
	Codec(#[from] postcard::Error),

	#[error("unsupported model format version {found} (expected {expected})")]
	UnsupportedVersion { found: u32, expected: u32 },

	#[error("corrupt model: {0}")]
	Corrupt(String),

	#[error("invalid model configuration: {0}")]
	Config(#[from] ConfigError),
}

/// Umbrella error used by the file and config based factory.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Training(#[from] TrainingError),

	#[error(transparent)]
	Model(#[from] ModelError),

	#[error("failed to parse configuration: {0}")]
	ConfigFile(#[from] toml::de::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type for factory operations
pub type Result<T> = std::result::Result<T, Error>;
