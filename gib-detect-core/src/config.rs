//! TOML configuration for detectors and composite classifiers.
//!
//! ```toml
//! negative_divisor = 2.0
//!
//! [positive]
//! alphabet_file = "en-alphabet.txt"
//! case_folding = "lowercase"
//! training_file = "en-training.txt"
//! good_file = "en-good.txt"
//! bad_file = "en-bad.txt"
//!
//! [negative]
//! alphabet = " abcdefghijklmnopqrstuvwxyz0123456789@.:/"
//! good_file = "keyboard-junk.txt"
//! bad_file = "keyboard-names.txt"
//! weight = 1.0
//! ```
//!
//! Relative paths are resolved against the configuration file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::io;
use crate::model::alphabet::{Alphabet, CaseFolding};
use crate::model::composite::DEFAULT_NEGATIVE_DIVISOR;
use crate::model::strategy::ScoringStrategy;
use crate::model::trainer::{ThresholdPolicy, Trainer};

fn default_order() -> usize {
	ScoringStrategy::default().order
}

fn default_smoothing_k() -> f64 {
	ScoringStrategy::default().smoothing_k
}

fn default_weight() -> f64 {
	1.0
}

fn default_negative_divisor() -> f64 {
	DEFAULT_NEGATIVE_DIVISOR
}

fn default_cache() -> bool {
	true
}

/// Configuration of a single detector.
///
/// The alphabet is given either inline (`alphabet`) or as a file
/// (`alphabet_file`). When `training_file` is missing the model is trained
/// on `good_file`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectorConfig {
	#[serde(default)]
	pub alphabet: Option<String>,
	#[serde(default)]
	pub alphabet_file: Option<PathBuf>,
	#[serde(default)]
	pub case_folding: CaseFolding,
	#[serde(default = "default_order")]
	pub order: usize,
	#[serde(default = "default_smoothing_k")]
	pub smoothing_k: f64,
	#[serde(default)]
	pub threshold_policy: ThresholdPolicy,
	#[serde(default = "default_weight")]
	pub weight: f64,
	#[serde(default)]
	pub training_file: Option<PathBuf>,
	pub good_file: PathBuf,
	pub bad_file: PathBuf,
	/// Reuse (and write) a `<training stem>.bin` model next to the training file.
	#[serde(default = "default_cache")]
	pub cache: bool,
}

impl DetectorConfig {
	/// Minimal configuration with an inline alphabet and default settings.
	pub fn new(alphabet: impl Into<String>, good_file: impl Into<PathBuf>, bad_file: impl Into<PathBuf>) -> Self {
		Self {
			alphabet: Some(alphabet.into()),
			alphabet_file: None,
			case_folding: CaseFolding::default(),
			order: default_order(),
			smoothing_k: default_smoothing_k(),
			threshold_policy: ThresholdPolicy::default(),
			weight: default_weight(),
			training_file: None,
			good_file: good_file.into(),
			bad_file: bad_file.into(),
			cache: default_cache(),
		}
	}

	pub fn strategy(&self) -> ScoringStrategy {
		ScoringStrategy { order: self.order, smoothing_k: self.smoothing_k }
	}

	/// File the model is trained on.
	pub fn training_path(&self) -> &Path {
		self.training_file.as_deref().unwrap_or(self.good_file.as_path())
	}

	/// Loads the alphabet (inline or from file) with the configured case folding.
	///
	/// # Errors
	/// - `ConfigError::EmptyAlphabet` if neither source is set
	/// - I/O errors reading `alphabet_file`
	/// - `ConfigError` for an invalid alphabet
	pub fn load_alphabet(&self) -> Result<Alphabet> {
		let charset = match (&self.alphabet, &self.alphabet_file) {
			(Some(inline), _) => inline.clone(),
			(None, Some(path)) => io::read_alphabet(path)?,
			(None, None) => return Err(ConfigError::EmptyAlphabet.into()),
		};
		Ok(charset.parse::<Alphabet>()?.with_case_folding(self.case_folding))
	}

	/// Trainer configured from this section.
	pub fn trainer(&self) -> Result<Trainer> {
		Ok(Trainer::new(self.load_alphabet()?)
			.with_strategy(self.strategy())
			.with_threshold_policy(self.threshold_policy)
			.with_weight(self.weight))
	}

	/// Makes every relative path absolute against `base`.
	pub fn resolve_paths(&mut self, base: &Path) {
		if let Some(path) = self.alphabet_file.as_mut() {
			*path = io::resolve_path(base, path);
		}
		if let Some(path) = self.training_file.as_mut() {
			*path = io::resolve_path(base, path);
		}
		self.good_file = io::resolve_path(base, &self.good_file);
		self.bad_file = io::resolve_path(base, &self.bad_file);
	}
}

/// Configuration of a positive/negative detector pair.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CompositeConfig {
	pub positive: DetectorConfig,
	pub negative: DetectorConfig,
	#[serde(default = "default_negative_divisor")]
	pub negative_divisor: f64,
}

impl CompositeConfig {
	/// Parses a TOML document. Paths are left as written.
	pub fn from_toml_str(document: &str) -> Result<Self> {
		Ok(toml::from_str(document)?)
	}

	/// Reads a TOML file and resolves relative paths against its directory.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let mut config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
		let base = path.parent().unwrap_or_else(|| Path::new("."));
		config.positive.resolve_paths(base);
		config.negative.resolve_paths(base);
		Ok(config)
	}
}
