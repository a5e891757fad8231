use std::path::Path;

use serde::{Deserialize, Serialize};

use super::alphabet::Alphabet;
use super::strategy::ScoringStrategy;
use super::transition::TransitionModel;
use crate::error::{ConfigError, ModelError};

/// Current binary model format version.
pub const FORMAT_VERSION: u32 = 1;

/// Result of scoring a single string. Not persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredString {
	/// Average log-probability of the string's transitions.
	pub raw: f64,
	/// `raw - threshold`, negative means gibberish.
	pub relative: f64,
	pub is_gibberish: bool,
}

/// Trained detector: a frozen transition model plus its calibration.
///
/// - `threshold`: strings scoring below it are gibberish
/// - `weight`: multiplier applied only when combining detectors
///
/// A detector is immutable once built and holds no interior mutability, so
/// it can be shared between threads and scored concurrently.
#[derive(Clone, Debug, PartialEq)]
pub struct Detector {
	model: TransitionModel,
	threshold: f64,
	weight: f64,
}

/// On-disk representation, written after the format version.
#[derive(Serialize, Deserialize)]
struct DetectorRecord {
	threshold: f64,
	weight: f64,
	alphabet: Alphabet,
	strategy: ScoringStrategy,
	log_probabilities: Vec<f64>,
}

impl Detector {
	/// Wraps a trained model with a threshold and a weight of 1.0.
	///
	/// # Errors
	/// Returns `InvalidThreshold` if the threshold is not finite.
	pub fn new(model: TransitionModel, threshold: f64) -> Result<Self, ConfigError> {
		if !threshold.is_finite() {
			return Err(ConfigError::InvalidThreshold(threshold));
		}
		Ok(Self { model, threshold, weight: 1.0 })
	}

	/// Returns the same detector with another combination weight.
	pub fn with_weight(mut self, weight: f64) -> Result<Self, ConfigError> {
		if !weight.is_finite() {
			return Err(ConfigError::InvalidWeight(weight));
		}
		self.weight = weight;
		Ok(self)
	}

	/// Returns the same detector with a manually calibrated threshold.
	pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
		if !threshold.is_finite() {
			return Err(ConfigError::InvalidThreshold(threshold));
		}
		self.threshold = threshold;
		Ok(self)
	}

	pub fn threshold(&self) -> f64 {
		self.threshold
	}

	pub fn weight(&self) -> f64 {
		self.weight
	}

	pub fn model(&self) -> &TransitionModel {
		&self.model
	}

	pub fn alphabet(&self) -> &Alphabet {
		self.model.alphabet()
	}

	/// Average transition log-probability of `s`.
	///
	/// Unknown characters use the reserved symbol's statistics. Strings
	/// without any transition score the model's mean log-probability.
	pub fn average_log_probability(&self, s: &str) -> f64 {
		self.model.average_log_probability(s)
	}

	/// Scoring primitive used for classification and combination.
	pub fn get_probability(&self, s: &str) -> f64 {
		self.average_log_probability(s)
	}

	pub fn is_gibberish(&self, s: &str) -> bool {
		self.get_probability(s) < self.threshold
	}

	/// Distance to the threshold, scaled by the weight.
	///
	/// This is the detector's contribution to a composite score.
	pub fn weighted_score(&self, s: &str) -> f64 {
		(self.get_probability(s) - self.threshold) * self.weight
	}

	pub fn score(&self, s: &str) -> ScoredString {
		let raw = self.get_probability(s);
		ScoredString { raw, relative: raw - self.threshold, is_gibberish: raw < self.threshold }
	}

	/// Serializes the detector to the versioned binary format.
	pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
		let record = DetectorRecord {
			threshold: self.threshold,
			weight: self.weight,
			alphabet: self.model.alphabet().clone(),
			strategy: self.model.strategy(),
			log_probabilities: self.model.log_probabilities().to_vec(),
		};

		let mut bytes = postcard::to_stdvec(&FORMAT_VERSION)?;
		bytes.extend(postcard::to_stdvec(&record)?);
		Ok(bytes)
	}

	/// Restores a detector written by `to_bytes`.
	///
	/// Scores of the restored detector are bit-identical to the original.
	///
	/// # Errors
	/// - `UnsupportedVersion` if the format version differs
	/// - `Codec` if the payload cannot be decoded
	/// - `Corrupt` if bytes follow the model, or the decoded model is inconsistent
	/// - `Config` if the decoded alphabet or strategy is invalid
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
		let (version, payload) = postcard::take_from_bytes::<u32>(bytes)?;
		if version != FORMAT_VERSION {
			return Err(ModelError::UnsupportedVersion { found: version, expected: FORMAT_VERSION });
		}

		let (record, rest) = postcard::take_from_bytes::<DetectorRecord>(payload)?;
		if !rest.is_empty() {
			return Err(ModelError::Corrupt(format!("{} trailing bytes after model", rest.len())));
		}
		let model = TransitionModel::from_parts(record.alphabet, record.strategy, record.log_probabilities)?;
		Ok(Self::new(model, record.threshold)?.with_weight(record.weight)?)
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
		std::fs::write(path, self.to_bytes()?)?;
		Ok(())
	}

	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
		let bytes = std::fs::read(path)?;
		Self::from_bytes(&bytes)
	}
}
