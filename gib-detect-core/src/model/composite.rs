use super::detector::Detector;
use crate::error::ConfigError;

/// Default divisor applied to the negative detector's contribution.
pub const DEFAULT_NEGATIVE_DIVISOR: f64 = 2.0;

/// Final classification of one string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verdict {
	/// `positive_score - negative_score / negative_divisor`
	pub final_score: f64,
	/// `final_score < 0`
	pub is_gibberish: bool,
	/// Weighted distance of the positive detector to its threshold.
	pub positive_score: f64,
	/// Weighted distance of the negative detector to its threshold.
	pub negative_score: f64,
}

/// Combines a positive detector, trained on plausible language, with a
/// negative detector, trained on junk patterns (keyboard walks, emails,
/// URLs, repeated characters).
///
/// A string is gibberish when it is implausible as language, or when it
/// looks too much like a known junk pattern for the positive score to
/// compensate.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeClassifier {
	positive: Detector,
	negative: Detector,
	negative_divisor: f64,
}

impl CompositeClassifier {
	/// Builds a classifier with the default negative divisor.
	pub fn new(positive: Detector, negative: Detector) -> Self {
		Self { positive, negative, negative_divisor: DEFAULT_NEGATIVE_DIVISOR }
	}

	/// Returns the same classifier with another negative divisor.
	///
	/// # Errors
	/// Returns `InvalidDivisor` for zero or non-finite values.
	pub fn with_negative_divisor(mut self, negative_divisor: f64) -> Result<Self, ConfigError> {
		if !negative_divisor.is_finite() || negative_divisor == 0.0 {
			return Err(ConfigError::InvalidDivisor(negative_divisor));
		}
		self.negative_divisor = negative_divisor;
		Ok(self)
	}

	pub fn positive(&self) -> &Detector {
		&self.positive
	}

	pub fn negative(&self) -> &Detector {
		&self.negative
	}

	pub fn negative_divisor(&self) -> f64 {
		self.negative_divisor
	}

	/// Classifies any string, the empty string included.
	pub fn classify(&self, s: &str) -> Verdict {
		let positive_score = self.positive.weighted_score(s);
		let negative_score = self.negative.weighted_score(s);
		let final_score = positive_score - negative_score / self.negative_divisor;

		Verdict { final_score, is_gibberish: final_score < 0.0, positive_score, negative_score }
	}

	/// Classifies a batch of strings, preserving order.
	pub fn classify_all<I, S>(&self, lines: I) -> Vec<Verdict>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		lines.into_iter().map(|line| self.classify(line.as_ref())).collect()
	}
}
