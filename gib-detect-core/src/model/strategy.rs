use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on transition matrix cells (`contexts * symbols`).
///
/// 4M cells is 32 MiB of `f64`, enough for a trigram model over a ~160
/// symbol alphabet.
pub const MAX_MATRIX_CELLS: usize = 1 << 22;

/// Scoring strategy selected when a detector is built.
///
/// - `order`: size of the n-gram (2 = bigram, the previous symbol predicts
///   the next one; 3 = the two previous symbols, ...)
/// - `smoothing_k`: additive smoothing constant added to every count
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct ScoringStrategy {
	pub order: usize,
	pub smoothing_k: f64,
}

impl Default for ScoringStrategy {
	fn default() -> Self {
		Self { order: 2, smoothing_k: 1.0 }
	}
}

impl ScoringStrategy {
	/// Bigram strategy with the given smoothing constant.
	pub fn bigram(smoothing_k: f64) -> Self {
		Self { order: 2, smoothing_k }
	}

	/// Checks the strategy against an alphabet of `symbols` entries
	/// (unknown symbol included).
	///
	/// # Errors
	/// - `InvalidOrder` if `order < 2`
	/// - `InvalidSmoothing` if `smoothing_k` is not finite or not > 0
	/// - `ModelTooLarge` if the matrix would exceed `MAX_MATRIX_CELLS`
	pub fn validate(&self, symbols: usize) -> Result<(), ConfigError> {
		if self.order < 2 {
			return Err(ConfigError::InvalidOrder(self.order));
		}
		if !self.smoothing_k.is_finite() || self.smoothing_k <= 0.0 {
			return Err(ConfigError::InvalidSmoothing(self.smoothing_k));
		}
		self.contexts(symbols)
			.and_then(|contexts| contexts.checked_mul(symbols))
			.filter(|cells| *cells <= MAX_MATRIX_CELLS)
			.map(|_| ())
			.ok_or(ConfigError::ModelTooLarge { order: self.order, symbols, max: MAX_MATRIX_CELLS })
	}

	/// Number of distinct contexts (`symbols^(order-1)`), `None` on overflow.
	pub(crate) fn contexts(&self, symbols: usize) -> Option<usize> {
		let exponent = u32::try_from(self.order.saturating_sub(1)).ok()?;
		symbols.checked_pow(exponent)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_is_laplace_bigram() {
		let strategy = ScoringStrategy::default();
		assert_eq!(strategy.order, 2);
		assert!((strategy.smoothing_k - 1.0).abs() < f64::EPSILON);
		assert!(strategy.validate(28).is_ok());
	}

	#[test]
	fn test_invalid_smoothing() {
		assert_eq!(ScoringStrategy::bigram(0.0).validate(10), Err(ConfigError::InvalidSmoothing(0.0)));
		assert!(ScoringStrategy::bigram(-1.0).validate(10).is_err());
		assert!(ScoringStrategy::bigram(f64::NAN).validate(10).is_err());
	}

	#[test]
	fn test_invalid_order() {
		let strategy = ScoringStrategy { order: 1, smoothing_k: 1.0 };
		assert_eq!(strategy.validate(10), Err(ConfigError::InvalidOrder(1)));
	}

	#[test]
	fn test_oversized_matrix_is_rejected() {
		let trigram = ScoringStrategy { order: 3, smoothing_k: 1.0 };
		assert!(trigram.validate(130).is_ok());

		let huge = ScoringStrategy { order: 5, smoothing_k: 1.0 };
		assert!(matches!(huge.validate(130), Err(ConfigError::ModelTooLarge { order: 5, .. })));

		let overflow = ScoringStrategy { order: 64, smoothing_k: 1.0 };
		assert!(overflow.validate(130).is_err());
	}
}
