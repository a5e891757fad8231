use log::debug;

use super::alphabet::Alphabet;
use super::counts::{TransitionCounts, context_index, count_corpus};
use super::strategy::ScoringStrategy;
use crate::error::{ConfigError, ModelError};

/// Smoothed n-gram transition model over an `Alphabet`.
///
/// Stores `ln P(next | context)` for every context and every next symbol.
/// For the default bigram strategy the context is the previous symbol and
/// the matrix is N×N.
///
/// # Invariants
/// - `log_probabilities.len() == contexts * alphabet.size()`
/// - every row sums to 1 before the log
/// - every entry is finite (smoothing constant is > 0)
/// - immutable after training
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionModel {
	alphabet: Alphabet,
	strategy: ScoringStrategy,
	log_probabilities: Vec<f64>,
	/// Mean of all matrix entries, returned for strings without transitions.
	mean_log_probability: f64,
}

impl TransitionModel {
	/// Trains a bigram model with additive smoothing constant `smoothing_k`.
	pub fn train<S>(corpus: &[S], alphabet: Alphabet, smoothing_k: f64) -> Result<Self, ConfigError>
	where
		S: AsRef<str> + Sync,
	{
		Self::train_with_strategy(corpus, alphabet, ScoringStrategy::bigram(smoothing_k))
	}

	/// Trains a model of any order.
	///
	/// Each corpus line is counted on its own, there are no transitions
	/// across lines.
	///
	/// # Errors
	/// Returns a `ConfigError` if the strategy is invalid for this alphabet.
	pub fn train_with_strategy<S>(corpus: &[S], alphabet: Alphabet, strategy: ScoringStrategy) -> Result<Self, ConfigError>
	where
		S: AsRef<str> + Sync,
	{
		strategy.validate(alphabet.size())?;
		let contexts = strategy.contexts(alphabet.size()).ok_or(ConfigError::ModelTooLarge {
			order: strategy.order,
			symbols: alphabet.size(),
			max: super::strategy::MAX_MATRIX_CELLS,
		})?;

		let counts = count_corpus(corpus, &alphabet, strategy.order, contexts)?;
		debug!(
			"Counted {} transitions over {} lines ({} symbols, order {})",
			counts.transitions(),
			corpus.len(),
			alphabet.size(),
			strategy.order
		);
		Self::from_counts(&counts, alphabet, strategy)
	}

	/// Converts raw counts to smoothed log-probabilities:
	/// `P(j|i) = (count(i,j) + k) / (sum_j count(i,j) + k*N)`.
	///
	/// A row that was never observed gets a uniform distribution.
	pub fn from_counts(counts: &TransitionCounts, alphabet: Alphabet, strategy: ScoringStrategy) -> Result<Self, ConfigError> {
		strategy.validate(alphabet.size())?;
		let symbols = alphabet.size();
		if counts.symbols() != symbols || counts.order() != strategy.order {
			return Err(ConfigError::ShapeMismatch {
				left: (strategy.order, symbols),
				right: (counts.order(), counts.symbols()),
			});
		}

		let k = strategy.smoothing_k;
		let uniform = (1.0 / symbols as f64).ln();
		let mut log_probabilities = Vec::with_capacity(counts.rows() * symbols);
		for context in 0..counts.rows() {
			let total = counts.row_total(context);
			if total == 0 {
				log_probabilities.extend(std::iter::repeat_n(uniform, symbols));
				continue;
			}
			let denominator = total as f64 + k * symbols as f64;
			for next in 0..symbols {
				log_probabilities.push(((counts.count(context, next) as f64 + k) / denominator).ln());
			}
		}

		Ok(Self::assemble(alphabet, strategy, log_probabilities))
	}

	/// Rebuilds a model from a persisted matrix.
	///
	/// # Errors
	/// Returns `ModelError::Corrupt` if the matrix has the wrong size or
	/// holds non-finite values.
	pub(crate) fn from_parts(alphabet: Alphabet, strategy: ScoringStrategy, log_probabilities: Vec<f64>) -> Result<Self, ModelError> {
		strategy.validate(alphabet.size())?;
		let expected = strategy
			.contexts(alphabet.size())
			.and_then(|contexts| contexts.checked_mul(alphabet.size()))
			.ok_or_else(|| ModelError::Corrupt("matrix size overflows".to_owned()))?;

		if log_probabilities.len() != expected {
			return Err(ModelError::Corrupt(format!(
				"expected {} matrix cells, found {}",
				expected,
				log_probabilities.len()
			)));
		}
		if log_probabilities.iter().any(|p| !p.is_finite()) {
			return Err(ModelError::Corrupt("non-finite log-probability".to_owned()));
		}

		Ok(Self::assemble(alphabet, strategy, log_probabilities))
	}

	fn assemble(alphabet: Alphabet, strategy: ScoringStrategy, log_probabilities: Vec<f64>) -> Self {
		let mean_log_probability = log_probabilities.iter().sum::<f64>() / log_probabilities.len() as f64;
		Self { alphabet, strategy, log_probabilities, mean_log_probability }
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	pub fn strategy(&self) -> ScoringStrategy {
		self.strategy
	}

	/// Row-major matrix of `ln P(next | context)`.
	pub fn log_probabilities(&self) -> &[f64] {
		&self.log_probabilities
	}

	/// Sentinel score for strings too short to contain a transition.
	pub fn mean_log_probability(&self) -> f64 {
		self.mean_log_probability
	}

	/// `ln P(next | context)`. For a bigram model `context` is the index of
	/// the previous symbol.
	pub fn log_probability(&self, context: usize, next: usize) -> f64 {
		self.log_probabilities[context * self.alphabet.size() + next]
	}

	/// Average log-probability of every transition of `text`.
	///
	/// Normalized by the number of transitions so that scores of strings of
	/// different lengths are comparable. Returns `mean_log_probability()`
	/// when the text has fewer symbols than the model order.
	pub fn average_log_probability(&self, text: &str) -> f64 {
		let indices = self.alphabet.indices(text);
		let order = self.strategy.order;
		if indices.len() < order {
			return self.mean_log_probability;
		}

		let symbols = self.alphabet.size();
		let mut sum = 0.0;
		let mut transitions = 0usize;
		for window in indices.windows(order) {
			let context = context_index(&window[..order - 1], symbols);
			sum += self.log_probability(context, window[order - 1]);
			transitions += 1;
		}
		sum / transitions as f64
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lowercase() -> Alphabet {
		" abcdefghijklmnopqrstuvwxyz".parse().unwrap()
	}

	#[test]
	fn test_rows_sum_to_one() {
		let model = TransitionModel::train(&["hello world", "my name is shir"], lowercase(), 1.0).unwrap();
		let symbols = model.alphabet().size();
		for row in model.log_probabilities().chunks(symbols) {
			let total: f64 = row.iter().map(|p| p.exp()).sum();
			assert!((total - 1.0).abs() < 1e-9, "row sums to {}", total);
		}
	}

	#[test]
	fn test_laplace_formula() {
		let alphabet: Alphabet = "ab".parse().unwrap();
		let model = TransitionModel::train(&["aab"], alphabet, 1.0).unwrap();
		// Row 'a': a->a 1, a->b 1, total 2, N = 3
		let expected = (2.0f64 / 5.0).ln();
		assert!((model.log_probability(0, 0) - expected).abs() < 1e-12);
		assert!((model.log_probability(0, 2) - (1.0f64 / 5.0).ln()).abs() < 1e-12);
	}

	#[test]
	fn test_unseen_row_is_uniform() {
		let alphabet: Alphabet = "ab".parse().unwrap();
		let model = TransitionModel::train(&["aa"], alphabet, 0.5).unwrap();
		let uniform = (1.0f64 / 3.0).ln();
		for next in 0..3 {
			assert!((model.log_probability(1, next) - uniform).abs() < 1e-12);
		}
	}

	#[test]
	fn test_invalid_smoothing_is_rejected() {
		let result = TransitionModel::train(&["abc"], lowercase(), 0.0);
		assert_eq!(result, Err(ConfigError::InvalidSmoothing(0.0)));
	}

	#[test]
	fn test_short_strings_score_the_sentinel() {
		let model = TransitionModel::train(&["hello world"], lowercase(), 1.0).unwrap();
		let sentinel = model.mean_log_probability();
		assert!(sentinel.is_finite());
		assert_eq!(model.average_log_probability(""), sentinel);
		assert_eq!(model.average_log_probability("h"), sentinel);
		assert_ne!(model.average_log_probability("he"), sentinel);
	}

	#[test]
	fn test_trained_text_scores_above_unseen_text() {
		let model = TransitionModel::train(&["hello world", "my name is shir"], lowercase(), 1.0).unwrap();
		assert!(model.average_log_probability("hello world") > model.average_log_probability("qwerty"));
	}

	#[test]
	fn test_trigram_model() {
		let strategy = ScoringStrategy { order: 3, smoothing_k: 0.1 };
		let model = TransitionModel::train_with_strategy(&["abcabcabc"], lowercase(), strategy).unwrap();
		assert_eq!(model.log_probabilities().len(), 28 * 28 * 28);
		assert_eq!(model.average_log_probability("ab"), model.mean_log_probability());
		assert!(model.average_log_probability("abcabc") > model.average_log_probability("acbacb"));
	}

	#[test]
	fn test_from_parts_rejects_wrong_size() {
		let model = TransitionModel::train(&["hello"], lowercase(), 1.0).unwrap();
		let mut matrix = model.log_probabilities().to_vec();
		matrix.pop();
		let result = TransitionModel::from_parts(lowercase(), model.strategy(), matrix);
		assert!(matches!(result, Err(ModelError::Corrupt(_))));
	}
}
