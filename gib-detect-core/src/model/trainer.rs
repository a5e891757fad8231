use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::alphabet::Alphabet;
use super::detector::Detector;
use super::strategy::ScoringStrategy;
use super::transition::TransitionModel;
use crate::error::TrainingError;

/// How the decision threshold is derived from calibration scores.
///
/// Every policy is deterministic: the same scores always give the same
/// threshold.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
	/// `(mean(good) + mean(bad)) / 2`
	#[default]
	MeanMidpoint,
	/// `(min(good) + max(bad)) / 2`
	ExtremesMidpoint,
	/// Midpoint between two adjacent calibration scores that misclassifies
	/// the fewest training lines. Ties go to the candidate closest to the
	/// mean midpoint, then to the lower one.
	MinimizeError,
}

impl ThresholdPolicy {
	/// Computes the threshold. Both slices must be non-empty.
	pub fn select(&self, good: &[f64], bad: &[f64]) -> f64 {
		match self {
			ThresholdPolicy::MeanMidpoint => (mean(good) + mean(bad)) / 2.0,
			ThresholdPolicy::ExtremesMidpoint => {
				let min_good = good.iter().copied().fold(f64::INFINITY, f64::min);
				let max_bad = bad.iter().copied().fold(f64::NEG_INFINITY, f64::max);
				(min_good + max_bad) / 2.0
			}
			ThresholdPolicy::MinimizeError => minimize_error(good, bad),
		}
	}
}

fn mean(scores: &[f64]) -> f64 {
	scores.iter().sum::<f64>() / scores.len() as f64
}

/// Number of calibration lines on the wrong side of `threshold`.
fn misclassified(good: &[f64], bad: &[f64], threshold: f64) -> (usize, usize) {
	let good_errors = good.iter().filter(|score| **score < threshold).count();
	let bad_errors = bad.iter().filter(|score| **score >= threshold).count();
	(good_errors, bad_errors)
}

fn minimize_error(good: &[f64], bad: &[f64]) -> f64 {
	let fallback = ThresholdPolicy::MeanMidpoint.select(good, bad);

	// (score, is_good), ascending
	let mut labelled: Vec<(f64, bool)> = good
		.iter()
		.map(|score| (*score, true))
		.chain(bad.iter().map(|score| (*score, false)))
		.collect();
	labelled.sort_by(|a, b| a.0.total_cmp(&b.0));

	// Sweep candidates between adjacent distinct scores. Everything up to
	// index `i` is below the candidate.
	let mut best: Option<(usize, f64)> = None;
	let mut good_below = 0;
	let mut bad_below = 0;
	for i in 0..labelled.len().saturating_sub(1) {
		if labelled[i].1 {
			good_below += 1;
		} else {
			bad_below += 1;
		}
		if labelled[i].0 == labelled[i + 1].0 {
			continue;
		}

		let candidate = (labelled[i].0 + labelled[i + 1].0) / 2.0;
		let errors = good_below + (bad.len() - bad_below);
		let better = match best {
			None => true,
			Some((best_errors, best_threshold)) => {
				errors < best_errors
					|| (errors == best_errors
						&& (candidate - fallback).abs() < (best_threshold - fallback).abs())
			}
		};
		if better {
			best = Some((errors, candidate));
		}
	}

	best.map(|(_, threshold)| threshold).unwrap_or(fallback)
}

/// Builds calibrated detectors from labelled corpora.
///
/// ```
/// use gib_detect_core::model::alphabet::Alphabet;
/// use gib_detect_core::model::trainer::Trainer;
///
/// let alphabet: Alphabet = " abcdefghijklmnopqrstuvwxyz".parse().unwrap();
/// let detector = Trainer::new(alphabet)
/// 	.fit(&["hello world", "my name is shir"], &["qwerty", "zxcvbnm"])
/// 	.unwrap();
/// assert!(!detector.is_gibberish("hello world"));
/// ```
#[derive(Clone, Debug)]
pub struct Trainer {
	alphabet: Alphabet,
	strategy: ScoringStrategy,
	threshold_policy: ThresholdPolicy,
	weight: f64,
}

impl Trainer {
	/// Trainer with a Laplace bigram strategy, mean-midpoint threshold and
	/// weight 1.0.
	pub fn new(alphabet: Alphabet) -> Self {
		Self {
			alphabet,
			strategy: ScoringStrategy::default(),
			threshold_policy: ThresholdPolicy::default(),
			weight: 1.0,
		}
	}

	pub fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
		self.strategy = strategy;
		self
	}

	pub fn with_order(mut self, order: usize) -> Self {
		self.strategy.order = order;
		self
	}

	pub fn with_smoothing(mut self, smoothing_k: f64) -> Self {
		self.strategy.smoothing_k = smoothing_k;
		self
	}

	pub fn with_threshold_policy(mut self, threshold_policy: ThresholdPolicy) -> Self {
		self.threshold_policy = threshold_policy;
		self
	}

	/// Combination weight given to the trained detector. Validated by `fit`.
	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = weight;
		self
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	/// Trains on `good` and calibrates the threshold against `good` and `bad`.
	///
	/// # Errors
	/// - `EmptyGoodCorpus` / `EmptyBadCorpus` if a corpus has no lines
	/// - `Config` if the strategy or weight is invalid
	pub fn fit<S>(&self, good: &[S], bad: &[S]) -> Result<Detector, TrainingError>
	where
		S: AsRef<str> + Sync,
	{
		self.fit_with_training(good, good, bad)
	}

	/// Trains on a separate `training` corpus, then calibrates the threshold
	/// on the `good` and `bad` lists.
	///
	/// # Errors
	/// Same as `fit`, plus `EmptyTrainingCorpus`.
	pub fn fit_with_training<S>(&self, training: &[S], good: &[S], bad: &[S]) -> Result<Detector, TrainingError>
	where
		S: AsRef<str> + Sync,
	{
		if training.is_empty() {
			return Err(TrainingError::EmptyTrainingCorpus);
		}
		if good.is_empty() {
			return Err(TrainingError::EmptyGoodCorpus);
		}
		if bad.is_empty() {
			return Err(TrainingError::EmptyBadCorpus);
		}

		let model = TransitionModel::train_with_strategy(training, self.alphabet.clone(), self.strategy)?;

		let good_scores: Vec<f64> = good.iter().map(|line| model.average_log_probability(line.as_ref())).collect();
		let bad_scores: Vec<f64> = bad.iter().map(|line| model.average_log_probability(line.as_ref())).collect();

		let good_mean = mean(&good_scores);
		let bad_mean = mean(&bad_scores);
		debug!("Calibration means: good {:.4}, bad {:.4}", good_mean, bad_mean);
		if good_mean <= bad_mean {
			warn!(
				"Good corpus does not score above bad corpus (good {:.4} <= bad {:.4}), threshold will not separate them",
				good_mean, bad_mean
			);
		}

		let threshold = self.threshold_policy.select(&good_scores, &bad_scores);
		let (good_errors, bad_errors) = misclassified(&good_scores, &bad_scores, threshold);
		info!(
			"Threshold {:.4} ({:?}): {}/{} good and {}/{} bad lines misclassified",
			threshold,
			self.threshold_policy,
			good_errors,
			good_scores.len(),
			bad_errors,
			bad_scores.len()
		);

		Ok(Detector::new(model, threshold)?.with_weight(self.weight)?)
	}
}
