use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use super::alphabet::Alphabet;
use super::composite::CompositeClassifier;
use super::detector::Detector;
use super::strategy::ScoringStrategy;
use super::trainer::{ThresholdPolicy, Trainer};
use crate::config::{CompositeConfig, DetectorConfig};
use crate::error::{ModelError, Result};
use crate::io::{build_output_path, read_lines};

/// Builds a detector from a training file, good and bad calibration files
/// and an alphabet file, with default training settings.
///
/// The trained model is not cached.
pub fn detector_from_files<P: AsRef<Path>>(training: P, good: P, bad: P, alphabet: P) -> Result<Detector> {
	let alphabet = crate::io::read_alphabet(alphabet)?.parse::<Alphabet>()?;
	let training = read_lines(training)?;
	let good = read_lines(good)?;
	let bad = read_lines(bad)?;
	Ok(Trainer::new(alphabet).fit_with_training(&training, &good, &bad)?)
}

/// Identifies one corpus file by path and by the lines read from it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct CorpusFingerprint {
	path: String,
	lines: usize,
	hash: u64,
}

impl CorpusFingerprint {
	fn new(path: &Path, lines: &[String]) -> Self {
		let mut hasher = Xxh3::new();
		for line in lines {
			hasher.update(line.as_bytes());
			hasher.update(b"\n");
		}
		Self { path: path.display().to_string(), lines: lines.len(), hash: hasher.digest() }
	}
}

/// Everything a cached detector was trained and calibrated from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct CacheKey {
	training: CorpusFingerprint,
	good: CorpusFingerprint,
	bad: CorpusFingerprint,
	alphabet: Alphabet,
	strategy: ScoringStrategy,
	threshold_policy: ThresholdPolicy,
}

/// Content of a `.bin` cache file: the key, then the detector in its own
/// versioned format.
#[derive(Serialize, Deserialize)]
struct CacheEntry {
	key: CacheKey,
	model: Vec<u8>,
}

/// Returns the cached detector, or `None` if it was built from other inputs.
fn load_cache(path: &Path, key: &CacheKey) -> std::result::Result<Option<Detector>, ModelError> {
	let bytes = fs::read(path)?;
	let entry: CacheEntry = postcard::from_bytes(&bytes)?;
	if entry.key != *key {
		return Ok(None);
	}
	Ok(Some(Detector::from_bytes(&entry.model)?))
}

fn save_cache(path: &Path, key: &CacheKey, detector: &Detector) -> std::result::Result<(), ModelError> {
	let entry = CacheEntry { key: key.clone(), model: detector.to_bytes()? };
	fs::write(path, postcard::to_stdvec(&entry)?)?;
	Ok(())
}

/// Builds a detector from its configuration section.
///
/// With `cache` enabled, a model stored as `<training stem>.bin` next to the
/// training file is loaded instead of retraining, provided it was built from
/// the same corpora (paths and contents), alphabet, strategy and threshold
/// policy. Otherwise the detector is trained and the cache (re)written. The
/// configured weight always wins over the cached one.
pub fn detector_from_config(config: &DetectorConfig) -> Result<Detector> {
	let trainer = config.trainer()?;
	let training = read_lines(config.training_path())?;
	let good = read_lines(&config.good_file)?;
	let bad = read_lines(&config.bad_file)?;

	if !config.cache {
		return Ok(trainer.fit_with_training(&training, &good, &bad)?);
	}

	let path = build_output_path(config.training_path(), "bin")?;
	let key = CacheKey {
		training: CorpusFingerprint::new(config.training_path(), &training),
		good: CorpusFingerprint::new(&config.good_file, &good),
		bad: CorpusFingerprint::new(&config.bad_file, &bad),
		alphabet: trainer.alphabet().clone(),
		strategy: config.strategy(),
		threshold_policy: config.threshold_policy,
	};

	if path.exists() {
		match load_cache(&path, &key) {
			Ok(Some(detector)) => {
				info!("Loaded cached model {}", path.display());
				return Ok(detector.with_weight(config.weight)?);
			}
			Ok(None) => warn!("Cached model {} was built from other inputs, retraining", path.display()),
			Err(e) => warn!("Cannot load cached model {}: {}, retraining", path.display(), e),
		}
	}

	let detector = trainer.fit_with_training(&training, &good, &bad)?;
	save_cache(&path, &key, &detector)?;
	info!("Saved model to {}", path.display());

	Ok(detector)
}

/// Builds both detectors of a composite classifier.
pub fn composite_from_config(config: &CompositeConfig) -> Result<CompositeClassifier> {
	let positive = detector_from_config(&config.positive)?;
	let negative = detector_from_config(&config.negative)?;
	Ok(CompositeClassifier::new(positive, negative).with_negative_divisor(config.negative_divisor)?)
}
