use std::sync::mpsc;
use std::thread;

use log::debug;

use super::alphabet::Alphabet;
use crate::error::ConfigError;

/// Below this many lines the corpus is counted on the calling thread.
const PARALLEL_MIN_LINES: usize = 1024;

/// Number of chunks per CPU when counting in parallel.
const CHUNKS_PER_CPU: usize = 4;

/// Raw transition occurrence counts, before smoothing.
///
/// Rows are contexts (the `order - 1` previous symbols, encoded in base
/// `symbols`), columns the next symbol.
///
/// ## Responsibilities:
/// - Accumulate transitions line by line (never across lines)
/// - Merge with another table of the same shape (parallel counting)
///
/// ## Invariants
/// - `counts.len() == contexts * symbols`
/// - `row_totals[r]` is the sum of row `r` of `counts`
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionCounts {
	order: usize,
	symbols: usize,
	counts: Vec<u64>,
	row_totals: Vec<u64>,
	/// Number of transitions seen so far.
	transitions: u64,
}

impl TransitionCounts {
	/// Creates an empty table of `contexts` rows and `symbols` columns.
	///
	/// Shape is validated by the caller (see `ScoringStrategy::validate`).
	pub(crate) fn new(order: usize, symbols: usize, contexts: usize) -> Self {
		Self {
			order,
			symbols,
			counts: vec![0; contexts * symbols],
			row_totals: vec![0; contexts],
			transitions: 0,
		}
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn symbols(&self) -> usize {
		self.symbols
	}

	pub fn transitions(&self) -> u64 {
		self.transitions
	}

	/// Occurrences of `next` after the given context row.
	pub fn count(&self, context: usize, next: usize) -> u64 {
		self.counts[context * self.symbols + next]
	}

	/// Sum of a context row.
	pub fn row_total(&self, context: usize) -> u64 {
		self.row_totals[context]
	}

	pub(crate) fn rows(&self) -> usize {
		self.row_totals.len()
	}

	/// Records every n-gram of one line, already mapped to symbol indices.
	///
	/// Lines shorter than `order` contribute nothing.
	pub fn add_sentence(&mut self, indices: &[usize]) {
		for window in indices.windows(self.order) {
			let context = context_index(&window[..self.order - 1], self.symbols);
			let next = window[self.order - 1];
			self.counts[context * self.symbols + next] += 1;
			self.row_totals[context] += 1;
			self.transitions += 1;
		}
	}

	/// Merges another table into this one by summing counts.
	///
	/// # Errors
	/// Returns `ShapeMismatch` if order or alphabet size differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), ConfigError> {
		if self.order != other.order || self.symbols != other.symbols {
			return Err(ConfigError::ShapeMismatch {
				left: (self.order, self.symbols),
				right: (other.order, other.symbols),
			});
		}

		for (count, occurrence) in self.counts.iter_mut().zip(&other.counts) {
			*count += occurrence;
		}
		for (total, occurrence) in self.row_totals.iter_mut().zip(&other.row_totals) {
			*total += occurrence;
		}
		self.transitions += other.transitions;

		Ok(())
	}
}

/// Encodes a context (sequence of symbol indices) as a row number.
pub(crate) fn context_index(context: &[usize], symbols: usize) -> usize {
	context.iter().fold(0, |row, symbol| row * symbols + symbol)
}

/// Counts every line of a corpus.
///
/// Large corpora are split into chunks (based on CPU cores * factor), each
/// counted on its own thread, then merged. Addition commutes, so the result
/// does not depend on chunking or on the order partial tables arrive in.
pub(crate) fn count_corpus<S>(
	corpus: &[S],
	alphabet: &Alphabet,
	order: usize,
	contexts: usize,
) -> Result<TransitionCounts, ConfigError>
where
	S: AsRef<str> + Sync,
{
	let symbols = alphabet.size();
	if corpus.len() < PARALLEL_MIN_LINES {
		return Ok(count_chunk(corpus, alphabet, order, contexts));
	}

	let chunks = num_cpus::get() * CHUNKS_PER_CPU;
	let chunk_size = corpus.len().div_ceil(chunks);
	debug!("Counting {} lines in chunks of {}", corpus.len(), chunk_size);

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for chunk in corpus.chunks(chunk_size) {
			let tx = tx.clone();
			scope.spawn(move || {
				// The receiver outlives the scope, send cannot fail
				let _ = tx.send(count_chunk(chunk, alphabet, order, contexts));
			});
		}
	});
	drop(tx);

	let mut total = TransitionCounts::new(order, symbols, contexts);
	for partial in rx.iter() {
		total.merge(&partial)?;
	}
	Ok(total)
}

fn count_chunk<S: AsRef<str>>(lines: &[S], alphabet: &Alphabet, order: usize, contexts: usize) -> TransitionCounts {
	let mut counts = TransitionCounts::new(order, alphabet.size(), contexts);
	for line in lines {
		counts.add_sentence(&alphabet.indices(line.as_ref()));
	}
	counts
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bigram_counts(alphabet: &Alphabet) -> TransitionCounts {
		TransitionCounts::new(2, alphabet.size(), alphabet.size())
	}

	#[test]
	fn test_add_sentence_counts_adjacent_pairs() {
		let alphabet: Alphabet = "ab".parse().unwrap();
		let mut counts = bigram_counts(&alphabet);
		counts.add_sentence(&alphabet.indices("abba"));

		assert_eq!(counts.transitions(), 3);
		assert_eq!(counts.count(0, 1), 1);
		assert_eq!(counts.count(1, 1), 1);
		assert_eq!(counts.count(1, 0), 1);
		assert_eq!(counts.row_total(1), 2);
	}

	#[test]
	fn test_lines_are_independent() {
		let alphabet: Alphabet = "ab".parse().unwrap();
		let counts = count_corpus(&["aa", "bb"], &alphabet, 2, alphabet.size()).unwrap();

		// No 'a' -> 'b' transition across the line boundary
		assert_eq!(counts.count(0, 1), 0);
		assert_eq!(counts.count(0, 0), 1);
		assert_eq!(counts.count(1, 1), 1);
	}

	#[test]
	fn test_short_lines_contribute_nothing() {
		let alphabet: Alphabet = "abc".parse().unwrap();
		let contexts = alphabet.size() * alphabet.size();
		let counts = count_corpus(&["ab", "a", ""], &alphabet, 3, contexts).unwrap();
		assert_eq!(counts.transitions(), 0);
	}

	#[test]
	fn test_trigram_context_encoding() {
		let alphabet: Alphabet = "ab".parse().unwrap();
		let symbols = alphabet.size();
		let counts = count_corpus(&["aab"], &alphabet, 3, symbols * symbols).unwrap();
		let context = context_index(&[0, 0], symbols);
		assert_eq!(counts.count(context, 1), 1);
		assert_eq!(counts.transitions(), 1);
	}

	#[test]
	fn test_merge_sums_counts() {
		let alphabet: Alphabet = "ab".parse().unwrap();
		let mut left = bigram_counts(&alphabet);
		left.add_sentence(&alphabet.indices("ab"));
		let mut right = bigram_counts(&alphabet);
		right.add_sentence(&alphabet.indices("abab"));

		left.merge(&right).unwrap();
		assert_eq!(left.count(0, 1), 3);
		assert_eq!(left.transitions(), 4);
	}

	#[test]
	fn test_merge_rejects_other_shapes() {
		let small: Alphabet = "ab".parse().unwrap();
		let large: Alphabet = "abc".parse().unwrap();
		let mut left = bigram_counts(&small);
		let right = bigram_counts(&large);
		assert!(matches!(left.merge(&right), Err(ConfigError::ShapeMismatch { .. })));
	}

	#[test]
	fn test_parallel_counting_matches_sequential() {
		let alphabet: Alphabet = " abcdefghijklmnopqrstuvwxyz".parse().unwrap();
		let words = ["hello world", "my name is shir", "the quick brown fox", "zzz", "a"];
		let corpus: Vec<String> = (0..PARALLEL_MIN_LINES * 3)
			.map(|i| words[i % words.len()].to_owned())
			.collect();

		let parallel = count_corpus(&corpus, &alphabet, 2, alphabet.size()).unwrap();
		let sequential = count_chunk(&corpus, &alphabet, 2, alphabet.size());
		assert_eq!(parallel, sequential);
	}
}
