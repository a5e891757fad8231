use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Normalization applied to input characters before alphabet lookup.
///
/// Nothing is normalized unless explicitly configured.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseFolding {
	/// Characters are looked up exactly as given.
	#[default]
	Preserve,
	/// Characters are lowercased (Unicode-aware) before lookup.
	Lowercase,
}

/// Ordered set of symbols recognized by a model.
///
/// Each configured symbol gets the index of its position. One extra index,
/// right after the last symbol, is reserved for every character outside the
/// alphabet, so any input text can be mapped and scored.
///
/// # Invariants
/// - At least one configured symbol
/// - No duplicate symbols
/// - `index[symbols[i]] == i` for every `i`
/// - Immutable once built
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "AlphabetRecord", into = "AlphabetRecord")]
pub struct Alphabet {
	/// Configured symbols, in order.
	symbols: Vec<char>,
	/// Reverse lookup from symbol to index.
	index: HashMap<char, usize>,
	case_folding: CaseFolding,
}

/// Serialized form of an `Alphabet`. The lookup table is rebuilt (and
/// re-validated) on load.
#[derive(Serialize, Deserialize)]
struct AlphabetRecord {
	symbols: Vec<char>,
	case_folding: CaseFolding,
}

impl Alphabet {
	/// Builds an alphabet from an ordered sequence of symbols.
	///
	/// # Errors
	/// - `ConfigError::EmptyAlphabet` if no symbol is given
	/// - `ConfigError::DuplicateSymbol` on the first repeated symbol
	pub fn build<I: IntoIterator<Item = char>>(charset: I) -> Result<Self, ConfigError> {
		let symbols: Vec<char> = charset.into_iter().collect();
		if symbols.is_empty() {
			return Err(ConfigError::EmptyAlphabet);
		}

		let mut index = HashMap::with_capacity(symbols.len());
		for (i, symbol) in symbols.iter().enumerate() {
			if index.insert(*symbol, i).is_some() {
				return Err(ConfigError::DuplicateSymbol(*symbol));
			}
		}

		Ok(Self { symbols, index, case_folding: CaseFolding::Preserve })
	}

	/// Returns the same alphabet with another case folding policy.
	pub fn with_case_folding(mut self, case_folding: CaseFolding) -> Self {
		self.case_folding = case_folding;
		self
	}

	pub fn case_folding(&self) -> CaseFolding {
		self.case_folding
	}

	/// Configured symbols, without the reserved unknown symbol.
	pub fn symbols(&self) -> &[char] {
		&self.symbols
	}

	/// Number of symbols N, including the reserved unknown symbol.
	pub fn size(&self) -> usize {
		self.symbols.len() + 1
	}

	/// Index shared by every out-of-alphabet character.
	pub fn unknown_index(&self) -> usize {
		self.symbols.len()
	}

	/// Index of an already normalized symbol, `None` if not in the alphabet.
	pub fn lookup(&self, symbol: char) -> Option<usize> {
		self.index.get(&symbol).copied()
	}

	/// Returns `true` if the character (after case folding) is a configured symbol.
	pub fn contains(&self, c: char) -> bool {
		self.index_of(c) != self.unknown_index()
	}

	/// Index of a character after case folding.
	///
	/// Never fails: unknown characters map to `unknown_index()`. So does a
	/// character whose lowercase form has several code points (e.g. 'İ'),
	/// which `indices` scores as a sequence of symbols.
	pub fn index_of(&self, c: char) -> usize {
		let folded = match self.case_folding {
			CaseFolding::Preserve => c,
			CaseFolding::Lowercase => {
				let mut lower = c.to_lowercase();
				match (lower.next(), lower.next()) {
					(Some(single), None) => single,
					_ => return self.unknown_index(),
				}
			}
		};
		self.lookup(folded).unwrap_or(self.unknown_index())
	}

	/// Maps a whole text to symbol indices, in order.
	///
	/// With `CaseFolding::Lowercase`, characters whose lowercase form has
	/// several code points contribute one index per code point.
	pub fn indices(&self, text: &str) -> Vec<usize> {
		let unknown = self.unknown_index();
		match self.case_folding {
			CaseFolding::Preserve => text
				.chars()
				.map(|c| self.lookup(c).unwrap_or(unknown))
				.collect(),
			CaseFolding::Lowercase => text
				.chars()
				.flat_map(|c| c.to_lowercase())
				.map(|c| self.lookup(c).unwrap_or(unknown))
				.collect(),
		}
	}
}

impl FromStr for Alphabet {
	type Err = ConfigError;

	/// Builds an alphabet from a string enumerating its symbols.
	fn from_str(charset: &str) -> Result<Self, Self::Err> {
		Self::build(charset.chars())
	}
}

impl TryFrom<AlphabetRecord> for Alphabet {
	type Error = ConfigError;

	fn try_from(record: AlphabetRecord) -> Result<Self, Self::Error> {
		Ok(Self::build(record.symbols)?.with_case_folding(record.case_folding))
	}
}

impl From<Alphabet> for AlphabetRecord {
	fn from(alphabet: Alphabet) -> Self {
		Self { symbols: alphabet.symbols, case_folding: alphabet.case_folding }
	}
}
