//! End-to-end scenarios: training, single detectors and the composite classifier.

use std::sync::Arc;
use std::thread;

use gib_detect_core::{Alphabet, CaseFolding, CompositeClassifier, Detector, Trainer};

const LOWERCASE: &str = " abcdefghijklmnopqrstuvwxyz";
const KEYBOARD: &str = " abcdefghijklmnopqrstuvwxyz0123456789@.:/";

const GOOD_ENGLISH: &[&str] = &[
	"my name is Shir",
	"hello world",
	"and you can tell everybody that this is your song",
	"the quick brown fox jumps over the lazy dog",
	"alexandra maria lara",
	"alphonse brown",
	"karl theodor",
	"zinedine zidane",
	"john smith",
	"mary johnson",
	"michael jordan",
	"she sells sea shells by the sea shore",
	"peter piper picked a peck of pickled peppers",
	"william shakespeare wrote many plays",
	"the rain in spain stays mainly in the plain",
];

const BAD_ENGLISH: &[&str] = &[
	"qwerty",
	"asdfghjk",
	"zxcvbnm",
	"hjkhjkhjk",
	"fasdf asg ggd fhgkv",
	"qmdu poebc vuutkl jsupwre",
	"2 chhsdfitoixcv",
	"sam123",
	"$$$$$$$",
	"☃☃☃☃",
];

/// Junk patterns the negative detector is trained on.
const KEYBOARD_JUNK: &[&str] = &[
	"qwerty",
	"qwertyuiop",
	"asdfghjkl",
	"zxcvbnm",
	"asdf asdf",
	"hjkhjkhjk",
	"john@gmail.com",
	"anna.smith@yahoo.com",
	"sales@paypal.com",
	"http://unicode.org",
	"https://www.example.com",
	"www.google.com",
	"aaaaaaa",
	"eeeeeeee",
	"zzzzzz",
	"123456",
	"sam123",
];

const KEYBOARD_NAMES: &[&str] = &[
	"hello world",
	"my name is shir",
	"john smith",
	"mary johnson",
	"alexandra maria lara",
	"michael jordan",
];

fn alphabet(charset: &str) -> Alphabet {
	charset.parse::<Alphabet>().unwrap().with_case_folding(CaseFolding::Lowercase)
}

fn small_detector() -> Detector {
	Trainer::new(LOWERCASE.parse().unwrap())
		.fit(&["hello world", "my name is Shir"], &["qwerty asdf", "zxcvbnm", "hjkhjkhjk"])
		.unwrap()
}

fn composite() -> CompositeClassifier {
	let positive = Trainer::new(alphabet(LOWERCASE)).fit(GOOD_ENGLISH, BAD_ENGLISH).unwrap();
	let negative = Trainer::new(alphabet(KEYBOARD)).fit(KEYBOARD_JUNK, KEYBOARD_NAMES).unwrap();
	CompositeClassifier::new(positive, negative)
}

#[test]
fn test_training_line_is_not_gibberish() {
	assert!(!small_detector().is_gibberish("hello world"));
}

#[test]
fn test_keyboard_walk_is_gibberish() {
	assert!(small_detector().is_gibberish("qwerty"));
}

#[test]
fn test_short_strings_score_the_sentinel() {
	let detector = small_detector();
	let sentinel = detector.model().mean_log_probability();
	for s in ["", "a", "☃"] {
		let score = detector.get_probability(s);
		assert!(!score.is_nan());
		assert_eq!(score, sentinel);
	}
}

#[test]
fn test_out_of_alphabet_text_scores_finite() {
	let detector = small_detector();
	assert!(detector.get_probability("☃☃☃☃").is_finite());
	assert!(detector.get_probability("ÈIHÁÈKOVÁ DØÍMALOVÁ").is_finite());
	assert!(detector.get_probability("$$$$$$$").is_finite());
}

#[test]
fn test_email_is_gibberish() {
	let verdict = composite().classify("mike@paypal.com");
	assert!(verdict.is_gibberish);
	// The junk-pattern detector recognizes the email shape
	assert!(verdict.negative_score > 0.0);
}

#[test]
fn test_repeated_character_is_gibberish() {
	let verdict = composite().classify("eeeeeeeeeeeee");
	assert!(verdict.is_gibberish);
	assert!(verdict.positive_score < 0.0);
}

#[test]
fn test_plausible_text_is_not_gibberish() {
	let classifier = composite();
	for line in ["hello world", "my name is Shir", "peter smith", "maria"] {
		let verdict = classifier.classify(line);
		assert!(!verdict.is_gibberish, "{:?} classified as gibberish: {:?}", line, verdict);
	}
}

#[test]
fn test_url_and_keyboard_walk_are_gibberish() {
	let classifier = composite();
	for line in ["qwerty", "http://unicode.org"] {
		assert!(classifier.classify(line).is_gibberish, "{:?} not classified as gibberish", line);
	}
}

#[test]
fn test_empty_string_yields_a_verdict() {
	let classifier = composite();
	let verdict = classifier.classify("");
	assert!(verdict.final_score.is_finite());
	assert_eq!(verdict.is_gibberish, verdict.final_score < 0.0);
}

#[test]
fn test_round_trip_reproduces_scores() {
	let classifier = composite();
	let samples = ["hello world", "mike@paypal.com", "", "e", "☃☃☃☃", "ZINEDINE ZIDANE"];

	for detector in [classifier.positive(), classifier.negative()] {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("detector.bin");
		detector.save(&path).unwrap();
		let restored = Detector::load(&path).unwrap();

		assert_eq!(restored.threshold().to_bits(), detector.threshold().to_bits());
		assert_eq!(restored.weight().to_bits(), detector.weight().to_bits());
		for sample in samples {
			assert_eq!(restored.get_probability(sample).to_bits(), detector.get_probability(sample).to_bits());
		}
	}
}

#[test]
fn test_concurrent_classification() {
	let classifier = Arc::new(composite());
	let expected = classifier.classify("mike@paypal.com");

	let handles: Vec<_> = (0..8)
		.map(|_| {
			let classifier = Arc::clone(&classifier);
			thread::spawn(move || (0..100).map(|_| classifier.classify("mike@paypal.com")).collect::<Vec<_>>())
		})
		.collect();

	for handle in handles {
		for verdict in handle.join().unwrap() {
			assert_eq!(verdict, expected);
		}
	}
}
