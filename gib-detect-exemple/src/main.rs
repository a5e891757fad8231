use std::env;

use gib_detect_core::config::CompositeConfig;
use gib_detect_core::model::factory::composite_from_config;
use gib_detect_core::{Alphabet, CaseFolding, CompositeClassifier, ThresholdPolicy, Trainer, Verdict};
use log::info;
use rand::Rng;

const ENGLISH_ALPHABET: &str = " abcdefghijklmnopqrstuvwxyz§àáâãäåæçèéêëìíîïñòóôöøùúûüÿāăēĕīĭōŏœūŭ";
const KEYBOARD_ALPHABET: &str = " abcdefghijklmnopqrstuvwxyz0123456789!\"#&'()*,-./:;?@[]";

const GOOD_ENGLISH: &[&str] = &[
	"my name is Shir",
	"hello world",
	"and you can tell everybody that this is your song",
	"the quick brown fox jumps over the lazy dog",
	"she sells sea shells by the sea shore",
	"peter piper picked a peck of pickled peppers",
	"the rain in spain stays mainly in the plain",
	"william shakespeare wrote many plays",
	"ALEXANDRAMARIALARA",
	"ALLSTAR",
	"ALPHONSEBROWN",
	"ALUMINUMMAN",
	"JOHNJOHN",
	"KARLCHEN",
	"KARLTHEODORFRANZJOSEFMARIAVONUNDZUGUTTENBERG",
	"ZELDA",
	"ZINEDINEZIDANE",
];

const BAD_ENGLISH: &[&str] = &[
	"2 chhsdfitoixcv",
	"fasdf asg ggd fhgkv",
	"qmdu poebc vuutkl jsupwre",
	"asdf asdf",
	"sam123",
	"AAAAEEEESSSS",
	"hjkhjkhjk",
	"qwerty",
	"asdfghjk",
	"zxcvbnm",
	"$$$$$$$",
	"☃☃☃☃",
];

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

const TEST_LINES: &[&str] = &[
	"hello world",
	"my name is Shir",
	"ZINEDINEZIDANE",
	"Wm the 3rd",
	"mike@paypal.com",
	"http://unicode.org",
	"Mike.McKenna657",
	"eeeeeeeeeeeee",
	"GIHOHOSD",
	"ÈIHÁÈKOVÁ DØÍMALOVÁ",
	"not in alphabet",
	"Jane 8 Tau",
	"",
];

/// Builds the demo classifier from the built-in corpora.
fn builtin_classifier() -> Result<CompositeClassifier, Box<dyn std::error::Error>> {
	let english = ENGLISH_ALPHABET.parse::<Alphabet>()?.with_case_folding(CaseFolding::Lowercase);
	let positive = Trainer::new(english).fit(GOOD_ENGLISH, BAD_ENGLISH)?;

	let keyboard = KEYBOARD_ALPHABET.parse::<Alphabet>()?.with_case_folding(CaseFolding::Lowercase);
	let negative = Trainer::new(keyboard)
		.with_threshold_policy(ThresholdPolicy::MinimizeError)
		.fit(KEYBOARD_JUNK, KEYBOARD_NAMES)?;

	Ok(CompositeClassifier::new(positive, negative))
}

/// Verdict of one line, with each detector's own decision.
fn report(classifier: &CompositeClassifier, line: &str, verdict: &Verdict) -> String {
	format!(
		"Gibberish: {} {:>9.4} : {}\n      Pos: {} {:>9.4}\n      Neg: {} {:>9.4}\n",
		flag(verdict.is_gibberish),
		verdict.final_score,
		line,
		flag(classifier.positive().is_gibberish(line)),
		verdict.positive_score,
		flag(classifier.negative().is_gibberish(line)),
		verdict.negative_score
	)
}

fn flag(is_gibberish: bool) -> &'static str {
	if is_gibberish { "TRUE " } else { "false" }
}

/// Random lowercase string, used as obviously random input.
fn random_line(len: usize) -> String {
	let mut rng = rand::rng();
	(0..len).map(|_| rng.random_range('a'..='z')).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	// Either load detectors from a TOML configuration (first argument),
	// or train them from the built-in corpora
	let classifier = match env::args().nth(1) {
		Some(path) => {
			info!("Loading configuration {}", path);
			composite_from_config(&CompositeConfig::from_file(path)?)?
		}
		None => builtin_classifier()?,
	};

	println!("------------");
	println!("Positive threshold: {:.4}", classifier.positive().threshold());
	println!("Negative threshold: {:.4}", classifier.negative().threshold());
	println!("------------");

	let mut lines: Vec<String> = TEST_LINES.iter().map(|line| (*line).to_owned()).collect();
	// A few random strings, they should mostly be rejected
	for len in [6, 10, 16] {
		lines.push(random_line(len));
	}

	for (line, verdict) in lines.iter().zip(classifier.classify_all(&lines)) {
		println!("{}", report(&classifier, line, &verdict));
	}

	Ok(())
}
