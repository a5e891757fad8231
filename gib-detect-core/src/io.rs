use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Reads a text file and returns its non-blank lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Each line is kept as-is (no trimming), blank lines are dropped
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(str::to_owned)
		.collect())
}

/// Reads an alphabet file.
///
/// Every character of the file is a symbol, line terminators excepted, so
/// an alphabet may span several lines and may contain spaces.
pub(crate) fn read_alphabet<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().collect())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/en-training.txt` + `"bin"` → `data/en-training.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Resolves `path` against `base` unless it is already absolute.
pub(crate) fn resolve_path(base: &Path, path: &Path) -> PathBuf {
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		base.join(path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn test_read_lines_drops_blank_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("corpus.txt");
		fs::write(&path, "hello world\r\n\n  \nmy name is Shir\n").unwrap();

		assert_eq!(read_lines(&path).unwrap(), vec!["hello world", "my name is Shir"]);
	}

	#[test]
	fn test_read_alphabet_keeps_spaces() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("alphabet.txt");
		fs::write(&path, " abc\ndéf\n").unwrap();

		assert_eq!(read_alphabet(&path).unwrap(), " abcdéf");
	}

	#[test]
	fn test_build_output_path() {
		let output = build_output_path("data/en-training.txt", "bin").unwrap();
		assert_eq!(output, PathBuf::from("data/en-training.bin"));
		assert!(build_output_path("", "bin").is_err());
	}

	#[test]
	fn test_resolve_path() {
		let base = Path::new("/etc/gib");
		assert_eq!(resolve_path(base, Path::new("good.txt")), PathBuf::from("/etc/gib/good.txt"));
		assert_eq!(resolve_path(base, Path::new("/tmp/bad.txt")), PathBuf::from("/tmp/bad.txt"));
	}
}
