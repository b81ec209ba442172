//! Line extraction from editor buffers.

use margin_annotation::Snapshot;
use ropey::Rope;

/// Buffer contents as plain lines, without terminators.
pub trait LineSource {
	fn lines(&self) -> Vec<String>;
}

impl LineSource for Rope {
	/// Splits on `\n` only; other Unicode line breaks stay in the line text.
	fn lines(&self) -> Vec<String> {
		split_lines(&String::from(self))
	}
}

impl LineSource for str {
	fn lines(&self) -> Vec<String> {
		split_lines(self)
	}
}

impl LineSource for String {
	fn lines(&self) -> Vec<String> {
		split_lines(self)
	}
}

impl LineSource for [String] {
	fn lines(&self) -> Vec<String> {
		self.to_vec()
	}
}

impl LineSource for Vec<String> {
	fn lines(&self) -> Vec<String> {
		self.clone()
	}
}

/// `\n`-separated lines with a trailing `\r` removed. A trailing newline
/// yields a final empty line.
fn split_lines(text: &str) -> Vec<String> {
	text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned()).collect()
}

/// Lines captured for one refresh.
#[derive(Debug, Clone)]
pub struct Extracted {
	pub snapshot: Snapshot,
	/// True when every line is empty or whitespace.
	pub all_blank: bool,
}

pub fn extract_lines<S: LineSource + ?Sized>(source: &S) -> Extracted {
	let snapshot = Snapshot::new(source.lines());
	let all_blank = snapshot.is_blank();
	Extracted { snapshot, all_blank }
}
