//! Collapsed-marker selection for a line's annotations.

use std::borrow::Cow;

use crate::model::Annotation;

/// The default entry chosen for a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority<'a> {
	/// Index of the chosen entry, `None` for an empty line.
	pub index: Option<usize>,
	/// Message of the chosen entry, empty for an empty line.
	pub message: &'a str,
	/// Total number of entries on the line.
	pub count: usize,
	entries: &'a [Annotation],
}

impl<'a> Priority<'a> {
	/// The chosen annotation.
	pub fn entry(&self) -> Option<&'a Annotation> {
		self.index.map(|index| &self.entries[index])
	}

	/// Collapsed label: the message, suffixed with ` (N)` when the line has more
	/// than one entry.
	pub fn label(&self) -> Cow<'a, str> {
		if self.count > 1 {
			Cow::Owned(format!("{} ({})", self.message, self.count))
		} else {
			Cow::Borrowed(self.message)
		}
	}
}

/// Picks the most severe entry, lowest index first among equals.
pub fn reduce(entries: &[Annotation]) -> Priority<'_> {
	let mut best: Option<usize> = None;
	for (index, annotation) in entries.iter().enumerate() {
		match best {
			Some(current) if entries[current].category() >= annotation.category() => {}
			_ => best = Some(index),
		}
	}

	Priority {
		index: best,
		message: best.map(|index| entries[index].message()).unwrap_or(""),
		count: entries.len(),
		entries,
	}
}
