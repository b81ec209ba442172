use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Severity class of an [`Annotation`].
///
/// Variant order is severity order: `Error > Warning > Hint > Unspecified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	#[default]
	Unspecified,
	Hint,
	Warning,
	Error,
}

impl Category {
	/// Categories from most to least severe.
	pub const BY_SEVERITY: [Category; 4] = [Category::Error, Category::Warning, Category::Hint, Category::Unspecified];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Unspecified => "unspecified",
			Self::Hint => "hint",
			Self::Warning => "warning",
			Self::Error => "error",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Display color attached to an annotation.
///
/// Either a named color (`"red"`) or `#RRGGBB`. The engine carries it through
/// untouched; only renderers look inside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertColor(String);

impl AlertColor {
	pub fn new(color: impl Into<String>) -> Self {
		Self(color.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for AlertColor {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl fmt::Display for AlertColor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// One diagnostic entry attached to a line.
///
/// Immutable once built; analyzers construct it with the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
	category: Category,
	alert_color: AlertColor,
	message: String,
	solution_help: String,
}

impl Annotation {
	pub fn new(category: Category, message: impl Into<String>) -> Self {
		Self {
			category,
			alert_color: AlertColor::default(),
			message: message.into(),
			solution_help: String::new(),
		}
	}

	pub fn with_color(mut self, color: impl Into<AlertColor>) -> Self {
		self.alert_color = color.into();
		self
	}

	pub fn with_help(mut self, help: impl Into<String>) -> Self {
		self.solution_help = help.into();
		self
	}

	pub fn category(&self) -> Category {
		self.category
	}

	pub fn alert_color(&self) -> &AlertColor {
		&self.alert_color
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn solution_help(&self) -> &str {
		&self.solution_help
	}
}

/// Annotations for one line in analyzer emission order.
pub type LineAnnotations = Vec<Annotation>;

/// Zero-based line number to annotations.
///
/// A missing key and an empty entry mean the same thing, so empty entries are
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationMap {
	lines: BTreeMap<usize, LineAnnotations>,
}

impl AnnotationMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the annotations for `line`, replacing what was there.
	///
	/// An empty `annotations` removes the line.
	pub fn insert(&mut self, line: usize, annotations: LineAnnotations) {
		if annotations.is_empty() {
			self.lines.remove(&line);
		} else {
			self.lines.insert(line, annotations);
		}
	}

	/// Annotations for `line`; empty for clean lines.
	pub fn line(&self, line: usize) -> &[Annotation] {
		self.lines.get(&line).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn contains_line(&self, line: usize) -> bool {
		self.lines.contains_key(&line)
	}

	/// Number of annotated lines.
	pub fn len(&self) -> usize {
		self.lines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	/// Total number of annotations across all lines.
	pub fn annotation_count(&self) -> usize {
		self.lines.values().map(Vec::len).sum()
	}

	/// Annotated lines in ascending line order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, &[Annotation])> {
		self.lines.iter().map(|(line, entries)| (*line, entries.as_slice()))
	}

	pub fn clear(&mut self) {
		self.lines.clear();
	}
}

impl FromIterator<(usize, LineAnnotations)> for AnnotationMap {
	fn from_iter<I: IntoIterator<Item = (usize, LineAnnotations)>>(iter: I) -> Self {
		let mut map = Self::new();
		for (line, annotations) in iter {
			map.insert(line, annotations);
		}
		map
	}
}

/// Immutable copy of the buffer's lines at submission time.
///
/// Clones share storage, so handing a snapshot to an analyzer never ties it to
/// the live buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
	lines: Arc<[String]>,
}

impl Snapshot {
	pub fn new(lines: impl Into<Arc<[String]>>) -> Self {
		Self { lines: lines.into() }
	}

	pub fn empty() -> Self {
		Self::new(Vec::<String>::new())
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	pub fn line(&self, index: usize) -> Option<&str> {
		self.lines.get(index).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.lines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	/// True when no line has non-whitespace content.
	pub fn is_blank(&self) -> bool {
		self.lines.iter().all(|line| line.trim().is_empty())
	}
}

impl Default for Snapshot {
	fn default() -> Self {
		Self::empty()
	}
}

impl From<Vec<String>> for Snapshot {
	fn from(lines: Vec<String>) -> Self {
		Self::new(lines)
	}
}

impl<'a> FromIterator<&'a str> for Snapshot {
	fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
		Self::new(iter.into_iter().map(str::to_owned).collect::<Vec<_>>())
	}
}
