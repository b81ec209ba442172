//! Reference analyzer: first comma-separated token looked up in a fixed table.

use std::collections::HashMap;

use crate::analyzer::{LineAnalyzer, LineRule};
use crate::error::AnalyzerError;
use crate::model::{Annotation, Category, LineAnnotations};

/// [`LineAnalyzer`] over a [`TableRule`].
pub type TableAnalyzer = LineAnalyzer<TableRule>;

impl TableAnalyzer {
	/// Analyzer over [`TableRule::reference`].
	pub fn reference() -> Self {
		LineAnalyzer::new(TableRule::reference())
	}
}

/// Maps the first `,`-delimited token of a line to a fixed set of annotations.
#[derive(Debug, Clone, Default)]
pub struct TableRule {
	entries: HashMap<String, LineAnnotations>,
}

impl TableRule {
	pub fn builder() -> TableRuleBuilder {
		TableRuleBuilder::default()
	}

	/// The demo table with `XX`, `YY` and `ZZ` keys.
	pub fn reference() -> Self {
		let entry = |category, color: &str, message: String, help: String| Annotation::new(category, message).with_color(color).with_help(help);
		let four = |key: &str, colors: [&str; 4]| {
			vec![
				entry(Category::Unspecified, colors[0], format!("This is an {key} message 1"), format!("This is an {key} Error 1")),
				entry(
					Category::Hint,
					colors[1],
					format!("This is an {key} message 2  to be or not to be"),
					format!("This is an {key} command 2"),
				),
				entry(Category::Warning, colors[2], format!("This is an {key} message 3"), format!("This is an {key} command 3")),
				entry(Category::Error, colors[3], format!("This is an {key} message 4"), format!("This is an {key} command 4")),
			]
		};

		Self::builder()
			.entry("XX", four("XX", ["green", "#FF00FF", "blue", "red"]))
			.entry(
				"YY",
				vec![entry(Category::Hint, "blue", "This is a YY message".into(), "This is a YY command".into())],
			)
			.entry("ZZ", four("ZZ", ["yellow", "magenta", "#00FF00", "red"]))
			.build()
	}

	/// Annotations for `token`; empty when the token is not in the table.
	pub fn lookup(&self, token: &str) -> &[Annotation] {
		self.entries.get(token).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl LineRule for TableRule {
	fn scan_line(&self, _line: usize, text: &str) -> Result<LineAnnotations, AnalyzerError> {
		let token = text.split(',').next().unwrap_or_default();
		Ok(self.lookup(token).to_vec())
	}

	fn name(&self) -> &str {
		"table"
	}
}

/// Builder for [`TableRule`].
#[derive(Debug, Default)]
pub struct TableRuleBuilder {
	entries: HashMap<String, LineAnnotations>,
}

impl TableRuleBuilder {
	/// Registers `annotations` for lines whose first token is `token`.
	///
	/// A repeated token replaces the earlier entry.
	pub fn entry(mut self, token: impl Into<String>, annotations: LineAnnotations) -> Self {
		self.entries.insert(token.into(), annotations);
		self
	}

	pub fn build(self) -> TableRule {
		TableRule { entries: self.entries }
	}
}
