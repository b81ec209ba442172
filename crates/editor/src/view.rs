//! Presentation state for delivered annotations.
//!
//! [`AnnotationView`] holds the live [`AnnotationMap`] and the highlighted line.
//! It is only touched from the interactive side: scheduler events are applied
//! to it in delivery order, and renderers read markers and popups from it.

use margin_annotation::{AlertColor, Annotation, AnnotationMap, priority};
use margin_scheduler::SchedulerEvent;
use serde::Serialize;
use tracing::{debug, trace};

/// Collapsed marker for one annotated line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMarker {
	pub line: usize,
	/// Default entry's message, with ` (N)` appended for several entries.
	pub label: String,
	pub color: AlertColor,
	pub count: usize,
	pub default_index: usize,
}

/// One row of the details popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupEntry {
	pub message: String,
	pub help: String,
	pub color: AlertColor,
}

impl From<&Annotation> for PopupEntry {
	fn from(annotation: &Annotation) -> Self {
		Self {
			message: annotation.message().to_string(),
			help: annotation.solution_help().to_string(),
			color: annotation.alert_color().clone(),
		}
	}
}

/// What the last applied event did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
	Replaced,
	Cleared,
	/// Previous map kept after a failed run.
	Failed,
	/// Event was older than what the view already shows.
	Stale,
}

/// The currently highlighted line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightState {
	line: Option<usize>,
}

impl HighlightState {
	pub fn line(&self) -> Option<usize> {
		self.line
	}

	/// Returns true if the highlighted line changed.
	pub fn set(&mut self, line: usize) -> bool {
		self.line.replace(line) != Some(line)
	}

	/// Returns true if a line was highlighted.
	pub fn clear(&mut self) -> bool {
		self.line.take().is_some()
	}
}

#[derive(Debug, Default)]
pub struct AnnotationView {
	annotations: AnnotationMap,
	generation: u64,
	highlight: HighlightState,
}

impl AnnotationView {
	pub fn new() -> Self {
		Self::default()
	}

	/// Applies a scheduler event. Events not newer than the last applied one
	/// are ignored.
	pub fn apply(&mut self, event: SchedulerEvent) -> ApplyOutcome {
		let generation = event.generation();
		if generation <= self.generation {
			trace!(generation, current = self.generation, "view.apply.stale");
			return ApplyOutcome::Stale;
		}
		self.generation = generation;

		match event {
			SchedulerEvent::Analyzed { annotations, .. } => {
				debug!(generation, lines = annotations.len(), "view.apply.analyzed");
				self.annotations = annotations;
				ApplyOutcome::Replaced
			}
			SchedulerEvent::Cleared { .. } => {
				self.annotations.clear();
				ApplyOutcome::Cleared
			}
			SchedulerEvent::Failed { error, .. } => {
				debug!(generation, %error, "view.apply.failed");
				ApplyOutcome::Failed
			}
		}
	}

	/// Empties the live map for a blank buffer and drops any pending event up
	/// to `generation`.
	pub fn clear_through(&mut self, generation: u64) {
		self.annotations.clear();
		self.generation = self.generation.max(generation);
	}

	/// Generation of the last applied event, 0 before any.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn annotations(&self) -> &AnnotationMap {
		&self.annotations
	}

	pub fn line(&self, line: usize) -> &[Annotation] {
		self.annotations.line(line)
	}

	/// Markers for annotated lines whose current text is non-empty.
	///
	/// `source_lines` is the buffer as it is now, which may have moved on since
	/// the map was produced.
	pub fn markers<S: AsRef<str>>(&self, source_lines: &[S]) -> Vec<LineMarker> {
		self.annotations
			.iter()
			.filter(|(line, _)| source_lines.get(*line).is_some_and(|text| !text.as_ref().is_empty()))
			.filter_map(|(line, entries)| {
				let chosen = priority::reduce(entries);
				let entry = chosen.entry()?;
				Some(LineMarker {
					line,
					label: chosen.label().into_owned(),
					color: entry.alert_color().clone(),
					count: chosen.count,
					default_index: chosen.index?,
				})
			})
			.collect()
	}

	/// Every entry on `line`, for the details popup.
	pub fn popup(&self, line: usize) -> Vec<PopupEntry> {
		self.line(line).iter().map(PopupEntry::from).collect()
	}

	pub fn highlight(&mut self, line: usize) -> bool {
		self.highlight.set(line)
	}

	pub fn clear_highlight(&mut self) -> bool {
		self.highlight.clear()
	}

	pub fn highlight_state(&self) -> HighlightState {
		self.highlight
	}
}
