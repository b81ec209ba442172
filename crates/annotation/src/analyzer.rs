//! Stepwise analysis contract.
//!
//! An [`Analyzer`] is driven in three phases by exactly one thread at a time:
//!
//! 1. [`Analyzer::prepare_analysis`] hands over a [`Snapshot`] and resets the cursor.
//! 2. [`Analyzer::analyze_step`] is called until it returns `Ok(false)`. The caller
//!    may stop calling it at any step boundary; the analyzer is never told.
//! 3. [`Analyzer::analysis_result`] takes the accumulated map.
//!
//! Taking a result without a completed run fails with
//! [`AnalyzerError::InvalidState`]. This includes a second call after the result
//! was already taken, so nothing accumulated by one run can surface in another.

use crate::error::AnalyzerError;
use crate::model::{AnnotationMap, LineAnnotations, Snapshot};

/// Pluggable stepwise analyzer.
pub trait Analyzer: Send + 'static {
	/// Resets internal state to the start of `snapshot`.
	fn prepare_analysis(&mut self, snapshot: Snapshot);

	/// Performs one unit of work. Returns whether more steps remain.
	fn analyze_step(&mut self) -> Result<bool, AnalyzerError>;

	/// Takes the map produced by the completed run and clears accumulation state.
	fn analysis_result(&mut self) -> Result<AnnotationMap, AnalyzerError>;

	/// Short name used in log fields.
	fn name(&self) -> &str {
		"analyzer"
	}
}

impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
	fn prepare_analysis(&mut self, snapshot: Snapshot) {
		(**self).prepare_analysis(snapshot);
	}

	fn analyze_step(&mut self) -> Result<bool, AnalyzerError> {
		(**self).analyze_step()
	}

	fn analysis_result(&mut self) -> Result<AnnotationMap, AnalyzerError> {
		(**self).analysis_result()
	}

	fn name(&self) -> &str {
		(**self).name()
	}
}

/// Stateless per-line rule.
///
/// Wrap one in [`LineAnalyzer`] to get an [`Analyzer`] that scans one line per step.
pub trait LineRule: Send + 'static {
	fn scan_line(&self, line: usize, text: &str) -> Result<LineAnnotations, AnalyzerError>;

	fn name(&self) -> &str {
		"line-rule"
	}
}

#[derive(Debug, Default)]
enum RunState {
	#[default]
	Idle,
	Running {
		cursor: usize,
	},
	Complete,
}

/// [`Analyzer`] that applies a [`LineRule`] to one line per step.
#[derive(Debug)]
pub struct LineAnalyzer<R> {
	rule: R,
	snapshot: Snapshot,
	state: RunState,
	accumulated: AnnotationMap,
}

impl<R: LineRule> LineAnalyzer<R> {
	pub fn new(rule: R) -> Self {
		Self {
			rule,
			snapshot: Snapshot::empty(),
			state: RunState::Idle,
			accumulated: AnnotationMap::new(),
		}
	}
}

impl<R: LineRule> Analyzer for LineAnalyzer<R> {
	fn prepare_analysis(&mut self, snapshot: Snapshot) {
		self.snapshot = snapshot;
		self.accumulated.clear();
		self.state = RunState::Running { cursor: 0 };
	}

	fn analyze_step(&mut self) -> Result<bool, AnalyzerError> {
		let RunState::Running { cursor } = self.state else {
			return Err(AnalyzerError::InvalidState("analyze_step called without a prepared run"));
		};

		if let Some(text) = self.snapshot.line(cursor) {
			match self.rule.scan_line(cursor, text) {
				Ok(annotations) => self.accumulated.insert(cursor, annotations),
				Err(err) => {
					tracing::debug!(line = cursor, rule = self.rule.name(), error = %err, "analyzer.line_fault");
					self.state = RunState::Idle;
					self.accumulated.clear();
					return Err(err);
				}
			}
		}

		let next = cursor + 1;
		if next < self.snapshot.len() {
			self.state = RunState::Running { cursor: next };
			Ok(true)
		} else {
			self.state = RunState::Complete;
			Ok(false)
		}
	}

	fn analysis_result(&mut self) -> Result<AnnotationMap, AnalyzerError> {
		match self.state {
			RunState::Complete => {
				self.state = RunState::Idle;
				Ok(std::mem::take(&mut self.accumulated))
			}
			RunState::Running { .. } => Err(AnalyzerError::InvalidState("analysis_result called mid-run")),
			RunState::Idle => Err(AnalyzerError::InvalidState("analysis_result called without a completed run")),
		}
	}

	fn name(&self) -> &str {
		self.rule.name()
	}
}
