use std::time::Duration;

use margin_annotation::AnalyzerError;
use thiserror::Error;

/// Errors surfaced by [`AnnotationScheduler`](crate::AnnotationScheduler).
#[derive(Debug, Error)]
pub enum SchedulerError {
	/// The analyzer failed or panicked; the run produced no result.
	#[error("analysis run {generation} failed: {source}")]
	AnalyzerFault {
		generation: u64,
		#[source]
		source: AnalyzerError,
	},

	/// The worker did not exit in time and was detached.
	#[error("annotation worker did not exit within {0:?}")]
	ShutdownTimeout(Duration),

	/// Submission after `terminate`.
	#[error("annotation scheduler has been terminated")]
	Terminated,

	/// The worker thread could not be spawned.
	#[error("failed to spawn annotation worker: {0}")]
	Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
