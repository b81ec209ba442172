//! The annotation worker loop.
//!
//! Runs on the scheduler's dedicated thread. Each iteration blocks on the
//! mailbox, then drives the analyzer for the received job while checking the
//! job's token after every step. A cancelled token means a newer snapshot is
//! already waiting in the mailbox (or the scheduler is terminating), so the
//! run is dropped without an event.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use margin_annotation::{Analyzer, AnalyzerError, AnnotationMap, Snapshot};
use margin_worker::{GenerationToken, MailboxReceiver, TaskClass, panic_message};
use tracing::{debug, trace, warn};

use crate::SchedulerError;
use crate::event::{EventSender, SchedulerEvent};

/// One submitted snapshot and the token that supersedes it.
pub(crate) struct Job {
	pub(crate) snapshot: Snapshot,
	pub(crate) token: GenerationToken,
}

enum RunOutcome {
	Complete { annotations: AnnotationMap, steps: usize },
	Cancelled { steps: usize },
	Failed(AnalyzerError),
}

pub(crate) struct Worker<A> {
	pub(crate) analyzer: A,
	pub(crate) jobs: MailboxReceiver<Job>,
	pub(crate) events: EventSender,
	pub(crate) class: TaskClass,
}

impl<A: Analyzer> Worker<A> {
	pub(crate) fn run(mut self) {
		debug!(worker_class = self.class.as_str(), analyzer = self.analyzer.name(), "annotate.worker.start");

		while let Some(job) = self.jobs.recv() {
			let generation = job.token.generation();
			if job.token.is_cancelled() {
				trace!(generation, "annotate.run.skipped");
				continue;
			}

			if job.snapshot.is_blank() {
				trace!(generation, lines = job.snapshot.len(), "annotate.run.blank");
				self.emit(SchedulerEvent::Cleared { generation });
				continue;
			}

			let started = Instant::now();
			trace!(generation, lines = job.snapshot.len(), worker_class = self.class.as_str(), "annotate.run.start");
			match self.run_job(&job) {
				RunOutcome::Complete { annotations, steps } => {
					debug!(
						generation,
						steps,
						annotated_lines = annotations.len(),
						elapsed_us = started.elapsed().as_micros() as u64,
						"annotate.run.complete"
					);
					self.emit(SchedulerEvent::Analyzed { generation, annotations });
				}
				RunOutcome::Cancelled { steps } => {
					trace!(generation, steps, "annotate.run.cancelled");
				}
				RunOutcome::Failed(source) => {
					warn!(generation, analyzer = self.analyzer.name(), error = %source, "annotate.run.failed");
					self.emit(SchedulerEvent::Failed {
						generation,
						error: SchedulerError::AnalyzerFault { generation, source },
					});
				}
			}
		}

		debug!(analyzer = self.analyzer.name(), "annotate.worker.exit");
	}

	fn run_job(&mut self, job: &Job) -> RunOutcome {
		let analyzer = &mut self.analyzer;
		match panic::catch_unwind(AssertUnwindSafe(|| drive(analyzer, job))) {
			Ok(outcome) => outcome,
			Err(payload) => {
				let message = panic_message(payload.as_ref()).unwrap_or_else(|| "non-string panic payload".to_string());
				RunOutcome::Failed(AnalyzerError::fault(format!("analyzer panicked: {message}")))
			}
		}
	}

	fn emit(&self, event: SchedulerEvent) {
		if self.events.send(event).is_err() {
			trace!("annotate.event.dropped");
		}
	}
}

fn drive<A: Analyzer>(analyzer: &mut A, job: &Job) -> RunOutcome {
	analyzer.prepare_analysis(job.snapshot.clone());

	let mut steps = 0;
	loop {
		let more = match analyzer.analyze_step() {
			Ok(more) => more,
			Err(err) => return RunOutcome::Failed(err),
		};
		steps += 1;
		if job.token.is_cancelled() {
			return RunOutcome::Cancelled { steps };
		}
		if !more {
			break;
		}
	}

	match analyzer.analysis_result() {
		Ok(annotations) => RunOutcome::Complete { annotations, steps },
		Err(err) => RunOutcome::Failed(err),
	}
}
