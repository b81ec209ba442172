//! Edit-to-analysis adapter.
//!
//! The pipeline lives on the interactive side. Edits restart a debounce; the
//! host calls [`AnnotationPipeline::tick`] from its event loop (using
//! [`AnnotationPipeline::next_deadline`] to schedule the wakeup), and applies
//! delivered results with [`AnnotationPipeline::drain_events`] or
//! [`AnnotationPipeline::next_event`]. Nothing here blocks on the worker
//! except [`AnnotationPipeline::shutdown`].

use std::time::{Duration, Instant};

use margin_annotation::Analyzer;
use margin_scheduler::{AnnotationScheduler, EventReceiver, SchedulerConfig, SchedulerError};
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, trace, warn};

use crate::config::MarginConfig;
use crate::debounce::Debouncer;
use crate::source::{Extracted, LineSource, extract_lines};
use crate::view::{AnnotationView, ApplyOutcome};

/// Result of polling the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
	/// No refresh pending.
	Idle,
	/// A refresh is pending but not yet due.
	Waiting,
	/// A snapshot was submitted under this generation.
	Submitted(u64),
	/// The buffer was blank; the view was cleared and the blank snapshot
	/// submitted under this generation.
	Cleared(u64),
}

pub struct AnnotationPipeline<A: Analyzer> {
	scheduler: AnnotationScheduler<A>,
	events: EventReceiver,
	debouncer: Debouncer,
	view: AnnotationView,
}

impl<A: Analyzer> AnnotationPipeline<A> {
	pub fn new(analyzer: A, config: &MarginConfig) -> Self {
		Self::with_parts(analyzer, config.worker.scheduler_config(), Debouncer::new(config.pipeline.debounce()))
	}

	pub fn with_parts(analyzer: A, scheduler: SchedulerConfig, debouncer: Debouncer) -> Self {
		let (scheduler, events) = AnnotationScheduler::new(analyzer, scheduler);
		Self {
			scheduler,
			events,
			debouncer,
			view: AnnotationView::new(),
		}
	}

	/// Records a buffer edit. The refresh happens on the first `tick` after the
	/// debounce interval passes without further edits.
	pub fn on_buffer_changed(&mut self, now: Instant) {
		self.debouncer.restart(now);
		trace!(deadline_in_ms = self.debouncer.interval().as_millis() as u64, "pipeline.debounce.restart");
	}

	/// Refreshes from `source` if the debounce has fired.
	pub fn tick<S: LineSource + ?Sized>(&mut self, now: Instant, source: &S) -> Result<TickOutcome, SchedulerError> {
		if !self.debouncer.is_pending() {
			return Ok(TickOutcome::Idle);
		}
		if !self.debouncer.fire_if_due(now) {
			return Ok(TickOutcome::Waiting);
		}
		self.refresh(source)
	}

	/// Refreshes immediately, e.g. after loading a file or replacing the
	/// whole buffer. Cancels any pending debounce.
	pub fn refresh_now<S: LineSource + ?Sized>(&mut self, source: &S) -> Result<TickOutcome, SchedulerError> {
		self.debouncer.cancel();
		self.refresh(source)
	}

	fn refresh<S: LineSource + ?Sized>(&mut self, source: &S) -> Result<TickOutcome, SchedulerError> {
		self.view.clear_highlight();
		let Extracted { snapshot, all_blank } = extract_lines(source);
		let lines = snapshot.len();

		let generation = self.scheduler.submit(snapshot).inspect_err(|err| {
			warn!(error = %err, lines, "pipeline.submit_failed");
		})?;

		if all_blank {
			self.view.clear_through(generation);
			debug!(generation, lines, "pipeline.blank");
			Ok(TickOutcome::Cleared(generation))
		} else {
			debug!(generation, lines, "pipeline.refresh");
			Ok(TickOutcome::Submitted(generation))
		}
	}

	/// Records a cursor movement, which dismisses the highlighted line.
	/// Returns true if a line was highlighted.
	pub fn on_cursor_moved(&mut self) -> bool {
		let cleared = self.view.clear_highlight();
		if cleared {
			trace!("pipeline.highlight.cleared");
		}
		cleared
	}

	/// Applies every event delivered so far. Returns how many were received.
	pub fn drain_events(&mut self) -> usize {
		let mut received = 0;
		loop {
			match self.events.try_recv() {
				Ok(event) => {
					self.view.apply(event);
					received += 1;
				}
				Err(TryRecvError::Empty | TryRecvError::Disconnected) => return received,
			}
		}
	}

	/// Waits for the next event and applies it. Returns `None` once the
	/// worker is gone and every event has been consumed.
	pub async fn next_event(&mut self) -> Option<ApplyOutcome> {
		let event = self.events.recv().await?;
		Some(self.view.apply(event))
	}

	/// When the pending refresh becomes due.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.debouncer.deadline()
	}

	pub fn view(&self) -> &AnnotationView {
		&self.view
	}

	pub fn view_mut(&mut self) -> &mut AnnotationView {
		&mut self.view
	}

	pub fn scheduler(&self) -> &AnnotationScheduler<A> {
		&self.scheduler
	}

	/// Cancels the debounce and stops the worker, waiting at most `timeout`.
	pub fn shutdown(&mut self, timeout: Duration) -> Result<(), SchedulerError> {
		self.debouncer.cancel();
		self.scheduler.shutdown(timeout)
	}
}

#[cfg(test)]
mod tests {
	use margin_annotation::{Category, TableAnalyzer};
	use pretty_assertions::assert_eq;
	use ropey::Rope;
	use tokio::time::timeout;

	use super::*;

	const DEBOUNCE: Duration = Duration::from_millis(400);

	fn pipeline() -> AnnotationPipeline<TableAnalyzer> {
		AnnotationPipeline::new(TableAnalyzer::reference(), &MarginConfig::default())
	}

	async fn settle<A: Analyzer>(pipeline: &mut AnnotationPipeline<A>) -> ApplyOutcome {
		timeout(Duration::from_secs(5), pipeline.next_event())
			.await
			.expect("timed out waiting for pipeline event")
			.expect("event stream closed")
	}

	#[test]
	fn tick_waits_for_debounce() {
		let mut pipeline = pipeline();
		let start = Instant::now();
		let buffer = Rope::from_str("XX,1\n");

		assert_eq!(pipeline.tick(start, &buffer).unwrap(), TickOutcome::Idle);
		pipeline.on_buffer_changed(start);
		assert_eq!(pipeline.next_deadline(), Some(start + DEBOUNCE));
		assert_eq!(pipeline.tick(start + DEBOUNCE / 2, &buffer).unwrap(), TickOutcome::Waiting);
		assert!(!pipeline.scheduler().is_started());

		assert_eq!(pipeline.tick(start + DEBOUNCE, &buffer).unwrap(), TickOutcome::Submitted(1));
		assert_eq!(pipeline.next_deadline(), None);
		assert_eq!(pipeline.tick(start + DEBOUNCE * 2, &buffer).unwrap(), TickOutcome::Idle);
	}

	#[test]
	fn edits_during_debounce_postpone_refresh() {
		let mut pipeline = pipeline();
		let start = Instant::now();
		let buffer = Rope::from_str("XX,1\n");

		for step in 0..5u32 {
			pipeline.on_buffer_changed(start + Duration::from_millis(100) * step);
		}
		let last_edit = start + Duration::from_millis(400);
		assert_eq!(pipeline.tick(last_edit + DEBOUNCE - Duration::from_millis(1), &buffer).unwrap(), TickOutcome::Waiting);
		assert_eq!(pipeline.tick(last_edit + DEBOUNCE, &buffer).unwrap(), TickOutcome::Submitted(1));
	}

	#[tokio::test]
	async fn refresh_applies_results_to_view() {
		let mut pipeline = pipeline();
		let buffer = Rope::from_str("XX,1 AA,1,2,4\nYY,4 BB,1,2,8\n");

		assert_eq!(pipeline.refresh_now(&buffer).unwrap(), TickOutcome::Submitted(1));
		assert_eq!(settle(&mut pipeline).await, ApplyOutcome::Replaced);

		let view = pipeline.view();
		assert_eq!(view.generation(), 1);
		assert_eq!(view.line(0).len(), 4);
		assert_eq!(view.line(1)[0].category(), Category::Hint);

		let lines = LineSource::lines(&buffer);
		let markers = view.markers(&lines);
		assert_eq!(markers.len(), 2);
		assert_eq!(markers[0].label, "This is an XX message 4 (4)");
		assert_eq!(markers[1].label, "This is a YY message");
	}

	#[tokio::test]
	async fn blank_buffer_clears_view_immediately() {
		let mut pipeline = pipeline();
		pipeline.refresh_now("ZZ,1").unwrap();
		settle(&mut pipeline).await;
		assert_eq!(pipeline.view().annotations().len(), 1);

		pipeline.view_mut().highlight(0);
		assert_eq!(pipeline.refresh_now(" \n\t\n").unwrap(), TickOutcome::Cleared(2));
		assert!(pipeline.view().annotations().is_empty());
		assert_eq!(pipeline.view().highlight_state().line(), None);

		// The worker's acknowledgement is already reflected in the view.
		assert_eq!(settle(&mut pipeline).await, ApplyOutcome::Stale);
		assert!(pipeline.view().annotations().is_empty());
	}

	#[tokio::test]
	async fn drain_applies_pending_events() {
		let mut pipeline = pipeline();
		pipeline.refresh_now("XX").unwrap();

		timeout(Duration::from_secs(5), async {
			while pipeline.drain_events() == 0 {
				tokio::time::sleep(Duration::from_millis(1)).await;
			}
		})
		.await
		.expect("no event delivered");
		assert_eq!(pipeline.view().line(0).len(), 4);
	}

	#[test]
	fn cursor_movement_clears_highlight() {
		let mut pipeline = pipeline();
		assert!(!pipeline.on_cursor_moved());

		pipeline.view_mut().highlight(2);
		assert!(pipeline.on_cursor_moved());
		assert_eq!(pipeline.view().highlight_state().line(), None);
		assert!(!pipeline.scheduler().is_started());
	}

	#[test]
	fn submit_after_shutdown_is_reported() {
		let mut pipeline = pipeline();
		pipeline.shutdown(Duration::from_millis(100)).unwrap();
		assert!(matches!(pipeline.refresh_now("XX"), Err(SchedulerError::Terminated)));
	}
}
