//! Background annotation scheduler.
//!
//! [`AnnotationScheduler`] owns one analyzer and, once the first snapshot is
//! submitted, exactly one worker thread that drives it. Submissions never
//! block: a newer snapshot replaces any snapshot the worker has not picked up
//! yet and cancels the run in flight, so only the latest input is ever analyzed
//! to completion. Results are delivered as [`SchedulerEvent`]s on an unbounded
//! channel that the interactive side drains at its own pace.
//!
//! # Cancellation
//!
//! Cancellation is cooperative and checked after every
//! [`Analyzer::analyze_step`](margin_annotation::Analyzer::analyze_step), so a
//! superseded run costs at most one more step. An analyzer that never returns
//! from a step is not detected; [`AnnotationScheduler::shutdown`] then reports
//! [`SchedulerError::ShutdownTimeout`] and leaves the thread detached.

mod error;
mod event;
mod worker;


use std::time::Duration;

pub use error::{Result, SchedulerError};
pub use event::{EventReceiver, SchedulerEvent};
use margin_annotation::{Analyzer, Snapshot};
use margin_worker::{ExitSignal, GenerationClock, GenerationToken, LatestMailbox, MailboxSendOutcome, MailboxSender, TaskClass, spawn_named_thread};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::event::EventSender;
use crate::worker::{Job, Worker};

/// Default name of the worker thread.
pub const DEFAULT_THREAD_NAME: &str = "margin-annotate";

/// Default bound on the teardown join.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Worker thread settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
	pub thread_name: String,
	/// Scheduling hint recorded on the worker's events.
	pub class: TaskClass,
	/// Bound used by `Drop` when joining the worker.
	pub shutdown_timeout: Duration,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			thread_name: DEFAULT_THREAD_NAME.to_string(),
			class: TaskClass::Background,
			shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
		}
	}
}

struct WorkerHandle {
	thread: std::thread::JoinHandle<()>,
	exit: ExitSignal,
}

/// Runs an [`Analyzer`] on a lazily spawned background thread.
pub struct AnnotationScheduler<A: Analyzer> {
	config: SchedulerConfig,
	/// Moved into the worker when it starts.
	analyzer: Option<A>,
	mailbox: LatestMailbox<Job>,
	jobs: MailboxSender<Job>,
	events: EventSender,
	clock: GenerationClock,
	root: GenerationToken,
	last_run: Option<GenerationToken>,
	worker: Option<WorkerHandle>,
}

impl<A: Analyzer> AnnotationScheduler<A> {
	/// Creates a scheduler and its event stream. No thread is spawned yet.
	pub fn new(analyzer: A, config: SchedulerConfig) -> (Self, EventReceiver) {
		let (events, rx) = mpsc::unbounded_channel();
		let mailbox = LatestMailbox::new();
		let jobs = mailbox.sender();
		let scheduler = Self {
			config,
			analyzer: Some(analyzer),
			mailbox,
			jobs,
			events,
			clock: GenerationClock::new(),
			root: GenerationToken::root(),
			last_run: None,
			worker: None,
		};
		(scheduler, rx)
	}

	/// Queues `snapshot` for analysis and returns its generation.
	///
	/// Starts the worker on first use. Any snapshot still queued is dropped and
	/// the run in flight is cancelled at its next step boundary.
	pub fn submit(&mut self, snapshot: Snapshot) -> Result<u64> {
		if self.jobs.is_closed() {
			return Err(SchedulerError::Terminated);
		}
		self.ensure_worker()?;

		let generation = self.clock.next();
		let token = self.root.child(generation);
		let lines = snapshot.len();
		let outcome = self
			.jobs
			.send(Job {
				snapshot,
				token: token.clone(),
			})
			.map_err(|_| SchedulerError::Terminated)?;
		if let Some(previous) = self.last_run.replace(token) {
			previous.cancel();
		}

		trace!(generation, lines, coalesced = outcome == MailboxSendOutcome::Coalesced, "annotate.submit");
		Ok(generation)
	}

	/// Asks the worker to stop. Does not wait.
	///
	/// A queued snapshot is discarded and the run in flight stops at its next
	/// step boundary. Later submissions fail with [`SchedulerError::Terminated`].
	pub fn terminate(&self) {
		let discarded = self.jobs.close();
		self.root.cancel();
		debug!(discarded, "annotate.terminate");
	}

	/// Terminates the worker and waits up to `timeout` for it to exit.
	///
	/// On timeout the thread is detached and keeps whatever it holds until its
	/// current step returns.
	pub fn shutdown(&mut self, timeout: Duration) -> Result<()> {
		self.terminate();
		let Some(worker) = self.worker.take() else {
			return Ok(());
		};

		if !worker.exit.wait_for(timeout) {
			warn!(thread = %self.config.thread_name, ?timeout, "annotate.shutdown.timeout");
			return Err(SchedulerError::ShutdownTimeout(timeout));
		}
		if worker.thread.join().is_err() {
			warn!(thread = %self.config.thread_name, "annotate.shutdown.worker_panicked");
		}
		debug!(thread = %self.config.thread_name, "annotate.shutdown");
		Ok(())
	}

	/// True once the worker thread has been spawned.
	pub fn is_started(&self) -> bool {
		self.worker.is_some()
	}

	/// True after [`Self::terminate`] or [`Self::shutdown`].
	pub fn is_terminated(&self) -> bool {
		self.jobs.is_closed()
	}

	/// Generation of the latest submission, 0 before the first.
	pub fn generation(&self) -> u64 {
		self.clock.current()
	}

	pub fn config(&self) -> &SchedulerConfig {
		&self.config
	}

	fn ensure_worker(&mut self) -> Result<()> {
		if self.worker.is_some() {
			return Ok(());
		}
		let Some(analyzer) = self.analyzer.take() else {
			return Err(SchedulerError::Terminated);
		};

		let exit = ExitSignal::new();
		let guard = exit.guard();
		let worker = Worker {
			analyzer,
			jobs: self.mailbox.receiver(),
			events: self.events.clone(),
			class: self.config.class,
		};
		let spawned = spawn_named_thread(self.config.class, self.config.thread_name.clone(), move || {
			let _exit = guard;
			worker.run();
		});

		match spawned {
			Ok(thread) => {
				self.worker = Some(WorkerHandle { thread, exit });
				Ok(())
			}
			Err(err) => {
				warn!(thread = %self.config.thread_name, error = %err, "annotate.spawn_failed");
				self.jobs.close();
				Err(SchedulerError::Spawn(err))
			}
		}
	}
}

impl<A: Analyzer> Drop for AnnotationScheduler<A> {
	fn drop(&mut self) {
		if self.worker.is_some() {
			// A timeout is already logged by `shutdown`; the thread stays detached.
			let _ = self.shutdown(self.config.shutdown_timeout);
		}
	}
}
