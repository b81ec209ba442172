//! Restartable single-shot debounce timer.
//!
//! The timer holds a deadline instead of owning a clock. The caller passes `now`
//! on every call and decides when to poll, so tests drive it with synthetic
//! instants.

use std::time::{Duration, Instant};

/// Quiet period after the last edit before the pipeline refreshes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone)]
pub struct Debouncer {
	interval: Duration,
	deadline: Option<Instant>,
}

impl Default for Debouncer {
	fn default() -> Self {
		Self::new(DEFAULT_DEBOUNCE)
	}
}

impl Debouncer {
	pub fn new(interval: Duration) -> Self {
		Self { interval, deadline: None }
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Arms the timer to fire `interval` after `now`, replacing any earlier deadline.
	pub fn restart(&mut self, now: Instant) {
		self.deadline = Some(now + self.interval);
	}

	pub fn is_pending(&self) -> bool {
		self.deadline.is_some()
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Disarms and returns true if the deadline has passed.
	pub fn fire_if_due(&mut self, now: Instant) -> bool {
		match self.deadline {
			Some(deadline) if now >= deadline => {
				self.deadline = None;
				true
			}
			_ => false,
		}
	}

	pub fn cancel(&mut self) {
		self.deadline = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MS: Duration = Duration::from_millis(1);

	#[test]
	fn fires_once_after_interval() {
		let start = Instant::now();
		let mut debouncer = Debouncer::new(100 * MS);
		assert!(!debouncer.fire_if_due(start));

		debouncer.restart(start);
		assert!(debouncer.is_pending());
		assert!(!debouncer.fire_if_due(start + 99 * MS));
		assert!(debouncer.fire_if_due(start + 100 * MS));
		assert!(!debouncer.is_pending());
		assert!(!debouncer.fire_if_due(start + 500 * MS));
	}

	#[test]
	fn restart_pushes_deadline() {
		let start = Instant::now();
		let mut debouncer = Debouncer::new(100 * MS);

		debouncer.restart(start);
		debouncer.restart(start + 80 * MS);
		assert_eq!(debouncer.deadline(), Some(start + 180 * MS));
		assert!(!debouncer.fire_if_due(start + 120 * MS));
		assert!(debouncer.fire_if_due(start + 180 * MS));
	}

	#[test]
	fn cancel_disarms() {
		let start = Instant::now();
		let mut debouncer = Debouncer::default();
		assert_eq!(debouncer.interval(), DEFAULT_DEBOUNCE);

		debouncer.restart(start);
		debouncer.cancel();
		assert!(!debouncer.is_pending());
		assert!(!debouncer.fire_if_due(start + DEFAULT_DEBOUNCE));
	}
}
