use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// One-shot latch a worker thread trips when it exits.
///
/// `std::thread::JoinHandle::join` cannot time out; waiting on this latch first
/// lets an owner bound how long it blocks before joining.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal {
	inner: Arc<ExitInner>,
}

#[derive(Debug, Default)]
struct ExitInner {
	done: Mutex<bool>,
	cond: Condvar,
}

/// Trips the owning [`ExitSignal`] when dropped, including during unwinding.
#[derive(Debug)]
pub struct ExitGuard {
	signal: ExitSignal,
}

impl ExitSignal {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a guard to move into the worker thread.
	pub fn guard(&self) -> ExitGuard {
		ExitGuard { signal: self.clone() }
	}

	/// Blocks until the worker exits or `timeout` elapses. Returns whether it exited.
	pub fn wait_for(&self, timeout: Duration) -> bool {
		let mut done = self.inner.done.lock();
		if !*done {
			let _ = self.inner.cond.wait_while_for(&mut done, |done| !*done, timeout);
		}
		*done
	}

	fn trip(&self) {
		*self.inner.done.lock() = true;
		self.inner.cond.notify_all();
	}
}

impl Drop for ExitGuard {
	fn drop(&mut self) {
		self.signal.trip();
	}
}

#[cfg(test)]
mod tests {
	use std::time::Instant;

	use super::*;

	#[test]
	fn wait_returns_once_guard_drops() {
		let signal = ExitSignal::new();
		let guard = signal.guard();
		let handle = std::thread::spawn(move || {
			std::thread::sleep(Duration::from_millis(10));
			drop(guard);
		});

		assert!(signal.wait_for(Duration::from_secs(5)));
		// Already tripped, so a zero timeout still reports the exit.
		assert!(signal.wait_for(Duration::ZERO));
		handle.join().unwrap();
	}

	#[test]
	fn wait_times_out_while_guard_alive() {
		let signal = ExitSignal::new();
		let _guard = signal.guard();
		let start = Instant::now();
		assert!(!signal.wait_for(Duration::from_millis(20)));
		assert!(start.elapsed() >= Duration::from_millis(20));
	}

	#[test]
	fn guard_trips_on_panic() {
		let signal = ExitSignal::new();
		let guard = signal.guard();
		let result = std::thread::spawn(move || {
			let _guard = guard;
			panic!("worker died");
		})
		.join();

		assert!(result.is_err());
		assert!(signal.wait_for(Duration::from_millis(10)));
	}
}
