use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic generation clock for submitted work.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	last: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Creates a new generation clock; the first generation handed out is 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next generation ID.
	pub fn next(&self) -> u64 {
		self.last.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns the most recently issued generation, 0 if none.
	pub fn current(&self) -> u64 {
		self.last.load(Ordering::Acquire)
	}
}

/// Generation-scoped cancellation token for one unit of superseded work.
///
/// Tokens form a tree: cancelling a root cancels every token derived from it
/// with [`GenerationToken::child`].
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	/// Creates a root token at generation 0.
	pub fn root() -> Self {
		Self::new(0, CancellationToken::new())
	}

	/// Creates a new generation token.
	pub fn new(generation: u64, cancel: CancellationToken) -> Self {
		Self { generation, cancel }
	}

	/// Returns generation ID.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Returns true when cancellation is requested on this token or any ancestor.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Derives a token for `generation` that is cancelled along with `self`.
	pub fn child(&self, generation: u64) -> Self {
		Self {
			generation,
			cancel: self.cancel.child_token(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generations_start_at_one_and_increase() {
		let clock = GenerationClock::new();
		assert_eq!(clock.current(), 0);
		assert_eq!(clock.next(), 1);
		assert_eq!(clock.next(), 2);
		assert_eq!(clock.clone().next(), 3);
		assert_eq!(clock.current(), 3);
	}

	#[test]
	fn cancelling_root_cancels_children() {
		let root = GenerationToken::root();
		let first = root.child(1);
		let second = root.child(2);

		first.cancel();
		assert!(first.is_cancelled());
		assert!(!second.is_cancelled());
		assert!(!root.is_cancelled());

		root.cancel();
		assert!(second.is_cancelled());
		assert_eq!(second.generation(), 2);
	}
}
