use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Outcome from enqueueing a mailbox message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxSendOutcome {
	/// Message was stored into an empty slot.
	Enqueued,
	/// An undelivered message was replaced.
	Coalesced,
}

/// Mailbox send error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxSendError {
	/// Mailbox is closed.
	Closed,
}

struct MailboxState<T> {
	pending: Option<T>,
	closed: bool,
}

struct MailboxInner<T> {
	state: Mutex<MailboxState<T>>,
	ready: Condvar,
}

/// Single-slot blocking mailbox where only the latest message survives.
///
/// Senders never block. A message that has not been received when the next
/// one arrives is dropped. Closing discards the pending message and wakes the
/// receiver, which then observes `None`.
pub struct LatestMailbox<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox sender.
pub struct MailboxSender<T> {
	inner: Arc<MailboxInner<T>>,
}

/// Mailbox receiver.
pub struct MailboxReceiver<T> {
	inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for MailboxSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Default for LatestMailbox<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> LatestMailbox<T> {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(MailboxInner {
				state: Mutex::new(MailboxState { pending: None, closed: false }),
				ready: Condvar::new(),
			}),
		}
	}

	/// Returns a sender handle.
	pub fn sender(&self) -> MailboxSender<T> {
		MailboxSender {
			inner: Arc::clone(&self.inner),
		}
	}

	/// Returns a receiver handle.
	pub fn receiver(&self) -> MailboxReceiver<T> {
		MailboxReceiver {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> MailboxSender<T> {
	/// Stores `msg`, replacing any undelivered message, and wakes the receiver.
	pub fn send(&self, msg: T) -> Result<MailboxSendOutcome, MailboxSendError> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err(MailboxSendError::Closed);
		}
		let replaced = state.pending.replace(msg).is_some();
		drop(state);
		self.inner.ready.notify_one();
		Ok(if replaced {
			MailboxSendOutcome::Coalesced
		} else {
			MailboxSendOutcome::Enqueued
		})
	}

	/// Closes the mailbox. Returns true if an undelivered message was discarded.
	pub fn close(&self) -> bool {
		let mut state = self.inner.state.lock();
		state.closed = true;
		let discarded = state.pending.take().is_some();
		drop(state);
		self.inner.ready.notify_all();
		discarded
	}

	pub fn is_closed(&self) -> bool {
		self.inner.state.lock().closed
	}
}

impl<T> MailboxReceiver<T> {
	/// Blocks until a message arrives. Returns `None` once the mailbox is closed.
	pub fn recv(&self) -> Option<T> {
		let mut state = self.inner.state.lock();
		loop {
			if state.closed {
				return None;
			}
			if let Some(msg) = state.pending.take() {
				return Some(msg);
			}
			self.inner.ready.wait(&mut state);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[test]
	fn latest_wins_keeps_only_the_last_sent() {
		let mailbox = LatestMailbox::new();
		let tx = mailbox.sender();
		let rx = mailbox.receiver();

		assert_eq!(tx.send(1u32), Ok(MailboxSendOutcome::Enqueued));
		assert_eq!(tx.send(2), Ok(MailboxSendOutcome::Coalesced));
		assert_eq!(tx.send(3), Ok(MailboxSendOutcome::Coalesced));

		assert_eq!(rx.recv(), Some(3));
		// Receiving emptied the slot.
		assert_eq!(tx.send(4), Ok(MailboxSendOutcome::Enqueued));
		assert_eq!(rx.recv(), Some(4));
	}

	#[test]
	fn send_on_closed_mailbox_returns_closed() {
		let mailbox = LatestMailbox::new();
		let tx = mailbox.sender();
		assert!(!tx.close());
		assert!(tx.is_closed());
		assert_eq!(tx.send(1u32), Err(MailboxSendError::Closed));
	}

	#[test]
	fn close_discards_pending() {
		let mailbox = LatestMailbox::new();
		let tx = mailbox.sender();
		let rx = mailbox.receiver();

		let _ = tx.send(10u32);
		assert!(tx.close());
		assert_eq!(rx.recv(), None);
		// Repeated recv after close still returns None.
		assert_eq!(rx.recv(), None);
	}

	#[test]
	fn recv_blocks_until_send() {
		let mailbox = LatestMailbox::new();
		let tx = mailbox.sender();
		let rx = mailbox.receiver();

		let handle = std::thread::spawn(move || rx.recv());
		std::thread::sleep(Duration::from_millis(20));
		assert!(!handle.is_finished(), "recv on empty should block");

		let _ = tx.send(42u32);
		assert_eq!(handle.join().unwrap(), Some(42));
	}

	#[test]
	fn close_wakes_blocked_receiver() {
		let mailbox = LatestMailbox::<u32>::new();
		let tx = mailbox.sender();
		let rx = mailbox.receiver();

		let handle = std::thread::spawn(move || rx.recv());
		std::thread::sleep(Duration::from_millis(20));
		tx.close();
		assert_eq!(handle.join().unwrap(), None);
	}

	#[test]
	fn concurrent_senders_leave_one_of_the_last_values() {
		const SENDERS: u32 = 8;
		const ITEMS_PER_SENDER: u32 = 500;

		let mailbox = LatestMailbox::new();
		let rx = mailbox.receiver();
		let handles: Vec<_> = (0..SENDERS)
			.map(|sender_id| {
				let tx = mailbox.sender();
				std::thread::spawn(move || {
					for seq in 0..ITEMS_PER_SENDER {
						tx.send((sender_id, seq)).unwrap();
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		let (_, seq) = rx.recv().expect("a value must survive");
		assert_eq!(seq, ITEMS_PER_SENDER - 1);
		assert_eq!(mailbox.sender().send((0, 0)), Ok(MailboxSendOutcome::Enqueued));
	}
}
