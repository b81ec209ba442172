//! Background worker primitives.
//!
//! Building blocks for owning exactly one background thread per component:
//!
//! * [`spawn_named_thread`] with a [`TaskClass`] hint recorded on its tracing events.
//! * [`LatestMailbox`], a single-slot hand-off where newer work replaces older work.
//! * [`GenerationClock`] and [`GenerationToken`] for tagging and cancelling superseded work.
//! * [`ExitSignal`] for bounded waits on thread exit.
//! * [`panic_message`] for reporting caught panics.

mod class;
mod exit;
pub mod mailbox;
mod panic;
mod spawn;
mod token;

pub use class::TaskClass;
pub use exit::{ExitGuard, ExitSignal};
pub use mailbox::{LatestMailbox, MailboxReceiver, MailboxSendError, MailboxSendOutcome, MailboxSender};
pub use panic::panic_message;
pub use spawn::spawn_named_thread;
pub use token::{GenerationClock, GenerationToken};
