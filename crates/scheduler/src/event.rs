use margin_annotation::AnnotationMap;
use tokio::sync::mpsc;

use crate::SchedulerError;

/// Notification from the annotation worker.
///
/// Events arrive in generation order. Only runs that were not superseded
/// produce an event.
#[derive(Debug)]
pub enum SchedulerEvent {
	/// A run completed. `annotations` replaces whatever was displayed before;
	/// line numbers refer to the snapshot submitted as `generation`.
	Analyzed { generation: u64, annotations: AnnotationMap },
	/// The snapshot was blank; the analyzer was not invoked.
	Cleared { generation: u64 },
	/// The run failed. Previously delivered annotations stay valid.
	Failed { generation: u64, error: SchedulerError },
}

impl SchedulerEvent {
	pub fn generation(&self) -> u64 {
		match self {
			Self::Analyzed { generation, .. } | Self::Cleared { generation } | Self::Failed { generation, .. } => *generation,
		}
	}
}

/// Receiving half of the scheduler's event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<SchedulerEvent>;
pub(crate) type EventSender = mpsc::UnboundedSender<SchedulerEvent>;
