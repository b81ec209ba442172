use std::fmt;

/// Scheduling class of a background thread.
///
/// Threads cannot be reprioritized portably, so the class is a hint carried on
/// the worker's tracing events rather than an OS scheduling parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work whose results are routinely superseded before delivery.
	#[default]
	Background,
	/// Long computation that should not yield to other background work.
	CpuBlocking,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Background => "background",
			Self::CpuBlocking => "cpu_blocking",
		}
	}
}

impl fmt::Display for TaskClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
