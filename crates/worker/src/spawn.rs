use std::io;
use std::thread::{Builder, JoinHandle};

use crate::TaskClass;

/// Spawns the dedicated OS thread that owns one component's background work.
///
/// The name shows up in debuggers and panic messages; the class is only
/// recorded on the tracing event.
pub fn spawn_named_thread<F, R>(class: TaskClass, name: impl Into<String>, f: F) -> io::Result<JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let name = name.into();
	tracing::trace!(worker_class = %class, thread = %name, "worker.spawn_named_thread");
	Builder::new().name(name.clone()).spawn(f).inspect_err(|err| {
		tracing::warn!(worker_class = %class, thread = %name, error = %err, "worker.spawn_named_thread.failed");
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn thread_carries_name_and_result() {
		let handle = spawn_named_thread(TaskClass::Background, "margin-test", || {
			std::thread::current().name().map(str::to_owned)
		})
		.unwrap();
		assert_eq!(handle.join().unwrap().as_deref(), Some("margin-test"));
	}
}
