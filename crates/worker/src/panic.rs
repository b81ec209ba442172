use std::any::Any;

/// Extracts the message from a panic payload.
///
/// Handles the two payload types `panic!` produces; anything else yields `None`.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_string());
	}
	payload.downcast_ref::<String>().cloned()
}

#[cfg(test)]
mod tests {
	use std::panic::{self, AssertUnwindSafe};

	use super::panic_message;

	fn catch(f: impl FnOnce()) -> Box<dyn std::any::Any + Send> {
		panic::catch_unwind(AssertUnwindSafe(f)).unwrap_err()
	}

	#[test]
	fn extracts_static_str_payload() {
		let payload = catch(|| panic!("boom-str"));
		let msg = panic_message(payload.as_ref()).expect("should carry a message");
		assert!(msg.contains("boom-str"), "expected 'boom-str', got: {msg}");
	}

	#[test]
	fn extracts_string_payload() {
		let payload = catch(|| panic!("{}", String::from("boom-string")));
		let msg = panic_message(payload.as_ref()).expect("should carry a message");
		assert!(msg.contains("boom-string"), "expected 'boom-string', got: {msg}");
	}

	#[test]
	fn returns_none_for_foreign_payload() {
		let payload = catch(|| panic::panic_any(42u32));
		assert!(panic_message(payload.as_ref()).is_none());
	}
}
