//! Analyzer error types.

use thiserror::Error;

/// Errors raised through the [`Analyzer`](crate::Analyzer) contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
	/// An analysis step failed. The run is abandoned.
	#[error("analyzer fault: {message}")]
	Fault {
		/// Zero-based line being analyzed, when known.
		line: Option<usize>,
		message: String,
	},

	/// A contract operation was called out of sequence.
	#[error("invalid analyzer state: {0}")]
	InvalidState(&'static str),
}

impl AnalyzerError {
	pub fn fault(message: impl Into<String>) -> Self {
		Self::Fault {
			line: None,
			message: message.into(),
		}
	}

	pub fn fault_at(line: usize, message: impl Into<String>) -> Self {
		Self::Fault {
			line: Some(line),
			message: message.into(),
		}
	}
}
