//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! [pipeline]
//! debounce_ms = 400
//!
//! [worker]
//! thread_name = "margin-annotate"
//! priority = "low"
//! shutdown_timeout_ms = 2000
//! ```
//!
//! Every field is optional; unknown fields are rejected.

use std::path::{Path, PathBuf};
use std::time::Duration;

use margin_scheduler::{DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_THREAD_NAME, SchedulerConfig};
use margin_worker::TaskClass;
use serde::Deserialize;
use thiserror::Error;

use crate::debounce::DEFAULT_DEBOUNCE;

/// Errors from loading a [`MarginConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value parsed but is out of range.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarginConfig {
	pub pipeline: PipelineConfig,
	pub worker: WorkerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
	/// Quiet period after the last edit before a refresh.
	pub debounce_ms: u64,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
		}
	}
}

impl PipelineConfig {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
	pub thread_name: String,
	pub priority: WorkerPriority,
	pub shutdown_timeout_ms: u64,
}

impl Default for WorkerConfig {
	fn default() -> Self {
		Self {
			thread_name: DEFAULT_THREAD_NAME.to_string(),
			priority: WorkerPriority::default(),
			shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT.as_millis() as u64,
		}
	}
}

/// Best-effort scheduling hint for the worker thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerPriority {
	#[default]
	Low,
	Normal,
}

impl WorkerPriority {
	pub fn task_class(self) -> TaskClass {
		match self {
			Self::Low => TaskClass::Background,
			Self::Normal => TaskClass::CpuBlocking,
		}
	}
}

impl WorkerConfig {
	pub fn shutdown_timeout(&self) -> Duration {
		Duration::from_millis(self.shutdown_timeout_ms)
	}

	pub fn scheduler_config(&self) -> SchedulerConfig {
		SchedulerConfig {
			thread_name: self.thread_name.clone(),
			class: self.priority.task_class(),
			shutdown_timeout: self.shutdown_timeout(),
		}
	}
}

impl MarginConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses, and validates the file at `path`.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&input)?;
		tracing::debug!(path = %path.display(), debounce_ms = config.pipeline.debounce_ms, "config.loaded");
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.pipeline.debounce_ms == 0 {
			return Err(ConfigError::Invalid("pipeline.debounce_ms must be greater than 0".into()));
		}
		if self.worker.shutdown_timeout_ms == 0 {
			return Err(ConfigError::Invalid("worker.shutdown_timeout_ms must be greater than 0".into()));
		}
		if self.worker.thread_name.trim().is_empty() {
			return Err(ConfigError::Invalid("worker.thread_name must not be empty".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let config = MarginConfig::from_toml_str("").unwrap();
		assert_eq!(config, MarginConfig::default());
		assert_eq!(config.pipeline.debounce(), Duration::from_millis(400));
		assert_eq!(config.worker.scheduler_config(), SchedulerConfig::default());
	}

	#[test]
	fn full_document() {
		let config = MarginConfig::from_toml_str(
			r#"
			[pipeline]
			debounce_ms = 150

			[worker]
			thread_name = "annotator"
			priority = "normal"
			shutdown_timeout_ms = 500
			"#,
		)
		.unwrap();

		assert_eq!(config.pipeline.debounce_ms, 150);
		assert_eq!(
			config.worker.scheduler_config(),
			SchedulerConfig {
				thread_name: "annotator".into(),
				class: TaskClass::CpuBlocking,
				shutdown_timeout: Duration::from_millis(500),
			}
		);
	}

	#[test]
	fn partial_table_keeps_other_defaults() {
		let config = MarginConfig::from_toml_str("[worker]\npriority = \"low\"\n").unwrap();
		assert_eq!(config.worker.thread_name, DEFAULT_THREAD_NAME);
		assert_eq!(config.worker.priority.task_class(), TaskClass::Background);
		assert_eq!(config.pipeline, PipelineConfig::default());
	}

	#[rstest]
	#[case("[pipeline]\ndebounce = 10\n")]
	#[case("[scheduler]\n")]
	#[case("[worker]\npriority = \"high\"\n")]
	#[case("[pipeline]\ndebounce_ms = \"fast\"\n")]
	fn malformed_documents_are_parse_errors(#[case] input: &str) {
		assert!(matches!(MarginConfig::from_toml_str(input), Err(ConfigError::Parse(_))));
	}

	#[rstest]
	#[case("[pipeline]\ndebounce_ms = 0\n", "debounce_ms")]
	#[case("[worker]\nshutdown_timeout_ms = 0\n", "shutdown_timeout_ms")]
	#[case("[worker]\nthread_name = \"  \"\n", "thread_name")]
	fn out_of_range_values_are_invalid(#[case] input: &str, #[case] field: &str) {
		match MarginConfig::from_toml_str(input) {
			Err(ConfigError::Invalid(message)) => assert!(message.contains(field), "{message}"),
			other => panic!("expected Invalid, got {other:?}"),
		}
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[pipeline]\ndebounce_ms = 25").unwrap();

		let config = MarginConfig::load(file.path()).unwrap();
		assert_eq!(config.pipeline.debounce(), Duration::from_millis(25));
	}

	#[test]
	fn load_missing_file_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing.toml");

		match MarginConfig::load(&path) {
			Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected Io, got {other:?}"),
		}
	}
}
