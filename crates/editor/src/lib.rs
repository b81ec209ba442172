//! Editor-side annotation pipeline.
//!
//! Connects an editor buffer to a background [`AnnotationScheduler`]:
//!
//! * [`Debouncer`] turns bursts of edits into a single refresh.
//! * [`LineSource`] and [`extract_lines`] snapshot the buffer as plain lines.
//! * [`AnnotationPipeline`] submits snapshots and applies delivered results.
//! * [`AnnotationView`] owns the live annotations, markers, popups, and highlight.
//! * [`MarginConfig`] loads the settings for all of the above from TOML.
//!
//! [`AnnotationScheduler`]: margin_scheduler::AnnotationScheduler

pub mod config;
pub mod debounce;
pub mod pipeline;
pub mod source;
pub mod view;

pub use config::{ConfigError, MarginConfig, PipelineConfig, WorkerConfig, WorkerPriority};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use pipeline::{AnnotationPipeline, TickOutcome};
pub use source::{Extracted, LineSource, extract_lines};
pub use view::{AnnotationView, ApplyOutcome, HighlightState, LineMarker, PopupEntry};
