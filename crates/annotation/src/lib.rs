//! Line annotation model and the stepwise analyzer contract.
//!
//! * [`model`]: [`Annotation`], [`AnnotationMap`] and the immutable [`Snapshot`]
//!   analyzers work on.
//! * [`analyzer`]: the [`Analyzer`] trait and [`LineAnalyzer`], which turns a
//!   stateless [`LineRule`] into a one-line-per-step analyzer.
//! * [`priority`]: reduction of a line's entries to the collapsed marker.
//! * [`table`]: the reference [`TableAnalyzer`].

pub mod analyzer;
pub mod error;
pub mod model;
pub mod priority;
pub mod table;

pub use analyzer::{Analyzer, LineAnalyzer, LineRule};
pub use error::AnalyzerError;
pub use model::{AlertColor, Annotation, AnnotationMap, Category, LineAnnotations, Snapshot};
pub use priority::Priority;
pub use table::{TableAnalyzer, TableRule, TableRuleBuilder};
