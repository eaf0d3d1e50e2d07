//! Structural isolation analysis for JavaScript/TypeScript projects.
//!
//! One run discovers source files under a root, resolves their local imports
//! into a bidirectional dependency graph, and checks every component for
//! tight coupling, low cohesion, high fan-in and fan-out, layer boundary
//! violations and god components.
//!
//! # Examples
//!
//! ```no_run
//! use isolint_isolation::{IsolationDetector, Settings};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let detector = IsolationDetector::new(Settings::default())?;
//! let analysis = detector.analyze(Path::new("/path/to/project"), None)?;
//!
//! for issue in &analysis.issues {
//!     println!("{} {} {}", issue.file.display(), issue.kind, issue.severity);
//! }
//! println!("{} well isolated", analysis.statistics().well_isolated);
//! # Ok(())
//! # }
//! ```

mod checker;
mod config;
mod graph;
mod layers;
mod metadata;
mod metrics;
mod reporter;
mod stats;
mod types;

// Re-export public API
pub use checker::{Analysis, IsolationDetector, run_isolation_check};
pub use config::{
    Config, LayerPatterns, OutputFormat, SETTINGS_FILE_NAME, Settings, SizePolicyPatterns,
    Thresholds,
};
pub use graph::DependencyGraph;
pub use layers::LayerClassifier;
pub use metadata::{MetadataBuilder, Responsibility, count_code_lines, detect_responsibilities};
pub use metrics::{MetricEngine, SizeCategory, SizePolicy, coupling_severity, line_threshold};
pub use reporter::{print_issues_tree, print_json, print_no_issues_message, print_summary};
pub use stats::statistics;
pub use types::{
    AggregateStatistics, CheckResult, Component, IsolationIssue, IssueKind, Layer, Severity,
};
