use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::PathBuf,
};

use crate::metadata::Responsibility;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    TightCoupling,
    LowCohesion,
    HighFanIn,
    HighFanOut,
    BoundaryViolation,
    GodComponent,
}

impl IssueKind {
    pub const ALL: [IssueKind; 6] = [
        Self::TightCoupling,
        Self::LowCohesion,
        Self::HighFanIn,
        Self::HighFanOut,
        Self::BoundaryViolation,
        Self::GodComponent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TightCoupling => "tight-coupling",
            Self::LowCohesion => "low-cohesion",
            Self::HighFanIn => "high-fan-in",
            Self::HighFanOut => "high-fan-out",
            Self::BoundaryViolation => "boundary-violation",
            Self::GodComponent => "god-component",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Architectural layer a component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Presentation,
    Application,
    Domain,
    Infrastructure,
}

impl Layer {
    /// Classification priority order.
    pub const ALL: [Layer; 4] =
        [Self::Presentation, Self::Application, Self::Domain, Self::Infrastructure];

    /// Layers this layer may depend on besides itself.
    pub fn allowed_dependencies(&self) -> &'static [Layer] {
        match self {
            Self::Presentation => &[Self::Application, Self::Domain, Self::Infrastructure],
            Self::Application => &[Self::Domain, Self::Infrastructure],
            Self::Domain | Self::Infrastructure => &[],
        }
    }

    pub fn may_depend_on(&self, target: Layer) -> bool {
        *self == target || self.allowed_dependencies().contains(&target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presentation => "presentation",
            Self::Application => "application",
            Self::Domain => "domain",
            Self::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analyzed source file. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub path: PathBuf,
    /// Path relative to the analysis root, `/`-separated
    pub relative: String,
    /// Resolved dependencies, deduplicated, in first-reference order
    pub imports: Vec<PathBuf>,
    pub exported_symbols: usize,
    pub responsibilities: BTreeSet<Responsibility>,
    /// Lines with at least one non-whitespace character
    pub lines: usize,
    pub layer: Option<Layer>,
}

impl Component {
    /// Inverse of the responsibility count; a file with none is fully cohesive.
    pub fn cohesion(&self) -> f64 {
        match self.responsibilities.len() {
            0 => 1.0,
            n => 1.0 / n as f64,
        }
    }
}

/// A structural finding. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsolationIssue {
    pub file: PathBuf,
    pub kind: IssueKind,
    pub severity: Severity,
    pub value: usize,
    pub threshold: usize,
    /// Other files involved, e.g. the dependencies behind a coupling issue
    pub implicated: Vec<PathBuf>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStatistics {
    pub total_components: usize,
    pub total_issues: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_kind: BTreeMap<IssueKind, usize>,
    pub average_coupling: f64,
    pub average_cohesion: f64,
    pub well_isolated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub issues: Vec<IsolationIssue>,
    pub statistics: AggregateStatistics,
    pub files_analyzed: usize,
}

impl CheckResult {
    /// Whether any issue is at or above `severity`.
    pub fn has_issues_at_or_above(&self, severity: Severity) -> bool {
        self.issues.iter().any(|issue| issue.severity >= severity)
    }
}
