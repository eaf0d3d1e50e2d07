//! Per-component structural checks.
//!
//! Every check is independent: one component may collect issues from several
//! checks in the same run. All checks read the complete graph, so they only
//! run after every component's edges are in place.

use anyhow::Result;
use globset::GlobSet;
use isolint_core::compile_globs;
use log::{debug, trace};
use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use crate::{
    config::{SizePolicyPatterns, Thresholds},
    graph::DependencyGraph,
    types::{Component, IsolationIssue, IssueKind, Layer, Severity},
};

/// Size category deciding which line limit applies to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCategory {
    Exempt,
    Cli,
    Reporter,
    Ui,
    Standard,
}

#[derive(Debug, Clone)]
pub struct SizePolicy {
    exempt: GlobSet,
    cli: GlobSet,
    reporter: GlobSet,
    ui: GlobSet,
}

impl SizePolicy {
    pub fn new(patterns: &SizePolicyPatterns) -> Result<Self> {
        Ok(Self {
            exempt: compile_globs(&patterns.exempt)?,
            cli: compile_globs(&patterns.cli)?,
            reporter: compile_globs(&patterns.reporter)?,
            ui: compile_globs(&patterns.ui)?,
        })
    }

    pub fn categorize(&self, relative: &Path) -> SizeCategory {
        if self.exempt.is_match(relative) {
            SizeCategory::Exempt
        } else if self.cli.is_match(relative) {
            SizeCategory::Cli
        } else if self.reporter.is_match(relative) {
            SizeCategory::Reporter
        } else if self.ui.is_match(relative) {
            SizeCategory::Ui
        } else {
            SizeCategory::Standard
        }
    }
}

/// Line limit for a category, `None` for exempt files.
pub fn line_threshold(category: SizeCategory, t: &Thresholds) -> Option<usize> {
    match category {
        SizeCategory::Exempt => None,
        SizeCategory::Cli => Some(t.cli_max_lines),
        SizeCategory::Reporter => Some(t.reporter_max_lines),
        SizeCategory::Ui => Some(t.ui_max_lines),
        SizeCategory::Standard => Some(t.max_lines),
    }
}

/// Severity band for a value over its threshold: up to 1.5x is low, up to 2x
/// medium, beyond that high.
pub fn coupling_severity(value: usize, threshold: usize) -> Severity {
    if value * 2 <= threshold * 3 {
        Severity::Low
    } else if value <= threshold * 2 {
        Severity::Medium
    } else {
        Severity::High
    }
}

pub struct MetricEngine<'a> {
    pub thresholds: &'a Thresholds,
    pub size_policy: &'a SizePolicy,
}

impl MetricEngine<'_> {
    /// Run every check for every component, in component order.
    pub fn evaluate(&self, components: &[Component], graph: &DependencyGraph) -> Vec<IsolationIssue> {
        let layers: HashMap<&Path, Layer> = components
            .iter()
            .filter_map(|c| c.layer.map(|layer| (c.path.as_path(), layer)))
            .collect();

        let mut issues = Vec::new();
        for component in components {
            let before = issues.len();
            issues.extend(self.tight_coupling(component, graph));
            issues.extend(self.low_cohesion(component));
            issues.extend(self.high_fan_in(component, graph));
            issues.extend(self.high_fan_out(component, graph));
            issues.extend(self.boundary_violation(component, graph, &layers));
            issues.extend(self.god_component(component));
            trace!("{}: {} issues", component.relative, issues.len() - before);
        }
        debug!("Metric engine produced {} issues", issues.len());
        issues
    }

    pub fn tight_coupling(&self, c: &Component, graph: &DependencyGraph) -> Option<IsolationIssue> {
        let threshold = self.thresholds.max_coupling;
        let deps = graph.dependencies(&c.path);
        let value = deps.len();
        if value <= threshold {
            return None;
        }
        Some(IsolationIssue {
            file: c.path.clone(),
            kind: IssueKind::TightCoupling,
            severity: coupling_severity(value, threshold),
            value,
            threshold,
            implicated: deps.iter().cloned().collect(),
            message: format!(
                "Depends on {} components (limit {}). Split it or depend on a narrower interface instead of concrete modules.",
                value, threshold
            ),
        })
    }

    pub fn low_cohesion(&self, c: &Component) -> Option<IsolationIssue> {
        let threshold = self.thresholds.max_responsibilities;
        let value = c.responsibilities.len();
        if value <= threshold {
            return None;
        }
        let tags: Vec<&str> = c.responsibilities.iter().map(|r| r.label()).collect();
        Some(IsolationIssue {
            file: c.path.clone(),
            kind: IssueKind::LowCohesion,
            severity: Severity::Medium,
            value,
            threshold,
            implicated: Vec::new(),
            message: format!(
                "Mixes {} responsibilities ({}). Extract each concern into its own module.",
                value,
                tags.join(", ")
            ),
        })
    }

    pub fn high_fan_in(&self, c: &Component, graph: &DependencyGraph) -> Option<IsolationIssue> {
        let threshold = self.thresholds.max_fan_in;
        let dependents = graph.dependents(&c.path);
        let value = dependents.len();
        if value <= threshold {
            return None;
        }
        Some(IsolationIssue {
            file: c.path.clone(),
            kind: IssueKind::HighFanIn,
            severity: Severity::Low,
            value,
            threshold,
            implicated: dependents.iter().cloned().collect(),
            message: format!(
                "{} components depend on this one (limit {}). If it is a shared utility, keep its interface small and stable.",
                value, threshold
            ),
        })
    }

    pub fn high_fan_out(&self, c: &Component, graph: &DependencyGraph) -> Option<IsolationIssue> {
        let threshold = self.thresholds.max_fan_out;
        let deps = graph.dependencies(&c.path);
        let value = deps.len();
        if value <= threshold {
            return None;
        }
        Some(IsolationIssue {
            file: c.path.clone(),
            kind: IssueKind::HighFanOut,
            severity: Severity::Medium,
            value,
            threshold,
            implicated: deps.iter().cloned().collect(),
            message: format!(
                "Fans out to {} components (limit {}). Introduce a facade that aggregates these dependencies.",
                value, threshold
            ),
        })
    }

    pub fn boundary_violation(
        &self,
        c: &Component,
        graph: &DependencyGraph,
        layers: &HashMap<&Path, Layer>,
    ) -> Option<IsolationIssue> {
        let source_layer = c.layer?;
        let mut targets: Vec<PathBuf> = Vec::new();
        let mut target_layers: BTreeSet<Layer> = BTreeSet::new();

        for target in graph.dependencies(&c.path) {
            let Some(&target_layer) = layers.get(target.as_path()) else { continue };
            if !source_layer.may_depend_on(target_layer) {
                trace!(
                    "Boundary violation: {} ({}) -> {} ({})",
                    c.relative,
                    source_layer,
                    target.display(),
                    target_layer
                );
                targets.push(target.clone());
                target_layers.insert(target_layer);
            }
        }

        if targets.is_empty() {
            return None;
        }
        let names: Vec<&str> = target_layers.iter().map(Layer::as_str).collect();
        Some(IsolationIssue {
            file: c.path.clone(),
            kind: IssueKind::BoundaryViolation,
            severity: Severity::High,
            value: targets.len(),
            threshold: 0,
            message: format!(
                "The {} layer must not depend on the {} layer ({} imports). Depend on an abstraction owned by the {} layer instead.",
                source_layer,
                names.join(" / "),
                targets.len(),
                source_layer
            ),
            implicated: targets,
        })
    }

    pub fn god_component(&self, c: &Component) -> Option<IsolationIssue> {
        let category = self.size_policy.categorize(Path::new(&c.relative));
        let Some(threshold) = line_threshold(category, self.thresholds) else {
            trace!("{} is exempt from size checks", c.relative);
            return None;
        };

        let lines = c.lines;
        let tags = c.responsibilities.len();
        let over_size = lines > threshold;
        let over_responsibilities =
            tags as f64 > self.thresholds.max_responsibilities as f64 * 1.5;
        let over_hard_ceiling = lines > self.thresholds.hard_max_lines;

        let (severity, message) = if (over_size && over_responsibilities) || over_hard_ceiling {
            (
                Severity::High,
                format!(
                    "Critical god component: {} lines (limit {}) and {} responsibilities. Break it into focused modules.",
                    lines, threshold, tags
                ),
            )
        } else if lines as f64 > threshold as f64 * 1.5 {
            (
                Severity::Medium,
                format!(
                    "Large component: {} lines (limit {}). Consider splitting it along its internal seams.",
                    lines, threshold
                ),
            )
        } else {
            return None;
        };

        Some(IsolationIssue {
            file: c.path.clone(),
            kind: IssueKind::GodComponent,
            severity,
            value: lines,
            threshold,
            implicated: Vec::new(),
            message,
        })
    }
}
