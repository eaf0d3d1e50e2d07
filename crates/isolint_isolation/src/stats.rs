use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use crate::{
    graph::DependencyGraph,
    types::{AggregateStatistics, Component, IsolationIssue, IssueKind, Severity},
};

/// Summarize one run. Averages are over all components, not just flagged ones.
pub fn statistics(
    issues: &[IsolationIssue],
    components: &[Component],
    graph: &DependencyGraph,
) -> AggregateStatistics {
    let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
    let mut by_kind: BTreeMap<IssueKind, usize> = BTreeMap::new();
    for issue in issues {
        *by_severity.entry(issue.severity).or_default() += 1;
        *by_kind.entry(issue.kind).or_default() += 1;
    }

    let total_components = components.len();
    let (average_coupling, average_cohesion) = if total_components == 0 {
        (0.0, 1.0)
    } else {
        let coupling: usize = components.iter().map(|c| graph.fan_out(&c.path)).sum();
        let cohesion: f64 = components.iter().map(Component::cohesion).sum();
        (coupling as f64 / total_components as f64, cohesion / total_components as f64)
    };

    let flagged: BTreeSet<&Path> = issues.iter().map(|i| i.file.as_path()).collect();
    let well_isolated =
        components.iter().filter(|c| !flagged.contains(c.path.as_path())).count();

    AggregateStatistics {
        total_components,
        total_issues: issues.len(),
        by_severity,
        by_kind,
        average_coupling,
        average_cohesion,
        well_isolated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Responsibility;
    use std::path::PathBuf;

    fn component(path: &str, imports: &[&str], tags: usize) -> Component {
        let all = [
            Responsibility::UiRendering,
            Responsibility::DataFetching,
            Responsibility::Validation,
            Responsibility::Routing,
        ];
        Component {
            path: PathBuf::from(path),
            relative: path.trim_start_matches('/').to_string(),
            imports: imports.iter().map(PathBuf::from).collect(),
            exported_symbols: 0,
            responsibilities: all.into_iter().take(tags).collect(),
            lines: 1,
            layer: None,
        }
    }

    fn issue(file: &str, kind: IssueKind, severity: Severity) -> IsolationIssue {
        IsolationIssue {
            file: PathBuf::from(file),
            kind,
            severity,
            value: 1,
            threshold: 0,
            implicated: Vec::new(),
            message: String::new(),
        }
    }

    #[test]
    fn test_empty_run() {
        let stats = statistics(&[], &[], &DependencyGraph::default());
        assert_eq!(stats.total_components, 0);
        assert_eq!(stats.total_issues, 0);
        assert_eq!(stats.average_coupling, 0.0);
        assert_eq!(stats.average_cohesion, 1.0);
        assert_eq!(stats.well_isolated, 0);
        assert!(stats.by_kind.is_empty());
    }

    #[test]
    fn test_averages() {
        let components = vec![
            component("/a", &["/b", "/c"], 2),
            component("/b", &["/c"], 0),
            component("/c", &[], 4),
        ];
        let graph = DependencyGraph::build(&components);
        let stats = statistics(&[], &components, &graph);
        assert_eq!(stats.average_coupling, 1.0);
        assert!((stats.average_cohesion - (0.5 + 1.0 + 0.25) / 3.0).abs() < 1e-9);
        assert_eq!(stats.well_isolated, 3);
    }

    #[test]
    fn test_counts_and_well_isolated() {
        let components =
            vec![component("/a", &[], 0), component("/b", &[], 0), component("/c", &[], 0)];
        let issues = vec![
            issue("/a", IssueKind::TightCoupling, Severity::Low),
            issue("/a", IssueKind::HighFanOut, Severity::Medium),
            issue("/b", IssueKind::BoundaryViolation, Severity::High),
        ];
        let graph = DependencyGraph::build(&components);
        let stats = statistics(&issues, &components, &graph);

        assert_eq!(stats.total_issues, 3);
        assert_eq!(stats.by_severity.get(&Severity::Low), Some(&1));
        assert_eq!(stats.by_severity.get(&Severity::Medium), Some(&1));
        assert_eq!(stats.by_severity.get(&Severity::High), Some(&1));
        assert_eq!(stats.by_kind.get(&IssueKind::GodComponent), None);
        assert_eq!(stats.by_kind.values().sum::<usize>(), stats.total_issues);
        assert_eq!(stats.well_isolated, 1);

        let distinct: BTreeSet<_> = issues.iter().map(|i| &i.file).collect();
        assert_eq!(stats.well_isolated + distinct.len(), stats.total_components);
    }
}
