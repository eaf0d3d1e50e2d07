use std::{
    cmp::Reverse,
    collections::BTreeMap,
    env,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use colored::{ColoredString, Colorize};
use log::{debug, trace};
use serde::Serialize;

use crate::types::{AggregateStatistics, CheckResult, IsolationIssue, IssueKind, Severity};

/// Implicated files shown per issue before the list is collapsed.
const MAX_IMPLICATED: usize = 5;

/// Relativize an absolute path to the current working directory for clickable links
fn relativize_to_cwd(path: &Path) -> String {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => {
            debug!("Failed to get current directory");
            return path.display().to_string();
        }
    };
    match make_relative(path, &cwd) {
        Some(rel) => rel.to_string_lossy().to_string(),
        None => {
            trace!("Could not relativize '{}', using original", path.display());
            path.display().to_string()
        }
    }
}

/// Create a relative path from `base` to `target`, or `None` when they share no root.
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    if target_parts.first() != base_parts.first() {
        return None;
    }

    let common = target_parts.iter().zip(&base_parts).take_while(|(t, b)| t == b).count();
    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for part in &target_parts[common..] {
        match part {
            Component::Normal(p) => result.push(p),
            Component::ParentDir => result.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

fn paint(severity: Severity) -> ColoredString {
    match severity {
        Severity::High => severity.as_str().red().bold(),
        Severity::Medium => severity.as_str().yellow().bold(),
        Severity::Low => severity.as_str().cyan(),
    }
}

pub fn print_no_issues_message<W: Write>(writer: &mut W, files_analyzed: usize) -> io::Result<()> {
    debug!("No isolation issues detected");
    writeln!(
        writer,
        "{} No isolation issues detected across {} components.",
        "✓".green().bold(),
        files_analyzed
    )?;
    writer.flush()?;
    Ok(())
}

/// Issues grouped per file, worst files first, followed by the summary block.
pub fn print_issues_tree<W: Write>(writer: &mut W, result: &CheckResult) -> io::Result<()> {
    debug!("Printing issues tree for {} issues", result.issues.len());
    let mut by_file: BTreeMap<&Path, Vec<&IsolationIssue>> = BTreeMap::new();
    for issue in &result.issues {
        by_file.entry(issue.file.as_path()).or_default().push(issue);
    }
    debug!("Grouped issues into {} files", by_file.len());

    writeln!(
        writer,
        "{} Isolation issues detected in {} of {} components\n",
        "⚠".yellow().bold(),
        by_file.len().to_string().yellow(),
        result.files_analyzed
    )?;

    let mut files: Vec<(&Path, Vec<&IsolationIssue>)> = by_file.into_iter().collect();
    // Stable sort keeps path order among files with the same worst severity
    files.sort_by_key(|(_, issues)| Reverse(issues.iter().map(|i| i.severity).max()));

    for (file, mut issues) in files {
        issues.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.kind.cmp(&b.kind)));
        writeln!(writer, "{}", relativize_to_cwd(file).bright_white().bold())?;

        for (idx, issue) in issues.iter().enumerate() {
            let is_last = idx == issues.len() - 1;
            let (prefix, indent) = if is_last { ("└──", "    ") } else { ("├──", "│   ") };
            writeln!(
                writer,
                "{}  [{}] {} ({}/{}) {}",
                prefix.dimmed(),
                paint(issue.severity),
                issue.kind.as_str().bold(),
                issue.value.to_string().red(),
                issue.threshold,
                issue.message
            )?;
            for implicated in issue.implicated.iter().take(MAX_IMPLICATED) {
                writeln!(writer, "{}    {}", indent.dimmed(), relativize_to_cwd(implicated).blue())?;
            }
            if issue.implicated.len() > MAX_IMPLICATED {
                writeln!(
                    writer,
                    "{}    {}",
                    indent.dimmed(),
                    format!("... and {} more", issue.implicated.len() - MAX_IMPLICATED).dimmed()
                )?;
            }
        }
        writeln!(writer)?;
    }

    print_summary(writer, &result.statistics)?;
    writer.flush()?;
    Ok(())
}

pub fn print_summary<W: Write>(writer: &mut W, stats: &AggregateStatistics) -> io::Result<()> {
    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Total issues: {}", stats.total_issues.to_string().yellow().bold())?;

    let severities: Vec<String> = [Severity::High, Severity::Medium, Severity::Low]
        .into_iter()
        .map(|s| format!("{} {}", stats.by_severity.get(&s).copied().unwrap_or(0), paint(s)))
        .collect();
    writeln!(writer, "  By severity: {}", severities.join(", "))?;

    if !stats.by_kind.is_empty() {
        writeln!(writer, "  By kind:")?;
        for kind in IssueKind::ALL {
            if let Some(count) = stats.by_kind.get(&kind) {
                writeln!(writer, "    {:<20} {}", kind.as_str(), count)?;
            }
        }
    }

    writeln!(writer, "  Average coupling: {:.2}", stats.average_coupling)?;
    writeln!(writer, "  Average cohesion: {:.2}", stats.average_cohesion)?;
    writeln!(
        writer,
        "  Well isolated: {} of {} components",
        stats.well_isolated.to_string().green(),
        stats.total_components
    )?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files_analyzed: usize,
    issues: &'a [IsolationIssue],
    statistics: &'a AggregateStatistics,
}

pub fn print_json<W: Write>(writer: &mut W, result: &CheckResult) -> io::Result<()> {
    let report = JsonReport {
        files_analyzed: result.files_analyzed,
        issues: &result.issues,
        statistics: &result.statistics,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> CheckResult {
        let issue = |file: &str, kind, severity, implicated: usize| IsolationIssue {
            file: PathBuf::from(file),
            kind,
            severity,
            value: 8,
            threshold: 7,
            implicated: (0..implicated).map(|i| PathBuf::from(format!("/repo/dep{i}.ts"))).collect(),
            message: format!("{kind} message"),
        };
        let issues = vec![
            issue("/repo/a.ts", IssueKind::HighFanIn, Severity::Low, 0),
            issue("/repo/b.ts", IssueKind::TightCoupling, Severity::Low, 8),
            issue("/repo/b.ts", IssueKind::BoundaryViolation, Severity::High, 1),
        ];
        let statistics = AggregateStatistics {
            total_components: 4,
            total_issues: 3,
            by_severity: [(Severity::Low, 2), (Severity::High, 1)].into_iter().collect(),
            by_kind: [
                (IssueKind::HighFanIn, 1),
                (IssueKind::TightCoupling, 1),
                (IssueKind::BoundaryViolation, 1),
            ]
            .into_iter()
            .collect(),
            average_coupling: 2.5,
            average_cohesion: 0.75,
            well_isolated: 2,
        };
        CheckResult { issues, statistics, files_analyzed: 4 }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_make_relative_same_dir() {
        let result = make_relative(Path::new("/project/src/file.ts"), Path::new("/project/src"));
        assert_eq!(result, Some(PathBuf::from("file.ts")));
    }

    #[test]
    fn test_make_relative_parent_dir() {
        let result =
            make_relative(Path::new("/project/src/file.ts"), Path::new("/project/src/components"));
        assert_eq!(result, Some(PathBuf::from("../file.ts")));
    }

    #[test]
    fn test_make_relative_sibling_dir() {
        let result =
            make_relative(Path::new("/project/apps/web/index.ts"), Path::new("/project/apps/api"));
        assert_eq!(result, Some(PathBuf::from("../web/index.ts")));
    }

    #[test]
    fn test_make_relative_same_path() {
        let result = make_relative(Path::new("/project/src"), Path::new("/project/src"));
        assert_eq!(result, Some(PathBuf::from(".")));
    }

    #[test]
    fn test_make_relative_multiple_levels_up() {
        let result = make_relative(Path::new("/project/file.ts"), Path::new("/project/apps/web/src"));
        assert_eq!(result, Some(PathBuf::from("../../../file.ts")));
    }

    #[test]
    fn test_make_relative_without_shared_root() {
        assert_eq!(make_relative(Path::new("src/file.ts"), Path::new("/project")), None);
    }

    #[test]
    fn test_tree_orders_worst_file_first() {
        let out = render(|w| print_issues_tree(w, &sample_result()));
        let b = out.find("b.ts").unwrap();
        let a = out.find("a.ts").unwrap();
        assert!(b < a);
        // Within a file, higher severity comes first
        let boundary = out.find("boundary-violation").unwrap();
        let coupling = out.find("tight-coupling").unwrap();
        assert!(boundary < coupling);
        assert!(out.contains("[high] boundary-violation (8/7)"));
    }

    #[test]
    fn test_tree_collapses_long_implicated_lists() {
        let out = render(|w| print_issues_tree(w, &sample_result()));
        assert!(out.contains("dep4.ts"));
        assert!(!out.contains("dep5.ts"));
        assert!(out.contains("... and 3 more"));
    }

    #[test]
    fn test_summary_block() {
        let out = render(|w| print_summary(w, &sample_result().statistics));
        assert!(out.contains("Total issues: 3"));
        assert!(out.contains("By severity: 1 high, 0 medium, 2 low"));
        assert!(out.contains("Average coupling: 2.50"));
        assert!(out.contains("Average cohesion: 0.75"));
        assert!(out.contains("Well isolated: 2 of 4 components"));
        assert!(!out.contains("god-component"));
    }

    #[test]
    fn test_no_issues_message() {
        let out = render(|w| print_no_issues_message(w, 12));
        assert!(out.contains("No isolation issues detected across 12 components."));
    }

    #[test]
    fn test_json_output() {
        let out = render(|w| print_json(w, &sample_result()));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["files_analyzed"], 4);
        assert_eq!(value["issues"].as_array().unwrap().len(), 3);
        assert_eq!(value["issues"][1]["kind"], "tight-coupling");
        assert_eq!(value["issues"][2]["severity"], "high");
        assert_eq!(value["statistics"]["by_severity"]["low"], 2);
        assert_eq!(value["statistics"]["by_kind"]["boundary-violation"], 1);
        assert_eq!(value["statistics"]["well_isolated"], 2);
    }
}
