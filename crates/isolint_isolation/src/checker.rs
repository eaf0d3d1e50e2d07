use anyhow::Result;
use isolint_core::{
    DependencyExtractor, ExclusionSet, ResolveCache, SourceWalker, extractor_for, resolve_root,
};
use log::{debug, info, warn};
use std::{env, path::Path};

use crate::{
    config::{Config, Settings},
    graph::DependencyGraph,
    layers::LayerClassifier,
    metadata::MetadataBuilder,
    metrics::{MetricEngine, SizePolicy},
    stats,
    types::{AggregateStatistics, CheckResult, Component, IsolationIssue},
};

/// Compiled settings, reusable across analyses of different roots.
pub struct IsolationDetector {
    settings: Settings,
    layers: LayerClassifier,
    size_policy: SizePolicy,
    extractor: Box<dyn DependencyExtractor>,
}

/// Everything one `analyze` call produced.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub issues: Vec<IsolationIssue>,
    components: Vec<Component>,
    graph: DependencyGraph,
}

impl Analysis {
    /// Statistics for exactly this run's issues and components.
    pub fn statistics(&self) -> AggregateStatistics {
        stats::statistics(&self.issues, &self.components, &self.graph)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn into_check_result(self) -> CheckResult {
        let statistics = self.statistics();
        CheckResult { files_analyzed: self.components.len(), statistics, issues: self.issues }
    }
}

impl IsolationDetector {
    pub fn new(settings: Settings) -> Result<Self> {
        let layers = LayerClassifier::new(&settings.layers)?;
        let size_policy = SizePolicy::new(&settings.size_policy)?;
        let extractor = extractor_for(settings.extractor);
        debug!("Using {} extractor", settings.extractor);
        Ok(Self { settings, layers, size_policy, extractor })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the full pipeline on `root`, taken relative to the current directory.
    ///
    /// `exclusion_overrides` replaces the configured exclusion globs when given.
    /// Only configuration problems are errors; unreadable files and
    /// unresolved specifiers are skipped.
    pub fn analyze(&self, root: &Path, exclusion_overrides: Option<&[String]>) -> Result<Analysis> {
        self.analyze_in(&env::current_dir()?, root, exclusion_overrides)
    }

    /// Like [`analyze`](Self::analyze), with a relative `root` taken relative to `workspace`.
    ///
    /// The root is canonicalized first so discovered paths compare equal to
    /// resolved import targets. A missing root or a non-directory is fatal.
    pub fn analyze_in(
        &self,
        workspace: &Path,
        root: &Path,
        exclusion_overrides: Option<&[String]>,
    ) -> Result<Analysis> {
        let root = resolve_root(workspace, root)?;
        let root = root.as_path();

        let patterns = exclusion_overrides.unwrap_or(self.settings.exclude.as_slice());
        let exclusions = ExclusionSet::new(patterns)?;
        debug!("Using {} exclusion globs", exclusions.patterns().len());

        let walker = SourceWalker::new(root, exclusions);
        let files = walker.collect();
        if files.is_empty() {
            warn!("No source files found under {}", root.display());
            return Ok(Analysis {
                issues: Vec::new(),
                components: Vec::new(),
                graph: DependencyGraph::default(),
            });
        }
        info!("Found {} source files", files.len());

        let resolve_cache = ResolveCache::new();
        let builder = MetadataBuilder {
            root,
            extractor: self.extractor.as_ref(),
            layers: &self.layers,
            resolve_cache: &resolve_cache,
        };
        let components = builder.build_all(&files);
        debug!("Resolver cache holds {} entries", resolve_cache.len());

        let graph = DependencyGraph::build(&components);

        let engine =
            MetricEngine { thresholds: &self.settings.thresholds, size_policy: &self.size_policy };
        let issues = engine.evaluate(&components, &graph);
        info!("Isolation analysis complete. Found {} issues", issues.len());

        Ok(Analysis { issues, components, graph })
    }
}

pub fn run_isolation_check(mut cfg: Config) -> Result<CheckResult> {
    info!("Starting isolation check");
    cfg.initialize()?;
    let root = cfg.root()?.clone();

    let detector = IsolationDetector::new(cfg.settings)?;
    let analysis = detector.analyze(&root, None)?;
    Ok(analysis.into_check_result())
}
