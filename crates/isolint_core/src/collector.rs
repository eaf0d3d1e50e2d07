use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use log::{debug, trace};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crate::{constants::SOURCE_EXTENSIONS, error::ConfigError};

/// Compiled exclusion globs, matched against root-relative paths.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    globs: GlobSet,
    patterns: Vec<String>,
}

impl ExclusionSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let globs = compile_globs(patterns)?;
        let patterns = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        Ok(Self { globs, patterns })
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.globs.is_match(relative)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Compile a list of globs into one set, failing on the first invalid pattern.
pub fn compile_globs<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| ConfigError::InvalidPattern {
        pattern: patterns.iter().map(|p| p.as_ref()).collect::<Vec<_>>().join(", "),
        reason: e.to_string(),
    })?;
    Ok(set)
}

pub fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Walks a root directory and yields the source files eligible for analysis.
pub struct SourceWalker {
    root: PathBuf,
    exclusions: ExclusionSet,
}

impl SourceWalker {
    pub fn new(root: impl Into<PathBuf>, exclusions: ExclusionSet) -> Self {
        Self { root: root.into(), exclusions }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the tree. Each call starts a fresh walk.
    ///
    /// Unreadable directories and entries are skipped.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        trace!("Walking directory tree from root: {}", self.root.display());
        WalkBuilder::new(&self.root)
            .hidden(false)
            .ignore(true)
            .git_ignore(true)
            .build()
            .filter_map(|res| match res {
                Ok(dent) => Some(dent.into_path()),
                Err(e) => {
                    trace!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|p| p.is_file())
            .filter(|p| has_source_extension(p))
            .filter(move |p| !self.is_excluded(p))
    }

    /// Sorted, deduplicated set of source files under the root.
    pub fn collect(&self) -> Vec<PathBuf> {
        debug!("Collecting source files");
        let files: BTreeSet<PathBuf> = self.files().collect();
        debug!("Collected {} source files", files.len());
        files.into_iter().collect()
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let excluded = self.exclusions.is_excluded(rel);
        if excluded {
            trace!("Excluded by glob: {}", rel.display());
        }
        excluded
    }
}
