//! Core utilities for isolint checkers.
//!
//! This crate provides the shared plumbing for analyzing JavaScript/TypeScript
//! source trees:
//! - Discovering source files with composable exclusion globs
//! - Extracting local module specifiers from source text
//! - Resolving relative specifiers to files on disk
//! - Root resolution and git root finding

mod collector;
mod config;
mod constants;
mod error;
mod parser;
mod resolver;
mod types;

// Re-export public API
pub use collector::{ExclusionSet, SourceWalker, compile_globs, has_source_extension};
pub use config::{find_git_root, find_git_root_from, resolve_root, strip_line_comments};
pub use constants::{DEFAULT_EXCLUDES, INDEX_FILES, RESOLVE_EXTENSIONS, SOURCE_EXTENSIONS};
pub use error::ConfigError;
pub use parser::{
    AstExtractor, DependencyExtractor, PatternExtractor, extractor_for, is_local_specifier,
};
pub use resolver::{ResolveCache, resolve};
pub use types::{ExtractorKind, ModuleFacts, SpecKind, Specifier};
