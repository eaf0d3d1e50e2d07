use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A module reference found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub request: String,
    pub kind: SpecKind,
}

impl Specifier {
    pub fn new(request: impl Into<String>, kind: SpecKind) -> Self {
        Self { request: request.into(), kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Static,
    Dynamic,
    ReExport,
    Require,
}

/// What one extractor pass learned about a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFacts {
    /// Local specifiers, deduplicated, in first-occurrence order
    pub specifiers: Vec<Specifier>,
    /// Number of exported symbols (named and default)
    pub exported_symbols: usize,
}

/// Which [`DependencyExtractor`](crate::DependencyExtractor) implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Best-effort textual scan
    #[default]
    Pattern,
    /// Full parse with oxc
    Ast,
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pattern" => Ok(Self::Pattern),
            "ast" => Ok(Self::Ast),
            other => Err(format!("unknown extractor '{}' (expected 'pattern' or 'ast')", other)),
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern => f.write_str("pattern"),
            Self::Ast => f.write_str("ast"),
        }
    }
}
