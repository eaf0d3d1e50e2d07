//! Dependency extraction from raw source text.
//!
//! [`PatternExtractor`] is a best-effort textual scan: it does not understand
//! string interpolation, computed specifiers, or import-shaped text inside
//! comments, and may over- or under-count on adversarial input.
//! [`AstExtractor`] is a drop-in replacement backed by a full parse.

use log::{debug, trace};
use once_cell::sync::Lazy;
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use regex::Regex;
use std::{collections::HashSet, path::Path};

use crate::types::{ExtractorKind, ModuleFacts, SpecKind, Specifier};

pub trait DependencyExtractor: Send + Sync {
    fn extract(&self, path: &Path, source: &str) -> ModuleFacts;
}

pub fn extractor_for(kind: ExtractorKind) -> Box<dyn DependencyExtractor> {
    match kind {
        ExtractorKind::Pattern => Box::new(PatternExtractor),
        ExtractorKind::Ast => Box::new(AstExtractor),
    }
}

/// Specifiers starting with `.` or `/` point into the analyzed tree; bare
/// package names never do.
pub fn is_local_specifier(request: &str) -> bool {
    request.starts_with('.') || request.starts_with('/')
}

/// Drop non-local specifiers and repeated requests, keeping first occurrences.
fn local_unique(specs: Vec<Specifier>) -> Vec<Specifier> {
    let mut seen = HashSet::new();
    specs
        .into_iter()
        .filter(|s| {
            if !is_local_specifier(&s.request) {
                trace!("Discarding package specifier: '{}'", s.request);
                return false;
            }
            seen.insert(s.request.clone())
        })
        .collect()
}

static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+(?:type\s+)?[\w$*{}\s,]+?\s+from\s*['"]([^'"\n]+)['"]"#)
        .expect("valid static import regex")
});
static SIDE_EFFECT_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*['"]([^'"\n]+)['"]"#).expect("valid side-effect import regex")
});
static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"`]([^'"`\n]+)['"`]\s*\)"#).expect("valid dynamic import regex")
});
static RE_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bexport\s+(?:type\s+)?(?:\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*['"]([^'"\n]+)['"]"#,
    )
    .expect("valid re-export regex")
});
static REQUIRE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid require regex")
});

static EXPORT_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\bexport\s+(?:declare\s+)?(?:async\s+)?(?:function\*?|abstract\s+class|class|const|let|var|interface|type|enum|namespace)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("valid export declaration regex")
});
static EXPORT_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bexport\s+default\b").expect("valid export default regex"));
static EXPORT_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bexport\s*(?:type\s+)?\{([^}]*)\}").expect("valid export list regex"));

/// Regex-driven extractor. This is the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    fn specifiers(source: &str) -> Vec<Specifier> {
        let patterns: [(&Regex, SpecKind); 5] = [
            (&STATIC_IMPORT, SpecKind::Static),
            (&SIDE_EFFECT_IMPORT, SpecKind::Static),
            (&DYNAMIC_IMPORT, SpecKind::Dynamic),
            (&RE_EXPORT, SpecKind::ReExport),
            (&REQUIRE_CALL, SpecKind::Require),
        ];

        let mut found: Vec<(usize, Specifier)> = Vec::new();
        for (re, kind) in patterns {
            for caps in re.captures_iter(source) {
                if let Some(m) = caps.get(1) {
                    found.push((m.start(), Specifier::new(m.as_str(), kind)));
                }
            }
        }
        found.sort_by_key(|(offset, _)| *offset);
        local_unique(found.into_iter().map(|(_, spec)| spec).collect())
    }

    fn exported_symbols(source: &str) -> usize {
        let mut names: HashSet<String> = HashSet::new();
        for caps in EXPORT_DECLARATION.captures_iter(source) {
            if let Some(m) = caps.get(1) {
                names.insert(m.as_str().to_string());
            }
        }
        if EXPORT_DEFAULT.is_match(source) {
            names.insert("default".to_string());
        }
        for caps in EXPORT_LIST.captures_iter(source) {
            let Some(list) = caps.get(1) else { continue };
            for item in list.as_str().split(',') {
                // `a as b` exports `b`
                if let Some(name) = item.split_whitespace().last()
                    && name != "type"
                {
                    names.insert(name.to_string());
                }
            }
        }
        names.len()
    }
}

impl DependencyExtractor for PatternExtractor {
    fn extract(&self, path: &Path, source: &str) -> ModuleFacts {
        let specifiers = Self::specifiers(source);
        let exported_symbols = Self::exported_symbols(source);
        debug!(
            "Found {} local specifiers and {} exports in {}",
            specifiers.len(),
            exported_symbols,
            path.display()
        );
        ModuleFacts { specifiers, exported_symbols }
    }
}

/// Parser-backed extractor. Recovers what it can from files with syntax errors.
///
/// Walks the whole tree, so imports and `require` calls nested in function,
/// arrow and class bodies are found in source order.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstExtractor;

impl DependencyExtractor for AstExtractor {
    fn extract(&self, path: &Path, source: &str) -> ModuleFacts {
        trace!("Parsing {}", path.display());
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::tsx());
        let ParserReturn { program, errors, .. } =
            OxcParser::new(&allocator, source, source_type).parse();
        if !errors.is_empty() {
            debug!("{} parse errors in {}, using recovered AST", errors.len(), path.display());
        }

        let mut collector = FactCollector::default();
        collector.visit_program(&program);

        let specifiers = local_unique(collector.specs);
        debug!(
            "Found {} local specifiers and {} exports in {}",
            specifiers.len(),
            collector.exported_symbols,
            path.display()
        );
        ModuleFacts { specifiers, exported_symbols: collector.exported_symbols }
    }
}

#[derive(Default)]
struct FactCollector {
    specs: Vec<Specifier>,
    exported_symbols: usize,
}

impl FactCollector {
    fn push(&mut self, request: &str, kind: SpecKind) {
        trace!("{:?} specifier '{}'", kind, request);
        self.specs.push(Specifier::new(request, kind));
    }
}

/// The text of a string literal or a template literal without substitutions.
fn literal_text<'s>(expr: &'s Expression<'_>) -> Option<&'s str> {
    match expr {
        Expression::StringLiteral(lit) => Some(lit.value.as_str()),
        Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => {
            tpl.quasis.first().map(|q| q.value.raw.as_str())
        }
        _ => None,
    }
}

impl<'a> Visit<'a> for FactCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.push(it.source.value.as_str(), SpecKind::Static);
        walk::walk_import_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.push(it.source.value.as_str(), SpecKind::ReExport);
        self.exported_symbols += 1;
        walk::walk_export_all_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(src) = &it.source {
            self.push(src.value.as_str(), SpecKind::ReExport);
        }
        self.exported_symbols += it.specifiers.len();
        self.exported_symbols += match &it.declaration {
            Some(Declaration::VariableDeclaration(vars)) => vars.declarations.len(),
            Some(_) => 1,
            None => 0,
        };
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_default_declaration(&mut self, it: &ExportDefaultDeclaration<'a>) {
        self.exported_symbols += 1;
        walk::walk_export_default_declaration(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Some(request) = literal_text(&it.source) {
            self.push(request, SpecKind::Dynamic);
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &it.callee
            && callee.name.as_str() == "require"
            && let Some(request) =
                it.arguments.first().and_then(|arg| arg.as_expression()).and_then(literal_text)
        {
            self.push(request, SpecKind::Require);
        }
        walk::walk_call_expression(self, it);
    }
}
