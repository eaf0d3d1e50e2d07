//! Constants for source extensions, module resolution and default exclusions.
//!
//! This module centralizes extension handling so discovery and resolution
//! agree on which files form the analyzed tree.
//!
//! ## Supported Extensions
//!
//! - **TypeScript**: `.ts`, `.tsx`, `.mts` (ES module), `.cts` (CommonJS)
//! - **JavaScript**: `.js`, `.jsx`, `.mjs` (ES module), `.cjs` (CommonJS)

/// File extensions for source files that take part in the analysis
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Extensions appended to a specifier when resolving it (in priority order)
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Index file names tried inside a directory named by a specifier
pub const INDEX_FILES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.mts",
    "index.cts",
    "index.js",
    "index.jsx",
    "index.mjs",
    "index.cjs",
];

/// Exclusion globs applied by discovery unless the caller overrides them.
///
/// Matched against the path relative to the analysis root.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // Dependency vendors
    "**/node_modules/**",
    "**/bower_components/**",
    "**/vendor/**",
    // Build output
    "**/dist/**",
    "**/build/**",
    "**/out/**",
    "**/.next/**",
    "**/.turbo/**",
    "**/coverage/**",
    // Version control
    "**/.git/**",
    "**/.svn/**",
    "**/.hg/**",
    // Tests, fixtures and mocks
    "**/*.test.*",
    "**/*.spec.*",
    "**/__tests__/**",
    "**/__mocks__/**",
    "**/test/**",
    "**/tests/**",
    "**/fixtures/**",
    "**/*.mock.*",
    "**/mocks/**",
    // Examples and demos
    "**/examples/**",
    "**/example/**",
    "**/demo/**",
    "**/demos/**",
];
