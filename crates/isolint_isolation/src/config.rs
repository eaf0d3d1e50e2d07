use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use isolint_core::{
    ConfigError, DEFAULT_EXCLUDES, ExtractorKind, find_git_root, resolve_root,
    strip_line_comments,
};
use log::{debug, info};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::types::Severity;

/// Settings file looked up at the analysis root when `--config` is absent.
pub const SETTINGS_FILE_NAME: &str = "isolint.json";

/// Every numeric limit the metric engine checks against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Outgoing edges above which tight coupling is reported
    pub max_coupling: usize,
    /// Responsibility tags above which low cohesion is reported
    pub max_responsibilities: usize,
    /// Incoming edges above which high fan-in is reported
    pub max_fan_in: usize,
    /// Outgoing edges above which high fan-out is reported
    pub max_fan_out: usize,
    /// Code lines a regular component may have
    pub max_lines: usize,
    /// Code lines above which any non-exempt component is a critical god component
    pub hard_max_lines: usize,
    pub reporter_max_lines: usize,
    pub cli_max_lines: usize,
    pub ui_max_lines: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_coupling: 7,
            max_responsibilities: 3,
            max_fan_in: 10,
            max_fan_out: 10,
            max_lines: 400,
            hard_max_lines: 800,
            reporter_max_lines: 600,
            cli_max_lines: 800,
            ui_max_lines: 500,
        }
    }
}

/// Glob sets assigning files to layers, checked in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerPatterns {
    pub presentation: Vec<String>,
    pub application: Vec<String>,
    pub domain: Vec<String>,
    pub infrastructure: Vec<String>,
}

impl Default for LayerPatterns {
    fn default() -> Self {
        Self {
            presentation: strings(&[
                "**/components/**",
                "**/pages/**",
                "**/views/**",
                "**/screens/**",
                "**/ui/**",
                "**/layouts/**",
            ]),
            application: strings(&[
                "**/application/**",
                "**/services/**",
                "**/use-cases/**",
                "**/usecases/**",
                "**/controllers/**",
            ]),
            domain: strings(&["**/domain/**", "**/models/**", "**/entities/**"]),
            infrastructure: strings(&[
                "**/infrastructure/**",
                "**/infra/**",
                "**/adapters/**",
                "**/repositories/**",
                "**/db/**",
                "**/database/**",
                "**/api/**",
            ]),
        }
    }
}

/// Path categories that change the god-component size limit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizePolicyPatterns {
    /// Never reported as god components
    pub exempt: Vec<String>,
    pub cli: Vec<String>,
    pub reporter: Vec<String>,
    pub ui: Vec<String>,
}

impl Default for SizePolicyPatterns {
    fn default() -> Self {
        Self {
            exempt: strings(&[
                "**/*.seed.*",
                "**/seed/**",
                "**/seeds/**",
                "**/*.fixture.*",
                "**/fixtures/**",
                "**/migrations/**",
                "**/*.config.*",
                "**/*.d.ts",
                "**/generated/**",
            ]),
            cli: strings(&["**/cli.*", "**/cli/**", "**/bin/**"]),
            reporter: strings(&[
                "**/*reporter*",
                "**/*Reporter*",
                "**/*generator*",
                "**/*Generator*",
                "**/reporters/**",
                "**/generators/**",
            ]),
            ui: strings(&["**/*.tsx", "**/*.jsx", "**/components/**"]),
        }
    }
}

/// Everything that shapes one analysis, independent of the CLI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub thresholds: Thresholds,
    pub layers: LayerPatterns,
    pub size_policy: SizePolicyPatterns,
    /// Exclusion globs for discovery, relative to the root
    pub exclude: Vec<String>,
    pub extractor: ExtractorKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            layers: LayerPatterns::default(),
            size_policy: SizePolicyPatterns::default(),
            exclude: strings(DEFAULT_EXCLUDES),
            extractor: ExtractorKind::default(),
        }
    }
}

impl Settings {
    /// Load a JSON settings file, merging it over the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| ConfigError::InvalidSettings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| {
            ConfigError::InvalidSettings { path: path.to_path_buf(), reason: e.to_string() }.into()
        })
    }

    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(&strip_line_comments(content))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "isolation")]
#[command(about = "Check component isolation in JavaScript/TypeScript projects")]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Settings file (defaults to isolint.json at the root when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Additional exclusion glob, relative to the root (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Drop the built-in exclusion globs
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Dependency extractor: pattern or ast
    #[arg(long)]
    pub extractor: Option<ExtractorKind>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
    pub format: OutputFormat,

    /// Lowest severity that makes the run fail
    #[arg(long, value_enum, default_value_t = Severity::High)]
    pub fail_on: Severity,

    #[arg(long)]
    pub max_coupling: Option<usize>,

    #[arg(long)]
    pub max_responsibilities: Option<usize>,

    #[arg(long)]
    pub max_fan_in: Option<usize>,

    #[arg(long)]
    pub max_fan_out: Option<usize>,

    #[arg(long)]
    pub max_lines: Option<usize>,

    #[clap(skip)]
    pub settings: Settings,
}

impl Config {
    /// Resolve the root, load the settings file and apply CLI overrides.
    pub fn initialize(&mut self) -> Result<()> {
        let root = match self.root.take() {
            Some(r) => {
                debug!("Using provided root directory: {:?}", r);
                resolve_root(&env::current_dir()?, &r)?
            }
            None => {
                debug!("No root provided, searching for git root");
                find_git_root()?
            }
        };
        info!("Using root directory: {}", root.display());

        let settings_path = self.config.clone().or_else(|| {
            let candidate = root.join(SETTINGS_FILE_NAME);
            candidate.is_file().then_some(candidate)
        });
        let mut settings = match settings_path {
            Some(path) => {
                info!("Using settings file: {}", path.display());
                Settings::load(&path)?
            }
            None => Settings::default(),
        };

        self.apply_overrides(&mut settings);
        self.settings = settings;
        self.root = Some(root);
        Ok(())
    }

    fn apply_overrides(&self, settings: &mut Settings) {
        if self.no_default_excludes {
            settings.exclude.clear();
        }
        settings.exclude.extend(self.exclude.iter().cloned());
        if let Some(kind) = self.extractor {
            settings.extractor = kind;
        }

        let t = &mut settings.thresholds;
        let overrides = [
            (self.max_coupling, &mut t.max_coupling),
            (self.max_responsibilities, &mut t.max_responsibilities),
            (self.max_fan_in, &mut t.max_fan_in),
            (self.max_fan_out, &mut t.max_fan_out),
            (self.max_lines, &mut t.max_lines),
        ];
        for (value, slot) in overrides {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(root: &Path, args: &[&str]) -> Config {
        let mut argv = vec!["isolation", "--root"];
        let root_str = root.to_str().unwrap();
        argv.push(root_str);
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.max_coupling, 7);
        assert_eq!(t.max_responsibilities, 3);
        assert_eq!(t.max_fan_in, 10);
        assert_eq!(t.max_fan_out, 10);
        assert_eq!(t.max_lines, 400);
        assert_eq!(t.hard_max_lines, 800);
        assert!(t.ui_max_lines > t.max_lines);
        assert!(t.reporter_max_lines > t.ui_max_lines);
        assert!(t.cli_max_lines > t.reporter_max_lines);
    }

    #[test]
    fn test_parse_partial_settings_keeps_defaults() {
        let settings = Settings::parse(
            r#"{
  // tighter coupling for this repo
  "thresholds": { "max_coupling": 5 },
  "layers": { "domain": ["**/core/**"] },
  "extractor": "ast"
}"#,
        )
        .unwrap();
        assert_eq!(settings.thresholds.max_coupling, 5);
        assert_eq!(settings.thresholds.max_fan_in, 10);
        assert_eq!(settings.layers.domain, vec!["**/core/**".to_string()]);
        assert_eq!(settings.layers.presentation, LayerPatterns::default().presentation);
        assert_eq!(settings.extractor, ExtractorKind::Ast);
        assert_eq!(settings.exclude.len(), DEFAULT_EXCLUDES.len());
    }

    #[test]
    fn test_load_invalid_settings_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_initialize_picks_up_settings_file_at_root() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(SETTINGS_FILE_NAME),
            r#"{ "thresholds": { "max_fan_in": 3 } }"#,
        )
        .unwrap();

        let mut cfg = config_for(temp_dir.path(), &[]);
        cfg.initialize().unwrap();
        assert_eq!(cfg.settings.thresholds.max_fan_in, 3);
        assert_eq!(cfg.root().unwrap(), &temp_dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_cli_overrides_win_over_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(SETTINGS_FILE_NAME),
            r#"{ "thresholds": { "max_coupling": 3, "max_lines": 250 } }"#,
        )
        .unwrap();

        let mut cfg = config_for(
            temp_dir.path(),
            &["--max-coupling", "12", "--extractor", "ast", "--exclude", "**/legacy/**"],
        );
        cfg.initialize().unwrap();
        assert_eq!(cfg.settings.thresholds.max_coupling, 12);
        assert_eq!(cfg.settings.thresholds.max_lines, 250);
        assert_eq!(cfg.settings.extractor, ExtractorKind::Ast);
        assert!(cfg.settings.exclude.contains(&"**/legacy/**".to_string()));
        assert!(cfg.settings.exclude.contains(&"**/node_modules/**".to_string()));
    }

    #[test]
    fn test_no_default_excludes() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = config_for(temp_dir.path(), &["--no-default-excludes", "--exclude", "gen/**"]);
        cfg.initialize().unwrap();
        assert_eq!(cfg.settings.exclude, vec!["gen/**".to_string()]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = config_for(&temp_dir.path().join("nope"), &[]);
        assert!(cfg.initialize().is_err());
    }

    #[test]
    fn test_root_requires_initialize() {
        let cfg = Config::parse_from(["isolation"]);
        assert!(cfg.root().is_err());
    }
}
