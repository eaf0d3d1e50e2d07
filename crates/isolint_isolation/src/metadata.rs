use isolint_core::{DependencyExtractor, ResolveCache, resolve};
use log::{debug, trace};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{layers::LayerClassifier, types::Component};

/// A concern detected in a file by textual feature signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Responsibility {
    UiRendering,
    DataFetching,
    StateManagement,
    DataPersistence,
    BusinessLogic,
    Validation,
    Routing,
    Authentication,
    Styling,
}

impl Responsibility {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UiRendering => "UI rendering",
            Self::DataFetching => "Data fetching",
            Self::StateManagement => "State management",
            Self::DataPersistence => "Data persistence",
            Self::BusinessLogic => "Business logic",
            Self::Validation => "Validation",
            Self::Routing => "Routing",
            Self::Authentication => "Authentication",
            Self::Styling => "Styling",
        }
    }
}

impl fmt::Display for Responsibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static SIGNATURES: Lazy<Vec<(Responsibility, Regex)>> = Lazy::new(|| {
    let table: [(Responsibility, &str); 9] = [
        (
            Responsibility::UiRendering,
            r"\b(?:useState|useEffect|useLayoutEffect|useRef|useMemo|useCallback|createElement|componentDidMount|componentWillUnmount|onMounted|ngOnInit|render)\s*\(|\bReactDOM\.|\bextends\s+(?:React\.)?(?:Pure)?Component\b",
        ),
        (
            Responsibility::DataFetching,
            r"\bfetch\s*\(|\baxios(?:\.\w+)?\s*\(|\bXMLHttpRequest\b|\b(?:useQuery|useMutation|useSWR)\s*\(|\$http\.",
        ),
        (
            Responsibility::StateManagement,
            r"\b(?:createStore|configureStore|createSlice|useReducer|useSelector|useDispatch|createContext|useContext|dispatch)\s*\(|\bcreate\s*\(\s*\(\s*set\b",
        ),
        (
            Responsibility::DataPersistence,
            r"\b(?:localStorage|sessionStorage)\.\w+|\bindexedDB\b|\bprisma\.\w+|\bknex\s*\(|\bmongoose\.|\.(?:save|insertOne|insertMany|updateOne|deleteOne)\s*\(|\b(?:INSERT\s+INTO|UPDATE\s+\w+\s+SET|DELETE\s+FROM)\b|\bwriteFile(?:Sync)?\s*\(",
        ),
        (
            Responsibility::BusinessLogic,
            r"\b(?:calculate|compute|process|apply)[A-Z]\w*\s*\(",
        ),
        (
            Responsibility::Validation,
            r"\b(?:validate|isValid|sanitize)\w*\s*\(|\bz\.object\s*\(|\bJoi\.\w+|\byup\.\w+",
        ),
        (
            Responsibility::Routing,
            r"\b(?:useRouter|useNavigate|useParams|createBrowserRouter)\s*\(|\brouter\.(?:get|post|put|patch|delete|push|replace)\s*\(|\bapp\.(?:get|post|put|patch|delete|use)\s*\(|<Route\b",
        ),
        (
            Responsibility::Authentication,
            r"\b(?:login|logout|signIn|signOut|authenticate|getSession|verifyToken)\s*\(|\bjwt\.\w+|\bbcrypt\.\w+|\bpassport\.\w+",
        ),
        (
            Responsibility::Styling,
            r"\bstyled\.\w+\s*`|\bstyled\s*\(|\bmakeStyles\s*\(|\bStyleSheet\.create\s*\(|\bcss\s*`",
        ),
    ];
    table
        .into_iter()
        .map(|(tag, pattern)| (tag, Regex::new(pattern).expect("valid responsibility signature")))
        .collect()
});

/// Tag set for a file. Each feature contributes at most one tag.
pub fn detect_responsibilities(source: &str) -> BTreeSet<Responsibility> {
    SIGNATURES.iter().filter(|(_, re)| re.is_match(source)).map(|(tag, _)| *tag).collect()
}

/// Lines containing at least one non-whitespace character. Comments count.
pub fn count_code_lines(source: &str) -> usize {
    source.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Inputs shared by every per-file metadata computation in one run.
pub struct MetadataBuilder<'a> {
    pub root: &'a Path,
    pub extractor: &'a dyn DependencyExtractor,
    pub layers: &'a LayerClassifier,
    pub resolve_cache: &'a ResolveCache,
}

impl MetadataBuilder<'_> {
    /// Build metadata for every file in parallel. Unreadable files are skipped.
    ///
    /// Output order follows `files`.
    pub fn build_all(&self, files: &[PathBuf]) -> Vec<Component> {
        debug!("Building metadata for {} files", files.len());
        let components: Vec<Component> =
            files.par_iter().filter_map(|file| self.build(file)).collect();
        debug!(
            "Built metadata for {} components ({} skipped)",
            components.len(),
            files.len() - components.len()
        );
        components
    }

    pub fn build(&self, file: &Path) -> Option<Component> {
        let source = match fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                trace!("Skipping unreadable file {}: {}", file.display(), e);
                return None;
            }
        };

        let facts = self.extractor.extract(file, &source);
        let from_dir = file.parent().unwrap_or(self.root);

        let mut seen = HashSet::new();
        let imports: Vec<PathBuf> = facts
            .specifiers
            .iter()
            .filter_map(|spec| resolve(from_dir, &spec.request, self.resolve_cache))
            .filter(|target| seen.insert(target.clone()))
            .collect();

        let relative =
            file.strip_prefix(self.root).unwrap_or(file).to_string_lossy().replace('\\', "/");
        let layer = self.layers.classify(Path::new(&relative));
        trace!("{} -> {} imports, layer {:?}", relative, imports.len(), layer);

        Some(Component {
            path: file.to_path_buf(),
            responsibilities: detect_responsibilities(&source),
            lines: count_code_lines(&source),
            exported_symbols: facts.exported_symbols,
            imports,
            layer,
            relative,
        })
    }
}
