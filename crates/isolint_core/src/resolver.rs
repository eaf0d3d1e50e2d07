use dashmap::DashMap;
use log::trace;
use path_clean::clean;
use std::path::{Path, PathBuf};

use crate::{
    constants::{INDEX_FILES, RESOLVE_EXTENSIONS},
    parser::is_local_specifier,
};

/// Memo of `(referencing directory, specifier) -> resolved file`.
pub type ResolveCache = DashMap<(PathBuf, String), Option<PathBuf>>;

/// Resolve a local specifier against the directory of the file that references it.
///
/// Tries the specifier verbatim, then with each of [`RESOLVE_EXTENSIONS`]
/// appended, then each of [`INDEX_FILES`] inside a directory named by the
/// specifier. Returns the first existing regular file, canonicalized, or
/// `None`. Bare package names never resolve.
pub fn resolve(from_dir: &Path, request: &str, cache: &ResolveCache) -> Option<PathBuf> {
    let key = (from_dir.to_path_buf(), request.to_string());
    if let Some(v) = cache.get(&key) {
        trace!("Cache hit for resolve: '{}' from {}", request, from_dir.display());
        return v.clone();
    }

    let resolved = if is_local_specifier(request) {
        let p = clean(from_dir.join(request));
        let result = resolve_file(&p);
        match &result {
            Some(r) => trace!("Resolved '{}' to {}", request, r.display()),
            None => trace!("Failed to resolve '{}' from {}", request, from_dir.display()),
        }
        result
    } else {
        trace!("Not a local specifier: '{}'", request);
        None
    };

    cache.insert(key, resolved.clone());
    resolved
}

fn resolve_file(p: &Path) -> Option<PathBuf> {
    if p.is_file() {
        return Some(canonical(p.to_path_buf()));
    }

    for ext in RESOLVE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", p.display(), ext));
        if candidate.is_file() {
            return Some(canonical(candidate));
        }
    }

    for index_file in INDEX_FILES {
        let candidate = p.join(index_file);
        if candidate.is_file() {
            return Some(canonical(candidate));
        }
    }

    None
}

fn canonical(p: PathBuf) -> PathBuf {
    p.canonicalize().unwrap_or(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path.canonicalize().unwrap()
    }

    #[test]
    fn test_resolve_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = create_test_file(root, "src/util.js", "");
        let cache = ResolveCache::new();

        assert_eq!(resolve(&root.join("src"), "./util.js", &cache), Some(target));
    }

    #[test]
    fn test_resolve_appends_extension_in_priority_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let ts = create_test_file(root, "src/util.ts", "");
        create_test_file(root, "src/util.js", "");
        let cache = ResolveCache::new();

        assert_eq!(resolve(&root.join("src"), "./util", &cache), Some(ts));
    }

    #[test]
    fn test_resolve_index_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let index = create_test_file(root, "src/components/index.tsx", "");
        let cache = ResolveCache::new();

        assert_eq!(resolve(&root.join("src"), "./components", &cache), Some(index));
    }

    #[test]
    fn test_resolve_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = create_test_file(root, "lib/shared.ts", "");
        fs::create_dir_all(root.join("src/deep")).unwrap();
        let cache = ResolveCache::new();

        assert_eq!(resolve(&root.join("src/deep"), "../../lib/shared", &cache), Some(target));
    }

    #[test]
    fn test_directory_without_index_is_unresolved() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/empty")).unwrap();
        let cache = ResolveCache::new();

        assert_eq!(resolve(&root.join("src"), "./empty", &cache), None);
    }

    #[test]
    fn test_missing_file_is_unresolved() {
        let temp_dir = TempDir::new().unwrap();
        let cache = ResolveCache::new();
        assert_eq!(resolve(temp_dir.path(), "./missing", &cache), None);
    }

    #[test]
    fn test_bare_package_is_unresolved() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "node_modules/lodash/index.js", "");
        let cache = ResolveCache::new();

        assert_eq!(resolve(root, "lodash", &cache), None);
    }

    #[test]
    fn test_results_are_cached() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = create_test_file(root, "a.ts", "");
        let cache = ResolveCache::new();

        assert_eq!(resolve(root, "./a", &cache), Some(target.clone()));
        assert_eq!(resolve(root, "./missing", &cache), None);
        assert_eq!(cache.len(), 2);

        // Cached answer survives the file disappearing
        fs::remove_file(&target).unwrap();
        assert_eq!(resolve(root, "./a", &cache), Some(target));
    }
}
