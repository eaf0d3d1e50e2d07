use anyhow::{Result, anyhow};
use log::{debug, trace};
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

pub fn find_git_root() -> Result<PathBuf> {
    find_git_root_from(&env::current_dir()?)
}

pub fn find_git_root_from(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root");
    let mut current_dir = start.to_path_buf();
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

/// Turn a user-supplied root into a canonical directory path.
///
/// Relative roots are taken relative to `workspace`. A missing root or a
/// root that is not a directory is fatal.
pub fn resolve_root(workspace: &Path, root: &Path) -> Result<PathBuf> {
    let joined = if root.is_absolute() { root.to_path_buf() } else { workspace.join(root) };
    let canonical =
        joined.canonicalize().map_err(|_| ConfigError::RootNotFound(joined.clone()))?;
    if !canonical.is_dir() {
        return Err(ConfigError::RootNotDirectory(canonical).into());
    }
    debug!("Resolved analysis root: {}", canonical.display());
    Ok(canonical)
}

/// Strip `//` line comments so hand-edited JSON settings parse.
pub fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| if let Some(idx) = line.find("//") { &line[..idx] } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
