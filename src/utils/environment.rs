use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR_NAME: &str = "convo-viewer";

/// Default directory to scan (~/.claude/projects)
pub fn default_root_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".claude").join("projects"))
}

/// Platform cache directory for this tool
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Use `override_dir` when given, otherwise the platform default
pub fn resolve_cache_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_cache_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root_dir_layout() {
        if let Ok(root) = default_root_dir() {
            assert!(root.ends_with(".claude/projects"));
        }
    }

    #[test]
    fn test_resolve_cache_dir_prefers_override() {
        let dir = resolve_cache_dir(Some(Path::new("/tmp/custom-cache"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/custom-cache"));
    }

    #[test]
    fn test_default_cache_dir_is_namespaced() {
        if let Ok(dir) = resolve_cache_dir(None) {
            assert!(dir.ends_with(APP_DIR_NAME));
        }
    }
}
