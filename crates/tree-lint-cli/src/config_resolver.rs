//! Configuration file lookup.
//!
//! Order:
//!
//! 1. `--config` flag, then the `TREE_LINT_CONFIG` variable
//! 2. `tree-lint.toml` or `.tree-lint.toml` in the analyzed directory or the
//!    nearest ancestor that has one
//! 3. `config.toml` in the global directory (`$TREE_LINT_CONFIG_DIR`, else
//!    `~/.tree-lint/`)
//! 4. Nothing found: the CLI falls back to a preset

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or in the environment.
    Explicit(PathBuf),
    /// Found next to the analyzed documents or in an ancestor directory.
    Project(PathBuf),
    /// Found in the global directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` for a config from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["tree-lint.toml", ".tree-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration for documents under `start`.
#[must_use]
pub fn resolve(start: &Path, explicit: Option<&Path>) -> ConfigSource {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("TREE_LINT_CONFIG").map(PathBuf::from));
    resolve_from(start, explicit, global_config_dir())
}

fn resolve_from(start: &Path, explicit: Option<PathBuf>, global_dir: Option<PathBuf>) -> ConfigSource {
    // Trusted as given; a missing file is reported when it is loaded.
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path);
    }

    // Relative paths like "." have no ancestors to search.
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let first_dir = if start.is_file() { start.parent() } else { Some(start.as_path()) };
    for dir in first_dir.into_iter().flat_map(Path::ancestors) {
        if let Some(found) = project_config_in(dir) {
            tracing::debug!("Found project config: {}", found.display());
            return ConfigSource::Project(found);
        }
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |candidate| {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        })
}

fn project_config_in(dir: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Returns the global config directory.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("TREE_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".tree-lint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) -> PathBuf {
        fs::write(path, "").unwrap();
        path.to_path_buf()
    }

    #[test]
    fn explicit_path_wins_without_existence_check() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("tree-lint.toml"));
        let missing = PathBuf::from("/nonexistent/tree-lint.toml");

        let source = resolve_from(tmp.path(), Some(missing.clone()), None);
        assert_eq!(source, ConfigSource::Explicit(missing));
    }

    #[test]
    fn plain_name_preferred_over_dot_name() {
        let tmp = TempDir::new().unwrap();
        let plain = touch(&tmp.path().join("tree-lint.toml"));
        touch(&tmp.path().join(".tree-lint.toml"));

        assert_eq!(resolve_from(tmp.path(), None, None), ConfigSource::Project(plain));
    }

    #[test]
    fn nearest_ancestor_config_is_used() {
        let tmp = TempDir::new().unwrap();
        let outer = touch(&tmp.path().join(".tree-lint.toml"));
        let deep = tmp.path().join("a/b/c");
        fs::create_dir_all(&deep).unwrap();

        assert_eq!(resolve_from(&deep, None, None), ConfigSource::Project(outer));

        let inner = touch(&tmp.path().join("a/tree-lint.toml"));
        assert_eq!(resolve_from(&deep, None, None), ConfigSource::Project(inner));
    }

    #[test]
    fn document_path_searches_from_its_directory() {
        let tmp = TempDir::new().unwrap();
        let config = touch(&tmp.path().join("tree-lint.toml"));
        let doc = touch(&tmp.path().join("A.tree.json"));

        assert_eq!(resolve_from(&doc, None, None), ConfigSource::Project(config));
    }

    #[test]
    fn global_config_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_file = touch(&global.path().join("config.toml"));

        let source = resolve_from(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(source, ConfigSource::Global(global_file));
        assert!(source.is_global());

        touch(&project.path().join("tree-lint.toml"));
        let source = resolve_from(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(source, ConfigSource::Project(_)));
    }

    #[test]
    fn empty_global_dir_means_default() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let source = resolve_from(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(source, ConfigSource::Default);
        assert!(source.path().is_none());
    }
}
