//! Check command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tree_lint_checks::{builtin_registry, Preset};
use tree_lint_core::{Analyzer, Config, Severity, SourceDocument, SourceFile};
use walkdir::WalkDir;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Suffix of the tree documents produced by parser front ends.
const DOCUMENT_SUFFIX: &str = ".tree.json";

/// Options of the check command.
#[derive(Debug)]
pub struct CheckArgs {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated check names or ids to keep.
    pub checks: Option<String>,
    /// Preset used when no configuration file is found.
    pub preset: String,
    /// Parallelism override.
    pub jobs: Option<usize>,
    /// Lowest severity that fails the run.
    pub fail_on: Severity,
}

/// Runs the check command.
pub fn run(path: &Path, args: &CheckArgs, source: &ConfigSource) -> Result<()> {
    let config = match super::load_config(source)? {
        Some(config) => config,
        None => {
            let Some(preset) = Preset::from_name(&args.preset) else {
                bail!("Unknown preset: {}", args.preset);
            };
            tracing::debug!("No config found, using preset {:?}", preset);
            preset.config()
        }
    };
    let config = match &args.checks {
        Some(list) => select_checks(config, list),
        None => config,
    };

    let mut builder = Analyzer::builder()
        .config(config)
        .registry(builtin_registry());
    if let Some(jobs) = args.jobs {
        builder = builder.parallelism(jobs);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    let files = discover(path)?
        .iter()
        .map(|doc| load_document(doc))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        "Analyzing {} with {} check(s)",
        path.display(),
        analyzer.check_count()
    );

    let result = analyzer.analyze(files).context("Analysis failed")?;

    super::output::print(&result, args.format)?;

    if result.has_violations_at(args.fail_on) || !result.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Keeps only the configured checks named in `list`, by name or id.
fn select_checks(mut config: Config, list: &str) -> Config {
    let wanted: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    config.checks.retain(|check| {
        wanted.contains(&check.name.as_str())
            || check.id.as_deref().is_some_and(|id| wanted.contains(&id))
    });
    for name in &wanted {
        let known = config
            .checks
            .iter()
            .any(|c| c.name == *name || c.id.as_deref() == Some(*name));
        if !known {
            tracing::warn!("Unknown or unconfigured check: {}", name);
        }
    }
    config
}

/// Finds tree documents under `path`, sorted for stable output.
fn discover(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        let is_document = entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(DOCUMENT_SUFFIX));
        if is_document {
            found.push(entry.into_path());
        }
    }
    found.sort();
    tracing::debug!("Found {} document(s) under {}", found.len(), path.display());
    Ok(found)
}

fn load_document(path: &Path) -> Result<SourceFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = SourceDocument::from_json(&content)
        .with_context(|| format!("Failed to parse tree document {}", path.display()))?;
    Ok(doc.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tree_lint_core::CheckConfig;

    #[test]
    fn discovers_only_tree_documents() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("b.tree.json"), "{}").unwrap();
        fs::write(tmp.path().join("nested/a.tree.json"), "{}").unwrap();
        fs::write(tmp.path().join("notes.json"), "{}").unwrap();

        let found = discover(tmp.path()).unwrap();
        assert_eq!(
            found,
            vec![
                tmp.path().join("b.tree.json"),
                tmp.path().join("nested/a.tree.json"),
            ]
        );
    }

    #[test]
    fn loads_a_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("A.tree.json");
        fs::write(
            &path,
            r#"{"path": "A.java", "nodes": [{"kind": "CLASS_DEF", "line": 1}],
                "comments": [{"style": "block", "text": " x ", "line": 1, "column": 10}]}"#,
        )
        .unwrap();

        let file = load_document(&path).unwrap();
        assert_eq!(file.path, PathBuf::from("A.java"));
        assert_eq!(file.tree.len(), 1);
        assert_eq!(file.comments.len(), 1);
    }

    #[test]
    fn loads_a_deeply_nested_document() {
        let depth = 300;
        let mut json = String::from(r#"{"path": "Deep.java", "nodes": ["#);
        for _ in 0..depth {
            json.push_str(r#"{"kind": "SLIST", "line": 1, "children": ["#);
        }
        json.push_str(&"]}".repeat(depth));
        json.push_str("]}");

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Deep.tree.json");
        fs::write(&path, json).unwrap();

        let file = load_document(&path).unwrap();
        assert_eq!(file.tree.len(), depth);
        let last = file.tree.preorder()[depth - 1];
        assert_eq!(file.tree.node(last).depth(), depth - 1);
    }

    #[test]
    fn malformed_documents_name_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.tree.json");
        fs::write(&path, r#"{"path": "B.java", "nodes": [{"kind": "NOPE", "line": 1}]}"#)
            .unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.tree.json"));
    }

    #[test]
    fn selects_checks_by_name_or_id() {
        let mut depth = CheckConfig::new("NestingDepth");
        depth.id = Some("shallow".to_string());
        let config = Config {
            checks: vec![
                depth,
                CheckConfig::new("MethodCount"),
                CheckConfig::new("EmptyBlock"),
            ],
            ..Config::default()
        };

        let kept = select_checks(config, "shallow, EmptyBlock");
        let names: Vec<&str> = kept.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["NestingDepth", "EmptyBlock"]);
    }
}
