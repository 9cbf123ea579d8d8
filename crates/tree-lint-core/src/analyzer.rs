//! Multi-file driver: configuration in, [`LintResult`] out.

use crate::check::CheckBox;
use crate::config::{Config, ConfigError};
use crate::context::SourceFile;
use crate::filter::{FilterBox, ViolationFilter};
use crate::registry::CheckRegistry;
use crate::types::{FileFailure, LintResult, Violation};
use crate::walker::{CheckExecutionError, CheckSettings, TreeWalker};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A check failed and the run is configured to stop on check errors.
    #[error("{0}")]
    CheckFailed(#[from] CheckExecutionError),

    /// The worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

type CheckConstructor = Box<dyn Fn() -> Result<CheckBox, ConfigError> + Send + Sync>;

struct PlannedCheck {
    construct: CheckConstructor,
    settings: CheckSettings,
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    config: Option<Config>,
    registry: Option<CheckRegistry>,
    checks: Vec<PlannedCheck>,
    filters: Vec<FilterBox>,
    parallelism: Option<usize>,
    fail_on_check_error: Option<bool>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration. Properties are resolved during [`build`](Self::build).
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the registry used to construct configured checks.
    #[must_use]
    pub fn registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Adds a check built by `factory`, with default settings.
    ///
    /// The factory runs once per worker, since check instances carry state.
    #[must_use]
    pub fn check<F>(self, factory: F) -> Self
    where
        F: Fn() -> CheckBox + Send + Sync + 'static,
    {
        self.check_with(factory, CheckSettings::default())
    }

    /// Adds a check built by `factory`, with instance settings.
    #[must_use]
    pub fn check_with<F>(mut self, factory: F, settings: CheckSettings) -> Self
    where
        F: Fn() -> CheckBox + Send + Sync + 'static,
    {
        self.checks.push(PlannedCheck {
            construct: Box::new(move || Ok(factory())),
            settings,
        });
        self
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter<T: ViolationFilter + 'static>(mut self, filter: T) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Sets the number of files analyzed in parallel.
    #[must_use]
    pub fn parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers);
        self
    }

    /// Sets whether a failing check aborts the run (default: false).
    #[must_use]
    pub fn fail_on_check_error(mut self, fail: bool) -> Self {
        self.fail_on_check_error = Some(fail);
        self
    }

    /// Builds the analyzer.
    ///
    /// Configured checks run before explicitly added ones. Every check is
    /// constructed once here so configuration errors surface before any file
    /// is analyzed.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Config`] for unresolvable properties, unknown
    /// checks, bad options, invalid token sets or invalid filter patterns.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default().resolved()?;
        let registry = self.registry.unwrap_or_default();

        let mut checks = Vec::new();
        for check_config in config.enabled_checks() {
            let factory = registry.factory(&check_config.name)?;
            let options = check_config.options();
            checks.push(PlannedCheck {
                construct: Box::new(move || factory(&options)),
                settings: CheckSettings::from_config(check_config)?,
            });
        }
        checks.extend(self.checks);

        let mut filters = config
            .filters
            .iter()
            .map(crate::config::FilterConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        filters.extend(self.filters);

        let analyzer = Analyzer {
            checks,
            filters,
            parallelism: self.parallelism.or(config.analyzer.parallelism),
            fail_on_check_error: self
                .fail_on_check_error
                .unwrap_or(config.analyzer.fail_on_check_error),
        };

        let walker = analyzer.make_walker()?;
        debug!(
            "Analyzer ready: {} check(s), {} filter(s)",
            walker.check_count(),
            analyzer.filters.len()
        );

        Ok(analyzer)
    }
}

/// Outcome of analyzing one file.
#[derive(Debug, Default)]
pub struct FileReport {
    /// Violations that survived filtering.
    pub violations: Vec<Violation>,
    /// The check failure that cut the file short, if any.
    pub failure: Option<CheckExecutionError>,
}

/// Runs configured checks and filters over many files.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    checks: Vec<PlannedCheck>,
    filters: Vec<FilterBox>,
    parallelism: Option<usize>,
    fail_on_check_error: bool,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("checks", &self.checks.len())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("parallelism", &self.parallelism)
            .field("fail_on_check_error", &self.fail_on_check_error)
            .finish()
    }
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the number of planned check instances.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Returns the number of filters.
    #[must_use]
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Constructs a fresh walker with every planned check registered.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a check cannot be constructed or its
    /// token set is invalid.
    pub fn make_walker(&self) -> Result<TreeWalker, ConfigError> {
        let mut walker = TreeWalker::new();
        for planned in &self.checks {
            walker.register_with((planned.construct)()?, &planned.settings)?;
        }
        Ok(walker)
    }

    /// Walks and filters one file.
    pub fn analyze_file(&self, walker: &mut TreeWalker, mut file: SourceFile) -> FileReport {
        let outcome = walker.process(&mut file);

        let comments = if self.filters.is_empty() {
            Vec::new()
        } else {
            file.comment_spans()
        };
        let violations = self
            .filters
            .iter()
            .fold(outcome.violations, |violations, filter| {
                filter.filter(violations, &comments)
            });

        if let Some(failure) = &outcome.failure {
            warn!("{failure}");
        }
        FileReport {
            violations,
            failure: outcome.failure,
        }
    }

    /// Analyzes `files` and returns the combined result.
    ///
    /// Files are independent: a failing check abandons only its own file,
    /// which is recorded in [`LintResult::failures`] next to the violations
    /// collected before the failure.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::CheckFailed`] for the first failing file if
    /// the run stops on check errors, or a setup error for the worker pool.
    pub fn analyze(&self, files: Vec<SourceFile>) -> Result<LintResult, AnalyzerError> {
        info!("Analyzing {} file(s)", files.len());

        let reports: Vec<Result<FileReport, ConfigError>> = match self.parallelism {
            Some(workers) if workers != 1 => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
                pool.install(|| {
                    files
                        .into_par_iter()
                        .map_init(
                            || self.make_walker(),
                            |walker, file| match walker {
                                Ok(walker) => Ok(self.analyze_file(walker, file)),
                                Err(_) => self
                                    .make_walker()
                                    .map(|mut walker| self.analyze_file(&mut walker, file)),
                            },
                        )
                        .collect()
                })
            }
            _ => {
                let mut walker = self.make_walker()?;
                files
                    .into_iter()
                    .map(|file| Ok(self.analyze_file(&mut walker, file)))
                    .collect()
            }
        };

        let mut result = LintResult::new();
        for report in reports {
            let report = report?;
            result.files_checked += 1;
            result.violations.extend(report.violations);
            if let Some(failure) = report.failure {
                if self.fail_on_check_error {
                    return Err(failure.into());
                }
                result.failures.push(FileFailure::from(failure));
            }
        }

        result.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });

        info!(
            "Analysis complete: {} violations in {} files, {} failed",
            result.violations.len(),
            result.files_checked,
            result.failures.len()
        );

        Ok(result)
    }
}
