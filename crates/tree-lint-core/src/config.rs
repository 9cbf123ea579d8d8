//! Configuration types for tree-lint.

use crate::kind::TokenKind;
use crate::properties;
use crate::types::Severity;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration for tree-lint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Flat property bag. Values may reference each other with `${name}`.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Check instances, in registration order.
    #[serde(default)]
    pub checks: Vec<CheckConfig>,

    /// Violation filters, applied in order.
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Resolves property chains and expands every `${name}` reference in
    /// check and filter settings.
    ///
    /// Property values are kept raw: `$$` is an escape only in settings, and
    /// a property value is inserted into a setting verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedProperties`] if a chain cannot be
    /// resolved, or [`ConfigError::UndefinedProperty`] if a setting names a
    /// property that does not exist.
    pub fn resolved(mut self) -> Result<Self, ConfigError> {
        let props = properties::resolve(std::mem::take(&mut self.properties))?;

        for check in &mut self.checks {
            check.expand(&props)?;
        }
        for filter in &mut self.filters {
            filter.expand(&props)?;
        }

        self.properties = props;
        Ok(self)
    }

    /// Enabled check configurations, in registration order.
    pub fn enabled_checks(&self) -> impl Iterator<Item = &CheckConfig> {
        self.checks.iter().filter(|c| c.enabled)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Maximum number of files analyzed in parallel. `None` or `1` runs
    /// sequentially.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Turn a failing check into a run error instead of a per-file failure.
    #[serde(default)]
    pub fail_on_check_error: bool,
}

fn default_true() -> bool {
    true
}

/// Configuration of one check instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Registered check name (e.g., "NestingDepth").
    pub name: String,

    /// Optional instance id, used in reports and suppression.
    #[serde(default)]
    pub id: Option<String>,

    /// Whether this instance runs.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Severity override.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Token kinds overriding the check's default set.
    #[serde(default)]
    pub tokens: Option<Vec<String>>,

    /// Message template overrides by key.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,

    /// Check-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

impl CheckConfig {
    /// Creates an enabled configuration with no overrides.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            enabled: true,
            severity: None,
            tokens: None,
            messages: BTreeMap::new(),
            options: BTreeMap::new(),
        }
    }

    /// Sets an option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Typed view of the options.
    #[must_use]
    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            check: self.name.clone(),
            values: self.options.clone(),
        }
    }

    /// Parses the configured token names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownToken`] for a name that is not a kind.
    pub fn token_kinds(&self) -> Result<Option<Vec<TokenKind>>, ConfigError> {
        let Some(tokens) = &self.tokens else {
            return Ok(None);
        };
        tokens
            .iter()
            .flat_map(|t| t.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<TokenKind>().map_err(|_| ConfigError::UnknownToken {
                    check: self.name.clone(),
                    token: t.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn expand(&mut self, props: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        if let Some(id) = &mut self.id {
            *id = properties::expand(id, props)?;
        }
        if let Some(tokens) = &mut self.tokens {
            for token in tokens.iter_mut() {
                *token = properties::expand(token, props)?;
            }
        }
        for template in self.messages.values_mut() {
            *template = properties::expand(template, props)?;
        }
        for value in self.options.values_mut() {
            expand_value(value, props)?;
        }
        Ok(())
    }
}

fn expand_value(value: &mut toml::Value, props: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    match value {
        toml::Value::String(s) => *s = properties::expand(s, props)?,
        toml::Value::Array(items) => {
            for item in items {
                expand_value(item, props)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                expand_value(item, props)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn expand_opt(
    value: &mut Option<String>,
    props: &BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    if let Some(v) = value {
        *v = properties::expand(v, props)?;
    }
    Ok(())
}

/// Filter configuration, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FilterConfig {
    /// Off/on comment pairs.
    SuppressionComment(SuppressionCommentConfig),
    /// Single comments that cover nearby lines.
    NearbyComment(NearbyCommentConfig),
}

impl FilterConfig {
    fn expand(&mut self, props: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        match self {
            Self::SuppressionComment(c) => {
                expand_opt(&mut c.off_format, props)?;
                expand_opt(&mut c.on_format, props)?;
                expand_opt(&mut c.check_format, props)?;
                expand_opt(&mut c.message_format, props)?;
                expand_opt(&mut c.id_format, props)
            }
            Self::NearbyComment(c) => {
                expand_opt(&mut c.comment_format, props)?;
                expand_opt(&mut c.check_format, props)?;
                expand_opt(&mut c.message_format, props)?;
                expand_opt(&mut c.id_format, props)
            }
        }
    }
}

/// Settings of a suppression-comment filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionCommentConfig {
    /// Pattern of comments that open a region.
    #[serde(default)]
    pub off_format: Option<String>,
    /// Pattern of comments that close a region.
    #[serde(default)]
    pub on_format: Option<String>,
    /// Check key template, expanded with the comment's captures.
    #[serde(default)]
    pub check_format: Option<String>,
    /// Only suppress violations whose message matches this pattern.
    #[serde(default)]
    pub message_format: Option<String>,
    /// Id key template, expanded with the comment's captures.
    #[serde(default)]
    pub id_format: Option<String>,
    /// Scan `/* */` comments.
    #[serde(default = "default_true")]
    pub check_c_style: bool,
    /// Scan `//` comments.
    #[serde(default = "default_true")]
    pub check_cpp_style: bool,
}

impl Default for SuppressionCommentConfig {
    fn default() -> Self {
        Self {
            off_format: None,
            on_format: None,
            check_format: None,
            message_format: None,
            id_format: None,
            check_c_style: true,
            check_cpp_style: true,
        }
    }
}

/// Settings of a nearby-comment filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyCommentConfig {
    /// Pattern of suppressing comments.
    #[serde(default)]
    pub comment_format: Option<String>,
    /// Check key template, expanded with the comment's captures.
    #[serde(default)]
    pub check_format: Option<String>,
    /// Only suppress violations whose message matches this pattern.
    #[serde(default)]
    pub message_format: Option<String>,
    /// Id key template, expanded with the comment's captures.
    #[serde(default)]
    pub id_format: Option<String>,
    /// Lines covered after the comment line. Negative values reach back.
    #[serde(default = "default_influence")]
    pub influence: i64,
    /// Scan `/* */` comments.
    #[serde(default = "default_true")]
    pub check_c_style: bool,
    /// Scan `//` comments.
    #[serde(default = "default_true")]
    pub check_cpp_style: bool,
}

fn default_influence() -> i64 {
    1
}

impl Default for NearbyCommentConfig {
    fn default() -> Self {
        Self {
            comment_format: None,
            check_format: None,
            message_format: None,
            id_format: None,
            influence: default_influence(),
            check_c_style: true,
            check_cpp_style: true,
        }
    }
}

/// Typed access to a check's options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckOptions {
    check: String,
    values: BTreeMap<String, toml::Value>,
}

impl CheckOptions {
    /// Creates options for `check` from raw values.
    #[must_use]
    pub fn new(check: impl Into<String>, values: BTreeMap<String, toml::Value>) -> Self {
        Self {
            check: check.into(),
            values,
        }
    }

    /// Returns true if `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Gets a boolean option. Strings `"true"`/`"false"` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the value is not a boolean.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(toml::Value::Boolean(b)) => Ok(*b),
            Some(toml::Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| self.invalid(key, format!("expected a boolean, got {s:?}"))),
            Some(other) => Err(self.invalid(key, format!("expected a boolean, got {other}"))),
        }
    }

    /// Gets an integer option. Numeric strings are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the value is not an integer.
    pub fn get_int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(toml::Value::Integer(i)) => Ok(*i),
            Some(toml::Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| self.invalid(key, format!("expected an integer, got {s:?}"))),
            Some(other) => Err(self.invalid(key, format!("expected an integer, got {other}"))),
        }
    }

    /// Gets a non-negative integer option.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the value is not an integer
    /// or is negative.
    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        if !self.contains(key) {
            return Ok(default);
        }
        let value = self.get_int(key, 0)?;
        usize::try_from(value)
            .map_err(|_| self.invalid(key, format!("expected a non-negative integer, got {value}")))
    }

    /// Gets a string option.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the value is a table or array.
    pub fn get_str(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        match self.values.get(key) {
            None => Ok(default.to_string()),
            Some(toml::Value::String(s)) => Ok(s.clone()),
            Some(v @ (toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_))) => {
                Ok(v.to_string())
            }
            Some(other) => Err(self.invalid(key, format!("expected a string, got {other}"))),
        }
    }

    /// Gets a list option. A string is split on commas.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the value is not a string or
    /// an array of strings.
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        match self.values.get(key) {
            None => Ok(Vec::new()),
            Some(toml::Value::String(s)) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(String::from)
                        .ok_or_else(|| self.invalid(key, format!("expected strings, got {v}")))
                })
                .collect(),
            Some(other) => Err(self.invalid(key, format!("expected a list, got {other}"))),
        }
    }

    fn invalid(&self, key: &str, message: String) -> ConfigError {
        ConfigError::InvalidOption {
            check: self.check.clone(),
            key: key.to_string(),
            message,
        }
    }
}

/// Configuration errors. All of them surface before any file is processed.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(tree_lint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(tree_lint::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Property chains that never bottom out.
    #[error("Unresolved properties: {}", names.join(", "))]
    #[diagnostic(
        code(tree_lint::config::unresolved_properties),
        help("check for cycles or references to properties that are not defined")
    )]
    UnresolvedProperties {
        /// Sorted names of the properties still holding references.
        names: Vec<String>,
    },

    /// A setting references a property that is not defined.
    #[error("Property ${{{name}}} is not defined (in {value:?})")]
    #[diagnostic(code(tree_lint::config::undefined_property))]
    UndefinedProperty {
        /// Missing property name.
        name: String,
        /// Value containing the reference.
        value: String,
    },

    /// A `${` without its closing brace.
    #[error("Unterminated property reference in {value:?}")]
    #[diagnostic(
        code(tree_lint::config::property_syntax),
        help("use $$ for a literal dollar sign")
    )]
    PropertySyntax {
        /// Offending value.
        value: String,
    },

    /// No check registered under this name.
    #[error("Unknown check: {name}")]
    #[diagnostic(
        code(tree_lint::config::unknown_check),
        help("run `tree-lint list-checks` to see the available checks")
    )]
    UnknownCheck {
        /// Requested name.
        name: String,
    },

    /// A configured token is not a known kind.
    #[error("Check {check}: unknown token kind {token}")]
    #[diagnostic(code(tree_lint::config::unknown_token))]
    UnknownToken {
        /// Check being configured.
        check: String,
        /// Offending name.
        token: String,
    },

    /// Configured tokens outside the check's acceptable set.
    #[error("Check {check} does not accept tokens: {tokens}")]
    #[diagnostic(code(tree_lint::config::unacceptable_tokens))]
    UnacceptableTokens {
        /// Check being configured.
        check: String,
        /// Offending kinds, comma separated.
        tokens: String,
    },

    /// Required tokens left out of the effective set.
    #[error("Check {check} requires tokens: {tokens}")]
    #[diagnostic(
        code(tree_lint::config::missing_required_tokens),
        help("required tokens are never added implicitly; list them in `tokens`")
    )]
    MissingRequiredTokens {
        /// Check being configured.
        check: String,
        /// Missing kinds, comma separated.
        tokens: String,
    },

    /// A filter or check pattern is not a valid regular expression.
    #[error("Invalid pattern {pattern:?}: {source}")]
    #[diagnostic(code(tree_lint::config::invalid_pattern))]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Compilation error.
        source: regex::Error,
    },

    /// A check option has the wrong type or value.
    #[error("Check {check}: invalid option {key}: {message}")]
    #[diagnostic(code(tree_lint::config::invalid_option))]
    InvalidOption {
        /// Check being configured.
        check: String,
        /// Option key.
        key: String,
        /// What was wrong.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.checks.is_empty());
        assert!(config.filters.is_empty());
        assert_eq!(config.analyzer.parallelism, None);
        assert!(!config.analyzer.fail_on_check_error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[properties]
max_depth = "${base}"
base = "4"

[analyzer]
parallelism = 2

[[checks]]
name = "NestingDepth"
id = "deep"
severity = "warning"
max = "${max_depth}"

[checks.messages]
"nesting.depth" = "Too deep: {0}"

[[checks]]
name = "EmptyBlock"
enabled = false
tokens = ["SLIST", "OBJBLOCK"]

[[filters]]
type = "suppression-comment"
off_format = "OFF: (\\w+)"
on_format = "ON: (\\w+)"

[[filters]]
type = "nearby-comment"
influence = 2
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert_eq!(config.checks.len(), 2);
        assert_eq!(config.enabled_checks().count(), 1);

        let nesting = &config.checks[0];
        assert_eq!(nesting.id.as_deref(), Some("deep"));
        assert_eq!(nesting.severity, Some(Severity::Warning));
        assert_eq!(nesting.messages["nesting.depth"], "Too deep: {0}");
        assert!(nesting.options.contains_key("max"));
        assert!(!nesting.options.contains_key("messages"));

        assert!(matches!(
            &config.filters[0],
            FilterConfig::SuppressionComment(c) if c.check_c_style && c.off_format.is_some()
        ));
        assert!(matches!(
            &config.filters[1],
            FilterConfig::NearbyComment(c) if c.influence == 2
        ));
    }

    #[test]
    fn resolved_expands_check_options() {
        let toml = r#"
[properties]
max_depth = "${base}"
base = "4"

[[checks]]
name = "NestingDepth"
max = "${max_depth}"
"#;
        let config = Config::parse(toml).unwrap().resolved().unwrap();
        assert_eq!(config.properties["max_depth"], "4");
        assert_eq!(config.checks[0].options().get_int("max", 3).unwrap(), 4);
    }

    #[test]
    fn resolved_expands_nested_option_values() {
        let toml = r#"
[properties]
dir = "src"

[[checks]]
name = "TodoComment"
paths = ["${dir}/main", "plain"]

[checks.limits]
inner = { root = "${dir}" }
"#;
        let config = Config::parse(toml).unwrap().resolved().unwrap();
        let options = &config.checks[0].options;
        assert_eq!(
            options["paths"],
            toml::Value::Array(vec!["src/main".into(), "plain".into()])
        );
        assert_eq!(options["limits"]["inner"]["root"].as_str(), Some("src"));
    }

    #[test]
    fn dollar_escape_applies_to_settings_not_property_values() {
        let toml = r#"
[properties]
cost = "$$5"

[[checks]]
name = "TodoComment"
format = "$$5"
price = "${cost}"
"#;
        let config = Config::parse(toml).unwrap().resolved().unwrap();
        let options = config.checks[0].options();
        assert_eq!(config.properties["cost"], "$$5");
        assert_eq!(options.get_str("format", "").unwrap(), "$5");
        assert_eq!(options.get_str("price", "").unwrap(), "$$5");
    }

    #[test]
    fn resolved_reports_unresolved_chains() {
        let toml = r#"
[properties]
a = "${b}"
b = "${a}"
"#;
        let err = Config::parse(toml).unwrap().resolved().unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedProperties { ref names } if names == &["a", "b"]));
    }

    #[test]
    fn resolved_reports_undefined_property() {
        let toml = r#"
[[checks]]
name = "NestingDepth"
max = "${nowhere}"
"#;
        let err = Config::parse(toml).unwrap().resolved().unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedProperty { ref name, .. } if name == "nowhere"));
    }

    #[test]
    fn token_kinds_parse_and_reject_unknown_names() {
        let mut check = CheckConfig::new("EmptyBlock");
        assert_eq!(check.token_kinds().unwrap(), None);

        check.tokens = Some(vec!["SLIST, OBJBLOCK".to_string(), "LITERAL_IF".to_string()]);
        assert_eq!(
            check.token_kinds().unwrap(),
            Some(vec![TokenKind::Slist, TokenKind::ObjBlock, TokenKind::LiteralIf])
        );

        check.tokens = Some(vec!["NOT_A_KIND".to_string()]);
        assert!(matches!(
            check.token_kinds(),
            Err(ConfigError::UnknownToken { ref token, .. }) if token == "NOT_A_KIND"
        ));
    }

    #[test]
    fn options_are_typed() {
        let check = CheckConfig::new("Sample")
            .with_option("flag", "true")
            .with_option("count", 7_i64)
            .with_option("names", "a, b,,c")
            .with_option("bad", toml::Value::Array(vec![toml::Value::Integer(1)]));
        let options = check.options();

        assert!(options.get_bool("flag", false).unwrap());
        assert!(options.get_bool("missing", true).unwrap());
        assert_eq!(options.get_int("count", 0).unwrap(), 7);
        assert_eq!(options.get_usize("count", 0).unwrap(), 7);
        assert_eq!(options.get_str("count", "").unwrap(), "7");
        assert_eq!(options.get_list("names").unwrap(), vec!["a", "b", "c"]);
        assert!(options.get_list("missing").unwrap().is_empty());

        let err = options.get_list("bad").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { ref key, .. } if key == "bad"));
        assert!(options.get_int("flag", 0).is_err());
    }

    #[test]
    fn negative_usize_is_rejected() {
        let options = CheckConfig::new("Sample").with_option("max", -1_i64).options();
        assert!(matches!(
            options.get_usize("max", 3),
            Err(ConfigError::InvalidOption { .. })
        ));
    }
}
