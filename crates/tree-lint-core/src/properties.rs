//! Chained `${name}` property resolution.
//!
//! Configuration arrives as a flat name → value bag in which values may refer
//! to other properties, in any order. [`resolve`] substitutes references in
//! repeated passes until every value is free of references or a pass makes
//! no progress.

use crate::config::ConfigError;

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

#[allow(clippy::expect_used)]
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^\s}]+)\}").expect("reference pattern is valid"));

/// Returns true if `value` still contains a `${name}` reference.
#[must_use]
pub fn has_reference(value: &str) -> bool {
    REFERENCE.is_match(value)
}

/// Resolves every `${name}` chain in `properties`.
///
/// Each pass substitutes, in every still-unresolved value, the current value
/// of each referenced property that exists. A reference is left alone when
/// the referenced value would bring back a reference to the property being
/// resolved, since such a chain can never terminate.
///
/// # Errors
///
/// Returns [`ConfigError::UnresolvedProperties`] with the sorted names of the
/// properties still holding references once a full pass changes nothing, or
/// once more passes than properties have run.
pub fn resolve(
    mut properties: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut unresolved: BTreeSet<String> = properties.keys().cloned().collect();
    let mut snapshot = properties.clone();
    let max_passes = properties.len() + 1;
    let mut passes = 0;

    while !unresolved.is_empty() {
        passes += 1;
        let pending: Vec<String> = unresolved.iter().cloned().collect();

        for name in pending {
            let Some(current) = properties.get(&name) else {
                unresolved.remove(&name);
                continue;
            };
            let substituted = substitute(&name, current, &properties);
            let done = !has_reference(&substituted);
            properties.insert(name.clone(), substituted);
            if done {
                unresolved.remove(&name);
            }
        }

        if unresolved.is_empty() {
            break;
        }
        if properties == snapshot || passes >= max_passes {
            return Err(ConfigError::UnresolvedProperties {
                names: unresolved.into_iter().collect(),
            });
        }
        snapshot.clone_from(&properties);
    }

    debug!("Resolved {} properties in {} pass(es)", properties.len(), passes);
    Ok(properties)
}

fn substitute(name: &str, value: &str, properties: &BTreeMap<String, String>) -> String {
    let self_reference = format!("${{{name}}}");
    let referenced: BTreeSet<&str> = REFERENCE
        .captures_iter(value)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    let mut result = value.to_string();
    for reference in referenced {
        if reference == name {
            continue;
        }
        let Some(replacement) = properties.get(reference) else {
            continue;
        };
        if replacement.contains(&self_reference) {
            continue;
        }
        result = result.replace(&format!("${{{reference}}}"), replacement);
    }
    result
}

/// Expands `${name}` references in a configuration value against resolved
/// properties. `$$` stands for a literal `$`.
///
/// Substituted property values are copied as they are, so a `$$` inside a
/// property value reaches the result unchanged.
///
/// # Errors
///
/// Returns [`ConfigError::UndefinedProperty`] for a name that is not set and
/// [`ConfigError::PropertySyntax`] for an unterminated `${`.
pub fn expand(value: &str, properties: &BTreeMap<String, String>) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let close = body.find('}').ok_or_else(|| ConfigError::PropertySyntax {
                value: value.to_string(),
            })?;
            let name = &body[..close];
            let resolved =
                properties
                    .get(name)
                    .ok_or_else(|| ConfigError::UndefinedProperty {
                        name: name.to_string(),
                        value: value.to_string(),
                    })?;
            out.push_str(resolved);
            rest = &body[close + 1..];
        } else {
            out.push('$');
            rest = after;
        }
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn unresolved_names(result: Result<BTreeMap<String, String>, ConfigError>) -> Vec<String> {
        match result {
            Err(ConfigError::UnresolvedProperties { names }) => names,
            other => panic!("expected unresolved properties, got {other:?}"),
        }
    }

    #[test]
    fn resolves_simple_chain() {
        let resolved = resolve(props(&[("a", "${b}x"), ("b", "y")])).unwrap();
        assert_eq!(resolved, props(&[("a", "yx"), ("b", "y")]));
    }

    #[test]
    fn resolves_chains_in_any_order() {
        let resolved = resolve(props(&[
            ("a", "${b}/${c}"),
            ("b", "${c}-${d}"),
            ("c", "${d}${d}"),
            ("d", "z"),
        ]))
        .unwrap();
        assert_eq!(resolved["a"], "zz-z/zz");
        assert_eq!(resolved["b"], "zz-z");
        assert_eq!(resolved["c"], "zz");
    }

    #[test]
    fn resolution_is_idempotent() {
        let input = props(&[("a", "${b}x"), ("b", "y"), ("c", "plain")]);
        let once = resolve(input).unwrap();
        let twice = resolve(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_bag_resolves() {
        assert!(resolve(BTreeMap::new()).unwrap().is_empty());
    }

    #[test]
    fn mutual_cycle_fails_with_both_names() {
        let names = unresolved_names(resolve(props(&[("a", "${b}"), ("b", "${a}")])));
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn self_reference_fails() {
        let names = unresolved_names(resolve(props(&[("a", "${a}x"), ("b", "ok")])));
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn growing_cycle_fails() {
        let names = unresolved_names(resolve(props(&[("a", "${b}x"), ("b", "${a}")])));
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn oscillating_cycle_is_bounded() {
        let names = unresolved_names(resolve(props(&[
            ("a", "${c}"),
            ("b", "${a}"),
            ("c", "${b}"),
        ])));
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn undefined_reference_fails_only_for_dependents() {
        let names = unresolved_names(resolve(props(&[
            ("a", "${missing}"),
            ("b", "${a}!"),
            ("c", "fine"),
        ])));
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn detects_references() {
        assert!(has_reference("${a}"));
        assert!(has_reference("x/${long.name}/y"));
        assert!(!has_reference("${}"));
        assert!(!has_reference("${a b}"));
        assert!(!has_reference("$a {a}"));
    }

    #[test]
    fn expand_keeps_property_values_verbatim() {
        let p = props(&[("cost", "$$5")]);
        assert_eq!(expand("${cost}", &p).unwrap(), "$$5");
        assert_eq!(expand("$$${cost}", &p).unwrap(), "$$$5");
    }

    #[test]
    fn expand_substitutes_and_escapes() {
        let p = props(&[("max", "4"), ("dir", "src")]);
        assert_eq!(expand("${max}", &p).unwrap(), "4");
        assert_eq!(expand("${dir}/${max}.txt", &p).unwrap(), "src/4.txt");
        assert_eq!(expand("cost: $$5 $x", &p).unwrap(), "cost: $5 $x");
        assert_eq!(expand("no refs", &p).unwrap(), "no refs");
    }

    #[test]
    fn expand_reports_undefined_and_syntax_errors() {
        let p = props(&[]);
        assert!(matches!(
            expand("${nope}", &p),
            Err(ConfigError::UndefinedProperty { ref name, .. }) if name == "nope"
        ));
        assert!(matches!(
            expand("${open", &p),
            Err(ConfigError::PropertySyntax { .. })
        ));
    }
}
