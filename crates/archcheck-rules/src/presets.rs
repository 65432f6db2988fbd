//! Rule registry and construction from configuration.

use crate::{ForbiddenDependency, NoParameterReassignment, RequireBaseClass};
use archcheck_core::{Config, RuleBox};
use tracing::warn;

/// Rule names and codes known to the registry, in report order.
pub const RULE_NAMES: &[(&str, &str)] = &[
    (crate::require_base_class::NAME, crate::require_base_class::CODE),
    (crate::forbidden_dependency::NAME, crate::forbidden_dependency::CODE),
    (
        crate::no_parameter_reassignment::NAME,
        crate::no_parameter_reassignment::CODE,
    ),
];

/// Returns every built-in rule with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(RequireBaseClass::new()),
        Box::new(ForbiddenDependency::new()),
        Box::new(NoParameterReassignment::new()),
    ]
}

/// Builds one rule by name or code, reading its options from `config`.
#[must_use]
pub fn rule_by_name(name: &str, config: &Config) -> Option<RuleBox> {
    let section = |rule_name: &str| config.rule(rule_name).cloned().unwrap_or_default();

    match name {
        crate::require_base_class::NAME | crate::require_base_class::CODE => Some(Box::new(
            RequireBaseClass::from_config(&section(crate::require_base_class::NAME)),
        )),
        crate::forbidden_dependency::NAME | crate::forbidden_dependency::CODE => Some(Box::new(
            ForbiddenDependency::from_config(&section(crate::forbidden_dependency::NAME)),
        )),
        crate::no_parameter_reassignment::NAME | crate::no_parameter_reassignment::CODE => {
            Some(Box::new(NoParameterReassignment::new()))
        }
        _ => None,
    }
}

/// Builds every built-in rule configured from `config`.
///
/// Disabled rules are still returned; the analyzer drops them.
#[must_use]
pub fn rules_from_config(config: &Config) -> Vec<RuleBox> {
    RULE_NAMES
        .iter()
        .filter_map(|(name, _)| rule_by_name(name, config))
        .collect()
}

/// Builds the named subset of rules, warning about unknown names.
#[must_use]
pub fn select_rules(names: &[&str], config: &Config) -> Vec<RuleBox> {
    names
        .iter()
        .filter_map(|name| {
            let rule = rule_by_name(name, config);
            if rule.is_none() {
                warn!("Unknown rule: {}", name);
            }
            rule
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_rule() {
        let names: Vec<&str> = all_rules().iter().map(|r| r.name()).collect();
        let registered: Vec<&str> = RULE_NAMES.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, registered);
        assert_eq!(rules_from_config(&Config::default()).len(), RULE_NAMES.len());
    }

    #[test]
    fn lookup_by_name_or_code() {
        let config = Config::default();
        assert_eq!(
            rule_by_name("AC002", &config).map(|r| r.name()),
            Some("forbidden-dependency")
        );
        assert_eq!(
            rule_by_name("require-base-class", &config).map(|r| r.code()),
            Some("AC001")
        );
        assert!(rule_by_name("no-such-rule", &config).is_none());
    }

    #[test]
    fn select_skips_unknown_names() {
        let config = Config::default();
        let rules = select_rules(&["AC003", "bogus"], &config);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name(), "no-parameter-reassignment");
    }
}
