//! Rule-based localizability decisions.
//!
//! The policy answers two questions during scanning: is an element's text
//! content localizable, and is a given attribute on an element localizable.
//! It is data-driven (a rule table, loadable from JSON) rather than derived
//! from any live type system, which keeps the scanner portable.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One matching rule. `namespace` and `name` are templates: empty or `"*"`
/// matches anything, otherwise the comparison is exact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizabilityRule {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content_localizable: bool,
    /// Attribute names this rule declares localizable. Compared exactly, no
    /// wildcards.
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl LocalizabilityRule {
    fn matches(&self, namespace: &str, name: &str) -> bool {
        template_matches(&self.namespace, namespace) && template_matches(&self.name, name)
    }

    fn matches_exactly(&self, namespace: &str, name: &str) -> bool {
        is_exact_match(&self.namespace, namespace) && is_exact_match(&self.name, name)
    }
}

fn template_matches(template: &str, value: &str) -> bool {
    template.is_empty() || template == "*" || template == value
}

fn is_exact_match(template: &str, value: &str) -> bool {
    !template.is_empty() && template != "*" && template == value
}

#[derive(Debug, Clone, Default)]
pub struct LocalizabilityPolicy {
    rules: Vec<LocalizabilityRule>,
}

impl LocalizabilityPolicy {
    pub fn new(rules: Vec<LocalizabilityRule>) -> Self {
        LocalizabilityPolicy { rules }
    }

    /// Loads a rule table from a JSON array of [`LocalizabilityRule`].
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let rules: Vec<LocalizabilityRule> = serde_json::from_reader(reader)?;
        Ok(LocalizabilityPolicy::new(rules))
    }

    /// A rule table covering the common framework elements and attributes.
    /// Projects with custom controls supply their own table instead.
    pub fn with_default_rules() -> Self {
        let attribute_rule = |name: &str, attributes: &[&str]| LocalizabilityRule {
            namespace: "*".to_string(),
            name: name.to_string(),
            content_localizable: false,
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        };
        LocalizabilityPolicy::new(vec![
            LocalizabilityRule {
                namespace: "*".to_string(),
                name: "*".to_string(),
                content_localizable: true,
                attributes: vec!["ToolTip".to_string()],
            },
            attribute_rule("Button", &["Content"]),
            attribute_rule("Label", &["Content"]),
            attribute_rule("CheckBox", &["Content"]),
            attribute_rule("RadioButton", &["Content"]),
            attribute_rule("TextBlock", &["Text"]),
            attribute_rule("TextBox", &["Text"]),
            attribute_rule("Window", &["Title"]),
            attribute_rule("Page", &["Title"]),
            attribute_rule("GroupBox", &["Header"]),
            attribute_rule("TabItem", &["Header"]),
            attribute_rule("MenuItem", &["Header"]),
            attribute_rule("Expander", &["Header"]),
            attribute_rule("HeaderedContentControl", &["Header"]),
            attribute_rule("GridViewColumn", &["Header"]),
            attribute_rule("ToolTipService", &["ToolTip"]),
        ])
    }

    /// Is the text content of `(namespace, name)` localizable.
    ///
    /// A rule whose namespace and name both match exactly (no wildcards) is
    /// authoritative and short-circuits. Otherwise any matching rule that
    /// asserts localizability wins. The asymmetry with the attribute check is
    /// deliberate and load-bearing.
    pub fn is_content_localizable(&self, namespace: &str, name: &str) -> bool {
        if let Some(rule) = self.rules.iter().find(|r| r.matches_exactly(namespace, name)) {
            return rule.content_localizable;
        }
        self.rules
            .iter()
            .any(|r| r.matches(namespace, name) && r.content_localizable)
    }

    /// Is `attribute` on `(namespace, name)` localizable: true when any
    /// matching rule lists the attribute name verbatim.
    pub fn is_attribute_localizable(&self, namespace: &str, name: &str, attribute: &str) -> bool {
        self.rules
            .iter()
            .any(|r| r.matches(namespace, name) && r.attributes.iter().any(|a| a == attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(ns: &str, name: &str, content: bool, attributes: &[&str]) -> LocalizabilityRule {
        LocalizabilityRule {
            namespace: ns.to_string(),
            name: name.to_string(),
            content_localizable: content,
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_wildcard_attribute_match() {
        let policy = LocalizabilityPolicy::new(vec![rule("*", "Button", false, &["ToolTip"])]);
        assert!(policy.is_attribute_localizable("ns1", "Button", "ToolTip"));
        assert!(!policy.is_attribute_localizable("ns1", "Button", "Tooltip"));
        assert!(!policy.is_attribute_localizable("ns1", "TextBox", "ToolTip"));
    }

    #[test]
    fn test_exact_content_match_wins_over_wildcard_or() {
        let policy = LocalizabilityPolicy::new(vec![
            rule("*", "*", false, &[]),
            rule("ns1", "Button", true, &[]),
        ]);
        assert!(policy.is_content_localizable("ns1", "Button"));
    }

    #[test]
    fn test_exact_negative_match_short_circuits() {
        // Exact match is authoritative even when a wildcard rule would say yes.
        let policy = LocalizabilityPolicy::new(vec![
            rule("*", "*", true, &[]),
            rule("ns1", "Style", false, &[]),
        ]);
        assert!(!policy.is_content_localizable("ns1", "Style"));
        assert!(policy.is_content_localizable("ns1", "Button"));
    }

    #[test]
    fn test_wildcard_or_across_matches() {
        let policy = LocalizabilityPolicy::new(vec![
            rule("*", "Button", false, &[]),
            rule("ns1", "*", true, &[]),
        ]);
        // No exact rule; one matching rule asserts localizability.
        assert!(policy.is_content_localizable("ns1", "Button"));
    }

    #[test]
    fn test_empty_template_matches_anything() {
        let policy = LocalizabilityPolicy::new(vec![rule("", "", true, &["Text"])]);
        assert!(policy.is_content_localizable("anything", "Whatever"));
        assert!(policy.is_attribute_localizable("anything", "Whatever", "Text"));
    }

    #[test]
    fn test_no_rule_means_not_localizable() {
        let policy = LocalizabilityPolicy::new(vec![]);
        assert!(!policy.is_content_localizable("ns", "Button"));
        assert!(!policy.is_attribute_localizable("ns", "Button", "Content"));
    }

    #[test]
    fn test_rules_load_from_json() {
        let json = r#"[
            {"namespace": "*", "name": "Button", "attributes": ["Content"]},
            {"namespace": "*", "name": "TextBlock", "content_localizable": true}
        ]"#;
        let policy = LocalizabilityPolicy::from_json_reader(json.as_bytes()).unwrap();
        assert!(policy.is_attribute_localizable("ns", "Button", "Content"));
        assert!(policy.is_content_localizable("ns", "TextBlock"));
        assert!(!policy.is_content_localizable("ns", "Button"));
    }
}
