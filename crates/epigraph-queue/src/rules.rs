//! Variant rules: named allograph variants defined by component features.
//!
//! An auxiliary list kept in the shared store next to the change queue.
//! Rules are appended by reviewers and never rewritten here.

use serde::{Deserialize, Serialize};

/// One `component is feature` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFeature {
    pub component: String,
    pub feature: String,
}

impl ComponentFeature {
    /// Split a combined facet label, e.g. `crossbar is ascending`.
    pub fn from_label(label: &str) -> Option<Self> {
        let (component, feature) = label.split_once(" is ")?;
        Some(Self {
            component: component.to_string(),
            feature: feature.to_string(),
        })
    }
}

/// A named variant of an allograph, characterised by component features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRule {
    #[serde(rename = "variant-name")]
    pub variant_name: String,
    pub allograph: String,
    #[serde(rename = "component-features", default)]
    pub component_features: Vec<ComponentFeature>,
}

impl VariantRule {
    /// Build a rule from an allograph and combined facet labels; labels
    /// that do not split cleanly are dropped.
    pub fn from_labels(
        variant_name: impl Into<String>,
        allograph: impl Into<String>,
        labels: &[String],
    ) -> Self {
        Self {
            variant_name: variant_name.into(),
            allograph: allograph.into(),
            component_features: labels
                .iter()
                .filter_map(|label| ComponentFeature::from_label(label))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_splits_on_is() {
        assert_eq!(
            ComponentFeature::from_label("crossbar is ascending"),
            Some(ComponentFeature {
                component: "crossbar".to_string(),
                feature: "ascending".to_string(),
            })
        );
        assert_eq!(ComponentFeature::from_label("crossbar"), None);
    }

    #[test]
    fn rule_serializes_with_kebab_case_wire_names() {
        let rule = VariantRule::from_labels(
            "type-1",
            "A",
            &["crossbar is ascending".to_string(), "bad label".to_string()],
        );

        let raw = serde_json::to_string(&rule).expect("rule must serialize");
        assert!(raw.contains("\"variant-name\":\"type-1\""));
        assert!(raw.contains("\"component-features\""));
        assert_eq!(rule.component_features.len(), 1);
    }
}
