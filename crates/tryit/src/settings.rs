//! Widget settings.
//!
//! Pages may override the defaults with a JSON object; missing fields keep
//! their defaults.

use serde::{Deserialize, Serialize};

fn default_placeholder_selector() -> String {
    ".tryit".to_string()
}

fn default_run_label() -> String {
    "Run".to_string()
}

/// Settings shared by every widget on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// CSS selector marking notebook placeholders
    #[serde(default = "default_placeholder_selector")]
    pub placeholder_selector: String,

    /// Label of each cell's run control
    #[serde(default = "default_run_label")]
    pub run_label: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            placeholder_selector: default_placeholder_selector(),
            run_label: default_run_label(),
        }
    }
}

impl WidgetSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = WidgetSettings::default();
        assert_eq!(settings.placeholder_selector, ".tryit");
        assert_eq!(settings.run_label, "Run");
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let settings = WidgetSettings::from_json("{}").unwrap();
        assert_eq!(settings, WidgetSettings::default());
    }

    #[test]
    fn test_partial_override() {
        let settings = WidgetSettings::from_json(r#"{"run_label": "Evaluate"}"#).unwrap();
        assert_eq!(settings.placeholder_selector, ".tryit");
        assert_eq!(settings.run_label, "Evaluate");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let settings =
            WidgetSettings::from_json(r#"{"placeholder_selector": "div.repl", "theme": "dark"}"#)
                .unwrap();
        assert_eq!(settings.placeholder_selector, "div.repl");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(WidgetSettings::from_json("not json").is_err());
    }
}
