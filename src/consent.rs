//! Cookie consent configuration.
//!
//! The site loads the consent widget (vanilla-cookieconsent v3) from
//! `script_src` and runs it with the object built by
//! [`ConsentConfig::consent_config_json`]. Scripts that need consent are
//! declared as `[[head]]` entries with a `category`; the renderer emits them
//! inert and the widget enables them after opt-in.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// The category every site has and no visitor can switch off.
pub const NECESSARY: &str = "necessary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsentConfig {
    pub enabled: bool,
    pub script_src: String,
    pub stylesheet_href: String,
    /// Language of the modal when the page language has no translation.
    pub default_language: String,
    pub categories: BTreeMap<String, ConsentCategory>,
    pub translations: BTreeMap<String, ConsentTranslation>,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            NECESSARY.to_string(),
            ConsentCategory {
                enabled: true,
                read_only: true,
            },
        );
        categories.insert("analytics".to_string(), ConsentCategory::default());
        Self {
            enabled: false,
            script_src:
                "https://cdn.jsdelivr.net/gh/orestbida/cookieconsent@v3.0.1/dist/cookieconsent.umd.js"
                    .to_string(),
            stylesheet_href:
                "https://cdn.jsdelivr.net/gh/orestbida/cookieconsent@v3.0.1/dist/cookieconsent.css"
                    .to_string(),
            default_language: "en".to_string(),
            categories,
            translations: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsentCategory {
    /// Pre-selected before the visitor chooses.
    pub enabled: bool,
    /// The visitor cannot change it.
    pub read_only: bool,
}

/// Modal strings for one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsentTranslation {
    pub title: String,
    pub description: String,
    pub accept_all: String,
    pub accept_necessary: String,
    pub show_preferences: String,
    pub preferences_title: String,
    pub save_preferences: String,
}

impl ConsentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.categories.get(NECESSARY) {
            Some(c) if c.enabled && c.read_only => {}
            _ => {
                return Err(ConfigError::Validation(
                    "consent.categories.necessary must exist with enabled = true and read_only = true"
                        .into(),
                ));
            }
        }
        if !self.enabled {
            return Ok(());
        }
        if self.script_src.trim().is_empty() {
            return Err(ConfigError::Validation(
                "consent is enabled but consent.script_src is empty".into(),
            ));
        }
        if !self.translations.contains_key(&self.default_language) {
            return Err(ConfigError::Validation(format!(
                "consent.default_language {:?} has no [consent.translations.{}] table",
                self.default_language, self.default_language
            )));
        }
        Ok(())
    }

    /// The object passed to `CookieConsent.run`.
    pub fn consent_config_json(&self) -> Value {
        let categories: serde_json::Map<String, Value> = self
            .categories
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    json!({ "enabled": c.enabled, "readOnly": c.read_only }),
                )
            })
            .collect();

        let sections: Vec<Value> = self
            .categories
            .keys()
            .map(|name| json!({ "title": name, "linkedCategory": name }))
            .collect();

        let translations: serde_json::Map<String, Value> = self
            .translations
            .iter()
            .map(|(lang, t)| {
                let strings = json!({
                    "consentModal": {
                        "title": t.title,
                        "description": t.description,
                        "acceptAllBtn": t.accept_all,
                        "acceptNecessaryBtn": t.accept_necessary,
                        "showPreferencesBtn": t.show_preferences,
                    },
                    "preferencesModal": {
                        "title": t.preferences_title,
                        "acceptAllBtn": t.accept_all,
                        "acceptNecessaryBtn": t.accept_necessary,
                        "savePreferencesBtn": t.save_preferences,
                        "sections": sections,
                    },
                });
                (lang.clone(), strings)
            })
            .collect();

        json!({
            "categories": categories,
            "language": {
                "default": self.default_language,
                "translations": translations,
            },
        })
    }

    /// Inline script body that starts the widget.
    ///
    /// `<`, `>` and `&` are written as JSON unicode escapes so no string in
    /// the config can close the surrounding `<script>` element.
    pub fn init_script(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(&self.consent_config_json())?;
        let json = json
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026");
        Ok(format!("CookieConsent.run({json});"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> ConsentTranslation {
        ConsentTranslation {
            title: "We use cookies".to_string(),
            description: "Analytics cookies help us improve the tutorials.".to_string(),
            accept_all: "Accept all".to_string(),
            accept_necessary: "Reject all".to_string(),
            show_preferences: "Manage preferences".to_string(),
            preferences_title: "Cookie preferences".to_string(),
            save_preferences: "Save".to_string(),
        }
    }

    fn enabled_config() -> ConsentConfig {
        let mut config = ConsentConfig {
            enabled: true,
            ..ConsentConfig::default()
        };
        config.translations.insert("en".to_string(), english());
        config
    }

    #[test]
    fn default_is_valid_and_disabled() {
        let config = ConsentConfig::default();
        assert!(!config.enabled);
        assert!(config.validate().is_ok());
        assert!(config.categories[NECESSARY].read_only);
    }

    #[test]
    fn necessary_must_be_read_only() {
        let mut config = ConsentConfig::default();
        config.categories.insert(
            NECESSARY.to_string(),
            ConsentCategory {
                enabled: true,
                read_only: false,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn necessary_must_exist() {
        let mut config = ConsentConfig::default();
        config.categories.remove(NECESSARY);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("necessary"));
    }

    #[test]
    fn enabled_requires_default_language_translation() {
        let config = ConsentConfig {
            enabled: true,
            ..ConsentConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_language"));
        assert!(enabled_config().validate().is_ok());
    }

    #[test]
    fn enabled_requires_script_src() {
        let mut config = enabled_config();
        config.script_src = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_uses_widget_field_names() {
        let json = enabled_config().consent_config_json();
        assert_eq!(json["categories"]["necessary"]["readOnly"], true);
        assert_eq!(json["categories"]["analytics"]["enabled"], false);
        assert_eq!(json["language"]["default"], "en");
        let en = &json["language"]["translations"]["en"];
        assert_eq!(en["consentModal"]["acceptAllBtn"], "Accept all");
        assert_eq!(en["preferencesModal"]["savePreferencesBtn"], "Save");
        assert_eq!(
            en["preferencesModal"]["sections"][0]["linkedCategory"],
            "analytics"
        );
    }

    #[test]
    fn init_script_cannot_close_script_element() {
        let mut config = enabled_config();
        config.translations.get_mut("en").unwrap().description =
            "</script><b>&</b>".to_string();
        let script = config.init_script().unwrap();
        assert!(script.starts_with("CookieConsent.run({"));
        assert!(script.ends_with("});"));
        assert!(!script.contains('<'));
        assert!(!script.contains('&'));
        assert!(script.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn parse_from_toml() {
        let toml_str = r#"
enabled = true
default_language = "ja"

[categories.necessary]
enabled = true
read_only = true

[translations.ja]
title = "クッキーの使用について"
accept_all = "すべて許可"
"#;
        let config: ConsentConfig = toml::from_str(toml_str).unwrap();
        assert!(config.enabled);
        assert_eq!(config.translations["ja"].accept_all, "すべて許可");
        assert!(config.validate().is_ok());
    }
}
