//! Locale set and request routing.
//!
//! A site has exactly one **root locale**, served without a URL prefix, and
//! any number of prefixed locales whose content lives under
//! `content_dir/<code>/`:
//!
//! ```text
//! /xrpl/whats        → root locale, slug "xrpl/whats"
//! /en/xrpl/whats     → locale "en",  slug "en/xrpl/whats"
//! /                  → root locale, slug "index"
//! /en/               → locale "en",  slug "en"
//! ```
//!
//! Locales never fall back to each other: a path resolves inside the locale
//! it routes to, or not at all.

use crate::config::{ConfigError, SiteConfig};
use crate::content::{Collection, ContentEntry};
use crate::naming;
use serde::{Deserialize, Serialize};

/// Config key that marks the root locale.
pub const ROOT_KEY: &str = "root";

/// A configured locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub code: String,
    pub label: String,
    pub lang: String,
    pub is_root: bool,
}

impl LocaleConfig {
    /// URL/content prefix: `None` for the root locale.
    pub fn prefix(&self) -> Option<&str> {
        (!self.is_root).then_some(self.code.as_str())
    }

    /// Slug of a locale-relative path inside this locale.
    ///
    /// `""` and `"index"` address the locale's landing page.
    pub fn localize_slug(&self, relative: &str) -> String {
        let relative = naming::slug_from_id(relative);
        let is_landing = relative.is_empty() || relative == "index";
        match (self.prefix(), is_landing) {
            (None, true) => "index".to_string(),
            (None, false) => relative,
            (Some(code), true) => code.to_string(),
            (Some(code), false) => format!("{code}/{relative}"),
        }
    }

    /// URL of this locale's landing page.
    pub fn home_url(&self) -> String {
        match self.prefix() {
            None => "/".to_string(),
            Some(code) => format!("/{code}/"),
        }
    }
}

/// Result of routing a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<'a> {
    pub locale: &'a LocaleConfig,
    /// Path with the locale prefix (if any) and surrounding slashes removed.
    pub remainder: String,
}

impl Route<'_> {
    /// Collection slug this route addresses.
    pub fn slug(&self) -> String {
        self.locale.localize_slug(&self.remainder)
    }
}

/// The validated set of locales. Exactly one is root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locales {
    /// Root first, then prefixed locales by code.
    locales: Vec<LocaleConfig>,
    default_code: String,
}

impl Locales {
    /// Build the locale set from site config, failing fast on any
    /// misconfiguration.
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        if config.locales.is_empty() {
            let root = LocaleConfig {
                code: ROOT_KEY.to_string(),
                label: "English".to_string(),
                lang: "en".to_string(),
                is_root: true,
            };
            return Self::new(vec![root], &config.default_locale);
        }

        let locales = config
            .locales
            .iter()
            .map(|(code, entry)| {
                let lang = entry.lang.clone().unwrap_or_else(|| {
                    if code == ROOT_KEY {
                        "en".to_string()
                    } else {
                        code.clone()
                    }
                });
                LocaleConfig {
                    code: code.clone(),
                    label: entry.label.clone(),
                    lang,
                    is_root: entry.root || code == ROOT_KEY,
                }
            })
            .collect();
        Self::new(locales, &config.default_locale)
    }

    /// Validate and order a list of locales.
    ///
    /// `default_code` must name one of them; `root` always names the root.
    pub fn new(mut locales: Vec<LocaleConfig>, default_code: &str) -> Result<Self, ConfigError> {
        let roots: Vec<&str> = locales
            .iter()
            .filter(|l| l.is_root)
            .map(|l| l.code.as_str())
            .collect();
        match roots.len() {
            1 => {}
            0 => {
                return Err(ConfigError::Locale(
                    "no root locale: declare [locales.root] or set root = true on one locale"
                        .into(),
                ));
            }
            _ => {
                return Err(ConfigError::Locale(format!(
                    "more than one root locale: {roots:?}"
                )));
            }
        }

        for locale in &locales {
            // Codes double as URL segments, so they must already be slug-shaped.
            if locale.code.is_empty() || naming::slugify_segment(&locale.code) != locale.code {
                return Err(ConfigError::Locale(format!(
                    "invalid locale code {:?}",
                    locale.code
                )));
            }
            if locale.label.trim().is_empty() {
                return Err(ConfigError::Locale(format!(
                    "locale {:?} has an empty label",
                    locale.code
                )));
            }
        }

        let mut seen = std::collections::BTreeSet::new();
        for locale in &locales {
            if !seen.insert(locale.code.as_str()) {
                return Err(ConfigError::Locale(format!(
                    "locale {:?} declared twice",
                    locale.code
                )));
            }
        }

        locales.sort_by(|a, b| b.is_root.cmp(&a.is_root).then_with(|| a.code.cmp(&b.code)));

        let default_code = if default_code == ROOT_KEY {
            locales[0].code.clone()
        } else if locales.iter().any(|l| l.code == default_code) {
            default_code.to_string()
        } else {
            return Err(ConfigError::Locale(format!(
                "default_locale {default_code:?} is not a configured locale"
            )));
        };

        Ok(Self {
            locales,
            default_code,
        })
    }

    pub fn root(&self) -> &LocaleConfig {
        &self.locales[0]
    }

    /// The locale named by `default_locale`.
    pub fn default_locale(&self) -> &LocaleConfig {
        self.get(&self.default_code).unwrap_or_else(|| self.root())
    }

    pub fn get(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|l| l.code == code)
    }

    /// Locale owning an entry: `None` in the entry means the root locale.
    pub fn for_entry(&self, entry_locale: Option<&str>) -> &LocaleConfig {
        entry_locale.and_then(|c| self.get(c)).unwrap_or_else(|| self.root())
    }

    /// A non-root locale whose code equals `segment`.
    fn prefixed(&self, segment: &str) -> Option<&LocaleConfig> {
        self.locales
            .iter()
            .find(|l| !l.is_root && l.code == segment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocaleConfig> {
        self.locales.iter()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn as_slice(&self) -> &[LocaleConfig] {
        &self.locales
    }

    /// Locale code of a content id, from its first path segment.
    pub fn locale_of_id(&self, id: &str) -> Option<&str> {
        let first = id.split('/').next()?;
        // A bare file like `en.md` is root content, not a locale directory.
        if first.len() == id.len() {
            return None;
        }
        self.prefixed(first).map(|l| l.code.as_str())
    }

    /// Split a request path into its locale and the locale-relative remainder.
    ///
    /// Query strings, fragments and a trailing `index.html` are ignored.
    pub fn route(&self, path: &str) -> Route<'_> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_matches('/');
        let path = if path == "index.html" {
            ""
        } else {
            path.strip_suffix("/index.html").unwrap_or(path)
        };

        let (first, rest) = match path.split_once('/') {
            Some((first, rest)) => (first, rest),
            None => (path, ""),
        };
        match self.prefixed(first) {
            Some(locale) => Route {
                locale,
                remainder: rest.to_string(),
            },
            None => Route {
                locale: self.root(),
                remainder: path.to_string(),
            },
        }
    }
}

/// Public URL of an entry: `/` for the root landing page, `/slug/` otherwise.
pub fn url_for(entry: &ContentEntry) -> String {
    entry.url()
}

/// Resolve a request path to a content entry.
///
/// The entry must belong to the routed locale; there is no cross-locale
/// fallback.
pub fn resolve<'c>(
    path: &str,
    locales: &Locales,
    collection: &'c Collection,
) -> Option<&'c ContentEntry> {
    let route = locales.route(path);
    let slug = route.slug();
    collection
        .get_by_slug(&slug)
        .filter(|entry| entry.locale.as_deref() == route.locale.prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleEntry;
    use crate::test_helpers::{collection_from, ja_en_locales};

    fn locale(code: &str, root: bool) -> LocaleConfig {
        LocaleConfig {
            code: code.to_string(),
            label: code.to_uppercase(),
            lang: code.to_string(),
            is_root: root,
        }
    }

    #[test]
    fn implicit_root_when_none_configured() {
        let locales = Locales::from_config(&SiteConfig::default()).unwrap();
        assert_eq!(locales.len(), 1);
        assert!(locales.root().is_root);
        assert_eq!(locales.root().lang, "en");
    }

    #[test]
    fn root_key_marks_root() {
        let mut config = SiteConfig::default();
        config.locales.insert(
            "root".into(),
            LocaleEntry {
                label: "日本語".into(),
                lang: Some("ja-JP".into()),
                root: false,
            },
        );
        config.locales.insert(
            "en".into(),
            LocaleEntry {
                label: "English".into(),
                lang: None,
                root: false,
            },
        );
        let locales = Locales::from_config(&config).unwrap();
        assert_eq!(locales.root().code, "root");
        assert_eq!(locales.root().lang, "ja-JP");
        assert_eq!(locales.get("en").unwrap().lang, "en");
        assert_eq!(locales.default_locale().code, "root");
    }

    #[test]
    fn explicit_root_flag_on_coded_locale() {
        let locales = Locales::new(vec![locale("ja", true), locale("en", false)], "ja").unwrap();
        assert_eq!(locales.root().code, "ja");
        // The root's own code is never treated as a prefix.
        let route = locales.route("/ja/xrpl/whats");
        assert!(route.locale.is_root);
        assert_eq!(route.remainder, "ja/xrpl/whats");
    }

    #[test]
    fn zero_roots_is_fatal() {
        let err = Locales::new(vec![locale("en", false)], "en").unwrap_err();
        assert!(matches!(err, ConfigError::Locale(_)));
    }

    #[test]
    fn two_roots_is_fatal() {
        let err = Locales::new(vec![locale("ja", true), locale("en", true)], "root").unwrap_err();
        assert!(err.to_string().contains("more than one root"));
    }

    #[test]
    fn unknown_default_locale_is_fatal() {
        let err = Locales::new(vec![locale("ja", true)], "fr").unwrap_err();
        assert!(matches!(err, ConfigError::Locale(_)));
    }

    #[test]
    fn invalid_code_is_fatal() {
        let err = Locales::new(vec![locale("ja", true), locale("en/us", false)], "root")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Locale(_)));
    }

    #[test]
    fn route_prefixed_locale() {
        let locales = ja_en_locales();
        let route = locales.route("/en/xrpl/whats");
        assert_eq!(route.locale.code, "en");
        assert_eq!(route.remainder, "xrpl/whats");
        assert_eq!(route.slug(), "en/xrpl/whats");
    }

    #[test]
    fn route_root_locale() {
        let locales = ja_en_locales();
        let route = locales.route("/xrpl/whats/");
        assert!(route.locale.is_root);
        assert_eq!(route.remainder, "xrpl/whats");
        assert_eq!(route.slug(), "xrpl/whats");
    }

    #[test]
    fn route_landing_pages() {
        let locales = ja_en_locales();
        assert_eq!(locales.route("/").slug(), "index");
        assert_eq!(locales.route("/en").slug(), "en");
        assert_eq!(locales.route("/en/index.html").slug(), "en");
        assert_eq!(locales.route("/index.html").slug(), "index");
    }

    #[test]
    fn route_ignores_query_and_fragment() {
        let locales = ja_en_locales();
        let route = locales.route("/en/basics/?ref=nav#fees");
        assert_eq!(route.locale.code, "en");
        assert_eq!(route.remainder, "basics");
    }

    #[test]
    fn segment_that_only_starts_with_code_is_root() {
        let locales = ja_en_locales();
        let route = locales.route("/entries/list");
        assert!(route.locale.is_root);
        assert_eq!(route.remainder, "entries/list");
    }

    #[test]
    fn locale_of_id_uses_first_directory() {
        let locales = ja_en_locales();
        assert_eq!(locales.locale_of_id("en/xrpl/whats.mdx"), Some("en"));
        assert_eq!(locales.locale_of_id("xrpl/whats.mdx"), None);
        assert_eq!(locales.locale_of_id("en.mdx"), None);
    }

    #[test]
    fn resolve_never_crosses_locales() {
        let locales = ja_en_locales();
        let collection = collection_from(
            &locales,
            &[
                ("index.mdx", "---\ntitle: ホーム\n---\n"),
                ("xrpl/whats.mdx", "---\ntitle: XRPLとは？\n---\n"),
                ("en/xrpl/whats.mdx", "---\ntitle: What is XRPL?\n---\n"),
            ],
        );

        let en = resolve("/en/xrpl/whats", &locales, &collection).unwrap();
        assert_eq!(en.id, "en/xrpl/whats.mdx");
        assert_eq!(en.locale.as_deref(), Some("en"));

        let root = resolve("/xrpl/whats", &locales, &collection).unwrap();
        assert_eq!(root.id, "xrpl/whats.mdx");
        assert_eq!(root.locale, None);

        let home = resolve("/", &locales, &collection).unwrap();
        assert_eq!(home.id, "index.mdx");

        // No English landing page and no fallback to the root one.
        assert!(resolve("/en/", &locales, &collection).is_none());
    }

    #[test]
    fn url_for_entries() {
        let locales = ja_en_locales();
        let collection = collection_from(
            &locales,
            &[("index.mdx", ""), ("en/index.mdx", ""), ("en/basics/fees.mdx", "")],
        );
        let urls: Vec<String> = collection.iter().map(url_for).collect();
        assert_eq!(urls, vec!["/en/basics/fees/", "/en/", "/"]);
    }

    #[test]
    fn home_urls() {
        let locales = ja_en_locales();
        assert_eq!(locales.root().home_url(), "/");
        assert_eq!(locales.get("en").unwrap().home_url(), "/en/");
    }
}
