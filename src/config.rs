//! Site configuration module.
//!
//! Handles loading, validating, and merging the project's `config.toml`. The
//! file sits in the project root next to the content tree:
//!
//! ```text
//! project/
//! ├── config.toml              # Site config (overrides stock defaults)
//! ├── public/                  # Copied verbatim to the output root
//! └── src/
//!     ├── assets/logo.webp
//!     └── content/docs/        # Content store
//!         ├── index.mdx
//!         ├── getting-started/
//!         └── en/              # Non-root locale subtree
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! title = "XRPL DOJO"
//! site = "https://xrpldojo.dev"   # Host used to tell external links apart
//! favicon = "/favicon.svg"
//! default_locale = "root"
//! content_dir = "src/content/docs"
//! public_dir = "public"
//!
//! [logo]
//! src = "./src/assets/logo-xrpl-dojo.webp"
//!
//! [locales.root]
//! label = "日本語"
//! lang = "ja-JP"
//!
//! [[sidebar]]
//! label = "スタートガイド"
//! autogenerate = { directory = "getting-started" }
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Tables merge key by key over the stock defaults;
//! arrays (`sidebar`, `social`, `head`) replace the default wholesale.
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The resulting [`SiteConfig`] is built once per run and handed by reference
//! to every stage. Nothing reads configuration from global state.

use crate::consent::ConsentConfig;
use crate::links;
use crate::locale::Locales;
use crate::sidebar::{self, SidebarItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Locale configuration error: {0}")]
    Locale(String),
}

/// Elements allowed in `[[head]]` entries.
const HEAD_TAGS: &[&str] = &[
    "title", "base", "link", "style", "meta", "script", "noscript", "template",
];

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, shown in the header and appended to page titles.
    pub title: String,
    /// Public origin of the deployed site, e.g. `https://xrpldojo.dev`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    /// Favicon URL, usually a file under `public/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Locale served when no prefix matches. `root` names the root locale.
    pub default_locale: String,
    /// Content store, relative to the project root.
    pub content_dir: String,
    /// Static files copied verbatim into the output root.
    pub public_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoConfig>,
    /// Locales keyed by code. The key `root` (or `root = true`) marks the
    /// locale served without a URL prefix.
    pub locales: BTreeMap<String, LocaleEntry>,
    pub social: Vec<SocialLink>,
    /// Extra elements injected into every page's `<head>`.
    pub head: Vec<HeadEntry>,
    /// Theme slot overrides, slot name → component path. Recorded in the
    /// manifest for the theme layer; not interpreted here.
    pub components: BTreeMap<String, String>,
    /// Ordered sidebar declarations. Empty means one autogenerated tree.
    pub sidebar: Vec<SidebarItem>,
    pub consent: ConsentConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_string(),
            site: None,
            favicon: None,
            default_locale: "root".to_string(),
            content_dir: "src/content/docs".to_string(),
            public_dir: "public".to_string(),
            logo: None,
            locales: BTreeMap::new(),
            social: Vec::new(),
            head: Vec::new(),
            components: BTreeMap::new(),
            sidebar: Vec::new(),
            consent: ConsentConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values. Locale problems are fatal and reported first,
    /// before any content is read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Locales::from_config(self)?;

        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if self.content_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_dir must not be empty".into(),
            ));
        }
        if let Some(site) = &self.site
            && links::host_of(site).is_none()
        {
            return Err(ConfigError::Validation(format!(
                "site must be an absolute http(s) URL, got {site:?}"
            )));
        }
        for entry in &self.head {
            entry.validate(&self.consent)?;
        }
        for link in &self.social {
            if link.href.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "social link {:?} has an empty href",
                    link.label
                )));
            }
        }
        sidebar::validate_items(&self.sidebar)?;
        self.consent.validate()?;
        Ok(())
    }

    /// Host of the deployed site, used to classify links as external.
    pub fn site_host(&self) -> Option<String> {
        self.site.as_deref().and_then(links::host_of)
    }
}

/// Header logo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoConfig {
    /// Project-relative file (`./src/assets/logo.webp`) or an absolute URL.
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Hide the text title next to the logo.
    #[serde(default)]
    pub replaces_title: bool,
}

/// One `[locales.<code>]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleEntry {
    /// Name shown in the language picker.
    pub label: String,
    /// BCP-47 tag for `<html lang>`. Defaults to the code (`en` for `root`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Serve this locale without a URL prefix.
    #[serde(default)]
    pub root: bool,
}

/// A social/profile link rendered in the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialLink {
    pub icon: String,
    pub label: String,
    pub href: String,
}

/// An element injected into `<head>`, e.g. an analytics script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadEntry {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Consent category gating this element. Gated scripts are emitted inert
    /// and activated by the consent widget after opt-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl HeadEntry {
    fn validate(&self, consent: &ConsentConfig) -> Result<(), ConfigError> {
        if !HEAD_TAGS.contains(&self.tag.as_str()) {
            return Err(ConfigError::Validation(format!(
                "head.tag {:?} is not one of {HEAD_TAGS:?}",
                self.tag
            )));
        }
        if self.category.is_some() && self.tag != "script" {
            return Err(ConfigError::Validation(format!(
                "head entry <{}>: only scripts can be gated by a consent category",
                self.tag
            )));
        }
        if let Some(category) = &self.category
            && !consent.categories.contains_key(category)
        {
            return Err(ConfigError::Validation(format!(
                "head entry <{}> references unknown consent category {category:?}",
                self.tag
            )));
        }
        Ok(())
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Sidebar, pagination labels, footer.
    pub text_muted: String,
    pub border: String,
    /// Links and the current sidebar entry.
    pub accent: String,
    pub accent_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#17181c".to_string(),
            text_muted: "#545861".to_string(),
            border: "#dfe1e6".to_string(),
            accent: "#2354c7".to_string(),
            accent_hover: "#173a8c".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#17181c".to_string(),
            text: "#eceef2".to_string(),
            text_muted: "#9da1ab".to_string(),
            border: "#353841".to_string(),
            accent: "#9cb8ff".to_string(),
            accent_hover: "#c9d7ff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dojo-docs Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Tables merge over the defaults key by key; arrays replace them.
# Unknown keys will cause an error.

# Site title, shown in the header and appended to every page title.
title = "Documentation"

# Public origin of the deployed site. Links to any other host open in a
# new tab with rel="noopener noreferrer".
# site = "https://example.com"

# Favicon URL (usually a file in public/).
# favicon = "/favicon.svg"

# Locale served when the URL carries no locale prefix.
# "root" refers to the root locale whatever its code.
default_locale = "root"

# Content store and static files, relative to this file.
content_dir = "src/content/docs"
public_dir = "public"

# components: theme slot overrides, recorded in the manifest as-is.
# [components]
# Head = "./src/components/Head.astro"

# ---------------------------------------------------------------------------
# Logo
# ---------------------------------------------------------------------------
# [logo]
# src = "./src/assets/logo.webp"   # project-relative file or absolute URL
# alt = "Site logo"
# replaces_title = false

# ---------------------------------------------------------------------------
# Locales
# ---------------------------------------------------------------------------
# Exactly one locale is the root: the key `root`, or `root = true`.
# Content of other locales lives under src/content/docs/<code>/.
# Without any [locales.*] table a single English root locale is used.
#
# [locales.root]
# label = "日本語"
# lang = "ja-JP"
#
# [locales.en]
# label = "English"
# lang = "en"

# ---------------------------------------------------------------------------
# Header links
# ---------------------------------------------------------------------------
# [[social]]
# icon = "github"
# label = "GitHub"
# href = "https://github.com/example/docs"

# ---------------------------------------------------------------------------
# Extra <head> elements
# ---------------------------------------------------------------------------
# `category` gates the element behind a consent category.
#
# [[head]]
# tag = "script"
# attrs = { src = "https://www.googletagmanager.com/gtag/js?id=G-XXXX", async = "" }
# category = "analytics"

# ---------------------------------------------------------------------------
# Sidebar
# ---------------------------------------------------------------------------
# Groups appear in the order declared. Item forms:
#   "some/slug"                                   link to an entry
#   { slug = "some/slug", label = "..." }         link with a label override
#   { label = "...", link = "https://..." }       arbitrary link
#   { label = "...", items = [ ... ] }            explicit group
#   { label = "...", autogenerate = { directory = "basics" } }
# `translations = { en = "..." }` localizes any label.
# With no [[sidebar]] entries the whole locale is autogenerated.
#
# [[sidebar]]
# label = "スタートガイド"
# translations = { en = "Getting started" }
# autogenerate = { directory = "getting-started" }

# ---------------------------------------------------------------------------
# Cookie consent
# ---------------------------------------------------------------------------
[consent]
enabled = false
script_src = "https://cdn.jsdelivr.net/gh/orestbida/cookieconsent@v3.0.1/dist/cookieconsent.umd.js"
stylesheet_href = "https://cdn.jsdelivr.net/gh/orestbida/cookieconsent@v3.0.1/dist/cookieconsent.css"
default_language = "en"

# `necessary` is always enabled and read-only.
[consent.categories.necessary]
enabled = true
read_only = true

[consent.categories.analytics]
enabled = false
read_only = false

# Modal strings, one table per language.
# [consent.translations.en]
# title = "We use cookies"
# description = "Analytics cookies help us improve the tutorials."
# accept_all = "Accept all"
# accept_necessary = "Reject all"
# show_preferences = "Manage preferences"
# preferences_title = "Cookie preferences"
# save_preferences = "Save preferences"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#17181c"
text_muted = "#545861"
border = "#dfe1e6"
accent = "#2354c7"
accent_hover = "#173a8c"

[colors.dark]
background = "#17181c"
text = "#eceef2"
text_muted = "#9da1ab"
border = "#353841"
accent = "#9cb8ff"
accent_hover = "#c9d7ff"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
    --color-accent-hover: {light_accent_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
        --color-accent-hover: {dark_accent_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        light_accent_hover = colors.light.accent_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
        dark_accent_hover = colors.dark.accent_hover,
    )
}
