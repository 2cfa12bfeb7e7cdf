//! Content scanning and manifest generation.
//!
//! Stage 1 of the dojo-docs build pipeline. Loads the site config, indexes
//! the content store and builds every locale's sidebar, producing a
//! [`Manifest`] that the generate stage consumes.
//!
//! ## Project Layout
//!
//! ```text
//! project/
//! ├── config.toml
//! ├── public/favicon.svg
//! └── src/content/docs/
//!     ├── index.mdx                    # root-locale landing page
//!     ├── getting-started/
//!     │   ├── index.mdx                # group landing, sorted first
//!     │   ├── setup-wallet.mdx         # order: 1
//!     │   └── install.mdx              # order: 2
//!     ├── basics/
//!     └── en/                          # `en` locale mirrors the tree
//!         └── xrpl/whats.mdx
//! ```
//!
//! ## Failure Order
//!
//! 1. Config and locale problems, before any content is read.
//! 2. Content store problems (missing directory, duplicate slugs).
//! 3. Sidebar declarations naming pages that do not exist.
//!
//! Frontmatter problems never fail the scan; they are logged and the entry
//! falls back to defaults.

use crate::config::{self, SiteConfig};
use crate::content::{self, Collection, ContentEntry, DOCS_COLLECTION};
use crate::locale::{LocaleConfig, Locales};
use crate::sidebar::{self, SidebarNode};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Content error: {0}")]
    Content(#[from] content::ContentError),
    #[error("Sidebar error: {0}")]
    Sidebar(#[from] sidebar::SidebarError),
}

/// Manifest output from the scan stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub config: SiteConfig,
    /// Root first, then prefixed locales by code.
    pub locales: Vec<LocaleConfig>,
    /// Every non-draft entry, in id order.
    pub entries: Vec<ContentEntry>,
    /// Built sidebar per locale code.
    pub sidebars: BTreeMap<String, Vec<SidebarNode>>,
}

impl Manifest {
    /// Rebuild the locale set. Fails only on a hand-edited manifest.
    pub fn locales(&self) -> Result<Locales, config::ConfigError> {
        Locales::new(self.locales.clone(), &self.config.default_locale)
    }

    /// Rebuild the collection with its slug index.
    pub fn collection(&self) -> Result<Collection, content::ContentError> {
        Collection::from_entries(DOCS_COLLECTION, self.entries.iter().cloned())
    }

    pub fn sidebar(&self, code: &str) -> &[SidebarNode] {
        self.sidebars.get(code).map_or(&[], Vec::as_slice)
    }
}

/// Scan a project directory into a manifest.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    let locales = Locales::from_config(&config)?;

    let content_dir = root.join(&config.content_dir);
    let collection = content::scan_collection(&content_dir, &locales)?;
    info!(
        "indexed {} entries in {} locale(s) from {}",
        collection.len(),
        locales.len(),
        content_dir.display()
    );

    let sidebars = sidebar::build_all(&config.sidebar, &locales, &collection)?;

    Ok(Manifest {
        locales: locales.as_slice().to_vec(),
        entries: collection.into_entries(),
        sidebars,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;

    #[test]
    fn scan_fixture_site() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();

        assert_eq!(manifest.config.title, "XRPL DOJO");
        let codes: Vec<&str> = manifest.locales.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["root", "en"]);
        assert!(manifest.sidebars.contains_key("root"));
        assert!(manifest.sidebars.contains_key("en"));
    }

    #[test]
    fn fixture_entries_carry_frontmatter() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();

        let whats = find_entry(&manifest, "xrpl/whats.mdx");
        assert_eq!(whats.title(), "XRPLとは？");
        assert_eq!(whats.slug, "xrpl/whats");

        let en = find_entry(&manifest, "en/xrpl/whats.mdx");
        assert_eq!(en.locale.as_deref(), Some("en"));
        assert_eq!(en.title(), "What is the XRP Ledger?");
    }

    #[test]
    fn drafts_do_not_reach_manifest() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        assert!(!manifest.entries.iter().any(|e| e.id == "basics/draft-notes.mdx"));
    }

    #[test]
    fn root_sidebar_shape() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();

        assert_sidebar_shape(
            &manifest,
            "root",
            &[
                (
                    "スタートガイド",
                    &["スタートガイド", "ウォレットの準備", "インストール"],
                ),
                ("XRPLとは？", &["XRPLとは？"]),
                ("入門編", &["手数料", "アカウント", "トランザクション"]),
                ("チュートリアル", &[]),
                ("XRPL.org", &[]),
            ],
        );
    }

    #[test]
    fn en_sidebar_uses_translations_and_en_content() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();

        assert_sidebar_shape(
            &manifest,
            "en",
            &[
                ("Getting started", &["Installation"]),
                ("What is XRPL?", &["What is the XRP Ledger?"]),
                ("Basics", &[]),
                ("Tutorials", &[]),
                ("XRPL.org", &[]),
            ],
        );
    }

    #[test]
    fn manifest_roundtrips_through_json() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();

        let json = serde_json::to_string(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries, manifest.entries);
        assert_eq!(back.sidebars, manifest.sidebars);

        let locales = back.locales().unwrap();
        assert_eq!(locales.root().lang, "ja-JP");
        let collection = back.collection().unwrap();
        assert!(collection.get_by_slug("en/xrpl/whats").is_some());
    }

    #[test]
    fn locale_error_reported_before_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[locales.en]\nlabel = \"English\"\n",
        )
        .unwrap();
        // No content directory at all: the locale error must win.
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Config(config::ConfigError::Locale(_))));
    }

    #[test]
    fn missing_content_dir_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Content(content::ContentError::MissingDir(_))));
    }

    #[test]
    fn unresolved_sidebar_slug_fails_scan() {
        let tmp = setup_fixtures();
        let config_path = tmp.path().join("config.toml");
        let mut config = fs::read_to_string(&config_path).unwrap();
        config.push_str("\n[[sidebar]]\nlabel = \"Gone\"\nitems = [\"xrpl/missing\"]\n");
        fs::write(&config_path, config).unwrap();

        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Sidebar(_)));
    }

    #[test]
    fn no_sidebar_config_autogenerates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let docs = tmp.path().join("src/content/docs");
        write_entry(&docs, "index.md", "---\ntitle: Home\n---\n");
        write_entry(&docs, "guide/a.md", "---\ntitle: A\n---\n");

        let manifest = scan(tmp.path()).unwrap();
        assert_sidebar_shape(&manifest, "root", &[("Home", &[]), ("guide", &["A"])]);
    }

    #[test]
    fn scan_is_deterministic() {
        let tmp = setup_fixtures();
        let first = serde_json::to_string(&scan(tmp.path()).unwrap()).unwrap();
        let second = serde_json::to_string(&scan(tmp.path()).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
