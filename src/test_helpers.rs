//! Shared test utilities for the dojo-docs test suite.
//!
//! Provides fixture setup, in-memory collections, lookups that panic with the
//! available alternatives, and sidebar shape assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let entry = find_entry(&manifest, "xrpl/whats.mdx");
//! assert_eq!(entry.title(), "XRPLとは？");
//!
//! assert_sidebar_shape(&manifest, "root", &[
//!     ("スタートガイド", &["スタートガイド", "ウォレットの作成", "インストール"]),
//!     ("チュートリアル", &[]),
//! ]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::LocaleEntry;
use crate::content::{Collection, ContentEntry, DOCS_COLLECTION};
use crate::locale::{LocaleConfig, Locales};
use crate::scan::Manifest;
use crate::sidebar::SidebarNode;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a content file at `id` under `root`, creating parent directories.
pub fn write_entry(root: &Path, id: &str, content: &str) {
    let path = root.join(id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// =========================================================================
// In-memory content
// =========================================================================

/// Root locale Japanese (`ja-JP`), plus a prefixed `en` locale.
pub fn ja_en_locales() -> Locales {
    let mut config = crate::config::SiteConfig::default();
    config.locales.insert(
        "root".to_string(),
        LocaleEntry {
            label: "日本語".to_string(),
            lang: Some("ja-JP".to_string()),
            root: false,
        },
    );
    config.locales.insert(
        "en".to_string(),
        LocaleEntry {
            label: "English".to_string(),
            lang: Some("en".to_string()),
            root: false,
        },
    );
    Locales::from_config(&config).unwrap()
}

/// Build a `docs` collection from `(id, raw file contents)` pairs.
pub fn collection_from(locales: &Locales, files: &[(&str, &str)]) -> Collection {
    Collection::from_entries(
        DOCS_COLLECTION,
        files
            .iter()
            .map(|(id, raw)| ContentEntry::new(id, raw, locales)),
    )
    .unwrap()
}

// =========================================================================
// Manifest lookups, panicking with a clear message on miss
// =========================================================================

/// Find an entry by id. Panics if not found.
pub fn find_entry<'a>(manifest: &'a Manifest, id: &str) -> &'a ContentEntry {
    manifest
        .entries
        .iter()
        .find(|e| e.id == id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = manifest.entries.iter().map(|e| e.id.as_str()).collect();
            panic!("entry '{id}' not found. Available: {ids:?}")
        })
}

/// Find a locale by code. Panics if not found.
pub fn find_locale<'a>(manifest: &'a Manifest, code: &str) -> &'a LocaleConfig {
    manifest
        .locales
        .iter()
        .find(|l| l.code == code)
        .unwrap_or_else(|| {
            let codes: Vec<&str> = manifest.locales.iter().map(|l| l.code.as_str()).collect();
            panic!("locale '{code}' not found. Available: {codes:?}")
        })
}

/// Built sidebar of a locale. Panics if not found.
pub fn find_sidebar<'a>(manifest: &'a Manifest, code: &str) -> &'a [SidebarNode] {
    manifest.sidebars.get(code).unwrap_or_else(|| {
        let codes: Vec<&String> = manifest.sidebars.keys().collect();
        panic!("no sidebar for locale '{code}'. Available: {codes:?}")
    })
}

// =========================================================================
// Sidebar helpers
// =========================================================================

/// Labels of a list of nodes, in order.
pub fn sidebar_labels(nodes: &[SidebarNode]) -> Vec<&str> {
    nodes.iter().map(SidebarNode::label).collect()
}

/// Each node as `(label, child labels)`. Links have no children.
pub fn sidebar_shape(nodes: &[SidebarNode]) -> Vec<(String, Vec<String>)> {
    nodes
        .iter()
        .map(|n| {
            let children = n.children().iter().map(|c| c.label().to_string()).collect();
            (n.label().to_string(), children)
        })
        .collect()
}

/// Assert that a locale's sidebar matches an expected shape, using the
/// labels displayed in that locale.
///
/// Each entry is `(label, children)`. Use `&[]` for links and empty groups.
pub fn assert_sidebar_shape(manifest: &Manifest, code: &str, expected: &[(&str, &[&str])]) {
    let locale = find_locale(manifest, code);
    let nodes = find_sidebar(manifest, code);

    let actual: Vec<&str> = nodes.iter().map(|n| n.display_label(locale)).collect();
    let expected_labels: Vec<&str> = expected.iter().map(|(l, _)| *l).collect();
    assert_eq!(actual, expected_labels, "sidebar top-level labels mismatch for '{code}'");

    for (node, (label, children)) in nodes.iter().zip(expected) {
        let actual_children: Vec<&str> =
            node.children().iter().map(|c| c.display_label(locale)).collect();
        assert_eq!(
            actual_children,
            children.to_vec(),
            "sidebar children of '{label}' mismatch for '{code}'"
        );
    }
}
