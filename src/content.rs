//! Content store indexing.
//!
//! Walks the content directory once and produces the `docs` [`Collection`]:
//! every `.md`/`.mdx` file becomes a [`ContentEntry`] keyed by its id.
//!
//! ```text
//! src/content/docs/
//! ├── index.mdx                    id "index.mdx"           slug "index"
//! ├── xrpl/whats.mdx               id "xrpl/whats.mdx"      slug "xrpl/whats"
//! ├── basics/index.mdx             id "basics/index.mdx"    slug "basics"
//! ├── _partials/                   ignored (leading underscore)
//! └── en/xrpl/whats.mdx            id "en/xrpl/whats.mdx"   slug "en/xrpl/whats", locale "en"
//! ```
//!
//! ## Validation
//!
//! - Ids are unique by construction (they are file paths).
//! - Two files may not map to the same slug (`a.md` + `a.mdx`, or
//!   `basics.mdx` + `basics/index.mdx`).
//! - Frontmatter problems are tolerated; see [`crate::frontmatter`].

use crate::frontmatter::{self, Frontmatter};
use crate::locale::{LocaleConfig, Locales};
use crate::naming;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the one collection a docs site has.
pub const DOCS_COLLECTION: &str = "docs";

const CONTENT_EXTENSIONS: &[&str] = &["md", "mdx"];

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Content directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
    #[error("Duplicate entry id {0}")]
    DuplicateId(String),
    #[error("Entries {first} and {second} both map to slug {slug}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },
}

/// One indexed content file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Path relative to the content directory, `/`-separated, with extension.
    pub id: String,
    /// URL-facing path, derived from `id` only.
    pub slug: String,
    /// Non-root locale code, `None` for root-locale content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub collection: String,
    pub frontmatter: Frontmatter,
    /// Raw text after the frontmatter block.
    pub body: String,
}

impl ContentEntry {
    /// Build an entry from its id and raw file contents.
    pub fn new(id: &str, raw: &str, locales: &Locales) -> Self {
        let (frontmatter, body) = frontmatter::parse_lenient(id, raw);
        Self {
            id: id.to_string(),
            slug: naming::slug_from_id(id),
            locale: locales.locale_of_id(id).map(str::to_string),
            collection: DOCS_COLLECTION.to_string(),
            frontmatter,
            body,
        }
    }

    /// Page title: frontmatter `title`, else derived from the file name.
    pub fn title(&self) -> String {
        match &self.frontmatter.title {
            Some(title) if !title.trim().is_empty() => title.trim().to_string(),
            _ => naming::title_from_id(self.locale_relative_id()),
        }
    }

    /// Label in navigation: `sidebar.label`, else the title.
    pub fn sidebar_label(&self) -> String {
        match &self.frontmatter.sidebar.label {
            Some(label) if !label.trim().is_empty() => label.trim().to_string(),
            _ => self.title(),
        }
    }

    /// Id with the locale directory removed.
    pub fn locale_relative_id(&self) -> &str {
        match &self.locale {
            Some(code) => self
                .id
                .strip_prefix(code.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(&self.id),
            None => &self.id,
        }
    }

    /// Slug with the locale prefix removed; `""` for a landing page.
    pub fn locale_relative_slug(&self) -> &str {
        match &self.locale {
            Some(code) => self
                .slug
                .strip_prefix(code.as_str())
                .map(|rest| rest.trim_start_matches('/'))
                .unwrap_or(&self.slug),
            None if self.slug == "index" => "",
            None => &self.slug,
        }
    }

    pub fn is_index(&self) -> bool {
        naming::is_index_id(&self.id)
    }

    pub fn is_mdx(&self) -> bool {
        self.id.ends_with(".mdx")
    }

    /// Site URL: `/` for the root index, `/slug/` otherwise.
    pub fn url(&self) -> String {
        url_for_slug(&self.slug)
    }
}

/// URL path of a slug.
pub fn url_for_slug(slug: &str) -> String {
    if slug == "index" || slug.is_empty() {
        "/".to_string()
    } else {
        format!("/{slug}/")
    }
}

/// A named set of entries with id and slug lookups.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub name: String,
    entries: BTreeMap<String, ContentEntry>,
    /// slug → id
    slugs: BTreeMap<String, String>,
}

impl Collection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Rebuild a collection from a list of entries (e.g. from the manifest).
    pub fn from_entries(
        name: &str,
        entries: impl IntoIterator<Item = ContentEntry>,
    ) -> Result<Self, ContentError> {
        let mut collection = Self::new(name);
        for entry in entries {
            collection.insert(entry)?;
        }
        Ok(collection)
    }

    pub fn insert(&mut self, entry: ContentEntry) -> Result<(), ContentError> {
        if self.entries.contains_key(&entry.id) {
            return Err(ContentError::DuplicateId(entry.id));
        }
        if let Some(existing) = self.slugs.get(&entry.slug) {
            return Err(ContentError::DuplicateSlug {
                slug: entry.slug,
                first: existing.clone(),
                second: entry.id,
            });
        }
        self.slugs.insert(entry.slug.clone(), entry.id.clone());
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ContentEntry> {
        self.entries.get(id)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&ContentEntry> {
        self.slugs.get(slug).and_then(|id| self.entries.get(id))
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentEntry> {
        self.entries.values()
    }

    /// Entries belonging to one locale, in id order.
    pub fn in_locale<'a>(
        &'a self,
        locale: &'a LocaleConfig,
    ) -> impl Iterator<Item = &'a ContentEntry> + 'a {
        self.entries
            .values()
            .filter(move |e| e.locale.as_deref() == locale.prefix())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ContentEntry> {
        self.entries.into_values().collect()
    }
}

/// Index every content file under `content_dir` into the `docs` collection.
///
/// Files and directories whose names start with `.` or `_` are skipped, as
/// are entries marked `draft: true`.
pub fn scan_collection(content_dir: &Path, locales: &Locales) -> Result<Collection, ContentError> {
    if !content_dir.is_dir() {
        return Err(ContentError::MissingDir(content_dir.to_path_buf()));
    }

    let mut collection = Collection::new(DOCS_COLLECTION);
    let walker = WalkDir::new(content_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored(e.file_name().to_string_lossy().as_ref()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_content_file(entry.path()) {
            continue;
        }
        let id = entry_id(content_dir, entry.path())?;
        let raw = fs::read_to_string(entry.path())?;
        let content_entry = ContentEntry::new(&id, &raw, locales);
        if content_entry.frontmatter.draft {
            debug!("{id}: draft, skipped");
            continue;
        }
        debug!("indexed {id} → {}", content_entry.slug);
        collection.insert(content_entry)?;
    }

    Ok(collection)
}

fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext.as_str()))
}

/// `/`-separated path of a file relative to the content root.
fn entry_id(content_dir: &Path, path: &Path) -> Result<String, ContentError> {
    let rel = path
        .strip_prefix(content_dir)
        .map_err(|_| ContentError::NonUtf8Path(path.to_path_buf()))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| ContentError::NonUtf8Path(path.to_path_buf()))?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}
