//! Sidebar navigation building.
//!
//! The site config declares the sidebar as an ordered list of items. Building
//! it for a locale turns each declaration into a [`SidebarNode`]:
//!
//! | Declaration | Result |
//! |---|---|
//! | `"xrpl/whats"` | link to that entry in the active locale |
//! | `{ slug, label? }` | same, with a label override |
//! | `{ label, link }` | link to any URL, not checked |
//! | `{ label, items }` | group of the nested declarations |
//! | `{ label, autogenerate = { directory } }` | group built from a directory |
//!
//! ## Autogenerated Groups
//!
//! Children come from entries of the active locale under the directory
//! (`basics/` for the root locale, `en/basics/` for `en`):
//!
//! 1. The directory's `index` entry, as the landing link.
//! 2. Everything else, by `sidebar.order`/`order` ascending, entries without
//!    an order last, ties broken by file or directory name.
//!
//! Subdirectories become nested groups. A directory with no entries yields an
//! empty group: content is added incrementally and an empty section must not
//! break the build.
//!
//! Group order is always declaration order. The output is fully determined by
//! the config and the collection, so repeated builds produce the same tree.

use crate::config::ConfigError;
use crate::content::{Collection, ContentEntry};
use crate::locale::{LocaleConfig, Locales};
use crate::naming;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidebarError {
    #[error("Sidebar entry {slug:?} does not match any page in locale {locale:?}")]
    UnresolvedSlug { slug: String, locale: String },
}

type Translations = BTreeMap<String, String>;

// ============================================================================
// Declarations (config side)
// ============================================================================

/// One sidebar declaration from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarItem {
    Slug(String),
    Autogenerate(AutogenerateGroup),
    Group(ExplicitGroup),
    Link(LinkItem),
    Entry(EntryItem),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutogenerateGroup {
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: Translations,
    #[serde(default)]
    pub collapsed: bool,
    pub autogenerate: AutogenerateRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutogenerateRule {
    /// Directory relative to the locale's content root.
    pub directory: String,
    /// Collapse nested subdirectory groups.
    #[serde(default)]
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplicitGroup {
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: Translations,
    #[serde(default)]
    pub collapsed: bool,
    pub items: Vec<SidebarItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: Translations,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryItem {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: Translations,
}

/// Check declarations for problems that do not need content to detect.
pub fn validate_items(items: &[SidebarItem]) -> Result<(), ConfigError> {
    for item in items {
        match item {
            SidebarItem::Slug(_) | SidebarItem::Entry(_) => {}
            SidebarItem::Autogenerate(group) => {
                require_label(&group.label)?;
                let dir = group.autogenerate.directory.trim_matches('/');
                if dir.split('/').any(|seg| seg == ".." || seg == ".") {
                    return Err(ConfigError::Validation(format!(
                        "sidebar group {:?}: autogenerate.directory must stay inside the content directory",
                        group.label
                    )));
                }
            }
            SidebarItem::Group(group) => {
                require_label(&group.label)?;
                validate_items(&group.items)?;
            }
            SidebarItem::Link(link) => {
                require_label(&link.label)?;
                if link.link.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "sidebar link {:?} has an empty target",
                        link.label
                    )));
                }
            }
        }
    }
    Ok(())
}

fn require_label(label: &str) -> Result<(), ConfigError> {
    if label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sidebar labels must not be empty".into(),
        ));
    }
    Ok(())
}

// ============================================================================
// Built tree
// ============================================================================

/// A node of a built sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarNode {
    Group {
        label: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        translations: Translations,
        #[serde(default)]
        collapsed: bool,
        #[serde(default)]
        children: Vec<SidebarNode>,
    },
    Link {
        label: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        translations: Translations,
        href: String,
        /// Id of the linked entry; `None` for arbitrary links.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entry: Option<String>,
    },
}

impl SidebarNode {
    pub fn label(&self) -> &str {
        match self {
            SidebarNode::Group { label, .. } | SidebarNode::Link { label, .. } => label,
        }
    }

    fn translations(&self) -> &Translations {
        match self {
            SidebarNode::Group { translations, .. } | SidebarNode::Link { translations, .. } => {
                translations
            }
        }
    }

    /// Label shown for a locale: translation by code, then by language tag,
    /// then the default label.
    pub fn display_label(&self, locale: &LocaleConfig) -> &str {
        let translations = self.translations();
        translations
            .get(&locale.code)
            .or_else(|| translations.get(&locale.lang))
            .map(String::as_str)
            .unwrap_or_else(|| self.label())
    }

    pub fn children(&self) -> &[SidebarNode] {
        match self {
            SidebarNode::Group { children, .. } => children,
            SidebarNode::Link { .. } => &[],
        }
    }

    /// Whether this node is, or contains, a link to `href`.
    pub fn contains_href(&self, current: &str) -> bool {
        match self {
            SidebarNode::Link { href, .. } => href == current,
            SidebarNode::Group { children, .. } => children.iter().any(|c| c.contains_href(current)),
        }
    }

    fn entry_link(entry: &ContentEntry, label: String, translations: Translations) -> Self {
        SidebarNode::Link {
            label,
            translations,
            href: entry.url(),
            entry: Some(entry.id.clone()),
        }
    }
}

/// Build the sidebar of every locale, keyed by locale code.
pub fn build_all(
    items: &[SidebarItem],
    locales: &Locales,
    collection: &Collection,
) -> Result<BTreeMap<String, Vec<SidebarNode>>, SidebarError> {
    locales
        .iter()
        .map(|locale| -> Result<_, SidebarError> {
            Ok((locale.code.clone(), build_sidebar(items, locale, collection)?))
        })
        .collect()
}

/// Build the sidebar tree of one locale.
///
/// With no declarations, the whole locale is autogenerated.
pub fn build_sidebar(
    items: &[SidebarItem],
    locale: &LocaleConfig,
    collection: &Collection,
) -> Result<Vec<SidebarNode>, SidebarError> {
    if items.is_empty() {
        return Ok(autogenerate("", false, locale, collection));
    }
    items
        .iter()
        .map(|item| build_item(item, locale, collection))
        .collect()
}

fn build_item(
    item: &SidebarItem,
    locale: &LocaleConfig,
    collection: &Collection,
) -> Result<SidebarNode, SidebarError> {
    match item {
        SidebarItem::Slug(slug) => {
            let entry = resolve_slug(slug, locale, collection)?;
            Ok(SidebarNode::entry_link(entry, entry.sidebar_label(), Translations::new()))
        }
        SidebarItem::Entry(item) => {
            let entry = resolve_slug(&item.slug, locale, collection)?;
            let label = item.label.clone().unwrap_or_else(|| entry.sidebar_label());
            Ok(SidebarNode::entry_link(entry, label, item.translations.clone()))
        }
        SidebarItem::Link(link) => Ok(SidebarNode::Link {
            label: link.label.clone(),
            translations: link.translations.clone(),
            href: link.link.clone(),
            entry: None,
        }),
        SidebarItem::Group(group) => Ok(SidebarNode::Group {
            label: group.label.clone(),
            translations: group.translations.clone(),
            collapsed: group.collapsed,
            children: group
                .items
                .iter()
                .map(|child| build_item(child, locale, collection))
                .collect::<Result<_, _>>()?,
        }),
        SidebarItem::Autogenerate(group) => {
            let children = autogenerate(
                &group.autogenerate.directory,
                group.autogenerate.collapsed,
                locale,
                collection,
            );
            if children.is_empty() {
                debug!(
                    "sidebar group {:?} ({}): no entries under {:?}",
                    group.label, locale.code, group.autogenerate.directory
                );
            }
            Ok(SidebarNode::Group {
                label: group.label.clone(),
                translations: group.translations.clone(),
                collapsed: group.collapsed,
                children,
            })
        }
    }
}

fn resolve_slug<'c>(
    slug: &str,
    locale: &LocaleConfig,
    collection: &'c Collection,
) -> Result<&'c ContentEntry, SidebarError> {
    let localized = locale.localize_slug(slug);
    collection
        .get_by_slug(&localized)
        .filter(|e| e.locale.as_deref() == locale.prefix())
        .ok_or_else(|| SidebarError::UnresolvedSlug {
            slug: slug.to_string(),
            locale: locale.code.clone(),
        })
}

/// Children of an autogenerated group for `directory` in `locale`.
fn autogenerate(
    directory: &str,
    collapsed: bool,
    locale: &LocaleConfig,
    collection: &Collection,
) -> Vec<SidebarNode> {
    let dir = directory.trim_matches('/');
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{dir}/")
    };

    let entries: Vec<(&str, &ContentEntry)> = collection
        .in_locale(locale)
        .filter(|e| !e.frontmatter.sidebar.hidden)
        .filter_map(|e| e.locale_relative_id().strip_prefix(&prefix).map(|rel| (rel, e)))
        .collect();

    build_tree(&entries, collapsed)
}

/// Sort key shared by files and subdirectories.
type SortKey = (bool, i64, String);

fn sort_key(order: Option<i64>, name: &str) -> SortKey {
    (order.is_none(), order.unwrap_or(0), name.to_string())
}

/// Build nodes from entries whose ids are relative to the current directory.
fn build_tree(entries: &[(&str, &ContentEntry)], collapsed: bool) -> Vec<SidebarNode> {
    let mut landing: Option<&ContentEntry> = None;
    let mut files: Vec<(SortKey, &ContentEntry)> = Vec::new();
    let mut subdirs: BTreeMap<&str, Vec<(&str, &ContentEntry)>> = BTreeMap::new();

    for &(rel, entry) in entries {
        match rel.split_once('/') {
            Some((dir, rest)) => subdirs.entry(dir).or_default().push((rest, entry)),
            None if naming::is_index_id(rel) => landing = Some(entry),
            None => {
                let key = sort_key(entry.frontmatter.sidebar_order(), rel);
                files.push((key, entry));
            }
        }
    }

    let mut items: Vec<(SortKey, SidebarNode)> = files
        .into_iter()
        .map(|(key, entry)| {
            (key, SidebarNode::entry_link(entry, entry.sidebar_label(), Translations::new()))
        })
        .collect();

    for (dir, children) in subdirs {
        let index = children
            .iter()
            .find(|(rel, _)| naming::is_index_id(rel))
            .map(|(_, e)| *e);
        let label = index
            .map(|e| e.sidebar_label())
            .unwrap_or_else(|| naming::display_title(dir));
        let order = index.and_then(|e| e.frontmatter.sidebar_order());
        let group = SidebarNode::Group {
            label,
            translations: Translations::new(),
            collapsed,
            children: build_tree(&children, collapsed),
        };
        items.push((sort_key(order, dir), group));
    }

    items.sort_by(|a, b| a.0.cmp(&b.0));

    let mut nodes = Vec::with_capacity(items.len() + 1);
    if let Some(entry) = landing {
        nodes.push(SidebarNode::entry_link(entry, entry.sidebar_label(), Translations::new()));
    }
    nodes.extend(items.into_iter().map(|(_, node)| node));
    nodes
}

// ============================================================================
// Pagination
// ============================================================================

/// Internal links of a tree in reading order.
pub fn flatten_links(nodes: &[SidebarNode]) -> Vec<&SidebarNode> {
    let mut out = Vec::new();
    collect_links(nodes, &mut out);
    out
}

fn collect_links<'a>(nodes: &'a [SidebarNode], out: &mut Vec<&'a SidebarNode>) {
    for node in nodes {
        match node {
            SidebarNode::Link { entry: Some(_), .. } => out.push(node),
            SidebarNode::Link { entry: None, .. } => {}
            SidebarNode::Group { children, .. } => collect_links(children, out),
        }
    }
}

/// Previous and next sidebar links around the entry with `id`.
pub fn prev_next<'a>(
    nodes: &'a [SidebarNode],
    id: &str,
) -> (Option<&'a SidebarNode>, Option<&'a SidebarNode>) {
    let links = flatten_links(nodes);
    let position = links.iter().position(|node| {
        matches!(node, SidebarNode::Link { entry: Some(entry), .. } if entry == id)
    });
    match position {
        Some(i) => (
            i.checked_sub(1).and_then(|p| links.get(p).copied()),
            links.get(i + 1).copied(),
        ),
        None => (None, None),
    }
}
