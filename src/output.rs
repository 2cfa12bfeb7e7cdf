//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (group,
//! page, locale) leads with its positional index and display label; content
//! files and output paths follow as secondary context, either after `→` or
//! on indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Locales
//!     root 日本語 (ja-JP) → /
//!     en English (en) → /en/
//!
//! Sidebar: 日本語
//! 001 スタートガイド (3 pages)
//!     001 スタートガイド → /getting-started/
//!         Source: getting-started/index.mdx
//!     002 ウォレットの準備 → /getting-started/setup-wallet/
//!         Source: getting-started/setup-wallet.mdx
//! 002 チュートリアル (empty)
//! 003 XRPL.org → https://xrpl.org
//!
//! Not in sidebar
//!     ホーム
//!         Source: index.mdx
//!
//! Config
//!     config.toml
//!     public/
//! ```
//!
//! ## Generate
//!
//! ```text
//! 日本語
//!     001 ホーム → index.html
//!     002 XRPLとは？ → xrpl/whats/index.html
//!
//! Assets
//!     favicon.svg
//!
//! Generated 2 pages, 1 asset
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::content::ContentEntry;
use crate::generate::GenerateReport;
use crate::locale::{LocaleConfig, Route};
use crate::scan::Manifest;
use crate::sidebar::SidebarNode;
use std::collections::BTreeSet;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + label, with optional detail.
///
/// ```text
/// 001 入門編 (3 pages)
/// 002 チュートリアル (empty)
/// ```
fn entity_header(index: usize, label: &str, count: Option<usize>) -> String {
    match count {
        Some(0) => format!("{} {} (empty)", format_index(index), label),
        Some(1) => format!("{} {} (1 page)", format_index(index), label),
        Some(n) => format!("{} {} ({} pages)", format_index(index), label, n),
        None => format!("{} {}", format_index(index), label),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Tree walker
// ============================================================================

/// A flattened node from walking a sidebar tree.
struct TreeNode<'a> {
    depth: usize,
    position: usize,
    node: &'a SidebarNode,
}

/// Walk a sidebar tree, assigning positional indices per sibling level.
fn walk_sidebar(nodes: &[SidebarNode]) -> Vec<TreeNode<'_>> {
    let mut out = Vec::new();
    walk_sidebar_recursive(nodes, 0, &mut out);
    out
}

fn walk_sidebar_recursive<'a>(nodes: &'a [SidebarNode], depth: usize, out: &mut Vec<TreeNode<'a>>) {
    for (i, node) in nodes.iter().enumerate() {
        out.push(TreeNode {
            depth,
            position: i + 1,
            node,
        });
        walk_sidebar_recursive(node.children(), depth + 1, out);
    }
}

/// Number of internal pages under a node.
fn page_count(node: &SidebarNode) -> usize {
    match node {
        SidebarNode::Link { entry: Some(_), .. } => 1,
        SidebarNode::Link { entry: None, .. } => 0,
        SidebarNode::Group { children, .. } => children.iter().map(page_count).sum(),
    }
}

fn format_sidebar(nodes: &[SidebarNode], locale: &LocaleConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for tree_node in walk_sidebar(nodes) {
        let base_indent = indent(tree_node.depth);
        let label = tree_node.node.display_label(locale);
        match tree_node.node {
            SidebarNode::Group { .. } => {
                let header =
                    entity_header(tree_node.position, label, Some(page_count(tree_node.node)));
                lines.push(format!("{}{}", base_indent, header));
            }
            SidebarNode::Link { href, entry, .. } => {
                let header = entity_header(tree_node.position, label, None);
                lines.push(format!("{}{} \u{2192} {}", base_indent, header, href));
                if let Some(id) = entry {
                    lines.push(format!("{}    Source: {}", base_indent, id));
                }
            }
        }
    }
    lines
}

fn linked_ids<'a>(nodes: &'a [SidebarNode], ids: &mut BTreeSet<&'a str>) {
    for node in nodes {
        match node {
            SidebarNode::Link { entry: Some(id), .. } => {
                ids.insert(id.as_str());
            }
            SidebarNode::Link { entry: None, .. } => {}
            SidebarNode::Group { children, .. } => linked_ids(children, ids),
        }
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output: locales, each locale's sidebar, pages reachable
/// only by URL, and the config files found.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Locales".to_string());
    for locale in &manifest.locales {
        lines.push(format!(
            "    {} {} ({}) \u{2192} {}",
            locale.code,
            locale.label,
            locale.lang,
            locale.home_url()
        ));
    }

    let mut in_sidebar = BTreeSet::new();
    for locale in &manifest.locales {
        let nodes = manifest.sidebar(&locale.code);
        linked_ids(nodes, &mut in_sidebar);
        lines.push(String::new());
        lines.push(format!("Sidebar: {}", locale.label));
        lines.extend(format_sidebar(nodes, locale));
    }

    let unlisted: Vec<&ContentEntry> = manifest
        .entries
        .iter()
        .filter(|e| !in_sidebar.contains(e.id.as_str()))
        .collect();
    if !unlisted.is_empty() {
        lines.push(String::new());
        lines.push("Not in sidebar".to_string());
        for entry in unlisted {
            lines.push(format!("    {}", entry.title()));
            lines.push(format!("        Source: {}", entry.id));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push("    config.toml".to_string());
    }
    if source_root.join(&manifest.config.public_dir).is_dir() {
        lines.push(format!("    {}/", manifest.config.public_dir));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output: pages per locale with their output files,
/// copied assets, and pages whose links could not be rewritten.
pub fn format_generate_output(report: &GenerateReport, manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();

    for locale in &manifest.locales {
        let pages: Vec<_> = report
            .pages
            .iter()
            .filter(|p| p.locale == locale.code)
            .collect();
        if pages.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(locale.label.clone());
        for (i, page) in pages.iter().enumerate() {
            lines.push(format!(
                "    {} \u{2192} {}",
                entity_header(i + 1, &page.title, None),
                page.output
            ));
        }
    }

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("    {}", asset));
        }
    }

    if !report.link_fallbacks.is_empty() {
        lines.push(String::new());
        lines.push("External links not rewritten".to_string());
        for id in &report.link_fallbacks {
            lines.push(format!("    {}", id));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        plural(report.pages.len(), "page"),
        plural(report.assets.len(), "asset")
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport, manifest: &Manifest) {
    for line in format_generate_output(report, manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Route lookup
// ============================================================================

/// Format how a request path routes and what it resolves to.
pub fn format_route(path: &str, route: &Route<'_>, entry: Option<&ContentEntry>) -> Vec<String> {
    let mut lines = vec![
        format!("Path: {}", path),
        format!("Locale: {} ({})", route.locale.code, route.locale.label),
        format!("Remainder: {}", route.remainder),
        format!("Slug: {}", route.slug()),
    ];
    match entry {
        Some(entry) => {
            lines.push(format!("Entry: {} \u{2192} {}", entry.id, entry.title()));
            lines.push(format!("URL: {}", entry.url()));
        }
        None => lines.push("Entry: (none)".to_string()),
    }
    lines
}

/// Print route output to stdout.
pub fn print_route(path: &str, route: &Route<'_>, entry: Option<&ContentEntry>) {
    for line in format_route(path, route, entry) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
