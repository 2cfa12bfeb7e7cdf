//! HTML site generation.
//!
//! Stage 2 of the dojo-docs build pipeline. Takes the scan manifest and
//! renders every entry to a static page.
//!
//! ## Page Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ [logo] XRPL DOJO            日本語 · English   social │  header
//! ├──────────────┬───────────────────────────────────────┤
//! │ ▾ スタートガイド │ # XRPLとは？                           │
//! │   インストール   │                                       │
//! │ ▾ 入門編        │ rendered markdown                     │
//! │   手数料  ◀     │                                       │
//! │              │ ← previous              next →        │
//! └──────────────┴───────────────────────────────────────┘
//! ```
//!
//! The sidebar is the locale's tree from the manifest. Groups containing the
//! current page are always open; the current link carries
//! `aria-current="page"`. Previous/next follow sidebar order.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # root-locale landing page
//! ├── xrpl/whats/index.html
//! ├── en/index.html
//! ├── en/xrpl/whats/index.html
//! ├── _assets/logo-xrpl-dojo.webp
//! └── favicon.svg                # copied from public/
//! ```
//!
//! ## Post-processing
//!
//! Every finished page goes through [`links::rewrite_external_links`]. A page
//! the rewriter cannot parse is written unmodified with a warning.
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time; color custom properties
//! from config are prepended.

use crate::config::{self, HeadEntry, SiteConfig};
use crate::content::{Collection, ContentEntry, ContentError};
use crate::links;
use crate::locale::{self, LocaleConfig, Locales};
use crate::scan::Manifest;
use crate::sidebar::{self, SidebarNode};
use log::{debug, info, warn};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Asset not found: {0}")]
    MissingAsset(PathBuf),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Output directory for files referenced from config, like the logo.
const ASSETS_DIR: &str = "_assets";

/// What the generate stage wrote.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub pages: Vec<GeneratedPage>,
    /// Output-relative paths of copied static files.
    pub assets: Vec<String>,
    /// Ids of pages written without link rewriting.
    pub link_fallbacks: Vec<String>,
}

#[derive(Debug)]
pub struct GeneratedPage {
    pub id: String,
    pub locale: String,
    pub title: String,
    /// Output-relative path, e.g. `en/xrpl/whats/index.html`.
    pub output: String,
}

/// Read a manifest from disk and render it into `output_dir`.
///
/// `source_root` is the project directory the manifest was scanned from;
/// the logo and `public/` are resolved against it.
pub fn generate(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    generate_site(&manifest, source_root, output_dir)
}

/// Render an in-memory manifest into `output_dir`.
pub fn generate_site(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let config = &manifest.config;
    let locales = manifest.locales()?;
    let collection = manifest.collection()?;
    let site_host = config.site_host();

    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;
    let mut report = GenerateReport::default();

    let public_dir = source_root.join(&config.public_dir);
    if public_dir.is_dir() {
        copy_dir_recursive(&public_dir, output_dir, output_dir, &mut report.assets)?;
    }
    let logo_url = match &config.logo {
        Some(logo) => Some(resolve_logo(&logo.src, source_root, output_dir, &mut report)?),
        None => None,
    };

    for entry in collection.iter() {
        let locale = locales.for_entry(entry.locale.as_deref());
        let page = PageContext {
            config,
            locales: &locales,
            collection: &collection,
            locale,
            entry,
            sidebar: manifest.sidebar(&locale.code),
            css: &css,
            logo_url: logo_url.as_deref(),
        };
        let html = render_page(&page).into_string();
        let html = match links::rewrite_external_links(&html, site_host.as_deref()) {
            Ok(rewritten) => rewritten,
            Err(e) => {
                warn!("{}: external links left as-is ({e})", entry.id);
                report.link_fallbacks.push(entry.id.clone());
                html
            }
        };

        let rel = output_path(entry);
        let path = output_dir.join(&rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        debug!("rendered {} → {}", entry.id, rel.display());

        report.pages.push(GeneratedPage {
            id: entry.id.clone(),
            locale: locale.code.clone(),
            title: entry.title(),
            output: rel.to_string_lossy().replace('\\', "/"),
        });
    }

    info!(
        "generated {} pages into {}",
        report.pages.len(),
        output_dir.display()
    );
    Ok(report)
}

/// Output file of an entry, relative to the output root.
pub fn output_path(entry: &ContentEntry) -> PathBuf {
    if entry.slug == "index" {
        PathBuf::from("index.html")
    } else {
        Path::new(&entry.slug).join("index.html")
    }
}

/// Copy `src` into `dst`, recording output-relative paths.
fn copy_dir_recursive(
    src: &Path,
    dst: &Path,
    output_root: &Path,
    copied: &mut Vec<String>,
) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path, output_root, copied)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            if let Ok(rel) = dst_path.strip_prefix(output_root) {
                copied.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    Ok(())
}

/// URL of the logo. Project files are copied into `_assets/`; URLs and
/// site-absolute paths are used as given.
fn resolve_logo(
    src: &str,
    source_root: &Path,
    output_dir: &Path,
    report: &mut GenerateReport,
) -> Result<String, GenerateError> {
    if src.starts_with('/') || links::host_of(src).is_some() {
        return Ok(src.to_string());
    }
    let path = source_root.join(src.trim_start_matches("./"));
    let Some(file_name) = path.file_name() else {
        return Err(GenerateError::MissingAsset(path));
    };
    if !path.is_file() {
        return Err(GenerateError::MissingAsset(path));
    }
    let file_name = file_name.to_string_lossy().into_owned();
    let assets = output_dir.join(ASSETS_DIR);
    fs::create_dir_all(&assets)?;
    fs::copy(&path, assets.join(&file_name))?;
    report.assets.push(format!("{ASSETS_DIR}/{file_name}"));
    Ok(format!("/{ASSETS_DIR}/{file_name}"))
}

// ============================================================================
// Markdown
// ============================================================================

/// Render an entry body to HTML.
///
/// MDX `import`/`export` statements are dropped; code fences are left alone.
pub fn render_markdown(body: &str, is_mdx: bool) -> String {
    let source = if is_mdx {
        strip_mdx_statements(body)
    } else {
        body.to_string()
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(&source, options);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

fn strip_mdx_statements(body: &str) -> String {
    let mut fence: Option<&str> = None;
    let mut out = String::with_capacity(body.len());
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let marker = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(m));
        match (fence, marker) {
            (None, Some(m)) => fence = Some(m),
            (Some(open), Some(m)) if open == m => fence = None,
            _ => {}
        }
        let is_statement = trimmed.starts_with("import ") || trimmed.starts_with("export ");
        if fence.is_none() && marker.is_none() && is_statement {
            continue;
        }
        out.push_str(line);
    }
    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Everything a page needs to render.
struct PageContext<'a> {
    config: &'a SiteConfig,
    locales: &'a Locales,
    collection: &'a Collection,
    locale: &'a LocaleConfig,
    entry: &'a ContentEntry,
    sidebar: &'a [SidebarNode],
    css: &'a str,
    logo_url: Option<&'a str>,
}

/// Fixed interface strings.
struct UiStrings {
    previous: &'static str,
    next: &'static str,
    language: &'static str,
    navigation: &'static str,
}

fn ui_strings(lang: &str) -> UiStrings {
    if lang.starts_with("ja") {
        UiStrings {
            previous: "前へ",
            next: "次へ",
            language: "言語",
            navigation: "メイン",
        }
    } else {
        UiStrings {
            previous: "Previous",
            next: "Next",
            language: "Language",
            navigation: "Main",
        }
    }
}

fn render_page(page: &PageContext<'_>) -> Markup {
    let entry = page.entry;
    let title = entry.title();
    let current = locale::url_for(entry);
    let strings = ui_strings(&page.locale.lang);
    let (prev, next) = sidebar::prev_next(page.sidebar, &entry.id);
    let body = render_markdown(&entry.body, entry.is_mdx());

    let content = html! {
        (site_header(page, &strings))
        div.page {
            nav.sidebar aria-label=(strings.navigation) {
                (render_sidebar(page.sidebar, page.locale, &current))
            }
            main id="content" {
                h1 { (title) }
                article.content {
                    (PreEscaped(body))
                }
                (render_pagination(prev, next, page.locale, &strings))
            }
        }
        (consent_scripts(page.config))
    };

    let page_title = if title == page.config.title {
        title.clone()
    } else {
        format!("{} | {}", title, page.config.title)
    };
    base_document(page, &page_title, content)
}

/// Renders the base HTML document structure
fn base_document(page: &PageContext<'_>, title: &str, content: Markup) -> Markup {
    let config = page.config;
    html! {
        (DOCTYPE)
        html lang=(page.locale.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(description) = &page.entry.frontmatter.description {
                    meta name="description" content=(description);
                }
                @if let Some(favicon) = &config.favicon {
                    link rel="icon" href=(favicon);
                }
                @if config.consent.enabled {
                    link rel="stylesheet" href=(config.consent.stylesheet_href);
                }
                @for entry in &config.head {
                    (render_head_entry(entry))
                }
                style { (PreEscaped(page.css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header: logo/title, language picker and social links
fn site_header(page: &PageContext<'_>, strings: &UiStrings) -> Markup {
    let config = page.config;
    let show_title = !config.logo.as_ref().is_some_and(|l| l.replaces_title);
    let logo_alt = config
        .logo
        .as_ref()
        .and_then(|l| l.alt.as_deref())
        .unwrap_or(config.title.as_str());

    html! {
        header.site-header {
            a.site-title href=(page.locale.home_url()) {
                @if let Some(src) = page.logo_url {
                    img src=(src) alt=(logo_alt);
                }
                @if show_title {
                    span { (config.title) }
                }
            }
            @if page.locales.len() > 1 {
                nav.locale-picker aria-label=(strings.language) {
                    ul {
                        @for (other, href) in language_links(page) {
                            @let is_current = other.code == page.locale.code;
                            li {
                                a href=(href) lang=(other.lang) hreflang=(other.lang)
                                    aria-current=[is_current.then_some("true")] {
                                    (other.label)
                                }
                            }
                        }
                    }
                }
            }
            @if !config.social.is_empty() {
                nav.social-links {
                    ul {
                        @for link in &config.social {
                            li {
                                a class={ "social-" (link.icon) } href=(link.href) aria-label=(link.label) {
                                    (link.label)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Each locale with the URL of this page in that locale, or the locale's
/// landing page when no counterpart exists.
fn language_links<'a>(page: &PageContext<'a>) -> Vec<(&'a LocaleConfig, String)> {
    let relative = page.entry.locale_relative_slug();
    page.locales
        .iter()
        .map(|other| {
            let href = page
                .collection
                .get_by_slug(&other.localize_slug(relative))
                .filter(|e| e.locale.as_deref() == other.prefix())
                .map(locale::url_for)
                .unwrap_or_else(|| other.home_url());
            (other, href)
        })
        .collect()
}

/// Renders a sidebar tree, marking the link to `current`.
pub fn render_sidebar(nodes: &[SidebarNode], locale: &LocaleConfig, current: &str) -> Markup {
    html! {
        ul {
            @for node in nodes {
                (render_sidebar_node(node, locale, current))
            }
        }
    }
}

fn render_sidebar_node(node: &SidebarNode, locale: &LocaleConfig, current: &str) -> Markup {
    let label = node.display_label(locale);
    match node {
        SidebarNode::Link { href, .. } => {
            let is_current = href == current;
            html! {
                li {
                    a href=(href) aria-current=[is_current.then_some("page")] { (label) }
                }
            }
        }
        SidebarNode::Group {
            collapsed,
            children,
            ..
        } => {
            let open = !collapsed || node.contains_href(current);
            html! {
                li.group {
                    details open[open] {
                        summary { (label) }
                        (render_sidebar(children, locale, current))
                    }
                }
            }
        }
    }
}

fn render_pagination(
    prev: Option<&SidebarNode>,
    next: Option<&SidebarNode>,
    locale: &LocaleConfig,
    strings: &UiStrings,
) -> Markup {
    let href = |node: &SidebarNode| match node {
        SidebarNode::Link { href, .. } => href.clone(),
        SidebarNode::Group { .. } => String::new(),
    };
    html! {
        @if prev.is_some() || next.is_some() {
            nav.pagination {
                @if let Some(prev) = prev {
                    a.prev href=(href(prev)) rel="prev" {
                        span.direction { (strings.previous) }
                        span.label { (prev.display_label(locale)) }
                    }
                }
                @if let Some(next) = next {
                    a.next href=(href(next)) rel="next" {
                        span.direction { (strings.next) }
                        span.label { (next.display_label(locale)) }
                    }
                }
            }
        }
    }
}

/// Renders one `[[head]]` element.
///
/// Scripts with a consent category get `type="text/plain"` and
/// `data-category`, so the browser skips them until the consent widget
/// swaps the type back.
fn render_head_entry(entry: &HeadEntry) -> Markup {
    let escape = |s: &str| html! { (s) }.into_string();
    let gated = entry.category.is_some();

    let mut out = format!("<{}", entry.tag);
    for (key, value) in &entry.attrs {
        if gated && key == "type" {
            continue;
        }
        if value.is_empty() {
            out.push_str(&format!(" {}", escape(key)));
        } else {
            out.push_str(&format!(" {}=\"{}\"", escape(key), escape(value)));
        }
    }
    if let Some(category) = &entry.category {
        out.push_str(&format!(
            " type=\"text/plain\" data-category=\"{}\"",
            escape(category)
        ));
    }
    out.push('>');

    if !matches!(entry.tag.as_str(), "meta" | "link" | "base") {
        if let Some(content) = &entry.content {
            match entry.tag.as_str() {
                "script" | "style" => out.push_str(content),
                _ => out.push_str(&escape(content)),
            }
        }
        out.push_str(&format!("</{}>", entry.tag));
    }
    PreEscaped(out)
}

/// Widget script and its start call, at the end of the body.
fn consent_scripts(config: &SiteConfig) -> Markup {
    if !config.consent.enabled {
        return html! {};
    }
    match config.consent.init_script() {
        Ok(init) => html! {
            script src=(config.consent.script_src) {}
            script { (PreEscaped(init)) }
        },
        Err(e) => {
            warn!("consent widget config could not be serialized: {e}");
            html! {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
