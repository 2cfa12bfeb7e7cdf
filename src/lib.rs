//! # dojo-docs
//!
//! A static documentation site generator for multilingual tutorial sites.
//! Markdown and MDX files under a content directory become pages; a
//! `config.toml` declares locales, the sidebar, header links and analytics.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      project/  →  manifest.json    (config + content + sidebars)
//! 2. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON, so the content inventory, slugs and
//! built sidebars can be inspected before anything is rendered.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: loads config, indexes content, builds sidebars into a manifest |
//! | [`generate`] | Stage 2: renders the manifest to HTML with Maud |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`content`] | Content store: entries, the `docs` collection, directory indexing |
//! | [`frontmatter`] | YAML frontmatter schema and lenient parsing |
//! | [`naming`] | Slug and title derivation from file paths |
//! | [`locale`] | Locale set, request routing, and slug resolution |
//! | [`sidebar`] | Sidebar declarations, autogeneration, and pagination order |
//! | [`links`] | External link detection and page rewriting |
//! | [`consent`] | Cookie consent widget configuration |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Slugs Come From Paths Only
//!
//! An entry's slug is derived from its file path and nothing else, so URLs
//! do not change when a title does. Ordering and labels live in frontmatter.
//!
//! ## Locales Never Fall Back
//!
//! A page missing from a locale is a missing page. The language picker links
//! to the locale's landing page instead of showing content in another
//! language.
//!
//! ## External Links At Build Time
//!
//! Links to other hosts get `target="_blank"` and
//! `rel="noopener noreferrer"` when the page is written, so the published
//! HTML needs no script to fix them up.

pub mod config;
pub mod consent;
pub mod content;
pub mod frontmatter;
pub mod generate;
pub mod links;
pub mod locale;
pub mod naming;
pub mod output;
pub mod scan;
pub mod sidebar;

#[cfg(test)]
pub(crate) mod test_helpers;
