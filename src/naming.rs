//! Centralized path naming rules for content entries.
//!
//! Every content file is identified by its `id`: the path relative to the
//! content directory, `/`-separated, extension included. Two things are
//! derived from it and nothing else:
//!
//! - the **slug**, the URL-facing path (`xrpl/whats.mdx` → `xrpl/whats`)
//! - the **fallback title**, used when frontmatter has none
//!   (`getting-started/first-steps.mdx` → "first steps")
//!
//! ## Slug Rules
//!
//! 1. Strip the extension from the last segment.
//! 2. Slugify each segment: lowercase, whitespace → `-`, drop anything that is
//!    not alphanumeric, `-` or `_`. Non-ASCII letters survive, so Japanese
//!    file names keep their readable URLs.
//! 3. Drop a trailing `/index`. A bare `index` stays `index`.

/// Slugify a single path segment.
///
/// - `"Getting Started"` → `"getting-started"`
/// - `"v1.2"` → `"v12"`
/// - `"入門"` → `"入門"`
pub fn slugify_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.trim().chars() {
        if c.is_whitespace() {
            out.push('-');
        } else if c.is_alphanumeric() || c == '-' || c == '_' {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Strip the extension from the last segment of an id.
fn strip_extension(id: &str) -> &str {
    let last_start = id.rfind('/').map(|p| p + 1).unwrap_or(0);
    match id[last_start..].rfind('.') {
        Some(dot) if dot > 0 => &id[..last_start + dot],
        _ => id,
    }
}

/// Derive the slug of a content entry from its id.
///
/// Pure and idempotent: feeding a slug back in returns it unchanged.
///
/// - `"index.mdx"` → `"index"`
/// - `"xrpl/whats.mdx"` → `"xrpl/whats"`
/// - `"en/xrpl/whats.mdx"` → `"en/xrpl/whats"`
/// - `"basics/index.mdx"` → `"basics"`
pub fn slug_from_id(id: &str) -> String {
    let segments: Vec<String> = strip_extension(id)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(slugify_segment)
        .collect();
    let mut slug = segments.join("/");
    if let Some(stripped) = slug.strip_suffix("/index") {
        slug = stripped.to_string();
    }
    slug
}

/// Whether the id points at a directory's landing page (`index.md`/`index.mdx`).
///
/// Case-insensitive, matching the lowercasing in [`slug_from_id`].
pub fn is_index_id(id: &str) -> bool {
    file_stem(id).eq_ignore_ascii_case("index")
}

/// File name of an id without extension (`a/b/first-steps.mdx` → `first-steps`).
pub fn file_stem(id: &str) -> &str {
    let stem = strip_extension(id);
    stem.rsplit('/').next().unwrap_or(stem)
}

/// Human-readable label from a file or directory name: dashes and
/// underscores become spaces.
pub fn display_title(name: &str) -> String {
    name.replace(['-', '_'], " ")
}

/// Fallback title for an entry with no usable frontmatter title.
///
/// Index pages take their directory's name; the root index is "index".
pub fn title_from_id(id: &str) -> String {
    let stem = strip_extension(id);
    let mut parts = stem.rsplit('/');
    let last = parts.next().unwrap_or(stem);
    if last.eq_ignore_ascii_case("index") {
        if let Some(parent) = parts.next() {
            return display_title(parent);
        }
    }
    display_title(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_index_keeps_index_slug() {
        assert_eq!(slug_from_id("index.mdx"), "index");
    }

    #[test]
    fn nested_index_collapses_to_directory() {
        assert_eq!(slug_from_id("basics/index.mdx"), "basics");
        assert_eq!(slug_from_id("en/index.md"), "en");
    }

    #[test]
    fn plain_pages_strip_extension() {
        assert_eq!(slug_from_id("xrpl/whats.mdx"), "xrpl/whats");
        assert_eq!(slug_from_id("en/xrpl/whats.mdx"), "en/xrpl/whats");
    }

    #[test]
    fn segments_are_slugified() {
        assert_eq!(slug_from_id("Getting Started/First Steps.md"), "getting-started/first-steps");
        assert_eq!(slug_from_id("tutorials/v1.2-notes.mdx"), "tutorials/v12-notes");
    }

    #[test]
    fn non_ascii_names_survive() {
        assert_eq!(slug_from_id("入門/はじめに.mdx"), "入門/はじめに");
    }

    #[test]
    fn slug_is_idempotent() {
        for id in [
            "index.mdx",
            "basics/index.mdx",
            "xrpl/whats.mdx",
            "Getting Started/First Steps.md",
            "en/xrpl/whats.mdx",
        ] {
            let once = slug_from_id(id);
            assert_eq!(slug_from_id(&once), once, "not idempotent for {id}");
        }
    }

    #[test]
    fn dotted_directories_are_not_extensions() {
        assert_eq!(strip_extension("v1.0/page"), "v1.0/page");
        assert_eq!(strip_extension("v1.0/page.md"), "v1.0/page");
    }

    #[test]
    fn hidden_style_names_keep_leading_dot() {
        assert_eq!(strip_extension(".draft"), ".draft");
    }

    #[test]
    fn index_detection() {
        assert!(is_index_id("index.mdx"));
        assert!(is_index_id("basics/index.md"));
        assert!(!is_index_id("basics/reindex.md"));
    }

    #[test]
    fn capitalised_index_is_a_landing_page() {
        assert_eq!(slug_from_id("basics/Index.mdx"), "basics");
        assert!(is_index_id("basics/Index.mdx"));
        assert!(is_index_id("INDEX.md"));
        assert_eq!(title_from_id("basics/Index.mdx"), "basics");
    }

    #[test]
    fn file_stem_of_nested_id() {
        assert_eq!(file_stem("a/b/first-steps.mdx"), "first-steps");
        assert_eq!(file_stem("top.md"), "top");
    }

    #[test]
    fn fallback_titles() {
        assert_eq!(title_from_id("basics/first-steps.mdx"), "first steps");
        assert_eq!(title_from_id("getting-started/index.mdx"), "getting started");
        assert_eq!(title_from_id("index.mdx"), "index");
        assert_eq!(title_from_id("tutorials/send_xrp.md"), "send xrp");
    }
}
