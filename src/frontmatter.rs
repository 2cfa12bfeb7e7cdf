//! Frontmatter parsing for content files.
//!
//! A content file may open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: XRPLとは？
//! sidebar:
//!   order: 2
//! ---
//! # Body starts here
//! ```
//!
//! The block is deserialized into [`Frontmatter`], a closed schema: unknown
//! keys are rejected, every field is optional. Content is added to the site
//! incrementally, so a broken block never fails the build. The lenient entry
//! point [`parse_lenient`] warns about each unknown or mistyped key and keeps
//! the fields that do parse; a title lost that way is derived from the
//! filename.

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frontmatter block is not closed with `---`")]
    Unterminated,
}

/// Structured frontmatter of a content entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Shorthand for `sidebar.order`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub sidebar: SidebarMeta,
    /// Drafts are skipped by the indexer.
    pub draft: bool,
}

/// Per-entry sidebar hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SidebarMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Overrides the entry title in navigation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Hidden entries are left out of autogenerated groups.
    pub hidden: bool,
}

impl Frontmatter {
    /// Effective sort key: `sidebar.order` wins over the top-level `order`.
    pub fn sidebar_order(&self) -> Option<i64> {
        self.sidebar.order.or(self.order)
    }
}

/// Split a file into its raw YAML block (if any) and the body after it.
pub fn split(content: &str) -> Result<(Option<&str>, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = strip_opening_fence(content) else {
        return Ok((None, content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Ok((Some(&rest[..offset]), &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(FrontmatterError::Unterminated)
}

fn strip_opening_fence(content: &str) -> Option<&str> {
    let (first, rest) = match content.find('\n') {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, ""),
    };
    (first.trim_end() == "---").then_some(rest)
}

/// Strictly parse frontmatter and return it together with the body.
pub fn parse(content: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let (yaml, body) = split(content)?;
    let frontmatter = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
        _ => Frontmatter::default(),
    };
    Ok((frontmatter, body))
}

/// Parse frontmatter, tolerating any problem with a warning.
///
/// An unterminated block keeps the whole file as the body so nothing the
/// author wrote silently disappears. A block that does not fit the schema
/// keeps every known key that parses on its own.
pub fn parse_lenient(id: &str, content: &str) -> (Frontmatter, String) {
    let (yaml, body) = match split(content) {
        Ok(parts) => parts,
        Err(e) => {
            warn!("{id}: ignoring frontmatter ({e}), using defaults");
            return (Frontmatter::default(), content.to_string());
        }
    };
    let frontmatter = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => match serde_yaml::from_str(yaml) {
            Ok(frontmatter) => frontmatter,
            Err(e) => {
                warn!("{id}: frontmatter does not match the schema ({e})");
                salvage(id, yaml)
            }
        },
        _ => Frontmatter::default(),
    };
    (frontmatter, body.to_string())
}

/// Pick the known keys out of a block that failed strict parsing.
fn salvage(id: &str, yaml: &str) -> Frontmatter {
    let mut frontmatter = Frontmatter::default();
    let map = match serde_yaml::from_str::<Mapping>(yaml) {
        Ok(map) => map,
        Err(e) => {
            warn!("{id}: ignoring frontmatter ({e}), using defaults");
            return frontmatter;
        }
    };

    for (key, value) in map {
        let Some(key) = key.as_str() else {
            warn!("{id}: ignoring non-string frontmatter key");
            continue;
        };
        match key {
            "title" => frontmatter.title = field(id, key, value),
            "description" => frontmatter.description = field(id, key, value),
            "order" => frontmatter.order = field(id, key, value),
            "draft" => frontmatter.draft = field(id, key, value),
            "sidebar" => frontmatter.sidebar = salvage_sidebar(id, value),
            other => warn!("{id}: ignoring unknown frontmatter key `{other}`"),
        }
    }
    frontmatter
}

fn salvage_sidebar(id: &str, value: Value) -> SidebarMeta {
    let mut meta = SidebarMeta::default();
    let Value::Mapping(map) = value else {
        warn!("{id}: ignoring `sidebar`, expected a mapping");
        return meta;
    };
    for (key, value) in map {
        match key.as_str() {
            Some("order") => meta.order = field(id, "sidebar.order", value),
            Some("label") => meta.label = field(id, "sidebar.label", value),
            Some("hidden") => meta.hidden = field(id, "sidebar.hidden", value),
            Some(other) => warn!("{id}: ignoring unknown frontmatter key `sidebar.{other}`"),
            None => warn!("{id}: ignoring non-string frontmatter key under `sidebar`"),
        }
    }
    meta
}

fn field<T: DeserializeOwned + Default>(id: &str, key: &str, value: Value) -> T {
    serde_yaml::from_value(value).unwrap_or_else(|e| {
        warn!("{id}: ignoring frontmatter key `{key}` ({e})");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_block_means_defaults() {
        let (fm, body) = parse("# Hello\n\ntext").unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "# Hello\n\ntext");
    }

    #[test]
    fn parses_title_and_order() {
        let src = "---\ntitle: XRPLとは？\norder: 3\n---\nBody\n";
        let (fm, body) = parse(src).unwrap();
        assert_eq!(fm.title.as_deref(), Some("XRPLとは？"));
        assert_eq!(fm.order, Some(3));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn nested_sidebar_order_takes_precedence() {
        let src = "---\norder: 9\nsidebar:\n  order: 1\n  label: Short\n---\n";
        let (fm, _) = parse(src).unwrap();
        assert_eq!(fm.sidebar_order(), Some(1));
        assert_eq!(fm.sidebar.label.as_deref(), Some("Short"));
        assert!(!fm.sidebar.hidden);
    }

    #[test]
    fn windows_line_endings() {
        let src = "---\r\ntitle: Hi\r\n---\r\nBody";
        let (fm, body) = parse(src).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hi"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn empty_block_is_default() {
        let (fm, body) = parse("---\n---\ntext").unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "text");
    }

    #[test]
    fn unknown_key_rejected_strictly() {
        let result = parse("---\ntitel: typo\n---\n");
        assert!(matches!(result, Err(FrontmatterError::Yaml(_))));
    }

    #[test]
    fn unterminated_block_is_error() {
        let result = parse("---\ntitle: open\nno closing fence");
        assert!(matches!(result, Err(FrontmatterError::Unterminated)));
    }

    #[test]
    fn lenient_falls_back_on_bad_types() {
        let src = "---\norder: first\n---\nStill here";
        let (fm, body) = parse_lenient("basics/a.mdx", src);
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "Still here");
    }

    #[test]
    fn lenient_keeps_known_keys_beside_unknown_ones() {
        let src = "---\ntitle: ようこそ\ntemplate: splash\nhero:\n  tagline: Learn XRPL\n\
                   tableOfContents: false\nsidebar:\n  order: 2\n  badge: New\n---\nBody";
        let (fm, body) = parse_lenient("index.mdx", src);
        assert_eq!(fm.title.as_deref(), Some("ようこそ"));
        assert_eq!(fm.sidebar.order, Some(2));
        assert_eq!(body, "Body");
    }

    #[test]
    fn lenient_drops_only_the_mistyped_field() {
        let src = "---\ntitle: Fees\norder: first\ndraft: true\n---\n";
        let (fm, _) = parse_lenient("basics/fees.mdx", src);
        assert_eq!(fm.title.as_deref(), Some("Fees"));
        assert_eq!(fm.order, None);
        assert!(fm.draft);
    }

    #[test]
    fn lenient_defaults_when_block_is_not_a_mapping() {
        let src = "---\n- just\n- a list\n---\nText";
        let (fm, body) = parse_lenient("a.md", src);
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "Text");
    }

    #[test]
    fn lenient_keeps_whole_file_when_unterminated() {
        let src = "---\ntitle: open";
        let (fm, body) = parse_lenient("a.md", src);
        assert!(fm.title.is_none());
        assert_eq!(body, src);
    }

    #[test]
    fn horizontal_rule_later_in_body_is_not_a_fence() {
        let src = "Intro\n\n---\n\nMore";
        let (fm, body) = parse(src).unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, src);
    }
}
