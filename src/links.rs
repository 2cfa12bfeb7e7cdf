//! External link handling for rendered pages.
//!
//! Links leaving the site open in a new tab without handing the new page a
//! reference to ours. A link is external when its URL has a network host
//! (`http:`, `https:` or protocol-relative `//`) other than the site's own:
//!
//! ```text
//! https://twitter.com/x     external  → target="_blank" rel="noopener noreferrer"
//! https://xrpldojo.dev/en/  same host → untouched
//! /basics/fees/             relative  → untouched
//! #section                  fragment  → untouched
//! mailto:hi@example.com     no host   → untouched
//! ```
//!
//! Rewriting happens once at build time over the finished page. Only `<a>`
//! start tags are rebuilt; every other event is written back unchanged.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("HTML parse error at position {position}: {source}")]
    Parse {
        position: u64,
        source: quick_xml::Error,
    },
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Rewritten page is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

const REL_TOKENS: &[&str] = &["noopener", "noreferrer"];

/// Lowercased host of an absolute or protocol-relative URL.
///
/// Userinfo and port are dropped. Returns `None` for relative URLs,
/// fragments and schemes without a network host.
pub fn host_of(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = if let Some(rest) = url.strip_prefix("//") {
        rest
    } else {
        let (scheme, rest) = url.split_once("://")?;
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return None;
        }
        rest
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = if host_port.starts_with('[') {
        // IPv6 literal keeps its brackets.
        host_port.split_inclusive(']').next().unwrap_or_default()
    } else {
        host_port.split(':').next().unwrap_or_default()
    };

    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

/// Whether `href` leaves `site_host`. With no site host every networked
/// link is external.
pub fn is_external(href: &str, site_host: Option<&str>) -> bool {
    match host_of(href) {
        Some(host) => site_host.is_none_or(|site| !host.eq_ignore_ascii_case(site)),
        None => false,
    }
}

/// Mark every external `<a href>` in `html` with `target="_blank"` and
/// `rel="noopener noreferrer"`.
///
/// Existing `rel` tokens are kept. Running the rewrite twice gives the same
/// result as running it once.
pub fn rewrite_external_links(html: &str, site_host: Option<&str>) -> Result<String, LinkError> {
    let mut reader = Reader::from_reader(html.as_bytes());
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(html.len() + 256)));

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if is_anchor(&elem) => {
                let elem = mark_if_external(elem, site_host);
                writer.write_event(Event::Start(elem))?;
            }
            Ok(Event::Empty(elem)) if is_anchor(&elem) => {
                let elem = mark_if_external(elem, site_host);
                writer.write_event(Event::Empty(elem))?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(source) => {
                return Err(LinkError::Parse {
                    position: reader.error_position(),
                    source,
                });
            }
        }
    }

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn is_anchor(elem: &BytesStart<'_>) -> bool {
    elem.name().as_ref().eq_ignore_ascii_case(b"a")
}

fn href_of(elem: &BytesStart<'_>) -> Option<String> {
    elem.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(b"href"))
        .map(|attr| String::from_utf8_lossy(attr.value.as_ref()).into_owned())
}

/// Return the element unchanged unless it links off-site.
fn mark_if_external<'a>(elem: BytesStart<'a>, site_host: Option<&str>) -> BytesStart<'a> {
    match href_of(&elem) {
        Some(href) if is_external(&href, site_host) => mark_external(&elem),
        _ => elem,
    }
}

/// Rebuild an `<a>` with `target` and `rel` set, keeping attribute order.
fn mark_external(elem: &BytesStart<'_>) -> BytesStart<'static> {
    let tag = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    let mut attrs: Vec<(Vec<u8>, Cow<'static, [u8]>)> = Vec::new();
    let mut has_target = false;
    let mut has_rel = false;

    for attr in elem.html_attributes().flatten() {
        let key = attr.key.as_ref().to_vec();
        let value: Cow<'static, [u8]> = if key.eq_ignore_ascii_case(b"target") {
            has_target = true;
            Cow::Borrowed(&b"_blank"[..])
        } else if key.eq_ignore_ascii_case(b"rel") {
            has_rel = true;
            let merged = merge_rel(&String::from_utf8_lossy(attr.value.as_ref()));
            Cow::Owned(quote_safe(merged.as_bytes()))
        } else {
            Cow::Owned(quote_safe(&attr.value))
        };
        attrs.push((key, value));
    }
    if !has_target {
        attrs.push((b"target".to_vec(), Cow::Borrowed(&b"_blank"[..])));
    }
    if !has_rel {
        attrs.push((b"rel".to_vec(), Cow::Owned(REL_TOKENS.join(" ").into_bytes())));
    }

    let mut rebuilt = BytesStart::new(tag);
    for (key, value) in &attrs {
        rebuilt.push_attribute((key.as_slice(), value.as_ref()));
    }
    rebuilt
}

/// Raw attribute bytes made safe to write between double quotes.
///
/// A value that was single-quoted or unquoted in the source may hold a bare
/// `"`. Only that byte is escaped; other entity references pass through
/// as written, since HTML entities like `&nbsp;` are not XML ones.
fn quote_safe(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    for &byte in raw {
        if byte == b'"' {
            out.extend_from_slice(b"&quot;");
        } else {
            out.push(byte);
        }
    }
    out
}

fn merge_rel(existing: &str) -> String {
    let mut tokens: Vec<&str> = existing.split_whitespace().collect();
    for token in REL_TOKENS {
        if !tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            tokens.push(token);
        }
    }
    tokens.join(" ")
}
