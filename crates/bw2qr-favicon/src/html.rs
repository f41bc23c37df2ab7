// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Icon link discovery in page HTML.

use std::sync::OnceLock;

use regex::Regex;

const LINK_TAG: &str = r"(?is)<link\b[^>]*>";
const ATTRIBUTE: &str = r#"(?is)\b(rel|sizes|href)\s*=\s*["']([^"']*)["']"#;

static LINK_TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
static ATTRIBUTE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// A PNG icon advertised by a `<link rel="...icon...">` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLink {
    /// Declared width, 0 when no `sizes` attribute is given.
    pub size: u32,
    pub href: String,
}

/// Every PNG icon link in `html`, in document order.
pub fn icon_links(html: &str) -> Vec<IconLink> {
    let (Some(tags), Some(attributes)) = (
        compiled(&LINK_TAG_RE, LINK_TAG),
        compiled(&ATTRIBUTE_RE, ATTRIBUTE),
    ) else {
        return Vec::new();
    };

    tags.find_iter(html)
        .filter_map(|tag| {
            let (mut rel, mut sizes, mut href) = ("", "", "");
            for caps in attributes.captures_iter(tag.as_str()) {
                let value = caps.get(2).map_or("", |m| m.as_str());
                match caps[1].to_ascii_lowercase().as_str() {
                    "rel" => rel = value,
                    "sizes" => sizes = value,
                    _ => href = value,
                }
            }
            let is_icon = rel.to_ascii_lowercase().contains("icon");
            let path = href.split(['?', '#']).next().unwrap_or_default();
            if !is_icon || !path.to_ascii_lowercase().ends_with(".png") {
                return None;
            }
            let size = sizes
                .split(['x', 'X'])
                .next()
                .and_then(|w| w.trim().parse().ok())
                .unwrap_or(0);
            Some(IconLink {
                size,
                href: href.to_owned(),
            })
        })
        .collect()
}

/// The link declaring exactly `target_size`, else the largest one.
pub fn best_link(links: &[IconLink], target_size: u32) -> Option<&IconLink> {
    links
        .iter()
        .find(|l| l.size == target_size)
        .or_else(|| links.iter().max_by_key(|l| l.size))
}
