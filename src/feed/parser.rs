//! RSS 2.0 and Atom parsing
//!
//! Feeds are small and shallow, so items are pulled out with regexes the
//! same way page content is cleaned up elsewhere: find each `<item>` or
//! `<entry>` block, then read the child elements we care about.

use crate::error::FeedError;
use crate::feed::FeedEntry;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Child elements read from `<item>` and `<entry>` blocks
const CHILD_TAGS: &[&str] = &[
    "title",
    "link",
    "description",
    "content:encoded",
    "pubDate",
    "dc:date",
    "summary",
    "content",
    "published",
    "updated",
    "id",
];

struct Patterns {
    root: Regex,
    item: Regex,
    entry: Regex,
    cdata: Regex,
    ampersand: Regex,
    atom_link: Regex,
    href: Regex,
    rel: Regex,
    category_text: Regex,
    category_term: Regex,
    children: HashMap<&'static str, Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        root: Regex::new(r"(?i)<(rss|feed|rdf:RDF)[\s>]").expect("root pattern"),
        item: Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").expect("item pattern"),
        entry: Regex::new(r"(?is)<entry\b[^>]*>(.*?)</entry>").expect("entry pattern"),
        cdata: Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata pattern"),
        ampersand: Regex::new(r"&([#A-Za-z0-9]+;)?").expect("ampersand pattern"),
        atom_link: Regex::new(r#"(?is)<link\b([^>]*?)/?>"#).expect("link pattern"),
        href: attribute_pattern("href"),
        rel: attribute_pattern("rel"),
        category_text: Regex::new(r"(?is)<category\b[^>]*>(.*?)</category>")
            .expect("category pattern"),
        category_term: Regex::new(r#"(?is)<category\b[^>]*\bterm\s*=\s*["']([^"']*)["']"#)
            .expect("category term pattern"),
        children: CHILD_TAGS
            .iter()
            .map(|tag| (*tag, child_pattern(tag)))
            .collect(),
    })
}

fn child_pattern(tag: &str) -> Regex {
    let pattern = format!(
        r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>",
        tag = regex::escape(tag)
    );
    Regex::new(&pattern).expect("child element pattern")
}

fn attribute_pattern(name: &str) -> Regex {
    let pattern = format!(r#"(?i)\b{}\s*=\s*["']([^"']*)["']"#, regex::escape(name));
    Regex::new(&pattern).expect("attribute pattern")
}

/// Parse an RSS 2.0, RSS 1.0 (RDF) or Atom document into entries
pub fn parse_feed(document: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let p = patterns();

    if !p.root.is_match(document) {
        return Err(FeedError::InvalidFeed(
            "document has no <rss>, <feed> or <rdf:RDF> root".to_string(),
        ));
    }

    let mut entries: Vec<FeedEntry> = p
        .item
        .captures_iter(document)
        .map(|c| parse_item(&c[1]))
        .collect();

    if entries.is_empty() {
        entries = p
            .entry
            .captures_iter(document)
            .map(|c| parse_atom_entry(&c[1]))
            .collect();
    }

    debug!("Parsed {} feed entries", entries.len());
    Ok(entries)
}

fn parse_item(block: &str) -> FeedEntry {
    FeedEntry {
        title: child_text(block, "title").unwrap_or_default(),
        link: child_text(block, "link").unwrap_or_default(),
        description: child_text(block, "description")
            .or_else(|| child_text(block, "content:encoded"))
            .unwrap_or_default(),
        published: child_text(block, "pubDate")
            .or_else(|| child_text(block, "dc:date"))
            .unwrap_or_default(),
        categories: categories(block),
    }
}

fn parse_atom_entry(block: &str) -> FeedEntry {
    FeedEntry {
        title: child_text(block, "title").unwrap_or_default(),
        link: atom_link(block).unwrap_or_default(),
        description: child_text(block, "summary")
            .or_else(|| child_text(block, "content"))
            .unwrap_or_default(),
        published: child_text(block, "published")
            .or_else(|| child_text(block, "updated"))
            .unwrap_or_default(),
        categories: categories(block),
    }
}

/// Text of the first `<tag>` child, with CDATA unwrapped and entities decoded.
/// `tag` must be one of [`CHILD_TAGS`].
fn child_text(block: &str, tag: &str) -> Option<String> {
    let re = patterns().children.get(tag)?;
    let raw = re.captures(block)?.get(1)?.as_str();
    Some(clean_text(raw))
}

/// CDATA sections are kept verbatim; only the text around them is decoded
fn clean_text(raw: &str) -> String {
    let p = patterns();
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;

    for caps in p.cdata.captures_iter(raw) {
        let (Some(section), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&decode_entities(&raw[last..section.start()]));
        out.push_str(body.as_str());
        last = section.end();
    }
    out.push_str(&decode_entities(&raw[last..]));

    out.trim().to_string()
}

/// Decode entities, treating a bare `&` as a literal ampersand
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let escaped = patterns()
        .ampersand
        .replace_all(text, |caps: &Captures| match caps.get(1) {
            Some(_) => caps[0].to_string(),
            None => "&amp;".to_string(),
        });

    htmlescape::decode_html(&escaped).unwrap_or_else(|_| text.to_string())
}

/// Atom `<link href="..."/>`, preferring `rel="alternate"` or no rel
fn atom_link(block: &str) -> Option<String> {
    let p = patterns();
    let mut fallback = None;

    for caps in p.atom_link.captures_iter(block) {
        let attrs = &caps[1];
        let Some(href) = attribute(&p.href, attrs) else {
            continue;
        };
        match attribute(&p.rel, attrs).as_deref() {
            None | Some("alternate") => return Some(href),
            _ => {
                if fallback.is_none() {
                    fallback = Some(href);
                }
            }
        }
    }

    fallback.or_else(|| child_text(block, "id"))
}

fn attribute(re: &Regex, attrs: &str) -> Option<String> {
    re.captures(attrs).map(|c| clean_text(&c[1]))
}

fn categories(block: &str) -> Vec<String> {
    let p = patterns();
    let mut terms: Vec<String> = p
        .category_text
        .captures_iter(block)
        .map(|c| clean_text(&c[1]))
        .filter(|t| !t.is_empty())
        .collect();

    terms.extend(
        p.category_term
            .captures_iter(block)
            .map(|c| clean_text(&c[1]))
            .filter(|t| !t.is_empty()),
    );

    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Learning</title>
    <item>
      <title><![CDATA[Intro to SQL & Analytics]]></title>
      <link>https://example.com/sql</link>
      <description>Query basics &amp; joins</description>
      <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
      <category>SQL</category>
      <category>Analytics</category>
    </item>
    <item>
      <title>Cloud Migration</title>
      <link>https://example.com/cloud</link>
      <description>Moving workloads</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Feed</title>
  <entry>
    <title>Vector Search</title>
    <link rel="self" href="https://example.com/self"/>
    <link rel="alternate" href="https://example.com/vectors"/>
    <summary>Embeddings in practice</summary>
    <updated>2025-02-01T00:00:00Z</updated>
    <category term="AI"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let entries = parse_feed(RSS).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Intro to SQL & Analytics");
        assert_eq!(entries[0].link, "https://example.com/sql");
        assert_eq!(entries[0].description, "Query basics & joins");
        assert_eq!(entries[0].published, "Mon, 06 Jan 2025 10:00:00 GMT");
        assert_eq!(entries[0].categories, vec!["SQL", "Analytics"]);
        assert!(entries[1].published.is_empty());
    }

    #[test]
    fn test_parse_atom() {
        let entries = parse_feed(ATOM).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://example.com/vectors");
        assert_eq!(entries[0].description, "Embeddings in practice");
        assert_eq!(entries[0].published, "2025-02-01T00:00:00Z");
        assert_eq!(entries[0].categories, vec!["AI"]);
    }

    #[test]
    fn test_rejects_non_feed() {
        let err = parse_feed("<html><body>nope</body></html>").unwrap_err();
        assert!(matches!(err, FeedError::InvalidFeed(_)));
    }

    #[test]
    fn test_bare_ampersand_does_not_block_decoding() {
        let doc = "<rss><channel><item><title>AT&T &amp; friends</title>\
                   <description>Q&amp;A &#8211; part 1 & 2</description></item></channel></rss>";
        let entries = parse_feed(doc).unwrap();
        assert_eq!(entries[0].title, "AT&T & friends");
        assert_eq!(entries[0].description, "Q&A \u{2013} part 1 & 2");
    }

    #[test]
    fn test_cdata_kept_verbatim() {
        let doc = "<rss><channel><item><title>Tags &amp; markup</title>\
                   <description><![CDATA[Use &lt;b&gt; tags]]></description></item></channel></rss>";
        let entries = parse_feed(doc).unwrap();
        assert_eq!(entries[0].title, "Tags & markup");
        assert_eq!(entries[0].description, "Use &lt;b&gt; tags");
    }

    #[test]
    fn test_mixed_cdata_and_entities() {
        assert_eq!(clean_text("a &amp; <![CDATA[&amp;]]> b"), "a & &amp; b");
    }

    #[test]
    fn test_every_child_tag_has_a_pattern() {
        for tag in CHILD_TAGS {
            assert!(patterns().children.contains_key(tag), "no pattern for {}", tag);
        }
    }

    #[test]
    fn test_empty_channel() {
        let entries = parse_feed("<rss><channel></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }
}
