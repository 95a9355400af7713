use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::ParseError;
use crate::domain::{EntryDraft, FeedDraft};

/// Canonical form of one feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub feed: FeedDraft,
    /// Entries in document order.
    pub entries: Vec<EntryDraft>,
}

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &str) -> Result<ParsedFeed, ParseError> {
        self.parse_bytes(raw.as_bytes())
    }

    pub fn parse_bytes(&self, body: &[u8]) -> Result<ParsedFeed, ParseError> {
        let feed = parser::parse(body).map_err(|e| ParseError::Format(e.to_string()))?;

        let meta = FeedDraft {
            title: feed.title.map(|t| decode(&t.content)).unwrap_or_default(),
            description: feed
                .description
                .map(|d| decode(&d.content))
                .unwrap_or_default(),
        };

        let entries = feed
            .entries
            .into_iter()
            .map(|entry| {
                let link = entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default();
                let description = entry
                    .summary
                    .map(|s| s.content)
                    .or_else(|| entry.content.and_then(|c| c.body))
                    .map(|d| decode(&d))
                    .unwrap_or_default();

                EntryDraft {
                    title: entry.title.map(|t| decode(&t.content)).unwrap_or_default(),
                    link,
                    description,
                }
            })
            .collect();

        Ok(ParsedFeed {
            feed: meta,
            entries,
        })
    }
}

fn decode(text: &str) -> String {
    decode_html_entities(text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <description>This is item 1</description>
    </item>
    <item>
      <title>Fish &amp;amp; Chips</title>
      <link>https://example.com/item2</link>
      <guid>item-2</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <subtitle>An Atom test feed</subtitle>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <summary>This is Atom entry 1</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let parsed = Normalizer::new().parse(RSS_SAMPLE).unwrap();

        assert_eq!(parsed.feed.title, "Test Feed");
        assert_eq!(parsed.feed.description, "A test feed");
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].title, "Test Item 1");
        assert_eq!(parsed.entries[0].link, "https://example.com/item1");
        assert_eq!(parsed.entries[0].description, "This is item 1");
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let parsed = Normalizer::new().parse(RSS_SAMPLE).unwrap();
        assert_eq!(parsed.entries[1].description, "");
    }

    #[test]
    fn test_double_escaped_entities_are_decoded() {
        let parsed = Normalizer::new().parse(RSS_SAMPLE).unwrap();
        assert_eq!(parsed.entries[1].title, "Fish & Chips");
    }

    #[test]
    fn test_parse_atom() {
        let parsed = Normalizer::new().parse(ATOM_SAMPLE).unwrap();

        assert_eq!(parsed.feed.title, "Atom Test Feed");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].title, "Atom Entry 1");
        assert_eq!(parsed.entries[0].link, "https://example.com/atom1");
        assert_eq!(parsed.entries[0].description, "This is Atom entry 1");
    }

    #[test]
    fn test_non_feed_document_is_parse_error() {
        let html = "<html><body><p>Not a feed</p></body></html>";
        let err = Normalizer::new().parse(html).unwrap_err();
        assert!(matches!(err, ParseError::Format(_)));
    }

    #[test]
    fn test_plain_text_is_parse_error() {
        assert!(Normalizer::new().parse("definitely not xml").is_err());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let normalizer = Normalizer::new();
        let first = normalizer.parse(RSS_SAMPLE).unwrap();
        let second = normalizer.parse(RSS_SAMPLE).unwrap();
        assert_eq!(first, second);
    }
}
