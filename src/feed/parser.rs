use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use regex::Regex;

use crate::normalize::{clean, truncate_chars};

/// Stored field limits, applied after normalization.
const MAX_TITLE_CHARS: usize = 500;
const MAX_DESCRIPTION_CHARS: usize = 2000;
const MAX_CONTENT_CHARS: usize = 5000;

/// Canonical intermediate record for one feed entry.
///
/// Title and URL are required — entries lacking either cannot be
/// deduplicated or displayed and are dropped during extraction. Everything
/// else is best-effort. Text fields are already normalized and truncated
/// to the stored limits.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    /// Feed-supplied published or updated time, in that priority order;
    /// falls back to the parse wall-clock time when the feed omits both.
    pub published: DateTime<Utc>,
}

/// Result of parsing one feed document.
#[derive(Debug)]
pub struct ParsedFeed {
    pub articles: Vec<RawArticle>,
    /// Entries dropped for missing a title or link.
    pub skipped: usize,
}

/// Parse a feed document into raw articles.
///
/// Returns an error only when the document itself is not a recognizable
/// RSS/Atom feed. Individual entries never fail the parse — unusable ones
/// are counted in [`ParsedFeed::skipped`].
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, parser::ParseFeedError> {
    let feed = parser::parse(bytes)?;

    let total = feed.entries.len();
    let articles: Vec<RawArticle> = feed.entries.into_iter().filter_map(extract_entry).collect();
    let skipped = total - articles.len();

    Ok(ParsedFeed { articles, skipped })
}

/// Extract one entry into a [`RawArticle`], or `None` when it lacks a
/// usable title or link.
fn extract_entry(entry: Entry) -> Option<RawArticle> {
    let url = entry.links.first().map(|l| l.href.clone())?;
    if url.is_empty() {
        return None;
    }

    let title = clean(entry.title.as_ref().map(|t| t.content.as_str()).unwrap_or(""));
    if title.is_empty() {
        tracing::debug!(entry = %entry.id, "Entry has no usable title, dropping");
        return None;
    }

    // Image extraction looks at the raw entry HTML, so it runs before the
    // text fields are normalized.
    let image_url = extract_image(&entry);

    let description = entry
        .summary
        .as_ref()
        .map(|s| clean(&s.content))
        .filter(|s| !s.is_empty())
        .map(|s| truncate_chars(&s, MAX_DESCRIPTION_CHARS).to_string());

    let content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .map(clean)
        .filter(|s| !s.is_empty())
        .map(|s| truncate_chars(&s, MAX_CONTENT_CHARS).to_string());

    let published = entry.published.or(entry.updated).unwrap_or_else(Utc::now);

    Some(RawArticle {
        title: truncate_chars(&title, MAX_TITLE_CHARS).to_string(),
        url,
        description,
        content,
        image_url,
        published,
    })
}

/// Best-effort image URL for an entry, in priority order:
/// media content typed `image/*` (covers RSS enclosures, which feed-rs
/// surfaces as media content), media thumbnails, enclosure links typed
/// `image/*`, and finally the first `<img src>` in the content body.
fn extract_image(entry: &Entry) -> Option<String> {
    for media in &entry.media {
        for content in &media.content {
            let is_image = content
                .content_type
                .as_ref()
                .is_some_and(|ct| ct.ty() == "image");
            if is_image {
                if let Some(url) = &content.url {
                    return Some(url.to_string());
                }
            }
        }
    }

    for media in &entry.media {
        if let Some(thumbnail) = media.thumbnails.first() {
            return Some(thumbnail.image.uri.clone());
        }
    }

    let enclosure = entry.links.iter().find(|l| {
        l.rel.as_deref() == Some("enclosure")
            && l.media_type.as_deref().is_some_and(|t| t.starts_with("image/"))
    });
    if let Some(link) = enclosure {
        return Some(link.href.clone());
    }

    entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .and_then(first_img_src)
}

/// Pull the first `<img src="...">` out of an HTML fragment.
fn first_img_src(html: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).ok()?;
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rss(items: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:media="http://search.yahoo.com/mrss/"
     xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel>
    <title>Security Wire</title>
    <link>https://example.com</link>
    {items}
</channel></rss>"#
        )
        .into_bytes()
    }

    #[test]
    fn test_basic_entry_extraction() {
        let doc = rss(r#"
            <item>
                <title>Patch released for VPN flaw</title>
                <link>https://example.com/vpn-flaw</link>
                <description>&lt;p&gt;Vendors shipped a &lt;b&gt;fix&lt;/b&gt;.&lt;/p&gt;</description>
                <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.articles.len(), 1);

        let article = &parsed.articles[0];
        assert_eq!(article.title, "Patch released for VPN flaw");
        assert_eq!(article.url, "https://example.com/vpn-flaw");
        assert_eq!(article.description.as_deref(), Some("Vendors shipped a fix."));
        assert_eq!(article.published.timestamp(), 1736157600);
    }

    #[test]
    fn test_entry_without_link_dropped() {
        let doc = rss(r#"
            <item><title>No link here</title></item>
            <item>
                <title>Has a link</title>
                <link>https://example.com/ok</link>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.articles[0].url, "https://example.com/ok");
    }

    #[test]
    fn test_entry_without_title_dropped() {
        let doc = rss(r#"
            <item><link>https://example.com/untitled</link></item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert!(parsed.articles.is_empty());
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_missing_dates_fall_back_to_now() {
        let before = Utc::now();
        let doc = rss(r#"
            <item>
                <title>Undated entry</title>
                <link>https://example.com/undated</link>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        let published = parsed.articles[0].published;
        assert!(published >= before);
        assert!(published <= Utc::now());
    }

    #[test]
    fn test_title_truncated_to_limit() {
        let long_title = "t".repeat(600);
        let doc = rss(&format!(
            r#"<item><title>{long_title}</title><link>https://example.com/long</link></item>"#
        ));

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(parsed.articles[0].title.chars().count(), 500);
    }

    #[test]
    fn test_image_from_media_content() {
        let doc = rss(r#"
            <item>
                <title>With media content</title>
                <link>https://example.com/m1</link>
                <media:content url="https://img.example.com/photo.jpg" type="image/jpeg"/>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(
            parsed.articles[0].image_url.as_deref(),
            Some("https://img.example.com/photo.jpg")
        );
    }

    #[test]
    fn test_image_from_media_thumbnail() {
        let doc = rss(r#"
            <item>
                <title>With thumbnail</title>
                <link>https://example.com/m2</link>
                <media:thumbnail url="https://img.example.com/thumb.png"/>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(
            parsed.articles[0].image_url.as_deref(),
            Some("https://img.example.com/thumb.png")
        );
    }

    #[test]
    fn test_image_from_enclosure() {
        let doc = rss(r#"
            <item>
                <title>With enclosure</title>
                <link>https://example.com/m3</link>
                <enclosure url="https://img.example.com/enclosed.gif" type="image/gif" length="1000"/>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(
            parsed.articles[0].image_url.as_deref(),
            Some("https://img.example.com/enclosed.gif")
        );
    }

    #[test]
    fn test_image_from_content_body() {
        let doc = rss(r#"
            <item>
                <title>With inline image</title>
                <link>https://example.com/m4</link>
                <content:encoded>&lt;p&gt;Story&lt;/p&gt;&lt;img src="https://img.example.com/inline.jpg" alt=""&gt;</content:encoded>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(
            parsed.articles[0].image_url.as_deref(),
            Some("https://img.example.com/inline.jpg")
        );
    }

    #[test]
    fn test_media_content_wins_over_inline_img() {
        let doc = rss(r#"
            <item>
                <title>Both image sources</title>
                <link>https://example.com/m5</link>
                <media:content url="https://img.example.com/primary.jpg" type="image/jpeg"/>
                <content:encoded>&lt;img src="https://img.example.com/secondary.jpg"&gt;</content:encoded>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert_eq!(
            parsed.articles[0].image_url.as_deref(),
            Some("https://img.example.com/primary.jpg")
        );
    }

    #[test]
    fn test_no_image_is_none() {
        let doc = rss(r#"
            <item>
                <title>Plain entry</title>
                <link>https://example.com/plain</link>
                <description>text only</description>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        assert!(parsed.articles[0].image_url.is_none());
    }

    #[test]
    fn test_content_body_normalized_and_stored() {
        let doc = rss(r#"
            <item>
                <title>With content</title>
                <link>https://example.com/c1</link>
                <content:encoded>&lt;p&gt;First&lt;/p&gt;&lt;p&gt;Second&lt;/p&gt;</content:encoded>
            </item>
        "#);

        let parsed = parse_feed(&doc).unwrap();
        let content = parsed.articles[0].content.as_deref().unwrap();
        assert!(content.contains("First"));
        assert!(content.contains("Second"));
        assert!(!content.contains('<'));
    }

    #[test]
    fn test_invalid_document_errors() {
        assert!(parse_feed(b"this is not xml at all").is_err());
    }

    #[test]
    fn test_first_img_src_variants() {
        assert_eq!(
            first_img_src(r#"<img src="https://a.example/x.png">"#).as_deref(),
            Some("https://a.example/x.png")
        );
        assert_eq!(
            first_img_src(r#"<IMG SRC='https://a.example/y.png'/>"#).as_deref(),
            Some("https://a.example/y.png")
        );
        assert_eq!(first_img_src("<p>no image</p>"), None);
    }
}
