//! Sitemap generation.
//!
//! The URL list is served as JSON for sitemap aggregators and also
//! rendered as a `sitemap.xml` document:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/foo/bar</loc>
//!     <lastmod>2025-01-01T00:00:00+00:00</lastmod>
//!   </url>
//! </urlset>
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::config::SiteConfig;
use crate::content::{published, Post};
use crate::helpers::{encode_path, escape_xml, full_url_for};
use crate::Site;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One sitemap entry. `loc` is the site-relative post path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
}

/// Sitemap entries for the non-draft posts, newest first
pub fn sitemap_urls(posts: &[Post]) -> Vec<SitemapUrl> {
    published(posts)
        .iter()
        .map(|post| SitemapUrl {
            loc: encode_path(&post.url_path()),
            lastmod: post.date,
        })
        .collect()
}

/// Render entries as a sitemaps.org `urlset` with absolute locations
pub fn sitemap_xml(config: &SiteConfig, urls: &[SitemapUrl]) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in urls {
        // `loc` is already percent-encoded
        let loc = format!("{}{}", config.base_url(), entry.loc);
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&loc));
        xml.push_str("</loc>\n    <lastmod>");
        xml.push_str(&entry.lastmod.to_rfc3339_opts(SecondsFormat::Secs, false));
        xml.push_str("</lastmod>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Write `sitemap.xml` for `posts` into the public directory
pub fn write_sitemap(site: &Site, posts: &[Post]) -> Result<PathBuf> {
    let xml = sitemap_xml(&site.config, &sitemap_urls(posts));
    let sitemap_path = site
        .public_dir
        .join(site.config.sitemap.path.trim_start_matches('/'));

    if let Some(parent) = sitemap_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&sitemap_path, xml)
        .with_context(|| format!("Failed to write sitemap to {}", sitemap_path.display()))?;

    tracing::info!(
        "Generated {} ({})",
        site.config.sitemap.path,
        full_url_for(&site.config, &site.config.sitemap.path)
    );
    Ok(sitemap_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_urls_skip_drafts() {
        let mut draft = Post::new("Draft", "/draft", at(9));
        draft.draft = true;
        let posts = vec![
            Post::new("Old", "/old", at(1)),
            draft,
            Post::new("New", "/blog/new", at(3)),
        ];

        let urls = sitemap_urls(&posts);
        assert_eq!(
            urls,
            vec![
                SitemapUrl {
                    loc: "/blog/new".to_string(),
                    lastmod: at(3)
                },
                SitemapUrl {
                    loc: "/old".to_string(),
                    lastmod: at(1)
                },
            ]
        );
    }

    #[test]
    fn test_json_shape() {
        let urls = sitemap_urls(&[Post::new("A", "/a", at(2))]);
        let json = serde_json::to_string(&urls).unwrap();
        assert_eq!(json, r#"[{"loc":"/a","lastmod":"2024-05-02T00:00:00Z"}]"#);
    }

    #[test]
    fn test_empty_input() {
        assert!(sitemap_urls(&[]).is_empty());
        let xml = sitemap_xml(&SiteConfig::default(), &[]);
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_sitemap_xml() {
        let config = SiteConfig {
            url: "https://example.com/".to_string(),
            ..Default::default()
        };
        let urls = sitemap_urls(&[Post::new("A", "/a b", at(2))]);
        let xml = sitemap_xml(&config, &urls);
        assert!(xml.contains("<loc>https://example.com/a%20b</loc>"));
        assert!(xml.contains("<lastmod>2024-05-02T00:00:00+00:00</lastmod>"));
    }

    #[test]
    fn test_write_sitemap() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        let path = write_sitemap(&site, &[Post::new("A", "/a", at(2))]).unwrap();
        assert_eq!(path, dir.path().join("public/sitemap.xml"));
        assert!(fs::read_to_string(path).unwrap().contains("/a</loc>"));
    }
}
