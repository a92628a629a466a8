//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the collection that always maps to `content_dir`
pub const DEFAULT_COLLECTION: &str = "content";

/// Main site configuration
///
/// This is the site identity shared by the feed, the sitemap and the
/// pagination query. It is loaded once and passed to each component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub copyright: Option<String>,

    // URL
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    #[serde(default)]
    pub collections: HashMap<String, String>,

    // Writing
    pub markdown: MarkdownEngine,

    // Pagination
    pub per_page: usize,

    // Outputs
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),
            copyright: None,

            url: "http://example.com".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            collections: HashMap::new(),

            markdown: MarkdownEngine::default(),

            per_page: 5,

            feed: FeedConfig::default(),
            sitemap: SitemapConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Site URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Absolute URL of the RSS feed
    pub fn feed_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url(),
            self.feed.path.trim_start_matches('/')
        )
    }

    /// Directory (relative to the site root) backing a named collection
    pub fn collection_dir(&self, name: &str) -> Option<&str> {
        match self.collections.get(name) {
            Some(dir) => Some(dir.as_str()),
            None if name == DEFAULT_COLLECTION => Some(self.content_dir.as_str()),
            None => None,
        }
    }
}

/// Markdown engine used to render post bodies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownEngine {
    /// Minimal ordered regex substitutions
    #[default]
    Regex,
    /// CommonMark via pulldown-cmark
    CommonMark,
}

/// RSS feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Output path relative to the public directory, also the served route
    pub path: String,
    /// Maximum number of items in the feed
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: "feed.xml".to_string(),
            limit: 20,
        }
    }
}

/// Sitemap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub path: String,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            path: "sitemap.xml".to_string(),
        }
    }
}
