//! RSS 2.0 feed generation.
//!
//! Drafts are dropped, the rest are sorted newest first and the most recent
//! `feed.limit` posts become items. Building the document never fails: a
//! site whose content cannot be read still gets a valid, empty feed.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rss::extension::atom::{AtomExtension, Link};
use rss::validation::Validate;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::fs;
use std::path::PathBuf;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::full_url_for;
use crate::Site;

/// Media type of the served feed
pub const CONTENT_TYPE: &str = "application/rss+xml";

const GENERATOR: &str = concat!("blogfeed ", env!("CARGO_PKG_VERSION"));

/// Turns posts into an RSS channel for one site identity
pub struct FeedAssembler<'a> {
    config: &'a SiteConfig,
}

impl<'a> FeedAssembler<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Non-draft posts, newest first, at most `feed.limit` of them
    pub fn select<'p>(&self, posts: &'p [Post]) -> Vec<&'p Post> {
        let mut selected: Vec<&Post> = posts.iter().filter(|p| !p.draft).collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));
        selected.truncate(self.config.feed.limit);
        selected
    }

    /// Build the channel. `updated` only feeds `lastBuildDate`.
    pub fn channel(&self, posts: &[Post], updated: DateTime<Utc>) -> Channel {
        let items: Vec<Item> = self
            .select(posts)
            .into_iter()
            .map(|post| self.item(post))
            .collect();

        let mut self_link = Link::default();
        self_link.set_href(self.config.feed_url());
        self_link.set_rel("self");
        self_link.set_mime_type(Some(CONTENT_TYPE.to_string()));

        let mut atom = AtomExtension::default();
        atom.set_links(vec![self_link]);

        ChannelBuilder::default()
            .title(&self.config.title)
            .link(&self.config.url)
            .description(&self.config.description)
            .language(Some(self.config.language.clone()))
            .copyright(self.config.copyright.clone())
            .generator(Some(GENERATOR.to_string()))
            .last_build_date(Some(updated.to_rfc2822()))
            .atom_ext(Some(atom))
            .items(items)
            .build()
    }

    fn item(&self, post: &Post) -> Item {
        let link = full_url_for(self.config, &post.url_path());

        let description = non_empty(&post.description);
        let content = non_empty(&post.content).or_else(|| description.clone());

        ItemBuilder::default()
            .title(Some(post.display_title()))
            .link(Some(link.clone()))
            .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
            .description(description)
            .content(content)
            .pub_date(Some(post.date.to_rfc2822()))
            .build()
    }

    /// Serialize the feed. Validation problems are logged, not returned.
    pub fn assemble(&self, posts: &[Post], updated: DateTime<Utc>) -> String {
        let channel = self.channel(posts, updated);
        if let Err(e) = channel.validate() {
            tracing::warn!("RSS validation failed: {}", e);
        }
        channel.to_string()
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Read the site's content and assemble its feed
pub fn render_feed(site: &Site, updated: DateTime<Utc>) -> String {
    let posts = site.load_posts();
    let assembler = FeedAssembler::new(&site.config);
    tracing::debug!(
        "Assembling feed from {} posts ({} selected)",
        posts.len(),
        assembler.select(&posts).len()
    );
    assembler.assemble(&posts, updated)
}

/// Write the feed for `posts` into the public directory
pub fn write_feed(site: &Site, posts: &[Post], updated: DateTime<Utc>) -> Result<PathBuf> {
    let xml = FeedAssembler::new(&site.config).assemble(posts, updated);
    let feed_path = site
        .public_dir
        .join(site.config.feed.path.trim_start_matches('/'));

    if let Some(parent) = feed_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&feed_path, xml)
        .with_context(|| format!("Failed to write feed to {}", feed_path.display()))?;

    tracing::info!("Generated {}", site.config.feed.path);
    Ok(feed_path)
}
