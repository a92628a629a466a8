//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::helpers::humanize_slug;

/// A blog post, rebuilt from its source file on every run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// URL path, always starting with `/`
    pub path: String,

    /// Short summary, empty when not given
    pub description: String,

    /// Publication date
    pub date: DateTime<Utc>,

    /// Drafts are excluded from the feed, sitemap and pagination
    pub draft: bool,

    /// Rendered HTML content
    pub content: String,

    /// Full source file path
    #[serde(skip)]
    pub source: PathBuf,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: impl Into<String>, path: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            description: String::new(),
            date,
            draft: false,
            content: String::new(),
            source: PathBuf::new(),
        }
    }

    /// URL path for this post.
    ///
    /// Posts that did not come from a file may lack a path; those fall back
    /// to a slug of the title.
    pub fn url_path(&self) -> String {
        if self.path.is_empty() {
            let slug = slug::slugify(&self.title);
            if slug.is_empty() {
                "/untitled".to_string()
            } else {
                format!("/{}", slug)
            }
        } else if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }

    /// Title for display, or a humanized path when the title is blank
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            let humanized = humanize_slug(&self.url_path());
            if humanized.is_empty() {
                "Untitled".to_string()
            } else {
                humanized
            }
        } else {
            self.title.clone()
        }
    }
}

/// Sort newest first. The sort is stable, so equal dates keep their order.
pub fn sort_by_date_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Non-draft posts, newest first
pub fn published(posts: &[Post]) -> Vec<Post> {
    let mut posts: Vec<Post> = posts.iter().filter(|p| !p.draft).cloned().collect();
    sort_by_date_desc(&mut posts);
    posts
}
