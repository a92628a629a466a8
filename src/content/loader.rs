//! Content loader - loads posts from a content directory

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, LoadError, MarkdownRender, Post};

/// Loads posts from every markdown file under a root directory
pub struct ContentLoader<'a> {
    root: &'a Path,
    renderer: &'a dyn MarkdownRender,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(root: &'a Path, renderer: &'a dyn MarkdownRender) -> Self {
        Self { root, renderer }
    }

    /// Load all posts under the root, in directory walk order.
    ///
    /// Never fails: unreadable files are logged and skipped, and a missing
    /// root yields no posts.
    pub fn load_posts(&self) -> Vec<Post> {
        if !self.root.is_dir() {
            tracing::warn!("Content directory {:?} not found, no posts loaded", self.root);
            return Vec::new();
        }

        let mut posts = Vec::new();

        for path in markdown_files(self.root) {
            match self.load_post(&path) {
                Ok(post) => {
                    tracing::debug!("Loaded {} from {:?}", post.path, path);
                    posts.push(post);
                }
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, e);
                }
            }
        }

        posts
    }

    /// Load a single post from a file
    pub fn load_post(&self, path: &Path) -> Result<Post, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let date = match fm.parse_date()? {
            Some(date) => date,
            None => {
                tracing::debug!("No date in {:?}, using file modification time", path);
                modified_time(path).unwrap_or_else(Utc::now)
            }
        };

        let url_path = derive_path(self.root, path);
        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_path(&url_path));

        let mut post = Post::new(title, url_path, date);
        post.description = fm.description.unwrap_or_default();
        post.draft = fm.draft;
        post.content = self.renderer.render(body);
        post.source = path.to_path_buf();

        Ok(post)
    }
}

/// Markdown files under `root`, depth-first and sorted by name.
///
/// Entries that cannot be read are logged and left out.
pub fn markdown_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {:?}: {}", root, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_markdown_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// URL path of a content file: relative to the root, extension stripped,
/// `/`-joined and rooted.
///
/// `content/foo/bar.md` under `content` gives `/foo/bar`.
pub fn derive_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    format!("/{}", segments.join("/"))
}

/// Fallback title: the last path segment with hyphens as spaces
fn title_from_path(url_path: &str) -> String {
    url_path
        .rsplit('/')
        .next()
        .map(|name| name.replace('-', " "))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
