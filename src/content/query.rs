//! Content queries - named collections and pagination

use serde::{Deserialize, Serialize};

use super::{loader::ContentLoader, published, renderer_for, MarkdownRender, Post};
use crate::config::DEFAULT_COLLECTION;
use crate::Site;

/// Maximum items per page
pub const MAX_PER_PAGE: usize = 100;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: usize,
    /// Items per page
    pub per_page: usize,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to a minimum of 1
    /// - Per page is clamped to 1..=100
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Number of items before this page
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub collection: Option<String>,
}

impl PaginationParams {
    /// Resolve against the site default page size
    pub fn pagination(&self, default_per_page: usize) -> Pagination {
        Pagination::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(default_per_page),
        )
    }

    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or(DEFAULT_COLLECTION)
    }
}

/// One page of posts plus the totals needed to render a pager
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub pages: Vec<Post>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub posts_per_page: usize,
}

/// Paginate non-draft posts, newest first
pub fn paginate(posts: &[Post], pagination: Pagination) -> PaginationResult {
    let posts = published(posts);
    let total_count = posts.len();

    let pages: Vec<Post> = posts
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.per_page)
        .collect();

    PaginationResult {
        pages,
        current_page: pagination.page,
        total_pages: total_count.div_ceil(pagination.per_page),
        total_count,
        posts_per_page: pagination.per_page,
    }
}

/// Queries posts of a site's named collections.
///
/// Every call reads the collection from disk again; nothing is cached.
pub struct ContentQuery<'a> {
    site: &'a Site,
    renderer: Box<dyn MarkdownRender>,
}

impl<'a> ContentQuery<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            renderer: renderer_for(site.config.markdown),
        }
    }

    /// Every post in a collection, drafts included, in walk order.
    ///
    /// Unknown collections are logged and yield no posts.
    pub fn all(&self, collection: &str) -> Vec<Post> {
        match self.site.collection_dir(collection) {
            Some(dir) => ContentLoader::new(&dir, self.renderer.as_ref()).load_posts(),
            None => {
                tracing::warn!("Unknown collection {:?}", collection);
                Vec::new()
            }
        }
    }

    /// Items for one page and the total non-draft count
    pub fn page(&self, collection: &str, pagination: Pagination) -> (Vec<Post>, usize) {
        let result = self.paginate(collection, pagination);
        (result.pages, result.total_count)
    }

    pub fn paginate(&self, collection: &str, pagination: Pagination) -> PaginationResult {
        paginate(&self.all(collection), pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use chrono::{Duration, TimeZone, Utc};
    use std::fs;

    fn posts(count: usize) -> Vec<Post> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                Post::new(
                    format!("post {}", i),
                    format!("/post-{}", i),
                    base + Duration::days(i as i64),
                )
            })
            .collect()
    }

    #[test]
    fn test_pagination_clamps() {
        assert_eq!(Pagination::new(0, 0), Pagination { page: 1, per_page: 1 });
        assert_eq!(Pagination::new(3, 1000).per_page, MAX_PER_PAGE);
        assert_eq!(Pagination::new(3, 5).offset(), 10);
    }

    #[test]
    fn test_twelve_posts_five_per_page() {
        let all = posts(12);

        let first = paginate(&all, Pagination::new(1, 5));
        assert_eq!(first.total_count, 12);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.pages.len(), 5);
        assert_eq!(first.pages[0].title, "post 11");

        let last = paginate(&all, Pagination::new(3, 5));
        assert_eq!(last.pages.len(), 2);
        assert_eq!(last.current_page, 3);
        assert_eq!(last.pages[1].title, "post 0");

        let beyond = paginate(&all, Pagination::new(4, 5));
        assert!(beyond.pages.is_empty());
    }

    #[test]
    fn test_huge_page_is_empty() {
        let huge = Pagination::new(usize::MAX, 5);
        assert_eq!(huge.offset(), usize::MAX);

        let result = paginate(&[], huge);
        assert!(result.pages.is_empty());
        assert_eq!(result.current_page, usize::MAX);

        let result = paginate(&posts(12), huge);
        assert!(result.pages.is_empty());
        assert_eq!(result.total_count, 12);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn test_drafts_not_counted() {
        let mut all = posts(6);
        all[0].draft = true;

        let result = paginate(&all, Pagination::new(1, 5));
        assert_eq!(result.total_count, 5);
        assert_eq!(result.total_pages, 1);
        assert!(result.pages.iter().all(|p| !p.draft));
    }

    #[test]
    fn test_empty_collection() {
        let result = paginate(&[], Pagination::new(1, 5));
        assert_eq!(result.total_count, 0);
        assert_eq!(result.total_pages, 0);
        assert!(result.pages.is_empty());
    }

    #[test]
    fn test_params_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.pagination(5), Pagination::new(1, 5));
        assert_eq!(params.collection(), "content");
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(paginate(&posts(1), Pagination::new(1, 5))).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["postsPerPage"], 5);
        assert_eq!(json["currentPage"], 1);
    }

    #[test]
    fn test_query_named_collection() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes");
        fs::create_dir_all(&notes).unwrap();
        fs::write(notes.join("one.md"), "---\ntitle: One\ndate: 2024-01-01\n---\nx").unwrap();

        let mut config = SiteConfig::default();
        config
            .collections
            .insert("notes".to_string(), "notes".to_string());
        let site = Site::with_config(dir.path(), config);
        let query = ContentQuery::new(&site);

        let (items, total) = query.page("notes", Pagination::new(1, 5));
        assert_eq!(total, 1);
        assert_eq!(items[0].path, "/one");

        // content_dir does not exist in this site
        assert!(query.all("content").is_empty());
        assert!(query.all("unknown").is_empty());
    }
}
