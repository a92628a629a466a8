//! List posts, one page at a time

use anyhow::Result;

use crate::config::DEFAULT_COLLECTION;
use crate::content::query::{ContentQuery, Pagination};
use crate::Site;

/// Print one page of published posts from a collection
pub fn run(site: &Site, collection: &str, page: usize, per_page: Option<usize>) -> Result<()> {
    if site.collection_dir(collection).is_none() {
        let mut known: Vec<&str> = site.config.collections.keys().map(String::as_str).collect();
        if !known.contains(&DEFAULT_COLLECTION) {
            known.push(DEFAULT_COLLECTION);
        }
        known.sort_unstable();
        anyhow::bail!(
            "Unknown collection: {}. Available: {}",
            collection,
            known.join(", ")
        );
    }

    let pagination = Pagination::new(page, per_page.unwrap_or(site.config.per_page));
    let result = ContentQuery::new(site).paginate(collection, pagination);

    println!(
        "Posts ({} total, page {}/{}):",
        result.total_count,
        result.current_page,
        result.total_pages.max(1)
    );
    for post in &result.pages {
        println!(
            "  {} - {} [{}]",
            post.date.format("%Y-%m-%d"),
            post.display_title(),
            post.url_path()
        );
    }

    Ok(())
}
