//! HTTP server: feed, sitemap and post listing endpoints
//!
//! Every request reads the content directory again. Handlers never turn a
//! content problem into an HTTP error; they answer with an empty feed or
//! list instead.

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::query::{ContentQuery, PaginationParams, PaginationResult};
use crate::content::Post;
use crate::feed::{self, FeedAssembler};
use crate::sitemap::{self, SitemapUrl};
use crate::Site;

/// Route of the sitemap URL source
pub const SITEMAP_URLS_ROUTE: &str = "/api/__sitemap__/urls";

/// Server state
struct ServerState {
    site: Site,
}

/// Build the application router
pub fn router(site: Site) -> Router {
    let feed_route = format!("/{}", site.config.feed.path.trim_start_matches('/'));
    let sitemap_route = format!("/{}", site.config.sitemap.path.trim_start_matches('/'));
    let public_dir = site.public_dir.clone();

    let state = Arc::new(ServerState { site });

    Router::new()
        .route(&feed_route, get(feed_handler))
        .route(&sitemap_route, get(sitemap_xml_handler))
        .route(SITEMAP_URLS_ROUTE, get(sitemap_urls_handler))
        .route("/api/posts", get(posts_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!(
        "Feed at http://{}:{}/{}",
        ip,
        port,
        site.config.feed.path.trim_start_matches('/')
    );
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(site.clone())).await?;

    Ok(())
}

/// Load posts on the blocking pool. A failed task is logged and reads as
/// an empty site.
async fn load_posts(state: &Arc<ServerState>) -> Vec<Post> {
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || state.site.load_posts()).await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("Loading posts failed: {}", e);
            Vec::new()
        }
    }
}

/// GET /feed.xml - RSS 2.0 feed of recent posts
async fn feed_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let now = Utc::now();
    let task_state = Arc::clone(&state);
    let xml = match tokio::task::spawn_blocking(move || feed::render_feed(&task_state.site, now))
        .await
    {
        Ok(xml) => xml,
        Err(e) => {
            tracing::error!("Rendering feed failed: {}", e);
            FeedAssembler::new(&state.site.config).assemble(&[], now)
        }
    };
    ([(header::CONTENT_TYPE, feed::CONTENT_TYPE)], xml)
}

/// GET /api/__sitemap__/urls - `{loc, lastmod}` for every published post
async fn sitemap_urls_handler(State(state): State<Arc<ServerState>>) -> Json<Vec<SitemapUrl>> {
    let posts = load_posts(&state).await;
    Json(sitemap::sitemap_urls(&posts))
}

/// GET /sitemap.xml
async fn sitemap_xml_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let posts = load_posts(&state).await;
    let xml = sitemap::sitemap_xml(&state.site.config, &sitemap::sitemap_urls(&posts));
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

/// GET /api/posts?page=&per_page=&collection= - one page of posts.
///
/// A query string that does not parse is answered with the first page.
async fn posts_handler(
    State(state): State<Arc<ServerState>>,
    params: Option<Query<PaginationParams>>,
) -> Json<PaginationResult> {
    let params = match params {
        Some(Query(params)) => params,
        None => {
            tracing::debug!("Invalid pagination query, using defaults");
            PaginationParams::default()
        }
    };
    let pagination = params.pagination(state.site.config.per_page);
    let collection = params.collection().to_string();

    let task_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        ContentQuery::new(&task_state.site).paginate(&collection, pagination)
    })
    .await;

    match result {
        Ok(result) => Json(result),
        Err(e) => {
            tracing::error!("Pagination query failed: {}", e);
            Json(crate::content::query::paginate(&[], pagination))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::fs;
    use std::path::Path;
    use tower::ServiceExt;

    fn site_with_posts(root: &Path, count: usize) -> Site {
        let content = root.join("content");
        fs::create_dir_all(&content).unwrap();
        for i in 0..count {
            fs::write(
                content.join(format!("post-{:02}.md", i)),
                format!("---\ntitle: Post {i}\ndate: 2024-01-{:02}\n---\nBody {i}\n", i + 1),
            )
            .unwrap();
        }
        fs::write(
            content.join("wip.md"),
            "---\ntitle: WIP\ndate: 2025-01-01\ndraft: true\n---\nwip\n",
        )
        .unwrap();

        let config = SiteConfig {
            url: "https://blog.example.com".to_string(),
            ..Default::default()
        };
        Site::with_config(root, config)
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_feed_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(site_with_posts(dir.path(), 3));

        let (status, content_type, body) = get_body(app, "/feed.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/rss+xml"));

        let channel = rss::Channel::read_from(body.as_bytes()).unwrap();
        let titles: Vec<_> = channel.items().iter().filter_map(|i| i.title()).collect();
        assert_eq!(titles, ["Post 2", "Post 1", "Post 0"]);
    }

    #[tokio::test]
    async fn test_feed_without_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(Site::with_config(dir.path(), SiteConfig::default()));

        let (status, content_type, body) = get_body(app, "/feed.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/rss+xml"));
        let channel = rss::Channel::read_from(body.as_bytes()).unwrap();
        assert!(channel.items().is_empty());
    }

    #[tokio::test]
    async fn test_sitemap_urls_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(site_with_posts(dir.path(), 2));

        let (status, _, body) = get_body(app, SITEMAP_URLS_ROUTE).await;
        assert_eq!(status, StatusCode::OK);

        let urls: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(urls.as_array().unwrap().len(), 2);
        assert_eq!(urls[0]["loc"], "/post-01");
        assert_eq!(urls[0]["lastmod"], "2024-01-02T00:00:00Z");
    }

    #[tokio::test]
    async fn test_sitemap_urls_without_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(Site::with_config(dir.path(), SiteConfig::default()));

        let (status, _, body) = get_body(app, SITEMAP_URLS_ROUTE).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_sitemap_xml_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(site_with_posts(dir.path(), 1));

        let (status, content_type, body) = get_body(app, "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/xml"));
        assert!(body.contains("<loc>https://blog.example.com/post-00</loc>"));
    }

    #[tokio::test]
    async fn test_posts_pagination() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(site_with_posts(dir.path(), 12));

        let (status, _, body) = get_body(app.clone(), "/api/posts?page=3").await;
        assert_eq!(status, StatusCode::OK);
        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["totalCount"], 12);
        assert_eq!(page["totalPages"], 3);
        assert_eq!(page["currentPage"], 3);
        assert_eq!(page["pages"].as_array().unwrap().len(), 2);

        let (_, _, body) = get_body(app, "/api/posts?collection=nope").await;
        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["totalCount"], 0);
    }

    #[tokio::test]
    async fn test_posts_invalid_query_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(site_with_posts(dir.path(), 7));

        for uri in ["/api/posts?page=abc", "/api/posts?per_page=-1&page=2"] {
            let (status, _, body) = get_body(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            let page: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(page["currentPage"], 1);
            assert_eq!(page["postsPerPage"], 5);
            assert_eq!(page["totalCount"], 7);
            assert_eq!(page["pages"].as_array().unwrap().len(), 5);
        }
    }

    #[tokio::test]
    async fn test_posts_huge_page_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(site_with_posts(dir.path(), 3));

        let uri = format!("/api/posts?page={}", usize::MAX);
        let (status, _, body) = get_body(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["totalCount"], 3);
        assert!(page["pages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let site = site_with_posts(dir.path(), 1);
        fs::create_dir_all(&site.public_dir).unwrap();
        fs::write(site.public_dir.join("robots.txt"), "User-agent: *\n").unwrap();
        let app = router(site);

        let (status, _, body) = get_body(app.clone(), "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User-agent: *\n");

        let (status, _, _) = get_body(app, "/missing.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
