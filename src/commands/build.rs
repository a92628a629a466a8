//! Build the feed and sitemap into the public directory

use anyhow::Result;
use chrono::Utc;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::{feed, sitemap, Site, CONFIG_FILE};

/// What a build produced
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Posts read from the content directory, drafts included
    pub posts: usize,
    pub feed: Option<PathBuf>,
    pub sitemap: Option<PathBuf>,
}

/// Generate `feed.xml` and `sitemap.xml`.
///
/// A failed write is logged and the other output is still attempted.
pub fn run(site: &Site) -> Result<BuildReport> {
    let start = Instant::now();

    tracing::info!("Generating RSS feed at build time...");
    let posts = site.load_posts();
    tracing::info!("Loaded {} posts from {:?}", posts.len(), site.content_dir);

    let mut report = BuildReport {
        posts: posts.len(),
        ..Default::default()
    };

    match feed::write_feed(site, &posts, Utc::now()) {
        Ok(path) => report.feed = Some(path),
        Err(e) => tracing::error!("Error generating RSS feed: {:#}", e),
    }

    match sitemap::write_sitemap(site, &posts) {
        Ok(path) => report.sitemap = Some(path),
        Err(e) => tracing::error!("Error generating sitemap: {:#}", e),
    }

    let duration = start.elapsed();
    tracing::info!("Built in {:.2}s", duration.as_secs_f64());

    Ok(report)
}

/// Watch content and config, rebuilding on change
pub fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if site.content_dir.exists() {
        debouncer
            .watcher()
            .watch(&site.content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", site.content_dir);
    } else {
        tracing::warn!("Content directory {:?} does not exist", site.content_dir);
    }

    let config_path = site.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events.iter().filter(|e| !is_ignored(&e.path)).collect();
                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // Config may have changed too
                match Site::new(&site.base_dir) {
                    Ok(site) => {
                        if let Err(e) = run(&site) {
                            tracing::error!("Build failed: {:#}", e);
                        }
                    }
                    Err(e) => tracing::error!("Failed to reload {}: {:#}", CONFIG_FILE, e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor and VCS noise that should not trigger a rebuild
fn is_ignored(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    path_str.contains(".git")
        || path_str.contains(".DS_Store")
        || path_str.ends_with('~')
        || path_str.ends_with(".swp")
}
