//! blogfeed: a markdown blog content pipeline
//!
//! Reads a tree of markdown posts, renders them to HTML and publishes them
//! as an RSS 2.0 feed, a sitemap and a paginated post listing, either from
//! a small HTTP server or as files written at build time.

pub mod commands;
pub mod config;
pub mod content;
pub mod feed;
pub mod helpers;
pub mod server;
pub mod sitemap;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the site configuration file in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A blog site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content (markdown) directory
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Absolute directory of a named collection
    pub fn collection_dir(&self, name: &str) -> Option<PathBuf> {
        self.config
            .collection_dir(name)
            .map(|dir| self.base_dir.join(dir))
    }

    /// Load every post in the content directory, drafts included
    pub fn load_posts(&self) -> Vec<content::Post> {
        let renderer = content::renderer_for(self.config.markdown);
        content::loader::ContentLoader::new(&self.content_dir, renderer.as_ref()).load_posts()
    }

    /// Remove generated files from the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
