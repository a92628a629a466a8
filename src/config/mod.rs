//! Configuration module

mod site;

pub use site::FeedConfig;
pub use site::MarkdownEngine;
pub use site::SiteConfig;
pub use site::SitemapConfig;
pub use site::DEFAULT_COLLECTION;
