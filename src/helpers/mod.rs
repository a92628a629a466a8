//! Helper functions shared by the feed, sitemap and content modules

mod url;

pub use url::*;
