//! Clean generated files

use anyhow::Result;
use std::fs;

use crate::Site;

/// Delete the generated feed and sitemap. Other files in the public
/// directory are static assets and stay.
pub fn run(site: &Site) -> Result<()> {
    let generated = [&site.config.feed.path, &site.config.sitemap.path];

    for relative in generated {
        let path = site.public_dir.join(relative.trim_start_matches('/'));
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::info!("Deleted: {:?}", path);
        }
    }

    Ok(())
}
