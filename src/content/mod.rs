//! Content module - posts, front-matter, markdown rendering and queries

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod query;

pub use error::LoadError;
pub use frontmatter::{parse_date_string, FrontMatter};
pub use markdown::{renderer_for, CommonMarkRenderer, MarkdownRender, RegexRenderer};
pub use post::{published, sort_by_date_desc, Post};
