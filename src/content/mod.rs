//! Content pipeline - the article store and the loader that turns raw
//! files into renderable posts

mod loader;
pub mod meta;
mod post;
pub mod rewrite;

pub use loader::{ContentLoader, EXCERPT_LENGTH};
pub use meta::{is_published, ArticleMeta};
pub use post::Post;
