//! Helper functions shared by the generator, the sitemap builder
//! and the page templates

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
