use chrono::{DateTime, Local};
use serde::Serialize;

/// A published article, fully transformed and ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Store file name without the `.html` extension.
    pub slug: String,
    /// Text of the first `<h1>`, tags stripped, or the slug when absent.
    pub title: String,
    pub subtitle: Option<String>,
    pub date: DateTime<Local>,
    pub author: Option<String>,
    pub banner: Option<String>,
    /// First paragraph, tags stripped, capped at 500 characters.
    pub excerpt: String,
    /// Article header fragment plus the rewritten body.
    pub content: String,
}

impl Post {
    /// Site-relative route of the rendered article page.
    pub fn path(&self) -> String {
        format!("/blog/{}", self.slug)
    }
}
