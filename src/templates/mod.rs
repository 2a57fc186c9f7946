//! Built-in zigouplex theme templates using Tera template engine
//!
//! All page templates are embedded directly in the binary. Template
//! names mirror the routes they render, so the sitemap can enumerate
//! static pages straight from this registry.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::french_date;

/// Embedded templates, keyed by route-shaped name. Underscore-prefixed
/// names and `partials/` are layout plumbing; a bracketed segment marks
/// a template rendered once per slug.
pub const TEMPLATES: [(&str, &str); 7] = [
    ("_layout.html", include_str!("zigouplex/_layout.html")),
    ("index.html", include_str!("zigouplex/index.html")),
    ("blog/index.html", include_str!("zigouplex/blog/index.html")),
    ("blog/[slug].html", include_str!("zigouplex/blog/[slug].html")),
    ("404.html", include_str!("zigouplex/404.html")),
    ("partials/nav.html", include_str!("zigouplex/partials/nav.html")),
    (
        "partials/footer.html",
        include_str!("zigouplex/partials/footer.html"),
    ),
];

/// Site-relative routes of the crawlable static pages, root first as
/// the empty string. Excludes partials, underscore-prefixed templates,
/// the 404 page and parameterized templates.
pub fn page_routes() -> Vec<String> {
    TEMPLATES
        .iter()
        .filter_map(|(name, _)| route_for(name))
        .collect()
}

fn route_for(name: &str) -> Option<String> {
    if name
        .split('/')
        .any(|part| part.starts_with('_') || part == "partials" || part == "api")
    {
        return None;
    }
    if name == "404.html" || name.contains('[') {
        return None;
    }
    let route = name.strip_suffix(".html").unwrap_or(name);
    let route = match route.strip_suffix("index") {
        Some(prefix) => prefix.trim_end_matches('/'),
        None => route,
    };
    if route.is_empty() {
        Some(String::new())
    } else {
        Some(format!("/{}", route))
    }
}

/// Template renderer with the embedded zigouplex theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Article bodies arrive pre-rendered, so autoescaping would
        // mangle them
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(TEMPLATES.to_vec())?;
        tera.register_filter("french_date", french_date_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: render an RFC 3339 or `YYYY-MM-DD` date in long French
/// form, e.g. "1 janvier 2024". Unparseable values pass through.
fn french_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("french_date", "value", String, value);
    if let Ok(date) = chrono::DateTime::parse_from_rfc3339(&s) {
        return Ok(tera::Value::String(french_date(&date)));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Ok(tera::Value::String(french_date(&date)));
    }
    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub date: String,
    pub author: Option<String>,
    pub banner: Option<String>,
    pub excerpt: String,
    pub content: String,
    pub path: String,
    pub permalink: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub total: usize,
    pub current: usize,
    pub prev: usize,
    pub prev_link: String,
    pub next: usize,
    pub next_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_routes() {
        assert_eq!(page_routes(), vec![String::new(), "/blog".to_string()]);
    }

    #[test]
    fn test_route_for_exclusions() {
        assert_eq!(route_for("_layout.html"), None);
        assert_eq!(route_for("partials/nav.html"), None);
        assert_eq!(route_for("blog/[slug].html"), None);
        assert_eq!(route_for("404.html"), None);
        assert_eq!(route_for("api/feed.html"), None);
    }

    #[test]
    fn test_route_for_pages() {
        assert_eq!(route_for("index.html").as_deref(), Some(""));
        assert_eq!(route_for("blog/index.html").as_deref(), Some("/blog"));
        assert_eq!(route_for("contact.html").as_deref(), Some("/contact"));
    }

    #[test]
    fn test_renderer_builds_all_templates() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_french_date_filter() {
        let mut args = HashMap::new();
        args.insert("x".to_string(), tera::Value::Null);
        let out = french_date_filter(&tera::Value::String("2024-01-01".into()), &args).unwrap();
        assert_eq!(out, tera::Value::String("1 janvier 2024".into()));

        let out = french_date_filter(
            &tera::Value::String("2023-08-15T10:00:00+02:00".into()),
            &args,
        )
        .unwrap();
        assert_eq!(out, tera::Value::String("15 août 2023".into()));

        let out = french_date_filter(&tera::Value::String("hier".into()), &args).unwrap();
        assert_eq!(out, tera::Value::String("hier".into()));
    }
}
