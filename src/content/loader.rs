//! Content loader - derives post records from the content store

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::Path;

use super::meta::{effective_date, is_published, ArticleMeta};
use super::{rewrite, Post};
use crate::helpers::{strip_html, truncate_chars};
use crate::Site;

/// Excerpts keep at most this many characters of the first paragraph.
pub const EXCERPT_LENGTH: usize = 500;

/// Loads articles from the content store under `source/_posts`.
pub struct ContentLoader<'a> {
    site: &'a Site,
}

impl<'a> ContentLoader<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// All slugs currently in the store, in directory listing order.
    /// A missing store directory is created and yields no slugs.
    pub fn slugs(&self) -> Vec<String> {
        let posts_dir = &self.site.posts_dir;
        if let Err(e) = fs::create_dir_all(posts_dir) {
            tracing::error!("Failed to create content store {:?}: {}", posts_dir, e);
            return Vec::new();
        }
        let entries = match fs::read_dir(posts_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Failed to read content store {:?}: {}", posts_dir, e);
                return Vec::new();
            }
        };
        entries
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
                    path.file_stem().map(|s| s.to_string_lossy().into_owned())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Load one post by slug (a trailing `.html` is tolerated).
    ///
    /// Yields `None` for a missing file, an unreadable one (logged and
    /// skipped so one bad file never sinks a build) or a future-dated
    /// article.
    pub fn load(&self, slug: &str) -> Option<Post> {
        let slug = slug.strip_suffix(".html").unwrap_or(slug);
        let path = self.site.posts_dir.join(format!("{}.html", slug));
        if !path.is_file() {
            return None;
        }
        match self.read_post(slug, &path) {
            Ok(post) => post,
            Err(e) => {
                tracing::warn!("Failed to load post {:?}: {}", path, e);
                None
            }
        }
    }

    /// Load every published post, newest first.
    pub fn load_all(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .slugs()
            .iter()
            .filter_map(|slug| self.load(slug))
            .collect();

        // Sort by date descending (newest first)
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }

    fn read_post(&self, slug: &str, path: &Path) -> Result<Option<Post>> {
        let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let (meta, body) = ArticleMeta::extract(&raw);

        let date = effective_date(&meta, path);
        if !is_published(&date, &Local::now()) {
            tracing::debug!("Skipping future-dated post: {}", slug);
            return Ok(None);
        }

        let heading = rewrite::first_heading_html(&body);
        let title = heading
            .as_deref()
            .map(strip_html)
            .unwrap_or_else(|| slug.to_string());
        let excerpt = rewrite::first_paragraph_html(&body)
            .map(|p| truncate_chars(&strip_html(&p), EXCERPT_LENGTH))
            .unwrap_or_default();

        let body = rewrite::strip_first_heading(&body);
        let body = rewrite::apply_article_classes(&body);
        let byline_author = meta.author.as_deref().unwrap_or(&self.site.config.author);
        let content =
            rewrite::compose_article(heading.as_deref(), &meta, byline_author, &date, &body);

        Ok(Some(Post {
            slug: slug.to_string(),
            title,
            subtitle: meta.subtitle,
            date,
            author: meta.author,
            banner: meta.banner,
            excerpt,
            content,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_post(site: &Site, name: &str, content: &str) {
        fs::create_dir_all(&site.posts_dir).unwrap();
        fs::write(site.posts_dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_full_article() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(
            &site,
            "ignition.html",
            r#"<div class="article-meta hidden">
  <meta name="author" content="A. Zig">
  <meta name="date" content="2024-01-01">
</div>
<h1>Ignition</h1>
<p>First flight.</p>"#,
        );

        let loader = ContentLoader::new(&site);
        let post = loader.load("ignition").unwrap();
        assert_eq!(post.slug, "ignition");
        assert_eq!(post.title, "Ignition");
        assert_eq!(post.author.as_deref(), Some("A. Zig"));
        assert_eq!(post.excerpt, "First flight.");
        assert_eq!(post.path(), "/blog/ignition");
        assert!(post.content.contains("Par A. Zig&nbsp;Le&nbsp;1 janvier 2024"));
        assert!(post.content.contains(r#"<p class="mb-6 leading-relaxed">First flight.</p>"#));
        assert!(!post.content.contains("article-meta"));
        assert!(!post.content.contains("<h1>Ignition</h1>"));
    }

    #[test]
    fn test_load_accepts_html_suffix() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(&site, "essai.html", "<h1>Essai</h1>");

        let loader = ContentLoader::new(&site);
        assert!(loader.load("essai.html").is_some());
    }

    #[test]
    fn test_load_missing_post() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        fs::create_dir_all(&site.posts_dir).unwrap();

        let loader = ContentLoader::new(&site);
        assert!(loader.load("fantome").is_none());
    }

    #[test]
    fn test_title_and_author_fallbacks() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(&site, "sans-titre.html", "<p>Corps seulement.</p>");

        let loader = ContentLoader::new(&site);
        let post = loader.load("sans-titre").unwrap();
        assert_eq!(post.title, "sans-titre");
        assert_eq!(post.author, None);
        assert!(post.content.contains("Sans titre"));
        // byline falls back to the configured site author
        assert!(post.content.contains("Par Zigouplex&nbsp;Le&nbsp;"));
    }

    #[test]
    fn test_future_post_is_unpublished() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(
            &site,
            "futur.html",
            r#"<div class="article-meta hidden">
  <meta name="date" content="2099-01-01">
</div>
<h1>Futur</h1>"#,
        );

        let loader = ContentLoader::new(&site);
        assert!(loader.load("futur").is_none());
        assert!(loader.load_all().is_empty());
    }

    #[test]
    fn test_unreadable_post_is_skipped() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(
            &site,
            "bon.html",
            r#"<div class="article-meta hidden">
  <meta name="date" content="2024-01-01">
</div>
<h1>Bon</h1>"#,
        );
        fs::write(site.posts_dir.join("casse.html"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let loader = ContentLoader::new(&site);
        let posts = loader.load_all();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "bon");
    }

    #[test]
    fn test_load_all_sorted_newest_first() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        for (slug, date) in [
            ("ancien", "2022-05-01"),
            ("recent", "2024-03-01"),
            ("moyen", "2023-11-15"),
        ] {
            write_post(
                &site,
                &format!("{}.html", slug),
                &format!(
                    "<div class=\"article-meta hidden\">\n  <meta name=\"date\" content=\"{}\">\n</div>\n<h1>{}</h1>",
                    date, slug
                ),
            );
        }

        let loader = ContentLoader::new(&site);
        let slugs: Vec<String> = loader.load_all().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["recent", "moyen", "ancien"]);
    }

    #[test]
    fn test_slugs_creates_missing_store() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        assert!(!site.posts_dir.exists());

        let loader = ContentLoader::new(&site);
        assert!(loader.slugs().is_empty());
        assert!(site.posts_dir.exists());
    }

    #[test]
    fn test_slugs_ignores_foreign_files() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(&site, "article.html", "<h1>A</h1>");
        fs::write(site.posts_dir.join("notes.txt"), "brouillon").unwrap();
        fs::create_dir_all(site.posts_dir.join("dossier")).unwrap();

        let loader = ContentLoader::new(&site);
        assert_eq!(loader.slugs(), vec!["article".to_string()]);
    }
}
