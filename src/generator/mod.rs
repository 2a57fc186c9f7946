//! Static site generation - renders the public/ tree from the content
//! store and the embedded templates

use anyhow::Result;
use chrono::Local;
use std::fs;
use tera::Context;
use walkdir::WalkDir;

use crate::content::Post;
use crate::helpers::{date_xml, full_url_for, url_for, xml_escape};
use crate::templates::{ConfigData, PaginationData, PostData, TemplateRenderer};
use crate::Site;

/// How many articles the Atom feed carries
const FEED_LIMIT: usize = 20;

pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        Ok(Self {
            site: site.clone(),
            renderer,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post]) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir)?;

        // Copy source assets (images, etc.)
        self.copy_source_assets()?;

        // Sort posts by date (newest first)
        let mut sorted_posts: Vec<_> = posts.to_vec();
        sorted_posts.sort_by(|a, b| b.date.cmp(&a.date));

        let config_data = self.build_config_data();

        self.generate_home_page(&config_data)?;
        self.generate_blog_pages(&sorted_posts, &config_data)?;
        self.generate_post_pages(&sorted_posts, &config_data)?;
        self.generate_not_found_page(&config_data)?;
        self.generate_atom_feed(&sorted_posts)?;

        Ok(())
    }

    fn build_config_data(&self) -> ConfigData {
        let config = &self.site.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.base_url().to_string(),
            root: config.root.clone(),
        }
    }

    fn create_base_context(&self, config_data: &ConfigData) -> Context {
        let mut context = Context::new();
        context.insert("config", config_data);
        context.insert("current_year", &Local::now().format("%Y").to_string());
        context
    }

    fn post_data(&self, post: &Post) -> PostData {
        PostData {
            slug: post.slug.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            date: date_xml(&post.date),
            author: post.author.clone(),
            banner: post.banner.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            path: url_for(&self.site.config, &post.path()),
            permalink: full_url_for(&self.site.config, &post.path()),
        }
    }

    /// Generate the home page
    fn generate_home_page(&self, config_data: &ConfigData) -> Result<()> {
        let context = self.create_base_context(config_data);
        let html = self.renderer.render("index.html", &context)?;

        let output_path = self.site.public_dir.join("index.html");
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Generate the blog index pages (with pagination)
    fn generate_blog_pages(&self, posts: &[Post], config_data: &ConfigData) -> Result<()> {
        let per_page = self.site.config.per_page;
        // An empty blog still gets its index page
        let total_pages = posts.len().div_ceil(per_page).max(1);

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(posts.len());
            let page_posts: Vec<PostData> =
                posts[start..end].iter().map(|p| self.post_data(p)).collect();

            let pagination = PaginationData {
                total: total_pages,
                current: page_num,
                prev: page_num.saturating_sub(1),
                prev_link: if page_num > 1 {
                    if page_num == 2 {
                        url_for(&self.site.config, "/blog")
                    } else {
                        url_for(&self.site.config, &format!("/blog/page/{}/", page_num - 1))
                    }
                } else {
                    String::new()
                },
                next: if page_num < total_pages { page_num + 1 } else { 0 },
                next_link: if page_num < total_pages {
                    url_for(&self.site.config, &format!("/blog/page/{}/", page_num + 1))
                } else {
                    String::new()
                },
            };

            let mut context = self.create_base_context(config_data);
            context.insert("posts", &page_posts);
            context.insert("pagination", &pagination);

            let html = self.renderer.render("blog/index.html", &context)?;

            let output_path = if page_num == 1 {
                self.site.public_dir.join("blog/index.html")
            } else {
                self.site
                    .public_dir
                    .join(format!("blog/page/{}/index.html", page_num))
            };

            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, html)?;
            tracing::debug!("Generated: {:?}", output_path);
        }

        Ok(())
    }

    /// Generate individual article pages
    fn generate_post_pages(&self, posts: &[Post], config_data: &ConfigData) -> Result<()> {
        for post in posts {
            let mut context = self.create_base_context(config_data);
            context.insert("post", &self.post_data(post));

            let html = self.renderer.render("blog/[slug].html", &context)?;

            let output_path = self
                .site
                .public_dir
                .join("blog")
                .join(&post.slug)
                .join("index.html");
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, html)?;
            tracing::debug!("Generated: {:?}", output_path);
        }

        Ok(())
    }

    fn generate_not_found_page(&self, config_data: &ConfigData) -> Result<()> {
        let context = self.create_base_context(config_data);
        let html = self.renderer.render("404.html", &context)?;
        fs::write(self.site.public_dir.join("404.html"), html)?;
        Ok(())
    }

    /// Generate the Atom feed with the most recent articles
    fn generate_atom_feed(&self, posts: &[Post]) -> Result<()> {
        let base_url = self.site.config.base_url();

        let mut feed = String::new();
        feed.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        feed.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
        feed.push_str(&format!(
            "  <title>{}</title>\n",
            xml_escape(&self.site.config.title)
        ));
        feed.push_str(&format!(
            "  <link href=\"{}/atom.xml\" rel=\"self\"/>\n",
            base_url
        ));
        feed.push_str(&format!("  <link href=\"{}/\"/>\n", base_url));
        feed.push_str(&format!(
            "  <updated>{}</updated>\n",
            Local::now().to_rfc3339()
        ));
        feed.push_str(&format!("  <id>{}/</id>\n", base_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            xml_escape(&self.site.config.author)
        ));

        for post in posts.iter().take(FEED_LIMIT) {
            let link = format!("{}{}", base_url, post.path());
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", xml_escape(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
            feed.push_str(&format!("    <id>{}</id>\n", link));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                post.date.to_rfc3339()
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                post.date.to_rfc3339()
            ));
            // Feed readers resolve nothing, so relative URLs must become
            // absolute and control characters must go
            let content = convert_relative_urls_to_absolute(&post.content, base_url);
            let content = strip_invalid_xml_chars(&content);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                content
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        let output_path = self.site.public_dir.join("atom.xml");
        fs::write(&output_path, feed)?;
        tracing::info!("Generated atom.xml");

        Ok(())
    }

    /// Copy source assets (images, etc.) into public/, skipping the
    /// underscore-prefixed directories such as the content store
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.site.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            if relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('_'))
            {
                continue;
            }

            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLoader;
    use tempfile::tempdir;

    fn write_post(site: &Site, slug: &str, date: &str, title: &str) {
        fs::create_dir_all(&site.posts_dir).unwrap();
        fs::write(
            site.posts_dir.join(format!("{}.html", slug)),
            format!(
                "<div class=\"article-meta hidden\">\n  <meta name=\"author\" content=\"A. Zig\">\n  <meta name=\"date\" content=\"{}\">\n</div>\n<h1>{}</h1>\n<p>Extrait de {}.</p>",
                date, title, title
            ),
        )
        .unwrap();
    }

    fn generate(site: &Site) {
        let posts = ContentLoader::new(site).load_all();
        Generator::new(site).unwrap().generate(&posts).unwrap();
    }

    #[test]
    fn test_generate_full_site() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(&site, "ignition", "2024-01-01", "Ignition");

        generate(&site);

        let home = fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert!(home.contains("Découvrez l'Espace grâce aux lanceurs Zigouplex"));

        let blog = fs::read_to_string(site.public_dir.join("blog/index.html")).unwrap();
        assert!(blog.contains("Ignition"));
        assert!(blog.contains("1 janvier 2024"));
        assert!(blog.contains("href=\"/blog/ignition\""));

        let post = fs::read_to_string(site.public_dir.join("blog/ignition/index.html")).unwrap();
        assert!(post.contains("article-header"));
        assert!(post.contains("Par A. Zig&nbsp;Le&nbsp;1 janvier 2024"));

        assert!(site.public_dir.join("404.html").exists());

        let feed = fs::read_to_string(site.public_dir.join("atom.xml")).unwrap();
        assert!(feed.contains("<title>Ignition</title>"));
        assert!(feed.contains("https://www.zigouplex.space/blog/ignition"));
    }

    #[test]
    fn test_blog_pagination() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        for i in 1..=7 {
            write_post(&site, &format!("article-{}", i), &format!("2024-01-0{}", i), "Titre");
        }

        generate(&site);

        let first = fs::read_to_string(site.public_dir.join("blog/index.html")).unwrap();
        assert_eq!(first.matches("<article>").count(), 5);
        assert!(first.contains("href=\"/blog/page/2/\""));

        let second = fs::read_to_string(site.public_dir.join("blog/page/2/index.html")).unwrap();
        assert_eq!(second.matches("<article>").count(), 2);
        assert!(second.contains("href=\"/blog\""));
        assert!(second.contains("Page 2 / 2"));
    }

    #[test]
    fn test_empty_blog_still_renders_index() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();

        generate(&site);

        let blog = fs::read_to_string(site.public_dir.join("blog/index.html")).unwrap();
        assert!(blog.contains("Aucun article disponible pour le moment."));
    }

    #[test]
    fn test_assets_copied_but_store_skipped() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        write_post(&site, "article", "2024-01-01", "Titre");
        fs::create_dir_all(site.source_dir.join("images")).unwrap();
        fs::write(site.source_dir.join("images/logo.webp"), b"webp").unwrap();

        generate(&site);

        assert!(site.public_dir.join("images/logo.webp").exists());
        assert!(!site.public_dir.join("_posts/article.html").exists());
    }

    #[test]
    fn test_convert_relative_urls() {
        let out = convert_relative_urls_to_absolute(
            r#"<img src="/images/a.webp"> <a href="/blog/x">x</a>"#,
            "https://www.zigouplex.space",
        );
        assert!(out.contains("src=\"https://www.zigouplex.space/images/a.webp\""));
        assert!(out.contains("href=\"https://www.zigouplex.space/blog/x\""));
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("ab\u{0000}c\nd"), "abc\nd");
    }
}
