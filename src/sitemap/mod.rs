//! Sitemap and crawler policy generation
//!
//! Enumerates the static page routes from the template registry and the
//! published articles from the content store, then writes `sitemap.xml`
//! and `robots.txt` into the public directory. Unlike post loading,
//! a failure here is fatal: a partial sitemap would silently hide pages
//! from crawlers.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;

use crate::content::meta::{self, ArticleMeta};
use crate::helpers::{date_xml, encode_segment, xml_escape};
use crate::templates;
use crate::Site;

/// One `<url>` element of the sitemap document.
struct SitemapEntry {
    loc: String,
    lastmod: DateTime<Local>,
    changefreq: &'static str,
    priority: &'static str,
}

pub struct SitemapBuilder<'a> {
    site: &'a Site,
}

impl<'a> SitemapBuilder<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Write `sitemap.xml` and `robots.txt` into the public directory.
    pub fn build(&self) -> Result<()> {
        let mut entries = self.page_entries();
        entries.extend(self.post_entries()?);

        fs::create_dir_all(&self.site.public_dir).with_context(|| {
            format!("Failed to create public dir {:?}", self.site.public_dir)
        })?;

        let sitemap_path = self.site.public_dir.join("sitemap.xml");
        fs::write(&sitemap_path, render_urlset(&entries))
            .with_context(|| format!("Failed to write {:?}", sitemap_path))?;

        let robots_path = self.site.public_dir.join("robots.txt");
        fs::write(&robots_path, self.robots())
            .with_context(|| format!("Failed to write {:?}", robots_path))?;

        tracing::info!("Generated sitemap with {} urls", entries.len());
        Ok(())
    }

    /// Entries for the crawlable static pages. Their content moves with
    /// every deploy, so lastmod is the build time.
    fn page_entries(&self) -> Vec<SitemapEntry> {
        let base = self.site.config.base_url();
        let now = Local::now();
        templates::page_routes()
            .into_iter()
            .map(|route| SitemapEntry {
                loc: format!("{}{}", base, route),
                lastmod: now,
                changefreq: "weekly",
                priority: if route.is_empty() { "1.0" } else { "0.9" },
            })
            .collect()
    }

    /// Entries for the published articles. Reads metadata only, but
    /// shares the publication predicate with the content loader so the
    /// sitemap never references a page the generator refused to build.
    fn post_entries(&self) -> Result<Vec<SitemapEntry>> {
        let posts_dir = &self.site.posts_dir;
        fs::create_dir_all(posts_dir)
            .with_context(|| format!("Failed to create content store {:?}", posts_dir))?;

        let base = self.site.config.base_url();
        let now = Local::now();
        let mut entries = Vec::new();

        let dir = fs::read_dir(posts_dir)
            .with_context(|| format!("Failed to read content store {:?}", posts_dir))?;
        for entry in dir {
            let entry = entry
                .with_context(|| format!("Failed to enumerate content store {:?}", posts_dir))?;
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|ext| ext == "html") {
                continue;
            }
            let slug = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => continue,
            };

            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let (article_meta, _) = ArticleMeta::extract(&raw);

            let date = meta::effective_date(&article_meta, &path);
            if !meta::is_published(&date, &now) {
                continue;
            }

            let lastmod = article_meta
                .parse_last_modified()
                .or_else(|| meta::file_mtime(&path))
                .unwrap_or(now);

            entries.push(SitemapEntry {
                loc: format!("{}/blog/{}", base, encode_segment(&slug)),
                lastmod,
                changefreq: "monthly",
                priority: "0.8",
            });
        }
        Ok(entries)
    }

    fn robots(&self) -> String {
        format!(
            "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
            self.site.config.base_url()
        )
    }
}

fn render_urlset(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&entry.loc)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            date_xml(&entry.lastmod)
        ));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.changefreq
        ));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}
