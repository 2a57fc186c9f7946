//! Generate static files

use anyhow::{Context, Result};
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::content::ContentLoader;
use crate::generator::Generator;
use crate::sitemap::SitemapBuilder;
use crate::Site;

/// Generate the static site, sitemap and crawler policy included
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let loader = ContentLoader::new(site);
    let posts = loader.load_all();
    tracing::info!("Loaded {} published posts", posts.len());

    let generator = Generator::new(site)?;
    generator
        .generate(&posts)
        .context("Failed to generate pages")?;

    SitemapBuilder::new(site)
        .build()
        .context("Failed to generate sitemap")?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch for file changes and regenerate
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    // Watch source directory
    watcher.watch(site.source_dir.as_ref(), notify::RecursiveMode::Recursive)?;

    // Watch config file
    let config_path = site.base_dir.join("_config.yml");
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce events
    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                // Only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, regenerating...");
                    if let Err(e) = run(site) {
                        tracing::error!("Generation failed: {}", e);
                    }
                    last_rebuild = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Continue waiting
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_run_produces_site_and_sitemap() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();
        std::fs::create_dir_all(&site.posts_dir).unwrap();
        std::fs::write(
            site.posts_dir.join("essai.html"),
            "<div class=\"article-meta hidden\">\n  <meta name=\"date\" content=\"2024-01-01\">\n</div>\n<h1>Essai</h1>\n<p>Texte.</p>",
        )
        .unwrap();

        run(&site).unwrap();

        assert!(site.public_dir.join("index.html").exists());
        assert!(site.public_dir.join("blog/index.html").exists());
        assert!(site.public_dir.join("blog/essai/index.html").exists());
        assert!(site.public_dir.join("sitemap.xml").exists());
        assert!(site.public_dir.join("robots.txt").exists());
        assert!(site.public_dir.join("atom.xml").exists());
    }

    #[test]
    fn test_scaffolded_post_appears_on_blog() {
        let temp = tempdir().unwrap();
        let site = Site::new(temp.path()).unwrap();

        crate::commands::new::run(&site, "Moteur Z-9").unwrap();
        run(&site).unwrap();

        let blog = std::fs::read_to_string(site.public_dir.join("blog/index.html")).unwrap();
        assert!(blog.contains("Moteur Z-9"));
        assert!(site.public_dir.join("blog/moteur-z-9/index.html").exists());
    }
}
