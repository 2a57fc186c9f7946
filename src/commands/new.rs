//! Create a new article

use anyhow::Result;
use std::fs;

use crate::helpers::html_escape;
use crate::Site;

/// Scaffold a new article in the content store
pub fn run(site: &Site, title: &str) -> Result<()> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);

    fs::create_dir_all(&site.posts_dir)?;
    let file_path = site.posts_dir.join(format!("{}.html", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        r#"<div class="article-meta hidden">
  <meta name="author" content="{}">
  <meta name="date" content="{}">
  <meta name="banner" content="/images/zigouplex.webp">
</div>

<h1>{}</h1>

<p>À rédiger.</p>
"#,
        site.config.author,
        now.format("%Y-%m-%d"),
        html_escape(title)
    );

    fs::write(&file_path, content)?;
    println!("Created: {:?}", file_path);

    Ok(())
}
