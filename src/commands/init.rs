//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Site;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("source/_posts"))?;
    fs::create_dir_all(target_dir.join("source/images"))?;

    let config_content = r#"# Site
title: Zigouplex Space
description: Leader dans le développement de lanceurs spatiaux innovants
author: Zigouplex
language: fr

# URL
url: https://www.zigouplex.space
root: /

# Directory
source_dir: source
public_dir: public
posts_dir: _posts

# Pagination
per_page: 5
"#;
    fs::write(target_dir.join("_config.yml"), config_content)?;

    // Create a sample article
    let now = chrono::Local::now();
    let sample_post = format!(
        r#"<div class="article-meta hidden">
  <meta name="author" content="Zigouplex">
  <meta name="date" content="{}">
  <meta name="subtitle" content="Le blog décolle">
</div>

<h1>Bienvenue sur le blog</h1>

<p>Premier article du blog Zigouplex Space. Vous trouverez ici les actualités de nos lanceurs, de leurs moteurs et de leurs missions.</p>

<h2>Pour commencer</h2>

<ul>
  <li>Créer un article : <code>zigouplex-site new "Mon article"</code></li>
  <li>Générer le site : <code>zigouplex-site generate</code></li>
  <li>Lancer le serveur de développement : <code>zigouplex-site server</code></li>
</ul>
"#,
        now.format("%Y-%m-%d")
    );
    fs::write(target_dir.join("source/_posts/bienvenue.html"), sample_post)?;

    Ok(())
}

/// Run the init command with an existing site instance
pub fn run(site: &Site) -> Result<()> {
    init_site(&site.base_dir)
}
