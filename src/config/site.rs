//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub posts_dir: String,

    // Blog listing
    pub per_page: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Zigouplex Space".to_string(),
            description: "Leader dans le développement de lanceurs spatiaux innovants".to_string(),
            author: "Zigouplex".to_string(),
            language: "fr".to_string(),

            url: "https://www.zigouplex.space".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            posts_dir: "_posts".to_string(),

            per_page: 5,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Site URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Zigouplex Space");
        assert_eq!(config.url, "https://www.zigouplex.space");
        assert_eq!(config.language, "fr");
        assert_eq!(config.per_page, 5);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Autre Site
author: Test User
url: https://example.org/
per_page: 10
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Autre Site");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.base_url(), "https://example.org");
        assert_eq!(config.per_page, 10);
        // Unlisted fields keep their defaults
        assert_eq!(config.posts_dir, "_posts");
    }
}
