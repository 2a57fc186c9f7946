//! List site content

use anyhow::Result;

use crate::content::ContentLoader;
use crate::templates;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(site);

    match content_type {
        "post" | "posts" => {
            let posts = loader.load_all();
            println!("Articles ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.slug
                );
            }
        }
        "route" | "routes" => {
            let mut routes: Vec<String> = templates::page_routes()
                .into_iter()
                .map(|route| if route.is_empty() { "/".to_string() } else { route })
                .collect();
            routes.extend(loader.load_all().iter().map(|p| p.path()));

            println!("Routes ({}):", routes.len());
            for route in routes {
                println!("  {}", route);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, route", content_type);
        }
    }

    Ok(())
}
