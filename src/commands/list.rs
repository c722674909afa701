//! List site content

use anyhow::Result;
use std::collections::BTreeMap;

use crate::content::loader::ContentLoader;
use crate::content::Page;
use crate::Jekyll;

/// List site content by type
pub fn run(site: &Jekyll, content_type: &str) -> Result<()> {
    let posts = ContentLoader::new(site).load_posts()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source
                );
            }
        }
        "category" | "categories" => {
            let (categories, uncategorized) = category_counts(&posts);
            println!("Categories ({}):", categories.len());
            for (category, count) in categories {
                println!("  {} ({})", category, count);
            }
            if uncategorized > 0 {
                println!("  {} posts declare no categories", uncategorized);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category",
                content_type
            );
        }
    }

    Ok(())
}

/// Posts per category, most used first, and the number of posts without categories
fn category_counts(posts: &[Page]) -> (Vec<(&str, usize)>, usize) {
    let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
    let mut uncategorized = 0;
    for post in posts {
        if post.categories.is_none() {
            uncategorized += 1;
        }
        for category in post.category_names() {
            *categories.entry(category).or_insert(0) += 1;
        }
    }

    let mut categories: Vec<_> = categories.into_iter().collect();
    // Stable: equal counts stay alphabetical
    categories.sort_by(|a, b| b.1.cmp(&a.1));
    (categories, uncategorized)
}
