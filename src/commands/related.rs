//! Show the related pages of a post

use anyhow::{anyhow, Result};

use crate::content::loader::ContentLoader;
use crate::filters::related_pages;
use crate::Jekyll;

/// Print the posts related to the post titled `title`
pub fn run(site: &Jekyll, title: &str) -> Result<()> {
    let posts = ContentLoader::new(site).load_posts()?;

    let query = posts
        .iter()
        .find(|p| p.title == title)
        .ok_or_else(|| anyhow!("No post titled {:?}", title))?;

    let related = related_pages(query, &posts)?;

    println!("Related to {:?} ({}):", query.title, related.len());
    for post in related {
        println!("  {} - {} [{}]", post.date.format("%Y-%m-%d"), post.title, post.url);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_title() {
        let dir = TempDir::new().unwrap();
        let site = Jekyll::new(dir.path()).unwrap();
        let err = run(&site, "Missing").unwrap_err();
        assert!(err.to_string().contains("No post titled"));
    }

    #[test]
    fn test_invalid_corpus_propagates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("_posts")).unwrap();
        fs::write(
            dir.path().join("_posts/2020-01-01-a.md"),
            "---\ntitle: A\ncategories: [x]\n---\n",
        )
        .unwrap();
        fs::write(dir.path().join("_posts/2020-01-02-b.md"), "---\ntitle: B\n---\n").unwrap();

        let site = Jekyll::new(dir.path()).unwrap();
        let err = run(&site, "A").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::Error>(),
            Some(crate::Error::InvalidInput(_))
        ));
    }
}
