//! Content loader - loads posts from the source directory

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::frontmatter::parse_date_string;
use super::markdown::HeadingAnchor;
use super::{FrontMatter, MarkdownRenderer, Page};
use crate::Jekyll;

lazy_static! {
    /// `2014-01-05-hello-world.md` -> date and slug
    static ref POST_FILENAME: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").unwrap();
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Jekyll,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Jekyll) -> Self {
        let markdown = &site.config.markdown;
        let mut renderer =
            MarkdownRenderer::with_options(&markdown.highlight_theme, markdown.line_numbers);
        if markdown.heading_anchors {
            renderer = renderer.with_heading_anchor(HeadingAnchor {
                icon: markdown.anchor_icon.clone(),
                stamp: site.build_stamp,
            });
        }
        Self { site, renderer }
    }

    /// Load all posts from `_posts`, newest first
    pub fn load_posts(&self) -> Result<Vec<Page>> {
        let posts_dir = self.site.source_dir.join("_posts");
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&posts_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match self.load_post(path) {
                    Ok(post) => {
                        if post.published || self.site.config.show_drafts {
                            posts.push(post);
                        } else {
                            tracing::debug!("Skipping unpublished post {:?}", path);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load post {:?}: {:#}", path, e);
                    }
                }
            }
        }

        // Stable: equal dates keep file-name order
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Page> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)
            .with_context(|| format!("invalid front matter in {:?}", path))?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();
        let (file_date, slug) = split_post_filename(&stem);

        let file_modified = fs::metadata(path)?
            .modified()
            .ok()
            .map(DateTime::<Local>::from);

        let date = fm
            .parse_date()
            .or(file_date)
            .unwrap_or_else(|| file_modified.unwrap_or_else(Local::now));

        let title = fm.title.clone().unwrap_or_else(|| titleize(&slug));

        let source = path
            .strip_prefix(&self.site.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let categories = fm.categories();

        let url = match &fm.permalink {
            Some(permalink) => with_baseurl(&self.site.config.baseurl, permalink),
            None => self.generate_permalink(
                &date,
                &slug,
                categories.as_deref().unwrap_or_default(),
            ),
        };

        let mut post = Page::new(title, date, source);
        if let Some(categories) = categories {
            post = post.with_categories(categories);
        }
        post.tags = fm.tags.unwrap_or_default();
        post.layout = fm.layout.unwrap_or_else(|| "post".to_string());
        post.raw = body.to_string();
        post.content = self.renderer.render(body)?;
        post.full_source = path.to_path_buf();
        post.url = url;
        post.slug = slug;
        post.published = fm.published;
        post.extra = fm.extra;

        Ok(post)
    }

    /// Generate permalink based on config pattern
    fn generate_permalink(
        &self,
        date: &DateTime<Local>,
        slug: &str,
        categories: &[String],
    ) -> String {
        let pattern = &self.site.config.permalink;

        let categories = categories
            .iter()
            .map(|c| slug::slugify(c))
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        let result = pattern
            .replace(":categories", &categories)
            .replace(":year", &date.format("%Y").to_string())
            .replace(":month", &date.format("%m").to_string())
            .replace(":day", &date.format("%d").to_string())
            .replace(":i_month", &date.format("%-m").to_string())
            .replace(":i_day", &date.format("%-d").to_string())
            .replace(":title", slug);

        with_baseurl(&self.site.config.baseurl, &result)
    }
}

/// Split `YYYY-MM-DD-slug` into its date and slug
fn split_post_filename(stem: &str) -> (Option<DateTime<Local>>, String) {
    match POST_FILENAME.captures(stem) {
        Some(caps) => (parse_date_string(&caps[1]), caps[2].to_string()),
        None => (None, stem.to_string()),
    }
}

/// `hello-world` -> `Hello World`
fn titleize(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prefix `baseurl` and collapse the doubled slashes left by empty placeholders
fn with_baseurl(baseurl: &str, path: &str) -> String {
    let joined = format!(
        "/{}/{}",
        baseurl.trim_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && url.ends_with('/') {
            continue;
        }
        url.push(c);
    }
    url
}

/// Check if a file is a markdown file
pub(crate) fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_post(dir: &Path, name: &str, content: &str) {
        let posts = dir.join("_posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join(name), content).unwrap();
    }

    #[test]
    fn test_split_post_filename() {
        let (date, slug) = split_post_filename("2014-01-05-hello-world");
        assert_eq!(date.unwrap().format("%Y-%m-%d").to_string(), "2014-01-05");
        assert_eq!(slug, "hello-world");

        let (date, slug) = split_post_filename("about");
        assert!(date.is_none());
        assert_eq!(slug, "about");
    }

    #[test]
    fn test_with_baseurl() {
        assert_eq!(with_baseurl("", "/2014/01/05/a/"), "/2014/01/05/a/");
        assert_eq!(with_baseurl("/blog", "//2014/a/"), "/blog/2014/a/");
    }

    #[test]
    fn test_titleize() {
        assert_eq!(titleize("hello-world"), "Hello World");
    }

    #[test]
    fn test_load_posts() {
        let dir = TempDir::new().unwrap();
        write_post(
            dir.path(),
            "2014-01-05-first-post.md",
            "---\ntitle: First\ncategories: [iOS, Swift]\n---\n## Intro\n",
        );
        write_post(
            dir.path(),
            "2015-03-01-second.markdown",
            "---\ntitle: Second\n---\nBody\n",
        );
        write_post(
            dir.path(),
            "2016-01-01-draft.md",
            "---\ntitle: Draft\npublished: false\n---\nBody\n",
        );

        let site = Jekyll::new(dir.path()).unwrap();
        let posts = ContentLoader::new(&site).load_posts().unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Second");
        assert!(posts[0].categories.is_none());
        assert_eq!(posts[0].url, "/2015/03/01/second/");

        let first = &posts[1];
        assert_eq!(first.slug, "first-post");
        assert_eq!(first.url, "/ios/swift/2014/01/05/first-post/");
        assert_eq!(first.category_names().collect::<Vec<_>>(), vec!["iOS", "Swift"]);
        assert!(first.content.contains("heading-anchor"));
    }
}
