//! Generator module - renders posts through the site layouts and writes
//! the destination directory

mod sass;

pub use sass::SassGenerator;

use anyhow::{Context as _, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tera::Context;
use walkdir::WalkDir;

use crate::content::loader::is_markdown_file;
use crate::content::Page;
use crate::templates::{SiteData, TemplateRenderer};
use crate::Jekyll;

/// Static site generator
pub struct Generator {
    site: Jekyll,
    posts: Arc<Vec<Page>>,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a generator over the loaded posts
    pub fn new(site: &Jekyll, posts: Vec<Page>) -> Result<Self> {
        let posts = Arc::new(posts);
        let renderer = TemplateRenderer::new(&site.layouts_dir, posts.clone(), site.build_stamp)
            .context("Failed to load layouts")?;

        Ok(Self {
            site: site.clone(),
            posts,
            renderer,
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<()> {
        fs::create_dir_all(&self.site.dest_dir)?;

        let sass = SassGenerator::new(&self.site);
        let stylesheets = sass.run()?;

        // Compiled stylesheets are published by the sass generator itself
        let css_dir = sass.css_dir();
        let skip_dir = (!stylesheets.is_empty()).then_some(css_dir.as_path());
        let copied = self.copy_static_files(skip_dir)?;
        sass.publish(&stylesheets, &self.site.dest_dir)?;
        tracing::info!("Copied {} static files", copied + stylesheets.len());

        self.generate_posts()?;

        Ok(())
    }

    /// Build site data for templates
    fn build_site_data(&self) -> SiteData<'_> {
        let config = &self.site.config;

        let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
        for post in self.posts.iter() {
            for category in post.category_names() {
                *categories.entry(category).or_insert(0) += 1;
            }
        }

        SiteData {
            title: &config.title,
            description: &config.description,
            author: &config.author,
            url: &config.url,
            baseurl: &config.baseurl,
            time: self.site.build_stamp,
            posts: &self.posts,
            categories,
            extra: &config.extra,
        }
    }

    /// Render every post through its layout
    fn generate_posts(&self) -> Result<()> {
        let site_data = self.build_site_data();

        for post in self.posts.iter() {
            let html = if self.renderer.has_layout(&post.layout) {
                let mut context = Context::new();
                context.insert("site", &site_data);
                context.insert("page", post);
                context.insert("content", &post.content);

                self.renderer
                    .render(&format!("{}.html", post.layout), &context)
                    .with_context(|| format!("Failed to render {}", post.source))?
            } else {
                tracing::warn!(
                    "Layout {:?} not found for {}, writing bare content",
                    post.layout,
                    post.source
                );
                post.content.clone()
            };

            let output_path = self.output_path(&post.url);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create dir {:?}", parent))?;
            }
            fs::write(&output_path, html)
                .with_context(|| format!("Failed to write {:?}", output_path))?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        tracing::info!("Generated {} posts", self.posts.len());
        Ok(())
    }

    /// `/a/b/` -> `<dest>/a/b/index.html`, `/a/b.html` -> `<dest>/a/b.html`
    fn output_path(&self, url: &str) -> PathBuf {
        let clean = url.trim_start_matches('/');
        if clean.is_empty() || clean.ends_with('/') {
            self.site.dest_dir.join(clean).join("index.html")
        } else {
            self.site.dest_dir.join(clean)
        }
    }

    /// Copy static files to the destination directory.
    ///
    /// Skips Markdown, anything under a `_` or `.` prefixed component,
    /// `exclude` matches and `skip_dir`.
    fn copy_static_files(&self, skip_dir: Option<&Path>) -> Result<usize> {
        let source_dir = &self.site.source_dir;
        let mut copied = 0;

        let walker = WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                let hidden = e.depth() > 0
                    && e.file_name()
                        .to_str()
                        .map(|n| n.starts_with('_') || n.starts_with('.'))
                        .unwrap_or(false);
                !hidden && e.path() != self.site.dest_dir.as_path() && Some(e.path()) != skip_dir
            });

        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || is_markdown_file(path) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            if self.site.config.is_excluded(relative) {
                tracing::debug!("Excluded: {:?}", relative);
                continue;
            }

            let dest = self.site.dest_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}
