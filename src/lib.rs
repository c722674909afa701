//! jekyll-rs: a fast builder for Jekyll-style blogs
//!
//! Posts are rendered through Tera layouts with a handful of blog plugins:
//! the `related_pages` and `asset_url` template filters, heading anchors in
//! rendered Markdown, and an external SCSS compilation step.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod generator;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

/// The main site handle
#[derive(Clone)]
pub struct Jekyll {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Destination (output) directory
    pub dest_dir: PathBuf,
    /// Layouts directory
    pub layouts_dir: PathBuf,
    /// Unix timestamp of this build, used for cache busting
    pub build_stamp: i64,
}

impl Jekyll {
    /// Create a new site handle from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let source_dir = match config.source.as_str() {
            "" | "." => base_dir.clone(),
            source => base_dir.join(source),
        };
        let dest_dir = base_dir.join(&config.destination);
        let layouts_dir = source_dir.join(&config.layouts_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            dest_dir,
            layouts_dir,
            build_stamp: chrono::Utc::now().timestamp(),
        })
    }

    /// Build the site
    pub fn build(&self) -> anyhow::Result<()> {
        commands::build::run(self)
    }

    /// Clean the destination directory
    pub fn clean(&self) -> anyhow::Result<()> {
        commands::clean::run(self)
    }
}
