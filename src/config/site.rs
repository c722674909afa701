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

    // URL
    pub url: String,
    pub baseurl: String,
    pub permalink: String,

    // Directory
    pub source: String,
    pub destination: String,
    pub layouts_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    pub show_drafts: bool,
    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Plugins
    #[serde(default)]
    pub sass: SassConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://localhost:4000".to_string(),
            baseurl: String::new(),
            permalink: "/:categories/:year/:month/:day/:title/".to_string(),

            source: ".".to_string(),
            destination: "_site".to_string(),
            layouts_dir: "_layouts".to_string(),
            exclude: Vec::new(),

            show_drafts: false,
            markdown: MarkdownConfig::default(),

            sass: SassConfig::default(),
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

    /// Whether a path relative to the source dir matches an `exclude` entry
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|pattern| {
            let first = relative
                .components()
                .next()
                .and_then(|c| c.as_os_str().to_str())
                .unwrap_or("");
            glob::Pattern::new(pattern)
                .map(|p| p.matches_path(relative) || p.matches(first))
                .unwrap_or_else(|_| relative.starts_with(pattern))
        })
    }
}

/// Markdown converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub highlight_theme: String,
    pub line_numbers: bool,
    /// Inject a link anchor into every heading carrying an id
    pub heading_anchors: bool,
    pub anchor_icon: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            highlight_theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
            heading_anchors: true,
            anchor_icon: "/assets/icons/link.svg".to_string(),
        }
    }
}

/// External SCSS compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SassConfig {
    pub enabled: bool,
    /// Working directory of the compiler, relative to the source dir
    pub dir: String,
    pub command: String,
    pub args: Vec<String>,
    /// Directory the compiler writes `*.css` into, relative to the source dir
    pub css_dir: String,
}

impl Default for SassConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "_sass".to_string(),
            command: "compass".to_string(),
            args: vec![
                "compile".to_string(),
                "-c".to_string(),
                "config.rb".to_string(),
            ],
            css_dir: "css".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.destination, "_site");
        assert_eq!(config.sass.command, "compass");
        assert!(config.markdown.heading_anchors);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: hugotunius.se
url: https://hugotunius.se
exclude:
  - Capfile
  - Gemfile*
sass:
  command: sass
  args: ["main.scss", "../css/main.css"]
twitter: k0nserv
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "hugotunius.se");
        assert_eq!(config.sass.command, "sass");
        assert_eq!(config.sass.dir, "_sass");
        assert_eq!(config.layouts_dir, "_layouts");
        assert_eq!(
            config.extra.get("twitter").and_then(|v| v.as_str()),
            Some("k0nserv")
        );
    }

    #[test]
    fn test_is_excluded() {
        let config = SiteConfig {
            exclude: vec!["Capfile".to_string(), "Gemfile*".to_string()],
            ..Default::default()
        };
        assert!(config.is_excluded(Path::new("Capfile")));
        assert!(config.is_excluded(Path::new("Gemfile.lock")));
        assert!(!config.is_excluded(Path::new("img/logo.png")));
    }
}
