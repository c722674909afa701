//! Layout templates using the Tera template engine
//!
//! Layouts are loaded from the site's layouts directory; the site filters are
//! registered once, when the renderer is built.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::content::Page;
use crate::error::Result;
use crate::filters;

/// Template renderer over the site's layouts
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load every `*.html` layout under `layouts_dir` and register the filters
    pub fn new(layouts_dir: &Path, corpus: Arc<Vec<Page>>, build_stamp: i64) -> Result<Self> {
        let mut tera = Tera::default();

        // Layouts receive already-rendered HTML
        tera.autoescape_on(vec![]);

        filters::register(&mut tera, corpus, build_stamp);

        if layouts_dir.exists() {
            let mut layouts: Vec<(PathBuf, Option<String>)> = Vec::new();
            for entry in WalkDir::new(layouts_dir)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
                    continue;
                }
                let name = path
                    .strip_prefix(layouts_dir)
                    .unwrap_or(path)
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                layouts.push((path.to_path_buf(), Some(name)));
            }
            tracing::debug!("Loading {} layouts from {:?}", layouts.len(), layouts_dir);
            tera.add_template_files(layouts)?;
        } else {
            tracing::warn!("Layouts directory {:?} not found", layouts_dir);
        }

        Ok(Self { tera })
    }

    /// Whether `<layout>.html` was loaded
    pub fn has_layout(&self, layout: &str) -> bool {
        let name = format!("{}.html", layout);
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Site-wide data exposed to layouts as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub author: &'a str,
    pub url: &'a str,
    pub baseurl: &'a str,
    pub time: i64,
    pub posts: &'a [Page],
    /// Category name -> number of posts
    pub categories: BTreeMap<&'a str, usize>,
    #[serde(flatten)]
    pub extra: &'a HashMap<String, serde_yaml::Value>,
}
