//! Page model

use chrono::{DateTime, Local};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A blog post or any other content unit that can be ranked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Publication date
    pub date: DateTime<Local>,

    /// Category set, in front-matter order. `None` when the page never
    /// declared categories at all.
    pub categories: Option<IndexSet<String>>,

    /// Page tags
    pub tags: Vec<String>,

    /// Layout template to use
    pub layout: String,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Source file path (relative)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL path, starting and ending with `/`
    pub url: String,

    /// Slug (URL-friendly name)
    pub slug: String,

    /// Whether the post is published
    pub published: bool,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(title: String, date: DateTime<Local>, source: String) -> Self {
        let slug = slug::slugify(&title);
        Self {
            title,
            date,
            categories: None,
            tags: Vec::new(),
            layout: "post".to_string(),
            raw: String::new(),
            content: String::new(),
            source: source.clone(),
            full_source: PathBuf::from(&source),
            url: String::new(),
            slug,
            published: true,
            extra: HashMap::new(),
        }
    }

    /// Set the categories, collapsing duplicates
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Category names, empty when absent
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_categories_dedupes() {
        let page = Page::new("A".to_string(), Local::now(), "a.md".to_string())
            .with_categories(["x", "y", "x"]);
        let names: Vec<_> = page.category_names().collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_absent_categories_serialize_as_null() {
        let page = Page::new("A".to_string(), Local::now(), "a.md".to_string());
        let value = serde_json::to_value(&page).unwrap();
        assert!(value["categories"].is_null());
        assert_eq!(value["slug"], "a");
    }
}
