//! Front-matter parsing

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Accepts a list of strings or a single whitespace-separated string.
///
/// `categories: rust tools` yields two categories, as Jekyll splits
/// string-valued category lists on whitespace.
fn words_or_vec<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct WordsOrVec;

    impl<'de> Visitor<'de> for WordsOrVec {
        type Value = Option<Vec<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.split_whitespace().map(String::from).collect()))
        }

        // `categories: 2014` is a single category
        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(Some(vec))
        }

        // `categories:` with no value is present but empty
        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Vec::new()))
        }
    }

    deserializer.deserialize_any(WordsOrVec)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "words_or_vec", default)]
    pub categories: Option<Vec<String>>,
    /// Single-category shorthand, used when `categories` is absent
    pub category: Option<String>,
    #[serde(deserialize_with = "words_or_vec", default)]
    pub tags: Option<Vec<String>>,
    pub layout: Option<String>,
    pub permalink: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            date: None,
            categories: None,
            category: None,
            tags: None,
            layout: None,
            permalink: None,
            published: true,
            extra: HashMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let trimmed = content.trim_start();
        let Some(rest) = trimmed.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        let rest = rest.trim_start_matches(['\n', '\r']);

        // An empty block closes immediately
        if let Some(remaining) = rest.strip_prefix("---") {
            return Ok((
                FrontMatter::default(),
                remaining.trim_start_matches(['\n', '\r']),
            ));
        }

        let Some(end_pos) = rest.find("\n---") else {
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm: FrontMatter = serde_yaml::from_str(yaml_content)?;
        Ok((fm, remaining))
    }

    /// Resolve `categories`, falling back to the singular `category`
    pub fn categories(&self) -> Option<Vec<String>> {
        self.categories
            .clone()
            .or_else(|| self.category.as_ref().map(|c| vec![c.clone()]))
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_ref().and_then(|s| parse_date_string(s))
    }
}

/// Parse a date string in various formats
pub(crate) fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Local));
    }

    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_local_timezone(Local).earliest();
        }
    }

    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| dt.and_local_timezone(Local).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
tags:
  - rust
categories:
  - programming
  - ios
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.tags, Some(vec!["rust".to_string()]));
        assert_eq!(
            fm.categories(),
            Some(vec!["programming".to_string(), "ios".to_string()])
        );
        assert!(remaining.contains("This is the content."));
    }

    #[test]
    fn test_categories_string_splits_on_whitespace() {
        let content = "---\ntitle: T\ncategories: rust  tools\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.categories(),
            Some(vec!["rust".to_string(), "tools".to_string()])
        );
    }

    #[test]
    fn test_scalar_categories() {
        let (fm, remaining) = FrontMatter::parse("---\ntitle: T\ncategories: 2014\n---\nb").unwrap();
        assert_eq!(fm.categories(), Some(vec!["2014".to_string()]));
        assert_eq!(remaining, "b");

        let (fm, _) = FrontMatter::parse("---\ncategories: 1.5\ntags: true\n---\n").unwrap();
        assert_eq!(fm.categories(), Some(vec!["1.5".to_string()]));
        assert_eq!(fm.tags, Some(vec!["true".to_string()]));
    }

    #[test]
    fn test_singular_category() {
        let content = "---\ntitle: T\ncategory: swift\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.categories(), Some(vec!["swift".to_string()]));
    }

    #[test]
    fn test_missing_categories() {
        let content = "---\ntitle: T\n---\nbody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.categories(), None);
        assert_eq!(remaining, "body");
    }

    #[test]
    fn test_empty_categories_key() {
        let content = "---\ntitle: T\ncategories:\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.categories(), Some(Vec::new()));
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just markdown").unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(remaining, "# Just markdown");
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };

        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");
    }
}
