//! Related pages ranked by shared categories

use chrono::Local;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tera::{Filter, Value};

use crate::content::Page;
use crate::error::{Error, Result};

/// Rank `corpus` by the number of categories each page shares with `query`.
///
/// Pages titled like `query` are skipped, as are pages sharing nothing.
/// Equal scores keep corpus order. Fails with [`Error::InvalidInput`] when a
/// remaining candidate has no categories at all.
pub fn related_pages<'a>(query: &Page, corpus: &'a [Page]) -> Result<Vec<&'a Page>> {
    let wanted: HashSet<&str> = query.category_names().collect();

    let mut scored = Vec::new();
    for candidate in corpus.iter().filter(|p| p.title != query.title) {
        let shared = shared_count(candidate, &wanted)?;
        if shared > 0 {
            scored.push((candidate, shared));
        }
    }

    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(scored.into_iter().map(|(page, _)| page).collect())
}

/// Number of `candidate` categories contained in `wanted`
pub fn shared_count(candidate: &Page, wanted: &HashSet<&str>) -> Result<usize> {
    let categories = candidate.categories.as_ref().ok_or_else(|| {
        Error::InvalidInput(format!(
            "page {:?} ({}) has no categories",
            candidate.title, candidate.source
        ))
    })?;

    Ok(categories
        .iter()
        .filter(|c| wanted.contains(c.as_str()))
        .count())
}

/// Tera filter: `{% for post in page | related_pages(limit=3) %}`
pub struct RelatedPagesFilter {
    corpus: Arc<Vec<Page>>,
}

impl RelatedPagesFilter {
    pub fn new(corpus: Arc<Vec<Page>>) -> Self {
        Self { corpus }
    }
}

impl Filter for RelatedPagesFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let title = value
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("Filter `related_pages` expects a page with a title"))?;

        let categories = match value.get("categories") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => s.split_whitespace().map(String::from).collect(),
            Some(v) => tera::from_value::<Vec<String>>(v.clone()).map_err(|e| {
                tera::Error::msg(format!(
                    "Filter `related_pages` expects categories to be strings: {}",
                    e
                ))
            })?,
        };

        let limit = match args.get("limit") {
            Some(val) => tera::try_get_value!("related_pages", "limit", usize, val),
            None => usize::MAX,
        };

        let query =
            Page::new(title.to_string(), Local::now(), String::new()).with_categories(categories);

        let related = related_pages(&query, &self.corpus).map_err(|e| {
            tracing::error!("related_pages failed for {:?}: {}", title, e);
            tera::Error::msg(e.to_string())
        })?;

        let related: Vec<&Page> = related.into_iter().take(limit).collect();
        serde_json::to_value(related).map_err(|e| tera::Error::msg(e.to_string()))
    }
}
