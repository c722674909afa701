//! Cache-busting asset URLs

use std::collections::HashMap;
use tera::{Filter, Value};

/// `css/site.css` -> `/css/site.css?1389000000`
pub fn asset_url(path: &str, stamp: i64) -> String {
    format!("/{}?{}", path.trim_start_matches('/'), stamp)
}

/// Tera filter: `{{ "css/site.css" | asset_url }}`
pub struct AssetUrlFilter {
    stamp: i64,
}

impl AssetUrlFilter {
    pub fn new(stamp: i64) -> Self {
        Self { stamp }
    }
}

impl Filter for AssetUrlFilter {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = tera::try_get_value!("asset_url", "value", String, value);
        Ok(Value::String(asset_url(&path, self.stamp)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_url() {
        assert_eq!(asset_url("css/site.css", 42), "/css/site.css?42");
        assert_eq!(asset_url("/img/logo.png", 42), "/img/logo.png?42");
    }

    #[test]
    fn test_filter() {
        let filter = AssetUrlFilter::new(1389000000);
        let out = filter
            .filter(&Value::String("js/app.js".to_string()), &HashMap::new())
            .unwrap();
        assert_eq!(out, Value::String("/js/app.js?1389000000".to_string()));
    }

    #[test]
    fn test_filter_rejects_non_strings() {
        let filter = AssetUrlFilter::new(1);
        assert!(filter.filter(&Value::Bool(true), &HashMap::new()).is_err());
    }
}
