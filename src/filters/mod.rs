//! Custom template filters
//!
//! Filters are registered once on the Tera instance when the renderer is
//! built; they share the post corpus read-only.

mod asset;
mod related;

pub use asset::{asset_url, AssetUrlFilter};
pub use related::{related_pages, shared_count, RelatedPagesFilter};

use std::sync::Arc;
use tera::Tera;

use crate::content::Page;

/// Register every site filter on `tera`
pub fn register(tera: &mut Tera, corpus: Arc<Vec<Page>>, build_stamp: i64) {
    tera.register_filter("related_pages", RelatedPagesFilter::new(corpus));
    tera.register_filter("asset_url", AssetUrlFilter::new(build_stamp));
}
