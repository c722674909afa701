//! Configuration module

mod site;

pub use site::MarkdownConfig;
pub use site::SassConfig;
pub use site::SiteConfig;
