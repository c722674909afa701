//! Clean the destination directory

use anyhow::Result;
use std::fs;

use crate::Jekyll;

/// Remove the destination directory
pub fn run(site: &Jekyll) -> Result<()> {
    if site.dest_dir.exists() {
        fs::remove_dir_all(&site.dest_dir)?;
        tracing::info!("Deleted: {:?}", site.dest_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", site.dest_dir);
    }

    Ok(())
}
