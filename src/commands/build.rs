//! Build the site

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::Jekyll;

/// Build the site once
pub fn run(site: &Jekyll) -> Result<()> {
    let start = Instant::now();

    let posts = ContentLoader::new(site).load_posts()?;
    tracing::info!("Loaded {} posts", posts.len());

    let generator = Generator::new(site, posts)?;
    generator.generate()?;

    tracing::info!(
        "Built {:?} in {:.2}s",
        site.dest_dir,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Watch the source directory and rebuild on changes
pub async fn watch(site: &Jekyll) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(site.source_dir.as_ref(), notify::RecursiveMode::Recursive)?;

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", site.source_dir);

    let mut last_rebuild = Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                // Our own output lands under the source dir too
                if !is_source_change(site, &event) {
                    continue;
                }
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("Change detected, rebuilding...");
                    // Fresh stamp so browsers refetch changed assets
                    let rebuilt = Jekyll::new(&site.base_dir).and_then(|site| run(&site));
                    if let Err(e) = rebuilt {
                        tracing::error!("Build failed: {:#}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

/// Whether `event` touches anything outside the destination directory
fn is_source_change(site: &Jekyll, event: &notify::Event) -> bool {
    event
        .paths
        .iter()
        .any(|path| !path.starts_with(&site.dest_dir))
}
