//! SCSS compilation through an external compiler
//!
//! The compiler runs inside the sass directory; every `*.css` it leaves in
//! the css directory is registered as a static file of the build.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::Jekyll;

/// Runs the configured SCSS compiler and collects its output
pub struct SassGenerator<'a> {
    site: &'a Jekyll,
}

impl<'a> SassGenerator<'a> {
    pub fn new(site: &'a Jekyll) -> Self {
        Self { site }
    }

    /// Compile and return the stylesheets to publish
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        let config = &self.site.config.sass;
        if !config.enabled {
            tracing::debug!("Sass generator disabled");
            return Ok(Vec::new());
        }

        let sass_dir = self.site.source_dir.join(&config.dir);
        if !sass_dir.is_dir() {
            tracing::debug!("No sass directory at {:?}, skipping", sass_dir);
            return Ok(Vec::new());
        }

        let command_line = std::iter::once(config.command.as_str())
            .chain(config.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!("Compiling stylesheets: {}", command_line);

        let output = Command::new(&config.command)
            .args(&config.args)
            .current_dir(&sass_dir)
            .output()
            .map_err(|e| {
                tracing::error!("Failed to start `{}`: {}", config.command, e);
                e
            })?;

        if !output.status.success() {
            return Err(Error::Sass {
                command: command_line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stylesheets = self.compiled_stylesheets()?;
        tracing::info!("Registered {} stylesheets", stylesheets.len());
        Ok(stylesheets)
    }

    /// Every `*.css` directly inside the css directory, sorted
    pub fn compiled_stylesheets(&self) -> Result<Vec<PathBuf>> {
        let css_dir = self.css_dir();
        let pattern = format!(
            "{}/*.css",
            glob::Pattern::escape(&css_dir.to_string_lossy())
        );

        let mut files: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| Error::InvalidInput(format!("bad css pattern {:?}: {}", pattern, e)))?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Copy `stylesheets` into the css directory of `dest_dir`
    pub fn publish(&self, stylesheets: &[PathBuf], dest_dir: &Path) -> Result<()> {
        let target = dest_dir.join(&self.site.config.sass.css_dir);
        fs::create_dir_all(&target)?;
        for file in stylesheets {
            if let Some(name) = file.file_name() {
                fs::copy(file, target.join(name))?;
                tracing::debug!("Published stylesheet {:?}", name);
            }
        }
        Ok(())
    }

    /// Source-side css directory
    pub fn css_dir(&self) -> PathBuf {
        self.site.source_dir.join(&self.site.config.sass.css_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site_with(dir: &Path, command: &str, args: &[&str]) -> Jekyll {
        fs::create_dir_all(dir.join("_sass")).unwrap();
        let mut site = Jekyll::new(dir).unwrap();
        site.config.sass.command = command.to_string();
        site.config.sass.args = args.iter().map(|a| a.to_string()).collect();
        site
    }

    #[test]
    fn test_compiles_and_registers_css() {
        let dir = TempDir::new().unwrap();
        let site = site_with(
            dir.path(),
            "sh",
            &[
                "-c",
                "mkdir -p ../css && printf 'a{}' > ../css/site.css && printf 'b{}' > ../css/print.css && touch ../css/notes.txt",
            ],
        );

        let generator = SassGenerator::new(&site);
        let files = generator.run().unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("css/print.css"),
                dir.path().join("css/site.css")
            ]
        );

        let dest = dir.path().join("_site");
        generator.publish(&files, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("css/site.css")).unwrap(), "a{}");
        assert!(!dest.join("css/notes.txt").exists());
    }

    #[test]
    fn test_failing_compiler_is_an_error() {
        let dir = TempDir::new().unwrap();
        let site = site_with(dir.path(), "sh", &["-c", "echo 'syntax error' >&2; exit 3"]);

        match SassGenerator::new(&site).run() {
            Err(Error::Sass { status, stderr, .. }) => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "syntax error");
            }
            other => panic!("expected sass error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_sass_dir_is_skipped() {
        let dir = TempDir::new().unwrap();
        let site = Jekyll::new(dir.path()).unwrap();
        assert!(SassGenerator::new(&site).run().unwrap().is_empty());
    }

    #[test]
    fn test_disabled() {
        let dir = TempDir::new().unwrap();
        let mut site = site_with(dir.path(), "false", &[]);
        site.config.sass.enabled = false;
        assert!(SassGenerator::new(&site).run().unwrap().is_empty());
    }
}
