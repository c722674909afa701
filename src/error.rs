//! Error types shared by the plugins

use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised by filters, converters and generators
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Sass command `{command}` failed ({status}): {stderr}")]
    Sass {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
