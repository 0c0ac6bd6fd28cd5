//! Error types for Sopwright operations.
//!
//! This module provides the main error type [`SopError`] which wraps
//! the error conditions of each pipeline stage.

use std::io;

use thiserror::Error;

use sopwright_parser::error::ParseError;

use crate::linearize::LinearizeError;

/// The main error type for Sopwright operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the diagram markup next to the diagnostics so
/// hosts can render source snippets for every labeled span.
#[derive(Debug, Error)]
pub enum SopError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Linearization error: {0}")]
    Linearize(#[from] LinearizeError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for SopError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl SopError {
    /// Create a new `Parse` error with the associated diagram markup.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
