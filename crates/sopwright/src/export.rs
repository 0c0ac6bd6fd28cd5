//! Export functionality for SOP documents.
//!
//! This module provides the [`Exporter`] trait that defines the interface for
//! turning a [`DocumentContext`] into an output document. It is the final
//! stage in the Sopwright processing pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! BPMN Markup
//!     ↓ parse
//! Process Graph
//!     ↓ linearize
//! Steps
//!     ↓ synthesize
//! Document Context
//!     ↓ export (this module)
//! Output Bytes
//! ```
//!
//! # Available Backends
//!
//! - [`docx`]: WordprocessingML output via [`docx::DocxBuilder`] and [`docx::Docx`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering template, XML, packaging and
//! I/O failures. [`Error`] converts into [`SopError::Export`] at the crate
//! boundary.
//!
//! [`SopError::Export`]: crate::SopError::Export

/// WordprocessingML export backend.
pub mod docx;

use sopwright_core::document::{DocumentContext, Warning};

/// Abstraction for document export backends.
///
/// See the [`docx`] module for the built-in implementation.
pub trait Exporter {
    /// Renders `context` into the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] or [`Error::Xml`] if the template cannot be
    /// read, and [`Error::Package`] if the output package cannot be written.
    fn export_document(&self, context: &DocumentContext) -> Result<RenderedDocument, Error>;
}

/// Output of an export: the document bytes and the mismatches met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    warnings: Vec<Warning>,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>, warnings: Vec<Warning>) -> Self {
        Self { bytes, warnings }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pipeline and render warnings, in the order they were raised.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Errors that can occur during document export.
///
/// This type is converted into [`SopError::Export`] at the crate
/// boundary via the [`From`] implementation in [`crate::error`].
///
/// [`SopError::Export`]: crate::SopError::Export
#[derive(Debug)]
pub enum Error {
    /// The template lacks a required part or structure, described by `message`.
    Template(String),
    /// A template part is not well-formed XML.
    Xml(String),
    /// The package could not be read or written.
    Package(zip::result::ZipError),
    /// An I/O error encountered while reading or writing a part.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(msg) => write!(f, "Template error: {msg}"),
            Self::Xml(msg) => write!(f, "XML error: {msg}"),
            Self::Package(err) => write!(f, "Package error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Template(_) | Self::Xml(_) => None,
            Self::Package(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Package(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
