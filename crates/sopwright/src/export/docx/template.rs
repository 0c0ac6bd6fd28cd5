//! Document templates.

use std::{fs, path::Path};

use log::{debug, info};

use super::{
    super::Error,
    package::{self, Part},
};

pub(super) const DOCUMENT_PART: &str = "word/document.xml";

const BUILTIN: &[(&str, &str)] = &[
    ("[Content_Types].xml", include_str!("assets/content_types.xml")),
    ("_rels/.rels", include_str!("assets/rels.xml")),
    ("word/document.xml", include_str!("assets/document.xml")),
    ("word/_rels/document.xml.rels", include_str!("assets/document_rels.xml")),
    ("word/styles.xml", include_str!("assets/styles.xml")),
];

/// A WordprocessingML package whose `word/document.xml` holds placeholders.
///
/// Every part other than the main document is copied to the output
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Default for Template {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Template {
    /// The built-in "Guideline V2" template.
    pub fn builtin() -> Self {
        let parts = BUILTIN
            .iter()
            .map(|(name, data)| Part {
                name: (*name).to_string(),
                data: data.as_bytes().to_vec(),
            })
            .collect();
        Self { parts }
    }

    /// Reads a template from the bytes of a `.docx` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Package`] if the bytes are not a zip archive and
    /// [`Error::Template`] if the archive has no main document part.
    pub fn from_docx(bytes: &[u8]) -> Result<Self, Error> {
        let template = Self {
            parts: package::read(bytes)?,
        };
        template.document_xml()?;
        debug!(parts = template.parts.len(); "Template package read");
        Ok(template)
    }

    /// Reads a template from a `.docx` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`Template::from_docx`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        info!(path:? = path; "Loading template");
        let bytes = fs::read(path)?;
        Self::from_docx(&bytes)
    }

    /// The main document part as text.
    pub(super) fn document_xml(&self) -> Result<&str, Error> {
        let part = self
            .parts
            .iter()
            .find(|part| part.name == DOCUMENT_PART)
            .ok_or_else(|| Error::Template(format!("package has no `{DOCUMENT_PART}` part")))?;
        std::str::from_utf8(&part.data)
            .map_err(|err| Error::Template(format!("`{DOCUMENT_PART}` is not UTF-8: {err}")))
    }

    /// Packages the template with `document` as its main document part.
    pub(super) fn package(&self, document: &str) -> Result<Vec<u8>, Error> {
        package::write(self.parts.iter().map(|part| {
            let data = if part.name == DOCUMENT_PART {
                document.as_bytes()
            } else {
                part.data.as_slice()
            };
            (part.name.as_str(), data)
        }))
    }
}
