//! JSON file persistence with validation before writes

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{has_errors, validate, Diagnostic, Document, DocumentError};

/// A roadmap document stored as a JSON file
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document
    pub fn load(&self) -> Result<Document, DocumentError> {
        let text = fs::read_to_string(&self.path)?;
        let doc = Document::from_json_str(&text)?;
        debug!(
            path = %self.path.display(),
            programs = doc.programs.len(),
            products = doc.products.len(),
            "loaded roadmap document"
        );
        Ok(doc)
    }

    /// Validate and write the document.
    ///
    /// Documents with validation errors are rejected and the file is left
    /// untouched. On success the remaining warnings are returned.
    pub fn save(&self, doc: &Document) -> Result<Vec<Diagnostic>, DocumentError> {
        let diagnostics = validate(doc);
        if has_errors(&diagnostics) {
            warn!(
                path = %self.path.display(),
                count = diagnostics.len(),
                "rejecting invalid roadmap document"
            );
            return Err(DocumentError::Invalid(diagnostics));
        }
        write_atomic(&self.path, doc.to_json_pretty()?.as_bytes())?;
        info!(path = %self.path.display(), "saved roadmap document");
        Ok(diagnostics)
    }

    /// Save an untyped JSON body (as received by the editor API)
    pub fn save_value(&self, value: Value) -> Result<Vec<Diagnostic>, DocumentError> {
        let doc = Document::from_value(value)?;
        self.save(&doc)
    }
}

/// Write through a sibling temp file so readers never see a partial document
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
