use std::path::Path;

use tracing::{debug, info};

use crate::{RagError, Result};

/// The full extracted text of a source document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Identifier recorded as chunk metadata, derived from the file name.
    pub id: String,
    pub text: String,
}

/// Extract the full text of a PDF file.
///
/// Fails with [`RagError::DocumentNotFound`] when the path does not resolve.
/// Extraction internals are delegated to the `pdf-extract` crate.
#[inline]
pub fn load_pdf(path: &Path) -> Result<SourceDocument> {
    if !path.exists() {
        return Err(RagError::DocumentNotFound(path.to_path_buf()));
    }

    debug!(path = %path.display(), "extracting PDF text");
    let text = pdf_extract::extract_text(path)
        .map_err(|e| anyhow::anyhow!("failed to extract text from {}: {e}", path.display()))?;

    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    info!(document = %id, characters = text.len(), "extracted document text");
    Ok(SourceDocument { id, text })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use super::load_pdf;
    use crate::RagError;

    #[test]
    fn missing_path_is_document_not_found() {
        let err = load_pdf(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, RagError::DocumentNotFound(ref p) if p.ends_with("file.pdf")));
    }

    #[test]
    fn unreadable_pdf_surfaces_extraction_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"this is not a pdf").expect("write");

        let err = load_pdf(file.path()).unwrap_err();
        // Extraction failures are not DocumentNotFound; the path resolved.
        assert!(!matches!(err, RagError::DocumentNotFound(_)));
    }
}
