//! One extraction in, one `ParsedDocument` out.

use docslice_core::{AssemblyConfig, ConfigError, ParsedDocument, RawExtraction};

use crate::chunker;
use crate::images;
use crate::normalize::normalize;

/// Runs normalize -> chunk -> correlate for single documents.
///
/// The configuration is validated once in [`DocumentAssembler::new`]; after
/// that, assembling a document cannot fail.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    config: AssemblyConfig,
}

impl DocumentAssembler {
    pub fn new(config: AssemblyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn assemble(&self, raw: RawExtraction) -> ParsedDocument {
        let normalized = normalize(&raw.full_text());

        let chunks = chunker::chunk_validated(normalized.as_str(), &self.config.chunking);

        let document_id = raw.source_identifier();
        let artifacts = images::correlate(raw.images(), document_id);

        let doc = ParsedDocument::new(
            document_id,
            raw.page_count(),
            chunks,
            artifacts,
            normalized.preview(self.config.preview_chars),
        );

        tracing::debug!(
            document = %doc.source_identifier(),
            pages = doc.page_count(),
            chunks = doc.chunks().len(),
            images = doc.images().len(),
            degraded = doc.degraded_images(),
            "assembled document"
        );
        doc
    }
}

/// Validate `config`, then assemble one document.
pub fn assemble(raw: RawExtraction, config: &AssemblyConfig) -> Result<ParsedDocument, ConfigError> {
    Ok(DocumentAssembler::new(*config)?.assemble(raw))
}
