//! Archive ingestion: assemble many documents, independently, on a bounded pool.

use rayon::prelude::*;
use serde::Serialize;

use docslice_core::{AssemblyConfig, DocsliceError, ParsedDocument, RawExtraction};

use crate::assembler::DocumentAssembler;

/// One member of an archive. The extraction may already have failed upstream
/// (unreadable file, invalid page layout); that failure is reported, not fatal.
#[derive(Debug)]
pub struct ArchiveEntry {
    pub name: String,
    pub extraction: Result<RawExtraction, DocsliceError>,
}

impl ArchiveEntry {
    pub fn ok(name: impl Into<String>, extraction: RawExtraction) -> Self {
        Self {
            name: name.into(),
            extraction: Ok(extraction),
        }
    }

    pub fn failed(name: impl Into<String>, error: DocsliceError) -> Self {
        Self {
            name: name.into(),
            extraction: Err(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub name: String,
    pub error: String,
}

/// Combined result of an archive: every document that assembled, plus the
/// entries that did not. Both lists keep archive order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveReport {
    pub documents: Vec<ParsedDocument>,
    pub failures: Vec<EntryFailure>,
}

impl ArchiveReport {
    pub fn total_chunks(&self) -> usize {
        self.documents.iter().map(|d| d.chunks().len()).sum()
    }

    pub fn total_images(&self) -> usize {
        self.documents.iter().map(|d| d.images().len()).sum()
    }

    pub fn degraded_images(&self) -> usize {
        self.documents.iter().map(|d| d.degraded_images()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Assemble every entry of an archive.
///
/// An invalid `config` fails the call before any entry is touched. After
/// that, each entry succeeds or fails on its own; at most
/// `config.max_parallel_documents` entries are in flight at once.
pub fn assemble_archive(
    entries: Vec<ArchiveEntry>,
    config: &AssemblyConfig,
) -> Result<ArchiveReport, DocsliceError> {
    let assembler = DocumentAssembler::new(*config)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_parallel_documents)
        .thread_name(|i| format!("docslice-assemble-{i}"))
        .build()
        .map_err(|e| DocsliceError::ThreadPool(e.to_string()))?;

    let total = entries.len();
    let outcomes: Vec<Result<ParsedDocument, EntryFailure>> = pool.install(|| {
        entries
            .into_par_iter()
            .map(|entry| match entry.extraction {
                Ok(raw) => Ok(assembler.assemble(raw)),
                Err(e) => {
                    tracing::warn!(entry = %entry.name, error = %e, "skipping archive entry");
                    Err(EntryFailure {
                        name: entry.name,
                        error: e.to_string(),
                    })
                }
            })
            .collect()
    });

    let mut report = ArchiveReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(doc) => report.documents.push(doc),
            Err(failure) => report.failures.push(failure),
        }
    }

    tracing::info!(
        entries = total,
        documents = report.documents.len(),
        failures = report.failures.len(),
        chunks = report.total_chunks(),
        images = report.total_images(),
        degraded_images = report.degraded_images(),
        "archive assembled"
    );
    Ok(report)
}
