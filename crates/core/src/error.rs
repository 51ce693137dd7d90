use thiserror::Error;

/// Invalid chunking / assembly settings. Always fatal, raised before any
/// document is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("overlap ({overlap}) must be smaller than max_chunk_size ({max_chunk_size})")]
    OverlapTooLarge { overlap: usize, max_chunk_size: usize },

    #[error("max_parallel_documents must be greater than zero")]
    ZeroParallelism,

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// A `RawExtraction` that violates the page/image invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Page numbers are 1-indexed, found page 0")]
    InvalidPageNumber,

    #[error("Page numbers must be strictly increasing: page {found} follows page {previous}")]
    PageOrder { previous: u32, found: u32 },

    #[error("Duplicate image index {index} on page {page}")]
    DuplicateImageIndex { page: u32, index: u32 },

    #[error("Image {index} claims page {image_page} but is attached to page {page}")]
    ImagePageMismatch { page: u32, image_page: u32, index: u32 },
}

#[derive(Error, Debug)]
pub enum DocsliceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid extraction: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for DocsliceError {
    fn from(e: serde_json::Error) -> Self {
        DocsliceError::Serialize(e.to_string())
    }
}
