pub mod config;
pub mod document;
pub mod error;

pub use config::{AssemblyConfig, ChunkConfig, Config, OutputConfig};
pub use document::*;
pub use error::*;
