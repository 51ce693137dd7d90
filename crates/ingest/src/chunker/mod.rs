//! Recursive chunking engine.
//!
//! Splits normalized text into size-bounded chunks, preferring paragraph
//! boundaries, then sentence boundaries, then word boundaries. A single word
//! longer than the limit is emitted whole as an oversized chunk.

mod helpers;
mod packer;
mod strategies;
mod types;

pub use strategies::{chunk, chunk_str};
pub(crate) use strategies::chunk_validated;
