pub mod archive;
pub mod assembler;
pub mod chunker;
pub mod figures;
pub mod images;
pub mod normalize;

pub use archive::{assemble_archive, ArchiveEntry, ArchiveReport, EntryFailure};
pub use assembler::{assemble, DocumentAssembler};
pub use chunker::{chunk, chunk_str};
pub use figures::{attach_figure_bboxes, parse_figure_blocks, FigureBlock};
pub use images::{correlate, correlate_one, stable_filename};
pub use normalize::{normalize, NormalizedText};
