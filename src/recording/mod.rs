//! Recorded media handling
//!
//! The recorder owns the ordered chunk sequence of one take: append-only
//! while the session records, frozen for export on stop, cleared on the next
//! start.

mod recorder;

pub use recorder::{ChunkRecorder, ExportInfo};
