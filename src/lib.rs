// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod criteria;
pub mod entry;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod report;
pub mod xml;

// ---- Re-exports for stable public API ----
pub use crate::criteria::{TargetCriteria, DEFAULT_CPV, PLACSP_TZ};
pub use crate::entry::TenderRecord;
pub use crate::error::{ScanError, ScanResult};
pub use crate::fetch::{ArchiveSource, HttpArchiveSource};
pub use crate::pipeline::scan_archive;
pub use crate::report::{render_html, write_csv};
