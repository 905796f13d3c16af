//! Service layer
//!
//! Statement ingestion, category merging and export are pure functions over
//! the domain types. `Session` ties them to a categorizer for one upload.

pub mod export;
pub mod ingest;
pub mod logging;
pub mod merge;
mod session;

pub use export::{ExportOptions, Quoting, UncategorizedStyle, EXPORT_FILE_NAME};
pub use ingest::{IngestOutcome, RowCoercionWarning};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use session::Session;
