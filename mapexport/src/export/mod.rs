//! Export facade.
//!
//! [`export_region`] runs a whole export in one call: it plans the zoom
//! band, fetches every tile and assembles the container.
//! [`ExportSession`] wraps the same flow for long-lived callers that need
//! to cancel from elsewhere and must never run two exports at once.

mod facade;
mod session;
mod sink;
mod token;

pub use facade::{export_region, ExportArtifact, ExportId, ExportOutcome, ExportRequest};
pub use session::ExportSession;
pub use sink::{BlobSink, FileSink};
pub use token::{ActiveExport, ExportToken};
