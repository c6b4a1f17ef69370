//! grapho Export - Local artifacts
//!
//! Pure formatting over the domain model:
//! - CSV export of the admin user list
//! - The analysis report document and its text rendering
//!
//! No decision logic lives here; both exporters consume already-computed
//! state.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod csv;
pub mod report;

pub use csv::{render_users_csv, users_csv_file_name, write_users_csv};
pub use report::{AnalysisReport, ReportSection};

/// Errors raised while writing export artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
