//! Transactional import of staging rows into CMWeb.
//!
//! The import is organized into these components:
//! - `database_operations`: the staging insert and the two procedure calls
//! - `reply`: draining the multi-result-set reply of the batch-create call
//! - `session`: the transaction the steps share
//! - `coordinator`: step ordering, timeouts, commit and rollback
//! - `stats`: what a committed import reports

pub mod coordinator;
pub mod database_operations;
pub mod error;
pub mod reply;
pub mod session;
pub mod stats;

pub use coordinator::{CmwebImporter, import_rows};
pub use database_operations::BatchRequest;
pub use error::{ImportError, ImportStep};
pub use session::{ImportSession, PgImportSession};
pub use stats::ImportStats;
