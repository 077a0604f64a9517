//! Outcome of a completed import.

use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;

/// Counters for one committed import transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ImportStats {
    /// Batch id assigned by `usp_RecipeImport_xls`
    pub id_main: i32,
    /// Rows written to the staging table
    pub staged_rows: u64,
    /// Result sets drained after the one carrying `IdMain`
    pub trailing_result_sets: usize,
    /// Rows discarded while draining
    pub trailing_rows: usize,
}
