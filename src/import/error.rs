use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Stage of the import transaction an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportStep {
    Begin,
    Stage,
    BatchCreate,
    ImportRecipe,
    Commit,
}

impl ImportStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStep::Begin => "begin",
            ImportStep::Stage => "stage",
            ImportStep::BatchCreate => "batch_create",
            ImportStep::ImportRecipe => "import_recipe",
            ImportStep::Commit => "commit",
        }
    }
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of the staging import.
///
/// Failures before the commit are returned after the transaction has been
/// rolled back; [`ImportError::EmptyBatch`] is raised before any staging
/// statement. A failed commit ([`ImportStep::Commit`]) is not rolled back
/// explicitly and leaves the transaction to the server.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no staging rows to import")]
    EmptyBatch,
    #[error("{step} step failed: {source}")]
    Database {
        step: ImportStep,
        #[source]
        source: sqlx::Error,
    },
    #[error("{step} step timed out after {timeout:?}")]
    Timeout { step: ImportStep, timeout: Duration },
    #[error("usp_RecipeImport_xls did not return IdMain in its first result set")]
    MissingBatchId,
    #[error("staged {inserted} rows but {expected} were submitted")]
    StagingCountMismatch { expected: usize, inserted: u64 },
}

impl ImportError {
    pub fn database(step: ImportStep, source: sqlx::Error) -> Self {
        ImportError::Database { step, source }
    }

    /// Step the failure belongs to, if any database work was attempted.
    pub fn step(&self) -> Option<ImportStep> {
        match self {
            ImportError::EmptyBatch => None,
            ImportError::Database { step, .. } | ImportError::Timeout { step, .. } => Some(*step),
            ImportError::MissingBatchId => Some(ImportStep::BatchCreate),
            ImportError::StagingCountMismatch { .. } => Some(ImportStep::Stage),
        }
    }

    /// The transaction failed to commit after all three steps succeeded.
    pub fn is_commit_failure(&self) -> bool {
        self.step() == Some(ImportStep::Commit)
    }

    /// The receiving procedure broke its result-set contract.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, ImportError::MissingBatchId)
    }
}
