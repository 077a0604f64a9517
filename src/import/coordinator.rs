//! Import coordination.
//!
//! Runs stage → batch-create → import-recipe inside one transaction. Any
//! failure rolls the transaction back explicitly before the error is handed
//! to the caller; only a fully successful run is committed. The commit itself
//! is not bounded by the client-side step timeout: cancelling it would leave
//! the outcome unknown.

use super::database_operations::BatchRequest;
use super::error::{ImportError, ImportStep};
use super::session::{ImportSession, PgImportSession};
use super::stats::ImportStats;
use crate::mapping::StagingRow;
use sqlx::PgConnection;
use std::future::Future;
use std::time::{Duration, Instant};

/// Drives one import transaction through its three steps.
#[derive(Debug, Clone, Copy)]
pub struct CmwebImporter {
    step_timeout: Duration,
}

impl CmwebImporter {
    pub fn new(step_timeout: Duration) -> Self {
        Self { step_timeout }
    }

    /// Open a transaction on `conn` and run the import in it.
    pub async fn import(
        &self,
        conn: &mut PgConnection,
        rows: &[StagingRow],
        request: &BatchRequest,
    ) -> Result<ImportStats, ImportError> {
        let session = self
            .bounded(
                ImportStep::Begin,
                PgImportSession::begin(conn, Some(self.step_timeout)),
            )
            .await?;
        self.run(session, rows, request).await
    }

    /// Run the three steps on an already open session.
    ///
    /// The session is committed on success and rolled back on every error
    /// raised before the commit.
    pub async fn run<S: ImportSession>(
        &self,
        mut session: S,
        rows: &[StagingRow],
        request: &BatchRequest,
    ) -> Result<ImportStats, ImportError> {
        let start = Instant::now();

        match self.execute(&mut session, rows, request).await {
            Ok(stats) => {
                session
                    .commit()
                    .await
                    .map_err(|source| ImportError::database(ImportStep::Commit, source))?;
                log::info!(
                    "imported batch {} ({} staging rows, {} trailing result sets) in {}ms",
                    stats.id_main,
                    stats.staged_rows,
                    stats.trailing_result_sets,
                    start.elapsed().as_millis()
                );
                Ok(stats)
            }
            Err(err) => {
                log::warn!("import of '{}' failed: {}", request.batch_label, err);
                if let Err(rollback_err) = session.rollback().await {
                    log::error!(
                        "rollback of '{}' failed: {}",
                        request.batch_label,
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }

    async fn execute<S: ImportSession>(
        &self,
        session: &mut S,
        rows: &[StagingRow],
        request: &BatchRequest,
    ) -> Result<ImportStats, ImportError> {
        if rows.is_empty() {
            return Err(ImportError::EmptyBatch);
        }

        let staged_rows = self
            .bounded(ImportStep::Stage, session.stage_rows(rows))
            .await?;
        if staged_rows != rows.len() as u64 {
            return Err(ImportError::StagingCountMismatch {
                expected: rows.len(),
                inserted: staged_rows,
            });
        }

        let reply = self
            .bounded(ImportStep::BatchCreate, session.create_batch(request))
            .await?;
        let id_main = reply.id_main.ok_or(ImportError::MissingBatchId)?;

        self.bounded(ImportStep::ImportRecipe, session.import_batch(id_main))
            .await?;

        Ok(ImportStats {
            id_main,
            staged_rows,
            trailing_result_sets: reply.trailing_result_sets,
            trailing_rows: reply.trailing_rows,
        })
    }

    async fn bounded<T, F>(&self, step: ImportStep, operation: F) -> Result<T, ImportError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.step_timeout, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(ImportError::database(step, source)),
            Err(_) => Err(ImportError::Timeout {
                step,
                timeout: self.step_timeout,
            }),
        }
    }
}

/// Stage `rows` and import them as one CMWeb batch, returning its `IdMain`.
pub async fn import_rows(
    conn: &mut PgConnection,
    rows: &[StagingRow],
    batch_label: &str,
    code_site: i32,
    code_user: i32,
    site_language: i32,
    step_timeout: Duration,
) -> Result<i32, ImportError> {
    let request = BatchRequest {
        batch_label: batch_label.to_string(),
        code_site,
        code_user,
        site_language,
    };

    let stats = CmwebImporter::new(step_timeout)
        .import(conn, rows, &request)
        .await?;
    Ok(stats.id_main)
}
