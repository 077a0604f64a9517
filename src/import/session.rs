use super::database_operations::{self, BatchRequest};
use super::reply::BatchReply;
use crate::mapping::{StagingRow, TemplateColumns};
use sqlx::{Connection, PgConnection, Postgres, Transaction};
use std::time::Duration;

/// One open import transaction.
///
/// Every method runs on the same connection, so result sets drained by
/// `create_batch` leave the connection ready for `import_batch`.
#[rocket::async_trait]
pub trait ImportSession: Send + Sized {
    /// Write rows to the staging table and return how many were inserted.
    async fn stage_rows(&mut self, rows: &[StagingRow]) -> Result<u64, sqlx::Error>;

    async fn create_batch(&mut self, request: &BatchRequest) -> Result<BatchReply, sqlx::Error>;

    async fn import_batch(&mut self, id_main: i32) -> Result<(), sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;

    async fn rollback(self) -> Result<(), sqlx::Error>;
}

/// [`ImportSession`] backed by a PostgreSQL transaction.
pub struct PgImportSession<'c> {
    tx: Transaction<'c, Postgres>,
}

impl<'c> PgImportSession<'c> {
    /// Open a transaction on `conn`, optionally bounding each statement.
    pub async fn begin(
        conn: &'c mut PgConnection,
        statement_timeout: Option<Duration>,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = conn.begin().await?;
        if let Some(timeout) = statement_timeout {
            database_operations::set_statement_timeout(&mut tx, timeout).await?;
        }
        Ok(Self { tx })
    }
}

#[rocket::async_trait]
impl<'c> ImportSession for PgImportSession<'c> {
    async fn stage_rows(&mut self, rows: &[StagingRow]) -> Result<u64, sqlx::Error> {
        let data = TemplateColumns::from_rows(rows);
        database_operations::insert_staging_rows(&mut self.tx, &data).await
    }

    async fn create_batch(&mut self, request: &BatchRequest) -> Result<BatchReply, sqlx::Error> {
        database_operations::create_batch(&mut self.tx, request).await
    }

    async fn import_batch(&mut self, id_main: i32) -> Result<(), sqlx::Error> {
        database_operations::import_batch(&mut self.tx, id_main).await
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}
