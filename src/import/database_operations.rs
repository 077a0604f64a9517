//! Statements issued against the receiving CMWeb database.
//!
//! Staging uses a single UNNEST insert so the whole batch lands in one round
//! trip, in input order. The two procedure calls keep the parameter names and
//! order the receiving system defines.

use super::reply::{BatchReply, ReplyEvent, read_batch_reply};
use crate::mapping::TemplateColumns;
use futures::StreamExt;
use sqlx::postgres::PgRow;
use sqlx::{Either, PgConnection, Row};
use std::sync::LazyLock;
use std::time::Duration;

const INSERT_STAGING_ROWS: &str = r#"INSERT INTO dbo."EgswRecipeImportTemplate"
       (col1, col2, col3, col4, col5, col6, col7, col8)
   SELECT c1, c2, c3, c4, c5, c6, c7, c8
   FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[],
               $5::text[], $6::text[], $7::text[], $8::text[])
        WITH ORDINALITY AS t(c1, c2, c3, c4, c5, c6, c7, c8, ord)
   ORDER BY ord"#;

const IMPORT_BATCH: &str = r#"CALL dbo."usp_RecipeImport_xls_ImportRecipe"("IDMain" => $1)"#;

/// Overwrite flags passed to `usp_RecipeImport_xls`, in declaration order.
/// All are enabled: a recipe matched by name is replaced field by field.
pub const OVERWRITE_FLAGS: [&str; 15] = [
    "OverwriteNumber",
    "OverwriteName",
    "OverwriteSubname",
    "OverwriteYield",
    "OverwriteSubrecipe",
    "OverwriteSource",
    "OverwriteCategory",
    "OverwriteRemark",
    "OverwriteDescription",
    "OverwriteNotes",
    "OverwriteAdditionalNotes",
    "OverwriteIngredient",
    "OverwriteProcedure",
    "OverwriteKeyword",
    "OverwriteAllergen",
];

static CREATE_BATCH: LazyLock<String> = LazyLock::new(|| {
    let mut args = vec![
        r#""FileName" => $1"#.to_string(),
        r#""CompareByName" => 1"#.to_string(),
        r#""CompareIngredientByName" => 1"#.to_string(),
        r#""CodeSite" => $2"#.to_string(),
        r#""CodeSetPrice" => 1"#.to_string(),
        r#""CodeTrans" => 1"#.to_string(),
        r#""CodeUser" => $3"#.to_string(),
        r#""SiteLanguage" => $4"#.to_string(),
    ];
    args.extend(OVERWRITE_FLAGS.iter().map(|flag| format!(r#""{flag}" => 1"#)));

    format!(
        r#"SELECT "IdMain" FROM dbo."usp_RecipeImport_xls"({})"#,
        args.join(", ")
    )
});

/// Parameters of the batch-create call that vary per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Passed as `FileName`.
    pub batch_label: String,
    pub code_site: i32,
    pub code_user: i32,
    pub site_language: i32,
}

/// Bound every following statement of the current transaction.
pub async fn set_statement_timeout(
    conn: &mut PgConnection,
    timeout: Duration,
) -> Result<(), sqlx::Error> {
    // SET does not accept bind parameters.
    let sql = format!("SET LOCAL statement_timeout = {}", timeout.as_millis());
    sqlx::query(&sql).execute(conn).await?;
    Ok(())
}

/// Insert staging rows with one multi-row statement.
///
/// # Returns
/// Number of rows the database reports as inserted.
pub async fn insert_staging_rows(
    conn: &mut PgConnection,
    data: &TemplateColumns,
) -> Result<u64, sqlx::Error> {
    if data.is_empty() {
        return Ok(0);
    }

    let [c1, c2, c3, c4, c5, c6, c7, c8] = &data.columns;
    let result = sqlx::query(INSERT_STAGING_ROWS)
        .bind(c1)
        .bind(c2)
        .bind(c3)
        .bind(c4)
        .bind(c5)
        .bind(c6)
        .bind(c7)
        .bind(c8)
        .execute(conn)
        .await?;

    log::trace!("bulk inserted {} staging rows", result.rows_affected());
    Ok(result.rows_affected())
}

/// Call `usp_RecipeImport_xls` and drain its whole reply.
// `fetch_many` is the only query API that reports result-set boundaries,
// which the drain needs to count trailing sets.
#[allow(deprecated)]
pub async fn create_batch(
    conn: &mut PgConnection,
    request: &BatchRequest,
) -> Result<BatchReply, sqlx::Error> {
    let events = sqlx::query(CREATE_BATCH.as_str())
        .bind(&request.batch_label)
        .bind(request.code_site)
        .bind(request.code_user)
        .bind(request.site_language)
        .fetch_many(conn)
        .map(|item| {
            item.map(|step| match step {
                Either::Left(done) => ReplyEvent::ResultSetEnd {
                    rows_affected: done.rows_affected(),
                },
                Either::Right(row) => ReplyEvent::Row(row),
            })
        });

    let reply = read_batch_reply(events, |row: &PgRow| row.try_get::<Option<i32>, _>(0)).await?;
    log::debug!(
        "usp_RecipeImport_xls returned IdMain {:?} ({} trailing result sets)",
        reply.id_main,
        reply.trailing_result_sets
    );
    Ok(reply)
}

/// Call `usp_RecipeImport_xls_ImportRecipe` for a created batch.
pub async fn import_batch(conn: &mut PgConnection, id_main: i32) -> Result<(), sqlx::Error> {
    sqlx::query(IMPORT_BATCH).bind(id_main).execute(conn).await?;
    Ok(())
}
