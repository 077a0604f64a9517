//! Reading the reply of `usp_RecipeImport_xls`.
//!
//! The procedure answers with several result sets: the new `IdMain` comes
//! first, validation counts and details follow. The connection cannot run
//! another statement until every trailing result set has been consumed, so
//! [`read_batch_reply`] always drains the stream to its end even though only
//! the first row is used.

use futures::{Stream, StreamExt};

/// One event of a multi-result-set reply.
#[derive(Debug)]
pub enum ReplyEvent<R> {
    Row(R),
    /// End of the current result set.
    ResultSetEnd { rows_affected: u64 },
}

/// Outcome of the batch-create call after the reply was fully drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReply {
    /// First column of the first row of the first result set.
    pub id_main: Option<i32>,
    /// Result sets consumed after the primary one.
    pub trailing_result_sets: usize,
    /// Rows consumed across the trailing result sets.
    pub trailing_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyState {
    Primary { seen_row: bool },
    Draining,
}

/// Consume a reply stream completely and extract the batch id.
///
/// `extract_id` is applied to the first row of the primary result set only;
/// rows of trailing result sets are counted and dropped.
pub async fn read_batch_reply<S, R, F>(
    mut events: S,
    extract_id: F,
) -> Result<BatchReply, sqlx::Error>
where
    S: Stream<Item = Result<ReplyEvent<R>, sqlx::Error>> + Unpin,
    F: Fn(&R) -> Result<Option<i32>, sqlx::Error>,
{
    let mut reply = BatchReply::default();
    let mut state = ReplyState::Primary { seen_row: false };
    // A trailing result set is open between its first row and its end marker.
    let mut trailing_open = false;

    while let Some(event) = events.next().await {
        match (state, event?) {
            (ReplyState::Primary { seen_row: false }, ReplyEvent::Row(row)) => {
                reply.id_main = extract_id(&row)?;
                state = ReplyState::Primary { seen_row: true };
            }
            (ReplyState::Primary { .. }, ReplyEvent::Row(_)) => {}
            (ReplyState::Primary { .. }, ReplyEvent::ResultSetEnd { .. }) => {
                state = ReplyState::Draining;
            }
            (ReplyState::Draining, ReplyEvent::Row(_)) => {
                reply.trailing_rows += 1;
                trailing_open = true;
            }
            (ReplyState::Draining, ReplyEvent::ResultSetEnd { rows_affected }) => {
                reply.trailing_result_sets += 1;
                trailing_open = false;
                log::trace!(
                    "drained trailing result set {} ({} rows affected)",
                    reply.trailing_result_sets,
                    rows_affected
                );
            }
        }
    }

    if trailing_open {
        reply.trailing_result_sets += 1;
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    type Event = Result<ReplyEvent<Option<i32>>, sqlx::Error>;

    fn row(value: Option<i32>) -> Event {
        Ok(ReplyEvent::Row(value))
    }

    fn end() -> Event {
        Ok(ReplyEvent::ResultSetEnd { rows_affected: 0 })
    }

    async fn read(events: Vec<Event>) -> Result<BatchReply, sqlx::Error> {
        read_batch_reply(stream::iter(events), |value: &Option<i32>| Ok(*value)).await
    }

    #[tokio::test]
    async fn takes_id_from_first_result_set() {
        let reply = read(vec![row(Some(42)), end()]).await.expect("reply");
        assert_eq!(reply.id_main, Some(42));
        assert_eq!(reply.trailing_result_sets, 0);
    }

    #[tokio::test]
    async fn drains_every_trailing_result_set() {
        let reply = read(vec![
            row(Some(7)),
            end(),
            row(Some(0)),
            end(),
            row(Some(1)),
            row(Some(2)),
            end(),
            end(),
        ])
        .await
        .expect("reply");

        assert_eq!(reply.id_main, Some(7));
        assert_eq!(reply.trailing_result_sets, 3);
        assert_eq!(reply.trailing_rows, 3);
    }

    #[tokio::test]
    async fn later_rows_never_replace_the_id() {
        let reply = read(vec![row(Some(5)), row(Some(6)), end(), row(Some(9)), end()])
            .await
            .expect("reply");
        assert_eq!(reply.id_main, Some(5));
    }

    #[tokio::test]
    async fn empty_first_result_set_yields_no_id() {
        let reply = read(vec![end(), row(Some(3)), end()]).await.expect("reply");
        assert_eq!(reply.id_main, None);
        assert_eq!(reply.trailing_result_sets, 1);
    }

    #[tokio::test]
    async fn null_id_is_reported_as_missing() {
        let reply = read(vec![row(None), end()]).await.expect("reply");
        assert_eq!(reply.id_main, None);
    }

    #[tokio::test]
    async fn unterminated_trailing_set_is_counted() {
        let reply = read(vec![row(Some(1)), end(), row(Some(2))])
            .await
            .expect("reply");
        assert_eq!(reply.trailing_result_sets, 1);
    }

    #[tokio::test]
    async fn stream_errors_are_propagated() {
        let events = vec![
            row(Some(1)),
            end(),
            Err(sqlx::Error::Protocol("connection reset".into())),
        ];
        assert!(read(events).await.is_err());
    }
}
