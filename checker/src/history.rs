//! Lazy paging over a subject's verification history.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};

use attest_types::VerificationResult;

use crate::client::VerificationClient;
use crate::error::CheckerError;

/// A finite stream of past results.
///
/// Results within a page are yielded newest first. Across pages the order is
/// the server's: the stream assumes page `n + 1` holds older results than
/// page `n` and does not reorder between pages.
///
/// Pages are fetched only as the stream is polled. An error ends the stream
/// after it is yielded. Ask the service for a new stream to restart.
pub type HistoryStream = BoxStream<'static, Result<VerificationResult, CheckerError>>;

enum Cursor {
    Start,
    Next(String),
    Done,
}

struct HistoryState {
    client: Arc<dyn VerificationClient>,
    subject_id: String,
    page_size: u32,
    cursor: Cursor,
    buffer: VecDeque<VerificationResult>,
}

pub(crate) fn history_stream(
    client: Arc<dyn VerificationClient>,
    subject_id: String,
    page_size: u32,
) -> HistoryStream {
    let state = HistoryState {
        client,
        subject_id,
        page_size,
        cursor: Cursor::Start,
        buffer: VecDeque::new(),
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.buffer.pop_front() {
                return Some((Ok(item), st));
            }
            let cursor = match &st.cursor {
                Cursor::Done => return None,
                Cursor::Start => None,
                Cursor::Next(c) => Some(c.clone()),
            };

            match st
                .client
                .history_page(&st.subject_id, cursor.as_deref(), st.page_size)
                .await
            {
                Ok(page) => {
                    // A cursor that does not move would page forever.
                    st.cursor = match page.next_cursor {
                        Some(next) if cursor.as_deref() != Some(next.as_str()) => {
                            Cursor::Next(next)
                        }
                        _ => Cursor::Done,
                    };
                    let mut items = page.items;
                    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                    st.buffer.extend(items);
                }
                Err(e) => {
                    tracing::warn!(subject = %st.subject_id, "history read failed: {e}");
                    st.cursor = Cursor::Done;
                    return Some((Err(e), st));
                }
            }
        }
    })
    .boxed()
}
