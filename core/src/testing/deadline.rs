use std::{future::Future, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Timeout (exceeded {}ms)", .limit.as_millis())]
pub struct DeadlineExceeded {
    pub limit: Duration,
}

/// Drives `body` to completion unless `limit` elapses first.
///
/// The body's own result (value or error) is returned unchanged. When the limit
/// elapses the body future is dropped in place, which is what cancels whatever
/// it was awaiting (e.g. a child's exit), and `DeadlineExceeded` is converted
/// into the caller's error type.
///
/// The timer lives only as long as this call, so a deadline can never fire
/// against code that runs after it returned. Nested deadlines compose: whichever
/// expires first wins, and both report the same error kind carrying their own
/// `limit`.
pub async fn with_deadline<F, T, E>(limit: Duration, body: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<DeadlineExceeded>,
{
    match tokio::time::timeout(limit, body).await {
        Ok(res) => res,
        Err(_elapsed) => Err(DeadlineExceeded { limit }.into()),
    }
}
