//! Bounded remote calls
//!
//! An authorization check that never returns stalls the host log's write
//! path, so every call to a collaborator goes through [`bounded`].
//!
//! Bounds use [`tokio::time::timeout`]: the controller's async operations must
//! be polled inside a Tokio runtime with the time driver enabled, and panic
//! anywhere else.

use std::future::Future;
use std::time::Duration;

/// Run `call`, failing with `on_timeout(limit_ms)` if it outlives `limit`
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    call: F,
    on_timeout: impl FnOnce(u64) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_elapsed) => Err(on_timeout(millis(limit))),
    }
}

/// Bound of `limit` in whole milliseconds, saturating
pub(crate) fn millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_completed_calls() {
        let ok: Result<u8, String> =
            bounded(Duration::from_millis(50), async { Ok(7) }, |ms| format!("{ms}")).await;
        assert_eq!(ok, Ok(7));

        let err: Result<u8, String> = bounded(
            Duration::from_millis(50),
            async { Err("boom".to_string()) },
            |ms| format!("{ms}"),
        )
        .await;
        assert_eq!(err, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_times_out_stalled_calls() {
        let stalled: Result<u8, String> = bounded(
            Duration::from_millis(10),
            futures::future::pending(),
            |ms| format!("timed out after {ms}ms"),
        )
        .await;
        assert_eq!(stalled, Err("timed out after 10ms".to_string()));
    }
}
