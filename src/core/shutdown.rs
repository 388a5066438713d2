use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Drives `server` to completion, giving up once `deadline` has passed since
/// `shutdown` was cancelled.
///
/// Returns `None` when the deadline won, leaving any remaining connections to
/// be dropped with the process.
pub async fn drain_with_deadline<F>(
    server: F,
    shutdown: &CancellationToken,
    deadline: Duration,
) -> Option<F::Output>
where
    F: Future,
{
    let expired = async {
        shutdown.cancelled().await;
        tokio::time::sleep(deadline).await;
    };

    tokio::select! {
        output = server => Some(output),
        _ = expired => {
            tracing::warn!(
                deadline_secs = deadline.as_secs_f64(),
                "Connections still open after shutdown deadline, exiting anyway"
            );
            None
        }
    }
}
