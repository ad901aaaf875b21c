use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{PopcornError, Result};

/// Runs `operation` unless `token` fires first.
///
/// A token that is already cancelled short-circuits before the future is
/// polled, so no write inside it can start.
pub(crate) async fn cancellable<T, F>(
    token: &CancellationToken,
    operation: &str,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(PopcornError::Cancelled(operation.to_string()));
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            Err(PopcornError::Cancelled(operation.to_string()))
        }
        result = future => result,
    }
}
