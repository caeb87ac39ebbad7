pub mod backend_api;

use std::future::Future;
use std::time::Duration;

pub use backend_api::{HttpReservationClient, ReservationApi, TransportError, TurnResponse};

/// Bounds a backend call so a stalled request cannot wedge its caller.
pub async fn with_timeout<T, F>(limit: Duration, request: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Backend request exceeded {:?}", limit);
            Err(TransportError::Timeout(limit))
        }
    }
}
