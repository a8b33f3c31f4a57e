//! Tunnel acquisition pipeline
//!
//! Registers the session, retrieves the four descriptor chunks
//! concurrently, and concatenates them in index order. The descriptor is
//! only meaningful fully assembled, so a single failure fails the whole
//! acquisition; there is no retry here, a fresh `acquire` is the caller's
//! re-attempt path.

use std::future::Future;

use tracing::{debug, info};

use super::{ApiClient, ApiError};

/// Number of descriptor chunks per session
pub const CHUNK_COUNT: u32 = 4;

/// Result of a successful acquisition
#[derive(Debug, Clone)]
pub struct AcquiredTunnel {
    pub session_id: String,
    pub descriptor: String,
}

/// Acquisition errors; both abort before any game state exists
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("Session registration failed: {0}")]
    Registration(#[source] ApiError),

    #[error("Chunk retrieval failed: {0}")]
    ChunkFetch(#[source] ApiError),
}

/// Register a session and assemble its tunnel descriptor
pub async fn acquire(
    api: &ApiClient,
    name: &str,
    complexity: u32,
) -> Result<AcquiredTunnel, AcquireError> {
    let session_id = api
        .register_session(name, complexity)
        .await
        .map_err(AcquireError::Registration)?;
    info!(session_id = %session_id, complexity, "Session registered");

    let descriptor = fetch_descriptor(|chunk_no| api.fetch_chunk(&session_id, chunk_no)).await?;
    debug!(
        chunks = CHUNK_COUNT,
        descriptor_len = descriptor.len(),
        "Tunnel descriptor assembled"
    );

    Ok(AcquiredTunnel {
        session_id,
        descriptor,
    })
}

/// Fetch chunks 1..=4 concurrently and concatenate them in index order.
///
/// `try_join!` yields results positionally, so the concatenation order is
/// fixed by the requested chunk number, never by arrival order.
pub async fn fetch_descriptor<F, Fut>(fetch: F) -> Result<String, AcquireError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    let (c1, c2, c3, c4) = tokio::try_join!(fetch(1), fetch(2), fetch(3), fetch(4))
        .map_err(AcquireError::ChunkFetch)?;

    Ok([c1, c2, c3, c4].concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn concatenates_in_index_order_regardless_of_completion_order() {
        // Later chunks complete first.
        let descriptor = fetch_descriptor(|chunk_no| async move {
            tokio::time::sleep(Duration::from_millis(5 * (5 - chunk_no) as u64)).await;
            Ok(format!("C{chunk_no}"))
        })
        .await
        .unwrap();

        assert_eq!(descriptor, "C1C2C3C4");
    }

    #[tokio::test]
    async fn one_failed_chunk_fails_the_acquisition() {
        let result = fetch_descriptor(|chunk_no| async move {
            if chunk_no == 3 {
                Err(ApiError::Api {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(format!("C{chunk_no}"))
            }
        })
        .await;

        assert!(matches!(result, Err(AcquireError::ChunkFetch(_))));
    }
}
