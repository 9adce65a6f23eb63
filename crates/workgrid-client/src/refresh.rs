//! Single-flight token refresh.
//!
//! A refresh token is single-use, so two concurrent refreshes with the same
//! token would race and one would be rejected as a reuse. The coordinator
//! makes every caller that arrives while a refresh is running await that
//! same refresh instead of starting its own.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientResult;
use crate::session::SessionState;

type Flight<T> = Shared<BoxFuture<'static, ClientResult<T>>>;

/// Coalesces concurrent refresh attempts into one call.
pub struct RefreshCoordinator<T = SessionState>
where
    T: Clone + Send + Sync + 'static,
{
    in_flight: Mutex<Option<(u64, Flight<T>)>>,
    next_id: AtomicU64,
}

impl<T> Default for RefreshCoordinator<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            in_flight: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<T> std::fmt::Debug for RefreshCoordinator<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("started", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T> RefreshCoordinator<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the refresh in progress, or starts one with `start`.
    ///
    /// `start` is only called when no refresh is running. Every joined caller
    /// receives the same result, including the same error.
    pub async fn run<F, Fut>(&self, start: F) -> ClientResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (id, flight) = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some((id, flight)) => {
                    debug!(flight = id, "Joining refresh in progress");
                    (*id, flight.clone())
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let flight = start().boxed().shared();
                    *slot = Some((id, flight.clone()));
                    (id, flight)
                }
            }
        };

        let result = flight.await;

        // Whoever observes completion first frees the slot, so a caller that
        // drops out early cannot leave a finished flight behind.
        let mut slot = self.in_flight.lock().await;
        if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
            *slot = None;
        }
        result
    }

    /// Number of refreshes actually started.
    pub fn started(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::error::ClientError;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_call() {
        let coordinator = Arc::new(RefreshCoordinator::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coordinator = Arc::clone(&coordinator);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                coordinator
                    .run(move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(7)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.started(), 1);
    }

    #[tokio::test]
    async fn test_sequential_calls_start_new_flights() {
        let coordinator = RefreshCoordinator::<u32>::new();
        assert_eq!(coordinator.run(|| async { Ok(1) }).await.unwrap(), 1);
        assert_eq!(coordinator.run(|| async { Ok(2) }).await.unwrap(), 2);
        assert_eq!(coordinator.started(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_shared_then_cleared() {
        let coordinator = Arc::new(RefreshCoordinator::<u32>::new());

        let a = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .run(|| async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(ClientError::NotAuthenticated)
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let b = coordinator.run(|| async { Ok(99) }).await;

        assert!(matches!(a.await.unwrap(), Err(ClientError::NotAuthenticated)));
        assert!(matches!(b, Err(ClientError::NotAuthenticated)));

        assert_eq!(coordinator.run(|| async { Ok(3) }).await.unwrap(), 3);
    }
}
