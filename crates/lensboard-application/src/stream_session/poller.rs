//! Per-camera polling task.

use super::manager::Shared;
use lensboard_core::CameraId;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Counts a poller from spawn until its future is dropped, panics included.
pub(super) struct LiveGuard(Arc<Shared>);

impl LiveGuard {
    pub(super) fn enter(shared: &Arc<Shared>) -> Self {
        shared.live_pollers.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(shared))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.live_pollers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fetches a frame for `camera_id` every poll interval until `token` fires.
///
/// The fetch itself is not raced against cancellation: a result that lands
/// after the token fired is handed to `publish`, which discards it.
pub(super) async fn run(guard: LiveGuard, camera_id: CameraId, token: CancellationToken) {
    let shared = &guard.0;

    let mut ticker = interval(shared.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately; the first fetch waits one period.
    ticker.tick().await;

    let mut consecutive_failures: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match shared.backend.fetch_frame(camera_id).await {
            Ok(payload) => {
                if consecutive_failures > 0 {
                    tracing::info!(
                        camera_id = %camera_id,
                        failures = consecutive_failures,
                        "Frame polling recovered"
                    );
                    consecutive_failures = 0;
                }
                let handle = shared.pool.acquire(payload);
                if !shared.publish(camera_id, &token, handle) {
                    break;
                }
            }
            Err(err) => {
                consecutive_failures += 1;
                if consecutive_failures == 1 {
                    tracing::warn!(camera_id = %camera_id, error = %err, "Frame fetch failed");
                } else {
                    tracing::debug!(
                        camera_id = %camera_id,
                        error = %err,
                        failures = consecutive_failures,
                        "Frame fetch still failing"
                    );
                }
                if token.is_cancelled() {
                    break;
                }
            }
        }
    }

    tracing::debug!(camera_id = %camera_id, "Poller stopped");
}
