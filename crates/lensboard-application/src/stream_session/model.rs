//! Values the stream session manager hands out to callers.

use chrono::{DateTime, Utc};
use lensboard_core::{CameraId, FrameHandleId, LensError, ModelType, Result};
use std::time::Duration;

/// Tunables for a [`super::StreamSessionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Period between two frame fetches of one camera.
    pub poll_interval: Duration,
    /// Buffered events per subscriber before the oldest are dropped.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(lensboard_core::config::DEFAULT_POLL_INTERVAL_MS),
            event_capacity: 256,
        }
    }
}

impl From<&lensboard_core::config::Preferences> for SessionConfig {
    fn from(preferences: &lensboard_core::config::Preferences) -> Self {
        Self {
            poll_interval: preferences.poll_interval(),
            ..Self::default()
        }
    }
}

/// Read-only view of one camera's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub camera_id: CameraId,
    pub name: String,
    pub location: Option<String>,
    pub active: bool,
    /// Whether a polling task is registered for the camera.
    pub polling: bool,
    /// Handle of the frame currently on display.
    pub frame: Option<FrameHandleId>,
    /// Number of frames published since the session was created.
    pub frame_sequence: u64,
    /// Model the stream was last started with, if it was started from here.
    pub model: Option<ModelType>,
}

/// Outcome of [`super::StreamSessionManager::initialize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitSummary {
    /// Cameras in the registry, of any kind.
    pub registered: usize,
    /// Live cameras that got a session.
    pub live: usize,
    /// Live cameras whose first frame fetch found a running stream.
    pub already_streaming: Vec<CameraId>,
    /// Set when the registry could not be read; sessions are then empty.
    pub registry_error: Option<LensError>,
}

/// Per-camera settlement of a batch start or stop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<CameraId>,
    pub failed: Vec<(CameraId, LensError)>,
}

impl BatchReport {
    /// True when every camera in the batch succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<CameraId> {
        self.failed.iter().map(|(id, _)| *id).collect()
    }

    /// Converts any failure into `LensError::PartialFailure`.
    pub fn into_result(self) -> Result<Vec<CameraId>> {
        if self.failed.is_empty() {
            Ok(self.succeeded)
        } else {
            Err(LensError::PartialFailure {
                failed: self.failed,
            })
        }
    }
}

/// Notifications for whoever renders the sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        camera_id: CameraId,
        model: Option<ModelType>,
    },
    Stopped {
        camera_id: CameraId,
    },
    FramePublished {
        camera_id: CameraId,
        handle: FrameHandleId,
        sequence: u64,
        at: DateTime<Utc>,
    },
    TornDown,
}
