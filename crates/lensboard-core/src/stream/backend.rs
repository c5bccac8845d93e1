//! Stream control trait.
//!
//! The session manager only ever talks to the backend through this trait, so
//! the HTTP client and in-memory test doubles are interchangeable.

use super::model::ModelType;
use crate::camera::{CameraId, CameraSource};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Remote collaborator that owns cameras and the analysis streams on them.
///
/// Every call is a fallible remote operation with no compensating
/// transaction. Implementations must not retry on their own.
#[async_trait]
pub trait StreamBackend: Send + Sync {
    /// Fetches the configured camera list.
    async fn list_cameras(&self) -> Result<Vec<CameraSource>>;

    /// Starts an analysis stream for one camera with the given model.
    async fn start_stream(&self, id: CameraId, model: ModelType) -> Result<()>;

    /// Stops the analysis stream for one camera.
    async fn stop_stream(&self, id: CameraId) -> Result<()>;

    /// Fetches the latest annotated frame for one camera.
    ///
    /// # Returns
    ///
    /// - `Ok(bytes)`: The encoded image, never empty
    /// - `Err(_)`: No stream is running for the camera, or the request failed
    async fn fetch_frame(&self, id: CameraId) -> Result<Bytes>;
}
