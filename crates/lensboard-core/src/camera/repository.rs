//! Camera registry trait.
//!
//! Defines the CRUD interface the settings surface uses to manage cameras.

use super::model::{CameraDraft, CameraId, CameraSource};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract registry of configured camera sources.
///
/// The registry lives on the backend; implementations translate these calls
/// into remote requests. None of the calls are retried automatically.
#[async_trait]
pub trait CameraRegistry: Send + Sync {
    /// Lists every configured camera, in registry order.
    async fn list(&self) -> Result<Vec<CameraSource>>;

    /// Registers a new camera.
    ///
    /// # Returns
    ///
    /// The draft as echoed back by the registry.
    async fn create(&self, draft: &CameraDraft) -> Result<CameraDraft>;

    /// Replaces the attributes of an existing camera.
    async fn update(&self, id: CameraId, draft: &CameraDraft) -> Result<()>;

    /// Deletes a camera.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Camera deleted
    /// - `Err(LensError::Http { status: 404, .. })`: No such camera
    async fn delete(&self, id: CameraId) -> Result<()>;
}
