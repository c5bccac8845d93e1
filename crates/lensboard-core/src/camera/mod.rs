//! Camera domain module.
//!
//! # Module Structure
//!
//! - `model`: Camera source entities (`CameraSource`, `CameraId`, `SourceKind`, `CameraDraft`)
//! - `repository`: Registry trait for camera CRUD on the backend
//!
//! # Usage
//!
//! ```ignore
//! use lensboard_core::camera::{CameraSource, CameraId, SourceKind, CameraRegistry};
//! ```

mod model;
mod repository;

// Re-export public API
pub use model::{CameraDraft, CameraId, CameraSource, SourceKind};
pub use repository::CameraRegistry;
