pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod stream;

// Re-export common error type
pub use error::{LensError, Result};

pub use camera::{CameraDraft, CameraId, CameraRegistry, CameraSource, SourceKind};
pub use frame::{FrameHandle, FrameHandleId, FramePool, PoolStats};
pub use stream::{
    DailyCount, DetectionSummary, HourlyCount, ModelFilter, ModelType, StreamBackend,
};
