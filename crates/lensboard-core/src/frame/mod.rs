//! Transient frame handles.
//!
//! A downloaded frame is registered in a [`FramePool`] and referenced through a
//! [`FrameHandle`], much like an object URL: the payload stays reachable for as
//! long as the handle is held and disappears the moment it is released.
//!
//! # Module Structure
//!
//! - `pool`: `FramePool`, `FrameHandle`, `FrameHandleId`, `PoolStats`

mod pool;

// Re-export public API
pub use pool::{FrameHandle, FrameHandleId, FramePool, PoolStats};
