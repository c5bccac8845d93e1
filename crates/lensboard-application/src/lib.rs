//! Application layer for Lensboard.
//!
//! Coordinates the backend client and the frame pool into per-camera stream
//! sessions.

pub mod stream_session;

pub use stream_session::{
    BatchReport, InitSummary, SessionConfig, SessionEvent, SessionSnapshot, StreamSessionManager,
};
