//! Stream session management.
//!
//! One session per live camera: whether its stream runs on the backend, the
//! polling task that keeps its frame fresh, and the frame handle on display.

mod manager;
mod model;
mod poller;

pub use manager::StreamSessionManager;
pub use model::{BatchReport, InitSummary, SessionConfig, SessionEvent, SessionSnapshot};
