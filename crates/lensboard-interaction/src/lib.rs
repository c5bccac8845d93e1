//! Remote collaborators for Lensboard.
//!
//! Currently a single implementation: [`HttpStreamBackend`], which speaks the
//! analytics backend's REST API.

pub mod http_backend;

pub use http_backend::HttpStreamBackend;
