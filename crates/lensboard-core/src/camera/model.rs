//! Camera domain model.
//!
//! A camera source is owned by the backend registry. The client only reads it,
//! except through the explicit CRUD calls on [`super::CameraRegistry`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier assigned to a camera by the backend registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(pub i64);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CameraId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Kind of capture source.
///
/// The registry stores this as free text. Matching is case-insensitive and
/// unknown values are kept verbatim so that they survive a read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceKind {
    /// Local capture device (webcam index).
    Live,
    /// Pre-recorded video file.
    Recorded,
    /// Network RTSP stream.
    Rtsp,
    /// Any other value the registry returned.
    Other(String),
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::Live => "live",
            SourceKind::Recorded => "recorded",
            SourceKind::Rtsp => "rtsp",
            SourceKind::Other(raw) => raw,
        }
    }
}

impl From<String> for SourceKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "live" => SourceKind::Live,
            "recorded" => SourceKind::Recorded,
            "rtsp" => SourceKind::Rtsp,
            _ => SourceKind::Other(raw),
        }
    }
}

impl From<&str> for SourceKind {
    fn from(raw: &str) -> Self {
        SourceKind::from(raw.to_string())
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured capture source as returned by `GET /api/cameras`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSource {
    pub id: CameraId,
    /// Display name.
    pub source_name: String,
    pub stream_type: SourceKind,
    /// Device index for live sources, URL otherwise.
    pub stream: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CameraSource {
    /// Whether this source can be driven by the live stream controls.
    pub fn is_live(&self) -> bool {
        self.stream_type == SourceKind::Live
    }

    /// Name for display; falls back to `Camera <id>` when the registry name is blank.
    pub fn display_name(&self) -> String {
        if self.source_name.trim().is_empty() {
            format!("Camera {}", self.id)
        } else {
            self.source_name.clone()
        }
    }
}

/// Body for creating or updating a camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDraft {
    pub source_name: String,
    pub stream_type: SourceKind,
    pub stream: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
}

impl CameraDraft {
    /// Creates a draft for a local webcam, the registry's default kind.
    pub fn live(source_name: impl Into<String>, device_index: u32) -> Self {
        Self {
            source_name: source_name.into(),
            stream_type: SourceKind::Live,
            stream: device_index.to_string(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl From<&CameraSource> for CameraDraft {
    fn from(source: &CameraSource) -> Self {
        Self {
            source_name: source.source_name.clone(),
            stream_type: source.stream_type.clone(),
            stream: source.stream.clone(),
            location: source.location.clone(),
        }
    }
}
