//! HttpStreamBackend - REST client for the camera analytics backend.
//!
//! Talks to the registry, stream control and frame endpoints over plain
//! HTTP/JSON. Every call is attempted exactly once; retry policy belongs to the
//! caller (the session manager retries frames on its next poll tick).

use async_trait::async_trait;
use bytes::Bytes;
use lensboard_core::config::Preferences;
use lensboard_core::{
    CameraDraft, CameraId, CameraRegistry, CameraSource, DailyCount, DetectionSummary,
    HourlyCount, LensError, ModelFilter, ModelType, Result, StreamBackend,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend client over HTTP.
#[derive(Clone, Debug)]
pub struct HttpStreamBackend {
    client: Client,
    base_url: String,
}

impl HttpStreamBackend {
    /// Creates a client for the given base URL with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LensError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from the persisted preferences.
    pub fn from_preferences(preferences: &Preferences) -> Result<Self> {
        Self::with_timeout(
            preferences.backend.base_url.clone(),
            preferences.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and turns transport failures and non-success statuses
    /// into `LensError`.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request.send().await.map_err(|err| {
            LensError::transport(
                format!("{action} request failed: {err}"),
                err.is_connect() || err.is_timeout(),
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
        response.json::<T>().await.map_err(|err| {
            if err.is_decode() {
                LensError::InvalidPayload(format!("Failed to parse {action} response: {err}"))
            } else {
                LensError::transport(format!("Failed to read {action} response: {err}"), err.is_timeout())
            }
        })
    }

    /// Fetches detection totals per model.
    pub async fn detection_summary(&self) -> Result<DetectionSummary> {
        let response = self
            .send(
                self.client.get(self.url("/api/detection-stats/summary")),
                "Detection summary",
            )
            .await?;
        Self::read_json(response, "detection summary").await
    }

    /// Lists class names seen by the selected model.
    pub async fn detection_classes(&self, model: ModelFilter) -> Result<Vec<String>> {
        let response = self
            .send(
                self.client
                    .get(self.url("/api/detection-stats/classes"))
                    .query(&[("model", model.query_value())]),
                "Detection classes",
            )
            .await?;
        Self::read_json(response, "detection classes").await
    }

    /// Hourly detection counts for the current day. `None` counts every class.
    pub async fn daily_stats(
        &self,
        model: ModelFilter,
        class_name: Option<&str>,
    ) -> Result<Vec<HourlyCount>> {
        let response = self
            .send(
                self.client
                    .get(self.url("/api/detection-stats/daily"))
                    .query(&stats_query(model, class_name)),
                "Daily stats",
            )
            .await?;
        Self::read_json(response, "daily stats").await
    }

    /// Daily detection counts for the last seven days. `None` counts every class.
    pub async fn weekly_stats(
        &self,
        model: ModelFilter,
        class_name: Option<&str>,
    ) -> Result<Vec<DailyCount>> {
        let response = self
            .send(
                self.client
                    .get(self.url("/api/detection-stats/weekly"))
                    .query(&stats_query(model, class_name)),
                "Weekly stats",
            )
            .await?;
        Self::read_json(response, "weekly stats").await
    }
}

fn stats_query<'a>(model: ModelFilter, class_name: Option<&'a str>) -> [(&'static str, &'a str); 2] {
    [
        ("model", model.query_value()),
        ("class_name", class_name.unwrap_or("all")),
    ]
}

#[async_trait]
impl StreamBackend for HttpStreamBackend {
    async fn list_cameras(&self) -> Result<Vec<CameraSource>> {
        let response = self
            .send(self.client.get(self.url("/api/cameras")), "List cameras")
            .await?;
        Self::read_json(response, "camera list").await
    }

    async fn start_stream(&self, id: CameraId, model: ModelType) -> Result<()> {
        let body = StartStreamRequest { model_type: model };
        self.send(
            self.client
                .post(self.url(&format!("/start_camera_stream/{id}")))
                .json(&body),
            "Start stream",
        )
        .await?;
        tracing::debug!(camera_id = %id, model = %model, "Stream start accepted");
        Ok(())
    }

    async fn stop_stream(&self, id: CameraId) -> Result<()> {
        self.send(
            self.client
                .post(self.url(&format!("/stop_camera_stream/{id}"))),
            "Stop stream",
        )
        .await?;
        tracing::debug!(camera_id = %id, "Stream stop accepted");
        Ok(())
    }

    async fn fetch_frame(&self, id: CameraId) -> Result<Bytes> {
        let response = self
            .send(
                self.client.get(self.url(&format!("/process_frame/{id}"))),
                "Fetch frame",
            )
            .await?;

        if response.status() != StatusCode::OK {
            return Err(LensError::InvalidPayload(format!(
                "Frame request for camera {id} answered {}",
                response.status()
            )));
        }

        let payload = response.bytes().await.map_err(|err| {
            LensError::transport(
                format!("Failed to read frame for camera {id}: {err}"),
                err.is_timeout(),
            )
        })?;

        if payload.is_empty() {
            return Err(LensError::InvalidPayload(format!(
                "Frame for camera {id} is empty"
            )));
        }

        Ok(payload)
    }
}

#[async_trait]
impl CameraRegistry for HttpStreamBackend {
    async fn list(&self) -> Result<Vec<CameraSource>> {
        self.list_cameras().await
    }

    async fn create(&self, draft: &CameraDraft) -> Result<CameraDraft> {
        let response = self
            .send(
                self.client.post(self.url("/api/create_camera")).json(draft),
                "Create camera",
            )
            .await?;
        Self::read_json(response, "create camera").await
    }

    async fn update(&self, id: CameraId, draft: &CameraDraft) -> Result<()> {
        self.send(
            self.client
                .put(self.url(&format!("/api/cameras/{id}")))
                .json(draft),
            "Update camera",
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: CameraId) -> Result<()> {
        self.send(
            self.client.delete(self.url(&format!("/api/cameras/{id}"))),
            "Delete camera",
        )
        .await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct StartStreamRequest {
    model_type: ModelType,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Value,
}

/// Maps a non-success response to `LensError::Http`.
///
/// FastAPI-style `{"detail": ...}` bodies are unwrapped; anything else is kept
/// verbatim.
fn map_http_error(status: StatusCode, body: String) -> LensError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|wrapper| match wrapper.detail {
            Value::String(detail) => detail,
            other => other.to_string(),
        })
        .unwrap_or_else(|_| body.clone());

    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    } else {
        message
    };

    LensError::http(status.as_u16(), message)
}
