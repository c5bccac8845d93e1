use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::Json;
use lensboard_core::{
    CameraDraft, CameraId, CameraRegistry, LensError, ModelFilter, ModelType, SourceKind,
    StreamBackend,
};
use lensboard_interaction::HttpStreamBackend;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Recorded {
    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<HashMap<String, String>> {
        self.queries.lock().unwrap().clone()
    }
}

async fn list_cameras(State(rec): State<Recorded>) -> Json<Value> {
    rec.push("GET /api/cameras".to_string());
    Json(json!([
        {"id": 1, "source_name": "Front Door", "stream_type": "live", "stream": "0",
         "location": "Main Entrance", "created_at": "2024-11-02 10:15:00"},
        {"id": 2, "source_name": "Parking", "stream_type": "RTSP",
         "stream": "rtsp://10.0.0.4/stream", "location": null, "created_at": null}
    ]))
}

async fn start_stream(
    State(rec): State<Recorded>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    rec.push(format!("POST /start_camera_stream/{id}"));
    rec.bodies.lock().unwrap().push(body.clone());
    if id == 404 {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "404: Camera not found"})));
    }
    (
        StatusCode::OK,
        Json(json!({"message": format!("Camera {id} stream started"), "model_type": body["model_type"]})),
    )
}

async fn stop_stream(State(rec): State<Recorded>, Path(id): Path<i64>) -> Json<Value> {
    rec.push(format!("POST /stop_camera_stream/{id}"));
    Json(json!({"message": format!("Camera {id} stream stopped")}))
}

async fn process_frame(State(rec): State<Recorded>, Path(id): Path<i64>) -> impl IntoResponse {
    rec.push(format!("GET /process_frame/{id}"));
    match id {
        1 => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/jpeg")],
            vec![0xff, 0xd8, 0xff, 0xe0],
        )
            .into_response(),
        3 => (StatusCode::OK, [(header::CONTENT_TYPE, "image/jpeg")], Vec::new()).into_response(),
        5 => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            (StatusCode::OK, vec![1u8]).into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "No frame available for this camera"})),
        )
            .into_response(),
    }
}

async fn create_camera(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    rec.push("POST /api/create_camera".to_string());
    rec.bodies.lock().unwrap().push(body.clone());
    Json(body)
}

async fn update_camera(
    State(rec): State<Recorded>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.push(format!("PUT /api/cameras/{id}"));
    rec.bodies.lock().unwrap().push(body);
    Json(json!({"message": "updated"}))
}

async fn delete_camera(State(rec): State<Recorded>, Path(id): Path<i64>) -> impl IntoResponse {
    rec.push(format!("DELETE /api/cameras/{id}"));
    if id == 99 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Camera not found"})));
    }
    (StatusCode::OK, Json(json!({"message": format!("Camera {id} deleted successfully")})))
}

async fn summary() -> Json<Value> {
    Json(json!({
        "totalDetections": 10,
        "objectDetections": 6,
        "segmentations": 3,
        "poseEstimations": 1
    }))
}

async fn classes(
    State(rec): State<Recorded>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    rec.push("GET /api/detection-stats/classes".to_string());
    rec.queries.lock().unwrap().push(query.clone());
    match query.get("model").map(String::as_str) {
        // The backend declares `model` without a default.
        None => (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": "model is required"}))),
        Some("pose") => (StatusCode::OK, Json(json!(["person"]))),
        Some(_) => (StatusCode::OK, Json(json!(["car", "dog", "person"]))),
    }
}

async fn daily(
    State(rec): State<Recorded>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    rec.push("GET /api/detection-stats/daily".to_string());
    rec.queries.lock().unwrap().push(query);
    Json(json!([
        {"timestamp": "2024-11-02T09:00:00", "count": 2},
        {"timestamp": "2024-11-02T10:00:00", "count": 5}
    ]))
}

async fn weekly(
    State(rec): State<Recorded>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    rec.push("GET /api/detection-stats/weekly".to_string());
    let broken = query.get("class_name").map(String::as_str) == Some("broken");
    rec.queries.lock().unwrap().push(query);
    if broken {
        return Json(json!([{"date": 20241101, "count": 1}]));
    }
    Json(json!([
        {"date": "2024-10-31T00:00:00", "count": 12},
        {"date": "2024-11-01T00:00:00", "count": 0},
        {"date": "2024-11-02T00:00:00", "count": 7}
    ]))
}

async fn spawn_server() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/cameras", get(list_cameras))
        .route("/api/cameras/:id", delete(delete_camera).put(update_camera))
        .route("/api/create_camera", post(create_camera))
        .route("/api/detection-stats/summary", get(summary))
        .route("/api/detection-stats/classes", get(classes))
        .route("/api/detection-stats/daily", get(daily))
        .route("/api/detection-stats/weekly", get(weekly))
        .route("/start_camera_stream/:id", post(start_stream))
        .route("/stop_camera_stream/:id", post(stop_stream))
        .route("/process_frame/:id", get(process_frame))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), recorded)
}

#[tokio::test]
async fn test_list_cameras_parses_registry() {
    let (base_url, recorded) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let cameras = backend.list_cameras().await.unwrap();

    assert_eq!(cameras.len(), 2);
    assert_eq!(cameras[0].id, CameraId(1));
    assert!(cameras[0].is_live());
    assert_eq!(cameras[1].stream_type, SourceKind::Rtsp);
    assert_eq!(recorded.calls(), vec!["GET /api/cameras"]);
}

#[tokio::test]
async fn test_start_and_stop_stream() {
    let (base_url, recorded) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    backend
        .start_stream(CameraId(2), ModelType::Segmentation)
        .await
        .unwrap();
    backend.stop_stream(CameraId(2)).await.unwrap();

    assert_eq!(
        recorded.calls(),
        vec!["POST /start_camera_stream/2", "POST /stop_camera_stream/2"]
    );
    assert_eq!(recorded.bodies(), vec![json!({"model_type": "segmentation"})]);
}

#[tokio::test]
async fn test_start_stream_failure_carries_detail() {
    let (base_url, _) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let err = backend
        .start_stream(CameraId(404), ModelType::Pose)
        .await
        .unwrap_err();

    assert_eq!(err, LensError::http(500, "404: Camera not found"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetch_frame_outcomes() {
    let (base_url, _) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let frame = backend.fetch_frame(CameraId(1)).await.unwrap();
    assert_eq!(&frame[..], &[0xff, 0xd8, 0xff, 0xe0]);

    let inactive = backend.fetch_frame(CameraId(2)).await.unwrap_err();
    assert_eq!(inactive, LensError::http(404, "No frame available for this camera"));

    let empty = backend.fetch_frame(CameraId(3)).await.unwrap_err();
    assert!(matches!(empty, LensError::InvalidPayload(_)));
}

#[tokio::test]
async fn test_fetch_frame_timeout_is_retryable() {
    let (base_url, _) = spawn_server().await;
    let backend = HttpStreamBackend::with_timeout(base_url, Duration::from_millis(50)).unwrap();

    let err = backend.fetch_frame(CameraId(5)).await.unwrap_err();

    assert!(matches!(err, LensError::Transport { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpStreamBackend::new(format!("http://{addr}")).unwrap();
    let err = backend.list_cameras().await.unwrap_err();

    assert!(matches!(err, LensError::Transport { retryable: true, .. }));
}

#[tokio::test]
async fn test_registry_crud() {
    let (base_url, recorded) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();
    let draft = CameraDraft::live("Lobby", 0).with_location("Ground floor");

    let created = backend.create(&draft).await.unwrap();
    assert_eq!(created, draft);

    backend.update(CameraId(4), &draft).await.unwrap();
    backend.delete(CameraId(4)).await.unwrap();

    let missing = backend.delete(CameraId(99)).await.unwrap_err();
    assert!(missing.status() == Some(404));

    assert_eq!(
        recorded.calls(),
        vec![
            "POST /api/create_camera",
            "PUT /api/cameras/4",
            "DELETE /api/cameras/4",
            "DELETE /api/cameras/99",
        ]
    );
    assert_eq!(recorded.bodies()[0]["location"], "Ground floor");
}

#[tokio::test]
async fn test_detection_summary() {
    let (base_url, _) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let summary = backend.detection_summary().await.unwrap();

    assert_eq!(summary.total_detections, 10);
    assert_eq!(summary.for_model(ModelType::ObjectDetection), 6);
}

#[tokio::test]
async fn test_detection_classes_sends_model_filter() {
    let (base_url, recorded) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let all = backend.detection_classes(ModelFilter::All).await.unwrap();
    let pose = backend
        .detection_classes(ModelType::Pose.into())
        .await
        .unwrap();

    assert_eq!(all, vec!["car", "dog", "person"]);
    assert_eq!(pose, vec!["person"]);
    let queries = recorded.queries();
    assert_eq!(queries[0]["model"], "all");
    assert_eq!(queries[1]["model"], "pose");
}

#[tokio::test]
async fn test_daily_stats_defaults_class_to_all() {
    let (base_url, recorded) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let hourly = backend.daily_stats(ModelFilter::All, None).await.unwrap();

    assert_eq!(hourly.len(), 2);
    assert_eq!(hourly[1].timestamp.to_string(), "2024-11-02 10:00:00");
    assert_eq!(hourly[1].count, 5);
    assert_eq!(
        recorded.queries(),
        vec![HashMap::from([
            ("model".to_string(), "all".to_string()),
            ("class_name".to_string(), "all".to_string()),
        ])]
    );
}

#[tokio::test]
async fn test_weekly_stats_filters_by_model_and_class() {
    let (base_url, recorded) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let days = backend
        .weekly_stats(ModelType::ObjectDetection.into(), Some("car"))
        .await
        .unwrap();

    assert_eq!(days.iter().map(|d| d.count).collect::<Vec<_>>(), vec![12, 0, 7]);
    assert_eq!(days[0].date.to_string(), "2024-10-31 00:00:00");
    assert_eq!(recorded.calls(), vec!["GET /api/detection-stats/weekly"]);
    assert_eq!(recorded.queries()[0]["model"], "objectDetection");
    assert_eq!(recorded.queries()[0]["class_name"], "car");
}

#[tokio::test]
async fn test_malformed_stats_row_is_invalid_payload() {
    let (base_url, _) = spawn_server().await;
    let backend = HttpStreamBackend::new(base_url).unwrap();

    let err = backend
        .weekly_stats(ModelFilter::All, Some("broken"))
        .await
        .unwrap_err();

    assert!(matches!(err, LensError::InvalidPayload(_)));
}
