use super::model::{BatchReport, InitSummary, SessionConfig, SessionEvent, SessionSnapshot};
use super::poller;
use bytes::Bytes;
use futures::future::join_all;
use lensboard_core::{
    CameraId, CameraSource, FrameHandle, FramePool, LensError, ModelType, Result, StreamBackend,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// One camera's streaming state. Owned by the session table.
struct StreamSession {
    source: CameraSource,
    active: bool,
    current_frame: Option<FrameHandle>,
    /// Cancellation token of the running poller; `None` when no poller exists.
    poller: Option<CancellationToken>,
    frame_sequence: u64,
    model: Option<ModelType>,
    /// Replaced on every stop. A start request only takes effect if the
    /// generation it was issued under is still current when it settles.
    generation: u64,
}

impl StreamSession {
    fn new(source: CameraSource, generation: u64) -> Self {
        Self {
            source,
            active: false,
            current_frame: None,
            poller: None,
            frame_sequence: 0,
            model: None,
            generation,
        }
    }

    fn id(&self) -> CameraId {
        self.source.id
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            camera_id: self.source.id,
            name: self.source.display_name(),
            location: self.source.location.clone(),
            active: self.active,
            polling: self.poller.is_some(),
            frame: self.current_frame.as_ref().map(FrameHandle::id),
            frame_sequence: self.frame_sequence,
            model: self.model,
        }
    }

    /// Stops polling, releases the frame and moves the session to
    /// `generation`, which supersedes any start still in flight. Returns
    /// whether it was active.
    fn deactivate(&mut self, generation: u64) -> bool {
        let was_active = self.active;
        self.active = false;
        self.generation = generation;
        if let Some(token) = self.poller.take() {
            token.cancel();
        }
        if let Some(handle) = self.current_frame.take() {
            handle.release();
        }
        was_active
    }
}

#[derive(Default)]
struct SessionTable {
    /// Registry order.
    sessions: Vec<StreamSession>,
    torn_down: bool,
}

impl SessionTable {
    fn get(&self, id: CameraId) -> Option<&StreamSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    fn get_mut(&mut self, id: CameraId) -> Option<&mut StreamSession> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }
}

/// State shared between the manager and its pollers.
pub(super) struct Shared {
    pub(super) backend: Arc<dyn StreamBackend>,
    pub(super) pool: FramePool,
    pub(super) config: SessionConfig,
    pub(super) live_pollers: AtomicUsize,
    table: Mutex<SessionTable>,
    events: broadcast::Sender<SessionEvent>,
    root: CancellationToken,
    generations: AtomicU64,
}

impl Shared {
    fn table(&self) -> MutexGuard<'_, SessionTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Deactivates every session and returns the ids that were active.
    fn deactivate_all(&self, table: &mut SessionTable) -> Vec<CameraId> {
        table
            .sessions
            .iter_mut()
            .filter_map(|session| session.deactivate(self.next_generation()).then(|| session.id()))
            .collect()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Marks a session active and makes sure exactly one poller runs for it.
    ///
    /// With `issued_under` set, activation is refused with
    /// `LensError::Superseded` when the session was stopped or replaced since
    /// that generation was read.
    ///
    /// Must be called with the table lock held.
    fn activate(
        self: &Arc<Self>,
        table: &mut SessionTable,
        id: CameraId,
        model: Option<ModelType>,
        issued_under: Option<u64>,
    ) -> Result<()> {
        if table.torn_down {
            return Err(LensError::ShutDown);
        }
        let session = match (table.get_mut(id), issued_under) {
            (Some(session), Some(generation)) if session.generation != generation => {
                return Err(LensError::Superseded { camera_id: id });
            }
            (Some(session), _) => session,
            (None, Some(_)) => return Err(LensError::Superseded { camera_id: id }),
            (None, None) => return Err(LensError::camera_not_found(id)),
        };

        session.active = true;
        if model.is_some() {
            session.model = model;
        }
        if session.poller.is_none() {
            let token = self.root.child_token();
            session.poller = Some(token.clone());
            tokio::spawn(poller::run(poller::LiveGuard::enter(self), id, token));
            tracing::debug!(camera_id = %id, "Poller spawned");
        }
        Ok(())
    }

    /// Publishes a freshly fetched frame unless the poller that fetched it has
    /// been cancelled meanwhile, in which case the frame is released at once.
    ///
    /// Returns whether the frame was published.
    pub(super) fn publish(&self, id: CameraId, token: &CancellationToken, handle: FrameHandle) -> bool {
        let mut table = self.table();
        let current = !token.is_cancelled();

        let Some(session) = table.get_mut(id).filter(|session| current && session.active) else {
            drop(table);
            tracing::debug!(camera_id = %id, handle = %handle.id(), "Discarding stale frame");
            handle.release();
            return false;
        };

        let handle_id = handle.id();
        let previous = session.current_frame.replace(handle);
        session.frame_sequence += 1;
        let sequence = session.frame_sequence;
        drop(table);

        // The new frame is already in place; only now let the old one go.
        if let Some(previous) = previous {
            previous.release();
        }

        self.emit(SessionEvent::FramePublished {
            camera_id: id,
            handle: handle_id,
            sequence,
            at: chrono::Utc::now(),
        });
        true
    }
}

/// Owns every camera's stream session: discovery, start/stop, per-camera
/// polling and frame handle lifetime.
///
/// Share it as `Arc<StreamSessionManager>`. Dropping the manager tears it
/// down.
///
/// State lives behind a synchronous mutex that is never held across an
/// `.await`, so each mutation is atomic with respect to pollers and other
/// callers. Network calls settle in any order; a frame that arrives for a
/// session that has been stopped in the meantime is released, not shown.
pub struct StreamSessionManager {
    shared: Arc<Shared>,
}

impl StreamSessionManager {
    /// Creates a manager with the default 100 ms poll interval.
    pub fn new(backend: Arc<dyn StreamBackend>) -> Self {
        Self::with_config(backend, SessionConfig::default())
    }

    pub fn with_config(backend: Arc<dyn StreamBackend>, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                backend,
                pool: FramePool::new(),
                config,
                live_pollers: AtomicUsize::new(0),
                table: Mutex::new(SessionTable::default()),
                events,
                root: CancellationToken::new(),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Discovers live cameras and adopts streams that are already running.
    ///
    /// Each live camera gets one frame fetch; a successful fetch marks it
    /// active, shows that frame and starts its poller. Fetch and registry
    /// failures are logged and never abort initialization.
    ///
    /// Calling this again replaces the previous session set after tearing
    /// down its local state; previously active sessions emit `Stopped`.
    ///
    /// # Errors
    ///
    /// Only `LensError::ShutDown`, after [`Self::teardown`].
    pub async fn initialize(&self) -> Result<InitSummary> {
        let stopped = self.reset_sessions()?;
        for id in stopped {
            self.shared.emit(SessionEvent::Stopped { camera_id: id });
        }

        let cameras = match self.shared.backend.list_cameras().await {
            Ok(cameras) => cameras,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch camera list");
                return Ok(InitSummary {
                    registry_error: Some(err),
                    ..InitSummary::default()
                });
            }
        };

        let registered = cameras.len();
        let live: Vec<CameraSource> = cameras.into_iter().filter(CameraSource::is_live).collect();

        let backend = &self.shared.backend;
        let first_frames: Vec<Result<Bytes>> =
            join_all(live.iter().map(|camera| backend.fetch_frame(camera.id))).await;

        let mut sessions = Vec::with_capacity(live.len());
        let mut running = Vec::new();
        for (camera, first_frame) in live.into_iter().zip(first_frames) {
            match first_frame {
                Ok(payload) => running.push((camera.id, payload)),
                Err(err) => {
                    tracing::debug!(camera_id = %camera.id, error = %err, "No running stream found");
                }
            }
            sessions.push(StreamSession::new(camera, self.shared.next_generation()));
        }

        let mut summary = InitSummary {
            registered,
            live: sessions.len(),
            ..InitSummary::default()
        };

        let previous = {
            let mut table = self.shared.table();
            if table.torn_down {
                return Err(LensError::ShutDown);
            }
            let previous = std::mem::replace(&mut table.sessions, sessions);

            for (id, payload) in running {
                let handle = self.shared.pool.acquire(payload);
                if let Some(session) = table.get_mut(id) {
                    session.current_frame = Some(handle);
                    session.frame_sequence = 1;
                }
                self.shared.activate(&mut table, id, None, None)?;
                summary.already_streaming.push(id);
            }
            previous
        };

        // A concurrent initialize may have installed sessions in between.
        for mut session in previous {
            if session.deactivate(self.shared.next_generation()) {
                self.shared.emit(SessionEvent::Stopped {
                    camera_id: session.id(),
                });
            }
        }

        for id in &summary.already_streaming {
            self.shared.emit(SessionEvent::Started {
                camera_id: *id,
                model: None,
            });
        }

        tracing::info!(
            registered = summary.registered,
            live = summary.live,
            streaming = summary.already_streaming.len(),
            "Stream sessions initialized"
        );
        Ok(summary)
    }

    /// Starts every known camera with `model`, settling each independently.
    ///
    /// Cameras whose start request succeeded become active and start polling;
    /// failed cameras stay as they were and are listed in the report. A camera
    /// stopped while its request was pending is reported as
    /// `LensError::Superseded` and its backend stream is stopped again.
    pub async fn start_all(&self, model: ModelType) -> Result<BatchReport> {
        let targets = {
            let table = self.shared.table();
            if table.torn_down {
                return Err(LensError::ShutDown);
            }
            table
                .sessions
                .iter()
                .map(|session| (session.id(), session.generation))
                .collect::<Vec<_>>()
        };

        let backend = &self.shared.backend;
        let outcomes = join_all(targets.into_iter().map(|(id, generation)| async move {
            (id, generation, backend.start_stream(id, model).await)
        }))
        .await;

        let mut report = BatchReport::default();
        let mut started = Vec::new();
        let mut superseded = Vec::new();
        {
            let mut table = self.shared.table();
            for (id, generation, outcome) in outcomes {
                let outcome = outcome.and_then(|_| {
                    self.shared
                        .activate(&mut table, id, Some(model), Some(generation))
                });
                match outcome {
                    Ok(()) => {
                        started.push(id);
                        report.succeeded.push(id);
                    }
                    Err(err) => {
                        if matches!(err, LensError::Superseded { .. }) {
                            superseded.push(id);
                        }
                        report.failed.push((id, err));
                    }
                }
            }
        }

        for id in started {
            self.shared.emit(SessionEvent::Started {
                camera_id: id,
                model: Some(model),
            });
        }
        for (id, err) in &report.failed {
            tracing::warn!(camera_id = %id, error = %err, "Failed to start stream");
        }
        join_all(superseded.into_iter().map(|id| self.withdraw_start(id))).await;
        tracing::info!(
            model = %model,
            started = report.succeeded.len(),
            failed = report.failed.len(),
            "Start all finished"
        );
        Ok(report)
    }

    /// Stops every active camera.
    ///
    /// Local state is torn down for all sessions before the requests settle,
    /// whatever their outcome. The report covers the stop requests only.
    pub async fn stop_all(&self) -> BatchReport {
        let stopped = {
            let mut table = self.shared.table();
            self.shared.deactivate_all(&mut table)
        };

        for id in &stopped {
            self.shared.emit(SessionEvent::Stopped { camera_id: *id });
        }

        let backend = &self.shared.backend;
        let outcomes = join_all(
            stopped
                .into_iter()
                .map(|id| async move { (id, backend.stop_stream(id).await) }),
        )
        .await;

        let mut report = BatchReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.succeeded.push(id),
                Err(err) => {
                    tracing::warn!(camera_id = %id, error = %err, "Stop request failed");
                    report.failed.push((id, err));
                }
            }
        }
        tracing::info!(
            stopped = report.succeeded.len(),
            failed = report.failed.len(),
            "Stop all finished"
        );
        report
    }

    /// Starts one camera's stream.
    ///
    /// On failure the session is left unchanged. If the camera is stopped
    /// while the request is pending, the stop wins: the call fails with
    /// `LensError::Superseded` and the backend stream is stopped again.
    pub async fn start_one(&self, id: CameraId, model: ModelType) -> Result<()> {
        let generation = {
            let table = self.shared.table();
            if table.torn_down {
                return Err(LensError::ShutDown);
            }
            table
                .get(id)
                .map(|session| session.generation)
                .ok_or_else(|| LensError::camera_not_found(id))?
        };

        if let Err(err) = self.shared.backend.start_stream(id, model).await {
            tracing::warn!(camera_id = %id, error = %err, "Failed to start stream");
            return Err(err);
        }

        let activated = {
            let mut table = self.shared.table();
            self.shared
                .activate(&mut table, id, Some(model), Some(generation))
        };
        if let Err(err) = activated {
            tracing::info!(camera_id = %id, error = %err, "Start discarded");
            if matches!(err, LensError::Superseded { .. }) {
                self.withdraw_start(id).await;
            }
            return Err(err);
        }
        self.shared.emit(SessionEvent::Started {
            camera_id: id,
            model: Some(model),
        });
        tracing::info!(camera_id = %id, model = %model, "Stream started");
        Ok(())
    }

    /// Stops one camera's stream.
    ///
    /// Polling stops and the frame is released before the stop request is
    /// awaited; the request's outcome is returned afterwards.
    pub async fn stop_one(&self, id: CameraId) -> Result<()> {
        let was_active = {
            let mut table = self.shared.table();
            let generation = self.shared.next_generation();
            let session = table
                .get_mut(id)
                .ok_or_else(|| LensError::camera_not_found(id))?;
            session.deactivate(generation)
        };
        if was_active {
            self.shared.emit(SessionEvent::Stopped { camera_id: id });
        }

        match self.shared.backend.stop_stream(id).await {
            Ok(()) => {
                tracing::info!(camera_id = %id, "Stream stopped");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(camera_id = %id, error = %err, "Stop request failed");
                Err(err)
            }
        }
    }

    /// Stops every poller and releases every frame handle.
    ///
    /// Backend streams are left running; a later [`Self::initialize`] on a new
    /// manager adopts them. Idempotent.
    pub fn teardown(&self) {
        {
            let mut table = self.shared.table();
            if table.torn_down {
                return;
            }
            table.torn_down = true;
            self.shared.root.cancel();
            self.shared.deactivate_all(&mut table);
        }
        self.shared.emit(SessionEvent::TornDown);
        tracing::info!("Stream session manager torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.table().torn_down
    }

    /// Tears down local state of the current session set before a re-scan.
    /// Returns the ids that were active.
    fn reset_sessions(&self) -> Result<Vec<CameraId>> {
        let mut table = self.shared.table();
        if table.torn_down {
            return Err(LensError::ShutDown);
        }
        Ok(self.shared.deactivate_all(&mut table))
    }

    /// Stops a backend stream whose start lost against a local stop.
    async fn withdraw_start(&self, id: CameraId) {
        match self.shared.backend.stop_stream(id).await {
            Ok(()) => tracing::debug!(camera_id = %id, "Superseded stream stopped"),
            Err(err) => {
                tracing::warn!(camera_id = %id, error = %err, "Failed to stop superseded stream");
            }
        }
    }

    // ============================================================================
    // Read API
    // ============================================================================

    /// Snapshots of every session, in registry order.
    pub fn sessions(&self) -> Vec<SessionSnapshot> {
        self.shared
            .table()
            .sessions
            .iter()
            .map(StreamSession::snapshot)
            .collect()
    }

    pub fn session(&self, id: CameraId) -> Option<SessionSnapshot> {
        self.shared.table().get(id).map(StreamSession::snapshot)
    }

    /// Bytes of the frame currently on display for `id`.
    pub fn current_frame(&self, id: CameraId) -> Option<Bytes> {
        self.shared
            .table()
            .get(id)
            .and_then(|session| session.current_frame.as_ref())
            .map(FrameHandle::bytes)
    }

    /// Whether any session is active.
    pub fn is_streaming(&self) -> bool {
        self.shared.table().sessions.iter().any(|s| s.active)
    }

    /// Number of polling tasks currently alive.
    pub fn live_pollers(&self) -> usize {
        self.shared.live_pollers.load(Ordering::SeqCst)
    }

    pub fn frame_pool(&self) -> &FramePool {
        &self.shared.pool
    }

    pub fn config(&self) -> SessionConfig {
        self.shared.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }
}

impl Drop for StreamSessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}
