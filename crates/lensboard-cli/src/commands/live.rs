use super::Context;
use anyhow::Result;
use lensboard_application::{SessionConfig, SessionEvent, StreamSessionManager};
use lensboard_core::{ModelType, StreamBackend};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Runs a session manager in the foreground and prints what it does.
///
/// Streams started here are stopped on exit. Streams that were already running
/// are only watched and keep running server-side.
pub async fn run(ctx: &Context, model: ModelType, start: bool, duration: Option<u64>) -> Result<()> {
    let backend: Arc<dyn StreamBackend> = Arc::new(ctx.backend()?);
    let manager = Arc::new(StreamSessionManager::with_config(
        backend,
        SessionConfig::from(&ctx.preferences),
    ));
    let mut events = manager.subscribe();

    let summary = manager.initialize().await?;
    if let Some(err) = &summary.registry_error {
        println!("⚠️  Could not load cameras: {err}");
    }
    println!(
        "{} live of {} registered cameras, {} already streaming",
        summary.live,
        summary.registered,
        summary.already_streaming.len()
    );
    for session in manager.sessions() {
        println!(
            "  [{}] {} {}",
            if session.active { "on " } else { "off" },
            session.camera_id,
            session.name
        );
    }

    let mut started_here = false;
    if start {
        let report = manager.start_all(model).await?;
        println!("Started {} camera(s) with {}", report.succeeded.len(), model.title());
        for (id, err) in &report.failed {
            println!("  ✗ camera {id}: {err}");
        }
        started_here = !report.succeeded.is_empty();
    }

    if !manager.is_streaming() {
        println!("Nothing is streaming.");
        manager.teardown();
        return Ok(());
    }

    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                break;
            }
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Ok(SessionEvent::FramePublished { camera_id, handle, sequence, at }) => {
                    let size = manager.current_frame(camera_id).map_or(0, |frame| frame.len());
                    println!(
                        "{} camera {camera_id} frame #{sequence} {handle} ({size} bytes)",
                        at.format("%H:%M:%S%.3f")
                    );
                }
                Ok(SessionEvent::Started { camera_id, model }) => {
                    let model = model.map_or("running stream", |m| m.title());
                    println!("▶ camera {camera_id} ({model})");
                }
                Ok(SessionEvent::Stopped { camera_id }) => println!("■ camera {camera_id}"),
                Ok(SessionEvent::TornDown) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event output fell behind");
                }
            }
        }
    }

    if started_here {
        let report = manager.stop_all().await;
        println!("Stopped {} camera(s)", report.succeeded.len());
        for (id, err) in &report.failed {
            println!("  ✗ camera {id}: {err}");
        }
    }
    manager.teardown();

    let stats = manager.frame_pool().stats();
    tracing::info!(
        acquired = stats.acquired,
        released = stats.released,
        outstanding = stats.outstanding,
        "Session finished"
    );
    Ok(())
}
