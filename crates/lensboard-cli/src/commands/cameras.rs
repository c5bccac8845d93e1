use super::Context;
use anyhow::{Result, bail};
use lensboard_core::{CameraDraft, CameraId, CameraRegistry, SourceKind};

/// Fields to overwrite on `cameras update`; `None` keeps the current value.
pub struct CameraChanges {
    pub name: Option<String>,
    pub stream: Option<String>,
    pub kind: Option<String>,
    pub location: Option<String>,
}

pub async fn list(ctx: &Context) -> Result<()> {
    let cameras = ctx.backend()?.list().await?;

    if cameras.is_empty() {
        println!("No cameras registered.");
        return Ok(());
    }

    println!("{:>4}  {:<24} {:<10} {:<28} LOCATION", "ID", "NAME", "KIND", "STREAM");
    for camera in &cameras {
        println!(
            "{:>4}  {:<24} {:<10} {:<28} {}",
            camera.id,
            camera.display_name(),
            camera.stream_type,
            camera.stream,
            camera.location.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn add(
    ctx: &Context,
    name: String,
    stream: String,
    kind: String,
    location: Option<String>,
) -> Result<()> {
    let draft = CameraDraft {
        source_name: name,
        stream_type: SourceKind::from(kind),
        stream,
        location,
    };

    let created = ctx.backend()?.create(&draft).await?;
    println!("✓ Added camera '{}' ({})", created.source_name, created.stream_type);
    Ok(())
}

pub async fn update(ctx: &Context, id: i64, changes: CameraChanges) -> Result<()> {
    let backend = ctx.backend()?;
    let id = CameraId(id);

    // The backend replaces the whole record, so start from the current one.
    let Some(current) = backend.list().await?.into_iter().find(|c| c.id == id) else {
        bail!("Camera {id} not found");
    };

    let mut draft = CameraDraft::from(&current);
    if let Some(name) = changes.name {
        draft.source_name = name;
    }
    if let Some(stream) = changes.stream {
        draft.stream = stream;
    }
    if let Some(kind) = changes.kind {
        draft.stream_type = SourceKind::from(kind);
    }
    if let Some(location) = changes.location {
        draft.location = Some(location);
    }

    backend.update(id, &draft).await?;
    println!("✓ Updated camera {id}");
    Ok(())
}

pub async fn remove(ctx: &Context, id: i64) -> Result<()> {
    let id = CameraId(id);
    ctx.backend()?.delete(id).await?;
    println!("✓ Removed camera {id}");
    Ok(())
}
