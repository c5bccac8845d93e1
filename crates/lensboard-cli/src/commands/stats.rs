use super::Context;
use anyhow::Result;
use lensboard_core::{ModelFilter, ModelType};

pub async fn show(ctx: &Context, model: ModelFilter, class_name: Option<&str>) -> Result<()> {
    let backend = ctx.backend()?;
    let summary = backend.detection_summary().await?;

    println!("Total detections: {}", summary.total_detections);
    for kind in ModelType::ALL {
        println!("  {:<14} {}", kind.title(), summary.for_model(kind));
    }

    let classes = backend.detection_classes(model).await?;
    println!();
    if classes.is_empty() {
        println!("Classes ({model}): none");
    } else {
        println!("Classes ({model}): {}", classes.join(", "));
    }

    let filter = format!("model={model}, class={}", class_name.unwrap_or("all"));

    let hourly = backend.daily_stats(model, class_name).await?;
    println!();
    println!("Today by hour ({filter}):");
    if hourly.is_empty() {
        println!("  no detections");
    }
    for row in &hourly {
        println!("  {}  {}", row.timestamp.format("%H:%M"), row.count);
    }

    let daily = backend.weekly_stats(model, class_name).await?;
    println!();
    println!("Last 7 days ({filter}):");
    if daily.is_empty() {
        println!("  no detections");
    }
    for row in &daily {
        println!("  {}  {}", row.date.format("%Y-%m-%d"), row.count);
    }

    Ok(())
}
