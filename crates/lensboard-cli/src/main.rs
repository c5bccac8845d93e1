use anyhow::Result;
use clap::{Parser, Subcommand};
use lensboard_core::{ModelFilter, ModelType};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;
use commands::theme::ThemeAction;

#[derive(Parser)]
#[command(name = "lensboard")]
#[command(about = "Lensboard CLI - live multi-camera analytics client", long_about = None)]
struct Cli {
    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Preference file to use instead of ~/.config/lensboard/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the camera registry
    Cameras {
        #[command(subcommand)]
        action: CamerasAction,
    },
    /// Show detection totals, classes and hourly/daily counts
    Stats {
        /// `all` or a single model
        #[arg(long, default_value = "all")]
        model: ModelFilter,

        /// Only count this class
        #[arg(long = "class")]
        class_name: Option<String>,
    },
    /// Follow live streams until Ctrl-C
    Live {
        /// Model to start streams with
        #[arg(long, default_value = "objectDetection")]
        model: ModelType,

        /// Start every camera instead of only watching running streams
        #[arg(long)]
        start: bool,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Show or change the theme preference
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand)]
enum CamerasAction {
    /// List registered cameras
    List,
    /// Register a camera
    Add {
        name: String,
        /// Device index for live cameras, URL or path otherwise
        #[arg(long, default_value = "0")]
        stream: String,
        #[arg(long, default_value = "live")]
        kind: String,
        #[arg(long)]
        location: Option<String>,
    },
    /// Change fields of a registered camera
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        stream: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Remove a camera from the registry
    Remove { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lensboard=info,lensboard_application=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = Context::load(cli.config, cli.base_url)?;

    match cli.command {
        Commands::Cameras { action } => match action {
            CamerasAction::List => commands::cameras::list(&ctx).await?,
            CamerasAction::Add {
                name,
                stream,
                kind,
                location,
            } => commands::cameras::add(&ctx, name, stream, kind, location).await?,
            CamerasAction::Update {
                id,
                name,
                stream,
                kind,
                location,
            } => {
                let changes = commands::cameras::CameraChanges {
                    name,
                    stream,
                    kind,
                    location,
                };
                commands::cameras::update(&ctx, id, changes).await?
            }
            CamerasAction::Remove { id } => commands::cameras::remove(&ctx, id).await?,
        },
        Commands::Stats { model, class_name } => {
            commands::stats::show(&ctx, model, class_name.as_deref()).await?
        }
        Commands::Live {
            model,
            start,
            duration,
        } => commands::live::run(&ctx, model, start, duration).await?,
        Commands::Theme { action } => commands::theme::run(&ctx, action)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_defaults() {
        let cli = Cli::try_parse_from(["lensboard", "live"]).unwrap();
        match cli.command {
            Commands::Live {
                model,
                start,
                duration,
            } => {
                assert_eq!(model, ModelType::ObjectDetection);
                assert!(!start);
                assert_eq!(duration, None);
            }
            _ => panic!("expected live command"),
        }
    }

    #[test]
    fn test_global_base_url_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lensboard",
            "live",
            "--model",
            "pose",
            "--start",
            "--base-url",
            "http://10.0.0.2:8000",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.2:8000"));
        assert!(matches!(
            cli.command,
            Commands::Live {
                model: ModelType::Pose,
                start: true,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        assert!(Cli::try_parse_from(["lensboard", "live", "--model", "depth"]).is_err());
    }

    #[test]
    fn test_stats_filters() {
        let cli = Cli::try_parse_from(["lensboard", "stats"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stats {
                model: ModelFilter::All,
                class_name: None
            }
        ));

        let cli =
            Cli::try_parse_from(["lensboard", "stats", "--model", "segmentation", "--class", "car"])
                .unwrap();
        match cli.command {
            Commands::Stats { model, class_name } => {
                assert_eq!(model, ModelFilter::Model(ModelType::Segmentation));
                assert_eq!(class_name.as_deref(), Some("car"));
            }
            _ => panic!("expected stats command"),
        }
    }

    #[test]
    fn test_theme_action_is_optional() {
        let cli = Cli::try_parse_from(["lensboard", "theme"]).unwrap();
        assert!(matches!(cli.command, Commands::Theme { action: None }));

        let cli = Cli::try_parse_from(["lensboard", "theme", "toggle"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Theme {
                action: Some(ThemeAction::Toggle)
            }
        ));
    }
}
