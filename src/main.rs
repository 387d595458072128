use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use azvision::annotate::{Annotator, DEFAULT_RESULTS_DIR};
use azvision::commands::{self, InputImage};
use azvision::service::{AnalysisClient, FaceClient, TrainingClient, TrainingSession};
use azvision::{ServiceConfig, ServiceKind, TrainingConfig, VisionError};

#[derive(Parser)]
#[command(name = "azvision")]
#[command(about = "Annotate images with detections from cloud vision services")]
struct Cli {
    /// Directory annotated images are written to
    #[arg(long, value_name = "DIR", default_value = DEFAULT_RESULTS_DIR, global = true)]
    results_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect faces and write detected_faces.jpg
    Faces {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },

    /// Caption, read, tag and find objects and people; writes lines.jpg, words.jpg and people.jpg
    Analyze {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },

    /// Upload images tagged by sub-directory name to a custom vision project
    Train {
        /// Folder with one sub-directory per project tag
        #[arg(long, value_name = "DIR", default_value = "img/training-images")]
        images_dir: PathBuf,

        /// Train the project after uploading and wait for it to finish
        #[arg(long)]
        train: bool,

        /// Seconds between training status checks
        #[arg(long, default_value_t = 5)]
        poll_secs: u64,
    },
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("azvision=warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Faces { image } => {
            let config = ServiceConfig::from_env(ServiceKind::Face)?;
            let input = InputImage::load(&image)?;
            let client = FaceClient::new(config)?;
            let annotator = Annotator::from_env(cli.results_dir)?;
            commands::detect_faces(&client, &input, &annotator).await?;
        }
        Command::Analyze { image } => {
            let config = ServiceConfig::from_env(ServiceKind::Vision)?;
            let input = InputImage::load(&image)?;
            let client = AnalysisClient::new(config)?;
            let annotator = Annotator::from_env(cli.results_dir)?;
            commands::analyze_image(&client, &input, &annotator).await?;
        }
        Command::Train {
            images_dir,
            train,
            poll_secs,
        } => {
            let config = TrainingConfig::from_env()?;
            let session = TrainingSession::open(TrainingClient::new(config)?).await?;
            let train = train.then(|| Duration::from_secs(poll_secs));
            commands::upload_training_images(&session, &images_dir, train).await?;
        }
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return Err(VisionError::Usage(e.render().to_string().trim_end().to_string()).into()),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run() {
        println!("{}", err);
        let code = err
            .downcast_ref::<VisionError>()
            .map_or(1, VisionError::exit_code);
        std::process::exit(code);
    }
}
