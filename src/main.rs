use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mix_identify::{
    create_router, AppState, Config, Ffmpeg, PipelineSettings, ProviderFactory,
    RecognitionPipeline, TimeWindow,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mix-identify", version, about = "Identify the tracks played in a DJ mix")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/mix-identify")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,

    /// Recognize the tracks in one window of a local file and print them as JSON
    Identify {
        /// Audio file to analyze
        source: PathBuf,

        /// Window start in seconds
        #[arg(long, default_value_t = 0)]
        start: u64,

        /// Window end in seconds (exclusive)
        #[arg(long)]
        end: u64,
    },
}

fn build_pipeline(cfg: &Config) -> Result<RecognitionPipeline> {
    let transcoder = Arc::new(Ffmpeg::from_config(&cfg.transcoder));
    let provider = ProviderFactory::create(&cfg.recognition)
        .context("Failed to create recognition provider")?;

    info!(
        "Pipeline: provider={}, chunk={}s, max samples={}, on provider error={:?}",
        provider.name(),
        cfg.pipeline.chunk_duration_secs,
        cfg.pipeline.max_samples,
        cfg.pipeline.on_provider_error
    );

    Ok(RecognitionPipeline::new(
        transcoder,
        provider,
        PipelineSettings::from(&cfg.pipeline),
    ))
}

async fn serve(cfg: &Config, pipeline: RecognitionPipeline) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("{} listening on http://{}", cfg.service.name, addr);

    axum::serve(listener, create_router(AppState::new(pipeline)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let pipeline = build_pipeline(&cfg)?;

    match cli.command {
        Command::Serve => serve(&cfg, pipeline).await,
        Command::Identify { source, start, end } => {
            let window = TimeWindow::new(start, end)?;
            let tracks = pipeline
                .run(&source, window)
                .await
                .with_context(|| format!("Failed to identify tracks in {}", source.display()))?;

            println!("{}", serde_json::to_string_pretty(&tracks)?);
            Ok(())
        }
    }
}
